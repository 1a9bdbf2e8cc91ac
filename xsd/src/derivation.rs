//! Derivation order of the complex types of a schema.

use super::{
    error::{ReferenceKind, XsdError},
    forest::Forest,
    xstypes::NCName,
    Schema,
};

/// A forest over `(base, derived)` pairs of complex type names.
#[derive(Clone, Debug)]
pub struct DerivationIndex {
    forest: Forest<NCName>,
    type_names: Vec<NCName>,
}

impl DerivationIndex {
    /// Adds one edge per complex type with a base, in document order.
    ///
    /// Fails if a base does not name a complex type of the schema or if the derivation is
    /// circular.
    pub fn from_schema(schema: &Schema) -> Result<Self, XsdError> {
        let mut forest = Forest::new();
        for definition in &schema.complex_types {
            let Some(base) = &definition.base else {
                continue;
            };
            if schema.complex_type(base).is_none() {
                return Err(XsdError::Unresolved {
                    kind: ReferenceKind::BaseType,
                    name: base.clone(),
                    line: definition.line,
                });
            }
            forest.add_edge(base.clone(), definition.name.clone());
        }

        // The forest drops edges that would close a cycle, so any such edge is missing now.
        for definition in &schema.complex_types {
            if let Some(base) = &definition.base {
                if !forest.is_immediate_child(&definition.name, base) {
                    return Err(XsdError::CircularDerivation {
                        name: definition.name.clone(),
                        line: definition.line,
                    });
                }
            }
        }

        Ok(Self {
            forest,
            type_names: schema
                .complex_types
                .iter()
                .map(|definition| definition.name.clone())
                .collect(),
        })
    }

    /// Every complex type, bases before the types derived from them. Types that take no part in
    /// any derivation follow in lexicographic order.
    pub fn emission_order(&self) -> Vec<&str> {
        let mut order: Vec<&str> = self
            .forest
            .pre_order()
            .into_iter()
            .map(String::as_str)
            .collect();
        let mut unrelated: Vec<&str> = self
            .type_names
            .iter()
            .filter(|name| !self.forest.contains(name))
            .map(String::as_str)
            .collect();
        unrelated.sort_unstable();
        order.extend(unrelated);
        order
    }

    /// Base types of `type_name`, base-most first.
    pub fn ancestor_chain(&self, type_name: &str) -> Vec<&str> {
        self.forest
            .ancestry(&type_name.to_owned())
            .into_iter()
            .map(String::as_str)
            .collect()
    }
}
