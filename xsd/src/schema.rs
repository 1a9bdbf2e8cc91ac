use std::collections::HashMap;

use roxmltree::Node;

use super::{
    element_decl::ValueKind,
    error::{ReferenceKind, UnsupportedConstruct, XsdError},
    mapping_context::{is_xsd_element, schema_children, unexpected, MappingContext},
    xstypes::{NCName, ScalarKind, Sequence, TypeName},
    ComplexTypeDefinition, ElementDeclaration, SimpleTypeDefinition,
};

/// Everything read from one `<schema>` document.
#[derive(Clone, Debug)]
pub struct Schema {
    pub target_namespace: Option<String>,
    pub simple_types: Sequence<SimpleTypeDefinition>,
    pub complex_types: Sequence<ComplexTypeDefinition>,
    /// Top-level element declarations, in document order.
    pub elements: Sequence<ElementDeclaration>,
    /// Constructs that were recognized but dropped.
    pub unsupported: Sequence<UnsupportedConstruct>,

    simple_type_kinds: HashMap<NCName, ScalarKind>,
    complex_type_index: HashMap<NCName, usize>,
    element_index: HashMap<NCName, usize>,
}

impl Schema {
    pub const TAG_NAME: &'static str = "schema";

    pub fn map_from_xml(schema: Node) -> Result<Self, XsdError> {
        if !is_xsd_element(schema, Self::TAG_NAME) {
            return Err(unexpected(schema, "document"));
        }

        let target_namespace = schema
            .attribute("targetNamespace")
            .map(|ns| ns.trim().to_owned());
        let mut context = MappingContext::new(schema);
        let top_level = schema_children(context.schema_node(), Self::TAG_NAME)?;

        // Aliases first, so attributes can be mapped to their scalar kind while they are read.
        let mut simple_types = Sequence::new();
        for node in &top_level {
            if node.tag_name().name() == SimpleTypeDefinition::TAG_NAME {
                let definition = SimpleTypeDefinition::map_from_xml(*node)?;
                if simple_types
                    .iter()
                    .any(|d: &SimpleTypeDefinition| d.name == definition.name)
                {
                    return Err(XsdError::DuplicateDefinition {
                        kind: ReferenceKind::Type,
                        name: definition.name,
                        line: definition.line,
                    });
                }
                simple_types.push(definition);
            }
        }
        context.register_simple_types(&simple_types)?;

        let mut complex_types = Sequence::new();
        let mut complex_type_index = HashMap::new();
        let mut elements = Sequence::new();
        let mut element_index = HashMap::new();

        for node in top_level {
            match node.tag_name().name() {
                SimpleTypeDefinition::TAG_NAME => {}
                ComplexTypeDefinition::TAG_NAME => {
                    let definition = ComplexTypeDefinition::map_from_xml(&mut context, node)?;
                    if complex_type_index.contains_key(&definition.name)
                        || simple_types.iter().any(|d| d.name == definition.name)
                    {
                        return Err(XsdError::DuplicateDefinition {
                            kind: ReferenceKind::Type,
                            name: definition.name,
                            line: definition.line,
                        });
                    }
                    complex_type_index.insert(definition.name.clone(), complex_types.len());
                    complex_types.push(definition);
                }
                ElementDeclaration::TAG_NAME => {
                    let element =
                        ElementDeclaration::map_from_xml(&mut context, node, true, Self::TAG_NAME)?;
                    let name = element.tag().to_owned();
                    if element_index.contains_key(&name) {
                        return Err(XsdError::DuplicateDefinition {
                            kind: ReferenceKind::Element,
                            name,
                            line: element.line,
                        });
                    }
                    element_index.insert(name, elements.len());
                    elements.push(element);
                }
                "import" | "include" | "redefine" | "override" | "notation" | "attribute"
                | "attributeGroup" | "group" | "defaultOpenContent" => {
                    context.unsupported(node, Self::TAG_NAME)
                }
                _ => return Err(unexpected(node, Self::TAG_NAME)),
            }
        }

        let (simple_type_kinds, unsupported) = context.into_parts();
        Ok(Self {
            target_namespace,
            simple_types,
            complex_types,
            elements,
            unsupported,
            simple_type_kinds,
            complex_type_index,
            element_index,
        })
    }

    pub fn complex_type(&self, name: &str) -> Option<&ComplexTypeDefinition> {
        self.complex_type_index
            .get(name)
            .map(|&index| &self.complex_types[index])
    }

    pub fn element(&self, name: &str) -> Option<&ElementDeclaration> {
        self.element_index
            .get(name)
            .map(|&index| &self.elements[index])
    }

    /// The scalar kind a named simple type stands for.
    pub fn simple_type_kind(&self, name: &str) -> Option<ScalarKind> {
        self.simple_type_kinds.get(name).copied()
    }

    /// What a value of the given type is. A missing type is text.
    pub fn value_kind(
        &self,
        type_name: Option<&TypeName>,
        line: u32,
    ) -> Result<ValueKind, XsdError> {
        match type_name {
            None => Ok(ValueKind::Scalar(ScalarKind::Text)),
            Some(TypeName::Builtin(kind)) => Ok(ValueKind::Scalar(*kind)),
            Some(TypeName::Named(name)) => {
                if self.complex_type_index.contains_key(name) {
                    Ok(ValueKind::Complex(name.clone()))
                } else if let Some(kind) = self.simple_type_kind(name) {
                    Ok(ValueKind::Scalar(kind))
                } else {
                    Err(XsdError::Unresolved {
                        kind: ReferenceKind::Type,
                        name: name.clone(),
                        line,
                    })
                }
            }
        }
    }
}
