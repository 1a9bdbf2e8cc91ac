use std::collections::HashMap;

use roxmltree::Node;
use tracing::warn;

use super::{
    builtins::XSD_NAMESPACE,
    error::{ReferenceKind, UnsupportedConstruct, XsdError},
    simple_type_def::SimpleTypeDefinition,
    xstypes::{NCName, ScalarKind, TypeName},
};

/// 1-based line of the start tag of `node`.
pub(crate) fn line_of(node: Node) -> u32 {
    node.document().text_pos_at(node.range().start).row
}

pub(crate) fn is_xsd_element(node: Node, local_name: &str) -> bool {
    node.is_element()
        && node.tag_name().namespace() == Some(XSD_NAMESPACE)
        && node.tag_name().name() == local_name
}

/// State shared by the component readers while a single `<schema>` is mapped.
pub(super) struct MappingContext<'a, 'input: 'a> {
    schema_node: Node<'a, 'input>,
    simple_types: HashMap<NCName, ScalarKind>,
    unsupported: Vec<UnsupportedConstruct>,
}

impl<'a, 'input: 'a> MappingContext<'a, 'input> {
    pub(super) fn new(schema_node: Node<'a, 'input>) -> Self {
        Self {
            schema_node,
            simple_types: HashMap::new(),
            unsupported: Vec::new(),
        }
    }

    pub(super) fn schema_node(&self) -> Node<'a, 'input> {
        self.schema_node
    }

    /// Resolves every alias to its scalar kind. Must run before any attribute is read.
    pub(super) fn register_simple_types(
        &mut self,
        definitions: &[SimpleTypeDefinition],
    ) -> Result<(), XsdError> {
        let by_name: HashMap<&str, &SimpleTypeDefinition> = definitions
            .iter()
            .map(|d| (d.name.as_str(), d))
            .collect();

        for definition in definitions {
            let mut current = definition;
            let mut steps = 0;
            let kind = loop {
                match current.base_kind() {
                    Ok(kind) => break kind,
                    Err(name) => {
                        steps += 1;
                        if steps > definitions.len() {
                            return Err(XsdError::CircularDerivation {
                                name: definition.name.clone(),
                                line: definition.line,
                            });
                        }
                        current = by_name.get(name.as_str()).copied().ok_or_else(|| {
                            XsdError::Unresolved {
                                kind: ReferenceKind::Type,
                                name: name.clone(),
                                line: current.line,
                            }
                        })?;
                    }
                }
            };
            self.simple_types.insert(definition.name.clone(), kind);
        }
        Ok(())
    }

    pub(super) fn into_parts(self) -> (HashMap<NCName, ScalarKind>, Vec<UnsupportedConstruct>) {
        (self.simple_types, self.unsupported)
    }

    /// The scalar kind of an attribute type: a built-in or a registered alias.
    pub(super) fn scalar_kind(
        &self,
        type_name: &TypeName,
        node: Node,
    ) -> Result<ScalarKind, XsdError> {
        match type_name {
            TypeName::Builtin(kind) => Ok(*kind),
            TypeName::Named(name) => {
                self.simple_types
                    .get(name)
                    .copied()
                    .ok_or_else(|| XsdError::Unresolved {
                        kind: ReferenceKind::Type,
                        name: name.clone(),
                        line: line_of(node),
                    })
            }
        }
    }

    /// Records a recognized construct the reader drops.
    pub(super) fn unsupported(&mut self, node: Node, context: &str) {
        let construct = UnsupportedConstruct {
            tag: node.tag_name().name().to_owned(),
            context: context.to_owned(),
            line: line_of(node),
        };
        warn!("{construct}");
        self.unsupported.push(construct);
    }

    /// Like [`Self::unsupported`] for an attribute of `node`.
    pub(super) fn unsupported_attribute(&mut self, node: Node, attribute: &str, context: &str) {
        let construct = UnsupportedConstruct {
            tag: format!("{} {attribute}=", node.tag_name().name()),
            context: context.to_owned(),
            line: line_of(node),
        };
        warn!("{construct}");
        self.unsupported.push(construct);
    }
}

pub(super) fn unexpected(node: Node, context: &str) -> XsdError {
    XsdError::UnexpectedConstruct {
        tag: node.tag_name().name().to_owned(),
        context: context.to_owned(),
        line: line_of(node),
    }
}

pub(super) fn required_attribute<'a>(
    node: Node<'a, '_>,
    attribute: &'static str,
) -> Result<&'a str, XsdError> {
    node.attribute(attribute)
        .ok_or_else(|| XsdError::MissingAttribute {
            attribute,
            tag: node.tag_name().name().to_owned(),
            line: line_of(node),
        })
}

pub(super) fn boolean_attribute(
    node: Node,
    attribute: &'static str,
    default: bool,
) -> Result<bool, XsdError> {
    match node.attribute(attribute).map(str::trim) {
        None => Ok(default),
        Some("true" | "1") => Ok(true),
        Some("false" | "0") => Ok(false),
        Some(value) => Err(XsdError::InvalidValue {
            attribute,
            value: value.to_owned(),
            line: line_of(node),
        }),
    }
}

/// Element children of `node` without annotations. Elements outside the XSD namespace are fatal.
pub(super) fn schema_children<'a, 'input>(
    node: Node<'a, 'input>,
    context: &str,
) -> Result<Vec<Node<'a, 'input>>, XsdError> {
    let mut children = Vec::new();
    for child in node.children().filter(Node::is_element) {
        if child.tag_name().namespace() != Some(XSD_NAMESPACE) {
            return Err(unexpected(child, context));
        }
        if child.tag_name().name() != "annotation" {
            children.push(child);
        }
    }
    Ok(children)
}
