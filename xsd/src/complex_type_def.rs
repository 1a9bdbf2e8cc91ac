use roxmltree::Node;

use super::{
    attribute_decl::AttributeDeclaration,
    error::{ReferenceKind, XsdError},
    mapping_context::{
        boolean_attribute, line_of, required_attribute, schema_children, unexpected,
        MappingContext,
    },
    xstypes::{NCName, Sequence, TypeName},
    ElementDeclaration,
};

/// A named complex type: attributes, a flat sequence of elements and at most one base type it
/// extends.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComplexTypeDefinition {
    pub name: NCName,
    pub base: Option<NCName>,
    pub abstract_: bool,
    pub attributes: Sequence<AttributeDeclaration>,
    pub elements: Sequence<ElementDeclaration>,
    pub line: u32,
}

impl ComplexTypeDefinition {
    pub const TAG_NAME: &'static str = "complexType";

    pub(super) fn map_from_xml(
        context: &mut MappingContext,
        complex_type: Node,
    ) -> Result<Self, XsdError> {
        let name = required_attribute(complex_type, "name")?.trim().to_owned();
        let owner = format!("complexType {name:?}");

        let mut definition = Self {
            abstract_: boolean_attribute(complex_type, "abstract", false)?,
            name,
            base: None,
            attributes: Sequence::new(),
            elements: Sequence::new(),
            line: line_of(complex_type),
        };

        for child in schema_children(complex_type, &owner)? {
            match child.tag_name().name() {
                "complexContent" => definition.map_complex_content(context, child, &owner)?,
                _ => definition.map_content_child(context, child, &owner)?,
            }
        }

        Ok(definition)
    }

    fn map_complex_content(
        &mut self,
        context: &mut MappingContext,
        complex_content: Node,
        owner: &str,
    ) -> Result<(), XsdError> {
        for child in schema_children(complex_content, owner)? {
            match child.tag_name().name() {
                "extension" => {
                    let base = required_attribute(child, "base")?;
                    match TypeName::parse(base, child)? {
                        TypeName::Named(base) => self.base = Some(base),
                        TypeName::Builtin(_) => {
                            return Err(XsdError::Unresolved {
                                kind: ReferenceKind::BaseType,
                                name: base.trim().into(),
                                line: line_of(child),
                            })
                        }
                    }
                    for content in schema_children(child, owner)? {
                        self.map_content_child(context, content, owner)?;
                    }
                }
                "restriction" => context.unsupported(child, owner),
                _ => return Err(unexpected(child, owner)),
            }
        }
        Ok(())
    }

    /// Content shared by `<complexType>` and `<extension>`.
    fn map_content_child(
        &mut self,
        context: &mut MappingContext,
        child: Node,
        owner: &str,
    ) -> Result<(), XsdError> {
        match child.tag_name().name() {
            "sequence" => self.map_sequence(context, child, owner)?,
            AttributeDeclaration::TAG_NAME => {
                let attribute = AttributeDeclaration::map_from_xml(context, child, owner)?;
                self.attributes.extend(attribute);
            }
            "choice" | "all" | "group" | "attributeGroup" | "anyAttribute" | "simpleContent"
            | "openContent" | "assert" => context.unsupported(child, owner),
            _ => return Err(unexpected(child, owner)),
        }
        Ok(())
    }

    fn map_sequence(
        &mut self,
        context: &mut MappingContext,
        sequence: Node,
        owner: &str,
    ) -> Result<(), XsdError> {
        for child in schema_children(sequence, owner)? {
            match child.tag_name().name() {
                ElementDeclaration::TAG_NAME => {
                    let element = ElementDeclaration::map_from_xml(context, child, false, owner)?;
                    self.elements.push(element);
                }
                // Nested sequences are flattened; their own occurrence bounds are not applied.
                "sequence" => self.map_sequence(context, child, owner)?,
                "choice" | "group" | "any" => context.unsupported(child, owner),
                _ => return Err(unexpected(child, owner)),
            }
        }
        Ok(())
    }
}
