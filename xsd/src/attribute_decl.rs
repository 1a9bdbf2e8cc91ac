use roxmltree::Node;

use super::{
    error::XsdError,
    mapping_context::{line_of, required_attribute, schema_children, unexpected, MappingContext},
    simple_type_def::SimpleTypeDefinition,
    xstypes::{NCName, ScalarKind, TypeName},
};

/// An attribute of a complex type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttributeDeclaration {
    pub name: NCName,
    pub kind: ScalarKind,
    pub required: bool,
    pub line: u32,
}

impl AttributeDeclaration {
    pub const TAG_NAME: &'static str = "attribute";

    /// Reads a local `<attribute>`. Returns `None` for the forms that are dropped with a warning
    /// (references and prohibited uses).
    pub(super) fn map_from_xml(
        context: &mut MappingContext,
        attribute: Node,
        owner: &str,
    ) -> Result<Option<Self>, XsdError> {
        if attribute.has_attribute("ref") {
            context.unsupported_attribute(attribute, "ref", owner);
            return Ok(None);
        }

        let required = match attribute.attribute("use").map(str::trim) {
            None | Some("optional") => false,
            Some("required") => true,
            Some("prohibited") => {
                context.unsupported_attribute(attribute, "use", owner);
                return Ok(None);
            }
            Some(value) => {
                return Err(XsdError::InvalidValue {
                    attribute: "use",
                    value: value.into(),
                    line: line_of(attribute),
                })
            }
        };

        let name = required_attribute(attribute, "name")?.trim().to_owned();

        let mut kind = match attribute.attribute("type") {
            Some(type_name) => {
                let type_name = TypeName::parse(type_name, attribute)?;
                Some(context.scalar_kind(&type_name, attribute)?)
            }
            None => None,
        };
        for child in schema_children(attribute, "attribute")? {
            if child.tag_name().name() != SimpleTypeDefinition::TAG_NAME || kind.is_some() {
                return Err(unexpected(child, "attribute"));
            }
            kind = Some(SimpleTypeDefinition::inline_kind(context, child)?);
        }

        Ok(Some(Self {
            name,
            kind: kind.unwrap_or(ScalarKind::Text),
            required,
            line: line_of(attribute),
        }))
    }
}
