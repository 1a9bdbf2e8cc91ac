use roxmltree::Node;

use super::{
    error::XsdError,
    mapping_context::{line_of, required_attribute, schema_children, unexpected, MappingContext},
    xstypes::{NCName, ScalarKind, TypeName},
};

/// A named `simpleType`, kept only as an alias of a scalar kind. Facets are not read.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimpleTypeDefinition {
    pub name: NCName,
    pub variety: Variety,
    pub line: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Variety {
    Restriction(TypeName),
    List,
    Union,
}

impl SimpleTypeDefinition {
    pub const TAG_NAME: &'static str = "simpleType";

    pub(super) fn map_from_xml(node: Node) -> Result<Self, XsdError> {
        let name = required_attribute(node, "name")?.trim().to_owned();
        Ok(Self {
            variety: Variety::map_from_xml(node)?,
            name,
            line: line_of(node),
        })
    }

    /// The scalar kind of an anonymous `simpleType` nested in an attribute or element.
    pub(super) fn inline_kind(
        context: &MappingContext,
        node: Node,
    ) -> Result<ScalarKind, XsdError> {
        match Variety::map_from_xml(node)? {
            Variety::Restriction(base) => context.scalar_kind(&base, node),
            Variety::List | Variety::Union => Ok(ScalarKind::Text),
        }
    }

    /// The scalar kind, or the name of the alias this one restricts.
    pub(super) fn base_kind(&self) -> Result<ScalarKind, &NCName> {
        match &self.variety {
            Variety::Restriction(TypeName::Builtin(kind)) => Ok(*kind),
            Variety::Restriction(TypeName::Named(name)) => Err(name),
            Variety::List | Variety::Union => Ok(ScalarKind::Text),
        }
    }
}

impl Variety {
    fn map_from_xml(simple_type: Node) -> Result<Self, XsdError> {
        let Some(child) = schema_children(simple_type, "simpleType")?.into_iter().next() else {
            return Err(XsdError::MissingAttribute {
                attribute: "base",
                tag: SimpleTypeDefinition::TAG_NAME.into(),
                line: line_of(simple_type),
            });
        };
        match child.tag_name().name() {
            "restriction" => match child.attribute("base") {
                Some(base) => TypeName::parse(base, child).map(Self::Restriction),
                // The base is given as an anonymous simpleType child.
                None => match schema_children(child, "restriction")?
                    .into_iter()
                    .find(|c| c.tag_name().name() == SimpleTypeDefinition::TAG_NAME)
                {
                    Some(nested) => Self::map_from_xml(nested),
                    None => Ok(Self::Restriction(TypeName::Builtin(ScalarKind::Text))),
                },
            },
            "list" => Ok(Self::List),
            "union" => Ok(Self::Union),
            _ => Err(unexpected(child, "simpleType")),
        }
    }
}
