use roxmltree::Node;

use super::{
    error::{ReferenceKind, XsdError},
    mapping_context::{boolean_attribute, line_of, schema_children, unexpected, MappingContext},
    particle::{Cardinality, Occurrence},
    simple_type_def::SimpleTypeDefinition,
    substitution_group::SubstitutionGroups,
    xstypes::{NCName, QName, ScalarKind, TypeName},
    Schema,
};

/// An element declaration, either top-level or local to a complex type's sequence.
///
/// The declaration is kept as written; [`resolve_element`] computes the view the generator needs
/// once the whole schema has been read.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElementDeclaration {
    /// Absent for references.
    pub name: Option<NCName>,
    pub reference: Option<NCName>,
    pub type_name: Option<TypeName>,
    pub occurrence: Occurrence,
    pub substitution_group: Option<NCName>,
    pub abstract_: bool,
    pub line: u32,
}

impl ElementDeclaration {
    pub const TAG_NAME: &'static str = "element";

    /// The tag this declaration stands for, whether declared directly or by reference.
    pub fn tag(&self) -> &str {
        self.name
            .as_deref()
            .or(self.reference.as_deref())
            .unwrap_or_default()
    }

    pub(super) fn map_from_xml(
        context: &mut MappingContext,
        element: Node,
        top_level: bool,
        owner: &str,
    ) -> Result<Self, XsdError> {
        let line = line_of(element);

        let name = element.attribute("name").map(|n| n.trim().to_owned());
        let reference = match element.attribute("ref") {
            Some(r) if top_level => {
                return Err(XsdError::InvalidValue {
                    attribute: "ref",
                    value: r.into(),
                    line,
                })
            }
            Some(r) => Some(QName::parse(r, element)?.local_name),
            None => None,
        };
        if name.is_none() && reference.is_none() {
            return Err(XsdError::MissingAttribute {
                attribute: "name",
                tag: Self::TAG_NAME.into(),
                line,
            });
        }

        let mut type_name = element
            .attribute("type")
            .map(|t| TypeName::parse(t, element))
            .transpose()?;

        let tag = name.as_deref().or(reference.as_deref()).unwrap_or_default();
        let context_name = format!("element {tag:?}");
        for child in schema_children(element, &context_name)? {
            match child.tag_name().name() {
                SimpleTypeDefinition::TAG_NAME if type_name.is_none() => {
                    let kind = SimpleTypeDefinition::inline_kind(context, child)?;
                    type_name = Some(TypeName::Builtin(kind));
                }
                "complexType" | "key" | "keyref" | "unique" | "alternative" => {
                    context.unsupported(child, &context_name)
                }
                _ => return Err(unexpected(child, &context_name)),
            }
        }

        let substitution_group = match element.attribute("substitutionGroup") {
            Some(_) if !top_level => {
                context.unsupported_attribute(element, "substitutionGroup", owner);
                None
            }
            Some(heads) => {
                let mut heads = heads.split_whitespace();
                let first = heads.next();
                if heads.next().is_some() {
                    context.unsupported_attribute(element, "substitutionGroup", owner);
                }
                first
                    .map(|head| QName::parse(head, element).map(|q| q.local_name))
                    .transpose()?
            }
            None => None,
        };

        Ok(Self {
            name,
            reference,
            type_name,
            occurrence: if top_level {
                Occurrence::default()
            } else {
                Occurrence::map_from_xml(element)?
            },
            substitution_group,
            abstract_: boolean_attribute(element, "abstract", false)?,
            line,
        })
    }
}

/// What an element field holds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ValueKind {
    Scalar(ScalarKind),
    Complex(NCName),
}

/// An element as the generator sees it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedElement {
    pub name: NCName,
    pub kind: ValueKind,
    pub cardinality: Cardinality,
    pub required: bool,
    /// The element refers to the head of a substitution group. Such fields are always an
    /// optional sequence of `(tag, object)` pairs.
    pub is_group_head: bool,
}

/// Resolves names, kinds and occurrence of `element` against the fully read schema.
pub fn resolve_element(
    element: &ElementDeclaration,
    schema: &Schema,
    groups: &SubstitutionGroups,
) -> Result<ResolvedElement, XsdError> {
    let referenced = element
        .reference
        .as_ref()
        .map(|name| {
            schema.element(name).ok_or_else(|| XsdError::Unresolved {
                kind: ReferenceKind::Element,
                name: name.clone(),
                line: element.line,
            })
        })
        .transpose()?;

    let name = element.tag().to_owned();
    let type_name = element
        .type_name
        .as_ref()
        .or_else(|| referenced.and_then(|r| r.type_name.as_ref()));
    let kind = schema.value_kind(type_name, element.line)?;

    let is_group_head = element
        .reference
        .as_deref()
        .map_or(false, |r| groups.is_head(r));
    let (cardinality, required) = if is_group_head {
        (Cardinality::Many, false)
    } else {
        (
            element.occurrence.cardinality(),
            element.occurrence.is_required(),
        )
    };

    Ok(ResolvedElement {
        name,
        kind,
        cardinality,
        required,
        is_group_head,
    })
}
