//! Substitution-group membership of the top-level elements of a schema.

use tracing::warn;

use super::{
    error::{ReferenceKind, XsdError},
    forest::Forest,
    xstypes::NCName,
    Schema,
};

/// A forest over `(head, member)` pairs of element names.
///
/// Membership is one level deep: the members of a group are the elements naming its head
/// directly, not the members of groups nested below them.
#[derive(Clone, Debug, Default)]
pub struct SubstitutionGroups {
    forest: Forest<NCName>,
}

impl SubstitutionGroups {
    pub fn from_schema(schema: &Schema) -> Result<Self, XsdError> {
        let mut forest = Forest::new();
        for element in &schema.elements {
            let Some(head) = &element.substitution_group else {
                continue;
            };
            if schema.element(head).is_none() {
                return Err(XsdError::Unresolved {
                    kind: ReferenceKind::SubstitutionGroupHead,
                    name: head.clone(),
                    line: element.line,
                });
            }
            forest.add_edge(head.clone(), element.tag().to_owned());
        }

        let groups = Self { forest };
        for head in groups.heads() {
            let parent_heads: Vec<&str> = groups
                .heads()
                .into_iter()
                .filter(|other| groups.member_of(head, other))
                .collect();
            if !parent_heads.is_empty() {
                warn!(
                    head,
                    ?parent_heads,
                    "substitution group head is itself a member of another group; \
                     its members are not added to the outer group"
                );
            }
        }
        Ok(groups)
    }

    /// Every element that heads a group.
    pub fn heads(&self) -> Vec<&str> {
        self.forest
            .parent_payloads()
            .into_iter()
            .map(String::as_str)
            .collect()
    }

    pub fn is_head(&self, name: &str) -> bool {
        !self.members(name).is_empty()
    }

    /// Immediate members of the group headed by `head`, in document order.
    pub fn members(&self, head: &str) -> Vec<&str> {
        self.forest
            .children_of(&head.to_owned())
            .into_iter()
            .map(String::as_str)
            .collect()
    }

    pub fn member_of(&self, member: &str, head: &str) -> bool {
        self.forest
            .is_immediate_child(&member.to_owned(), &head.to_owned())
    }

    pub fn members_by_head(&self) -> Vec<(&str, Vec<&str>)> {
        self.forest
            .immediate_children_by_parent()
            .into_iter()
            .map(|(head, members)| {
                (
                    head.as_str(),
                    members.into_iter().map(String::as_str).collect(),
                )
            })
            .collect()
    }
}
