use crate::{Error, Node, Value};

/// Implemented by every generated struct.
pub trait ComplexType: Sized {
    /// The schema name of the type. Used as the tag when no element name is given.
    const TAG: &'static str;

    /// Extracts an instance from `node`, including every field inherited from base types.
    fn build(node: &Node) -> Result<Self, Error>;

    /// Minimal projection: absent values and empty sequences are left out.
    fn serialize(&self) -> Value;

    fn to_tree_as(&self, tag: &str) -> Node;

    fn to_tree(&self) -> Node {
        self.to_tree_as(Self::TAG)
    }

    fn from_xml(source: &str) -> Result<Self, Error> {
        Self::build(&Node::from_xml(source)?)
    }

    fn to_xml(&self, tag: &str, namespace: Option<&str>) -> Result<String, Error> {
        self.to_tree_as(tag).to_xml(namespace)
    }
}

/// Implemented by the enum generated for each substitution group.
pub trait SubstitutionGroup: Sized {
    /// Tags of the immediate members.
    const MEMBERS: &'static [&'static str];

    /// `None` when the tag of `node` is not a member of the group.
    fn build(node: &Node) -> Result<Option<Self>, Error>;

    /// The tag the value was read from, and is written back under.
    fn tag(&self) -> &'static str;

    /// `[tag, object]`.
    fn serialize(&self) -> Value;

    fn to_tree(&self) -> Node;
}
