//! Language-neutral description of the bindings to generate.

pub use xb_xsd::{Cardinality, ScalarKind, ValueKind};

pub type Name = String;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MemberOrigin {
    Attribute,
    Element,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MemberKind {
    Scalar(ScalarKind),
    Complex(Name),
    /// A reference to the head of a substitution group; holds `(tag, object)` pairs.
    Group { head: Name },
}

/// One attribute or element of a complex type, under its schema name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Member {
    pub name: Name,
    pub origin: MemberOrigin,
    pub kind: MemberKind,
    pub cardinality: Cardinality,
    pub required: bool,
}

impl Member {
    pub fn is_many(&self) -> bool {
        self.cardinality == Cardinality::Many
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeDescriptor {
    pub name: Name,
    pub base: Option<Name>,
    /// Base-most first, each with the members it declares itself.
    pub ancestors: Vec<(Name, Vec<Member>)>,
    pub members: Vec<Member>,
}

impl TypeDescriptor {
    pub fn inherited_members(&self) -> impl Iterator<Item = &Member> {
        self.ancestors.iter().flat_map(|(_, members)| members)
    }

    /// Inherited members followed by the type's own, in declaration order.
    pub fn all_members(&self) -> impl Iterator<Item = &Member> {
        self.inherited_members().chain(&self.members)
    }

    /// Constructor parameter order: every required member, then every optional one, each group
    /// ancestors first.
    pub fn signature(&self) -> Vec<&Member> {
        let (mut required, optional): (Vec<&Member>, Vec<&Member>) =
            self.all_members().partition(|member| member.required);
        required.extend(optional);
        required
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupMember {
    pub tag: Name,
    pub type_name: Name,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupDescriptor {
    pub head: Name,
    pub members: Vec<GroupMember>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElementType {
    pub tag: Name,
    pub kind: ValueKind,
}

/// Everything one schema compiles to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModuleDescriptor {
    pub name: Name,
    /// File name of the schema, for the header of the generated file.
    pub source: String,
    pub namespace: Option<String>,
    /// In emission order: every base precedes the types derived from it.
    pub types: Vec<TypeDescriptor>,
    pub element_types: Vec<ElementType>,
    pub groups: Vec<GroupDescriptor>,
}

impl ModuleDescriptor {
    pub fn group(&self, head: &str) -> Option<&GroupDescriptor> {
        self.groups.iter().find(|group| group.head == head)
    }
}
