use std::collections::{HashMap, HashSet};

use tracing::warn;
use xb_xsd::{resolve_element, DerivationIndex, Schema, SubstitutionGroups, ValueKind, XsdError};

use crate::ist::{
    Cardinality, ElementType, GroupDescriptor, GroupMember, Member, MemberKind, MemberOrigin,
    ModuleDescriptor, Name, TypeDescriptor,
};

/// Called once per type, in emission order, and once per substitution group.
pub(super) trait DescriptorVisitor: Sized {
    fn start(&mut self, module: &ModuleDescriptor);

    fn visit_type(&mut self, module: &ModuleDescriptor, type_descriptor: &TypeDescriptor);

    fn visit_group(&mut self, module: &ModuleDescriptor, group: &GroupDescriptor);

    fn finish(self, module: &ModuleDescriptor) -> String;
}

pub(super) fn walk(mut visitor: impl DescriptorVisitor, module: &ModuleDescriptor) -> String {
    visitor.start(module);
    for type_descriptor in &module.types {
        visitor.visit_type(module, type_descriptor);
    }
    for group in &module.groups {
        visitor.visit_group(module, group);
    }
    visitor.finish(module)
}

/// The schema together with its derivation and substitution-group indices.
pub struct GeneratorContext<'a> {
    schema: &'a Schema,
    derivation: DerivationIndex,
    groups: SubstitutionGroups,
}

impl<'a> GeneratorContext<'a> {
    pub fn new(schema: &'a Schema) -> Result<Self, XsdError> {
        Ok(Self {
            schema,
            derivation: DerivationIndex::from_schema(schema)?,
            groups: SubstitutionGroups::from_schema(schema)?,
        })
    }

    /// Resolves every element and lays the schema out for emission.
    pub fn describe(
        &self,
        name: &str,
        source: &str,
        namespace: Option<&str>,
    ) -> Result<ModuleDescriptor, XsdError> {
        let mut own_members = HashMap::new();
        for complex_type in &self.schema.complex_types {
            own_members.insert(complex_type.name.as_str(), self.own_members(&complex_type.name)?);
        }

        let types = self
            .derivation
            .emission_order()
            .into_iter()
            .filter_map(|type_name| {
                let complex_type = self.schema.complex_type(type_name)?;
                let ancestors = self
                    .derivation
                    .ancestor_chain(type_name)
                    .into_iter()
                    .map(|ancestor| {
                        let members = own_members.get(ancestor).cloned().unwrap_or_default();
                        (ancestor.to_owned(), members)
                    })
                    .collect();
                Some(TypeDescriptor {
                    name: type_name.to_owned(),
                    base: complex_type.base.clone(),
                    ancestors,
                    members: own_members.get(type_name).cloned().unwrap_or_default(),
                })
            })
            .collect();

        let element_types = self
            .schema
            .elements
            .iter()
            .map(|element| {
                Ok(ElementType {
                    tag: element.tag().to_owned(),
                    kind: self
                        .schema
                        .value_kind(element.type_name.as_ref(), element.line)?,
                })
            })
            .collect::<Result<_, XsdError>>()?;

        let groups = self
            .groups
            .members_by_head()
            .into_iter()
            .map(|(head, tags)| self.describe_group(head, &tags))
            .collect::<Result<_, _>>()?;

        Ok(ModuleDescriptor {
            name: name.to_owned(),
            source: source.to_owned(),
            namespace: namespace
                .map(str::to_owned)
                .or_else(|| self.schema.target_namespace.clone()),
            types,
            element_types,
            groups,
        })
    }

    /// Attributes in declaration order, followed by elements in declaration order.
    fn own_members(&self, type_name: &str) -> Result<Vec<Member>, XsdError> {
        let Some(complex_type) = self.schema.complex_type(type_name) else {
            return Ok(Vec::new());
        };

        let mut members: Vec<Member> = complex_type
            .attributes
            .iter()
            .map(|attribute| Member {
                name: attribute.name.clone(),
                origin: MemberOrigin::Attribute,
                kind: MemberKind::Scalar(attribute.kind),
                cardinality: Cardinality::Single,
                required: attribute.required,
            })
            .collect();

        for element in &complex_type.elements {
            let resolved = resolve_element(element, self.schema, &self.groups)?;
            let kind = match resolved.kind {
                _ if resolved.is_group_head => MemberKind::Group {
                    head: resolved.name.clone(),
                },
                ValueKind::Scalar(kind) => MemberKind::Scalar(kind),
                ValueKind::Complex(name) => MemberKind::Complex(name),
            };
            members.push(Member {
                name: resolved.name,
                origin: MemberOrigin::Element,
                kind,
                cardinality: resolved.cardinality,
                required: resolved.required,
            });
        }
        Ok(members)
    }

    fn describe_group(&self, head: &str, tags: &[&str]) -> Result<GroupDescriptor, XsdError> {
        let mut members = Vec::new();
        for &tag in tags {
            let Some(element) = self.schema.element(tag) else {
                continue;
            };
            match self
                .schema
                .value_kind(element.type_name.as_ref(), element.line)?
            {
                ValueKind::Complex(type_name) => members.push(GroupMember {
                    tag: tag.to_owned(),
                    type_name,
                }),
                ValueKind::Scalar(kind) => warn!(
                    line = element.line,
                    "substitution group member {tag:?} of {head:?} has scalar type {kind}, skipped"
                ),
            }
        }
        Ok(GroupDescriptor {
            head: head.to_owned(),
            members,
        })
    }
}

/// Assigns each member a distinct identifier, in order.
///
/// Later members never rename earlier ones, so a base type's identifiers are a prefix of those of
/// every type derived from it. On a clash an attribute first tries an `_attr` suffix; after that a
/// counter is appended.
pub(super) fn field_idents<'m>(
    members: impl IntoIterator<Item = &'m Member>,
    ident: impl Fn(&str) -> String,
) -> Vec<Name> {
    let mut taken = HashSet::new();
    let mut idents = Vec::new();
    for member in members {
        let base = ident(&member.name);
        let mut candidate = base.clone();
        if taken.contains(&candidate) && member.origin == MemberOrigin::Attribute {
            candidate = ident(&format!("{base}_attr"));
        }
        let mut counter = 2;
        while taken.contains(&candidate) {
            candidate = ident(&format!("{base}_{counter}"));
            counter += 1;
        }
        taken.insert(candidate.clone());
        idents.push(candidate);
    }
    idents
}

#[cfg(test)]
pub(super) mod tests {
    use super::*;
    use crate::ist::ScalarKind;

    pub(crate) const HIERARCHY: &str = r#"<?xml version="1.0"?>
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
           xmlns="urn:example:hierarchy"
           targetNamespace="urn:example:hierarchy">
  <xs:complexType name="GrandParent">
    <xs:attribute name="aa" type="xs:string" use="required"/>
    <xs:attribute name="bb" type="xs:string" use="required"/>
  </xs:complexType>
  <xs:complexType name="Parent">
    <xs:complexContent>
      <xs:extension base="GrandParent">
        <xs:sequence>
          <xs:element name="y" type="xs:string"/>
          <xs:element name="cnt" type="xs:integer" minOccurs="0"/>
        </xs:sequence>
        <xs:attribute name="x" type="xs:integer" use="required"/>
        <xs:attribute name="val" type="xs:boolean"/>
      </xs:extension>
    </xs:complexContent>
  </xs:complexType>
  <xs:complexType name="Child">
    <xs:complexContent>
      <xs:extension base="Parent">
        <xs:sequence>
          <xs:element name="name" type="xs:string"/>
          <xs:element name="tokens" type="xs:string" minOccurs="0" maxOccurs="unbounded"/>
          <xs:element name="sub_elems" type="Process" minOccurs="0" maxOccurs="unbounded"/>
        </xs:sequence>
        <xs:attribute name="id" type="xs:string" use="required"/>
      </xs:extension>
    </xs:complexContent>
  </xs:complexType>
  <xs:complexType name="tFlowElement" abstract="true">
    <xs:attribute name="label" type="xs:string"/>
  </xs:complexType>
  <xs:complexType name="tTask">
    <xs:complexContent>
      <xs:extension base="tFlowElement">
        <xs:attribute name="priority" type="xs:integer"/>
      </xs:extension>
    </xs:complexContent>
  </xs:complexType>
  <xs:complexType name="tGateway">
    <xs:complexContent>
      <xs:extension base="tFlowElement">
        <xs:attribute name="direction" type="xs:string"/>
      </xs:extension>
    </xs:complexContent>
  </xs:complexType>
  <xs:complexType name="Process">
    <xs:sequence>
      <xs:element name="step" type="xs:string" minOccurs="0"/>
      <xs:element ref="flowElement" minOccurs="0" maxOccurs="unbounded"/>
      <xs:element name="subProcess" type="Process" minOccurs="0"/>
    </xs:sequence>
    <xs:attribute name="label" type="xs:string"/>
  </xs:complexType>
  <xs:element name="child" type="Child"/>
  <xs:element name="process" type="Process"/>
  <xs:element name="flowElement" type="tFlowElement" abstract="true"/>
  <xs:element name="task" type="tTask" substitutionGroup="flowElement"/>
  <xs:element name="gateway" type="tGateway" substitutionGroup="flowElement"/>
  <xs:element name="note" type="xs:string"/>
</xs:schema>
"#;

    pub(crate) fn describe(source: &str) -> ModuleDescriptor {
        let document = roxmltree::Document::parse(source).unwrap();
        let schema = xb_xsd::read_schema(&document).unwrap();
        GeneratorContext::new(&schema)
            .unwrap()
            .describe("hierarchy", "hierarchy.xsd", None)
            .unwrap()
    }

    fn type_named<'m>(module: &'m ModuleDescriptor, name: &str) -> &'m TypeDescriptor {
        module.types.iter().find(|t| t.name == name).unwrap()
    }

    #[test]
    fn types_follow_derivation_order() {
        let module = describe(HIERARCHY);
        let order: Vec<&str> = module.types.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(
            order,
            ["GrandParent", "Parent", "Child", "tFlowElement", "tTask", "tGateway", "Process"]
        );
        assert_eq!(module.namespace.as_deref(), Some("urn:example:hierarchy"));
    }

    #[test]
    fn signature_puts_required_before_optional() {
        let module = describe(HIERARCHY);
        let child = type_named(&module, "Child");
        let names: Vec<&str> = child
            .signature()
            .into_iter()
            .map(|m| m.name.as_str())
            .collect();
        assert_eq!(
            names,
            ["aa", "bb", "x", "y", "id", "name", "val", "cnt", "tokens", "sub_elems"]
        );
        let ancestors: Vec<&str> = child.ancestors.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(ancestors, ["GrandParent", "Parent"]);
    }

    #[test]
    fn members_carry_kind_and_cardinality() {
        let module = describe(HIERARCHY);
        let parent = type_named(&module, "Parent");
        let x = parent.members.iter().find(|m| m.name == "x").unwrap();
        assert_eq!(x.kind, MemberKind::Scalar(ScalarKind::Integer));
        assert_eq!(x.origin, MemberOrigin::Attribute);
        assert!(x.required);

        let process = type_named(&module, "Process");
        let flow = &process.members[2];
        assert_eq!(flow.name, "flowElement");
        assert_eq!(
            flow.kind,
            MemberKind::Group {
                head: "flowElement".into()
            }
        );
        assert_eq!(flow.cardinality, Cardinality::Many);
        assert!(!flow.required);
        assert_eq!(process.members[3].kind, MemberKind::Complex("Process".into()));
    }

    #[test]
    fn module_tables() {
        let module = describe(HIERARCHY);
        assert_eq!(module.groups.len(), 1);
        let group = module.group("flowElement").unwrap();
        let tags: Vec<(&str, &str)> = group
            .members
            .iter()
            .map(|m| (m.tag.as_str(), m.type_name.as_str()))
            .collect();
        assert_eq!(tags, [("task", "tTask"), ("gateway", "tGateway")]);

        let note = module.element_types.iter().find(|e| e.tag == "note").unwrap();
        assert_eq!(note.kind, ValueKind::Scalar(ScalarKind::Text));
    }

    #[test]
    fn namespace_override_wins() {
        let document = roxmltree::Document::parse(HIERARCHY).unwrap();
        let schema = xb_xsd::read_schema(&document).unwrap();
        let module = GeneratorContext::new(&schema)
            .unwrap()
            .describe("hierarchy", "hierarchy.xsd", Some("urn:other"))
            .unwrap();
        assert_eq!(module.namespace.as_deref(), Some("urn:other"));
    }

    #[test]
    fn clashing_identifiers_are_disambiguated() {
        let member = |name: &str, origin| Member {
            name: name.into(),
            origin,
            kind: MemberKind::Scalar(ScalarKind::Text),
            cardinality: Cardinality::Single,
            required: false,
        };
        let members = [
            member("a-b", MemberOrigin::Element),
            member("a_b", MemberOrigin::Attribute),
            member("a.b", MemberOrigin::Element),
            member("a b", MemberOrigin::Attribute),
        ];
        let idents = field_idents(&members, |name| name.replace(['-', '.', ' '], "_"));
        assert_eq!(idents, ["a_b", "a_b_attr", "a_b_2", "a_b_3"]);
    }
}
