use std::collections::{HashMap, HashSet};

use heck::{ToPascalCase, ToSnakeCase};
use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::{parse_quote, Ident, Item, Type};

use crate::ist::{
    GroupDescriptor, Member, MemberKind, MemberOrigin, ModuleDescriptor, ScalarKind,
    TypeDescriptor, ValueKind,
};
use crate::naming::{expand_dollar, sanitize, RustFieldWords, RustTypeWords};

use super::common::{field_idents, walk, DescriptorVisitor};

fn ident(name: &str) -> Ident {
    Ident::new(name, Span::call_site())
}

fn type_ident_text(name: &str) -> String {
    sanitize(&expand_dollar(name).to_pascal_case(), &RustTypeWords)
}

fn field_ident_text(name: &str) -> String {
    sanitize(&expand_dollar(name).to_snake_case(), &RustFieldWords)
}

fn scalar_type(kind: ScalarKind) -> Type {
    match kind {
        ScalarKind::Text => parse_quote!(String),
        ScalarKind::Integer => parse_quote!(i64),
        ScalarKind::Boolean => parse_quote!(bool),
    }
}

/// The parser for a non-text scalar, as a path usable in `map`.
fn scalar_parser(kind: ScalarKind) -> Option<TokenStream> {
    match kind {
        ScalarKind::Text => None,
        ScalarKind::Integer => Some(quote!(xb_builtins::parse_integer)),
        ScalarKind::Boolean => Some(quote!(xb_builtins::parse_boolean)),
    }
}

/// Converts the literal `text` (a `&str` expression) into the field's scalar type.
fn from_text(kind: ScalarKind, text: TokenStream) -> TokenStream {
    match scalar_parser(kind) {
        Some(parser) => quote!(#parser(#text)?),
        None => quote!(#text.to_owned()),
    }
}

/// Text of a scalar held by value (`by_ref == false`) or behind a reference.
fn to_text(kind: ScalarKind, value: TokenStream, by_ref: bool) -> TokenStream {
    match kind {
        ScalarKind::Text => quote!(#value.as_str()),
        ScalarKind::Integer => quote!(#value.to_string()),
        ScalarKind::Boolean if by_ref => quote!(xb_builtins::format_boolean(*#value)),
        ScalarKind::Boolean => quote!(xb_builtins::format_boolean(#value)),
    }
}

fn to_value(kind: ScalarKind, value: TokenStream, by_ref: bool) -> TokenStream {
    match kind {
        ScalarKind::Text => quote!(xb_builtins::Value::from(#value.as_str())),
        _ if by_ref => quote!(xb_builtins::Value::from(*#value)),
        _ => quote!(xb_builtins::Value::from(#value)),
    }
}

struct RustVisitor {
    items: Vec<Item>,
    type_idents: HashMap<String, Ident>,
    group_idents: HashMap<String, Ident>,
}

impl RustVisitor {
    fn new(module: &ModuleDescriptor) -> Self {
        let mut taken = HashSet::new();
        let mut unique = |mut name: String| {
            while !taken.insert(name.clone()) {
                name.push('_');
            }
            ident(&name)
        };
        let type_idents = module
            .types
            .iter()
            .map(|t| (t.name.clone(), unique(type_ident_text(&t.name))))
            .collect();
        let group_idents = module
            .groups
            .iter()
            .map(|g| {
                let name = type_ident_text(&format!("{}Group", g.head.to_pascal_case()));
                (g.head.clone(), unique(name))
            })
            .collect();
        Self {
            items: Vec::new(),
            type_idents,
            group_idents,
        }
    }

    fn type_ident(&self, type_name: &str) -> Ident {
        self.type_idents
            .get(type_name)
            .cloned()
            .unwrap_or_else(|| ident(&type_ident_text(type_name)))
    }

    fn group_ident(&self, head: &str) -> Ident {
        self.group_idents
            .get(head)
            .cloned()
            .unwrap_or_else(|| ident(&type_ident_text(&format!("{head}Group"))))
    }

    /// The type of one item of the member: scalar, struct or group enum.
    fn item_type(&self, member: &Member) -> Type {
        match &member.kind {
            MemberKind::Scalar(kind) => scalar_type(*kind),
            MemberKind::Complex(name) => {
                let name = self.type_ident(name);
                parse_quote!(#name)
            }
            MemberKind::Group { head } => {
                let name = self.group_ident(head);
                parse_quote!(#name)
            }
        }
    }

    fn field_type(&self, member: &Member) -> Type {
        let item = self.item_type(member);
        let complex = matches!(member.kind, MemberKind::Complex(_));
        match (member.is_many(), complex, member.required) {
            (true, _, _) => parse_quote!(Vec<#item>),
            (false, true, true) => parse_quote!(Box<#item>),
            (false, true, false) => parse_quote!(Option<Box<#item>>),
            (false, false, true) => item,
            (false, false, false) => parse_quote!(Option<#item>),
        }
    }

    fn param_type(&self, member: &Member) -> Type {
        let item = self.item_type(member);
        match (member.is_many(), member.required) {
            (true, true) => parse_quote!(Vec<#item>),
            (true, false) => parse_quote!(Option<Vec<#item>>),
            (false, true) => item,
            (false, false) => parse_quote!(Option<#item>),
        }
    }

    fn field_init(member: &Member, field: &Ident) -> TokenStream {
        let complex = matches!(member.kind, MemberKind::Complex(_));
        match (member.is_many(), complex, member.required) {
            (true, _, false) => quote!(#field: #field.unwrap_or_default()),
            (false, true, true) => quote!(#field: Box::new(#field)),
            (false, true, false) => quote!(#field: #field.map(Box::new)),
            _ => quote!(#field),
        }
    }

    fn extraction(&self, member: &Member) -> TokenStream {
        let name = member.name.as_str();
        match (member.origin, &member.kind) {
            (MemberOrigin::Attribute, MemberKind::Scalar(kind)) => {
                match (member.required, scalar_parser(*kind)) {
                    (true, _) => from_text(*kind, quote!(node.required_attribute(#name)?)),
                    (false, None) => quote!(node.attribute(#name).map(str::to_owned)),
                    (false, Some(parser)) => {
                        quote!(node.attribute(#name).map(#parser).transpose()?)
                    }
                }
            }
            (_, MemberKind::Group { head }) => {
                let group = self.group_ident(head);
                quote! {
                    node.children()
                        .iter()
                        .filter_map(|child| #group::build(child).transpose())
                        .collect::<Result<Vec<_>, _>>()?
                }
            }
            (_, MemberKind::Scalar(kind)) => {
                let converted = from_text(*kind, quote!(child.text()));
                match (member.is_many(), member.required, scalar_parser(*kind)) {
                    (true, _, None) => quote! {
                        node.children_tagged(#name)
                            .map(|child| #converted)
                            .collect::<Vec<_>>()
                    },
                    (true, _, Some(parser)) => quote! {
                        node.children_tagged(#name)
                            .map(|child| #parser(child.text()))
                            .collect::<Result<Vec<_>, _>>()?
                    },
                    (false, true, _) => {
                        from_text(*kind, quote!(node.required_child(#name)?.text()))
                    }
                    (false, false, None) => quote!(node.child(#name).map(|child| #converted)),
                    (false, false, Some(parser)) => quote! {
                        node.child(#name).map(|child| #parser(child.text())).transpose()?
                    },
                }
            }
            (_, MemberKind::Complex(type_name)) => {
                let type_ident = self.type_ident(type_name);
                match (member.is_many(), member.required) {
                    (true, _) => quote! {
                        node.children_tagged(#name)
                            .map(#type_ident::build)
                            .collect::<Result<Vec<_>, _>>()?
                    },
                    (false, true) => {
                        quote!(Box::new(#type_ident::build(node.required_child(#name)?)?))
                    }
                    (false, false) => quote! {
                        node.child(#name).map(#type_ident::build).transpose()?.map(Box::new)
                    },
                }
            }
        }
    }

    fn serialization(member: &Member, field: &Ident) -> TokenStream {
        let name = member.name.as_str();
        match (&member.kind, member.is_many(), member.required) {
            (MemberKind::Scalar(kind), false, true) => {
                let value = to_value(*kind, quote!(self.#field), false);
                quote!(map.insert(#name.to_owned(), #value);)
            }
            (MemberKind::Scalar(kind), false, false) => {
                let value = to_value(*kind, quote!(value), true);
                quote! {
                    if let Some(value) = &self.#field {
                        map.insert(#name.to_owned(), #value);
                    }
                }
            }
            (MemberKind::Scalar(kind), true, _) => {
                let value = to_value(*kind, quote!(value), true);
                quote! {
                    xb_builtins::insert_non_empty(
                        &mut map,
                        #name,
                        xb_builtins::Value::Array(self.#field.iter().map(|value| #value).collect()),
                    );
                }
            }
            (_, true, _) => quote! {
                xb_builtins::insert_non_empty(
                    &mut map,
                    #name,
                    xb_builtins::Value::Array(
                        self.#field.iter().map(|value| value.serialize()).collect(),
                    ),
                );
            },
            (_, false, true) => quote! {
                xb_builtins::insert_non_empty(&mut map, #name, self.#field.serialize());
            },
            (_, false, false) => quote! {
                if let Some(value) = &self.#field {
                    xb_builtins::insert_non_empty(&mut map, #name, value.serialize());
                }
            },
        }
    }

    fn re_emission(member: &Member, field: &Ident) -> TokenStream {
        let name = member.name.as_str();
        match (member.origin, &member.kind, member.is_many(), member.required) {
            (MemberOrigin::Attribute, MemberKind::Scalar(kind), _, true) => {
                let text = to_text(*kind, quote!(self.#field), false);
                quote!(node.set_attribute(#name, #text);)
            }
            (MemberOrigin::Attribute, MemberKind::Scalar(kind), _, false) => {
                let text = to_text(*kind, quote!(value), true);
                quote! {
                    if let Some(value) = &self.#field {
                        node.set_attribute(#name, #text);
                    }
                }
            }
            (_, MemberKind::Group { .. }, _, _) => quote! {
                for value in &self.#field {
                    node.push_child(value.to_tree());
                }
            },
            (_, MemberKind::Scalar(kind), true, _) => {
                let text = to_text(*kind, quote!(value), true);
                quote! {
                    for value in &self.#field {
                        node.push_child(xb_builtins::Node::with_text(#name, #text));
                    }
                }
            }
            (_, MemberKind::Scalar(kind), false, true) => {
                let text = to_text(*kind, quote!(self.#field), false);
                quote!(node.push_child(xb_builtins::Node::with_text(#name, #text));)
            }
            (_, MemberKind::Scalar(kind), false, false) => {
                let text = to_text(*kind, quote!(value), true);
                quote! {
                    if let Some(value) = &self.#field {
                        node.push_child(xb_builtins::Node::with_text(#name, #text));
                    }
                }
            }
            (_, MemberKind::Complex(_), true, _) => quote! {
                for value in &self.#field {
                    node.push_child(value.to_tree_as(#name));
                }
            },
            (_, MemberKind::Complex(_), false, true) => {
                quote!(node.push_child(self.#field.to_tree_as(#name));)
            }
            (_, MemberKind::Complex(_), false, false) => quote! {
                if let Some(value) = &self.#field {
                    node.push_child(value.to_tree_as(#name));
                }
            },
        }
    }
}

impl DescriptorVisitor for RustVisitor {
    fn start(&mut self, _module: &ModuleDescriptor) {
        self.items.push(parse_quote! {
            #[allow(unused_imports)]
            use xb_builtins::meta::{ComplexType as _, SubstitutionGroup as _};
        });
    }

    fn visit_type(&mut self, _module: &ModuleDescriptor, type_descriptor: &TypeDescriptor) {
        let name = self.type_ident(&type_descriptor.name);
        let tag = type_descriptor.name.as_str();
        let all: Vec<&Member> = type_descriptor.all_members().collect();
        let fields: Vec<Ident> = field_idents(all.iter().copied(), field_ident_text)
            .iter()
            .map(|text| ident(text))
            .collect();
        let field_of = |member: &Member| {
            all.iter()
                .position(|m| std::ptr::eq(*m, member))
                .map(|index| fields[index].clone())
        };

        let field_types = all.iter().map(|member| self.field_type(member));
        let struct_item: Item = parse_quote! {
            #[derive(Debug, Clone, PartialEq, Eq)]
            #[allow(non_camel_case_types)]
            pub struct #name {
                #(pub #fields: #field_types,)*
            }
        };
        self.items.push(struct_item);

        let signature = type_descriptor.signature();
        let params = signature.iter().filter_map(|member| {
            let field = field_of(member)?;
            let param_type = self.param_type(member);
            Some(quote!(#field: #param_type))
        });
        let inits = all
            .iter()
            .zip(&fields)
            .map(|(member, field)| Self::field_init(member, field));
        let constructor: Item = parse_quote! {
            #[allow(clippy::too_many_arguments, clippy::new_without_default)]
            impl #name {
                pub fn new(#(#params),*) -> Self {
                    Self {
                        #(#inits,)*
                    }
                }
            }
        };
        self.items.push(constructor);

        let mut extractions = Vec::new();
        let mut index = 0;
        for (ancestor, members) in &type_descriptor.ancestors {
            if members.is_empty() {
                continue;
            }
            let ancestor = self.type_ident(ancestor);
            extractions.push(quote!(let base = #ancestor::build(node)?;));
            for field in &fields[index..index + members.len()] {
                extractions.push(quote!(let #field = base.#field;));
            }
            index += members.len();
        }
        for (member, field) in type_descriptor.members.iter().zip(&fields[index..]) {
            let value = self.extraction(member);
            extractions.push(quote!(let #field = #value;));
        }
        if all.is_empty() {
            extractions.push(quote!(let _ = node;));
        }

        let serializations = all
            .iter()
            .zip(&fields)
            .map(|(member, field)| Self::serialization(member, field));
        let attributes = all
            .iter()
            .zip(&fields)
            .filter(|(member, _)| member.origin == MemberOrigin::Attribute)
            .map(|(member, field)| Self::re_emission(member, field));
        let children = all
            .iter()
            .zip(&fields)
            .filter(|(member, _)| member.origin == MemberOrigin::Element)
            .map(|(member, field)| Self::re_emission(member, field));
        let mutable = (!all.is_empty()).then(|| quote!(mut));

        let complex_type_impl: Item = parse_quote! {
            impl xb_builtins::meta::ComplexType for #name {
                const TAG: &'static str = #tag;

                fn build(node: &xb_builtins::Node) -> Result<Self, xb_builtins::Error> {
                    #(#extractions)*
                    Ok(Self {
                        #(#fields,)*
                    })
                }

                fn serialize(&self) -> xb_builtins::Value {
                    let #mutable map = xb_builtins::Map::new();
                    #(#serializations)*
                    xb_builtins::Value::Object(map)
                }

                fn to_tree_as(&self, tag: &str) -> xb_builtins::Node {
                    let #mutable node = xb_builtins::Node::new(tag);
                    #(#attributes)*
                    #(#children)*
                    node
                }
            }
        };
        self.items.push(complex_type_impl);
    }

    fn visit_group(&mut self, _module: &ModuleDescriptor, group: &GroupDescriptor) {
        let name = self.group_ident(&group.head);

        let mut taken = HashSet::new();
        let variants: Vec<Ident> = group
            .members
            .iter()
            .map(|member| {
                let mut variant = type_ident_text(&member.tag);
                while !taken.insert(variant.clone()) {
                    variant.push('_');
                }
                ident(&variant)
            })
            .collect();
        let types: Vec<Ident> = group
            .members
            .iter()
            .map(|member| self.type_ident(&member.type_name))
            .collect();
        let tags: Vec<&str> = group.members.iter().map(|m| m.tag.as_str()).collect();

        self.items.push(parse_quote! {
            #[derive(Debug, Clone, PartialEq, Eq)]
            #[allow(non_camel_case_types)]
            pub enum #name {
                #(#variants(#types),)*
            }
        });

        let group_impl: Item = if variants.is_empty() {
            parse_quote! {
                impl xb_builtins::meta::SubstitutionGroup for #name {
                    const MEMBERS: &'static [&'static str] = &[];

                    fn build(_node: &xb_builtins::Node) -> Result<Option<Self>, xb_builtins::Error> {
                        Ok(None)
                    }

                    fn tag(&self) -> &'static str {
                        match *self {}
                    }

                    fn serialize(&self) -> xb_builtins::Value {
                        match *self {}
                    }

                    fn to_tree(&self) -> xb_builtins::Node {
                        match *self {}
                    }
                }
            }
        } else {
            parse_quote! {
                impl xb_builtins::meta::SubstitutionGroup for #name {
                    const MEMBERS: &'static [&'static str] = &[#(#tags),*];

                    fn build(node: &xb_builtins::Node) -> Result<Option<Self>, xb_builtins::Error> {
                        Ok(Some(match node.tag() {
                            #(#tags => Self::#variants(#types::build(node)?),)*
                            _ => return Ok(None),
                        }))
                    }

                    fn tag(&self) -> &'static str {
                        match self {
                            #(Self::#variants(_) => #tags,)*
                        }
                    }

                    fn serialize(&self) -> xb_builtins::Value {
                        let (tag, value) = match self {
                            #(Self::#variants(value) => (#tags, value.serialize()),)*
                        };
                        xb_builtins::Value::Array(vec![xb_builtins::Value::from(tag), value])
                    }

                    fn to_tree(&self) -> xb_builtins::Node {
                        match self {
                            #(Self::#variants(value) => value.to_tree_as(#tags),)*
                        }
                    }
                }
            }
        };
        self.items.push(group_impl);
    }

    fn finish(mut self, module: &ModuleDescriptor) -> String {
        let element_types = module.element_types.iter().map(|element| {
            let tag = element.tag.as_str();
            let type_name = match &element.kind {
                ValueKind::Complex(type_name) => self.type_ident(type_name).to_string(),
                ValueKind::Scalar(kind) => kind.to_string(),
            };
            quote!((#tag, #type_name))
        });
        let groups = module.groups.iter().map(|group| {
            let head = group.head.as_str();
            let tags = group.members.iter().map(|m| m.tag.as_str());
            quote!((#head, &[#(#tags),*]))
        });
        let namespace = match &module.namespace {
            Some(namespace) => quote!(Some(#namespace)),
            None => quote!(None),
        };
        let tables: Vec<Item> = vec![
            parse_quote! {
                /// Top-level element tags with the type (or scalar kind) of their content.
                pub const ELEMENT_TYPES: &[(&str, &str)] = &[#(#element_types),*];
            },
            parse_quote! {
                /// Substitution group heads with the tags of their immediate members.
                pub const SUBSTITUTION_GROUPS: &[(&str, &[&str])] = &[#(#groups),*];
            },
            parse_quote! {
                pub const NAMESPACE: Option<&str> = #namespace;
            },
        ];
        self.items.extend(tables);

        // No inner attributes, so that the output can be `include!`d.
        let file = syn::File {
            shebang: None,
            attrs: Vec::new(),
            items: self.items,
        };
        format!(
            "// Generated by {} {} from {}. Do not edit.\n\n{}",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION"),
            module.source,
            prettyplease::unparse(&file)
        )
    }
}

pub fn generate(module: &ModuleDescriptor) -> String {
    walk(RustVisitor::new(module), module)
}

#[cfg(test)]
mod tests {
    use super::super::common::tests::{describe, HIERARCHY};
    use super::*;

    fn item_source(item: TokenStream) -> String {
        let item: Item = syn::parse2(item).unwrap();
        prettyplease::unparse(&syn::File {
            shebang: None,
            attrs: Vec::new(),
            items: vec![item],
        })
    }

    /// Drops all whitespace so that assertions do not depend on the printer's line breaks.
    fn squash(source: &str) -> String {
        source.split_whitespace().collect()
    }

    #[test]
    fn output_parses_as_rust() {
        let source = generate(&describe(HIERARCHY));
        assert!(source.starts_with("// Generated by xb-generator "));
        let file = syn::parse_file(&source).unwrap();
        assert!(file.attrs.is_empty());
    }

    #[test]
    fn struct_flattens_ancestor_fields() {
        let source = squash(&generate(&describe(HIERARCHY)));
        let expected = squash(&item_source(quote! {
            #[derive(Debug, Clone, PartialEq, Eq)]
            #[allow(non_camel_case_types)]
            pub struct Child {
                pub aa: String,
                pub bb: String,
                pub x: i64,
                pub val: Option<bool>,
                pub y: String,
                pub cnt: Option<i64>,
                pub id: String,
                pub name: String,
                pub tokens: Vec<String>,
                pub sub_elems: Vec<Process>,
            }
        }));
        assert!(source.contains(&expected), "{source}");
    }

    #[test]
    fn constructor_orders_required_first() {
        let source = squash(&generate(&describe(HIERARCHY)));
        assert!(source.contains(&squash(
            "pub fn new( aa: String, bb: String, x: i64, y: String, id: String, name: String, \
             val: Option<bool>, cnt: Option<i64>, tokens: Option<Vec<String>>, \
             sub_elems: Option<Vec<Process>>, ) -> Self"
        )));
        assert!(source.contains(&squash("tokens: tokens.unwrap_or_default()")));
        assert!(source.contains(&squash("sub_process: sub_process.map(Box::new)")));
    }

    #[test]
    fn builder_reads_ancestors_then_own_members() {
        let source = squash(&generate(&describe(HIERARCHY)));
        for line in [
            "let base = GrandParent::build(node)?; let aa = base.aa; let bb = base.bb; \
             let base = Parent::build(node)?; let x = base.x;",
            "let x = xb_builtins::parse_integer(node.required_attribute(\"x\")?)?;",
            "let val = node.attribute(\"val\").map(xb_builtins::parse_boolean).transpose()?;",
            "let y = node.required_child(\"y\")?.text().to_owned();",
            "let id = node.required_attribute(\"id\")?.to_owned();",
            "let sub_process = node.child(\"subProcess\").map(Process::build).transpose()?.map(Box::new);",
            ".filter_map(|child| FlowElementGroup::build(child).transpose())",
        ] {
            assert!(source.contains(&squash(line)), "missing {line}");
        }
    }

    #[test]
    fn projection_and_re_emission_use_schema_names() {
        let source = squash(&generate(&describe(HIERARCHY)));
        for line in [
            "map.insert(\"aa\".to_owned(), xb_builtins::Value::from(self.aa.as_str()));",
            "xb_builtins::insert_non_empty(&mut map, \"subProcess\", value.serialize());",
            "node.set_attribute(\"x\", self.x.to_string());",
            "node.set_attribute(\"val\", xb_builtins::format_boolean(*value));",
            "node.push_child(value.to_tree_as(\"sub_elems\"));",
            "node.push_child(value.to_tree());",
        ] {
            assert!(source.contains(&squash(line)), "missing {line}");
        }
    }

    #[test]
    fn substitution_group_enum_and_tables() {
        let source = squash(&generate(&describe(HIERARCHY)));
        for line in [
            "pub enum FlowElementGroup { Task(TTask), Gateway(TGateway), }",
            "const MEMBERS: &'static [&'static str] = &[\"task\", \"gateway\"];",
            "\"task\" => Self::Task(TTask::build(node)?),",
            "pub const SUBSTITUTION_GROUPS: &[(&str, &[&str])] = &[(\"flowElement\", &[\"task\", \"gateway\"])];",
            "(\"note\", \"text\")",
            "pub const NAMESPACE: Option<&str> = Some(\"urn:example:hierarchy\");",
        ] {
            assert!(source.contains(&squash(line)), "missing {line}");
        }
    }

    #[test]
    fn identifiers_are_sanitized() {
        let source = generate(&describe(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:complexType name="Option">
    <xs:attribute name="type" type="xs:string"/>
    <xs:attribute name="node" type="xs:string"/>
  </xs:complexType>
  <xs:complexType name="option">
    <xs:sequence>
      <xs:element name="type" type="xs:string"/>
    </xs:sequence>
  </xs:complexType>
</xs:schema>"#,
        ));
        let source = squash(&source);
        for line in [
            "pub struct Option_ { pub type_: Option<String>, pub node_: Option<String>, }",
            "pub struct Option__ { pub type_: String, }",
            "pub const NAMESPACE: Option<&str> = None;",
            "pub const SUBSTITUTION_GROUPS: &[(&str, &[&str])] = &[];",
        ] {
            assert!(source.contains(&squash(line)), "missing {line}");
        }
    }
}
