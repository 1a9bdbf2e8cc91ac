use std::collections::{HashMap, HashSet};

use crate::ist::{
    GroupDescriptor, Member, MemberKind, MemberOrigin, ModuleDescriptor, ScalarKind,
    TypeDescriptor, ValueKind,
};
use crate::naming::{sanitize, PythonReservedWords, ReservedWords};

use super::common::{field_idents, walk, DescriptorVisitor};

const MAX_LINE: usize = 80;
const CONTINUATION_INDENT: usize = 8;

const PROLOGUE: &str = r#"

def tag(nd):
    if not isinstance(nd.tag, str):
        return None
    return et.QName(nd).localname


def text(nd):
    if nd is None:
        return None
    return (nd.text or '').strip()


def child(nd, name):
    return next((k for k in nd if tag(k) == name), None)


def children(nd, name):
    return [k for k in nd if tag(k) == name]


def build_opt(klass, nd):
    return None if nd is None else klass.build(nd)


def py_int(s):
    return None if s is None else int(s)


def py_bool(s):
    return None if s is None else s.strip() in ('true', '1')


def xml_bool(b):
    return 'true' if b else 'false'


def qualify(name):
    if NAMESPACE is None:
        return name
    return '{%s}%s' % (NAMESPACE, name)


def nsmap():
    return None if NAMESPACE is None else {None: NAMESPACE}


def leaf(name, s):
    nd = et.Element(qualify(name))
    nd.text = s
    return nd
"#;

/// Python reserved words plus the class names of the module, which `build` must not shadow with
/// its locals.
struct ModuleScope {
    class_names: HashSet<String>,
}

impl ReservedWords for ModuleScope {
    fn is_reserved(&self, ident: &str) -> bool {
        PythonReservedWords.is_reserved(ident) || self.class_names.contains(ident)
    }
}

struct PythonVisitor {
    out: String,
    class_names: HashMap<String, String>,
    scope: ModuleScope,
    member_table: Vec<String>,
}

impl PythonVisitor {
    fn new(module: &ModuleDescriptor) -> Self {
        let mut class_names = HashMap::new();
        let mut taken = HashSet::new();
        for type_descriptor in &module.types {
            let mut class_name = sanitize(&type_descriptor.name, &PythonReservedWords);
            while !taken.insert(class_name.clone()) {
                class_name.push('_');
            }
            class_names.insert(type_descriptor.name.clone(), class_name);
        }
        Self {
            out: String::new(),
            scope: ModuleScope {
                class_names: taken,
            },
            class_names,
            member_table: Vec::new(),
        }
    }

    fn line(&mut self, indent: usize, text: impl AsRef<str>) {
        let text = text.as_ref();
        if !text.is_empty() {
            self.out.extend(std::iter::repeat(' ').take(indent));
            self.out.push_str(text);
        }
        self.out.push('\n');
    }

    fn class_name<'s>(&'s self, type_name: &'s str) -> &'s str {
        self.class_names
            .get(type_name)
            .map_or(type_name, String::as_str)
    }

    fn idents<'m>(&self, members: impl IntoIterator<Item = &'m Member>) -> Vec<String> {
        field_idents(members, |name| sanitize(name, &self.scope))
    }

    fn emit_init(&mut self, type_descriptor: &TypeDescriptor) {
        let all: Vec<&Member> = type_descriptor.all_members().collect();
        let idents = self.idents(all.iter().copied());
        let ident_of = |member: &Member| {
            let index = all
                .iter()
                .position(|m| std::ptr::eq(*m, member))
                .unwrap_or_default();
            idents[index].clone()
        };

        let mut params = vec!["self".to_owned()];
        let mut super_args = Vec::new();
        for member in type_descriptor.signature() {
            let ident = ident_of(member);
            let inherited = !type_descriptor.members.iter().any(|m| std::ptr::eq(m, member));
            if member.required {
                params.push(ident.clone());
                if inherited {
                    super_args.push(ident);
                }
            } else {
                params.push(format!("{ident}=None"));
                if inherited {
                    super_args.push(format!("{ident}={ident}"));
                }
            }
        }

        for line in wrap_call(4, "def __init__", &params, ":") {
            self.line(0, line);
        }
        if type_descriptor.base.is_some() {
            for line in wrap_call(8, "super().__init__", &super_args, "") {
                self.line(0, line);
            }
        } else if type_descriptor.members.is_empty() {
            self.line(8, "pass");
        }
        for member in &type_descriptor.members {
            let ident = ident_of(member);
            if member.is_many() && !member.required {
                self.line(8, format!("self.{ident} = []"));
                self.line(8, format!("if {ident} is not None:"));
                self.line(12, format!("self.{ident} = {ident}"));
            } else {
                self.line(8, format!("self.{ident} = {ident}"));
            }
        }
        self.line(0, "");
    }

    fn emit_build(&mut self, type_descriptor: &TypeDescriptor) {
        let all: Vec<&Member> = type_descriptor.all_members().collect();
        let idents = self.idents(all.iter().copied());
        let mut index = 0;

        self.line(4, "@classmethod");
        self.line(4, "def build(cls, nd):");
        for (ancestor, members) in &type_descriptor.ancestors {
            if members.is_empty() {
                continue;
            }
            let class_name = self.class_name(ancestor).to_owned();
            self.line(8, format!("_x = {class_name}.build(nd)"));
            for _ in members {
                let ident = &idents[index];
                self.line(8, format!("{ident} = _x.{ident}"));
                index += 1;
            }
        }
        for member in &type_descriptor.members {
            let ident = idents[index].clone();
            let value = self.extraction(member);
            self.line(8, format!("{ident} = {value}"));
            index += 1;
        }

        let args: Vec<String> = type_descriptor
            .signature()
            .into_iter()
            .filter_map(|member| all.iter().position(|m| std::ptr::eq(*m, member)))
            .map(|position| format!("{0}={0}", idents[position]))
            .collect();
        for line in wrap_call(8, "return cls", &args, "") {
            self.line(0, line);
        }
        self.line(0, "");
    }

    fn extraction(&self, member: &Member) -> String {
        let name = py_str(&member.name);
        match (&member.origin, &member.kind, member.is_many()) {
            (MemberOrigin::Attribute, MemberKind::Scalar(kind), _) => {
                convert(*kind, &format!("nd.get({name})"))
            }
            (_, MemberKind::Group { head }, _) => format!(
                "[(tag(k), klasses[tag(k)].build(k)) for k in nd if tag(k) in members[{}]]",
                py_str(head)
            ),
            (_, MemberKind::Scalar(kind), false) => {
                convert(*kind, &format!("text(child(nd, {name}))"))
            }
            (_, MemberKind::Scalar(kind), true) => format!(
                "[{} for k in children(nd, {name})]",
                convert(*kind, "text(k)")
            ),
            (_, MemberKind::Complex(type_name), false) => format!(
                "build_opt({}, child(nd, {name}))",
                self.class_name(type_name)
            ),
            (_, MemberKind::Complex(type_name), true) => format!(
                "[{}.build(k) for k in children(nd, {name})]",
                self.class_name(type_name)
            ),
        }
    }

    fn emit_serialize(&mut self, type_descriptor: &TypeDescriptor, own_idents: &[String]) {
        self.line(4, "def serialize(self):");
        if type_descriptor.base.is_some() {
            self.line(8, "d = super().serialize()");
        } else {
            self.line(8, "d = {}");
        }
        for (member, ident) in type_descriptor.members.iter().zip(own_idents) {
            let key = format!("d[{}]", py_str(&member.name));
            match (&member.kind, member.is_many()) {
                (MemberKind::Group { .. }, _) => {
                    self.line(8, format!("if self.{ident}:"));
                    self.line(
                        12,
                        format!("{key} = [[k, v.serialize()] for k, v in self.{ident}]"),
                    );
                }
                (MemberKind::Scalar(_), true) => {
                    self.line(8, format!("if self.{ident}:"));
                    self.line(12, format!("{key} = list(self.{ident})"));
                }
                (MemberKind::Complex(_), true) => {
                    self.line(8, format!("if self.{ident}:"));
                    self.line(12, format!("{key} = [v.serialize() for v in self.{ident}]"));
                }
                (MemberKind::Scalar(_), false) => {
                    self.line(8, format!("if self.{ident} is not None:"));
                    self.line(12, format!("{key} = self.{ident}"));
                }
                (MemberKind::Complex(_), false) => {
                    self.line(8, format!("if self.{ident} is not None:"));
                    self.line(12, format!("v = self.{ident}.serialize()"));
                    self.line(12, "if v:");
                    self.line(16, format!("{key} = v"));
                }
            }
        }
        self.line(8, "return d");
        self.line(0, "");
    }

    fn emit_tree_attrs(&mut self, type_descriptor: &TypeDescriptor, own_idents: &[String]) {
        self.line(4, "def _tree_attrs(self):");
        if type_descriptor.base.is_some() {
            self.line(8, "a = super()._tree_attrs()");
        } else {
            self.line(8, "a = []");
        }
        for (member, ident) in type_descriptor.members.iter().zip(own_idents) {
            let (MemberOrigin::Attribute, MemberKind::Scalar(kind)) = (member.origin, &member.kind)
            else {
                continue;
            };
            self.line(8, format!("if self.{ident} is not None:"));
            self.line(
                12,
                format!(
                    "a.append(({}, {}))",
                    py_str(&member.name),
                    to_text(*kind, &format!("self.{ident}"))
                ),
            );
        }
        self.line(8, "return a");
        self.line(0, "");
    }

    fn emit_tree_children(&mut self, type_descriptor: &TypeDescriptor, own_idents: &[String]) {
        self.line(4, "def _tree_children(self):");
        if type_descriptor.base.is_some() {
            self.line(8, "c = super()._tree_children()");
        } else {
            self.line(8, "c = []");
        }
        for (member, ident) in type_descriptor.members.iter().zip(own_idents) {
            if member.origin != MemberOrigin::Element {
                continue;
            }
            let name = py_str(&member.name);
            match (&member.kind, member.is_many()) {
                (MemberKind::Group { .. }, _) => {
                    self.line(8, format!("c.extend(v.to_tree(k) for k, v in self.{ident})"));
                }
                (MemberKind::Scalar(kind), true) => self.line(
                    8,
                    format!(
                        "c.extend(leaf({name}, {}) for v in self.{ident})",
                        to_text(*kind, "v")
                    ),
                ),
                (MemberKind::Complex(_), true) => {
                    self.line(8, format!("c.extend(v.to_tree({name}) for v in self.{ident})"));
                }
                (MemberKind::Scalar(kind), false) => {
                    self.line(8, format!("if self.{ident} is not None:"));
                    self.line(
                        12,
                        format!(
                            "c.append(leaf({name}, {}))",
                            to_text(*kind, &format!("self.{ident}"))
                        ),
                    );
                }
                (MemberKind::Complex(_), false) => {
                    self.line(8, format!("if self.{ident} is not None:"));
                    self.line(12, format!("c.append(self.{ident}.to_tree({name}))"));
                }
            }
        }
        self.line(8, "return c");
        self.line(0, "");
    }

    fn emit_to_tree(&mut self) {
        self.line(4, "def to_tree(self, tag=None):");
        self.line(8, "nd = et.Element(qualify(tag or self.TAG), nsmap=nsmap())");
        self.line(8, "for k, v in self._tree_attrs():");
        self.line(12, "nd.set(k, v)");
        self.line(8, "for k in self._tree_children():");
        self.line(12, "nd.append(k)");
        self.line(8, "return nd");
        self.line(0, "");
    }

    fn emit_eq(&mut self) {
        self.line(4, "def __eq__(self, other):");
        self.line(8, "return type(self) is type(other) and vars(self) == vars(other)");
        self.line(0, "");
    }
}

impl DescriptorVisitor for PythonVisitor {
    fn start(&mut self, module: &ModuleDescriptor) {
        self.line(
            0,
            format!(
                "# {}.py - generated by {} {} from {}",
                module.name,
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION"),
                module.source
            ),
        );
        self.line(0, "");
        self.line(0, "import lxml.etree as et");
        self.line(0, "");
        self.line(0, separator());
        self.line(0, "");
        let namespace = module.namespace.as_deref().map_or("None".to_owned(), py_str);
        self.line(0, format!("NAMESPACE = {namespace}"));
        self.out.push_str(PROLOGUE);
    }

    fn visit_type(&mut self, _module: &ModuleDescriptor, type_descriptor: &TypeDescriptor) {
        let class_name = self.class_name(&type_descriptor.name).to_owned();
        let idents = self.idents(type_descriptor.all_members());
        let inherited = type_descriptor.inherited_members().count();
        let own_idents = idents[inherited..].to_vec();

        self.line(0, "");
        self.line(0, separator());
        self.line(0, "");
        self.line(0, "");
        match &type_descriptor.base {
            Some(base) => {
                let base = self.class_name(base).to_owned();
                self.line(0, format!("class {class_name}({base}):"));
            }
            None => self.line(0, format!("class {class_name}:")),
        }
        self.line(4, format!("TAG = {}", py_str(&type_descriptor.name)));
        self.line(0, "");

        let is_root = type_descriptor.base.is_none();
        if is_root || !type_descriptor.members.is_empty() {
            self.emit_init(type_descriptor);
        }
        self.emit_build(type_descriptor);
        if is_root || !type_descriptor.members.is_empty() {
            self.emit_serialize(type_descriptor, &own_idents);
        }
        let has_attributes = type_descriptor
            .members
            .iter()
            .any(|m| m.origin == MemberOrigin::Attribute);
        if is_root || has_attributes {
            self.emit_tree_attrs(type_descriptor, &own_idents);
        }
        let has_elements = type_descriptor
            .members
            .iter()
            .any(|m| m.origin == MemberOrigin::Element);
        if is_root || has_elements {
            self.emit_tree_children(type_descriptor, &own_idents);
        }
        if is_root {
            self.emit_to_tree();
            self.emit_eq();
        }
    }

    fn visit_group(&mut self, _module: &ModuleDescriptor, group: &GroupDescriptor) {
        let tags: Vec<String> = group.members.iter().map(|m| py_str(&m.tag)).collect();
        self.member_table
            .push(format!("    {}: [{}],", py_str(&group.head), tags.join(", ")));
    }

    fn finish(mut self, module: &ModuleDescriptor) -> String {
        self.line(0, "");
        self.line(0, separator());
        self.line(0, "");
        let klasses: Vec<String> = module
            .element_types
            .iter()
            .filter_map(|element| match &element.kind {
                ValueKind::Complex(type_name) => Some(format!(
                    "    {}: {},",
                    py_str(&element.tag),
                    self.class_name(type_name)
                )),
                ValueKind::Scalar(_) => None,
            })
            .collect();
        self.table("klasses", &klasses);
        self.line(0, "");
        let member_table = std::mem::take(&mut self.member_table);
        self.table("members", &member_table);
        self.out
    }
}

impl PythonVisitor {
    fn table(&mut self, name: &str, entries: &[String]) {
        if entries.is_empty() {
            self.line(0, format!("{name} = {{}}"));
            return;
        }
        self.line(0, format!("{name} = {{"));
        for entry in entries {
            self.line(0, entry);
        }
        self.line(0, "}");
    }
}

fn separator() -> String {
    format!("#{}", "-".repeat(78))
}

/// A single-quoted Python string literal.
fn py_str(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

fn convert(kind: ScalarKind, expression: &str) -> String {
    match kind {
        ScalarKind::Text => expression.to_owned(),
        ScalarKind::Integer => format!("py_int({expression})"),
        ScalarKind::Boolean => format!("py_bool({expression})"),
    }
}

fn to_text(kind: ScalarKind, expression: &str) -> String {
    match kind {
        ScalarKind::Text => expression.to_owned(),
        ScalarKind::Integer => format!("str({expression})"),
        ScalarKind::Boolean => format!("xml_bool({expression})"),
    }
}

/// Lays out `callee(arg, ..., arg)` + `suffix` at `indent`, breaking greedily before an argument
/// that would push the line past 80 columns. Continuation lines are indented 8 columns further.
fn wrap_call(indent: usize, callee: &str, args: &[String], suffix: &str) -> Vec<String> {
    let mut pieces: Vec<String> = args.iter().map(|arg| format!("{arg},")).collect();
    match pieces.last_mut() {
        Some(last) => {
            last.pop();
            last.push(')');
            last.push_str(suffix);
        }
        None => pieces.push(format!("){suffix}")),
    }

    let mut lines = Vec::new();
    let mut current = format!("{}{callee}(", " ".repeat(indent));
    let mut line_start = true;
    for piece in pieces {
        if line_start {
            current.push_str(&piece);
            line_start = false;
        } else if current.len() + 1 + piece.len() <= MAX_LINE {
            current.push(' ');
            current.push_str(&piece);
        } else {
            lines.push(std::mem::take(&mut current));
            current = format!("{}{piece}", " ".repeat(indent + CONTINUATION_INDENT));
        }
    }
    lines.push(current);
    lines
}

pub fn generate(module: &ModuleDescriptor) -> String {
    walk(PythonVisitor::new(module), module)
}

#[cfg(test)]
mod tests {
    use super::super::common::tests::{describe, HIERARCHY};
    use super::*;
    use pretty_assertions::assert_eq;
    use std::{fs, process::Command};

    fn class_body<'s>(source: &'s str, class: &str) -> &'s str {
        let start = source.find(&format!("class {class}")).unwrap();
        let rest = &source[start..];
        let end = rest.find("#---").unwrap_or(rest.len());
        &rest[..end]
    }

    #[test]
    fn constructor_signature_is_wrapped() {
        let source = generate(&describe(HIERARCHY));
        let child = class_body(&source, "Child(Parent)");
        assert!(child.contains(
            "    def __init__(self, aa, bb, x, y, id_, name, val=None, cnt=None, tokens=None,\n\
             \x20           sub_elems=None):\n"
        ));
        assert!(child.contains("        super().__init__(aa, bb, x, y, val=val, cnt=cnt)\n"));
        assert!(child.contains(
            "        self.tokens = []\n        if tokens is not None:\n            self.tokens = tokens\n"
        ));
    }

    #[test]
    fn builder_copies_ancestor_fields() {
        let source = generate(&describe(HIERARCHY));
        let child = class_body(&source, "Child(Parent)");
        let expected = [
            "        _x = GrandParent.build(nd)",
            "        aa = _x.aa",
            "        bb = _x.bb",
            "        _x = Parent.build(nd)",
            "        x = _x.x",
            "        val = _x.val",
            "        y = _x.y",
            "        cnt = _x.cnt",
            "        id_ = nd.get('id')",
            "        name = text(child(nd, 'name'))",
            "        tokens = [text(k) for k in children(nd, 'tokens')]",
            "        sub_elems = [Process.build(k) for k in children(nd, 'sub_elems')]",
        ];
        let build = &child[child.find("def build").unwrap()..];
        let lines: Vec<&str> = build.lines().skip(1).take(expected.len()).collect();
        assert_eq!(lines, expected);
        assert!(build.contains(
            "        return cls(aa=aa, bb=bb, x=x, y=y, id_=id_, name=name, val=val, cnt=cnt,\n"
        ));
    }

    #[test]
    fn scalar_conversions() {
        let source = generate(&describe(HIERARCHY));
        let parent = class_body(&source, "Parent(GrandParent)");
        assert!(parent.contains("        x = py_int(nd.get('x'))\n"));
        assert!(parent.contains("        val = py_bool(nd.get('val'))\n"));
        assert!(parent.contains("        cnt = py_int(text(child(nd, 'cnt')))\n"));
        assert!(parent.contains("            a.append(('val', xml_bool(self.val)))\n"));
        assert!(parent.contains("            c.append(leaf('cnt', str(self.cnt)))\n"));
    }

    #[test]
    fn groups_and_recursion() {
        let source = generate(&describe(HIERARCHY));
        let process = class_body(&source, "Process:");
        assert!(process.contains(
            "        flowElement = [(tag(k), klasses[tag(k)].build(k)) for k in nd if tag(k) in members['flowElement']]\n"
        ));
        assert!(process.contains("        subProcess = build_opt(Process, child(nd, 'subProcess'))\n"));
        assert!(process.contains(
            "            d['flowElement'] = [[k, v.serialize()] for k, v in self.flowElement]\n"
        ));
        assert!(process.contains("        c.extend(v.to_tree(k) for k, v in self.flowElement)\n"));
        assert!(process.contains("    def to_tree(self, tag=None):\n"));

        assert!(source.contains("klasses = {\n    'child': Child,\n    'process': Process,\n"));
        assert!(source.contains("members = {\n    'flowElement': ['task', 'gateway'],\n}\n"));
    }

    #[test]
    fn derived_class_without_elements_inherits_children() {
        let source = generate(&describe(HIERARCHY));
        let task = class_body(&source, "tTask(tFlowElement)");
        assert!(task.contains("def _tree_attrs(self):"));
        assert!(!task.contains("def _tree_children(self):"));
        assert!(!task.contains("def to_tree"));
        assert!(!task.contains("def __eq__"));
    }

    #[test]
    fn root_classes_compare_by_value() {
        let source = generate(&describe(HIERARCHY));
        let eq = "    def __eq__(self, other):\n\
                  \x20       return type(self) is type(other) and vars(self) == vars(other)\n";
        assert!(class_body(&source, "GrandParent:").contains(eq));
        assert!(class_body(&source, "Process:").contains(eq));
        assert!(!class_body(&source, "Child(Parent)").contains("__eq__"));
    }

    const METHOD_NAMES: &str = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:complexType name="Box">
    <xs:sequence>
      <xs:element name="serialize" type="xs:string" minOccurs="0"/>
      <xs:element name="to_tree" type="xs:string" minOccurs="0"/>
    </xs:sequence>
    <xs:attribute name="build" type="xs:string"/>
  </xs:complexType>
</xs:schema>"#;

    #[test]
    fn members_do_not_shadow_methods() {
        let source = generate(&describe(METHOD_NAMES));
        let boxed = class_body(&source, "Box:");
        assert!(boxed.contains(
            "    def __init__(self, build_=None, serialize_=None, to_tree_=None):\n"
        ));
        assert!(boxed.contains("        self.serialize_ = serialize_\n"));
        assert!(boxed.contains("            d['serialize'] = self.serialize_\n"));
        assert!(boxed.contains("            c.append(leaf('to_tree', self.to_tree_))\n"));
        assert!(boxed.contains("            a.append(('build', self.build_))\n"));
    }

    /// Writes each module next to `script` and runs it with `python3`. Returns `false` when no
    /// interpreter with lxml is available.
    fn run_python(modules: &[(&str, String)], script: &str) -> bool {
        let probe = Command::new("python3").args(["-c", "import lxml.etree"]).output();
        if !matches!(probe, Ok(ref output) if output.status.success()) {
            eprintln!("skipping: python3 with lxml not available");
            return false;
        }

        let dir = tempfile::tempdir().unwrap();
        for (name, source) in modules {
            fs::write(dir.path().join(format!("{name}.py")), source).unwrap();
        }
        let script_path = dir.path().join("check.py");
        fs::write(&script_path, script).unwrap();

        let output = Command::new("python3")
            .arg(&script_path)
            .current_dir(dir.path())
            .output()
            .unwrap();
        assert!(
            output.status.success(),
            "python3 failed:\n{}",
            String::from_utf8_lossy(&output.stderr)
        );
        assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "ok");
        true
    }

    #[test]
    fn generated_module_runs() {
        let modules = [
            ("hierarchy", generate(&describe(HIERARCHY))),
            ("boxes", generate(&describe(METHOD_NAMES))),
        ];
        run_python(
            &modules,
            r#"
import lxml.etree as et
from hierarchy import Child, Process, tTask, tGateway, klasses, members
from boxes import Box

c = Child('a', 'b', 3, 'why', 'c1', 'n', val=True, tokens=['t1', 't2'])
assert c.sub_elems == []
assert Child('a', 'b', 3, 'why', 'c1', 'n').sub_elems is not c.sub_elems
assert c.serialize() == {
    'aa': 'a', 'bb': 'b', 'x': 3, 'val': True, 'y': 'why',
    'id': 'c1', 'name': 'n', 'tokens': ['t1', 't2'],
}
assert Child.build(c.to_tree('child')) == c

nested = Child('a', 'b', 3, 'why', 'c1', 'n', sub_elems=[Process(label='p')])
assert nested.serialize()['sub_elems'] == [{'label': 'p'}]
assert Child.build(nested.to_tree('child')) == nested
assert nested != c

p = Process(
    label='main',
    step='first',
    flowElement=[('task', tTask(label='t', priority=2)), ('gateway', tGateway(direction='out'))],
    subProcess=Process(step='inner'),
)
assert p.serialize() == {
    'label': 'main',
    'step': 'first',
    'flowElement': [['task', {'label': 't', 'priority': 2}], ['gateway', {'direction': 'out'}]],
    'subProcess': {'step': 'inner'},
}
rebuilt = Process.build(et.fromstring(et.tostring(p.to_tree('process'))))
assert rebuilt == p
assert type(rebuilt.flowElement[1][1]) is tGateway
assert klasses['child'] is Child and members == {'flowElement': ['task', 'gateway']}

b = Box(build_='b', serialize_='x', to_tree_='y')
assert b.serialize() == {'build': 'b', 'serialize': 'x', 'to_tree': 'y'}
assert Box.build(b.to_tree()) == b

print('ok')
"#,
        );
    }

    #[test]
    fn header_and_namespace() {
        let source = generate(&describe(HIERARCHY));
        assert!(source.starts_with("# hierarchy.py - generated by xb-generator "));
        assert!(source.contains("\nNAMESPACE = 'urn:example:hierarchy'\n"));
    }

    #[test]
    fn locals_do_not_shadow_classes() {
        let source = generate(&describe(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:complexType name="Item"/>
  <xs:complexType name="Box">
    <xs:sequence>
      <xs:element name="Item" type="Item"/>
      <xs:element name="lambda" type="xs:string"/>
    </xs:sequence>
  </xs:complexType>
</xs:schema>"#,
        ));
        assert!(source.contains("        Item_ = build_opt(Item, child(nd, 'Item'))\n"));
        assert!(source.contains("        lambda_ = text(child(nd, 'lambda'))\n"));
        assert!(source.contains("NAMESPACE = None\n"));
        assert!(source.contains("members = {}\n"));
    }

    #[test]
    fn wrapping() {
        let args: Vec<String> = (0..12).map(|i| format!("argument_{i}")).collect();
        let lines = wrap_call(4, "def f", &args, ":");
        assert!(lines.iter().all(|line| line.len() <= MAX_LINE));
        assert!(lines[1..].iter().all(|line| line.starts_with("            a")));
        assert_eq!(lines.last().unwrap().chars().last(), Some(':'));
        assert_eq!(wrap_call(8, "return cls", &[], ""), ["        return cls()"]);
    }
}
