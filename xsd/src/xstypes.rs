use std::fmt;

use roxmltree::Node;

use super::{builtins, error::XsdError, mapping_context::line_of};

pub type NCName = String;
pub type AnyURI = String;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct QName {
    pub namespace_name: Option<AnyURI>,
    pub local_name: NCName,
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(namespace_name) = self.namespace_name.as_ref() {
            write!(f, "{{{}}}:{}", namespace_name, self.local_name)
        } else {
            write!(f, "{}", self.local_name)
        }
    }
}

impl QName {
    pub fn with_optional_namespace(
        namespace_name: Option<impl Into<String>>,
        local_name: impl Into<String>,
    ) -> Self {
        Self {
            namespace_name: namespace_name.map(Into::into),
            local_name: local_name.into(),
        }
    }

    pub fn qualified(
        prefix: &str,
        local_name: impl Into<String>,
        context: Node,
    ) -> Result<Self, XsdError> {
        let resolved_prefix = if prefix == "xml" {
            // The prefix xml is by definition bound to the namespace name
            // http://www.w3.org/XML/1998/namespace.
            // (Namespaces in XML 1.0, §3, Reserved Prefixes and Namespace Names)
            "http://www.w3.org/XML/1998/namespace"
        } else {
            context
                .lookup_namespace_uri(Some(prefix))
                .ok_or_else(|| XsdError::NamePrefixNotResolved {
                    prefix: prefix.into(),
                    line: line_of(context),
                })?
        };
        Ok(Self::with_optional_namespace(
            Some(resolved_prefix),
            local_name,
        ))
    }

    pub fn unqualified(local_name: impl Into<String>, context: Node) -> Self {
        // If there is a default namespace declaration in scope, the expanded name corresponding to
        // an unprefixed element name has the URI of the default namespace as its namespace name.
        // (Namespaces in XML 1.0, §6.2)
        let namespace_name = context.lookup_namespace_uri(None);
        QName::with_optional_namespace(namespace_name, local_name)
    }

    pub fn parse(source: &str, context: Node) -> Result<Self, XsdError> {
        let source = source.trim();
        if let Some((prefix, local)) = source.rsplit_once(':') {
            Self::qualified(prefix, local, context)
        } else {
            Ok(Self::unqualified(source, context))
        }
    }

    pub fn is_builtin(&self) -> bool {
        self.namespace_name.as_deref() == Some(builtins::XSD_NAMESPACE)
    }
}

/// The three value kinds attributes and simple elements are mapped to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Text,
    Integer,
    Boolean,
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Text => "text",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
        })
    }
}

/// The value of a `type` or `base` attribute.
///
/// Only a single target namespace is supported, so user-defined names are kept by their local
/// name alone.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeName {
    Builtin(ScalarKind),
    Named(NCName),
}

impl TypeName {
    pub fn from_qname(qname: QName) -> Self {
        if qname.is_builtin() {
            Self::Builtin(builtins::builtin_scalar_kind(&qname.local_name))
        } else {
            Self::Named(qname.local_name)
        }
    }

    pub fn parse(source: &str, context: Node) -> Result<Self, XsdError> {
        QName::parse(source, context).map(Self::from_qname)
    }
}

pub type Sequence<T> = Vec<T>;
