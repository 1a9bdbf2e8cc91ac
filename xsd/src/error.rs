use std::fmt;

use thiserror::Error;

/// A fatal problem with the schema. Reading or indexing stops at the first one.
#[derive(Debug, Error)]
pub enum XsdError {
    #[error("line {line}: unexpected <{tag}> inside {context}")]
    UnexpectedConstruct {
        tag: String,
        context: String,
        line: u32,
    },
    #[error("line {line}: <{tag}> is missing the {attribute:?} attribute")]
    MissingAttribute {
        attribute: &'static str,
        tag: String,
        line: u32,
    },
    #[error("line {line}: invalid value {value:?} for the {attribute:?} attribute")]
    InvalidValue {
        attribute: &'static str,
        value: String,
        line: u32,
    },
    #[error("line {line}: {kind} {name:?} does not resolve to any declaration")]
    Unresolved {
        kind: ReferenceKind,
        name: String,
        line: u32,
    },
    #[error("line {line}: complex type {name:?} is part of a circular derivation")]
    CircularDerivation { name: String, line: u32 },
    #[error("line {line}: {kind} {name:?} is declared more than once")]
    DuplicateDefinition {
        kind: ReferenceKind,
        name: String,
        line: u32,
    },
    #[error("line {line}: failed to resolve prefix {prefix:?} to a namespace URI")]
    NamePrefixNotResolved { prefix: String, line: u32 },
}

impl XsdError {
    pub fn line(&self) -> u32 {
        match *self {
            Self::UnexpectedConstruct { line, .. }
            | Self::MissingAttribute { line, .. }
            | Self::InvalidValue { line, .. }
            | Self::Unresolved { line, .. }
            | Self::CircularDerivation { line, .. }
            | Self::DuplicateDefinition { line, .. }
            | Self::NamePrefixNotResolved { line, .. } => line,
        }
    }
}

/// What kind of declaration a name was expected to refer to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ReferenceKind {
    Element,
    Type,
    BaseType,
    SubstitutionGroupHead,
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Element => "element",
            Self::Type => "type",
            Self::BaseType => "base type",
            Self::SubstitutionGroupHead => "substitution group head",
        };
        f.write_str(name)
    }
}

/// A construct the reader recognizes but does not implement. It is dropped from the model and
/// reading continues.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnsupportedConstruct {
    pub tag: String,
    pub context: String,
    pub line: u32,
}

impl fmt::Display for UnsupportedConstruct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {}: support for <{}> inside {} is not implemented, ignoring",
            self.line, self.tag, self.context
        )
    }
}
