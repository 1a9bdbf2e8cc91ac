//! Reader and indices for the subset of XML Schema the binding generator understands: named
//! complex types with single-base extension, element declarations with occurrence bounds and
//! substitution groups, scalar attributes and simple-type aliases.

pub mod attribute_decl;
pub mod complex_type_def;
pub mod derivation;
pub mod element_decl;
pub mod error;
pub mod forest;
pub mod particle;
pub mod schema;
pub mod simple_type_def;
pub mod substitution_group;
pub mod xstypes;

mod builtins;
mod mapping_context;

pub use attribute_decl::AttributeDeclaration;
pub use complex_type_def::ComplexTypeDefinition;
pub use derivation::DerivationIndex;
pub use element_decl::{resolve_element, ElementDeclaration, ResolvedElement, ValueKind};
pub use error::{ReferenceKind, UnsupportedConstruct, XsdError};
pub use forest::Forest;
pub use particle::{Cardinality, MaxOccurs, Occurrence};
pub use schema::Schema;
pub use simple_type_def::SimpleTypeDefinition;
pub use substitution_group::SubstitutionGroups;
pub use xstypes::ScalarKind;

pub use builtins::XSD_NAMESPACE;

/// Reads the `<schema>` root element of `document`.
///
/// Unsupported constructs are logged, recorded in [`Schema::unsupported`] and skipped; anything
/// else the reader does not recognize is an error.
pub fn read_schema(document: &roxmltree::Document) -> Result<Schema, XsdError> {
    Schema::map_from_xml(document.root_element())
}
