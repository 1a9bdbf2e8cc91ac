//! Compiles a restricted XML Schema into bindings: one class or struct per complex type, with a
//! constructor, a builder from a document tree, a minimal projection and a re-emitter.

pub mod error;
pub mod generators;
pub mod ist;
pub mod naming;

pub use error::Error;
pub use generators::{Generator, GeneratorContext};

use tracing::{debug, info};

#[derive(Clone, Debug)]
pub struct Options {
    pub generator: Generator,
    /// Name of the generated module, usually the schema file stem.
    pub module_name: String,
    /// Shown in the header of the generated file.
    pub source_name: String,
    /// Replaces the `targetNamespace` of the schema.
    pub namespace: Option<String>,
    pub allow_dtd: bool,
}

/// Reads `source` as a schema and returns the generated module text.
///
/// Nothing is generated if any part of the schema fails to resolve.
pub fn compile(source: &str, options: &Options) -> Result<String, Error> {
    let parsing_options = roxmltree::ParsingOptions {
        allow_dtd: options.allow_dtd,
        ..roxmltree::ParsingOptions::default()
    };
    let document = roxmltree::Document::parse_with_options(source, parsing_options)?;
    let schema = xb_xsd::read_schema(&document)?;
    if !schema.unsupported.is_empty() {
        info!(
            count = schema.unsupported.len(),
            "skipped unsupported schema constructs"
        );
    }

    let context = GeneratorContext::new(&schema)?;
    let module = context.describe(
        &options.module_name,
        &options.source_name,
        options.namespace.as_deref(),
    )?;
    debug!(
        types = module.types.len(),
        groups = module.groups.len(),
        "described module {}",
        module.name
    );
    Ok(options.generator.generate(&module))
}

#[cfg(test)]
mod tests {
    use super::*;
    use xb_xsd::XsdError;

    fn options() -> Options {
        Options {
            generator: Generator::Python,
            module_name: "schema".into(),
            source_name: "schema.xsd".into(),
            namespace: None,
            allow_dtd: false,
        }
    }

    #[test]
    fn unresolved_type_aborts() {
        let error = compile(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:complexType name="A">
    <xs:sequence>
      <xs:element name="b" type="Missing"/>
    </xs:sequence>
  </xs:complexType>
</xs:schema>"#,
            &options(),
        )
        .unwrap_err();
        assert!(matches!(
            error,
            Error::Schema(XsdError::Unresolved { line: 4, .. })
        ));
    }

    #[test]
    fn malformed_xml_is_reported() {
        let error = compile("<xs:schema", &options()).unwrap_err();
        assert!(matches!(error, Error::Xml(_)));
    }

    #[test]
    fn dtd_needs_permission() {
        let source = r#"<!DOCTYPE schema []>
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"/>"#;
        assert!(matches!(compile(source, &options()), Err(Error::Xml(_))));
        let allowed = Options {
            allow_dtd: true,
            ..options()
        };
        assert!(compile(source, &allowed).is_ok());
    }
}
