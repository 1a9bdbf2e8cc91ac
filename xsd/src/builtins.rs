use std::collections::HashMap;

use lazy_static::lazy_static;

use super::xstypes::ScalarKind;

pub const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

lazy_static! {
    /// Built-in datatypes that map to something other than text. Every other built-in (string,
    /// token, anyURI, ID, IDREF, QName, dateTime, decimal, ...) is carried as text.
    static ref NON_TEXT_BUILTINS: HashMap<&'static str, ScalarKind> = {
        use ScalarKind::*;
        let mut m = HashMap::new();
        m.insert("boolean", Boolean);
        for name in [
            "integer",
            "int",
            "long",
            "short",
            "byte",
            "nonNegativeInteger",
            "nonPositiveInteger",
            "negativeInteger",
            "positiveInteger",
            "unsignedLong",
            "unsignedInt",
            "unsignedShort",
            "unsignedByte",
        ] {
            m.insert(name, Integer);
        }
        m
    };
}

/// Maps the local name of a built-in datatype to its scalar kind; unknown names default to text.
pub fn builtin_scalar_kind(local_name: &str) -> ScalarKind {
    NON_TEXT_BUILTINS
        .get(local_name)
        .copied()
        .unwrap_or(ScalarKind::Text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_builtin_kinds() {
        assert_eq!(builtin_scalar_kind("boolean"), ScalarKind::Boolean);
        assert_eq!(builtin_scalar_kind("int"), ScalarKind::Integer);
        assert_eq!(builtin_scalar_kind("unsignedByte"), ScalarKind::Integer);
        assert_eq!(builtin_scalar_kind("IDREF"), ScalarKind::Text);
        assert_eq!(builtin_scalar_kind("somethingElse"), ScalarKind::Text);
    }
}
