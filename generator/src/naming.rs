//! Mapping schema names to identifiers that are safe in a target language.

/// The identifiers a target language (and the code generated for it) does not allow as names.
pub trait ReservedWords {
    fn is_reserved(&self, ident: &str) -> bool;
}

/// Turns `name` into a valid identifier that is not reserved.
///
/// A leading `$` becomes `DLR_`, every character other than an ASCII letter, digit or underscore
/// becomes `_`, a leading digit gets a `_` prefix, and reserved results get `_` suffixes until
/// they are free. Applying the function to its own output changes nothing.
pub fn sanitize(name: &str, reserved: &impl ReservedWords) -> String {
    let name = expand_dollar(name);
    let mut ident: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if ident.is_empty() || ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    while reserved.is_reserved(&ident) {
        ident.push('_');
    }
    ident
}

pub fn expand_dollar(name: &str) -> String {
    match name.strip_prefix('$') {
        Some(rest) => format!("DLR_{rest}"),
        None => name.to_owned(),
    }
}

#[cfg(feature = "generator-python")]
pub use python::PythonReservedWords;

#[cfg(feature = "generator-python")]
mod python {
    use super::ReservedWords;

    const KEYWORDS: &[&str] = &[
        "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
        "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
        "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
        "try", "while", "with", "yield",
    ];

    const BUILTINS: &[&str] = &[
        "ArithmeticError", "AssertionError", "AttributeError", "BaseException",
        "BaseExceptionGroup", "BlockingIOError", "BrokenPipeError", "BufferError", "BytesWarning",
        "ChildProcessError", "ConnectionAbortedError", "ConnectionError",
        "ConnectionRefusedError", "ConnectionResetError", "DeprecationWarning", "EOFError",
        "Ellipsis", "EncodingWarning", "EnvironmentError", "Exception", "ExceptionGroup",
        "FileExistsError", "FileNotFoundError", "FloatingPointError", "FutureWarning",
        "GeneratorExit", "IOError", "ImportError", "ImportWarning", "IndentationError",
        "IndexError", "InterruptedError", "IsADirectoryError", "KeyError", "KeyboardInterrupt",
        "LookupError", "MemoryError", "ModuleNotFoundError", "NameError", "NotADirectoryError",
        "NotImplemented", "NotImplementedError", "OSError", "OverflowError",
        "PendingDeprecationWarning", "PermissionError", "ProcessLookupError", "RecursionError",
        "ReferenceError", "ResourceWarning", "RuntimeError", "RuntimeWarning",
        "StopAsyncIteration", "StopIteration", "SyntaxError", "SyntaxWarning", "SystemError",
        "SystemExit", "TabError", "TimeoutError", "TypeError", "UnboundLocalError",
        "UnicodeDecodeError", "UnicodeEncodeError", "UnicodeError", "UnicodeTranslateError",
        "UnicodeWarning", "UserWarning", "ValueError", "Warning", "ZeroDivisionError",
        "__build_class__", "__debug__", "__doc__", "__import__", "__loader__", "__name__",
        "__package__", "__spec__", "abs", "aiter", "all", "anext", "any", "ascii", "bin", "bool",
        "breakpoint", "bytearray", "bytes", "callable", "chr", "classmethod", "compile",
        "complex", "copyright", "credits", "delattr", "dict", "dir", "divmod", "enumerate",
        "eval", "exec", "exit", "filter", "float", "format", "frozenset", "getattr", "globals",
        "hasattr", "hash", "help", "hex", "id", "input", "int", "isinstance", "issubclass",
        "iter", "len", "license", "list", "locals", "map", "max", "memoryview", "min", "next",
        "object", "oct", "open", "ord", "pow", "print", "property", "quit", "range", "repr",
        "reversed", "round", "set", "setattr", "slice", "sorted", "staticmethod", "str", "sum",
        "super", "tuple", "type", "vars", "zip",
    ];

    /// Names the generated module defines or uses as locals.
    const GENERATED: &[&str] = &[
        "NAMESPACE", "TAG", "__eq__", "__init__", "_tree_attrs", "_tree_children", "_x", "build",
        "build_opt", "child", "children", "cls", "et", "klasses", "leaf", "members", "nd",
        "nsmap", "py_bool", "py_int", "qualify", "self", "serialize", "tag", "text", "to_tree",
        "xml_bool",
    ];

    /// Python keywords and builtins, plus the names of the generated module.
    #[derive(Copy, Clone, Debug, Default)]
    pub struct PythonReservedWords;

    impl ReservedWords for PythonReservedWords {
        fn is_reserved(&self, ident: &str) -> bool {
            KEYWORDS.contains(&ident) || BUILTINS.contains(&ident) || GENERATED.contains(&ident)
        }
    }
}

#[cfg(feature = "generator-rust")]
pub use rust::{RustFieldWords, RustTypeWords};

#[cfg(feature = "generator-rust")]
mod rust {
    use check_keyword::CheckKeyword;

    use super::ReservedWords;

    fn is_rust_reserved(ident: &str) -> bool {
        // `_` alone is a pattern, not an identifier.
        ident == "_" || ident.is_keyword()
    }

    /// Rust keywords plus the locals of the generated `build`, `serialize` and `to_tree_as`.
    #[derive(Copy, Clone, Debug, Default)]
    pub struct RustFieldWords;

    impl ReservedWords for RustFieldWords {
        fn is_reserved(&self, ident: &str) -> bool {
            is_rust_reserved(ident) || ["base", "map", "node", "tag", "value"].contains(&ident)
        }
    }

    /// Rust keywords plus the prelude types the generated code names without a path.
    #[derive(Copy, Clone, Debug, Default)]
    pub struct RustTypeWords;

    impl ReservedWords for RustTypeWords {
        fn is_reserved(&self, ident: &str) -> bool {
            is_rust_reserved(ident)
                || [
                    "Box", "Err", "None", "Ok", "Option", "Result", "Self", "Some", "String",
                    "Vec",
                ]
                .contains(&ident)
        }
    }
}
