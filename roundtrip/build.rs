use std::{env, fs, path::PathBuf};

use xb_generator::{Generator, Options};

const SCHEMAS: &[&str] = &["hierarchy"];

fn main() {
    let out_dir = PathBuf::from(env::var_os("OUT_DIR").expect("cargo sets OUT_DIR"));
    for name in SCHEMAS {
        let path = format!("schemas/{name}.xsd");
        println!("cargo:rerun-if-changed={path}");

        let source = fs::read_to_string(&path).unwrap_or_else(|err| panic!("{path}: {err}"));
        let options = Options {
            generator: Generator::Rust,
            module_name: (*name).to_owned(),
            source_name: format!("{name}.xsd"),
            namespace: None,
            allow_dtd: false,
        };
        let generated =
            xb_generator::compile(&source, &options).unwrap_or_else(|err| panic!("{path}: {err}"));
        fs::write(out_dir.join(format!("{name}.rs")), generated)
            .unwrap_or_else(|err| panic!("{name}.rs: {err}"));
    }
}
