mod common;

#[cfg(feature = "generator-python")]
mod python;
#[cfg(feature = "generator-rust")]
mod rust;

#[cfg(not(any(feature = "generator-python", feature = "generator-rust")))]
compile_error!("At least one generator must be enabled");

use clap::ValueEnum;

use crate::ist::ModuleDescriptor;

pub use common::GeneratorContext;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Generator {
    #[cfg(feature = "generator-python")]
    Python,
    #[cfg(feature = "generator-rust")]
    Rust,
}

impl Generator {
    pub fn generate(&self, module: &ModuleDescriptor) -> String {
        match *self {
            #[cfg(feature = "generator-python")]
            Self::Python => python::generate(module),
            #[cfg(feature = "generator-rust")]
            Self::Rust => rust::generate(module),
        }
    }

    /// Extension of the generated file, without the dot.
    pub fn file_extension(&self) -> &'static str {
        match *self {
            #[cfg(feature = "generator-python")]
            Self::Python => "py",
            #[cfg(feature = "generator-rust")]
            Self::Rust => "rs",
        }
    }
}
