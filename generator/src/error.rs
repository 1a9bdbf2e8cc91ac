use std::{io, path::PathBuf};

use thiserror::Error;
use xb_xsd::XsdError;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Xml(#[from] roxmltree::Error),
    #[error(transparent)]
    Schema(#[from] XsdError),
    #[error("{}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
}
