//! Bindings generated by `build.rs` from the schemas under `schemas/`.

pub mod hierarchy {
    include!(concat!(env!("OUT_DIR"), "/hierarchy.rs"));
}
