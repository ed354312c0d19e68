//! specforge Core Library
//!
//! Compiles a machine-readable API specification (operations, schemas,
//! parameters, security schemes) into an abstract source tree: typed data
//! model declarations plus a client declaration with one callable per
//! operation. Loading raw documents and pretty-printing the tree are left
//! to external collaborators.

pub mod client;
pub mod compile;
pub mod config;
pub mod document;
pub mod emit;
pub mod error;
pub mod normalize;
pub mod params;
pub mod target;
pub mod typemap;
pub mod utils;

pub use crate::{
    compile::compile,
    config::GeneratorConfig,
    document::SpecDocument,
    emit::AbstractSourceTree,
    error::{ClientError, Error, ParamError, Result, SpecError, TypeError},
};
