//! Error handling for the specforge compiler library.
//!
//! Every failure produced by the compiler is fatal to the run: the caller
//! either receives a complete source tree or exactly one error. Errors are
//! grouped into four kinds mirroring the compiler stages: document-level
//! (`SpecError`), schema mapping (`TypeError`), parameter resolution
//! (`ParamError`) and client assembly (`ClientError`). Each carries
//! enough context (field path or parameter name) to locate the offending
//! spec element.

use thiserror::Error;

use crate::normalize::ParamLocation;

/// Result type for specforge compiler operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for specforge compiler operations
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Document-level structural problem
    #[error(transparent)]
    Spec(#[from] SpecError),

    /// Schema mapping problem
    #[error(transparent)]
    Type(#[from] TypeError),

    /// Parameter or path resolution problem
    #[error(transparent)]
    Param(#[from] ParamError),

    /// Operation-level client assembly problem
    #[error(transparent)]
    Client(#[from] ClientError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }
}

/// Structural problems in the loaded specification document.
#[derive(Debug, Error, PartialEq)]
pub enum SpecError {
    /// A `$ref` points at a target that does not exist in the document.
    #[error("Unresolved reference '{0}'")]
    UnresolvedReference(String),

    /// A required top-level section is missing or has the wrong shape.
    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    /// A chain of reference nodes closes on itself on the type axis.
    /// Value-level recursion through record fields is legal; this is the
    /// non-terminating kind.
    #[error("Circular type reference through '{0}'")]
    CircularReference(String),
}

/// Problems mapping a schema node into the intermediate type model.
#[derive(Debug, Error, PartialEq)]
pub enum TypeError {
    /// The schema declares a primitive kind the target cannot express.
    #[error("Unsupported data type '{0}'")]
    UnsupportedDataType(String),

    /// `maxItems` exceeds the configured fixed-size array bound.
    #[error(
        "Maximum item count defined in the definition exceeds the maximum \
         supported array size {limit} (at {path})"
    )]
    MaxItemsExceeded { limit: u64, path: String },

    /// Two `allOf` members declare the same field with different types.
    #[error("Conflicting field type for '{field}' (at {path})")]
    ConflictingFieldType { field: String, path: String },
}

/// Problems resolving operation parameters against a path template.
#[derive(Debug, Error, PartialEq)]
pub enum ParamError {
    /// A template placeholder has no declared path parameter, or a declared
    /// path parameter never appears in the template.
    #[error("Unbound path parameter '{name}' in '{template}'")]
    UnboundPathParameter { name: String, template: String },

    /// The parameter's type is outside the whitelist of path/query binding
    /// types (primitives and enums of primitives).
    #[error("Invalid {location} parameter data type for the parameter: {name}")]
    InvalidParameterType { name: String, location: ParamLocation },
}

/// Problems assembling a client operation model.
#[derive(Debug, Error, PartialEq)]
pub enum ClientError {
    /// The declared security scheme kind is outside the supported set.
    #[error("Unsupported security scheme '{0}'")]
    UnsupportedSecurityScheme(String),
}
