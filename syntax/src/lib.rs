#[macro_use]
mod macros;

/// Parse trees for procedure and task files.
pub mod ast;

/// Conversion of raw YAML nodes into parse trees.
mod parse;
pub use parse::{is_truthy, parse_array, parse_procedure, parse_substeps, parse_task};

/// JSON-Schema validation of procedure and task files.
pub mod schema;
pub use schema::{Schema, ValidationError};

/// `{{TOKEN}}` markup inside step text.
pub mod markup;

/// Separates actors in a joint actor key, e.g. "EV1 + EV2".
pub const JOINT_DELIM: char = '+';
/// Canonical separator used when re-joining a joint actor key.
pub const JOINT_SEPARATOR: &str = " + ";
/// Key marking a division whose actors work simultaneously.
pub const SIMO_KEY: &str = "simo";

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Expected a string or an array of strings, got: {0}")]
    NotStringOrArray(String),
    #[error("Expected a string, got: {0}")]
    NotString(String),
    #[error("Expected a step (string or mapping), got: {0}")]
    InvalidStep(String),
    #[error("Steps for actor \"{0}\" must be a string or an array, got: {1}")]
    InvalidSeries(String, String),
    #[error("Division must be a mapping of one actor to steps, or a 'simo' mapping: {0}")]
    InvalidDivision(String),
    #[error("Division has more than one actor but is not a 'simo' division: {0}")]
    MultipleActorsNotSimo(String),
    #[error("Image must be a path or a mapping with a 'path' field: {0}")]
    InvalidImage(String),
    #[error("Task reference must have exactly one of 'file' or 'url': {0}")]
    InvalidTaskRef(String),
}
