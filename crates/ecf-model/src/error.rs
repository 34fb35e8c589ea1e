use thiserror::Error;

/// Failures raised while building an e-CF document from a row.
///
/// Structural absence is never an error; optional fields are simply
/// omitted. A build fails only when a value that must be numeric is
/// present but unparseable.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("column {column}: cannot parse {value:?} as a number")]
    MalformedNumber { column: String, value: String },
}

pub type Result<T> = std::result::Result<T, BuildError>;
