//! Error taxonomy shared by the engine, the collaborators and the facade.
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// Malformed textual type expression.
    #[error("invalid type expression `{input}` at byte {position}: {reason}")]
    TypeSyntax {
        input: String,
        position: usize,
        reason: String,
    },

    #[error("no visitor registered for format `{0}`")]
    UnsupportedFormat(String),

    /// The finished document does not have the shape the caller asked for.
    #[error("unexpected result shape: {0}")]
    Shape(String),

    #[error(transparent)]
    Encoding(#[from] EncodingError),

    /// Unpaired `start_visiting_object` / `end_visiting_object`, or a read of a result
    /// that was never stored.
    #[error("visitor stack discipline violated: {0}")]
    StackDiscipline(String),

    #[error("navigation failed: {0}")]
    Navigation(String),

    #[error("malformed input: {0}")]
    Decoding(String),

    #[error("invalid context: {0}")]
    Context(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Failures of the final document → text step.
#[derive(Debug, Error)]
pub enum EncodingError {
    /// The document holds a value the target format has no literal for.
    #[error("cannot encode value at {path}: {reason}")]
    Unrepresentable { path: String, reason: String },

    /// The underlying writer failed without a more specific cause.
    #[error("encoder failure: {0}")]
    Encoder(String),
}

impl Error {
    pub(crate) fn type_syntax(input: &str, position: usize, reason: impl Into<String>) -> Self {
        Self::TypeSyntax {
            input: input.to_string(),
            position,
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for EncodingError {
    fn from(error: serde_json::Error) -> Self {
        EncodingError::Encoder(error.to_string())
    }
}
