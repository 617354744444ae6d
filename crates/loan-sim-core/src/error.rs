use thiserror::Error;

/// Why a piece of user text was rejected by the numeric parsers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputFormatError {
    #[error("empty input")]
    Empty,

    #[error("'{0}' is not a plain decimal number")]
    NotANumber(String),

    #[error("'{0}' is not a plain whole number")]
    NotAnInteger(String),

    #[error("'{0}' must be greater than zero")]
    NotPositive(String),
}

#[derive(Debug, Error)]
pub enum LoanSimError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Input format error: {0}")]
    InputFormat(#[from] InputFormatError),

    #[error("No loan amount recorded for user {user_id}")]
    MissingSession { user_id: i64 },

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Arithmetic overflow in {context}")]
    Overflow { context: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for LoanSimError {
    fn from(e: serde_json::Error) -> Self {
        LoanSimError::SerializationError(e.to_string())
    }
}
