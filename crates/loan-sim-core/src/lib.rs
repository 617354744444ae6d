pub mod error;
pub mod time_value;
pub mod types;

#[cfg(feature = "amortization")]
pub mod amortization;

#[cfg(feature = "conversation")]
pub mod conversation;

pub use error::{InputFormatError, LoanSimError};
pub use types::*;

/// Standard result type for all loan-sim operations
pub type LoanSimResult<T> = Result<T, LoanSimError>;
