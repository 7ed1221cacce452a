pub mod error;

pub use error::CdcError;

/// The result type returned by every fallible core function.
pub type CResult<T> = Result<T, CdcError>;
