pub mod amortization;
pub mod analysis;
pub mod error;
pub mod export;
pub mod inputs;
pub mod sensitivity;
pub mod tax;
pub mod time_value;
pub mod types;

#[cfg(feature = "share")]
pub mod share;

#[cfg(feature = "scenarios")]
pub mod scenarios;

pub use error::CalcError;
pub use inputs::DealInputs;
pub use types::*;

/// Standard result type for the collaborator-facing operations.
/// The financial math itself is total and returns plain values.
pub type CalcResult<T> = Result<T, CalcError>;
