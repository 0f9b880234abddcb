//! Domain error types.
//!
//! These errors represent validation failures in caller-supplied data.
//! They are distinct from routing/IO errors.

use super::{InvalidLocation, TimeError};

/// Domain-level errors for request validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// A date or time string did not parse
    #[error(transparent)]
    Time(#[from] TimeError),

    /// A start or end point was empty
    #[error(transparent)]
    Location(#[from] InvalidLocation),

    /// Dwell duration below zero
    #[error("dwell duration must not be negative")]
    NegativeDwell,

    /// Dwell duration above the per-journey maximum
    #[error("dwell duration must not exceed 24 hours")]
    DwellTooLong,

    /// A derived instant fell outside the representable date range
    #[error("journey times fall outside the supported date range")]
    OutOfRange,
}
