//! Error taxonomy for the validation boundary
//!
//! The calculation functions themselves never return these: they follow a
//! numeric contract and may yield `NaN` or `Infinity`. `EngineError` is what the
//! checked wrappers, loaders and binaries use.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid input: {field} ({reason})")]
    InvalidInput { field: String, reason: String },

    #[error("{what} is not computable (got {value})")]
    NonFinite { what: String, value: f64 },

    #[error("IRR did not converge (last estimate {estimate} per period)")]
    IrrNotConverged { estimate: f64 },

    #[error("contributions total {contributed:.2} does not match loan principal {principal:.2}")]
    ContributionMismatch { contributed: f64, principal: f64 },

    #[error("unknown {kind}: {value}")]
    UnknownVariant { kind: String, value: String },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    pub fn invalid(field: &str, reason: impl Into<String>) -> Self {
        EngineError::InvalidInput {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    pub fn non_finite(what: &str, value: f64) -> Self {
        EngineError::NonFinite {
            what: what.to_string(),
            value,
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;

/// Reject NaN and infinities for a named input field.
pub(crate) fn require_finite(field: &str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(EngineError::invalid(field, format!("must be finite, got {}", value)))
    }
}

/// Reject negative (or non-finite) amounts.
pub(crate) fn require_non_negative(field: &str, value: f64) -> Result<()> {
    require_finite(field, value)?;
    if value < 0.0 {
        return Err(EngineError::invalid(field, format!("must not be negative, got {}", value)));
    }
    Ok(())
}
