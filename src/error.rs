//! Process-level error type.
//!
//! Every fatal error carries an exit code so `main` can translate failures
//! into distinct process statuses:
//!
//! - 2: bad input data or configuration (ingest/validation)
//! - 3: tensor axes failed to align (a configuration bug, never recoverable)
//! - 4: internal invariant violation
//!
//! Missing household-economics cells are *not* an error: they propagate as
//! explicit `None` aid values and are surfaced in the run report instead.

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum AppError {
    /// Malformed or invalid input tables, paths, or policy parameters.
    #[error("{0}")]
    Ingest(String),

    /// The aid-grid axis and the filer-bracket axis (or the config/MSA axes)
    /// do not line up; aggregation would silently mis-weight cells.
    #[error("{0}")]
    AxisMismatch(String),

    /// The MSA sets of the rent and filer tables do not intersect.
    #[error("{0}")]
    MsaSetMismatch(String),

    /// "Should never happen" internal failures.
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Ingest(_) => 2,
            AppError::AxisMismatch(_) | AppError::MsaSetMismatch(_) => 3,
            AppError::Internal(_) => 4,
        }
    }

    pub fn ingest(message: impl Into<String>) -> Self {
        AppError::Ingest(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        AppError::Internal(message.into())
    }
}
