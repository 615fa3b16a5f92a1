//! Shared domain types for the housing-aid gap estimator.

mod types;

pub use types::*;
