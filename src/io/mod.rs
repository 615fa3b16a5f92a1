//! Input/output: CSV ingest of the three source tables and result exports.

pub mod export;
pub mod ingest;
pub mod tensor;
