//! Synthetic data generation for demos and end-to-end tests.

pub mod sample;

pub use sample::{SamplePaths, write_sample_tables};
