//! `aidgap` library crate.
//!
//! The binary (`aidgap`) is a thin wrapper around this library so that:
//!
//! - the estimation pipeline is testable without spawning processes
//! - modules are reusable (e.g., future notebooks, batch services)
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod model;
pub mod report;
