//! Command-line parsing for the housing-aid gap estimator.
//!
//! The goal of this module is to keep **argument parsing** and **command
//! dispatch** separate from the estimation/math code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::{DEFAULT_AFFORDABLE_SHARE, DEFAULT_MARRIED_SHARE};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "aidgap", version, about = "MSA housing-aid gap estimator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the full estimate: load the three tables, build both tensors,
    /// aggregate, and print the run summary.
    Estimate(EstimateArgs),
    /// Write synthetic input tables for demos and testing.
    Sample(SampleArgs),
}

/// Options for a full estimate run.
#[derive(Debug, Parser, Clone)]
pub struct EstimateArgs {
    /// Rent-benchmark CSV (cbsa, fmr1, fmr2, fmr3 monthly rents).
    #[arg(long, value_name = "CSV")]
    pub rents: PathBuf,

    /// Household-economics CSV (household, nominal_earnings, eitc_credit).
    #[arg(long, value_name = "CSV")]
    pub economics: PathBuf,

    /// Filer-distribution CSV (cbsa, EAGI* brackets, EQC0-3, eitc total).
    #[arg(long, value_name = "CSV")]
    pub filers: PathBuf,

    /// Share of filers assumed married when splitting raw counts.
    #[arg(long, default_value_t = DEFAULT_MARRIED_SHARE)]
    pub married_share: f64,

    /// Portion of total income considered affordable for rent.
    #[arg(long, default_value_t = DEFAULT_AFFORDABLE_SHARE)]
    pub affordable_share: f64,

    /// Keep the top income bracket's full filer count instead of halving it.
    #[arg(long)]
    pub no_halve_top_bracket: bool,

    /// Export the per-cell breakdown (aid x weight) to CSV.
    #[arg(long, value_name = "CSV")]
    pub export_cells: Option<PathBuf>,

    /// Export the aid tensor (axes + values) to JSON.
    #[arg(long = "export-tensor", value_name = "JSON")]
    pub export_tensor: Option<PathBuf>,
}

/// Options for synthetic table generation.
#[derive(Debug, Parser, Clone)]
pub struct SampleArgs {
    /// Directory to write rents.csv, economics.csv, and filers.csv into.
    #[arg(long, value_name = "DIR", default_value = "sample-data")]
    pub out_dir: PathBuf,

    /// Random seed for table generation.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Number of synthetic MSAs.
    #[arg(long, default_value_t = 40)]
    pub msa_count: usize,
}
