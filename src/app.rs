//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - loads the three source tables
//! - builds the aid and filer tensors and aggregates them
//! - prints the run summary
//! - writes optional exports

use clap::Parser;

use crate::cli::{Command, EstimateArgs, SampleArgs};
use crate::domain::{EstimateConfig, PolicyParams};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `aidgap` binary.
pub fn run() -> Result<(), AppError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // We want `aidgap --rents ... --economics ... --filers ...` to behave
    // like `aidgap estimate ...`. Clap requires a subcommand name, so we do
    // a small, explicit rewrite of the argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Estimate(args) => handle_estimate(args),
        Command::Sample(args) => handle_sample(args),
    }
}

fn handle_estimate(args: EstimateArgs) -> Result<(), AppError> {
    let config = estimate_config_from_args(&args);
    let run = pipeline::run_estimate(&config)?;

    println!(
        "{}",
        crate::report::format_run_summary(
            &config.policy,
            &run.diagnostics,
            &run.aggregate,
            &run.missing,
            run.coverage,
        )
    );

    if let Some(path) = &config.export_cells {
        crate::io::export::write_cells_csv(path, &run.aid, &run.filers)?;
    }
    if let Some(path) = &config.export_tensor {
        crate::io::tensor::write_tensor_json(path, &run.aid)?;
    }

    Ok(())
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    let paths = crate::data::write_sample_tables(&args.out_dir, args.seed, args.msa_count)?;
    println!("Wrote sample tables:");
    println!("- {}", paths.rents.display());
    println!("- {}", paths.economics.display());
    println!("- {}", paths.filers.display());
    Ok(())
}

pub fn estimate_config_from_args(args: &EstimateArgs) -> EstimateConfig {
    EstimateConfig {
        rents_path: args.rents.clone(),
        economics_path: args.economics.clone(),
        filers_path: args.filers.clone(),
        policy: PolicyParams {
            married_share: args.married_share,
            affordable_share: args.affordable_share,
            halve_top_bracket: !args.no_halve_top_bracket,
        },
        export_cells: args.export_cells.clone(),
        export_tensor: args.export_tensor.clone(),
    }
}

/// Rewrite argv so bare flag invocations default to `estimate`.
///
/// Rules:
/// - `aidgap`                    -> unchanged (clap prints the help)
/// - `aidgap --rents ...`        -> `aidgap estimate --rents ...`
/// - `aidgap --help/--version`   -> unchanged
/// - `aidgap estimate|sample ..` -> unchanged
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        return argv;
    };

    let is_top_level_help_or_version =
        matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "estimate" | "sample");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "estimate flags".
    if arg1.starts_with('-') {
        argv.insert(1, "estimate".to_string());
        return argv;
    }

    argv
}
