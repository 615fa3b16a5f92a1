//! Synthetic input-table generation.
//!
//! Writes the three source CSVs with plausible synthetic values so the
//! estimator can be demoed (and tested end-to-end) without the HUD rent and
//! IRS filer extracts. Generation is fully deterministic for a given seed.
//!
//! The EITC credit schedule here is a simplified trapezoid (full credit at
//! low incomes, linear phase-out above a knee), not the statutory formula;
//! it exists to produce realistic coverage, including the high-income rows
//! that phase out to zero and therefore drop out of the economics table.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::LogNormal;

use crate::domain::{HouseholdConfig, MaritalStatus};
use crate::error::AppError;
use crate::model::income::income_grid;

/// Bracket column headers matching the filer-table vintage, one per income
/// grid level.
const BRACKET_LABELS: [&str; 10] = [
    "EAGI0_13", "EAGI5_13", "EAGI10_13", "EAGI15_13", "EAGI20_13",
    "EAGI25_13", "EAGI30_13", "EAGI35_13", "EAGI40_13", "EAGI50_13",
];

/// Rough share of eligible filers per bracket, low incomes heaviest.
const BRACKET_SHAPE: [f64; 10] = [0.16, 0.15, 0.14, 0.12, 0.11, 0.09, 0.08, 0.06, 0.06, 0.03];

/// Child-count mix of eligible filers.
const CHILD_SHAPE: [f64; 4] = [0.35, 0.28, 0.22, 0.15];

/// Maximum simplified credit by child count.
const MAX_CREDIT: [f64; 4] = [500.0, 3_300.0, 5_500.0, 6_100.0];

/// Paths of the three generated CSVs.
#[derive(Debug, Clone)]
pub struct SamplePaths {
    pub rents: PathBuf,
    pub economics: PathBuf,
    pub filers: PathBuf,
}

/// Generate the three input tables under `dir`.
pub fn write_sample_tables(dir: &Path, seed: u64, msa_count: usize) -> Result<SamplePaths, AppError> {
    if msa_count == 0 {
        return Err(AppError::ingest("Sample MSA count must be > 0."));
    }

    std::fs::create_dir_all(dir).map_err(|e| {
        AppError::ingest(format!("Failed to create sample directory '{}': {e}", dir.display()))
    })?;

    let mut rng = StdRng::seed_from_u64(seed);
    let codes: Vec<String> = (0..msa_count).map(|i| format!("{}", 10_180 + 97 * i)).collect();

    let paths = SamplePaths {
        rents: dir.join("rents.csv"),
        economics: dir.join("economics.csv"),
        filers: dir.join("filers.csv"),
    };

    write_rents(&paths.rents, &codes, &mut rng)?;
    write_economics(&paths.economics)?;
    write_filers(&paths.filers, &codes, &mut rng)?;

    Ok(paths)
}

fn create(path: &Path) -> Result<File, AppError> {
    File::create(path)
        .map_err(|e| AppError::ingest(format!("Failed to create '{}': {e}", path.display())))
}

fn write_row(file: &mut File, path: &Path, row: &str) -> Result<(), AppError> {
    writeln!(file, "{row}")
        .map_err(|e| AppError::ingest(format!("Failed to write '{}': {e}", path.display())))
}

fn write_rents(path: &Path, codes: &[String], rng: &mut StdRng) -> Result<(), AppError> {
    let mut file = create(path)?;
    write_row(&mut file, path, "cbsa,areaname,fmr1,fmr2,fmr3")?;

    // Monthly 1BR rents centered near $650 with metro-level spread.
    let base = LogNormal::new(650.0_f64.ln(), 0.25)
        .map_err(|e| AppError::internal(format!("Rent distribution error: {e}")))?;

    for (i, code) in codes.iter().enumerate() {
        let fmr1 = base.sample(rng);
        let fmr2 = fmr1 * rng.gen_range(1.20..1.40);
        let fmr3 = fmr2 * rng.gen_range(1.25..1.45);
        write_row(
            &mut file,
            path,
            &format!("{code},Sample Metro {},{:.0},{:.0},{:.0}", i + 1, fmr1, fmr2, fmr3),
        )?;
    }
    Ok(())
}

fn write_economics(path: &Path) -> Result<(), AppError> {
    let mut file = create(path)?;
    write_row(&mut file, path, "household,nominal_earnings,eitc_credit")?;

    for config in HouseholdConfig::ALL {
        for &income in &income_grid() {
            let credit = simplified_credit(config, income as f64);
            if credit <= 0.0 {
                // Phased out entirely; the row is absent from the table,
                // exactly like the real source data.
                continue;
            }
            write_row(
                &mut file,
                path,
                &format!("\"{}\",{income},{credit:.0}", config.label()),
            )?;
        }
    }
    Ok(())
}

/// Simplified trapezoid credit: full below the knee, linear phase-out above.
fn simplified_credit(config: HouseholdConfig, income: f64) -> f64 {
    let max_credit = MAX_CREDIT[config.children as usize];
    let knee = 18_000.0;
    let married_bonus = match config.marital {
        MaritalStatus::Married => 5_000.0,
        MaritalStatus::Single => 0.0,
    };
    let phaseout_end = 28_000.0 + 6_000.0 * config.children as f64 + married_bonus;

    if income <= knee {
        max_credit
    } else if income >= phaseout_end {
        0.0
    } else {
        max_credit * (phaseout_end - income) / (phaseout_end - knee)
    }
}

fn write_filers(path: &Path, codes: &[String], rng: &mut StdRng) -> Result<(), AppError> {
    let mut file = create(path)?;
    let header = format!("cbsa,{},EQC0_13,EQC1_13,EQC2_13,EQC3_13,eitc13", BRACKET_LABELS.join(","));
    write_row(&mut file, path, &header)?;

    let population = LogNormal::new(20_000.0_f64.ln(), 0.8)
        .map_err(|e| AppError::internal(format!("Population distribution error: {e}")))?;

    for code in codes {
        let total: f64 = population.sample(rng).max(500.0);

        let brackets: Vec<String> = BRACKET_SHAPE
            .iter()
            .map(|share| {
                let jitter = rng.gen_range(0.85..1.15);
                // Mirrors the Excel export formatting the ingest must cope with.
                format!("\"{:.0}\"", total * share * jitter)
            })
            .collect();

        let children: Vec<f64> = CHILD_SHAPE
            .iter()
            .map(|share| (total * share * rng.gen_range(0.9..1.1)).round())
            .collect();

        write_row(
            &mut file,
            path,
            &format!(
                "=\"{code}\",{},{:.0},{:.0},{:.0},{:.0},{:.0}",
                brackets.join(","),
                children[0],
                children[1],
                children[2],
                children[3],
                total
            ),
        )?;
    }
    Ok(())
}
