//! Shared estimate-pipeline logic.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! ingest -> MSA intersection -> aid tensor -> filer tensor -> aggregate
//!
//! The CLI front-end then focuses on presentation and exports.

use log::warn;

use crate::domain::{EstimateConfig, HouseholdConfig, RentBenchmark};
use crate::error::AppError;
use crate::io::ingest;
use crate::model::aggregate::{AggregateResult, aggregate};
use crate::model::aid::{AidTensor, assemble_aid_tensor};
use crate::model::filers::{FilerTensor, build_filer_tensor};
use crate::model::income::income_grid;
use crate::report::format::RunDiagnostics;
use crate::report::{CoverageStats, MissingReport, coverage_stats, missing_report};

/// All computed outputs of a single `aidgap estimate` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub msas: Vec<String>,
    pub aid: AidTensor,
    pub filers: FilerTensor,
    pub aggregate: AggregateResult,
    pub missing: MissingReport,
    pub coverage: Option<CoverageStats>,
    pub diagnostics: RunDiagnostics,
}

/// Execute the full estimation pipeline and return the computed outputs.
pub fn run_estimate(config: &EstimateConfig) -> Result<RunOutput, AppError> {
    config.policy.validate()?;

    // 1) Ingest the three tables.
    let rent_table = ingest::load_rent_table(&config.rents_path)?;
    let economics = ingest::load_economics_table(&config.economics_path)?;
    let filer_table = ingest::load_filer_table(&config.filers_path)?;

    // 2) The working MSA axis is the intersection of the two MSA-keyed
    //    tables, in sorted order.
    let msas = ingest::intersect_msas(&rent_table, &filer_table)?;

    // Rent vector aligned with the MSA axis.
    let rents: Vec<RentBenchmark> = msas
        .iter()
        .map(|msa| {
            rent_table
                .get(msa)
                .copied()
                .ok_or_else(|| AppError::internal(format!("Rent table lost MSA {msa}.")))
        })
        .collect::<Result<_, _>>()?;

    // 3) Aid tensor over the full (income grid x configurations) product.
    let incomes = income_grid();
    let aid = assemble_aid_tensor(
        incomes,
        HouseholdConfig::ALL.to_vec(),
        msas.clone(),
        &economics,
        &rents,
        &config.policy,
    );

    let missing = missing_report(&aid);
    for (income, household) in &missing.pairs {
        warn!(
            "No household-economics record for ${income} / {}; treating its aid as zero in the total.",
            household.label()
        );
    }

    // 4) Filer-weight tensor in the matching shape.
    let filers = build_filer_tensor(&filer_table, &msas, &config.policy)?;

    // 5) Aggregate (axis alignment is asserted inside).
    let aggregate = aggregate(&aid, &filers)?;

    let coverage = coverage_stats(&filer_table, &msas);
    let diagnostics = RunDiagnostics {
        rent_msas: rent_table.len(),
        filer_msas: filer_table.rows.len(),
        matched_msas: msas.len(),
        income_levels: aid.incomes.len(),
        bracket_columns: filers.brackets.len(),
    };

    Ok(RunOutput {
        msas,
        aid,
        filers,
        aggregate,
        missing,
        coverage,
        diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use tempfile::TempDir;

    use crate::data::write_sample_tables;
    use crate::domain::PolicyParams;

    fn write(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    fn config(dir: &TempDir, rents: &str, economics: &str, filers: &str) -> EstimateConfig {
        EstimateConfig {
            rents_path: write(dir, "rents.csv", rents),
            economics_path: write(dir, "economics.csv", economics),
            filers_path: write(dir, "filers.csv", filers),
            policy: PolicyParams { halve_top_bracket: false, ..PolicyParams::default() },
            export_cells: None,
            export_tensor: None,
        }
    }

    /// Two MSAs, data only for (Married, 0 kids) at the lowest grid point;
    /// the total must match the hand computation.
    #[test]
    fn end_to_end_matches_hand_computation() {
        let dir = TempDir::new().unwrap();
        // Ten bracket columns to pair with the ten grid levels; only the
        // first bracket has filers.
        let filer_header = "cbsa,EAGI0_13,EAGI5_13,EAGI10_13,EAGI15_13,EAGI20_13,\
                            EAGI25_13,EAGI30_13,EAGI35_13,EAGI40_13,EAGI50_13,\
                            EQC0_13,EQC1_13,EQC2_13,EQC3_13,eitc13";
        let config = config(
            &dir,
            // Monthly rents; 1000/mo -> 12000/yr for MSA 10180's 1BR.
            "cbsa,fmr1,fmr2,fmr3\n\
             10180,1000,1200,1500\n\
             10420,250,400,550\n",
            // Only one populated pair: affordable = 0.3*(2500+3000) = 1650.
            "household,nominal_earnings,eitc_credit\n\
             \"Married, 0 Kid\",2500,3000\n",
            // Every eligible filer has 0 children.
            &format!(
                "{filer_header}\n\
                 10180,1000,0,0,0,0,0,0,0,0,0,500,0,0,0,500\n\
                 10420,2000,0,0,0,0,0,0,0,0,0,300,0,0,0,300\n"
            ),
        );

        let run = run_estimate(&config).unwrap();

        assert_eq!(run.msas, vec!["10180".to_string(), "10420".to_string()]);
        assert_eq!(run.diagnostics.matched_msas, 2);

        // MSA 10180: aid = 12000 - 1650 = 10350, married 0-kid weight =
        // 1000 * 1.0 * 0.498 = 498.
        // MSA 10420: aid = 3000 - 1650 = 1350, weight = 2000 * 0.498 = 996.
        let expect = 10_350.0 * 498.0 + 1_350.0 * 996.0;
        assert!(
            (run.aggregate.total - expect).abs() < 1e-6,
            "total = {}",
            run.aggregate.total
        );
        assert_eq!(run.aggregate.cells_used, 2);
        // All other (income, config) pairs are missing, once per MSA.
        assert_eq!(run.aggregate.missing_cells, (10 * 8 - 1) * 2);
    }

    #[test]
    fn axis_mismatch_between_grid_and_brackets_is_fatal() {
        let dir = TempDir::new().unwrap();
        let config = config(
            &dir,
            "cbsa,fmr1,fmr2,fmr3\n10180,1000,1200,1500\n",
            "household,nominal_earnings,eitc_credit\n\"Married, 0 Kid\",2500,3000\n",
            "cbsa,EAGI0_13,EQC0_13,EQC1_13,EQC2_13,EQC3_13,eitc13\n\
             10180,1000,500,0,0,0,500\n",
        );

        let err = run_estimate(&config).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    /// Full pipeline over generated sample tables: axes align, the total is
    /// finite and non-negative, and the data gaps are accounted for.
    #[test]
    fn sample_tables_run_end_to_end() {
        let dir = TempDir::new().unwrap();
        let paths = write_sample_tables(dir.path(), 11, 8).unwrap();

        let config = EstimateConfig {
            rents_path: paths.rents,
            economics_path: paths.economics,
            filers_path: paths.filers,
            policy: PolicyParams::default(),
            export_cells: None,
            export_tensor: None,
        };
        let run = run_estimate(&config).unwrap();

        assert_eq!(run.diagnostics.matched_msas, 8);
        assert_eq!(run.diagnostics.income_levels, run.diagnostics.bracket_columns);
        assert!(run.aggregate.total.is_finite());
        assert!(run.aggregate.total >= 0.0);

        // The sample economics table phases out high-income credits, so some
        // cells must be missing, and the accounting must close.
        assert!(run.aggregate.missing_cells > 0);
        assert_eq!(run.aggregate.missing_cells, run.missing.cell_count);
        assert_eq!(
            run.aggregate.cells_used + run.aggregate.missing_cells,
            10 * 8 * 8
        );
    }
}
