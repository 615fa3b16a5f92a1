//! Export disaggregated aid cells to CSV.
//!
//! One row per (income level, household configuration, MSA) cell, with the
//! aid gap, the filer weight, and their product. Missing aid cells export
//! with empty aid/weighted fields so spreadsheets can tell "no data" from
//! zero. Meant to be easy to consume downstream.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::AppError;
use crate::model::aid::AidTensor;
use crate::model::filers::FilerTensor;

/// Write the per-cell breakdown of the aggregate to a CSV file.
///
/// Assumes the two tensors have already passed the aggregator's axis checks.
pub fn write_cells_csv(path: &Path, aid: &AidTensor, filers: &FilerTensor) -> Result<(), AppError> {
    let mut file = File::create(path).map_err(|e| {
        AppError::ingest(format!("Failed to create export CSV '{}': {e}", path.display()))
    })?;

    writeln!(file, "income,bracket,household,cbsa,aid,filer_weight,weighted_aid")
        .map_err(|e| AppError::ingest(format!("Failed to write export CSV header: {e}")))?;

    for (income_pos, &income) in aid.incomes.iter().enumerate() {
        for (config_pos, config) in aid.configs.iter().enumerate() {
            for (msa_pos, msa) in aid.msas.iter().enumerate() {
                let weight = filers.get(income_pos, config_pos, msa_pos);
                let (aid_field, weighted_field) = match aid.get(income_pos, config_pos, msa_pos) {
                    Some(value) => (format!("{value:.2}"), format!("{:.2}", value * weight)),
                    None => (String::new(), String::new()),
                };
                writeln!(
                    file,
                    "{income},{},\"{}\",{msa},{aid_field},{weight:.4},{weighted_field}",
                    filers.brackets[income_pos],
                    config.label(),
                )
                .map_err(|e| AppError::ingest(format!("Failed to write export CSV row: {e}")))?;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        EconRecord, FilerDistributionTable, FilerRow, HouseholdConfig, HouseholdEconomicsTable,
        PolicyParams, RentBenchmark,
    };
    use crate::model::aid::assemble_aid_tensor;
    use crate::model::filers::build_filer_tensor;

    #[test]
    fn cells_csv_round_trips_header_and_rows() {
        let mut economics = HouseholdEconomicsTable::default();
        for cfg in HouseholdConfig::ALL {
            economics.insert(cfg, 7_500, EconRecord { nominal_earnings: 7_500.0, eitc_credit: 500.0 });
        }

        let msas = vec!["10180".to_string()];
        let rents = vec![RentBenchmark {
            one_bedroom: 6_000.0,
            two_bedroom: 7_800.0,
            three_bedroom: 9_600.0,
        }];
        let aid = assemble_aid_tensor(
            vec![7_500],
            HouseholdConfig::ALL.to_vec(),
            msas.clone(),
            &economics,
            &rents,
            &PolicyParams::default(),
        );

        let mut rows = std::collections::BTreeMap::new();
        rows.insert("10180".to_string(), FilerRow {
            bracket_counts: vec![100.0],
            child_counts: [25.0, 25.0, 25.0, 25.0],
            total_eligible: 100.0,
        });
        let table = FilerDistributionTable {
            bracket_labels: vec!["EAGI5_13".to_string()],
            rows,
        };
        let filers = build_filer_tensor(&table, &msas, &PolicyParams::default()).unwrap();

        let out = tempfile::NamedTempFile::new().unwrap();
        write_cells_csv(out.path(), &aid, &filers).unwrap();

        let contents = std::fs::read_to_string(out.path()).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines[0], "income,bracket,household,cbsa,aid,filer_weight,weighted_aid");
        // 1 income x 8 configs x 1 MSA.
        assert_eq!(lines.len(), 9);
        assert!(lines[1].starts_with("7500,EAGI5_13,\"Married, 0 Kid\",10180,"));
    }
}
