//! CSV ingest and normalization.
//!
//! This module turns the three heterogeneous source CSVs into clean in-memory
//! tables that are safe to feed to the estimation core.
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors + exit code 2)
//! - **Normalization here, never in the core**: Excel `="…"` escapes,
//!   thousands separators, CBSA recodes, monthly→annual rents
//! - **Deterministic behavior**: `BTreeMap` tables, sorted MSA axis
//! - **Separation of concerns**: no aid math here

use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

use csv::StringRecord;
use log::info;

use crate::domain::{
    EconRecord, FilerDistributionTable, FilerRow, HouseholdConfig, HouseholdEconomicsTable,
    RentBenchmark, RentBenchmarkTable,
};
use crate::error::AppError;

/// CBSA codes that changed identifiers between the rent and filer vintages.
/// Applied to the rent table so both tables speak the filer table's codes.
const CBSA_RECODES: [(&str, &str); 5] = [
    ("14060", "14010"),
    ("29140", "29200"),
    ("31100", "31080"),
    ("42060", "4220"),
    ("44600", "48260"),
];

/// Benchmark rents are published monthly; the model works in annual dollars.
const MONTHS_PER_YEAR: f64 = 12.0;

/// Load the rent-benchmark table: CBSA → annualized rent per bedroom category.
///
/// Duplicate CBSA rows keep the first occurrence. Negative rents are rejected
/// outright; the core clamps only the aid *gap*, never the raw benchmark.
pub fn load_rent_table(path: &Path) -> Result<RentBenchmarkTable, AppError> {
    let mut reader = open_csv(path)?;
    let headers = read_headers(&mut reader, path)?;

    let cbsa_col = required_column(&headers, "cbsa", path)?;
    let fmr_cols = [
        required_column(&headers, "fmr1", path)?,
        required_column(&headers, "fmr2", path)?,
        required_column(&headers, "fmr3", path)?,
    ];

    let mut table = RentBenchmarkTable::new();
    for (line, record) in reader.records().enumerate() {
        let record = record.map_err(|e| bad_row(path, line, e))?;
        let cbsa = recode_cbsa(clean_code(field(&record, cbsa_col)));
        if cbsa.is_empty() {
            return Err(AppError::ingest(format!(
                "{}: row {} has an empty CBSA code.",
                path.display(),
                line + 2
            )));
        }

        let mut monthly = [0.0; 3];
        for (slot, &col) in monthly.iter_mut().zip(&fmr_cols) {
            *slot = parse_number(field(&record, col), path, line)?;
        }

        // First occurrence wins when the source repeats a CBSA.
        table.entry(cbsa).or_insert(RentBenchmark {
            one_bedroom: monthly[0] * MONTHS_PER_YEAR,
            two_bedroom: monthly[1] * MONTHS_PER_YEAR,
            three_bedroom: monthly[2] * MONTHS_PER_YEAR,
        });
    }

    if table.is_empty() {
        return Err(AppError::ingest(format!("{}: no rent rows found.", path.display())));
    }
    Ok(table)
}

/// Load the household-economics table: (config, income level) → earnings and
/// EITC credit.
///
/// Rows whose credit is not strictly positive are dropped, matching the
/// source data's coverage; the corresponding (config, income) cells then
/// propagate through the pipeline as MISSING.
pub fn load_economics_table(path: &Path) -> Result<HouseholdEconomicsTable, AppError> {
    let mut reader = open_csv(path)?;
    let headers = read_headers(&mut reader, path)?;

    let household_col = required_column(&headers, "household", path)?;
    let earnings_col = required_column(&headers, "nominal_earnings", path)?;
    let credit_col = required_column(&headers, "eitc_credit", path)?;

    let mut table = HouseholdEconomicsTable::default();
    for (line, record) in reader.records().enumerate() {
        let record = record.map_err(|e| bad_row(path, line, e))?;

        let label = field(&record, household_col);
        let config = HouseholdConfig::parse_label(label).ok_or_else(|| {
            AppError::ingest(format!(
                "{}: row {} has unrecognized household label '{label}'.",
                path.display(),
                line + 2
            ))
        })?;

        let nominal_earnings = parse_number(field(&record, earnings_col), path, line)?;
        let eitc_credit = parse_number(field(&record, credit_col), path, line)?;
        if eitc_credit <= 0.0 {
            continue;
        }

        let income = income_key(nominal_earnings).ok_or_else(|| {
            AppError::ingest(format!(
                "{}: row {} earnings {nominal_earnings} is not a whole-dollar income level.",
                path.display(),
                line + 2
            ))
        })?;

        table.insert(config, income, EconRecord { nominal_earnings, eitc_credit });
    }

    if table.is_empty() {
        return Err(AppError::ingest(format!(
            "{}: no household-economics rows with positive credit found.",
            path.display()
        )));
    }
    Ok(table)
}

/// Load the filer-distribution table.
///
/// Bracket columns are every header starting with `EAGI`, kept in file
/// order; child-count columns are `EQC0`–`EQC3` prefixes; the
/// total-eligible marginal is the first `eitc*` column.
pub fn load_filer_table(path: &Path) -> Result<FilerDistributionTable, AppError> {
    let mut reader = open_csv(path)?;
    let headers = read_headers(&mut reader, path)?;

    let cbsa_col = required_column(&headers, "cbsa", path)?;

    let mut bracket_cols = Vec::new();
    let mut bracket_labels = Vec::new();
    let mut child_cols: [Option<usize>; 4] = [None; 4];
    let mut total_col = None;

    for (idx, raw) in headers.iter().enumerate() {
        let name = raw.trim();
        let lower = name.to_ascii_lowercase();
        if lower.starts_with("eagi") {
            bracket_cols.push(idx);
            bracket_labels.push(name.to_string());
        } else if let Some(child) = lower.strip_prefix("eqc").and_then(|rest| {
            rest.chars().next().and_then(|c| c.to_digit(10))
        }) {
            if child <= 3 {
                child_cols[child as usize].get_or_insert(idx);
            }
        } else if lower.starts_with("eitc") && total_col.is_none() {
            total_col = Some(idx);
        }
    }

    if bracket_cols.is_empty() {
        return Err(AppError::ingest(format!(
            "{}: no EAGI income-bracket columns found.",
            path.display()
        )));
    }
    let child_cols: Vec<usize> = child_cols
        .into_iter()
        .enumerate()
        .map(|(i, col)| {
            col.ok_or_else(|| {
                AppError::ingest(format!("{}: missing EQC{i} child-count column.", path.display()))
            })
        })
        .collect::<Result<_, _>>()?;
    let total_col = total_col.ok_or_else(|| {
        AppError::ingest(format!(
            "{}: missing eitc total-eligible-filers column.",
            path.display()
        ))
    })?;

    let mut rows = BTreeMap::new();
    for (line, record) in reader.records().enumerate() {
        let record = record.map_err(|e| bad_row(path, line, e))?;
        let cbsa = clean_code(field(&record, cbsa_col));
        if cbsa.is_empty() {
            return Err(AppError::ingest(format!(
                "{}: row {} has an empty CBSA code.",
                path.display(),
                line + 2
            )));
        }

        let bracket_counts = bracket_cols
            .iter()
            .map(|&col| parse_number(field(&record, col), path, line))
            .collect::<Result<Vec<f64>, _>>()?;

        let mut child_counts = [0.0; 4];
        for (slot, &col) in child_counts.iter_mut().zip(&child_cols) {
            *slot = parse_number(field(&record, col), path, line)?;
        }

        let total_eligible = parse_number(field(&record, total_col), path, line)?;

        rows.entry(cbsa).or_insert(FilerRow {
            bracket_counts,
            child_counts,
            total_eligible,
        });
    }

    if rows.is_empty() {
        return Err(AppError::ingest(format!("{}: no filer rows found.", path.display())));
    }
    Ok(FilerDistributionTable { bracket_labels, rows })
}

/// Intersect the MSA code sets of the two MSA-keyed tables.
///
/// The working code space is the intersection; MSAs absent from either
/// source are dropped before any computation. An empty intersection is
/// fatal — it means the two tables do not describe the same geography.
pub fn intersect_msas(
    rents: &RentBenchmarkTable,
    filers: &FilerDistributionTable,
) -> Result<Vec<String>, AppError> {
    let msas: Vec<String> = rents
        .keys()
        .filter(|code| filers.rows.contains_key(*code))
        .cloned()
        .collect();

    info!(
        "MSA match: {} of {} rent rows and {} filer rows share a CBSA code.",
        msas.len(),
        rents.len(),
        filers.rows.len()
    );

    if msas.is_empty() {
        return Err(AppError::MsaSetMismatch(
            "The rent and filer tables share no CBSA codes; check the code normalization."
                .to_string(),
        ));
    }
    Ok(msas)
}

fn open_csv(path: &Path) -> Result<csv::Reader<File>, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::ingest(format!("Failed to open CSV '{}': {e}", path.display())))?;
    Ok(csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file))
}

fn read_headers(reader: &mut csv::Reader<File>, path: &Path) -> Result<StringRecord, AppError> {
    Ok(reader
        .headers()
        .map_err(|e| AppError::ingest(format!("Failed to read CSV headers of '{}': {e}", path.display())))?
        .clone())
}

fn required_column(headers: &StringRecord, name: &str, path: &Path) -> Result<usize, AppError> {
    headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(name))
        .ok_or_else(|| {
            AppError::ingest(format!("{}: missing required column '{name}'.", path.display()))
        })
}

fn bad_row(path: &Path, line: usize, err: csv::Error) -> AppError {
    AppError::ingest(format!(
        "{}: row {} could not be parsed: {err}",
        path.display(),
        line + 2
    ))
}

fn field<'a>(record: &'a StringRecord, col: usize) -> &'a str {
    record.get(col).unwrap_or("")
}

/// Strip Excel artifacts (`="10180"`) and whitespace from an identifier.
fn clean_code(raw: &str) -> String {
    raw.trim().trim_start_matches('=').trim_matches('"').trim().to_string()
}

fn recode_cbsa(code: String) -> String {
    for (from, to) in CBSA_RECODES {
        if code == from {
            return to.to_string();
        }
    }
    code
}

/// Parse a numeric field, tolerating thousands separators and Excel quoting.
/// Negative and non-finite values are rejected at the door.
fn parse_number(raw: &str, path: &Path, line: usize) -> Result<f64, AppError> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, ',' | '"' | '=' | ' '))
        .collect();
    let value: f64 = cleaned.parse().map_err(|_| {
        AppError::ingest(format!(
            "{}: row {} has non-numeric value '{raw}'.",
            path.display(),
            line + 2
        ))
    })?;
    if !value.is_finite() || value < 0.0 {
        return Err(AppError::ingest(format!(
            "{}: row {} has negative or non-finite value '{raw}'.",
            path.display(),
            line + 2
        )));
    }
    Ok(value)
}

/// Whole-dollar income key for economics lookups.
fn income_key(earnings: f64) -> Option<u32> {
    let rounded = earnings.round();
    if (earnings - rounded).abs() > 1e-6 || rounded < 0.0 || rounded > u32::MAX as f64 {
        return None;
    }
    Some(rounded as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use tempfile::NamedTempFile;

    use crate::domain::MaritalStatus;

    fn csv_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn rent_table_annualizes_and_recodes() {
        let file = csv_file(
            "cbsa,areaname,fmr1,fmr2,fmr3\n\
             10180,Abilene,500,650,800\n\
             14060,Old Code,400,500,600\n",
        );
        let table = load_rent_table(file.path()).unwrap();

        let abilene = table.get("10180").unwrap();
        assert_eq!(abilene.one_bedroom, 6_000.0);
        assert_eq!(abilene.three_bedroom, 9_600.0);

        // 14060 is recoded to 14010.
        assert!(table.contains_key("14010"));
        assert!(!table.contains_key("14060"));
    }

    #[test]
    fn rent_table_keeps_first_duplicate_and_rejects_negatives() {
        let file = csv_file(
            "cbsa,fmr1,fmr2,fmr3\n\
             10180,500,650,800\n\
             10180,999,999,999\n",
        );
        let table = load_rent_table(file.path()).unwrap();
        assert_eq!(table.get("10180").unwrap().one_bedroom, 6_000.0);

        let bad = csv_file("cbsa,fmr1,fmr2,fmr3\n10180,-500,650,800\n");
        let err = load_rent_table(bad.path()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn economics_table_drops_zero_credit_rows() {
        let file = csv_file(
            "household,nominal_earnings,eitc_credit\n\
             \"Married, 0 Kid\",7500,3000\n\
             \"Married, 0 Kid\",52000,0\n\
             \"Single, 2 Kids\",12500,4500.50\n",
        );
        let table = load_economics_table(file.path()).unwrap();
        assert_eq!(table.len(), 2);

        let married = HouseholdConfig::new(MaritalStatus::Married, 0).unwrap();
        assert!(table.get(married, 7_500).is_some());
        // The zero-credit row is treated as absent -> MISSING downstream.
        assert!(table.get(married, 52_000).is_none());

        let single = HouseholdConfig::new(MaritalStatus::Single, 2).unwrap();
        assert_eq!(table.get(single, 12_500).unwrap().eitc_credit, 4_500.50);
    }

    #[test]
    fn economics_table_rejects_unknown_labels() {
        let file = csv_file("household,nominal_earnings,eitc_credit\nWidowed, 1 Kid,7500,100\n");
        assert!(load_economics_table(file.path()).is_err());
    }

    #[test]
    fn filer_table_cleans_excel_artifacts() {
        let file = csv_file(
            "cbsa,name,EAGI0_13,EAGI5_13,EQC0_13,EQC1_13,EQC2_13,EQC3_13,eitc13\n\
             =\"10180\",Abilene,\"1,200\",900,400,300,200,100,\"1,000\"\n",
        );
        let table = load_filer_table(file.path()).unwrap();
        assert_eq!(table.bracket_labels, vec!["EAGI0_13", "EAGI5_13"]);

        let row = table.rows.get("10180").unwrap();
        assert_eq!(row.bracket_counts, vec![1_200.0, 900.0]);
        assert_eq!(row.child_counts, [400.0, 300.0, 200.0, 100.0]);
        assert_eq!(row.total_eligible, 1_000.0);
    }

    #[test]
    fn filer_table_requires_all_child_columns() {
        let file = csv_file("cbsa,EAGI0_13,EQC0_13,eitc13\n10180,100,50,60\n");
        let err = load_filer_table(file.path()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn msa_intersection_drops_unmatched_codes() {
        let rent_file = csv_file(
            "cbsa,fmr1,fmr2,fmr3\n\
             10180,500,650,800\n\
             99999,400,500,600\n",
        );
        let filer_file = csv_file(
            "cbsa,EAGI0_13,EQC0_13,EQC1_13,EQC2_13,EQC3_13,eitc13\n\
             10180,100,40,30,20,10,100\n\
             11111,100,40,30,20,10,100\n",
        );
        let rents = load_rent_table(rent_file.path()).unwrap();
        let filers = load_filer_table(filer_file.path()).unwrap();

        let msas = intersect_msas(&rents, &filers).unwrap();
        assert_eq!(msas, vec!["10180".to_string()]);
    }

    #[test]
    fn empty_msa_intersection_is_fatal() {
        let rent_file = csv_file("cbsa,fmr1,fmr2,fmr3\n99999,500,650,800\n");
        let filer_file = csv_file(
            "cbsa,EAGI0_13,EQC0_13,EQC1_13,EQC2_13,EQC3_13,eitc13\n\
             10180,100,40,30,20,10,100\n",
        );
        let rents = load_rent_table(rent_file.path()).unwrap();
        let filers = load_filer_table(filer_file.path()).unwrap();

        let err = intersect_msas(&rents, &filers).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }
}
