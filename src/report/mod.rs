//! Reporting: data-gap accounting and coverage diagnostics.
//!
//! We keep formatting code in `format` so the tensor/aggregation code stays
//! clean and testable, and output changes stay localized.

use crate::domain::{FilerDistributionTable, HouseholdConfig};
use crate::model::aid::AidTensor;

pub mod format;

pub use format::format_run_summary;

/// Household-economics cells with no data, grouped by (income, config) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct MissingReport {
    /// Pairs with no economics record (each affects every MSA).
    pub pairs: Vec<(u32, HouseholdConfig)>,
    /// Total missing cells across MSAs.
    pub cell_count: usize,
}

/// Summarize the MISSING cells of an aid tensor.
pub fn missing_report(aid: &AidTensor) -> MissingReport {
    MissingReport {
        pairs: aid.missing_pairs(),
        cell_count: aid.missing_cell_count(),
    }
}

/// How much of the total-eligible marginal the bracket counts account for.
///
/// The proportional child allocation assumes the bracket counts and the
/// marginal describe the same filer population; this ratio shows how far
/// that holds per MSA.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoverageStats {
    pub min: f64,
    pub median: f64,
    pub max: f64,
}

/// Bracket-sum / total-eligible coverage over the working MSA set.
///
/// Returns `None` when no MSA has a positive marginal.
pub fn coverage_stats(table: &FilerDistributionTable, msas: &[String]) -> Option<CoverageStats> {
    let mut ratios: Vec<f64> = msas
        .iter()
        .filter_map(|msa| table.rows.get(msa))
        .filter(|row| row.total_eligible > 0.0)
        .map(|row| row.bracket_counts.iter().sum::<f64>() / row.total_eligible)
        .collect();

    if ratios.is_empty() {
        return None;
    }
    ratios.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    Some(CoverageStats {
        min: ratios[0],
        median: ratios[ratios.len() / 2],
        max: ratios[ratios.len() - 1],
    })
}
