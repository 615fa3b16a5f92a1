//! Filer-weight tensor construction.
//!
//! The filer table gives, per MSA, absolute filer counts by income bracket
//! and eligible-filer counts by child count, plus a total-eligible marginal.
//! Two derivation steps turn that into per-(bracket, config, MSA) weights:
//!
//! 1. Proportional child allocation: each bracket count is multiplied by the
//!    MSA's child-count proportion `child_counts[c] / total_eligible`. This
//!    assumes the child-count distribution has the same shape in every income
//!    bracket — an approximation, not an exact cross-tabulation.
//! 2. Married/single split by a fixed demographic share `p`:
//!    `married = raw * p`, `single = raw - married`, so the two sub-counts
//!    always sum back to the raw cell exactly.

use crate::domain::{
    FilerDistributionTable, HouseholdConfig, MaritalStatus, PolicyParams,
};
use crate::error::AppError;

/// Rank-3 filer-weight structure with named axes: (bracket, config, MSA).
///
/// The bracket axis keeps the source table's own binning (and ordering); the
/// aggregator is responsible for pairing it positionally with the aid
/// tensor's income grid.
#[derive(Debug, Clone, PartialEq)]
pub struct FilerTensor {
    pub brackets: Vec<String>,
    pub configs: Vec<HouseholdConfig>,
    pub msas: Vec<String>,
    /// Row-major `[bracket][config][msa]`.
    values: Vec<f64>,
}

impl FilerTensor {
    fn index(&self, bracket_pos: usize, config_pos: usize, msa_pos: usize) -> usize {
        (bracket_pos * self.configs.len() + config_pos) * self.msas.len() + msa_pos
    }

    pub fn get(&self, bracket_pos: usize, config_pos: usize, msa_pos: usize) -> f64 {
        self.values[self.index(bracket_pos, config_pos, msa_pos)]
    }
}

/// Derive the filer-weight tensor for the working MSA axis.
///
/// `msas` must be a subset of the table's rows (the intersected working set).
pub fn build_filer_tensor(
    table: &FilerDistributionTable,
    msas: &[String],
    policy: &PolicyParams,
) -> Result<FilerTensor, AppError> {
    let brackets = table.bracket_labels.clone();
    let configs = HouseholdConfig::ALL.to_vec();

    let mut values = vec![0.0; brackets.len() * configs.len() * msas.len()];
    let tensor_index = |b: usize, c: usize, m: usize| (b * configs.len() + c) * msas.len() + m;

    for (m, msa) in msas.iter().enumerate() {
        let row = table.rows.get(msa).ok_or_else(|| {
            AppError::internal(format!("Filer table lost MSA {msa} after intersection."))
        })?;
        if row.bracket_counts.len() != brackets.len() {
            return Err(AppError::internal(format!(
                "MSA {msa} has {} bracket counts for {} bracket columns.",
                row.bracket_counts.len(),
                brackets.len()
            )));
        }

        let proportions = child_proportions(row.total_eligible, &row.child_counts);

        for (b, &count) in row.bracket_counts.iter().enumerate() {
            // The top source bracket is twice as wide as its grid point
            // represents; optionally keep only half of it.
            let count = if policy.halve_top_bracket && b == brackets.len() - 1 {
                count / 2.0
            } else {
                count
            };

            for (c, &config) in configs.iter().enumerate() {
                let raw = count * proportions[config.children as usize];
                let married = raw * policy.married_share;
                let weight = match config.marital {
                    MaritalStatus::Married => married,
                    // Complement of the married cut, so married + single
                    // reconstructs the raw cell exactly.
                    MaritalStatus::Single => raw - married,
                };
                values[tensor_index(b, c, m)] = weight;
            }
        }
    }

    Ok(FilerTensor {
        brackets,
        configs,
        msas: msas.to_vec(),
        values,
    })
}

/// Child-count proportions for one MSA.
///
/// Swappable allocation policy (see DESIGN.md): currently the simple
/// marginal ratio, assuming the same child-count mix in every bracket.
fn child_proportions(total_eligible: f64, child_counts: &[f64; 4]) -> [f64; 4] {
    let mut out = [0.0; 4];
    if total_eligible > 0.0 {
        for (slot, &count) in out.iter_mut().zip(child_counts) {
            *slot = count / total_eligible;
        }
    }
    out
}
