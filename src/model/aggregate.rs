//! Tensor aggregation: aid × filer weights → one total.
//!
//! The income axes of the two tensors come from different places — the aid
//! tensor uses the literal income grid, the filer tensor uses the source
//! table's own bracket columns — and are paired *positionally*. That pairing
//! is asserted here (equal cardinality or abort), never assumed.

use crate::error::AppError;
use crate::model::aid::AidTensor;
use crate::model::filers::FilerTensor;

/// Aggregation output: the scalar total plus data-gap accounting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregateResult {
    /// Total estimated unmet housing-aid dollars.
    pub total: f64,
    /// Cells that contributed a product to the total.
    pub cells_used: usize,
    /// Cells skipped because the aid value was MISSING. These contribute
    /// zero, which masks "no data" as "no aid"; the count is surfaced so the
    /// gap is visible rather than silent.
    pub missing_cells: usize,
}

/// Element-wise multiply the aligned tensors and sum to a single total.
pub fn aggregate(aid: &AidTensor, filers: &FilerTensor) -> Result<AggregateResult, AppError> {
    if aid.incomes.len() != filers.brackets.len() {
        return Err(AppError::AxisMismatch(format!(
            "Income axes cannot be paired: {} aid-grid levels vs {} filer brackets.",
            aid.incomes.len(),
            filers.brackets.len()
        )));
    }
    if aid.configs != filers.configs {
        return Err(AppError::AxisMismatch(
            "Household-configuration axes differ between the aid and filer tensors.".to_string(),
        ));
    }
    if aid.msas != filers.msas {
        return Err(AppError::MsaSetMismatch(
            "MSA axes differ between the aid and filer tensors.".to_string(),
        ));
    }

    let mut total = 0.0;
    let mut cells_used = 0;
    let mut missing_cells = 0;

    for income_pos in 0..aid.incomes.len() {
        for config_pos in 0..aid.configs.len() {
            for msa_pos in 0..aid.msas.len() {
                match aid.get(income_pos, config_pos, msa_pos) {
                    Some(value) => {
                        total += value * filers.get(income_pos, config_pos, msa_pos);
                        cells_used += 1;
                    }
                    None => missing_cells += 1,
                }
            }
        }
    }

    Ok(AggregateResult {
        total,
        cells_used,
        missing_cells,
    })
}
