//! Per-household aid calculation and aid-tensor assembly.
//!
//! `compute_aid` is a pure function over injected reference tables: given one
//! household configuration and one income level it produces the aid gap for
//! every MSA. `assemble_aid_tensor` evaluates the full cross product of the
//! income grid and the 8 configurations; the (income, config) pairs are
//! independent, so the sweep is parallel.

use rayon::prelude::*;

use crate::domain::{HouseholdConfig, HouseholdEconomicsTable, PolicyParams, RentBenchmark, TensorFile};
use crate::model::category::bedroom_category;

/// Rank-3 aid structure with named axes: (income level, config, MSA).
///
/// `None` cells mark a missing household-economics record — "no data",
/// which callers must distinguish from an aid value of `0.0` ("no aid
/// needed").
#[derive(Debug, Clone, PartialEq)]
pub struct AidTensor {
    pub incomes: Vec<u32>,
    pub configs: Vec<HouseholdConfig>,
    pub msas: Vec<String>,
    /// Row-major `[income][config][msa]`.
    values: Vec<Option<f64>>,
}

impl AidTensor {
    fn index(&self, income_pos: usize, config_pos: usize, msa_pos: usize) -> usize {
        (income_pos * self.configs.len() + config_pos) * self.msas.len() + msa_pos
    }

    pub fn get(&self, income_pos: usize, config_pos: usize, msa_pos: usize) -> Option<f64> {
        self.values[self.index(income_pos, config_pos, msa_pos)]
    }

    /// Number of MISSING cells (each missing (config, income) pair counts
    /// once per MSA).
    pub fn missing_cell_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_none()).count()
    }

    /// The (income, config) pairs with no household-economics record.
    ///
    /// A pair is either fully populated or fully missing across MSAs, so
    /// checking the first MSA slot is sufficient.
    pub fn missing_pairs(&self) -> Vec<(u32, HouseholdConfig)> {
        let mut out = Vec::new();
        if self.msas.is_empty() {
            return out;
        }
        for (i, &income) in self.incomes.iter().enumerate() {
            for (c, &config) in self.configs.iter().enumerate() {
                if self.get(i, c, 0).is_none() {
                    out.push((income, config));
                }
            }
        }
        out
    }

    /// Portable JSON representation for downstream inspection.
    pub fn to_file(&self) -> TensorFile {
        TensorFile {
            tool: "aidgap".to_string(),
            incomes: self.incomes.clone(),
            configs: self.configs.iter().map(|c| c.label()).collect(),
            msas: self.msas.clone(),
            values: self.values.clone(),
        }
    }
}

/// Compute the aid gap for one (config, income) pair across all MSAs.
///
/// `rents` must be aligned with the working MSA axis (one entry per MSA, in
/// axis order). Returns `None` when the household-economics table has no
/// record for the pair — MISSING for every MSA, not zero.
pub fn compute_aid(
    config: HouseholdConfig,
    income: u32,
    economics: &HouseholdEconomicsTable,
    rents: &[RentBenchmark],
    policy: &PolicyParams,
) -> Option<Vec<f64>> {
    let record = economics.get(config, income)?;

    // Shared across MSAs: the affordable rent ceiling for this household.
    let affordable = policy.affordable_share * (record.nominal_earnings + record.eitc_credit);
    let category = bedroom_category(config);

    Some(
        rents
            .iter()
            .map(|rent| (rent.get(category) - affordable).max(0.0))
            .collect(),
    )
}

/// Evaluate the full (income grid × configurations) cross product and
/// assemble the rank-3 aid tensor.
pub fn assemble_aid_tensor(
    incomes: Vec<u32>,
    configs: Vec<HouseholdConfig>,
    msas: Vec<String>,
    economics: &HouseholdEconomicsTable,
    rents: &[RentBenchmark],
    policy: &PolicyParams,
) -> AidTensor {
    debug_assert_eq!(rents.len(), msas.len());

    let pairs: Vec<(u32, HouseholdConfig)> = incomes
        .iter()
        .flat_map(|&income| configs.iter().map(move |&config| (income, config)))
        .collect();

    // Each (income, config) slice is independent; order is preserved by the
    // indexed collect.
    let slices: Vec<Option<Vec<f64>>> = pairs
        .par_iter()
        .map(|&(income, config)| compute_aid(config, income, economics, rents, policy))
        .collect();

    let msa_count = msas.len();
    let mut values = Vec::with_capacity(pairs.len() * msa_count);
    for slice in slices {
        match slice {
            Some(aid) => values.extend(aid.into_iter().map(Some)),
            None => values.extend(std::iter::repeat_n(None, msa_count)),
        }
    }

    AidTensor {
        incomes,
        configs,
        msas,
        values,
    }
}
