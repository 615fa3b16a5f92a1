//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during estimation
//! - exported to JSON/CSV
//! - reloaded later for inspection or comparisons

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Marital status of the tax-filing household.
///
/// Ordering (`Married < Single`) fixes the enumeration order of the eight
/// household configurations, which in turn fixes the config axis of both
/// tensors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaritalStatus {
    Married,
    Single,
}

impl MaritalStatus {
    pub fn display_name(self) -> &'static str {
        match self {
            MaritalStatus::Married => "Married",
            MaritalStatus::Single => "Single",
        }
    }
}

/// One of the eight household configurations: marital status × number of
/// qualifying children (0–3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HouseholdConfig {
    pub marital: MaritalStatus,
    pub children: u8,
}

/// Highest child count tracked by the EITC tables (3 means "3 or more").
pub const MAX_CHILDREN: u8 = 3;

impl HouseholdConfig {
    /// The full 8-element domain, in axis order: Married 0–3, then Single 0–3.
    pub const ALL: [HouseholdConfig; 8] = [
        HouseholdConfig { marital: MaritalStatus::Married, children: 0 },
        HouseholdConfig { marital: MaritalStatus::Married, children: 1 },
        HouseholdConfig { marital: MaritalStatus::Married, children: 2 },
        HouseholdConfig { marital: MaritalStatus::Married, children: 3 },
        HouseholdConfig { marital: MaritalStatus::Single, children: 0 },
        HouseholdConfig { marital: MaritalStatus::Single, children: 1 },
        HouseholdConfig { marital: MaritalStatus::Single, children: 2 },
        HouseholdConfig { marital: MaritalStatus::Single, children: 3 },
    ];

    pub fn new(marital: MaritalStatus, children: u8) -> Option<Self> {
        if children > MAX_CHILDREN {
            return None;
        }
        Some(HouseholdConfig { marital, children })
    }

    /// Canonical label, matching the household-economics table's category
    /// strings: `"Married, 0 Kid"`, `"Single, 2 Kids"`, ...
    pub fn label(self) -> String {
        let kid = if self.children == 1 || self.children == 0 { "Kid" } else { "Kids" };
        format!("{}, {} {kid}", self.marital.display_name(), self.children)
    }

    /// Parse a category label of the form `"Married, 2 Kids"`.
    ///
    /// Tolerates the `", Nominal"` suffix some source sheets carry.
    pub fn parse_label(label: &str) -> Option<Self> {
        let trimmed = label.trim().trim_end_matches(", Nominal");
        let marital = if trimmed.starts_with("Married") {
            MaritalStatus::Married
        } else if trimmed.starts_with("Single") {
            MaritalStatus::Single
        } else {
            return None;
        };
        let children = trimmed.chars().find_map(|c| c.to_digit(10))? as u8;
        HouseholdConfig::new(marital, children)
    }
}

/// Bedroom-size benchmark category used to pick the fair-market rent column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BedroomCategory {
    One,
    Two,
    Three,
}

impl BedroomCategory {
    /// Column name in the rent-benchmark table.
    pub fn column_name(self) -> &'static str {
        match self {
            BedroomCategory::One => "fmr1",
            BedroomCategory::Two => "fmr2",
            BedroomCategory::Three => "fmr3",
        }
    }
}

/// External policy parameters, exposed as named configuration so the model
/// can be recalibrated without code changes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PolicyParams {
    /// Share of filers assumed married when splitting raw filer counts.
    pub married_share: f64,
    /// Portion of total income considered the affordable ceiling for rent.
    pub affordable_share: f64,
    /// Halve the top income bracket's filer count. The topmost source
    /// bracket spans $50–60k while its grid point (52k) represents only the
    /// lower half of the bracket.
    pub halve_top_bracket: bool,
}

/// Married share of tax filers (demographic estimate; see DESIGN.md).
pub const DEFAULT_MARRIED_SHARE: f64 = 0.498;

/// Standard affordability rule: 30% of total income.
pub const DEFAULT_AFFORDABLE_SHARE: f64 = 0.30;

impl Default for PolicyParams {
    fn default() -> Self {
        PolicyParams {
            married_share: DEFAULT_MARRIED_SHARE,
            affordable_share: DEFAULT_AFFORDABLE_SHARE,
            halve_top_bracket: true,
        }
    }
}

impl PolicyParams {
    pub fn validate(&self) -> Result<(), AppError> {
        if !(self.married_share.is_finite() && (0.0..=1.0).contains(&self.married_share)) {
            return Err(AppError::ingest(format!(
                "Married share must be in [0, 1]; got {}.",
                self.married_share
            )));
        }
        if !(self.affordable_share.is_finite() && self.affordable_share > 0.0 && self.affordable_share <= 1.0) {
            return Err(AppError::ingest(format!(
                "Affordable share must be in (0, 1]; got {}.",
                self.affordable_share
            )));
        }
        Ok(())
    }
}

/// Annualized benchmark rents for one MSA, by bedroom category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RentBenchmark {
    pub one_bedroom: f64,
    pub two_bedroom: f64,
    pub three_bedroom: f64,
}

impl RentBenchmark {
    pub fn get(&self, category: BedroomCategory) -> f64 {
        match category {
            BedroomCategory::One => self.one_bedroom,
            BedroomCategory::Two => self.two_bedroom,
            BedroomCategory::Three => self.three_bedroom,
        }
    }
}

/// Rent-benchmark table: normalized CBSA code → annual rents.
///
/// `BTreeMap` keeps MSA iteration deterministic.
pub type RentBenchmarkTable = BTreeMap<String, RentBenchmark>;

/// One household-economics record: what a household at this configuration
/// and income level earns and receives in EITC credit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EconRecord {
    pub nominal_earnings: f64,
    pub eitc_credit: f64,
}

/// Household-economics table keyed by (configuration, income level).
///
/// The income key is the nominal-earnings level in whole dollars; the aid
/// calculator looks records up at the exact grid values.
#[derive(Debug, Clone, Default)]
pub struct HouseholdEconomicsTable {
    records: BTreeMap<(HouseholdConfig, u32), EconRecord>,
}

impl HouseholdEconomicsTable {
    pub fn insert(&mut self, config: HouseholdConfig, income: u32, record: EconRecord) {
        self.records.insert((config, income), record);
    }

    pub fn get(&self, config: HouseholdConfig, income: u32) -> Option<&EconRecord> {
        self.records.get(&(config, income))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Raw filer-distribution row for one MSA.
#[derive(Debug, Clone, PartialEq)]
pub struct FilerRow {
    /// Absolute filer counts per income bracket, in bracket-column order.
    pub bracket_counts: Vec<f64>,
    /// Eligible-filer counts by child count (index = number of children).
    pub child_counts: [f64; 4],
    /// Total-eligible-filers marginal used for proportional allocation.
    pub total_eligible: f64,
}

/// Filer-distribution table: CBSA code → raw counts, plus the ordered
/// bracket labels taken from the source header.
#[derive(Debug, Clone, Default)]
pub struct FilerDistributionTable {
    pub bracket_labels: Vec<String>,
    pub rows: BTreeMap<String, FilerRow>,
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct EstimateConfig {
    pub rents_path: PathBuf,
    pub economics_path: PathBuf,
    pub filers_path: PathBuf,
    pub policy: PolicyParams,
    pub export_cells: Option<PathBuf>,
    pub export_tensor: Option<PathBuf>,
}

/// A saved aid-tensor file (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TensorFile {
    pub tool: String,
    /// Income grid levels (axis 0).
    pub incomes: Vec<u32>,
    /// Household-configuration labels (axis 1).
    pub configs: Vec<String>,
    /// Normalized CBSA codes (axis 2).
    pub msas: Vec<String>,
    /// Row-major values; `null` marks a missing household-economics cell.
    pub values: Vec<Option<f64>>,
}
