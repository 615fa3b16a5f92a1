//! Formatted terminal output for an estimate run.

use crate::domain::PolicyParams;
use crate::model::aggregate::AggregateResult;
use crate::report::{CoverageStats, MissingReport};

/// Table-matching diagnostics gathered while loading inputs.
#[derive(Debug, Clone, Copy)]
pub struct RunDiagnostics {
    pub rent_msas: usize,
    pub filer_msas: usize,
    pub matched_msas: usize,
    pub income_levels: usize,
    pub bracket_columns: usize,
}

/// Format the full run summary: match diagnostics, policy, data gaps, total.
pub fn format_run_summary(
    policy: &PolicyParams,
    diag: &RunDiagnostics,
    aggregate: &AggregateResult,
    missing: &MissingReport,
    coverage: Option<CoverageStats>,
) -> String {
    let mut out = String::new();

    out.push_str("=== aidgap - MSA Housing-Aid Gap Estimate ===\n");
    out.push_str(&format!(
        "MSAs: {} matched ({} rent rows, {} filer rows)\n",
        diag.matched_msas, diag.rent_msas, diag.filer_msas
    ));
    out.push_str(&format!(
        "Axes: {} income levels (paired with {} filer brackets) x 8 household configs x {} MSAs\n",
        diag.income_levels, diag.bracket_columns, diag.matched_msas
    ));
    out.push_str(&format!(
        "Policy: married share {:.1}% | affordable share {:.0}% | top bracket {}\n",
        policy.married_share * 100.0,
        policy.affordable_share * 100.0,
        if policy.halve_top_bracket { "halved" } else { "full" }
    ));

    if let Some(stats) = coverage {
        out.push_str(&format!(
            "Bracket coverage of eligible-filer marginal: min {:.2} | median {:.2} | max {:.2}\n",
            stats.min, stats.median, stats.max
        ));
    }

    out.push_str("\nData gaps:\n");
    if missing.pairs.is_empty() {
        out.push_str("- none: every (income, config) pair had an economics record\n");
    } else {
        out.push_str(&format!(
            "- {} (income, config) pairs without economics records ({} cells treated as zero aid):\n",
            missing.pairs.len(),
            missing.cell_count
        ));
        for (income, config) in &missing.pairs {
            out.push_str(&format!("    ${income} / {}\n", config.label()));
        }
    }

    out.push_str(&format!(
        "\nCells aggregated: {}\n",
        aggregate.cells_used
    ));
    out.push_str(&format!(
        "Total estimated unmet housing aid: ${:.0}\n",
        aggregate.total
    ));

    out
}
