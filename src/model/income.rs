//! Income grid generation.
//!
//! Aid is evaluated at a fixed grid of income levels: the means of the
//! filer-table income brackets up to $40k, plus two higher-bracket means.
//! The grid is a constant of the system, not derived from input data.
//!
//! The stepped portion is generated with integer arithmetic so the grid
//! lands exactly on the endpoints with no float drift or duplicates.

/// Lowest stepped bracket mean.
const GRID_MIN: u32 = 2_500;
/// Highest stepped bracket mean.
const GRID_MAX: u32 = 37_500;
/// Bracket width.
const GRID_STEP: u32 = 5_000;
/// Means of the two wide top brackets ($40–50k and the halved $50–60k).
const EXTRA_LEVELS: [u32; 2] = [45_000, 52_000];

/// Build the exact ordered income grid:
/// `[2500, 7500, ..., 37500, 45000, 52000]` (10 values).
pub fn income_grid() -> Vec<u32> {
    (GRID_MIN..=GRID_MAX)
        .step_by(GRID_STEP as usize)
        .chain(EXTRA_LEVELS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_is_reproduced_exactly() {
        assert_eq!(
            income_grid(),
            vec![2_500, 7_500, 12_500, 17_500, 22_500, 27_500, 32_500, 37_500, 45_000, 52_000]
        );
    }

    #[test]
    fn grid_is_strictly_increasing() {
        let grid = income_grid();
        assert_eq!(grid.len(), 10);
        for pair in grid.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }
}
