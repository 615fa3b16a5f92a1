//! Household configuration → bedroom-size benchmark category.

use crate::domain::{BedroomCategory, HouseholdConfig};

/// Map a household configuration to its rent-benchmark bedroom category.
///
/// Fixed design constant: 0 kids → 1BR, 1–2 kids → 2BR, 3 kids → 3BR,
/// independent of marital status. Total over the 8-element domain; there is
/// no error case.
pub fn bedroom_category(config: HouseholdConfig) -> BedroomCategory {
    match config.children {
        0 => BedroomCategory::One,
        1 | 2 => BedroomCategory::Two,
        _ => BedroomCategory::Three,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MaritalStatus;

    #[test]
    fn mapping_depends_only_on_child_count() {
        for config in HouseholdConfig::ALL {
            let mirrored = HouseholdConfig {
                marital: match config.marital {
                    MaritalStatus::Married => MaritalStatus::Single,
                    MaritalStatus::Single => MaritalStatus::Married,
                },
                ..config
            };
            assert_eq!(bedroom_category(config), bedroom_category(mirrored));
        }
    }

    #[test]
    fn fixed_mapping_is_reproduced() {
        let expect = [
            (0, BedroomCategory::One),
            (1, BedroomCategory::Two),
            (2, BedroomCategory::Two),
            (3, BedroomCategory::Three),
        ];
        for (children, category) in expect {
            let config = HouseholdConfig::new(MaritalStatus::Single, children).unwrap();
            assert_eq!(bedroom_category(config), category);
        }
    }
}
