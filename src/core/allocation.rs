use crate::core::analytics::{BitcoinPosition, round2};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetCategory {
    Gold,
    Bitcoin,
    Cash,
}

impl AssetCategory {
    /// Returns display name and emoji for the category
    pub fn display_info(&self) -> (&'static str, &'static str) {
        match self {
            AssetCategory::Gold => ("Gold", "🥇"),
            AssetCategory::Bitcoin => ("Bitcoin", "₿"),
            AssetCategory::Cash => ("Cash", "💵"),
        }
    }
}

/// Value of one asset category, in thousands of the base currency.
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationEntry {
    pub category: AssetCategory,
    pub value: f64,
}

/// Converts millions to thousands, rounded to two decimals after the conversion.
pub fn millions_to_thousands(value: f64) -> f64 {
    round2(value * 1000.0)
}

/// Builds the gold, bitcoin and cash entries, always in that order.
pub fn build_allocation(
    total_gold_value: f64,
    bitcoin: Option<&BitcoinPosition>,
    total_cash_millions: f64,
) -> Vec<AllocationEntry> {
    vec![
        AllocationEntry {
            category: AssetCategory::Gold,
            value: total_gold_value,
        },
        AllocationEntry {
            category: AssetCategory::Bitcoin,
            value: bitcoin.map_or(0.0, |b| b.market_value),
        },
        AllocationEntry {
            category: AssetCategory::Cash,
            value: millions_to_thousands(total_cash_millions),
        },
    ]
}

pub fn total_value(entries: &[AllocationEntry]) -> f64 {
    entries.iter().map(|e| e.value).sum()
}

/// Share of `entry` in `total` as a percentage, or 0 when the total is not positive.
pub fn share_percentage(entry: &AllocationEntry, total: f64) -> f64 {
    if total > 0.0 {
        entry.value / total * 100.0
    } else {
        0.0
    }
}

/// Splits a value in thousands into whole millions and the remaining thousands.
pub fn split_thousands(total: f64) -> (i64, i64) {
    let millions = (total / 1000.0).floor();
    let thousands = (total - millions * 1000.0).floor();
    (millions as i64, thousands as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_allocation_without_bitcoin() {
        let entries = build_allocation(1000.0, None, 2.0);

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].category, AssetCategory::Gold);
        assert_eq!(entries[0].value, 1000.0);
        assert_eq!(entries[1].category, AssetCategory::Bitcoin);
        assert_eq!(entries[1].value, 0.0);
        assert_eq!(entries[2].category, AssetCategory::Cash);
        assert_eq!(entries[2].value, 2000.0);
    }

    #[test]
    fn test_build_allocation_with_bitcoin() {
        let position = BitcoinPosition {
            amount: 0.01,
            fund_value: 20000.0,
            market_value: 25000.0,
            profit: 5000.0,
        };
        let entries = build_allocation(5000.0, Some(&position), 20.0);

        assert_eq!(entries[1].value, 25000.0);
        let total = total_value(&entries);
        assert_eq!(total, 50000.0);
        assert_eq!(share_percentage(&entries[1], total), 50.0);
        assert_eq!(share_percentage(&entries[2], total), 40.0);
    }

    #[test]
    fn test_millions_to_thousands_rounds_after_conversion() {
        assert_eq!(millions_to_thousands(2.0), 2000.0);
        assert_eq!(millions_to_thousands(0.0012345), 1.23);
        assert_eq!(millions_to_thousands(1.1), 1100.0);
    }

    #[test]
    fn test_share_percentage_of_empty_total() {
        let entries = build_allocation(0.0, None, 0.0);
        assert_eq!(share_percentage(&entries[0], total_value(&entries)), 0.0);
    }

    #[test]
    fn test_split_thousands() {
        assert_eq!(split_thousands(12345.6), (12, 345));
        assert_eq!(split_thousands(999.0), (0, 999));
        assert_eq!(split_thousands(0.0), (0, 0));
    }
}
