//! Full portfolio valuation for one set of market prices.

use crate::core::allocation::{AllocationEntry, build_allocation};
use crate::core::analytics::{
    BitcoinPosition, GoldHoldingValue, GoldTotals, gold_totals, sum_cash, value_bitcoin_position,
    value_gold_holdings,
};
use crate::core::config::{BitcoinHoldingConfig, HoldingsConfig};
use crate::core::holdings::{CashEntry, parse_cash_entries, parse_gold_holdings, parse_lenient};
use crate::core::{BitcoinPrice, GoldPrice, ValuationError};

#[derive(Debug, Clone)]
pub struct GoldSection {
    pub values: Vec<GoldHoldingValue>,
    pub totals: GoldTotals,
}

#[derive(Debug, Clone)]
pub struct CashSection {
    pub entries: Vec<CashEntry>,
    pub total: f64,
}

/// Each section is evaluated independently. A section in error contributes
/// nothing to the allocation but does not hide the other sections.
#[derive(Debug, Clone)]
pub struct PortfolioReport {
    pub gold: Result<GoldSection, ValuationError>,
    pub bitcoin: Option<BitcoinPosition>,
    pub cash: Result<CashSection, ValuationError>,
    pub allocation: Vec<AllocationEntry>,
}

impl PortfolioReport {
    pub fn evaluate(
        holdings: &HoldingsConfig,
        gold_prices: &[GoldPrice],
        bitcoin_price: Option<&BitcoinPrice>,
    ) -> Self {
        let gold = evaluate_gold(&holdings.gold, gold_prices);
        let bitcoin = bitcoin_price.and_then(|price| evaluate_bitcoin(&holdings.bitcoin, price));
        let cash = parse_cash_entries(&holdings.cash).map(|entries| CashSection {
            total: sum_cash(&entries),
            entries,
        });

        let allocation = build_allocation(
            gold.as_ref().map_or(0.0, |g| g.totals.total_current_value),
            bitcoin.as_ref(),
            cash.as_ref().map_or(0.0, |c| c.total),
        );

        Self {
            gold,
            bitcoin,
            cash,
            allocation,
        }
    }
}

fn evaluate_gold(input: &str, prices: &[GoldPrice]) -> Result<GoldSection, ValuationError> {
    let holdings = parse_gold_holdings(input)?;
    let values = value_gold_holdings(&holdings, prices)?;
    Ok(GoldSection {
        totals: gold_totals(&values),
        values,
    })
}

fn evaluate_bitcoin(input: &BitcoinHoldingConfig, price: &BitcoinPrice) -> Option<BitcoinPosition> {
    value_bitcoin_position(
        parse_lenient(&input.amount),
        parse_lenient(&input.fund_value),
        parse_lenient(&input.usd_price),
        price,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::allocation::AssetCategory;
    use chrono::Utc;

    fn prices() -> Vec<GoldPrice> {
        vec![
            GoldPrice::new("PNJ", 8600.0, 8500.0, "now".into()),
            GoldPrice::new("DOJI", 8650.0, 8520.0, "now".into()),
        ]
    }

    fn bitcoin(current_price: f64) -> BitcoinPrice {
        BitcoinPrice {
            current_price,
            previous_price: current_price,
            diff: 0.0,
            updated_at: Utc::now(),
        }
    }

    fn holdings(gold: &str, cash: &str, amount: &str) -> HoldingsConfig {
        HoldingsConfig {
            gold: gold.to_string(),
            cash: cash.to_string(),
            bitcoin: BitcoinHoldingConfig {
                amount: amount.to_string(),
                fund_value: "100".to_string(),
                usd_price: "25000".to_string(),
            },
        }
    }

    #[test]
    fn test_evaluate_all_sections() {
        let report = PortfolioReport::evaluate(
            &holdings("pnj,4200,0.5\ndoji,8000,1", "2 savings\n1.5", "1"),
            &prices(),
            Some(&bitcoin(0.004)),
        );

        let gold = report.gold.unwrap();
        assert_eq!(gold.values.len(), 2);
        assert_eq!(gold.totals.total_current_value, 4250.0 + 8520.0);

        let bitcoin = report.bitcoin.unwrap();
        assert_eq!(bitcoin.market_value, 100.0);
        assert_eq!(bitcoin.profit, 0.0);

        assert_eq!(report.cash.unwrap().total, 3.5);

        let values: Vec<_> = report.allocation.iter().map(|e| e.value).collect();
        assert_eq!(values, vec![12770.0, 100.0, 3500.0]);
    }

    #[test]
    fn test_gold_error_is_isolated() {
        let report = PortfolioReport::evaluate(
            &holdings("sjc,4200,0.5", "2", "0"),
            &prices(),
            None,
        );

        assert_eq!(
            report.gold.unwrap_err().to_string(),
            "Invalid seller code: 'sjc'. Valid sellers: PNJ, DOJI"
        );
        assert!(report.bitcoin.is_none());
        assert_eq!(report.cash.unwrap().total, 2.0);
        assert_eq!(report.allocation[0].category, AssetCategory::Gold);
        assert_eq!(report.allocation[0].value, 0.0);
        assert_eq!(report.allocation[2].value, 2000.0);
    }

    #[test]
    fn test_cash_error_is_isolated() {
        let report = PortfolioReport::evaluate(&holdings("pnj,4200,0.5", "abc", ""), &prices(), None);

        assert!(matches!(report.cash, Err(ValuationError::InvalidCashLine { .. })));
        assert!(report.gold.is_ok());
        assert_eq!(report.allocation[2].value, 0.0);
    }

    #[test]
    fn test_bitcoin_requires_a_price() {
        let report = PortfolioReport::evaluate(&holdings("", "", "1"), &prices(), None);
        assert!(report.bitcoin.is_none());
        assert_eq!(report.allocation[1].value, 0.0);
    }

    #[test]
    fn test_bitcoin_lenient_inputs() {
        let report =
            PortfolioReport::evaluate(&holdings("", "", "lots"), &prices(), Some(&bitcoin(1.0)));
        assert!(report.bitcoin.is_none());
    }
}
