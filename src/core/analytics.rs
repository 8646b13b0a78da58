//! Provides functions for valuing holdings against current market prices.
use crate::core::errors::ValuationError;
use crate::core::holdings::{CashEntry, GoldHolding};
use crate::core::price::{BitcoinPrice, GoldPrice};
use tracing::debug;

/// A gold holding annotated with its market value.
#[derive(Debug, Clone, PartialEq)]
pub struct GoldHoldingValue {
    pub holding: GoldHolding,
    pub current_value: f64,
    pub profit: f64,
}

impl GoldHoldingValue {
    pub fn profit_percentage(&self) -> f64 {
        profit_percentage(self.profit, self.holding.buy_price)
    }
}

/// Aggregate figures over all valued gold holdings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GoldTotals {
    pub total_buy_price: f64,
    pub total_current_value: f64,
    pub total_amount: f64,
    pub total_profit: f64,
    pub total_profit_percentage: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BitcoinPosition {
    pub amount: f64,
    pub fund_value: f64,
    pub market_value: f64,
    pub profit: f64,
}

impl BitcoinPosition {
    pub fn profit_percentage(&self) -> f64 {
        profit_percentage(self.profit, self.fund_value)
    }
}

/// Finds the price quoted by `seller`, ignoring case.
pub fn find_seller_price<'a>(
    seller: &str,
    prices: &'a [GoldPrice],
) -> Result<&'a GoldPrice, ValuationError> {
    let seller_key = seller.to_lowercase();
    prices
        .iter()
        .find(|p| p.seller_key() == seller_key)
        .ok_or_else(|| ValuationError::UnknownSeller {
            seller: seller.to_string(),
            valid: prices.iter().map(|p| p.seller.clone()).collect(),
        })
}

/// Values every holding at its seller's buy-back price.
///
/// Fails on the first holding whose seller has no price; no partial result is returned.
pub fn value_gold_holdings(
    holdings: &[GoldHolding],
    prices: &[GoldPrice],
) -> Result<Vec<GoldHoldingValue>, ValuationError> {
    holdings
        .iter()
        .map(|holding| {
            let price = find_seller_price(&holding.seller, prices)?;
            let current_value = holding.amount * price.buy_price;
            debug!(
                "Valued {} units at {}: {}",
                holding.amount, price.seller, current_value
            );
            Ok(GoldHoldingValue {
                holding: holding.clone(),
                current_value,
                profit: current_value - holding.buy_price,
            })
        })
        .collect()
}

pub fn gold_totals(values: &[GoldHoldingValue]) -> GoldTotals {
    let total_buy_price: f64 = values.iter().map(|v| v.holding.buy_price).sum();
    let total_current_value: f64 = values.iter().map(|v| v.current_value).sum();
    let total_amount: f64 = values.iter().map(|v| v.holding.amount).sum();
    let total_profit = total_current_value - total_buy_price;

    GoldTotals {
        total_buy_price,
        total_current_value,
        total_amount,
        total_profit,
        total_profit_percentage: profit_percentage(total_profit, total_buy_price),
    }
}

/// Values a bitcoin position. Returns `None` when amount, fund value or the USD rate is not positive.
pub fn value_bitcoin_position(
    amount: f64,
    fund_value: f64,
    usd_price: f64,
    bitcoin_price: &BitcoinPrice,
) -> Option<BitcoinPosition> {
    if amount <= 0.0 || fund_value <= 0.0 || usd_price <= 0.0 {
        return None;
    }

    let market_value = amount * bitcoin_price.current_price * usd_price;
    Some(BitcoinPosition {
        amount,
        fund_value,
        market_value,
        profit: market_value - fund_value,
    })
}

pub fn sum_cash(entries: &[CashEntry]) -> f64 {
    entries.iter().map(|e| e.amount).sum()
}

/// Profit as a percentage of `basis`, rounded to two decimals. Zero basis yields 0.
pub fn profit_percentage(profit: f64, basis: f64) -> f64 {
    if basis == 0.0 {
        return 0.0;
    }
    round2(profit / basis * 100.0)
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn gold_price(seller: &str, sell: f64, buy: f64) -> GoldPrice {
        GoldPrice::new(seller, sell, buy, "now".to_string())
    }

    fn bitcoin_price(current: f64) -> BitcoinPrice {
        BitcoinPrice {
            current_price: current,
            previous_price: current,
            diff: 0.0,
            updated_at: Utc::now(),
        }
    }

    fn holding(seller: &str, buy_price: f64, amount: f64) -> GoldHolding {
        GoldHolding {
            seller: seller.to_string(),
            buy_price,
            amount,
        }
    }

    #[test]
    fn test_value_gold_holdings() {
        let prices = vec![
            gold_price("PNJ", 8600.0, 8500.0),
            gold_price("DOJI", 8700.0, 8550.0),
        ];
        let holdings = vec![holding("pnj", 4200.0, 0.5), holding("Doji", 9000.0, 1.0)];

        let values = value_gold_holdings(&holdings, &prices).unwrap();

        assert_eq!(values.len(), 2);
        assert_eq!(values[0].current_value, 4250.0);
        assert_eq!(values[0].profit, 50.0);
        assert_eq!(values[1].current_value, 8550.0);
        assert_eq!(values[1].profit, -450.0);
        assert_eq!(values[1].profit_percentage(), -5.0);
    }

    #[test]
    fn test_value_gold_holdings_unknown_seller() {
        let prices = vec![
            gold_price("PNJ", 8600.0, 8500.0),
            gold_price("DOJI", 8700.0, 8550.0),
        ];
        let holdings = vec![holding("pnj", 4200.0, 0.5), holding("SJC", 9000.0, 1.0)];

        let err = value_gold_holdings(&holdings, &prices).unwrap_err();
        assert_eq!(
            err,
            ValuationError::UnknownSeller {
                seller: "SJC".to_string(),
                valid: vec!["PNJ".to_string(), "DOJI".to_string()],
            }
        );
    }

    #[test]
    fn test_value_gold_holdings_without_prices() {
        let err = value_gold_holdings(&[holding("pnj", 1.0, 1.0)], &[]).unwrap_err();
        assert_eq!(err.to_string(), "Invalid seller code: 'pnj'. Valid sellers: ");
        assert!(value_gold_holdings(&[], &[]).unwrap().is_empty());
    }

    #[test]
    fn test_gold_totals() {
        let prices = vec![gold_price("PNJ", 8600.0, 8500.0)];
        let holdings = vec![holding("pnj", 4200.0, 0.5), holding("PNJ", 8000.0, 1.0)];
        let values = value_gold_holdings(&holdings, &prices).unwrap();

        let totals = gold_totals(&values);
        assert_eq!(totals.total_buy_price, 12200.0);
        assert_eq!(totals.total_current_value, 12750.0);
        assert_eq!(totals.total_amount, 1.5);
        assert_eq!(totals.total_profit, 550.0);
        assert_eq!(totals.total_profit_percentage, 4.51);

        assert_eq!(gold_totals(&[]), GoldTotals::default());
    }

    #[test]
    fn test_value_bitcoin_position() {
        let price = bitcoin_price(0.004);

        assert!(value_bitcoin_position(0.0, 100.0, 1.0, &price).is_none());
        assert!(value_bitcoin_position(1.0, 0.0, 1.0, &price).is_none());
        assert!(value_bitcoin_position(1.0, 100.0, -1.0, &price).is_none());

        let position = value_bitcoin_position(1.0, 100.0, 25000.0, &price).unwrap();
        assert!((position.market_value - 100.0).abs() < 1e-9);
        assert!(position.profit.abs() < 1e-9);
    }

    #[test]
    fn test_sum_cash() {
        assert_eq!(sum_cash(&[]), 0.0);
        let entries = vec![
            CashEntry {
                amount: 150.0,
                comment: Some("rent".to_string()),
            },
            CashEntry {
                amount: 2.5,
                comment: None,
            },
        ];
        assert_eq!(sum_cash(&entries), 152.5);
    }

    #[test]
    fn test_profit_percentage() {
        assert_eq!(profit_percentage(50.0, 4200.0), 1.19);
        assert_eq!(profit_percentage(-1.0, 3.0), -33.33);
        assert_eq!(profit_percentage(10.0, 0.0), 0.0);
    }
}
