//! Parsing of the free-text holdings the user types in.
//!
//! Gold holdings are one `seller,buy price,amount` triple per line, with the buy
//! price in thousands. Cash entries are one `amount [comment]` per line, in millions.
//! Blank lines are ignored. A single malformed line rejects the whole input.

use crate::core::errors::ValuationError;

/// A gold purchase as entered by the user.
#[derive(Debug, Clone, PartialEq)]
pub struct GoldHolding {
    pub seller: String,
    /// Total cost paid, in thousands.
    pub buy_price: f64,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CashEntry {
    /// Amount in millions.
    pub amount: f64,
    pub comment: Option<String>,
}

fn non_blank_lines(input: &str) -> impl Iterator<Item = &str> {
    input.lines().filter(|line| !line.trim().is_empty())
}

pub fn parse_gold_holdings(input: &str) -> Result<Vec<GoldHolding>, ValuationError> {
    non_blank_lines(input)
        .map(|line| {
            let invalid = || ValuationError::InvalidGoldLine {
                line: line.to_string(),
            };

            let parts: Vec<&str> = line.split(',').collect();
            let [seller, buy_price, amount] = parts.as_slice() else {
                return Err(invalid());
            };

            let buy_price: f64 = buy_price.trim().parse().map_err(|_| invalid())?;
            let amount: f64 = amount.trim().parse().map_err(|_| invalid())?;
            if !buy_price.is_finite() || !amount.is_finite() {
                return Err(invalid());
            }

            Ok(GoldHolding {
                seller: seller.trim().to_string(),
                buy_price,
                amount,
            })
        })
        .collect()
}

pub fn parse_cash_entries(input: &str) -> Result<Vec<CashEntry>, ValuationError> {
    non_blank_lines(input)
        .map(|line| {
            let line = line.trim();
            let (amount, comment) = match line.split_once(char::is_whitespace) {
                Some((amount, rest)) => (amount, Some(rest.trim_start().to_string())),
                None => (line, None),
            };

            let amount: f64 = amount
                .parse()
                .ok()
                .filter(|a: &f64| a.is_finite())
                .ok_or_else(|| ValuationError::InvalidCashLine {
                    line: line.to_string(),
                })?;

            Ok(CashEntry {
                amount,
                comment: comment.filter(|c| !c.is_empty()),
            })
        })
        .collect()
}

/// Parses a numeric form field, treating anything unparseable as 0.
pub fn parse_lenient(value: &str) -> f64 {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}
