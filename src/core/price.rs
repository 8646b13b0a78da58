//! Price records and the provider abstractions that produce them

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Buy/sell snapshot for one gold seller. Prices are in thousands of the base currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoldPrice {
    pub seller: String,
    pub sell_price: f64,
    pub buy_price: f64,
    /// Update time as reported by the seller, kept verbatim.
    pub updated_at: String,
    #[serde(default)]
    pub sell_diff: f64,
    #[serde(default)]
    pub buy_diff: f64,
}

impl GoldPrice {
    pub fn new(seller: &str, sell_price: f64, buy_price: f64, updated_at: String) -> Self {
        Self {
            seller: seller.to_string(),
            sell_price,
            buy_price,
            updated_at,
            sell_diff: 0.0,
            buy_diff: 0.0,
        }
    }

    /// Difference between what the seller charges and what it pays back.
    pub fn spread(&self) -> f64 {
        self.sell_price - self.buy_price
    }

    /// Key used for case-insensitive lookups by seller.
    pub fn seller_key(&self) -> String {
        self.seller.to_lowercase()
    }
}

/// Bitcoin quote with the change against the last successful quote of this process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BitcoinPrice {
    pub current_price: f64,
    pub previous_price: f64,
    pub diff: f64,
    pub updated_at: DateTime<Utc>,
}

/// A source of gold prices. Failures degrade to the best known value or `None`.
#[async_trait]
pub trait GoldPriceProvider: Send + Sync {
    fn seller(&self) -> &str;
    async fn fetch_price(&self) -> Option<GoldPrice>;
}

#[async_trait]
pub trait BitcoinPriceProvider: Send + Sync {
    async fn fetch_price(&self) -> Option<BitcoinPrice>;
}
