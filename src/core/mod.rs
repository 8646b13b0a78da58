//! Core business logic abstractions

pub mod allocation;
pub mod analytics;
pub mod cache;
pub mod config;
pub mod errors;
pub mod holdings;
pub mod log;
pub mod price;
pub mod report;

// Re-export main types for cleaner imports
pub use errors::ValuationError;
pub use price::{BitcoinPrice, BitcoinPriceProvider, GoldPrice, GoldPriceProvider};
