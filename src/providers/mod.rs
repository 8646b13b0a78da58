pub mod aggregator;
pub mod binance;
pub mod doji;
pub mod gold;
pub mod mihong;
pub mod pnj;
pub mod util;

pub use aggregator::GoldPriceAggregator;
pub use binance::BinanceTracker;
pub use gold::GoldFetcher;
