use crate::core::cache::KeyValueCollection;
use crate::core::{GoldPrice, GoldPriceProvider};
use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Fetches every configured gold seller concurrently and annotates each price
/// with its change since the previous cycle.
///
/// The baseline collection holds the last price seen per seller. A cycle reads
/// the old baseline, writes the new prices, and only then computes the diffs, so
/// a seller that failed this cycle keeps its previous baseline entry.
///
/// Cycles are numbered when they start. A cycle that finishes after a newer one
/// already saved its prices diffs against that baseline but does not overwrite it.
pub struct GoldPriceAggregator {
    providers: Vec<Arc<dyn GoldPriceProvider>>,
    baseline: Arc<dyn KeyValueCollection>,
    next_cycle: AtomicU64,
    // Number of the newest cycle whose prices are in the baseline.
    last_saved: Mutex<Option<u64>>,
}

impl GoldPriceAggregator {
    pub fn new(
        providers: Vec<Arc<dyn GoldPriceProvider>>,
        baseline: Arc<dyn KeyValueCollection>,
    ) -> Self {
        Self {
            providers,
            baseline,
            next_cycle: AtomicU64::new(0),
            last_saved: Mutex::new(None),
        }
    }

    /// Returns one price per reachable seller, in configuration order.
    pub async fn fetch_all(&self) -> Vec<GoldPrice> {
        let cycle = self.next_cycle.fetch_add(1, Ordering::SeqCst);
        let results = join_all(self.providers.iter().map(|p| p.fetch_price())).await;

        let mut seen = HashSet::new();
        let mut prices = Vec::with_capacity(results.len());
        for price in results.into_iter().flatten() {
            if seen.insert(price.seller_key()) {
                prices.push(price);
            } else {
                warn!("Ignoring duplicate price for seller {}", price.seller);
            }
        }

        let mut last_saved = self.last_saved.lock().await;
        let mut previous = Vec::with_capacity(prices.len());
        for price in &prices {
            previous.push(self.load_baseline(&price.seller_key()).await);
        }
        if last_saved.is_none_or(|saved| cycle > saved) {
            self.save_baseline(&prices).await;
            *last_saved = Some(cycle);
        } else {
            debug!("Cycle {} finished late, keeping the newer baseline", cycle);
        }
        drop(last_saved);

        prices
            .into_iter()
            .zip(previous)
            .map(|(mut price, previous)| {
                if let Some(previous) = previous {
                    price.sell_diff = price.sell_price - previous.sell_price;
                    price.buy_diff = price.buy_price - previous.buy_price;
                }
                price
            })
            .collect()
    }

    /// Forgets every stored price so the next cycle reports no change.
    pub async fn reset_baseline(&self) {
        let _last_saved = self.last_saved.lock().await;
        self.baseline.clear().await;
    }

    async fn load_baseline(&self, seller_key: &str) -> Option<GoldPrice> {
        let raw = self.baseline.get(seller_key.as_bytes()).await?;
        match serde_json::from_slice(&raw) {
            Ok(price) => Some(price),
            Err(e) => {
                warn!("Discarding unreadable baseline for {}: {}", seller_key, e);
                None
            }
        }
    }

    async fn save_baseline(&self, prices: &[GoldPrice]) {
        for price in prices {
            match serde_json::to_vec(price) {
                Ok(raw) => self.baseline.put(price.seller_key().as_bytes(), &raw).await,
                Err(e) => warn!("Failed to serialize baseline for {}: {}", price.seller, e),
            }
        }
        debug!("Saved baseline for {} sellers", prices.len());
    }
}
