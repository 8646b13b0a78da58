use crate::core::cache::{Cache, Store};
use crate::core::config::AppConfig;
use crate::core::{BitcoinPrice, BitcoinPriceProvider, GoldPrice, GoldPriceProvider};
use crate::providers::util::http_client;
use crate::providers::{BinanceTracker, GoldFetcher, GoldPriceAggregator};
use crate::store::KeyValueStore;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

pub const BASELINE_COLLECTION: &str = "gold_baseline";

const SNAPSHOT_BUFFER: usize = 16;

/// Prices gathered by one polling cycle.
#[derive(Debug, Clone)]
pub struct MarketSnapshot {
    pub gold_prices: Vec<GoldPrice>,
    pub bitcoin_price: Option<BitcoinPrice>,
    pub taken_at: DateTime<Utc>,
}

pub struct Tracker {
    aggregator: GoldPriceAggregator,
    bitcoin: Arc<dyn BitcoinPriceProvider>,
}

impl Tracker {
    pub fn new(aggregator: GoldPriceAggregator, bitcoin: Arc<dyn BitcoinPriceProvider>) -> Self {
        Self {
            aggregator,
            bitcoin,
        }
    }

    /// Wires the fetchers described by `config` to the baseline in `store`.
    pub fn from_config(config: &AppConfig, store: &KeyValueStore) -> Result<Self> {
        let client = http_client()?;

        let gold_cache = Cache::new(config.cache_ttl());
        let providers = config
            .gold_sources
            .iter()
            .map(|source| {
                Arc::new(GoldFetcher::new(
                    source.clone(),
                    client.clone(),
                    gold_cache.clone(),
                )) as Arc<dyn GoldPriceProvider>
            })
            .collect();

        let baseline = store
            .get_collection(BASELINE_COLLECTION, true)
            .or_else(|| {
                warn!("Persistent baseline unavailable, price changes will not survive restarts");
                store.get_collection(BASELINE_COLLECTION, false)
            })
            .context("Failed to open the price baseline")?;

        let bitcoin = BinanceTracker::new(
            config.bitcoin.clone(),
            client,
            Cache::new(config.cache_ttl()),
        );

        Ok(Self::new(
            GoldPriceAggregator::new(providers, baseline),
            Arc::new(bitcoin),
        ))
    }

    pub fn aggregator(&self) -> &GoldPriceAggregator {
        &self.aggregator
    }

    /// Runs one polling cycle, fetching gold and bitcoin concurrently.
    pub async fn refresh(&self) -> MarketSnapshot {
        let (gold_prices, bitcoin_price) =
            tokio::join!(self.aggregator.fetch_all(), self.bitcoin.fetch_price());

        debug!(
            "Cycle finished with {} gold prices, bitcoin {}",
            gold_prices.len(),
            if bitcoin_price.is_some() { "available" } else { "unavailable" }
        );
        MarketSnapshot {
            gold_prices,
            bitcoin_price,
            taken_at: Utc::now(),
        }
    }

    /// Starts a cycle now and then once per `interval`.
    ///
    /// Each cycle runs in its own task, so a slow cycle never delays the next
    /// tick and cycles may overlap. Snapshots arrive in completion order.
    pub fn spawn_polling(
        self: Arc<Self>,
        interval: Duration,
    ) -> (PollHandle, mpsc::Receiver<MarketSnapshot>) {
        let (tx, rx) = mpsc::channel(SNAPSHOT_BUFFER);
        info!("Polling prices every {:?}", interval);

        let timer = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if tx.is_closed() {
                    debug!("Snapshot receiver dropped, polling ends");
                    break;
                }

                let tracker = Arc::clone(&self);
                let tx = tx.clone();
                tokio::spawn(async move {
                    let snapshot = tracker.refresh().await;
                    if tx.send(snapshot).await.is_err() {
                        debug!("Dropping snapshot, receiver is gone");
                    }
                });
            }
        });

        (PollHandle { timer }, rx)
    }
}

/// Stops the polling timer when stopped or dropped. Cycles already started
/// run to completion and still deliver their snapshot.
pub struct PollHandle {
    timer: JoinHandle<()>,
}

impl PollHandle {
    pub fn stop(&self) {
        self.timer.abort();
    }

    pub fn is_running(&self) -> bool {
        !self.timer.is_finished()
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.timer.abort();
    }
}
