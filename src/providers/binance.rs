use super::util::fetch_text;
use crate::core::cache::Cache;
use crate::core::config::BitcoinSourceConfig;
use crate::core::{BitcoinPrice, BitcoinPriceProvider};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

const CACHE_KEY: &str = "bitcoin_price";

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawPrice {
    Text(String),
    Number(f64),
}

#[derive(Debug, Deserialize)]
struct AvgPriceResponse {
    price: RawPrice,
}

fn parse_price(body: &str) -> Result<f64> {
    let response: AvgPriceResponse = serde_json::from_str(body)
        .with_context(|| format!("Failed to parse bitcoin price response: '{body}'"))?;

    let price = match response.price {
        RawPrice::Text(text) => text
            .trim()
            .parse::<f64>()
            .with_context(|| format!("Invalid bitcoin price: '{text}'"))?,
        RawPrice::Number(value) => value,
    };

    if !price.is_finite() {
        return Err(anyhow!("Invalid bitcoin price: {}", price));
    }
    Ok(price)
}

/// Tracks the BTC/USDT average price.
///
/// The previous price is the last successful quote seen by this instance and is
/// never persisted, so a restarted process starts again with no change.
pub struct BinanceTracker {
    config: BitcoinSourceConfig,
    client: reqwest::Client,
    cache: Cache<String, BitcoinPrice>,
    last_price: Mutex<Option<BitcoinPrice>>,
}

impl BinanceTracker {
    pub fn new(
        config: BitcoinSourceConfig,
        client: reqwest::Client,
        cache: Cache<String, BitcoinPrice>,
    ) -> Self {
        Self {
            config,
            client,
            cache,
            last_price: Mutex::new(None),
        }
    }

    async fn fetch_live(&self) -> Result<f64> {
        let body = fetch_text(&self.client, &self.config.url, self.config.timeout()).await?;
        parse_price(&body)
    }
}

#[async_trait]
impl BitcoinPriceProvider for BinanceTracker {
    #[instrument(name = "BitcoinPriceFetch", skip(self))]
    async fn fetch_price(&self) -> Option<BitcoinPrice> {
        let key = CACHE_KEY.to_string();
        if let Some(cached) = self.cache.get(&key).await {
            return Some(cached);
        }

        match self.fetch_live().await {
            Ok(current_price) => {
                let mut last_price = self.last_price.lock().await;
                let previous_price = last_price
                    .as_ref()
                    .map_or(current_price, |last| last.current_price);

                let price = BitcoinPrice {
                    current_price,
                    previous_price,
                    diff: current_price - previous_price,
                    updated_at: Utc::now(),
                };
                debug!(
                    "Fetched bitcoin price {} (previous {})",
                    current_price, previous_price
                );

                *last_price = Some(price.clone());
                self.cache.set(key, price.clone()).await;
                Some(price)
            }
            Err(e) => {
                warn!(
                    "Failed to fetch bitcoin price from {}: {:#}",
                    self.config.display_name.as_deref().unwrap_or("Binance"),
                    e
                );
                match self.cache.get_stale(&key).await {
                    Some(stale) => Some(stale),
                    None => self.last_price.lock().await.clone(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::util::http_client;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn tracker(uri: &str, ttl: Duration) -> BinanceTracker {
        let config = BitcoinSourceConfig {
            url: format!("{uri}/api/v3/avgPrice"),
            timeout_ms: 5000,
            display_name: None,
        };
        BinanceTracker::new(config, http_client().unwrap(), Cache::new(ttl))
    }

    async fn mount(server: &MockServer, response: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path("/api/v3/avgPrice"))
            .respond_with(response)
            .up_to_n_times(1)
            .mount(server)
            .await;
    }

    fn price_body(price: &str) -> ResponseTemplate {
        ResponseTemplate::new(200)
            .set_body_string(format!(r#"{{"mins": 5, "price": "{price}", "closeTime": 1}}"#))
    }

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price(r#"{"price": "67250.12"}"#).unwrap(), 67250.12);
        assert_eq!(parse_price(r#"{"price": 100.5}"#).unwrap(), 100.5);
        assert!(parse_price(r#"{"price": "abc"}"#).is_err());
        assert!(parse_price(r#"{"mins": 5}"#).is_err());
    }

    #[tokio::test]
    async fn test_first_fetch_has_no_diff() {
        let server = MockServer::start().await;
        mount(&server, price_body("67000.5")).await;

        let tracker = tracker(&server.uri(), Duration::from_secs(60));
        let price = tracker.fetch_price().await.unwrap();

        assert_eq!(price.current_price, 67000.5);
        assert_eq!(price.previous_price, 67000.5);
        assert_eq!(price.diff, 0.0);
    }

    #[tokio::test]
    async fn test_diff_against_previous_fetch() {
        let server = MockServer::start().await;
        mount(&server, price_body("67000")).await;
        mount(&server, price_body("67250")).await;

        let tracker = tracker(&server.uri(), Duration::from_millis(10));
        tracker.fetch_price().await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        let price = tracker.fetch_price().await.unwrap();
        assert_eq!(price.current_price, 67250.0);
        assert_eq!(price.previous_price, 67000.0);
        assert_eq!(price.diff, 250.0);
    }

    #[tokio::test]
    async fn test_failure_falls_back_to_last_price() {
        let server = MockServer::start().await;
        mount(&server, price_body("67000")).await;
        mount(&server, ResponseTemplate::new(500)).await;

        let tracker = tracker(&server.uri(), Duration::from_millis(10));
        let first = tracker.fetch_price().await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        let second = tracker.fetch_price().await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_failure_without_history_is_absent() {
        let server = MockServer::start().await;
        mount(&server, ResponseTemplate::new(404)).await;

        let tracker = tracker(&server.uri(), Duration::from_secs(60));
        assert!(tracker.fetch_price().await.is_none());
    }
}
