use super::util::fetch_text;
use super::{doji, mihong, pnj};
use crate::core::cache::Cache;
use crate::core::config::{GoldSourceConfig, GoldSourceKind};
use crate::core::{GoldPrice, GoldPriceProvider};
use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, instrument, warn};

/// Converts a seller's payload into a price record.
pub fn normalize(kind: GoldSourceKind, body: &str) -> Result<GoldPrice> {
    let seller = kind.seller();
    match kind {
        GoldSourceKind::Pnj => pnj::normalize(seller, body),
        GoldSourceKind::Doji => doji::normalize(seller, body),
        GoldSourceKind::Mihong => mihong::normalize(seller, body),
    }
}

/// Fetches one seller's price, answering from the cache while it is fresh.
///
/// Upstream failures are logged and replaced by the last cached record, however
/// old; `None` means the seller has never been fetched successfully.
pub struct GoldFetcher {
    source: GoldSourceConfig,
    client: reqwest::Client,
    cache: Cache<String, GoldPrice>,
}

impl GoldFetcher {
    pub fn new(
        source: GoldSourceConfig,
        client: reqwest::Client,
        cache: Cache<String, GoldPrice>,
    ) -> Self {
        Self {
            source,
            client,
            cache,
        }
    }

    fn cache_key(&self) -> String {
        format!("{}_price", self.source.kind.seller().to_lowercase())
    }

    async fn fetch_live(&self) -> Result<GoldPrice> {
        let body = fetch_text(&self.client, &self.source.url, self.source.timeout()).await?;
        normalize(self.source.kind, &body)
    }
}

#[async_trait]
impl GoldPriceProvider for GoldFetcher {
    fn seller(&self) -> &str {
        self.source.kind.seller()
    }

    #[instrument(
        name = "GoldPriceFetch",
        skip(self),
        fields(seller = %self.source.kind.seller())
    )]
    async fn fetch_price(&self) -> Option<GoldPrice> {
        let key = self.cache_key();
        if let Some(cached) = self.cache.get(&key).await {
            return Some(cached);
        }

        match self.fetch_live().await {
            Ok(price) => {
                debug!(
                    "Fetched {} price: sell {} buy {}",
                    price.seller, price.sell_price, price.buy_price
                );
                self.cache.set(key, price.clone()).await;
                Some(price)
            }
            Err(e) => {
                warn!(
                    "Failed to fetch {} price: {:#}",
                    self.source.display_name(),
                    e
                );
                self.cache.get_stale(&key).await
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

    const PNJ_JSON: &str = r#"{"data": [{"masp": "N24K", "giaban": 8600, "giamua": 8500, "createDate": "17/10/2025 08:30"}]}"#;

    fn pnj_source(uri: &str, timeout_ms: u64) -> GoldSourceConfig {
        GoldSourceConfig {
            kind: GoldSourceKind::Pnj,
            url: format!("{uri}/pnj"),
            timeout_ms,
            display_name: None,
        }
    }

    async fn mount(server: &MockServer, response: ResponseTemplate, times: u64) {
        Mock::given(method("GET"))
            .and(path("/pnj"))
            .respond_with(response)
            .up_to_n_times(times)
            .mount(server)
            .await;
    }

    #[test]
    fn test_normalize_dispatches_by_kind() {
        let price = normalize(GoldSourceKind::Pnj, PNJ_JSON).unwrap();
        assert_eq!(price.seller, "PNJ");
        assert!(normalize(GoldSourceKind::Mihong, PNJ_JSON).is_err());
    }

    #[tokio::test]
    async fn test_fetch_price() {
        let server = MockServer::start().await;
        mount(&server, ResponseTemplate::new(200).set_body_string(PNJ_JSON), 1).await;

        let cache = Cache::new(Duration::from_secs(60));
        let fetcher = GoldFetcher::new(pnj_source(&server.uri(), 5000), http_client().unwrap(), cache);

        let price = fetcher.fetch_price().await.unwrap();
        assert_eq!(price.seller, "PNJ");
        assert_eq!(price.sell_price, 8600.0);
        assert_eq!(price.buy_price, 8500.0);
        assert_eq!(fetcher.seller(), "PNJ");
    }

    #[tokio::test]
    async fn test_fresh_cache_skips_network() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/pnj"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PNJ_JSON))
            .expect(1)
            .mount(&server)
            .await;

        let cache = Cache::new(Duration::from_secs(60));
        let fetcher = GoldFetcher::new(pnj_source(&server.uri(), 5000), http_client().unwrap(), cache);

        let first = fetcher.fetch_price().await.unwrap();
        let second = fetcher.fetch_price().await.unwrap();
        assert_eq!(first, second);
        server.verify().await;
    }

    #[tokio::test]
    async fn test_failure_without_cache_is_absent() {
        let server = MockServer::start().await;
        mount(&server, ResponseTemplate::new(500), 1).await;

        let cache = Cache::new(Duration::from_secs(60));
        let fetcher = GoldFetcher::new(pnj_source(&server.uri(), 5000), http_client().unwrap(), cache);

        assert!(fetcher.fetch_price().await.is_none());
    }

    #[tokio::test]
    async fn test_failure_falls_back_to_expired_cache() {
        let server = MockServer::start().await;
        mount(&server, ResponseTemplate::new(200).set_body_string(PNJ_JSON), 1).await;
        mount(&server, ResponseTemplate::new(502), 1).await;

        let cache = Cache::new(Duration::from_millis(10));
        let fetcher = GoldFetcher::new(pnj_source(&server.uri(), 5000), http_client().unwrap(), cache);

        let first = fetcher.fetch_price().await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        let second = fetcher.fetch_price().await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_missing_field_falls_back_to_cache() {
        let server = MockServer::start().await;
        mount(&server, ResponseTemplate::new(200).set_body_string(PNJ_JSON), 1).await;
        mount(
            &server,
            ResponseTemplate::new(200).set_body_string(r#"{"data": []}"#),
            1,
        )
        .await;

        let cache = Cache::new(Duration::from_millis(10));
        let fetcher = GoldFetcher::new(pnj_source(&server.uri(), 5000), http_client().unwrap(), cache);

        fetcher.fetch_price().await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(fetcher.fetch_price().await.unwrap().sell_price, 8600.0);
    }

    #[tokio::test]
    async fn test_timeout_is_a_failure() {
        let server = MockServer::start().await;
        mount(
            &server,
            ResponseTemplate::new(200)
                .set_body_string(PNJ_JSON)
                .set_delay(Duration::from_millis(500)),
            1,
        )
        .await;

        let cache = Cache::new(Duration::from_secs(60));
        let fetcher = GoldFetcher::new(pnj_source(&server.uri(), 50), http_client().unwrap(), cache);

        assert!(fetcher.fetch_price().await.is_none());
    }
}
