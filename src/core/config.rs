use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::debug;

const DEFAULT_TIMEOUT_MS: u64 = 5000;

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

fn default_cache_ttl_secs() -> u64 {
    60
}

fn default_poll_interval_secs() -> u64 {
    60
}

/// The gold sellers with a known payload format.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum GoldSourceKind {
    Pnj,
    Doji,
    Mihong,
}

impl GoldSourceKind {
    /// Seller identifier used in price records and holdings.
    pub fn seller(&self) -> &'static str {
        match self {
            GoldSourceKind::Pnj => "PNJ",
            GoldSourceKind::Doji => "DOJI",
            GoldSourceKind::Mihong => "MIH",
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GoldSourceConfig {
    pub kind: GoldSourceKind,
    pub url: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    pub display_name: Option<String>,
}

impl GoldSourceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn display_name(&self) -> &str {
        self.display_name
            .as_deref()
            .unwrap_or_else(|| self.kind.seller())
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BitcoinSourceConfig {
    pub url: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default)]
    pub display_name: Option<String>,
}

impl BitcoinSourceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for BitcoinSourceConfig {
    fn default() -> Self {
        BitcoinSourceConfig {
            url: "https://data-api.binance.vision/api/v3/avgPrice?symbol=BTCUSDT".to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            display_name: Some("Binance".to_string()),
        }
    }
}

/// Raw bitcoin form fields. Unparseable values count as 0.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct BitcoinHoldingConfig {
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub fund_value: String,
    #[serde(default)]
    pub usd_price: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct HoldingsConfig {
    /// One `seller,buy price,amount` per line.
    #[serde(default)]
    pub gold: String,
    /// One `amount [comment]` per line, in millions.
    #[serde(default)]
    pub cash: String,
    #[serde(default)]
    pub bitcoin: BitcoinHoldingConfig,
}

pub fn default_gold_sources() -> Vec<GoldSourceConfig> {
    vec![
        GoldSourceConfig {
            kind: GoldSourceKind::Pnj,
            url: "https://edge-api.pnj.io/ecom-frontend/v1/get-gold-price?zone=00".to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            display_name: Some("PNJ".to_string()),
        },
        GoldSourceConfig {
            kind: GoldSourceKind::Doji,
            url: "http://update.giavang.doji.vn/banggia/doji_92411/92411".to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            display_name: Some("DOJI".to_string()),
        },
        GoldSourceConfig {
            kind: GoldSourceKind::Mihong,
            url: "http://www.mihong.vn/api/v1/gold/prices/current".to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            display_name: Some("Mi Hồng".to_string()),
        },
    ]
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default = "default_gold_sources")]
    pub gold_sources: Vec<GoldSourceConfig>,
    #[serde(default)]
    pub bitcoin: BitcoinSourceConfig,
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    #[serde(default)]
    pub holdings: HoldingsConfig,
    pub data_path: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            gold_sources: default_gold_sources(),
            bitcoin: BitcoinSourceConfig::default(),
            cache_ttl_secs: default_cache_ttl_secs(),
            poll_interval_secs: default_poll_interval_secs(),
            holdings: HoldingsConfig::default(),
            data_path: None,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "goldfolio", "goldfolio")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("dev", "goldfolio", "goldfolio")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}
