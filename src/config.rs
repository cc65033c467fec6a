use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::registry::InstrumentCategory;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub provider: ProviderConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub refresh: RefreshConfig,
    #[serde(default)]
    pub market: MarketConfig,
    #[serde(default)]
    pub registry: RegistryConfig,
    pub ui: UiConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    pub base_url: String,
    pub user_agent: String,
    pub request_timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_secs: 60 }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/watchlist.sqlite"),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub user: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefreshConfig {
    pub max_concurrency: usize,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self { max_concurrency: 4 }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarketConfig {
    pub utc_offset_minutes: i32,
    pub open: String,
    pub close: String,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: 330,
            open: "09:15".to_string(),
            close: "15:30".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegistryConfig {
    #[serde(default = "default_true")]
    pub use_builtin: bool,
    #[serde(default)]
    pub instruments: Vec<InstrumentConfig>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            use_builtin: true,
            instruments: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct InstrumentConfig {
    pub name: String,
    pub symbol: String,
    #[serde(default = "default_category")]
    pub category: InstrumentCategory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UiConfig {
    pub refresh_rate_ms: u64,
    pub auto_refresh_secs: u64,
    #[serde(default = "default_export_dir")]
    pub export_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

fn default_true() -> bool {
    true
}

fn default_category() -> InstrumentCategory {
    InstrumentCategory::Equity
}

fn default_export_dir() -> PathBuf {
    PathBuf::from("exports")
}

/// Parse a wall-clock time like "09:15" into (hour, minute).
pub fn parse_hhmm(s: &str) -> Result<(u32, u32)> {
    let Some((h, m)) = s.trim().split_once(':') else {
        bail!("invalid time '{}': expected format like '09:15'", s);
    };
    let hour: u32 = h
        .parse()
        .with_context(|| format!("invalid time '{}': hour must be a number", s))?;
    let minute: u32 = m
        .parse()
        .with_context(|| format!("invalid time '{}': minute must be a number", s))?;
    if hour > 23 || minute > 59 {
        bail!("invalid time '{}': out of range", s);
    }
    Ok((hour, minute))
}

impl MarketConfig {
    pub fn session_bounds(&self) -> Result<((u32, u32), (u32, u32))> {
        let open = parse_hhmm(&self.open).context("market.open is invalid")?;
        let close = parse_hhmm(&self.close).context("market.close is invalid")?;
        if open >= close {
            bail!(
                "market.open ({}) must be earlier than market.close ({})",
                self.open,
                self.close
            );
        }
        Ok((open, close))
    }
}

fn config_path() -> PathBuf {
    std::env::var("MW_CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config/default.toml"))
}

impl Config {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        let path = config_path();
        let mut config = Self::load_from_path(&path)?;

        if let Ok(user) = std::env::var("MW_USER") {
            if !user.trim().is_empty() {
                config.session.user = user.trim().to_string();
            }
        }
        Ok(config)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: Config = toml::from_str(&config_str)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.provider.base_url.trim().is_empty() {
            bail!("provider.base_url must not be empty");
        }
        if self.refresh.max_concurrency == 0 {
            bail!("refresh.max_concurrency must be >= 1");
        }
        self.market.session_bounds()?;
        Ok(())
    }
}
