use std::io::Write;
use std::path::PathBuf;

use market_watch::config::Config;
use market_watch::registry::InstrumentCategory;

const FULL: &str = r#"
[provider]
base_url = "https://query1.finance.yahoo.com"
user_agent = "market-watch-test"
request_timeout_ms = 5000

[cache]
ttl_secs = 0

[store]
path = "/tmp/mw/watchlist.sqlite"

[session]
user = "alice"

[refresh]
max_concurrency = 8

[market]
utc_offset_minutes = -300
open = "09:30"
close = "16:00"

[registry]
use_builtin = false

[[registry.instruments]]
name = "Apple"
symbol = "AAPL"

[[registry.instruments]]
name = "Gold"
symbol = "GC=F"
category = "commodity"

[ui]
refresh_rate_ms = 50
auto_refresh_secs = 300
export_dir = "out"

[logging]
level = "debug"
"#;

#[test]
fn parse_full_toml() {
    let config: Config = toml::from_str(FULL).unwrap();
    assert_eq!(config.provider.request_timeout_ms, 5000);
    assert_eq!(config.cache.ttl_secs, 0);
    assert_eq!(config.store.path, PathBuf::from("/tmp/mw/watchlist.sqlite"));
    assert_eq!(config.session.user, "alice");
    assert_eq!(config.refresh.max_concurrency, 8);
    assert_eq!(config.market.utc_offset_minutes, -300);
    assert_eq!(config.market.session_bounds().unwrap(), ((9, 30), (16, 0)));
    assert!(!config.registry.use_builtin);
    assert_eq!(config.registry.instruments.len(), 2);
    assert_eq!(config.registry.instruments[0].category, InstrumentCategory::Equity);
    assert_eq!(config.registry.instruments[1].category, InstrumentCategory::Commodity);
    assert_eq!(config.ui.auto_refresh_secs, 300);
    assert_eq!(config.ui.export_dir, PathBuf::from("out"));
    assert_eq!(config.logging.level, "debug");
    assert!(config.validate().is_ok());
}

#[test]
fn load_from_path_validates() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(FULL.as_bytes()).unwrap();
    let config = Config::load_from_path(file.path()).unwrap();
    assert_eq!(config.session.user, "alice");

    let broken = FULL.replace("open = \"09:30\"", "open = \"9.30\"");
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(broken.as_bytes()).unwrap();
    let err = Config::load_from_path(file.path()).unwrap_err();
    assert!(format!("{:#}", err).contains("market.open"));
}

#[test]
fn load_from_missing_path_fails() {
    let err = Config::load_from_path(std::path::Path::new("/nonexistent/mw.toml")).unwrap_err();
    assert!(format!("{:#}", err).contains("/nonexistent/mw.toml"));
}

#[test]
fn shipped_default_config_is_valid() {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("config/default.toml");
    let config = Config::load_from_path(&path).unwrap();
    assert_eq!(config.ui.auto_refresh_secs, 600);
    assert_eq!(config.cache.ttl_secs, 60);
    assert!(config.registry.use_builtin);
}
