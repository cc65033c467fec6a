use market_watch::config::{InstrumentConfig, RegistryConfig};
use market_watch::registry::{Instrument, InstrumentCategory, SymbolRegistry};

#[test]
fn builtin_lookup_round_trips() {
    let registry = SymbolRegistry::builtin();
    assert_eq!(registry.symbol_for("GOLD"), Some("GC=F"));
    assert_eq!(registry.symbol_for("  nifty 50 "), Some("^NSEI"));
    assert_eq!(registry.display_name_for("BTC-USD"), Some("BITCOIN"));
    assert_eq!(registry.symbol_for("NOT A THING"), None);
    assert_eq!(registry.display_name_for("NOPE"), None);

    for inst in registry.instruments() {
        assert_eq!(registry.symbol_for(&inst.display_name), Some(inst.symbol.as_str()));
        assert_eq!(registry.display_name_for(&inst.symbol), Some(inst.display_name.as_str()));
    }
}

#[test]
fn search_is_case_insensitive() {
    let registry = SymbolRegistry::builtin();
    let names: Vec<&str> = registry
        .search("silver")
        .iter()
        .map(|i| i.display_name.as_str())
        .collect();
    assert_eq!(names, vec!["SILVER", "SILVER ETF"]);

    let by_symbol = registry.search("btc-");
    assert_eq!(by_symbol.len(), 1);
    assert_eq!(by_symbol[0].symbol, "BTC-USD");

    assert_eq!(registry.search("").len(), registry.len());
    assert!(registry.search("zzzz-no-match").is_empty());
}

#[test]
fn duplicates_are_rejected() {
    let dup_name = SymbolRegistry::from_instruments(vec![
        Instrument::new("Alpha", "AAA", InstrumentCategory::Equity),
        Instrument::new("ALPHA", "AAB", InstrumentCategory::Equity),
    ]);
    assert!(dup_name.is_err());

    let dup_symbol = SymbolRegistry::from_instruments(vec![
        Instrument::new("Alpha", "AAA", InstrumentCategory::Equity),
        Instrument::new("Beta", "AAA", InstrumentCategory::Etf),
    ]);
    assert!(dup_symbol.is_err());

    let blank = SymbolRegistry::from_instruments(vec![Instrument::new(
        " ",
        "AAA",
        InstrumentCategory::Equity,
    )]);
    assert!(blank.is_err());
}

#[test]
fn config_instruments_extend_builtin() {
    let extra = InstrumentConfig {
        name: "Infosys ADR".to_string(),
        symbol: "INFY".to_string(),
        category: InstrumentCategory::Equity,
    };

    let merged = SymbolRegistry::from_config(&RegistryConfig {
        use_builtin: true,
        instruments: vec![extra.clone()],
    })
    .unwrap();
    assert_eq!(merged.len(), SymbolRegistry::builtin().len() + 1);
    assert_eq!(merged.symbol_for("infosys adr"), Some("INFY"));

    let only = SymbolRegistry::from_config(&RegistryConfig {
        use_builtin: false,
        instruments: vec![extra],
    })
    .unwrap();
    assert_eq!(only.len(), 1);
    assert_eq!(only.by_category(InstrumentCategory::Equity).len(), 1);
    assert!(only.by_category(InstrumentCategory::Crypto).is_empty());

    let clash = SymbolRegistry::from_config(&RegistryConfig {
        use_builtin: true,
        instruments: vec![InstrumentConfig {
            name: "Gold".to_string(),
            symbol: "XAU".to_string(),
            category: InstrumentCategory::Commodity,
        }],
    });
    assert!(clash.is_err());
}
