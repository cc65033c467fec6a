use std::collections::HashMap;
use std::fmt;

use anyhow::Result;
use serde::Deserialize;

use crate::config::RegistryConfig;
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstrumentCategory {
    Equity,
    GlobalIndex,
    Commodity,
    SectorIndex,
    Crypto,
    Etf,
}

impl InstrumentCategory {
    pub const ALL: [InstrumentCategory; 6] = [
        InstrumentCategory::Equity,
        InstrumentCategory::GlobalIndex,
        InstrumentCategory::Commodity,
        InstrumentCategory::SectorIndex,
        InstrumentCategory::Crypto,
        InstrumentCategory::Etf,
    ];

    pub fn label(self) -> &'static str {
        match self {
            InstrumentCategory::Equity => "Equities",
            InstrumentCategory::GlobalIndex => "Global Indices",
            InstrumentCategory::Commodity => "Commodities",
            InstrumentCategory::SectorIndex => "Indian Sectors",
            InstrumentCategory::Crypto => "Crypto",
            InstrumentCategory::Etf => "ETFs",
        }
    }

    /// Next category in display order, wrapping around.
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|c| *c == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for InstrumentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instrument {
    pub display_name: String,
    pub symbol: String,
    pub category: InstrumentCategory,
}

impl Instrument {
    pub fn new(display_name: &str, symbol: &str, category: InstrumentCategory) -> Self {
        Self {
            display_name: display_name.trim().to_string(),
            symbol: symbol.trim().to_string(),
            category,
        }
    }
}

const BUILTIN: &[(&str, &str, InstrumentCategory)] = &[
    ("TATA CONSULTANCY SERVICES", "TCS.NS", InstrumentCategory::Equity),
    ("INFOSYS", "INFY.NS", InstrumentCategory::Equity),
    ("WIPRO", "WIPRO.NS", InstrumentCategory::Equity),
    ("HCL TECHNOLOGIES", "HCLTECH.NS", InstrumentCategory::Equity),
    ("RELIANCE INDUSTRIES", "RELIANCE.NS", InstrumentCategory::Equity),
    ("STATE BANK OF INDIA", "SBIN.NS", InstrumentCategory::Equity),
    ("ICICI BANK", "ICICIBANK.NS", InstrumentCategory::Equity),
    ("TECH MAHINDRA", "TECHM.NS", InstrumentCategory::Equity),
    ("NIFTY 50", "^NSEI", InstrumentCategory::GlobalIndex),
    ("SENSEX", "^BSESN", InstrumentCategory::GlobalIndex),
    ("NIFTY BANK", "^NSEBANK", InstrumentCategory::GlobalIndex),
    ("NASDAQ", "^IXIC", InstrumentCategory::GlobalIndex),
    ("S&P 500", "^GSPC", InstrumentCategory::GlobalIndex),
    ("DOW JONES", "^DJI", InstrumentCategory::GlobalIndex),
    ("FTSE 100", "^FTSE", InstrumentCategory::GlobalIndex),
    ("DAX", "^GDAXI", InstrumentCategory::GlobalIndex),
    ("NIKKEI 225", "^N225", InstrumentCategory::GlobalIndex),
    ("HANG SENG", "^HSI", InstrumentCategory::GlobalIndex),
    ("SHANGHAI COMP", "000001.SS", InstrumentCategory::GlobalIndex),
    ("GOLD", "GC=F", InstrumentCategory::Commodity),
    ("SILVER", "SI=F", InstrumentCategory::Commodity),
    ("CRUDE OIL", "CL=F", InstrumentCategory::Commodity),
    ("BRENT CRUDE", "BZ=F", InstrumentCategory::Commodity),
    ("NATURAL GAS", "NG=F", InstrumentCategory::Commodity),
    ("COPPER", "HG=F", InstrumentCategory::Commodity),
    ("NIFTY IT", "^CNXIT", InstrumentCategory::SectorIndex),
    ("NIFTY AUTO", "^CNXAUTO", InstrumentCategory::SectorIndex),
    ("NIFTY FIN SERVICE", "^CNXFIN", InstrumentCategory::SectorIndex),
    ("NIFTY FMCG", "^CNXFMCG", InstrumentCategory::SectorIndex),
    ("NIFTY MEDIA", "^CNXMEDIA", InstrumentCategory::SectorIndex),
    ("NIFTY METAL", "^CNXMETAL", InstrumentCategory::SectorIndex),
    ("NIFTY PHARMA", "^CNXPHARMA", InstrumentCategory::SectorIndex),
    ("NIFTY PSU BANK", "^CNXPSUBANK", InstrumentCategory::SectorIndex),
    ("NIFTY REALTY", "^CNXREALTY", InstrumentCategory::SectorIndex),
    ("BITCOIN", "BTC-USD", InstrumentCategory::Crypto),
    ("ETHEREUM", "ETH-USD", InstrumentCategory::Crypto),
    ("BNB", "BNB-USD", InstrumentCategory::Crypto),
    ("XRP", "XRP-USD", InstrumentCategory::Crypto),
    ("SOLANA", "SOL-USD", InstrumentCategory::Crypto),
    ("NIFTY 50 ETF", "NIFTYBEES.NS", InstrumentCategory::Etf),
    ("NIFTY NEXT 50 ETF", "JUNIORBEES.NS", InstrumentCategory::Etf),
    ("BANK ETF", "BANKBEES.NS", InstrumentCategory::Etf),
    ("IT ETF", "ITBEES.NS", InstrumentCategory::Etf),
    ("PSU BANK ETF", "PSUBANKBEES.NS", InstrumentCategory::Etf),
    ("GOLD ETF", "GOLDBEES.NS", InstrumentCategory::Etf),
    ("SILVER ETF", "SILVERBEES.NS", InstrumentCategory::Etf),
    ("CPSE ETF", "CPSEETF.NS", InstrumentCategory::Etf),
    ("LIQUID ETF", "LIQUIDBEES.NS", InstrumentCategory::Etf),
    ("NASDAQ 100 ETF", "M100.NS", InstrumentCategory::Etf),
];

/// Read-only catalog mapping display names to provider symbols and back.
#[derive(Debug, Clone)]
pub struct SymbolRegistry {
    instruments: Vec<Instrument>,
    by_name: HashMap<String, usize>,
    by_symbol: HashMap<String, usize>,
}

impl SymbolRegistry {
    pub fn builtin() -> Self {
        let instruments = BUILTIN
            .iter()
            .map(|(name, symbol, category)| Instrument::new(name, symbol, *category))
            .collect();
        Self::index(instruments)
    }

    pub fn from_instruments(instruments: Vec<Instrument>) -> Result<Self> {
        let mut seen_names = HashMap::new();
        let mut seen_symbols = HashMap::new();
        for (idx, inst) in instruments.iter().enumerate() {
            if inst.display_name.is_empty() || inst.symbol.is_empty() {
                return Err(AppError::Config(format!(
                    "instrument #{} has an empty name or symbol",
                    idx + 1
                ))
                .into());
            }
            if seen_names
                .insert(inst.display_name.to_ascii_uppercase(), idx)
                .is_some()
            {
                return Err(AppError::Config(format!(
                    "duplicate instrument name '{}'",
                    inst.display_name
                ))
                .into());
            }
            if seen_symbols.insert(inst.symbol.clone(), idx).is_some() {
                return Err(AppError::Config(format!(
                    "duplicate instrument symbol '{}'",
                    inst.symbol
                ))
                .into());
            }
        }
        Ok(Self::index(instruments))
    }

    /// Builtin catalog (unless disabled) followed by configured instruments.
    pub fn from_config(cfg: &RegistryConfig) -> Result<Self> {
        let mut instruments = if cfg.use_builtin {
            Self::builtin().instruments
        } else {
            Vec::new()
        };
        instruments.extend(
            cfg.instruments
                .iter()
                .map(|i| Instrument::new(&i.name, &i.symbol, i.category)),
        );
        Self::from_instruments(instruments)
    }

    fn index(instruments: Vec<Instrument>) -> Self {
        let by_name = instruments
            .iter()
            .enumerate()
            .map(|(i, inst)| (inst.display_name.to_ascii_uppercase(), i))
            .collect();
        let by_symbol = instruments
            .iter()
            .enumerate()
            .map(|(i, inst)| (inst.symbol.clone(), i))
            .collect();
        Self {
            instruments,
            by_name,
            by_symbol,
        }
    }

    pub fn instruments(&self) -> &[Instrument] {
        &self.instruments
    }

    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }

    /// Display-name lookup, case-insensitive.
    pub fn symbol_for(&self, display_name: &str) -> Option<&str> {
        self.by_name
            .get(&display_name.trim().to_ascii_uppercase())
            .map(|&i| self.instruments[i].symbol.as_str())
    }

    pub fn display_name_for(&self, symbol: &str) -> Option<&str> {
        self.by_symbol
            .get(symbol.trim())
            .map(|&i| self.instruments[i].display_name.as_str())
    }

    pub fn search(&self, query: &str) -> Vec<&Instrument> {
        let q = query.trim().to_ascii_uppercase();
        self.instruments
            .iter()
            .filter(|inst| {
                q.is_empty()
                    || inst.display_name.to_ascii_uppercase().contains(&q)
                    || inst.symbol.to_ascii_uppercase().contains(&q)
            })
            .collect()
    }

    pub fn by_category(&self, category: InstrumentCategory) -> Vec<&Instrument> {
        self.instruments
            .iter()
            .filter(|inst| inst.category == category)
            .collect()
    }
}
