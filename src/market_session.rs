use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, FixedOffset, NaiveTime, Utc, Weekday};

use crate::config::MarketConfig;
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketStatus {
    Open,
    Closed,
}

impl MarketStatus {
    pub fn label(self) -> &'static str {
        match self {
            MarketStatus::Open => "MARKET OPEN",
            MarketStatus::Closed => "MARKET CLOSED",
        }
    }
}

/// Regular weekday trading session of one exchange, in exchange-local time.
#[derive(Debug, Clone, Copy)]
pub struct MarketHours {
    offset: FixedOffset,
    open: NaiveTime,
    close: NaiveTime,
}

impl MarketHours {
    pub fn new(utc_offset_minutes: i32, open: (u32, u32), close: (u32, u32)) -> Result<Self> {
        let offset = utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                AppError::Config(format!("utc offset {utc_offset_minutes} minutes is out of range"))
            })?;
        let open = NaiveTime::from_hms_opt(open.0, open.1, 0).context("invalid open time")?;
        let close = NaiveTime::from_hms_opt(close.0, close.1, 0).context("invalid close time")?;
        Ok(Self {
            offset,
            open,
            close,
        })
    }

    pub fn from_config(cfg: &MarketConfig) -> Result<Self> {
        let (open, close) = cfg.session_bounds()?;
        Self::new(cfg.utc_offset_minutes, open, close)
    }

    pub fn status_at(&self, now: DateTime<Utc>) -> MarketStatus {
        let local = now.with_timezone(&self.offset);
        if matches!(local.weekday(), Weekday::Sat | Weekday::Sun) {
            return MarketStatus::Closed;
        }
        let t = local.time();
        if t >= self.open && t <= self.close {
            MarketStatus::Open
        } else {
            MarketStatus::Closed
        }
    }
}
