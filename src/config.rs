use crate::error::{AppError, Result};

/// Minor currency units per major unit, and MWh per kWh folded together:
/// paise/MWh ÷ 1000 = ₹/kWh.
pub const PRICE_DIVISOR: f64 = 1000.0;

/// MW → MWh for one 15-minute slot.
pub const QUARTER_HOUR_VOLUME_FACTOR: f64 = 0.25;

/// MW → MWh for one hourly block, displayed at quarter-hour resolution so
/// both granularities share a scale.
pub const HOURLY_BLOCK_VOLUME_FACTOR: f64 = 1.0 / 4.0;

/// Markets shown in year-over-year views, in display order.
pub const CANONICAL_MARKETS: [&str; 3] = ["DAM", "GDAM", "RTM"];

/// Opacity of previous-year bars.
pub const PREVIOUS_YEAR_OPACITY: f64 = 0.25;

pub const DEFAULT_API_PORT: u16 = 3000;

/// 96 slots × 31 days, with headroom.
pub const DEFAULT_MAX_ROWS_PER_MARKET: usize = 5_000;

#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub api_port: u16,
    /// Requests carrying more rows for a single market are rejected (MAX_ROWS_PER_MARKET).
    pub max_rows_per_market: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Self {
            log_level: var("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            api_port: match var("API_PORT") {
                Some(v) => v.parse::<u16>().map_err(|_| {
                    AppError::Config("API_PORT must be a valid port number".to_string())
                })?,
                None => DEFAULT_API_PORT,
            },
            max_rows_per_market: match var("MAX_ROWS_PER_MARKET") {
                Some(v) => v
                    .parse::<usize>()
                    .ok()
                    .filter(|n| *n > 0)
                    .ok_or_else(|| {
                        AppError::Config("MAX_ROWS_PER_MARKET must be a positive integer".to_string())
                    })?,
                None => DEFAULT_MAX_ROWS_PER_MARKET,
            },
        })
    }
}
