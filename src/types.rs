use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::{HOURLY_BLOCK_VOLUME_FACTOR, QUARTER_HOUR_VOLUME_FACTOR};

// ---------------------------------------------------------------------------
// Market rows
// ---------------------------------------------------------------------------

/// One delivery interval for one market, as supplied by the upstream data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketRow {
    pub delivery_date: NaiveDate,
    /// 15-minute slot (1–96). Only read for quarter-hourly markets.
    #[serde(default)]
    pub slot_index: Option<u32>,
    /// Hourly block (1–24). Only read for hourly markets.
    #[serde(default)]
    pub block_index: Option<u32>,
    /// Minor currency units per MWh (paise/MWh).
    pub price_avg: f64,
    pub mcv_mw: f64,
    pub purchase_bid_mw: f64,
    pub sell_bid_mw: f64,
}

// ---------------------------------------------------------------------------
// Granularity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    /// 96 slots per day, `slot_index`, labelled `S-n`.
    QuarterHourly,
    /// 24 blocks per day, `block_index`, labelled `H-n`.
    Hourly,
}

impl Granularity {
    pub fn from_quarterly(is_quarterly: bool) -> Self {
        if is_quarterly {
            Granularity::QuarterHourly
        } else {
            Granularity::Hourly
        }
    }

    /// Sub-day index used for ordering and labels. Absent → 0.
    pub fn interval_index(self, row: &MarketRow) -> u32 {
        match self {
            Granularity::QuarterHourly => row.slot_index,
            Granularity::Hourly => row.block_index,
        }
        .unwrap_or(0)
    }

    pub fn label_prefix(self) -> char {
        match self {
            Granularity::QuarterHourly => 'S',
            Granularity::Hourly => 'H',
        }
    }

    /// MW → MWh multiplier applied to `mcv_mw`.
    pub fn volume_factor(self) -> f64 {
        match self {
            Granularity::QuarterHourly => QUARTER_HOUR_VOLUME_FACTOR,
            Granularity::Hourly => HOURLY_BLOCK_VOLUME_FACTOR,
        }
    }

    /// X-axis category, e.g. `2024-01-01 S-1`.
    pub fn label(self, row: &MarketRow) -> String {
        format!(
            "{} {}-{}",
            row.delivery_date,
            self.label_prefix(),
            self.interval_index(row)
        )
    }
}

impl std::fmt::Display for Granularity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Granularity::QuarterHourly => "quarter_hourly",
            Granularity::Hourly => "hourly",
        };
        write!(f, "{s}")
    }
}

// ---------------------------------------------------------------------------
// Pre-aggregated summaries
// ---------------------------------------------------------------------------

/// Period aggregate for one market. Aggregation happens upstream; missing
/// fields read as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketSummary {
    pub total_volume_gwh: f64,
    /// Time-weighted average price, passed through as supplied.
    pub twap: f64,
    pub purchase_bid_total_mw: f64,
    pub sell_bid_total_mw: f64,
}

/// Market name → summary for one period.
pub type SummaryByMarket = HashMap<String, MarketSummary>;

/// Market name → raw rows. Ordered by name so output is deterministic.
pub type RowsByMarket = BTreeMap<String, Vec<MarketRow>>;

/// One futures quote from the derivative exchanges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivativeRow {
    pub exchange: String,
    pub commodity: String,
    /// Upstream normalises raw month strings to a calendar date.
    pub contract_month: NaiveDate,
    #[serde(default)]
    pub close_price_rs_per_mwh: Option<f64>,
}
