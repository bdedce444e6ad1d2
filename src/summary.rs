//! Scalar figures for the dashboard header and tables.
//!
//! Only numbers leave this module; badges, colours and markup are the
//! renderer's job.

use serde::Serialize;

use crate::config::{CANONICAL_MARKETS, PRICE_DIVISOR};
use crate::types::{DerivativeRow, MarketSummary, SummaryByMarket};

/// Buy bids over sell bids. Zero when there are no sell bids.
pub fn bid_ratio(buy_mw: f64, sell_mw: f64) -> f64 {
    if sell_mw > 0.0 {
        buy_mw / sell_mw
    } else {
        0.0
    }
}

/// Percentage change against last year. Zero when there is no positive base.
pub fn yoy_pct(current: f64, previous: f64) -> f64 {
    if previous > 0.0 {
        (current - previous) / previous * 100.0
    } else {
        0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BidSide {
    BuyDominant,
    SellDominant,
}

impl BidSide {
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio > 1.0 {
            BidSide::BuyDominant
        } else {
            BidSide::SellDominant
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Up,
    Down,
    Flat,
}

impl Trend {
    pub fn from_pct(pct: f64) -> Self {
        if pct > 0.0 {
            Trend::Up
        } else if pct < 0.0 {
            Trend::Down
        } else {
            Trend::Flat
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiStrip {
    pub market: String,
    pub price: f64,
    pub total_market_volume_gwh: f64,
    pub market_volume_gwh: f64,
    pub buy_bids_mw: f64,
    pub sell_bids_mw: f64,
    pub bid_ratio: f64,
    pub dominant_side: BidSide,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub market: String,
    pub volume_gwh: f64,
    pub previous_volume_gwh: f64,
    pub price: f64,
    pub previous_price: f64,
    pub price_yoy_pct: f64,
    pub price_trend: Trend,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivativeQuote {
    pub exchange: String,
    pub commodity: String,
    /// e.g. `Mar '25`.
    pub month: String,
    /// ₹/kWh.
    pub close_price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub kpi: KpiStrip,
    pub comparison: Vec<ComparisonRow>,
    pub derivatives: Vec<DerivativeQuote>,
}

pub fn kpi_strip(market: &str, current: &SummaryByMarket, total_market_volume_gwh: f64) -> KpiStrip {
    let data = current.get(market).copied().unwrap_or_default();
    let ratio = bid_ratio(data.purchase_bid_total_mw, data.sell_bid_total_mw);
    KpiStrip {
        market: market.to_string(),
        price: data.twap,
        total_market_volume_gwh,
        market_volume_gwh: data.total_volume_gwh,
        buy_bids_mw: data.purchase_bid_total_mw,
        sell_bids_mw: data.sell_bid_total_mw,
        bid_ratio: ratio,
        dominant_side: BidSide::from_ratio(ratio),
    }
}

/// One row per canonical market, including markets with no data.
pub fn comparison_rows(current: &SummaryByMarket, previous: &SummaryByMarket) -> Vec<ComparisonRow> {
    CANONICAL_MARKETS
        .iter()
        .map(|&market| {
            let curr: MarketSummary = current.get(market).copied().unwrap_or_default();
            let prev: MarketSummary = previous.get(market).copied().unwrap_or_default();
            let pct = yoy_pct(curr.twap, prev.twap);
            ComparisonRow {
                market: market.to_string(),
                volume_gwh: curr.total_volume_gwh,
                previous_volume_gwh: prev.total_volume_gwh,
                price: curr.twap,
                previous_price: prev.twap,
                price_yoy_pct: pct,
                price_trend: Trend::from_pct(pct),
            }
        })
        .collect()
}

pub fn derivative_quote(row: &DerivativeRow) -> DerivativeQuote {
    DerivativeQuote {
        exchange: row.exchange.clone(),
        commodity: row.commodity.clone(),
        month: row.contract_month.format("%b '%y").to_string(),
        close_price: row.close_price_rs_per_mwh.unwrap_or(0.0) / PRICE_DIVISOR,
    }
}

pub fn build_dashboard_summary(
    primary_market: &str,
    current: &SummaryByMarket,
    previous: &SummaryByMarket,
    derivatives: &[DerivativeRow],
    total_market_volume_gwh: f64,
) -> DashboardSummary {
    DashboardSummary {
        kpi: kpi_strip(primary_market, current, total_market_volume_gwh),
        comparison: comparison_rows(current, previous),
        derivatives: derivatives.iter().map(derivative_quote).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn summary(total_volume_gwh: f64, twap: f64, buy: f64, sell: f64) -> MarketSummary {
        MarketSummary {
            total_volume_gwh,
            twap,
            purchase_bid_total_mw: buy,
            sell_bid_total_mw: sell,
        }
    }

    #[test]
    fn bid_ratio_guards_zero_sell() {
        assert_eq!(bid_ratio(100.0, 50.0), 2.0);
        assert_eq!(bid_ratio(100.0, 0.0), 0.0);
        assert_eq!(bid_ratio(0.0, 10.0), 0.0);
    }

    #[test]
    fn dominance_is_buy_only_above_one() {
        assert_eq!(BidSide::from_ratio(1.01), BidSide::BuyDominant);
        assert_eq!(BidSide::from_ratio(1.0), BidSide::SellDominant);
        assert_eq!(BidSide::from_ratio(0.0), BidSide::SellDominant);
    }

    #[test]
    fn yoy_pct_needs_positive_base() {
        assert_eq!(yoy_pct(5.0, 4.0), 25.0);
        assert_eq!(yoy_pct(3.0, 4.0), -25.0);
        assert_eq!(yoy_pct(3.0, 0.0), 0.0);
        assert_eq!(Trend::from_pct(yoy_pct(3.0, 0.0)), Trend::Flat);
    }

    #[test]
    fn kpi_strip_for_missing_market_is_zeroed() {
        let kpi = kpi_strip("GDAM", &SummaryByMarket::new(), 42.0);
        assert_eq!(kpi.price, 0.0);
        assert_eq!(kpi.total_market_volume_gwh, 42.0);
        assert_eq!(kpi.dominant_side, BidSide::SellDominant);
    }

    #[test]
    fn kpi_strip_reads_primary_market() {
        let mut current = SummaryByMarket::new();
        current.insert("DAM".to_string(), summary(80.0, 4.75, 9000.0, 6000.0));
        let kpi = kpi_strip("DAM", &current, 120.0);
        assert_eq!(kpi.market_volume_gwh, 80.0);
        assert_eq!(kpi.bid_ratio, 1.5);
        assert_eq!(kpi.dominant_side, BidSide::BuyDominant);
    }

    #[test]
    fn comparison_rows_cover_all_canonical_markets() {
        let mut current = SummaryByMarket::new();
        current.insert("RTM".to_string(), summary(10.0, 5.0, 0.0, 0.0));
        let mut previous = SummaryByMarket::new();
        previous.insert("RTM".to_string(), summary(8.0, 4.0, 0.0, 0.0));

        let rows = comparison_rows(&current, &previous);
        let markets: Vec<&str> = rows.iter().map(|r| r.market.as_str()).collect();
        assert_eq!(markets, vec!["DAM", "GDAM", "RTM"]);
        assert_eq!(rows[2].price_yoy_pct, 25.0);
        assert_eq!(rows[2].price_trend, Trend::Up);
        assert_eq!(rows[0].price_trend, Trend::Flat);
    }

    #[test]
    fn derivative_quote_formats_month_and_price() {
        let row = DerivativeRow {
            exchange: "MCX".to_string(),
            commodity: "ELECDMBL".to_string(),
            contract_month: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            close_price_rs_per_mwh: Some(4520.0),
        };
        let q = derivative_quote(&row);
        assert_eq!(q.month, "Mar '25");
        assert_eq!(q.close_price, 4.52);

        let missing = DerivativeRow {
            close_price_rs_per_mwh: None,
            ..row
        };
        assert_eq!(derivative_quote(&missing).close_price, 0.0);
    }
}
