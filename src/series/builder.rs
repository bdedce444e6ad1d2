//! Per-interval rows → index-aligned chart series.
//!
//! Rows are ordered by `(delivery_date, interval_index)` with a stable sort,
//! so malformed duplicates keep their relative input order. Values are never
//! rounded here; display rounding belongs to the renderer.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::config::PRICE_DIVISOR;
use crate::types::{Granularity, MarketRow, RowsByMarket};

/// Dual-axis series for one market. Every vector has one entry per input row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub market: String,
    pub granularity: Granularity,
    pub labels: Vec<String>,
    /// MWh per interval.
    pub volumes: Vec<f64>,
    /// ₹/kWh.
    pub prices: Vec<f64>,
    /// MW, passed through.
    pub buy_bids: Vec<f64>,
    /// MW, passed through.
    pub sell_bids: Vec<f64>,
}

/// Price-only series used by the multi-market comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    pub labels: Vec<String>,
    pub prices: Vec<f64>,
}

/// Market name → price series. Never contains an empty series.
pub type MultiMarketSeries = BTreeMap<String, PriceSeries>;

/// Stable sort by `(delivery_date, interval_index)`; missing index sorts as 0.
pub fn sort_rows(rows: &[MarketRow], granularity: Granularity) -> Vec<&MarketRow> {
    let mut sorted: Vec<&MarketRow> = rows.iter().collect();
    sorted.sort_by_key(|r| (r.delivery_date, granularity.interval_index(r)));
    sorted
}

#[inline]
fn price_per_kwh(row: &MarketRow) -> f64 {
    row.price_avg / PRICE_DIVISOR
}

/// Build the price/volume/bid series for one market. `None` when `rows` is empty.
pub fn build_single_market_series(
    market: &str,
    rows: &[MarketRow],
    granularity: Granularity,
) -> Option<Series> {
    if rows.is_empty() {
        return None;
    }

    let sorted = sort_rows(rows, granularity);
    let factor = granularity.volume_factor();

    let mut series = Series {
        market: market.to_string(),
        granularity,
        labels: Vec::with_capacity(sorted.len()),
        volumes: Vec::with_capacity(sorted.len()),
        prices: Vec::with_capacity(sorted.len()),
        buy_bids: Vec::with_capacity(sorted.len()),
        sell_bids: Vec::with_capacity(sorted.len()),
    };

    for row in sorted {
        series.labels.push(granularity.label(row));
        series.volumes.push(row.mcv_mw * factor);
        series.prices.push(price_per_kwh(row));
        series.buy_bids.push(row.purchase_bid_mw);
        series.sell_bids.push(row.sell_bid_mw);
    }

    debug!(market, points = series.labels.len(), %granularity, "built market series");
    Some(series)
}

/// Build one price series per market. Markets without rows are left out;
/// `None` when no market has rows.
pub fn build_multi_market_series(
    markets: &RowsByMarket,
    granularity: Granularity,
) -> Option<MultiMarketSeries> {
    let mut out = MultiMarketSeries::new();

    for (market, rows) in markets {
        if rows.is_empty() {
            debug!(market = %market, "skipping market with no rows");
            continue;
        }
        let sorted = sort_rows(rows, granularity);
        let series = PriceSeries {
            labels: sorted.iter().map(|r| granularity.label(r)).collect(),
            prices: sorted.iter().map(|r| price_per_kwh(r)).collect(),
        };
        out.insert(market.clone(), series);
    }

    if out.is_empty() {
        None
    } else {
        Some(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(d: &str) -> NaiveDate {
        NaiveDate::parse_from_str(d, "%Y-%m-%d").unwrap()
    }

    fn slot_row(d: &str, slot: u32, price_avg: f64, mcv_mw: f64) -> MarketRow {
        MarketRow {
            delivery_date: date(d),
            slot_index: Some(slot),
            block_index: None,
            price_avg,
            mcv_mw,
            purchase_bid_mw: 200.0,
            sell_bid_mw: 180.0,
        }
    }

    fn block_row(d: &str, block: Option<u32>, price_avg: f64) -> MarketRow {
        MarketRow {
            delivery_date: date(d),
            slot_index: None,
            block_index: block,
            price_avg,
            mcv_mw: 40.0,
            purchase_bid_mw: 90.0,
            sell_bid_mw: 60.0,
        }
    }

    #[test]
    fn empty_rows_give_no_series() {
        assert!(build_single_market_series("DAM", &[], Granularity::QuarterHourly).is_none());
        assert!(build_single_market_series("DAM", &[], Granularity::Hourly).is_none());
    }

    #[test]
    fn single_quarterly_row_example() {
        let rows = vec![slot_row("2024-01-01", 1, 2500.0, 120.0)];
        let s = build_single_market_series("DAM", &rows, Granularity::QuarterHourly).unwrap();
        assert_eq!(s.labels, vec!["2024-01-01 S-1"]);
        assert_eq!(s.volumes, vec![30.0]);
        assert_eq!(s.prices, vec![2.5]);
        assert_eq!(s.buy_bids, vec![200.0]);
        assert_eq!(s.sell_bids, vec![180.0]);
    }

    #[test]
    fn all_sequences_match_row_count() {
        let rows = vec![
            slot_row("2024-01-02", 3, 3000.0, 10.0),
            slot_row("2024-01-01", 96, 2800.0, 11.0),
            slot_row("2024-01-01", 1, 2500.0, 12.0),
            slot_row("2024-01-02", 1, 3100.0, 13.0),
        ];
        let s = build_single_market_series("RTM", &rows, Granularity::QuarterHourly).unwrap();
        assert_eq!(s.labels.len(), rows.len());
        assert_eq!(s.volumes.len(), rows.len());
        assert_eq!(s.prices.len(), rows.len());
        assert_eq!(s.buy_bids.len(), rows.len());
        assert_eq!(s.sell_bids.len(), rows.len());
    }

    #[test]
    fn rows_sorted_by_date_then_slot() {
        let rows = vec![
            slot_row("2024-01-02", 3, 3000.0, 10.0),
            slot_row("2024-01-01", 96, 2800.0, 11.0),
            slot_row("2024-01-01", 1, 2500.0, 12.0),
            slot_row("2024-01-02", 1, 3100.0, 13.0),
        ];
        let s = build_single_market_series("RTM", &rows, Granularity::QuarterHourly).unwrap();
        assert_eq!(
            s.labels,
            vec![
                "2024-01-01 S-1",
                "2024-01-01 S-96",
                "2024-01-02 S-1",
                "2024-01-02 S-3"
            ]
        );
        assert_eq!(s.prices, vec![2.5, 2.8, 3.1, 3.0]);
        assert_eq!(s.volumes, vec![3.0, 2.75, 3.25, 2.5]);
    }

    #[test]
    fn slot_index_sorts_numerically_not_lexically() {
        let rows = vec![
            slot_row("2024-01-01", 10, 1000.0, 4.0),
            slot_row("2024-01-01", 9, 1000.0, 4.0),
        ];
        let s = build_single_market_series("DAM", &rows, Granularity::QuarterHourly).unwrap();
        assert_eq!(s.labels, vec!["2024-01-01 S-9", "2024-01-01 S-10"]);
    }

    #[test]
    fn duplicate_keys_keep_insertion_order() {
        let rows = vec![
            slot_row("2024-01-01", 5, 4000.0, 8.0),
            slot_row("2024-01-01", 5, 1000.0, 4.0),
        ];
        let s = build_single_market_series("DAM", &rows, Granularity::QuarterHourly).unwrap();
        assert_eq!(s.labels, vec!["2024-01-01 S-5", "2024-01-01 S-5"]);
        assert_eq!(s.prices, vec![4.0, 1.0]);

        let reversed: Vec<MarketRow> = rows.iter().rev().cloned().collect();
        let s = build_single_market_series("DAM", &reversed, Granularity::QuarterHourly).unwrap();
        assert_eq!(s.prices, vec![1.0, 4.0]);
    }

    #[test]
    fn sorting_is_idempotent() {
        let rows = vec![
            slot_row("2024-01-03", 2, 1.0, 1.0),
            slot_row("2024-01-01", 4, 2.0, 1.0),
            slot_row("2024-01-01", 4, 3.0, 1.0),
            slot_row("2024-01-02", 1, 4.0, 1.0),
        ];
        let once: Vec<MarketRow> = sort_rows(&rows, Granularity::QuarterHourly)
            .into_iter()
            .cloned()
            .collect();
        let twice: Vec<MarketRow> = sort_rows(&once, Granularity::QuarterHourly)
            .into_iter()
            .cloned()
            .collect();
        assert_eq!(once, twice);
    }

    #[test]
    fn price_conversion_is_exact_for_zero_and_negative() {
        let rows = vec![
            slot_row("2024-01-01", 1, 0.0, 1.0),
            slot_row("2024-01-01", 2, -1500.0, 1.0),
            slot_row("2024-01-01", 3, 10_000.0, 1.0),
        ];
        let s = build_single_market_series("DAM", &rows, Granularity::QuarterHourly).unwrap();
        for (row, price) in rows.iter().zip(&s.prices) {
            assert_eq!(*price, row.price_avg / 1000.0);
        }
    }

    #[test]
    fn hourly_rows_use_block_labels_and_quarter_factor() {
        let rows = vec![
            block_row("2024-01-01", Some(2), 5000.0),
            block_row("2024-01-01", None, 4000.0),
        ];
        let s = build_single_market_series("GDAM", &rows, Granularity::Hourly).unwrap();
        assert_eq!(s.labels, vec!["2024-01-01 H-0", "2024-01-01 H-2"]);
        assert_eq!(s.volumes, vec![10.0, 10.0]);
        assert_eq!(s.prices, vec![4.0, 5.0]);
    }

    #[test]
    fn multi_market_skips_empty_markets() {
        let mut markets = RowsByMarket::new();
        markets.insert("DAM".to_string(), vec![slot_row("2024-01-01", 1, 2500.0, 1.0)]);
        markets.insert("GDAM".to_string(), Vec::new());
        markets.insert(
            "RTM".to_string(),
            vec![
                slot_row("2024-01-01", 2, 3000.0, 1.0),
                slot_row("2024-01-01", 1, 2000.0, 1.0),
            ],
        );

        let out = build_multi_market_series(&markets, Granularity::QuarterHourly).unwrap();
        assert_eq!(out.len(), 2);
        assert!(!out.contains_key("GDAM"));
        assert_eq!(out["RTM"].labels, vec!["2024-01-01 S-1", "2024-01-01 S-2"]);
        assert_eq!(out["RTM"].prices, vec![2.0, 3.0]);
        assert_eq!(out["DAM"].prices, vec![2.5]);
    }

    #[test]
    fn multi_market_independent_ranges() {
        let mut markets = RowsByMarket::new();
        markets.insert(
            "DAM".to_string(),
            vec![
                block_row("2024-01-01", Some(1), 1000.0),
                block_row("2024-01-01", Some(2), 1000.0),
            ],
        );
        markets.insert("RTM".to_string(), vec![block_row("2024-02-10", Some(24), 2000.0)]);

        let out = build_multi_market_series(&markets, Granularity::Hourly).unwrap();
        assert_eq!(out["DAM"].labels.len(), 2);
        assert_eq!(out["RTM"].labels, vec!["2024-02-10 H-24"]);
    }

    #[test]
    fn multi_market_all_empty_is_none() {
        let mut markets = RowsByMarket::new();
        assert!(build_multi_market_series(&markets, Granularity::Hourly).is_none());
        markets.insert("DAM".to_string(), Vec::new());
        assert!(build_multi_market_series(&markets, Granularity::Hourly).is_none());
    }
}
