use serde::Serialize;
use tracing::debug;

use crate::config::CANONICAL_MARKETS;
use crate::types::{MarketSummary, SummaryByMarket};

/// Current-period value next to the same metric one year earlier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BarPair {
    pub current: f64,
    /// Rendered at reduced emphasis.
    pub previous: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketComparison {
    pub market: String,
    pub volume_gwh: BarPair,
    /// TWAP as supplied upstream.
    pub price: BarPair,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonSet {
    pub year: i32,
    pub previous_year: i32,
    /// Canonical market order.
    pub markets: Vec<MarketComparison>,
}

/// Pair each canonical market's current summary with last year's.
///
/// A market is only included when its current volume is positive; previous
/// data alone never brings a market in. `None` when every market is skipped
/// or `year` has no predecessor.
pub fn build_yoy_comparison(
    current: &SummaryByMarket,
    previous: &SummaryByMarket,
    year: i32,
) -> Option<ComparisonSet> {
    let Some(previous_year) = year.checked_sub(1) else {
        debug!(year, "year has no predecessor, skipping yoy comparison");
        return None;
    };
    let mut markets = Vec::new();

    for market in CANONICAL_MARKETS {
        let Some(curr) = current.get(market) else {
            continue;
        };
        if curr.total_volume_gwh <= 0.0 {
            debug!(market, "no current volume, skipping yoy comparison");
            continue;
        }
        let prev = previous.get(market).copied().unwrap_or_default();
        markets.push(compare(market, curr, &prev));
    }

    if markets.is_empty() {
        return None;
    }

    Some(ComparisonSet {
        year,
        previous_year,
        markets,
    })
}

fn compare(market: &str, curr: &MarketSummary, prev: &MarketSummary) -> MarketComparison {
    MarketComparison {
        market: market.to_string(),
        volume_gwh: BarPair {
            current: curr.total_volume_gwh,
            previous: prev.total_volume_gwh,
        },
        price: BarPair {
            current: curr.twap,
            previous: prev.twap,
        },
    }
}
