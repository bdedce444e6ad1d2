//! Process-wide chart colours. Built once, never mutated.

use std::collections::HashMap;
use std::sync::LazyLock;

pub static PALETTE: LazyLock<Palette> = LazyLock::new(Palette::standard);

#[derive(Debug, Clone)]
pub struct Palette {
    markets: HashMap<&'static str, &'static str>,
    /// Colour for market names missing from the table.
    pub fallback: &'static str,
    pub volume: &'static str,
    pub bid_buy: &'static str,
    pub bid_sell: &'static str,
    pub grid: &'static str,
    pub text_primary: &'static str,
    pub text_secondary: &'static str,
}

impl Palette {
    fn standard() -> Self {
        Self {
            markets: HashMap::from([
                ("DAM", "#2563eb"),
                ("GDAM", "#16a34a"),
                ("RTM", "#f59e0b"),
            ]),
            fallback: "#666666",
            volume: "rgba(148, 163, 184, 0.25)",
            bid_buy: "#60a5fa",
            bid_sell: "#fb7185",
            grid: "#e2e8f0",
            text_primary: "#0f172a",
            text_secondary: "#475569",
        }
    }

    pub fn market_color(&self, market: &str) -> &'static str {
        self.markets.get(market).copied().unwrap_or(self.fallback)
    }
}
