use crate::chart::figure::{BarMode, Figure, Layout, Trace};
use crate::config::PREVIOUS_YEAR_OPACITY;
use crate::palette::PALETTE;
use crate::series::build_yoy_comparison;
use crate::types::SummaryByMarket;

const VOLUME_PANEL: usize = 0;
const PRICE_PANEL: usize = 1;

/// Grouped bars: volume on the left panel, price on the right. Last year's
/// bars are faded and kept out of the legend.
pub fn comparison_figure(
    current: &SummaryByMarket,
    previous: &SummaryByMarket,
    year: i32,
) -> Option<Figure> {
    let set = build_yoy_comparison(current, previous, year)?;
    let prev_year = set.previous_year;

    let mut traces = Vec::with_capacity(set.markets.len() * 4);
    for m in &set.markets {
        let color = PALETTE.market_color(&m.market);
        let x = vec![m.market.clone()];

        traces.push(
            Trace::bar(format!("{} '{year}", m.market), x.clone(), vec![m.volume_gwh.current])
                .color(color)
                .panel(VOLUME_PANEL)
                .hover(format!("%{{x}} {year}: %{{y:.2f}} GWh")),
        );
        traces.push(
            Trace::bar(format!("{} '{prev_year}", m.market), x.clone(), vec![m.volume_gwh.previous])
                .color(color)
                .panel(VOLUME_PANEL)
                .opacity(PREVIOUS_YEAR_OPACITY)
                .hide_from_legend()
                .hover(format!("%{{x}} {prev_year}: %{{y:.2f}} GWh")),
        );
        traces.push(
            Trace::bar(m.market.as_str(), x.clone(), vec![m.price.current])
                .color(color)
                .panel(PRICE_PANEL)
                .hide_from_legend()
                .hover(format!("%{{x}} {year}: ₹%{{y:.2f}}/kWh")),
        );
        traces.push(
            Trace::bar(format!("{} Prev", m.market), x, vec![m.price.previous])
                .color(color)
                .panel(PRICE_PANEL)
                .opacity(PREVIOUS_YEAR_OPACITY)
                .hide_from_legend()
                .hover(format!("%{{x}} {prev_year}: ₹%{{y:.2f}}/kWh")),
        );
    }

    let mut layout = Layout::card("Year-over-Year Performance", None);
    layout.panels = vec!["Volume (GWh)".to_string(), "Price (₹/kWh)".to_string()];
    layout.bar_mode = BarMode::Group;
    layout.x_axis.show_grid = false;

    Some(Figure { layout, traces })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MarketSummary;

    fn summaries(entries: &[(&str, f64, f64)]) -> SummaryByMarket {
        entries
            .iter()
            .map(|(m, vol, twap)| {
                (
                    m.to_string(),
                    MarketSummary {
                        total_volume_gwh: *vol,
                        twap: *twap,
                        ..Default::default()
                    },
                )
            })
            .collect()
    }

    #[test]
    fn no_current_volume_gives_no_figure() {
        let current = summaries(&[("DAM", 0.0, 5.0)]);
        let previous = summaries(&[("DAM", 10.0, 4.0)]);
        assert!(comparison_figure(&current, &previous, 2025).is_none());
    }

    #[test]
    fn four_bars_per_market() {
        let current = summaries(&[("DAM", 12.0, 5.1), ("RTM", 3.0, 4.4)]);
        let previous = summaries(&[("DAM", 10.0, 4.0)]);
        let fig = comparison_figure(&current, &previous, 2025).unwrap();

        assert_eq!(fig.traces.len(), 8);
        assert_eq!(fig.layout.bar_mode, BarMode::Group);
        assert_eq!(fig.layout.panels.len(), 2);

        let names: Vec<&str> = fig.traces[..4].iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["DAM '2025", "DAM '2024", "DAM", "DAM Prev"]);

        let prev_vol = &fig.traces[1];
        assert_eq!(prev_vol.opacity, PREVIOUS_YEAR_OPACITY);
        assert!(!prev_vol.show_legend);
        assert_eq!(prev_vol.panel, VOLUME_PANEL);
        assert_eq!(prev_vol.y, vec![10.0]);

        let price = &fig.traces[2];
        assert_eq!(price.panel, PRICE_PANEL);
        assert_eq!(price.y, vec![5.1]);

        assert_eq!(fig.traces[4].name, "RTM '2025");
        assert_eq!(fig.traces[5].y, vec![0.0]);
    }
}
