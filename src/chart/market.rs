use crate::chart::figure::{AxisSpec, Figure, Layout, LineDash, LineShape, Trace};
use crate::palette::PALETTE;
use crate::series::{build_multi_market_series, build_single_market_series};
use crate::types::{Granularity, MarketRow, RowsByMarket};

const PRICE_AXIS_TITLE: &str = "Price (₹/kWh)";
const VOLUME_AXIS_TITLE: &str = "Vol (MWh)";
const X_TICK_ANGLE: f64 = -35.0;

/// Dual-axis price and volume chart for one market.
///
/// Volume bars sit on the primary axis behind everything else; bids and price
/// share the secondary axis. Bids start hidden and are toggled from the legend.
pub fn market_figure(
    market: &str,
    time_label: &str,
    rows: &[MarketRow],
    granularity: Granularity,
) -> Option<Figure> {
    let series = build_single_market_series(market, rows, granularity)?;
    let color = PALETTE.market_color(market);

    let traces = vec![
        Trace::bar("Volume", series.labels.clone(), series.volumes)
            .color(PALETTE.volume)
            .hover("Volume: %{y:.2f} MWh"),
        Trace::line("Buy Bids", series.labels.clone(), series.buy_bids)
            .color(PALETTE.bid_buy)
            .line_style(1.4, LineDash::Dot, LineShape::Linear)
            .secondary_axis()
            .legend_only()
            .hover("Buy Bid: %{y:.1f} MW"),
        Trace::line("Sell Bids", series.labels.clone(), series.sell_bids)
            .color(PALETTE.bid_sell)
            .line_style(1.4, LineDash::Dot, LineShape::Linear)
            .secondary_axis()
            .legend_only()
            .hover("Sell Bid: %{y:.1f} MW"),
        Trace::line("Price", series.labels, series.prices)
            .color(color)
            .line_style(3.0, LineDash::Solid, LineShape::Spline)
            .hollow_markers(6.0)
            .secondary_axis()
            .hover("Price: ₹%{y:.2f}/kWh"),
    ];

    let mut layout = Layout::card(format!("{market} Price & Volume"), Some(time_label));
    layout.x_axis.show_grid = false;
    layout.x_axis.tick_angle = Some(X_TICK_ANGLE);
    layout.y_axis = AxisSpec {
        show_grid: false,
        show_tick_labels: false,
        ..AxisSpec::titled(VOLUME_AXIS_TITLE)
    };
    layout.y_axis_secondary = Some(AxisSpec::titled(PRICE_AXIS_TITLE));

    Some(Figure { layout, traces })
}

/// One price line per market, each on its own independently sorted x range.
pub fn multi_market_figure(
    markets: &RowsByMarket,
    time_label: &str,
    granularity: Granularity,
) -> Option<Figure> {
    let series = build_multi_market_series(markets, granularity)?;

    let traces = series
        .into_iter()
        .map(|(market, s)| {
            let hover = format!("{market}: ₹%{{y:.2f}}/kWh");
            Trace::line(market.as_str(), s.labels, s.prices)
                .color(PALETTE.market_color(&market))
                .line_style(2.5, LineDash::Solid, LineShape::Spline)
                .hollow_markers(5.0)
                .hover(hover)
        })
        .collect();

    let mut layout = Layout::card("Market Comparison", Some(time_label));
    layout.y_axis = AxisSpec::titled(PRICE_AXIS_TITLE);

    Some(Figure { layout, traces })
}
