mod app;

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use app::{
    edge_labels, format_pct_change, market_color, points, truncate, value_bounds, AppState,
    ConnectionStatus,
};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Cell, Chart, Dataset, GraphType, Paragraph, Row, Table},
    Frame, Terminal,
};

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> io::Result<()> {
    let base_url = std::env::var("API_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());
    let file_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("DASHBOARD_FILE").ok())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("demos/dashboard.json"));

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .map_err(io::Error::other)?;

    let mut app = AppState::new(base_url, file_path);
    reload(&mut app, &client).await;

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_loop(&mut terminal, &mut app, &client).await;

    // Restore terminal regardless of result
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

async fn reload(app: &mut AppState, client: &reqwest::Client) {
    match app.load_file() {
        Ok(()) => app.refresh(client).await,
        Err(e) => app.status = ConnectionStatus::Error(e),
    }
}

// ---------------------------------------------------------------------------
// Main event loop
// ---------------------------------------------------------------------------

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
    client: &reqwest::Client,
) -> io::Result<()> {
    let poll_interval = Duration::from_millis(250);

    loop {
        terminal.draw(|f| render(f, app))?;

        if event::poll(poll_interval)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') | KeyCode::Char('Q') => return Ok(()),
                        KeyCode::Char('r') | KeyCode::Char('R') => reload(app, client).await,
                        KeyCode::Right | KeyCode::Char('l') => {
                            app.select_next();
                            app.refresh(client).await;
                        }
                        KeyCode::Left | KeyCode::Char('h') => {
                            app.select_prev();
                            app.refresh(client).await;
                        }
                        _ => {}
                    }
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn render(f: &mut Frame, app: &AppState) {
    let area = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // header
            Constraint::Min(0),    // body
            Constraint::Length(1), // footer
        ])
        .split(area);

    render_header(f, app, chunks[0]);
    render_body(f, app, chunks[1]);
    render_footer(f, chunks[2]);
}

fn render_header(f: &mut Frame, app: &AppState, area: Rect) {
    let (status_text, status_color) = match &app.status {
        ConnectionStatus::Connected => ("● connected".to_string(), Color::Green),
        ConnectionStatus::Connecting => ("◌ connecting".to_string(), Color::Yellow),
        ConnectionStatus::Error(e) => (format!("✗ {}", truncate(e, 50)), Color::Red),
    };

    let time_label = app
        .dashboard
        .as_ref()
        .map(|d| d.time_label.clone())
        .unwrap_or_default();
    let market = app.selected_market().unwrap_or_else(|| "—".to_string());
    let p99 = app
        .latency
        .p99_ms
        .map_or("—".to_string(), |v| {
            format!("{:.2}ms p99 ({} builds)", v, app.latency.sample_count.unwrap_or(0))
        });

    let spans = vec![
        Span::styled(
            " Energy Market Charts  ",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled(status_text, Style::default().fg(status_color)),
        Span::raw("  │  "),
        Span::styled(market.clone(), Style::default().fg(market_color(&market))),
        Span::raw("  │  "),
        Span::styled(time_label, Style::default().fg(Color::White)),
        Span::raw("  │  "),
        Span::styled(p99, Style::default().fg(Color::DarkGray)),
    ];

    let paragraph = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    f.render_widget(paragraph, area);
}

fn render_body(f: &mut Frame, app: &AppState, area: Rect) {
    // Horizontal split: charts (65%) | yoy table (35%)
    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(area);

    let charts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(40),
            Constraint::Percentage(25),
            Constraint::Percentage(35),
        ])
        .split(halves[0]);

    render_price_chart(f, app, charts[0]);
    render_volume_chart(f, app, charts[1]);
    render_multi_chart(f, app, charts[2]);
    render_yoy_table(f, app, halves[1]);
}

fn titled_block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            format!(" {title} "),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ))
}

fn empty_panel(f: &mut Frame, title: &str, area: Rect) {
    let paragraph = Paragraph::new(Span::styled(
        "No data for this selection.",
        Style::default().fg(Color::DarkGray),
    ))
    .block(titled_block(title));
    f.render_widget(paragraph, area);
}

fn x_axis(labels: &[String]) -> Axis<'static> {
    Axis::default()
        .style(Style::default().fg(Color::Gray))
        .bounds([0.0, labels.len().saturating_sub(1).max(1) as f64])
        .labels(edge_labels(labels))
}

fn y_axis(title: &'static str, bounds: [f64; 2]) -> Axis<'static> {
    Axis::default()
        .title(title)
        .style(Style::default().fg(Color::Gray))
        .bounds(bounds)
        .labels(vec![format!("{:.2}", bounds[0]), format!("{:.2}", bounds[1])])
}

fn render_price_chart(f: &mut Frame, app: &AppState, area: Rect) {
    let Some(series) = &app.series else {
        empty_panel(f, "PRICE", area);
        return;
    };

    let price_points = points(&series.prices);
    let datasets = vec![Dataset::default()
        .name("Price ₹/kWh")
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(market_color(&series.market)))
        .data(&price_points)];

    let title = format!("{} PRICE", series.market);
    let chart = Chart::new(datasets)
        .block(titled_block(&title))
        .x_axis(x_axis(&series.labels))
        .y_axis(y_axis("₹/kWh", value_bounds([series.prices.as_slice()])));
    f.render_widget(chart, area);
}

fn render_volume_chart(f: &mut Frame, app: &AppState, area: Rect) {
    let Some(series) = &app.series else {
        empty_panel(f, "VOLUME & BIDS", area);
        return;
    };

    let volume_points = points(&series.volumes);
    let buy_points = points(&series.buy_bids);
    let sell_points = points(&series.sell_bids);
    let datasets = vec![
        Dataset::default()
            .name("Volume MWh")
            .marker(symbols::Marker::HalfBlock)
            .graph_type(GraphType::Bar)
            .style(Style::default().fg(Color::DarkGray))
            .data(&volume_points),
        Dataset::default()
            .name("Buy MW")
            .marker(symbols::Marker::Dot)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::LightBlue))
            .data(&buy_points),
        Dataset::default()
            .name("Sell MW")
            .marker(symbols::Marker::Dot)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::LightRed))
            .data(&sell_points),
    ];

    let bounds = value_bounds([
        series.volumes.as_slice(),
        series.buy_bids.as_slice(),
        series.sell_bids.as_slice(),
    ]);
    let chart = Chart::new(datasets)
        .block(titled_block("VOLUME & BIDS"))
        .x_axis(x_axis(&series.labels))
        .y_axis(y_axis("MWh / MW", [bounds[0].min(0.0), bounds[1]]));
    f.render_widget(chart, area);
}

fn render_multi_chart(f: &mut Frame, app: &AppState, area: Rect) {
    if app.multi.is_empty() {
        empty_panel(f, "MARKET COMPARISON", area);
        return;
    }

    let all_points: Vec<(String, Vec<(f64, f64)>)> = app
        .multi
        .iter()
        .map(|(market, s)| (market.clone(), points(&s.prices)))
        .collect();
    let datasets = all_points
        .iter()
        .map(|(market, pts)| {
            Dataset::default()
                .name(market.clone())
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(market_color(market)))
                .data(pts)
        })
        .collect();

    // Markets keep independent x ranges; the longest one sets the axis.
    let longest = app
        .multi
        .values()
        .max_by_key(|s| s.labels.len())
        .map(|s| s.labels.clone())
        .unwrap_or_default();
    let bounds = value_bounds(app.multi.values().map(|s| s.prices.as_slice()));

    let chart = Chart::new(datasets)
        .block(titled_block("MARKET COMPARISON"))
        .x_axis(x_axis(&longest))
        .y_axis(y_axis("₹/kWh", bounds));
    f.render_widget(chart, area);
}

fn render_yoy_table(f: &mut Frame, app: &AppState, area: Rect) {
    let Some(comparison) = &app.comparison else {
        empty_panel(f, "YEAR-OVER-YEAR", area);
        return;
    };

    let header_cells = [
        "Mkt".to_string(),
        format!("Vol '{}", comparison.year % 100),
        format!("Vol '{}", comparison.previous_year % 100),
        "Price".to_string(),
        "YoY".to_string(),
    ]
    .into_iter()
    .map(|h| Cell::from(h).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)));
    let header = Row::new(header_cells).height(1);

    let rows: Vec<Row> = comparison
        .markets
        .iter()
        .map(|m| {
            let change = format_pct_change(m.price.current, m.price.previous);
            let change_color = if change.starts_with('▲') {
                Color::Green
            } else if change.starts_with('▼') {
                Color::Red
            } else {
                Color::DarkGray
            };
            Row::new(vec![
                Cell::from(m.market.clone()).style(Style::default().fg(market_color(&m.market))),
                Cell::from(format!("{:.1}", m.volume_gwh.current)),
                Cell::from(format!("{:.1}", m.volume_gwh.previous))
                    .style(Style::default().fg(Color::DarkGray)),
                Cell::from(format!("{:.2}", m.price.current)),
                Cell::from(change).style(Style::default().fg(change_color)),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(5),
            Constraint::Length(9),
            Constraint::Length(9),
            Constraint::Length(7),
            Constraint::Min(8),
        ],
    )
    .header(header)
    .block(titled_block("YEAR-OVER-YEAR"));

    f.render_widget(table, area);
}

fn render_footer(f: &mut Frame, area: Rect) {
    let line = Line::from(vec![
        Span::styled(" [q] ", Style::default().fg(Color::Yellow)),
        Span::raw("quit  "),
        Span::styled("[r] ", Style::default().fg(Color::Yellow)),
        Span::raw("reload file  "),
        Span::styled("[←→ / h l] ", Style::default().fg(Color::Yellow)),
        Span::raw("switch market"),
    ]);
    let paragraph = Paragraph::new(line).style(Style::default().fg(Color::White));
    f.render_widget(paragraph, area);
}
