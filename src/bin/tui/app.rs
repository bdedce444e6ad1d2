use std::collections::BTreeMap;
use std::path::PathBuf;

use ratatui::style::Color;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

// ---------------------------------------------------------------------------
// Dashboard file: the rows and summaries the viewer posts to the API.
// Rows and summaries are forwarded untouched; the server validates them.
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DashboardFile {
    #[serde(default)]
    pub time_label: String,
    pub is_quarterly: bool,
    pub year: i32,
    #[serde(default)]
    pub markets: BTreeMap<String, Vec<Value>>,
    #[serde(default)]
    pub current: BTreeMap<String, Value>,
    #[serde(default)]
    pub previous: BTreeMap<String, Value>,
}

// ---------------------------------------------------------------------------
// API response types (mirror routes.rs shapes)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Default)]
pub struct SeriesResponse {
    pub market: String,
    pub labels: Vec<String>,
    pub volumes: Vec<f64>,
    pub prices: Vec<f64>,
    pub buy_bids: Vec<f64>,
    pub sell_bids: Vec<f64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct PriceSeriesResponse {
    pub labels: Vec<String>,
    pub prices: Vec<f64>,
}

#[derive(Debug, Clone, Copy, Deserialize, Default)]
pub struct BarPairResponse {
    pub current: f64,
    pub previous: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarketComparisonResponse {
    pub market: String,
    pub volume_gwh: BarPairResponse,
    pub price: BarPairResponse,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ComparisonResponse {
    pub year: i32,
    pub previous_year: i32,
    pub markets: Vec<MarketComparisonResponse>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LatencyResponse {
    pub p99_ms: Option<f64>,
    pub sample_count: Option<u64>,
}

// ---------------------------------------------------------------------------
// App state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionStatus {
    Connected,
    Error(String),
    Connecting,
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub status: ConnectionStatus,
    pub file_path: PathBuf,
    pub dashboard: Option<DashboardFile>,
    /// Index into `market_names()` of the market shown in the detail charts.
    pub selected: usize,
    pub series: Option<SeriesResponse>,
    pub multi: BTreeMap<String, PriceSeriesResponse>,
    pub comparison: Option<ComparisonResponse>,
    pub latency: LatencyResponse,
    pub base_url: String,
}

impl AppState {
    pub fn new(base_url: String, file_path: PathBuf) -> Self {
        Self {
            status: ConnectionStatus::Connecting,
            file_path,
            dashboard: None,
            selected: 0,
            series: None,
            multi: BTreeMap::new(),
            comparison: None,
            latency: LatencyResponse::default(),
            base_url,
        }
    }

    pub fn market_names(&self) -> Vec<String> {
        self.dashboard
            .as_ref()
            .map(|d| d.markets.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn selected_market(&self) -> Option<String> {
        self.market_names().get(self.selected).cloned()
    }

    pub fn select_next(&mut self) {
        let n = self.market_names().len();
        if n > 0 {
            self.selected = (self.selected + 1) % n;
        }
    }

    pub fn select_prev(&mut self) {
        let n = self.market_names().len();
        if n > 0 {
            self.selected = (self.selected + n - 1) % n;
        }
    }

    /// Re-read the dashboard file from disk.
    pub fn load_file(&mut self) -> Result<(), String> {
        let raw = std::fs::read_to_string(&self.file_path)
            .map_err(|e| format!("{}: {e}", self.file_path.display()))?;
        let dashboard: DashboardFile =
            serde_json::from_str(&raw).map_err(|e| format!("invalid dashboard file: {e}"))?;
        self.dashboard = Some(dashboard);
        let n = self.market_names().len();
        if self.selected >= n {
            self.selected = 0;
        }
        Ok(())
    }

    /// Post the loaded dashboard to the API and store the series it returns.
    pub async fn refresh(&mut self, client: &reqwest::Client) {
        let Some(dashboard) = self.dashboard.clone() else {
            self.status = ConnectionStatus::Error("no dashboard loaded".to_string());
            return;
        };
        let market = self.selected_market().unwrap_or_default();
        let rows = dashboard.markets.get(&market).cloned().unwrap_or_default();

        let market_url = format!("{}/series/market", self.base_url);
        let multi_url = format!("{}/series/multi", self.base_url);
        let yoy_url = format!("{}/series/yoy", self.base_url);
        let latency_url = format!("{}/stats/latency", self.base_url);

        let market_body = json!({
            "market": market,
            "is_quarterly": dashboard.is_quarterly,
            "rows": rows,
        });
        let multi_body = json!({
            "is_quarterly": dashboard.is_quarterly,
            "markets": dashboard.markets,
        });
        let yoy_body = json!({
            "current": dashboard.current,
            "previous": dashboard.previous,
            "year": dashboard.year,
        });

        let (market_res, multi_res, yoy_res) = tokio::join!(
            post_json::<Option<SeriesResponse>>(client, &market_url, &market_body),
            post_json::<Option<BTreeMap<String, PriceSeriesResponse>>>(client, &multi_url, &multi_body),
            post_json::<Option<ComparisonResponse>>(client, &yoy_url, &yoy_body),
        );

        match (market_res, multi_res, yoy_res) {
            (Ok(series), Ok(multi), Ok(comparison)) => {
                self.series = series;
                self.multi = multi.unwrap_or_default();
                self.comparison = comparison;
                self.status = ConnectionStatus::Connected;
            }
            (Err(e), _, _) | (_, Err(e), _) | (_, _, Err(e)) => {
                self.status = ConnectionStatus::Error(e);
                return;
            }
        }

        if let Ok(resp) = client.get(&latency_url).send().await {
            if let Ok(latency) = resp.json::<LatencyResponse>().await {
                self.latency = latency;
            }
        }
    }
}

async fn post_json<T: serde::de::DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
    body: &Value,
) -> Result<T, String> {
    let resp = client
        .post(url)
        .json(body)
        .send()
        .await
        .map_err(|e| e.to_string())?;
    if !resp.status().is_success() {
        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();
        return Err(format!("{status}: {}", truncate(&text, 60)));
    }
    resp.json::<T>().await.map_err(|e| format!("parse error: {e}"))
}

// ---------------------------------------------------------------------------
// Chart helpers
// ---------------------------------------------------------------------------

/// Terminal approximations of `palette::PALETTE` market colours; keep in step with it.
const MARKET_COLORS: &[(&str, Color)] = &[
    ("DAM", Color::Blue),
    ("GDAM", Color::Green),
    ("RTM", Color::Yellow),
];

pub fn market_color(market: &str) -> Color {
    MARKET_COLORS
        .iter()
        .find(|(m, _)| *m == market)
        .map(|(_, c)| *c)
        .unwrap_or(Color::Gray)
}

/// (index, value) points for a category series.
pub fn points(values: &[f64]) -> Vec<(f64, f64)> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| (i as f64, *v))
        .collect()
}

/// Min/max of all values with 5% headroom. `[0, 1]` when there is nothing to show.
pub fn value_bounds<'a>(series: impl IntoIterator<Item = &'a [f64]>) -> [f64; 2] {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for values in series {
        for v in values {
            lo = lo.min(*v);
            hi = hi.max(*v);
        }
    }
    if !lo.is_finite() || !hi.is_finite() {
        return [0.0, 1.0];
    }
    let pad = ((hi - lo) * 0.05).max(0.01);
    [lo - pad, hi + pad]
}

/// First, middle and last category labels.
pub fn edge_labels(labels: &[String]) -> Vec<String> {
    match labels.len() {
        0 => Vec::new(),
        1 => vec![labels[0].clone()],
        n => vec![
            labels[0].clone(),
            labels[n / 2].clone(),
            labels[n - 1].clone(),
        ],
    }
}

pub fn format_pct_change(current: f64, previous: f64) -> String {
    if previous <= 0.0 {
        return "—".to_string();
    }
    let pct = (current - previous) / previous * 100.0;
    if pct > 0.0 {
        format!("▲ {:.1}%", pct)
    } else if pct < 0.0 {
        format!("▼ {:.1}%", pct.abs())
    } else {
        "-".to_string()
    }
}

pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_pad_range() {
        let a = [1.0, 3.0];
        let b = [2.0, 5.0];
        let [lo, hi] = value_bounds([&a[..], &b[..]]);
        assert!(lo < 1.0 && lo > 0.7);
        assert!(hi > 5.0 && hi < 5.3);
    }

    #[test]
    fn bounds_default_when_empty() {
        assert_eq!(value_bounds(std::iter::empty::<&[f64]>()), [0.0, 1.0]);
    }

    #[test]
    fn edge_labels_pick_first_middle_last() {
        let labels: Vec<String> = (1..=5).map(|i| format!("S-{i}")).collect();
        assert_eq!(edge_labels(&labels), vec!["S-1", "S-3", "S-5"]);
        assert!(edge_labels(&[]).is_empty());
    }

    #[test]
    fn pct_change_formats_direction() {
        assert_eq!(format_pct_change(5.0, 4.0), "▲ 25.0%");
        assert_eq!(format_pct_change(3.0, 4.0), "▼ 25.0%");
        assert_eq!(format_pct_change(3.0, 0.0), "—");
    }

    #[test]
    fn selection_wraps() {
        let mut app = AppState::new("http://x".to_string(), PathBuf::from("d.json"));
        app.dashboard = Some(DashboardFile {
            time_label: String::new(),
            is_quarterly: true,
            year: 2025,
            markets: [("DAM".to_string(), Vec::new()), ("RTM".to_string(), Vec::new())]
                .into_iter()
                .collect(),
            current: BTreeMap::new(),
            previous: BTreeMap::new(),
        });
        assert_eq!(app.selected_market().as_deref(), Some("DAM"));
        app.select_prev();
        assert_eq!(app.selected_market().as_deref(), Some("RTM"));
        app.select_next();
        assert_eq!(app.selected_market().as_deref(), Some("DAM"));
    }

    #[test]
    fn unknown_market_colour_falls_back() {
        assert_eq!(market_color("DAM"), Color::Blue);
        assert_eq!(market_color("TAM"), Color::Gray);
    }

    #[test]
    fn every_palette_market_has_a_terminal_colour() {
        let colours: Vec<Color> = ["DAM", "GDAM", "RTM"].iter().map(|m| market_color(m)).collect();
        assert!(colours.iter().all(|c| *c != Color::Gray));
        assert_eq!(colours, vec![Color::Blue, Color::Green, Color::Yellow]);
    }
}
