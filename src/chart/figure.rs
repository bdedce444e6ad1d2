//! Renderer-agnostic chart description.
//!
//! A [`Figure`] is a list of traces plus a layout. Every trace carries its own
//! x categories so a renderer can draw it without cross-referencing others.

use serde::Serialize;

use crate::palette::PALETTE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceKind {
    Bar,
    Line,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum YAxis {
    Primary,
    Secondary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Visible,
    /// Drawn only after the user enables it from the legend.
    LegendOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineShape {
    Linear,
    Spline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineDash {
    Solid,
    Dot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BarMode {
    Overlay,
    Group,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineStyle {
    pub width: f64,
    pub dash: LineDash,
    pub shape: LineShape,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerStyle {
    pub size: f64,
    pub fill: String,
    pub outline: String,
    pub outline_width: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trace {
    pub name: String,
    pub kind: TraceKind,
    pub x: Vec<String>,
    pub y: Vec<f64>,
    pub y_axis: YAxis,
    /// Subplot column, 0-based.
    pub panel: usize,
    pub color: String,
    pub opacity: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<LineStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<MarkerStyle>,
    pub visibility: Visibility,
    pub show_legend: bool,
    pub hover_template: String,
}

impl Trace {
    fn new(kind: TraceKind, name: impl Into<String>, x: Vec<String>, y: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            kind,
            x,
            y,
            y_axis: YAxis::Primary,
            panel: 0,
            color: PALETTE.fallback.to_string(),
            opacity: 1.0,
            line: None,
            marker: None,
            visibility: Visibility::Visible,
            show_legend: true,
            hover_template: String::new(),
        }
    }

    pub fn bar(name: impl Into<String>, x: Vec<String>, y: Vec<f64>) -> Self {
        Self::new(TraceKind::Bar, name, x, y)
    }

    pub fn line(name: impl Into<String>, x: Vec<String>, y: Vec<f64>) -> Self {
        Self::new(TraceKind::Line, name, x, y)
    }

    pub fn color(mut self, color: &str) -> Self {
        self.color = color.to_string();
        self
    }

    pub fn secondary_axis(mut self) -> Self {
        self.y_axis = YAxis::Secondary;
        self
    }

    pub fn panel(mut self, panel: usize) -> Self {
        self.panel = panel;
        self
    }

    pub fn opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn line_style(mut self, width: f64, dash: LineDash, shape: LineShape) -> Self {
        self.line = Some(LineStyle { width, dash, shape });
        self
    }

    /// Hollow markers outlined in the trace colour.
    pub fn hollow_markers(mut self, size: f64) -> Self {
        self.marker = Some(MarkerStyle {
            size,
            fill: "white".to_string(),
            outline: self.color.clone(),
            outline_width: 2.0,
        });
        self
    }

    pub fn legend_only(mut self) -> Self {
        self.visibility = Visibility::LegendOnly;
        self
    }

    pub fn hide_from_legend(mut self) -> Self {
        self.show_legend = false;
        self
    }

    pub fn hover(mut self, template: impl Into<String>) -> Self {
        self.hover_template = template.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub show_grid: bool,
    pub show_tick_labels: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tick_angle: Option<f64>,
    pub grid_color: String,
    pub tick_color: String,
}

impl Default for AxisSpec {
    fn default() -> Self {
        Self {
            title: None,
            show_grid: true,
            show_tick_labels: true,
            tick_angle: None,
            grid_color: PALETTE.grid.to_string(),
            tick_color: PALETTE.text_secondary.to_string(),
        }
    }
}

impl AxisSpec {
    pub fn titled(title: &str) -> Self {
        Self {
            title: Some(title.to_string()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    /// Subplot titles, one per panel. Empty for single-panel figures.
    pub panels: Vec<String>,
    pub x_axis: AxisSpec,
    pub y_axis: AxisSpec,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_axis_secondary: Option<AxisSpec>,
    pub bar_mode: BarMode,
    pub show_legend: bool,
    pub unified_hover: bool,
    pub text_color: String,
}

impl Layout {
    /// Card-style defaults shared by every dashboard chart.
    pub fn card(title: impl Into<String>, subtitle: Option<&str>) -> Self {
        Self {
            title: title.into(),
            subtitle: subtitle.map(str::to_string),
            panels: Vec::new(),
            x_axis: AxisSpec::default(),
            y_axis: AxisSpec::default(),
            y_axis_secondary: None,
            bar_mode: BarMode::Overlay,
            show_legend: true,
            unified_hover: true,
            text_color: PALETTE.text_primary.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    pub layout: Layout,
    pub traces: Vec<Trace>,
}

impl Figure {
    /// True when every trace has as many y values as x categories.
    #[cfg(test)]
    pub fn is_aligned(&self) -> bool {
        self.traces.iter().all(|t| t.x.len() == t.y.len())
    }

    #[cfg(test)]
    pub fn trace(&self, name: &str) -> Option<&Trace> {
        self.traces.iter().find(|t| t.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trace_builder_defaults() {
        let t = Trace::line("Price", vec!["a".to_string()], vec![1.0]);
        assert_eq!(t.y_axis, YAxis::Primary);
        assert_eq!(t.visibility, Visibility::Visible);
        assert_eq!(t.opacity, 1.0);
        assert!(t.show_legend);
        assert!(t.line.is_none());
    }

    #[test]
    fn hollow_markers_follow_trace_colour() {
        let t = Trace::line("DAM", Vec::new(), Vec::new())
            .color("#2563eb")
            .hollow_markers(5.0);
        let marker = t.marker.unwrap();
        assert_eq!(marker.outline, "#2563eb");
        assert_eq!(marker.fill, "white");
    }

    #[test]
    fn serializes_enums_in_snake_case() {
        let t = Trace::bar("Volume", Vec::new(), Vec::new()).legend_only();
        let v = serde_json::to_value(&t).unwrap();
        assert_eq!(v["kind"], "bar");
        assert_eq!(v["visibility"], "legend_only");
        assert_eq!(v["y_axis"], "primary");
        assert!(v.get("line").is_none());
    }

    #[test]
    fn misaligned_trace_is_detected() {
        let fig = Figure {
            layout: Layout::card("t", None),
            traces: vec![Trace::bar("v", vec!["a".to_string()], vec![1.0, 2.0])],
        };
        assert!(!fig.is_aligned());
    }
}
