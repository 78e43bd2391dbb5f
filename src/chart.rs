//! Encoding-agnostic chart descriptions.
//!
//! A [`ChartDescription`] says what to draw (marks, field bindings, colors,
//! titles and the aggregated rows) without committing to a rendering
//! technology. It serializes to JSON for web front ends and is drawn by
//! [`crate::render`] for PNG/SVG output.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::filter::RangeColumn;

/// The eight dashboard charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartId {
    LeadTimeDistribution,
    StayDurationPatterns,
    BookingPatternsMarketSegment,
    AdrVsStayLength,
    CancellationsByLeadTime,
    CancellationTrendsByMonth,
    BookingTrendsHeatmap,
    RevenueByMarketSegment,
}

impl ChartId {
    pub const ALL: [ChartId; 8] = [
        ChartId::LeadTimeDistribution,
        ChartId::StayDurationPatterns,
        ChartId::BookingPatternsMarketSegment,
        ChartId::AdrVsStayLength,
        ChartId::CancellationsByLeadTime,
        ChartId::CancellationTrendsByMonth,
        ChartId::BookingTrendsHeatmap,
        ChartId::RevenueByMarketSegment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChartId::LeadTimeDistribution => "lead_time_distribution",
            ChartId::StayDurationPatterns => "stay_duration_patterns",
            ChartId::BookingPatternsMarketSegment => "booking_patterns_market_segment",
            ChartId::AdrVsStayLength => "adr_vs_stay_length",
            ChartId::CancellationsByLeadTime => "cancellations_by_lead_time",
            ChartId::CancellationTrendsByMonth => "cancellation_trends_by_month",
            ChartId::BookingTrendsHeatmap => "booking_trends_heatmap",
            ChartId::RevenueByMarketSegment => "revenue_by_market_segment",
        }
    }

    /// Column a user-supplied range applies to. Other charts ignore ranges.
    pub fn range_column(&self) -> Option<RangeColumn> {
        match self {
            ChartId::LeadTimeDistribution => Some(RangeColumn::LeadTime),
            ChartId::AdrVsStayLength => Some(RangeColumn::TotalStay),
            _ => None,
        }
    }

}

impl fmt::Display for ChartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown chart id '{0}'")]
pub struct UnknownChart(pub String);

impl FromStr for ChartId {
    type Err = UnknownChart;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChartId::ALL
            .iter()
            .copied()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| UnknownChart(s.to_string()))
    }
}

/// One cell of an aggregated table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Datum {
    Int(i64),
    Float(f64),
    Text(String),
    Date(NaiveDate),
    Floats(Vec<f64>),
}

impl Datum {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Datum::Int(v) => Some(*v as f64),
            Datum::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Category label used on discrete axes and legends.
    pub fn label(&self) -> String {
        match self {
            Datum::Int(v) => v.to_string(),
            Datum::Float(v) => v.to_string(),
            Datum::Text(s) => s.clone(),
            Datum::Date(d) => d.format("%Y-%m-%d").to_string(),
            Datum::Floats(vs) => format!("{vs:?}"),
        }
    }
}

impl From<&str> for Datum {
    fn from(value: &str) -> Self {
        Datum::Text(value.to_string())
    }
}

impl From<String> for Datum {
    fn from(value: String) -> Self {
        Datum::Text(value)
    }
}

impl From<f64> for Datum {
    fn from(value: f64) -> Self {
        Datum::Float(value)
    }
}

impl From<u32> for Datum {
    fn from(value: u32) -> Self {
        Datum::Int(i64::from(value))
    }
}

impl From<i32> for Datum {
    fn from(value: i32) -> Self {
        Datum::Int(i64::from(value))
    }
}

impl From<usize> for Datum {
    fn from(value: usize) -> Self {
        Datum::Int(value as i64)
    }
}

impl From<NaiveDate> for Datum {
    fn from(value: NaiveDate) -> Self {
        Datum::Date(value)
    }
}

/// Small ordered table of named columns.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Datum>>,
}

impl Table {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// All values of one column, in row order.
    pub fn column(&self, name: &str) -> Vec<&Datum> {
        match self.column_index(name) {
            Some(idx) => self.rows.iter().filter_map(|r| r.get(idx)).collect(),
            None => Vec::new(),
        }
    }

    /// Distinct labels of one column in first-appearance order.
    pub fn distinct_labels(&self, name: &str) -> Vec<String> {
        let mut seen = Vec::new();
        for datum in self.column(name) {
            let label = datum.label();
            if !seen.contains(&label) {
                seen.push(label);
            }
        }
        seen
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Typed aggregate rows that can be laid out as a [`Table`].
pub trait Tabular {
    const COLUMNS: &'static [&'static str];

    fn cells(&self) -> Vec<Datum>;

    fn to_table(rows: &[Self]) -> Table
    where
        Self: Sized,
    {
        Table {
            columns: Self::COLUMNS.iter().map(|c| c.to_string()).collect(),
            rows: rows.iter().map(Tabular::cells).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Vertical,
    Horizontal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BarMode {
    Group,
    Stack,
}

/// Mark type of a layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Mark {
    Histogram { opacity: f64, bar_gap: f64 },
    Bar { orientation: Orientation, mode: BarMode },
    Scatter,
    Box { orientation: Orientation },
    Line,
    Heatmap { color_scale: String, text_auto: bool },
    /// Areas stacked in series order.
    Area,
}

/// Field bindings of a layer: which table column drives which channel.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Encoding {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub hover: Vec<String>,
}

/// A mark drawn over a table. The first layer of a chart is the main plot;
/// later layers are marginals drawn alongside it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layer {
    pub mark: Mark,
    pub encoding: Encoding,
    pub table: Table,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Axis {
    pub title: String,
    /// Category order for discrete axes; `None` for continuous axes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
}

impl Axis {
    pub fn continuous(title: &str) -> Self {
        Self {
            title: title.to_string(),
            categories: None,
        }
    }

    pub fn discrete(title: &str, categories: Vec<String>) -> Self {
        Self {
            title: title.to_string(),
            categories: Some(categories),
        }
    }
}

/// Color assignment for the series dimension.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColorMapping {
    Categorical {
        field: String,
        /// Ordered `(series value, color)` pairs.
        entries: Vec<(String, String)>,
    },
    Continuous {
        field: String,
        scale: String,
    },
}

impl ColorMapping {
    pub fn color_of(&self, value: &str) -> Option<&str> {
        match self {
            ColorMapping::Categorical { entries, .. } => entries
                .iter()
                .find(|(k, _)| k == value)
                .map(|(_, c)| c.as_str()),
            ColorMapping::Continuous { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Font {
    pub size: u32,
    pub color: String,
}

/// Presentation constants applied to every chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Styling {
    pub plot_background: String,
    pub paper_background: String,
    pub font: Font,
    pub show_legend: bool,
}

/// Axis data of a populated chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub title: String,
    pub layers: Vec<Layer>,
    pub x_axis: Axis,
    pub y_axis: Axis,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legend_title: Option<String>,
    pub color: ColorMapping,
}

/// Centered text shown instead of axes when a chart has nothing to plot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annotation {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub font: Font,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartBody {
    Data(ChartData),
    Empty { annotation: Annotation },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartDescription {
    pub chart: ChartId,
    pub body: ChartBody,
    pub style: Styling,
}

impl ChartDescription {
    pub fn is_empty(&self) -> bool {
        matches!(self.body, ChartBody::Empty { .. })
    }

    /// Placeholder message, if this is a placeholder chart.
    pub fn message(&self) -> Option<&str> {
        match &self.body {
            ChartBody::Empty { annotation } => Some(&annotation.text),
            ChartBody::Data(_) => None,
        }
    }

    pub fn data(&self) -> Option<&ChartData> {
        match &self.body {
            ChartBody::Data(data) => Some(data),
            ChartBody::Empty { .. } => None,
        }
    }
}
