// Per-chart aggregators

pub mod adr_stay;
pub mod cancellations;
pub mod heatmap;
pub mod lead_time;
pub mod market_segment;
pub mod monthly;
pub mod revenue;

use crate::chart::ChartId;
use crate::dataset::Dataset;
use crate::error::AggregateError;
use crate::filter::{self, FilterParams, FilteredView};
use tracing::{debug, warn};

pub use adr_stay::StayRatePoint;
pub use cancellations::CancellationPoint;
pub use heatmap::{BookingHeatmap, HeatmapCell};
pub use lead_time::{HistogramBin, LeadTimeBox, LeadTimeDistribution};
pub use market_segment::SegmentShare;
pub use monthly::{CancelRateByMonth, StayByMonth};
pub use revenue::SegmentRevenue;

pub const NO_DATA_MESSAGE: &str = "No data available for the selected filters.";

/// Outcome of an aggregation: rows to plot, or a message to show instead.
#[derive(Debug, Clone, PartialEq)]
pub enum Aggregation<T> {
    Data(T),
    Empty(String),
}

/// Aggregated output of one chart.
#[derive(Debug, Clone, PartialEq)]
pub enum AggregatedTable {
    LeadTime(LeadTimeDistribution),
    StayDuration(Vec<StayByMonth>),
    MarketSegment(Vec<SegmentShare>),
    AdrVsStay(Vec<StayRatePoint>),
    CancellationLeadTime(Vec<CancellationPoint>),
    CancellationTrend(Vec<CancelRateByMonth>),
    Heatmap(BookingHeatmap),
    Revenue(Vec<SegmentRevenue>),
}

impl AggregatedTable {
    /// Chart this table was aggregated for.
    pub fn chart(&self) -> ChartId {
        match self {
            AggregatedTable::LeadTime(_) => ChartId::LeadTimeDistribution,
            AggregatedTable::StayDuration(_) => ChartId::StayDurationPatterns,
            AggregatedTable::MarketSegment(_) => ChartId::BookingPatternsMarketSegment,
            AggregatedTable::AdrVsStay(_) => ChartId::AdrVsStayLength,
            AggregatedTable::CancellationLeadTime(_) => ChartId::CancellationsByLeadTime,
            AggregatedTable::CancellationTrend(_) => ChartId::CancellationTrendsByMonth,
            AggregatedTable::Heatmap(_) => ChartId::BookingTrendsHeatmap,
            AggregatedTable::Revenue(_) => ChartId::RevenueByMarketSegment,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            AggregatedTable::LeadTime(t) => t.bins.len(),
            AggregatedTable::StayDuration(t) => t.len(),
            AggregatedTable::MarketSegment(t) => t.len(),
            AggregatedTable::AdrVsStay(t) => t.len(),
            AggregatedTable::CancellationLeadTime(t) => t.len(),
            AggregatedTable::CancellationTrend(t) => t.len(),
            AggregatedTable::Heatmap(t) => t.cells.len(),
            AggregatedTable::Revenue(t) => t.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Dispatch a filtered view to the aggregator of `chart`.
pub fn aggregate(chart: ChartId, view: &FilteredView<'_>) -> Result<AggregatedTable, AggregateError> {
    Ok(match chart {
        ChartId::LeadTimeDistribution => AggregatedTable::LeadTime(lead_time::aggregate(view)?),
        ChartId::StayDurationPatterns => AggregatedTable::StayDuration(monthly::stay_by_month(view)?),
        ChartId::BookingPatternsMarketSegment => {
            AggregatedTable::MarketSegment(market_segment::aggregate(view))
        }
        ChartId::AdrVsStayLength => AggregatedTable::AdrVsStay(adr_stay::aggregate(view)?),
        ChartId::CancellationsByLeadTime => {
            AggregatedTable::CancellationLeadTime(cancellations::aggregate(view)?)
        }
        ChartId::CancellationTrendsByMonth => {
            AggregatedTable::CancellationTrend(monthly::cancel_rate_by_month(view)?)
        }
        ChartId::BookingTrendsHeatmap => AggregatedTable::Heatmap(heatmap::aggregate(view)?),
        ChartId::RevenueByMarketSegment => AggregatedTable::Revenue(revenue::aggregate(view)?),
    })
}

/// Filter and aggregate one chart. Never fails: no rows and any failure are
/// both folded into [`Aggregation::Empty`].
pub fn run(chart: ChartId, dataset: &Dataset, params: &FilterParams) -> Aggregation<AggregatedTable> {
    let result = filter::apply(dataset, params).and_then(|view| {
        debug!(chart = %chart, rows = view.len(), "filtered dataset");
        aggregate(chart, &view)
    });

    match result {
        Ok(table) if table.is_empty() => {
            debug!(chart = %chart, hotel = %params.hotel, "no rows after aggregation");
            Aggregation::Empty(NO_DATA_MESSAGE.to_string())
        }
        Ok(table) => {
            debug!(chart = %chart, rows = table.len(), "aggregated");
            Aggregation::Data(table)
        }
        Err(err) => {
            warn!(chart = %chart, error = %err, "aggregation failed, showing placeholder");
            Aggregation::Empty(format!("Error generating plot: {err}"))
        }
    }
}
