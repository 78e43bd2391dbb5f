// Chart encoder: aggregated tables + fixed metadata -> ChartDescription

use crate::aggregate::{
    AggregatedTable, Aggregation, CancelRateByMonth, CancellationPoint, HeatmapCell, HistogramBin,
    LeadTimeBox, SegmentRevenue, SegmentShare, StayByMonth, StayRatePoint,
};
use crate::booking::{CITY_HOTEL, RESORT_HOTEL};
use crate::calendar::month_name;
use crate::chart::{
    Axis, BarMode, ChartBody, ChartData, ChartDescription, ChartId, ColorMapping, Encoding, Layer,
    Mark, Orientation, Table, Tabular,
};
use crate::placeholder::{chart_styling, empty_placeholder};

pub const RESORT_COLOR: &str = "#1E90FF";
pub const CITY_COLOR: &str = "#FF4500";

/// Qualitative palette for market segments (ColorBrewer Set2).
pub const SEGMENT_PALETTE: [&str; 8] = [
    "#66C2A5", "#FC8D62", "#8DA0CB", "#E78AC3", "#A6D854", "#FFD92F", "#E5C494", "#B3B3B3",
];

pub const HEATMAP_SCALE: &str = "Blues";
pub const HISTOGRAM_OPACITY: f64 = 0.7;
pub const HISTOGRAM_BAR_GAP: f64 = 0.2;

const HOTEL_LEGEND: &str = "Hotel Type";
const SEGMENT_LEGEND: &str = "Market Segment";

/// Presentation constants of one chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartMeta {
    pub title: &'static str,
    pub x_title: &'static str,
    pub y_title: &'static str,
    pub legend_title: Option<&'static str>,
}

pub fn metadata(chart: ChartId) -> ChartMeta {
    let (title, x_title, y_title, legend_title) = match chart {
        ChartId::LeadTimeDistribution => (
            "Distribution of Booking Lead Time by Hotel Type",
            "Lead Time (Days)",
            "Number of Bookings",
            Some(HOTEL_LEGEND),
        ),
        ChartId::StayDurationPatterns => (
            "Average Stay Duration by Month and Hotel Type",
            "Month",
            "Average Stay Length (Nights)",
            Some(HOTEL_LEGEND),
        ),
        ChartId::BookingPatternsMarketSegment => (
            "Proportion of Bookings by Market Segment and Hotel Type",
            "Proportion of Bookings",
            "Hotel Type",
            Some(SEGMENT_LEGEND),
        ),
        ChartId::AdrVsStayLength => (
            "ADR vs. Stay Length: Revenue Impact by Hotel Type",
            "Total Stay (Nights)",
            "Average Daily Rate ($)",
            Some(HOTEL_LEGEND),
        ),
        ChartId::CancellationsByLeadTime => (
            "Lead Time Distribution by Cancellation Status and Hotel Type",
            "Cancellation Status",
            "Lead Time (Days)",
            Some(HOTEL_LEGEND),
        ),
        ChartId::CancellationTrendsByMonth => (
            "Cancellation Rate by Month and Hotel Type",
            "Month",
            "Cancellation Rate",
            Some(HOTEL_LEGEND),
        ),
        ChartId::BookingTrendsHeatmap => (
            "Booking Trends by Month and Year",
            "Month",
            "Year",
            Some("Number of Bookings"),
        ),
        ChartId::RevenueByMarketSegment => (
            "Revenue Contribution by Market Segment Over Time",
            "Year-Month",
            "Revenue ($)",
            Some(SEGMENT_LEGEND),
        ),
    };
    ChartMeta {
        title,
        x_title,
        y_title,
        legend_title,
    }
}

/// Fixed hotel color. Hotels outside the two known ones borrow from the
/// segment palette by position.
pub fn hotel_color(hotel: &str, fallback_idx: usize) -> &'static str {
    match hotel {
        RESORT_HOTEL => RESORT_COLOR,
        CITY_HOTEL => CITY_COLOR,
        _ => SEGMENT_PALETTE[fallback_idx % SEGMENT_PALETTE.len()],
    }
}

fn hotel_mapping(table: &Table) -> ColorMapping {
    let mut others = 0;
    let entries = table
        .distinct_labels("hotel")
        .into_iter()
        .map(|hotel| {
            let color = hotel_color(&hotel, others);
            if color != RESORT_COLOR && color != CITY_COLOR {
                others += 1;
            }
            (hotel, color.to_string())
        })
        .collect();
    ColorMapping::Categorical {
        field: "hotel".to_string(),
        entries,
    }
}

/// Palette colors in first-appearance order of `market_segment`, cycling.
fn segment_mapping(table: &Table) -> ColorMapping {
    let entries = table
        .distinct_labels("market_segment")
        .into_iter()
        .zip(SEGMENT_PALETTE.iter().cycle())
        .map(|(segment, color)| (segment, color.to_string()))
        .collect();
    ColorMapping::Categorical {
        field: "market_segment".to_string(),
        entries,
    }
}

fn bind(x: &str, y: &str, color: &str) -> Encoding {
    Encoding {
        x: Some(x.to_string()),
        y: Some(y.to_string()),
        color: Some(color.to_string()),
        ..Encoding::default()
    }
}

/// Encode an aggregation outcome. Empty outcomes become the shared
/// placeholder; populated ones take their chart id from the table.
pub fn encode(chart: ChartId, aggregation: Aggregation<AggregatedTable>) -> ChartDescription {
    match aggregation {
        Aggregation::Empty(message) => empty_placeholder(chart, message),
        Aggregation::Data(table) => {
            let chart = table.chart();
            ChartDescription {
                chart,
                body: ChartBody::Data(encode_table(metadata(chart), table)),
                style: chart_styling(),
            }
        }
    }
}

fn encode_table(meta: ChartMeta, table: AggregatedTable) -> ChartData {
    let (layers, x_axis, y_axis, color) = match table {
        AggregatedTable::LeadTime(dist) => {
            let bins = HistogramBin::to_table(&dist.bins);
            let boxes = LeadTimeBox::to_table(&dist.boxes);
            let color = hotel_mapping(&bins);
            let histogram = Layer {
                mark: Mark::Histogram {
                    opacity: HISTOGRAM_OPACITY,
                    bar_gap: HISTOGRAM_BAR_GAP,
                },
                encoding: Encoding {
                    hover: vec!["bin_end".to_string()],
                    ..bind("bin_start", "count", "hotel")
                },
                table: bins,
            };
            // Marginal strip above the histogram, one box per hotel.
            let marginal = Layer {
                mark: Mark::Box {
                    orientation: Orientation::Horizontal,
                },
                encoding: bind("median", "hotel", "hotel"),
                table: boxes,
            };
            (
                vec![histogram, marginal],
                Axis::continuous(meta.x_title),
                Axis::continuous(meta.y_title),
                color,
            )
        }
        AggregatedTable::StayDuration(rows) => {
            let table = StayByMonth::to_table(&rows);
            monthly_layer(
                meta,
                table,
                Mark::Bar {
                    orientation: Orientation::Vertical,
                    mode: BarMode::Group,
                },
                "total_stay",
            )
        }
        AggregatedTable::CancellationTrend(rows) => {
            let table = CancelRateByMonth::to_table(&rows);
            monthly_layer(meta, table, Mark::Line, "cancellation_rate")
        }
        AggregatedTable::MarketSegment(rows) => {
            let table = SegmentShare::to_table(&rows);
            let hotels = table.distinct_labels("hotel");
            let color = segment_mapping(&table);
            let layer = Layer {
                mark: Mark::Bar {
                    orientation: Orientation::Horizontal,
                    mode: BarMode::Stack,
                },
                encoding: bind("proportion", "hotel", "market_segment"),
                table,
            };
            (
                vec![layer],
                Axis::continuous(meta.x_title),
                Axis::discrete(meta.y_title, hotels),
                color,
            )
        }
        AggregatedTable::AdrVsStay(rows) => {
            let table = StayRatePoint::to_table(&rows);
            let color = hotel_mapping(&table);
            let layer = Layer {
                mark: Mark::Scatter,
                encoding: Encoding {
                    size: Some("revenue".to_string()),
                    hover: vec!["arrival_date".to_string(), "is_canceled".to_string()],
                    ..bind("total_stay", "adr", "hotel")
                },
                table,
            };
            (
                vec![layer],
                Axis::continuous(meta.x_title),
                Axis::continuous(meta.y_title),
                color,
            )
        }
        AggregatedTable::CancellationLeadTime(rows) => {
            let table = CancellationPoint::to_table(&rows);
            let color = hotel_mapping(&table);
            let layer = Layer {
                mark: Mark::Box {
                    orientation: Orientation::Vertical,
                },
                encoding: bind("is_canceled", "lead_time", "hotel"),
                table,
            };
            (
                vec![layer],
                Axis::discrete(meta.x_title, vec!["0".to_string(), "1".to_string()]),
                Axis::continuous(meta.y_title),
                color,
            )
        }
        AggregatedTable::Heatmap(heatmap) => {
            let months = heatmap
                .months()
                .into_iter()
                .map(|m| month_name(m).to_string())
                .collect();
            let years = heatmap.years().iter().map(i32::to_string).collect();
            let layer = Layer {
                mark: Mark::Heatmap {
                    color_scale: HEATMAP_SCALE.to_string(),
                    text_auto: true,
                },
                encoding: Encoding {
                    x: Some("month".to_string()),
                    y: Some("year".to_string()),
                    z: Some("booking_count".to_string()),
                    ..Encoding::default()
                },
                table: HeatmapCell::to_table(&heatmap.cells),
            };
            (
                vec![layer],
                Axis::discrete(meta.x_title, months),
                Axis::discrete(meta.y_title, years),
                ColorMapping::Continuous {
                    field: "booking_count".to_string(),
                    scale: HEATMAP_SCALE.to_string(),
                },
            )
        }
        AggregatedTable::Revenue(rows) => {
            let table = SegmentRevenue::to_table(&rows);
            let periods = table.distinct_labels("year_month");
            let color = segment_mapping(&table);
            let layer = Layer {
                mark: Mark::Area,
                encoding: bind("year_month", "revenue", "market_segment"),
                table,
            };
            (
                vec![layer],
                Axis::discrete(meta.x_title, periods),
                Axis::continuous(meta.y_title),
                color,
            )
        }
    };

    ChartData {
        title: meta.title.to_string(),
        layers,
        x_axis,
        y_axis,
        legend_title: meta.legend_title.map(str::to_string),
        color,
    }
}

/// Month on x, hotel as series. Rows already arrive in calendar order, so
/// first-appearance order of the month labels is the axis order.
fn monthly_layer(
    meta: ChartMeta,
    table: Table,
    mark: Mark,
    y_field: &str,
) -> (Vec<Layer>, Axis, Axis, ColorMapping) {
    let months = table.distinct_labels("month");
    let color = hotel_mapping(&table);
    let layer = Layer {
        mark,
        encoding: bind("month", y_field, "hotel"),
        table,
    };
    (
        vec![layer],
        Axis::discrete(meta.x_title, months),
        Axis::continuous(meta.y_title),
        color,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::fixtures::*;
    use crate::aggregate::{self, NO_DATA_MESSAGE};
    use crate::filter::FilterParams;

    fn describe(chart: ChartId, data: &crate::dataset::Dataset) -> ChartDescription {
        encode(chart, aggregate::run(chart, data, &FilterParams::default()))
    }

    #[test]
    fn test_hotel_colors_are_fixed() {
        let data = dataset(vec![resort(2016, 5).nights(1, 1), city(2016, 5).nights(0, 2)]);
        let desc = describe(ChartId::StayDurationPatterns, &data);
        let chart = desc.data().unwrap();

        assert_eq!(chart.color.color_of("Resort Hotel"), Some(RESORT_COLOR));
        assert_eq!(chart.color.color_of("City Hotel"), Some(CITY_COLOR));
        assert_eq!(chart.legend_title.as_deref(), Some("Hotel Type"));
        assert_eq!(chart.x_axis.title, "Month");
        assert_eq!(chart.y_axis.title, "Average Stay Length (Nights)");
        assert!(desc.style.show_legend);
    }

    #[test]
    fn test_segment_palette_cycles_in_table_order() {
        let segments = [
            "Aviation",
            "Complementary",
            "Corporate",
            "Direct",
            "Groups",
            "Offline TA/TO",
            "Online TA",
            "Undefined",
            "Zeta",
        ];
        let data = dataset(segments.iter().map(|s| city(2016, 1).segment(*s)).collect());
        let desc = describe(ChartId::BookingPatternsMarketSegment, &data);
        let chart = desc.data().unwrap();

        assert_eq!(chart.color.color_of("Aviation"), Some(SEGMENT_PALETTE[0]));
        assert_eq!(chart.color.color_of("Undefined"), Some(SEGMENT_PALETTE[7]));
        assert_eq!(chart.color.color_of("Zeta"), Some(SEGMENT_PALETTE[0]));
        assert_eq!(chart.legend_title.as_deref(), Some("Market Segment"));
        assert!(matches!(
            chart.layers[0].mark,
            Mark::Bar {
                orientation: Orientation::Horizontal,
                mode: BarMode::Stack
            }
        ));
    }

    #[test]
    fn test_heatmap_axes_use_calendar_and_numeric_order() {
        let data = dataset(vec![city(2018, 3), city(2017, 11), city(2017, 3), city(2017, 3)]);
        let desc = describe(ChartId::BookingTrendsHeatmap, &data);
        let chart = desc.data().unwrap();

        assert_eq!(
            chart.x_axis.categories,
            Some(vec!["March".to_string(), "November".to_string()])
        );
        assert_eq!(
            chart.y_axis.categories,
            Some(vec!["2017".to_string(), "2018".to_string()])
        );
        assert_eq!(
            chart.color,
            ColorMapping::Continuous {
                field: "booking_count".into(),
                scale: "Blues".into()
            }
        );
        assert_eq!(chart.layers[0].table.len(), 3);
    }

    #[test]
    fn test_lead_time_has_histogram_and_marginal_box() {
        let data = dataset(vec![resort(2016, 1).lead_time(3), city(2016, 1).lead_time(90)]);
        let desc = describe(ChartId::LeadTimeDistribution, &data);
        let chart = desc.data().unwrap();

        assert_eq!(chart.title, "Distribution of Booking Lead Time by Hotel Type");
        assert_eq!(chart.layers.len(), 2);
        assert!(matches!(chart.layers[0].mark, Mark::Histogram { .. }));
        assert!(matches!(chart.layers[1].mark, Mark::Box { .. }));
        assert_eq!(chart.layers[1].table.len(), 2);
    }

    #[test]
    fn test_scatter_sizes_by_revenue() {
        let data = dataset(vec![city(2016, 1).nights(1, 1).adr(10.0)]);
        let desc = describe(ChartId::AdrVsStayLength, &data);
        let encoding = &desc.data().unwrap().layers[0].encoding;
        assert_eq!(encoding.size.as_deref(), Some("revenue"));
        assert_eq!(encoding.hover, vec!["arrival_date", "is_canceled"]);
    }

    #[test]
    fn test_cancellation_categories_are_fixed() {
        let data = dataset(vec![city(2016, 1).canceled(true)]);
        let desc = describe(ChartId::CancellationsByLeadTime, &data);
        assert_eq!(
            desc.data().unwrap().x_axis.categories,
            Some(vec!["0".to_string(), "1".to_string()])
        );
    }

    #[test]
    fn test_empty_aggregation_becomes_placeholder() {
        let desc = encode(
            ChartId::RevenueByMarketSegment,
            Aggregation::Empty(NO_DATA_MESSAGE.to_string()),
        );
        assert_eq!(desc.chart, ChartId::RevenueByMarketSegment);
        assert_eq!(desc.message(), Some(NO_DATA_MESSAGE));
    }
}
