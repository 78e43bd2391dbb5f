use hotelviz::aggregate::{self, AggregatedTable, Aggregation};
use hotelviz::filter::{FilterParams, RangeColumn};
use hotelviz::{
    ChartId, Dashboard, Dataset, DatasetError, HotelFilter, HotelType,
    ValueRange, NO_DATA_MESSAGE,
};
use std::process::Command;

const BOOKINGS: &str = "test/bookings.csv";
const MALFORMED: &str = "test/malformed.csv";
const MISSING_COLUMN: &str = "test/missing_column.csv";
const BLANK_CELLS: &str = "test/blank_cells.csv";

fn load(path: &str) -> Dataset {
    Dataset::load(path).expect("Failed to load test CSV")
}

fn dashboard() -> Dashboard {
    Dashboard::new(load(BOOKINGS))
}

fn resort() -> HotelFilter {
    HotelFilter::Only(HotelType::Resort)
}

fn city() -> HotelFilter {
    HotelFilter::Only(HotelType::City)
}

/// Run one aggregator directly and unwrap the populated table
fn table(dataset: &Dataset, chart: ChartId, params: FilterParams) -> AggregatedTable {
    match aggregate::run(chart, dataset, &params) {
        Aggregation::Data(table) => table,
        Aggregation::Empty(msg) => panic!("{chart} unexpectedly empty: {msg}"),
    }
}

/// Helper function to run hotelviz against a dataset and return stdout
fn run_hotelviz(request: &str, data: &str) -> Result<Vec<u8>, String> {
    let output = Command::new(env!("CARGO_BIN_EXE_hotelviz"))
        .args([request, "--data", data, "--format", "json"])
        .env("RUST_LOG", "warn")
        .output()
        .map_err(|e| format!("Failed to spawn process: {}", e))?;

    if output.status.success() {
        Ok(output.stdout)
    } else {
        Err(String::from_utf8_lossy(&output.stderr).to_string())
    }
}

// ---------------------------------------------------------------------------
// Dataset loading
// ---------------------------------------------------------------------------

#[test]
fn test_load_fixture() {
    let data = load(BOOKINGS);
    assert_eq!(data.len(), 12);
    let resorts = data
        .bookings()
        .iter()
        .filter(|b| b.hotel() == Some(&HotelType::Resort))
        .count();
    assert_eq!(resorts, 6);
}

#[test]
fn test_missing_file_is_fatal() {
    let err = Dataset::load("test/no_such_file.csv").unwrap_err();
    assert!(matches!(err, DatasetError::Load { .. }));
}

#[test]
fn test_missing_columns_are_fatal() {
    let err = Dataset::load(MISSING_COLUMN).unwrap_err();
    match err {
        DatasetError::Schema { missing } => {
            assert_eq!(missing, vec!["adr".to_string(), "market_segment".to_string()])
        }
        other => panic!("expected schema error, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Compute
// ---------------------------------------------------------------------------

#[test]
fn test_every_chart_for_every_hotel_selection() {
    let dash = dashboard();
    for hotel in [HotelFilter::All, resort(), city()] {
        for chart in ChartId::ALL {
            let desc = dash.compute(chart, &hotel, None);
            assert_eq!(desc.chart, chart);
            assert!(!desc.is_empty(), "{chart} for {hotel} was a placeholder");
        }
    }
}

#[test]
fn test_compute_all_keeps_chart_order() {
    let descs = dashboard().compute_all(&HotelFilter::All, None);
    let ids: Vec<ChartId> = descs.iter().map(|d| d.chart).collect();
    assert_eq!(ids, ChartId::ALL.to_vec());
}

#[test]
fn test_compute_is_idempotent() {
    let dash = dashboard();
    let range = Some(ValueRange::new(0.0, 100.0));
    for chart in ChartId::ALL {
        assert_eq!(
            dash.compute(chart, &city(), range),
            dash.compute(chart, &city(), range)
        );
    }
}

#[test]
fn test_hotel_selections_partition_rows() {
    let data = load(BOOKINGS);
    let points = |hotel: HotelFilter| match table(
        &data,
        ChartId::AdrVsStayLength,
        FilterParams::hotel(hotel),
    ) {
        AggregatedTable::AdrVsStay(points) => points,
        other => panic!("unexpected table {other:?}"),
    };

    let all = points(HotelFilter::All);
    let resort_points = points(resort());
    let city_points = points(city());
    assert!(resort_points.iter().all(|p| p.hotel == HotelType::Resort));
    assert!(city_points.iter().all(|p| p.hotel == HotelType::City));
    assert_eq!(all.len(), resort_points.len() + city_points.len());
}

#[test]
fn test_stay_range_and_derived_revenue() {
    let data = load(BOOKINGS);
    let params = FilterParams::hotel(resort()).with_range(RangeColumn::TotalStay, ValueRange::new(5.0, 5.0));
    let AggregatedTable::AdrVsStay(points) = table(&data, ChartId::AdrVsStayLength, params) else {
        panic!("unexpected table");
    };
    assert_eq!(points.len(), 1);
    assert_eq!(points[0].total_stay, 5);
    assert_eq!(points[0].adr, 100.0);
    assert_eq!(points[0].revenue, 500.0);
}

#[test]
fn test_out_of_domain_range_yields_placeholder() {
    let desc = dashboard().compute(
        ChartId::AdrVsStayLength,
        &HotelFilter::All,
        Some(ValueRange::new(1000.0, 2000.0)),
    );
    assert!(desc.is_empty());
    assert_eq!(desc.message(), Some(NO_DATA_MESSAGE));
}

#[test]
fn test_lead_time_range_bounds_histogram() {
    let data = load(BOOKINGS);
    let params = FilterParams::hotel(HotelFilter::All)
        .with_range(RangeColumn::LeadTime, ValueRange::new(0.0, 50.0));
    let AggregatedTable::LeadTime(dist) = table(&data, ChartId::LeadTimeDistribution, params) else {
        panic!("unexpected table");
    };
    let counted: usize = dist.bins.iter().map(|b| b.count).sum();
    assert_eq!(counted, 5);
    assert!(dist.bins.iter().all(|b| b.bin_start >= 0.0));
}

#[test]
fn test_range_ignored_for_monthly_charts() {
    let dash = dashboard();
    let range = Some(ValueRange::new(1000.0, 2000.0));
    assert_eq!(
        dash.compute(ChartId::BookingTrendsHeatmap, &HotelFilter::All, range),
        dash.compute(ChartId::BookingTrendsHeatmap, &HotelFilter::All, None)
    );
}

#[test]
fn test_segment_proportions_sum_to_one() {
    let data = load(BOOKINGS);
    let AggregatedTable::MarketSegment(shares) = table(
        &data,
        ChartId::BookingPatternsMarketSegment,
        FilterParams::default(),
    ) else {
        panic!("unexpected table");
    };
    for hotel in [HotelType::Resort, HotelType::City] {
        let total: f64 = shares
            .iter()
            .filter(|s| s.hotel == hotel)
            .map(|s| s.proportion)
            .sum();
        assert!((total - 1.0).abs() < 1e-9, "{hotel} proportions sum to {total}");
    }
}

#[test]
fn test_cancellation_trend_in_calendar_order() {
    let data = load(BOOKINGS);
    let AggregatedTable::CancellationTrend(rates) = table(
        &data,
        ChartId::CancellationTrendsByMonth,
        FilterParams::hotel(city()),
    ) else {
        panic!("unexpected table");
    };
    let months: Vec<u32> = rates.iter().map(|r| r.month).collect();
    assert_eq!(months, vec![1, 3, 7, 8]);
    let rates: Vec<f64> = rates.iter().map(|r| r.cancellation_rate).collect();
    assert_eq!(rates, vec![1.0, 0.0, 0.5, 1.0]);
}

#[test]
fn test_heatmap_counts() {
    let data = load(BOOKINGS);
    let AggregatedTable::Heatmap(heatmap) =
        table(&data, ChartId::BookingTrendsHeatmap, FilterParams::default())
    else {
        panic!("unexpected table");
    };
    assert_eq!(heatmap.years(), vec![2015, 2016, 2017]);
    assert_eq!(heatmap.count(2015, 7), Some(5));
    assert_eq!(heatmap.count(2017, 3), Some(2));
    assert_eq!(heatmap.count(2017, 8), Some(1));
    assert_eq!(heatmap.count(2015, 1), None);
}

#[test]
fn test_malformed_value_only_breaks_charts_that_read_it() {
    let dash = Dashboard::new(load(MALFORMED));

    let broken = dash.compute(ChartId::CancellationsByLeadTime, &city(), None);
    let msg = broken.message().expect("expected a placeholder");
    assert!(msg.starts_with("Error generating plot:"), "{msg}");
    assert!(msg.contains("is_canceled"), "{msg}");

    assert!(!dash.compute(ChartId::CancellationsByLeadTime, &resort(), None).is_empty());
    assert!(!dash.compute(ChartId::BookingPatternsMarketSegment, &city(), None).is_empty());
}

#[test]
fn test_blank_cells_leave_rows_out_of_groups() {
    let data = load(BLANK_CELLS);
    let dash = Dashboard::new(data.clone());
    for chart in ChartId::ALL {
        let desc = dash.compute(chart, &HotelFilter::All, None);
        assert!(!desc.is_empty(), "{chart}: {:?}", desc.message());
    }

    let AggregatedTable::MarketSegment(shares) = table(
        &data,
        ChartId::BookingPatternsMarketSegment,
        FilterParams::hotel(resort()),
    ) else {
        panic!("unexpected table");
    };
    assert_eq!(shares.len(), 1);
    assert_eq!(shares[0].market_segment, "Direct");
    assert_eq!(shares[0].proportion, 1.0);

    let AggregatedTable::Heatmap(heatmap) =
        table(&data, ChartId::BookingTrendsHeatmap, FilterParams::default())
    else {
        panic!("unexpected table");
    };
    assert_eq!(heatmap.count(2016, 5), Some(1));
    assert_eq!(heatmap.count(2016, 6), Some(2));
    assert_eq!(heatmap.cells.len(), 2);

    let AggregatedTable::Revenue(revenue) =
        table(&data, ChartId::RevenueByMarketSegment, FilterParams::default())
    else {
        panic!("unexpected table");
    };
    assert_eq!(revenue.len(), 1);
    assert_eq!(revenue[0].revenue, 270.0);

    // A blank lead time never falls inside a range
    let params = FilterParams::hotel(city())
        .with_range(RangeColumn::LeadTime, ValueRange::new(0.0, 1000.0));
    let AggregatedTable::LeadTime(dist) = table(&data, ChartId::LeadTimeDistribution, params) else {
        panic!("unexpected table");
    };
    assert_eq!(dist.bins.iter().map(|b| b.count).sum::<usize>(), 1);
}

#[test]
fn test_description_serializes() {
    let desc = dashboard().compute(ChartId::RevenueByMarketSegment, &HotelFilter::All, None);
    let json = serde_json::to_value(&desc).unwrap();
    assert_eq!(json["chart"], "revenue_by_market_segment");
    assert_eq!(json["body"]["kind"], "data");
    assert_eq!(json["body"]["title"], "Revenue Contribution by Market Segment Over Time");
}

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

#[test]
fn test_cli_single_chart() {
    let out = run_hotelviz(r#"lead_time_distribution(hotel: "City Hotel", range: 0..100)"#, BOOKINGS);
    assert!(out.is_ok(), "Failed: {:?}", out.err());
    let json: serde_json::Value = serde_json::from_slice(&out.unwrap()).unwrap();
    assert_eq!(json["chart"], "lead_time_distribution");
    assert_eq!(json["body"]["kind"], "data");
}

#[test]
fn test_cli_all_charts() {
    let out = run_hotelviz("all()", BOOKINGS);
    assert!(out.is_ok(), "Failed: {:?}", out.err());
    let json: serde_json::Value = serde_json::from_slice(&out.unwrap()).unwrap();
    let charts = json.as_array().expect("expected an array");
    assert_eq!(charts.len(), 8);
    for (chart, id) in charts.iter().zip(ChartId::ALL) {
        assert_eq!(chart["chart"], id.as_str());
    }
}

#[test]
fn test_cli_placeholder_is_not_an_error() {
    let out = run_hotelviz("adr_vs_stay_length(range: 1000..2000)", BOOKINGS);
    assert!(out.is_ok(), "Failed: {:?}", out.err());
    let desc: serde_json::Value = serde_json::from_slice(&out.unwrap()).unwrap();
    assert_eq!(desc["body"]["kind"], "empty");
    assert_eq!(desc["body"]["annotation"]["text"], NO_DATA_MESSAGE);
}

#[test]
fn test_cli_writes_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("heatmap.json");
    let status = Command::new(env!("CARGO_BIN_EXE_hotelviz"))
        .arg("booking_trends_heatmap()")
        .args(["--data", BOOKINGS, "--output"])
        .arg(&path)
        .status()
        .unwrap();
    assert!(status.success());
    let json: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    assert_eq!(json["chart"], "booking_trends_heatmap");
}

#[test]
fn test_cli_unknown_chart_fails() {
    let err = run_hotelviz("pie_chart()", BOOKINGS).unwrap_err();
    assert!(err.contains("unknown chart id 'pie_chart'"), "{err}");
}

#[test]
fn test_cli_missing_dataset_fails() {
    let err = run_hotelviz("all()", "test/no_such_file.csv").unwrap_err();
    assert!(err.contains("Failed to load dataset"), "{err}");
}

#[test]
fn test_cli_missing_columns_fails() {
    let err = run_hotelviz("all()", MISSING_COLUMN).unwrap_err();
    assert!(err.contains("missing required columns"), "{err}");
}
