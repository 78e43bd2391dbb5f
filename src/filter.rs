// Filter engine: hotel-type and inclusive numeric-range predicates

use crate::booking::{Booking, HotelType};
use crate::dataset::Dataset;
use crate::error::AggregateError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Hotel selection. `All` applies no hotel predicate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum HotelFilter {
    #[default]
    All,
    Only(HotelType),
}

impl HotelFilter {
    /// Parse a UI selection. Empty input or "All" selects every hotel.
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "" | "All" => HotelFilter::All,
            other => HotelFilter::Only(HotelType::parse(other)),
        }
    }

    /// A row with no hotel only passes `All`.
    pub fn matches(&self, hotel: Option<&HotelType>) -> bool {
        match self {
            HotelFilter::All => true,
            HotelFilter::Only(wanted) => hotel == Some(wanted),
        }
    }
}

impl From<Option<&str>> for HotelFilter {
    fn from(value: Option<&str>) -> Self {
        value.map(HotelFilter::parse).unwrap_or_default()
    }
}

impl fmt::Display for HotelFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HotelFilter::All => f.write_str("All"),
            HotelFilter::Only(hotel) => write!(f, "{hotel}"),
        }
    }
}

/// Column a range predicate applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeColumn {
    LeadTime,
    TotalStay,
}

/// Closed interval `[low, high]`. A range with `low > high` matches nothing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub low: f64,
    pub high: f64,
}

impl ValueRange {
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.low <= value && value <= self.high
    }
}

impl fmt::Display for ValueRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.low, self.high)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeSpec {
    pub column: RangeColumn,
    pub range: ValueRange,
}

/// Per-request filter parameters. Predicates compose by logical AND.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterParams {
    pub hotel: HotelFilter,
    pub range: Option<RangeSpec>,
}

impl FilterParams {
    pub fn hotel(hotel: HotelFilter) -> Self {
        Self { hotel, range: None }
    }

    pub fn with_range(mut self, column: RangeColumn, range: ValueRange) -> Self {
        self.range = Some(RangeSpec { column, range });
        self
    }
}

/// Borrowed subset of the dataset. The source rows are never copied or mutated.
#[derive(Debug, Clone, Default)]
pub struct FilteredView<'a> {
    rows: Vec<&'a Booking>,
}

impl<'a> FilteredView<'a> {
    pub fn rows(&self) -> &[&'a Booking] {
        &self.rows
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Booking> + '_ {
        self.rows.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<'a> FromIterator<&'a Booking> for FilteredView<'a> {
    fn from_iter<I: IntoIterator<Item = &'a Booking>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

/// Apply the hotel and range predicates to the dataset.
///
/// Fails only when a range predicate has to read a malformed cell on a row
/// that passed the hotel predicate. Rows with an empty range cell are dropped.
pub fn apply<'a>(
    dataset: &'a Dataset,
    params: &FilterParams,
) -> Result<FilteredView<'a>, AggregateError> {
    let mut rows = Vec::new();
    for booking in dataset.bookings() {
        if !params.hotel.matches(booking.hotel()) {
            continue;
        }
        if let Some(spec) = &params.range {
            let value = match spec.column {
                RangeColumn::LeadTime => booking.lead_time()?,
                RangeColumn::TotalStay => booking.total_stay()?,
            };
            // An empty cell never falls inside a range
            match value {
                Some(v) if spec.range.contains(f64::from(v)) => {}
                _ => continue,
            }
        }
        rows.push(booking);
    }
    Ok(FilteredView { rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::{Cell, RawBooking};
    use crate::error::MalformedValue;
    use chrono::NaiveDate;

    fn dataset() -> Dataset {
        let day = NaiveDate::from_ymd_opt(2016, 5, 1).unwrap();
        vec![
            RawBooking::new(HotelType::Resort, day).lead_time(0).nights(1, 1),
            RawBooking::new(HotelType::City, day).lead_time(10).nights(0, 3),
            RawBooking::new(HotelType::City, day).lead_time(20).nights(2, 5),
            RawBooking::new(HotelType::Other("Hostel".into()), day).lead_time(10),
        ]
        .into_iter()
        .map(RawBooking::build)
        .collect()
    }

    #[test]
    fn test_all_keeps_every_row() {
        let data = dataset();
        let view = apply(&data, &FilterParams::default()).unwrap();
        assert_eq!(view.len(), 4);
    }

    #[test]
    fn test_hotel_partitions_are_disjoint() {
        let data = dataset();
        let resort = apply(&data, &FilterParams::hotel(HotelFilter::parse("Resort Hotel"))).unwrap();
        let city = apply(&data, &FilterParams::hotel(HotelFilter::parse("City Hotel"))).unwrap();
        assert_eq!(resort.len(), 1);
        assert_eq!(city.len(), 2);
        assert!(resort
            .iter()
            .all(|r| city.iter().all(|c| !std::ptr::eq(r, c))));
    }

    #[test]
    fn test_range_is_inclusive_on_both_ends() {
        let data = dataset();
        let params = FilterParams::default()
            .with_range(RangeColumn::LeadTime, ValueRange::new(10.0, 20.0));
        let view = apply(&data, &params).unwrap();
        let leads: Vec<u32> = view.iter().filter_map(|b| b.lead_time().unwrap()).collect();
        assert_eq!(leads, vec![10, 20, 10]);
    }

    #[test]
    fn test_filters_compose_with_and() {
        let data = dataset();
        let params = FilterParams::hotel(HotelFilter::Only(HotelType::City))
            .with_range(RangeColumn::TotalStay, ValueRange::new(0.0, 3.0));
        let view = apply(&data, &params).unwrap();
        assert_eq!(view.len(), 1);
        assert_eq!(view.rows()[0].total_stay().unwrap(), Some(3));
    }

    #[test]
    fn test_inverted_range_matches_nothing() {
        let data = dataset();
        let params = FilterParams::default()
            .with_range(RangeColumn::LeadTime, ValueRange::new(20.0, 10.0));
        assert!(apply(&data, &params).unwrap().is_empty());
    }

    #[test]
    fn test_range_over_malformed_cell_fails() {
        let day = NaiveDate::from_ymd_opt(2016, 5, 1).unwrap();
        let mut raw = RawBooking::new(HotelType::City, day);
        raw.lead_time = Cell::Malformed(MalformedValue {
            column: "lead_time",
            raw: "soon".into(),
            line: 3,
        });
        let data = Dataset::from_bookings(vec![raw.build()]);

        let params = FilterParams::default()
            .with_range(RangeColumn::LeadTime, ValueRange::new(0.0, 10.0));
        assert!(apply(&data, &params).is_err());

        // Excluded by the hotel predicate first, so the bad cell is never read.
        let params = FilterParams::hotel(HotelFilter::Only(HotelType::Resort))
            .with_range(RangeColumn::LeadTime, ValueRange::new(0.0, 10.0));
        assert!(apply(&data, &params).unwrap().is_empty());
    }

    #[test]
    fn test_missing_cells_fall_outside_filters() {
        let day = NaiveDate::from_ymd_opt(2016, 5, 1).unwrap();
        let mut no_lead = RawBooking::new(HotelType::City, day).lead_time(5);
        no_lead.lead_time = Cell::Missing;
        let mut no_hotel = RawBooking::new(HotelType::City, day).lead_time(5);
        no_hotel.hotel = None;
        let data: Dataset = vec![no_lead, no_hotel].into_iter().map(RawBooking::build).collect();

        let ranged = FilterParams::default()
            .with_range(RangeColumn::LeadTime, ValueRange::new(0.0, 10.0));
        let view = apply(&data, &ranged).unwrap();
        assert_eq!(view.len(), 1);
        assert_eq!(view.rows()[0].hotel(), None);

        assert_eq!(apply(&data, &FilterParams::default()).unwrap().len(), 2);
        let city = FilterParams::hotel(HotelFilter::Only(HotelType::City));
        assert_eq!(apply(&data, &city).unwrap().len(), 1);
    }

    #[test]
    fn test_parse_hotel_filter() {
        assert_eq!(HotelFilter::parse("All"), HotelFilter::All);
        assert_eq!(HotelFilter::from(None), HotelFilter::All);
        assert_eq!(
            HotelFilter::from(Some("Resort Hotel")),
            HotelFilter::Only(HotelType::Resort)
        );
        assert_eq!(HotelFilter::Only(HotelType::City).to_string(), "City Hotel");
    }
}
