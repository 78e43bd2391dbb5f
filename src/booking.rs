// Typed booking records with derived total_stay and revenue

use crate::error::{AggregateError, MalformedValue};
use chrono::NaiveDate;
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

pub const RESORT_HOTEL: &str = "Resort Hotel";
pub const CITY_HOTEL: &str = "City Hotel";

/// Hotel type of a booking. Values outside the two known hotels are kept
/// verbatim so they still count towards the unfiltered view.
///
/// Equality, hashing and ordering all go through the hotel name, so
/// `Other("City Hotel")` and `City` are the same key.
#[derive(Debug, Clone)]
pub enum HotelType {
    Resort,
    City,
    Other(String),
}

impl HotelType {
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            RESORT_HOTEL => HotelType::Resort,
            CITY_HOTEL => HotelType::City,
            other => HotelType::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            HotelType::Resort => RESORT_HOTEL,
            HotelType::City => CITY_HOTEL,
            HotelType::Other(name) => name,
        }
    }
}

impl PartialEq for HotelType {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for HotelType {}

impl Hash for HotelType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

// Groups keyed by hotel come out in name order, the same order a
// group-by over the raw strings produces.
impl Ord for HotelType {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl PartialOrd for HotelType {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for HotelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for HotelType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A parsed cell: a typed value, an empty/NA cell, or the raw text that
/// failed to parse.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell<T> {
    Value(T),
    Missing,
    Malformed(MalformedValue),
}

impl<T: Copy> Cell<T> {
    /// `Ok(None)` for a missing cell; only unparseable text is an error.
    pub fn get(&self) -> Result<Option<T>, AggregateError> {
        match self {
            Cell::Value(v) => Ok(Some(*v)),
            Cell::Missing => Ok(None),
            Cell::Malformed(m) => Err(AggregateError::Malformed(m.clone())),
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, Cell::Malformed(_))
    }
}

impl<T> From<T> for Cell<T> {
    fn from(value: T) -> Self {
        Cell::Value(value)
    }
}

/// Raw column values for one row, before derived columns are computed.
#[derive(Debug, Clone, PartialEq)]
pub struct RawBooking {
    pub line: usize,
    pub hotel: Option<HotelType>,
    pub lead_time: Cell<u32>,
    pub arrival_date: Cell<NaiveDate>,
    pub stays_in_weekend_nights: Cell<u32>,
    pub stays_in_week_nights: Cell<u32>,
    pub adr: Cell<f64>,
    pub market_segment: Option<String>,
    pub is_canceled: Cell<bool>,
}

impl RawBooking {
    /// A well-formed row with zero lead time, zero nights, zero rate and
    /// no market segment.
    pub fn new(hotel: HotelType, arrival_date: NaiveDate) -> Self {
        Self {
            line: 0,
            hotel: Some(hotel),
            lead_time: Cell::Value(0),
            arrival_date: Cell::Value(arrival_date),
            stays_in_weekend_nights: Cell::Value(0),
            stays_in_week_nights: Cell::Value(0),
            adr: Cell::Value(0.0),
            market_segment: None,
            is_canceled: Cell::Value(false),
        }
    }

    pub fn lead_time(mut self, days: u32) -> Self {
        self.lead_time = Cell::Value(days);
        self
    }

    pub fn nights(mut self, weekend: u32, week: u32) -> Self {
        self.stays_in_weekend_nights = Cell::Value(weekend);
        self.stays_in_week_nights = Cell::Value(week);
        self
    }

    pub fn adr(mut self, adr: f64) -> Self {
        self.adr = Cell::Value(adr);
        self
    }

    pub fn segment(mut self, segment: impl Into<String>) -> Self {
        self.market_segment = Some(segment.into());
        self
    }

    pub fn canceled(mut self, canceled: bool) -> Self {
        self.is_canceled = Cell::Value(canceled);
        self
    }

    pub fn build(self) -> Booking {
        Booking::from_raw(self)
    }
}

/// One booking with its derived columns. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Booking {
    line: usize,
    hotel: Option<HotelType>,
    lead_time: Cell<u32>,
    arrival_date: Cell<NaiveDate>,
    stays_in_weekend_nights: Cell<u32>,
    stays_in_week_nights: Cell<u32>,
    adr: Cell<f64>,
    market_segment: Option<String>,
    is_canceled: Cell<bool>,
    total_stay: Cell<u32>,
    revenue: Cell<f64>,
}

impl Booking {
    pub fn from_raw(raw: RawBooking) -> Self {
        let total_stay = derive_total_stay(
            &raw.stays_in_weekend_nights,
            &raw.stays_in_week_nights,
            raw.line,
        );
        let revenue = match (&raw.adr, &total_stay) {
            (Cell::Malformed(m), _) | (_, Cell::Malformed(m)) => Cell::Malformed(MalformedValue {
                column: "revenue",
                raw: m.raw.clone(),
                line: m.line,
            }),
            (Cell::Value(adr), Cell::Value(nights)) => Cell::Value(adr * f64::from(*nights)),
            _ => Cell::Missing,
        };

        Self {
            line: raw.line,
            hotel: raw.hotel,
            lead_time: raw.lead_time,
            arrival_date: raw.arrival_date,
            stays_in_weekend_nights: raw.stays_in_weekend_nights,
            stays_in_week_nights: raw.stays_in_week_nights,
            adr: raw.adr,
            market_segment: raw.market_segment,
            is_canceled: raw.is_canceled,
            total_stay,
            revenue,
        }
    }

    /// 1-based CSV line the row came from (0 for rows built in memory).
    pub fn line(&self) -> usize {
        self.line
    }

    /// `None` when the hotel cell was empty.
    pub fn hotel(&self) -> Option<&HotelType> {
        self.hotel.as_ref()
    }

    pub fn market_segment(&self) -> Option<&str> {
        self.market_segment.as_deref()
    }

    pub fn lead_time(&self) -> Result<Option<u32>, AggregateError> {
        self.lead_time.get()
    }

    pub fn arrival_date(&self) -> Result<Option<NaiveDate>, AggregateError> {
        self.arrival_date.get()
    }

    pub fn stays_in_weekend_nights(&self) -> Result<Option<u32>, AggregateError> {
        self.stays_in_weekend_nights.get()
    }

    pub fn stays_in_week_nights(&self) -> Result<Option<u32>, AggregateError> {
        self.stays_in_week_nights.get()
    }

    pub fn adr(&self) -> Result<Option<f64>, AggregateError> {
        self.adr.get()
    }

    pub fn is_canceled(&self) -> Result<Option<bool>, AggregateError> {
        self.is_canceled.get()
    }

    pub fn total_stay(&self) -> Result<Option<u32>, AggregateError> {
        self.total_stay.get()
    }

    pub fn revenue(&self) -> Result<Option<f64>, AggregateError> {
        self.revenue.get()
    }

    /// Number of raw cells on this row that failed to parse.
    pub fn malformed_cells(&self) -> usize {
        [
            self.lead_time.is_malformed(),
            self.arrival_date.is_malformed(),
            self.stays_in_weekend_nights.is_malformed(),
            self.stays_in_week_nights.is_malformed(),
            self.adr.is_malformed(),
            self.is_canceled.is_malformed(),
        ]
        .iter()
        .filter(|&&bad| bad)
        .count()
    }
}

fn derive_total_stay(weekend: &Cell<u32>, week: &Cell<u32>, line: usize) -> Cell<u32> {
    match (weekend, week) {
        (Cell::Value(a), Cell::Value(b)) => match a.checked_add(*b) {
            Some(total) => Cell::Value(total),
            None => Cell::Malformed(MalformedValue {
                column: "total_stay",
                raw: format!("{a}+{b}"),
                line,
            }),
        },
        (Cell::Malformed(m), _) | (_, Cell::Malformed(m)) => Cell::Malformed(MalformedValue {
            column: "total_stay",
            raw: m.raw.clone(),
            line: m.line,
        }),
        _ => Cell::Missing,
    }
}
