// Booking dataset loader: one CSV read, schema check, lenient row parsing

use crate::booking::{Booking, Cell, HotelType, RawBooking};
use crate::error::{DatasetError, MalformedValue, Result};
use chrono::{NaiveDate, NaiveDateTime};
use csv::StringRecord;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

/// Raw columns that must exist in the source table.
pub const REQUIRED_COLUMNS: [&str; 8] = [
    "hotel",
    "lead_time",
    "arrival_date",
    "stays_in_weekend_nights",
    "stays_in_week_nights",
    "adr",
    "market_segment",
    "is_canceled",
];

/// Cell texts read as "no value", the same set a pandas `read_csv` treats as NA.
const NA_VALUES: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// The loaded, read-only booking table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    bookings: Vec<Booking>,
}

impl Dataset {
    /// Load the dataset from a CSV file on disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| DatasetError::Load {
            path: path.to_path_buf(),
            source,
        })?;

        let dataset = Self::from_reader(file)?;
        info!(
            path = %path.display(),
            rows = dataset.len(),
            "loaded booking dataset"
        );
        Ok(dataset)
    }

    /// Load the dataset from any CSV byte stream.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        let columns = ColumnIndex::resolve(&headers)?;
        debug!(columns = headers.len(), "dataset header validated");

        let mut bookings = Vec::new();
        let mut malformed = 0usize;
        for (idx, result) in reader.records().enumerate() {
            // records() starts after the header, CSV lines are 1-based
            let line = idx + 2;
            let record = result?;
            let booking = Booking::from_raw(columns.parse_row(&record, line));
            malformed += booking.malformed_cells();
            bookings.push(booking);
        }

        if malformed > 0 {
            warn!(
                cells = malformed,
                "dataset contains malformed values; charts reading them will show a placeholder"
            );
        }

        Ok(Self { bookings })
    }

    pub fn from_bookings(bookings: Vec<Booking>) -> Self {
        Self { bookings }
    }

    pub fn bookings(&self) -> &[Booking] {
        &self.bookings
    }

    pub fn len(&self) -> usize {
        self.bookings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bookings.is_empty()
    }
}

impl FromIterator<Booking> for Dataset {
    fn from_iter<I: IntoIterator<Item = Booking>>(iter: I) -> Self {
        Self::from_bookings(iter.into_iter().collect())
    }
}

/// Positions of the required columns within a CSV header.
#[derive(Debug, Clone, Copy)]
struct ColumnIndex {
    hotel: usize,
    lead_time: usize,
    arrival_date: usize,
    stays_in_weekend_nights: usize,
    stays_in_week_nights: usize,
    adr: usize,
    market_segment: usize,
    is_canceled: usize,
}

impl ColumnIndex {
    fn resolve(headers: &StringRecord) -> Result<Self> {
        let header_map: HashMap<String, usize> = headers
            .iter()
            .enumerate()
            .map(|(idx, name)| (normalize_header_name(name), idx))
            .collect();

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|col| !header_map.contains_key(**col))
            .map(|col| col.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(DatasetError::Schema { missing });
        }

        let at = |name: &str| header_map[name];
        Ok(Self {
            hotel: at("hotel"),
            lead_time: at("lead_time"),
            arrival_date: at("arrival_date"),
            stays_in_weekend_nights: at("stays_in_weekend_nights"),
            stays_in_week_nights: at("stays_in_week_nights"),
            adr: at("adr"),
            market_segment: at("market_segment"),
            is_canceled: at("is_canceled"),
        })
    }

    fn parse_row(&self, record: &StringRecord, line: usize) -> RawBooking {
        let field = |idx: usize| record.get(idx).unwrap_or("");

        RawBooking {
            line,
            hotel: text(field(self.hotel)).map(HotelType::parse),
            lead_time: parse_count("lead_time", field(self.lead_time), line),
            arrival_date: parse_date("arrival_date", field(self.arrival_date), line),
            stays_in_weekend_nights: parse_count(
                "stays_in_weekend_nights",
                field(self.stays_in_weekend_nights),
                line,
            ),
            stays_in_week_nights: parse_count(
                "stays_in_week_nights",
                field(self.stays_in_week_nights),
                line,
            ),
            adr: parse_float("adr", field(self.adr), line),
            market_segment: text(field(self.market_segment)).map(str::to_string),
            is_canceled: parse_flag("is_canceled", field(self.is_canceled), line),
        }
    }
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a BOM.
    name.trim().trim_start_matches('\u{feff}').to_ascii_lowercase()
}

fn is_na(raw: &str) -> bool {
    NA_VALUES.contains(&raw)
}

/// Text cell, `None` when empty or NA.
fn text(raw: &str) -> Option<&str> {
    (!is_na(raw)).then_some(raw)
}

fn malformed<T>(column: &'static str, raw: &str, line: usize) -> Cell<T> {
    Cell::Malformed(MalformedValue {
        column,
        raw: raw.to_string(),
        line,
    })
}

/// Non-negative integer; integral floats such as `3.0` are accepted.
fn parse_count(column: &'static str, raw: &str, line: usize) -> Cell<u32> {
    if is_na(raw) {
        return Cell::Missing;
    }
    if let Ok(v) = raw.parse::<u32>() {
        return Cell::Value(v);
    }
    match raw.parse::<f64>() {
        Ok(v) if v.fract() == 0.0 && v >= 0.0 && v <= f64::from(u32::MAX) => Cell::Value(v as u32),
        _ => malformed(column, raw, line),
    }
}

fn parse_float(column: &'static str, raw: &str, line: usize) -> Cell<f64> {
    if is_na(raw) {
        return Cell::Missing;
    }
    raw.parse::<f64>()
        .map(Cell::Value)
        .unwrap_or_else(|_| malformed(column, raw, line))
}

fn parse_flag(column: &'static str, raw: &str, line: usize) -> Cell<bool> {
    if is_na(raw) {
        return Cell::Missing;
    }
    match raw.to_ascii_lowercase().as_str() {
        "0" | "0.0" | "false" => Cell::Value(false),
        "1" | "1.0" | "true" => Cell::Value(true),
        _ => malformed(column, raw, line),
    }
}

fn parse_date(column: &'static str, raw: &str, line: usize) -> Cell<NaiveDate> {
    if is_na(raw) {
        return Cell::Missing;
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, fmt) {
            return Cell::Value(date);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Cell::Value(dt.date());
        }
    }
    malformed(column, raw, line)
}
