// Parsed form of a chart request

use crate::chart::ChartId;
use crate::filter::{HotelFilter, ValueRange};

/// What a request asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Chart(ChartId),
    /// Every chart, in `ChartId::ALL` order
    All,
}

/// A complete request: `target(hotel: "...", range: LOW..HIGH)`
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub target: Target,
    pub hotel: HotelFilter,
    pub range: Option<ValueRange>,
}

/// One named argument inside the parentheses
#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    Hotel(String),
    Range(ValueRange),
}
