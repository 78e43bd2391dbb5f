// Revenue summed per (year-month, market segment)

use std::collections::BTreeMap;

use crate::calendar::year_month;
use crate::chart::{Datum, Tabular};
use crate::error::AggregateError;
use crate::filter::FilteredView;

#[derive(Debug, Clone, PartialEq)]
pub struct SegmentRevenue {
    /// `YYYY-MM`; sorts chronologically.
    pub year_month: String,
    pub market_segment: String,
    pub revenue: f64,
}

pub fn aggregate(view: &FilteredView<'_>) -> Result<Vec<SegmentRevenue>, AggregateError> {
    let mut sums: BTreeMap<(String, String), f64> = BTreeMap::new();
    for booking in view.iter() {
        let (Some(date), Some(revenue), Some(segment)) = (
            booking.arrival_date()?,
            booking.revenue()?,
            booking.market_segment(),
        ) else {
            continue;
        };
        *sums
            .entry((year_month(date), segment.to_string()))
            .or_default() += revenue;
    }

    Ok(sums
        .into_iter()
        .map(|((year_month, market_segment), revenue)| SegmentRevenue {
            year_month,
            market_segment,
            revenue,
        })
        .collect())
}

impl Tabular for SegmentRevenue {
    const COLUMNS: &'static [&'static str] = &["year_month", "market_segment", "revenue"];

    fn cells(&self) -> Vec<Datum> {
        vec![
            self.year_month.as_str().into(),
            self.market_segment.as_str().into(),
            self.revenue.into(),
        ]
    }
}
