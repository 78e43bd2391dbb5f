use std::collections::BTreeMap;

use crate::booking::HotelType;
use crate::chart::{Datum, Tabular};
use crate::filter::FilteredView;

#[derive(Debug, Clone, PartialEq)]
pub struct SegmentShare {
    pub hotel: HotelType,
    pub market_segment: String,
    pub count: usize,
    /// `count` over the hotel's total; sums to 1 per hotel.
    pub proportion: f64,
}

pub fn aggregate(view: &FilteredView<'_>) -> Vec<SegmentShare> {
    let mut counts: BTreeMap<(HotelType, String), usize> = BTreeMap::new();
    let mut totals: BTreeMap<HotelType, usize> = BTreeMap::new();
    for booking in view.iter() {
        // Rows without a hotel or segment belong to no group
        let (Some(hotel), Some(segment)) = (booking.hotel(), booking.market_segment()) else {
            continue;
        };
        *totals.entry(hotel.clone()).or_default() += 1;
        *counts
            .entry((hotel.clone(), segment.to_string()))
            .or_default() += 1;
    }

    counts
        .into_iter()
        .map(|((hotel, market_segment), count)| {
            let total = totals.get(&hotel).copied().unwrap_or(count).max(1);
            SegmentShare {
                proportion: count as f64 / total as f64,
                hotel,
                market_segment,
                count,
            }
        })
        .collect()
}

impl Tabular for SegmentShare {
    const COLUMNS: &'static [&'static str] = &["hotel", "market_segment", "count", "proportion"];

    fn cells(&self) -> Vec<Datum> {
        vec![
            self.hotel.as_str().into(),
            self.market_segment.as_str().into(),
            self.count.into(),
            self.proportion.into(),
        ]
    }
}
