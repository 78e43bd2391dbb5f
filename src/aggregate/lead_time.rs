// Lead-time histogram with a per-hotel box summary

use std::collections::BTreeMap;

use crate::booking::HotelType;
use crate::chart::{Datum, Tabular};
use crate::error::AggregateError;
use crate::filter::FilteredView;
use crate::stats::{Bins, BoxStats};

pub const LEAD_TIME_BINS: usize = 50;

#[derive(Debug, Clone, PartialEq)]
pub struct HistogramBin {
    pub hotel: HotelType,
    pub bin_start: f64,
    pub bin_end: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LeadTimeBox {
    pub hotel: HotelType,
    pub stats: BoxStats,
}

/// Histogram bins (all hotels share the same edges) and box summaries,
/// both ordered by hotel name.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LeadTimeDistribution {
    pub bins: Vec<HistogramBin>,
    pub boxes: Vec<LeadTimeBox>,
}

pub fn aggregate(view: &FilteredView<'_>) -> Result<LeadTimeDistribution, AggregateError> {
    let mut by_hotel: BTreeMap<HotelType, Vec<f64>> = BTreeMap::new();
    for booking in view.iter() {
        let (Some(lead_time), Some(hotel)) = (booking.lead_time()?, booking.hotel()) else {
            continue;
        };
        by_hotel
            .entry(hotel.clone())
            .or_default()
            .push(f64::from(lead_time));
    }

    let all_values: Vec<f64> = by_hotel.values().flatten().copied().collect();
    let Some(bins) = Bins::spanning(&all_values, LEAD_TIME_BINS) else {
        return Ok(LeadTimeDistribution::default());
    };

    let mut distribution = LeadTimeDistribution::default();
    for (hotel, values) in by_hotel {
        let mut counts = vec![0usize; bins.count];
        for &v in &values {
            counts[bins.index_of(v)] += 1;
        }
        for (idx, count) in counts.into_iter().enumerate() {
            let (bin_start, bin_end) = bins.edges(idx);
            distribution.bins.push(HistogramBin {
                hotel: hotel.clone(),
                bin_start,
                bin_end,
                count,
            });
        }
        if let Some(stats) = BoxStats::from_values(&values) {
            distribution.boxes.push(LeadTimeBox { hotel, stats });
        }
    }

    Ok(distribution)
}

impl Tabular for HistogramBin {
    const COLUMNS: &'static [&'static str] = &["hotel", "bin_start", "bin_end", "count"];

    fn cells(&self) -> Vec<Datum> {
        vec![
            self.hotel.as_str().into(),
            self.bin_start.into(),
            self.bin_end.into(),
            self.count.into(),
        ]
    }
}

impl Tabular for LeadTimeBox {
    const COLUMNS: &'static [&'static str] = &[
        "hotel",
        "min",
        "q1",
        "median",
        "q3",
        "max",
        "lower_whisker",
        "upper_whisker",
        "outliers",
    ];

    fn cells(&self) -> Vec<Datum> {
        let s = &self.stats;
        vec![
            self.hotel.as_str().into(),
            s.min.into(),
            s.q1.into(),
            s.median.into(),
            s.q3.into(),
            s.max.into(),
            s.lower_whisker.into(),
            s.upper_whisker.into(),
            Datum::Floats(s.outliers.clone()),
        ]
    }
}
