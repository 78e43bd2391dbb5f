use std::collections::BTreeMap;

use chrono::Datelike;

use crate::calendar::month_name;
use crate::chart::{Datum, Tabular};
use crate::error::AggregateError;
use crate::filter::FilteredView;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeatmapCell {
    pub year: i32,
    pub month: u32,
    pub count: usize,
}

/// Sparse year × month grid. Only combinations with at least one booking
/// carry a cell; absent ones are missing, not zero-filled.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BookingHeatmap {
    /// Ordered by year, then calendar month.
    pub cells: Vec<HeatmapCell>,
}

impl BookingHeatmap {
    /// Distinct years, ascending.
    pub fn years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self.cells.iter().map(|c| c.year).collect();
        years.dedup();
        years
    }

    /// Distinct months present, in calendar order.
    pub fn months(&self) -> Vec<u32> {
        let mut months: Vec<u32> = self.cells.iter().map(|c| c.month).collect();
        months.sort_unstable();
        months.dedup();
        months
    }

    pub fn count(&self, year: i32, month: u32) -> Option<usize> {
        self.cells
            .iter()
            .find(|c| c.year == year && c.month == month)
            .map(|c| c.count)
    }
}

pub fn aggregate(view: &FilteredView<'_>) -> Result<BookingHeatmap, AggregateError> {
    let mut counts: BTreeMap<(i32, u32), usize> = BTreeMap::new();
    for booking in view.iter() {
        let Some(date) = booking.arrival_date()? else {
            continue;
        };
        *counts.entry((date.year(), date.month())).or_default() += 1;
    }

    Ok(BookingHeatmap {
        cells: counts
            .into_iter()
            .map(|((year, month), count)| HeatmapCell { year, month, count })
            .collect(),
    })
}

impl Tabular for HeatmapCell {
    const COLUMNS: &'static [&'static str] = &["year", "month", "booking_count"];

    fn cells(&self) -> Vec<Datum> {
        vec![
            self.year.into(),
            month_name(self.month).into(),
            self.count.into(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::fixtures::*;
    use crate::filter::{self, FilterParams};

    #[test]
    fn test_counts_without_fabricated_cells() {
        let data = dataset(vec![
            city(2017, 3),
            resort(2017, 3),
            city(2018, 3),
        ]);
        let view = filter::apply(&data, &FilterParams::default()).unwrap();
        let heatmap = aggregate(&view).unwrap();

        assert_eq!(heatmap.count(2017, 3), Some(2));
        assert_eq!(heatmap.count(2018, 3), Some(1));
        assert_eq!(heatmap.count(2017, 4), None);
        assert_eq!(heatmap.cells.len(), 2);
    }

    #[test]
    fn test_axes_ordering() {
        let data = dataset(vec![
            city(2017, 12),
            city(2016, 8),
            city(2017, 1),
            city(2015, 8),
        ]);
        let view = filter::apply(&data, &FilterParams::default()).unwrap();
        let heatmap = aggregate(&view).unwrap();

        assert_eq!(heatmap.years(), vec![2015, 2016, 2017]);
        assert_eq!(heatmap.months(), vec![1, 8, 12]);

        let table = HeatmapCell::to_table(&heatmap.cells);
        assert_eq!(
            table.distinct_labels("month"),
            vec!["August".to_string(), "January".to_string(), "December".to_string()]
        );
    }
}
