use chrono::NaiveDate;

use crate::booking::HotelType;
use crate::chart::{Datum, Tabular};
use crate::error::AggregateError;
use crate::filter::FilteredView;

#[derive(Debug, Clone, PartialEq)]
pub struct StayRatePoint {
    pub total_stay: u32,
    pub adr: f64,
    pub hotel: HotelType,
    /// Drives marker size; may be negative when `adr` is.
    pub revenue: f64,
    pub arrival_date: NaiveDate,
    pub is_canceled: bool,
}

/// One point per booking, in dataset order. No grouping. Bookings with an
/// empty cell in any plotted or hover field are skipped.
pub fn aggregate(view: &FilteredView<'_>) -> Result<Vec<StayRatePoint>, AggregateError> {
    let mut points = Vec::with_capacity(view.len());
    for b in view.iter() {
        let (
            Some(total_stay),
            Some(adr),
            Some(revenue),
            Some(arrival_date),
            Some(is_canceled),
            Some(hotel),
        ) = (
            b.total_stay()?,
            b.adr()?,
            b.revenue()?,
            b.arrival_date()?,
            b.is_canceled()?,
            b.hotel(),
        )
        else {
            continue;
        };
        points.push(StayRatePoint {
            total_stay,
            adr,
            hotel: hotel.clone(),
            revenue,
            arrival_date,
            is_canceled,
        });
    }
    Ok(points)
}

impl Tabular for StayRatePoint {
    const COLUMNS: &'static [&'static str] = &[
        "total_stay",
        "adr",
        "hotel",
        "revenue",
        "arrival_date",
        "is_canceled",
    ];

    fn cells(&self) -> Vec<Datum> {
        vec![
            self.total_stay.into(),
            self.adr.into(),
            self.hotel.as_str().into(),
            self.revenue.into(),
            self.arrival_date.into(),
            Datum::Int(i64::from(self.is_canceled)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::fixtures::*;
    use crate::filter::{self, FilterParams, HotelFilter, RangeColumn, ValueRange};

    #[test]
    fn test_points_follow_dataset_order() {
        let data = dataset(vec![
            city(2017, 5).nights(1, 2).adr(80.0),
            resort(2016, 7).nights(0, 1).adr(-6.38).canceled(true),
            city(2015, 9).nights(2, 5).adr(120.0),
        ]);
        let view = filter::apply(&data, &FilterParams::default()).unwrap();
        let points = aggregate(&view).unwrap();

        let stays: Vec<u32> = points.iter().map(|p| p.total_stay).collect();
        assert_eq!(stays, vec![3, 1, 7]);
        assert_eq!(points[0].revenue, 240.0);
        assert_eq!(points[1].revenue, -6.38);
        assert!(points[1].is_canceled);
        assert_eq!(points[2].arrival_date, date(2015, 9, 1));
    }

    #[test]
    fn test_stay_range_is_inclusive() {
        let data = dataset(vec![
            city(2017, 5).nights(0, 2),
            city(2017, 5).nights(0, 3),
            city(2017, 5).nights(0, 5),
            city(2017, 5).nights(0, 6),
            resort(2017, 5).nights(0, 4),
        ]);
        let params = FilterParams::hotel(HotelFilter::Only(HotelType::City))
            .with_range(RangeColumn::TotalStay, ValueRange::new(3.0, 5.0));
        let view = filter::apply(&data, &params).unwrap();
        let stays: Vec<u32> = aggregate(&view)
            .unwrap()
            .iter()
            .map(|p| p.total_stay)
            .collect();
        assert_eq!(stays, vec![3, 5]);
    }

    #[test]
    fn test_cancellation_flag_is_numeric_in_table() {
        let point = StayRatePoint {
            total_stay: 2,
            adr: 50.0,
            hotel: HotelType::Resort,
            revenue: 100.0,
            arrival_date: date(2016, 1, 1),
            is_canceled: true,
        };
        let table = StayRatePoint::to_table(&[point]);
        assert_eq!(table.rows[0][5], Datum::Int(1));
    }
}
