// Lead time split by cancellation status, for the box plot

use crate::booking::HotelType;
use crate::chart::{Datum, Tabular};
use crate::error::AggregateError;
use crate::filter::FilteredView;

#[derive(Debug, Clone, PartialEq)]
pub struct CancellationPoint {
    pub is_canceled: bool,
    pub lead_time: u32,
    pub hotel: HotelType,
}

/// Row-level points grouped by (is_canceled, hotel). Not-canceled comes
/// first; within a group the dataset order is kept.
pub fn aggregate(view: &FilteredView<'_>) -> Result<Vec<CancellationPoint>, AggregateError> {
    let mut points = Vec::new();
    for b in view.iter() {
        let (Some(is_canceled), Some(lead_time), Some(hotel)) =
            (b.is_canceled()?, b.lead_time()?, b.hotel())
        else {
            continue;
        };
        points.push(CancellationPoint {
            is_canceled,
            lead_time,
            hotel: hotel.clone(),
        });
    }

    points.sort_by(|a, b| (a.is_canceled, &a.hotel).cmp(&(b.is_canceled, &b.hotel)));
    Ok(points)
}

impl Tabular for CancellationPoint {
    const COLUMNS: &'static [&'static str] = &["is_canceled", "lead_time", "hotel"];

    fn cells(&self) -> Vec<Datum> {
        vec![
            Datum::Int(i64::from(self.is_canceled)),
            self.lead_time.into(),
            self.hotel.as_str().into(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::fixtures::*;
    use crate::filter::{self, FilterParams};

    #[test]
    fn test_not_canceled_first_then_hotel() {
        let data = dataset(vec![
            resort(2016, 1).canceled(true).lead_time(300),
            resort(2016, 1).canceled(false).lead_time(10),
            city(2016, 1).canceled(true).lead_time(120),
            city(2016, 1).canceled(false).lead_time(5),
            resort(2016, 1).canceled(false).lead_time(20),
        ]);
        let view = filter::apply(&data, &FilterParams::default()).unwrap();
        let points = aggregate(&view).unwrap();

        let keys: Vec<(bool, &str, u32)> = points
            .iter()
            .map(|p| (p.is_canceled, p.hotel.as_str(), p.lead_time))
            .collect();
        assert_eq!(
            keys,
            vec![
                (false, "City Hotel", 5),
                (false, "Resort Hotel", 10),
                (false, "Resort Hotel", 20),
                (true, "City Hotel", 120),
                (true, "Resort Hotel", 300),
            ]
        );
    }

    #[test]
    fn test_table_encodes_flag_as_zero_or_one() {
        let data = dataset(vec![city(2016, 1).canceled(true)]);
        let view = filter::apply(&data, &FilterParams::default()).unwrap();
        let table = CancellationPoint::to_table(&aggregate(&view).unwrap());
        assert_eq!(table.column("is_canceled"), vec![&Datum::Int(1)]);
    }
}
