// Month x hotel means

use std::collections::BTreeMap;

use chrono::Datelike;

use crate::booking::{Booking, HotelType};
use crate::calendar::month_name;
use crate::chart::{Datum, Tabular};
use crate::error::AggregateError;
use crate::filter::FilteredView;

#[derive(Debug, Clone, PartialEq)]
pub struct StayByMonth {
    /// 1-based month number
    pub month: u32,
    pub hotel: HotelType,
    pub total_stay: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CancelRateByMonth {
    pub month: u32,
    pub hotel: HotelType,
    pub cancellation_rate: f64,
}

/// Mean of `total_stay` per (arrival month, hotel).
pub fn stay_by_month(view: &FilteredView<'_>) -> Result<Vec<StayByMonth>, AggregateError> {
    let means = mean_by_month(view, |b| Ok(b.total_stay()?.map(f64::from)))?;
    Ok(means
        .into_iter()
        .map(|((month, hotel), total_stay)| StayByMonth {
            month,
            hotel,
            total_stay,
        })
        .collect())
}

/// Mean of `is_canceled` per (arrival month, hotel), a rate in [0, 1].
pub fn cancel_rate_by_month(
    view: &FilteredView<'_>,
) -> Result<Vec<CancelRateByMonth>, AggregateError> {
    let means = mean_by_month(view, |b| {
        Ok(b.is_canceled()?.map(|canceled| if canceled { 1.0 } else { 0.0 }))
    })?;
    Ok(means
        .into_iter()
        .map(|((month, hotel), cancellation_rate)| CancelRateByMonth {
            month,
            hotel,
            cancellation_rate,
        })
        .collect())
}

/// Group by (month number, hotel) and average `value`.
///
/// Keys are month numbers, so iteration order is calendar order, then hotel name.
/// Rows with an empty date, hotel or value are left out of every group.
fn mean_by_month<F>(
    view: &FilteredView<'_>,
    value: F,
) -> Result<BTreeMap<(u32, HotelType), f64>, AggregateError>
where
    F: Fn(&Booking) -> Result<Option<f64>, AggregateError>,
{
    let mut sums: BTreeMap<(u32, HotelType), (f64, usize)> = BTreeMap::new();
    for booking in view.iter() {
        let Some(date) = booking.arrival_date()? else {
            continue;
        };
        let Some(v) = value(booking)? else {
            continue;
        };
        let Some(hotel) = booking.hotel() else {
            continue;
        };
        let entry = sums.entry((date.month(), hotel.clone())).or_insert((0.0, 0));
        entry.0 += v;
        entry.1 += 1;
    }

    Ok(sums
        .into_iter()
        .map(|(key, (sum, n))| (key, sum / n as f64))
        .collect())
}

impl Tabular for StayByMonth {
    const COLUMNS: &'static [&'static str] = &["month", "hotel", "total_stay"];

    fn cells(&self) -> Vec<Datum> {
        vec![
            month_name(self.month).into(),
            self.hotel.as_str().into(),
            self.total_stay.into(),
        ]
    }
}

impl Tabular for CancelRateByMonth {
    const COLUMNS: &'static [&'static str] = &["month", "hotel", "cancellation_rate"];

    fn cells(&self) -> Vec<Datum> {
        vec![
            month_name(self.month).into(),
            self.hotel.as_str().into(),
            self.cancellation_rate.into(),
        ]
    }
}
