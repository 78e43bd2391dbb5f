use std::sync::Arc;

use rayon::prelude::*;
use tracing::debug;

use crate::aggregate;
use crate::chart::{ChartDescription, ChartId};
use crate::dataset::Dataset;
use crate::encode::encode;
use crate::filter::{FilterParams, HotelFilter, ValueRange};

/// Owns the read-only dataset and answers chart requests against it.
///
/// Cloning is cheap and every clone shares the same rows, so a `Dashboard`
/// can be handed to as many request handlers or threads as needed.
#[derive(Debug, Clone)]
pub struct Dashboard {
    dataset: Arc<Dataset>,
}

impl Dashboard {
    pub fn new(dataset: Dataset) -> Self {
        Self {
            dataset: Arc::new(dataset),
        }
    }

    /// Compute one chart. Never fails: empty selections and bad values come
    /// back as a placeholder description.
    ///
    /// `range` only applies to charts with a range column (lead time
    /// distribution, ADR vs. stay length) and is ignored elsewhere.
    pub fn compute(
        &self,
        chart: ChartId,
        hotel: &HotelFilter,
        range: Option<ValueRange>,
    ) -> ChartDescription {
        let mut params = FilterParams::hotel(hotel.clone());
        match (chart.range_column(), range) {
            (Some(column), Some(range)) => params = params.with_range(column, range),
            (None, Some(range)) => debug!(chart = %chart, %range, "range ignored"),
            _ => {}
        }
        encode(chart, aggregate::run(chart, &self.dataset, &params))
    }

    /// Compute every chart for one selection, in [`ChartId::ALL`] order.
    pub fn compute_all(
        &self,
        hotel: &HotelFilter,
        range: Option<ValueRange>,
    ) -> Vec<ChartDescription> {
        ChartId::ALL
            .par_iter()
            .map(|&chart| self.compute(chart, hotel, range))
            .collect()
    }
}
