// Library exports for hotelviz

pub mod aggregate;
pub mod booking;
pub mod calendar;
pub mod chart;
pub mod config;
pub mod dashboard;
pub mod dataset;
pub mod encode;
pub mod error;
pub mod filter;
pub mod logging;
pub mod parser;
pub mod placeholder;
pub mod render;
pub mod stats;

pub use aggregate::{AggregatedTable, Aggregation, NO_DATA_MESSAGE};
pub use booking::{Booking, HotelType, RawBooking};
pub use chart::{ChartDescription, ChartId};
pub use config::{Config, OutputFormat, RenderOptions};
pub use dashboard::Dashboard;
pub use dataset::Dataset;
pub use error::{AggregateError, DatasetError};
pub use filter::{FilterParams, HotelFilter, RangeColumn, ValueRange};
