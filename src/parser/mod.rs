// Chart request DSL parser module

pub mod ast;
pub mod lexer;
pub mod request;

// Public API re-exports
pub use ast::{Argument, Request, Target};

use crate::chart::{ChartId, UnknownChart};
use crate::filter::HotelFilter;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RequestError {
    #[error("could not parse request '{input}': {detail}")]
    Syntax { input: String, detail: String },
    #[error(transparent)]
    UnknownChart(#[from] UnknownChart),
}

/// Parse a request such as `adr_vs_stay_length(hotel: "Resort Hotel", range: 1..7)`
/// or `all()`.
pub fn parse(input: &str) -> Result<Request, RequestError> {
    let (_, (name, args)) = request::parse_request(input).map_err(|e| RequestError::Syntax {
        input: input.to_string(),
        detail: e.to_string(),
    })?;

    let target = match name.as_str() {
        "all" => Target::All,
        other => Target::Chart(other.parse::<ChartId>()?),
    };

    let mut req = Request {
        target,
        hotel: HotelFilter::All,
        range: None,
    };
    // Later arguments override earlier ones
    for arg in args {
        match arg {
            Argument::Hotel(h) => req.hotel = HotelFilter::parse(&h),
            Argument::Range(r) => req.range = Some(r),
        }
    }
    Ok(req)
}
