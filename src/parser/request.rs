// Request parser: target(hotel: "...", range: LOW..HIGH)

use super::ast::Argument;
use super::lexer::{identifier, number_literal, string_literal, ws};
use crate::filter::ValueRange;
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::char,
    combinator::{eof, map},
    multi::separated_list0,
    sequence::{preceded, separated_pair},
    IResult,
};

/// Parse an inclusive range
/// Format: 10..200 or 1.5..7
pub fn parse_range(input: &str) -> IResult<&str, ValueRange> {
    map(
        separated_pair(ws(number_literal), tag(".."), ws(number_literal)),
        |(low, high)| ValueRange::new(low, high),
    )(input)
}

/// Parse one named argument
/// Format: hotel: "City Hotel" or range: 0..30
pub fn parse_argument(input: &str) -> IResult<&str, Argument> {
    alt((
        map(
            preceded(ws(tag("hotel:")), ws(string_literal)),
            Argument::Hotel,
        ),
        map(preceded(ws(tag("range:")), parse_range), Argument::Range),
    ))(input)
}

/// Parse a whole request, returning the target name and its arguments.
/// The target name is resolved by the caller.
pub fn parse_request(input: &str) -> IResult<&str, (String, Vec<Argument>)> {
    let (input, target) = ws(identifier)(input)?;
    let (input, _) = ws(char('('))(input)?;
    let (input, args) = separated_list0(ws(char(',')), parse_argument)(input)?;
    let (input, _) = ws(char(')'))(input)?;
    let (input, _) = ws(eof)(input)?;

    Ok((input, (target, args)))
}
