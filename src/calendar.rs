// Calendar helpers shared by the month-keyed aggregators

use chrono::{Datelike, NaiveDate};

/// Month names in calendar order. Grouping by month number and emitting these
/// names keeps January..December order regardless of how keys were grouped.
pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Name of a 1-based month number. Out-of-range numbers yield an empty string.
pub fn month_name(month: u32) -> &'static str {
    match month {
        1..=12 => MONTH_NAMES[(month - 1) as usize],
        _ => "",
    }
}

/// `YYYY-MM` period label. Lexical order equals chronological order.
pub fn year_month(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}
