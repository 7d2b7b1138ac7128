use chrono::NaiveDate;

/// A price observation for one fund.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceQuote {
    pub price: f64,
    /// As-of date, when the source published one. Callers applying a quote
    /// without a date fall back to "today".
    pub date: Option<NaiveDate>,
    /// Name of the source the quote came from.
    pub source: String,
}
