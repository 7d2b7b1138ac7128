//! Fixed-width console rendering of holdings.
//!
//! This is purely a presentation layer: it reads model fields and never
//! changes any canonical JSON representation.

use crate::models::{Holding, Portfolio};

const HEADER: &str = "\
Description                       Units    Value Target ISIN         Date
------------------------------ -------- -------- ------ ------------ ----------";

/// One table row for a holding: description, units, value, target fraction,
/// ISIN and the price's as-of date.
pub fn holding_line(holding: &Holding) -> String {
    let fund = holding.fund().read();
    let isin = fund.isin().map(|isin| isin.as_str()).unwrap_or("");
    format!(
        "{:<30} {:>8.4} {:>8.2} {:>6.4} {:<12} {}",
        fund.description(),
        holding.units(),
        holding.units() * fund.price(),
        holding.target_fraction(),
        isin,
        fund.date().format("%Y-%m-%d"),
    )
}

/// The full holdings table, header included.
pub fn portfolio_table(portfolio: &Portfolio) -> String {
    let mut out = String::from(HEADER);
    for holding in portfolio {
        out.push('\n');
        out.push_str(&holding_line(holding));
    }
    out
}
