use serde::{Deserialize, Serialize};

use super::FundRef;

fn default_units() -> f64 {
    1.0
}

/// A fund position: shared fund reference, units held, and the fraction of
/// the total portfolio that should be allocated to it.
///
/// `units` is expected to be non-negative and `target_fraction` to lie in
/// [0, 1]; neither is enforced here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    fund: FundRef,
    #[serde(default = "default_units")]
    units: f64,
    #[serde(default)]
    target_fraction: f64,
}

impl Holding {
    pub fn new(fund: impl Into<FundRef>) -> Self {
        Self {
            fund: fund.into(),
            units: 1.0,
            target_fraction: 0.0,
        }
    }

    pub fn with_units(mut self, units: f64) -> Self {
        self.units = units;
        self
    }

    pub fn with_target_fraction(mut self, target_fraction: f64) -> Self {
        self.target_fraction = target_fraction;
        self
    }

    pub fn fund(&self) -> &FundRef {
        &self.fund
    }

    pub fn units(&self) -> f64 {
        self.units
    }

    pub fn target_fraction(&self) -> f64 {
        self.target_fraction
    }

    /// Market value at the fund's current price. Never cached: the result
    /// changes as soon as the shared fund record is repriced.
    pub fn value(&self) -> f64 {
        self.units * self.fund.price()
    }

    pub(crate) fn scale_target_fraction(&mut self, factor: f64) {
        self.target_fraction *= factor;
    }

    pub(crate) fn divide_target_fraction(&mut self, divisor: f64) {
        self.target_fraction /= divisor;
    }

    pub(crate) fn set_fund(&mut self, fund: FundRef) {
        self.fund = fund;
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::models::Fund;

    #[test]
    fn value_is_units_times_price() {
        let fund = Fund::new("Test fund", 2.0);
        let holding = Holding::new(fund).with_units(3.0);
        assert_eq!(holding.value(), 6.0);
    }

    #[test]
    fn value_tracks_the_shared_fund_price() {
        let fund = FundRef::new(Fund::new("Test fund", 2.0));
        let holding = Holding::new(fund.clone()).with_units(3.0);

        fund.update_price(4.0, NaiveDate::from_ymd_opt(2023, 1, 2).unwrap());

        assert_eq!(holding.value(), 12.0);
    }

    #[test]
    fn defaults_to_one_unit_and_zero_target() {
        let holding = Holding::new(Fund::new("Test fund", 5.0));
        assert_eq!(holding.units(), 1.0);
        assert_eq!(holding.target_fraction(), 0.0);
        assert_eq!(holding.value(), 5.0);
    }

    #[test]
    fn equality_is_structural() {
        let make = || {
            Holding::new(Fund::new("Test fund", 2.0).with_date(NaiveDate::from_ymd_opt(2023, 1, 2).unwrap()))
                .with_units(3.0)
                .with_target_fraction(0.5)
        };
        assert_eq!(make(), make());
        assert_ne!(make(), make().with_units(4.0));
    }

    #[test]
    fn deserialization_fills_in_defaults() {
        let json = r#"{"fund": {"description": "Test fund", "price": 2.0, "date": "2023-01-02"}}"#;
        let holding: Holding = serde_json::from_str(json).unwrap();
        assert_eq!(holding.units(), 1.0);
        assert_eq!(holding.target_fraction(), 0.0);
    }
}
