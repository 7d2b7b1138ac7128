use serde::{Deserialize, Serialize};

use super::{FundRef, Holding};

/// How [`Portfolio::add_holding`] makes room for the new holding's target
/// fraction.
///
/// Both policies land the fractions back on a 1.0 sum provided the existing
/// fractions already summed to 1.0. That precondition is a caller contract
/// and is deliberately not re-checked: the first insertion into an empty
/// portfolio, and purely informational allocations, are allowed to leave the
/// sum elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalePolicy {
    /// Shrink the existing holdings proportionally: every existing target
    /// fraction is multiplied by `1 - new_fraction` before the append. The
    /// new fraction is read as "this share of the final whole".
    #[default]
    ScaleExisting,
    /// Append first, then renormalize every fraction (the new one included)
    /// by `1 + new_fraction`. The new fraction is read as an amount added on
    /// top of the old total.
    ScaleNewIntoTotal,
}

/// Target fraction selection for [`Portfolio::add_fund`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum TargetSpec {
    /// The fraction the new position represents of the post-insertion total
    /// portfolio value.
    #[default]
    Auto,
    /// Caller-specified fraction.
    Fraction(f64),
}

/// Options for [`Portfolio::add_fund`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AddFundOptions {
    units: f64,
    value: Option<f64>,
    target: TargetSpec,
    policy: ScalePolicy,
}

impl Default for AddFundOptions {
    fn default() -> Self {
        Self {
            units: 1.0,
            value: None,
            target: TargetSpec::Auto,
            policy: ScalePolicy::default(),
        }
    }
}

impl AddFundOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_units(mut self, units: f64) -> Self {
        self.units = units;
        self
    }

    /// Buy by value instead of units; units are derived from the fund's
    /// current price.
    pub fn with_value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_target(mut self, target: TargetSpec) -> Self {
        self.target = target;
        self
    }

    pub fn with_target_fraction(mut self, fraction: f64) -> Self {
        self.target = TargetSpec::Fraction(fraction);
        self
    }

    pub fn with_policy(mut self, policy: ScalePolicy) -> Self {
        self.policy = policy;
        self
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum PortfolioError {
    /// A value-to-units or units-from-target conversion hit a fund whose
    /// recorded price is zero.
    #[error("fund {description:?} has a zero price; cannot derive units from a value")]
    ZeroPrice { description: String },
    /// An automatic target fraction was requested while the combined
    /// portfolio value is zero.
    #[error("cannot derive an automatic target for {description:?}: combined portfolio value is zero")]
    ZeroTotalValue { description: String },
    #[error("portfolio has {actual} holdings but the target has {expected}")]
    LengthMismatch { expected: usize, actual: usize },
    #[error("holding {index} does not refer to the same fund as its target counterpart")]
    FundMismatch { index: usize },
}

/// An ordered collection of holdings.
///
/// Order matters: it drives display and the positional pairing used when a
/// portfolio is diffed against its target.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Portfolio {
    holdings: Vec<Holding>,
}

impl Portfolio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn holdings(&self) -> &[Holding] {
        &self.holdings
    }

    pub fn len(&self) -> usize {
        self.holdings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.holdings.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Holding> {
        self.holdings.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Holding> {
        self.holdings.iter()
    }

    /// Sum of the holdings' market values at current prices.
    pub fn total_value(&self) -> f64 {
        self.holdings.iter().map(Holding::value).sum()
    }

    /// Insert `new_holding`, adjusting target fractions per `policy`.
    pub fn add_holding(&mut self, new_holding: Holding, policy: ScalePolicy) {
        match policy {
            ScalePolicy::ScaleExisting => {
                let factor = 1.0 - new_holding.target_fraction();
                for holding in &mut self.holdings {
                    holding.scale_target_fraction(factor);
                }
                self.holdings.push(new_holding);
            }
            ScalePolicy::ScaleNewIntoTotal => {
                let divisor = 1.0 + new_holding.target_fraction();
                self.holdings.push(new_holding);
                for holding in &mut self.holdings {
                    holding.divide_target_fraction(divisor);
                }
            }
        }
    }

    /// Build a holding for `fund` and insert it.
    ///
    /// With [`TargetSpec::Auto`] the target fraction is the share the new
    /// position represents of the post-insertion total. Adding an
    /// auto-targeted fund to an empty portfolio yields a fraction of exactly
    /// 1.0; a zero combined total on a non-empty portfolio is an error.
    pub fn add_fund(&mut self, fund: FundRef, options: AddFundOptions) -> Result<(), PortfolioError> {
        if let Some(value) = options.value {
            let price = fund.price();
            if price == 0.0 {
                return Err(PortfolioError::ZeroPrice {
                    description: fund.read().description().to_string(),
                });
            }
            let derived = AddFundOptions {
                units: value / price,
                value: None,
                ..options
            };
            return self.add_fund(fund, derived);
        }

        let target_fraction = match options.target {
            TargetSpec::Fraction(fraction) => fraction,
            TargetSpec::Auto => {
                if self.holdings.is_empty() {
                    // The new position is the whole portfolio.
                    1.0
                } else {
                    let value_new = options.units * fund.price();
                    let total = self.total_value() + value_new;
                    if total == 0.0 {
                        return Err(PortfolioError::ZeroTotalValue {
                            description: fund.read().description().to_string(),
                        });
                    }
                    value_new / total
                }
            }
        };

        let holding = Holding::new(fund)
            .with_units(options.units)
            .with_target_fraction(target_fraction);
        self.add_holding(holding, options.policy);
        Ok(())
    }

    /// Record a target allocation for a fund not yet held (a zero-units
    /// placeholder).
    pub fn add_target(&mut self, fund: FundRef, target_fraction: f64, policy: ScalePolicy) {
        let holding = Holding::new(fund)
            .with_units(0.0)
            .with_target_fraction(target_fraction);
        self.add_holding(holding, policy);
    }

    /// The perfectly rebalanced portfolio at current prices: same funds,
    /// same order, same target fractions, units recomputed so each value is
    /// `target_fraction * total_value()`.
    ///
    /// Fund references are shared with `self`, not copied; holdings are
    /// fresh. A zero target value yields zero units without dividing, so
    /// zero-priced funds only error when they carry a real target value.
    pub fn target_portfolio(&self) -> Result<Portfolio, PortfolioError> {
        let total_value = self.total_value();
        let mut target = Portfolio::new();
        for orig in &self.holdings {
            let target_value = orig.target_fraction() * total_value;
            let price = orig.fund().price();
            let target_units = if target_value == 0.0 {
                0.0
            } else if price == 0.0 {
                return Err(PortfolioError::ZeroPrice {
                    description: orig.fund().read().description().to_string(),
                });
            } else {
                target_value / price
            };
            target.holdings.push(
                Holding::new(orig.fund().clone())
                    .with_units(target_units)
                    .with_target_fraction(orig.target_fraction()),
            );
        }
        Ok(target)
    }

    /// Buy and sell instructions to reach this portfolio's own target.
    pub fn trade_to_target(&self) -> Result<RebalancePlan, PortfolioError> {
        let target = self.target_portfolio()?;
        self.trade_against(&target)
    }

    /// Buy and sell instructions to reach `target`, pairing holdings
    /// positionally.
    ///
    /// The portfolios must have the same length and the same fund at every
    /// position; both are checked before any trade is emitted.
    pub fn trade_against(&self, target: &Portfolio) -> Result<RebalancePlan, PortfolioError> {
        if self.len() != target.len() {
            return Err(PortfolioError::LengthMismatch {
                expected: target.len(),
                actual: self.len(),
            });
        }

        let mut plan = RebalancePlan::default();
        for (index, (orig, counterpart)) in self.holdings.iter().zip(&target.holdings).enumerate() {
            if orig.fund() != counterpart.fund() {
                return Err(PortfolioError::FundMismatch { index });
            }
            let diff = counterpart.units() - orig.units();
            if diff > 0.0 {
                plan.buy.holdings.push(
                    Holding::new(orig.fund().clone())
                        .with_units(diff)
                        .with_target_fraction(orig.target_fraction()),
                );
            } else if diff < 0.0 {
                plan.sell.holdings.push(
                    Holding::new(orig.fund().clone())
                        .with_units(-diff)
                        .with_target_fraction(orig.target_fraction()),
                );
            }
        }
        Ok(plan)
    }

    /// Distinct funds by shared identity, in first-seen order.
    ///
    /// Drives "refresh once per distinct fund": holdings that share a fund
    /// cell contribute it once.
    pub fn funds(&self) -> Vec<FundRef> {
        let mut seen: Vec<FundRef> = Vec::new();
        for holding in &self.holdings {
            if !seen.iter().any(|fund| fund.ptr_eq(holding.fund())) {
                seen.push(holding.fund().clone());
            }
        }
        seen
    }

    /// Coalesce structurally equal funds into one shared reference.
    ///
    /// Deserialization gives every holding its own fund cell; this restores
    /// the one-canonical-price-record-per-fund sharing contract.
    pub fn share_equal_funds(&mut self) {
        let mut canonical: Vec<FundRef> = Vec::new();
        for holding in &mut self.holdings {
            let existing = canonical
                .iter()
                .find(|fund| *fund == holding.fund())
                .cloned();
            match existing {
                Some(fund) => holding.set_fund(fund),
                None => canonical.push(holding.fund().clone()),
            }
        }
    }
}

impl From<Vec<Holding>> for Portfolio {
    fn from(holdings: Vec<Holding>) -> Self {
        Self { holdings }
    }
}

impl FromIterator<Holding> for Portfolio {
    fn from_iter<I: IntoIterator<Item = Holding>>(iter: I) -> Self {
        Self {
            holdings: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Portfolio {
    type Item = &'a Holding;
    type IntoIter = std::slice::Iter<'a, Holding>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Buy and sell instructions produced by the rebalancing diff.
///
/// Units are positive magnitudes on both sides, and no single position
/// contributes to both.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RebalancePlan {
    pub buy: Portfolio,
    pub sell: Portfolio,
}

impl RebalancePlan {
    pub fn is_empty(&self) -> bool {
        self.buy.is_empty() && self.sell.is_empty()
    }
}
