use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use parking_lot::{RwLock, RwLockReadGuard};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::Isin;

/// A single tradeable fund: display metadata plus the latest known price.
///
/// `price` and `date` are only ever set together; after construction,
/// [`Fund::update_price`] is the sole mutation a fund sees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fund {
    description: String,
    price: f64,
    date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    isin: Option<Isin>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ticker: Option<String>,
}

impl Fund {
    /// Create a fund whose initial price is dated today.
    pub fn new(description: impl Into<String>, price: f64) -> Self {
        let today = Utc::now().date_naive();
        let mut fund = Self {
            description: description.into(),
            price: 0.0,
            date: today,
            isin: None,
            ticker: None,
        };
        // Construction and update share one path.
        fund.update_price(price, today);
        fund
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.update_price(self.price, date);
        self
    }

    pub fn with_isin(mut self, isin: Isin) -> Self {
        self.isin = Some(isin);
        self
    }

    /// Exchange ticker, used for ETF-style quote lookups.
    pub fn with_ticker(mut self, ticker: impl Into<String>) -> Self {
        self.ticker = Some(ticker.into());
        self
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn isin(&self) -> Option<&Isin> {
        self.isin.as_ref()
    }

    pub fn ticker(&self) -> Option<&str> {
        self.ticker.as_deref()
    }

    /// Record a new price together with its as-of date.
    ///
    /// No sign validation: a fund can in principle carry a zero or negative
    /// net asset value.
    pub fn update_price(&mut self, price: f64, date: NaiveDate) {
        self.price = price;
        self.date = date;
    }

    /// Record a new price dated today.
    pub fn update_price_today(&mut self, price: f64) {
        self.update_price(price, Utc::now().date_naive());
    }
}

/// Shared handle to a fund's canonical price record.
///
/// Every holding that refers to the same fund shares one cell, so a price
/// update is visible through all of them at once, including holdings in a
/// derived target portfolio.
#[derive(Debug, Clone)]
pub struct FundRef(Arc<RwLock<Fund>>);

impl FundRef {
    pub fn new(fund: Fund) -> Self {
        Self(Arc::new(RwLock::new(fund)))
    }

    pub fn read(&self) -> RwLockReadGuard<'_, Fund> {
        self.0.read()
    }

    /// Copy of the fund's current state.
    pub fn snapshot(&self) -> Fund {
        self.0.read().clone()
    }

    pub fn price(&self) -> f64 {
        self.0.read().price()
    }

    pub fn update_price(&self, price: f64, date: NaiveDate) {
        self.0.write().update_price(price, date);
    }

    /// True when both handles point at the same shared cell.
    pub fn ptr_eq(&self, other: &FundRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl From<Fund> for FundRef {
    fn from(fund: Fund) -> Self {
        Self::new(fund)
    }
}

impl PartialEq for FundRef {
    fn eq(&self, other: &Self) -> bool {
        // ptr_eq first: it also keeps us from taking the same lock twice.
        self.ptr_eq(other) || *self.0.read() == *other.0.read()
    }
}

impl Serialize for FundRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.read().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for FundRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Fund::deserialize(deserializer).map(FundRef::new)
    }
}
