use std::collections::HashMap;

use anyhow::Result;

use super::PriceQuote;
use crate::models::{Fund, Isin};

/// Supplies the latest known price for a fund.
///
/// `Ok(None)` means the source has no quote for this fund (for example a
/// fund carrying neither ISIN nor ticker); errors are transport or parse
/// failures.
#[async_trait::async_trait]
pub trait PriceSource: Send + Sync {
    async fn fetch_latest(&self, fund: &Fund) -> Result<Option<PriceQuote>>;

    fn name(&self) -> &str;
}

pub struct NoopSource;

#[async_trait::async_trait]
impl PriceSource for NoopSource {
    async fn fetch_latest(&self, _fund: &Fund) -> Result<Option<PriceQuote>> {
        Ok(None)
    }

    fn name(&self) -> &str {
        "noop"
    }
}

/// In-memory quotes keyed by ISIN, for offline use and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticPriceSource {
    quotes: HashMap<Isin, PriceQuote>,
}

impl StaticPriceSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quote(mut self, isin: Isin, quote: PriceQuote) -> Self {
        self.insert(isin, quote);
        self
    }

    pub fn insert(&mut self, isin: Isin, quote: PriceQuote) {
        self.quotes.insert(isin, quote);
    }
}

#[async_trait::async_trait]
impl PriceSource for StaticPriceSource {
    async fn fetch_latest(&self, fund: &Fund) -> Result<Option<PriceQuote>> {
        Ok(fund
            .isin()
            .and_then(|isin| self.quotes.get(isin))
            .cloned())
    }

    fn name(&self) -> &str {
        "static"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote(price: f64) -> PriceQuote {
        PriceQuote {
            price,
            date: None,
            source: "static".to_string(),
        }
    }

    #[tokio::test]
    async fn noop_source_never_quotes() {
        let fund = Fund::new("Anything", 1.0);
        let result = NoopSource.fetch_latest(&fund).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn static_source_quotes_by_isin() {
        let isin = Isin::new("GB00BD3RZ582").unwrap();
        let source = StaticPriceSource::new().with_quote(isin.clone(), quote(170.02));

        let fund = Fund::new("FTSE Global All Cap Index Fund", 172.14).with_isin(isin);
        let result = source.fetch_latest(&fund).await.unwrap();
        assert_eq!(result.unwrap().price, 170.02);
    }

    #[tokio::test]
    async fn static_source_skips_funds_without_isin() {
        let source = StaticPriceSource::new()
            .with_quote(Isin::new("GB00BD3RZ582").unwrap(), quote(170.02));

        let cash = Fund::new("Cash", 1.0);
        assert!(source.fetch_latest(&cash).await.unwrap().is_none());
    }
}
