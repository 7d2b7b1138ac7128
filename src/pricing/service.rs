use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use super::PriceSource;
use crate::clock::{Clock, SystemClock};
use crate::models::Portfolio;

/// Outcome of a portfolio-wide price refresh.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshReport {
    /// Funds whose price record was updated.
    pub updated: usize,
    /// Funds the source had no quote for.
    pub skipped: usize,
}

/// Refreshes the shared fund records behind a portfolio.
pub struct PriceService {
    source: Arc<dyn PriceSource>,
    clock: Arc<dyn Clock>,
}

impl PriceService {
    pub fn new(source: Arc<dyn PriceSource>) -> Self {
        Self {
            source,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Fetch a fresh price for every distinct fund held and apply it through
    /// the shared fund reference.
    ///
    /// Holdings that share a fund cell trigger exactly one fetch between
    /// them; the update is visible through all of them at once. Quotes
    /// without an as-of date are dated "today".
    pub async fn refresh_portfolio(&self, portfolio: &Portfolio) -> Result<RefreshReport> {
        let mut report = RefreshReport::default();

        for fund_ref in portfolio.funds() {
            let fund = fund_ref.snapshot();
            let quote = self
                .source
                .fetch_latest(&fund)
                .await
                .with_context(|| format!("Failed to fetch a price for {:?}", fund.description()))?;

            match quote {
                Some(quote) => {
                    let date = quote.date.unwrap_or_else(|| self.clock.today());
                    debug!(
                        fund = fund.description(),
                        price = quote.price,
                        date = %date,
                        source = quote.source,
                        "applying price update"
                    );
                    fund_ref.update_price(quote.price, date);
                    report.updated += 1;
                }
                None => {
                    debug!(
                        fund = fund.description(),
                        source = self.source.name(),
                        "no quote available; skipping"
                    );
                    report.skipped += 1;
                }
            }
        }

        info!(
            updated = report.updated,
            skipped = report.skipped,
            source = self.source.name(),
            "price refresh complete"
        );
        Ok(report)
    }
}
