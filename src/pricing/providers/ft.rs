//! FT markets tearsheet quote source.
//!
//! Quotes come from the markets.ft.com tearsheet pages: plain funds are
//! looked up by ISIN, ETFs by ticker. The pages are HTML; the quote value
//! and its as-of date are pulled out with targeted patterns rather than a
//! full DOM parse, so a markup reshuffle shows up as a parse error instead
//! of a silently wrong number.

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use regex::Regex;
use reqwest::Client;

use crate::models::Fund;
use crate::pricing::{PriceQuote, PriceSource};

const FT_BASE_URL: &str = "https://markets.ft.com";

#[derive(Debug, Clone)]
pub struct FtMarketsSource {
    client: Client,
    base_url: String,
    price_pattern: Regex,
    date_pattern: Regex,
}

impl FtMarketsSource {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: FT_BASE_URL.to_string(),
            // The quote block renders as
            //   <span class="mod-ui-data-list__value">172.14</span>
            price_pattern: Regex::new(r#"mod-ui-data-list__value">\s*([0-9][0-9,]*(?:\.[0-9]+)?)\s*<"#)
                .expect("price pattern is valid"),
            // "Data delayed at least 15 minutes, as of Nov 21 2022."
            date_pattern: Regex::new(r"as of ([A-Z][a-z]{2} \d{1,2} \d{4})")
                .expect("date pattern is valid"),
        }
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Point the provider at a different host (tests use a mock server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Tearsheet URL for a fund, or `None` when it carries nothing to look
    /// up by. ETFs quote by ticker, plain funds by ISIN.
    fn tearsheet_url(&self, fund: &Fund) -> Option<String> {
        if let Some(ticker) = fund.ticker() {
            Some(format!(
                "{}/data/etfs/tearsheet/summary?s={}",
                self.base_url, ticker
            ))
        } else {
            fund.isin().map(|isin| {
                format!("{}/data/funds/tearsheet/summary?s={}", self.base_url, isin)
            })
        }
    }

    fn parse_tearsheet(&self, body: &str) -> Result<(f64, Option<NaiveDate>)> {
        let raw_price = self
            .price_pattern
            .captures(body)
            .and_then(|captures| captures.get(1))
            .ok_or_else(|| anyhow!("no quote value found in tearsheet"))?
            .as_str()
            .replace(',', "");
        let price: f64 = raw_price
            .parse()
            .with_context(|| format!("invalid quote value {raw_price:?}"))?;

        let date = self
            .date_pattern
            .captures(body)
            .and_then(|captures| captures.get(1))
            .and_then(|m| NaiveDate::parse_from_str(m.as_str(), "%b %e %Y").ok());

        Ok((price, date))
    }
}

impl Default for FtMarketsSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl PriceSource for FtMarketsSource {
    async fn fetch_latest(&self, fund: &Fund) -> Result<Option<PriceQuote>> {
        let Some(url) = self.tearsheet_url(fund) else {
            return Ok(None);
        };

        let body = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let (price, date) = self
            .parse_tearsheet(&body)
            .with_context(|| format!("Failed to read a quote for {:?}", fund.description()))?;

        Ok(Some(PriceQuote {
            price,
            date,
            source: self.name().to_string(),
        }))
    }

    fn name(&self) -> &str {
        "ft_markets"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Isin;

    /// Trimmed-down tearsheet markup around the quote block.
    const SAMPLE_TEARSHEET: &str = r#"
        <ul class="mod-ui-data-list">
          <li><span class="mod-ui-data-list__label">Price (GBP)</span>
              <span class="mod-ui-data-list__value">172.14</span></li>
        </ul>
        <div class="mod-disclaimer">Data delayed at least 15 minutes, as of Nov 21 2022.</div>
    "#;

    const SAMPLE_TEARSHEET_THOUSANDS: &str = r#"
        <span class="mod-ui-data-list__value">1,234.50</span>
    "#;

    #[test]
    fn parses_price_and_as_of_date() {
        let source = FtMarketsSource::new();
        let (price, date) = source.parse_tearsheet(SAMPLE_TEARSHEET).unwrap();

        assert_eq!(price, 172.14);
        assert_eq!(date, Some(NaiveDate::from_ymd_opt(2022, 11, 21).unwrap()));
    }

    #[test]
    fn strips_thousands_separators() {
        let source = FtMarketsSource::new();
        let (price, date) = source.parse_tearsheet(SAMPLE_TEARSHEET_THOUSANDS).unwrap();

        assert_eq!(price, 1234.50);
        assert_eq!(date, None);
    }

    #[test]
    fn missing_quote_value_is_an_error() {
        let source = FtMarketsSource::new();
        assert!(source.parse_tearsheet("<html></html>").is_err());
    }

    #[test]
    fn funds_quote_by_isin_and_etfs_by_ticker() {
        let source = FtMarketsSource::new().with_base_url("http://localhost:9");

        let fund = Fund::new("FTSE Global All Cap Index Fund", 172.14)
            .with_isin(Isin::new("GB00BD3RZ582").unwrap());
        assert_eq!(
            source.tearsheet_url(&fund).unwrap(),
            "http://localhost:9/data/funds/tearsheet/summary?s=GB00BD3RZ582"
        );

        let etf = Fund::new("U.K. Gilt UCITS ETF", 18.58).with_ticker("VGOV");
        assert_eq!(
            source.tearsheet_url(&etf).unwrap(),
            "http://localhost:9/data/etfs/tearsheet/summary?s=VGOV"
        );
    }

    #[test]
    fn funds_without_identifiers_have_no_url() {
        let source = FtMarketsSource::new();
        let cash = Fund::new("Cash", 1.0);
        assert!(source.tearsheet_url(&cash).is_none());
    }

    #[test]
    fn provider_name() {
        assert_eq!(FtMarketsSource::new().name(), "ft_markets");
    }
}
