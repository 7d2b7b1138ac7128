use anyhow::Result;
use chrono::NaiveDate;
use tempfile::TempDir;

use fundbook::models::{Fund, FundRef, Holding, Isin, Portfolio};
use fundbook::storage::JsonFileStore;

fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2022, 11, 21).unwrap()
}

fn two_fund_6040() -> Portfolio {
    let ftse = FundRef::new(
        Fund::new("FTSE Global All Cap Index Fund", 172.14)
            .with_date(as_of())
            .with_isin(Isin::new("GB00BD3RZ582").unwrap()),
    );
    let gilts = FundRef::new(
        Fund::new("U.K. Gilt UCITS ETF", 18.58)
            .with_date(as_of())
            .with_isin(Isin::new("IE00B42WWV65").unwrap())
            .with_ticker("VGOV"),
    );
    Portfolio::from(vec![
        Holding::new(ftse).with_units(1.0).with_target_fraction(0.6),
        Holding::new(gilts).with_units(5.0).with_target_fraction(0.4),
    ])
}

#[tokio::test]
async fn save_then_load_round_trips() -> Result<()> {
    let temp = TempDir::new()?;
    let store = JsonFileStore::new(temp.path().join("portfolio.json"));

    let portfolio = two_fund_6040();
    store.save(&portfolio).await?;
    let loaded = store.load().await?.expect("expected a portfolio");

    assert_eq!(loaded, portfolio);
    Ok(())
}

#[tokio::test]
async fn load_missing_file_is_none() -> Result<()> {
    let temp = TempDir::new()?;
    let store = JsonFileStore::new(temp.path().join("portfolio.json"));

    assert!(store.load().await?.is_none());
    Ok(())
}

#[tokio::test]
async fn save_creates_parent_directories() -> Result<()> {
    let temp = TempDir::new()?;
    let store = JsonFileStore::new(temp.path().join("nested").join("dir").join("portfolio.json"));

    store.save(&two_fund_6040()).await?;

    assert!(store.path().exists());
    Ok(())
}

#[tokio::test]
async fn invalid_json_is_an_error() -> Result<()> {
    let temp = TempDir::new()?;
    let path = temp.path().join("portfolio.json");
    std::fs::write(&path, "{not json")?;

    let store = JsonFileStore::new(&path);
    assert!(store.load().await.is_err());
    Ok(())
}

#[tokio::test]
async fn loaded_holdings_over_one_fund_share_one_price_record() -> Result<()> {
    let temp = TempDir::new()?;
    let store = JsonFileStore::new(temp.path().join("portfolio.json"));

    // Two holdings over the same shared fund cell.
    let fund = FundRef::new(
        Fund::new("FTSE Global All Cap Index Fund", 172.14)
            .with_date(as_of())
            .with_isin(Isin::new("GB00BD3RZ582").unwrap()),
    );
    let portfolio = Portfolio::from(vec![
        Holding::new(fund.clone()).with_units(1.0).with_target_fraction(0.5),
        Holding::new(fund).with_units(2.0).with_target_fraction(0.5),
    ]);

    store.save(&portfolio).await?;
    let loaded = store.load().await?.expect("expected a portfolio");

    // Deserialization restores the sharing, not just the values.
    assert_eq!(loaded.funds().len(), 1);
    let first = loaded.get(0).unwrap().fund();
    let second = loaded.get(1).unwrap().fund();
    assert!(first.ptr_eq(second));

    // A single price update is visible through both holdings.
    first.update_price(180.0, NaiveDate::from_ymd_opt(2023, 3, 6).unwrap());
    assert_eq!(loaded.get(1).unwrap().value(), 360.0);

    Ok(())
}
