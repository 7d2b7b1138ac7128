mod models;
pub mod providers;
mod service;
mod source;

pub use models::PriceQuote;
pub use service::{PriceService, RefreshReport};
pub use source::{NoopSource, PriceSource, StaticPriceSource};
