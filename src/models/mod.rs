mod fund;
mod holding;
mod isin;
mod portfolio;

pub use fund::{Fund, FundRef};
pub use holding::Holding;
pub use isin::{Isin, IsinError};
pub use portfolio::{
    AddFundOptions, Portfolio, PortfolioError, RebalancePlan, ScalePolicy, TargetSpec,
};
