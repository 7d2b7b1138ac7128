pub mod ft;

pub use ft::FtMarketsSource;
