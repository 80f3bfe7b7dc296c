//! Oracle module: external settlement feeds and the bounded price oracle

pub mod feed;
pub mod price_oracle;

pub use feed::{SettlementFeed, StaticFeed};
pub use price_oracle::{bounded_price, PriceOracle};
