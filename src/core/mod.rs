//! Core module: the three economic components of the BTT protocol

pub mod burn_vault;
pub mod loan;
pub mod market;

pub use burn_vault::{BurnMade, BurnVault};
pub use loan::{LoanEvent, LoanProtocol, Position, PositionState};
pub use market::{ExchangeMarket, MarketEvent};
