//! # BTT Protocol
//!
//! The economic core of the BTT token economy: a collateral-backed token with
//! proportional redemption, an owner-operated exchange market, and
//! oracle-priced collateralized loans.
//!
//! ## Architecture
//!
//! - **Ledger**: Addresses, fungible-asset balances, and the asset registry
//! - **Core**: BurnVault, ExchangeMarket, and LoanProtocol components
//! - **Oracle**: Settlement feeds and the bounded dual-source price oracle
//! - **Utils**: Floor-biased fixed-point math and parameter validation
//!
//! All state lives in an in-process [`Ledger`](ledger::Ledger); components are
//! plain values holding asset addresses, and every operation is a synchronous
//! call that either fully commits or returns an [`Error`](error::Error) with
//! no residual state change.
//!
//! ## Example
//!
//! ```rust,ignore
//! use btt_protocol::prelude::*;
//!
//! let mut vault = BurnVault::new(vault_addr, btt, collateral)?;
//! let receipt = vault.backing_withdraw(&mut ledger, caller, amount)?;
//! ```

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    trivial_casts,
    unused_lifetimes,
    unused_qualifications
)]

pub mod core;
pub mod error;
pub mod ledger;
pub mod oracle;
pub mod utils;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::core::{
        burn_vault::{BurnMade, BurnVault},
        loan::{LoanEvent, LoanProtocol, Position, PositionState},
        market::{ExchangeMarket, MarketEvent},
    };
    pub use crate::error::{Error, Result};
    pub use crate::ledger::{address::Address, registry::Ledger, token::Token};
    pub use crate::oracle::{
        feed::{SettlementFeed, StaticFeed},
        price_oracle::PriceOracle,
    };
    pub use crate::utils::constants::{
        DEFAULT_FEE, DEFAULT_RATE, DEFAULT_RATIO_MAX, DEFAULT_RATIO_MIN, UNIT,
    };
}

/// Protocol version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Protocol name
pub const PROTOCOL_NAME: &str = "BTT";
