//! External settlement price feed.
//!
//! The protocol consumes the feed through two calls: `latest_price` returning
//! the raw value with its update timestamp, and `decimals` describing the
//! value's scale. Anything behind that interface (aggregator network, push
//! oracle, test fixture) is outside the protocol.

use serde::{Deserialize, Serialize};

/// Interface to the external collateral/settlement price feed
pub trait SettlementFeed {
    /// Latest reported price and its unix-second timestamp
    fn latest_price(&self) -> (i64, u64);

    /// Decimal scale of reported values
    fn decimals(&self) -> u8;
}

/// Fixed-value feed for tests and local deployments
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaticFeed {
    value: i64,
    timestamp: u64,
    decimals: u8,
}

impl StaticFeed {
    /// Create a feed reporting `value` at `timestamp`
    pub fn new(value: i64, timestamp: u64, decimals: u8) -> Self {
        Self { value, timestamp, decimals }
    }

    /// Replace the reported value and timestamp
    pub fn set_price(&mut self, value: i64, timestamp: u64) {
        self.value = value;
        self.timestamp = timestamp;
    }
}

impl SettlementFeed for StaticFeed {
    fn latest_price(&self) -> (i64, u64) {
        (self.value, self.timestamp)
    }

    fn decimals(&self) -> u8 {
        self.decimals
    }
}
