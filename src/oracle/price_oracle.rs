//! Dual-source price oracle.
//!
//! Combines two independent valuations of a nominal unit:
//! - the external feed's collateral/settlement price, normalized to protocol
//!   decimals, and
//! - the intrinsic backing price, `floor(vault backing * unit / supply)` —
//!   what the burn vault would pay per nominal unit of BTT.
//!
//! The usable price is the minimum of the two, so inflating either source
//! alone cannot inflate borrowable value. Every query recomputes from current
//! chain state; nothing is cached.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::ledger::address::Address;
use crate::ledger::registry::Ledger;
use crate::oracle::feed::SettlementFeed;
use crate::utils::constants::{MAX_FEED_AGE_SECS, PRICE_DECIMALS, UNIT};
use crate::utils::math::{mul_div, normalize_decimals};
use crate::utils::validation::validate_address;

// ═══════════════════════════════════════════════════════════════════════════════
// PRICE COMBINATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Bound a valuation by the worse of two independent sources
pub fn bounded_price(feed_price: u64, intrinsic_price: u64) -> u64 {
    feed_price.min(intrinsic_price)
}

// ═══════════════════════════════════════════════════════════════════════════════
// PRICE ORACLE
// ═══════════════════════════════════════════════════════════════════════════════

/// Manipulation-resistant valuation of the native token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceOracle {
    /// Native token asset
    native: Address,
    /// Collateral asset backing the vault
    collateral: Address,
    /// Address of the burn vault whose backing is read
    vault: Address,
    /// Base units per nominal unit quoted by the oracle
    unit_size: u64,
}

impl PriceOracle {
    /// Create a new oracle. Rejects zero addresses and a zero unit size.
    pub fn new(native: Address, collateral: Address, vault: Address, unit_size: u64) -> Result<Self> {
        let native = validate_address(native, "BTT")?;
        let collateral = validate_address(collateral, "collateral")?;
        let vault = validate_address(vault, "burn vault")?;
        if unit_size == 0 {
            return Err(Error::ZeroAmount);
        }

        Ok(Self { native, collateral, vault, unit_size })
    }

    /// Create with the default nominal unit (one whole token)
    pub fn with_default_unit(native: Address, collateral: Address, vault: Address) -> Result<Self> {
        Self::new(native, collateral, vault, UNIT)
    }

    /// Nominal unit size this oracle quotes against
    pub fn unit_size(&self) -> u64 {
        self.unit_size
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // QUERIES
    // ═══════════════════════════════════════════════════════════════════════════

    /// Settlement value of one nominal unit, bounded by the worse source.
    ///
    /// Fails closed: a non-positive or stale feed reading aborts any
    /// price-dependent operation rather than falling back to old data.
    pub fn price(&self, ledger: &Ledger, feed: &dyn SettlementFeed, now: u64) -> Result<u64> {
        let feed_price = self.feed_price(feed, now)?;
        let intrinsic = self.intrinsic_price(ledger)?;

        let price = bounded_price(feed_price, intrinsic);
        tracing::debug!(feed_price, intrinsic, price, "oracle price computed");
        Ok(price)
    }

    /// Validated, normalized external feed reading
    pub fn feed_price(&self, feed: &dyn SettlementFeed, now: u64) -> Result<u64> {
        let (value, timestamp) = feed.latest_price();
        if value <= 0 {
            return Err(Error::OracleUnavailable(value));
        }

        let age = now.saturating_sub(timestamp);
        if age > MAX_FEED_AGE_SECS {
            return Err(Error::StaleFeed { age, max_age: MAX_FEED_AGE_SECS });
        }

        // A reading that normalizes to zero carries no usable price
        let normalized = normalize_decimals(value as u64, feed.decimals(), PRICE_DECIMALS)?;
        if normalized == 0 {
            return Err(Error::OracleUnavailable(value));
        }
        Ok(normalized)
    }

    /// Intrinsic backing per nominal unit:
    /// `floor(collateral.balance_of(vault) * unit_size / native.total_supply())`
    pub fn intrinsic_price(&self, ledger: &Ledger) -> Result<u64> {
        let supply = ledger.total_supply(self.native)?;
        if supply == 0 {
            return Err(Error::ZeroSupply);
        }

        let backing = ledger.balance_of(self.collateral, self.vault)?;
        mul_div(backing, self.unit_size, supply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::token::Token;
    use crate::oracle::feed::StaticFeed;
    use crate::utils::constants::MAX_FEED_AGE_SECS;

    fn setup(backing: u64, supply: u64) -> (Ledger, PriceOracle) {
        let btt = Address::from_label("btt");
        let wbtc = Address::from_label("wbtc");
        let vault = Address::from_label("vault");
        let deployer = Address::from_label("deployer");

        let mut ledger = Ledger::new();
        ledger
            .register(btt, Token::with_supply("BetterToken", "BTT", deployer, supply))
            .unwrap();
        let mut collateral = Token::new("Wrapped Bitcoin", "WBTC");
        if backing > 0 {
            collateral.mint(vault, backing).unwrap();
        }
        ledger.register(wbtc, collateral).unwrap();

        let oracle = PriceOracle::with_default_unit(btt, wbtc, vault).unwrap();
        (ledger, oracle)
    }

    #[test]
    fn test_bounded_price_is_minimum() {
        assert_eq!(bounded_price(35, 20), 20);
        assert_eq!(bounded_price(20, 35), 20);
        assert_eq!(bounded_price(7, 7), 7);
    }

    #[test]
    fn test_constructor_rejects_zero_inputs() {
        let a = Address::from_label("a");
        assert!(PriceOracle::new(Address::zero(), a, a, UNIT).is_err());
        assert!(PriceOracle::new(a, Address::zero(), a, UNIT).is_err());
        assert!(PriceOracle::new(a, a, Address::zero(), UNIT).is_err());
        assert!(PriceOracle::new(a, a, a, 0).is_err());
    }

    #[test]
    fn test_intrinsic_price() {
        // 50 backing units over 100 supply units: 0.5 collateral per token
        let (ledger, oracle) = setup(50 * UNIT, 100 * UNIT);
        assert_eq!(oracle.intrinsic_price(&ledger).unwrap(), UNIT / 2);
    }

    #[test]
    fn test_intrinsic_price_zero_supply() {
        let (ledger, oracle) = setup(50 * UNIT, 0);
        assert_eq!(oracle.intrinsic_price(&ledger), Err(Error::ZeroSupply));
    }

    #[test]
    fn test_price_takes_worse_source() {
        let (ledger, oracle) = setup(50 * UNIT, 100 * UNIT);

        // Feed says 2.0, intrinsic says 0.5: intrinsic wins
        let feed = StaticFeed::new(2, 1000, 0);
        assert_eq!(oracle.price(&ledger, &feed, 1000).unwrap(), UNIT / 2);

        // Feed says 0.1 (one decimal, value 1), intrinsic says 0.5: feed wins
        let feed = StaticFeed::new(1, 1000, 1);
        assert_eq!(oracle.price(&ledger, &feed, 1000).unwrap(), UNIT / 10);
    }

    #[test]
    fn test_feed_failures_close_the_oracle() {
        let (ledger, oracle) = setup(50 * UNIT, 100 * UNIT);

        let feed = StaticFeed::new(0, 1000, 0);
        assert_eq!(oracle.price(&ledger, &feed, 1000), Err(Error::OracleUnavailable(0)));

        let feed = StaticFeed::new(-5, 1000, 0);
        assert_eq!(oracle.price(&ledger, &feed, 1000), Err(Error::OracleUnavailable(-5)));

        let feed = StaticFeed::new(2, 1000, 0);
        let now = 1000 + MAX_FEED_AGE_SECS + 1;
        assert!(matches!(
            oracle.price(&ledger, &feed, now),
            Err(Error::StaleFeed { .. })
        ));
    }

    #[test]
    fn test_outlandish_feed_decimals_fail_closed() {
        let (ledger, oracle) = setup(50 * UNIT, 100 * UNIT);

        // 40 fractional digits scale down past u64; the reading is unusable
        let feed = StaticFeed::new(2, 1000, 40);
        assert_eq!(
            oracle.price(&ledger, &feed, 1000),
            Err(Error::OracleUnavailable(2))
        );

        // A huge value at low decimals overflows the up-scale instead
        let feed = StaticFeed::new(i64::MAX, 1000, 0);
        assert!(matches!(
            oracle.price(&ledger, &feed, 1000),
            Err(Error::Overflow { .. })
        ));
    }

    #[test]
    fn test_feed_fresh_at_staleness_boundary() {
        let (ledger, oracle) = setup(50 * UNIT, 100 * UNIT);
        let feed = StaticFeed::new(2, 1000, 0);
        assert!(oracle.price(&ledger, &feed, 1000 + MAX_FEED_AGE_SECS).is_ok());
    }

    #[test]
    fn test_no_caching_between_calls() {
        let (mut ledger, oracle) = setup(50 * UNIT, 100 * UNIT);
        let feed = StaticFeed::new(100, 1000, 0);

        assert_eq!(oracle.price(&ledger, &feed, 1000).unwrap(), UNIT / 2);

        // Drain half the vault backing; the next query sees it immediately
        let wbtc = Address::from_label("wbtc");
        let vault = Address::from_label("vault");
        let sink = Address::from_label("sink");
        ledger.transfer(wbtc, vault, sink, 25 * UNIT).unwrap();

        assert_eq!(oracle.price(&ledger, &feed, 1000).unwrap(), UNIT / 4);
    }
}
