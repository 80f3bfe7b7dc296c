//! Exchange market: owner-operated fixed-rate swaps.
//!
//! The market quotes the native token against a settlement asset at an
//! owner-set rate of `rate` settlement base units per 100 native base units,
//! with a per-mille fee charged on sell proceeds. It is a dealer desk, not an
//! AMM: the owner stocks both inventories, users trade against them, and the
//! user-paid side of every trade goes straight to the owner's account rather
//! than into the market.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::ledger::address::Address;
use crate::ledger::registry::Ledger;
use crate::utils::math::{apply_fee, buy_output, sell_gross};
use crate::utils::validation::{validate_address, validate_fee, validate_rate};

// ═══════════════════════════════════════════════════════════════════════════════
// EVENTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Record of a market trade
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketEvent {
    /// User bought native tokens with settlement
    UserBought {
        user: Address,
        settlement_in: u64,
        native_out: u64,
    },
    /// User sold native tokens for settlement
    UserSold {
        user: Address,
        native_in: u64,
        settlement_out: u64,
    },
}

// ═══════════════════════════════════════════════════════════════════════════════
// EXCHANGE MARKET
// ═══════════════════════════════════════════════════════════════════════════════

/// Owner-gated swap desk for the native token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeMarket {
    /// Market's own account, holding the tradeable inventories
    address: Address,
    /// Account allowed to set parameters and sweep inventory
    owner: Address,
    /// Native token asset
    native: Address,
    /// Settlement asset
    settlement: Address,
    /// Settlement base units per 100 native base units
    rate: u64,
    /// Per-mille fee on sell proceeds
    fee: u64,
    /// Recent events
    events: Vec<MarketEvent>,
    /// Maximum events to keep
    max_events: usize,
}

impl ExchangeMarket {
    /// Create a new market with initial parameters
    pub fn new(
        address: Address,
        owner: Address,
        native: Address,
        settlement: Address,
        rate: u64,
        fee: u64,
    ) -> Result<Self> {
        let address = validate_address(address, "market")?;
        let owner = validate_address(owner, "owner")?;
        let native = validate_address(native, "BTT")?;
        let settlement = validate_address(settlement, "settlement")?;
        validate_rate(rate)?;
        validate_fee(fee)?;

        Ok(Self {
            address,
            owner,
            native,
            settlement,
            rate,
            fee,
            events: Vec::new(),
            max_events: 1000,
        })
    }

    /// Market account address
    pub fn address(&self) -> Address {
        self.address
    }

    /// Current owner
    pub fn owner(&self) -> Address {
        self.owner
    }

    /// Current rate (settlement per 100 native)
    pub fn rate(&self) -> u64 {
        self.rate
    }

    /// Current per-mille fee
    pub fn fee(&self) -> u64 {
        self.fee
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // OWNER OPERATIONS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Set the exchange rate. Owner only; zero rejected.
    pub fn set_rate(&mut self, caller: Address, rate: u64) -> Result<()> {
        self.require_owner(caller)?;
        validate_rate(rate)?;

        tracing::debug!(old = self.rate, new = rate, "rate updated");
        self.rate = rate;
        Ok(())
    }

    /// Set the per-mille sell fee. Owner only; bounded at 1000.
    pub fn set_fee(&mut self, caller: Address, fee: u64) -> Result<()> {
        self.require_owner(caller)?;
        validate_fee(fee)?;

        tracing::debug!(old = self.fee, new = fee, "fee updated");
        self.fee = fee;
        Ok(())
    }

    /// Hand the market to a new owner. Owner only; zero address rejected.
    pub fn transfer_ownership(&mut self, caller: Address, new_owner: Address) -> Result<()> {
        self.require_owner(caller)?;
        let new_owner = validate_address(new_owner, "new owner")?;

        tracing::debug!(old = %self.owner, new = %new_owner, "ownership transferred");
        self.owner = new_owner;
        Ok(())
    }

    /// Sweep both inventories to the owner. Owner only. Zero balances are
    /// skipped rather than rejected.
    pub fn withdraw_all(&mut self, ledger: &mut Ledger, caller: Address) -> Result<()> {
        self.require_owner(caller)?;

        let native_held = ledger.balance_of(self.native, self.address)?;
        if native_held > 0 {
            ledger.transfer(self.native, self.address, self.owner, native_held)?;
        }
        let settlement_held = ledger.balance_of(self.settlement, self.address)?;
        if settlement_held > 0 {
            ledger.transfer(self.settlement, self.address, self.owner, settlement_held)?;
        }

        tracing::debug!(native_held, settlement_held, "inventory swept to owner");
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // TRADES
    // ═══════════════════════════════════════════════════════════════════════════

    /// Buy native tokens with `settlement_in` settlement units.
    /// Payment goes to the owner; native comes from market inventory.
    pub fn buy(
        &mut self,
        ledger: &mut Ledger,
        caller: Address,
        settlement_in: u64,
    ) -> Result<MarketEvent> {
        // Zero input is just the degenerate zero-output trade
        let native_out = buy_output(settlement_in, self.rate)?;
        if native_out == 0 {
            return Err(Error::AmountTooSmall);
        }

        let paid = ledger.balance_of(self.settlement, caller)?;
        if paid < settlement_in {
            return Err(Error::InsufficientCallerBalance {
                required: settlement_in,
                available: paid,
            });
        }
        let inventory = ledger.balance_of(self.native, self.address)?;
        if inventory < native_out {
            return Err(Error::InsufficientInventory {
                required: native_out,
                available: inventory,
            });
        }

        ledger.transfer(self.settlement, caller, self.owner, settlement_in)?;
        ledger.transfer(self.native, self.address, caller, native_out)?;

        let event = MarketEvent::UserBought {
            user: caller,
            settlement_in,
            native_out,
        };
        tracing::debug!(user = %caller, settlement_in, native_out, "buy executed");
        self.add_event(event.clone());
        Ok(event)
    }

    /// Sell `native_in` native tokens for settlement, net of fee.
    /// The native goes to the owner; settlement comes from market inventory.
    pub fn sell(
        &mut self,
        ledger: &mut Ledger,
        caller: Address,
        native_in: u64,
    ) -> Result<MarketEvent> {
        let gross = sell_gross(native_in, self.rate)?;
        let settlement_out = apply_fee(gross, self.fee)?;
        if settlement_out == 0 {
            return Err(Error::AmountTooSmall);
        }

        let held = ledger.balance_of(self.native, caller)?;
        if held < native_in {
            return Err(Error::InsufficientCallerBalance {
                required: native_in,
                available: held,
            });
        }
        let inventory = ledger.balance_of(self.settlement, self.address)?;
        if inventory < settlement_out {
            return Err(Error::InsufficientInventory {
                required: settlement_out,
                available: inventory,
            });
        }

        ledger.transfer(self.native, caller, self.owner, native_in)?;
        ledger.transfer(self.settlement, self.address, caller, settlement_out)?;

        let event = MarketEvent::UserSold {
            user: caller,
            native_in,
            settlement_out,
        };
        tracing::debug!(user = %caller, native_in, settlement_out, "sell executed");
        self.add_event(event.clone());
        Ok(event)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // EVENTS / SERIALIZATION
    // ═══════════════════════════════════════════════════════════════════════════

    /// Recent trade events
    pub fn recent_events(&self) -> &[MarketEvent] {
        &self.events
    }

    fn require_owner(&self, caller: Address) -> Result<()> {
        if caller != self.owner {
            tracing::warn!(caller = %caller, "unauthorized market call");
            return Err(Error::Unauthorized(caller));
        }
        Ok(())
    }

    /// Add an event (with pruning)
    fn add_event(&mut self, event: MarketEvent) {
        self.events.push(event);

        if self.events.len() > self.max_events {
            self.events.drain(0..self.events.len() - self.max_events);
        }
    }

    /// Serialize to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Deserialize from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        bincode::deserialize(bytes).map_err(|e| Error::Deserialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::token::Token;
    use crate::utils::constants::{DEFAULT_FEE, DEFAULT_RATE, UNIT};

    struct Fixture {
        ledger: Ledger,
        market: ExchangeMarket,
        owner: Address,
        alice: Address,
        btt: Address,
        usd: Address,
    }

    fn setup() -> Fixture {
        let btt = Address::from_label("btt");
        let usd = Address::from_label("usd");
        let market_addr = Address::from_label("market");
        let owner = Address::from_label("owner");
        let alice = Address::from_label("alice");

        let mut ledger = Ledger::new();
        let mut native = Token::new("BetterToken", "BTT");
        native.mint(market_addr, 1_000 * UNIT).unwrap();
        native.mint(alice, 1_000 * UNIT).unwrap();
        ledger.register(btt, native).unwrap();

        let mut settlement = Token::new("Dollar", "USD");
        settlement.mint(market_addr, 1_000 * UNIT).unwrap();
        settlement.mint(alice, 1_000 * UNIT).unwrap();
        ledger.register(usd, settlement).unwrap();

        let market =
            ExchangeMarket::new(market_addr, owner, btt, usd, DEFAULT_RATE, DEFAULT_FEE).unwrap();

        Fixture { ledger, market, owner, alice, btt, usd }
    }

    #[test]
    fn test_constructor_validation() {
        let a = Address::from_label("a");
        assert!(ExchangeMarket::new(Address::zero(), a, a, a, 35, 10).is_err());
        assert_eq!(
            ExchangeMarket::new(a, a, a, a, 0, 10).unwrap_err(),
            Error::InvalidRate
        );
        assert_eq!(
            ExchangeMarket::new(a, a, a, a, 35, 1001).unwrap_err(),
            Error::FeeTooHigh(1001)
        );
        // Fee of exactly 1000 is the permitted maximum
        assert!(ExchangeMarket::new(a, a, a, a, 35, 1000).is_ok());
    }

    #[test]
    fn test_owner_gating() {
        let mut f = setup();
        assert_eq!(f.market.set_rate(f.alice, 50), Err(Error::Unauthorized(f.alice)));
        assert_eq!(f.market.set_fee(f.alice, 5), Err(Error::Unauthorized(f.alice)));
        assert_eq!(
            f.market.withdraw_all(&mut f.ledger, f.alice),
            Err(Error::Unauthorized(f.alice))
        );

        f.market.set_rate(f.owner, 50).unwrap();
        assert_eq!(f.market.rate(), 50);
        f.market.set_fee(f.owner, 5).unwrap();
        assert_eq!(f.market.fee(), 5);
    }

    #[test]
    fn test_parameter_boundaries() {
        let mut f = setup();
        assert_eq!(f.market.set_rate(f.owner, 0), Err(Error::InvalidRate));
        assert!(f.market.set_rate(f.owner, 1).is_ok());
        assert!(f.market.set_fee(f.owner, 1000).is_ok());
        assert_eq!(f.market.set_fee(f.owner, 1001), Err(Error::FeeTooHigh(1001)));
    }

    #[test]
    fn test_transfer_ownership() {
        let mut f = setup();
        let bob = Address::from_label("bob");
        assert_eq!(
            f.market.transfer_ownership(f.alice, bob),
            Err(Error::Unauthorized(f.alice))
        );
        assert!(matches!(
            f.market.transfer_ownership(f.owner, Address::zero()),
            Err(Error::ZeroAddress(_))
        ));

        f.market.transfer_ownership(f.owner, bob).unwrap();
        assert_eq!(f.market.owner(), bob);
        // Previous owner loses access
        assert_eq!(f.market.set_rate(f.owner, 40), Err(Error::Unauthorized(f.owner)));
        assert!(f.market.set_rate(bob, 40).is_ok());
    }

    #[test]
    fn test_buy_pays_owner_directly() {
        let mut f = setup();

        // rate 35: 35 settlement buys 100 native
        let event = f.market.buy(&mut f.ledger, f.alice, 35).unwrap();
        assert_eq!(
            event,
            MarketEvent::UserBought { user: f.alice, settlement_in: 35, native_out: 100 }
        );

        assert_eq!(f.ledger.balance_of(f.usd, f.owner).unwrap(), 35);
        assert_eq!(f.ledger.balance_of(f.btt, f.alice).unwrap(), 1_000 * UNIT + 100);
        // Market settlement inventory untouched by buys
        let market_addr = f.market.address();
        assert_eq!(f.ledger.balance_of(f.usd, market_addr).unwrap(), 1_000 * UNIT);
        assert_eq!(f.ledger.balance_of(f.btt, market_addr).unwrap(), 1_000 * UNIT - 100);
    }

    #[test]
    fn test_sell_applies_fee() {
        let mut f = setup();

        // rate 35, fee 10: 100 native grosses 35, nets 34
        let event = f.market.sell(&mut f.ledger, f.alice, 100).unwrap();
        assert_eq!(
            event,
            MarketEvent::UserSold { user: f.alice, native_in: 100, settlement_out: 34 }
        );

        assert_eq!(f.ledger.balance_of(f.btt, f.owner).unwrap(), 100);
        assert_eq!(f.ledger.balance_of(f.usd, f.alice).unwrap(), 1_000 * UNIT + 34);
    }

    #[test]
    fn test_dust_trades_rejected() {
        let mut f = setup();
        // Zero input is the degenerate zero-output case
        assert_eq!(f.market.buy(&mut f.ledger, f.alice, 0), Err(Error::AmountTooSmall));
        assert_eq!(f.market.sell(&mut f.ledger, f.alice, 0), Err(Error::AmountTooSmall));
        // 1 native grosses floor(35/100) = 0
        assert_eq!(f.market.sell(&mut f.ledger, f.alice, 1), Err(Error::AmountTooSmall));
    }

    #[test]
    fn test_insufficient_funds_and_inventory() {
        let mut f = setup();
        let pauper = Address::from_label("pauper");
        assert!(matches!(
            f.market.buy(&mut f.ledger, pauper, 35),
            Err(Error::InsufficientCallerBalance { .. })
        ));
        assert!(matches!(
            f.market.sell(&mut f.ledger, pauper, 100),
            Err(Error::InsufficientCallerBalance { .. })
        ));

        // More than the market's native inventory
        let whale = Address::from_label("whale");
        f.ledger.token_mut(f.usd).unwrap().mint(whale, 10_000 * UNIT).unwrap();
        assert!(matches!(
            f.market.buy(&mut f.ledger, whale, 1_000 * UNIT),
            Err(Error::InsufficientInventory { .. })
        ));
    }

    #[test]
    fn test_failed_trade_leaves_no_residue() {
        let mut f = setup();
        let before = f.ledger.to_bytes().unwrap();
        let _ = f.market.sell(&mut f.ledger, f.alice, 1);
        assert_eq!(f.ledger.to_bytes().unwrap(), before);
    }

    #[test]
    fn test_withdraw_all_sweeps_both_inventories() {
        let mut f = setup();
        let market_addr = f.market.address();

        f.market.withdraw_all(&mut f.ledger, f.owner).unwrap();
        assert_eq!(f.ledger.balance_of(f.btt, market_addr).unwrap(), 0);
        assert_eq!(f.ledger.balance_of(f.usd, market_addr).unwrap(), 0);
        assert_eq!(f.ledger.balance_of(f.btt, f.owner).unwrap(), 1_000 * UNIT);
        assert_eq!(f.ledger.balance_of(f.usd, f.owner).unwrap(), 1_000 * UNIT);

        // Second sweep on empty inventories succeeds as a no-op
        assert!(f.market.withdraw_all(&mut f.ledger, f.owner).is_ok());
    }

    #[test]
    fn test_events_recorded() {
        let mut f = setup();
        f.market.buy(&mut f.ledger, f.alice, 35).unwrap();
        f.market.sell(&mut f.ledger, f.alice, 100).unwrap();
        assert_eq!(f.market.recent_events().len(), 2);
    }
}
