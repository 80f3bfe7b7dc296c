//! Loan protocol: ratio-bounded collateralized credit.
//!
//! Borrowers lock native tokens as collateral and draw a settlement-asset
//! principal from protocol inventory. Every position carries a loan ratio,
//! `floor(principal * 100 / collateral_value)`, which must sit inside the
//! protocol's `[ratio_min, ratio_max]` band when the position is opened or
//! its collateral is adjusted. Collateral value is recomputed from the oracle
//! at every state-changing call; a position whose ratio has drifted above
//! `ratio_max` can be liquidated by anyone willing to cover the principal.
//!
//! One position per borrower address. A closed position can be reopened.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::ledger::address::Address;
use crate::ledger::registry::Ledger;
use crate::oracle::feed::SettlementFeed;
use crate::oracle::price_oracle::PriceOracle;
use crate::utils::math::{loan_ratio, mul_div, safe_add, safe_sub};
use crate::utils::validation::{validate_address, validate_non_zero, validate_ratio_bounds};

// ═══════════════════════════════════════════════════════════════════════════════
// POSITIONS
// ═══════════════════════════════════════════════════════════════════════════════

/// Lifecycle state of a credit position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PositionState {
    /// No active loan
    Closed,
    /// Collateral locked, principal outstanding
    Open,
}

/// A single borrower's credit position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// Native tokens locked as collateral
    pub collateral: u64,
    /// Settlement principal outstanding
    pub principal: u64,
    /// Lifecycle state
    pub state: PositionState,
}

// ═══════════════════════════════════════════════════════════════════════════════
// EVENTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Record of a loan operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoanEvent {
    /// A new position was opened
    Opened {
        borrower: Address,
        collateral: u64,
        principal: u64,
        ratio: u64,
    },
    /// Principal was paid down, possibly to zero
    Repaid {
        borrower: Address,
        amount: u64,
        remaining: u64,
    },
    /// Collateral was locked into an open position
    CollateralAdded {
        borrower: Address,
        amount: u64,
        ratio: u64,
    },
    /// Collateral was released from an open position
    CollateralWithdrawn {
        borrower: Address,
        amount: u64,
        ratio: u64,
    },
    /// An underwater position was closed by a third party
    Liquidated {
        borrower: Address,
        liquidator: Address,
        collateral_seized: u64,
        principal_covered: u64,
        ratio: u64,
    },
}

// ═══════════════════════════════════════════════════════════════════════════════
// LOAN PROTOCOL
// ═══════════════════════════════════════════════════════════════════════════════

/// Ratio-bounded lending desk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanProtocol {
    /// Protocol's own account, holding locked collateral and lendable inventory
    address: Address,
    /// Collateral asset (the native token)
    native: Address,
    /// Borrowed asset
    settlement: Address,
    /// Valuation source for the collateral
    oracle: PriceOracle,
    /// Lowest permitted ratio at open or adjust
    ratio_min: u64,
    /// Highest permitted ratio; above this a position is liquidatable
    ratio_max: u64,
    /// One position per borrower
    positions: HashMap<Address, Position>,
    /// Recent events
    events: Vec<LoanEvent>,
    /// Maximum events to keep
    max_events: usize,
}

impl LoanProtocol {
    /// Create a new protocol with the given ratio band
    pub fn new(
        address: Address,
        native: Address,
        settlement: Address,
        oracle: PriceOracle,
        ratio_min: u64,
        ratio_max: u64,
    ) -> Result<Self> {
        let address = validate_address(address, "loan protocol")?;
        let native = validate_address(native, "BTT")?;
        let settlement = validate_address(settlement, "settlement")?;
        validate_ratio_bounds(ratio_min, ratio_max)?;

        Ok(Self {
            address,
            native,
            settlement,
            oracle,
            ratio_min,
            ratio_max,
            positions: HashMap::new(),
            events: Vec::new(),
            max_events: 1000,
        })
    }

    /// Protocol account address
    pub fn address(&self) -> Address {
        self.address
    }

    /// Permitted ratio band
    pub fn ratio_bounds(&self) -> (u64, u64) {
        (self.ratio_min, self.ratio_max)
    }

    /// The borrower's position, if one has ever been opened
    pub fn position_of(&self, borrower: Address) -> Option<&Position> {
        self.positions.get(&borrower)
    }

    /// Current ratio of an open position at live prices
    pub fn current_ratio(
        &self,
        ledger: &Ledger,
        feed: &dyn SettlementFeed,
        now: u64,
        borrower: Address,
    ) -> Result<u64> {
        let position = self.open_position(borrower)?;
        self.ratio_at(ledger, feed, now, position.collateral, position.principal)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // OPERATIONS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Open a loan: lock `collateral_amount` native, draw `borrow_amount`
    /// settlement. The caller must have approved the protocol for the
    /// collateral. The resulting ratio must sit inside the band.
    pub fn open_loan(
        &mut self,
        ledger: &mut Ledger,
        feed: &dyn SettlementFeed,
        now: u64,
        caller: Address,
        collateral_amount: u64,
        borrow_amount: u64,
    ) -> Result<LoanEvent> {
        validate_non_zero(collateral_amount)?;
        validate_non_zero(borrow_amount)?;
        if matches!(self.positions.get(&caller), Some(p) if p.state == PositionState::Open) {
            return Err(Error::PositionAlreadyOpen(caller));
        }

        let ratio = self.ratio_at(ledger, feed, now, collateral_amount, borrow_amount)?;
        if ratio > self.ratio_max {
            return Err(Error::RatioTooHigh { ratio, maximum: self.ratio_max });
        }
        if ratio < self.ratio_min {
            return Err(Error::RatioTooLow { ratio, minimum: self.ratio_min });
        }

        let inventory = ledger.balance_of(self.settlement, self.address)?;
        if inventory < borrow_amount {
            return Err(Error::InsufficientInventory {
                required: borrow_amount,
                available: inventory,
            });
        }

        ledger.transfer_from(self.native, self.address, caller, self.address, collateral_amount)?;
        ledger.transfer(self.settlement, self.address, caller, borrow_amount)?;

        self.positions.insert(
            caller,
            Position {
                collateral: collateral_amount,
                principal: borrow_amount,
                state: PositionState::Open,
            },
        );

        let event = LoanEvent::Opened {
            borrower: caller,
            collateral: collateral_amount,
            principal: borrow_amount,
            ratio,
        };
        tracing::debug!(
            borrower = %caller,
            collateral = collateral_amount,
            principal = borrow_amount,
            ratio,
            "loan opened"
        );
        self.add_event(event.clone());
        Ok(event)
    }

    /// Repay part or all of the principal. Repaying to zero returns the
    /// collateral and closes the position. Overpayment is rejected.
    pub fn repay(
        &mut self,
        ledger: &mut Ledger,
        caller: Address,
        amount: u64,
    ) -> Result<LoanEvent> {
        validate_non_zero(amount)?;
        let position = self.open_position(caller)?;
        if amount > position.principal {
            return Err(Error::Overpayment { amount, principal: position.principal });
        }
        let collateral = position.collateral;
        let remaining = safe_sub(position.principal, amount)?;

        ledger.transfer_from(self.settlement, self.address, caller, self.address, amount)?;

        if remaining == 0 {
            ledger.transfer(self.native, self.address, caller, collateral)?;
            self.positions.insert(
                caller,
                Position { collateral: 0, principal: 0, state: PositionState::Closed },
            );
        } else {
            self.positions.insert(
                caller,
                Position { collateral, principal: remaining, state: PositionState::Open },
            );
        }

        let event = LoanEvent::Repaid { borrower: caller, amount, remaining };
        tracing::debug!(borrower = %caller, amount, remaining, "loan repaid");
        self.add_event(event.clone());
        Ok(event)
    }

    /// Lock additional collateral. The new ratio must stay inside the band.
    pub fn add_collateral(
        &mut self,
        ledger: &mut Ledger,
        feed: &dyn SettlementFeed,
        now: u64,
        caller: Address,
        amount: u64,
    ) -> Result<LoanEvent> {
        validate_non_zero(amount)?;
        let position = self.open_position(caller)?;
        let collateral = safe_add(position.collateral, amount)?;
        let principal = position.principal;

        let ratio = self.ratio_at(ledger, feed, now, collateral, principal)?;
        self.require_in_band(ratio)?;

        ledger.transfer_from(self.native, self.address, caller, self.address, amount)?;
        self.positions.insert(
            caller,
            Position { collateral, principal, state: PositionState::Open },
        );

        let event = LoanEvent::CollateralAdded { borrower: caller, amount, ratio };
        tracing::debug!(borrower = %caller, amount, ratio, "collateral added");
        self.add_event(event.clone());
        Ok(event)
    }

    /// Release part of the collateral. The new ratio must stay inside the band.
    pub fn withdraw_collateral(
        &mut self,
        ledger: &mut Ledger,
        feed: &dyn SettlementFeed,
        now: u64,
        caller: Address,
        amount: u64,
    ) -> Result<LoanEvent> {
        validate_non_zero(amount)?;
        let position = self.open_position(caller)?;
        if amount > position.collateral {
            return Err(Error::InsufficientInventory {
                required: amount,
                available: position.collateral,
            });
        }
        let collateral = safe_sub(position.collateral, amount)?;
        let principal = position.principal;

        let ratio = self.ratio_at(ledger, feed, now, collateral, principal)?;
        self.require_in_band(ratio)?;

        ledger.transfer(self.native, self.address, caller, amount)?;
        self.positions.insert(
            caller,
            Position { collateral, principal, state: PositionState::Open },
        );

        let event = LoanEvent::CollateralWithdrawn { borrower: caller, amount, ratio };
        tracing::debug!(borrower = %caller, amount, ratio, "collateral withdrawn");
        self.add_event(event.clone());
        Ok(event)
    }

    /// Close an underwater position: the liquidator covers the outstanding
    /// principal and takes the collateral. Requires `ratio > ratio_max` at
    /// live prices.
    pub fn liquidate(
        &mut self,
        ledger: &mut Ledger,
        feed: &dyn SettlementFeed,
        now: u64,
        liquidator: Address,
        borrower: Address,
    ) -> Result<LoanEvent> {
        let position = self.open_position(borrower)?;
        let collateral = position.collateral;
        let principal = position.principal;

        let ratio = self.ratio_at(ledger, feed, now, collateral, principal)?;
        if ratio <= self.ratio_max {
            return Err(Error::NotLiquidatable { borrower, ratio });
        }

        ledger.transfer_from(self.settlement, self.address, liquidator, self.address, principal)?;
        ledger.transfer(self.native, self.address, liquidator, collateral)?;
        self.positions.insert(
            borrower,
            Position { collateral: 0, principal: 0, state: PositionState::Closed },
        );

        let event = LoanEvent::Liquidated {
            borrower,
            liquidator,
            collateral_seized: collateral,
            principal_covered: principal,
            ratio,
        };
        tracing::warn!(
            borrower = %borrower,
            liquidator = %liquidator,
            collateral_seized = collateral,
            principal_covered = principal,
            ratio,
            "position liquidated"
        );
        self.add_event(event.clone());
        Ok(event)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // INTERNAL
    // ═══════════════════════════════════════════════════════════════════════════

    /// Ratio a position with these figures would carry at live prices
    fn ratio_at(
        &self,
        ledger: &Ledger,
        feed: &dyn SettlementFeed,
        now: u64,
        collateral: u64,
        principal: u64,
    ) -> Result<u64> {
        let price = self.oracle.price(ledger, feed, now)?;
        let value = mul_div(collateral, price, self.oracle.unit_size())?;
        loan_ratio(principal, value)
    }

    fn require_in_band(&self, ratio: u64) -> Result<()> {
        if ratio < self.ratio_min || ratio > self.ratio_max {
            return Err(Error::RatioViolation {
                ratio,
                min: self.ratio_min,
                max: self.ratio_max,
            });
        }
        Ok(())
    }

    fn open_position(&self, borrower: Address) -> Result<Position> {
        match self.positions.get(&borrower) {
            Some(p) if p.state == PositionState::Open => Ok(*p),
            _ => Err(Error::PositionNotFound(borrower)),
        }
    }

    /// Recent loan events
    pub fn recent_events(&self) -> &[LoanEvent] {
        &self.events
    }

    /// Add an event (with pruning)
    fn add_event(&mut self, event: LoanEvent) {
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
