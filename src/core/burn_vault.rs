//! Burn vault: proportional redemption of the native token.
//!
//! The vault holds a pool of collateral and lets any holder burn native tokens
//! in exchange for a pro-rata share of that pool:
//!
//! `payout = floor(amount_burned * backing / total_supply)`
//!
//! The supply used in the formula is snapshotted before the burn, so a
//! redeemer's own burn never inflates their payout. The vault has no owner and
//! no parameters; anything transferred to its address becomes backing.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::ledger::address::Address;
use crate::ledger::registry::Ledger;
use crate::utils::math::redemption_payout;
use crate::utils::validation::{validate_address, validate_non_zero};

// ═══════════════════════════════════════════════════════════════════════════════
// EVENTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Record of a completed redemption
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BurnMade {
    /// Redeeming account
    pub redeemer: Address,
    /// Native tokens destroyed
    pub amount_burned: u64,
    /// Collateral paid out
    pub payout: u64,
}

// ═══════════════════════════════════════════════════════════════════════════════
// BURN VAULT
// ═══════════════════════════════════════════════════════════════════════════════

/// Proportional-redemption vault
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BurnVault {
    /// Vault's own account
    address: Address,
    /// Native token asset
    native: Address,
    /// Collateral asset held as backing
    collateral: Address,
    /// Recent events
    events: Vec<BurnMade>,
    /// Maximum events to keep
    max_events: usize,
}

impl BurnVault {
    /// Create a new vault. All addresses must be non-zero.
    pub fn new(address: Address, native: Address, collateral: Address) -> Result<Self> {
        let address = validate_address(address, "vault")?;
        let native = validate_address(native, "BTT")?;
        let collateral = validate_address(collateral, "collateral")?;

        Ok(Self {
            address,
            native,
            collateral,
            events: Vec::new(),
            max_events: 1000,
        })
    }

    /// Vault account address
    pub fn address(&self) -> Address {
        self.address
    }

    /// Collateral currently backing the native supply
    pub fn backing(&self, ledger: &Ledger) -> Result<u64> {
        ledger.balance_of(self.collateral, self.address)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // OPERATIONS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Burn `amount` of the caller's native tokens for a pro-rata collateral
    /// payout. The caller must have approved the vault for at least `amount`.
    pub fn backing_withdraw(
        &mut self,
        ledger: &mut Ledger,
        caller: Address,
        amount: u64,
    ) -> Result<BurnMade> {
        validate_non_zero(amount)?;

        // Supply snapshot before the burn
        let supply = ledger.total_supply(self.native)?;
        let backing = ledger.balance_of(self.collateral, self.address)?;
        let payout = redemption_payout(amount, backing, supply)?;
        if payout == 0 {
            return Err(Error::NothingToRedeem);
        }

        // Balance and inventory checks before any mutation
        let held = ledger.balance_of(self.native, caller)?;
        if held < amount {
            return Err(Error::InsufficientCallerBalance {
                required: amount,
                available: held,
            });
        }

        ledger.burn_from(self.native, self.address, caller, amount)?;
        ledger.transfer(self.collateral, self.address, caller, payout)?;

        let event = BurnMade {
            redeemer: caller,
            amount_burned: amount,
            payout,
        };
        tracing::debug!(
            redeemer = %caller,
            amount_burned = amount,
            payout,
            "backing withdrawn"
        );
        self.add_event(event.clone());
        Ok(event)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // EVENTS / SERIALIZATION
    // ═══════════════════════════════════════════════════════════════════════════

    /// Recent redemption events
    pub fn recent_events(&self) -> &[BurnMade] {
        &self.events
    }

    /// Add an event (with pruning)
    fn add_event(&mut self, event: BurnMade) {
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
