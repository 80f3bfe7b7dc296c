//! The ledger: a registry of token instances keyed by asset address.
//!
//! Components hold asset addresses, never token instances; every operation
//! resolves its assets against a `Ledger` passed in by the caller. This keeps
//! the execution model of the chain: one shared, totally-ordered state that a
//! single operation mutates atomically.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::ledger::address::Address;
use crate::ledger::token::Token;

// ═══════════════════════════════════════════════════════════════════════════════
// LEDGER
// ═══════════════════════════════════════════════════════════════════════════════

/// Registry of all token instances in the economy
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ledger {
    tokens: HashMap<Address, Token>,
}

impl Ledger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a token under `asset`
    pub fn register(&mut self, asset: Address, token: Token) -> Result<()> {
        if asset.is_zero() {
            return Err(Error::ZeroAddress("asset"));
        }
        if self.tokens.contains_key(&asset) {
            return Err(Error::AssetAlreadyRegistered(asset));
        }
        self.tokens.insert(asset, token);
        Ok(())
    }

    /// Resolve an asset to its token ledger
    pub fn token(&self, asset: Address) -> Result<&Token> {
        self.tokens.get(&asset).ok_or(Error::UnknownAsset(asset))
    }

    /// Resolve an asset to its mutable token ledger
    pub fn token_mut(&mut self, asset: Address) -> Result<&mut Token> {
        self.tokens.get_mut(&asset).ok_or(Error::UnknownAsset(asset))
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // NARROW ASSET INTERFACE
    // ═══════════════════════════════════════════════════════════════════════════

    /// Balance of `owner` in `asset`
    pub fn balance_of(&self, asset: Address, owner: Address) -> Result<u64> {
        Ok(self.token(asset)?.balance_of(owner))
    }

    /// Total supply of `asset`
    pub fn total_supply(&self, asset: Address) -> Result<u64> {
        Ok(self.token(asset)?.total_supply())
    }

    /// Transfer within `asset`
    pub fn transfer(&mut self, asset: Address, from: Address, to: Address, amount: u64) -> Result<()> {
        self.token_mut(asset)?.transfer(from, to, amount)
    }

    /// Allowance-consuming transfer within `asset`
    pub fn transfer_from(
        &mut self,
        asset: Address,
        spender: Address,
        owner: Address,
        to: Address,
        amount: u64,
    ) -> Result<()> {
        self.token_mut(asset)?.transfer_from(spender, owner, to, amount)
    }

    /// Approve `spender` for `amount` of `owner`'s `asset`
    pub fn approve(&mut self, asset: Address, owner: Address, spender: Address, amount: u64) -> Result<()> {
        self.token_mut(asset)?.approve(owner, spender, amount);
        Ok(())
    }

    /// Burn `owner`'s tokens via `spender`'s allowance
    pub fn burn_from(&mut self, asset: Address, spender: Address, owner: Address, amount: u64) -> Result<()> {
        self.token_mut(asset)?.burn_from(spender, owner, amount)
    }

    /// Verify the supply invariant of every registered token
    pub fn verify_invariants(&self) -> bool {
        self.tokens.values().all(Token::verify_supply_invariant)
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
