//! Fungible-asset ledger.
//!
//! A `Token` is the balance/allowance bookkeeping each asset in the economy
//! relies on: the native BTT token, the collateral asset and the settlement
//! asset are all instances of it. Protocol components consume it only through
//! the narrow interface below: `balance_of`, `total_supply`, `transfer`,
//! `transfer_from`, `approve`, `burn`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::ledger::address::Address;
use crate::utils::constants::TOKEN_DECIMALS;
use crate::utils::math::safe_add;

// ═══════════════════════════════════════════════════════════════════════════════
// TOKEN
// ═══════════════════════════════════════════════════════════════════════════════

/// A fungible token ledger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    /// Token name
    pub name: String,
    /// Token symbol
    pub symbol: String,
    /// Decimal places
    pub decimals: u8,
    /// Total supply in base units
    total_supply: u64,
    /// Balances by address
    balances: HashMap<Address, u64>,
    /// Allowances by (owner, spender)
    allowances: HashMap<(Address, Address), u64>,
}

impl Token {
    /// Create a new token with zero supply
    pub fn new(name: &str, symbol: &str) -> Self {
        Self {
            name: name.to_string(),
            symbol: symbol.to_string(),
            decimals: TOKEN_DECIMALS,
            total_supply: 0,
            balances: HashMap::new(),
            allowances: HashMap::new(),
        }
    }

    /// Create a token with a fixed supply credited to `holder` at genesis
    pub fn with_supply(name: &str, symbol: &str, holder: Address, supply: u64) -> Self {
        let mut token = Self::new(name, symbol);
        token.total_supply = supply;
        if supply > 0 {
            token.balances.insert(holder, supply);
        }
        token
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // QUERIES
    // ═══════════════════════════════════════════════════════════════════════════

    /// Get total supply
    pub fn total_supply(&self) -> u64 {
        self.total_supply
    }

    /// Get balance of an address
    pub fn balance_of(&self, owner: Address) -> u64 {
        self.balances.get(&owner).copied().unwrap_or(0)
    }

    /// Get the approved spending amount for (owner, spender)
    pub fn allowance(&self, owner: Address, spender: Address) -> u64 {
        self.allowances.get(&(owner, spender)).copied().unwrap_or(0)
    }

    /// Get number of token holders
    pub fn holder_count(&self) -> usize {
        self.balances.len()
    }

    /// Verify supply invariant (total_supply == sum of all balances)
    pub fn verify_supply_invariant(&self) -> bool {
        let sum: u128 = self.balances.values().map(|b| *b as u128).sum();
        sum == self.total_supply as u128
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // TRANSFER AND APPROVAL
    // ═══════════════════════════════════════════════════════════════════════════

    /// Transfer tokens between accounts
    pub fn transfer(&mut self, from: Address, to: Address, amount: u64) -> Result<()> {
        if amount == 0 {
            return Err(Error::ZeroAmount);
        }

        let from_balance = self.balance_of(from);
        if from_balance < amount {
            return Err(Error::InsufficientCallerBalance {
                required: amount,
                available: from_balance,
            });
        }

        // Sufficiency is checked even for the no-op self-transfer
        if from == to {
            return Ok(());
        }

        self.debit(from, from_balance - amount);

        let to_balance = safe_add(self.balance_of(to), amount)?;
        self.balances.insert(to, to_balance);

        Ok(())
    }

    /// Approve a spender to pull up to `amount` from `owner`
    pub fn approve(&mut self, owner: Address, spender: Address, amount: u64) {
        if amount == 0 {
            self.allowances.remove(&(owner, spender));
        } else {
            self.allowances.insert((owner, spender), amount);
        }
    }

    /// Transfer on behalf of `owner`, consuming `spender`'s allowance
    pub fn transfer_from(
        &mut self,
        spender: Address,
        owner: Address,
        to: Address,
        amount: u64,
    ) -> Result<()> {
        self.spend_allowance(owner, spender, amount)?;
        self.transfer(owner, to, amount)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // SUPPLY MANAGEMENT
    // ═══════════════════════════════════════════════════════════════════════════

    /// Mint new tokens (deployment wiring only; no CORE component mints)
    pub fn mint(&mut self, to: Address, amount: u64) -> Result<()> {
        if amount == 0 {
            return Err(Error::ZeroAmount);
        }

        self.total_supply = safe_add(self.total_supply, amount)?;
        let new_balance = safe_add(self.balance_of(to), amount)?;
        self.balances.insert(to, new_balance);
        Ok(())
    }

    /// Burn tokens from `from`, reducing total supply
    pub fn burn(&mut self, from: Address, amount: u64) -> Result<()> {
        if amount == 0 {
            return Err(Error::ZeroAmount);
        }

        let balance = self.balance_of(from);
        if balance < amount {
            return Err(Error::InsufficientCallerBalance {
                required: amount,
                available: balance,
            });
        }

        self.debit(from, balance - amount);
        self.total_supply -= amount;
        Ok(())
    }

    /// Burn on behalf of `owner`, consuming `spender`'s allowance
    pub fn burn_from(&mut self, spender: Address, owner: Address, amount: u64) -> Result<()> {
        self.spend_allowance(owner, spender, amount)?;
        self.burn(owner, amount)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // INTERNAL
    // ═══════════════════════════════════════════════════════════════════════════

    /// Set a balance, pruning zero entries
    fn debit(&mut self, owner: Address, new_balance: u64) {
        if new_balance == 0 {
            self.balances.remove(&owner);
        } else {
            self.balances.insert(owner, new_balance);
        }
    }

    /// Consume allowance, checking sufficiency first
    fn spend_allowance(&mut self, owner: Address, spender: Address, amount: u64) -> Result<()> {
        let allowed = self.allowance(owner, spender);
        if allowed < amount {
            return Err(Error::InsufficientAllowance {
                required: amount,
                available: allowed,
            });
        }
        self.approve(owner, spender, allowed - amount);
        Ok(())
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
    use crate::utils::constants::UNIT;

    fn alice() -> Address {
        Address::from_label("alice")
    }

    fn bob() -> Address {
        Address::from_label("bob")
    }

    #[test]
    fn test_genesis_supply() {
        let token = Token::with_supply("BetterToken", "BTT", alice(), 1000 * UNIT);
        assert_eq!(token.total_supply(), 1000 * UNIT);
        assert_eq!(token.balance_of(alice()), 1000 * UNIT);
        assert_eq!(token.holder_count(), 1);
    }

    #[test]
    fn test_transfer() {
        let mut token = Token::with_supply("BetterToken", "BTT", alice(), 1000);
        token.transfer(alice(), bob(), 300).unwrap();

        assert_eq!(token.balance_of(alice()), 700);
        assert_eq!(token.balance_of(bob()), 300);
        assert_eq!(token.total_supply(), 1000);
    }

    #[test]
    fn test_transfer_insufficient_balance() {
        let mut token = Token::with_supply("BetterToken", "BTT", alice(), 100);
        let result = token.transfer(alice(), bob(), 200);
        assert_eq!(
            result,
            Err(Error::InsufficientCallerBalance { required: 200, available: 100 })
        );
    }

    #[test]
    fn test_self_transfer_checked_like_any_other() {
        let mut token = Token::with_supply("BetterToken", "BTT", alice(), 100);

        // Within balance: a no-op
        token.transfer(alice(), alice(), 60).unwrap();
        assert_eq!(token.balance_of(alice()), 100);

        // Beyond balance: rejected, not silently accepted
        assert_eq!(
            token.transfer(alice(), alice(), 200),
            Err(Error::InsufficientCallerBalance { required: 200, available: 100 })
        );
    }

    #[test]
    fn test_transfer_from_requires_allowance() {
        let mut token = Token::with_supply("USD Tether", "USDT", alice(), 1000);
        let spender = Address::from_label("market");

        assert!(token.transfer_from(spender, alice(), bob(), 100).is_err());

        token.approve(alice(), spender, 150);
        token.transfer_from(spender, alice(), bob(), 100).unwrap();
        assert_eq!(token.balance_of(bob()), 100);
        assert_eq!(token.allowance(alice(), spender), 50);

        // Remaining allowance does not cover a second pull of 100
        assert!(token.transfer_from(spender, alice(), bob(), 100).is_err());
    }

    #[test]
    fn test_burn() {
        let mut token = Token::with_supply("BetterToken", "BTT", alice(), 1000);
        token.burn(alice(), 400).unwrap();

        assert_eq!(token.balance_of(alice()), 600);
        assert_eq!(token.total_supply(), 600);
    }

    #[test]
    fn test_burn_from() {
        let mut token = Token::with_supply("BetterToken", "BTT", alice(), 1000);
        let vault = Address::from_label("vault");

        token.approve(alice(), vault, 500);
        token.burn_from(vault, alice(), 400).unwrap();

        assert_eq!(token.total_supply(), 600);
        assert_eq!(token.allowance(alice(), vault), 100);
    }

    #[test]
    fn test_full_balance_burn_removes_holder() {
        let mut token = Token::with_supply("BetterToken", "BTT", alice(), 100);
        token.burn(alice(), 100).unwrap();
        assert_eq!(token.holder_count(), 0);
        assert_eq!(token.total_supply(), 0);
    }

    #[test]
    fn test_supply_invariant() {
        let mut token = Token::with_supply("BetterToken", "BTT", alice(), 1000);
        token.transfer(alice(), bob(), 250).unwrap();
        token.burn(bob(), 50).unwrap();
        token.mint(alice(), 10).unwrap();

        assert!(token.verify_supply_invariant());
    }

    #[test]
    fn test_bincode_round_trip() {
        let mut token = Token::with_supply("BetterToken", "BTT", alice(), 1000);
        token.transfer(alice(), bob(), 1).unwrap();

        let restored = Token::from_bytes(&token.to_bytes().unwrap()).unwrap();
        assert_eq!(restored.balance_of(bob()), 1);
        assert_eq!(restored.total_supply(), 1000);
    }
}
