//! Input validation for constructor and operation parameters.
//!
//! Validation happens before any state exists or changes: a failed check
//! leaves no partial construction and no ledger mutation.

use crate::error::{Error, Result};
use crate::ledger::address::Address;
use crate::utils::constants::{FEE_DIVISOR, RATIO_PRECISION};

// ═══════════════════════════════════════════════════════════════════════════════
// ADDRESS VALIDATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Reject the zero address for a required reference
pub fn validate_address(addr: Address, name: &'static str) -> Result<Address> {
    if addr.is_zero() {
        return Err(Error::ZeroAddress(name));
    }
    Ok(addr)
}

// ═══════════════════════════════════════════════════════════════════════════════
// AMOUNT VALIDATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Validate that an amount is non-zero
pub fn validate_non_zero(amount: u64) -> Result<u64> {
    if amount == 0 {
        return Err(Error::ZeroAmount);
    }
    Ok(amount)
}

// ═══════════════════════════════════════════════════════════════════════════════
// PARAMETER VALIDATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Validate an exchange rate
pub fn validate_rate(rate: u64) -> Result<u64> {
    if rate == 0 {
        return Err(Error::InvalidRate);
    }
    Ok(rate)
}

/// Validate a per-mille fee
pub fn validate_fee(fee: u64) -> Result<u64> {
    if fee > FEE_DIVISOR {
        return Err(Error::FeeTooHigh(fee));
    }
    Ok(fee)
}

/// Validate loan ratio bounds: 0 <= min <= max <= 100
pub fn validate_ratio_bounds(min: u64, max: u64) -> Result<(u64, u64)> {
    if min > max || max > RATIO_PRECISION {
        return Err(Error::InvalidRatioBounds { min, max });
    }
    Ok((min, max))
}
