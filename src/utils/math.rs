//! Integer fixed-point arithmetic for protocol formulas.
//!
//! Every ratio, fee, price and payout formula in the protocol floors its
//! division, biasing rounding toward the pool. Intermediate products widen to
//! u128 so no valid input can overflow.

use crate::error::{Error, Result};
use crate::utils::constants::{FEE_DIVISOR, RATE_BASE, RATIO_PRECISION};

// ═══════════════════════════════════════════════════════════════════════════════
// SAFE ARITHMETIC OPERATIONS
// ═══════════════════════════════════════════════════════════════════════════════

/// Safe addition with overflow check
pub fn safe_add(a: u64, b: u64) -> Result<u64> {
    a.checked_add(b).ok_or(Error::Overflow {
        operation: format!("{} + {}", a, b),
    })
}

/// Safe subtraction with underflow check
pub fn safe_sub(a: u64, b: u64) -> Result<u64> {
    a.checked_sub(b).ok_or(Error::Overflow {
        operation: format!("{} - {}", a, b),
    })
}

/// Computes floor((a * b) / c) with a u128 intermediate
pub fn mul_div(a: u64, b: u64, c: u64) -> Result<u64> {
    if c == 0 {
        return Err(Error::Overflow {
            operation: format!("({} * {}) / 0", a, b),
        });
    }
    let result = (a as u128) * (b as u128) / (c as u128);
    if result > u64::MAX as u128 {
        return Err(Error::Overflow {
            operation: format!("({} * {}) / {}", a, b, c),
        });
    }
    Ok(result as u64)
}

// ═══════════════════════════════════════════════════════════════════════════════
// PROTOCOL FORMULAS
// ═══════════════════════════════════════════════════════════════════════════════

/// Proportional redemption payout.
///
/// `payout = floor(amount * backing / supply)`. The supply snapshot must be
/// taken before the corresponding burn.
pub fn redemption_payout(amount: u64, backing: u64, supply: u64) -> Result<u64> {
    if supply == 0 {
        return Err(Error::ZeroSupply);
    }
    mul_div(amount, backing, supply)
}

/// Native tokens received for a settlement payment.
///
/// `out = floor(settlement_in * 100 / rate)`
pub fn buy_output(settlement_in: u64, rate: u64) -> Result<u64> {
    mul_div(settlement_in, RATE_BASE, rate)
}

/// Gross settlement value of a native sale, before fee.
///
/// `gross = floor(native_in * rate / 100)`
pub fn sell_gross(native_in: u64, rate: u64) -> Result<u64> {
    mul_div(native_in, rate, RATE_BASE)
}

/// Net amount after deducting a per-mille fee.
///
/// `net = floor(gross * (1000 - fee) / 1000)`
pub fn apply_fee(gross: u64, fee: u64) -> Result<u64> {
    mul_div(gross, FEE_DIVISOR - fee, FEE_DIVISOR)
}

/// Loan-to-value ratio as a whole percentage.
///
/// `ratio = floor(borrowed * 100 / collateral_value)`
pub fn loan_ratio(borrowed: u64, collateral_value: u64) -> Result<u64> {
    if collateral_value == 0 {
        // No collateral value means any debt is infinitely leveraged
        return Ok(u64::MAX);
    }
    mul_div(borrowed, RATIO_PRECISION, collateral_value)
}

/// Normalize a feed value from the feed's decimals to `target_decimals`.
///
/// The decimal gap is unbounded input; the scale factor itself can exceed
/// `u64`, so both directions go through checked powers. Scaling down past
/// the width of `u64` floors to zero.
pub fn normalize_decimals(value: u64, from_decimals: u8, target_decimals: u8) -> Result<u64> {
    if from_decimals == target_decimals {
        return Ok(value);
    }
    if from_decimals < target_decimals {
        let shift = (target_decimals - from_decimals) as u32;
        10u64
            .checked_pow(shift)
            .and_then(|factor| value.checked_mul(factor))
            .ok_or(Error::Overflow {
                operation: format!("{} * 10^{}", value, shift),
            })
    } else {
        let shift = (from_decimals - target_decimals) as u32;
        match 10u64.checked_pow(shift) {
            Some(factor) => Ok(value / factor),
            None => Ok(0),
        }
    }
}
