//! Error types for the BTT protocol.
//!
//! One error enum covers the whole crate, grouped by failure class. Every
//! failure is synchronous and leaves no residual state change: operations
//! perform all checks before touching the ledger.

use thiserror::Error;

use crate::ledger::address::Address;

/// Result type alias for protocol operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the BTT protocol
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // ═══════════════════════════════════════════════════════════════════
    // Validation Errors
    // ═══════════════════════════════════════════════════════════════════

    /// A required reference was the zero address
    #[error("Cannot set {0} to zero address")]
    ZeroAddress(&'static str),

    /// Exchange rate of zero is meaningless
    #[error("Rate must be greater than 0")]
    InvalidRate,

    /// Fee above the per-mille divisor
    #[error("Fee {0} exceeds maximum of 1000 per mille")]
    FeeTooHigh(u64),

    /// Loan ratio bounds must satisfy min <= max <= 100
    #[error("Invalid loan ratio bounds: min {min}, max {max}")]
    InvalidRatioBounds {
        /// Configured lower bound
        min: u64,
        /// Configured upper bound
        max: u64,
    },

    /// Amount is zero
    #[error("Amount cannot be zero")]
    ZeroAmount,

    /// Asset is not registered on the ledger
    #[error("Unknown asset: {0}")]
    UnknownAsset(Address),

    /// Asset address already registered
    #[error("Asset already registered: {0}")]
    AssetAlreadyRegistered(Address),

    // ═══════════════════════════════════════════════════════════════════
    // Precondition Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Redemption is undefined with no circulating supply
    #[error("Unable to withdraw with 0 total supply")]
    ZeroSupply,

    /// Proportional payout floors to zero
    #[error("Nothing to withdraw")]
    NothingToRedeem,

    /// Swap output floors to zero
    #[error("Amount too small")]
    AmountTooSmall,

    /// Caller does not hold enough of the asset being spent
    #[error("Caller balance {available} below required {required}")]
    InsufficientCallerBalance {
        /// Amount the operation needs
        required: u64,
        /// Amount the caller holds
        available: u64,
    },

    /// Pool/vault inventory cannot cover the outgoing transfer
    #[error("Inventory {available} below required {required}")]
    InsufficientInventory {
        /// Amount the operation needs
        required: u64,
        /// Amount the pool holds
        available: u64,
    },

    /// Spender allowance does not cover the pull
    #[error("Allowance {available} below required {required}")]
    InsufficientAllowance {
        /// Amount the operation needs
        required: u64,
        /// Approved amount
        available: u64,
    },

    /// Repayment exceeds outstanding principal
    #[error("Repayment {amount} exceeds outstanding principal {principal}")]
    Overpayment {
        /// Attempted repayment
        amount: u64,
        /// Outstanding principal
        principal: u64,
    },

    /// Requested loan ratio above the configured maximum
    #[error("Loan ratio {ratio}% above maximum {maximum}%")]
    RatioTooHigh {
        /// Computed loan-to-value ratio
        ratio: u64,
        /// Configured upper bound
        maximum: u64,
    },

    /// Requested loan ratio below the configured minimum
    #[error("Loan ratio {ratio}% below minimum {minimum}%")]
    RatioTooLow {
        /// Computed loan-to-value ratio
        ratio: u64,
        /// Configured lower bound
        minimum: u64,
    },

    /// Collateral adjustment would leave the ratio out of bounds
    #[error("Collateral change leaves ratio {ratio}% outside [{min}%, {max}%]")]
    RatioViolation {
        /// Ratio after the adjustment
        ratio: u64,
        /// Configured lower bound
        min: u64,
        /// Configured upper bound
        max: u64,
    },

    /// Borrower has no open position
    #[error("No open loan position for {0}")]
    PositionNotFound(Address),

    /// Borrower already has an open position
    #[error("Loan position already open for {0}")]
    PositionAlreadyOpen(Address),

    /// Position is healthy; only over-ratio positions can be liquidated
    #[error("Position of {borrower} is not liquidatable at ratio {ratio}%")]
    NotLiquidatable {
        /// Position owner
        borrower: Address,
        /// Currently revalued ratio
        ratio: u64,
    },

    // ═══════════════════════════════════════════════════════════════════
    // Authorization Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Non-owner invoked an owner-gated operation
    #[error("Unauthorized caller: {0}")]
    Unauthorized(Address),

    // ═══════════════════════════════════════════════════════════════════
    // Oracle Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Feed reported a non-positive value
    #[error("Oracle unavailable: feed reported non-positive value {0}")]
    OracleUnavailable(i64),

    /// Feed reading older than the staleness threshold
    #[error("Oracle unavailable: feed is {age}s old, max allowed {max_age}s")]
    StaleFeed {
        /// Seconds since the feed's last update
        age: u64,
        /// Maximum allowed age in seconds
        max_age: u64,
    },

    // ═══════════════════════════════════════════════════════════════════
    // Arithmetic Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Arithmetic overflow in a calculation
    #[error("Arithmetic overflow in {operation}")]
    Overflow {
        /// Operation that overflowed
        operation: String,
    },

    // ═══════════════════════════════════════════════════════════════════
    // Serialization Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Serialization failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Deserialization failed
    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

impl Error {
    /// Returns true if the caller can recover by resubmitting with different
    /// inputs or after external conditions change
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::NothingToRedeem
                | Error::AmountTooSmall
                | Error::InsufficientCallerBalance { .. }
                | Error::InsufficientInventory { .. }
                | Error::InsufficientAllowance { .. }
                | Error::StaleFeed { .. }
                | Error::NotLiquidatable { .. }
        )
    }

    /// Returns the error code for external systems
    pub fn code(&self) -> u32 {
        match self {
            // Validation errors: 1xxx
            Error::ZeroAddress(_) => 1001,
            Error::InvalidRate => 1002,
            Error::FeeTooHigh(_) => 1003,
            Error::InvalidRatioBounds { .. } => 1004,
            Error::ZeroAmount => 1005,
            Error::UnknownAsset(_) => 1006,
            Error::AssetAlreadyRegistered(_) => 1007,

            // Precondition errors: 2xxx
            Error::ZeroSupply => 2001,
            Error::NothingToRedeem => 2002,
            Error::AmountTooSmall => 2003,
            Error::InsufficientCallerBalance { .. } => 2004,
            Error::InsufficientInventory { .. } => 2005,
            Error::InsufficientAllowance { .. } => 2006,
            Error::Overpayment { .. } => 2007,
            Error::RatioTooHigh { .. } => 2008,
            Error::RatioTooLow { .. } => 2009,
            Error::RatioViolation { .. } => 2010,
            Error::PositionNotFound(_) => 2011,
            Error::PositionAlreadyOpen(_) => 2012,
            Error::NotLiquidatable { .. } => 2013,

            // Authorization errors: 3xxx
            Error::Unauthorized(_) => 3001,

            // Oracle errors: 4xxx
            Error::OracleUnavailable(_) => 4001,
            Error::StaleFeed { .. } => 4002,

            // Arithmetic errors: 5xxx
            Error::Overflow { .. } => 5001,

            // Serialization errors: 7xxx
            Error::Serialization(_) => 7001,
            Error::Deserialization(_) => 7002,
        }
    }
}
