//! Protocol constants and magic numbers.
//!
//! All protocol-wide constants are defined here for easy auditing and modification.

// ═══════════════════════════════════════════════════════════════════════════════
// TOKEN CONSTANTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Decimal places every token on the ledger uses
pub const TOKEN_DECIMALS: u8 = 9;

/// Base units per whole token (10^9)
pub const UNIT: u64 = 1_000_000_000;

/// Circulating supply of BTT minted at genesis (21 million whole tokens)
pub const BTT_GENESIS_SUPPLY: u64 = 21_000_000 * UNIT;

// ═══════════════════════════════════════════════════════════════════════════════
// MARKET CONSTANTS
// ═══════════════════════════════════════════════════════════════════════════════

/// The exchange rate is quoted in settlement units per this many native units
pub const RATE_BASE: u64 = 100;

/// Fee divisor: fees are expressed in parts per thousand
pub const FEE_DIVISOR: u64 = 1000;

/// Deployment default rate (settlement units per 100 BTT)
pub const DEFAULT_RATE: u64 = 35;

/// Deployment default fee (1% in per mille)
pub const DEFAULT_FEE: u64 = 10;

// ═══════════════════════════════════════════════════════════════════════════════
// ORACLE CONSTANTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Maximum feed staleness in seconds (1 hour)
pub const MAX_FEED_AGE_SECS: u64 = 3600;

/// Feed values are normalized to this many decimals before comparison
pub const PRICE_DECIMALS: u8 = TOKEN_DECIMALS;

// ═══════════════════════════════════════════════════════════════════════════════
// LOAN CONSTANTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Loan-to-value ratios are expressed as whole percentages
pub const RATIO_PRECISION: u64 = 100;

/// Deployment default lower loan-to-value bound
pub const DEFAULT_RATIO_MIN: u64 = 50;

/// Deployment default upper loan-to-value bound
pub const DEFAULT_RATIO_MAX: u64 = 80;

// ═══════════════════════════════════════════════════════════════════════════════
// IDENTITY CONSTANTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Length of an account/contract address in bytes
pub const ADDRESS_LENGTH: usize = 20;
