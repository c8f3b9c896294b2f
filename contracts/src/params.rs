//! Protocol-wide parameter bounds and per-pool defaults.
//!
//! Every admin setter validates its input against these constants; values
//! are 1e18 fixed point unless noted otherwise.

use odra::casper_types::U256;
use crate::errors::{LendingError, LendingResult};

const E16: u128 = 10_000_000_000_000_000;
const E18: u128 = 1_000_000_000_000_000_000;

/// Shares minted to the null account on the first deposit
pub const DEAD_SHARES: u64 = 1_000;

// ========== Collateral risk parameters ==========

/// 50%
pub const DEBT_RATIO_MIN: u128 = 50 * E16;
/// 100%
pub const DEBT_RATIO_MAX: u128 = E18;
/// 80%
pub const DEBT_RATIO_DEFAULT: u128 = 80 * E16;

/// 100%
pub const LIQUIDATION_INCENTIVE_MIN: u128 = E18;
/// 110%
pub const LIQUIDATION_INCENTIVE_MAX: u128 = 110 * E16;
/// 104%
pub const LIQUIDATION_INCENTIVE_DEFAULT: u128 = 104 * E16;

pub const LIQUIDATION_FEE_MIN: u128 = 0;
/// 8%
pub const LIQUIDATION_FEE_MAX: u128 = 8 * E16;
/// 1%
pub const LIQUIDATION_FEE_DEFAULT: u128 = E16;

// ========== Borrowable parameters ==========

pub const RESERVE_FACTOR_MIN: u128 = 0;
/// 20%
pub const RESERVE_FACTOR_MAX: u128 = 20 * E16;
/// 10%
pub const RESERVE_FACTOR_DEFAULT: u128 = 10 * E16;

/// 50%
pub const KINK_UTILIZATION_MIN: u128 = 50 * E16;
/// 99%
pub const KINK_UTILIZATION_MAX: u128 = 99 * E16;
/// 75%
pub const KINK_UTILIZATION_DEFAULT: u128 = 75 * E16;

// Annual rates, converted to per-second on write.
pub const BASE_RATE_MAX: u128 = E18;
pub const BASE_RATE_DEFAULT: u128 = 2 * E16;
pub const MULTIPLIER_MAX: u128 = 5 * E18;
pub const MULTIPLIER_DEFAULT: u128 = 20 * E16;
pub const JUMP_MULTIPLIER_MAX: u128 = 50 * E18;
pub const JUMP_MULTIPLIER_DEFAULT: u128 = 5 * E18;

// ========== Strategy ==========

/// 5%
pub const REINVEST_BOUNTY_MAX: u128 = 5 * E16;

/// Reject `value` outside `[min, max]`.
pub fn check_bounds(value: U256, min: u128, max: u128) -> LendingResult<()> {
    if value < U256::from(min) || value > U256::from(max) {
        return Err(LendingError::ParameterOutOfRange);
    }
    Ok(())
}
