//! Interest rate model for the borrowable vault.
//!
//! Implements a kinked jump-rate model:
//! - Utilization = borrows / (borrows + cash)
//! - Linear slope up to the kink, steeper jump slope above it
//! - Per-second rates derived from annual inputs
//! - Simple interest per accrual, compounded through the borrow index

use odra::prelude::*;
use odra::casper_types::U256;
use crate::errors::{LendingError, LendingResult};
use crate::math::{checked_add, mul_div, one, wad_mul};

/// Seconds in a year (365 days)
pub const SECONDS_PER_YEAR: u64 = 31_536_000;

/// Kinked borrow rate model, all rates per second scaled by 1e18
#[odra::odra_type]
#[derive(Default)]
pub struct InterestRateModel {
    /// Rate charged at zero utilization
    pub base_rate_per_second: U256,
    /// Slope below the kink
    pub multiplier_per_second: U256,
    /// Slope above the kink
    pub jump_multiplier_per_second: U256,
    /// Utilization where the jump slope takes over
    pub kink_utilization: U256,
}

impl InterestRateModel {
    /// Build a model from annual rates (1e18 scale).
    pub fn from_annual(
        base_rate_per_year: U256,
        multiplier_per_year: U256,
        jump_multiplier_per_year: U256,
        kink_utilization: U256,
    ) -> Self {
        let year = U256::from(SECONDS_PER_YEAR);
        Self {
            base_rate_per_second: base_rate_per_year / year,
            multiplier_per_second: multiplier_per_year / year,
            jump_multiplier_per_second: jump_multiplier_per_year / year,
            kink_utilization,
        }
    }

    /// Borrow rate per second for the given pool state.
    pub fn borrow_rate(&self, cash: U256, total_borrows: U256) -> LendingResult<U256> {
        let utilization = utilization_rate(cash, total_borrows)?;

        if utilization < self.kink_utilization {
            return checked_add(
                self.base_rate_per_second,
                wad_mul(utilization, self.multiplier_per_second)?,
            );
        }

        let kink_rate = checked_add(
            self.base_rate_per_second,
            wad_mul(self.kink_utilization, self.multiplier_per_second)?,
        )?;
        let excess = utilization - self.kink_utilization;
        checked_add(kink_rate, wad_mul(excess, self.jump_multiplier_per_second)?)
    }
}

/// Fraction of pool assets lent out, scaled by 1e18.
pub fn utilization_rate(cash: U256, total_borrows: U256) -> LendingResult<U256> {
    if total_borrows.is_zero() {
        return Ok(U256::zero());
    }
    let total = checked_add(total_borrows, cash)?;
    mul_div(total_borrows, one(), total)
}

/// Interest accrual result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccrualResult {
    /// Total borrows after accrual
    pub total_borrows: U256,
    /// Borrow index after accrual
    pub borrow_index: U256,
    /// Interest added to total borrows
    pub interest_accumulated: U256,
}

/// Accrue simple interest over `elapsed_seconds` at `rate_per_second`.
///
/// `interest = total_borrows * rate * elapsed / 1e18` and the index grows by
/// the same factor. Returns the inputs unchanged when no time has passed.
pub fn accrue_interest(
    total_borrows: U256,
    borrow_index: U256,
    rate_per_second: U256,
    elapsed_seconds: u64,
) -> LendingResult<AccrualResult> {
    if elapsed_seconds == 0 || rate_per_second.is_zero() {
        return Ok(AccrualResult {
            total_borrows,
            borrow_index,
            interest_accumulated: U256::zero(),
        });
    }

    let simple_factor = rate_per_second
        .checked_mul(U256::from(elapsed_seconds))
        .ok_or(LendingError::MathOverflow)?;

    let interest_accumulated = wad_mul(total_borrows, simple_factor)?;
    let index_growth = wad_mul(borrow_index, simple_factor)?;

    Ok(AccrualResult {
        total_borrows: checked_add(total_borrows, interest_accumulated)?,
        borrow_index: checked_add(borrow_index, index_growth)?,
        interest_accumulated,
    })
}

/// Current debt of a snapshot: `principal * borrow_index / snapshot_index`.
pub fn current_debt(principal: U256, borrow_index: U256, snapshot_index: U256) -> LendingResult<U256> {
    if principal.is_zero() {
        return Ok(U256::zero());
    }
    mul_div(principal, borrow_index, snapshot_index)
}
