//! Fixed-point arithmetic shared by both vault flavors.
//!
//! All quantities are `U256` scaled by 1e18 where they represent ratios.
//! Divisions truncate toward zero; helpers that must round against the
//! account holder (adjusted debt) use [`mul_div_up`].

use odra::casper_types::U256;
use crate::errors::{LendingError, LendingResult};

/// Internal precision scale (1e18)
pub const PRECISION: u128 = 1_000_000_000_000_000_000;

/// 1e18 as `U256`
pub fn one() -> U256 {
    U256::from(PRECISION)
}

/// `a * b / denominator`, truncating.
pub fn mul_div(a: U256, b: U256, denominator: U256) -> LendingResult<U256> {
    if denominator.is_zero() {
        return Err(LendingError::DivisionByZero);
    }
    let product = a.checked_mul(b).ok_or(LendingError::MathOverflow)?;
    Ok(product / denominator)
}

/// `a * b / denominator`, rounding up.
pub fn mul_div_up(a: U256, b: U256, denominator: U256) -> LendingResult<U256> {
    if denominator.is_zero() {
        return Err(LendingError::DivisionByZero);
    }
    let product = a.checked_mul(b).ok_or(LendingError::MathOverflow)?;
    let quotient = product / denominator;
    if (product % denominator).is_zero() {
        Ok(quotient)
    } else {
        Ok(quotient + U256::one())
    }
}

/// `a * b / 1e18`
pub fn wad_mul(a: U256, b: U256) -> LendingResult<U256> {
    mul_div(a, b, one())
}

pub fn checked_add(a: U256, b: U256) -> LendingResult<U256> {
    a.checked_add(b).ok_or(LendingError::MathOverflow)
}

/// Underlying-per-share ratio scaled by 1e18; 1e18 before the first deposit.
pub fn exchange_rate(total_assets: U256, total_supply: U256) -> LendingResult<U256> {
    if total_supply.is_zero() {
        return Ok(one());
    }
    mul_div(total_assets, one(), total_supply)
}

/// Shares minted for `assets` into a vault that already has shares.
pub fn convert_to_shares(assets: U256, total_assets: U256, total_supply: U256) -> LendingResult<U256> {
    mul_div(assets, total_supply, total_assets)
}

/// Assets paid out for burning `shares`.
pub fn convert_to_assets(shares: U256, total_assets: U256, total_supply: U256) -> LendingResult<U256> {
    mul_div(shares, total_assets, total_supply)
}

/// Shares to mint so that the minted claim is worth exactly `value` of a
/// vault holding `total_assets` (already including `value`).
///
/// Used for reserve minting: existing holders keep `total_assets - value`.
pub fn shares_for_value_included(
    value: U256,
    total_assets: U256,
    total_supply: U256,
) -> LendingResult<U256> {
    if value.is_zero() || total_supply.is_zero() {
        return Ok(U256::zero());
    }
    let remaining = total_assets.checked_sub(value).ok_or(LendingError::MathOverflow)?;
    mul_div(value, total_supply, remaining)
}

/// USD value of a collateral share balance:
/// `shares * exchange_rate * price / 1e36`.
pub fn collateral_value(shares: U256, exchange_rate: U256, price: U256) -> LendingResult<U256> {
    let assets = wad_mul(shares, exchange_rate)?;
    wad_mul(assets, price)
}

/// Collateral shares worth `value_usd` at the given rate and price.
pub fn shares_for_value(value_usd: U256, exchange_rate: U256, price: U256) -> LendingResult<U256> {
    let assets = mul_div(value_usd, one(), price)?;
    mul_div(assets, one(), exchange_rate)
}

/// Liquidity position of an account
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Liquidity {
    /// Borrowing headroom left (zero when in shortfall)
    pub liquidity: U256,
    /// Missing collateral value (zero when healthy)
    pub shortfall: U256,
    /// Debt scaled by liquidation incentive plus fee, rounded up
    pub adjusted_debt: U256,
    /// Collateral value times debt ratio
    pub borrow_limit: U256,
}

/// Liquidity and shortfall for a collateral value and a debt amount.
///
/// `adjusted_debt = debt * (incentive + fee) / 1e18` rounds up so that a
/// borrow exactly at the limit is the largest one accepted.
pub fn account_liquidity(
    collateral_usd: U256,
    debt: U256,
    debt_ratio: U256,
    liquidation_incentive: U256,
    liquidation_fee: U256,
) -> LendingResult<Liquidity> {
    let penalty = checked_add(liquidation_incentive, liquidation_fee)?;
    let adjusted_debt = mul_div_up(debt, penalty, one())?;
    let borrow_limit = wad_mul(collateral_usd, debt_ratio)?;

    let (liquidity, shortfall) = if borrow_limit >= adjusted_debt {
        (borrow_limit - adjusted_debt, U256::zero())
    } else {
        (U256::zero(), adjusted_debt - borrow_limit)
    };

    Ok(Liquidity {
        liquidity,
        shortfall,
        adjusted_debt,
        borrow_limit,
    })
}

/// Measured debt ratio `adjusted_debt * 1e18 / borrow_limit`.
///
/// Zero without debt, `U256::MAX` for debt against no borrowing power.
pub fn debt_ratio_of(position: &Liquidity) -> LendingResult<U256> {
    if position.adjusted_debt.is_zero() {
        return Ok(U256::zero());
    }
    if position.borrow_limit.is_zero() {
        return Ok(U256::MAX);
    }
    mul_div(position.adjusted_debt, one(), position.borrow_limit)
}

/// Shares seized from a borrower for `repaid` debt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeizeSplit {
    /// Shares credited to the liquidator
    pub liquidator_shares: U256,
    /// Shares credited to the protocol reserves
    pub fee_shares: U256,
}

/// Split of seized collateral shares.
///
/// When the borrower cannot cover incentive plus fee the liquidator is paid
/// first and the fee takes what is left.
pub fn seize_split(
    repaid: U256,
    liquidation_incentive: U256,
    liquidation_fee: U256,
    exchange_rate: U256,
    price: U256,
    borrower_shares: U256,
) -> LendingResult<SeizeSplit> {
    let incentive_usd = wad_mul(repaid, liquidation_incentive)?;
    let fee_usd = wad_mul(repaid, liquidation_fee)?;

    let wanted_liquidator = shares_for_value(incentive_usd, exchange_rate, price)?;
    let wanted_fee = shares_for_value(fee_usd, exchange_rate, price)?;

    let liquidator_shares = wanted_liquidator.min(borrower_shares);
    let fee_shares = wanted_fee.min(borrower_shares - liquidator_shares);

    Ok(SeizeSplit {
        liquidator_shares,
        fee_shares,
    })
}
