//! Common types shared by the borrowable and collateral vaults.

use odra::prelude::*;
use odra::casper_types::bytesrepr::Bytes;
use odra::casper_types::{PublicKey, U256};
use crate::errors::LendingResult;
use crate::math::{self, Liquidity};

/// Per-borrower debt record
#[odra::odra_type]
#[derive(Default)]
pub struct BorrowSnapshot {
    /// Debt at the time of the last borrow or repay
    pub principal: U256,
    /// Borrow index at the time of the last borrow or repay
    pub interest_index: U256,
}

/// Liquidity position of an account, in oracle units
#[odra::odra_type]
#[derive(Default)]
pub struct AccountLiquidity {
    /// Remaining borrowing power
    pub liquidity: U256,
    /// Missing collateral value (non-zero means liquidatable)
    pub shortfall: U256,
}

impl From<Liquidity> for AccountLiquidity {
    fn from(position: Liquidity) -> Self {
        Self {
            liquidity: position.liquidity,
            shortfall: position.shortfall,
        }
    }
}

/// Risk parameters shared by a pair
#[odra::odra_type]
pub struct PoolParameters {
    /// Fraction of collateral value that may be borrowed against
    pub debt_ratio: U256,
    /// Collateral bonus paid to liquidators (>= 1e18)
    pub liquidation_incentive: U256,
    /// Collateral cut routed to reserves on liquidation
    pub liquidation_fee: U256,
}

/// Global accounting of one vault
#[odra::odra_type]
#[derive(Default)]
pub struct VaultTotals {
    /// Shares outstanding, dead shares included
    pub total_supply: U256,
    /// Underlying accounted by the vault (idle plus deployed)
    pub total_balance: U256,
    /// Outstanding debt (borrowable only)
    pub total_borrows: U256,
    /// Interest credited to reserves so far (borrowable only)
    pub total_reserves: U256,
    /// Cumulative borrow index (borrowable only)
    pub borrow_index: U256,
    /// Last accrual time in seconds (borrowable only)
    pub accrual_timestamp: u64,
}

impl VaultTotals {
    /// Assets backing the shares: cash plus outstanding borrows.
    pub fn total_assets(&self) -> LendingResult<U256> {
        math::checked_add(self.total_balance, self.total_borrows)
    }

    pub fn exchange_rate(&self) -> LendingResult<U256> {
        math::exchange_rate(self.total_assets()?, self.total_supply)
    }
}

/// What a signed permit authorizes
#[odra::odra_type]
#[derive(Copy)]
pub enum PermitKind {
    /// Share transfer allowance
    Share,
    /// Borrow allowance
    Borrow,
}

impl PermitKind {
    pub fn tag(&self) -> u8 {
        match self {
            PermitKind::Share => 0,
            PermitKind::Borrow => 1,
        }
    }
}

/// Single-use signed approval
///
/// The owner is the account behind `public_key`. The signature covers the
/// digest returned by `permit_message` on the target vault.
#[odra::odra_type]
pub struct Permit {
    pub public_key: PublicKey,
    pub spender: Address,
    pub value: U256,
    /// Milliseconds since epoch, compared against block time
    pub deadline: u64,
    pub signature: Bytes,
}

/// Yield source binding for the auto-compounding strategy
#[odra::odra_type]
pub struct StrategyConfig {
    /// Staking contract holding the deployed underlying
    pub yield_source: Address,
    /// Token paid out by `harvest`
    pub reward_token: Address,
    /// Only router a reinvest may swap through
    pub swap_router: Address,
    /// Share of each reinvest paid to the caller (1e18 scale)
    pub reinvest_bounty: U256,
}

/// One caller-supplied swap step of a reinvest
#[odra::odra_type]
pub struct SwapInstruction {
    /// Must match the configured `swap_router`
    pub router: Address,
    pub token_in: Address,
    pub token_out: Address,
    pub amount_in: U256,
    pub min_amount_out: U256,
}

/// Result of a liquidation
#[odra::odra_type]
pub struct LiquidationResult {
    /// Debt actually repaid (clamped to outstanding debt)
    pub repaid: U256,
    /// Collateral shares credited to the liquidator
    pub seized_shares: U256,
    /// Collateral shares credited to the reserves account
    pub fee_shares: U256,
}

/// Two-step admin handover state
#[odra::odra_type]
pub struct AdminState {
    pub admin: Address,
    pub pending_admin: Option<Address>,
}
