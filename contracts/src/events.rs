//! Events emitted by the lending pair, consumed by off-chain indexers.

use odra::prelude::*;
use odra::casper_types::U256;

// ========== Share vault ==========

#[odra::event]
pub struct Deposit {
    pub sender: Address,
    pub owner: Address,
    pub assets: U256,
    pub shares: U256,
}

#[odra::event]
pub struct Withdraw {
    pub sender: Address,
    pub receiver: Address,
    pub owner: Address,
    pub assets: U256,
    pub shares: U256,
}

#[odra::event]
pub struct Transfer {
    pub from: Option<Address>,
    pub to: Option<Address>,
    pub amount: U256,
}

#[odra::event]
pub struct Approval {
    pub owner: Address,
    pub spender: Address,
    pub value: U256,
}

#[odra::event]
pub struct Sync {
    pub total_balance: U256,
}

// ========== Borrow ledger ==========

/// Covers both legs: `borrow_amount` out, `repay_amount` in.
#[odra::event]
pub struct Borrow {
    pub sender: Address,
    pub borrower: Address,
    pub receiver: Address,
    pub borrow_amount: U256,
    pub repay_amount: U256,
    pub account_borrows: U256,
    pub total_borrows: U256,
}

#[odra::event]
pub struct BorrowApproval {
    pub owner: Address,
    pub spender: Address,
    pub value: U256,
}

#[odra::event]
pub struct AccrueInterest {
    pub interest_accumulated: U256,
    pub borrow_index: U256,
    pub total_borrows: U256,
}

#[odra::event]
pub struct NewReserveFactor {
    pub old_value: U256,
    pub new_value: U256,
}

#[odra::event]
pub struct NewInterestRateParameters {
    pub base_rate_per_second: U256,
    pub multiplier_per_second: U256,
    pub jump_multiplier_per_second: U256,
    pub kink_utilization: U256,
}

// ========== Risk engine ==========

#[odra::event]
pub struct Liquidation {
    pub liquidator: Address,
    pub borrower: Address,
    pub repaid: U256,
    pub seized_shares: U256,
    pub fee_shares: U256,
}

#[odra::event]
pub struct NewDebtRatio {
    pub old_value: U256,
    pub new_value: U256,
}

#[odra::event]
pub struct NewLiquidationIncentive {
    pub old_value: U256,
    pub new_value: U256,
}

#[odra::event]
pub struct NewLiquidationFee {
    pub old_value: U256,
    pub new_value: U256,
}

// ========== Strategy ==========

#[odra::event]
pub struct StrategyInitialized {
    pub yield_source: Address,
    pub reward_token: Address,
    pub swap_router: Address,
    pub reinvest_bounty: U256,
}

#[odra::event]
pub struct Reinvest {
    pub caller: Address,
    pub reward: U256,
    pub bounty: U256,
    pub reinvested: U256,
}

// ========== Admin ==========

#[odra::event]
pub struct NewPendingAdmin {
    pub old_pending_admin: Option<Address>,
    pub new_pending_admin: Option<Address>,
}

#[odra::event]
pub struct NewAdmin {
    pub old_admin: Address,
    pub new_admin: Address,
}

#[odra::event]
pub struct NewReservesAccount {
    pub old_account: Address,
    pub new_account: Address,
}
