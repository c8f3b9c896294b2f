//! Capabilities the pair consumes from external contracts and from each
//! other.
//!
//! The borrowable and collateral vaults never share storage: each holds the
//! other's address and talks to it only through [`DebtQuery`] and
//! [`LiquidityQuery`].

use odra::prelude::*;
use odra::casper_types::bytesrepr::Bytes;
use odra::casper_types::U256;

/// CEP-18 token interface for cross-contract calls
#[odra::external_contract]
pub trait Cep18Token {
    fn transfer(&mut self, recipient: Address, amount: U256);
    fn transfer_from(&mut self, owner: Address, recipient: Address, amount: U256);
    fn approve(&mut self, spender: Address, amount: U256);
    fn balance_of(&self, address: Address) -> U256;
}

/// USD price feed, 1e18 fixed point per whole unit of `asset`
#[odra::external_contract]
pub trait PriceOracle {
    fn get_price(&self, asset: Address) -> U256;
}

/// Debt side of the pair, queried by the collateral vault
#[odra::external_contract]
pub trait DebtQuery {
    fn borrow_balance(&self, borrower: Address) -> U256;
    fn accrue_interest(&mut self);
    fn repay_for_liquidation(&mut self, payer: Address, borrower: Address, amount: U256) -> U256;
}

/// Risk side of the pair, queried by the borrowable vault
#[odra::external_contract]
pub trait LiquidityQuery {
    fn can_borrow(&self, borrower: Address, account_borrows: U256) -> bool;
}

/// Staking contract backing the strategy
#[odra::external_contract]
pub trait YieldSource {
    fn stake(&mut self, amount: U256);
    fn withdraw(&mut self, amount: U256);
    fn staked_balance(&self, account: Address) -> U256;
    /// Sends pending rewards to the caller and returns the amount.
    fn harvest(&mut self) -> U256;
}

/// Swap executor named by a reinvest instruction
#[odra::external_contract]
pub trait SwapTarget {
    fn swap(
        &mut self,
        token_in: Address,
        token_out: Address,
        amount_in: U256,
        min_amount_out: U256,
        recipient: Address,
    ) -> U256;
}

/// Receiver hook for flash borrows
#[odra::external_contract]
pub trait BorrowCallee {
    fn on_borrow(&mut self, sender: Address, borrower: Address, amount: U256, data: Bytes);
}
