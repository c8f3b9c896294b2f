//! Test doubles for the pair's external collaborators.
//!
//! Compiled only with the `mocks` feature.

use odra::prelude::*;
use odra::casper_types::bytesrepr::Bytes;
use odra::casper_types::U256;
use odra::ContractRef;
use crate::borrowable::BorrowableContractRef;
use crate::errors::{LendingError, OrRevert};
use crate::interfaces::Cep18TokenContractRef;
use crate::math;

// ========== Token ==========

/// Minimal CEP-18 token with open minting
#[odra::module]
pub struct MockToken {
    total_supply: Var<U256>,
    balances: Mapping<Address, U256>,
    allowances: Mapping<(Address, Address), U256>,
}

#[odra::module]
impl MockToken {
    pub fn mint(&mut self, to: Address, amount: U256) {
        let balance = self.balance_of(to);
        self.balances.set(&to, balance + amount);
        let supply = self.total_supply() + amount;
        self.total_supply.set(supply);
    }

    pub fn transfer(&mut self, recipient: Address, amount: U256) {
        let sender = self.env().caller();
        self.move_balance(sender, recipient, amount);
    }

    pub fn transfer_from(&mut self, owner: Address, recipient: Address, amount: U256) {
        let spender = self.env().caller();
        let allowance = self.allowance(owner, spender);
        if allowance < amount {
            self.env().revert(LendingError::InsufficientAllowance);
        }
        self.allowances.set(&(owner, spender), allowance - amount);
        self.move_balance(owner, recipient, amount);
    }

    pub fn approve(&mut self, spender: Address, amount: U256) {
        let owner = self.env().caller();
        self.allowances.set(&(owner, spender), amount);
    }

    pub fn balance_of(&self, address: Address) -> U256 {
        self.balances.get(&address).unwrap_or_default()
    }

    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.allowances.get(&(owner, spender)).unwrap_or_default()
    }

    pub fn total_supply(&self) -> U256 {
        self.total_supply.get_or_default()
    }
}

impl MockToken {
    fn move_balance(&mut self, from: Address, to: Address, amount: U256) {
        let from_balance = self.balance_of(from);
        if from_balance < amount {
            self.env().revert(LendingError::InsufficientBalance);
        }
        self.balances.set(&from, from_balance - amount);
        let to_balance = self.balance_of(to);
        self.balances.set(&to, to_balance + amount);
    }
}

// ========== Oracle ==========

/// Price feed with prices set by the test
#[odra::module]
pub struct MockPriceOracle {
    prices: Mapping<Address, U256>,
}

#[odra::module]
impl MockPriceOracle {
    pub fn set_price(&mut self, asset: Address, price: U256) {
        self.prices.set(&asset, price);
    }

    pub fn get_price(&self, asset: Address) -> U256 {
        self.prices.get(&asset).unwrap_or_default()
    }
}

// ========== Yield source ==========

/// Staking pool paying rewards that the test credits by hand
#[odra::module]
pub struct MockYieldSource {
    token: Var<Address>,
    reward_token: Var<Address>,
    staked: Mapping<Address, U256>,
    pending_rewards: Mapping<Address, U256>,
}

#[odra::module]
impl MockYieldSource {
    pub fn init(&mut self, token: Address, reward_token: Address) {
        self.token.set(token);
        self.reward_token.set(reward_token);
    }

    pub fn stake(&mut self, amount: U256) {
        let staker = self.env().caller();
        let this = self.env().self_address();
        self.token_ref().transfer_from(staker, this, amount);
        let staked = self.staked_balance(staker);
        self.staked.set(&staker, staked + amount);
    }

    pub fn withdraw(&mut self, amount: U256) {
        let staker = self.env().caller();
        let staked = self.staked_balance(staker);
        if staked < amount {
            self.env().revert(LendingError::InsufficientBalance);
        }
        self.staked.set(&staker, staked - amount);
        self.token_ref().transfer(staker, amount);
    }

    pub fn staked_balance(&self, account: Address) -> U256 {
        self.staked.get(&account).unwrap_or_default()
    }

    /// Credit rewards to `account`; the pool must hold the reward tokens.
    pub fn add_rewards(&mut self, account: Address, amount: U256) {
        let pending = self.pending_rewards.get(&account).unwrap_or_default();
        self.pending_rewards.set(&account, pending + amount);
    }

    pub fn harvest(&mut self) -> U256 {
        let caller = self.env().caller();
        let pending = self.pending_rewards.get(&caller).unwrap_or_default();
        if pending.is_zero() {
            return pending;
        }
        self.pending_rewards.set(&caller, U256::zero());
        let reward_token = self.address_of(&self.reward_token);
        Cep18TokenContractRef::new(self.env().clone(), reward_token).transfer(caller, pending);
        pending
    }
}

impl MockYieldSource {
    fn token_ref(&self) -> Cep18TokenContractRef {
        Cep18TokenContractRef::new(self.env().clone(), self.address_of(&self.token))
    }

    fn address_of(&self, var: &Var<Address>) -> Address {
        match var.get() {
            Some(address) => address,
            None => self.env().revert(LendingError::NotInitialized),
        }
    }
}

// ========== Swap router ==========

/// Fixed-rate swap router; must be pre-funded with output tokens
#[odra::module]
pub struct MockSwapRouter {
    /// Output per input, 1e18 scale
    rate: Var<U256>,
    /// Withheld from each payout while the full amount is still reported
    skim: Var<U256>,
}

#[odra::module]
impl MockSwapRouter {
    pub fn init(&mut self, rate: U256) {
        self.rate.set(rate);
    }

    pub fn set_rate(&mut self, rate: U256) {
        self.rate.set(rate);
    }

    pub fn set_skim(&mut self, skim: U256) {
        self.skim.set(skim);
    }

    pub fn swap(
        &mut self,
        token_in: Address,
        token_out: Address,
        amount_in: U256,
        min_amount_out: U256,
        recipient: Address,
    ) -> U256 {
        let caller = self.env().caller();
        let this = self.env().self_address();
        Cep18TokenContractRef::new(self.env().clone(), token_in).transfer_from(caller, this, amount_in);

        let amount_out = math::wad_mul(amount_in, self.rate.get_or_default()).or_revert(&self.env());
        if amount_out < min_amount_out {
            self.env().revert(LendingError::ReinvestFailed);
        }
        let paid = amount_out.saturating_sub(self.skim.get_or_default());
        Cep18TokenContractRef::new(self.env().clone(), token_out).transfer(recipient, paid);
        amount_out
    }
}

// ========== Flash-borrow receiver ==========

/// Borrow receiver that records the callback and can re-enter the vault
#[odra::module]
pub struct MockBorrowCallee {
    borrowable: Var<Address>,
    reenter: Var<bool>,
    last_amount: Var<U256>,
    calls: Var<u32>,
}

#[odra::module]
impl MockBorrowCallee {
    pub fn init(&mut self, borrowable: Address) {
        self.borrowable.set(borrowable);
    }

    pub fn set_reenter(&mut self, reenter: bool) {
        self.reenter.set(reenter);
    }

    pub fn on_borrow(&mut self, sender: Address, borrower: Address, amount: U256, data: Bytes) {
        let _ = (sender, borrower, data);
        self.last_amount.set(amount);
        let calls = self.calls.get_or_default();
        self.calls.set(calls + 1);

        if self.reenter.get_or_default() {
            let borrowable = match self.borrowable.get() {
                Some(address) => address,
                None => self.env().revert(LendingError::NotInitialized),
            };
            BorrowableContractRef::new(self.env().clone(), borrowable).sync();
        }
    }

    pub fn last_amount(&self) -> U256 {
        self.last_amount.get_or_default()
    }

    pub fn calls(&self) -> u32 {
        self.calls.get_or_default()
    }
}
