//! Auto-compounding strategy for the collateral vault.
//!
//! Idle underlying is staked into an external yield source. Reinvesting
//! harvests the reward token, swaps it into more underlying through the
//! router fixed in the strategy config and stakes the proceeds, so the
//! vault's balance grows without minting shares.
//!
//! Callers choose amounts and minimum outputs only. The measured change of
//! the vault's underlying balance must cover the sum of the minimum outputs;
//! the value a router reports is ignored.

use odra::prelude::*;
use odra::casper_types::U256;
use odra::ContractRef;
use crate::errors::{LendingError, OrRevert};
use crate::events::StrategyInitialized;
use crate::interfaces::{Cep18TokenContractRef, SwapTargetContractRef, YieldSourceContractRef};
use crate::math;
use crate::params;
use crate::types::{StrategyConfig, SwapInstruction};

/// Outcome of one harvest-and-swap round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Harvest {
    /// Reward tokens received from the yield source
    pub reward: U256,
    /// Underlying gained from the swaps
    pub gained: U256,
}

#[odra::module(events = [StrategyInitialized])]
pub struct StrategyAdapter {
    config: Var<StrategyConfig>,
}

#[odra::module]
impl StrategyAdapter {
    pub fn config(&self) -> Option<StrategyConfig> {
        self.config.get()
    }

    pub fn is_active(&self) -> bool {
        self.config.get().is_some()
    }
}

impl StrategyAdapter {
    /// Bind the yield source. Fails if a strategy is already bound.
    pub fn initialize(&mut self, config: StrategyConfig) {
        if self.config.get().is_some() {
            self.env().revert(LendingError::AlreadyInitialized);
        }
        params::check_bounds(config.reinvest_bounty, 0, params::REINVEST_BOUNTY_MAX).or_revert(&self.env());

        self.env().emit_event(StrategyInitialized {
            yield_source: config.yield_source,
            reward_token: config.reward_token,
            swap_router: config.swap_router,
            reinvest_bounty: config.reinvest_bounty,
        });
        self.config.set(config);
    }

    pub fn require_config(&self) -> StrategyConfig {
        match self.config.get() {
            Some(config) => config,
            None => self.env().revert(LendingError::NotInitialized),
        }
    }

    /// Underlying currently staked by this vault, zero without a strategy.
    pub fn deployed_balance(&self) -> U256 {
        match self.config.get() {
            Some(config) => self
                .yield_source(&config)
                .staked_balance(self.env().self_address()),
            None => U256::zero(),
        }
    }

    pub fn stake(&self, underlying: Address, amount: U256) {
        if amount.is_zero() {
            return;
        }
        let config = self.require_config();
        Cep18TokenContractRef::new(self.env().clone(), underlying).approve(config.yield_source, amount);
        self.yield_source(&config).stake(amount);
    }

    pub fn withdraw(&self, amount: U256) {
        if amount.is_zero() {
            return;
        }
        let config = self.require_config();
        self.yield_source(&config).withdraw(amount);
    }

    /// Harvest rewards and run every swap into `underlying`.
    ///
    /// Fails with `ReinvestFailed` on an empty harvest, a swap through any
    /// router but the configured one, a swap that does not turn the reward
    /// token into the underlying, or a gain below the summed minimum outputs.
    pub fn harvest_and_swap(&mut self, underlying: Address, swaps: Vec<SwapInstruction>) -> Harvest {
        let config = self.require_config();
        let this = self.env().self_address();
        let token = Cep18TokenContractRef::new(self.env().clone(), underlying);

        let reward = self.yield_source(&config).harvest();
        if reward.is_zero() {
            self.env().revert(LendingError::ReinvestFailed);
        }

        let before = token.balance_of(this);
        let mut floor = U256::zero();
        for swap in swaps {
            if swap.router != config.swap_router
                || swap.token_in != config.reward_token
                || swap.token_out != underlying
            {
                self.env().revert(LendingError::ReinvestFailed);
            }
            floor = math::checked_add(floor, swap.min_amount_out).or_revert(&self.env());

            Cep18TokenContractRef::new(self.env().clone(), swap.token_in).approve(config.swap_router, swap.amount_in);
            SwapTargetContractRef::new(self.env().clone(), config.swap_router).swap(
                swap.token_in,
                swap.token_out,
                swap.amount_in,
                swap.min_amount_out,
                this,
            );
        }
        let gained = token.balance_of(this).saturating_sub(before);

        if gained.is_zero() || gained < floor {
            self.env().revert(LendingError::ReinvestFailed);
        }
        Harvest { reward, gained }
    }

    /// Caller bounty for reinvesting `gained`.
    pub fn bounty_for(&self, gained: U256) -> U256 {
        let config = self.require_config();
        math::wad_mul(gained, config.reinvest_bounty).or_revert(&self.env())
    }

    fn yield_source(&self, config: &StrategyConfig) -> YieldSourceContractRef {
        YieldSourceContractRef::new(self.env().clone(), config.yield_source)
    }
}
