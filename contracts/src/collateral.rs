//! Collateral Vault Contract
//!
//! Risk side of an isolated pair. Borrowers deposit the collateral asset and
//! receive shares; the paired Borrowable asks this vault whether a borrow is
//! covered, and liquidators seize shares from accounts in shortfall.
//!
//! ## Valuation
//! - collateral value = `shares * exchange_rate * price / 1e36`
//! - adjusted debt = `debt * (liquidation_incentive + liquidation_fee) / 1e18`
//! - borrow limit = `collateral value * debt_ratio / 1e18`
//!
//! An account is liquidatable once its adjusted debt exceeds its borrow
//! limit. Redeems and transfers that would create a shortfall revert.

use odra::prelude::*;
use odra::casper_types::bytesrepr::Bytes;
use odra::casper_types::U256;
use odra::ContractRef;
use crate::admin::AdminRegistry;
use crate::errors::{LendingError, OrRevert};
use crate::events::{Liquidation, NewDebtRatio, NewLiquidationFee, NewLiquidationIncentive, Reinvest};
use crate::interfaces::{DebtQueryContractRef, PriceOracleContractRef};
use crate::math::{self, Liquidity};
use crate::params;
use crate::share_vault::ShareVault;
use crate::strategy::StrategyAdapter;
use crate::types::{
    AccountLiquidity, LiquidationResult, Permit, PermitKind, PoolParameters, StrategyConfig, SwapInstruction,
};

/// Collateral Vault Contract
#[odra::module(events = [Liquidation, NewDebtRatio, NewLiquidationIncentive, NewLiquidationFee, Reinvest])]
pub struct Collateral {
    /// Share ledger and underlying balance
    vault: SubModule<ShareVault>,
    /// Admin handover state
    admin: SubModule<AdminRegistry>,
    /// Optional yield strategy for idle collateral
    strategy: SubModule<StrategyAdapter>,

    /// Paired borrowable vault
    borrowable: Var<Address>,
    /// Price feed for the collateral asset
    oracle: Var<Address>,

    // ===== Risk parameters =====
    debt_ratio: Var<U256>,
    liquidation_incentive: Var<U256>,
    liquidation_fee: Var<U256>,
}

#[odra::module]
impl Collateral {
    /// Initialize the vault paired with `borrowable`, with default risk parameters.
    pub fn init(
        &mut self,
        name: String,
        symbol: String,
        underlying: Address,
        borrowable: Address,
        oracle: Address,
        admin: Address,
        reserves_account: Address,
    ) {
        self.vault.init(name, symbol, 18, underlying, reserves_account);
        self.admin.init(admin);
        self.borrowable.set(borrowable);
        self.oracle.set(oracle);

        self.debt_ratio.set(U256::from(params::DEBT_RATIO_DEFAULT));
        self.liquidation_incentive.set(U256::from(params::LIQUIDATION_INCENTIVE_DEFAULT));
        self.liquidation_fee.set(U256::from(params::LIQUIDATION_FEE_DEFAULT));
    }

    // ========== Share Token ==========

    pub fn name(&self) -> String {
        self.vault.name()
    }

    pub fn symbol(&self) -> String {
        self.vault.symbol()
    }

    pub fn decimals(&self) -> u8 {
        self.vault.decimals()
    }

    pub fn total_supply(&self) -> U256 {
        self.vault.total_supply()
    }

    pub fn balance_of(&self, account: Address) -> U256 {
        self.vault.balance_of(account)
    }

    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.vault.allowance(owner, spender)
    }

    pub fn nonces(&self, owner: Address) -> u64 {
        self.vault.nonce(owner)
    }

    pub fn approve(&mut self, spender: Address, amount: U256) {
        let owner = self.env().caller();
        self.vault.approve(owner, spender, amount);
    }

    /// Transfer collateral shares; reverts `Shortfall` if the sender would
    /// become liquidatable.
    pub fn transfer(&mut self, recipient: Address, amount: U256) {
        self.vault.enter();
        let sender = self.env().caller();
        self.transfer_checked(sender, recipient, amount);
        self.vault.exit();
    }

    pub fn transfer_from(&mut self, owner: Address, recipient: Address, amount: U256) {
        self.vault.enter();
        let spender = self.env().caller();
        self.vault.spend_allowance(owner, spender, amount);
        self.transfer_checked(owner, recipient, amount);
        self.vault.exit();
    }

    pub fn permit(&mut self, permit: Permit) {
        self.apply_share_permit(&permit);
    }

    pub fn permit_message(&self, owner: Address, spender: Address, value: U256, deadline: u64) -> Bytes {
        self.vault.permit_message(PermitKind::Share, owner, spender, value, deadline)
    }

    // ========== Vault Functions ==========

    /// Deposit `assets` of the collateral asset and mint shares to `receiver`.
    pub fn deposit(&mut self, assets: U256, receiver: Address) -> U256 {
        self.vault.enter();
        self.debt_ref().accrue_interest();

        let total_assets = self.vault.total_balance();
        let caller = self.env().caller();
        self.vault.pull_underlying(caller, assets);
        let shares = self.vault.mint_for_deposit(receiver, assets, total_assets);

        if self.strategy.is_active() {
            self.strategy.stake(self.vault.underlying(), assets);
        }

        self.vault.exit();
        shares
    }

    /// Burn `shares` of `owner` and send the collateral to `receiver`.
    ///
    /// Reverts `Shortfall` if `owner` would become liquidatable.
    pub fn redeem(&mut self, shares: U256, receiver: Address, owner: Address, permit: Option<Permit>) -> U256 {
        self.vault.enter();
        self.debt_ref().accrue_interest();

        if let Some(permit) = permit {
            self.apply_share_permit(&permit);
        }
        let caller = self.env().caller();
        self.vault.spend_allowance(owner, caller, shares);

        if !self.can_redeem(owner, shares) {
            self.env().revert(LendingError::Shortfall);
        }

        let total_assets = self.vault.total_balance();
        let assets = self.vault.burn_for_redeem(owner, receiver, shares, total_assets, total_assets);

        let idle = self.vault.underlying_balance();
        if idle < assets {
            self.strategy.withdraw(assets - idle);
        }
        self.vault.push_underlying(receiver, assets);

        self.vault.exit();
        assets
    }

    /// Underlying per share, 1e18 scale.
    pub fn exchange_rate(&self) -> U256 {
        self.vault.exchange_rate(self.vault.total_balance())
    }

    pub fn total_balance(&self) -> U256 {
        self.vault.total_balance()
    }

    /// Re-measure the backing: idle underlying plus what the strategy holds.
    pub fn sync(&mut self) {
        self.vault.enter();
        self.debt_ref().accrue_interest();
        self.sync_balance();
        self.vault.exit();
    }

    // ========== Risk Engine ==========

    pub fn account_liquidity(&self, account: Address) -> AccountLiquidity {
        let shares = self.vault.balance_of(account);
        let debt = self.debt_of(account);
        AccountLiquidity::from(self.position(shares, debt))
    }

    /// Measured debt ratio of `account`; 1e18 is the borrowing ceiling.
    pub fn account_debt_ratio(&self, account: Address) -> U256 {
        let shares = self.vault.balance_of(account);
        let debt = self.debt_of(account);
        math::debt_ratio_of(&self.position(shares, debt)).or_revert(&self.env())
    }

    /// Whether `borrower`'s collateral covers a total debt of `account_borrows`.
    pub fn can_borrow(&self, borrower: Address, account_borrows: U256) -> bool {
        let shares = self.vault.balance_of(borrower);
        self.position(shares, account_borrows).shortfall.is_zero()
    }

    /// Whether `account` stays healthy after giving up `shares`.
    pub fn can_redeem(&self, account: Address, shares: U256) -> bool {
        let debt = self.debt_of(account);
        if debt.is_zero() {
            return true;
        }
        let remaining = self.vault.balance_of(account).saturating_sub(shares);
        self.position(remaining, debt).shortfall.is_zero()
    }

    pub fn can_transfer(&self, from: Address, shares: U256) -> bool {
        self.can_redeem(from, shares)
    }

    /// Repay `borrower`'s debt with the caller's funds and seize collateral
    /// shares for `liquidator`.
    ///
    /// The repay amount is clamped to the outstanding debt.
    pub fn liquidate(&mut self, borrower: Address, liquidator: Address, repay_amount: U256) -> LiquidationResult {
        self.vault.enter();
        let env = self.env();
        let mut debt = self.debt_ref();
        debt.accrue_interest();

        let shares = self.vault.balance_of(borrower);
        let position = self.position(shares, debt.borrow_balance(borrower));
        if position.shortfall.is_zero() {
            env.revert(LendingError::InsufficientShortfall);
        }
        if repay_amount.is_zero() {
            env.revert(LendingError::NotLiquidatable);
        }

        let repaid = debt.repay_for_liquidation(env.caller(), borrower, repay_amount);
        if repaid.is_zero() {
            env.revert(LendingError::NotLiquidatable);
        }

        let split = math::seize_split(
            repaid,
            self.liquidation_incentive(),
            self.liquidation_fee(),
            self.exchange_rate(),
            self.price(),
            shares,
        )
        .or_revert(&env);

        if !split.liquidator_shares.is_zero() {
            self.vault.transfer_shares(borrower, liquidator, split.liquidator_shares);
        }
        if !split.fee_shares.is_zero() {
            let reserves_account = self.vault.reserves_account();
            self.vault.transfer_shares(borrower, reserves_account, split.fee_shares);
        }

        env.emit_event(Liquidation {
            liquidator,
            borrower,
            repaid,
            seized_shares: split.liquidator_shares,
            fee_shares: split.fee_shares,
        });

        self.vault.exit();
        LiquidationResult {
            repaid,
            seized_shares: split.liquidator_shares,
            fee_shares: split.fee_shares,
        }
    }

    /// Oracle price of the collateral asset, 1e18 scale.
    pub fn price(&self) -> U256 {
        let price = PriceOracleContractRef::new(self.env().clone(), self.oracle()).get_price(self.vault.underlying());
        if price.is_zero() {
            self.env().revert(LendingError::InvalidPrice);
        }
        price
    }

    // ========== Strategy ==========

    /// Bind a yield source and stake the current idle collateral into it.
    pub fn initialize_strategy(&mut self, config: StrategyConfig) {
        self.admin.require_admin();
        self.vault.enter();
        self.strategy.initialize(config);

        let idle = self.vault.underlying_balance();
        self.strategy.stake(self.vault.underlying(), idle);
        self.sync_balance();
        self.vault.exit();
    }

    /// Compound harvested rewards into the collateral backing.
    ///
    /// The caller receives the configured bounty in the collateral asset.
    pub fn reinvest_rewards(&mut self, swaps: Vec<SwapInstruction>) -> U256 {
        self.vault.enter();
        self.debt_ref().accrue_interest();
        let underlying = self.vault.underlying();
        let before = self.vault.total_balance();

        let harvest = self.strategy.harvest_and_swap(underlying, swaps);
        let bounty = self.strategy.bounty_for(harvest.gained);
        let caller = self.env().caller();
        if !bounty.is_zero() {
            self.vault.push_underlying(caller, bounty);
        }
        let reinvested = harvest.gained - bounty;
        self.strategy.stake(underlying, reinvested);

        self.sync_balance();
        if self.vault.total_balance() <= before {
            self.env().revert(LendingError::ReinvestFailed);
        }

        self.env().emit_event(Reinvest {
            caller,
            reward: harvest.reward,
            bounty,
            reinvested,
        });
        self.vault.exit();
        reinvested
    }

    pub fn strategy_config(&self) -> Option<StrategyConfig> {
        self.strategy.config()
    }

    // ========== Parameters ==========

    pub fn pool_parameters(&self) -> PoolParameters {
        PoolParameters {
            debt_ratio: self.debt_ratio(),
            liquidation_incentive: self.liquidation_incentive(),
            liquidation_fee: self.liquidation_fee(),
        }
    }

    pub fn debt_ratio(&self) -> U256 {
        self.debt_ratio.get_or_default()
    }

    pub fn liquidation_incentive(&self) -> U256 {
        self.liquidation_incentive.get_or_default()
    }

    pub fn liquidation_fee(&self) -> U256 {
        self.liquidation_fee.get_or_default()
    }

    pub fn set_debt_ratio(&mut self, new_value: U256) {
        self.admin.require_admin();
        params::check_bounds(new_value, params::DEBT_RATIO_MIN, params::DEBT_RATIO_MAX).or_revert(&self.env());
        let old_value = self.debt_ratio();
        self.debt_ratio.set(new_value);
        self.env().emit_event(NewDebtRatio { old_value, new_value });
    }

    pub fn set_liquidation_incentive(&mut self, new_value: U256) {
        self.admin.require_admin();
        params::check_bounds(
            new_value,
            params::LIQUIDATION_INCENTIVE_MIN,
            params::LIQUIDATION_INCENTIVE_MAX,
        )
        .or_revert(&self.env());
        let old_value = self.liquidation_incentive();
        self.liquidation_incentive.set(new_value);
        self.env().emit_event(NewLiquidationIncentive { old_value, new_value });
    }

    pub fn set_liquidation_fee(&mut self, new_value: U256) {
        self.admin.require_admin();
        params::check_bounds(new_value, params::LIQUIDATION_FEE_MIN, params::LIQUIDATION_FEE_MAX)
            .or_revert(&self.env());
        let old_value = self.liquidation_fee();
        self.liquidation_fee.set(new_value);
        self.env().emit_event(NewLiquidationFee { old_value, new_value });
    }

    pub fn set_reserves_account(&mut self, account: Address) {
        self.admin.require_admin();
        self.vault.set_reserves_account(account);
    }

    pub fn underlying(&self) -> Address {
        self.vault.underlying()
    }

    pub fn reserves_account(&self) -> Address {
        self.vault.reserves_account()
    }

    pub fn borrowable(&self) -> Address {
        match self.borrowable.get() {
            Some(address) => address,
            None => self.env().revert(LendingError::NotInitialized),
        }
    }

    pub fn oracle(&self) -> Address {
        match self.oracle.get() {
            Some(address) => address,
            None => self.env().revert(LendingError::NotInitialized),
        }
    }

    // ========== Admin ==========

    pub fn admin(&self) -> Address {
        self.admin.admin()
    }

    pub fn pending_admin(&self) -> Option<Address> {
        self.admin.pending_admin()
    }

    pub fn set_pending_admin(&mut self, candidate: Option<Address>) {
        self.admin.set_pending_admin(candidate);
    }

    pub fn accept_admin(&mut self) {
        self.admin.accept_admin();
    }
}

impl Collateral {
    fn debt_ref(&self) -> DebtQueryContractRef {
        DebtQueryContractRef::new(self.env().clone(), self.borrowable())
    }

    fn debt_of(&self, account: Address) -> U256 {
        self.debt_ref().borrow_balance(account)
    }

    /// Liquidity of a hypothetical position holding `shares` against `debt`.
    fn position(&self, shares: U256, debt: U256) -> Liquidity {
        let env = self.env();
        let collateral_usd = if shares.is_zero() {
            U256::zero()
        } else {
            math::collateral_value(shares, self.exchange_rate(), self.price()).or_revert(&env)
        };
        math::account_liquidity(
            collateral_usd,
            debt,
            self.debt_ratio(),
            self.liquidation_incentive(),
            self.liquidation_fee(),
        )
        .or_revert(&env)
    }

    fn transfer_checked(&mut self, from: Address, to: Address, shares: U256) {
        self.debt_ref().accrue_interest();
        if !self.can_transfer(from, shares) {
            self.env().revert(LendingError::Shortfall);
        }
        self.vault.transfer_shares(from, to, shares);
    }

    fn sync_balance(&mut self) {
        let measured = math::checked_add(self.vault.underlying_balance(), self.strategy.deployed_balance())
            .or_revert(&self.env());
        self.vault.set_total_balance(measured);
    }

    fn apply_share_permit(&mut self, permit: &Permit) {
        let owner = self.vault.use_permit(PermitKind::Share, permit);
        self.vault.approve(owner, permit.spender, permit.value);
    }
}
