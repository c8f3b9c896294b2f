//! Borrowable Vault Contract
//!
//! Lending side of an isolated pair. Lenders deposit the borrowable asset
//! and receive shares; borrowers draw it against collateral held by the
//! paired Collateral vault.
//!
//! ## Accounting
//! - cash = `total_balance` of the share vault (idle underlying)
//! - total assets = cash + `total_borrows`
//! - debt of an account = `principal * borrow_index / snapshot_index`
//!
//! Every state-changing entry point accrues interest first. A share of each
//! accrual (the reserve factor) is minted as vault shares to the reserves
//! account.

use odra::prelude::*;
use odra::casper_types::bytesrepr::Bytes;
use odra::casper_types::U256;
use odra::ContractRef;
use crate::admin::AdminRegistry;
use crate::errors::{LendingError, OrRevert};
use crate::events::{AccrueInterest, Borrow, BorrowApproval, NewInterestRateParameters, NewReserveFactor};
use crate::interest::{self, InterestRateModel};
use crate::interfaces::{BorrowCalleeContractRef, LiquidityQueryContractRef};
use crate::math;
use crate::params;
use crate::share_vault::ShareVault;
use crate::types::{BorrowSnapshot, Permit, PermitKind, VaultTotals};

/// Borrowable Vault Contract
#[odra::module(events = [Borrow, BorrowApproval, AccrueInterest, NewReserveFactor, NewInterestRateParameters])]
pub struct Borrowable {
    /// Share ledger and underlying balance
    vault: SubModule<ShareVault>,
    /// Admin handover state
    admin: SubModule<AdminRegistry>,
    /// Paired collateral vault
    collateral: Var<Address>,

    // ===== Borrow ledger =====
    /// Borrower -> debt snapshot
    borrow_snapshots: Mapping<Address, BorrowSnapshot>,
    /// (owner, spender) -> borrow allowance
    borrow_allowances: Mapping<(Address, Address), U256>,
    total_borrows: Var<U256>,
    /// Interest credited to reserves so far
    total_reserves: Var<U256>,

    // ===== Interest rate state =====
    rate_model: Var<InterestRateModel>,
    reserve_factor: Var<U256>,
    borrow_index: Var<U256>,
    /// Seconds
    accrual_timestamp: Var<u64>,
}

#[odra::module]
impl Borrowable {
    /// Initialize the vault with default rate and reserve parameters.
    pub fn init(
        &mut self,
        name: String,
        symbol: String,
        underlying: Address,
        admin: Address,
        reserves_account: Address,
    ) {
        self.vault.init(name, symbol, 18, underlying, reserves_account);
        self.admin.init(admin);

        self.rate_model.set(InterestRateModel::from_annual(
            U256::from(params::BASE_RATE_DEFAULT),
            U256::from(params::MULTIPLIER_DEFAULT),
            U256::from(params::JUMP_MULTIPLIER_DEFAULT),
            U256::from(params::KINK_UTILIZATION_DEFAULT),
        ));
        self.reserve_factor.set(U256::from(params::RESERVE_FACTOR_DEFAULT));
        self.borrow_index.set(math::one());
        self.total_borrows.set(U256::zero());
        self.total_reserves.set(U256::zero());
        self.accrual_timestamp.set(self.now_seconds());
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

    pub fn transfer(&mut self, recipient: Address, amount: U256) {
        self.vault.enter();
        let sender = self.env().caller();
        self.vault.transfer_shares(sender, recipient, amount);
        self.vault.exit();
    }

    pub fn transfer_from(&mut self, owner: Address, recipient: Address, amount: U256) {
        self.vault.enter();
        let spender = self.env().caller();
        self.vault.spend_allowance(owner, spender, amount);
        self.vault.transfer_shares(owner, recipient, amount);
        self.vault.exit();
    }

    /// Apply a signed share approval.
    pub fn permit(&mut self, permit: Permit) {
        self.apply_share_permit(&permit);
    }

    /// Digest to sign for a share or borrow permit at the owner's current nonce.
    pub fn permit_message(
        &self,
        kind: PermitKind,
        owner: Address,
        spender: Address,
        value: U256,
        deadline: u64,
    ) -> Bytes {
        self.vault.permit_message(kind, owner, spender, value, deadline)
    }

    // ========== Vault Functions ==========

    /// Deposit `assets` of the underlying and mint shares to `receiver`.
    pub fn deposit(&mut self, assets: U256, receiver: Address) -> U256 {
        self.vault.enter();
        self.accrue();

        let total_assets = self.total_assets();
        let caller = self.env().caller();
        self.vault.pull_underlying(caller, assets);
        let shares = self.vault.mint_for_deposit(receiver, assets, total_assets);

        self.vault.exit();
        shares
    }

    /// Burn `shares` of `owner` and send the underlying to `receiver`.
    pub fn redeem(&mut self, shares: U256, receiver: Address, owner: Address, permit: Option<Permit>) -> U256 {
        self.vault.enter();
        self.accrue();

        if let Some(permit) = permit {
            self.apply_share_permit(&permit);
        }
        let caller = self.env().caller();
        self.vault.spend_allowance(owner, caller, shares);

        let total_assets = self.total_assets();
        let cash = self.vault.total_balance();
        let assets = self.vault.burn_for_redeem(owner, receiver, shares, total_assets, cash);
        self.vault.push_underlying(receiver, assets);

        self.vault.exit();
        assets
    }

    /// Underlying per share, 1e18 scale.
    pub fn exchange_rate(&self) -> U256 {
        self.totals().exchange_rate().or_revert(&self.env())
    }

    /// Re-measure cash; unaccounted gains pay the reserve factor.
    pub fn sync(&mut self) {
        self.vault.enter();
        self.accrue();
        self.sync_balance();
        self.vault.exit();
    }

    pub fn accrue_interest(&mut self) {
        self.vault.enter();
        self.accrue();
        self.vault.exit();
    }

    // ========== Borrow Ledger ==========

    /// Borrow `amount` on behalf of `borrower` and send it to `receiver`.
    ///
    /// A non-empty `data` calls `on_borrow` on the receiver after the funds
    /// are sent.
    pub fn borrow(
        &mut self,
        borrower: Address,
        receiver: Address,
        amount: U256,
        data: Bytes,
        permit: Option<Permit>,
    ) {
        self.vault.enter();
        self.accrue();

        if let Some(permit) = permit {
            self.apply_borrow_permit(&permit);
        }
        let caller = self.env().caller();
        self.spend_borrow_allowance(borrower, caller, amount);

        if amount.is_zero() {
            self.env().revert(LendingError::ZeroAssets);
        }
        if amount > self.vault.total_balance() {
            self.env().revert(LendingError::InsufficientCash);
        }

        let account_borrows =
            math::checked_add(self.borrow_balance(borrower), amount).or_revert(&self.env());
        if !self.collateral_ref().can_borrow(borrower, account_borrows) {
            self.env().revert(LendingError::InsufficientLiquidity);
        }

        self.borrow_snapshots.set(
            &borrower,
            BorrowSnapshot {
                principal: account_borrows,
                interest_index: self.borrow_index(),
            },
        );
        let total_borrows = math::checked_add(self.total_borrows(), amount).or_revert(&self.env());
        self.total_borrows.set(total_borrows);

        self.vault.sub_balance(amount);
        self.vault.push_underlying(receiver, amount);

        self.env().emit_event(Borrow {
            sender: caller,
            borrower,
            receiver,
            borrow_amount: amount,
            repay_amount: U256::zero(),
            account_borrows,
            total_borrows,
        });

        if !data.is_empty() {
            BorrowCalleeContractRef::new(self.env().clone(), receiver)
                .on_borrow(caller, borrower, amount, data);
        }

        self.vault.exit();
    }

    /// Repay up to `amount` of `borrower`'s debt with the caller's funds.
    ///
    /// Amounts above the outstanding debt are clamped; returns what was repaid.
    pub fn repay(&mut self, borrower: Address, amount: U256) -> U256 {
        self.vault.enter();
        self.accrue();
        let payer = self.env().caller();
        let repaid = self.repay_internal(payer, borrower, amount);
        self.vault.exit();
        repaid
    }

    /// Repay leg of a liquidation, callable only by the paired collateral.
    pub fn repay_for_liquidation(&mut self, payer: Address, borrower: Address, amount: U256) -> U256 {
        if self.env().caller() != self.collateral() {
            self.env().revert(LendingError::Unauthorized);
        }
        self.vault.enter();
        self.accrue();
        let repaid = self.repay_internal(payer, borrower, amount);
        self.vault.exit();
        repaid
    }

    /// Debt of `borrower` at the last accrual.
    pub fn borrow_balance(&self, borrower: Address) -> U256 {
        let snapshot = self.borrow_snapshot(borrower);
        interest::current_debt(snapshot.principal, self.borrow_index(), snapshot.interest_index)
            .or_revert(&self.env())
    }

    pub fn borrow_snapshot(&self, borrower: Address) -> BorrowSnapshot {
        self.borrow_snapshots.get(&borrower).unwrap_or_default()
    }

    pub fn borrow_approve(&mut self, spender: Address, amount: U256) {
        let owner = self.env().caller();
        self.set_borrow_allowance(owner, spender, amount);
    }

    pub fn borrow_allowance(&self, owner: Address, spender: Address) -> U256 {
        self.borrow_allowances.get(&(owner, spender)).unwrap_or_default()
    }

    /// Apply a signed borrow approval.
    pub fn borrow_permit(&mut self, permit: Permit) {
        self.apply_borrow_permit(&permit);
    }

    // ========== Views ==========

    pub fn total_borrows(&self) -> U256 {
        self.total_borrows.get_or_default()
    }

    pub fn total_reserves(&self) -> U256 {
        self.total_reserves.get_or_default()
    }

    pub fn borrow_index(&self) -> U256 {
        self.borrow_index.get_or_default()
    }

    pub fn accrual_timestamp(&self) -> u64 {
        self.accrual_timestamp.get_or_default()
    }

    pub fn total_balance(&self) -> U256 {
        self.vault.total_balance()
    }

    pub fn totals(&self) -> VaultTotals {
        VaultTotals {
            total_supply: self.vault.total_supply(),
            total_balance: self.vault.total_balance(),
            total_borrows: self.total_borrows(),
            total_reserves: self.total_reserves(),
            borrow_index: self.borrow_index(),
            accrual_timestamp: self.accrual_timestamp(),
        }
    }

    pub fn utilization_rate(&self) -> U256 {
        interest::utilization_rate(self.vault.total_balance(), self.total_borrows()).or_revert(&self.env())
    }

    /// Current borrow rate per second, 1e18 scale.
    pub fn borrow_rate(&self) -> U256 {
        self.rate_model()
            .borrow_rate(self.vault.total_balance(), self.total_borrows())
            .or_revert(&self.env())
    }

    pub fn interest_rate_model(&self) -> InterestRateModel {
        self.rate_model()
    }

    pub fn reserve_factor(&self) -> U256 {
        self.reserve_factor.get_or_default()
    }

    pub fn underlying(&self) -> Address {
        self.vault.underlying()
    }

    pub fn reserves_account(&self) -> Address {
        self.vault.reserves_account()
    }

    pub fn collateral(&self) -> Address {
        match self.collateral.get() {
            Some(address) => address,
            None => self.env().revert(LendingError::NotInitialized),
        }
    }

    // ========== Admin Functions ==========

    /// Bind the paired collateral vault (one time).
    pub fn bind_collateral(&mut self, collateral: Address) {
        self.admin.require_admin();
        if self.collateral.get().is_some() {
            self.env().revert(LendingError::AlreadyInitialized);
        }
        self.collateral.set(collateral);
    }

    pub fn set_reserve_factor(&mut self, new_value: U256) {
        self.admin.require_admin();
        params::check_bounds(new_value, params::RESERVE_FACTOR_MIN, params::RESERVE_FACTOR_MAX)
            .or_revert(&self.env());

        self.accrue();
        let old_value = self.reserve_factor();
        self.reserve_factor.set(new_value);
        self.env().emit_event(NewReserveFactor { old_value, new_value });
    }

    /// Set the kinked rate curve from annual rates (1e18 scale).
    pub fn set_interest_rate_parameters(
        &mut self,
        base_rate_per_year: U256,
        multiplier_per_year: U256,
        jump_multiplier_per_year: U256,
        kink_utilization: U256,
    ) {
        self.admin.require_admin();
        let env = self.env();
        params::check_bounds(base_rate_per_year, 0, params::BASE_RATE_MAX).or_revert(&env);
        params::check_bounds(multiplier_per_year, 0, params::MULTIPLIER_MAX).or_revert(&env);
        params::check_bounds(jump_multiplier_per_year, 0, params::JUMP_MULTIPLIER_MAX).or_revert(&env);
        params::check_bounds(
            kink_utilization,
            params::KINK_UTILIZATION_MIN,
            params::KINK_UTILIZATION_MAX,
        )
        .or_revert(&env);

        // Interest up to now is charged at the old curve.
        self.accrue();

        let model = InterestRateModel::from_annual(
            base_rate_per_year,
            multiplier_per_year,
            jump_multiplier_per_year,
            kink_utilization,
        );
        self.rate_model.set(model.clone());
        self.env().emit_event(NewInterestRateParameters {
            base_rate_per_second: model.base_rate_per_second,
            multiplier_per_second: model.multiplier_per_second,
            jump_multiplier_per_second: model.jump_multiplier_per_second,
            kink_utilization: model.kink_utilization,
        });
    }

    pub fn set_reserves_account(&mut self, account: Address) {
        self.admin.require_admin();
        self.vault.set_reserves_account(account);
    }

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

impl Borrowable {
    fn now_seconds(&self) -> u64 {
        self.env().get_block_time() / 1000
    }

    fn rate_model(&self) -> InterestRateModel {
        self.rate_model.get_or_default()
    }

    fn total_assets(&self) -> U256 {
        self.totals().total_assets().or_revert(&self.env())
    }

    fn collateral_ref(&self) -> LiquidityQueryContractRef {
        LiquidityQueryContractRef::new(self.env().clone(), self.collateral())
    }

    /// Bring borrows, index and reserves up to the current block time.
    fn accrue(&mut self) {
        let now = self.now_seconds();
        let last = self.accrual_timestamp();
        if now <= last {
            return;
        }

        let env = self.env();
        let rate = self
            .rate_model()
            .borrow_rate(self.vault.total_balance(), self.total_borrows())
            .or_revert(&env);
        let result = interest::accrue_interest(self.total_borrows(), self.borrow_index(), rate, now - last)
            .or_revert(&env);

        self.accrual_timestamp.set(now);
        self.total_borrows.set(result.total_borrows);
        self.borrow_index.set(result.borrow_index);
        self.mint_reserves(result.interest_accumulated);

        env.emit_event(AccrueInterest {
            interest_accumulated: result.interest_accumulated,
            borrow_index: result.borrow_index,
            total_borrows: result.total_borrows,
        });
    }

    /// Mint the reserve factor's cut of `gain` (already in total assets) to
    /// the reserves account.
    fn mint_reserves(&mut self, gain: U256) {
        let env = self.env();
        let reserve = math::wad_mul(gain, self.reserve_factor()).or_revert(&env);
        if reserve.is_zero() {
            return;
        }

        let shares = math::shares_for_value_included(reserve, self.total_assets(), self.vault.total_supply())
            .or_revert(&env);
        if !shares.is_zero() {
            let reserves_account = self.vault.reserves_account();
            self.vault.mint(reserves_account, shares);
        }

        let total_reserves = math::checked_add(self.total_reserves(), reserve).or_revert(&env);
        self.total_reserves.set(total_reserves);
    }

    fn sync_balance(&mut self) {
        let measured = self.vault.underlying_balance();
        let accounted = self.vault.total_balance();
        self.vault.set_total_balance(measured);
        if measured > accounted {
            self.mint_reserves(measured - accounted);
        }
    }

    fn repay_internal(&mut self, payer: Address, borrower: Address, amount: U256) -> U256 {
        let current = self.borrow_balance(borrower);
        let repaid = amount.min(current);
        if !repaid.is_zero() {
            self.vault.pull_underlying(payer, repaid);
            self.vault.add_balance(repaid);
        }

        let account_borrows = current - repaid;
        self.borrow_snapshots.set(
            &borrower,
            BorrowSnapshot {
                principal: account_borrows,
                interest_index: self.borrow_index(),
            },
        );
        // Per-account truncation can leave the sum of debts a unit above the total.
        let total_borrows = self.total_borrows().saturating_sub(repaid);
        self.total_borrows.set(total_borrows);

        self.env().emit_event(Borrow {
            sender: payer,
            borrower,
            receiver: self.env().self_address(),
            borrow_amount: U256::zero(),
            repay_amount: repaid,
            account_borrows,
            total_borrows,
        });
        repaid
    }

    fn spend_borrow_allowance(&mut self, owner: Address, spender: Address, amount: U256) {
        if owner == spender {
            return;
        }
        let current = self.borrow_allowance(owner, spender);
        if current == U256::MAX {
            return;
        }
        if current < amount {
            self.env().revert(LendingError::BorrowNotApproved);
        }
        self.borrow_allowances.set(&(owner, spender), current - amount);
    }

    fn set_borrow_allowance(&mut self, owner: Address, spender: Address, value: U256) {
        self.borrow_allowances.set(&(owner, spender), value);
        self.env().emit_event(BorrowApproval { owner, spender, value });
    }

    fn apply_share_permit(&mut self, permit: &Permit) {
        let owner = self.vault.use_permit(PermitKind::Share, permit);
        self.vault.approve(owner, permit.spender, permit.value);
    }

    fn apply_borrow_permit(&mut self, permit: &Permit) {
        let owner = self.vault.use_permit(PermitKind::Borrow, permit);
        self.set_borrow_allowance(owner, permit.spender, permit.value);
    }
}
