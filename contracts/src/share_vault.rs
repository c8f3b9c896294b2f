//! Share accounting shared by the borrowable and collateral vaults.
//!
//! Holds the share ledger, allowances, permit nonces and the vault's view
//! of its underlying balance. The embedding contract decides what "total
//! assets" means (cash only, or cash plus borrows) and passes it in.
//!
//! ## Dead shares
//! The first deposit mints `DEAD_SHARES` to the null account. They can never
//! be redeemed, so the share price cannot be inflated by a first depositor.

use odra::prelude::*;
use odra::casper_types::account::AccountHash;
use odra::casper_types::bytesrepr::{Bytes, ToBytes};
use odra::casper_types::U256;
use odra::ContractRef;
use crate::errors::{LendingError, OrRevert};
use crate::events::{Approval, Deposit, NewReservesAccount, Sync, Transfer, Withdraw};
use crate::interfaces::Cep18TokenContractRef;
use crate::math;
use crate::params::DEAD_SHARES;
use crate::types::{Permit, PermitKind};

/// Domain tag mixed into every permit digest
const PERMIT_DOMAIN: &[u8] = b"pairlend-permit-v1";

/// Owner of the dead shares
pub fn null_account() -> Address {
    Address::Account(AccountHash::default())
}

/// Share ledger submodule
#[odra::module(events = [Deposit, Withdraw, Transfer, Approval, Sync, NewReservesAccount])]
pub struct ShareVault {
    // ===== Token metadata =====
    name: Var<String>,
    symbol: Var<String>,
    decimals: Var<u8>,

    // ===== Share ledger =====
    /// Shares outstanding, dead shares included
    total_supply: Var<U256>,
    /// Balance mapping (owner -> shares)
    balances: Mapping<Address, U256>,
    /// Allowance mapping (owner, spender) -> shares
    allowances: Mapping<(Address, Address), U256>,
    /// Permit nonces, shared by share and borrow permits
    nonces: Mapping<Address, u64>,

    // ===== Vault state =====
    /// Underlying token contract
    underlying: Var<Address>,
    /// Underlying accounted by the vault, idle plus deployed
    total_balance: Var<U256>,
    /// Receiver of reserve and fee shares
    reserves_account: Var<Address>,
    /// Operation in progress
    locked: Var<bool>,
}

#[odra::module]
impl ShareVault {
    pub fn init(
        &mut self,
        name: String,
        symbol: String,
        decimals: u8,
        underlying: Address,
        reserves_account: Address,
    ) {
        self.name.set(name);
        self.symbol.set(symbol);
        self.decimals.set(decimals);
        self.underlying.set(underlying);
        self.reserves_account.set(reserves_account);
        self.total_supply.set(U256::zero());
        self.total_balance.set(U256::zero());
        self.locked.set(false);
    }

    pub fn name(&self) -> String {
        self.name.get_or_default()
    }

    pub fn symbol(&self) -> String {
        self.symbol.get_or_default()
    }

    pub fn decimals(&self) -> u8 {
        self.decimals.get_or_default()
    }

    pub fn total_supply(&self) -> U256 {
        self.total_supply.get_or_default()
    }

    pub fn total_balance(&self) -> U256 {
        self.total_balance.get_or_default()
    }

    pub fn balance_of(&self, account: Address) -> U256 {
        self.balances.get(&account).unwrap_or_default()
    }

    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.allowances.get(&(owner, spender)).unwrap_or_default()
    }

    pub fn nonce(&self, owner: Address) -> u64 {
        self.nonces.get(&owner).unwrap_or_default()
    }

    pub fn underlying(&self) -> Address {
        match self.underlying.get() {
            Some(address) => address,
            None => self.env().revert(LendingError::NotInitialized),
        }
    }

    pub fn reserves_account(&self) -> Address {
        match self.reserves_account.get() {
            Some(address) => address,
            None => self.env().revert(LendingError::NotInitialized),
        }
    }
}

impl ShareVault {
    // ========== Reentrancy lock ==========

    pub fn enter(&mut self) {
        if self.locked.get_or_default() {
            self.env().revert(LendingError::ReentrantCall);
        }
        self.locked.set(true);
    }

    pub fn exit(&mut self) {
        self.locked.set(false);
    }

    // ========== Deposit / redeem ==========

    /// Mint shares for `assets` already received by the vault.
    ///
    /// `total_assets` is the backing before this deposit. The first deposit
    /// mints `assets` shares of which `DEAD_SHARES` go to the null account.
    pub fn mint_for_deposit(&mut self, receiver: Address, assets: U256, total_assets: U256) -> U256 {
        if assets.is_zero() {
            self.env().revert(LendingError::ZeroShares);
        }

        let supply = self.total_supply();
        let shares = if supply.is_zero() {
            let dead = U256::from(DEAD_SHARES);
            if assets <= dead {
                self.env().revert(LendingError::ZeroShares);
            }
            self.mint(null_account(), dead);
            assets - dead
        } else {
            math::convert_to_shares(assets, total_assets, supply).or_revert(&self.env())
        };

        if shares.is_zero() {
            self.env().revert(LendingError::ZeroShares);
        }

        self.mint(receiver, shares);
        self.add_balance(assets);

        self.env().emit_event(Deposit {
            sender: self.env().caller(),
            owner: receiver,
            assets,
            shares,
        });
        shares
    }

    /// Burn `shares` from `owner` and return the assets they redeem for.
    ///
    /// The caller moves the underlying out; `cash` bounds what can leave.
    pub fn burn_for_redeem(
        &mut self,
        owner: Address,
        receiver: Address,
        shares: U256,
        total_assets: U256,
        cash: U256,
    ) -> U256 {
        if shares.is_zero() {
            self.env().revert(LendingError::ZeroAssets);
        }

        let supply = self.total_supply();
        if supply.is_zero() {
            self.env().revert(LendingError::InsufficientBalance);
        }

        let assets = math::convert_to_assets(shares, total_assets, supply).or_revert(&self.env());
        if assets.is_zero() {
            self.env().revert(LendingError::ZeroAssets);
        }
        if assets > cash {
            self.env().revert(LendingError::InsufficientCash);
        }

        self.burn(owner, shares);
        self.sub_balance(assets);

        self.env().emit_event(Withdraw {
            sender: self.env().caller(),
            receiver,
            owner,
            assets,
            shares,
        });
        assets
    }

    /// Exchange rate for the given backing, 1e18 before the first deposit.
    pub fn exchange_rate(&self, total_assets: U256) -> U256 {
        math::exchange_rate(total_assets, self.total_supply()).or_revert(&self.env())
    }

    // ========== Share ledger ==========

    pub fn mint(&mut self, to: Address, shares: U256) {
        let balance = self.balance_of(to);
        self.balances.set(&to, balance + shares);
        let supply = math::checked_add(self.total_supply(), shares).or_revert(&self.env());
        self.total_supply.set(supply);

        self.env().emit_event(Transfer {
            from: None,
            to: Some(to),
            amount: shares,
        });
    }

    pub fn burn(&mut self, from: Address, shares: U256) {
        let balance = self.balance_of(from);
        if balance < shares {
            self.env().revert(LendingError::InsufficientBalance);
        }
        self.balances.set(&from, balance - shares);
        let supply = self.total_supply() - shares;
        self.total_supply.set(supply);

        self.env().emit_event(Transfer {
            from: Some(from),
            to: None,
            amount: shares,
        });
    }

    pub fn transfer_shares(&mut self, from: Address, to: Address, shares: U256) {
        let from_balance = self.balance_of(from);
        if from_balance < shares {
            self.env().revert(LendingError::InsufficientBalance);
        }
        self.balances.set(&from, from_balance - shares);
        let to_balance = self.balance_of(to);
        self.balances.set(&to, to_balance + shares);

        self.env().emit_event(Transfer {
            from: Some(from),
            to: Some(to),
            amount: shares,
        });
    }

    pub fn approve(&mut self, owner: Address, spender: Address, value: U256) {
        self.allowances.set(&(owner, spender), value);
        self.env().emit_event(Approval { owner, spender, value });
    }

    /// Consume `amount` of the spender's allowance unless it is the owner.
    pub fn spend_allowance(&mut self, owner: Address, spender: Address, amount: U256) {
        if owner == spender {
            return;
        }
        let current = self.allowance(owner, spender);
        if current == U256::MAX {
            return;
        }
        if current < amount {
            self.env().revert(LendingError::InsufficientAllowance);
        }
        self.allowances.set(&(owner, spender), current - amount);
    }

    // ========== Accounted balance ==========

    pub fn add_balance(&mut self, assets: U256) {
        let total = math::checked_add(self.total_balance(), assets).or_revert(&self.env());
        self.total_balance.set(total);
    }

    pub fn sub_balance(&mut self, assets: U256) {
        let total = self.total_balance();
        if total < assets {
            self.env().revert(LendingError::InsufficientCash);
        }
        self.total_balance.set(total - assets);
    }

    /// Overwrite the accounted balance with a freshly measured value.
    pub fn set_total_balance(&mut self, total_balance: U256) {
        self.total_balance.set(total_balance);
        self.env().emit_event(Sync { total_balance });
    }

    // ========== Underlying token ==========

    fn token(&self) -> Cep18TokenContractRef {
        Cep18TokenContractRef::new(self.env().clone(), self.underlying())
    }

    /// Underlying held by this contract right now.
    pub fn underlying_balance(&self) -> U256 {
        self.token().balance_of(self.env().self_address())
    }

    pub fn pull_underlying(&self, from: Address, amount: U256) {
        self.token().transfer_from(from, self.env().self_address(), amount);
    }

    pub fn push_underlying(&self, to: Address, amount: U256) {
        self.token().transfer(to, amount);
    }

    // ========== Reserves ==========

    pub fn set_reserves_account(&mut self, new_account: Address) {
        let old_account = self.reserves_account();
        self.reserves_account.set(new_account);
        self.env().emit_event(NewReservesAccount {
            old_account,
            new_account,
        });
    }

    // ========== Permits ==========

    /// Digest an owner signs to authorize `spender` for `value`.
    pub fn permit_message(
        &self,
        kind: PermitKind,
        owner: Address,
        spender: Address,
        value: U256,
        deadline: u64,
    ) -> Bytes {
        let nonce = self.nonce(owner);
        let preimage = self
            .permit_preimage(kind, owner, spender, value, nonce, deadline)
            .map_err(|_| LendingError::InvalidSignature)
            .or_revert(&self.env());
        Bytes::from(self.env().hash(preimage).to_vec())
    }

    /// Verify `permit`, burn its nonce and return the owner it speaks for.
    ///
    /// `deadline` is compared against block time in milliseconds.
    pub fn use_permit(&mut self, kind: PermitKind, permit: &Permit) -> Address {
        if self.env().get_block_time() > permit.deadline {
            self.env().revert(LendingError::Expired);
        }

        let owner = Address::Account(permit.public_key.to_account_hash());
        let message = self.permit_message(kind, owner, permit.spender, permit.value, permit.deadline);
        if !self
            .env()
            .verify_signature(&message, &permit.signature, &permit.public_key)
        {
            self.env().revert(LendingError::InvalidSignature);
        }

        let next_nonce = self.nonce(owner) + 1;
        self.nonces.set(&owner, next_nonce);
        owner
    }

    fn permit_preimage(
        &self,
        kind: PermitKind,
        owner: Address,
        spender: Address,
        value: U256,
        nonce: u64,
        deadline: u64,
    ) -> Result<Vec<u8>, odra::casper_types::bytesrepr::Error> {
        let mut preimage = PERMIT_DOMAIN.to_vec();
        self.env().self_address().write_bytes(&mut preimage)?;
        preimage.push(kind.tag());
        owner.write_bytes(&mut preimage)?;
        spender.write_bytes(&mut preimage)?;
        value.write_bytes(&mut preimage)?;
        nonce.write_bytes(&mut preimage)?;
        deadline.write_bytes(&mut preimage)?;
        Ok(preimage)
    }
}
