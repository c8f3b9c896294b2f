//! Pairlend Contracts
//!
//! Isolated-pair, over-collateralized lending on Casper.
//!
//! ## Architecture
//!
//! - **Borrowable**: lenders' vault; borrow ledger and kinked interest model
//! - **Collateral**: borrowers' vault; account liquidity, redeem/transfer
//!   gating and liquidation
//! - **ShareVault**: share accounting embedded in both vaults
//! - **StrategyAdapter**: optional auto-compounding of idle collateral
//! - **AdminRegistry**: two-step admin handover embedded in both vaults
//!
//! The two vaults of a pair hold each other's address and interact only
//! through the `DebtQuery` and `LiquidityQuery` interfaces.

#![cfg_attr(target_arch = "wasm32", no_std)]

#[cfg(target_arch = "wasm32")]
extern crate alloc;

// Re-export odra for downstream usage
pub use odra;

// Core module declarations
pub mod errors;
pub mod math;
pub mod interest;
pub mod params;
pub mod types;
pub mod events;
pub mod interfaces;

// Contract modules
pub mod admin;
pub mod share_vault;
pub mod strategy;
pub mod borrowable;
pub mod collateral;

// Test doubles
#[cfg(feature = "mocks")]
pub mod mocks;
