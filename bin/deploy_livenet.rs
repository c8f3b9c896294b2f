//! Deploy one lending pair to Casper livenet/testnet using Odra livenet environment.
//!
//! Usage:
//!   cargo run --bin deploy_livenet --release
//!
//! Requires .env file with:
//!   ODRA_CASPER_LIVENET_SECRET_KEY_PATH=/path/to/secret_key.pem
//!   ODRA_CASPER_LIVENET_NODE_ADDRESS=https://node.testnet.casper.network
//!   ODRA_CASPER_LIVENET_CHAIN_NAME=casper-test
//!   ODRA_CASPER_LIVENET_PAYMENT_AMOUNT=200000000000
//!   PAIRLEND_BORROWABLE_TOKEN=hash-...   (asset lent out)
//!   PAIRLEND_COLLATERAL_TOKEN=hash-...   (asset pledged)
//!   PAIRLEND_ORACLE=hash-...             (price feed for the collateral asset)
//!
//! Optional:
//!   PAIRLEND_PAIR_SYMBOL=USD-LP          (share token symbol suffix)
//!   PAIRLEND_ADMIN=account-hash-...      (defaults to the deployer)
//!   PAIRLEND_RESERVES_ACCOUNT=account-hash-...  (defaults to the deployer)
//!   PAIRLEND_MANIFEST_PATH=deployments.json

use std::str::FromStr;

use odra::host::Deployer;
use odra::prelude::*;
use serde::Serialize;

use pairlend_contracts::borrowable::{Borrowable, BorrowableInitArgs};
use pairlend_contracts::collateral::{Collateral, CollateralInitArgs};

/// Addresses written to the manifest file
#[derive(Serialize)]
struct Manifest {
    chain_name: String,
    pair_symbol: String,
    deployer: String,
    admin: String,
    reserves_account: String,
    borrowable_token: String,
    collateral_token: String,
    oracle: String,
    borrowable: String,
    collateral: String,
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn required_address(key: &str) -> Address {
    let value = env_var(key).unwrap_or_else(|| panic!("{} is not set", key));
    Address::from_str(value.trim()).unwrap_or_else(|_| panic!("{} is not a valid address: {}", key, value))
}

fn optional_address(key: &str, default: Address) -> Address {
    match env_var(key) {
        Some(value) => Address::from_str(value.trim())
            .unwrap_or_else(|_| panic!("{} is not a valid address: {}", key, value)),
        None => default,
    }
}

fn main() {
    // Load environment from .env file
    dotenv::dotenv().ok();

    println!("=== Pairlend Livenet Deployment ===");
    println!();

    // Initialize Odra livenet environment
    let env = odra_casper_livenet_env::env();

    // Configure payment amount for deployments/calls (required for Casper 2.0 txs)
    let payment_amount: u64 = env_var("ODRA_CASPER_LIVENET_PAYMENT_AMOUNT")
        .and_then(|v| v.parse().ok())
        .unwrap_or(200_000_000_000);
    env.set_gas(payment_amount);

    let deployer = env.caller();
    println!("Deployer: {:?}", deployer);

    // Pair configuration
    let borrowable_token = required_address("PAIRLEND_BORROWABLE_TOKEN");
    let collateral_token = required_address("PAIRLEND_COLLATERAL_TOKEN");
    let oracle = required_address("PAIRLEND_ORACLE");
    let admin = optional_address("PAIRLEND_ADMIN", deployer);
    let reserves_account = optional_address("PAIRLEND_RESERVES_ACCOUNT", deployer);
    let pair_symbol = env_var("PAIRLEND_PAIR_SYMBOL").unwrap_or_else(|| String::from("PAIR"));
    let manifest_path = env_var("PAIRLEND_MANIFEST_PATH").unwrap_or_else(|| String::from("deployments.json"));

    println!("Borrowable token:  {:?}", borrowable_token);
    println!("Collateral token:  {:?}", collateral_token);
    println!("Oracle:            {:?}", oracle);
    println!("Admin:             {:?}", admin);
    println!("Reserves account:  {:?}", reserves_account);
    println!();

    // ==================== Phase 1: Borrowable ====================
    println!("=== Phase 1: Deploying Borrowable ===");
    // The deployer binds the pair below, so it stays admin until the handover.
    let mut borrowable = Borrowable::deploy(
        &env,
        BorrowableInitArgs {
            name: format!("Pairlend Borrowable {}", pair_symbol),
            symbol: format!("pb{}", pair_symbol),
            underlying: borrowable_token,
            admin: deployer,
            reserves_account,
        },
    );
    let borrowable_addr = borrowable.address().clone();
    println!("Borrowable deployed at: {:?}", borrowable_addr);
    println!();

    // ==================== Phase 2: Collateral ====================
    println!("=== Phase 2: Deploying Collateral ===");
    let mut collateral = Collateral::deploy(
        &env,
        CollateralInitArgs {
            name: format!("Pairlend Collateral {}", pair_symbol),
            symbol: format!("pc{}", pair_symbol),
            underlying: collateral_token,
            borrowable: borrowable_addr,
            oracle,
            admin: deployer,
            reserves_account,
        },
    );
    let collateral_addr = collateral.address().clone();
    println!("Collateral deployed at: {:?}", collateral_addr);
    println!();

    // ==================== Phase 3: Wiring ====================
    println!("=== Phase 3: Binding the pair ===");
    println!("Binding Borrowable -> Collateral...");
    borrowable.bind_collateral(collateral_addr);
    println!("Done.");

    if admin != deployer {
        println!("Nominating {:?} as pending admin...", admin);
        borrowable.set_pending_admin(Some(admin));
        collateral.set_pending_admin(Some(admin));
        println!("Done. The new admin must call accept_admin on both vaults.");
    }
    println!();

    // ==================== Manifest ====================
    let manifest = Manifest {
        chain_name: env_var("ODRA_CASPER_LIVENET_CHAIN_NAME").unwrap_or_default(),
        pair_symbol,
        deployer: format!("{:?}", deployer),
        admin: format!("{:?}", admin),
        reserves_account: format!("{:?}", reserves_account),
        borrowable_token: format!("{:?}", borrowable_token),
        collateral_token: format!("{:?}", collateral_token),
        oracle: format!("{:?}", oracle),
        borrowable: format!("{:?}", borrowable_addr),
        collateral: format!("{:?}", collateral_addr),
    };
    match serde_json::to_string_pretty(&manifest) {
        Ok(json) => match std::fs::write(&manifest_path, json) {
            Ok(()) => println!("Manifest written to {}", manifest_path),
            Err(err) => println!("Could not write manifest to {}: {}", manifest_path, err),
        },
        Err(err) => println!("Could not serialize manifest: {}", err),
    }

    println!();
    println!("=== Deployment Complete ===");
    println!();
    println!("Contract Addresses:");
    println!("  Borrowable:  {:?}", borrowable_addr);
    println!("  Collateral:  {:?}", collateral_addr);
}
