//! Protocol error definitions.

use odra::prelude::*;
use odra::ContractEnv;

/// Lending protocol errors
#[repr(u16)]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum LendingError {
    // Share vault errors (1xx)
    ZeroShares = 100,
    ZeroAssets = 101,
    InsufficientAllowance = 102,
    InsufficientBalance = 103,
    ReentrantCall = 104,

    // Borrow ledger errors (2xx)
    InsufficientLiquidity = 200,
    BorrowNotApproved = 201,
    InsufficientCash = 202,

    // Risk engine errors (3xx)
    Shortfall = 300,
    NotLiquidatable = 301,
    InsufficientShortfall = 302,
    InvalidPrice = 303,

    // Admin and parameter errors (4xx)
    NotAdmin = 400,
    ParameterOutOfRange = 401,
    Unauthorized = 402,

    // Wiring and strategy errors (5xx)
    AlreadyInitialized = 500,
    NotInitialized = 501,
    ReinvestFailed = 502,

    // Permit errors (6xx)
    Expired = 600,
    InvalidSignature = 601,

    // Arithmetic errors (7xx)
    MathOverflow = 700,
    DivisionByZero = 701,
}

impl LendingError {
    pub const fn message(&self) -> &'static str {
        match self {
            // Share vault
            LendingError::ZeroShares => "Deposit would mint zero shares",
            LendingError::ZeroAssets => "Redeem would return zero assets",
            LendingError::InsufficientAllowance => "Insufficient allowance",
            LendingError::InsufficientBalance => "Insufficient share balance",
            LendingError::ReentrantCall => "Reentrant call into vault",

            // Borrow ledger
            LendingError::InsufficientLiquidity => "Borrow exceeds account liquidity",
            LendingError::BorrowNotApproved => "Borrow not approved",
            LendingError::InsufficientCash => "Insufficient cash in vault",

            // Risk engine
            LendingError::Shortfall => "Operation would leave account in shortfall",
            LendingError::NotLiquidatable => "Position is not liquidatable",
            LendingError::InsufficientShortfall => "Account has no shortfall",
            LendingError::InvalidPrice => "Oracle returned an invalid price",

            // Admin
            LendingError::NotAdmin => "Unauthorized: caller is not admin",
            LendingError::ParameterOutOfRange => "Parameter out of range",
            LendingError::Unauthorized => "Unauthorized: caller is not the paired vault",

            // Wiring and strategy
            LendingError::AlreadyInitialized => "Already initialized",
            LendingError::NotInitialized => "Not initialized",
            LendingError::ReinvestFailed => "Reinvest failed",

            // Permit
            LendingError::Expired => "Deadline expired",
            LendingError::InvalidSignature => "Invalid permit signature",

            // Arithmetic
            LendingError::MathOverflow => "Arithmetic overflow",
            LendingError::DivisionByZero => "Division by zero",
        }
    }
}

impl core::fmt::Display for LendingError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.message())
    }
}

impl From<LendingError> for OdraError {
    fn from(error: LendingError) -> Self {
        #[cfg(target_arch = "wasm32")]
        {
            OdraError::user(error as u16)
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            OdraError::user(error as u16, error.message())
        }
    }
}

/// Result type for fixed-point and accounting helpers
pub type LendingResult<T> = Result<T, LendingError>;

/// Lifts a [`LendingResult`] into a contract revert.
pub trait OrRevert<T> {
    fn or_revert(self, env: &ContractEnv) -> T;
}

impl<T> OrRevert<T> for LendingResult<T> {
    fn or_revert(self, env: &ContractEnv) -> T {
        match self {
            Ok(value) => value,
            Err(error) => env.revert(error),
        }
    }
}
