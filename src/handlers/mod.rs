//! Command Handlers module
//!
//! Use cases that orchestrate the wallet domain against the store
//! capabilities. Each handler is constructed from trait objects so the
//! same code runs against PostgreSQL and the in-memory store.

mod account_handler;
mod commands;
mod deposit_handler;
mod wallet_handler;
mod withdrawal_handler;


pub use account_handler::InitAccountHandler;
pub use commands::*;
pub use deposit_handler::DepositHandler;
pub use wallet_handler::WalletHandler;
pub use withdrawal_handler::WithdrawalHandler;
