//! mini_wallet Library
//!
//! Re-exports modules for integration testing and the binaries.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod store;

pub use config::{Config, LogFormat};
pub use error::{AppError, AppResult};
pub use domain::{Amount, AmountError, Balance, DomainError, OperationContext};
