//! # tradeguard-core
//!
//! Core crate for the TradeGuard control plane. Contains the configuration
//! schema and loader, the closed [`ControlPlaneError`] taxonomy surfaced to
//! mobile clients, and the [`AppResult`] alias.
//!
//! This crate has **no** internal dependencies on other TradeGuard crates.

pub mod config;
pub mod error;
pub mod result;

pub use error::{ControlPlaneError, ErrorKind};
pub use result::AppResult;
