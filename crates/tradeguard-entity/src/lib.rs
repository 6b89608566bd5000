//! # tradeguard-entity
//!
//! Domain entity models for the TradeGuard control plane. Every struct in
//! this crate is either a database row or a value object passed between
//! the auth, control, and realtime layers. Row types additionally derive
//! `sqlx::FromRow`.

pub mod auth;
pub mod control;
pub mod dashboard;
pub mod session;
