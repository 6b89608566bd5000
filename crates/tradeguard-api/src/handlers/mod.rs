//! Route handlers organized by domain.

pub mod auth;
pub mod controls;
pub mod dashboard;
pub mod devices;
pub mod health;
pub mod ws;
