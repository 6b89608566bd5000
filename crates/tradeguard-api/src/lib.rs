//! # tradeguard-api
//!
//! HTTP API layer for TradeGuard built on Axum.
//!
//! Provides the `/v1` REST endpoints, the `/ws` upgrade into the realtime
//! hub, the bearer extractor, request DTOs, error mapping, and the
//! dependency container every handler receives as state.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, run_server};
pub use error::ApiError;
pub use state::{AppState, Stores};
