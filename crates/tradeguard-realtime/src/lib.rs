//! # tradeguard-realtime
//!
//! Real-time WebSocket hub for TradeGuard devices. Provides:
//!
//! - Token authentication at connect time with distinguishing close codes
//! - Per-connection dashboard snapshots and activity deltas on a fixed tick
//! - An activity cursor so reconnects never replay entries already sent
//! - Ping heartbeat on a separate interval
//! - A process-local tenant nudge bus so guarded actions push immediately

pub mod authenticator;
pub mod cursor;
pub mod hub;
pub mod message;
pub mod nudge;

pub use authenticator::{WsAuthenticator, WsRejection};
pub use cursor::ActivityCursor;
pub use hub::{ConnectParams, HubSession, RealtimeHub};
pub use message::OutboundMessage;
pub use nudge::NudgeBus;
