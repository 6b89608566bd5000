//! # tradeguard-service
//!
//! Service layer of the TradeGuard control plane. Services orchestrate the
//! store traits from `tradeguard-database` and the authenticated caller
//! from `tradeguard-auth` into application use cases:
//!
//! - [`RequestContext`] resolves which tenant a request acts on
//! - [`ControlService`] runs guarded actions with their confirmation policy
//! - [`NotificationRouter`] fans control events out to best-effort channels
//! - [`DashboardService`] serves dashboard, strategy, and activity reads
//!
//! Services follow constructor injection; every collaborator is passed in
//! as an `Arc` at construction time.

pub mod context;
pub mod control;
pub mod dashboard;
pub mod notification;

pub use context::RequestContext;
pub use control::{Confirmation, ConfirmationPolicy, ControlOutcome, ControlService};
pub use dashboard::DashboardService;
pub use notification::{
    NotificationChannel, NotificationRouter, OpsWebhookChannel, TenantPushChannel,
    configured_channels,
};
