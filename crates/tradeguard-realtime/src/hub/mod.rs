//! The realtime hub: one long-lived push loop per authenticated device.

mod session;

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{CloseFrame, Message, WebSocket};
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::broadcast::error::RecvError;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};
use uuid::Uuid;

use tradeguard_auth::AuthService;
use tradeguard_core::config::realtime::RealtimeConfig;
use tradeguard_service::DashboardService;
use tradeguard_service::dashboard::parse_cursor;

use crate::authenticator::{WsAuthenticator, WsRejection};
use crate::message::OutboundMessage;
use crate::nudge::NudgeBus;

pub use session::HubSession;

type WsSink = SplitSink<WebSocket, Message>;

/// Query parameters of `GET /ws`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectParams {
    /// Access token.
    pub token: Option<String>,
    /// Tenant to follow; first in scope when absent.
    pub client_id: Option<String>,
    /// Newest activity timestamp the device already holds.
    pub since: Option<String>,
}

/// Serves hub connections.
#[derive(Clone)]
pub struct RealtimeHub {
    authenticator: WsAuthenticator,
    dashboard: DashboardService,
    nudges: Arc<NudgeBus>,
    config: RealtimeConfig,
}

impl std::fmt::Debug for RealtimeHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeHub")
            .field("config", &self.config)
            .finish()
    }
}

impl RealtimeHub {
    /// Creates the hub.
    pub fn new(
        auth: AuthService,
        dashboard: DashboardService,
        nudges: Arc<NudgeBus>,
        config: RealtimeConfig,
    ) -> Self {
        Self {
            authenticator: WsAuthenticator::new(auth),
            dashboard,
            nudges,
            config,
        }
    }

    /// The tenant nudge bus; register it as a notification channel.
    pub fn nudges(&self) -> Arc<NudgeBus> {
        Arc::clone(&self.nudges)
    }

    /// Runs one upgraded connection to completion.
    ///
    /// 1. Authenticate; refuse with a close code on failure
    /// 2. Push the initial snapshot and recent activity
    /// 3. Loop over the push tick, heartbeat, tenant nudges, and inbound frames
    pub async fn serve(self, socket: WebSocket, params: ConnectParams) {
        let (mut sink, mut stream) = socket.split();

        // Step 1: Authenticate
        let (auth, ctx) = match self
            .authenticator
            .authenticate(params.token.as_deref(), params.client_id.as_deref())
            .await
        {
            Ok(authenticated) => authenticated,
            Err(rejection) => {
                info!(code = rejection.code, reason = rejection.reason, "WebSocket connection refused");
                close(&mut sink, rejection).await;
                return;
            }
        };

        let conn_id = Uuid::new_v4();
        let resume_after = parse_cursor(params.since.as_deref()).unwrap_or_else(|_| {
            debug!(conn_id = %conn_id, "Ignoring malformed resume cursor");
            None
        });
        let mut session = HubSession::new(
            ctx.client_id.clone(),
            self.dashboard.clone(),
            self.config.initial_activity_limit,
            resume_after,
        );
        let mut nudges = self.nudges.subscribe(&ctx.client_id);

        info!(
            conn_id = %conn_id,
            session_id = %auth.session_id(),
            client_id = %ctx.client_id,
            device_id = %ctx.device_id,
            "Realtime connection established"
        );

        // Step 2: Initial push
        match session.initial_frames().await {
            Ok(frames) => {
                if !send_frames(&mut sink, frames).await {
                    info!(conn_id = %conn_id, "Realtime connection closed before initial push");
                    return;
                }
            }
            Err(e) => warn!(conn_id = %conn_id, error = %e, "Initial realtime push failed"),
        }

        // Step 3: Push loop
        let push_period = Duration::from_secs(self.config.push_interval_seconds.max(1));
        let heartbeat_period = Duration::from_secs(self.config.heartbeat_interval_seconds.max(1));
        let mut push = time::interval_at(Instant::now() + push_period, push_period);
        push.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut heartbeat = time::interval_at(Instant::now() + heartbeat_period, heartbeat_period);
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = push.tick() => {
                    if !tick(&mut sink, &mut session, conn_id).await {
                        break;
                    }
                }
                nudge = nudges.recv() => {
                    match nudge {
                        Ok(()) | Err(RecvError::Lagged(_)) => {
                            if !tick(&mut sink, &mut session, conn_id).await {
                                break;
                            }
                            push.reset();
                        }
                        Err(RecvError::Closed) => {
                            nudges = self.nudges.subscribe(session.client_id());
                        }
                    }
                }
                _ = heartbeat.tick() => {
                    if sink.send(Message::Ping(Default::default())).await.is_err() {
                        break;
                    }
                }
                inbound = stream.next() => {
                    match inbound {
                        Some(Ok(Message::Close(_))) | None => break,
                        Some(Ok(Message::Pong(_))) => debug!(conn_id = %conn_id, "Heartbeat acknowledged"),
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                            break;
                        }
                    }
                }
            }
        }

        info!(
            conn_id = %conn_id,
            client_id = %session.client_id(),
            "Realtime connection closed"
        );
    }
}

/// One periodic push. Returns `false` once the socket is gone; read
/// failures are logged and retried on the next tick.
async fn tick(sink: &mut WsSink, session: &mut HubSession, conn_id: Uuid) -> bool {
    match session.tick_frames().await {
        Ok(frames) => send_frames(sink, frames).await,
        Err(e) => {
            warn!(conn_id = %conn_id, error = %e, "Realtime tick failed; retrying next interval");
            true
        }
    }
}

async fn send_frames(sink: &mut WsSink, frames: Vec<OutboundMessage>) -> bool {
    for frame in frames {
        let text = match frame.to_json() {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "Failed to serialize realtime frame");
                continue;
            }
        };
        if sink.send(Message::Text(text.into())).await.is_err() {
            return false;
        }
    }
    true
}

async fn close(sink: &mut WsSink, rejection: WsRejection) {
    let frame = CloseFrame {
        code: rejection.code,
        reason: rejection.reason.into(),
    };
    if let Err(e) = sink.send(Message::Close(Some(frame))).await {
        debug!(error = %e, "Failed to send close frame");
    }
}
