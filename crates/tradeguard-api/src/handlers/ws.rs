//! WebSocket upgrade handler.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::Response;
use tracing::debug;

use tradeguard_realtime::ConnectParams;

use crate::state::AppState;

/// GET /ws?token={jwt}&clientId=&since=
///
/// Upgrades first; the hub authenticates and refuses with a close code.
/// An unparseable query upgrades too and is refused as a missing token.
pub async fn ws_handler(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
    query: Result<Query<ConnectParams>, QueryRejection>,
) -> Response {
    let params = connect_params(query);
    let hub = state.realtime.clone();
    ws.on_upgrade(move |socket| hub.serve(socket, params))
}

fn connect_params(query: Result<Query<ConnectParams>, QueryRejection>) -> ConnectParams {
    match query {
        Ok(Query(params)) => params,
        Err(rejection) => {
            debug!(error = %rejection, "Malformed WebSocket query; connecting without credentials");
            ConnectParams::default()
        }
    }
}
