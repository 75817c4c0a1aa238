//! Live claim feed over websocket.
//!
//! Each connection holds one bus subscription for its lifetime. Client
//! messages are ignored except close; the subscription is dropped as soon
//! as the socket goes away.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::{Officer, SharedState};
use crate::bus::ClaimStream;
use crate::model::ClaimBroadcast;

#[derive(Serialize)]
struct LiveEvent<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    claim: &'a ClaimBroadcast,
}

/// `GET /api/live`
pub async fn upgrade(
    State(state): State<SharedState>,
    Officer(officer_name): Officer,
    ws: WebSocketUpgrade,
) -> Response {
    // Subscribe before the upgrade completes so nothing published in
    // between is missed.
    let claims = state.bus.subscribe();
    info!(
        officer = %officer_name,
        subscribers = state.bus.subscriber_count(),
        "Live subscriber connected"
    );
    ws.on_upgrade(move |socket| forward(socket, claims, officer_name))
}

async fn forward(socket: WebSocket, mut claims: ClaimStream, officer_name: String) {
    let (mut sink, mut incoming) = socket.split();

    loop {
        tokio::select! {
            claim = claims.next() => {
                let Some(claim) = claim else { break };
                let payload = match serde_json::to_string(&LiveEvent {
                    kind: "new-claim",
                    claim: &claim,
                }) {
                    Ok(payload) => payload,
                    Err(e) => {
                        warn!(error = %e, claim_id = claim.id, "Failed to encode live event");
                        continue;
                    }
                };
                if sink.send(Message::Text(payload)).await.is_err() {
                    break;
                }
            }
            message = incoming.next() => match message {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => debug!(officer = %officer_name, "Ignoring client message"),
            },
        }
    }

    info!(officer = %officer_name, "Live subscriber disconnected");
}
