use axum::{
    debug_handler,
    extract::{
        ws::{self, WebSocket},
        Query, State, WebSocketUpgrade,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::broadcast;
use tower_sessions::Session;

use crate::{db::Message, session::USER_ID, AppResult, AppState};

#[derive(Deserialize)]
pub(crate) struct WsQuery {
    partner: String,
}

/// Live-update channel for one conversation. The socket is bound to
/// the (identity, partner) pair at upgrade time; the client closes it
/// and opens a new one when the partner changes.
#[debug_handler(state = AppState)]
pub(crate) async fn chat_ws(
    Query(WsQuery { partner }): Query<WsQuery>,
    State(tx): State<broadcast::Sender<Message>>,
    session: Session,
    ws: WebSocketUpgrade,
) -> AppResult<Response> {
    let Some(user_id) = session.get::<String>(USER_ID).await? else {
        return Ok(StatusCode::UNAUTHORIZED.into_response());
    };

    Ok(ws.on_upgrade(move |socket| relay(socket, tx, user_id, partner)))
}

async fn relay(
    socket: WebSocket,
    tx: broadcast::Sender<Message>,
    user_id: String,
    partner_id: String,
) {
    let mut rx = tx.subscribe();
    let (mut sender, mut receiver) = socket.split();

    let forward = tokio::spawn(async move {
        while let Ok(message) = rx.recv().await {
            if !concerns_pair(&message, &user_id, &partner_id) {
                continue;
            }
            let Ok(payload) = serde_json::to_string(&message) else {
                continue;
            };
            if sender.send(payload.into()).await.is_err() {
                break;
            }
        }
    });

    // The socket is notify-only; sends go over POST /chat/messages.
    // Draining the client half keeps the connection alive and lets us
    // observe the close frame.
    while let Some(Ok(frame)) = receiver.next().await {
        if let ws::Message::Close(_) = frame {
            break;
        }
    }

    forward.abort();
}

/// The two directed filter predicates of a conversation: messages the
/// user sent to the partner and messages the partner sent to the user.
fn concerns_pair(message: &Message, user_id: &str, partner_id: &str) -> bool {
    (message.sender_id == user_id && message.receiver_id == partner_id)
        || (message.sender_id == partner_id && message.receiver_id == user_id)
}
