use axum::{
    debug_handler,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use sqlx::SqlitePool;
use tokio::sync::broadcast;
use tower_sessions::Session;

use crate::{db, db::Message, session::USER_ID, AppResult, AppState};

#[derive(Deserialize)]
pub(crate) struct SendBody {
    receiver_id: String,
    content: String,
}

/// Stores one message and pushes it onto the notification channel.
/// The sender's own view is updated by the echoed notification, not
/// by this response.
#[debug_handler(state = AppState)]
pub(crate) async fn send(
    State(db_pool): State<SqlitePool>,
    State(tx): State<broadcast::Sender<Message>>,
    session: Session,
    Json(SendBody { receiver_id, content }): Json<SendBody>,
) -> AppResult<Response> {
    let Some(user_id) = session.get::<String>(USER_ID).await? else {
        return Ok(StatusCode::UNAUTHORIZED.into_response());
    };

    let Some(content) = clean_content(&content) else {
        return Ok(StatusCode::UNPROCESSABLE_ENTITY.into_response());
    };

    let message = db::insert_message(&db_pool, &user_id, &receiver_id, &content).await?;

    // No subscribers is fine; the row is already stored.
    let _ = tx.send(message.clone());

    Ok((StatusCode::CREATED, Json(message)).into_response())
}

/// Trims the draft; whitespace-only content means no insert happens.
fn clean_content(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::clean_content;

    #[test]
    fn whitespace_only_content_is_rejected() {
        assert_eq!(clean_content(""), None);
        assert_eq!(clean_content("   \t\n"), None);
    }

    #[test]
    fn content_is_trimmed() {
        assert_eq!(clean_content("  hi  ").as_deref(), Some("hi"));
    }
}
