use axum::{
    debug_handler,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{db, session::USER_ID, AppResult};

#[derive(Deserialize)]
pub(crate) struct HistoryQuery {
    partner: String,
}

/// Full conversation between the signed-in user and the partner,
/// oldest first. Runs once per partner change.
#[debug_handler]
pub(crate) async fn history(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Query(HistoryQuery { partner }): Query<HistoryQuery>,
) -> AppResult<Response> {
    let Some(user_id) = session.get::<String>(USER_ID).await? else {
        return Ok(StatusCode::UNAUTHORIZED.into_response());
    };

    let messages = db::history(&db_pool, &user_id, &partner).await?;
    Ok(Json(messages).into_response())
}
