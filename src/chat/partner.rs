use axum::{
    debug_handler,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{db, session::USER_ID, AppResult};

#[derive(Deserialize)]
pub(crate) struct PartnerQuery {
    email: String,
}

/// Resolves the conversation peer by exact email match. "Not found"
/// and "self" are ordinary responses, not errors; the client leaves
/// its current partner untouched on either.
#[debug_handler]
pub(crate) async fn lookup(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Query(PartnerQuery { email }): Query<PartnerQuery>,
) -> AppResult<Response> {
    let Some(user_id) = session.get::<String>(USER_ID).await? else {
        return Ok(StatusCode::UNAUTHORIZED.into_response());
    };

    let Some(profile) = db::profile_by_email(&db_pool, email.trim()).await? else {
        return Ok((
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "User not found" })),
        )
            .into_response());
    };

    if profile.id == user_id {
        return Ok((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "error": "Cannot chat with yourself" })),
        )
            .into_response());
    }

    Ok(Json(profile).into_response())
}
