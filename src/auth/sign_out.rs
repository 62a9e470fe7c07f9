use axum::{debug_handler, response::Redirect};
use tower_sessions::Session;

use crate::AppResult;

#[debug_handler]
pub(crate) async fn sign_out(session: Session) -> AppResult<Redirect> {
    session.clear().await;
    Ok(Redirect::to("/"))
}
