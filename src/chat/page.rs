use axum::{
    debug_handler,
    response::{Html, IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::{include_res, session::{USER_EMAIL, USER_ID}, AppResult};

#[debug_handler]
pub(crate) async fn chat(session: Session) -> AppResult<Response> {
    let Some(user_id) = session.get::<String>(USER_ID).await? else {
        return Ok(Redirect::to("/sign-in").into_response());
    };
    let user_email = session.get::<String>(USER_EMAIL).await?.unwrap_or_default();

    Ok(Html(
        include_res!(str, "/pages/chat.html")
            .replace("{user_id}", &user_id)
            .replace("{user_email}", &user_email),
    )
    .into_response())
}
