use axum::{
    debug_handler,
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{db, include_res, session::{USER_EMAIL, USER_ID}, AppResult};

use super::verify_user;

#[derive(Deserialize)]
pub(crate) struct SignInForm {
    email: String,
    password: String,
}

#[debug_handler]
pub(crate) async fn page() -> impl IntoResponse {
    render("")
}

#[debug_handler]
pub(crate) async fn submit(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Form(SignInForm { email, password }): Form<SignInForm>,
) -> AppResult<Response> {
    let email = email.trim();

    let Some(id) = verify_user(&db_pool, email, &password).await? else {
        return Ok(render("Invalid email or password").into_response());
    };

    // First sign-in after a restore may not have a profile row yet;
    // the upsert is idempotent either way.
    db::upsert_profile(&db_pool, &id, email).await?;
    session.insert(USER_ID, &id).await?;
    session.insert(USER_EMAIL, email).await?;

    tracing::info!(user_id = %id, "signed in");

    Ok(Redirect::to("/chat").into_response())
}

fn render(error: &str) -> Html<String> {
    let error_html = if error.is_empty() {
        String::new()
    } else {
        format!(r#"<div class="error">{error}</div>"#)
    };
    Html(include_res!(str, "/pages/sign_in.html").replace("{error}", &error_html))
}
