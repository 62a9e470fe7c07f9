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

use super::{create_user, NewUser};

#[derive(Deserialize)]
pub(crate) struct SignUpForm {
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
    Form(SignUpForm { email, password }): Form<SignUpForm>,
) -> AppResult<Response> {
    let email = email.trim();
    if email.is_empty() {
        return Ok(render("Email is required").into_response());
    }
    if password.len() < 6 {
        return Ok(render("Password must be at least 6 characters").into_response());
    }

    let id = match create_user(&db_pool, email, &password).await? {
        NewUser::Created(id) => id,
        NewUser::EmailTaken => {
            return Ok(render("Email already registered").into_response());
        }
    };

    db::upsert_profile(&db_pool, &id, email).await?;
    session.insert(USER_ID, &id).await?;
    session.insert(USER_EMAIL, email).await?;

    Ok(Redirect::to("/chat").into_response())
}

fn render(error: &str) -> Html<String> {
    let error_html = if error.is_empty() {
        String::new()
    } else {
        format!(r#"<div class="error">{error}</div>"#)
    };
    Html(include_res!(str, "/pages/sign_up.html").replace("{error}", &error_html))
}
