use axum::{
    debug_handler,
    response::{Html, IntoResponse, Response},
};
use tower_sessions::Session;

use crate::{include_res, session::USER_ID, AppResult};

#[debug_handler]
pub async fn index(session: Session) -> AppResult<Response> {
    let links = if session.get::<String>(USER_ID).await?.is_some() {
        r#"<a href="/chat"><button>Go to Chat</button></a>"#
    } else {
        r#"<a href="/sign-in"><button>Sign In</button></a>
           <a href="/sign-up"><button>Sign Up</button></a>"#
    };

    Ok(Html(include_res!(str, "/pages/index.html").replace("{links}", links)).into_response())
}
