mod history;
mod page;
mod partner;
mod send;
mod ws;

use axum::{routing::get, Router};

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(page::chat))
        .route("/partner", get(partner::lookup))
        .route("/messages", get(history::history).post(send::send))
        .route("/ws", get(ws::chat_ws))
}
