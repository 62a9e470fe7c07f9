pub mod auth;
pub mod chat;
pub mod db;
pub mod index;
pub mod res;
pub mod session;

mod appresult;

pub use appresult::{AppError, AppResult};

use axum::extract::FromRef;
use sqlx::SqlitePool;
use tokio::sync::broadcast;

use crate::db::Message;

/// Shared handles, constructed once at startup and cloned into every
/// handler. `tx` carries every stored message to the live-update
/// sockets.
#[derive(Clone, FromRef)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub tx: broadcast::Sender<Message>,
}
