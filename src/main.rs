use axum::{routing::get, Router};
use pairchat::{auth, chat, db, index, res, AppState};
use tokio::sync::broadcast;
use tower_sessions::{cookie::SameSite, Expiry, MemoryStore, SessionManagerLayer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("pairchat=info")),
        )
        .init();

    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(false)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::hours(12)));

    let db_pool = db::connect(&dotenv::var("DATABASE_URL")?).await?;

    let app_state = AppState {
        db_pool,
        tx: broadcast::channel(64).0,
    };

    let app = Router::new()
        .route("/", get(index::index))
        .route("/style.css", get(res::style))
        .merge(auth::router())
        .nest("/chat", chat::router())
        .with_state(app_state)
        .layer(session_layer);

    let bind_addr = dotenv::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".into());
    tracing::info!(%bind_addr, "listening");
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
