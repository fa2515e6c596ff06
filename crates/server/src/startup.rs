use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tower_http::cors::CorsLayer;
use tracing::info;

use service::booking::repo::seaorm::SeaOrmBookingRepository;
use service::booking::service::BookingService;
use service::storage::fs::FsBlobStore;

use crate::auth::{ServerAuthConfig, ServerState};
use crate::rate_limit::{FixedWindowLimiter, AUTH_MAX_REQUESTS, AUTH_WINDOW};
use crate::routes;

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Public entry: wire up state from config and run the HTTP server.
/// Fails fast on missing configuration, most notably the JWT secret.
pub async fn run() -> anyhow::Result<()> {
    let cfg = configs::AppConfig::load_and_validate()?;

    let db = models::db::connect(&cfg.database).await?;

    let blob_store = FsBlobStore::new(
        &cfg.storage.root_dir,
        &cfg.storage.public_base_url,
        cfg.storage.max_upload_bytes,
    )
    .await?;

    let bookings = BookingService::new(Arc::new(SeaOrmBookingRepository { db: db.clone() }));

    let state = ServerState {
        db,
        auth: ServerAuthConfig {
            jwt_secret: cfg.auth.jwt_secret.clone(),
            token_ttl_secs: cfg.auth.token_ttl_secs,
        },
        bookings: Arc::new(bookings),
        blob_store: Arc::new(blob_store),
        auth_limiter: FixedWindowLimiter::new(AUTH_MAX_REQUESTS, AUTH_WINDOW),
    };

    let app: Router = routes::build_router(state, build_cors(), &cfg.storage);

    let addr: SocketAddr = format!("{}:{}", cfg.server.host, cfg.server.port).parse()?;
    info!(%addr, uploads = %cfg.storage.root_dir, "starting booking api");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    // ConnectInfo feeds the rate limiter's client-ip fallback
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;
    Ok(())
}
