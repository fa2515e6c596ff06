use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post, put};
use axum::{middleware, Json, Router};
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::types::Health;

use crate::auth::{self, ServerState};
use crate::bookings;
use crate::openapi::ApiDoc;
use crate::rate_limit;

#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses((status = 200, description = "Service is up"))
)]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn greeting() -> &'static str {
    "Hello Mate, thanks for visiting (y)our application. I hope you will enjoy the journey."
}

/// Build the full application router: public catalogue, token-protected
/// booking mutations, rate-limited auth, uploaded-image serving and the
/// Swagger UI.
pub fn build_router(state: ServerState, cors: CorsLayer, storage: &configs::StorageConfig) -> Router {
    // Only /auth carries the limiter; protected routes authenticate via the
    // CallerId extractor instead of middleware, so a public GET and a
    // protected POST can share a path without layering surprises.
    let auth_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::limit_auth_requests,
        ));

    // Multipart bodies need headroom over the image cap itself
    let upload = put(bookings::upload_booking_image)
        .layer(DefaultBodyLimit::max(storage.max_upload_bytes + 64 * 1024));

    let booking_routes = Router::new()
        .route("/booking", get(bookings::list_all_bookings).post(bookings::create_booking))
        .route("/booking/user", get(bookings::list_my_bookings))
        .route(
            "/booking/:id",
            put(bookings::update_booking).delete(bookings::delete_booking),
        )
        .route("/booking/:id/uploadImage", upload);

    Router::new()
        .route("/", get(greeting))
        .route("/health", get(health))
        .merge(auth_routes)
        .merge(booking_routes)
        .nest_service("/uploads", ServeDir::new(&storage.root_dir))
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
