use axum::{
    Router,
    extract::DefaultBodyLimit,
    handler::HandlerWithoutStateExt,
    http::{HeaderName, Request, Response, StatusCode},
    response::Html,
};
use tower::limit::ConcurrencyLimitLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use std::{net::SocketAddr, time::Duration};

use axum_catalog_web::{
    config::AppConfig,
    db::{create_client, init_store},
    repository::ProductRepository,
    routes::create_router,
    state::AppState,
    views::{self, Views},
};

// Upload bodies carry the product image; text fields are capped separately
// in the upload handler.
const BODY_LIMIT_BYTES: usize = 64 * 1024 * 1024;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,axum_catalog_web=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    let client = create_client(&config.database_url).await?;
    let database = client.database(&config.database_name);

    // The server still listens when the store is unreachable; requests that
    // need it will fail individually.
    match init_store(&database).await {
        Ok(()) => tracing::info!(db = %config.database_name, "connected to MongoDB"),
        Err(err) => tracing::error!(error = %err, "MongoDB connection failed"),
    }

    let upload_dir = config.upload_dir();
    tokio::fs::create_dir_all(&upload_dir).await?;

    let state = AppState {
        repo: ProductRepository::new(&database),
        views: Views::new()?,
        upload_dir,
    };

    let request_id_header = HeaderName::from_static("x-request-id");
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<_>| {
            let request_id = request
                .headers()
                .get("x-request-id")
                .and_then(|value| value.to_str().ok())
                .unwrap_or("-");
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = %request_id
            )
        })
        .on_request(|request: &Request<_>, _span: &tracing::Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "request started"
            );
        })
        .on_response(
            |response: &Response<_>, latency: Duration, _span: &tracing::Span| {
                tracing::info!(
                    status = %response.status(),
                    ms = %latency.as_millis(),
                    "request finished"
                );
            },
        );

    // Static assets (including uploaded images) resolve after the page
    // routes; anything else lands on the shared fallback view.
    let static_assets =
        ServeDir::new(&config.public_dir).not_found_service(not_found.into_service());

    let app = Router::new()
        .merge(create_router())
        .fallback_service(static_assets)
        .layer(trace_layer)
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES))
        .layer(ConcurrencyLimitLayer::new(100))
        .with_state(state);

    let addr = SocketAddr::from((config.host.parse::<std::net::IpAddr>()?, config.port));
    tracing::info!("listening on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;

    Ok(())
}

async fn not_found() -> (StatusCode, Html<String>) {
    (
        StatusCode::NOT_FOUND,
        Html(views::render_fallback(
            "Sorry we couldn't find what you're looking for",
        )),
    )
}
