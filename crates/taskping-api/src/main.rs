// Taskping API server
//
// Per-user notification queue with SSE delivery: producers queue events,
// each connected client drains its own queue through a bounded stream
// session and acknowledges by cursor.

mod auth;
mod channels;
mod common;
mod notifications;
mod stream;

use anyhow::{Context, Result};
use axum::http::{header, HeaderValue, Method};
use axum::{routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use taskping_core::{DefaultRenderer, StreamConfig};
use taskping_storage::{Database, DbChannelPreferences, DbNotificationStore};

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        stream::stream_notifications,
        notifications::create_notification,
        channels::get_my_channels,
        channels::set_my_channels,
    ),
    components(
        schemas(
            taskping_core::NotificationItem,
            taskping_core::NotificationPayload,
            taskping_core::EventData,
            taskping_core::TaskData,
            taskping_core::CommentData,
            common::ErrorBody,
            notifications::CreateNotificationRequest,
            notifications::CreateNotificationResponse,
            channels::ChannelsResponse,
            channels::UpdateChannelsRequest,
        )
    ),
    tags(
        (name = "notifications", description = "Notification queueing and SSE delivery"),
        (name = "channels", description = "Per-user delivery channel selection")
    ),
    info(
        title = "Taskping API",
        version = "0.2.0",
        description = "Per-user server-push notification delivery over SSE",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskping_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("taskping-api starting...");

    // Initialize database
    let database_url =
        std::env::var("DATABASE_URL").context("DATABASE_URL environment variable required")?;
    let db = Database::from_url(&database_url)
        .await
        .context("Failed to connect to database")?;
    db.migrate().await.context("Failed to run migrations")?;
    tracing::info!("Connected to database");

    // Stream session knobs (lifetime, poll interval)
    let stream_config = StreamConfig::from_env();
    tracing::info!(
        session_lifetime = ?stream_config.session_lifetime,
        poll_interval = ?stream_config.poll_interval,
        "Stream session configured"
    );

    // Create app state
    let db = Arc::new(db);
    let store: Arc<dyn taskping_core::NotificationStore> =
        Arc::new(DbNotificationStore::new((*db).clone()));
    let prefs: Arc<dyn taskping_core::ChannelPreferences> =
        Arc::new(DbChannelPreferences::new((*db).clone()));
    let session_auth: Arc<dyn auth::Authenticator> = Arc::new(auth::DbSessionAuth::new(db.clone()));

    let stream_state = stream::AppState {
        store: store.clone(),
        prefs,
        renderer: Arc::new(DefaultRenderer),
        auth: session_auth.clone(),
        config: stream_config,
    };
    let notifications_state = notifications::AppState {
        store,
        auth: session_auth.clone(),
    };
    let channels_state = channels::AppState {
        db: db.clone(),
        auth: session_auth,
    };

    // Load CORS allowed origins from environment (optional)
    // Only needed when the client is served from a different origin
    // Example: CORS_ALLOWED_ORIGINS="https://app.example.com"
    let cors_origins: Vec<HeaderValue> = std::env::var("CORS_ALLOWED_ORIGINS")
        .ok()
        .filter(|origins| !origins.is_empty())
        .map(|origins| {
            origins
                .split(',')
                .filter_map(|origin| origin.trim().parse().ok())
                .collect()
        })
        .unwrap_or_default();

    if cors_origins.is_empty() {
        tracing::info!("CORS not configured (same-origin requests only)");
    } else {
        tracing::info!(origins = ?cors_origins, "CORS origins configured");
    }

    // Build API routes
    let api_routes = Router::new()
        .merge(stream::routes(stream_state))
        .merge(notifications::routes(notifications_state))
        .merge(channels::routes(channels_state));

    let app = Router::new()
        .route("/health", get(health))
        .merge(api_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()));

    // Add CORS layer only if origins are configured
    let app = if !cors_origins.is_empty() {
        app.layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(cors_origins))
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
                .allow_headers([
                    header::CONTENT_TYPE,
                    header::AUTHORIZATION,
                    header::ACCEPT,
                    header::CACHE_CONTROL,
                ])
                .allow_credentials(true),
        )
    } else {
        app
    };

    // Add tracing
    let app = app.layer(TraceLayer::new_for_http());

    // Start server
    let addr = std::env::var("TASKPING_ADDR").unwrap_or_else(|_| "0.0.0.0:9000".to_string());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
