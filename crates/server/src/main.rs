//! PowerLink server entry point.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{Router, http::StatusCode, middleware};
use powerlink_api::{AppState, auth_middleware, router as api_router};
use powerlink_common::{Config, LocalStorage, config::ServerConfig};
use powerlink_core::{
    AnnouncementService, AttachmentService, NoticeService, OutageService, ServiceRequestService,
    TokenService, UserService,
};
use powerlink_db::repositories::{
    AnnouncementRepository, NoticeRepository, OutageReportRepository, ServiceRequestRepository,
    UserRepository,
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Bounds each request by `server.request_timeout_secs`, answering 408 when exceeded.
fn request_timeout(server: &ServerConfig) -> TimeoutLayer {
    TimeoutLayer::with_status_code(
        StatusCode::REQUEST_TIMEOUT,
        Duration::from_secs(server.request_timeout_secs),
    )
}

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "powerlink=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting PowerLink server...");

    let config = Config::load().context("Failed to load configuration")?;

    let db = Arc::new(powerlink_db::init(&config).await?);
    info!("Connected to database");

    info!("Running database migrations...");
    powerlink_db::migrate(&db).await?;
    info!("Migrations completed");

    // Repositories
    let user_repo = UserRepository::new(Arc::clone(&db));
    let service_request_repo = ServiceRequestRepository::new(Arc::clone(&db));
    let outage_repo = OutageReportRepository::new(Arc::clone(&db));
    let announcement_repo = AnnouncementRepository::new(Arc::clone(&db));
    let notice_repo = NoticeRepository::new(Arc::clone(&db));

    // Services
    let tokens = TokenService::new(&config.auth.jwt_secret, config.auth.token_ttl_hours);
    let user_service = UserService::new(user_repo.clone(), tokens);
    let storage = LocalStorage::new(
        config.uploads.dir.clone(),
        config.uploads.public_path.clone(),
    );
    tokio::fs::create_dir_all(storage.base_path())
        .await
        .with_context(|| format!("Failed to create {}", config.uploads.dir.display()))?;

    if let Some(admin) = &config.admin {
        let admin = user_service.ensure_admin(admin).await?;
        info!(user_id = %admin.id, email = %admin.email, "Admin account ready");
    }

    let state = AppState {
        db: Arc::clone(&db),
        service_request_service: ServiceRequestService::new(service_request_repo, user_repo.clone()),
        outage_service: OutageService::new(outage_repo),
        announcement_service: AnnouncementService::new(announcement_repo, user_repo),
        notice_service: NoticeService::new(notice_repo),
        attachment_service: AttachmentService::new(Arc::new(storage), &config.uploads),
        user_service,
    };

    // Build router
    let app = Router::new()
        .nest("/api", api_router(&config.uploads))
        .nest_service(
            &config.uploads.public_path,
            ServeDir::new(&config.uploads.dir),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(request_timeout(&config.server))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server with graceful shutdown
    let addr: SocketAddr = config
        .bind_address()
        .parse()
        .with_context(|| format!("Invalid bind address {}", config.bind_address()))?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
