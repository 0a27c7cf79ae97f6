use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use fitback_events::{EmailConfig, EmailDelivery, EventBus, LogMailer, Mailer};
use fitback_vision::{FrameAnalyzer, VisionClient, VisionConfig};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fitback_api::background::session_cleanup;
use fitback_api::config::ServerConfig;
use fitback_api::notifications::NotificationRouter;
use fitback_api::router::build_app_router;
use fitback_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "fitback_api=debug,tower_http=debug".into());
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));
    let registry = tracing_subscriber::registry().with(filter);
    if json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = %config.port,
        secure_cookies = config.secure_cookies,
        "Loaded server configuration"
    );

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = fitback_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    fitback_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    fitback_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Admin seed ---
    let promoted = fitback_db::repositories::UserRepo::promote_admins(&pool, &config.admin_emails)
        .await
        .expect("Failed to seed administrators");
    tracing::info!(
        allow_listed = config.admin_emails.len(),
        promoted,
        "Administrator allow-list applied"
    );

    // --- Email ---
    let mailer: Arc<dyn Mailer> = match EmailConfig::from_env() {
        Some(email_config) => {
            let delivery =
                EmailDelivery::new(&email_config).expect("Invalid SMTP configuration");
            tracing::info!(smtp_host = %email_config.smtp_host, "SMTP email delivery enabled");
            Arc::new(delivery)
        }
        None => {
            tracing::warn!("SMTP_HOST not set, emails will be logged instead of sent");
            Arc::new(LogMailer)
        }
    };

    // --- Vision ---
    let frame_analyzer: Option<Arc<dyn FrameAnalyzer>> = match VisionConfig::from_env() {
        Some(vision_config) => {
            tracing::info!(
                api_url = %vision_config.api_url,
                model = %vision_config.model,
                "Video frame validation enabled"
            );
            let client: Arc<dyn FrameAnalyzer> = Arc::new(
                VisionClient::new(vision_config).expect("Invalid vision configuration"),
            );
            Some(client)
        }
        None => {
            tracing::warn!("VISION_API_URL not set, video validation disabled");
            None
        }
    };

    // --- Event bus ---
    let event_bus = Arc::new(EventBus::default());

    // Spawn notification router (emails review decisions to owners).
    let notification_router = NotificationRouter::new(pool.clone(), Arc::clone(&mailer));
    let router_handle = tokio::spawn(notification_router.run(event_bus.subscribe()));

    // Spawn the expired-session sweep.
    let cleanup_cancel = CancellationToken::new();
    let cleanup_handle = (config.session_cleanup_interval_secs > 0).then(|| {
        tokio::spawn(session_cleanup::run(
            pool.clone(),
            Duration::from_secs(config.session_cleanup_interval_secs),
            cleanup_cancel.clone(),
        ))
    });

    tracing::info!(
        session_cleanup = cleanup_handle.is_some(),
        "Background services started"
    );

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        mailer,
        frame_analyzer,
        event_bus: Arc::clone(&event_bus),
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");
    let grace = Duration::from_secs(config.shutdown_timeout_secs);

    cleanup_cancel.cancel();
    if let Some(handle) = cleanup_handle {
        let _ = tokio::time::timeout(grace, handle).await;
        tracing::info!("Session cleanup job stopped");
    }

    // Dropping the last sender closes the channel and ends the router loop.
    drop(event_bus);
    let _ = tokio::time::timeout(grace, router_handle).await;
    tracing::info!("Notification router shut down");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager (e.g. systemd, Docker, Kubernetes).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
