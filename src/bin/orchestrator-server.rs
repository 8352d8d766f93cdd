//! Orchestrator server binary: loads `Config` from the environment,
//! connects the audit database, and serves the HTTP surface (spec §6).

use std::net::SocketAddr;
use std::sync::Arc;

use orchestrator::activities::Activities;
use orchestrator::api::routes::{create_router, AppState};
use orchestrator::api::ws::BroadcastState;
use orchestrator::config::Config;
use orchestrator::db::DatabaseConnection;
use orchestrator::interpreter::InProcessDurableContext;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let rust_log = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt().with_env_filter(rust_log).init();

    let config = Arc::new(Config::from_env());
    tracing::info!(host = %config.host, port = config.port, "starting orchestrator server");

    let db = DatabaseConnection::new(&config.database_url).await?;
    tracing::info!("running database migrations");
    db.run_migrations().await?;
    db.health_check().await?;

    let activities = Activities::new(config.clone(), db.pool().clone());

    let app_state = AppState {
        db,
        activities,
        ctx: Arc::new(InProcessDurableContext::new()),
        broadcast: Arc::new(BroadcastState::new()),
    };

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let app = create_router(app_state);

    tracing::info!(%addr, "listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("orchestrator server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.expect("failed to install CTRL-C signal handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received CTRL-C, shutting down"),
        _ = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
