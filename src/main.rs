use std::sync::Arc;

use image_gen_server::{
    config::Config,
    create_app,
    database::Database,
    handlers::AppState,
    services::{GenerationService, HttpImageProvider, QuotaChecker},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "image_gen_server=debug,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env()?;

    let database = Database::new(&config.database_url).await?;
    database.migrate().await?;
    tracing::info!("connected to database");

    let provider = Arc::new(HttpImageProvider::from_config(&config)?);
    let generator = Arc::new(GenerationService::new(
        Arc::new(database.clone()),
        provider,
        QuotaChecker::new(config.daily_generation_limit),
    ));

    let port = config.port;
    let state = AppState {
        database,
        config,
        generator,
    };
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!("server running on port {}", port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
