use eatinn_server::config::Config;
use eatinn_server::{api, app, db, telemetry, AppState, RecipeStore};
use std::env;
use std::process::ExitCode;
use std::sync::Arc;

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl-C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received, draining requests");
}

#[tokio::main]
async fn main() -> ExitCode {
    // Check for --openapi flag to dump spec and exit
    if env::args().any(|arg| arg == "--openapi") {
        return match api::openapi().to_pretty_json() {
            Ok(spec) => {
                println!("{}", spec);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("failed to render OpenAPI spec: {e}");
                ExitCode::FAILURE
            }
        };
    }

    telemetry::init_telemetry();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    let pool = match db::create_pool(&config.database_url, &config.pool) {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!(error = %e, "database unavailable");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(
        max_connections = config.pool.max_connections,
        "database connection pool established"
    );

    let state: AppState =
        Arc::new(RecipeStore::new(pool).with_timeout(config.operation_timeout));

    let listener = match tokio::net::TcpListener::bind(config.bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, addr = %config.bind_addr, "failed to bind");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!("Server listening on {}", config.bind_addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", config.bind_addr);

    if let Err(e) = axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "server error");
        return ExitCode::FAILURE;
    }

    tracing::info!("server stopped");
    ExitCode::SUCCESS
}
