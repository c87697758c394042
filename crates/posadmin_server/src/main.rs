//! `posadmin-server` entry point.
//!
//! Startup order: logging, database open + migrations, default data seed,
//! then serve until ctrl-c.

use clap::Parser;
use log::{error, info};
use posadmin_core::{init_console_logging, init_logging, open_db, seed_defaults};
use posadmin_server::{router, AppState, ServerConfig};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let config = ServerConfig::parse();

    let logging = match config.log_dir.as_deref() {
        Some(dir) => init_logging(config.log_level(), dir),
        None => init_console_logging(config.log_level()),
    };
    if let Err(err) = logging {
        eprintln!("posadmin-server: {err}");
        return ExitCode::FAILURE;
    }

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=server_exit module=server status=error error={err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: ServerConfig) -> Result<(), String> {
    let conn = open_db(&config.database)
        .map_err(|err| format!("failed to open `{}`: {err}", config.database.display()))?;
    seed_defaults(&conn, config.admin_seed().as_ref())
        .map_err(|err| format!("failed to seed default data: {err}"))?;

    let app = router(AppState::new(conn));
    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .map_err(|err| format!("failed to bind {}: {err}", config.bind))?;
    info!(
        "event=server_start module=server status=ok bind={} database={}",
        config.bind,
        config.database.display()
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| format!("server error: {err}"))?;
    info!("event=server_stop module=server status=ok");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("event=signal_listen module=server status=error error={err}");
        std::future::pending::<()>().await;
    }
}
