mod api;
mod auth;
mod config;
mod db;
mod logger;
mod models;
mod repositories;
mod services;
mod utils;

use std::net::SocketAddr;

use tracing::{error, info};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let cfg = match config::Config::init_global() {
        Ok(cfg) => cfg,
        Err(err) => {
            eprintln!("Failed to load config: {err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = logger::init_logger(cfg) {
        eprintln!("Failed to init logger: {err}");
        std::process::exit(1);
    }

    if let Err(err) = db::init_global().await {
        error!("Failed to init database: {err}");
        std::process::exit(1);
    }

    cfg.print();

    let addr = SocketAddr::new(
        cfg.host
            .parse()
            .unwrap_or_else(|_| "0.0.0.0".parse().expect("fallback host")),
        cfg.port,
    );
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(err) => {
            error!("Failed to bind {addr}: {err}");
            std::process::exit(1);
        }
    };
    info!("Writer app server listening on http://{}", addr);

    let server = axum::serve(listener, api::router());
    if let Err(err) = server.with_graceful_shutdown(shutdown_signal()).await {
        error!("Server error: {err}");
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(err) => {
                error!("failed to install SIGTERM handler: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    info!("Shutdown signal received");
}
