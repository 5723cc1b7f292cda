// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{env, net::SocketAddr, path::PathBuf};

use tracing_subscriber::EnvFilter;

use commerce_rust_server::{
    api::router,
    auth::TokenService,
    config::{DATA_DIR_ENV, DEFAULT_DATA_DIR, HOST_ENV, LOG_FORMAT_ENV, PORT_ENV},
    state::AppState,
    storage::Database,
};

#[tokio::main]
async fn main() {
    init_tracing();

    // Load token configuration (panics if SECRET_KEY is missing - signing is mandatory)
    let tokens = TokenService::from_env().expect("Failed to load token configuration");

    let data_dir: PathBuf = env::var(DATA_DIR_ENV)
        .unwrap_or_else(|_| DEFAULT_DATA_DIR.to_string())
        .into();
    let db = Database::open(&data_dir).expect("Failed to open database");

    let state = AppState::new(db, tokens);
    let app = router(state);

    // Parse bind address
    let host = env::var(HOST_ENV).unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var(PORT_ENV)
        .unwrap_or_else(|_| "8080".to_string())
        .parse()
        .unwrap_or(8080);

    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .expect("Failed to parse bind address");

    tracing::info!(%addr, data_dir = %data_dir.display(), "commerce server listening (docs at /docs)");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server failed");
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));

    let json = env::var(LOG_FORMAT_ENV)
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install shutdown signal handler");
    tracing::info!("shutdown signal received");
}
