// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

use crate::routes;
use crate::store::MemoryStore;
use axum::Router;
use axum::routing::get;
use axum::serve::Serve;
use std::sync::Arc;
use tokio::net::TcpListener;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<MemoryStore>,
}

pub struct Application {
    server: Serve<TcpListener, Router, Router>,
}

impl Application {
    pub async fn build(address: &str, store: Arc<MemoryStore>) -> Result<Self, std::io::Error> {
        let listener = TcpListener::bind(address).await?;
        let server = run(listener, store)?;
        tracing::info!("[idp] listening at http://{}", server.local_addr()?);

        Ok(Self { server })
    }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.with_graceful_shutdown(shutdown_signal()).await
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("[idp] unable to listen for shutdown signal: {:?}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("[idp] stopping server");
}

pub fn create_router(store: Arc<MemoryStore>) -> Router {
    let state = Arc::new(AppState { store });

    Router::new()
        .route("/health", get(routes::health))
        .route("/services", get(routes::list_services))
        .route("/services/{id}", get(routes::get_service))
        .with_state(state)
}

#[tracing::instrument(skip(listener, store))]
pub fn run(
    listener: TcpListener,
    store: Arc<MemoryStore>,
) -> Result<Serve<TcpListener, Router, Router>, std::io::Error> {
    Ok(axum::serve(listener, create_router(store)))
}
