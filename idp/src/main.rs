// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use idp_bootstrap::application::Application;
use idp_bootstrap::bootstrap::Bootstrap;
use idp_bootstrap::configuration::{IdpConfig, IdpOptions};
use idp_bootstrap::fetcher::HttpFetcher;
use idp_bootstrap::registrar::Registrar;
use idp_bootstrap::retry;
use idp_bootstrap::store::MemoryStore;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    println!("[idp] init");

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        // this needs to be set to remove duplicated information in the log.
        .with_current_span(false)
        .with_ansi(false)
        .without_time()
        .with_target(false)
        .init();

    let options = IdpOptions::parse();

    tracing::info!("[idp] {:?}", &options);

    let config = IdpConfig::from_file(&options.config).context("cannot load config")?;
    let address = config.listen_address().context("cannot parse base URL")?;
    if config.address.starts_with("https") {
        tracing::warn!("[idp] TLS termination is not handled here, serving plain HTTP");
    }

    let store = Arc::new(MemoryStore::new());

    let application = Application::build(&address, store.clone())
        .await
        .context("cannot create listener")?;
    let server = tokio::spawn(application.run_until_stopped());

    let fetcher = HttpFetcher::new(options.fetch_timeout, options.insecure_skip_verify)
        .context("cannot build metadata client")?;
    let bootstrap = Bootstrap::new(retry::policy(
        Registrar::new(fetcher, store),
        options.max_attempts,
        options.backoff,
    ))
    .with_span(tracing::info_span!(
        "bootstrap",
        config = %options.config.display()
    ));

    bootstrap
        .run(&config.sp_metadata_urls, options.bootstrap_timeout)
        .await
        .context("cannot bootstrap SPs")?;

    server.await.context("server task failed")??;

    Ok(())
}
