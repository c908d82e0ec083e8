// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Autorotate - sensor-driven display daemon
//!
//! Entry point for the autorotate binary.

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

use autorotate::backend::BackendFactory;
use autorotate::cli::Cli;
use autorotate::config::Settings;
use autorotate::daemon::Daemon;
use autorotate::sensor::{watch_presence, DbusConnector};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // `-v` raises the default level; `RUST_LOG` still takes precedence.
    let env_filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(cli.log_level().into())
        .from_env_lossy();
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let mut settings = match cli.config.as_deref() {
        Some(path) => Settings::load_from(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => Settings::load().with_context(|| {
            format!(
                "Failed to load settings from {}",
                Settings::default_path().display()
            )
        })?,
    };
    cli.apply_overrides(&mut settings);

    if cli.print_config {
        print!("{}", settings.to_toml()?);
        return Ok(());
    }

    let connector = DbusConnector::open(&settings.sensor)
        .await
        .context("Failed to connect to the message bus")?;
    let presence = watch_presence(connector.connection(), &settings.sensor.service_name)
        .await
        .context("Failed to watch for the sensor service")?;

    let backend = BackendFactory::create(&settings);
    info!("Using {} backend", backend.name());

    let mut daemon = Daemon::from_settings(Arc::new(connector), backend, &settings);

    info!("Waiting for iio-sensor-proxy to appear");
    daemon.run(presence, shutdown_signal()).await?;
    Ok(())
}

/// Resolves on SIGINT or SIGTERM.
async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = match signal(SignalKind::terminate()) {
        Ok(terminate) => terminate,
        Err(err) => {
            warn!("Cannot listen for SIGTERM: {}", err);
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = terminate.recv() => {}
    }
}
