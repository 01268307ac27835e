// SPDX-FileCopyrightText: 2026 Vaultkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `vaultkeep serve` command implementation.
//!
//! Parses the operator key material, opens storage, assembles the gateway,
//! and serves until SIGINT or SIGTERM.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use vaultkeep_auth::{CredentialHasher, SessionService};
use vaultkeep_config::VaultkeepConfig;
use vaultkeep_core::VaultkeepError;
use vaultkeep_crypto::{KeyCustodian, MasterKey};
use vaultkeep_gateway::{bind, register_metrics, Gateway, GatewayDeps, GatewayOptions};
use vaultkeep_storage::SqliteStorage;

/// Runs the `vaultkeep serve` command.
pub async fn run_serve(config: VaultkeepConfig) -> Result<(), VaultkeepError> {
    init_tracing(&config.logging.level);
    register_metrics();

    let deps = build_deps(&config).await?;
    let gateway = Gateway::new(deps, gateway_options(&config))?;

    let addr = format!("{}:{}", config.server.bind_address, config.server.port);
    let listener = bind(&addr).await?;

    let shutdown = install_signal_handler();
    gateway.serve(listener, shutdown).await?;
    info!("vaultkeep stopped");
    Ok(())
}

/// Builds every long-lived component from configuration.
///
/// Key material is parsed here once and handed to its owner. Nothing is
/// kept in process-global state.
pub async fn build_deps(config: &VaultkeepConfig) -> Result<GatewayDeps, VaultkeepError> {
    let master_hex = config
        .keys
        .master_key
        .as_deref()
        .ok_or_else(|| VaultkeepError::Config("keys.master_key is required".into()))?;
    let signing_key = config
        .session
        .signing_key
        .as_deref()
        .ok_or_else(|| VaultkeepError::Config("session.signing_key is required".into()))?;

    let custodian = KeyCustodian::new(MasterKey::from_hex(master_hex)?);
    let sessions = SessionService::new(
        signing_key,
        Duration::from_secs(config.session.lifetime_minutes * 60),
    )?;
    let hasher = CredentialHasher::new(
        config.password.memory_cost,
        config.password.iterations,
        config.password.parallelism,
    )?;

    let storage = SqliteStorage::new(config.storage.clone());
    storage.initialize().await?;
    debug!(path = %config.storage.database_path, "storage ready");

    Ok(GatewayDeps {
        store: Arc::new(storage),
        custodian: Arc::new(custodian),
        sessions: Arc::new(sessions),
        hasher,
    })
}

pub fn gateway_options(config: &VaultkeepConfig) -> GatewayOptions {
    GatewayOptions {
        session_header: config.session.header.clone(),
        default_deadline: Duration::from_secs(config.server.request_timeout_secs),
        shutdown_grace: Duration::from_secs(config.server.shutdown_grace_secs),
    }
}

/// Installs handlers for SIGTERM and SIGINT.
///
/// Returns a [`CancellationToken`] that is cancelled when either arrives.
fn install_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();

    tokio::spawn(async move {
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            match signal(SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    tokio::select! {
                        _ = ctrl_c => info!("received SIGINT, initiating shutdown"),
                        _ = sigterm.recv() => info!("received SIGTERM, initiating shutdown"),
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "SIGTERM handler unavailable, listening for SIGINT only");
                    let _ = ctrl_c.await;
                    info!("received SIGINT, initiating shutdown");
                }
            }
        }

        #[cfg(not(unix))]
        {
            let _ = ctrl_c.await;
            info!("received Ctrl+C, initiating shutdown");
        }

        trigger.cancel();
    });

    token
}

/// Initializes the tracing subscriber. `RUST_LOG` wins over the configured level.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("vaultkeep={log_level},warn")));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}
