// SPDX-FileCopyrightText: 2026 Vaultkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Router assembly and server lifecycle.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::http::HeaderName;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use vaultkeep_auth::{CredentialHasher, SessionService};
use vaultkeep_core::{VaultStore, VaultkeepError};
use vaultkeep_crypto::KeyCustodian;

use crate::accounts::AccountService;
use crate::handlers;
use crate::pipeline::{self, Authenticator, DeadlinePolicy};
use crate::rpc::RpcMethod;
use crate::vault::VaultService;

/// Largest accepted request body. Files travel inline.
pub const MAX_BODY_BYTES: usize = 64 * 1024 * 1024;

/// Components the gateway is built from. All are constructed once at startup.
pub struct GatewayDeps {
    pub store: Arc<dyn VaultStore>,
    pub custodian: Arc<KeyCustodian>,
    pub sessions: Arc<SessionService>,
    pub hasher: CredentialHasher,
}

/// Runtime knobs for the gateway.
#[derive(Debug, Clone)]
pub struct GatewayOptions {
    /// Request header that carries the session token.
    pub session_header: String,
    /// Deadline for calls that send no `rpc-timeout-ms`.
    pub default_deadline: Duration,
    /// How long in-flight calls may run once shutdown begins.
    pub shutdown_grace: Duration,
}

/// Shared state for the RPC handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub accounts: AccountService,
    pub vault: VaultService,
    pub store: Arc<dyn VaultStore>,
}

/// The assembled RPC server.
pub struct Gateway {
    router: Router,
    store: Arc<dyn VaultStore>,
    shutdown_grace: Duration,
}

impl Gateway {
    pub fn new(deps: GatewayDeps, options: GatewayOptions) -> Result<Self, VaultkeepError> {
        let header = HeaderName::try_from(options.session_header.to_ascii_lowercase())
            .map_err(|e| VaultkeepError::Config(format!("invalid session header name: {e}")))?;

        let state = GatewayState {
            accounts: AccountService::new(
                deps.store.clone(),
                deps.hasher,
                deps.custodian.clone(),
                deps.sessions.clone(),
            ),
            vault: VaultService::new(deps.store.clone()),
            store: deps.store.clone(),
        };
        let authenticator = Authenticator::new(deps.store.clone(), deps.custodian, deps.sessions, header);
        let deadlines = DeadlinePolicy {
            default: options.default_deadline,
        };

        Ok(Self {
            router: build_router(state, deadlines, authenticator),
            store: deps.store,
            shutdown_grace: options.shutdown_grace,
        })
    }

    /// A clone of the full router, for in-process calls.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve on `listener` until `shutdown` is cancelled.
    ///
    /// After cancellation no new connections are accepted and in-flight calls
    /// get the grace period to finish. Calls still running after it are
    /// aborted. Storage is closed last in every case.
    pub async fn serve(self, listener: TcpListener, shutdown: CancellationToken) -> Result<(), VaultkeepError> {
        if let Ok(addr) = listener.local_addr() {
            info!(%addr, "vaultkeep listening");
        }

        let stop = shutdown.clone();
        let server = axum::serve(listener, self.router)
            .with_graceful_shutdown(async move { stop.cancelled().await });
        let mut handle = tokio::spawn(async move { server.await });

        let finished = tokio::select! {
            result = &mut handle => Some(result),
            _ = shutdown.cancelled() => None,
        };

        let result = match finished {
            Some(result) => result,
            None => {
                info!(grace_secs = self.shutdown_grace.as_secs(), "shutdown requested, draining calls");
                match tokio::time::timeout(self.shutdown_grace, &mut handle).await {
                    Ok(result) => result,
                    Err(_) => {
                        warn!("grace period elapsed, aborting in-flight calls");
                        handle.abort();
                        Ok(Ok(()))
                    }
                }
            }
        };

        let served = match result {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(VaultkeepError::Internal(format!("server error: {e}"))),
            Err(e) if e.is_cancelled() => Ok(()),
            Err(e) => Err(VaultkeepError::Internal(format!("server task failed: {e}"))),
        };

        self.store.close().await?;
        info!("storage closed");
        served
    }
}

/// Bind the listening socket.
pub async fn bind(addr: &str) -> Result<TcpListener, VaultkeepError> {
    TcpListener::bind(addr)
        .await
        .map_err(|e| VaultkeepError::Config(format!("failed to bind {addr}: {e}")))
}

fn build_router(state: GatewayState, deadlines: DeadlinePolicy, authenticator: Authenticator) -> Router {
    let rpc = Router::new()
        .route(&RpcMethod::Register.path(), post(handlers::register))
        .route(&RpcMethod::Login.path(), post(handlers::login))
        .route(&RpcMethod::AddData.path(), post(handlers::add_data))
        .route(&RpcMethod::GetData.path(), post(handlers::get_data))
        .route(&RpcMethod::GetAllByType.path(), post(handlers::get_all_by_type))
        .route(&RpcMethod::UpdateData.path(), post(handlers::update_data))
        .route(&RpcMethod::DeleteData.path(), post(handlers::delete_data))
        .fallback(handlers::unknown_method)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state.clone());

    let public = Router::new()
        .route("/health", get(handlers::health))
        .with_state(state);

    public.merge(pipeline::apply(rpc, deadlines, authenticator))
}
