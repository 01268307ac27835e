// SPDX-FileCopyrightText: 2026 Vaultkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-call authorization pipeline.
//!
//! Three stages run in a fixed order around every RPC route:
//!
//! 1. [`observe`]: applies the call deadline and records method, outcome
//!    code, and latency. Never rejects on its own.
//! 2. [`authenticate`]: if a session token is present, validates it and
//!    attaches an [`Identity`] to the request extensions.
//! 3. [`enforce`]: rejects calls to protected services that carry no
//!    [`Identity`].
//!
//! The order is fixed once in [`apply`] and must not be rearranged:
//! enforcement reads what authentication attached.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderName};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::Router;
use tower::ServiceBuilder;
use vaultkeep_auth::SessionService;
use vaultkeep_core::{VaultStore, VaultkeepError};
use vaultkeep_crypto::{AccountKey, KeyCustodian};

use crate::telemetry;
use crate::rpc::{
    code_for_status, RpcCode, RpcError, RpcMethod, RpcService, RPC_STATUS_HEADER, RPC_TIMEOUT_HEADER,
};

/// Authenticated caller, attached to the request by the authentication stage.
#[derive(Clone)]
pub struct Identity {
    pub account_id: String,
    pub login: String,
    /// The caller's unwrapped account key.
    pub key: AccountKey,
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identity")
            .field("account_id", &self.account_id)
            .field("login", &self.login)
            .field("key", &self.key)
            .finish()
    }
}

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = RpcError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<Identity>().cloned().ok_or_else(|| {
            tracing::error!(path = %parts.uri.path(), "handler reached without identity context");
            RpcError::internal()
        })
    }
}

/// Resolves session tokens into identities.
#[derive(Clone)]
pub struct Authenticator {
    store: Arc<dyn VaultStore>,
    custodian: Arc<KeyCustodian>,
    sessions: Arc<SessionService>,
    header: HeaderName,
}

impl Authenticator {
    pub fn new(
        store: Arc<dyn VaultStore>,
        custodian: Arc<KeyCustodian>,
        sessions: Arc<SessionService>,
        header: HeaderName,
    ) -> Self {
        Self {
            store,
            custodian,
            sessions,
            header,
        }
    }

    /// The session token presented in `headers`, if any.
    ///
    /// Accepts `Bearer <token>` or a bare token. An empty value counts as absent.
    pub fn token_from<'a>(&self, headers: &'a HeaderMap) -> Option<&'a str> {
        let value = headers.get(&self.header)?.to_str().ok()?.trim();
        let token = value.strip_prefix("Bearer ").unwrap_or(value).trim();
        (!token.is_empty()).then_some(token)
    }

    /// Validate a token, load the account, and unwrap its key.
    ///
    /// A bad token or a vanished account is `InvalidSession`. Storage and
    /// unwrap failures stay internal.
    pub async fn resolve(&self, token: &str) -> Result<Identity, VaultkeepError> {
        let claims = self.sessions.validate(token)?;

        let account = match self.store.get_account_by_login(&claims.login).await {
            Ok(account) => account,
            Err(VaultkeepError::NotFound(_)) => return Err(VaultkeepError::InvalidSession),
            Err(e) => return Err(e),
        };
        if account.id != claims.sub {
            return Err(VaultkeepError::InvalidSession);
        }

        let key = self.custodian.unwrap(&account.wrapped_key)?;
        Ok(Identity {
            account_id: account.id,
            login: account.login,
            key,
        })
    }
}

/// Deadline applied when the caller sends none.
#[derive(Debug, Clone, Copy)]
pub struct DeadlinePolicy {
    pub default: Duration,
}

impl DeadlinePolicy {
    /// Caller-supplied `rpc-timeout-ms`, falling back to the default.
    pub fn for_request(&self, headers: &HeaderMap) -> Duration {
        headers
            .get(RPC_TIMEOUT_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(self.default)
    }
}

/// Decide whether a call may reach its handler.
pub fn check_access(path: &str, identity: Option<&Identity>) -> Result<(), RpcError> {
    match RpcService::from_path(path) {
        Some(service) if service.is_protected() && identity.is_none() => Err(
            RpcError::unauthenticated("a session token is required for this service"),
        ),
        _ => Ok(()),
    }
}

/// Observability stage: deadline, outcome logging, and metrics.
pub async fn observe(State(deadlines): State<DeadlinePolicy>, request: Request, next: Next) -> Response {
    let method = RpcMethod::from_path(request.uri().path())
        .map(RpcMethod::name)
        .unwrap_or("unknown");
    let deadline = deadlines.for_request(request.headers());
    let start = Instant::now();

    let response = match tokio::time::timeout(deadline, next.run(request)).await {
        Ok(response) => response,
        Err(_) => RpcError::from(VaultkeepError::Timeout { duration: deadline }).into_response(),
    };

    let code = response
        .headers()
        .get(RPC_STATUS_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<RpcCode>().ok())
        .unwrap_or_else(|| code_for_status(response.status()));
    let latency = start.elapsed();

    telemetry::record_call(method, code, latency);
    if code == RpcCode::Ok {
        tracing::info!(method, code = %code, latency_ms = latency.as_millis() as u64, "rpc call");
    } else {
        tracing::warn!(method, code = %code, latency_ms = latency.as_millis() as u64, "rpc call");
    }

    response
}

/// Authentication stage: turn a presented token into an [`Identity`].
pub async fn authenticate(
    State(authenticator): State<Authenticator>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(token) = authenticator.token_from(request.headers()) {
        match authenticator.resolve(token).await {
            Ok(identity) => {
                tracing::debug!(account_id = %identity.account_id, "session resolved");
                request.extensions_mut().insert(identity);
            }
            Err(e) => return RpcError::from(e).into_response(),
        }
    }
    next.run(request).await
}

/// Enforcement stage: gate protected services on an attached [`Identity`].
pub async fn enforce(request: Request, next: Next) -> Response {
    let identity = request.extensions().get::<Identity>();
    match check_access(request.uri().path(), identity) {
        Ok(()) => next.run(request).await,
        Err(e) => e.into_response(),
    }
}

/// Wrap `router` in the three stages, outermost first.
pub fn apply<S>(router: Router<S>, deadlines: DeadlinePolicy, authenticator: Authenticator) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(
        ServiceBuilder::new()
            .layer(middleware::from_fn_with_state(deadlines, observe))
            .layer(middleware::from_fn_with_state(authenticator, authenticate))
            .layer(middleware::from_fn(enforce)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn identity() -> Identity {
        Identity {
            account_id: "acct-1".into(),
            login: "alice".into(),
            key: AccountKey::from_bytes([7; 32]),
        }
    }

    #[test]
    fn protected_service_needs_identity() {
        let err = check_access("/vaultkeep.VaultService/GetData", None).unwrap_err();
        assert_eq!(err.code, RpcCode::Unauthenticated);
        assert!(check_access("/vaultkeep.VaultService/GetData", Some(&identity())).is_ok());
    }

    #[test]
    fn unknown_vault_method_is_still_protected() {
        assert!(check_access("/vaultkeep.VaultService/Export", None).is_err());
    }

    #[test]
    fn unprotected_service_passes_without_identity() {
        assert!(check_access("/vaultkeep.UserService/Register", None).is_ok());
        assert!(check_access("/vaultkeep.UserService/Login", None).is_ok());
    }

    #[test]
    fn deadline_header_overrides_default() {
        let policy = DeadlinePolicy {
            default: Duration::from_secs(30),
        };
        let mut headers = HeaderMap::new();
        assert_eq!(policy.for_request(&headers), Duration::from_secs(30));

        headers.insert(RPC_TIMEOUT_HEADER, HeaderValue::from_static("250"));
        assert_eq!(policy.for_request(&headers), Duration::from_millis(250));

        headers.insert(RPC_TIMEOUT_HEADER, HeaderValue::from_static("soon"));
        assert_eq!(policy.for_request(&headers), Duration::from_secs(30));
    }

    #[test]
    fn identity_debug_hides_key() {
        let debug = format!("{:?}", identity());
        assert!(debug.contains("alice"));
        assert!(debug.contains("[REDACTED]"));
    }
}
