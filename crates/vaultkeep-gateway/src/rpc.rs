// SPDX-FileCopyrightText: 2026 Vaultkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! RPC method table, status codes, and the error response.
//!
//! Methods are addressed as `POST /<service>/<method>`. Errors are returned
//! as `{"code", "message"}` with the code mirrored in the `rpc-status`
//! header and the HTTP status.

use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};
use vaultkeep_core::VaultkeepError;

/// Response header carrying the outcome code.
pub const RPC_STATUS_HEADER: &str = "rpc-status";

/// Request header carrying the caller's deadline in milliseconds.
pub const RPC_TIMEOUT_HEADER: &str = "rpc-timeout-ms";

/// Opaque message returned for every internal failure.
pub const INTERNAL_MESSAGE: &str = "internal server error";

pub use vaultkeep_core::RpcCode;

/// HTTP status mirroring an outcome code.
pub fn http_status(code: RpcCode) -> StatusCode {
    match code {
        RpcCode::Ok => StatusCode::OK,
        RpcCode::InvalidArgument => StatusCode::BAD_REQUEST,
        RpcCode::Unauthenticated => StatusCode::UNAUTHORIZED,
        RpcCode::NotFound => StatusCode::NOT_FOUND,
        RpcCode::AlreadyExists => StatusCode::CONFLICT,
        RpcCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        RpcCode::DeadlineExceeded => StatusCode::GATEWAY_TIMEOUT,
    }
}

/// Best-effort code for a response that carries no `rpc-status` header.
pub fn code_for_status(status: StatusCode) -> RpcCode {
    match status {
        s if s.is_success() => RpcCode::Ok,
        StatusCode::UNAUTHORIZED => RpcCode::Unauthenticated,
        StatusCode::NOT_FOUND => RpcCode::NotFound,
        StatusCode::CONFLICT => RpcCode::AlreadyExists,
        StatusCode::GATEWAY_TIMEOUT | StatusCode::REQUEST_TIMEOUT => RpcCode::DeadlineExceeded,
        s if s.is_client_error() => RpcCode::InvalidArgument,
        _ => RpcCode::Internal,
    }
}

/// Error body returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcError {
    pub code: RpcCode,
    pub message: String,
}

impl RpcError {
    pub fn new(code: RpcCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::new(RpcCode::Unauthenticated, message)
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(RpcCode::InvalidArgument, message)
    }

    pub fn internal() -> Self {
        Self::new(RpcCode::Internal, INTERNAL_MESSAGE)
    }
}

impl From<VaultkeepError> for RpcError {
    fn from(err: VaultkeepError) -> Self {
        if err.is_internal() {
            tracing::error!(error = %err, "internal failure");
            return Self::internal();
        }
        match err {
            VaultkeepError::InvalidArgument(msg) => Self::invalid_argument(msg),
            VaultkeepError::Unauthenticated(msg) => Self::unauthenticated(msg),
            VaultkeepError::InvalidSession => Self::unauthenticated("invalid session"),
            VaultkeepError::NotFound(what) => Self::new(RpcCode::NotFound, format!("{what} not found")),
            VaultkeepError::AlreadyExists(msg) => Self::new(RpcCode::AlreadyExists, msg),
            VaultkeepError::Timeout { .. } => Self::new(RpcCode::DeadlineExceeded, "deadline exceeded"),
            other => {
                tracing::error!(error = %other, "unclassified failure");
                Self::internal()
            }
        }
    }
}

impl IntoResponse for RpcError {
    fn into_response(self) -> Response {
        let status = http_status(self.code);
        let code = HeaderValue::from_static(self.code.as_str());
        let mut response = (status, Json(self)).into_response();
        response.headers_mut().insert(RPC_STATUS_HEADER, code);
        response
    }
}

/// Logical service a method belongs to. Authorization is decided per service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, AsRefStr, EnumIter)]
pub enum RpcService {
    #[strum(serialize = "vaultkeep.UserService")]
    User,
    #[strum(serialize = "vaultkeep.VaultService")]
    Vault,
}

impl RpcService {
    /// Whether calls to this service require an identity context.
    pub fn is_protected(self) -> bool {
        match self {
            Self::User => false,
            Self::Vault => true,
        }
    }

    /// Service named by the first segment of `/<service>/<method>`.
    pub fn from_path(path: &str) -> Option<Self> {
        let service = path.strip_prefix('/')?.split('/').next()?;
        service.parse().ok()
    }
}

/// Every callable method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum RpcMethod {
    Register,
    Login,
    AddData,
    GetData,
    GetAllByType,
    UpdateData,
    DeleteData,
}

impl RpcMethod {
    pub fn service(self) -> RpcService {
        match self {
            Self::Register | Self::Login => RpcService::User,
            _ => RpcService::Vault,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Register => "Register",
            Self::Login => "Login",
            Self::AddData => "AddData",
            Self::GetData => "GetData",
            Self::GetAllByType => "GetAllByType",
            Self::UpdateData => "UpdateData",
            Self::DeleteData => "DeleteData",
        }
    }

    /// Route path, e.g. `/vaultkeep.VaultService/AddData`.
    pub fn path(self) -> String {
        format!("/{}/{}", self.service(), self.name())
    }

    pub fn from_path(path: &str) -> Option<Self> {
        use strum::IntoEnumIterator;
        Self::iter().find(|m| m.path() == path)
    }
}
