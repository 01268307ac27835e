// SPDX-FileCopyrightText: 2026 Vaultkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! RPC handlers: decode the request body, call a mediator, encode the reply.
//!
//! Payload bytes travel as standard base64. Metadata travels as a JSON
//! document inside a string field.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use vaultkeep_core::{DataType, ItemSummary};

use crate::pipeline::Identity;
use crate::rpc::{RpcCode, RpcError};
use crate::server::GatewayState;

/// Register and Login request.
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub login: String,
    pub password: SecretString,
}

#[derive(Serialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct AddDataRequest {
    pub data_type: String,
    pub payload: String,
    #[serde(default)]
    pub meta: String,
}

#[derive(Debug, Serialize)]
pub struct AddDataResponse {
    pub id: String,
}

/// GetData and DeleteData request.
#[derive(Debug, Deserialize)]
pub struct ItemIdRequest {
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct GetDataResponse {
    pub data_type: DataType,
    pub payload: String,
    pub meta: String,
}

#[derive(Debug, Deserialize)]
pub struct GetAllByTypeRequest {
    pub data_type: String,
}

#[derive(Debug, Serialize)]
pub struct GetAllByTypeResponse {
    pub items: Vec<ItemSummary>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateDataRequest {
    pub id: String,
    pub payload: String,
    #[serde(default)]
    pub meta: String,
}

/// Empty success body.
#[derive(Debug, Serialize)]
pub struct Empty {}

type RpcResult<T> = Result<Json<T>, RpcError>;

fn decode_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, RpcError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| RpcError::invalid_argument(rejection.body_text()))
}

fn decode_payload(payload: &str) -> Result<Vec<u8>, RpcError> {
    STANDARD
        .decode(payload)
        .map_err(|e| RpcError::invalid_argument(format!("payload is not valid base64: {e}")))
}

pub async fn register(
    State(state): State<GatewayState>,
    body: Result<Json<CredentialsRequest>, JsonRejection>,
) -> RpcResult<TokenResponse> {
    let req = decode_body(body)?;
    let token = state.accounts.register(&req.login, &req.password).await?;
    Ok(Json(TokenResponse { token }))
}

pub async fn login(
    State(state): State<GatewayState>,
    body: Result<Json<CredentialsRequest>, JsonRejection>,
) -> RpcResult<TokenResponse> {
    let req = decode_body(body)?;
    let token = state.accounts.login(&req.login, &req.password).await?;
    Ok(Json(TokenResponse { token }))
}

pub async fn add_data(
    State(state): State<GatewayState>,
    identity: Identity,
    body: Result<Json<AddDataRequest>, JsonRejection>,
) -> RpcResult<AddDataResponse> {
    let req = decode_body(body)?;
    let payload = decode_payload(&req.payload)?;
    let id = state
        .vault
        .add(&identity, &req.data_type, &payload, &req.meta)
        .await?;
    Ok(Json(AddDataResponse { id }))
}

pub async fn get_data(
    State(state): State<GatewayState>,
    identity: Identity,
    body: Result<Json<ItemIdRequest>, JsonRejection>,
) -> RpcResult<GetDataResponse> {
    let req = decode_body(body)?;
    let item = state.vault.get(&identity, &req.id).await?;
    Ok(Json(GetDataResponse {
        data_type: item.data_type,
        payload: STANDARD.encode(&item.payload),
        meta: item.meta,
    }))
}

pub async fn get_all_by_type(
    State(state): State<GatewayState>,
    identity: Identity,
    body: Result<Json<GetAllByTypeRequest>, JsonRejection>,
) -> RpcResult<GetAllByTypeResponse> {
    let req = decode_body(body)?;
    let items = state.vault.list_by_type(&identity, &req.data_type).await?;
    Ok(Json(GetAllByTypeResponse { items }))
}

pub async fn update_data(
    State(state): State<GatewayState>,
    identity: Identity,
    body: Result<Json<UpdateDataRequest>, JsonRejection>,
) -> RpcResult<Empty> {
    let req = decode_body(body)?;
    let payload = decode_payload(&req.payload)?;
    state
        .vault
        .update(&identity, &req.id, &payload, &req.meta)
        .await?;
    Ok(Json(Empty {}))
}

pub async fn delete_data(
    State(state): State<GatewayState>,
    identity: Identity,
    body: Result<Json<ItemIdRequest>, JsonRejection>,
) -> RpcResult<Empty> {
    let req = decode_body(body)?;
    state.vault.delete(&identity, &req.id).await?;
    Ok(Json(Empty {}))
}

/// Fallback for paths that name no known method.
pub async fn unknown_method() -> RpcError {
    RpcError::new(RpcCode::NotFound, "unknown method")
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Unauthenticated liveness probe, outside both services.
pub async fn health(State(state): State<GatewayState>) -> Response {
    match state.store.health_check().await {
        Ok(()) => Json(HealthResponse {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
        })
        .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "unavailable",
                    version: env!("CARGO_PKG_VERSION"),
                }),
            )
                .into_response()
        }
    }
}
