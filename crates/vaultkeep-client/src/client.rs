// SPDX-FileCopyrightText: 2026 Vaultkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Vaultkeep RPC surface.
//!
//! Provides [`VaultClient`], which frames calls as `POST /<service>/<method>`
//! JSON requests, attaches the cached session token to vault calls, and
//! decodes `{code, message}` error replies.

use std::sync::Arc;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use vaultkeep_core::{DataType, ItemSummary, RpcCode};

use crate::error::ClientError;
use crate::models::{BankCardData, BankCardMeta, FileMeta, Item, PasswordMeta, RawItem, TextMeta};
use crate::token::TokenCache;

const USER_SERVICE: &str = "vaultkeep.UserService";
const VAULT_SERVICE: &str = "vaultkeep.VaultService";
const RPC_STATUS_HEADER: &str = "rpc-status";
const RPC_TIMEOUT_HEADER: &str = "rpc-timeout-ms";

#[derive(Serialize)]
struct Credentials<'a> {
    login: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct TokenReply {
    token: String,
}

#[derive(Serialize)]
struct AddData<'a> {
    data_type: DataType,
    payload: String,
    meta: &'a str,
}

#[derive(Deserialize)]
struct AddDataReply {
    id: String,
}

#[derive(Serialize)]
struct ItemId<'a> {
    id: &'a str,
}

#[derive(Deserialize)]
struct GetDataReply {
    data_type: DataType,
    payload: String,
    meta: String,
}

#[derive(Serialize)]
struct ByType {
    data_type: DataType,
}

#[derive(Deserialize)]
struct ByTypeReply {
    items: Vec<ItemSummary>,
}

#[derive(Serialize)]
struct UpdateData<'a> {
    id: &'a str,
    payload: String,
    meta: &'a str,
}

#[derive(Deserialize)]
struct EmptyReply {}

#[derive(Deserialize)]
struct ErrorReply {
    code: RpcCode,
    message: String,
}

/// Client for one Vaultkeep server.
///
/// Cloning is cheap; clones share the connection pool and the token cache.
#[derive(Debug, Clone)]
pub struct VaultClient {
    http: reqwest::Client,
    base_url: String,
    session_header: HeaderName,
    tokens: Arc<TokenCache>,
    deadline: Option<Duration>,
}

impl VaultClient {
    /// Creates a client for `base_url` (e.g. `http://127.0.0.1:8080`).
    pub fn new(base_url: impl Into<String>, tokens: TokenCache) -> Result<Self, ClientError> {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session_header: AUTHORIZATION,
            tokens: Arc::new(tokens),
            deadline: None,
        })
    }

    /// Sends a per-call deadline with every request.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Overrides the header carrying the session token.
    pub fn with_session_header(mut self, header: &str) -> Result<Self, ClientError> {
        self.session_header = HeaderName::from_bytes(header.as_bytes())
            .map_err(|e| ClientError::InvalidInput(format!("session header `{header}`: {e}")))?;
        Ok(self)
    }

    pub fn is_logged_in(&self) -> bool {
        self.tokens.is_set()
    }

    /// Creates an account and caches the issued session token.
    pub async fn register(&self, login: &str, password: &SecretString) -> Result<(), ClientError> {
        self.authenticate("Register", login, password).await
    }

    /// Logs in and caches the issued session token.
    pub async fn login(&self, login: &str, password: &SecretString) -> Result<(), ClientError> {
        self.authenticate("Login", login, password).await
    }

    /// Drops the cached session token.
    pub fn logout(&self) -> Result<(), ClientError> {
        self.tokens.clear()?;
        Ok(())
    }

    pub async fn add_data(&self, data_type: DataType, payload: &[u8], meta: &str) -> Result<String, ClientError> {
        let body = AddData {
            data_type,
            payload: STANDARD.encode(payload),
            meta,
        };
        let reply: AddDataReply = self.call(VAULT_SERVICE, "AddData", &body).await?;
        Ok(reply.id)
    }

    pub async fn get_data(&self, id: &str) -> Result<RawItem, ClientError> {
        let reply: GetDataReply = self.call(VAULT_SERVICE, "GetData", &ItemId { id }).await?;
        let payload = STANDARD
            .decode(reply.payload)
            .map_err(|e| ClientError::Decode(format!("payload is not base64: {e}")))?;
        Ok(RawItem {
            data_type: reply.data_type,
            payload,
            meta: reply.meta,
        })
    }

    /// Lists id and metadata of every item of one type, oldest first.
    pub async fn get_all_by_type(&self, data_type: DataType) -> Result<Vec<ItemSummary>, ClientError> {
        let reply: ByTypeReply = self.call(VAULT_SERVICE, "GetAllByType", &ByType { data_type }).await?;
        Ok(reply.items)
    }

    pub async fn update_data(&self, id: &str, payload: &[u8], meta: &str) -> Result<(), ClientError> {
        let body = UpdateData {
            id,
            payload: STANDARD.encode(payload),
            meta,
        };
        let _: EmptyReply = self.call(VAULT_SERVICE, "UpdateData", &body).await?;
        Ok(())
    }

    pub async fn delete_data(&self, id: &str) -> Result<(), ClientError> {
        let _: EmptyReply = self.call(VAULT_SERVICE, "DeleteData", &ItemId { id }).await?;
        Ok(())
    }

    /// Stores a typed item and returns its id.
    pub async fn add_item(&self, item: &Item) -> Result<String, ClientError> {
        let raw = item.encode()?;
        self.add_data(raw.data_type, &raw.payload, &raw.meta).await
    }

    pub async fn add_password(&self, meta: PasswordMeta, password: &SecretString) -> Result<String, ClientError> {
        self.add_item(&Item::Password {
            meta,
            password: password.expose_secret().to_owned(),
        })
        .await
    }

    pub async fn add_text(&self, meta: TextMeta, text: &str) -> Result<String, ClientError> {
        self.add_item(&Item::Text {
            meta,
            text: text.to_owned(),
        })
        .await
    }

    pub async fn add_bank_card(&self, meta: BankCardMeta, card: BankCardData) -> Result<String, ClientError> {
        self.add_item(&Item::BankCard { meta, card }).await
    }

    pub async fn add_file(&self, meta: FileMeta, content: Vec<u8>) -> Result<String, ClientError> {
        self.add_item(&Item::File { meta, content }).await
    }

    /// Fetches an item and decodes it by its data type.
    pub async fn get_item(&self, id: &str) -> Result<Item, ClientError> {
        Item::decode(self.get_data(id).await?)
    }

    /// Replaces an item's payload and metadata with `item`'s.
    pub async fn update_item(&self, id: &str, item: &Item) -> Result<(), ClientError> {
        let raw = item.encode()?;
        self.update_data(id, &raw.payload, &raw.meta).await
    }

    async fn authenticate(&self, method: &str, login: &str, password: &SecretString) -> Result<(), ClientError> {
        let body = Credentials {
            login,
            password: password.expose_secret(),
        };
        let reply: TokenReply = self.send(USER_SERVICE, method, &body, None).await?;
        self.tokens.store(&reply.token)?;
        debug!(method, "session token cached");
        Ok(())
    }

    /// Vault call: requires a cached token and drops it on `UNAUTHENTICATED`.
    async fn call<Req, Resp>(&self, service: &str, method: &str, body: &Req) -> Result<Resp, ClientError>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let token = self.tokens.get().ok_or(ClientError::NotLoggedIn)?;
        let result = self.send(service, method, body, Some(&token)).await;
        if let Err(ClientError::Rpc {
            code: RpcCode::Unauthenticated,
            ..
        }) = &result
        {
            warn!(method, "session rejected, clearing cached token");
            if let Err(e) = self.tokens.clear() {
                warn!(error = %e, "failed to clear token cache");
            }
        }
        result
    }

    async fn send<Req, Resp>(
        &self,
        service: &str,
        method: &str,
        body: &Req,
        token: Option<&SecretString>,
    ) -> Result<Resp, ClientError>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let url = format!("{}/{service}/{method}", self.base_url);
        let mut request = self.http.post(&url).json(body);

        if let Some(token) = token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
                .map_err(|e| ClientError::InvalidInput(format!("session token: {e}")))?;
            value.set_sensitive(true);
            request = request.header(self.session_header.clone(), value);
        }
        if let Some(deadline) = self.deadline {
            request = request
                .header(RPC_TIMEOUT_HEADER, deadline.as_millis().to_string())
                .timeout(deadline + Duration::from_secs(1));
        }

        let response = request.send().await?;
        let status = response.status();
        debug!(status = %status, method, "response received");

        if status.is_success() {
            let bytes = response.bytes().await?;
            return serde_json::from_slice(&bytes)
                .map_err(|e| ClientError::Decode(format!("{method} reply: {e}")));
        }

        let header_code = response
            .headers()
            .get(RPC_STATUS_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<RpcCode>().ok());
        let text = response.text().await.unwrap_or_default();
        Err(match serde_json::from_str::<ErrorReply>(&text) {
            Ok(reply) => ClientError::Rpc {
                code: reply.code,
                message: reply.message,
            },
            Err(_) => ClientError::Rpc {
                code: header_code.unwrap_or(match status.as_u16() {
                    401 => RpcCode::Unauthenticated,
                    404 => RpcCode::NotFound,
                    504 => RpcCode::DeadlineExceeded,
                    _ => RpcCode::Internal,
                }),
                message: format!("server returned {status}"),
            },
        })
    }
}
