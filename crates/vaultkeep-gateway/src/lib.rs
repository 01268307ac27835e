// SPDX-FileCopyrightText: 2026 Vaultkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! RPC gateway for the Vaultkeep secrets vault.
//!
//! Hosts the two logical services (`vaultkeep.UserService` and
//! `vaultkeep.VaultService`) behind the authorization pipeline, and the
//! mediators that combine hashing, key custody, sessions, and storage.

pub mod accounts;
pub mod handlers;
pub mod pipeline;
pub mod rpc;
pub mod server;
pub mod telemetry;
pub mod vault;

pub use accounts::AccountService;
pub use pipeline::Identity;
pub use rpc::{RpcCode, RpcError, RpcMethod, RpcService};
pub use server::{bind, Gateway, GatewayDeps, GatewayOptions};
pub use telemetry::register_metrics;
pub use vault::VaultService;
