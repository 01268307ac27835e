// SPDX-FileCopyrightText: 2026 Vaultkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metric registration and recording helpers.
//!
//! Uses the metrics-rs facade; with no recorder installed these are no-ops.

use std::time::Duration;

use metrics::{describe_counter, describe_histogram};

use crate::rpc::RpcCode;

/// Register metric descriptions. Call once after a recorder is installed.
pub fn register_metrics() {
    describe_counter!("vaultkeep_rpc_requests_total", "RPC calls by method and outcome code");
    describe_histogram!("vaultkeep_rpc_latency_seconds", "RPC call latency in seconds");
}

/// Record one finished call.
pub fn record_call(method: &'static str, code: RpcCode, latency: Duration) {
    metrics::counter!("vaultkeep_rpc_requests_total", "method" => method, "code" => code.as_str())
        .increment(1);
    metrics::histogram!("vaultkeep_rpc_latency_seconds", "method" => method)
        .record(latency.as_secs_f64());
}
