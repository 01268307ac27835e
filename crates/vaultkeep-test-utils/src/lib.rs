// SPDX-FileCopyrightText: 2026 Vaultkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Vaultkeep integration tests.
//!
//! Provides [`TestHarness`], a full server on a temp database bound to an
//! ephemeral localhost port.

pub mod harness;

pub use harness::{TestHarness, TestHarnessBuilder, TEST_MASTER_KEY, TEST_SIGNING_KEY};
