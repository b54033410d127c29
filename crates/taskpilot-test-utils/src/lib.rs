// SPDX-FileCopyrightText: 2026 Taskpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Taskpilot integration tests.
//!
//! Provides a scripted [`MockProvider`] and a tempdir-backed
//! [`TestStore`] so engine behavior can be exercised without network
//! access or a shared database.

pub mod harness;
pub mod mock_provider;

pub use harness::TestStore;
pub use mock_provider::MockProvider;
