//! Test utilities for integration testing.
//!
//! This module provides:
//! - Test data factories for creating valid provider fixtures
//! - In-memory billing provider and email sender mocks
//! - A builder for constructing AppState with test dependencies

mod billing_mocks;
mod email_mocks;

pub use app_state_builder::*;
pub use billing_mocks::*;
pub use email_mocks::*;
pub use factories::*;
