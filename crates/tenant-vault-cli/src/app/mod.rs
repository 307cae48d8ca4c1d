//! Application-level utilities for the Tenant Vault CLI.
//!
//! This module provides:
//! - Config resolution with flag overrides
//! - Manager construction against the local object store
//! - Password handling with retry logic

mod context;
mod password;
mod resolver;

pub use context::AppContext;
pub use password::load_tenant_with_retry;
pub use resolver::{missing_config_message, resolve_config_path};
