//! Authorization Error Types
//!
//! Decision outcomes are values, not errors. Only setup-time
//! misconfiguration and policy lookup failures surface here.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("Policy already registered: {0}")]
    DuplicatePolicy(String),

    #[error("No such policy: {0}")]
    UnknownPolicy(String),

    #[error("Unknown role: {0}")]
    UnknownRole(String),

    #[error("Unknown permission: {0}")]
    UnknownPermission(String),

    #[error("Route already guarded: {0}")]
    DuplicateRoute(String),
}

pub type Result<T> = std::result::Result<T, AuthzError>;
