//! StudyGate - Authorization decision engine for the English study platform
//!
//! Decides ALLOW or DENY for a caller's role and identity claims against a
//! named policy, optionally for a specific resource instance.

pub mod engine;

pub use engine::error::AuthzError;
pub use engine::rbac::{
    Claims, Decision, DenyReason, Enforcer, OwnableResource, Permission, PolicyRegistry,
    Requirement, ResourceRef, Role,
};
