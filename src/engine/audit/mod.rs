//! Audit Module
//!
//! Immutable log of authorization decisions

pub mod audit;

pub use audit::{AuditEntry, AuditLog, AUDIT_VERSION};
