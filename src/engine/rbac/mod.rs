//! RBAC Module
//!
//! Role-based authorization with a fixed permission matrix, a role hierarchy,
//! and ownership checks on individual resources

pub mod claims;
pub mod enforcer;
pub mod handlers;
pub mod hierarchy;
pub mod permission;
pub mod policy;
pub mod registry;
pub mod requirement;
pub mod resource;
pub mod routes;

pub use claims::{ClaimKeys, Claims, UserId};
pub use enforcer::Enforcer;
pub use handlers::{Decision, DenyReason, UnownedResourcePolicy};
pub use permission::{Permission, PermissionGroup, Role};
pub use policy::{all_permissions, has_permission, permissions_for, RolePermissionMap};
pub use registry::{PolicyRegistry, PolicyRegistryBuilder};
pub use requirement::Requirement;
pub use resource::{OwnableResource, ResourceRef};
pub use routes::RouteTable;
