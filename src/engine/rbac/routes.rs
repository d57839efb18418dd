//! Route guards
//!
//! Binds request routes to policy names at registration time. Every policy
//! named here must exist in the registry the table is built against.

use std::collections::HashMap;

use super::registry::PolicyRegistry;
use crate::engine::error::{AuthzError, Result};

#[derive(Debug, Clone)]
pub struct RouteTable {
    guards: HashMap<String, String>,
}

pub struct RouteTableBuilder<'a> {
    registry: &'a PolicyRegistry,
    guards: HashMap<String, String>,
}

impl<'a> RouteTableBuilder<'a> {
    /// Require `policy` for `route`
    pub fn guard(mut self, route: &str, policy: &str) -> Result<Self> {
        self.registry.resolve(policy)?;
        if self.guards.contains_key(route) {
            return Err(AuthzError::DuplicateRoute(route.to_string()));
        }
        self.guards.insert(route.to_string(), policy.to_string());
        Ok(self)
    }

    pub fn build(self) -> RouteTable {
        RouteTable {
            guards: self.guards,
        }
    }
}

impl RouteTable {
    pub fn builder(registry: &PolicyRegistry) -> RouteTableBuilder<'_> {
        RouteTableBuilder {
            registry,
            guards: HashMap::new(),
        }
    }

    /// Policy guarding a route; `None` for unguarded routes
    pub fn policy_for(&self, route: &str) -> Option<&str> {
        self.guards.get(route).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.guards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.guards.is_empty()
    }
}
