//! Policy Registry
//!
//! Named policies resolved to requirements. Built once at startup through
//! [`PolicyRegistryBuilder`] and read-only afterwards.

use std::collections::HashMap;

use super::permission::{Permission, Role};
use super::requirement::{Requirement, ADMIN_ONLY, REQUIRE_AUTHENTICATION, TEACHER_OR_ADMIN};
use crate::engine::error::{AuthzError, Result};

#[derive(Debug, Clone)]
pub struct PolicyRegistry {
    entries: Vec<(String, Requirement)>,
    index: HashMap<String, usize>,
}

#[derive(Debug, Default)]
pub struct PolicyRegistryBuilder {
    entries: Vec<(String, Requirement)>,
    index: HashMap<String, usize>,
}

impl PolicyRegistryBuilder {
    /// Register a named policy; a name can only be bound once
    pub fn register(mut self, name: &str, requirement: Requirement) -> Result<Self> {
        if self.index.contains_key(name) {
            return Err(AuthzError::DuplicatePolicy(name.to_string()));
        }
        self.index.insert(name.to_string(), self.entries.len());
        self.entries.push((name.to_string(), requirement));
        Ok(self)
    }

    /// One policy per permission, one per role, plus the fixed policies
    pub fn with_standard_policies(self) -> Result<Self> {
        let mut builder = self;
        let derived = Permission::ALL
            .into_iter()
            .map(Requirement::permission)
            .chain(Role::ALL.into_iter().map(Requirement::role));
        for requirement in derived {
            if let Some(name) = requirement.policy_name() {
                builder = builder.register(&name, requirement)?;
            }
        }
        builder
            .register(REQUIRE_AUTHENTICATION, Requirement::Authenticated)?
            .register(ADMIN_ONLY, Requirement::any_role([Role::Admin]))?
            .register(TEACHER_OR_ADMIN, Requirement::any_role([Role::Teacher, Role::Admin]))
    }

    pub fn build(self) -> PolicyRegistry {
        tracing::info!(policies = self.entries.len(), "Policy registry built");
        PolicyRegistry {
            entries: self.entries,
            index: self.index,
        }
    }
}

impl PolicyRegistry {
    pub fn builder() -> PolicyRegistryBuilder {
        PolicyRegistryBuilder::default()
    }

    /// Registry holding exactly the standard policies
    pub fn standard() -> Result<Self> {
        Ok(Self::builder().with_standard_policies()?.build())
    }

    pub fn get(&self, name: &str) -> Option<&Requirement> {
        self.index.get(name).map(|&i| &self.entries[i].1)
    }

    /// Resolve a policy name; unknown names are an error, never an allow
    pub fn resolve(&self, name: &str) -> Result<&Requirement> {
        self.get(name)
            .ok_or_else(|| AuthzError::UnknownPolicy(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Policy names in registration order
    pub fn policy_names(&self) -> Vec<String> {
        self.entries.iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Requirement)> {
        self.entries.iter().map(|(name, req)| (name.as_str(), req))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
