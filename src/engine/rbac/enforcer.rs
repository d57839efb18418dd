//! RBAC Enforcement Layer
//!
//! Resolves a policy name through the registry and dispatches to the
//! matching decision handler. Immutable once built; share it behind an `Arc`.

use super::claims::{ClaimKeys, Claims};
use super::handlers::{self, Decision, UnownedResourcePolicy};
use super::registry::PolicyRegistry;
use super::requirement::Requirement;
use super::resource::OwnableResource;
use crate::engine::config::Config;
use crate::engine::error::Result;

#[derive(Debug, Clone)]
pub struct Enforcer {
    registry: PolicyRegistry,
    claim_keys: ClaimKeys,
    unowned_resource: UnownedResourcePolicy,
}

impl Enforcer {
    pub fn new(registry: PolicyRegistry) -> Self {
        Self {
            registry,
            claim_keys: ClaimKeys::default(),
            unowned_resource: UnownedResourcePolicy::default(),
        }
    }

    /// Standard registry with claim keys and enforcement options from `config`
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(PolicyRegistry::standard()?)
            .with_claim_keys(config.claims.clone())
            .with_unowned_resource(config.enforcement.unowned_resource))
    }

    pub fn with_claim_keys(mut self, keys: ClaimKeys) -> Self {
        self.claim_keys = keys;
        self
    }

    pub fn with_unowned_resource(mut self, policy: UnownedResourcePolicy) -> Self {
        self.unowned_resource = policy;
        self
    }

    pub fn registry(&self) -> &PolicyRegistry {
        &self.registry
    }

    pub fn claim_keys(&self) -> &ClaimKeys {
        &self.claim_keys
    }

    /// Evaluate a named policy against the caller's claims
    pub fn evaluate(&self, claims: &Claims, policy: &str) -> Result<Decision> {
        self.evaluate_with_resource(claims, policy, None)
    }

    /// Evaluate a named policy, applying ownership rules when a resource is
    /// supplied to a permission policy
    pub fn evaluate_with_resource(
        &self,
        claims: &Claims,
        policy: &str,
        resource: Option<&dyn OwnableResource>,
    ) -> Result<Decision> {
        let requirement = self.registry.resolve(policy)?;
        let decision = self.decide(claims, requirement, resource);

        tracing::debug!(
            policy,
            requirement = %requirement,
            with_resource = resource.is_some(),
            decision = %decision,
            "Authorization evaluated"
        );
        Ok(decision)
    }

    /// Evaluate a requirement directly, bypassing name lookup
    pub fn decide(
        &self,
        claims: &Claims,
        requirement: &Requirement,
        resource: Option<&dyn OwnableResource>,
    ) -> Decision {
        let keys = &self.claim_keys;
        match requirement {
            Requirement::Permission(permission) => match resource {
                Some(_) => handlers::check_resource(
                    claims,
                    keys,
                    *permission,
                    resource,
                    self.unowned_resource,
                ),
                None => handlers::check_permission(claims, keys, *permission),
            },
            Requirement::Role(role) => handlers::check_role(claims, keys, *role),
            Requirement::Authenticated => handlers::check_authenticated(claims, keys),
            Requirement::AnyRole(_) => handlers::check_any_role(claims, keys, requirement),
        }
    }
}
