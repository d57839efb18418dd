//! Caller Claims
//!
//! Key/value assertions produced by the credential layer. The engine reads
//! two of them, identity and role, and never mutates the set.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use super::permission::Role;

pub const DEFAULT_IDENTITY_KEY: &str = "nameid";
pub const DEFAULT_ROLE_KEY: &str = "role";

/// Opaque caller identity
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Blank identifiers are rejected
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which claim keys carry identity and role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimKeys {
    #[serde(default = "default_identity_key")]
    pub identity_key: String,
    #[serde(default = "default_role_key")]
    pub role_key: String,
}

fn default_identity_key() -> String {
    DEFAULT_IDENTITY_KEY.to_string()
}

fn default_role_key() -> String {
    DEFAULT_ROLE_KEY.to_string()
}

impl Default for ClaimKeys {
    fn default() -> Self {
        Self {
            identity_key: default_identity_key(),
            role_key: default_role_key(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Claims {
    values: HashMap<String, String>,
}

impl Claims {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims carrying identity and role under the default keys
    pub fn for_principal(user_id: &str, role: &str) -> Self {
        Self::new()
            .with(DEFAULT_IDENTITY_KEY, user_id)
            .with(DEFAULT_ROLE_KEY, role)
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.values.insert(key.to_string(), value.to_string());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Parsed role claim; `None` when absent or unparseable
    pub fn role(&self, keys: &ClaimKeys) -> Option<Role> {
        self.get(&keys.role_key).and_then(|raw| raw.parse().ok())
    }

    /// Parsed identity claim; `None` when absent or blank
    pub fn identity(&self, keys: &ClaimKeys) -> Option<UserId> {
        self.get(&keys.identity_key).and_then(UserId::parse)
    }
}

impl FromIterator<(String, String)> for Claims {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_principal_claims() {
        let keys = ClaimKeys::default();
        let claims = Claims::for_principal("u1", "1");
        assert_eq!(claims.role(&keys), Some(Role::Teacher));
        assert_eq!(claims.identity(&keys).unwrap().as_str(), "u1");
    }

    #[test]
    fn test_missing_and_invalid_claims() {
        let keys = ClaimKeys::default();
        assert_eq!(Claims::new().role(&keys), None);
        assert_eq!(Claims::new().identity(&keys), None);

        let claims = Claims::new().with("role", "Superuser").with("nameid", "   ");
        assert_eq!(claims.role(&keys), None);
        assert_eq!(claims.identity(&keys), None);
    }

    #[test]
    fn test_custom_claim_keys() {
        let keys = ClaimKeys {
            identity_key: "sub".to_string(),
            role_key: "http://schemas/role".to_string(),
        };
        let claims = Claims::new().with("sub", "abc").with("http://schemas/role", "Admin");
        assert_eq!(claims.role(&keys), Some(Role::Admin));
        assert_eq!(claims.identity(&keys).unwrap().to_string(), "abc");
        assert_eq!(claims.role(&ClaimKeys::default()), None);
    }

    #[test]
    fn test_claims_deserialize_from_object() {
        let claims: Claims = serde_json::from_str(r#"{"nameid": "u9", "role": "Student"}"#).unwrap();
        assert_eq!(claims.get("nameid"), Some("u9"));
        assert_eq!(claims.role(&ClaimKeys::default()), Some(Role::Student));
    }
}
