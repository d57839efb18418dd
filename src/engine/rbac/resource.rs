//! Ownable resources
//!
//! Application objects opt into ownership checks by implementing
//! [`OwnableResource`]. A resource exposing neither field is "unowned".

use serde::{Deserialize, Serialize};

pub trait OwnableResource {
    /// Identity of the user the resource belongs to
    fn owner_id(&self) -> Option<&str> {
        None
    }

    /// Identifier of whoever created the resource
    fn creator_id(&self) -> Option<&str> {
        None
    }
}

/// Raw ownership fields, for callers that do not hold a typed resource
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
}

impl ResourceRef {
    pub fn owned_by(user_id: &str) -> Self {
        Self {
            owner_id: Some(user_id.to_string()),
            created_by: None,
        }
    }

    pub fn created_by(user_id: &str) -> Self {
        Self {
            owner_id: None,
            created_by: Some(user_id.to_string()),
        }
    }

    pub fn unowned() -> Self {
        Self::default()
    }
}

impl OwnableResource for ResourceRef {
    fn owner_id(&self) -> Option<&str> {
        self.owner_id.as_deref()
    }

    fn creator_id(&self) -> Option<&str> {
        self.created_by.as_deref()
    }
}
