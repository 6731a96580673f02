//! User identity for gated operations.
//!
//! Registering a donor and posting a request require an authenticated user.
//! The web layer resolves a bearer token through an [`IdentityProvider`];
//! [`StaticIdentityProvider`] maps configured tokens to profiles.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Display profile of an authenticated user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Resolves an opaque token to a user
pub trait IdentityProvider: Send + Sync {
    fn authenticate(&self, token: &str) -> Option<UserProfile>;
}

/// A configured user: token plus profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticUser {
    pub token: String,
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Identity provider backed by a fixed token table
#[derive(Debug, Default)]
pub struct StaticIdentityProvider {
    users: HashMap<String, UserProfile>,
}

impl StaticIdentityProvider {
    #[must_use]
    pub fn new(users: &[StaticUser]) -> Self {
        let users = users
            .iter()
            .map(|u| {
                (
                    u.token.clone(),
                    UserProfile {
                        id: u.id.clone(),
                        display_name: u.display_name.clone(),
                        email: u.email.clone(),
                    },
                )
            })
            .collect();
        Self { users }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.users.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl IdentityProvider for StaticIdentityProvider {
    fn authenticate(&self, token: &str) -> Option<UserProfile> {
        let token = token.trim();
        if token.is_empty() {
            return None;
        }
        self.users.get(token).cloned()
    }
}
