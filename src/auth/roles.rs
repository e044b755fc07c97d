// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User roles for authorization.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// User roles for authorization.
///
/// ## Roles
///
/// - `CardOwner` - may create, read, update and delete their own cash cards
/// - `NonOwner` - authenticates successfully but is refused the cash card
///   resource entirely (403)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    /// Holds cash cards
    CardOwner,
    /// Authenticated, but holds no resource-owning role
    NonOwner,
}

impl Role {
    /// Check if this role has at least the privileges of the required role.
    pub fn has_privilege(&self, required: Role) -> bool {
        match (self, required) {
            (Role::CardOwner, Role::CardOwner) => true,
            // Card owners can do anything a non-owner can
            (Role::CardOwner, Role::NonOwner) => true,
            (Role::NonOwner, Role::NonOwner) => true,
            _ => false,
        }
    }

    /// Parse role from string (case-insensitive, `-` or `_` separated).
    /// Used when loading the user directory file.
    pub fn from_name(s: &str) -> Option<Role> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "card-owner" => Some(Role::CardOwner),
            "non-owner" => Some(Role::NonOwner),
            _ => None,
        }
    }
}

impl Default for Role {
    /// Default role is NonOwner (least privilege for authenticated users).
    fn default() -> Self {
        Role::NonOwner
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::CardOwner => write!(f, "card-owner"),
            Role::NonOwner => write!(f, "non-owner"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn card_owner_has_all_privileges() {
        assert!(Role::CardOwner.has_privilege(Role::CardOwner));
        assert!(Role::CardOwner.has_privilege(Role::NonOwner));
    }

    #[test]
    fn non_owner_lacks_card_owner_privilege() {
        assert!(!Role::NonOwner.has_privilege(Role::CardOwner));
        assert!(Role::NonOwner.has_privilege(Role::NonOwner));
    }

    #[test]
    fn from_name_parses_correctly() {
        assert_eq!(Role::from_name("card-owner"), Some(Role::CardOwner));
        assert_eq!(Role::from_name("CARD-OWNER"), Some(Role::CardOwner));
        assert_eq!(Role::from_name("non_owner"), Some(Role::NonOwner));
        assert_eq!(Role::from_name("admin"), None);
    }

    #[test]
    fn serde_uses_kebab_case() {
        assert_eq!(
            serde_json::to_string(&Role::CardOwner).unwrap(),
            r#""card-owner""#
        );
        let role: Role = serde_json::from_str(r#""non-owner""#).unwrap();
        assert_eq!(role, Role::NonOwner);
    }

    #[test]
    fn default_role_is_non_owner() {
        assert_eq!(Role::default(), Role::NonOwner);
    }
}
