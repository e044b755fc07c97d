// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ownership filtering for store lookups.
//!
//! Backends resolve owner-scoped reads through [`OwnershipFilter`], so a
//! record owned by someone else looks exactly like a missing record.

use crate::models::CashCard;

/// Trait for resources that have an owner.
pub trait OwnedResource {
    /// Principal that owns this resource.
    fn owner(&self) -> &str;
}

impl OwnedResource for CashCard {
    fn owner(&self) -> &str {
        &self.owner
    }
}

/// Extension trait that drops resources not owned by `principal`.
pub trait OwnershipFilter<T> {
    fn owned_by(self, principal: &str) -> Option<T>;
}

impl<T: OwnedResource> OwnershipFilter<T> for Option<T> {
    fn owned_by(self, principal: &str) -> Option<T> {
        self.filter(|resource| resource.owner() == principal)
    }
}
