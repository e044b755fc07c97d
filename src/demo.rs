// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Demo users and cards, loaded when `SEED_DEMO_DATA` is set.

use crate::{
    auth::{Role, UserDirectory},
    models::{CashCardDraft, CashCardId},
    storage::{CashCardStore, StoreResult},
};

const DEMO_USERS: &[(&str, &str, Role)] = &[
    ("sarah1", "abc123", Role::CardOwner),
    ("kumar2", "xyz789", Role::CardOwner),
    ("hank-owns-no-cards", "qrs456", Role::NonOwner),
];

const DEMO_CARDS: &[(CashCardId, f64, &str)] = &[
    (99, 123.45, "sarah1"),
    (100, 1.00, "sarah1"),
    (101, 150.00, "sarah1"),
    (102, 200.00, "kumar2"),
];

pub fn demo_users() -> UserDirectory {
    DEMO_USERS
        .iter()
        .fold(UserDirectory::new(), |dir, (username, password, role)| {
            dir.with_user(*username, password, *role)
        })
}

/// Insert the demo cards, leaving any id that already exists untouched.
///
/// Returns the number of cards inserted.
pub fn seed_demo_cards(store: &dyn CashCardStore) -> StoreResult<usize> {
    let mut inserted = 0;
    for (id, amount, owner) in DEMO_CARDS {
        if store.get_by_id(*id)?.is_some() {
            tracing::debug!(card_id = id, "Demo card already present");
            continue;
        }
        store.save(CashCardDraft::with_id(*id, *amount, *owner))?;
        inserted += 1;
    }
    tracing::info!(inserted, "Seeded demo cash cards");
    Ok(inserted)
}
