// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory record store.
//!
//! All state sits behind a single `RwLock`, so every mutation (including the
//! id counter) is one critical section. Contents are lost on restart.

use std::collections::BTreeMap;
use std::sync::RwLock;

use crate::models::{CashCard, CashCardDraft, CashCardId};

use super::{CashCardStore, OwnershipFilter, PageSpec, StoreError, StoreResult};

/// First id handed out by an empty store.
const FIRST_ID: CashCardId = 1;

#[derive(Debug)]
struct Inner {
    cards: BTreeMap<CashCardId, CashCard>,
    next_id: CashCardId,
}

impl Default for Inner {
    fn default() -> Self {
        Self {
            cards: BTreeMap::new(),
            next_id: FIRST_ID,
        }
    }
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: RwLock<Inner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cards across all owners.
    pub fn len(&self) -> StoreResult<usize> {
        Ok(self.inner.read()?.cards.len())
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }
}

impl CashCardStore for InMemoryStore {
    fn get_by_id(&self, id: CashCardId) -> StoreResult<Option<CashCard>> {
        Ok(self.inner.read()?.cards.get(&id).cloned())
    }

    fn get_by_id_and_owner(&self, id: CashCardId, owner: &str) -> StoreResult<Option<CashCard>> {
        Ok(self.get_by_id(id)?.owned_by(owner))
    }

    fn exists_by_id_and_owner(&self, id: CashCardId, owner: &str) -> StoreResult<bool> {
        let inner = self.inner.read()?;
        Ok(inner
            .cards
            .get(&id)
            .is_some_and(|card| card.is_owned_by(owner)))
    }

    fn save(&self, draft: CashCardDraft) -> StoreResult<CashCard> {
        let mut inner = self.inner.write()?;

        let id = match draft.id {
            Some(id) => id,
            None => inner.next_id,
        };
        let after = id.checked_add(1).ok_or(StoreError::IdSpaceExhausted)?;
        inner.next_id = inner.next_id.max(after);

        let card = CashCard {
            id,
            amount: draft.amount,
            owner: draft.owner,
        };
        inner.cards.insert(id, card.clone());
        Ok(card)
    }

    fn delete_by_id(&self, id: CashCardId) -> StoreResult<()> {
        self.inner.write()?.cards.remove(&id);
        Ok(())
    }

    fn find_all_by_owner(&self, owner: &str, page: &PageSpec) -> StoreResult<Vec<CashCard>> {
        let owned: Vec<CashCard> = {
            let inner = self.inner.read()?;
            inner
                .cards
                .values()
                .filter(|card| card.is_owned_by(owner))
                .cloned()
                .collect()
        };
        Ok(page.apply(owned))
    }

    fn replace_amount_if_owned(
        &self,
        id: CashCardId,
        owner: &str,
        amount: f64,
    ) -> StoreResult<Option<CashCard>> {
        let mut inner = self.inner.write()?;
        let Some(card) = inner.cards.get_mut(&id).filter(|card| card.is_owned_by(owner)) else {
            return Ok(None);
        };
        card.amount = amount;
        Ok(Some(card.clone()))
    }

    fn delete_if_owned(&self, id: CashCardId, owner: &str) -> StoreResult<bool> {
        let mut inner = self.inner.write()?;
        let owned = inner
            .cards
            .get(&id)
            .is_some_and(|card| card.is_owned_by(owner));
        if owned {
            inner.cards.remove(&id);
        }
        Ok(owned)
    }

    fn health_check(&self) -> StoreResult<()> {
        let _guard = self.inner.read()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{Sort, SortDirection, SortField};
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn save_without_id_assigns_increasing_ids() {
        let store = InMemoryStore::new();
        let first = store.save(CashCardDraft::new(1.0, "sarah1")).unwrap();
        let second = store.save(CashCardDraft::new(2.0, "kumar2")).unwrap();
        assert_eq!(first.id, FIRST_ID);
        assert!(second.id > first.id);
    }

    #[test]
    fn explicit_ids_advance_the_counter() {
        let store = InMemoryStore::new();
        store.save(CashCardDraft::with_id(99, 123.45, "sarah1")).unwrap();
        let fresh = store.save(CashCardDraft::new(5.0, "sarah1")).unwrap();
        assert_eq!(fresh.id, 100);

        // A lower explicit id never moves the counter backwards.
        store.save(CashCardDraft::with_id(3, 1.0, "sarah1")).unwrap();
        let next = store.save(CashCardDraft::new(6.0, "sarah1")).unwrap();
        assert_eq!(next.id, 101);
    }

    #[test]
    fn save_with_existing_id_overwrites() {
        let store = InMemoryStore::new();
        let card = store.save(CashCardDraft::new(1.0, "sarah1")).unwrap();
        store
            .save(CashCardDraft::with_id(card.id, 42.0, "sarah1"))
            .unwrap();
        assert_eq!(store.get_by_id(card.id).unwrap().unwrap().amount, 42.0);
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn owner_scoped_reads_hide_foreign_cards() {
        let store = InMemoryStore::new();
        let card = store.save(CashCardDraft::new(1.0, "kumar2")).unwrap();

        assert!(store.get_by_id(card.id).unwrap().is_some());
        assert!(store.get_by_id_and_owner(card.id, "sarah1").unwrap().is_none());
        assert!(!store.exists_by_id_and_owner(card.id, "sarah1").unwrap());
        assert!(store.exists_by_id_and_owner(card.id, "kumar2").unwrap());
    }

    #[test]
    fn replace_amount_if_owned_keeps_identity() {
        let store = InMemoryStore::new();
        let card = store.save(CashCardDraft::new(1.0, "sarah1")).unwrap();

        assert!(store
            .replace_amount_if_owned(card.id, "kumar2", 9.0)
            .unwrap()
            .is_none());

        let updated = store
            .replace_amount_if_owned(card.id, "sarah1", 19.99)
            .unwrap()
            .unwrap();
        assert_eq!(updated.id, card.id);
        assert_eq!(updated.owner, "sarah1");
        assert_eq!(updated.amount, 19.99);
    }

    #[test]
    fn delete_if_owned_only_removes_owned_cards() {
        let store = InMemoryStore::new();
        let card = store.save(CashCardDraft::new(1.0, "kumar2")).unwrap();

        assert!(!store.delete_if_owned(card.id, "sarah1").unwrap());
        assert!(store.get_by_id(card.id).unwrap().is_some());

        assert!(store.delete_if_owned(card.id, "kumar2").unwrap());
        assert!(!store.delete_if_owned(card.id, "kumar2").unwrap());
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn delete_by_id_ignores_missing_ids() {
        let store = InMemoryStore::new();
        store.delete_by_id(12345).unwrap();
    }

    #[test]
    fn find_all_by_owner_filters_and_sorts() {
        let store = InMemoryStore::new();
        store.save(CashCardDraft::with_id(99, 123.45, "sarah1")).unwrap();
        store.save(CashCardDraft::with_id(100, 1.00, "sarah1")).unwrap();
        store.save(CashCardDraft::with_id(101, 150.00, "sarah1")).unwrap();
        store.save(CashCardDraft::with_id(102, 200.00, "kumar2")).unwrap();

        let desc = PageSpec::new(
            0,
            1,
            Sort {
                field: SortField::Amount,
                direction: SortDirection::Descending,
            },
        );
        let page = store.find_all_by_owner("sarah1", &desc).unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].id, 101);

        let all = store
            .find_all_by_owner("sarah1", &PageSpec::default())
            .unwrap();
        let amounts: Vec<f64> = all.iter().map(|c| c.amount).collect();
        assert_eq!(amounts, vec![1.00, 123.45, 150.00]);

        assert!(store
            .find_all_by_owner("nobody", &PageSpec::default())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn concurrent_creates_get_unique_ids() {
        let store = Arc::new(InMemoryStore::new());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    (0..50)
                        .map(|i| {
                            store
                                .save(CashCardDraft::new(i as f64, format!("user{t}")))
                                .unwrap()
                                .id
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(seen.insert(id), "duplicate id {id}");
            }
        }
        assert_eq!(seen.len(), 400);
    }
}
