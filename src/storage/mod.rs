// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Cash Card Record Store
//!
//! This module defines the [`CashCardStore`] contract and its two backends.
//!
//! ## Backends
//!
//! - [`InMemoryStore`] - `RwLock`-guarded `BTreeMap`, used when no data
//!   directory is configured and throughout the tests
//! - [`RedbStore`] - embedded redb database (pure Rust, ACID) under
//!   `DATA_DIR/cashcards.redb`
//!
//! ## Ownership
//!
//! Owner-scoped reads (`*_and_owner`) and the atomic `*_if_owned` mutations
//! are part of the contract itself. The API layer only uses those for
//! single-card requests, so an ownership check and the mutation it guards
//! can never be split across two critical sections.

pub mod database;
pub mod error;
pub mod memory;
pub mod ownership;
pub mod page;

pub use database::RedbStore;
pub use error::{StoreError, StoreResult};
pub use memory::InMemoryStore;
pub use ownership::{OwnedResource, OwnershipFilter};
pub use page::{PageSpec, Sort, SortDirection, SortField, SortParseError};

use crate::models::{CashCard, CashCardDraft, CashCardId};

/// Abstract ordered collection of cash cards.
///
/// Implementations must be thread-safe and complete every call in bounded
/// time. Any failure is returned as a [`StoreError`]; callers never retry.
pub trait CashCardStore: Send + Sync + 'static {
    /// Look up a card by id, regardless of owner.
    fn get_by_id(&self, id: CashCardId) -> StoreResult<Option<CashCard>>;

    /// Look up a card by id, returning it only when `owner` owns it.
    fn get_by_id_and_owner(&self, id: CashCardId, owner: &str) -> StoreResult<Option<CashCard>>;

    /// Whether a card with `id` exists and is owned by `owner`.
    fn exists_by_id_and_owner(&self, id: CashCardId, owner: &str) -> StoreResult<bool>;

    /// Insert (`draft.id == None`) or overwrite (`draft.id == Some(_)`).
    fn save(&self, draft: CashCardDraft) -> StoreResult<CashCard>;

    /// Remove a card unconditionally. Missing ids are not an error.
    fn delete_by_id(&self, id: CashCardId) -> StoreResult<()>;

    /// One page of `owner`'s cards, ordered per `page`.
    fn find_all_by_owner(&self, owner: &str, page: &PageSpec) -> StoreResult<Vec<CashCard>>;

    /// Replace the amount of a card owned by `owner`, keeping id and owner.
    ///
    /// Lookup and write happen in one critical section. Returns `None` when
    /// the card is missing or owned by someone else.
    fn replace_amount_if_owned(
        &self,
        id: CashCardId,
        owner: &str,
        amount: f64,
    ) -> StoreResult<Option<CashCard>>;

    /// Delete a card owned by `owner` in one critical section.
    ///
    /// Returns `false` when the card is missing or owned by someone else.
    fn delete_if_owned(&self, id: CashCardId, owner: &str) -> StoreResult<bool>;

    /// Verify the backend is reachable.
    fn health_check(&self) -> StoreResult<()>;
}
