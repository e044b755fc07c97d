// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded cash card database backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `cash_cards`: id → serialized CashCard (JSON bytes)
//! - `owner_index`: (owner, id) → () for owner-scoped range scans
//! - `store_meta`: key → u64 (`next_id` counter)
//!
//! Each mutation runs in a single write transaction. redb serialises
//! writers, so the ownership check inside `replace_amount_if_owned` and
//! `delete_if_owned` cannot race with another writer.

use std::path::Path;

use redb::{Database, ReadableDatabase, ReadableTable, Table, TableDefinition};

use crate::models::{CashCard, CashCardDraft, CashCardId};

use super::{CashCardStore, OwnershipFilter, PageSpec, StoreError, StoreResult};

// =============================================================================
// Table Definitions
// =============================================================================

/// Primary table: id → serialized CashCard (JSON bytes).
const CASH_CARDS: TableDefinition<u64, &[u8]> = TableDefinition::new("cash_cards");

/// Index: (owner, id) → (). Range scans over one owner stay in id order.
const OWNER_INDEX: TableDefinition<(&str, u64), ()> = TableDefinition::new("owner_index");

/// Store metadata: key → u64.
const STORE_META: TableDefinition<&str, u64> = TableDefinition::new("store_meta");

const NEXT_ID_KEY: &str = "next_id";

/// First id handed out by an empty database.
const FIRST_ID: CashCardId = 1;

/// File name of the database inside the data directory.
pub const DATABASE_FILE: &str = "cashcards.redb";

// =============================================================================
// RedbStore
// =============================================================================

/// Persistent cash card store.
pub struct RedbStore {
    db: Database,
}

impl RedbStore {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(CASH_CARDS)?;
            let _ = write_txn.open_table(OWNER_INDEX)?;
            let _ = write_txn.open_table(STORE_META)?;
        }
        write_txn.commit()?;

        tracing::info!(path = %path.display(), "Opened cash card database");
        Ok(Self { db })
    }

    /// Open `DATABASE_FILE` inside `data_dir`.
    pub fn open_in_dir(data_dir: &Path) -> StoreResult<Self> {
        Self::open(&data_dir.join(DATABASE_FILE))
    }
}

fn decode(bytes: &[u8]) -> StoreResult<CashCard> {
    Ok(serde_json::from_slice(bytes)?)
}

fn read_card(
    table: &impl ReadableTable<u64, &'static [u8]>,
    id: CashCardId,
) -> StoreResult<Option<CashCard>> {
    match table.get(id)? {
        Some(value) => Ok(Some(decode(value.value())?)),
        None => Ok(None),
    }
}

fn write_card(
    cards: &mut Table<u64, &'static [u8]>,
    index: &mut Table<(&'static str, u64), ()>,
    card: &CashCard,
) -> StoreResult<()> {
    let json = serde_json::to_vec(card)?;
    cards.insert(card.id, json.as_slice())?;
    index.insert((card.owner.as_str(), card.id), ())?;
    Ok(())
}

impl CashCardStore for RedbStore {
    fn get_by_id(&self, id: CashCardId) -> StoreResult<Option<CashCard>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(CASH_CARDS)?;
        read_card(&table, id)
    }

    fn get_by_id_and_owner(&self, id: CashCardId, owner: &str) -> StoreResult<Option<CashCard>> {
        Ok(self.get_by_id(id)?.owned_by(owner))
    }

    fn exists_by_id_and_owner(&self, id: CashCardId, owner: &str) -> StoreResult<bool> {
        // Index probe only; the record itself is never decoded.
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(OWNER_INDEX)?;
        Ok(index.get((owner, id))?.is_some())
    }

    fn save(&self, draft: CashCardDraft) -> StoreResult<CashCard> {
        let write_txn = self.db.begin_write()?;
        let card = {
            let mut cards = write_txn.open_table(CASH_CARDS)?;
            let mut index = write_txn.open_table(OWNER_INDEX)?;
            let mut meta = write_txn.open_table(STORE_META)?;

            let next_id = meta
                .get(NEXT_ID_KEY)?
                .map(|v| v.value())
                .unwrap_or(FIRST_ID);
            let id = draft.id.unwrap_or(next_id);
            let after = id.checked_add(1).ok_or(StoreError::IdSpaceExhausted)?;
            meta.insert(NEXT_ID_KEY, next_id.max(after))?;

            // An overwrite may carry a different owner; drop the stale index row.
            if let Some(previous) = read_card(&cards, id)? {
                if previous.owner != draft.owner {
                    index.remove((previous.owner.as_str(), id))?;
                }
            }

            let card = CashCard {
                id,
                amount: draft.amount,
                owner: draft.owner,
            };
            write_card(&mut cards, &mut index, &card)?;
            card
        };
        write_txn.commit()?;
        Ok(card)
    }

    fn delete_by_id(&self, id: CashCardId) -> StoreResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut cards = write_txn.open_table(CASH_CARDS)?;
            let mut index = write_txn.open_table(OWNER_INDEX)?;

            let previous = match cards.remove(id)? {
                Some(value) => Some(decode(value.value())?),
                None => None,
            };
            if let Some(previous) = previous {
                index.remove((previous.owner.as_str(), id))?;
            }
        }
        write_txn.commit()?;
        Ok(())
    }

    fn find_all_by_owner(&self, owner: &str, page: &PageSpec) -> StoreResult<Vec<CashCard>> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(OWNER_INDEX)?;
        let cards = read_txn.open_table(CASH_CARDS)?;

        let mut owned = Vec::new();
        for entry in index.range((owner, u64::MIN)..=(owner, u64::MAX))? {
            let (key, _) = entry?;
            let (_, id) = key.value();
            let card = read_card(&cards, id)?.ok_or_else(|| {
                StoreError::Corrupt(format!("owner index references missing card {id}"))
            })?;
            owned.push(card);
        }

        Ok(page.apply(owned))
    }

    fn replace_amount_if_owned(
        &self,
        id: CashCardId,
        owner: &str,
        amount: f64,
    ) -> StoreResult<Option<CashCard>> {
        let write_txn = self.db.begin_write()?;
        let updated = {
            let mut cards = write_txn.open_table(CASH_CARDS)?;
            let mut index = write_txn.open_table(OWNER_INDEX)?;

            match read_card(&cards, id)?.owned_by(owner) {
                Some(existing) => {
                    let card = CashCard { amount, ..existing };
                    write_card(&mut cards, &mut index, &card)?;
                    Some(card)
                }
                None => None,
            }
        };

        if updated.is_some() {
            write_txn.commit()?;
        } else {
            write_txn.abort()?;
        }
        Ok(updated)
    }

    fn delete_if_owned(&self, id: CashCardId, owner: &str) -> StoreResult<bool> {
        let write_txn = self.db.begin_write()?;
        let deleted = {
            let mut cards = write_txn.open_table(CASH_CARDS)?;
            let mut index = write_txn.open_table(OWNER_INDEX)?;

            let owned = index.remove((owner, id))?.is_some();
            if owned {
                cards.remove(id)?;
            }
            owned
        };

        if deleted {
            write_txn.commit()?;
        } else {
            write_txn.abort()?;
        }
        Ok(deleted)
    }

    fn health_check(&self) -> StoreResult<()> {
        let read_txn = self.db.begin_read()?;
        let _ = read_txn.open_table(STORE_META)?;
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
