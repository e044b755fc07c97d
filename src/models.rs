// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Cash Card Data Models
//!
//! This module defines the stored record and the request and response data
//! structures used by the REST API.
//!
//! ## Model Categories
//!
//! - **Stored records**: [`CashCard`] as held by the store, including its owner
//! - **Drafts**: [`CashCardDraft`] passed to `save`, with an optional id
//! - **Wire types**: [`CashCardResponse`] and [`CashCardRequest`], which never
//!   carry the owner

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Store-assigned cash card identifier. Unique across all owners.
pub type CashCardId = u64;

// =============================================================================
// Stored Records
// =============================================================================

/// A cash card as persisted by the record store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CashCard {
    /// Unique identifier, assigned by the store on first save.
    pub id: CashCardId,
    /// Balance. Signed, no currency, no range constraint.
    pub amount: f64,
    /// Principal that may read, modify or delete this card.
    pub owner: String,
}

impl CashCard {
    /// Whether `principal` owns this card.
    pub fn is_owned_by(&self, principal: &str) -> bool {
        self.owner == principal
    }
}

/// Input to `CashCardStore::save`.
///
/// With `id: None` the store inserts a new record under a fresh id. With
/// `id: Some(_)` it overwrites the record with that id.
#[derive(Debug, Clone, PartialEq)]
pub struct CashCardDraft {
    pub id: Option<CashCardId>,
    pub amount: f64,
    pub owner: String,
}

impl CashCardDraft {
    /// A draft for a brand new card; the store picks the id.
    pub fn new(amount: f64, owner: impl Into<String>) -> Self {
        Self {
            id: None,
            amount,
            owner: owner.into(),
        }
    }

    /// A draft that targets an explicit id (seeding and overwrites).
    pub fn with_id(id: CashCardId, amount: f64, owner: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            amount,
            owner: owner.into(),
        }
    }
}

impl From<CashCard> for CashCardDraft {
    fn from(card: CashCard) -> Self {
        Self {
            id: Some(card.id),
            amount: card.amount,
            owner: card.owner,
        }
    }
}

// =============================================================================
// Wire Types
// =============================================================================

/// Cash card as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct CashCardResponse {
    /// Unique identifier of the card.
    pub id: CashCardId,
    /// Current balance.
    pub amount: f64,
}

impl From<CashCard> for CashCardResponse {
    fn from(card: CashCard) -> Self {
        Self {
            id: card.id,
            amount: card.amount,
        }
    }
}

/// Request body for creating or updating a cash card.
///
/// Only `amount` is read. Any `id` or `owner` supplied by the caller is
/// ignored during deserialization.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct CashCardRequest {
    /// New balance.
    pub amount: f64,
}
