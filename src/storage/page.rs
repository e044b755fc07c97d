// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Page specifications and the deterministic ordering used by listings.
//!
//! Every sort is a total order: the primary key comes from [`Sort`], and
//! equal primary keys are always broken by ascending `id`. Repeated calls
//! with the same [`PageSpec`] therefore return the same slice, and
//! consecutive pages partition the owner's records.

use std::cmp::Ordering;
use std::fmt;

use crate::models::CashCard;

/// Page size used when the caller does not ask for one.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Largest page size a caller may request.
pub const MAX_PAGE_SIZE: usize = 2000;

/// Field a listing can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Id,
    Amount,
}

impl SortField {
    /// Parse a sort property name (case-insensitive).
    pub fn from_name(name: &str) -> Option<SortField> {
        match name.trim().to_ascii_lowercase().as_str() {
            "id" => Some(SortField::Id),
            "amount" => Some(SortField::Amount),
            _ => None,
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortField::Id => write!(f, "id"),
            SortField::Amount => write!(f, "amount"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn from_name(name: &str) -> Option<SortDirection> {
        match name.trim().to_ascii_lowercase().as_str() {
            "asc" => Some(SortDirection::Ascending),
            "desc" => Some(SortDirection::Descending),
            _ => None,
        }
    }
}

/// Primary ordering of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Default for Sort {
    fn default() -> Self {
        Self {
            field: SortField::Amount,
            direction: SortDirection::Ascending,
        }
    }
}

/// Why a `sort` query value could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SortParseError {
    #[error("unknown sort property '{0}' (expected 'id' or 'amount')")]
    UnknownField(String),
    #[error("unknown sort direction '{0}' (expected 'asc' or 'desc')")]
    UnknownDirection(String),
}

impl Sort {
    /// Parse `field[,direction]`, e.g. `amount,desc`. Direction defaults to
    /// ascending.
    pub fn parse(value: &str) -> Result<Sort, SortParseError> {
        let mut parts = value.splitn(2, ',');
        let field_name = parts.next().unwrap_or_default();
        let field = SortField::from_name(field_name)
            .ok_or_else(|| SortParseError::UnknownField(field_name.trim().to_string()))?;

        let direction = match parts.next().map(str::trim) {
            None | Some("") => SortDirection::Ascending,
            Some(name) => SortDirection::from_name(name)
                .ok_or_else(|| SortParseError::UnknownDirection(name.to_string()))?,
        };

        Ok(Sort { field, direction })
    }

    /// Compare two cards under this sort, ties broken by ascending id.
    pub fn compare(&self, a: &CashCard, b: &CashCard) -> Ordering {
        let primary = match self.field {
            SortField::Id => a.id.cmp(&b.id),
            SortField::Amount => a.amount.total_cmp(&b.amount),
        };
        let primary = match self.direction {
            SortDirection::Ascending => primary,
            SortDirection::Descending => primary.reverse(),
        };
        primary.then_with(|| a.id.cmp(&b.id))
    }
}

/// A bounded, ordered slice request over one owner's cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSpec {
    /// Zero-based page number.
    pub page_index: usize,
    /// Records per page; always greater than zero.
    pub page_size: usize,
    pub sort: Sort,
}

impl Default for PageSpec {
    fn default() -> Self {
        Self {
            page_index: 0,
            page_size: DEFAULT_PAGE_SIZE,
            sort: Sort::default(),
        }
    }
}

impl PageSpec {
    pub fn new(page_index: usize, page_size: usize, sort: Sort) -> Self {
        Self {
            page_index,
            page_size: page_size.max(1),
            sort,
        }
    }

    /// Number of records preceding this page.
    pub fn offset(&self) -> usize {
        self.page_index.saturating_mul(self.page_size)
    }

    /// Order `cards` and cut out this page.
    pub fn apply(&self, mut cards: Vec<CashCard>) -> Vec<CashCard> {
        cards.sort_by(|a, b| self.sort.compare(a, b));
        cards
            .into_iter()
            .skip(self.offset())
            .take(self.page_size)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(id: u64, amount: f64) -> CashCard {
        CashCard {
            id,
            amount,
            owner: "sarah1".into(),
        }
    }

    fn ids(cards: &[CashCard]) -> Vec<u64> {
        cards.iter().map(|c| c.id).collect()
    }

    #[test]
    fn parse_accepts_field_and_direction() {
        assert_eq!(
            Sort::parse("amount,desc").unwrap(),
            Sort {
                field: SortField::Amount,
                direction: SortDirection::Descending
            }
        );
        assert_eq!(
            Sort::parse("ID,ASC").unwrap(),
            Sort {
                field: SortField::Id,
                direction: SortDirection::Ascending
            }
        );
        assert_eq!(Sort::parse("amount").unwrap(), Sort::default());
        assert_eq!(Sort::parse("amount,").unwrap(), Sort::default());
    }

    #[test]
    fn parse_rejects_unknown_values() {
        assert_eq!(
            Sort::parse("owner,asc"),
            Err(SortParseError::UnknownField("owner".into()))
        );
        assert_eq!(
            Sort::parse("amount,sideways"),
            Err(SortParseError::UnknownDirection("sideways".into()))
        );
    }

    #[test]
    fn equal_amounts_are_ordered_by_id_in_both_directions() {
        let cards = vec![card(3, 5.0), card(1, 5.0), card(2, 9.0)];

        let asc = PageSpec::new(0, 10, Sort::default()).apply(cards.clone());
        assert_eq!(ids(&asc), vec![1, 3, 2]);

        let desc = PageSpec::new(
            0,
            10,
            Sort {
                field: SortField::Amount,
                direction: SortDirection::Descending,
            },
        )
        .apply(cards);
        assert_eq!(ids(&desc), vec![2, 1, 3]);
    }

    #[test]
    fn pages_partition_sorted_records() {
        let cards: Vec<CashCard> = (0..7).map(|i| card(100 + i, (i % 3) as f64)).collect();
        let full = PageSpec::new(0, 100, Sort::default()).apply(cards.clone());

        let mut concatenated = Vec::new();
        for page in 0..3 {
            let slice = PageSpec::new(page, 3, Sort::default()).apply(cards.clone());
            assert!(slice.len() <= 3);
            concatenated.extend(slice);
        }

        assert_eq!(ids(&concatenated), ids(&full));
        assert!(PageSpec::new(3, 3, Sort::default()).apply(cards).is_empty());
    }

    #[test]
    fn negative_zero_and_nan_amounts_have_a_stable_position() {
        let cards = vec![card(1, f64::NAN), card(2, -1.0), card(3, 0.0), card(4, -0.0)];
        let sorted = PageSpec::new(0, 10, Sort::default()).apply(cards);
        assert_eq!(ids(&sorted), vec![2, 4, 3, 1]);
    }

    #[test]
    fn huge_page_index_does_not_overflow() {
        let spec = PageSpec::new(usize::MAX, 2, Sort::default());
        assert_eq!(spec.offset(), usize::MAX);
        assert!(spec.apply(vec![card(1, 1.0)]).is_empty());
    }

    #[test]
    fn zero_page_size_is_raised_to_one() {
        assert_eq!(PageSpec::new(0, 0, Sort::default()).page_size, 1);
    }
}
