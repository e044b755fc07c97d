// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Owner-scoped cash card endpoints.
//!
//! Every handler takes [`CardOwner`] first, so credentials and role are
//! checked before the path, query or body is looked at. Single-card
//! requests go through the store's owner-scoped operations; a card that
//! belongs to someone else is reported exactly like one that does not
//! exist.

use axum::{
    extract::{Path, Query, State},
    http::{header::LOCATION, HeaderName, StatusCode},
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    auth::CardOwner,
    config::PagingConfig,
    error::ApiError,
    models::{CashCardDraft, CashCardId, CashCardRequest, CashCardResponse},
    state::AppState,
    storage::{PageSpec, Sort},
};

/// Pagination and sorting parameters for the list endpoint.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// Zero-based page index. Negative values are treated as 0.
    pub page: Option<i64>,
    /// Page size. Values <= 0 use the default, larger values are clamped.
    pub size: Option<i64>,
    /// `field[,direction]` with field `id` or `amount` and direction
    /// `asc` or `desc`. Defaults to `amount,asc`.
    pub sort: Option<String>,
}

impl PageQuery {
    /// Resolve the query into a concrete page request.
    pub fn resolve(&self, paging: &PagingConfig) -> Result<PageSpec, ApiError> {
        let page_index = self
            .page
            .map(|page| usize::try_from(page.max(0)).unwrap_or(usize::MAX))
            .unwrap_or(0);

        let page_size = match self.size {
            Some(size) if size > 0 => usize::try_from(size)
                .unwrap_or(usize::MAX)
                .min(paging.max_page_size),
            _ => paging.default_page_size,
        };

        let sort = match self.sort.as_deref().map(str::trim) {
            None | Some("") => Sort::default(),
            Some(value) => Sort::parse(value)?,
        };

        Ok(PageSpec::new(page_index, page_size, sort))
    }
}

#[utoipa::path(
    get,
    path = "/cashcards/{id}",
    params(("id" = u64, Path, description = "Identifier of the cash card")),
    tag = "CashCards",
    security(("basic_auth" = [])),
    responses(
        (status = 200, body = CashCardResponse),
        (status = 401, description = "Missing or invalid credentials"),
        (status = 403, description = "Principal is not a card owner"),
        (status = 404, description = "No such card for this principal")
    )
)]
pub async fn get_cash_card(
    CardOwner(user): CardOwner,
    State(state): State<AppState>,
    Path(id): Path<CashCardId>,
) -> Result<Json<CashCardResponse>, ApiError> {
    match state.store.get_by_id_and_owner(id, &user.username)? {
        Some(card) => Ok(Json(card.into())),
        None => {
            tracing::debug!(card_id = id, owner = %user.username, "Cash card not found");
            Err(ApiError::not_found())
        }
    }
}

#[utoipa::path(
    post,
    path = "/cashcards",
    request_body = CashCardRequest,
    tag = "CashCards",
    security(("basic_auth" = [])),
    responses(
        (status = 201, description = "Created; Location holds the new card's URI",
            headers(("Location" = String, description = "URI of the new card"))),
        (status = 401, description = "Missing or invalid credentials"),
        (status = 403, description = "Principal is not a card owner")
    )
)]
pub async fn create_cash_card(
    CardOwner(user): CardOwner,
    State(state): State<AppState>,
    Json(request): Json<CashCardRequest>,
) -> Result<(StatusCode, [(HeaderName, String); 1]), ApiError> {
    let card = state
        .store
        .save(CashCardDraft::new(request.amount, user.username))?;

    tracing::info!(card_id = card.id, owner = %card.owner, "Created cash card");
    Ok((
        StatusCode::CREATED,
        [(LOCATION, format!("/cashcards/{}", card.id))],
    ))
}

#[utoipa::path(
    get,
    path = "/cashcards",
    params(PageQuery),
    tag = "CashCards",
    security(("basic_auth" = [])),
    responses(
        (status = 200, body = [CashCardResponse]),
        (status = 400, description = "Unknown sort property or direction"),
        (status = 401, description = "Missing or invalid credentials"),
        (status = 403, description = "Principal is not a card owner")
    )
)]
pub async fn list_cash_cards(
    CardOwner(user): CardOwner,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Vec<CashCardResponse>>, ApiError> {
    let page = query.resolve(&state.paging)?;
    let cards = state.store.find_all_by_owner(&user.username, &page)?;
    Ok(Json(cards.into_iter().map(CashCardResponse::from).collect()))
}

#[utoipa::path(
    put,
    path = "/cashcards/{id}",
    params(("id" = u64, Path, description = "Identifier of the cash card")),
    request_body = CashCardRequest,
    tag = "CashCards",
    security(("basic_auth" = [])),
    responses(
        (status = 204, description = "Amount replaced"),
        (status = 401, description = "Missing or invalid credentials"),
        (status = 403, description = "Principal is not a card owner"),
        (status = 404, description = "No such card for this principal")
    )
)]
pub async fn update_cash_card(
    CardOwner(user): CardOwner,
    State(state): State<AppState>,
    Path(id): Path<CashCardId>,
    Json(request): Json<CashCardRequest>,
) -> Result<StatusCode, ApiError> {
    match state
        .store
        .replace_amount_if_owned(id, &user.username, request.amount)?
    {
        Some(card) => {
            tracing::info!(card_id = card.id, owner = %card.owner, "Updated cash card");
            Ok(StatusCode::NO_CONTENT)
        }
        None => {
            tracing::debug!(card_id = id, owner = %user.username, "Cash card not found for update");
            Err(ApiError::not_found())
        }
    }
}

#[utoipa::path(
    delete,
    path = "/cashcards/{id}",
    params(("id" = u64, Path, description = "Identifier of the cash card")),
    tag = "CashCards",
    security(("basic_auth" = [])),
    responses(
        (status = 204, description = "Card deleted"),
        (status = 401, description = "Missing or invalid credentials"),
        (status = 403, description = "Principal is not a card owner"),
        (status = 404, description = "No such card for this principal")
    )
)]
pub async fn delete_cash_card(
    CardOwner(user): CardOwner,
    State(state): State<AppState>,
    Path(id): Path<CashCardId>,
) -> Result<StatusCode, ApiError> {
    if state.store.delete_if_owned(id, &user.username)? {
        tracing::info!(card_id = id, owner = %user.username, "Deleted cash card");
        Ok(StatusCode::NO_CONTENT)
    } else {
        tracing::debug!(card_id = id, owner = %user.username, "Cash card not found for delete");
        Err(ApiError::not_found())
    }
}
