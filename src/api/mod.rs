// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{routing::get, Router};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    models::{CashCardRequest, CashCardResponse},
    state::AppState,
};

pub mod cashcards;
pub mod health;

pub fn router(state: AppState) -> Router {
    let routes = Router::new()
        .route(
            "/cashcards",
            get(cashcards::list_cash_cards).post(cashcards::create_cash_card),
        )
        .route(
            "/cashcards/{id}",
            get(cashcards::get_cash_card)
                .put(cashcards::update_cash_card)
                .delete(cashcards::delete_cash_card),
        )
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state);

    let middleware = ServiceBuilder::new()
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(CorsLayer::permissive());

    Router::new()
        .merge(routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(middleware)
}

/// Registers the HTTP Basic scheme referenced by `security(("basic_auth" = []))`.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "basic_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Basic)),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        cashcards::get_cash_card,
        cashcards::create_cash_card,
        cashcards::list_cash_cards,
        cashcards::update_cash_card,
        cashcards::delete_cash_card,
        health::health,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            CashCardRequest,
            CashCardResponse,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "CashCards", description = "Owner-scoped cash card management"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
struct ApiDoc;
