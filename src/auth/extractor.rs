// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors for authenticated users.
//!
//! Use the `CardOwner` extractor in cash card handlers:
//!
//! ```rust,ignore
//! async fn my_handler(CardOwner(user): CardOwner) -> impl IntoResponse {
//!     // user.username is the principal, user.role is CardOwner
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use base64ct::{Base64, Encoding};

use super::{AuthError, AuthenticatedUser, Role};
use crate::state::AppState;

/// Extractor for authenticated users.
///
/// Resolves HTTP Basic credentials against the [`UserDirectory`] in
/// [`AppState`]. Any failure rejects the request with 401 before the
/// handler runs.
///
/// [`UserDirectory`]: super::UserDirectory
pub struct Auth(pub AuthenticatedUser);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let result = authenticate(parts, state);
        if let Err(ref err) = result {
            tracing::debug!(error_code = err.error_code(), "Authentication failed");
        }
        result.map(Auth)
    }
}

fn authenticate(parts: &Parts, state: &AppState) -> Result<AuthenticatedUser, AuthError> {
    let auth_header = parts
        .headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingAuthHeader)?
        .to_str()
        .map_err(|_| AuthError::InvalidAuthHeader)?;

    let (username, password) = parse_basic_credentials(auth_header)?;

    state
        .users
        .authenticate(&username, &password)
        .ok_or(AuthError::InvalidCredentials)
}

/// Split a `Basic <base64(username:password)>` header value.
///
/// The scheme is case-insensitive. The password may itself contain `:`.
pub fn parse_basic_credentials(header: &str) -> Result<(String, String), AuthError> {
    let (scheme, encoded) = header
        .trim()
        .split_once(' ')
        .ok_or(AuthError::InvalidAuthHeader)?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return Err(AuthError::InvalidAuthHeader);
    }

    let decoded =
        Base64::decode_vec(encoded.trim()).map_err(|_| AuthError::MalformedCredentials)?;
    let decoded = String::from_utf8(decoded).map_err(|_| AuthError::MalformedCredentials)?;

    let (username, password) = decoded
        .split_once(':')
        .ok_or(AuthError::MalformedCredentials)?;
    if username.is_empty() {
        return Err(AuthError::MalformedCredentials);
    }

    Ok((username.to_string(), password.to_string()))
}

/// Extractor that requires the card-owner role.
///
/// Unauthenticated requests get 401; authenticated users without the role
/// get 403 regardless of which card they asked for.
pub struct CardOwner(pub AuthenticatedUser);

impl FromRequestParts<AppState> for CardOwner {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Auth(user) = Auth::from_request_parts(parts, state).await?;

        if !user.has_role(Role::CardOwner) {
            tracing::debug!(username = %user.username, "Principal lacks card-owner role");
            return Err(AuthError::InsufficientPermissions);
        }

        Ok(CardOwner(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::UserDirectory;
    use axum::http::Request;
    use base64::{engine::general_purpose::STANDARD, Engine};

    fn create_test_state() -> AppState {
        AppState::default().with_users(
            UserDirectory::new()
                .with_user("sarah1", "abc123", Role::CardOwner)
                .with_user("hank-owns-no-cards", "qrs456", Role::NonOwner),
        )
    }

    fn basic(username: &str, password: &str) -> String {
        format!("Basic {}", STANDARD.encode(format!("{username}:{password}")))
    }

    fn parts_with_auth(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/cashcards");
        if let Some(value) = value {
            builder = builder.header("Authorization", value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn auth_extractor_requires_auth_header() {
        let state = create_test_state();
        let mut parts = parts_with_auth(None);

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::MissingAuthHeader)));
    }

    #[tokio::test]
    async fn auth_extractor_succeeds_with_valid_credentials() {
        let state = create_test_state();
        let header = basic("sarah1", "abc123");
        let mut parts = parts_with_auth(Some(&header));

        let Auth(user) = Auth::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(user.username, "sarah1");
        assert_eq!(user.role, Role::CardOwner);
    }

    #[tokio::test]
    async fn auth_extractor_rejects_bad_credentials() {
        let state = create_test_state();

        let header = basic("BAD-USER", "abc123");
        let mut parts = parts_with_auth(Some(&header));
        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));

        let header = basic("sarah1", "BAD-PASSWORD");
        let mut parts = parts_with_auth(Some(&header));
        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn auth_extractor_ignores_request_extensions() {
        let state = create_test_state();
        let mut parts = parts_with_auth(None);
        parts
            .extensions
            .insert(AuthenticatedUser::new("sarah1", Role::CardOwner));

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::MissingAuthHeader)));
    }

    #[tokio::test]
    async fn card_owner_rejects_non_owner_role() {
        let state = create_test_state();
        let header = basic("hank-owns-no-cards", "qrs456");
        let mut parts = parts_with_auth(Some(&header));

        let result = CardOwner::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::InsufficientPermissions)));
    }

    #[tokio::test]
    async fn card_owner_passes_through_unauthenticated_error() {
        let state = create_test_state();
        let mut parts = parts_with_auth(Some("Bearer abc"));

        let result = CardOwner::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::InvalidAuthHeader)));
    }

    #[test]
    fn parse_basic_credentials_handles_edge_cases() {
        let header = basic("sarah1", "pa:ss");
        assert_eq!(
            parse_basic_credentials(&header).unwrap(),
            ("sarah1".to_string(), "pa:ss".to_string())
        );

        let lowercase = format!("basic {}", STANDARD.encode("sarah1:abc123"));
        assert!(parse_basic_credentials(&lowercase).is_ok());

        assert_eq!(
            parse_basic_credentials("Basic"),
            Err(AuthError::InvalidAuthHeader)
        );
        assert_eq!(
            parse_basic_credentials("Basic !!!not-base64"),
            Err(AuthError::MalformedCredentials)
        );
        let no_colon = format!("Basic {}", STANDARD.encode("sarah1"));
        assert_eq!(
            parse_basic_credentials(&no_colon),
            Err(AuthError::MalformedCredentials)
        );
        let empty_user = format!("Basic {}", STANDARD.encode(":abc123"));
        assert_eq!(
            parse_basic_credentials(&empty_user),
            Err(AuthError::MalformedCredentials)
        );
    }
}
