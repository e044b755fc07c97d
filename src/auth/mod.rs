// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! This module provides HTTP Basic authentication and role checks for the
//! cash card API.
//!
//! ## Auth Flow
//!
//! 1. Client sends `Authorization: Basic base64(username:password)`
//! 2. Server:
//!    - Decodes the credentials
//!    - Verifies them against the [`UserDirectory`]
//!    - Resolves the principal name and [`Role`]
//! 3. Cash card handlers additionally require [`Role::CardOwner`]
//!
//! ## Security
//!
//! - All `/cashcards` endpoints require authentication (401 otherwise)
//! - Authenticated users without the card-owner role get 403
//! - Health and documentation endpoints are public

pub mod directory;
pub mod error;
pub mod extractor;
pub mod principal;
pub mod roles;

pub use directory::{DirectoryError, UserDirectory};
pub use error::AuthError;
pub use extractor::{Auth, CardOwner};
pub use principal::AuthenticatedUser;
pub use roles::Role;
