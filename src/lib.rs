// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Cash Card Service - Owner-scoped cash card ledger API
//!
//! Authenticated card owners create, read, update, delete and list cash
//! cards. Every card belongs to exactly one principal and is invisible to
//! everyone else.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - HTTP Basic authentication and roles
//! - `config` - Environment configuration
//! - `storage` - Record store contract with in-memory and redb backends

pub mod api;
pub mod auth;
pub mod config;
pub mod demo;
pub mod error;
pub mod logging;
pub mod models;
pub mod state;
pub mod storage;
