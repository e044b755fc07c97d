// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::{
    auth::UserDirectory,
    config::PagingConfig,
    storage::{CashCardStore, InMemoryStore},
};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CashCardStore>,
    pub users: Arc<UserDirectory>,
    pub paging: PagingConfig,
}

impl AppState {
    pub fn new(store: Arc<dyn CashCardStore>, users: UserDirectory) -> Self {
        Self {
            store,
            users: Arc::new(users),
            paging: PagingConfig::default(),
        }
    }

    pub fn with_users(mut self, users: UserDirectory) -> Self {
        self.users = Arc::new(users);
        self
    }

    pub fn with_paging(mut self, paging: PagingConfig) -> Self {
        self.paging = paging;
        self
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Arc::new(InMemoryStore::new()), UserDirectory::new())
    }
}
