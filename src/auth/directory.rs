// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User directory for HTTP Basic authentication.
//!
//! Passwords are reduced to an HMAC-SHA256 tag at load time and never kept
//! in clear. Verification uses `Mac::verify_slice`, which compares in
//! constant time. A tag is computed even for unknown usernames, so the
//! response time does not reveal which usernames exist.
//!
//! ## File Format
//!
//! ```json
//! {
//!   "users": [
//!     { "username": "sarah1", "password": "abc123", "role": "card-owner" },
//!     { "username": "hank-owns-no-cards", "password": "qrs456", "role": "non-owner" }
//!   ]
//! }
//! ```

use std::collections::{hash_map::Entry, HashMap};
use std::path::Path;

use hmac::{digest::Key, Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

use super::{AuthenticatedUser, Role};

type HmacSha256 = Hmac<Sha256>;

/// Domain-separation label for credential tags.
const CREDENTIAL_LABEL: &[u8] = b"cashcard-server/credential/v1";

/// `CREDENTIAL_LABEL` zero-padded to the SHA-256 block size. HMAC pads
/// short keys the same way, so tags equal those keyed by the bare label.
const CREDENTIAL_KEY: [u8; 64] = pad_block(CREDENTIAL_LABEL);

const fn pad_block(label: &[u8]) -> [u8; 64] {
    let mut key = [0u8; 64];
    let mut i = 0;
    while i < label.len() {
        key[i] = label[i];
        i += 1;
    }
    key
}

/// Error loading a user directory file.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("cannot read user file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid user file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown role '{role}' for user '{username}'")]
    UnknownRole { username: String, role: String },

    #[error("duplicate user '{0}'")]
    DuplicateUser(String),

    #[error("username must not be empty or contain ':'")]
    InvalidUsername,
}

#[derive(Debug, Deserialize)]
struct UserFile {
    users: Vec<UserEntry>,
}

#[derive(Debug, Deserialize)]
struct UserEntry {
    username: String,
    password: String,
    role: String,
}

#[derive(Debug, Clone)]
struct Credential {
    tag: Vec<u8>,
    role: Role,
}

fn credential_mac(username: &str, password: &str) -> HmacSha256 {
    let mut mac = HmacSha256::new(Key::<HmacSha256>::from_slice(&CREDENTIAL_KEY));
    mac.update(username.as_bytes());
    mac.update(&[0]);
    mac.update(password.as_bytes());
    mac
}

/// In-memory directory of known users.
#[derive(Debug, Clone, Default)]
pub struct UserDirectory {
    users: HashMap<String, Credential>,
}

impl UserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a user, replacing any previous entry with the same name.
    pub fn insert(&mut self, username: impl Into<String>, password: &str, role: Role) {
        let username = username.into();
        let tag = credential_mac(&username, password)
            .finalize()
            .into_bytes()
            .to_vec();
        self.users.insert(username, Credential { tag, role });
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with_user(mut self, username: impl Into<String>, password: &str, role: Role) -> Self {
        self.insert(username, password, role);
        self
    }

    /// Parse a directory from the JSON file format.
    pub fn from_json(json: &str) -> Result<Self, DirectoryError> {
        let file: UserFile = serde_json::from_str(json)?;
        let mut directory = Self::new();

        for entry in file.users {
            if entry.username.is_empty() || entry.username.contains(':') {
                return Err(DirectoryError::InvalidUsername);
            }
            let role = Role::from_name(&entry.role).ok_or_else(|| DirectoryError::UnknownRole {
                username: entry.username.clone(),
                role: entry.role.clone(),
            })?;
            if directory.users.contains_key(&entry.username) {
                return Err(DirectoryError::DuplicateUser(entry.username));
            }
            directory.insert(entry.username, &entry.password, role);
        }

        Ok(directory)
    }

    /// Load a directory from a JSON file on disk.
    pub fn from_file(path: &Path) -> Result<Self, DirectoryError> {
        let json = std::fs::read_to_string(path).map_err(|source| DirectoryError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Merge `other` into this directory; entries in `other` win.
    pub fn extend(&mut self, other: UserDirectory) {
        self.users.extend(other.users);
    }

    /// Add the entries of `defaults` whose username is not taken yet.
    ///
    /// Returns the usernames that were already present, sorted.
    pub fn insert_missing(&mut self, defaults: UserDirectory) -> Vec<String> {
        let mut skipped = Vec::new();
        for (username, credential) in defaults.users {
            match self.users.entry(username) {
                Entry::Occupied(entry) => skipped.push(entry.key().clone()),
                Entry::Vacant(entry) => {
                    entry.insert(credential);
                }
            }
        }
        skipped.sort();
        skipped
    }

    /// Verify a username/password pair.
    pub fn authenticate(&self, username: &str, password: &str) -> Option<AuthenticatedUser> {
        let mac = credential_mac(username, password);
        let credential = self.users.get(username)?;
        mac.verify_slice(&credential.tag).ok()?;
        Some(AuthenticatedUser::new(username, credential.role))
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> UserDirectory {
        UserDirectory::new()
            .with_user("sarah1", "abc123", Role::CardOwner)
            .with_user("hank-owns-no-cards", "qrs456", Role::NonOwner)
    }

    #[test]
    fn authenticate_accepts_valid_credentials() {
        let user = directory().authenticate("sarah1", "abc123").unwrap();
        assert_eq!(user.username, "sarah1");
        assert_eq!(user.role, Role::CardOwner);
    }

    #[test]
    fn authenticate_rejects_bad_password_and_unknown_user() {
        let dir = directory();
        assert!(dir.authenticate("sarah1", "BAD-PASSWORD").is_none());
        assert!(dir.authenticate("BAD-USER", "abc123").is_none());
        assert!(dir.authenticate("sarah1", "").is_none());
    }

    #[test]
    fn padded_key_matches_bare_label() {
        let mut bare = HmacSha256::new_from_slice(CREDENTIAL_LABEL).unwrap();
        bare.update(b"sarah1");
        bare.update(&[0]);
        bare.update(b"abc123");

        let tag = credential_mac("sarah1", "abc123").finalize().into_bytes();
        bare.verify_slice(&tag).unwrap();
    }

    #[test]
    fn tags_are_bound_to_the_username() {
        // Same password under another name must not verify.
        let dir = UserDirectory::new()
            .with_user("a", "shared", Role::CardOwner)
            .with_user("b", "other", Role::CardOwner);
        assert!(dir.authenticate("a", "shared").is_some());
        assert!(dir.authenticate("b", "shared").is_none());
    }

    #[test]
    fn from_json_loads_users_and_roles() {
        let dir = UserDirectory::from_json(
            r#"{"users":[
                {"username":"kumar2","password":"xyz789","role":"CARD-OWNER"},
                {"username":"hank","password":"qrs456","role":"non-owner"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(dir.len(), 2);
        assert_eq!(
            dir.authenticate("kumar2", "xyz789").unwrap().role,
            Role::CardOwner
        );
        assert_eq!(dir.authenticate("hank", "qrs456").unwrap().role, Role::NonOwner);
    }

    #[test]
    fn from_json_rejects_bad_entries() {
        let unknown_role = UserDirectory::from_json(
            r#"{"users":[{"username":"x","password":"y","role":"admin"}]}"#,
        );
        assert!(matches!(unknown_role, Err(DirectoryError::UnknownRole { .. })));

        let duplicate = UserDirectory::from_json(
            r#"{"users":[
                {"username":"x","password":"y","role":"card-owner"},
                {"username":"x","password":"z","role":"card-owner"}
            ]}"#,
        );
        assert!(matches!(duplicate, Err(DirectoryError::DuplicateUser(_))));

        let colon = UserDirectory::from_json(
            r#"{"users":[{"username":"a:b","password":"y","role":"card-owner"}]}"#,
        );
        assert!(matches!(colon, Err(DirectoryError::InvalidUsername)));

        assert!(matches!(
            UserDirectory::from_json("not json"),
            Err(DirectoryError::Json(_))
        ));
    }

    #[test]
    fn from_file_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = UserDirectory::from_file(&dir.path().join("missing.json"));
        assert!(matches!(result, Err(DirectoryError::Io { .. })));
    }

    #[test]
    fn from_file_reads_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.json");
        std::fs::write(
            &path,
            r#"{"users":[{"username":"sarah1","password":"abc123","role":"card-owner"}]}"#,
        )
        .unwrap();
        let directory = UserDirectory::from_file(&path).unwrap();
        assert!(directory.authenticate("sarah1", "abc123").is_some());
    }

    #[test]
    fn insert_missing_keeps_existing_entries() {
        let mut dir = UserDirectory::new().with_user("sarah1", "from-file", Role::NonOwner);
        let skipped = dir.insert_missing(directory());

        assert_eq!(skipped, vec!["sarah1".to_string()]);
        assert_eq!(dir.len(), 2);
        assert!(dir.authenticate("sarah1", "abc123").is_none());
        assert_eq!(
            dir.authenticate("sarah1", "from-file").unwrap().role,
            Role::NonOwner
        );
        assert!(dir.authenticate("hank-owns-no-cards", "qrs456").is_some());
    }

    #[test]
    fn extend_overrides_existing_entries() {
        let mut dir = directory();
        dir.extend(UserDirectory::new().with_user("sarah1", "new-pass", Role::NonOwner));
        assert!(dir.authenticate("sarah1", "abc123").is_none());
        assert_eq!(
            dir.authenticate("sarah1", "new-pass").unwrap().role,
            Role::NonOwner
        );
        assert_eq!(dir.len(), 2);
    }
}
