//! Process-local in-memory storage
//!
//! The deployment keeps every record in memory for the lifetime of one
//! process. These stores make that explicit: append-only logs with
//! monotonically increasing ids, each guarding its rows behind its own lock
//! so callers stay free of shared mutable state.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::password;

/// Storage failures surfaced to callers
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    /// Registration with an email that is already taken
    #[error("User already exists")]
    EmailTaken,
}

/// Access role attached to every account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    /// The wire spelling of the role
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

/// One registered account
#[derive(Debug, Clone)]
pub struct User {
    pub id: u64,
    pub email: String,
    pub password_digest: String,
    pub full_name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// In-memory account directory
#[derive(Debug)]
pub struct UserDirectory {
    next_id: AtomicU64,
    users: RwLock<Vec<User>>,
}

impl UserDirectory {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            users: RwLock::new(Vec::new()),
        }
    }

    /// Directory pre-loaded with the two demo accounts.
    ///
    /// Digests are computed here at seed time rather than stored as
    /// literals, so they stay consistent with the configured secret.
    pub fn with_demo_accounts(secret: &str) -> Self {
        let directory = Self::new();
        let seeded = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        directory.seed(secret, "user@example.com", "John Client", Role::User, seeded);
        directory.seed(secret, "admin@enomy.com", "Sarah Admin", Role::Admin, seeded);

        directory
    }

    fn seed(&self, secret: &str, email: &str, full_name: &str, role: Role, at: DateTime<Utc>) {
        let user = User {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            email: email.to_string(),
            password_digest: password::digest(secret, email, "password123"),
            full_name: full_name.to_string(),
            role,
            created_at: at,
        };
        self.users
            .write()
            .expect("user directory lock poisoned")
            .push(user);
    }

    /// Register a new account; emails are unique
    pub fn insert(
        &self,
        email: &str,
        password_digest: String,
        full_name: &str,
        role: Role,
    ) -> Result<User, StoreError> {
        let mut users = self.users.write().expect("user directory lock poisoned");

        if users.iter().any(|u| u.email == email) {
            return Err(StoreError::EmailTaken);
        }

        let user = User {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            email: email.to_string(),
            password_digest,
            full_name: full_name.to_string(),
            role,
            created_at: Utc::now(),
        };
        users.push(user.clone());

        Ok(user)
    }

    pub fn find_by_email(&self, email: &str) -> Option<User> {
        self.users
            .read()
            .expect("user directory lock poisoned")
            .iter()
            .find(|u| u.email == email)
            .cloned()
    }

    pub fn find_by_id(&self, id: u64) -> Option<User> {
        self.users
            .read()
            .expect("user directory lock poisoned")
            .iter()
            .find(|u| u.id == id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.users.read().expect("user directory lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for UserDirectory {
    fn default() -> Self {
        Self::new()
    }
}

/// Record types that belong to an owner and order by creation time
pub trait OwnedRecord {
    fn user_id(&self) -> u64;
    fn created_at(&self) -> DateTime<Utc>;
}

/// Append-only, monotonically-ordered in-memory log
#[derive(Debug)]
pub struct RecordLog<T> {
    next_id: AtomicU64,
    records: RwLock<Vec<T>>,
}

impl<T: OwnedRecord + Clone> RecordLog<T> {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            records: RwLock::new(Vec::new()),
        }
    }

    /// Append a record built around the next sequential id; returns the
    /// stored copy.
    pub fn append<F>(&self, build: F) -> T
    where
        F: FnOnce(u64) -> T,
    {
        let record = build(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.records
            .write()
            .expect("record log lock poisoned")
            .push(record.clone());
        record
    }

    /// All records for one owner, newest first
    pub fn list_by_owner(&self, user_id: u64) -> Vec<T> {
        let records = self.records.read().expect("record log lock poisoned");
        let mut rows: Vec<T> = records
            .iter()
            .filter(|r| r.user_id() == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        rows
    }

    pub fn len(&self) -> usize {
        self.records.read().expect("record log lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: OwnedRecord + Clone> Default for RecordLog<T> {
    fn default() -> Self {
        Self::new()
    }
}
