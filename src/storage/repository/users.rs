// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User repository.
//!
//! Usernames and emails are unique; both constraints are enforced by index
//! tables checked and written inside the same transaction as the user row,
//! so a duplicate can never slip in between check and insert.

use chrono::{DateTime, Utc};
use redb::ReadableTable;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::{Principal, Role};

use super::super::database::{
    Database, StorageError, StorageResult, EMAIL_INDEX, USERNAME_INDEX, USERS,
};
use super::super::ownership::OwnedResource;

/// User row as persisted. Contains the password digest and is never
/// returned to API clients; see [`UserResponse`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredUser {
    /// Unique user identifier (UUID)
    pub user_id: String,
    /// Login name (unique)
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    /// Email address (unique)
    pub email: String,
    /// Argon2 digest of the password
    pub password_hash: String,
    /// Admin flag; mutated only through admin-gated update
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

impl StoredUser {
    /// Resolve this user row into the per-request principal.
    pub fn to_principal(&self) -> Principal {
        Principal {
            user_id: self.user_id.clone(),
            username: self.username.clone(),
            role: Role::from_admin_flag(self.is_admin),
        }
    }
}

impl OwnedResource for StoredUser {
    fn owner_user_id(&self) -> &str {
        &self.user_id
    }
}

/// User shape returned to API clients (never includes the password digest).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub user_id: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

impl From<StoredUser> for UserResponse {
    fn from(user: StoredUser) -> Self {
        Self {
            user_id: user.user_id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            is_admin: user.is_admin,
            created_at: user.created_at,
        }
    }
}

/// Input for user creation. The password arrives already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub is_admin: bool,
}

/// Partial update; only `Some` fields are mutated.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub password_hash: Option<String>,
    pub is_admin: Option<bool>,
}

/// Repository for user rows.
pub struct UserRepository<'a> {
    db: &'a Database,
}

impl<'a> UserRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Create a new user.
    ///
    /// Fails with `AlreadyExists` if the username or email is taken;
    /// nothing is written in that case.
    pub fn create(&self, new: NewUser) -> StorageResult<StoredUser> {
        let user = StoredUser {
            user_id: Uuid::new_v4().to_string(),
            username: new.username,
            first_name: new.first_name,
            last_name: new.last_name,
            email: new.email,
            password_hash: new.password_hash,
            is_admin: new.is_admin,
            created_at: Utc::now(),
        };
        let bytes = serde_json::to_vec(&user)?;

        let write_txn = self.db.begin_write()?;
        {
            let mut username_index = write_txn.open_table(USERNAME_INDEX)?;
            if username_index.get(user.username.as_str())?.is_some() {
                return Err(StorageError::AlreadyExists(format!(
                    "Username {}",
                    user.username
                )));
            }

            let mut email_index = write_txn.open_table(EMAIL_INDEX)?;
            if email_index.get(user.email.as_str())?.is_some() {
                return Err(StorageError::AlreadyExists(format!("Email {}", user.email)));
            }

            let mut users = write_txn.open_table(USERS)?;
            users.insert(user.user_id.as_str(), bytes.as_slice())?;
            username_index.insert(user.username.as_str(), user.user_id.as_str())?;
            email_index.insert(user.email.as_str(), user.user_id.as_str())?;
        }
        write_txn.commit()?;

        Ok(user)
    }

    /// Get a user by ID.
    pub fn get(&self, user_id: &str) -> StorageResult<StoredUser> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(USERS)?;
        match table.get(user_id)? {
            Some(value) => Ok(serde_json::from_slice(value.value())?),
            None => Err(StorageError::NotFound(format!("User {user_id}"))),
        }
    }

    /// Look up a user by username. Absence is a `None`, not an error, so
    /// callers can treat it uniformly with credential failures.
    pub fn find_by_username(&self, username: &str) -> StorageResult<Option<StoredUser>> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(USERNAME_INDEX)?;
        let user_id = match index.get(username)? {
            Some(value) => value.value().to_string(),
            None => return Ok(None),
        };

        let users = read_txn.open_table(USERS)?;
        match users.get(user_id.as_str())? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// List all users (admin view).
    pub fn list(&self) -> StorageResult<Vec<StoredUser>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(USERS)?;

        let mut users = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            users.push(serde_json::from_slice(value.value())?);
        }
        Ok(users)
    }

    /// Apply a partial update to a user row.
    pub fn update(&self, user_id: &str, update: UserUpdate) -> StorageResult<StoredUser> {
        let write_txn = self.db.begin_write()?;
        let updated = {
            let mut table = write_txn.open_table(USERS)?;
            let bytes = match table.get(user_id)? {
                Some(value) => value.value().to_vec(),
                None => return Err(StorageError::NotFound(format!("User {user_id}"))),
            };

            let mut user: StoredUser = serde_json::from_slice(&bytes)?;
            if let Some(first_name) = update.first_name {
                user.first_name = first_name;
            }
            if let Some(last_name) = update.last_name {
                user.last_name = last_name;
            }
            if let Some(password_hash) = update.password_hash {
                user.password_hash = password_hash;
            }
            if let Some(is_admin) = update.is_admin {
                user.is_admin = is_admin;
            }

            table.insert(user_id, serde_json::to_vec(&user)?.as_slice())?;
            user
        };
        write_txn.commit()?;

        Ok(updated)
    }

    /// Delete a user and their uniqueness index entries.
    pub fn delete(&self, user_id: &str) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut users = write_txn.open_table(USERS)?;
            let bytes = match users.get(user_id)? {
                Some(value) => value.value().to_vec(),
                None => return Err(StorageError::NotFound(format!("User {user_id}"))),
            };
            let user: StoredUser = serde_json::from_slice(&bytes)?;
            users.remove(user_id)?;

            let mut username_index = write_txn.open_table(USERNAME_INDEX)?;
            username_index.remove(user.username.as_str())?;

            let mut email_index = write_txn.open_table(EMAIL_INDEX)?;
            email_index.remove(user.email.as_str())?;
        }
        write_txn.commit()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_db() -> (Database, TempDir) {
        let dir = TempDir::new().expect("temp dir");
        let db = Database::open(dir.path()).expect("open database");
        (db, dir)
    }

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            email: email.to_string(),
            password_hash: "$argon2id$fake".to_string(),
            is_admin: false,
        }
    }

    #[test]
    fn create_then_get_roundtrip() {
        let (db, _dir) = test_db();
        let repo = UserRepository::new(&db);

        let created = repo
            .create(new_user("alice", "alice@example.com"))
            .expect("creation succeeds");
        let fetched = repo.get(&created.user_id).expect("get succeeds");

        assert_eq!(fetched.username, "alice");
        assert_eq!(fetched.email, "alice@example.com");
        assert!(!fetched.is_admin);
    }

    #[test]
    fn duplicate_username_is_rejected() {
        let (db, _dir) = test_db();
        let repo = UserRepository::new(&db);

        repo.create(new_user("alice", "alice@example.com"))
            .expect("first creation succeeds");
        let result = repo.create(new_user("alice", "other@example.com"));

        assert!(matches!(result, Err(StorageError::AlreadyExists(_))));
        // The failed attempt must not have claimed the email.
        assert_eq!(repo.list().expect("list succeeds").len(), 1);
    }

    #[test]
    fn duplicate_email_is_rejected() {
        let (db, _dir) = test_db();
        let repo = UserRepository::new(&db);

        repo.create(new_user("alice", "alice@example.com"))
            .expect("first creation succeeds");
        let result = repo.create(new_user("bob", "alice@example.com"));

        assert!(matches!(result, Err(StorageError::AlreadyExists(_))));
    }

    #[test]
    fn find_by_username_resolves_and_misses() {
        let (db, _dir) = test_db();
        let repo = UserRepository::new(&db);

        repo.create(new_user("alice", "alice@example.com"))
            .expect("creation succeeds");

        assert!(repo
            .find_by_username("alice")
            .expect("lookup succeeds")
            .is_some());
        assert!(repo
            .find_by_username("nobody")
            .expect("lookup succeeds")
            .is_none());
    }

    #[test]
    fn update_is_partial() {
        let (db, _dir) = test_db();
        let repo = UserRepository::new(&db);

        let created = repo
            .create(new_user("alice", "alice@example.com"))
            .expect("creation succeeds");
        let updated = repo
            .update(
                &created.user_id,
                UserUpdate {
                    first_name: Some("Alicia".to_string()),
                    ..Default::default()
                },
            )
            .expect("update succeeds");

        assert_eq!(updated.first_name, "Alicia");
        assert_eq!(updated.last_name, "User");
        assert_eq!(updated.email, "alice@example.com");
    }

    #[test]
    fn delete_releases_username_and_email() {
        let (db, _dir) = test_db();
        let repo = UserRepository::new(&db);

        let created = repo
            .create(new_user("alice", "alice@example.com"))
            .expect("creation succeeds");
        repo.delete(&created.user_id).expect("deletion succeeds");

        assert!(repo
            .find_by_username("alice")
            .expect("lookup succeeds")
            .is_none());
        // Username and email are reusable after deletion.
        repo.create(new_user("alice", "alice@example.com"))
            .expect("recreation succeeds");
    }

    #[test]
    fn to_principal_derives_role_from_flag() {
        let (db, _dir) = test_db();
        let repo = UserRepository::new(&db);

        let mut admin = new_user("root", "root@example.com");
        admin.is_admin = true;
        let created = repo.create(admin).expect("creation succeeds");

        assert_eq!(created.to_principal().role, Role::Admin);
    }
}
