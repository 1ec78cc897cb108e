//! Credential persistence
//!
//! The [`CredentialStore`] trait is the seam between handlers and storage:
//! a PostgreSQL implementation for deployments and an in-memory
//! implementation for tests and single-process development. The store owns
//! no validation; uniqueness is checked by the validator before writes,
//! with the database UNIQUE constraint as the only backstop for the
//! (documented) race between concurrent registrations.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use sqlx::PgPool;
use uuid::Uuid;

use super::{Credential, CredentialUpdate, NewCredential, Role};
use crate::error::StoreError;

/// Lookup and mutation interface for credentials
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Find a credential by exact email
    async fn find_by_email(&self, email: &str) -> Result<Option<Credential>, StoreError>;

    /// Find a credential by id
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Credential>, StoreError>;

    /// List all credentials
    async fn list(&self) -> Result<Vec<Credential>, StoreError>;

    /// Insert a new credential, returning its generated id
    async fn insert(&self, new: NewCredential) -> Result<Uuid, StoreError>;

    /// Update the mutable profile fields of a credential
    async fn update(&self, id: Uuid, update: CredentialUpdate) -> Result<(), StoreError>;

    /// Delete a credential
    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;

    /// Email currently stored for a record id, if the record exists
    async fn email_for_id(&self, id: Uuid) -> Result<Option<String>, StoreError>;

    /// Whether any credential holds the given email
    async fn email_exists(&self, email: &str) -> Result<bool, StoreError>;
}

#[derive(sqlx::FromRow)]
struct CredentialRow {
    id: Uuid,
    first_name: String,
    last_name: String,
    email: String,
    password_hash: Option<String>,
    role: String,
}

impl TryFrom<CredentialRow> for Credential {
    type Error = StoreError;

    fn try_from(row: CredentialRow) -> Result<Self, Self::Error> {
        let role = Role::parse(&row.role)
            .ok_or_else(|| StoreError::Corrupt(format!("unknown role {:?}", row.role)))?;
        Ok(Self {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            password_hash: row.password_hash,
            role,
        })
    }
}

/// PostgreSQL-backed credential store
#[derive(Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    /// Create a store over an existing connection pool
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Credential>, StoreError> {
        let row = sqlx::query_as::<_, CredentialRow>(
            "SELECT id, first_name, last_name, email, password_hash, role \
             FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Credential::try_from).transpose()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Credential>, StoreError> {
        let row = sqlx::query_as::<_, CredentialRow>(
            "SELECT id, first_name, last_name, email, password_hash, role \
             FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Credential::try_from).transpose()
    }

    async fn list(&self) -> Result<Vec<Credential>, StoreError> {
        let rows = sqlx::query_as::<_, CredentialRow>(
            "SELECT id, first_name, last_name, email, password_hash, role \
             FROM users ORDER BY last_name, first_name",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Credential::try_from).collect()
    }

    async fn insert(&self, new: NewCredential) -> Result<Uuid, StoreError> {
        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO users (id, first_name, last_name, email, password_hash, role) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(id)
        .bind(&new.first_name)
        .bind(&new.last_name)
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(new.role.as_str())
        .execute(&self.pool)
        .await?;
        Ok(id)
    }

    async fn update(&self, id: Uuid, update: CredentialUpdate) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE users SET first_name = $1, last_name = $2, email = $3, role = $4 \
             WHERE id = $5",
        )
        .bind(&update.first_name)
        .bind(&update.last_name)
        .bind(&update.email)
        .bind(update.role.as_str())
        .bind(id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn email_for_id(&self, id: Uuid) -> Result<Option<String>, StoreError> {
        let email = sqlx::query_scalar::<_, String>("SELECT email FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(email)
    }

    async fn email_exists(&self, email: &str) -> Result<bool, StoreError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }
}

/// In-memory credential store for tests and single-process development
#[derive(Default)]
pub struct MemoryCredentialStore {
    records: RwLock<HashMap<Uuid, Credential>>,
}

impl MemoryCredentialStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Synchronously insert a record, returning its id. Test convenience.
    pub fn seed(&self, new: NewCredential) -> Uuid {
        let id = Uuid::new_v4();
        self.records.write().insert(
            id,
            Credential {
                id,
                first_name: new.first_name,
                last_name: new.last_name,
                email: new.email,
                password_hash: new.password_hash,
                role: new.role,
            },
        );
        id
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Credential>, StoreError> {
        Ok(self
            .records
            .read()
            .values()
            .find(|c| c.email == email)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Credential>, StoreError> {
        Ok(self.records.read().get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Credential>, StoreError> {
        let mut all: Vec<Credential> = self.records.read().values().cloned().collect();
        all.sort_by(|a, b| {
            (a.last_name.as_str(), a.first_name.as_str())
                .cmp(&(b.last_name.as_str(), b.first_name.as_str()))
        });
        Ok(all)
    }

    async fn insert(&self, new: NewCredential) -> Result<Uuid, StoreError> {
        Ok(self.seed(new))
    }

    async fn update(&self, id: Uuid, update: CredentialUpdate) -> Result<(), StoreError> {
        let mut records = self.records.write();
        let record = records.get_mut(&id).ok_or(StoreError::NotFound)?;
        record.first_name = update.first_name;
        record.last_name = update.last_name;
        record.email = update.email;
        record.role = update.role;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        self.records.write().remove(&id);
        Ok(())
    }

    async fn email_for_id(&self, id: Uuid) -> Result<Option<String>, StoreError> {
        Ok(self.records.read().get(&id).map(|c| c.email.clone()))
    }

    async fn email_exists(&self, email: &str) -> Result<bool, StoreError> {
        Ok(self.records.read().values().any(|c| c.email == email))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_credential(email: &str) -> NewCredential {
        NewCredential {
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            email: email.to_string(),
            password_hash: None,
            role: Role::User,
        }
    }

    #[tokio::test]
    async fn memory_store_crud_round_trip() {
        let store = MemoryCredentialStore::new();
        let id = store.insert(new_credential("jane@x.com")).await.unwrap();

        let found = store.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(found.email, "jane@x.com");
        assert!(store.email_exists("jane@x.com").await.unwrap());
        assert_eq!(
            store.email_for_id(id).await.unwrap().as_deref(),
            Some("jane@x.com")
        );

        store
            .update(
                id,
                CredentialUpdate {
                    first_name: "Janet".to_string(),
                    last_name: "Doe".to_string(),
                    email: "janet@x.com".to_string(),
                    role: Role::Admin,
                },
            )
            .await
            .unwrap();
        let updated = store.find_by_email("janet@x.com").await.unwrap().unwrap();
        assert_eq!(updated.first_name, "Janet");
        assert_eq!(updated.role, Role::Admin);
        assert!(!store.email_exists("jane@x.com").await.unwrap());

        store.delete(id).await.unwrap();
        assert!(store.find_by_id(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_of_missing_record_is_not_found() {
        let store = MemoryCredentialStore::new();
        let result = store
            .update(
                Uuid::new_v4(),
                CredentialUpdate {
                    first_name: "X".to_string(),
                    last_name: "Y".to_string(),
                    email: "x@y.com".to_string(),
                    role: Role::User,
                },
            )
            .await;
        assert!(matches!(result, Err(StoreError::NotFound)));
    }

    #[tokio::test]
    async fn list_sorts_by_name() {
        let store = MemoryCredentialStore::new();
        store.seed(NewCredential {
            first_name: "Grace".to_string(),
            last_name: "Hopper".to_string(),
            email: "grace@x.com".to_string(),
            password_hash: None,
            role: Role::User,
        });
        store.seed(NewCredential {
            first_name: "Ada".to_string(),
            last_name: "Byron".to_string(),
            email: "ada@x.com".to_string(),
            password_hash: None,
            role: Role::Admin,
        });
        let all = store.list().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].last_name, "Byron");
        assert_eq!(all[1].last_name, "Hopper");
    }
}
