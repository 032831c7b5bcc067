use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use dashmap::DashMap;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use thiserror::Error;

use super::error::StorageError;
use super::schema::PREFERENCES_TABLE_SCHEMA;
use super::{open_database, PREFERENCES_DB_FILENAME};

pub const MAX_PREFERENCE_KEY_LENGTH: usize = 64;

#[derive(Debug, Error)]
pub enum PreferenceError {
    #[error("invalid preference key '{0}'")]
    InvalidKey(String),
    #[error("invalid visitor id '{0}'")]
    InvalidVisitor(String),
    #[error("preference storage failed: {0}")]
    Storage(#[from] StorageError),
}

/// Whose preferences are being read or written.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PreferenceScope {
    pub tenant_slug: String,
    pub visitor_id: String,
}

impl PreferenceScope {
    pub fn new(tenant_slug: &str, visitor_id: &str) -> Result<Self, PreferenceError> {
        if !is_valid_identifier(visitor_id) {
            return Err(PreferenceError::InvalidVisitor(visitor_id.to_string()));
        }
        Ok(Self {
            tenant_slug: tenant_slug.to_string(),
            visitor_id: visitor_id.to_string(),
        })
    }
}

/// Key-value port for visitor settings such as "music muted".
pub trait PreferenceStore: Send + Sync {
    fn read(&self, scope: &PreferenceScope, key: &str) -> Result<Option<Value>, PreferenceError>;

    fn write(&self, scope: &PreferenceScope, key: &str, value: &Value)
        -> Result<(), PreferenceError>;

    /// Returns whether a value was removed.
    fn clear(&self, scope: &PreferenceScope, key: &str) -> Result<bool, PreferenceError>;
}

pub fn validate_preference_key(key: &str) -> Result<(), PreferenceError> {
    if is_valid_identifier(key) {
        Ok(())
    } else {
        Err(PreferenceError::InvalidKey(key.to_string()))
    }
}

fn is_valid_identifier(value: &str) -> bool {
    !value.is_empty()
        && value.len() <= MAX_PREFERENCE_KEY_LENGTH
        && value
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
}

pub struct SqlitePreferenceStore {
    conn: Mutex<Connection>,
}

impl SqlitePreferenceStore {
    pub fn new(data_dir: &Path) -> Result<Self, StorageError> {
        let conn = open_database(data_dir, PREFERENCES_DB_FILENAME, PREFERENCES_TABLE_SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StorageError> {
        self.conn.lock().map_err(|_| StorageError::Poisoned)
    }
}

impl PreferenceStore for SqlitePreferenceStore {
    fn read(&self, scope: &PreferenceScope, key: &str) -> Result<Option<Value>, PreferenceError> {
        validate_preference_key(key)?;
        let conn = self.conn()?;

        let raw: Option<String> = conn
            .query_row(
                r#"
                SELECT value FROM preferences
                WHERE tenant_slug = ?1 AND visitor_id = ?2 AND pref_key = ?3
                "#,
                params![scope.tenant_slug, scope.visitor_id, key],
                |row| row.get(0),
            )
            .optional()
            .map_err(StorageError::from)?;

        let value = raw
            .map(|raw| serde_json::from_str(&raw))
            .transpose()
            .map_err(StorageError::from)?;
        Ok(value)
    }

    fn write(
        &self,
        scope: &PreferenceScope,
        key: &str,
        value: &Value,
    ) -> Result<(), PreferenceError> {
        validate_preference_key(key)?;
        let encoded = serde_json::to_string(value).map_err(StorageError::from)?;
        let conn = self.conn()?;

        conn.execute(
            r#"
            INSERT INTO preferences (tenant_slug, visitor_id, pref_key, value, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT (tenant_slug, visitor_id, pref_key)
            DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
            params![
                scope.tenant_slug,
                scope.visitor_id,
                key,
                encoded,
                Utc::now().to_rfc3339()
            ],
        )
        .map_err(StorageError::from)?;
        Ok(())
    }

    fn clear(&self, scope: &PreferenceScope, key: &str) -> Result<bool, PreferenceError> {
        validate_preference_key(key)?;
        let conn = self.conn()?;

        let removed = conn
            .execute(
                r#"
                DELETE FROM preferences
                WHERE tenant_slug = ?1 AND visitor_id = ?2 AND pref_key = ?3
                "#,
                params![scope.tenant_slug, scope.visitor_id, key],
            )
            .map_err(StorageError::from)?;
        Ok(removed > 0)
    }
}

/// Process-local store, handy for tests and ephemeral deployments.
#[derive(Default)]
pub struct InMemoryPreferenceStore {
    values: DashMap<(PreferenceScope, String), Value>,
}

impl InMemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for InMemoryPreferenceStore {
    fn read(&self, scope: &PreferenceScope, key: &str) -> Result<Option<Value>, PreferenceError> {
        validate_preference_key(key)?;
        Ok(self
            .values
            .get(&(scope.clone(), key.to_string()))
            .map(|entry| entry.value().clone()))
    }

    fn write(
        &self,
        scope: &PreferenceScope,
        key: &str,
        value: &Value,
    ) -> Result<(), PreferenceError> {
        validate_preference_key(key)?;
        self.values
            .insert((scope.clone(), key.to_string()), value.clone());
        Ok(())
    }

    fn clear(&self, scope: &PreferenceScope, key: &str) -> Result<bool, PreferenceError> {
        validate_preference_key(key)?;
        Ok(self
            .values
            .remove(&(scope.clone(), key.to_string()))
            .is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn exercise(store: &dyn PreferenceStore) {
        let scope = PreferenceScope::new("acme", "visitor-1").unwrap();
        let other = PreferenceScope::new("globex", "visitor-1").unwrap();

        assert_eq!(store.read(&scope, "music_muted").unwrap(), None);

        store.write(&scope, "music_muted", &json!(true)).unwrap();
        store.write(&scope, "music_muted", &json!(false)).unwrap();
        assert_eq!(
            store.read(&scope, "music_muted").unwrap(),
            Some(json!(false))
        );
        assert_eq!(store.read(&other, "music_muted").unwrap(), None);

        assert!(store.clear(&scope, "music_muted").unwrap());
        assert!(!store.clear(&scope, "music_muted").unwrap());
        assert_eq!(store.read(&scope, "music_muted").unwrap(), None);

        assert!(matches!(
            store.read(&scope, "bad key"),
            Err(PreferenceError::InvalidKey(_))
        ));
    }

    #[test]
    fn sqlite_store_behaves_like_a_key_value_port() {
        let temp = tempdir().unwrap();
        let store = SqlitePreferenceStore::new(temp.path()).unwrap();
        exercise(&store);
    }

    #[test]
    fn in_memory_store_behaves_like_a_key_value_port() {
        exercise(&InMemoryPreferenceStore::new());
    }

    #[test]
    fn visitor_id_is_validated() {
        assert!(matches!(
            PreferenceScope::new("acme", ""),
            Err(PreferenceError::InvalidVisitor(_))
        ));
        assert!(PreferenceScope::new("acme", &"v".repeat(65)).is_err());
    }
}
