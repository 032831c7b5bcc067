use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde_json::Value;
use wedding_tenant_resolver::{LookupError, TenantLookup, TenantRecord, TenantSlug};

use super::error::{is_constraint_violation, StorageError};
use super::schema::TENANTS_TABLE_SCHEMA;
use super::{open_database, TENANT_DB_FILENAME};

const SELECT_TENANT: &str = r#"
    SELECT slug, name, is_active, created_at, updated_at, config
    FROM tenants
"#;

pub struct TenantRegistry {
    conn: Mutex<Connection>,
}

impl TenantRegistry {
    pub fn new(data_dir: &Path) -> Result<Self, StorageError> {
        let conn = open_database(data_dir, TENANT_DB_FILENAME, TENANTS_TABLE_SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StorageError> {
        self.conn.lock().map_err(|_| StorageError::Poisoned)
    }

    pub fn create_tenant(&self, tenant: &TenantRecord) -> Result<(), StorageError> {
        let config = encode_config(tenant.config.as_ref())?;
        let conn = self.conn()?;

        conn.execute(
            r#"
            INSERT INTO tenants (slug, name, is_active, created_at, updated_at, config)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                tenant.slug,
                tenant.name,
                tenant.is_active,
                tenant.created_at,
                tenant.updated_at,
                config
            ],
        )
        .map_err(|err| {
            if is_constraint_violation(&err) {
                StorageError::TenantExists(tenant.slug.clone())
            } else {
                StorageError::DatabaseError(err)
            }
        })?;
        Ok(())
    }

    /// Exact, case-sensitive match on the slug.
    pub fn get_tenant(&self, slug: &str) -> Result<Option<TenantRecord>, StorageError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!("{SELECT_TENANT} WHERE slug = ?1"))?;

        let row = stmt
            .query_row(params![slug], read_tenant_row)
            .optional()?;

        Ok(row)
    }

    pub fn update_tenant(&self, tenant: &TenantRecord) -> Result<(), StorageError> {
        let config = encode_config(tenant.config.as_ref())?;
        let conn = self.conn()?;

        let updated = conn.execute(
            r#"
            UPDATE tenants
            SET name = ?2,
                is_active = ?3,
                updated_at = ?4,
                config = ?5
            WHERE slug = ?1
            "#,
            params![
                tenant.slug,
                tenant.name,
                tenant.is_active,
                tenant.updated_at,
                config
            ],
        )?;

        if updated == 0 {
            return Err(StorageError::TenantNotFound(tenant.slug.clone()));
        }

        Ok(())
    }

    pub fn set_active(&self, slug: &str, is_active: bool) -> Result<(), StorageError> {
        let conn = self.conn()?;
        let now = Utc::now().to_rfc3339();

        let updated = conn.execute(
            "UPDATE tenants SET is_active = ?2, updated_at = ?3 WHERE slug = ?1",
            params![slug, is_active, now],
        )?;

        if updated == 0 {
            return Err(StorageError::TenantNotFound(slug.to_string()));
        }

        Ok(())
    }

    pub fn list_tenants(
        &self,
        active_filter: Option<bool>,
    ) -> Result<Vec<TenantRecord>, StorageError> {
        let conn = self.conn()?;

        let tenants = match active_filter {
            Some(active) => {
                let mut stmt = conn.prepare(&format!(
                    "{SELECT_TENANT} WHERE is_active = ?1 ORDER BY created_at DESC, slug"
                ))?;
                let rows = stmt.query_map(params![active], read_tenant_row)?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
            None => {
                let mut stmt =
                    conn.prepare(&format!("{SELECT_TENANT} ORDER BY created_at DESC, slug"))?;
                let rows = stmt.query_map([], read_tenant_row)?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
        };

        Ok(tenants)
    }
}

#[async_trait]
impl TenantLookup for TenantRegistry {
    async fn find_tenant_by_slug(
        &self,
        slug: &TenantSlug,
    ) -> Result<Option<TenantRecord>, LookupError> {
        Ok(self.get_tenant(slug.as_str())?)
    }
}

fn encode_config(config: Option<&Value>) -> Result<Option<String>, StorageError> {
    Ok(config.map(serde_json::to_string).transpose()?)
}

fn read_tenant_row(row: &Row<'_>) -> rusqlite::Result<TenantRecord> {
    let config: Option<String> = row.get(5)?;
    let config = config
        .map(|raw| serde_json::from_str::<Value>(&raw))
        .transpose()
        .map_err(|err| {
            rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(err))
        })?;

    Ok(TenantRecord {
        slug: row.get(0)?,
        name: row.get(1)?,
        is_active: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
        config,
    })
}
