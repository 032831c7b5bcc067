use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::error::StorageError;
use super::schema::GUESTS_TABLE_SCHEMA;
use super::{open_database, GUESTS_DB_FILENAME};

pub const MAX_RSVP_MESSAGE_CHARS: usize = 1000;

const SELECT_GUEST: &str = r#"
    SELECT guest_id, tenant_slug, name, email, max_party_size, rsvp_status,
           party_size, message, responded_at, created_at
    FROM guests
"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RsvpStatus {
    Pending,
    Attending,
    Declined,
}

impl RsvpStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Attending => "attending",
            Self::Declined => "declined",
        }
    }
}

impl fmt::Display for RsvpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RsvpStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "attending" => Ok(Self::Attending),
            "declined" => Ok(Self::Declined),
            other => Err(format!("unknown rsvp status '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuestRecord {
    pub guest_id: String,
    pub tenant_slug: String,
    pub name: String,
    pub email: Option<String>,
    pub max_party_size: u32,
    pub rsvp_status: RsvpStatus,
    pub party_size: Option<u32>,
    pub message: Option<String>,
    pub responded_at: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct NewGuest {
    pub name: String,
    pub email: Option<String>,
    pub max_party_size: u32,
}

#[derive(Debug, Clone)]
pub struct RsvpSubmission {
    pub attending: bool,
    pub party_size: Option<u32>,
    pub message: Option<String>,
}

impl RsvpSubmission {
    /// Returns the party size to store, checked against the invitation.
    fn resolved_party_size(&self, max_party_size: u32) -> Result<u32, StorageError> {
        if !self.attending {
            return Ok(0);
        }

        let size = self.party_size.unwrap_or(1);
        if size == 0 || size > max_party_size {
            return Err(StorageError::InvalidRsvp(format!(
                "party size must be between 1 and {max_party_size}"
            )));
        }
        Ok(size)
    }

    fn normalized_message(&self) -> Result<Option<String>, StorageError> {
        let message = self
            .message
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty());

        match message {
            Some(m) if m.chars().count() > MAX_RSVP_MESSAGE_CHARS => {
                Err(StorageError::InvalidRsvp(format!(
                    "message must be at most {MAX_RSVP_MESSAGE_CHARS} characters"
                )))
            }
            other => Ok(other.map(str::to_string)),
        }
    }
}

/// Guest list and RSVP answers, always scoped to one tenant.
pub struct GuestStore {
    conn: Mutex<Connection>,
}

impl GuestStore {
    pub fn new(data_dir: &Path) -> Result<Self, StorageError> {
        let conn = open_database(data_dir, GUESTS_DB_FILENAME, GUESTS_TABLE_SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StorageError> {
        self.conn.lock().map_err(|_| StorageError::Poisoned)
    }

    pub fn add_guest(
        &self,
        tenant_slug: &str,
        guest: &NewGuest,
    ) -> Result<GuestRecord, StorageError> {
        if guest.name.trim().is_empty() {
            return Err(StorageError::InvalidGuest("guest name cannot be empty".into()));
        }
        if guest.max_party_size == 0 {
            return Err(StorageError::InvalidGuest(
                "max party size must be at least 1".into(),
            ));
        }

        let record = GuestRecord {
            guest_id: Uuid::new_v4().to_string(),
            tenant_slug: tenant_slug.to_string(),
            name: guest.name.trim().to_string(),
            email: guest.email.clone(),
            max_party_size: guest.max_party_size,
            rsvp_status: RsvpStatus::Pending,
            party_size: None,
            message: None,
            responded_at: None,
            created_at: Utc::now().to_rfc3339(),
        };

        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO guests (guest_id, tenant_slug, name, email, max_party_size,
                                rsvp_status, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                record.guest_id,
                record.tenant_slug,
                record.name,
                record.email,
                record.max_party_size,
                record.rsvp_status.as_str(),
                record.created_at
            ],
        )?;

        Ok(record)
    }

    /// A guest registered under another tenant is reported as absent.
    pub fn get_guest(
        &self,
        tenant_slug: &str,
        guest_id: &str,
    ) -> Result<Option<GuestRecord>, StorageError> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare(&format!("{SELECT_GUEST} WHERE tenant_slug = ?1 AND guest_id = ?2"))?;
        let guest = stmt
            .query_row(params![tenant_slug, guest_id], read_guest_row)
            .optional()?;
        Ok(guest)
    }

    pub fn list_guests(&self, tenant_slug: &str) -> Result<Vec<GuestRecord>, StorageError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "{SELECT_GUEST} WHERE tenant_slug = ?1 ORDER BY name COLLATE NOCASE, guest_id"
        ))?;
        let rows = stmt.query_map(params![tenant_slug], read_guest_row)?;
        let guests = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(guests)
    }

    pub fn submit_rsvp(
        &self,
        tenant_slug: &str,
        guest_id: &str,
        submission: &RsvpSubmission,
    ) -> Result<GuestRecord, StorageError> {
        let mut guest = self
            .get_guest(tenant_slug, guest_id)?
            .ok_or_else(|| StorageError::GuestNotFound(guest_id.to_string()))?;

        let party_size = submission.resolved_party_size(guest.max_party_size)?;
        let message = submission.normalized_message()?;

        guest.rsvp_status = if submission.attending {
            RsvpStatus::Attending
        } else {
            RsvpStatus::Declined
        };
        guest.party_size = Some(party_size);
        guest.message = message;
        guest.responded_at = Some(Utc::now().to_rfc3339());

        let conn = self.conn()?;
        conn.execute(
            r#"
            UPDATE guests
            SET rsvp_status = ?3,
                party_size = ?4,
                message = ?5,
                responded_at = ?6
            WHERE tenant_slug = ?1 AND guest_id = ?2
            "#,
            params![
                tenant_slug,
                guest_id,
                guest.rsvp_status.as_str(),
                guest.party_size,
                guest.message,
                guest.responded_at
            ],
        )?;

        info!(
            tenant = tenant_slug,
            guest_id,
            status = %guest.rsvp_status,
            "recorded rsvp"
        );

        Ok(guest)
    }
}

fn read_guest_row(row: &Row<'_>) -> rusqlite::Result<GuestRecord> {
    let status: String = row.get(5)?;
    let rsvp_status = status.parse::<RsvpStatus>().map_err(|err| {
        rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, err.into())
    })?;

    Ok(GuestRecord {
        guest_id: row.get(0)?,
        tenant_slug: row.get(1)?,
        name: row.get(2)?,
        email: row.get(3)?,
        max_party_size: row.get(4)?,
        rsvp_status,
        party_size: row.get(6)?,
        message: row.get(7)?,
        responded_at: row.get(8)?,
        created_at: row.get(9)?,
    })
}
