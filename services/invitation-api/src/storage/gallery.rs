use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::StorageError;
use super::schema::GALLERY_TABLE_SCHEMA;
use super::{open_database, GALLERY_DB_FILENAME};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoRecord {
    pub photo_id: String,
    pub tenant_slug: String,
    pub url: String,
    pub caption: Option<String>,
    pub display_order: i64,
    pub taken_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPhoto {
    pub url: String,
    pub caption: Option<String>,
    pub display_order: i64,
    pub taken_at: Option<DateTime<Utc>>,
}

/// Orders photos by display order, then by when they were taken.
///
/// `photo_id` breaks remaining ties so listings are stable across requests.
pub fn sort_photos(photos: &mut [PhotoRecord]) {
    photos.sort_by(|a, b| {
        a.display_order
            .cmp(&b.display_order)
            .then_with(|| a.taken_at.cmp(&b.taken_at))
            .then_with(|| a.photo_id.cmp(&b.photo_id))
    });
}

pub struct GalleryStore {
    conn: Mutex<Connection>,
}

impl GalleryStore {
    pub fn new(data_dir: &Path) -> Result<Self, StorageError> {
        let conn = open_database(data_dir, GALLERY_DB_FILENAME, GALLERY_TABLE_SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StorageError> {
        self.conn.lock().map_err(|_| StorageError::Poisoned)
    }

    pub fn add_photo(
        &self,
        tenant_slug: &str,
        photo: &NewPhoto,
    ) -> Result<PhotoRecord, StorageError> {
        let record = PhotoRecord {
            photo_id: Uuid::new_v4().to_string(),
            tenant_slug: tenant_slug.to_string(),
            url: photo.url.clone(),
            caption: photo.caption.clone(),
            display_order: photo.display_order,
            taken_at: photo.taken_at.unwrap_or_else(Utc::now),
        };

        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO gallery_photos
                (photo_id, tenant_slug, url, caption, display_order, taken_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                record.photo_id,
                record.tenant_slug,
                record.url,
                record.caption,
                record.display_order,
                record.taken_at
            ],
        )?;

        Ok(record)
    }

    pub fn list_photos(&self, tenant_slug: &str) -> Result<Vec<PhotoRecord>, StorageError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT photo_id, tenant_slug, url, caption, display_order, taken_at
            FROM gallery_photos
            WHERE tenant_slug = ?1
            "#,
        )?;
        let rows = stmt.query_map(params![tenant_slug], read_photo_row)?;
        let mut photos = rows.collect::<Result<Vec<_>, _>>()?;

        sort_photos(&mut photos);
        Ok(photos)
    }
}

fn read_photo_row(row: &Row<'_>) -> rusqlite::Result<PhotoRecord> {
    Ok(PhotoRecord {
        photo_id: row.get(0)?,
        tenant_slug: row.get(1)?,
        url: row.get(2)?,
        caption: row.get(3)?,
        display_order: row.get(4)?,
        taken_at: row.get(5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn photo(id: &str, order: i64, hour: u32) -> PhotoRecord {
        PhotoRecord {
            photo_id: id.to_string(),
            tenant_slug: "acme".to_string(),
            url: format!("https://cdn.example.com/{id}.jpg"),
            caption: None,
            display_order: order,
            taken_at: Utc.with_ymd_and_hms(2025, 6, 1, hour, 0, 0).unwrap(),
        }
    }

    fn ids(photos: &[PhotoRecord]) -> Vec<&str> {
        photos.iter().map(|p| p.photo_id.as_str()).collect()
    }

    #[test]
    fn sorts_by_display_order_then_timestamp() {
        let mut photos = vec![
            photo("late-first", 1, 18),
            photo("second", 2, 9),
            photo("early-first", 1, 10),
            photo("zero", 0, 23),
        ];

        sort_photos(&mut photos);

        assert_eq!(ids(&photos), ["zero", "early-first", "late-first", "second"]);
    }

    #[test]
    fn identical_keys_fall_back_to_id() {
        let mut photos = vec![photo("b", 1, 12), photo("a", 1, 12)];
        sort_photos(&mut photos);
        assert_eq!(ids(&photos), ["a", "b"]);
    }

    #[test]
    fn list_returns_sorted_tenant_photos() {
        let temp = tempdir().unwrap();
        let store = GalleryStore::new(temp.path()).unwrap();
        let at = |hour| Some(Utc.with_ymd_and_hms(2025, 6, 1, hour, 0, 0).unwrap());

        store
            .add_photo(
                "acme",
                &NewPhoto {
                    url: "/p/ceremony.jpg".into(),
                    caption: Some("Ceremony".into()),
                    display_order: 2,
                    taken_at: at(15),
                },
            )
            .unwrap();
        store
            .add_photo(
                "acme",
                &NewPhoto {
                    url: "/p/cover.jpg".into(),
                    caption: None,
                    display_order: 1,
                    taken_at: at(20),
                },
            )
            .unwrap();
        store
            .add_photo(
                "globex",
                &NewPhoto {
                    url: "/p/other.jpg".into(),
                    caption: None,
                    display_order: 0,
                    taken_at: at(8),
                },
            )
            .unwrap();

        let photos = store.list_photos("acme").unwrap();
        let urls: Vec<_> = photos.iter().map(|p| p.url.as_str()).collect();
        assert_eq!(urls, ["/p/cover.jpg", "/p/ceremony.jpg"]);
    }
}
