use std::path::Path;

use rusqlite::Connection;

pub mod error;
pub mod gallery;
pub mod guests;
pub mod preferences;
pub mod schema;
pub mod tenant_registry;

pub use error::StorageError;
pub use gallery::{sort_photos, GalleryStore, NewPhoto, PhotoRecord};
pub use guests::{GuestRecord, GuestStore, NewGuest, RsvpStatus, RsvpSubmission};
pub use preferences::{
    InMemoryPreferenceStore, PreferenceError, PreferenceScope, PreferenceStore,
    SqlitePreferenceStore,
};
pub use tenant_registry::TenantRegistry;

pub const TENANT_DB_FILENAME: &str = "tenants.db";
pub const GUESTS_DB_FILENAME: &str = "guests.db";
pub const GALLERY_DB_FILENAME: &str = "gallery.db";
pub const PREFERENCES_DB_FILENAME: &str = "preferences.db";

/// Opens (or creates) a database file under `data_dir` and applies `schema`.
pub(crate) fn open_database(
    data_dir: &Path,
    filename: &str,
    schema: &str,
) -> Result<Connection, StorageError> {
    std::fs::create_dir_all(data_dir)?;
    let conn = Connection::open(data_dir.join(filename))?;
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.execute_batch(schema)?;
    Ok(conn)
}
