pub const TENANTS_TABLE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS tenants (
    slug TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    config TEXT
);
"#;

pub const GUESTS_TABLE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS guests (
    guest_id TEXT PRIMARY KEY,
    tenant_slug TEXT NOT NULL,
    name TEXT NOT NULL,
    email TEXT,
    max_party_size INTEGER NOT NULL DEFAULT 1,
    rsvp_status TEXT NOT NULL DEFAULT 'pending',
    party_size INTEGER,
    message TEXT,
    responded_at TEXT,
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_guests_tenant ON guests(tenant_slug);
"#;

pub const GALLERY_TABLE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS gallery_photos (
    photo_id TEXT PRIMARY KEY,
    tenant_slug TEXT NOT NULL,
    url TEXT NOT NULL,
    caption TEXT,
    display_order INTEGER NOT NULL DEFAULT 0,
    taken_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_gallery_tenant ON gallery_photos(tenant_slug);
"#;

pub const PREFERENCES_TABLE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS preferences (
    tenant_slug TEXT NOT NULL,
    visitor_id TEXT NOT NULL,
    pref_key TEXT NOT NULL,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    PRIMARY KEY (tenant_slug, visitor_id, pref_key)
);
"#;
