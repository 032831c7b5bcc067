use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;
use wedding_tenant_resolver::TenantSlug;

use super::MusicError;

pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "m4a", "ogg", "wav", "flac"];

/// Public mount point for the music directory.
static MUSIC_ROUTE_BASE: LazyLock<Url> =
    LazyLock::new(|| Url::parse("http://localhost/music").expect("music route base parses"));

static TRACK_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{1,3}(?:\s*[.)]\s*|\s+-\s+)").expect("track number pattern compiles")
});
static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern compiles"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackMetadata {
    pub title: String,
    pub artist: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub file_name: String,
    pub title: String,
    pub artist: Option<String>,
    pub url: String,
}

/// Derives display metadata from an audio file name.
///
/// `01. Ed_Sheeran - Perfect.mp3` becomes artist `Ed Sheeran`, title
/// `Perfect`. Returns `None` for files that are not audio.
pub fn parse_track_filename(file_name: &str) -> Option<TrackMetadata> {
    let (stem, extension) = file_name.rsplit_once('.')?;
    if stem.is_empty() || !is_audio_extension(extension) {
        return None;
    }

    let spaced = stem.replace('_', " ");
    let collapsed = WHITESPACE.replace_all(spaced.trim(), " ");
    let without_number = TRACK_NUMBER.replace(&collapsed, "");
    let cleaned = if without_number.trim().is_empty() {
        collapsed.as_ref()
    } else {
        without_number.trim()
    };

    let metadata = match cleaned.split_once(" - ") {
        Some((artist, title)) if !artist.trim().is_empty() && !title.trim().is_empty() => {
            TrackMetadata {
                title: title.trim().to_string(),
                artist: Some(artist.trim().to_string()),
            }
        }
        _ => TrackMetadata {
            title: cleaned.to_string(),
            artist: None,
        },
    };

    Some(metadata)
}

fn is_audio_extension(extension: &str) -> bool {
    AUDIO_EXTENSIONS
        .iter()
        .any(|known| known.eq_ignore_ascii_case(extension))
}

/// Per-tenant background music stored as `<root>/<slug>/<file>`.
#[derive(Debug, Clone)]
pub struct MusicLibrary {
    root: PathBuf,
}

impl MusicLibrary {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Lists the tenant's tracks sorted by file name.
    ///
    /// A tenant without a music folder simply has no tracks.
    pub fn list_tracks(&self, slug: &TenantSlug) -> Result<Vec<Track>, MusicError> {
        let dir = self.root.join(slug.as_str());
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(tenant = %slug, "no music directory for tenant");
                return Ok(Vec::new());
            }
            Err(source) => return Err(MusicError::ReadDir { path: dir, source }),
        };

        let mut tracks = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| MusicError::ReadDir {
                path: dir.clone(),
                source,
            })?;

            if !entry.path().is_file() {
                continue;
            }

            let Some(file_name) = entry.file_name().to_str().map(str::to_string) else {
                warn!(
                    tenant = %slug,
                    path = %entry.path().display(),
                    "skipping non UTF-8 file name"
                );
                continue;
            };

            if let Some(metadata) = parse_track_filename(&file_name) {
                tracks.push(Track {
                    url: track_url(slug, &file_name),
                    file_name,
                    title: metadata.title,
                    artist: metadata.artist,
                });
            }
        }

        tracks.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        Ok(tracks)
    }
}

fn track_url(slug: &TenantSlug, file_name: &str) -> String {
    let mut url = MUSIC_ROUTE_BASE.clone();
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.push(slug.as_str()).push(file_name);
    }
    url.path().to_string()
}
