mod error;
mod library;

pub use error::MusicError;
pub use library::{parse_track_filename, MusicLibrary, Track, TrackMetadata, AUDIO_EXTENSIONS};
