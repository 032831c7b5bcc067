pub mod api;
pub mod config;
pub mod countdown;
pub mod music;
pub mod storage;

pub use api::{create_router, ApiState, ErrorResponse};
pub use config::InvitationApiConfig;
pub use countdown::{countdown_until, parse_wedding_date, Countdown};
pub use music::{parse_track_filename, MusicLibrary, Track};
