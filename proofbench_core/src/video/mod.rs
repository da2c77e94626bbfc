//! Pure helpers for video links and playback times.

pub mod duration;
pub mod reference;

pub use duration::{
    format_duration, format_relative_time, normalize_watch_percentage, parse_duration,
    progress_percentage, should_mark_complete, total_duration, DEFAULT_COMPLETION_THRESHOLD,
};
pub use reference::{
    detect_provider, embed_url, is_valid_video_url, thumbnail_url, VideoProvider, VideoReference,
};
