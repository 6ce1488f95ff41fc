//! Encoding sinks.
//!
//! Sinks consume rendered frames in timeline order and are fed by the digest compositor.

/// Reel export through the system `ffmpeg`.
pub mod ffmpeg;
/// Frame sink trait and the in-memory sink.
pub mod sink;

pub use ffmpeg::{ReelEncoder, encode_args, is_ffmpeg_on_path};
pub use sink::{AudioInputConfig, FrameSink, InMemorySink, SinkConfig};
