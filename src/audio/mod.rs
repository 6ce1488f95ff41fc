//! Narration synthesis and soundtrack mixing.

pub mod mix;
pub mod voice;

pub use mix::{AudioManifest, AudioTrack, build_digest_manifest, mix_manifest};
pub use voice::{EdgeTtsCommand, HttpSpeech, SpeechEngine, VoiceoverSynthesizer, sanitize};
