//! Asset loading: raster and SVG decoding, logo thumbnails, audio decode via `ffmpeg`.

pub mod decode;
pub mod logo;
pub mod media;

pub use decode::{PreparedImage, decode_image, decode_image_file};
pub use logo::Logo;
pub use media::{AudioPcm, MIX_SAMPLE_RATE, decode_audio_f32_stereo, find_music};
