//! `gridcast` turns motorsport news items into branded image cards and narrated vertical
//! video digests.
//!
//! The pipeline stages, in the order data flows through them:
//!
//! - [`brand`]: team colors resolved from headline keywords, plus publishing captions
//! - [`text`]: font loading, shaping and the size-fitting wrapper for headlines
//! - [`render`]: the 1080x1350 card composed on the CPU rasterizer
//! - [`audio`]: narration through a pluggable speech engine and the digest soundtrack mix
//! - [`video`]: per-item zoom clips concatenated and exported through `ffmpeg`
//!
//! [`Studio`] wires all of it from a [`StudioConfig`]; [`ReviewQueue`] holds the results until
//! someone approves them.
#![forbid(unsafe_code)]

pub mod assets;
pub mod audio;
pub mod brand;
pub mod config;
pub mod encode;
pub mod foundation;
pub mod news;
pub mod render;
pub mod review;
pub mod runtime;
pub mod studio;
pub mod text;
pub mod video;

pub use audio::{SpeechEngine, VoiceoverSynthesizer};
pub use config::{RenderSpec, StudioConfig};
pub use foundation::core::{Canvas, ColorPair, Fps, FrameIndex, Rgb};
pub use foundation::error::{StudioError, StudioResult, SynthesisError};
pub use news::{AssetKind, AssetSource, Category, GeneratedAsset, NewsItem};
pub use render::{CanvasComposer, PhotoSource};
pub use review::ReviewQueue;
pub use studio::{MIN_DIGEST_ITEMS, Studio, StudioBuilder};
pub use video::{DigestReport, VideoCompositor};
