//! Digest video assembly: per-item zoom clips, concatenation, soundtrack and export.

pub mod clip;
pub mod digest;

pub use clip::{Clip, LoadedClip};
pub use digest::{
    BuildStage, DigestReport, DigestSettings, StillSource, VideoCompositor, reel_file_name,
};
