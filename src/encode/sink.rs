use std::path::PathBuf;

use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{StudioError, StudioResult};
use crate::render::frame::FrameRGBA;

/// Configuration provided to a [`FrameSink`] before the first frame.
#[derive(Debug, Clone)]
pub struct SinkConfig {
    pub width: u32,
    pub height: u32,
    pub fps: Fps,
    /// Optional mixed soundtrack as raw PCM.
    pub audio: Option<AudioInputConfig>,
}

/// Raw PCM audio input for sinks that encode audio.
#[derive(Debug, Clone)]
pub struct AudioInputConfig {
    /// Path to interleaved `f32le` PCM data.
    pub path: PathBuf,
    pub sample_rate: u32,
    pub channels: u16,
}

/// Consumes rendered frames in timeline order.
///
/// `push_frame` is called in strictly increasing `FrameIndex` order between `begin` and `end`.
pub trait FrameSink: Send {
    fn begin(&mut self, cfg: SinkConfig) -> StudioResult<()>;
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> StudioResult<()>;
    fn end(&mut self) -> StudioResult<()>;
}

/// In-memory sink for tests and previews.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    keep_pixels: bool,
    frames: Vec<(FrameIndex, FrameRGBA)>,
    frame_count: u64,
    /// Copy of the PCM soundtrack taken at `begin`, when one was configured.
    audio_pcm: Option<Vec<f32>>,
    ended: bool,
}

impl InMemorySink {
    /// Sink that keeps every frame.
    pub fn new() -> Self {
        Self {
            keep_pixels: true,
            ..Self::default()
        }
    }

    /// Sink that only counts frames; useful for long timelines.
    pub fn counting() -> Self {
        Self::default()
    }

    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg.clone()
    }

    pub fn frames(&self) -> &[(FrameIndex, FrameRGBA)] {
        &self.frames
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn audio_pcm(&self) -> Option<&[f32]> {
        self.audio_pcm.as_deref()
    }

    pub fn ended(&self) -> bool {
        self.ended
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> StudioResult<()> {
        self.audio_pcm = match cfg.audio.as_ref() {
            Some(audio) => {
                let bytes = std::fs::read(&audio.path).map_err(|e| {
                    StudioError::media(format!(
                        "read pcm '{}': {e}",
                        audio.path.display()
                    ))
                })?;
                Some(
                    bytes
                        .chunks_exact(4)
                        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
                        .collect(),
                )
            }
            None => None,
        };
        self.cfg = Some(cfg);
        self.frames.clear();
        self.frame_count = 0;
        self.ended = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> StudioResult<()> {
        if self.cfg.is_none() {
            return Err(StudioError::media("in-memory sink not started"));
        }
        if self.keep_pixels {
            self.frames.push((idx, frame.clone()));
        }
        self.frame_count += 1;
        Ok(())
    }

    fn end(&mut self) -> StudioResult<()> {
        self.ended = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(audio: Option<AudioInputConfig>) -> SinkConfig {
        SinkConfig {
            width: 2,
            height: 2,
            fps: Fps::new(30, 1).unwrap(),
            audio,
        }
    }

    #[test]
    fn counting_sink_drops_pixels() {
        let mut sink = InMemorySink::counting();
        sink.begin(cfg(None)).unwrap();
        let frame = FrameRGBA::solid(2, 2, [1, 2, 3, 255]);
        sink.push_frame(FrameIndex(0), &frame).unwrap();
        sink.push_frame(FrameIndex(1), &frame).unwrap();
        sink.end().unwrap();
        assert_eq!(sink.frame_count(), 2);
        assert!(sink.frames().is_empty());
        assert!(sink.ended());
    }

    #[test]
    fn push_before_begin_is_an_error() {
        let mut sink = InMemorySink::new();
        let frame = FrameRGBA::solid(2, 2, [0, 0, 0, 255]);
        assert!(sink.push_frame(FrameIndex(0), &frame).is_err());
    }

    #[test]
    fn begin_captures_pcm_soundtrack() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mix.f32le");
        let samples = [0.25f32, -0.5, 1.0, 0.0];
        let bytes: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
        std::fs::write(&path, bytes).unwrap();

        let mut sink = InMemorySink::new();
        sink.begin(cfg(Some(AudioInputConfig {
            path,
            sample_rate: 48_000,
            channels: 2,
        })))
        .unwrap();
        assert_eq!(sink.audio_pcm().unwrap(), &samples);
    }
}
