//! Soundtrack assembly for digests: narration placed per clip, music underneath.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::{
    assets::media::{self, AudioPcm},
    foundation::error::{StudioError, StudioResult},
};

/// A decoded audio file with the gain it is mixed at.
#[derive(Clone, Debug)]
pub struct AudioTrack {
    pub path: PathBuf,
    pub duration_sec: f64,
    pub gain: f32,
    pub pcm: Arc<AudioPcm>,
}

impl AudioTrack {
    /// Decode `path` through `ffmpeg` at the mix sample rate.
    pub fn load(path: &Path, gain: f32) -> StudioResult<Self> {
        let pcm = media::decode_audio_f32_stereo(path, media::MIX_SAMPLE_RATE)?;
        Ok(Self::from_pcm(path, pcm, gain))
    }

    pub fn from_pcm(path: impl Into<PathBuf>, pcm: AudioPcm, gain: f32) -> Self {
        Self {
            path: path.into(),
            duration_sec: pcm.duration_sec(),
            gain,
            pcm: Arc::new(pcm),
        }
    }
}

/// One source placed on the output timeline, in output samples.
#[derive(Clone, Debug)]
pub struct AudioSegment {
    pub timeline_start_sample: u64,
    pub timeline_end_sample: u64,
    pub gain: f32,
    pub source_sample_rate: u32,
    pub source_channels: u16,
    pub source_interleaved_f32: Arc<AudioPcm>,
}

#[derive(Clone, Debug)]
pub struct AudioManifest {
    pub sample_rate: u32,
    pub channels: u16,
    pub total_samples: u64,
    pub segments: Vec<AudioSegment>,
}

impl AudioManifest {
    pub fn is_silent(&self) -> bool {
        self.segments.is_empty()
    }
}

/// Place narration tracks at their clip start times and music from zero.
///
/// Music plays once from the start and stops at whichever ends first: the music or the
/// timeline. It is never looped.
pub fn build_digest_manifest(
    total_sec: f64,
    sample_rate: u32,
    narration: &[(f64, AudioTrack)],
    music: Option<&AudioTrack>,
) -> StudioResult<AudioManifest> {
    if sample_rate == 0 {
        return Err(StudioError::validation("mix sample rate must be non-zero"));
    }
    if !(total_sec.is_finite() && total_sec > 0.0) {
        return Err(StudioError::validation(
            "soundtrack duration must be finite and > 0",
        ));
    }
    let total_samples = sec_to_sample(total_sec, sample_rate);

    let mut segments = Vec::with_capacity(narration.len() + 1);
    if let Some(track) = music {
        push_segment(&mut segments, 0.0, track, sample_rate, total_samples);
    }
    for (start_sec, track) in narration {
        push_segment(&mut segments, *start_sec, track, sample_rate, total_samples);
    }

    Ok(AudioManifest {
        sample_rate,
        channels: 2,
        total_samples,
        segments,
    })
}

fn push_segment(
    out: &mut Vec<AudioSegment>,
    start_sec: f64,
    track: &AudioTrack,
    sample_rate: u32,
    total_samples: u64,
) {
    let start = sec_to_sample(start_sec.max(0.0), sample_rate);
    let len = sec_to_sample(track.pcm.duration_sec(), sample_rate);
    let end = start.saturating_add(len).min(total_samples);
    if end <= start || track.pcm.channels == 0 {
        return;
    }
    out.push(AudioSegment {
        timeline_start_sample: start,
        timeline_end_sample: end,
        gain: track.gain,
        source_sample_rate: track.pcm.sample_rate,
        source_channels: track.pcm.channels,
        source_interleaved_f32: track.pcm.clone(),
    });
}

fn sec_to_sample(sec: f64, sample_rate: u32) -> u64 {
    (sec * f64::from(sample_rate)).round().max(0.0) as u64
}

/// Sum every segment into one interleaved buffer, clamped to `[-1, 1]`.
pub fn mix_manifest(manifest: &AudioManifest) -> Vec<f32> {
    let frames = manifest.total_samples as usize;
    let mut out = vec![0.0f32; frames * usize::from(manifest.channels)];

    for seg in &manifest.segments {
        let src = seg.source_interleaved_f32.interleaved_f32.as_slice();
        let src_channels = usize::from(seg.source_channels);
        let src_frames = src.len() / src_channels;
        if src_frames == 0 || seg.source_sample_rate == 0 {
            continue;
        }
        let step = f64::from(seg.source_sample_rate) / f64::from(manifest.sample_rate);

        for dst_sample in seg.timeline_start_sample..seg.timeline_end_sample {
            let rel = (dst_sample - seg.timeline_start_sample) as f64;
            let src_pos = rel * step;
            let src_frame0 = src_pos.floor() as usize;
            if src_frame0 >= src_frames {
                break;
            }
            let src_frame1 = (src_frame0 + 1).min(src_frames - 1);
            let frac = (src_pos - src_frame0 as f64) as f32;

            let (l, r) = if src_channels == 1 {
                let v0 = src[src_frame0];
                let v1 = src[src_frame1];
                let v = v0 + (v1 - v0) * frac;
                (v, v)
            } else {
                let i0 = src_frame0 * src_channels;
                let i1 = src_frame1 * src_channels;
                (
                    src[i0] + (src[i1] - src[i0]) * frac,
                    src[i0 + 1] + (src[i1 + 1] - src[i0 + 1]) * frac,
                )
            };

            let dst_idx = dst_sample as usize * usize::from(manifest.channels);
            out[dst_idx] += l * seg.gain;
            if manifest.channels > 1 {
                out[dst_idx + 1] += r * seg.gain;
            }
        }
    }

    for s in &mut out {
        *s = s.clamp(-1.0, 1.0);
    }
    out
}

pub fn write_mix_to_f32le_file(samples_interleaved: &[f32], out_path: &Path) -> StudioResult<()> {
    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            StudioError::media(format!(
                "failed to create audio mix output directory '{}': {e}",
                parent.display()
            ))
        })?;
    }

    let mut bytes = Vec::<u8>::with_capacity(samples_interleaved.len() * 4);
    for &sample in samples_interleaved {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }
    std::fs::write(out_path, bytes).map_err(|e| {
        StudioError::media(format!(
            "failed to write mixed audio file '{}': {e}",
            out_path.display()
        ))
    })
}

#[cfg(test)]
#[path = "../../tests/unit/audio/mix.rs"]
mod tests;
