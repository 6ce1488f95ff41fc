use std::path::{Path, PathBuf};

use crate::foundation::error::{StudioError, StudioResult};

pub const MIX_SAMPLE_RATE: u32 = 48_000;

/// Extensions accepted as background music, compared case-insensitively.
pub const MUSIC_EXTENSIONS: &[&str] = &["mp3", "wav", "m4a", "ogg", "flac", "aac"];

#[derive(Clone, Debug, PartialEq)]
pub struct AudioPcm {
    pub sample_rate: u32,
    pub channels: u16,
    pub interleaved_f32: Vec<f32>,
}

impl AudioPcm {
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            0
        } else {
            self.interleaved_f32.len() / usize::from(self.channels)
        }
    }

    pub fn duration_sec(&self) -> f64 {
        if self.sample_rate == 0 {
            0.0
        } else {
            self.frames() as f64 / f64::from(self.sample_rate)
        }
    }
}

/// Decode any ffmpeg-readable audio file to interleaved stereo `f32` at `sample_rate`.
pub fn decode_audio_f32_stereo(path: &Path, sample_rate: u32) -> StudioResult<AudioPcm> {
    let out = std::process::Command::new("ffmpeg")
        .args(["-v", "error", "-i"])
        .arg(path)
        .args([
            "-vn",
            "-f",
            "f32le",
            "-acodec",
            "pcm_f32le",
            "-ac",
            "2",
            "-ar",
            &sample_rate.to_string(),
            "pipe:1",
        ])
        .output()
        .map_err(|e| StudioError::media(format!("failed to run ffmpeg for audio decode: {e}")))?;

    if !out.status.success() {
        let msg = String::from_utf8_lossy(&out.stderr);
        // A file without an audio stream decodes to empty PCM.
        if msg.contains("Stream specifier")
            || msg.contains("matches no streams")
            || msg.contains("Output file #0 does not contain any stream")
        {
            return Ok(AudioPcm {
                sample_rate,
                channels: 2,
                interleaved_f32: Vec::new(),
            });
        }
        return Err(StudioError::media(format!(
            "ffmpeg audio decode failed for '{}': {}",
            path.display(),
            msg.trim()
        )));
    }

    pcm_from_f32le(&out.stdout, sample_rate, 2)
}

pub fn pcm_from_f32le(bytes: &[u8], sample_rate: u32, channels: u16) -> StudioResult<AudioPcm> {
    if !bytes.len().is_multiple_of(4) {
        return Err(StudioError::media(
            "decoded audio byte length is not aligned to f32 samples",
        ));
    }
    let interleaved_f32 = bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();
    Ok(AudioPcm {
        sample_rate,
        channels,
        interleaved_f32,
    })
}

/// First music file in `dir` by sorted file name, if any.
pub fn find_music(dir: &Path) -> Option<PathBuf> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            tracing::debug!(dir = %dir.display(), error = %err, "music directory unreadable");
            return None;
        }
    };
    let mut candidates: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && is_music_file(p))
        .collect();
    candidates.sort();
    candidates.into_iter().next()
}

fn is_music_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| MUSIC_EXTENSIONS.iter().any(|m| m.eq_ignore_ascii_case(ext)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_counts_stereo_frames() {
        let pcm = AudioPcm {
            sample_rate: 100,
            channels: 2,
            interleaved_f32: vec![0.0; 300],
        };
        assert_eq!(pcm.frames(), 150);
        assert!((pcm.duration_sec() - 1.5).abs() < 1e-12);
    }

    #[test]
    fn misaligned_pcm_is_rejected() {
        assert!(pcm_from_f32le(&[0, 0, 0], 48_000, 2).is_err());
        let ok = pcm_from_f32le(&0.5f32.to_le_bytes(), 48_000, 1).unwrap();
        assert_eq!(ok.interleaved_f32, vec![0.5]);
    }

    #[test]
    fn find_music_picks_first_sorted_audio_file() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["notes.txt", "b_theme.MP3", "a_intro.wav", "cover.png"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        std::fs::create_dir(dir.path().join("0_folder.mp3")).unwrap();
        assert_eq!(find_music(dir.path()), Some(dir.path().join("a_intro.wav")));
    }

    #[test]
    fn find_music_handles_missing_or_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(find_music(dir.path()), None);
        assert_eq!(find_music(&dir.path().join("absent")), None);
    }
}
