//! Narrated digest reel: one zooming clip per item, concatenated, with music underneath.

use std::path::{Path, PathBuf};

use crate::{
    assets::media::{self, MIX_SAMPLE_RATE},
    audio::{
        mix::{self, AudioTrack},
        voice::VoiceoverSynthesizer,
    },
    config::StudioConfig,
    encode::{
        ffmpeg::ReelEncoder,
        sink::{AudioInputConfig, FrameSink, SinkConfig},
    },
    foundation::{
        core::{Canvas, Fps, FrameIndex},
        error::StudioResult,
    },
    news::NewsItem,
    render::{canvas::CanvasComposer, raster::Rasterizer},
    video::clip::{Clip, LoadedClip},
};

/// Where a digest build currently is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuildStage {
    Init,
    PerItemClipBuild,
    Concatenate,
    AudioMix,
    Export,
    Done,
}

/// Timing and location knobs for digest builds.
#[derive(Clone, Debug)]
pub struct DigestSettings {
    pub fps: Fps,
    pub zoom_factor: f64,
    pub pause_sec: f64,
    pub silent_duration_sec: f64,
    pub music_gain: f32,
    pub voice: String,
    pub audio_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl DigestSettings {
    pub fn from_config(cfg: &StudioConfig) -> StudioResult<Self> {
        Ok(Self {
            fps: cfg.fps()?,
            zoom_factor: cfg.zoom_factor,
            pause_sec: cfg.pause_sec,
            silent_duration_sec: cfg.silent_duration_sec,
            music_gain: cfg.music_gain,
            voice: cfg.voice.clone(),
            audio_dir: cfg.audio_dir.clone(),
            output_dir: cfg.output_dir.clone(),
        })
    }
}

/// Summary of a finished digest.
#[derive(Clone, Debug)]
pub struct DigestReport {
    pub clips: usize,
    /// Items that produced no clip.
    pub skipped: Vec<String>,
    /// Clips that fell back to silence.
    pub silent: usize,
    pub canvas: Canvas,
    pub frames: u64,
    pub duration_sec: f64,
    pub music: Option<PathBuf>,
}

/// Produces the still image a clip is built from.
pub trait StillSource {
    /// Write the still for `item` into `dir` and return its path.
    fn render_still(&mut self, item: &NewsItem, dir: &Path) -> StudioResult<PathBuf>;
}

impl StillSource for CanvasComposer {
    fn render_still(&mut self, item: &NewsItem, dir: &Path) -> StudioResult<PathBuf> {
        self.compose_into(item, dir)
    }
}

/// Digest output file name for the current local time.
pub fn reel_file_name() -> String {
    format!("reel_{}.mp4", chrono::Local::now().format("%Y%m%d_%H%M%S"))
}

pub struct VideoCompositor<'a> {
    stills: &'a mut dyn StillSource,
    synth: &'a VoiceoverSynthesizer,
    settings: &'a DigestSettings,
    raster: Rasterizer,
    stage: BuildStage,
}

impl<'a> VideoCompositor<'a> {
    pub fn new(
        stills: &'a mut dyn StillSource,
        synth: &'a VoiceoverSynthesizer,
        settings: &'a DigestSettings,
    ) -> Self {
        Self {
            stills,
            synth,
            settings,
            raster: Rasterizer::new(),
            stage: BuildStage::Init,
        }
    }

    pub fn stage(&self) -> BuildStage {
        self.stage
    }

    fn enter(&mut self, stage: BuildStage) {
        tracing::debug!(from = ?self.stage, to = ?stage, "digest stage");
        self.stage = stage;
    }

    /// Build `reel_<timestamp>.mp4` in the output directory.
    ///
    /// `None` when there is nothing to show or the export fails; a partial file is removed.
    #[tracing::instrument(skip_all, fields(items = items.len()))]
    pub fn compose_digest(&mut self, items: &[NewsItem]) -> Option<PathBuf> {
        if items.is_empty() {
            tracing::info!("no items; digest skipped");
            return None;
        }
        let out_path = self.settings.output_dir.join(reel_file_name());
        let mut sink = ReelEncoder::new(&out_path);
        match self.compose_digest_into(items, &mut sink) {
            Ok(Some(report)) => {
                tracing::info!(
                    path = %out_path.display(),
                    clips = report.clips,
                    skipped = report.skipped.len(),
                    duration_sec = report.duration_sec,
                    "generated digest"
                );
                Some(out_path)
            }
            Ok(None) => None,
            Err(err) => {
                tracing::warn!(stage = "export", path = %out_path.display(), error = %err, "digest export failed");
                drop(sink);
                if out_path.exists() {
                    let _ = std::fs::remove_file(&out_path);
                }
                None
            }
        }
    }

    /// Build the digest into any sink. `Ok(None)` when no clip could be built.
    pub fn compose_digest_into(
        &mut self,
        items: &[NewsItem],
        sink: &mut dyn FrameSink,
    ) -> StudioResult<Option<DigestReport>> {
        self.enter(BuildStage::Init);
        if items.is_empty() {
            return Ok(None);
        }
        let output_dir = self.settings.output_dir.clone();
        let scratch = match std::fs::create_dir_all(&output_dir).and_then(|()| {
            tempfile::Builder::new()
                .prefix("digest_")
                .tempdir_in(&output_dir)
        }) {
            Ok(dir) => dir,
            Err(err) => {
                tracing::warn!(stage = "scratch", dir = %output_dir.display(), error = %err, "no scratch space; digest skipped");
                return Ok(None);
            }
        };

        self.enter(BuildStage::PerItemClipBuild);
        let mut clips = Vec::with_capacity(items.len());
        let mut skipped = Vec::new();
        let mut narration_files = NarrationFiles::default();
        for item in items {
            match self.build_clip(item, scratch.path(), &output_dir, &mut narration_files) {
                Some(clip) => clips.push(clip),
                None => skipped.push(item.id.clone()),
            }
        }
        if clips.is_empty() {
            tracing::warn!(items = items.len(), "no clips could be built; digest skipped");
            return Ok(None);
        }

        self.enter(BuildStage::Concatenate);
        let mut loaded: Vec<LoadedClip> = Vec::with_capacity(clips.len());
        for clip in clips {
            let id = clip.item_id.clone();
            match clip.load() {
                Ok(l) => loaded.push(l),
                Err(err) => {
                    tracing::warn!(item = %id, stage = "clip", error = %err, "clip still unreadable; skipped");
                    skipped.push(id);
                }
            }
        }
        let Some(first) = loaded.first() else {
            tracing::warn!("no clips could be decoded; digest skipped");
            return Ok(None);
        };
        let canvas = loaded
            .iter()
            .fold(first.size(), |acc, c| acc.union_even(c.size()));

        let fps = self.settings.fps;
        let mut starts = Vec::with_capacity(loaded.len());
        let mut total_frames = 0u64;
        for clip in &loaded {
            starts.push(total_frames);
            total_frames += clip.frame_count(fps);
        }
        let duration_sec = fps.frames_to_secs(total_frames);

        self.enter(BuildStage::AudioMix);
        let music_path = media::find_music(&self.settings.audio_dir);
        let music = music_path.as_deref().and_then(|p| self.load_music(p));
        let narration: Vec<(f64, AudioTrack)> = loaded
            .iter()
            .zip(&starts)
            .filter_map(|(c, &start)| c.clip.audio.clone().map(|a| (fps.frames_to_secs(start), a)))
            .collect();
        let silent = loaded.len() - narration.len();
        let manifest =
            mix::build_digest_manifest(duration_sec, MIX_SAMPLE_RATE, &narration, music.as_ref())?;
        let audio = if manifest.is_silent() {
            None
        } else {
            let pcm_path = scratch.path().join("mix.f32le");
            mix::write_mix_to_f32le_file(&mix::mix_manifest(&manifest), &pcm_path)?;
            Some(AudioInputConfig {
                path: pcm_path,
                sample_rate: manifest.sample_rate,
                channels: manifest.channels,
            })
        };

        self.enter(BuildStage::Export);
        sink.begin(SinkConfig {
            width: canvas.width,
            height: canvas.height,
            fps,
            audio,
        })?;
        for (clip, &start) in loaded.iter().zip(&starts) {
            for local in 0..clip.frame_count(fps) {
                let frame = clip.render_frame(&mut self.raster, canvas, local, fps)?;
                sink.push_frame(FrameIndex(start + local), &frame)?;
            }
        }
        sink.end()?;

        self.enter(BuildStage::Done);

        Ok(Some(DigestReport {
            clips: loaded.len(),
            skipped,
            silent,
            canvas,
            frames: total_frames,
            duration_sec,
            music: music.map(|m| m.path),
        }))
    }

    fn build_clip(
        &mut self,
        item: &NewsItem,
        scratch: &Path,
        narration_dir: &Path,
        narration_files: &mut NarrationFiles,
    ) -> Option<Clip> {
        let image_path = match self.stills.render_still(item, scratch) {
            Ok(path) => path,
            Err(err) => {
                tracing::warn!(item = %item.id, stage = "clip", error = %err, "still failed; item skipped");
                return None;
            }
        };

        // Tracked before synthesis: a failing engine can still leave a partial file behind.
        let tts_path = narration_dir.join(format!("tts_{}.mp3", item.file_stem()));
        narration_files.0.push(tts_path.clone());
        let audio = match self
            .synth
            .synthesize_blocking(&item.narration_text(), &self.settings.voice, &tts_path)
        {
            Ok(path) => match AudioTrack::load(&path, 1.0) {
                Ok(track) if track.duration_sec > 0.0 => Some(track),
                Ok(_) => {
                    tracing::warn!(item = %item.id, stage = "synthesis", "narration decoded to silence");
                    None
                }
                Err(err) => {
                    tracing::warn!(item = %item.id, stage = "synthesis", error = %err, "narration unreadable");
                    None
                }
            },
            Err(err) => {
                tracing::warn!(item = %item.id, stage = "synthesis", error = %err, "narration failed; clip stays silent");
                None
            }
        };

        let duration_sec = match &audio {
            Some(track) => track.duration_sec + self.settings.pause_sec,
            None => self.settings.silent_duration_sec,
        };
        Some(Clip {
            item_id: item.id.clone(),
            image_path,
            duration_sec,
            audio,
            zoom_factor: self.settings.zoom_factor,
        })
    }

    fn load_music(&self, path: &Path) -> Option<AudioTrack> {
        match AudioTrack::load(path, self.settings.music_gain) {
            Ok(track) => Some(track),
            Err(err) => {
                tracing::warn!(stage = "music", path = %path.display(), error = %err, "music unreadable; digest has narration only");
                None
            }
        }
    }
}

/// Narration written during one build; removed when the build ends, however it ends.
#[derive(Default)]
struct NarrationFiles(Vec<PathBuf>);

impl Drop for NarrationFiles {
    fn drop(&mut self) {
        for path in &self.0 {
            remove_narration(path);
        }
    }
}

fn remove_narration(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => {}
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => {
            tracing::warn!(stage = "synthesis", path = %path.display(), error = %err, "could not remove narration file");
        }
    }
}
