//! Render geometry and studio configuration.
//!
//! [`RenderSpec`] holds the fixed card geometry; it is a process-wide constant and is never
//! mutated once a [`crate::Studio`] is built. [`StudioConfig`] holds the deployment knobs
//! (asset directories, voice, timings) and is usually loaded from a JSON file.

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context as _;

use crate::foundation::{
    core::{Canvas, Fps, Rgb},
    error::{StudioError, StudioResult},
};

/// Fixed geometry of a branded card, in pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderSpec {
    pub width: u32,
    pub height: u32,
    /// Y coordinate splitting the photo region (above) from the info card (below).
    pub split_y: u32,
    /// How far the photo extends below the split before the card covers it.
    pub photo_bleed: u32,
    pub side_margin: u32,
    /// Distance from the split line to the first headline line.
    pub headline_offset: u32,
    pub bottom_margin: u32,
    pub max_font_px: f32,
    pub min_font_px: f32,
    pub font_step_px: f32,
    pub line_spacing: f32,
    pub separator_px: f32,
    pub wave_bars: u32,
    pub wave_spacing: f32,
    pub wave_min_px: f32,
    pub wave_max_px: f32,
    pub badge_width: f32,
    pub badge_height: f32,
    pub badge_skew: f32,
    pub badge_inset: f32,
    /// How far the badge rises above the split line.
    pub badge_rise: f32,
    pub tag_font_px: f32,
    pub tag_pad_x: f32,
    pub tag_pad_y: f32,
    pub logo_px: u32,
    pub logo_offset: u32,
    /// Bottom color of the info-card gradient.
    pub card_shadow: Rgb,
}

impl RenderSpec {
    /// Portrait 4:5 card used for every published still.
    pub const STANDARD: RenderSpec = RenderSpec {
        width: 1080,
        height: 1350,
        split_y: 850,
        photo_bleed: 150,
        side_margin: 50,
        headline_offset: 100,
        bottom_margin: 50,
        max_font_px: 80.0,
        min_font_px: 40.0,
        font_step_px: 5.0,
        line_spacing: 15.0,
        separator_px: 4.0,
        wave_bars: 30,
        wave_spacing: 10.0,
        wave_min_px: 20.0,
        wave_max_px: 80.0,
        badge_width: 300.0,
        badge_height: 40.0,
        badge_skew: 20.0,
        badge_inset: 50.0,
        badge_rise: 20.0,
        tag_font_px: 25.0,
        tag_pad_x: 30.0,
        tag_pad_y: 5.0,
        logo_px: 120,
        logo_offset: 50,
        card_shadow: Rgb::new(5, 5, 10),
    };

    /// Proportionally scaled geometry (previews, tests). Canvas sides stay even.
    pub fn scaled(&self, factor: f32) -> RenderSpec {
        let px = |v: u32| ((v as f32) * factor).round().max(1.0) as u32;
        let even = |v: u32| {
            let v = px(v).max(2);
            v - (v % 2)
        };
        let f = |v: f32| v * factor;
        RenderSpec {
            width: even(self.width),
            height: even(self.height),
            split_y: px(self.split_y),
            photo_bleed: px(self.photo_bleed),
            side_margin: px(self.side_margin),
            headline_offset: px(self.headline_offset),
            bottom_margin: px(self.bottom_margin),
            max_font_px: f(self.max_font_px),
            min_font_px: f(self.min_font_px),
            font_step_px: f(self.font_step_px),
            line_spacing: f(self.line_spacing),
            separator_px: f(self.separator_px).max(1.0),
            wave_bars: self.wave_bars,
            wave_spacing: f(self.wave_spacing),
            wave_min_px: f(self.wave_min_px),
            wave_max_px: f(self.wave_max_px),
            badge_width: f(self.badge_width),
            badge_height: f(self.badge_height),
            badge_skew: f(self.badge_skew),
            badge_inset: f(self.badge_inset),
            badge_rise: f(self.badge_rise),
            tag_font_px: f(self.tag_font_px),
            tag_pad_x: f(self.tag_pad_x),
            tag_pad_y: f(self.tag_pad_y),
            logo_px: px(self.logo_px),
            logo_offset: px(self.logo_offset),
            card_shadow: self.card_shadow,
        }
    }

    pub fn validate(&self) -> StudioResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(StudioError::validation("canvas width/height must be non-zero"));
        }
        if self.split_y >= self.height {
            return Err(StudioError::validation(
                "split line must lie inside the canvas",
            ));
        }
        if !(self.min_font_px > 0.0 && self.min_font_px <= self.max_font_px) {
            return Err(StudioError::validation(
                "font ladder needs 0 < min_font_px <= max_font_px",
            ));
        }
        if self.font_step_px <= 0.0 {
            return Err(StudioError::validation("font_step_px must be > 0"));
        }
        if self.wave_min_px > self.wave_max_px {
            return Err(StudioError::validation(
                "wave_min_px must not exceed wave_max_px",
            ));
        }
        Ok(())
    }

    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }

    pub fn card_height(&self) -> u32 {
        self.height - self.split_y
    }

    pub fn photo_height(&self) -> u32 {
        self.split_y + self.photo_bleed
    }

    /// Width available to wrapped headline text.
    pub fn text_width(&self) -> f32 {
        self.width.saturating_sub(2 * self.side_margin) as f32
    }

    pub fn headline_top(&self) -> f32 {
        (self.split_y + self.headline_offset) as f32
    }

    /// Vertical budget for the wrapped headline block.
    pub fn headline_budget(&self) -> f32 {
        (self.height as f32 - self.headline_top() - self.bottom_margin as f32).max(0.0)
    }
}

impl Default for RenderSpec {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Deployment configuration. Every field has a default so partial JSON files are accepted.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    pub branding_dir: PathBuf,
    pub audio_dir: PathBuf,
    pub output_dir: PathBuf,
    pub voice: String,
    /// Program used by the command speech engine.
    pub tts_command: PathBuf,
    /// When set, narration is requested from this HTTP endpoint instead of `tts_command`.
    pub tts_endpoint: Option<String>,
    pub brand_tag: String,
    pub fps: u32,
    pub zoom_factor: f64,
    pub pause_sec: f64,
    pub silent_duration_sec: f64,
    pub music_gain: f32,
    pub photo_timeout_sec: u64,
    pub synthesis_timeout_sec: Option<u64>,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            branding_dir: PathBuf::from("assets/branding"),
            audio_dir: PathBuf::from("assets/audio"),
            output_dir: PathBuf::from("output/review_queue"),
            voice: "en-GB-SoniaNeural".to_string(),
            tts_command: PathBuf::from("edge-tts"),
            tts_endpoint: None,
            brand_tag: "RACING TAMIZHAN".to_string(),
            fps: 30,
            zoom_factor: 1.15,
            pause_sec: 0.5,
            silent_duration_sec: 3.0,
            music_gain: 0.15,
            photo_timeout_sec: 20,
            synthesis_timeout_sec: None,
        }
    }
}

impl StudioConfig {
    pub fn load(path: &Path) -> StudioResult<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        let cfg: StudioConfig = serde_json::from_str(&raw)
            .with_context(|| format!("parse config '{}'", path.display()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> StudioResult<()> {
        if self.fps == 0 {
            return Err(StudioError::validation("fps must be > 0"));
        }
        if !(self.zoom_factor.is_finite() && self.zoom_factor > 0.0) {
            return Err(StudioError::validation("zoom_factor must be finite and > 0"));
        }
        if !(self.pause_sec.is_finite() && self.pause_sec >= 0.0) {
            return Err(StudioError::validation("pause_sec must be finite and >= 0"));
        }
        if !(self.silent_duration_sec.is_finite() && self.silent_duration_sec > 0.0) {
            return Err(StudioError::validation(
                "silent_duration_sec must be finite and > 0",
            ));
        }
        if !(self.music_gain.is_finite() && self.music_gain >= 0.0) {
            return Err(StudioError::validation("music_gain must be finite and >= 0"));
        }
        if self.voice.trim().is_empty() {
            return Err(StudioError::validation("voice must be non-empty"));
        }
        Ok(())
    }

    pub fn fps(&self) -> StudioResult<Fps> {
        Fps::new(self.fps, 1)
    }

    pub fn font_bold_path(&self) -> PathBuf {
        self.branding_dir.join("font_bold.ttf")
    }

    /// Candidate logo files, in preference order.
    pub fn logo_paths(&self) -> [PathBuf; 2] {
        [
            self.branding_dir.join("logo.png"),
            self.branding_dir.join("logo.svg"),
        ]
    }

    pub fn photo_timeout(&self) -> Duration {
        Duration::from_secs(self.photo_timeout_sec)
    }

    pub fn synthesis_timeout(&self) -> Option<Duration> {
        self.synthesis_timeout_sec.map(Duration::from_secs)
    }
}
