//! Per-item clips: a still with a slow centered zoom.

use std::path::PathBuf;

use crate::{
    assets::decode::{self, PreparedImage},
    audio::mix::AudioTrack,
    foundation::{
        core::{Affine, Canvas, Fps},
        error::StudioResult,
    },
    render::{
        frame::FrameRGBA,
        raster::{self, Rasterizer},
    },
};

/// One item's contribution to a digest before its still is decoded.
#[derive(Clone, Debug)]
pub struct Clip {
    pub item_id: String,
    pub image_path: PathBuf,
    pub duration_sec: f64,
    /// `None` when narration failed; the clip is then silent.
    pub audio: Option<AudioTrack>,
    pub zoom_factor: f64,
}

impl Clip {
    /// Scale at `t` seconds: linear from 1.0 at the start to `zoom_factor` at the end.
    pub fn zoom_at(&self, t: f64) -> f64 {
        if !(self.duration_sec > 0.0) {
            return 1.0;
        }
        let progress = (t / self.duration_sec).clamp(0.0, 1.0);
        1.0 + (self.zoom_factor - 1.0) * progress
    }

    /// Decode the still into memory. The still's file is removed once decoded.
    pub fn load(self) -> StudioResult<LoadedClip> {
        let still = decode::decode_image_file(&self.image_path)?;
        if let Err(err) = std::fs::remove_file(&self.image_path) {
            tracing::warn!(item = %self.item_id, stage = "clip", path = %self.image_path.display(), error = %err, "could not remove decoded still");
        }
        let paint = raster::image_paint(&still)?;
        Ok(LoadedClip {
            clip: self,
            still,
            paint,
        })
    }
}

/// A clip whose still is decoded and ready to rasterize.
pub struct LoadedClip {
    pub clip: Clip,
    still: PreparedImage,
    paint: vello_cpu::Image,
}

impl LoadedClip {
    pub fn size(&self) -> Canvas {
        Canvas {
            width: self.still.width,
            height: self.still.height,
        }
    }

    pub fn frame_count(&self, fps: Fps) -> u64 {
        fps.secs_to_frames_round(self.clip.duration_sec)
    }

    /// Placement of the still at local time `t` on `canvas`: centered, scaled about its center.
    pub fn transform_at(&self, canvas: Canvas, t: f64) -> Affine {
        let z = self.clip.zoom_at(t);
        Affine::translate((f64::from(canvas.width) / 2.0, f64::from(canvas.height) / 2.0))
            * Affine::scale(z)
            * Affine::translate((
                -f64::from(self.still.width) / 2.0,
                -f64::from(self.still.height) / 2.0,
            ))
    }

    /// Render local frame `frame` on a black `canvas`.
    pub fn render_frame(
        &self,
        raster: &mut Rasterizer,
        canvas: Canvas,
        frame: u64,
        fps: Fps,
    ) -> StudioResult<FrameRGBA> {
        let transform = self.transform_at(canvas, fps.frames_to_secs(frame));
        let (w, h) = (f64::from(self.still.width), f64::from(self.still.height));
        let pixmap = raster.render(canvas.width, canvas.height, |ctx| {
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(0, 0, 0, 255));
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                0.0,
                0.0,
                f64::from(canvas.width),
                f64::from(canvas.height),
            ));
            ctx.set_transform(raster::affine_to_cpu(transform));
            ctx.set_paint(self.paint.clone());
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, w, h));
            ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
            Ok(())
        })?;
        Ok(raster::pixmap_to_frame(&pixmap))
    }
}
