//! Brand logo loading, thumbnailed to fit a square box.

use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::{
    assets::decode::{PreparedImage, parse_svg},
    foundation::error::{StudioError, StudioResult},
};

/// A logo reduced to fit inside `box_px × box_px`, aspect preserved.
#[derive(Clone, Debug)]
pub struct Logo {
    pub source: PathBuf,
    pub image: PreparedImage,
}

impl Logo {
    /// Load a PNG (or any raster format `image` decodes) or an SVG logo.
    pub fn load(path: &Path, box_px: u32) -> StudioResult<Self> {
        if box_px == 0 {
            return Err(StudioError::validation("logo box must be > 0"));
        }
        let bytes = std::fs::read(path).with_context(|| format!("read logo '{}'", path.display()))?;
        let is_svg = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("svg"));

        let image = if is_svg {
            rasterize_fit(&parse_svg(&bytes)?, box_px)?
        } else {
            thumbnail(&bytes, box_px)?
        };
        Ok(Self {
            source: path.to_path_buf(),
            image,
        })
    }

    /// First candidate that loads. Missing or broken logos are skipped with a warning.
    pub fn first_available(candidates: &[PathBuf], box_px: u32) -> Option<Self> {
        for path in candidates {
            if !path.exists() {
                continue;
            }
            match Self::load(path, box_px) {
                Ok(logo) => return Some(logo),
                Err(err) => {
                    tracing::warn!(stage = "logo", path = %path.display(), error = %err, "logo skipped");
                }
            }
        }
        None
    }
}

fn thumbnail(bytes: &[u8], box_px: u32) -> StudioResult<PreparedImage> {
    let img = image::load_from_memory(bytes).context("decode logo")?;
    // Only ever shrinks, like a thumbnail.
    let img = if img.width() > box_px || img.height() > box_px {
        img.thumbnail(box_px, box_px)
    } else {
        img
    };
    Ok(PreparedImage::from_rgba(img.to_rgba8()))
}

fn rasterize_fit(tree: &usvg::Tree, box_px: u32) -> StudioResult<PreparedImage> {
    let size = tree.size();
    let (sw, sh) = (size.width(), size.height());
    if !(sw.is_finite() && sh.is_finite() && sw > 0.0 && sh > 0.0) {
        return Err(StudioError::validation("svg logo has invalid width/height"));
    }
    let scale = (box_px as f32 / sw).min(box_px as f32 / sh);
    let w = ((sw * scale).round() as u32).max(1);
    let h = ((sh * scale).round() as u32).max(1);

    let mut pixmap = resvg::tiny_skia::Pixmap::new(w, h)
        .ok_or_else(|| StudioError::render("failed to allocate svg pixmap"))?;
    let xform = resvg::tiny_skia::Transform::from_scale(w as f32 / sw, h as f32 / sh);
    resvg::render(tree, xform, &mut pixmap.as_mut());

    // tiny-skia pixmaps are already premultiplied.
    Ok(PreparedImage {
        width: w,
        height: h,
        rgba8_premul: std::sync::Arc::new(pixmap.data().to_vec()),
    })
}
