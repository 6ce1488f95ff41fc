//! The branded card: photo header, gradient info card, accents, headline and logo.
//!
//! Drawing order matters; later layers paint over earlier ones:
//!
//! 1. canvas filled with the team's primary color
//! 2. header photo (when one was fetched), covering the split plus its bleed
//! 3. gradient card from the primary color down to the card shadow color
//! 4. accent separator and the decorative waveform bars on the split
//! 5. skewed accent badge carrying the brand tag
//! 6. the uppercase headline, sized by the font ladder, centered in white
//! 7. the logo thumbnail in the card's top-left corner
//!
//! Only failing to save the finished card is an error; every other missing input degrades to
//! a plainer card.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context as _;
use rand::{Rng as _, SeedableRng as _, rngs::StdRng};

use crate::{
    assets::{decode::PreparedImage, logo::Logo},
    brand,
    config::RenderSpec,
    foundation::{
        core::{Affine, BezPath, ColorPair, Point, Rgb},
        error::StudioResult,
    },
    news::NewsItem,
    render::{
        photo::{self, PhotoSource},
        raster::{self, Rasterizer},
    },
    text::{
        fit::{FontLadder, SizeSearch},
        layout::{self, Align, Line},
        shape::TextEngine,
    },
};

/// What happened to the header photo of one card.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PhotoOutcome {
    /// The item has no image URL.
    Absent,
    Pasted,
    /// Fetch or decode failed; the flat primary background shows instead.
    Failed(String),
}

/// Layout decisions taken while composing a card.
#[derive(Clone, Debug)]
pub struct CardReport {
    pub colors: ColorPair,
    /// `None` when no font was available and the headline was skipped.
    pub size_search: Option<SizeSearch>,
    pub lines: Vec<Line>,
    pub photo: PhotoOutcome,
}

/// A composed card that has not been written anywhere yet.
pub struct RenderedCard {
    pub image: image::RgbaImage,
    pub report: CardReport,
}

pub struct CanvasComposer {
    spec: RenderSpec,
    brand_tag: String,
    output_dir: PathBuf,
    text: Option<TextEngine>,
    logo: Option<Logo>,
    photos: Arc<dyn PhotoSource>,
    raster: Rasterizer,
    bar_rng: StdRng,
}

impl CanvasComposer {
    pub fn new(
        spec: RenderSpec,
        brand_tag: impl Into<String>,
        output_dir: impl Into<PathBuf>,
        text: Option<TextEngine>,
        logo: Option<Logo>,
        photos: Arc<dyn PhotoSource>,
    ) -> Self {
        Self {
            spec,
            brand_tag: brand_tag.into(),
            output_dir: output_dir.into(),
            text,
            logo,
            photos,
            raster: Rasterizer::new(),
            bar_rng: StdRng::from_entropy(),
        }
    }

    /// Fix the waveform bar heights to a reproducible sequence.
    pub fn with_bar_seed(mut self, seed: u64) -> Self {
        self.bar_rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn spec(&self) -> &RenderSpec {
        &self.spec
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Compose `item` and save it as `slide1_<stem>.png` in the output directory.
    #[tracing::instrument(skip_all, fields(item = %item.id))]
    pub fn compose(&mut self, item: &NewsItem) -> StudioResult<PathBuf> {
        let dir = self.output_dir.clone();
        self.compose_into(item, &dir)
    }

    /// Like [`Self::compose`] but writes into `dir` (digest builds use a scratch directory).
    pub fn compose_into(&mut self, item: &NewsItem, dir: &Path) -> StudioResult<PathBuf> {
        if let Err(err) = std::fs::create_dir_all(dir) {
            tracing::warn!(item = %item.id, stage = "output", dir = %dir.display(), error = %err, "cannot create output directory");
        }
        let card = self.render(item, dir)?;

        let path = dir.join(format!("slide1_{}.png", item.file_stem()));
        card.image
            .save_with_format(&path, image::ImageFormat::Png)
            .with_context(|| format!("save card '{}'", path.display()))?;

        tracing::info!(
            item = %item.id,
            path = %path.display(),
            primary = %card.report.colors.primary,
            font_px = card.report.size_search.map(|s| s.size()),
            lines = card.report.lines.len(),
            "generated card"
        );
        Ok(path)
    }

    /// Draw the card for `item` in memory. `scratch_dir` receives the staged photo download.
    pub fn render(&mut self, item: &NewsItem, scratch_dir: &Path) -> StudioResult<RenderedCard> {
        let spec = self.spec;
        let colors = brand::resolve(&item.headline);

        let (photo, photo_outcome) = self.header_photo(item, scratch_dir);
        let card_bg = raster::vertical_gradient(
            colors.primary,
            spec.card_shadow,
            spec.width,
            spec.card_height(),
        );
        let bar_heights = self.bar_heights();

        let headline = item.headline.to_uppercase();
        let (size_search, lines) = match self.text.as_mut() {
            Some(engine) => {
                let (search, lines) = fit_headline(engine, &spec, &headline);
                (Some(search), lines)
            }
            None => {
                tracing::warn!(item = %item.id, stage = "font", "no font available; headline skipped");
                (None, Vec::new())
            }
        };

        let brand_tag = self.brand_tag.as_str();
        let text = &mut self.text;
        let logo = self.logo.as_ref();
        let pixmap = self.raster.render(spec.width, spec.height, |ctx| {
            let w = f64::from(spec.width);
            let split = f64::from(spec.split_y);

            ctx.set_paint(raster::solid(colors.primary));
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, w, f64::from(spec.height)));

            if let Some(photo) = photo.as_ref() {
                raster::draw_image(ctx, photo, Affine::IDENTITY)?;
            }
            raster::draw_image(ctx, &card_bg, Affine::translate((0.0, split)))?;

            draw_accents(ctx, &spec, colors.accent, &bar_heights);

            let badge = badge_path(&spec);
            ctx.set_paint(raster::solid(colors.accent));
            ctx.fill_path(&raster::bezpath_to_cpu(&badge));

            if let Some(engine) = text.as_mut() {
                let origin = badge_origin(&spec);
                engine.draw_line(
                    ctx,
                    brand_tag,
                    spec.tag_font_px,
                    Rgb::BLACK,
                    origin.x + f64::from(spec.tag_pad_x),
                    origin.y + f64::from(spec.tag_pad_y),
                )?;
                if let Some(search) = size_search {
                    engine.draw_block(
                        ctx,
                        &lines,
                        search.size(),
                        Rgb::WHITE,
                        spec.headline_top(),
                        spec.line_spacing,
                        Align::Center,
                        spec.width as f32,
                        spec.side_margin as f32,
                    )?;
                }
            }

            if let Some(logo) = logo {
                let off = f64::from(spec.logo_offset);
                raster::draw_image(ctx, &logo.image, Affine::translate((off, split + off)))?;
            }
            Ok(())
        })?;

        Ok(RenderedCard {
            image: raster::pixmap_to_rgba_image(&pixmap)?,
            report: CardReport {
                colors,
                size_search,
                lines,
                photo: photo_outcome,
            },
        })
    }

    fn header_photo(
        &self,
        item: &NewsItem,
        scratch_dir: &Path,
    ) -> (Option<PreparedImage>, PhotoOutcome) {
        let Some(url) = item.image_url.as_deref().filter(|u| !u.trim().is_empty()) else {
            return (None, PhotoOutcome::Absent);
        };
        match photo::load_photo(
            self.photos.as_ref(),
            url,
            scratch_dir,
            self.spec.width,
            self.spec.photo_height(),
        ) {
            Ok(img) => (Some(PreparedImage::from_rgba(img)), PhotoOutcome::Pasted),
            Err(err) => {
                tracing::warn!(item = %item.id, stage = "photo", url, error = %err, "photo unavailable; using flat background");
                (None, PhotoOutcome::Failed(err.to_string()))
            }
        }
    }

    fn bar_heights(&mut self) -> Vec<f64> {
        let lo = self.spec.wave_min_px.round().max(0.0) as u32;
        let hi = (self.spec.wave_max_px.round().max(0.0) as u32).max(lo);
        (0..self.spec.wave_bars)
            .map(|_| f64::from(self.bar_rng.gen_range(lo..=hi)))
            .collect()
    }
}

/// Largest ladder size whose wrapped block fits the headline budget, and the lines at that size.
pub fn fit_headline(
    engine: &mut TextEngine,
    spec: &RenderSpec,
    headline: &str,
) -> (SizeSearch, Vec<Line>) {
    let max_width = spec.text_width();
    let budget = spec.headline_budget();
    let search = FontLadder::from_spec(spec).search(|size| {
        let (_, height) = layout::measure(headline, &mut engine.sized(size), max_width, spec.line_spacing);
        height <= budget
    });
    let lines = layout::layout(headline, &mut engine.sized(search.size()), max_width);
    (search, lines)
}

fn draw_accents(ctx: &mut vello_cpu::RenderContext, spec: &RenderSpec, accent: Rgb, bars: &[f64]) {
    let w = f64::from(spec.width);
    let split = f64::from(spec.split_y);
    let half = f64::from(spec.separator_px) / 2.0;

    ctx.set_paint(raster::solid(accent));
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, split - half, w, split + half));

    let spacing = f64::from(spec.wave_spacing);
    let start_x = (w / 2.0 - spacing * f64::from(spec.wave_bars) / 2.0).floor();
    for (i, h) in bars.iter().enumerate() {
        let x = start_x + spacing * i as f64;
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            x - half,
            split - h / 2.0,
            x + half,
            split + h / 2.0,
        ));
    }
}

fn badge_origin(spec: &RenderSpec) -> Point {
    Point::new(
        f64::from(spec.width) - f64::from(spec.badge_width) - f64::from(spec.badge_inset),
        f64::from(spec.split_y) - f64::from(spec.badge_rise),
    )
}

/// Parallelogram leaning left: the bottom edge is shifted by the skew.
fn badge_path(spec: &RenderSpec) -> BezPath {
    let o = badge_origin(spec);
    let (bw, bh, skew) = (
        f64::from(spec.badge_width),
        f64::from(spec.badge_height),
        f64::from(spec.badge_skew),
    );
    let mut path = BezPath::new();
    path.move_to(o);
    path.line_to((o.x + bw, o.y));
    path.line_to((o.x + bw - skew, o.y + bh));
    path.line_to((o.x - skew, o.y + bh));
    path.close_path();
    path
}

#[cfg(test)]
#[path = "../../tests/unit/render/canvas.rs"]
mod tests;
