use std::sync::Arc;

use super::*;
use crate::{render::photo::NoPhotos, text::font::BrandFont};

fn small_spec() -> RenderSpec {
    RenderSpec::STANDARD.scaled(0.2)
}

fn composer(dir: &Path, with_text: bool) -> CanvasComposer {
    let text = if with_text {
        BrandFont::system_default()
            .ok()
            .and_then(|f| TextEngine::new(&f).ok())
    } else {
        None
    };
    CanvasComposer::new(
        small_spec(),
        "RACING TAMIZHAN",
        dir,
        text,
        None,
        Arc::new(NoPhotos),
    )
    .with_bar_seed(7)
}

fn pixel(img: &image::RgbaImage, x: u32, y: u32) -> [u8; 4] {
    img.get_pixel(x, y).0
}

#[test]
fn badge_is_a_left_leaning_parallelogram() {
    let spec = RenderSpec::STANDARD;
    let path = badge_path(&spec);
    let pts: Vec<_> = path
        .elements()
        .iter()
        .filter_map(|el| match el {
            kurbo::PathEl::MoveTo(p) | kurbo::PathEl::LineTo(p) => Some((p.x, p.y)),
            _ => None,
        })
        .collect();
    assert_eq!(
        pts,
        vec![(730.0, 830.0), (1030.0, 830.0), (1010.0, 870.0), (710.0, 870.0)]
    );
}

#[test]
fn bar_heights_stay_in_range_and_follow_seed() {
    let dir = tempfile::tempdir().unwrap();
    let mut a = CanvasComposer::new(
        RenderSpec::STANDARD,
        "X",
        dir.path(),
        None,
        None,
        Arc::new(NoPhotos),
    )
    .with_bar_seed(42);
    let mut b = CanvasComposer::new(
        RenderSpec::STANDARD,
        "X",
        dir.path(),
        None,
        None,
        Arc::new(NoPhotos),
    )
    .with_bar_seed(42);
    let ha = a.bar_heights();
    assert_eq!(ha.len(), 30);
    assert!(ha.iter().all(|h| (20.0..=80.0).contains(h)));
    assert_eq!(ha, b.bar_heights());
}

#[test]
fn card_without_photo_or_font_is_canvas_sized_with_primary_header() {
    let dir = tempfile::tempdir().unwrap();
    let mut c = composer(dir.path(), false);
    let item = NewsItem::new("rb-1", "Verstappen takes pole");
    let card = c.render(&item, dir.path()).unwrap();

    assert_eq!(card.image.dimensions(), (216, 270));
    assert_eq!(card.report.photo, PhotoOutcome::Absent);
    assert!(card.report.size_search.is_none());
    assert_eq!(card.report.colors.primary, Rgb::new(6, 29, 66));
    assert_eq!(pixel(&card.image, 5, 5), [6, 29, 66, 255]);
}

#[test]
fn card_gradient_runs_from_primary_to_shadow() {
    let dir = tempfile::tempdir().unwrap();
    let mut c = composer(dir.path(), false);
    let item = NewsItem::new("f-1", "Ferrari upgrade");
    let card = c.render(&item, dir.path()).unwrap();
    let spec = small_spec();

    // Just below the accents, near the left edge; and the last row.
    let top = pixel(&card.image, 2, spec.split_y + 10);
    let bottom = pixel(&card.image, 2, spec.height - 1);
    assert!(top[0] > bottom[0]);
    assert_eq!(bottom, [5, 5, 10, 255]);
}

#[test]
fn failed_photo_is_reported_and_absorbed() {
    let dir = tempfile::tempdir().unwrap();
    let mut c = composer(dir.path(), false);
    let item = NewsItem::new("x", "Norris wins").with_image_url("http://unreachable.invalid/a.jpg");
    let card = c.render(&item, dir.path()).unwrap();
    assert!(matches!(card.report.photo, PhotoOutcome::Failed(_)));
    assert_eq!(pixel(&card.image, 3, 3), [255, 128, 0, 255]);
}

#[test]
fn compose_writes_slide_png_named_after_item() {
    let dir = tempfile::tempdir().unwrap();
    let mut c = composer(dir.path(), true);
    let item = NewsItem::new("https://news.example/a?b=1", "Hamilton on the podium");
    let path = c.compose(&item).unwrap();

    let name = path.file_name().unwrap().to_str().unwrap();
    assert!(name.starts_with("slide1_https___news_example_a_b_1_"));
    assert!(name.ends_with(".png"));
    let img = image::open(&path).unwrap();
    assert_eq!((img.width(), img.height()), (216, 270));
}

#[test]
fn headline_font_steps_down_for_long_text() {
    let dir = tempfile::tempdir().unwrap();
    let mut c = composer(dir.path(), true);
    if c.text.is_none() {
        eprintln!("skipping: no system font available");
        return;
    }
    let short = c.render(&NewsItem::new("a", "Pole"), dir.path()).unwrap();
    let long_text = "Championship leader survives late safety car drama as rivals collide \
                     at the final chicane and stewards open an investigation into both teams";
    let long = c.render(&NewsItem::new("b", long_text), dir.path()).unwrap();

    let spec = small_spec();
    let short_px = short.report.size_search.unwrap().size();
    let long_px = long.report.size_search.unwrap().size();
    assert_eq!(short_px, spec.max_font_px);
    assert!(long_px < short_px);
    assert!(long_px >= spec.min_font_px);
    assert!(long.report.lines.len() > 1);
    for line in &long.report.lines {
        assert_eq!(line.text, line.text.to_uppercase());
    }
}

#[test]
fn unwritable_output_is_the_only_error() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not_a_dir");
    std::fs::write(&blocker, b"file").unwrap();
    let mut c = composer(&blocker, false);
    assert!(c.compose(&NewsItem::new("a", "Alonso")).is_err());
}
