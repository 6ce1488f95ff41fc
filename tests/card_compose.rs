use std::{io::Cursor, path::Path, sync::Arc};

use gridcast::{
    CanvasComposer, NewsItem, PhotoSource, RenderSpec, Rgb, StudioError, StudioResult,
    render::{PhotoOutcome, photo::NoPhotos},
    text::{BrandFont, TextEngine},
};

fn text_engine() -> Option<TextEngine> {
    BrandFont::system_default()
        .ok()
        .and_then(|f| TextEngine::new(&f).ok())
}

fn composer(dir: &Path, spec: RenderSpec, photos: Arc<dyn PhotoSource>) -> CanvasComposer {
    CanvasComposer::new(spec, "RACING TAMIZHAN", dir, text_engine(), None, photos).with_bar_seed(3)
}

/// Serves the same solid green PNG for every URL.
struct GreenPhoto;

impl PhotoSource for GreenPhoto {
    fn fetch(&self, _url: &str) -> StudioResult<Vec<u8>> {
        let img = image::RgbaImage::from_pixel(40, 30, image::Rgba([0, 200, 0, 255]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png)
            .map_err(|e| StudioError::render(e.to_string()))?;
        Ok(out.into_inner())
    }
}

#[test]
fn verstappen_card_has_navy_header_and_fitted_headline() {
    let dir = tempfile::tempdir().unwrap();
    let spec = RenderSpec::STANDARD;
    let mut c = composer(dir.path(), spec, Arc::new(NoPhotos));
    let item = NewsItem::new("rb-1", "Max Verstappen wins again");

    let card = c.render(&item, dir.path()).unwrap();
    assert_eq!(card.image.dimensions(), (1080, 1350));
    assert_eq!(card.report.colors.primary, Rgb::new(6, 29, 66));
    assert_eq!(card.report.colors.accent, Rgb::new(255, 0, 0));
    assert_eq!(card.report.photo, PhotoOutcome::Absent);
    // Photo region, clear of accents and logo.
    assert_eq!(card.image.get_pixel(540, 200).0, [6, 29, 66, 255]);

    let Some(search) = card.report.size_search else {
        eprintln!("skipping headline checks: no system font available");
        return;
    };
    assert!(search.size() >= spec.min_font_px && search.size() <= spec.max_font_px);
    assert!(!card.report.lines.is_empty());
    for line in &card.report.lines {
        assert_eq!(line.text, line.text.to_uppercase());
        assert!(line.width <= spec.text_width() || !line.text.contains(' '));
    }
}

#[test]
fn repeated_compose_with_unreachable_photo_is_stable() {
    let dir = tempfile::tempdir().unwrap();
    let mut c = CanvasComposer::new(
        RenderSpec::STANDARD.scaled(0.2),
        "RACING TAMIZHAN",
        dir.path(),
        text_engine(),
        None,
        Arc::new(gridcast::render::HttpPhotoSource::new(
            std::time::Duration::from_millis(300),
        )),
    );
    let item = NewsItem::new("lec-1", "Leclerc tops second practice in Monaco")
        .with_image_url("http://127.0.0.1:9/photo.jpg");

    let a = c.render(&item, dir.path()).unwrap();
    let b = c.render(&item, dir.path()).unwrap();
    assert_eq!(a.image.dimensions(), b.image.dimensions());
    assert!(matches!(a.report.photo, PhotoOutcome::Failed(_)));
    let lines = |r: &gridcast::render::CardReport| {
        r.lines.iter().map(|l| l.text.clone()).collect::<Vec<_>>()
    };
    assert_eq!(lines(&a.report), lines(&b.report));

    let first = c.compose(&item).unwrap();
    let second = c.compose(&item).unwrap();
    assert_eq!(first, second);
    assert_eq!(image::image_dimensions(&first).unwrap(), (216, 270));
}

#[test]
fn fetched_photo_fills_the_header() {
    let dir = tempfile::tempdir().unwrap();
    let mut c = composer(dir.path(), RenderSpec::STANDARD.scaled(0.2), Arc::new(GreenPhoto));
    let item = NewsItem::new("n-1", "Norris on pole").with_image_url("https://img.example/n.png");

    let card = c.render(&item, dir.path()).unwrap();
    assert_eq!(card.report.photo, PhotoOutcome::Pasted);
    let [r, g, b, a] = card.image.get_pixel(5, 5).0;
    assert!(r < 20 && g > 180 && b < 20 && a == 255, "got {:?}", [r, g, b, a]);

    // Nothing staged is left behind next to the outputs.
    let leftovers: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().starts_with("temp_photo_"))
        .collect();
    assert!(leftovers.is_empty());
}
