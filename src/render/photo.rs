//! Header photo: fetch, contrast boost, cover-fit to the photo region.

use std::{io::Write as _, path::Path, time::Duration};

use anyhow::Context as _;

use crate::{
    foundation::error::{StudioError, StudioResult},
    runtime,
};

/// Contrast factor applied to every fetched photo.
pub const PHOTO_CONTRAST: f32 = 1.1;

/// Where header photos come from.
pub trait PhotoSource: Send + Sync {
    /// Raw encoded image bytes behind `url`.
    fn fetch(&self, url: &str) -> StudioResult<Vec<u8>>;
}

/// Plain HTTP GET. Any non-2xx status is a failure.
#[derive(Clone, Debug)]
pub struct HttpPhotoSource {
    timeout: Duration,
    user_agent: String,
}

impl HttpPhotoSource {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            user_agent: format!("gridcast/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl PhotoSource for HttpPhotoSource {
    fn fetch(&self, url: &str) -> StudioResult<Vec<u8>> {
        let timeout = self.timeout;
        let user_agent = self.user_agent.clone();
        let url = url.to_string();
        let res = runtime::block_on(move || async move {
            // A client per call: connection pools do not outlive the bridge runtime.
            let client = reqwest::Client::builder()
                .timeout(timeout)
                .user_agent(user_agent)
                .pool_max_idle_per_host(0)
                .build()
                .context("Failed to create HTTP client")?;
            let response = client
                .get(&url)
                .send()
                .await
                .with_context(|| format!("GET {url}"))?;
            if !response.status().is_success() {
                anyhow::bail!("GET {url} returned status {}", response.status());
            }
            let body = response.bytes().await.context("read photo body")?;
            Ok::<_, anyhow::Error>(body.to_vec())
        })
        .map_err(|e| StudioError::fetch(format!("photo fetch worker failed: {e}")))?;
        res.map_err(|e| StudioError::fetch(format!("{e:#}")))
    }
}

/// Source that never has a photo; cards fall back to the flat background.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoPhotos;

impl PhotoSource for NoPhotos {
    fn fetch(&self, url: &str) -> StudioResult<Vec<u8>> {
        Err(StudioError::fetch(format!("photo fetching disabled ({url})")))
    }
}

/// Fetch `url`, stage it in a temp file under `scratch_dir`, decode and prepare it.
///
/// The staged file is removed on every path, including decode failures.
pub fn load_photo(
    source: &dyn PhotoSource,
    url: &str,
    scratch_dir: &Path,
    width: u32,
    height: u32,
) -> StudioResult<image::RgbaImage> {
    let bytes = source.fetch(url)?;

    let mut staged = tempfile::Builder::new()
        .prefix("temp_photo_")
        .tempfile_in(scratch_dir)
        .with_context(|| format!("stage photo in '{}'", scratch_dir.display()))?;
    staged.write_all(&bytes).context("write staged photo")?;
    staged.flush().context("flush staged photo")?;

    let img = image::ImageReader::open(staged.path())
        .context("open staged photo")?
        .with_guessed_format()
        .context("sniff staged photo format")?
        .decode()
        .map_err(|e| StudioError::fetch(format!("photo is not a decodable image: {e}")))?;
    drop(staged);

    Ok(prepare_photo(img.to_rgba8(), width, height))
}

/// Contrast boost then cover-fit: scale preserving aspect so both sides cover the target,
/// then center-crop to exactly `width × height`.
pub fn prepare_photo(img: image::RgbaImage, width: u32, height: u32) -> image::RgbaImage {
    let boosted = enhance_contrast(img, PHOTO_CONTRAST);
    image::DynamicImage::ImageRgba8(boosted)
        .resize_to_fill(width, height, image::imageops::FilterType::Lanczos3)
        .to_rgba8()
}

/// Blend every pixel away from the mean luma by `factor`. Alpha is untouched.
pub fn enhance_contrast(mut img: image::RgbaImage, factor: f32) -> image::RgbaImage {
    let n = u64::from(img.width()) * u64::from(img.height());
    if n == 0 {
        return img;
    }
    let luma_sum: u64 = img
        .pixels()
        .map(|p| (u64::from(p[0]) * 299 + u64::from(p[1]) * 587 + u64::from(p[2]) * 114) / 1000)
        .sum();
    let mean = ((luma_sum as f64 / n as f64) + 0.5).floor() as f32;

    for p in img.pixels_mut() {
        for c in 0..3 {
            let v = mean + (f32::from(p[c]) - mean) * factor;
            p[c] = v.round().clamp(0.0, 255.0) as u8;
        }
    }
    img
}
