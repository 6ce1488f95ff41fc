use std::sync::Arc;

use anyhow::Context;

use crate::foundation::{error::StudioResult, math::premultiply_rgba8_in_place};

/// Decoded raster image in premultiplied RGBA8, ready for `vello_cpu` image paints.
#[derive(Clone, Debug)]
pub struct PreparedImage {
    pub width: u32,
    pub height: u32,
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl PreparedImage {
    pub fn from_rgba(img: image::RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        let mut rgba8_premul = img.into_raw();
        premultiply_rgba8_in_place(&mut rgba8_premul);
        Self {
            width,
            height,
            rgba8_premul: Arc::new(rgba8_premul),
        }
    }
}

pub fn decode_image(bytes: &[u8]) -> StudioResult<PreparedImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    Ok(PreparedImage::from_rgba(dyn_img.to_rgba8()))
}

pub fn decode_image_file(path: &std::path::Path) -> StudioResult<PreparedImage> {
    let bytes = std::fs::read(path).with_context(|| format!("read image '{}'", path.display()))?;
    decode_image(&bytes)
}

pub fn parse_svg(bytes: &[u8]) -> StudioResult<usvg::Tree> {
    let opts = usvg::Options::default();
    let tree = usvg::Tree::from_data(bytes, &opts).context("parse svg tree")?;
    Ok(tree)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn decode_image_png_dimensions_and_premul() {
        let img = image::RgbaImage::from_raw(2, 1, vec![100, 50, 200, 128, 9, 9, 9, 255]).unwrap();
        let mut buf = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();

        let prepared = decode_image(&buf).unwrap();
        assert_eq!((prepared.width, prepared.height), (2, 1));
        assert_eq!(
            &prepared.rgba8_premul[..4],
            &[
                ((100u16 * 128 + 127) / 255) as u8,
                ((50u16 * 128 + 127) / 255) as u8,
                ((200u16 * 128 + 127) / 255) as u8,
                128u8
            ]
        );
        assert_eq!(&prepared.rgba8_premul[4..], &[9, 9, 9, 255]);
    }

    #[test]
    fn html_error_page_is_not_an_image() {
        assert!(decode_image(b"<html>404</html>").is_err());
    }

    #[test]
    fn decode_svg_parse_ok_and_err() {
        let ok = br#"<svg xmlns="http://www.w3.org/2000/svg" width="1" height="1"></svg>"#;
        parse_svg(ok).unwrap();
        assert!(parse_svg(br#"<svg"#).is_err());
    }
}
