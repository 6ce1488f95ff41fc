//! `vello_cpu` plumbing shared by the card composer and the clip renderer.

use std::sync::Arc;

use crate::{
    assets::decode::PreparedImage,
    foundation::{
        core::{Affine, BezPath, Rgb},
        error::{StudioError, StudioResult},
        math::unpremultiply_rgba8_in_place,
    },
    render::frame::FrameRGBA,
};

/// Reusable CPU render context keyed by its size.
#[derive(Default)]
pub struct Rasterizer {
    ctx: Option<vello_cpu::RenderContext>,
}

impl Rasterizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw with `f` onto a cleared `width × height` surface and return the pixels.
    pub fn render(
        &mut self,
        width: u32,
        height: u32,
        f: impl FnOnce(&mut vello_cpu::RenderContext) -> StudioResult<()>,
    ) -> StudioResult<vello_cpu::Pixmap> {
        let (w, h) = dims_u16(width, height)?;
        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == w && ctx.height() == h => ctx,
            _ => vello_cpu::RenderContext::new(w, h),
        };
        ctx.reset();
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        f(&mut ctx)?;
        ctx.flush();
        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        ctx.render_to_pixmap(&mut pixmap);
        self.ctx = Some(ctx);
        Ok(pixmap)
    }
}

fn dims_u16(width: u32, height: u32) -> StudioResult<(u16, u16)> {
    if width == 0 || height == 0 {
        return Err(StudioError::render("surface width/height must be non-zero"));
    }
    let w: u16 = width
        .try_into()
        .map_err(|_| StudioError::render("surface width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| StudioError::render("surface height exceeds u16"))?;
    Ok((w, h))
}

pub fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

pub fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::LineTo(p) => out.line_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::QuadTo(p1, p2) => out.quad_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
            ),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
                vello_cpu::kurbo::Point::new(p3.x, p3.y),
            ),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

pub fn solid(c: Rgb) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, 255)
}

pub fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> StudioResult<vello_cpu::Pixmap> {
    let (w, h) = dims_u16(width, height)?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(StudioError::render("pixmap byte len mismatch"));
    }
    let pixels = bytes
        .chunks_exact(4)
        .map(|px| vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]]))
        .collect::<Vec<_>>();
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels, w, h, true,
    ))
}

pub fn image_paint(img: &PreparedImage) -> StudioResult<vello_cpu::Image> {
    let pixmap = pixmap_from_premul_bytes(&img.rgba8_premul, img.width, img.height)?;
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

/// Fill the image's own rectangle, placed by `transform`.
pub fn draw_image(
    ctx: &mut vello_cpu::RenderContext,
    img: &PreparedImage,
    transform: Affine,
) -> StudioResult<()> {
    let paint = image_paint(img)?;
    ctx.set_transform(affine_to_cpu(transform));
    ctx.set_paint(paint);
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
        0.0,
        0.0,
        f64::from(img.width),
        f64::from(img.height),
    ));
    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    Ok(())
}

/// Opaque vertical gradient, `top` at row 0 to `bottom` at the last row.
pub fn vertical_gradient(top: Rgb, bottom: Rgb, width: u32, height: u32) -> PreparedImage {
    let w = width as usize;
    let mut bytes = vec![0u8; w.saturating_mul(height as usize).saturating_mul(4)];
    let h1 = height.saturating_sub(1) as f32;
    for y in 0..height as usize {
        let t = if h1 <= 0.0 { 0.0 } else { y as f32 / h1 };
        let c = top.lerp(bottom, t).to_rgba8();
        for px in bytes[y * w * 4..(y + 1) * w * 4].chunks_exact_mut(4) {
            px.copy_from_slice(&c);
        }
    }
    PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(bytes),
    }
}

/// Straight-alpha image of a rendered surface.
pub fn pixmap_to_rgba_image(pixmap: &vello_cpu::Pixmap) -> StudioResult<image::RgbaImage> {
    let mut data = pixmap.data_as_u8_slice().to_vec();
    unpremultiply_rgba8_in_place(&mut data);
    image::RgbaImage::from_raw(u32::from(pixmap.width()), u32::from(pixmap.height()), data)
        .ok_or_else(|| StudioError::render("pixmap buffer does not match its dimensions"))
}

pub fn pixmap_to_frame(pixmap: &vello_cpu::Pixmap) -> FrameRGBA {
    FrameRGBA {
        width: u32::from(pixmap.width()),
        height: u32::from(pixmap.height()),
        data: pixmap.data_as_u8_slice().to_vec(),
        premultiplied: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn px(pixmap: &vello_cpu::Pixmap, x: usize, y: usize) -> [u8; 4] {
        let w = pixmap.width() as usize;
        let d = pixmap.data_as_u8_slice();
        let i = (y * w + x) * 4;
        [d[i], d[i + 1], d[i + 2], d[i + 3]]
    }

    #[test]
    fn gradient_runs_top_to_bottom() {
        let g = vertical_gradient(Rgb::new(200, 0, 0), Rgb::new(0, 0, 100), 3, 5);
        assert_eq!(&g.rgba8_premul[..4], &[200, 0, 0, 255]);
        let last = g.rgba8_premul.len() - 4;
        assert_eq!(&g.rgba8_premul[last..], &[0, 0, 100, 255]);
    }

    #[test]
    fn zero_sized_surface_is_rejected() {
        let mut r = Rasterizer::new();
        assert!(r.render(0, 10, |_| Ok(())).is_err());
        assert!(r.render(70_000, 10, |_| Ok(())).is_err());
    }

    #[test]
    fn fill_and_image_land_where_expected() {
        let mut r = Rasterizer::new();
        let img = PreparedImage {
            width: 2,
            height: 2,
            rgba8_premul: Arc::new([0u8, 255, 0, 255].repeat(4)),
        };
        let pixmap = r
            .render(8, 8, |ctx| {
                ctx.set_paint(solid(Rgb::new(0, 0, 255)));
                ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, 8.0, 8.0));
                draw_image(ctx, &img, Affine::translate((4.0, 4.0)))
            })
            .unwrap();
        assert_eq!(px(&pixmap, 1, 1), [0, 0, 255, 255]);
        assert_eq!(px(&pixmap, 5, 5), [0, 255, 0, 255]);

        let rgba = pixmap_to_rgba_image(&pixmap).unwrap();
        assert_eq!(rgba.dimensions(), (8, 8));
        assert_eq!(pixmap_to_frame(&pixmap).pixel(5, 5), Some([0, 255, 0, 255]));
    }

    #[test]
    fn context_is_reused_between_same_size_renders() {
        let mut r = Rasterizer::new();
        let a = r
            .render(4, 4, |ctx| {
                ctx.set_paint(solid(Rgb::WHITE));
                ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, 4.0, 4.0));
                Ok(())
            })
            .unwrap();
        let b = r.render(4, 4, |_| Ok(())).unwrap();
        assert_eq!(px(&a, 0, 0), [255, 255, 255, 255]);
        assert_eq!(px(&b, 0, 0), [0, 0, 0, 0]);
    }
}
