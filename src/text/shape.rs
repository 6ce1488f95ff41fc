//! Parley-backed shaping, measuring and glyph drawing.

use crate::{
    foundation::{
        core::Rgb,
        error::{StudioError, StudioResult},
    },
    text::{
        font::BrandFont,
        layout::{Align, Line, TextMeasure, line_x},
    },
};

/// RGBA8 brush color carried through Parley layouts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextBrush {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl From<Rgb> for TextBrush {
    fn from(c: Rgb) -> Self {
        Self {
            r: c.r,
            g: c.g,
            b: c.b,
            a: 255,
        }
    }
}

/// Shapes single lines of text in one registered font.
pub struct TextEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrush>,
    family_name: String,
    font: vello_cpu::peniko::FontData,
}

impl TextEngine {
    pub fn new(font: &BrandFont) -> StudioResult<Self> {
        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font.bytes().to_vec()), None);
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| StudioError::validation("no font families registered from font bytes"))?;
        let family_name = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| StudioError::validation("registered font family has no name"))?
            .to_string();

        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family_name,
            font: font.font_data(),
        })
    }

    pub fn family_name(&self) -> &str {
        &self.family_name
    }

    /// Shape `text` as one unbroken line.
    pub fn shape_line(
        &mut self,
        text: &str,
        size_px: f32,
        brush: TextBrush,
    ) -> StudioResult<parley::Layout<TextBrush>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(StudioError::validation(
                "text size_px must be finite and > 0",
            ));
        }

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(self.family_name.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrush> = builder.build(text);
        layout.break_all_lines(None);
        layout.align(
            None,
            parley::Alignment::Start,
            parley::AlignmentOptions::default(),
        );
        Ok(layout)
    }

    /// Measurer bound to one font size.
    pub fn sized(&mut self, size_px: f32) -> SizedFace<'_> {
        SizedFace {
            engine: self,
            size_px,
        }
    }

    /// Draw `text` as one line with its top-left corner at `(x, y)`.
    pub fn draw_line(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        text: &str,
        size_px: f32,
        color: Rgb,
        x: f64,
        y: f64,
    ) -> StudioResult<()> {
        let layout = self.shape_line(text, size_px, color.into())?;
        ctx.set_transform(vello_cpu::kurbo::Affine::translate((x, y)));
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let brush = run.style().brush;
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));
                let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(&self.font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        Ok(())
    }

    /// Draw wrapped lines top to bottom starting at `top`.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_block(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        lines: &[Line],
        size_px: f32,
        color: Rgb,
        top: f32,
        line_spacing: f32,
        align: Align,
        canvas_width: f32,
        left_margin: f32,
    ) -> StudioResult<()> {
        let mut y = top;
        for line in lines {
            let x = line_x(line, align, canvas_width, left_margin);
            self.draw_line(ctx, &line.text, size_px, color, f64::from(x), f64::from(y))?;
            y += line.height + line_spacing;
        }
        Ok(())
    }
}

/// A [`TextEngine`] at a fixed size, usable as a [`TextMeasure`].
pub struct SizedFace<'a> {
    engine: &'a mut TextEngine,
    size_px: f32,
}

impl TextMeasure for SizedFace<'_> {
    fn measure_line(&mut self, text: &str) -> (f32, f32) {
        match self
            .engine
            .shape_line(text, self.size_px, TextBrush::default())
        {
            Ok(layout) => (layout.width(), layout.height()),
            Err(_) => (0.0, 0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::layout::layout;

    fn engine() -> Option<TextEngine> {
        let font = BrandFont::system_default().ok()?;
        TextEngine::new(&font).ok()
    }

    #[test]
    fn brush_from_rgb_is_opaque() {
        let b = TextBrush::from(Rgb::new(1, 2, 3));
        assert_eq!((b.r, b.g, b.b, b.a), (1, 2, 3, 255));
    }

    #[test]
    fn rejects_non_positive_size() {
        let Some(mut engine) = engine() else {
            eprintln!("skipping: no system font available");
            return;
        };
        assert!(engine.shape_line("X", 0.0, TextBrush::default()).is_err());
    }

    #[test]
    fn shaped_width_grows_with_text_and_size() {
        let Some(mut engine) = engine() else {
            eprintln!("skipping: no system font available");
            return;
        };
        let (w_short, h_small) = engine.sized(40.0).measure_line("MAX");
        let (w_long, _) = engine.sized(40.0).measure_line("MAX VERSTAPPEN");
        let (w_big, h_big) = engine.sized(80.0).measure_line("MAX");
        assert!(w_short > 0.0 && h_small > 0.0);
        assert!(w_long > w_short);
        assert!(w_big > w_short);
        assert!(h_big > h_small);
    }

    #[test]
    fn real_glyph_wrap_respects_budget() {
        let Some(mut engine) = engine() else {
            eprintln!("skipping: no system font available");
            return;
        };
        let text = "LEWIS HAMILTON CLAIMS RECORD NINTH WIN AT SILVERSTONE IN FRONT OF HOME FANS";
        let mut face = engine.sized(60.0);
        for line in layout(text, &mut face, 600.0) {
            assert!(line.width <= 600.0 || !line.text.contains(' '));
        }
    }
}
