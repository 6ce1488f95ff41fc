//! Greedy word wrap against a pixel width budget.
//!
//! The algorithm only needs line measurements, so it is written against [`TextMeasure`].
//! Production code measures with shaped glyphs ([`crate::text::shape::SizedFace`]); tests can
//! plug in a fixed-advance measurer.

/// Measures a single unwrapped line of text.
pub trait TextMeasure {
    /// `(width, height)` in pixels of `text` set on one line.
    fn measure_line(&mut self, text: &str) -> (f32, f32);
}

/// One wrapped line with its measured extent.
#[derive(Clone, Debug, PartialEq)]
pub struct Line {
    pub text: String,
    pub width: f32,
    pub height: f32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Align {
    Left,
    #[default]
    Center,
}

/// Wrap `text` into lines no wider than `max_width` px.
///
/// Words are appended to the current line while the measured candidate fits. A word that is
/// wider than the budget on its own occupies a line by itself; words are never split.
pub fn layout<M: TextMeasure + ?Sized>(text: &str, measure: &mut M, max_width: f32) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_extent = (0.0f32, 0.0f32);

    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
            current_extent = measure.measure_line(&current);
            continue;
        }

        let candidate = format!("{current} {word}");
        let extent = measure.measure_line(&candidate);
        if extent.0 <= max_width {
            current = candidate;
            current_extent = extent;
        } else {
            lines.push(Line {
                text: std::mem::take(&mut current),
                width: current_extent.0,
                height: current_extent.1,
            });
            current.push_str(word);
            current_extent = measure.measure_line(&current);
        }
    }

    if !current.is_empty() {
        lines.push(Line {
            text: current,
            width: current_extent.0,
            height: current_extent.1,
        });
    }
    lines
}

/// Height of a wrapped block: every line contributes its height plus `line_spacing`.
pub fn block_height(lines: &[Line], line_spacing: f32) -> f32 {
    lines.iter().map(|l| l.height + line_spacing).sum()
}

/// `(widest line, block height)` of `text` wrapped at `max_width`.
pub fn measure<M: TextMeasure + ?Sized>(
    text: &str,
    m: &mut M,
    max_width: f32,
    line_spacing: f32,
) -> (f32, f32) {
    let lines = layout(text, m, max_width);
    let width = lines.iter().map(|l| l.width).fold(0.0f32, f32::max);
    (width, block_height(&lines, line_spacing))
}

/// Horizontal origin of a line inside a canvas of `canvas_width`.
pub fn line_x(line: &Line, align: Align, canvas_width: f32, left_margin: f32) -> f32 {
    match align {
        Align::Center => ((canvas_width - line.width) / 2.0).floor(),
        Align::Left => left_margin,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/layout.rs"]
mod tests;
