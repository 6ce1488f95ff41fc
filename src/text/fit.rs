//! Font-size search for the headline block.

use crate::config::RenderSpec;

/// Candidate sizes from `max_px` down to `min_px` in `step_px` decrements.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FontLadder {
    pub max_px: f32,
    pub min_px: f32,
    pub step_px: f32,
}

/// State of the search. `Trying` is the only non-terminal state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SizeSearch {
    Trying(f32),
    /// The block fits at this size.
    Fits(f32),
    /// No candidate fit; the minimum size is used and overflow is accepted.
    Exhausted(f32),
}

impl SizeSearch {
    pub fn size(self) -> f32 {
        match self {
            SizeSearch::Trying(s) | SizeSearch::Fits(s) | SizeSearch::Exhausted(s) => s,
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, SizeSearch::Trying(_))
    }
}

impl FontLadder {
    pub fn from_spec(spec: &RenderSpec) -> Self {
        Self {
            max_px: spec.max_font_px,
            min_px: spec.min_font_px,
            step_px: spec.font_step_px,
        }
    }

    /// Candidates, largest first. The minimum is always the last candidate.
    pub fn sizes(&self) -> Vec<f32> {
        let mut out = Vec::new();
        if self.step_px <= 0.0 || self.min_px > self.max_px {
            out.push(self.min_px);
            return out;
        }
        let mut size = self.max_px;
        while size > self.min_px + 1e-3 {
            out.push(size);
            size -= self.step_px;
        }
        out.push(self.min_px);
        out
    }

    /// Run the search: the largest candidate for which `fits` holds, or `Exhausted(min)`.
    pub fn search(&self, mut fits: impl FnMut(f32) -> bool) -> SizeSearch {
        let sizes = self.sizes();
        let mut idx = 0usize;
        let mut state = SizeSearch::Trying(sizes[0]);
        while let SizeSearch::Trying(size) = state {
            state = if fits(size) {
                SizeSearch::Fits(size)
            } else if idx + 1 < sizes.len() {
                idx += 1;
                SizeSearch::Trying(sizes[idx])
            } else {
                SizeSearch::Exhausted(self.min_px)
            };
        }
        state
    }
}
