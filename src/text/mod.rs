//! Text layout engine: font loading, shaping, greedy wrapping and size fitting.

pub mod fit;
pub mod font;
pub mod layout;
pub mod shape;

pub use fit::{FontLadder, SizeSearch};
pub use font::{BrandFont, FontOrigin};
pub use layout::{Align, Line, TextMeasure, block_height, layout, measure};
pub use shape::{SizedFace, TextBrush, TextEngine};
