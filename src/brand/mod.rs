//! Brand identity: team colors and publishing captions.

pub mod caption;
pub mod palette;

pub use palette::{DEFAULT_PAIR, resolve};
