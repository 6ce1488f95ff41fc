//! Canvas composition on the CPU rasterizer.

pub mod canvas;
pub mod frame;
pub mod photo;
pub mod raster;

pub use canvas::{CanvasComposer, CardReport, PhotoOutcome, RenderedCard};
pub use frame::FrameRGBA;
pub use photo::{HttpPhotoSource, NoPhotos, PhotoSource};
