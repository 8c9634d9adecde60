//! Stroke capture and normalization for handwritten symbol input.
//!
//! Pointer samples are stamped onto a [`PixelGrid`] by the
//! [`StrokeRasterizer`]; the grid is then cropped by the [`Trimmer`] and
//! downsampled by the [`Normalizer`] into a small fixed-size density grid
//! that a character classifier consumes.
//!
//! Logging goes through the `log` facade; the host decides whether and where
//! it is written.

pub mod config;
pub mod error;
pub mod export;
pub mod grid;
pub mod normalize;
pub mod regions;
pub mod session;
pub mod stroke;
pub mod trim;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use grid::PixelGrid;
pub use normalize::{Normalizer, normalize};
pub use session::{CaptureSession, FeatureCache};
pub use stroke::StrokeRasterizer;
pub use trim::{Bounds, Trimmer, trim};
pub use types::{Coordinate, FrameBuffer, InputEvent, PointerSample};
