//! Animated face for micbuddy.
//!
//! [`FaceEngine`] owns the visual state and advances it on a fixed frame
//! timer. Each visible frame is described as a list of [`Shape`]s built by
//! [`compose`], which [`Renderer`] rasterizes with tiny-skia.

mod animator;
mod engine;
mod face;
mod palette;
mod raster;

pub use animator::{Animator, BREATHE_AMOUNT, BREATHE_PERIOD, DEFAULT_FADE_SPEED};
pub use engine::{FRAME_INTERVAL, FRAMES_PER_SECOND, FaceEngine};
pub use face::{FACE_SIZE, Point, Shape, Stroke, compose};
pub use palette::{BLUSH, LIVE, MUTED, Palette, Rgb};
pub use raster::Renderer;
