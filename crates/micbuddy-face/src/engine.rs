//! Fixed-rate frame driver.

use std::time::Duration;

use crate::animator::Animator;
use crate::face::{Shape, compose};

/// Target frame rate of the overlay.
pub const FRAMES_PER_SECOND: u32 = 30;

/// Time between frames.
pub const FRAME_INTERVAL: Duration =
    Duration::from_nanos(1_000_000_000 / FRAMES_PER_SECOND as u64);

/// Visual state plus visibility. Animation keeps running while hidden so the
/// face resumes in phase when shown again.
#[derive(Debug, Clone)]
pub struct FaceEngine {
    animator: Animator,
    visible: bool,
}

impl FaceEngine {
    pub fn new(fade_speed: f32) -> Self {
        Self {
            animator: Animator::new(fade_speed),
            visible: false,
        }
    }

    /// New aggregate state; only the target moves.
    pub fn set_live(&mut self, live: bool) {
        self.animator.set_live(live);
    }

    pub fn show(&mut self) {
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn animator(&self) -> &Animator {
        &self.animator
    }

    /// Advance one frame, returning the shapes to draw if visible.
    pub fn tick(&mut self) -> Option<Vec<Shape>> {
        self.animator.advance(FRAME_INTERVAL.as_secs_f32());
        self.visible.then(|| self.frame())
    }

    /// Shapes for the current state.
    pub fn frame(&self) -> Vec<Shape> {
        compose(
            self.animator.display_level(),
            self.animator.breathe_scale(),
        )
    }
}
