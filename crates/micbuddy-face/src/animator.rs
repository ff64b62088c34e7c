//! Continuous visual state chasing a discrete live/muted target.

/// Default chase rate, in levels per second.
pub const DEFAULT_FADE_SPEED: f32 = 3.0;

/// Seconds per full breathing cycle.
pub const BREATHE_PERIOD: f32 = 2.0;

/// Peak relative change of the face radius while breathing.
pub const BREATHE_AMOUNT: f32 = 0.04;

/// Display level and breathing phase of the face.
///
/// `display_level` only ever moves toward `target_level` by at most
/// `fade_speed * dt` per step, so a flip of the target never pops.
#[derive(Debug, Clone, PartialEq)]
pub struct Animator {
    display_level: f32,
    target_level: f32,
    breathe_phase: f32,
    fade_speed: f32,
}

impl Default for Animator {
    fn default() -> Self {
        Self::new(DEFAULT_FADE_SPEED)
    }
}

impl Animator {
    /// Starts muted. Non-positive speeds fall back to the default.
    pub fn new(fade_speed: f32) -> Self {
        let fade_speed = if fade_speed.is_finite() && fade_speed > 0.0 {
            fade_speed
        } else {
            DEFAULT_FADE_SPEED
        };
        Self {
            display_level: 0.0,
            target_level: 0.0,
            breathe_phase: 0.0,
            fade_speed,
        }
    }

    /// Snap the target to live (1) or muted (0).
    pub fn set_live(&mut self, live: bool) {
        self.target_level = if live { 1.0 } else { 0.0 };
    }

    /// Advance by `dt` seconds.
    pub fn advance(&mut self, dt: f32) {
        let step = self.fade_speed * dt;
        let diff = self.target_level - self.display_level;
        self.display_level = if diff.abs() <= step {
            self.target_level
        } else {
            (self.display_level + step.copysign(diff)).clamp(0.0, 1.0)
        };
        self.breathe_phase = (self.breathe_phase + dt).rem_euclid(BREATHE_PERIOD);
    }

    pub fn display_level(&self) -> f32 {
        self.display_level
    }

    pub fn target_level(&self) -> f32 {
        self.target_level
    }

    pub fn breathe_phase(&self) -> f32 {
        self.breathe_phase
    }

    pub fn fade_speed(&self) -> f32 {
        self.fade_speed
    }

    /// Radius multiplier for the current breathing phase.
    pub fn breathe_scale(&self) -> f32 {
        1.0 + (self.breathe_phase * std::f32::consts::TAU / BREATHE_PERIOD).sin() * BREATHE_AMOUNT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 30.0;

    #[test]
    fn test_starts_muted() {
        let animator = Animator::default();
        assert_eq!(animator.display_level(), 0.0);
        assert_eq!(animator.target_level(), 0.0);
    }

    #[test]
    fn test_converges_monotonically_within_bound() {
        let mut animator = Animator::default();
        animator.set_live(true);

        // |1 - 0| / (3.0 * 1/30) = 10 frames
        let bound = (1.0 / (animator.fade_speed() * DT)).ceil() as usize;
        let mut previous = animator.display_level();
        let mut frames = 0;
        while animator.display_level() < 1.0 {
            animator.advance(DT);
            frames += 1;
            let level = animator.display_level();
            assert!(level >= previous, "level went backwards");
            assert!((0.0..=1.0).contains(&level));
            previous = level;
            assert!(frames <= bound + 1, "took {frames} frames");
        }
        assert!(frames >= 2);
    }

    #[test]
    fn test_never_overshoots() {
        let mut animator = Animator::new(100.0);
        animator.set_live(true);
        animator.advance(DT);
        assert_eq!(animator.display_level(), 1.0);
        animator.set_live(false);
        animator.advance(DT);
        assert_eq!(animator.display_level(), 0.0);
    }

    #[test]
    fn test_flip_mid_fade_reverses_without_jump() {
        let mut animator = Animator::default();
        animator.set_live(true);
        for _ in 0..4 {
            animator.advance(DT);
        }
        let before = animator.display_level();
        assert!(before > 0.0 && before < 1.0);

        animator.set_live(false);
        assert_eq!(animator.display_level(), before);
        animator.advance(DT);
        let after = animator.display_level();
        assert!(after < before);
        assert!(before - after <= animator.fade_speed() * DT + f32::EPSILON);
    }

    #[test]
    fn test_set_target_keeps_phase() {
        let mut animator = Animator::default();
        for _ in 0..7 {
            animator.advance(DT);
        }
        let phase = animator.breathe_phase();
        animator.set_live(true);
        animator.set_live(false);
        assert_eq!(animator.breathe_phase(), phase);
    }

    #[test]
    fn test_breathe_scale_stays_in_range() {
        let mut animator = Animator::default();
        for _ in 0..120 {
            animator.advance(DT);
            let scale = animator.breathe_scale();
            assert!(scale >= 1.0 - BREATHE_AMOUNT - 1e-6);
            assert!(scale <= 1.0 + BREATHE_AMOUNT + 1e-6);
            assert!(animator.breathe_phase() < BREATHE_PERIOD);
        }
    }

    #[test]
    fn test_bad_speed_falls_back() {
        assert_eq!(Animator::new(0.0).fade_speed(), DEFAULT_FADE_SPEED);
        assert_eq!(Animator::new(-2.0).fade_speed(), DEFAULT_FADE_SPEED);
        assert_eq!(Animator::new(f32::NAN).fade_speed(), DEFAULT_FADE_SPEED);
    }
}
