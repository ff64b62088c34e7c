//! Face geometry.
//!
//! The face is described in a `FACE_SIZE` square of logical units. Eyes and
//! mouth are drawn twice, once flat (muted) and once curved (live), and the
//! two renderings are weighted by the display level.

use std::f32::consts::PI;

use crate::palette::{BLUSH, LIVE, MUTED, Rgb};

/// Side of the square the face is drawn in, in logical pixels.
pub const FACE_SIZE: f32 = 100.0;

/// Curves lighter than this are not drawn at all.
const MIN_CURVE_WEIGHT: f32 = 0.05;

const EYE_SEGMENTS: usize = 10;
const MOUTH_SEGMENTS: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Rgb,
    pub width: f32,
}

/// One drawing primitive.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Circle {
        center: Point,
        radius: f32,
        fill: Rgb,
        outline: Option<Stroke>,
    },
    Polyline {
        points: Vec<Point>,
        stroke: Stroke,
    },
}

/// A horizontal curve through `(cx - half_width, y)` and `(cx + half_width, y)`
/// bulging by `lift` at its middle. Negative lift bulges upward on screen.
fn curve(cx: f32, y: f32, half_width: f32, lift: f32, segments: usize) -> Vec<Point> {
    (0..=segments)
        .map(|i| {
            let frac = i as f32 / segments as f32;
            Point {
                x: cx - half_width + 2.0 * half_width * frac,
                y: y + lift * (frac * PI).sin(),
            }
        })
        .collect()
}

/// Muted-style and live-style renderings of one feature, weighted by `level`.
///
/// Each curve's colour fades toward the face fill as its weight drops, and
/// the heavier curve is drawn last so it is never covered.
fn blended_feature(
    flat: Vec<Point>,
    curved: Vec<Point>,
    level: f32,
    fill: Rgb,
    outline: Rgb,
    width: f32,
) -> impl Iterator<Item = Shape> {
    let flat = (flat, 1.0 - level);
    let curved = (curved, level);
    let ordered = if level > 0.5 {
        [flat, curved]
    } else {
        [curved, flat]
    };
    ordered
        .into_iter()
        .filter(|(_, weight)| *weight >= MIN_CURVE_WEIGHT)
        .map(move |(points, weight)| Shape::Polyline {
            points,
            stroke: Stroke {
                color: fill.lerp(outline, weight),
                width,
            },
        })
}

/// Shapes for one frame, back to front.
pub fn compose(level: f32, breathe_scale: f32) -> Vec<Shape> {
    let level = level.clamp(0.0, 1.0);
    let palette = MUTED.lerp(LIVE, level);
    let half = FACE_SIZE / 2.0;
    let r = (half - 4.0) * breathe_scale;

    let mut shapes = vec![Shape::Circle {
        center: Point { x: half, y: half },
        radius: r,
        fill: palette.fill,
        outline: Some(Stroke {
            color: palette.outline,
            width: 2.0,
        }),
    }];

    let blush = palette.fill.lerp(BLUSH, 0.3 + 0.4 * level);
    shapes.extend([-1.0, 1.0].map(|side| Shape::Circle {
        center: Point {
            x: half + side * r * 0.55,
            y: half + r * 0.05,
        },
        radius: r * 0.15,
        fill: blush,
        outline: None,
    }));

    let line_width = (r * 0.06).max(2.0);

    let eye_y = half - r * 0.15;
    let eye_w = r * 0.2;
    for side in [-1.0, 1.0] {
        let ex = half + side * r * 0.28;
        shapes.extend(blended_feature(
            curve(ex, eye_y, eye_w, 0.0, EYE_SEGMENTS),
            curve(ex, eye_y, eye_w, -r * 0.18 * level, EYE_SEGMENTS),
            level,
            palette.fill,
            palette.outline,
            line_width,
        ));
    }

    let mouth_y = half + r * 0.3;
    shapes.extend(blended_feature(
        curve(half, mouth_y, r * 0.35, 0.0, MOUTH_SEGMENTS),
        curve(half, mouth_y, r * 0.35, r * 0.2 * level, MOUTH_SEGMENTS),
        level,
        palette.fill,
        palette.outline,
        line_width,
    ));

    shapes
}
