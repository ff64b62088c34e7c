use std::sync::LazyLock;

use anyhow::Context;
use image::{Rgba, RgbaImage};
use micbuddy_face::{LIVE, MUTED, Rgb};

const ICON_SIZE: u32 = 64;
const ICON_MARGIN: u32 = 4;

static ICON_LIVE: LazyLock<RgbaImage> = LazyLock::new(|| circle_icon(LIVE.fill));
static ICON_MUTED: LazyLock<RgbaImage> = LazyLock::new(|| circle_icon(MUTED.fill));

/// Tray icon for the aggregate mic state: pink when live, purple when muted.
pub fn status_icon(live: bool) -> anyhow::Result<tray_icon::Icon> {
    let image = if live { &*ICON_LIVE } else { &*ICON_MUTED };
    let (width, height) = image.dimensions();
    tray_icon::Icon::from_rgba(image.as_raw().clone(), width, height)
        .context("Failed to create tray icon")
}

/// A filled circle inset by `ICON_MARGIN` on a transparent square.
fn circle_icon(color: Rgb) -> RgbaImage {
    let center = ICON_SIZE as f32 / 2.0;
    let radius = center - ICON_MARGIN as f32;
    RgbaImage::from_fn(ICON_SIZE, ICON_SIZE, |x, y| {
        let dx = x as f32 + 0.5 - center;
        let dy = y as f32 + 0.5 - center;
        if dx * dx + dy * dy <= radius * radius {
            Rgba([color.0, color.1, color.2, 255])
        } else {
            Rgba([0, 0, 0, 0])
        }
    })
}
