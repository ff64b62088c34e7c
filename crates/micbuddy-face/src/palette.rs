//! Face colours and per-channel interpolation.

/// An opaque sRGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Linear per-channel blend; `t` is clamped to [0, 1].
    pub fn lerp(self, other: Rgb, t: f32) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Rgb(
            mix(self.0, other.0),
            mix(self.1, other.1),
            mix(self.2, other.2),
        )
    }
}

/// Fill and outline colour of the face in one state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub fill: Rgb,
    pub outline: Rgb,
}

impl Palette {
    /// Blend between two palettes, `t = 0` is `self`.
    pub fn lerp(self, other: Palette, t: f32) -> Palette {
        Palette {
            fill: self.fill.lerp(other.fill, t),
            outline: self.outline.lerp(other.outline, t),
        }
    }
}

/// Purple face shown while any mic is muted.
pub const MUTED: Palette = Palette {
    fill: Rgb(0x9b, 0x59, 0xb6),
    outline: Rgb(0x7d, 0x3c, 0x98),
};

/// Hot pink face shown while every mic is live.
pub const LIVE: Palette = Palette {
    fill: Rgb(0xff, 0x69, 0xb4),
    outline: Rgb(0xe0, 0x55, 0x9e),
};

/// Cheek highlight colour.
pub const BLUSH: Rgb = Rgb(0xff, 0x8f, 0xaf);
