use serde::{Deserialize, Serialize};

pub use kurbo::{Affine, BezPath, Point, Rect, Vec2};

/// Number of twips (the target's integer coordinate unit) per pixel.
pub const TWIPS_PER_PIXEL: f64 = 20.0;

/// Largest twip magnitude a coordinate is clamped to. The difference of any two clamped
/// coordinates fits in an `i32`, so edge deltas and rectangle sizes cannot overflow.
pub const TWIPS_LIMIT: i32 = i32::MAX / 2;

/// Convert a pixel coordinate to integer twips, rounding half to even and clamping to
/// [`TWIPS_LIMIT`].
pub fn to_twips(px: f64) -> i32 {
    let limit = f64::from(TWIPS_LIMIT);
    (px * TWIPS_PER_PIXEL).round_ties_even().clamp(-limit, limit) as i32
}

/// Convert integer twips back to pixels.
pub fn from_twips(twips: i32) -> f64 {
    f64::from(twips) / TWIPS_PER_PIXEL
}

/// 24-bit RGB color as written in FXG documents (`#RRGGBB` or a plain integer).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Color(pub u32);

impl Color {
    /// Opaque black, the FXG default for most paint.
    pub const BLACK: Self = Self(0x000000);
    /// Opaque white.
    pub const WHITE: Self = Self(0xFFFFFF);

    /// Red channel.
    pub fn r(self) -> u8 {
        ((self.0 >> 16) & 0xFF) as u8
    }

    /// Green channel.
    pub fn g(self) -> u8 {
        ((self.0 >> 8) & 0xFF) as u8
    }

    /// Blue channel.
    pub fn b(self) -> u8 {
        (self.0 & 0xFF) as u8
    }

    /// Combine with an alpha in `[0, 1]` into a straight-alpha [`Rgba`].
    pub fn with_alpha(self, alpha: f64) -> Rgba {
        Rgba {
            r: self.r(),
            g: self.g(),
            b: self.b(),
            a: (alpha.clamp(0.0, 1.0) * 255.0).round_ties_even() as u8,
        }
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Int(u32),
            Hex(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Int(v) if v <= 0xFF_FFFF => Ok(Self(v)),
            Repr::Int(v) => Err(serde::de::Error::custom(format!(
                "color {v:#x} does not fit in 24 bits"
            ))),
            Repr::Hex(s) => parse_hex(&s).map_err(serde::de::Error::custom),
        }
    }
}

fn parse_hex(s: &str) -> Result<Color, String> {
    let s = s.trim();
    let digits = s
        .strip_prefix('#')
        .or_else(|| s.strip_prefix("0x"))
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);

    if digits.len() != 6 {
        return Err(format!("color \"{s}\" must be #RRGGBB"));
    }
    u32::from_str_radix(digits, 16)
        .map(Color)
        .map_err(|_| format!("invalid hex color \"{s}\""))
}

/// Straight-alpha RGBA8 color as stored in fill, line and filter records.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Rgba {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba {
    /// Opaque black.
    pub fn opaque_black() -> Self {
        Self {
            r: 0,
            g: 0,
            b: 0,
            a: 255,
        }
    }
}

/// Axis-aligned rectangle in twips, stored the way the target format stores it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub struct TwipsRect {
    /// Left edge.
    pub x_min: i32,
    /// Right edge.
    pub x_max: i32,
    /// Top edge.
    pub y_min: i32,
    /// Bottom edge.
    pub y_max: i32,
}

impl TwipsRect {
    /// Rectangle spanning `(0, 0)` to `(width, height)` pixels.
    pub fn from_size_px(width: f64, height: f64) -> Self {
        Self {
            x_min: 0,
            x_max: to_twips(width),
            y_min: 0,
            y_max: to_twips(height),
        }
    }

    /// Rectangle from left/top/right/bottom pixel edges.
    pub fn from_edges_px(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            x_min: to_twips(left),
            x_max: to_twips(right),
            y_min: to_twips(top),
            y_max: to_twips(bottom),
        }
    }

    /// Width in twips.
    pub fn width(self) -> i32 {
        self.x_max.saturating_sub(self.x_min)
    }

    /// Height in twips.
    pub fn height(self) -> i32 {
        self.y_max.saturating_sub(self.y_min)
    }

    /// Grow every edge outward by `by` twips, saturating at the `i32` range.
    pub fn inflate(self, by: i32) -> Self {
        Self {
            x_min: self.x_min.saturating_sub(by),
            x_max: self.x_max.saturating_add(by),
            y_min: self.y_min.saturating_sub(by),
            y_max: self.y_max.saturating_add(by),
        }
    }

    /// Return `true` when `other` lies entirely inside `self`.
    pub fn contains_rect(self, other: Self) -> bool {
        self.x_min <= other.x_min
            && self.y_min <= other.y_min
            && self.x_max >= other.x_max
            && self.y_max >= other.y_max
    }

    /// Convert to a floating-point rectangle in pixels.
    pub fn to_px(self) -> Rect {
        Rect::new(
            from_twips(self.x_min),
            from_twips(self.y_min),
            from_twips(self.x_max),
            from_twips(self.y_max),
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
