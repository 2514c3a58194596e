//! Pure builders turning scene paint into fill, line and gradient records.

use crate::{
    foundation::core::{Affine, TwipsRect, from_twips},
    foundation::math::{gradient_ratio_u8, round_fixed_16_16},
    scene::model::{
        BitmapFillDef, Caps, FillMode, GradientEntry, InterpolationMethod, Joints,
        LinearGradientDef, RadialGradientDef, ScaleMode, SolidColorDef, SpreadMethod, StrokeDef,
        StrokePaint,
    },
    tags::model::{
        CapStyle, CharacterId, FillStyle, GradRecord, Gradient, JoinStyle, LinePaint, LineStyle,
        SwfMatrix,
    },
};

/// Side of the square a gradient is defined on, in twips.
const GRADIENT_SQUARE_TWIPS: f64 = 32768.0;

/// Resolve omitted gradient ratios.
///
/// The first entry defaults to 0 and the last to 1. An omitted interior ratio is placed
/// evenly between the previous resolved ratio and the next explicit one (or 1), and the
/// previous ratio advances after every entry, so the pass is strictly left to right.
/// Explicit ratios are not validated; decreasing input yields decreasing output.
pub(crate) fn interpolate_gradient_ratios(entries: &[GradientEntry]) -> Vec<f64> {
    let count = entries.len();
    let mut out = Vec::with_capacity(count);
    let mut previous = 0.0;

    for (idx, entry) in entries.iter().enumerate() {
        let ratio = match entry.ratio {
            Some(r) => r,
            None if idx == 0 => 0.0,
            None if idx == count - 1 => 1.0,
            None => {
                let (next_idx, next_ratio) = entries[idx..]
                    .iter()
                    .enumerate()
                    .find_map(|(off, e)| e.ratio.map(|r| (idx + off, r)))
                    .unwrap_or((count - 1, 1.0));
                let gap = next_idx + 1 - idx;
                previous + (next_ratio - previous) / gap as f64
            }
        };
        out.push(ratio);
        previous = ratio;
    }

    out
}

/// Gradient records with interpolated ratios.
pub(crate) fn grad_records(entries: &[GradientEntry]) -> Vec<GradRecord> {
    interpolate_gradient_ratios(entries)
        .into_iter()
        .zip(entries)
        .map(|(ratio, e)| GradRecord {
            ratio: gradient_ratio_u8(ratio),
            color: e.color.with_alpha(e.alpha),
        })
        .collect()
}

fn gradient(
    entries: &[GradientEntry],
    spread: SpreadMethod,
    interpolation: InterpolationMethod,
) -> Gradient {
    Gradient {
        spread,
        interpolation,
        records: grad_records(entries),
    }
}

pub(crate) fn solid_fill(def: &SolidColorDef) -> FillStyle {
    FillStyle::Solid {
        color: def.color.with_alpha(def.alpha),
    }
}

pub(crate) fn linear_gradient_fill(def: &LinearGradientDef, bounds: TwipsRect) -> FillStyle {
    let matrix = match def.matrix {
        Some(m) => SwfMatrix::from_affine(m.to_affine()),
        None => gradient_box(bounds, def.x, def.y, def.scale_x, None, def.rotation),
    };
    FillStyle::LinearGradient {
        matrix,
        gradient: gradient(&def.entries, def.spread_method, def.interpolation_method),
    }
}

pub(crate) fn radial_gradient_fill(def: &RadialGradientDef, bounds: TwipsRect) -> FillStyle {
    let matrix = match def.matrix {
        Some(m) => SwfMatrix::from_affine(m.to_affine()),
        None => gradient_box(bounds, def.x, def.y, def.scale_x, def.scale_y, def.rotation),
    };
    FillStyle::RadialGradient {
        matrix,
        gradient: gradient(&def.entries, def.spread_method, def.interpolation_method),
        focal_point: def.focal_point_ratio as f32,
    }
}

/// Map the gradient square onto the bounds.
///
/// `x`/`y` are offsets from the top-left of the bounds (default: its center); the sizes
/// default to the bounds size.
fn gradient_box(
    bounds: TwipsRect,
    x: Option<f64>,
    y: Option<f64>,
    width: Option<f64>,
    height: Option<f64>,
    rotation_deg: f64,
) -> SwfMatrix {
    let w = from_twips(bounds.width());
    let h = from_twips(bounds.height());
    let cx = from_twips(bounds.x_min) + x.unwrap_or(w / 2.0);
    let cy = from_twips(bounds.y_min) + y.unwrap_or(h / 2.0);
    let sx = width.unwrap_or(w) * 20.0 / GRADIENT_SQUARE_TWIPS;
    let sy = height.unwrap_or(h) * 20.0 / GRADIENT_SQUARE_TWIPS;

    let t = Affine::translate((cx * 20.0, cy * 20.0))
        * Affine::rotate(rotation_deg.to_radians())
        * Affine::scale_non_uniform(sx, sy);
    SwfMatrix::from_twips_space(t)
}

/// Pixel-space transform of a bitmap fill: bitmap pixels to shape coordinates.
pub(crate) fn bitmap_fill_affine(
    fill: &BitmapFillDef,
    mode: FillMode,
    image_size: (u32, u32),
    bounds: TwipsRect,
) -> Affine {
    if let Some(m) = fill.matrix {
        return m.to_affine();
    }

    let (img_w, img_h) = (f64::from(image_size.0.max(1)), f64::from(image_size.1.max(1)));
    let (default_sx, default_sy) = match mode {
        FillMode::Scale => (
            round_fixed_16_16(from_twips(bounds.width()) / img_w),
            round_fixed_16_16(from_twips(bounds.height()) / img_h),
        ),
        FillMode::Clip | FillMode::Repeat => (1.0, 1.0),
    };

    let x = fill.x.unwrap_or(from_twips(bounds.x_min));
    let y = fill.y.unwrap_or(from_twips(bounds.y_min));
    Affine::translate((x, y))
        * Affine::rotate(fill.rotation.unwrap_or(0.0).to_radians())
        * Affine::scale_non_uniform(
            fill.scale_x.unwrap_or(default_sx),
            fill.scale_y.unwrap_or(default_sy),
        )
}

/// Bitmap fill style for a pixel-space bitmap transform.
pub(crate) fn bitmap_fill(character: CharacterId, transform: Affine, repeating: bool) -> FillStyle {
    FillStyle::Bitmap {
        character,
        matrix: SwfMatrix::from_twips_space(Affine::scale(20.0) * transform),
        repeating,
        smoothed: true,
    }
}

/// Stroke width in twips.
pub(crate) fn line_width_twips(stroke: &StrokeDef) -> u16 {
    (stroke.weight * 20.0)
        .round_ties_even()
        .clamp(0.0, f64::from(u16::MAX)) as u16
}

/// Line style for a stroke. Gradient strokes are mapped onto `bounds`.
pub(crate) fn line_style(stroke: &StrokeDef, bounds: TwipsRect) -> LineStyle {
    let cap = match stroke.caps {
        Caps::Round => CapStyle::Round,
        Caps::None => CapStyle::None,
        Caps::Square => CapStyle::Square,
    };
    let join = match stroke.joints {
        Joints::Round => JoinStyle::Round,
        Joints::Bevel => JoinStyle::Bevel,
        Joints::Miter => JoinStyle::Miter {
            limit: stroke.miter_limit as f32,
        },
    };
    let paint = match &stroke.paint {
        StrokePaint::Solid(s) => LinePaint::Solid {
            color: s.color.with_alpha(s.alpha),
        },
        StrokePaint::LinearGradient(g) => LinePaint::Fill {
            fill: linear_gradient_fill(g, bounds),
        },
        StrokePaint::RadialGradient(g) => LinePaint::Fill {
            fill: radial_gradient_fill(g, bounds),
        },
    };

    LineStyle {
        width: line_width_twips(stroke),
        start_cap: cap,
        end_cap: cap,
        join,
        no_hscale: matches!(stroke.scale_mode, ScaleMode::Vertical | ScaleMode::None),
        no_vscale: matches!(stroke.scale_mode, ScaleMode::Horizontal | ScaleMode::None),
        pixel_hinting: stroke.pixel_hinting,
        paint,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transcode/styles.rs"]
mod tests;
