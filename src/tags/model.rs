use serde::Serialize;

use crate::{
    assets::image::BitmapData,
    foundation::core::{Affine, Rgba, TwipsRect, to_twips},
    foundation::error::{FxgError, FxgResult},
    scene::model::{BlendMode, ColorTransformDef, InterpolationMethod, SpreadMethod},
};

/// Dictionary identifier of a character (sprite, shape or bitmap).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct CharacterId(pub u16);

/// Character table of one transcode. Identifiers start at 1 and are assigned in creation order.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Dictionary {
    characters: Vec<Character>,
}

impl Dictionary {
    /// Add a character and return its identifier.
    pub fn insert(&mut self, character: Character) -> FxgResult<CharacterId> {
        let next = self.characters.len() + 1;
        let id = u16::try_from(next)
            .map_err(|_| FxgError::invariant("character id space exhausted"))?;
        self.characters.push(character);
        Ok(CharacterId(id))
    }

    /// Look up a character.
    pub fn get(&self, id: CharacterId) -> Option<&Character> {
        usize::from(id.0)
            .checked_sub(1)
            .and_then(|idx| self.characters.get(idx))
    }

    fn get_mut(&mut self, id: CharacterId) -> Option<&mut Character> {
        usize::from(id.0)
            .checked_sub(1)
            .and_then(|idx| self.characters.get_mut(idx))
    }

    /// Look up a sprite.
    pub fn sprite(&self, id: CharacterId) -> Option<&Sprite> {
        match self.get(id) {
            Some(Character::Sprite(s)) => Some(s),
            _ => None,
        }
    }

    pub(crate) fn sprite_mut(&mut self, id: CharacterId) -> Option<&mut Sprite> {
        match self.get_mut(id) {
            Some(Character::Sprite(s)) => Some(s),
            _ => None,
        }
    }

    /// Look up a shape.
    pub fn shape(&self, id: CharacterId) -> Option<&Shape> {
        match self.get(id) {
            Some(Character::Shape(s)) => Some(s),
            _ => None,
        }
    }

    /// Look up a bitmap.
    pub fn bitmap(&self, id: CharacterId) -> Option<&BitmapCharacter> {
        match self.get(id) {
            Some(Character::Bitmap(b)) => Some(b),
            _ => None,
        }
    }

    /// Number of characters.
    pub fn len(&self) -> usize {
        self.characters.len()
    }

    /// Return `true` when no character was defined.
    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    /// Iterate characters in definition order.
    pub fn iter(&self) -> impl Iterator<Item = (CharacterId, &Character)> {
        self.characters
            .iter()
            .enumerate()
            .map(|(idx, c)| (CharacterId((idx + 1) as u16), c))
    }
}

/// A dictionary entry.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Character {
    /// Container with its own display list.
    Sprite(Sprite),
    /// Vector shape definition.
    Shape(Shape),
    /// Embedded bitmap.
    Bitmap(BitmapCharacter),
}

/// Sprite definition: an ordered display list of placements.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Sprite {
    /// Debug label describing why the sprite exists.
    pub label: &'static str,
    /// Placements in depth order.
    pub placements: Vec<Placement>,
}

impl Sprite {
    /// Empty sprite with a debug label.
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            placements: Vec::new(),
        }
    }

    /// Depth of the last placement (0 when empty).
    pub fn last_depth(&self) -> i32 {
        self.placements.last().map_or(0, |p| p.depth)
    }
}

/// Embedded bitmap character.
#[derive(Clone, Debug, Serialize)]
pub struct BitmapCharacter {
    /// Pixel width.
    pub width: u32,
    /// Pixel height.
    pub height: u32,
    /// Encoded payload.
    pub data: BitmapData,
}

/// Display-list placement of a character inside a sprite.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Placement {
    /// Placed character.
    pub character: CharacterId,
    /// Depth within the owning sprite (starts at 1).
    pub depth: i32,
    /// Placement matrix.
    pub matrix: SwfMatrix,
    /// Optional color transform.
    pub color_transform: Option<ColorTransform>,
    /// Optional blend mode.
    pub blend_mode: Option<SwfBlendMode>,
    /// Surface filters, in application order.
    pub filters: Vec<Filter>,
    /// Last depth clipped by this placement when it acts as a mask.
    pub clip_depth: Option<i32>,
    /// Bitmap caching flag (required for alpha masks).
    pub cache_as_bitmap: bool,
}

impl Placement {
    /// Return `true` when this placement acts as a clipping mask.
    pub fn has_clip_depth(&self) -> bool {
        self.clip_depth.is_some()
    }
}

/// 2x3 placement matrix: linear part as floats, translation in twips.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SwfMatrix {
    /// x scale.
    pub scale_x: f64,
    /// y skew.
    pub rotate_skew0: f64,
    /// x skew.
    pub rotate_skew1: f64,
    /// y scale.
    pub scale_y: f64,
    /// x translation in twips.
    pub translate_x: i32,
    /// y translation in twips.
    pub translate_y: i32,
}

impl Default for SwfMatrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl SwfMatrix {
    /// Identity matrix.
    pub const IDENTITY: Self = Self {
        scale_x: 1.0,
        rotate_skew0: 0.0,
        rotate_skew1: 0.0,
        scale_y: 1.0,
        translate_x: 0,
        translate_y: 0,
    };

    /// Convert a pixel-space affine: linear part copied, translation converted to twips.
    pub fn from_affine(t: Affine) -> Self {
        let [a, b, c, d, e, f] = t.as_coeffs();
        Self {
            scale_x: a,
            rotate_skew0: b,
            rotate_skew1: c,
            scale_y: d,
            translate_x: to_twips(e),
            translate_y: to_twips(f),
        }
    }

    /// Convert an affine whose translation is already expressed in twips.
    pub fn from_twips_space(t: Affine) -> Self {
        let [a, b, c, d, e, f] = t.as_coeffs();
        Self {
            scale_x: a,
            rotate_skew0: b,
            rotate_skew1: c,
            scale_y: d,
            translate_x: e.round_ties_even() as i32,
            translate_y: f.round_ties_even() as i32,
        }
    }
}

/// Color transform in 8.8 fixed-point multipliers and integer offsets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ColorTransform {
    /// Red multiplier (256 = 1.0).
    pub red_mult: i16,
    /// Green multiplier (256 = 1.0).
    pub green_mult: i16,
    /// Blue multiplier (256 = 1.0).
    pub blue_mult: i16,
    /// Alpha multiplier (256 = 1.0).
    pub alpha_mult: i16,
    /// Red offset.
    pub red_add: i16,
    /// Green offset.
    pub green_add: i16,
    /// Blue offset.
    pub blue_add: i16,
    /// Alpha offset.
    pub alpha_add: i16,
}

impl ColorTransform {
    /// Convert a scene color transform.
    pub fn from_def(def: &ColorTransformDef) -> Self {
        fn mult(v: f64) -> i16 {
            (v * 256.0)
                .round_ties_even()
                .clamp(f64::from(i16::MIN), f64::from(i16::MAX)) as i16
        }
        fn add(v: f64) -> i16 {
            v.round_ties_even()
                .clamp(f64::from(i16::MIN), f64::from(i16::MAX)) as i16
        }
        Self {
            red_mult: mult(def.red_multiplier),
            green_mult: mult(def.green_multiplier),
            blue_mult: mult(def.blue_multiplier),
            alpha_mult: mult(def.alpha_multiplier),
            red_add: add(def.red_offset),
            green_add: add(def.green_offset),
            blue_add: add(def.blue_offset),
            alpha_add: add(def.alpha_offset),
        }
    }
}

/// Blend modes the target format supports natively, with their wire numbers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
#[allow(missing_docs)]
pub enum SwfBlendMode {
    Normal = 1,
    Layer = 2,
    Multiply = 3,
    Screen = 4,
    Lighten = 5,
    Darken = 6,
    Difference = 7,
    Add = 8,
    Subtract = 9,
    Invert = 10,
    Alpha = 11,
    Erase = 12,
    Overlay = 13,
    HardLight = 14,
}

impl SwfBlendMode {
    /// Map a resolved scene blend mode.
    ///
    /// Returns `None` for `auto` and for modes that need pixel-shader support.
    pub fn from_fxg(mode: BlendMode) -> Option<Self> {
        Some(match mode {
            BlendMode::Normal => Self::Normal,
            BlendMode::Layer => Self::Layer,
            BlendMode::Multiply => Self::Multiply,
            BlendMode::Screen => Self::Screen,
            BlendMode::Lighten => Self::Lighten,
            BlendMode::Darken => Self::Darken,
            BlendMode::Difference => Self::Difference,
            BlendMode::Add => Self::Add,
            BlendMode::Subtract => Self::Subtract,
            BlendMode::Invert => Self::Invert,
            BlendMode::Alpha => Self::Alpha,
            BlendMode::Erase => Self::Erase,
            BlendMode::Overlay => Self::Overlay,
            BlendMode::Hardlight => Self::HardLight,
            BlendMode::Auto
            | BlendMode::Colordodge
            | BlendMode::Colorburn
            | BlendMode::Exclusion
            | BlendMode::Softlight
            | BlendMode::Hue
            | BlendMode::Saturation
            | BlendMode::Color
            | BlendMode::Luminosity => return None,
        })
    }

    /// Wire number.
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// Out-of-band 9-slice grid attached to a sprite.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ScalingGrid {
    /// Sprite the grid applies to.
    pub character: CharacterId,
    /// Splitter rectangle in twips.
    pub splitter: TwipsRect,
}

/// Vector shape definition.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Shape {
    /// Fill style table (1-based indices in records).
    pub fill_styles: Vec<FillStyle>,
    /// Line style table (1-based indices in records).
    pub line_styles: Vec<LineStyle>,
    /// Outline bounds, ignoring strokes.
    pub edge_bounds: TwipsRect,
    /// Outline bounds grown by the stroke.
    pub shape_bounds: TwipsRect,
    /// Edge and style-change records.
    pub records: Vec<ShapeRecord>,
    /// Non-zero fill rule flag.
    pub uses_nonzero_winding: bool,
}

/// Shape record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ShapeRecord {
    /// Pen move and/or style selection.
    StyleChange(StyleChange),
    /// Straight edge, as a delta from the current point (twips).
    StraightEdge {
        /// x delta.
        dx: i32,
        /// y delta.
        dy: i32,
    },
    /// Quadratic edge, as deltas from the current point to the control point and from
    /// the control point to the anchor (twips).
    CurvedEdge {
        /// Control x delta.
        control_dx: i32,
        /// Control y delta.
        control_dy: i32,
        /// Anchor x delta.
        anchor_dx: i32,
        /// Anchor y delta.
        anchor_dy: i32,
    },
}

/// Style-change record. `None` fields are left unchanged.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StyleChange {
    /// Absolute pen position in twips.
    pub move_to: Option<(i32, i32)>,
    /// Fill style on the left of the edge (0 = none).
    pub fill_style0: Option<u32>,
    /// Fill style on the right of the edge (0 = none).
    pub fill_style1: Option<u32>,
    /// Line style (0 = none).
    pub line_style: Option<u32>,
}

impl StyleChange {
    /// Pure pen move.
    pub fn move_to(x: i32, y: i32) -> Self {
        Self {
            move_to: Some((x, y)),
            ..Self::default()
        }
    }
}

/// Fill style.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FillStyle {
    /// Flat color.
    Solid {
        /// Color.
        color: Rgba,
    },
    /// Linear gradient.
    LinearGradient {
        /// Gradient square to shape space, in twips.
        matrix: SwfMatrix,
        /// Gradient records.
        gradient: Gradient,
    },
    /// Focal radial gradient.
    RadialGradient {
        /// Gradient square to shape space, in twips.
        matrix: SwfMatrix,
        /// Gradient records.
        gradient: Gradient,
        /// Focal point in `[-1, 1]`.
        focal_point: f32,
    },
    /// Bitmap fill.
    Bitmap {
        /// Bitmap character.
        character: CharacterId,
        /// Bitmap to shape space, in twips.
        matrix: SwfMatrix,
        /// Tile (`true`) or clamp edges (`false`).
        repeating: bool,
        /// Smoothed sampling.
        smoothed: bool,
    },
}

/// Gradient definition shared by fills, strokes and gradient filters.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Gradient {
    /// Spread mode.
    pub spread: SpreadMethod,
    /// Interpolation mode.
    pub interpolation: InterpolationMethod,
    /// Gradient records in ratio order.
    pub records: Vec<GradRecord>,
}

/// A gradient stop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct GradRecord {
    /// Position along the gradient (`0..=255`).
    pub ratio: u8,
    /// Stop color.
    pub color: Rgba,
}

/// Line cap style.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum CapStyle {
    Round,
    None,
    Square,
}

/// Line join style.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum JoinStyle {
    Round,
    Bevel,
    Miter { limit: f32 },
}

/// Line paint: a flat color or a fill style (gradient strokes).
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LinePaint {
    /// Flat color.
    Solid {
        /// Color.
        color: Rgba,
    },
    /// Fill style applied along the stroke.
    Fill {
        /// Fill style.
        fill: FillStyle,
    },
}

/// Line style.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LineStyle {
    /// Width in twips.
    pub width: u16,
    /// Start cap.
    pub start_cap: CapStyle,
    /// End cap.
    pub end_cap: CapStyle,
    /// Join.
    pub join: JoinStyle,
    /// Keep width when scaled horizontally.
    pub no_hscale: bool,
    /// Keep width when scaled vertically.
    pub no_vscale: bool,
    /// Snap to whole pixels.
    pub pixel_hinting: bool,
    /// Paint.
    pub paint: LinePaint,
}

/// Surface filter.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum Filter {
    Bevel(BevelFilter),
    Blur(BlurFilter),
    ColorMatrix(ColorMatrixFilter),
    DropShadow(DropShadowFilter),
    Glow(GlowFilter),
    GradientBevel(GradientBevelFilter),
    GradientGlow(GradientGlowFilter),
}

/// Bevel filter record.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[allow(missing_docs)]
pub struct BevelFilter {
    pub shadow_color: Rgba,
    pub highlight_color: Rgba,
    /// Radians.
    pub angle: f32,
    pub blur_x: f32,
    pub blur_y: f32,
    pub distance: f32,
    pub strength: f32,
    pub inner_shadow: bool,
    pub knockout: bool,
    pub composite_source: bool,
    pub on_top: bool,
    pub passes: u8,
}

/// Blur filter record.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[allow(missing_docs)]
pub struct BlurFilter {
    pub blur_x: f32,
    pub blur_y: f32,
    pub passes: u8,
}

/// Color matrix filter record (row-major 4x5).
#[derive(Clone, Debug, PartialEq, Serialize)]
#[allow(missing_docs)]
pub struct ColorMatrixFilter {
    pub matrix: [f32; 20],
}

/// Drop shadow filter record.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[allow(missing_docs)]
pub struct DropShadowFilter {
    pub color: Rgba,
    /// Radians.
    pub angle: f32,
    pub blur_x: f32,
    pub blur_y: f32,
    pub distance: f32,
    pub strength: f32,
    pub inner_shadow: bool,
    pub knockout: bool,
    pub composite_source: bool,
    pub passes: u8,
}

/// Glow filter record.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[allow(missing_docs)]
pub struct GlowFilter {
    pub color: Rgba,
    pub blur_x: f32,
    pub blur_y: f32,
    pub strength: f32,
    pub inner_glow: bool,
    pub knockout: bool,
    pub composite_source: bool,
    pub passes: u8,
}

/// Gradient bevel filter record.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[allow(missing_docs)]
pub struct GradientBevelFilter {
    pub colors: Vec<Rgba>,
    pub ratios: Vec<u8>,
    /// Radians.
    pub angle: f32,
    pub blur_x: f32,
    pub blur_y: f32,
    pub distance: f32,
    pub strength: f32,
    pub inner_shadow: bool,
    pub knockout: bool,
    pub composite_source: bool,
    pub on_top: bool,
    pub passes: u8,
}

/// Gradient glow filter record.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[allow(missing_docs)]
pub struct GradientGlowFilter {
    pub colors: Vec<Rgba>,
    pub ratios: Vec<u8>,
    /// Radians.
    pub angle: f32,
    pub blur_x: f32,
    pub blur_y: f32,
    pub distance: f32,
    pub strength: f32,
    pub inner_glow: bool,
    pub knockout: bool,
    pub composite_source: bool,
    pub passes: u8,
}

#[cfg(test)]
#[path = "../../tests/unit/tags/model.rs"]
mod tests;
