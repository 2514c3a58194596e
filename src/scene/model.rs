//! Boundary scene model: the already-parsed FXG document object model.
//!
//! The transcoder treats this tree as immutable. It derives `Deserialize` so hosts (and
//! tests) can hand over a DOM as JSON; attribute names follow FXG in `snake_case`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::foundation::{
    core::{Affine, Color},
    error::{FxgError, FxgResult},
};

/// Location of a node in its source document, used when reporting problems.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcePos {
    /// Path of the FXG document, when known.
    #[serde(default)]
    pub document_path: Option<String>,
    /// 1-based start line (0 when unknown).
    #[serde(default)]
    pub line: u32,
    /// 1-based start column (0 when unknown).
    #[serde(default)]
    pub column: u32,
}

impl std::fmt::Display for SourcePos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.document_path.as_deref().unwrap_or("<fxg>"),
            self.line,
            self.column
        )
    }
}

/// FXG document version.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FxgVersion {
    /// FXG 1.0: bitmap behavior is driven by the boolean `repeat` attribute.
    #[serde(rename = "1.0")]
    V1_0,
    /// FXG 2.0: bitmap behavior is driven by `fill_mode`.
    #[default]
    #[serde(rename = "2.0")]
    V2_0,
}

/// Root `<Graphic>` element.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GraphicNode {
    /// Document version.
    #[serde(default)]
    pub version: FxgVersion,
    /// Source location.
    #[serde(default)]
    pub pos: SourcePos,
    /// Optional 9-slice scaling grid for the whole graphic.
    #[serde(default)]
    pub scaling_grid: Option<ScalingGridDef>,
    /// How the root mask (if any) is applied.
    #[serde(default)]
    pub mask_type: MaskType,
    /// Optional mask applied to all root content.
    #[serde(default)]
    pub mask: Option<Box<MaskNode>>,
    /// Named symbol definitions referenced by [`PlaceObjectNode`]s.
    #[serde(default)]
    pub library: BTreeMap<String, DefinitionNode>,
    /// Graphic content in document order.
    #[serde(default)]
    pub children: Vec<Node>,
}

impl GraphicNode {
    /// Parse a scene graph from its JSON boundary form.
    pub fn from_json_str(json: &str) -> FxgResult<Self> {
        serde_json::from_str(json).map_err(|e| FxgError::serde(format!("parse graphic json: {e}")))
    }
}

/// Library `<Definition>` element.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DefinitionNode {
    /// Source location.
    #[serde(default)]
    pub pos: SourcePos,
    /// The single required group child.
    #[serde(default)]
    pub group: Option<GroupDefinitionNode>,
}

/// The group inside a library definition. It has no transform or mask of its own.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GroupDefinitionNode {
    /// Optional 9-slice scaling grid for the symbol.
    #[serde(default)]
    pub scaling_grid: Option<ScalingGridDef>,
    /// Symbol content in document order.
    #[serde(default)]
    pub children: Vec<Node>,
}

/// Graphic content node.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    /// `<Group>` container.
    Group(GroupNode),
    /// `<Ellipse>`.
    Ellipse(EllipseNode),
    /// `<Line>`.
    Line(LineNode),
    /// `<Path>`.
    Path(PathNode),
    /// `<Rect>`.
    Rect(RectNode),
    /// `<BitmapImage>` / `<BitmapGraphic>`.
    BitmapGraphic(BitmapGraphicNode),
    /// `<TextGraphic>`; contributes no tags.
    Text(TextNode),
    /// `<RichText>`; contributes no tags.
    RichText(TextNode),
    /// Instance of a library definition.
    PlaceObject(PlaceObjectNode),
}

impl Node {
    /// Attributes shared by every graphic content node.
    pub fn attrs(&self) -> &ContentAttrs {
        match self {
            Node::Group(n) => &n.attrs,
            Node::Ellipse(n) => &n.attrs,
            Node::Line(n) => &n.attrs,
            Node::Path(n) => &n.attrs,
            Node::Rect(n) => &n.attrs,
            Node::BitmapGraphic(n) => &n.attrs,
            Node::Text(n) | Node::RichText(n) => &n.attrs,
            Node::PlaceObject(n) => &n.attrs,
        }
    }

    /// FXG element name, used in diagnostics.
    pub fn node_name(&self) -> &'static str {
        match self {
            Node::Group(_) => "Group",
            Node::Ellipse(_) => "Ellipse",
            Node::Line(_) => "Line",
            Node::Path(_) => "Path",
            Node::Rect(_) => "Rect",
            Node::BitmapGraphic(_) => "BitmapImage",
            Node::Text(_) => "TextGraphic",
            Node::RichText(_) => "RichText",
            Node::PlaceObject(_) => "PlaceObject",
        }
    }
}

/// Attributes and property children common to all graphic content.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentAttrs {
    /// Optional `id` attribute.
    pub id: Option<String>,
    /// Source location.
    pub pos: SourcePos,
    /// Visibility flag.
    pub visible: bool,
    /// Discrete transform attributes or an explicit matrix.
    #[serde(flatten)]
    pub transform: TransformDef,
    /// `alpha` attribute; `None` when not set on the element.
    pub alpha: Option<f64>,
    /// Explicit `<colorTransform>` child.
    pub color_transform: Option<ColorTransformDef>,
    /// Blend mode.
    pub blend_mode: BlendMode,
    /// `maskType` attribute; `None` when not set on the element.
    pub mask_type: Option<MaskType>,
    /// `<filters>` children in document order.
    pub filters: Vec<FilterDef>,
    /// `<mask>` child.
    pub mask: Option<Box<MaskNode>>,
}

impl Default for ContentAttrs {
    fn default() -> Self {
        Self {
            id: None,
            pos: SourcePos::default(),
            visible: true,
            transform: TransformDef::default(),
            alpha: None,
            color_transform: None,
            blend_mode: BlendMode::Auto,
            mask_type: None,
            filters: Vec::new(),
            mask: None,
        }
    }
}

/// `<Group>` element.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GroupNode {
    /// Common attributes.
    #[serde(flatten)]
    pub attrs: ContentAttrs,
    /// Optional 9-slice scaling grid.
    #[serde(default)]
    pub scaling_grid: Option<ScalingGridDef>,
    /// Children in document order.
    #[serde(default)]
    pub children: Vec<Node>,
}

/// Content of a `<mask>` property: a group or a library instance.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MaskNode {
    /// Group used as mask geometry.
    Group(GroupNode),
    /// Library symbol instance used as mask geometry.
    PlaceObject(PlaceObjectNode),
}

/// `<Ellipse>` element.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EllipseNode {
    /// Common attributes.
    #[serde(flatten)]
    pub attrs: ContentAttrs,
    /// Width in pixels.
    #[serde(default)]
    pub width: f64,
    /// Height in pixels.
    #[serde(default)]
    pub height: f64,
    /// Interior paint.
    #[serde(default)]
    pub fill: Option<FillDef>,
    /// Outline paint.
    #[serde(default)]
    pub stroke: Option<StrokeDef>,
}

/// `<Line>` element.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LineNode {
    /// Common attributes.
    #[serde(flatten)]
    pub attrs: ContentAttrs,
    /// Start x.
    #[serde(default)]
    pub x_from: f64,
    /// Start y.
    #[serde(default)]
    pub y_from: f64,
    /// End x.
    #[serde(default)]
    pub x_to: f64,
    /// End y.
    #[serde(default)]
    pub y_to: f64,
    /// Interior paint (a line has no interior, but FXG allows the property).
    #[serde(default)]
    pub fill: Option<FillDef>,
    /// Outline paint.
    #[serde(default)]
    pub stroke: Option<StrokeDef>,
}

/// Fill rule for paths.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Winding {
    /// Even-odd rule (FXG default).
    #[default]
    EvenOdd,
    /// Non-zero rule.
    NonZero,
}

/// `<Path>` element.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PathNode {
    /// Common attributes.
    #[serde(flatten)]
    pub attrs: ContentAttrs,
    /// Path data in SVG path syntax.
    #[serde(default)]
    pub data: String,
    /// Fill rule.
    #[serde(default)]
    pub winding: Winding,
    /// Interior paint.
    #[serde(default)]
    pub fill: Option<FillDef>,
    /// Outline paint.
    #[serde(default)]
    pub stroke: Option<StrokeDef>,
}

/// `<Rect>` element.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RectNode {
    /// Common attributes.
    #[serde(flatten)]
    pub attrs: ContentAttrs,
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
    /// Uniform horizontal corner radius.
    pub radius_x: f64,
    /// Uniform vertical corner radius.
    pub radius_y: f64,
    /// Per-corner overrides.
    pub top_left_radius_x: Option<f64>,
    /// Per-corner overrides.
    pub top_left_radius_y: Option<f64>,
    /// Per-corner overrides.
    pub top_right_radius_x: Option<f64>,
    /// Per-corner overrides.
    pub top_right_radius_y: Option<f64>,
    /// Per-corner overrides.
    pub bottom_left_radius_x: Option<f64>,
    /// Per-corner overrides.
    pub bottom_left_radius_y: Option<f64>,
    /// Per-corner overrides.
    pub bottom_right_radius_x: Option<f64>,
    /// Per-corner overrides.
    pub bottom_right_radius_y: Option<f64>,
    /// Interior paint.
    pub fill: Option<FillDef>,
    /// Outline paint.
    pub stroke: Option<StrokeDef>,
}

impl RectNode {
    /// Return `true` when any corner is rounded.
    pub fn has_rounded_corners(&self) -> bool {
        self.radius_x != 0.0
            || self.radius_y != 0.0
            || [
                self.top_left_radius_x,
                self.top_left_radius_y,
                self.top_right_radius_x,
                self.top_right_radius_y,
                self.bottom_left_radius_x,
                self.bottom_left_radius_y,
                self.bottom_right_radius_x,
                self.bottom_right_radius_y,
            ]
            .iter()
            .any(Option::is_some)
    }
}

/// How bitmap pixels cover their target area.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillMode {
    /// Stretch to the target size.
    #[default]
    Scale,
    /// Draw once at natural size; the rest is transparent.
    Clip,
    /// Tile.
    Repeat,
}

/// Effective bitmap fill mode for a document version.
///
/// FXG 1.0 only knows the boolean `repeat` (default `true`); FXG 2.0 uses `fill_mode`.
pub fn effective_fill_mode(
    version: FxgVersion,
    fill_mode: Option<FillMode>,
    repeat: Option<bool>,
) -> FillMode {
    match version {
        FxgVersion::V1_0 => {
            if repeat.unwrap_or(true) {
                FillMode::Repeat
            } else {
                FillMode::Clip
            }
        }
        FxgVersion::V2_0 => fill_mode.unwrap_or_default(),
    }
}

/// `<BitmapImage>` element.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BitmapGraphicNode {
    /// Common attributes.
    #[serde(flatten)]
    pub attrs: ContentAttrs,
    /// Bitmap locator, possibly in `@Embed('...')` form.
    pub source: Option<String>,
    /// Display width; defaults to the image width.
    pub width: Option<f64>,
    /// Display height; defaults to the image height.
    pub height: Option<f64>,
    /// FXG 2.0 fill mode.
    pub fill_mode: Option<FillMode>,
    /// FXG 1.0 repeat flag.
    pub repeat: Option<bool>,
}

/// `<TextGraphic>` / `<RichText>` element. Only the common attributes are modeled.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TextNode {
    /// Common attributes.
    #[serde(flatten)]
    pub attrs: ContentAttrs,
    /// Flattened text content.
    #[serde(default)]
    pub content: String,
}

/// Instance of a named library definition.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PlaceObjectNode {
    /// Common attributes.
    #[serde(flatten)]
    pub attrs: ContentAttrs,
    /// Definition name in the root library.
    pub name: String,
}

/// Discrete transform attributes, or an explicit `<matrix>` child.
///
/// A `None` field means the attribute was not written on the element.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformDef {
    /// Explicit matrix; wins over the discrete attributes.
    pub matrix: Option<MatrixDef>,
    /// `x` translation.
    pub x: Option<f64>,
    /// `y` translation.
    pub y: Option<f64>,
    /// Horizontal scale.
    pub scale_x: Option<f64>,
    /// Vertical scale.
    pub scale_y: Option<f64>,
    /// Clockwise rotation in degrees.
    pub rotation: Option<f64>,
}

/// Explicit 2x3 affine matrix, FXG/Flash layout.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatrixDef {
    /// x scale.
    pub a: f64,
    /// y skew.
    pub b: f64,
    /// x skew.
    pub c: f64,
    /// y scale.
    pub d: f64,
    /// x translation in pixels.
    pub tx: f64,
    /// y translation in pixels.
    pub ty: f64,
}

impl Default for MatrixDef {
    fn default() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            tx: 0.0,
            ty: 0.0,
        }
    }
}

impl MatrixDef {
    /// Pixel-space affine with the same coefficients.
    pub fn to_affine(&self) -> Affine {
        Affine::new([self.a, self.b, self.c, self.d, self.tx, self.ty])
    }
}

/// `<ColorTransform>` child.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorTransformDef {
    /// Red multiplier.
    pub red_multiplier: f64,
    /// Green multiplier.
    pub green_multiplier: f64,
    /// Blue multiplier.
    pub blue_multiplier: f64,
    /// Alpha multiplier.
    pub alpha_multiplier: f64,
    /// Red offset.
    pub red_offset: f64,
    /// Green offset.
    pub green_offset: f64,
    /// Blue offset.
    pub blue_offset: f64,
    /// Alpha offset.
    pub alpha_offset: f64,
}

impl Default for ColorTransformDef {
    fn default() -> Self {
        Self {
            red_multiplier: 1.0,
            green_multiplier: 1.0,
            blue_multiplier: 1.0,
            alpha_multiplier: 1.0,
            red_offset: 0.0,
            green_offset: 0.0,
            blue_offset: 0.0,
            alpha_offset: 0.0,
        }
    }
}

/// FXG blend modes, including the `auto` sentinel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    /// Resolved at transcode time (see `resolve_blend_mode`).
    #[default]
    Auto,
    #[allow(missing_docs)]
    Normal,
    #[allow(missing_docs)]
    Layer,
    #[allow(missing_docs)]
    Multiply,
    #[allow(missing_docs)]
    Screen,
    #[allow(missing_docs)]
    Lighten,
    #[allow(missing_docs)]
    Darken,
    #[allow(missing_docs)]
    Difference,
    #[allow(missing_docs)]
    Add,
    #[allow(missing_docs)]
    Subtract,
    #[allow(missing_docs)]
    Invert,
    #[allow(missing_docs)]
    Alpha,
    #[allow(missing_docs)]
    Erase,
    #[allow(missing_docs)]
    Overlay,
    #[allow(missing_docs)]
    Hardlight,
    #[allow(missing_docs)]
    Colordodge,
    #[allow(missing_docs)]
    Colorburn,
    #[allow(missing_docs)]
    Exclusion,
    #[allow(missing_docs)]
    Softlight,
    #[allow(missing_docs)]
    Hue,
    #[allow(missing_docs)]
    Saturation,
    #[allow(missing_docs)]
    Color,
    #[allow(missing_docs)]
    Luminosity,
}

/// How a mask is applied to its target.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaskType {
    /// Geometry-only clipping.
    #[default]
    Clip,
    /// Alpha-channel masking (requires bitmap caching).
    Alpha,
    /// Luminosity masking.
    Luminosity,
}

/// 9-slice scaling grid in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScalingGridDef {
    /// Left splitter.
    pub left: f64,
    /// Top splitter.
    pub top: f64,
    /// Right splitter.
    pub right: f64,
    /// Bottom splitter.
    pub bottom: f64,
}

/// Gradient spread behavior outside the `[0, 1]` ratio range.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpreadMethod {
    #[allow(missing_docs)]
    #[default]
    Pad,
    #[allow(missing_docs)]
    Reflect,
    #[allow(missing_docs)]
    Repeat,
}

/// Color space used for gradient interpolation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterpolationMethod {
    #[allow(missing_docs)]
    #[default]
    Rgb,
    #[allow(missing_docs)]
    LinearRgb,
}

/// `<GradientEntry>` child.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradientEntry {
    /// Entry color.
    pub color: Color,
    /// Entry alpha.
    pub alpha: f64,
    /// Position along the gradient in `[0, 1]`; interpolated when omitted.
    pub ratio: Option<f64>,
}

impl Default for GradientEntry {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            alpha: 1.0,
            ratio: None,
        }
    }
}

/// Linear gradient paint (used by fills and strokes).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinearGradientDef {
    /// Horizontal center of the gradient; defaults to the bounds center.
    pub x: Option<f64>,
    /// Vertical center of the gradient; defaults to the bounds center.
    pub y: Option<f64>,
    /// Gradient width in pixels; defaults to the bounds width.
    pub scale_x: Option<f64>,
    /// Clockwise rotation in degrees.
    pub rotation: f64,
    /// Explicit gradient matrix; wins over the discrete attributes.
    pub matrix: Option<MatrixDef>,
    /// Gradient entries in document order.
    pub entries: Vec<GradientEntry>,
    /// Spread method.
    pub spread_method: SpreadMethod,
    /// Interpolation method.
    pub interpolation_method: InterpolationMethod,
}

/// Radial gradient paint (used by fills and strokes).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadialGradientDef {
    /// Horizontal center; defaults to the bounds center.
    pub x: Option<f64>,
    /// Vertical center; defaults to the bounds center.
    pub y: Option<f64>,
    /// Horizontal diameter in pixels; defaults to the bounds width.
    pub scale_x: Option<f64>,
    /// Vertical diameter in pixels; defaults to the bounds height.
    pub scale_y: Option<f64>,
    /// Clockwise rotation in degrees.
    pub rotation: f64,
    /// Explicit gradient matrix; wins over the discrete attributes.
    pub matrix: Option<MatrixDef>,
    /// Focal point position along the gradient axis in `[-1, 1]`.
    pub focal_point_ratio: f64,
    /// Gradient entries in document order.
    pub entries: Vec<GradientEntry>,
    /// Spread method.
    pub spread_method: SpreadMethod,
    /// Interpolation method.
    pub interpolation_method: InterpolationMethod,
}

/// `<SolidColor>` paint.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolidColorDef {
    /// Color.
    pub color: Color,
    /// Alpha in `[0, 1]`.
    pub alpha: f64,
}

impl Default for SolidColorDef {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            alpha: 1.0,
        }
    }
}

/// `<BitmapFill>` paint.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BitmapFillDef {
    /// Source location of the fill element.
    pub pos: SourcePos,
    /// Bitmap locator, possibly in `@Embed('...')` form.
    pub source: Option<String>,
    /// FXG 2.0 fill mode.
    pub fill_mode: Option<FillMode>,
    /// FXG 1.0 repeat flag.
    pub repeat: Option<bool>,
    /// Horizontal offset of the bitmap origin.
    pub x: Option<f64>,
    /// Vertical offset of the bitmap origin.
    pub y: Option<f64>,
    /// Horizontal scale.
    pub scale_x: Option<f64>,
    /// Vertical scale.
    pub scale_y: Option<f64>,
    /// Clockwise rotation in degrees.
    pub rotation: Option<f64>,
    /// Explicit fill matrix; wins over the discrete attributes.
    pub matrix: Option<MatrixDef>,
}

impl BitmapFillDef {
    /// Return `true` when any fill transform attribute was written.
    pub fn has_explicit_transform(&self) -> bool {
        self.matrix.is_some()
            || self.x.is_some()
            || self.y.is_some()
            || self.scale_x.is_some()
            || self.scale_y.is_some()
            || self.rotation.is_some_and(|r| r.abs() >= 1e-5)
    }
}

/// Interior paint of a shape.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FillDef {
    /// Flat color.
    Solid(SolidColorDef),
    /// Linear gradient.
    LinearGradient(LinearGradientDef),
    /// Radial gradient.
    RadialGradient(RadialGradientDef),
    /// Bitmap.
    Bitmap(BitmapFillDef),
}

/// Outline paint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StrokePaint {
    /// Flat color.
    Solid(SolidColorDef),
    /// Linear gradient.
    LinearGradient(LinearGradientDef),
    /// Radial gradient.
    RadialGradient(RadialGradientDef),
}

/// Line cap style.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Caps {
    #[allow(missing_docs)]
    #[default]
    Round,
    #[allow(missing_docs)]
    None,
    #[allow(missing_docs)]
    Square,
}

/// Line joint style.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Joints {
    #[allow(missing_docs)]
    #[default]
    Round,
    #[allow(missing_docs)]
    Bevel,
    #[allow(missing_docs)]
    Miter,
}

/// Which axes of the stroke width follow the object's scale.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleMode {
    /// Scale in both directions.
    #[default]
    Normal,
    /// Scale only horizontally.
    Horizontal,
    /// Scale only vertically.
    Vertical,
    /// Never scale.
    None,
}

/// Stroke property of a shape.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StrokeDef {
    /// Paint.
    pub paint: StrokePaint,
    /// Line weight in pixels.
    #[serde(default = "default_weight")]
    pub weight: f64,
    /// Cap style.
    #[serde(default)]
    pub caps: Caps,
    /// Joint style.
    #[serde(default)]
    pub joints: Joints,
    /// Miter limit (only meaningful for miter joints).
    #[serde(default = "default_miter_limit")]
    pub miter_limit: f64,
    /// Pixel hinting flag.
    #[serde(default)]
    pub pixel_hinting: bool,
    /// Scale mode.
    #[serde(default)]
    pub scale_mode: ScaleMode,
}

fn default_weight() -> f64 {
    1.0
}

fn default_miter_limit() -> f64 {
    3.0
}

impl StrokeDef {
    /// Solid stroke with FXG defaults for everything but color and weight.
    pub fn solid(color: Color, weight: f64) -> Self {
        Self {
            paint: StrokePaint::Solid(SolidColorDef { color, alpha: 1.0 }),
            weight,
            caps: Caps::default(),
            joints: Joints::default(),
            miter_limit: default_miter_limit(),
            pixel_hinting: false,
            scale_mode: ScaleMode::default(),
        }
    }
}

/// Bevel placement.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BevelType {
    #[allow(missing_docs)]
    #[default]
    Inner,
    #[allow(missing_docs)]
    Outer,
    #[allow(missing_docs)]
    Full,
}

/// `<BevelFilter>`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct BevelFilterDef {
    pub angle: f64,
    pub blur_x: f64,
    pub blur_y: f64,
    pub distance: f64,
    pub highlight_alpha: f64,
    pub highlight_color: Color,
    pub knockout: bool,
    pub quality: u8,
    pub shadow_alpha: f64,
    pub shadow_color: Color,
    pub strength: f64,
    #[serde(rename = "type")]
    pub bevel_type: BevelType,
}

impl Default for BevelFilterDef {
    fn default() -> Self {
        Self {
            angle: 45.0,
            blur_x: 4.0,
            blur_y: 4.0,
            distance: 4.0,
            highlight_alpha: 1.0,
            highlight_color: Color::WHITE,
            knockout: false,
            quality: 1,
            shadow_alpha: 1.0,
            shadow_color: Color::BLACK,
            strength: 1.0,
            bevel_type: BevelType::Inner,
        }
    }
}

/// `<BlurFilter>`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct BlurFilterDef {
    pub blur_x: f64,
    pub blur_y: f64,
    pub quality: u8,
}

impl Default for BlurFilterDef {
    fn default() -> Self {
        Self {
            blur_x: 4.0,
            blur_y: 4.0,
            quality: 1,
        }
    }
}

/// `<ColorMatrixFilter>`: a row-major 4x5 matrix.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorMatrixFilterDef {
    /// 20 coefficients, row-major.
    pub matrix: [f32; 20],
}

impl Default for ColorMatrixFilterDef {
    fn default() -> Self {
        let mut matrix = [0.0; 20];
        for row in 0..4 {
            matrix[row * 5 + row] = 1.0;
        }
        Self { matrix }
    }
}

/// `<DropShadowFilter>`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct DropShadowFilterDef {
    pub alpha: f64,
    pub angle: f64,
    pub blur_x: f64,
    pub blur_y: f64,
    pub color: Color,
    pub distance: f64,
    pub hide_object: bool,
    pub inner: bool,
    pub knockout: bool,
    pub quality: u8,
    pub strength: f64,
}

impl Default for DropShadowFilterDef {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            angle: 45.0,
            blur_x: 4.0,
            blur_y: 4.0,
            color: Color::BLACK,
            distance: 4.0,
            hide_object: false,
            inner: false,
            knockout: false,
            quality: 1,
            strength: 1.0,
        }
    }
}

/// `<GlowFilter>`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct GlowFilterDef {
    pub alpha: f64,
    pub blur_x: f64,
    pub blur_y: f64,
    pub color: Color,
    pub inner: bool,
    pub knockout: bool,
    pub quality: u8,
    pub strength: f64,
}

impl Default for GlowFilterDef {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            blur_x: 4.0,
            blur_y: 4.0,
            color: Color(0xFF0000),
            inner: false,
            knockout: false,
            quality: 1,
            strength: 1.0,
        }
    }
}

/// `<GradientBevelFilter>`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct GradientBevelFilterDef {
    pub angle: f64,
    pub blur_x: f64,
    pub blur_y: f64,
    pub distance: f64,
    pub knockout: bool,
    pub quality: u8,
    pub strength: f64,
    #[serde(rename = "type")]
    pub bevel_type: BevelType,
    pub entries: Vec<GradientEntry>,
}

impl Default for GradientBevelFilterDef {
    fn default() -> Self {
        Self {
            angle: 45.0,
            blur_x: 4.0,
            blur_y: 4.0,
            distance: 4.0,
            knockout: false,
            quality: 1,
            strength: 1.0,
            bevel_type: BevelType::Inner,
            entries: Vec::new(),
        }
    }
}

/// `<GradientGlowFilter>`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct GradientGlowFilterDef {
    pub angle: f64,
    pub blur_x: f64,
    pub blur_y: f64,
    pub distance: f64,
    pub inner: bool,
    pub knockout: bool,
    pub quality: u8,
    pub strength: f64,
    pub entries: Vec<GradientEntry>,
}

impl Default for GradientGlowFilterDef {
    fn default() -> Self {
        Self {
            angle: 45.0,
            blur_x: 4.0,
            blur_y: 4.0,
            distance: 4.0,
            inner: false,
            knockout: false,
            quality: 1,
            strength: 1.0,
            entries: Vec::new(),
        }
    }
}

/// Filter property children.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum FilterDef {
    Bevel(BevelFilterDef),
    Blur(BlurFilterDef),
    ColorMatrix(ColorMatrixFilterDef),
    DropShadow(DropShadowFilterDef),
    Glow(GlowFilterDef),
    GradientBevel(GradientBevelFilterDef),
    GradientGlow(GradientGlowFilterDef),
}

#[cfg(test)]
#[path = "../../tests/unit/scene/model.rs"]
mod tests;
