//! `fxg_swf` transcodes FXG vector-graphics scene graphs into SWF display-list tag trees.
//!
//! The input is an already-parsed, immutable FXG document object model ([`GraphicNode`]).
//! The output is an in-memory tag tree ([`TranscodeOutput`]): a dictionary of sprites, shapes
//! and bitmaps, the root sprite, a scaling-grid side table and a list of recoverable problems.
//! Binary serialization of the tag tree is left to a downstream writer.
//!
//! # Pipeline overview
//!
//! 1. **Walk**: pre-order traversal of the scene graph with an explicit stack of sprites
//!    being populated.
//! 2. **Resolve**: per-node graphic context (transform, color transform, blend mode, filters,
//!    mask type, scaling grid) and fill/stroke/filter records.
//! 3. **Emulate**: masks, filter deferral, bitmap clipping and 9-slice scaling are rebuilt
//!    out of depth ordering, clip depths and helper sprites.
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Deterministic**: a given DOM and resolver always produce the same tag tree.
//! - **Recoverable content errors**: malformed content is reported as [`Problem`]s and elided;
//!   only broken internal invariants abort a transcode.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation {
    pub mod core;
    pub mod error;
    pub(crate) mod math;
}

mod assets {
    pub mod image;
    pub mod resolver;
}

mod scene {
    pub mod context;
    pub mod model;
}

mod tags {
    pub mod model;
    pub(crate) mod shape;
}

mod transcode {
    pub(crate) mod filters;
    pub mod opts;
    pub mod problems;
    pub(crate) mod styles;
    pub mod transcoder;
}

pub use assets::image::{
    BitmapData, BitmapDecoder, DecodedImage, ImageBitmapDecoder, MimeType, guess_mime_type,
    parse_source,
};
pub use assets::resolver::{
    FileResourceResolver, MemoryResourceResolver, ResourceResolver, resolve_rel_path,
};
pub use foundation::core::{
    Affine, BezPath, Color, Point, Rect, Rgba, TWIPS_LIMIT, TWIPS_PER_PIXEL, TwipsRect, Vec2,
    from_twips, to_twips,
};
pub use foundation::error::{FxgError, FxgResult};
pub use scene::context::{GraphicContext, resolve_blend_mode};
pub use scene::model::{
    BevelFilterDef, BevelType, BitmapFillDef, BitmapGraphicNode, BlendMode, BlurFilterDef, Caps,
    ColorMatrixFilterDef, ColorTransformDef, ContentAttrs, DefinitionNode, DropShadowFilterDef,
    EllipseNode, FillDef, FillMode, FilterDef, FxgVersion, GlowFilterDef, GradientBevelFilterDef,
    GradientEntry, GradientGlowFilterDef, GraphicNode, GroupDefinitionNode, GroupNode,
    InterpolationMethod, Joints, LineNode, LinearGradientDef, MaskNode, MaskType, MatrixDef, Node,
    PathNode, PlaceObjectNode, RadialGradientDef, RectNode, ScaleMode, ScalingGridDef,
    SolidColorDef, SourcePos, SpreadMethod, StrokeDef, StrokePaint, TextNode, TransformDef,
    Winding, effective_fill_mode,
};
pub use tags::model::{
    BevelFilter, BitmapCharacter, BlurFilter, CapStyle, Character, CharacterId,
    ColorMatrixFilter, ColorTransform, Dictionary, DropShadowFilter, FillStyle, Filter,
    GlowFilter, GradRecord, Gradient, GradientBevelFilter, GradientGlowFilter, JoinStyle,
    LinePaint, LineStyle, Placement, ScalingGrid, Shape, ShapeRecord, Sprite, StyleChange,
    SwfBlendMode, SwfMatrix,
};
pub use transcode::opts::TranscodeOpts;
pub use transcode::problems::Problem;
pub use transcode::transcoder::{FxgTranscoder, TranscodeOutput};
