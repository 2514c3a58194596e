//! Scene graph walk producing the sprite/shape tag tree.
//!
//! The walk is pre-order and keeps an explicit stack of the sprites being populated. Helper
//! sprites are pushed around masks, deferred filters and bitmap clips even while a single leaf
//! is being encoded, so the stack rather than the call stack decides where a placement lands.

use std::{
    borrow::Cow,
    collections::{BTreeMap, HashMap, HashSet},
    io::Read,
};

use anyhow::Context;
use serde::Serialize;

use crate::{
    assets::{
        image::{BitmapDecoder, DecodedImage, ImageBitmapDecoder, guess_mime_type, parse_source},
        resolver::ResourceResolver,
    },
    foundation::core::{Affine, BezPath, Color, Rgba, TwipsRect, Vec2, to_twips},
    foundation::error::{FxgError, FxgResult},
    foundation::math::round_fixed_16_16,
    scene::context::GraphicContext,
    scene::model::{
        BitmapFillDef, BitmapGraphicNode, ContentAttrs, FillDef, FillMode, FilterDef,
        GraphicNode, GroupDefinitionNode, GroupNode, MaskNode, MaskType, Node, PlaceObjectNode,
        RectNode, ScalingGridDef, SolidColorDef, SourcePos, StrokeDef, Winding,
        effective_fill_mode,
    },
    tags::model::{
        BitmapCharacter, Character, CharacterId, ColorTransform, Dictionary, FillStyle,
        Placement, ScalingGrid, Shape, ShapeRecord, Sprite, SwfBlendMode, SwfMatrix,
    },
    tags::shape::{self, CornerRadii},
    transcode::{filters, opts::TranscodeOpts, problems::Problem, styles},
};

/// Transcodes FXG scene graphs into tag trees.
///
/// A transcoder owns its collaborators but no per-transcode state: every call to
/// [`FxgTranscoder::transcode`] starts with fresh caches, so independent documents can be
/// transcoded by separate instances in parallel.
pub struct FxgTranscoder {
    opts: TranscodeOpts,
    resolver: Box<dyn ResourceResolver>,
    decoder: Box<dyn BitmapDecoder>,
}

impl FxgTranscoder {
    /// Transcoder reading bitmaps through `resolver` and decoding them with the `image` crate.
    pub fn new(resolver: impl ResourceResolver + 'static) -> Self {
        Self {
            opts: TranscodeOpts::default(),
            resolver: Box::new(resolver),
            decoder: Box::new(ImageBitmapDecoder),
        }
    }

    /// Replace the options.
    pub fn with_opts(mut self, opts: TranscodeOpts) -> Self {
        self.opts = opts;
        self
    }

    /// Replace the bitmap decoder.
    pub fn with_decoder(mut self, decoder: impl BitmapDecoder + 'static) -> Self {
        self.decoder = Box::new(decoder);
        self
    }

    /// Current options.
    pub fn opts(&self) -> &TranscodeOpts {
        &self.opts
    }

    /// Transcode a root graphic.
    ///
    /// Content problems (missing attributes, unreadable images, malformed definitions or path
    /// data) are collected in [`TranscodeOutput::problems`] and the offending node is elided.
    /// An `Err` means the transcode was aborted: invalid options, a reference to an unknown or
    /// recursive library definition, or a broken internal invariant.
    #[tracing::instrument(
        skip_all,
        fields(children = graphic.children.len(), definitions = graphic.library.len())
    )]
    pub fn transcode(&self, graphic: &GraphicNode) -> FxgResult<TranscodeOutput> {
        self.opts.validate()?;

        let mut shared = Shared::default();
        let root = Walker {
            env: self,
            graphic,
            shared: &mut shared,
            stack: Vec::new(),
        }
        .graphic()?;

        tracing::debug!(
            characters = shared.dictionary.len(),
            problems = shared.problems.len(),
            "transcode finished"
        );

        Ok(TranscodeOutput {
            root,
            dictionary: shared.dictionary,
            scaling_grids: shared.scaling_grids,
            definitions: shared.definitions,
            problems: shared.problems,
        })
    }

    fn load_image(&self, source: &str) -> FxgResult<DecodedImage> {
        let mime = guess_mime_type(source)
            .ok_or_else(|| FxgError::image(format!("unsupported MIME type for '{source}'")))?;

        let mut reader = self.resolver.open(source)?;
        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .with_context(|| format!("read image '{source}'"))?;

        self.decoder.decode(&bytes, mime)
    }
}

impl std::fmt::Debug for FxgTranscoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FxgTranscoder")
            .field("opts", &self.opts)
            .finish_non_exhaustive()
    }
}

/// Result of one transcode.
#[derive(Clone, Debug, Serialize)]
pub struct TranscodeOutput {
    /// Root sprite holding the graphic's content.
    pub root: CharacterId,
    /// Every character created during the transcode.
    pub dictionary: Dictionary,
    /// Scaling grids attached to sprites; the tag format has no inline field for them.
    pub scaling_grids: BTreeMap<CharacterId, ScalingGrid>,
    /// Library definitions that were instantiated, by name.
    pub definitions: BTreeMap<String, CharacterId>,
    /// Recoverable content problems in the order they were found.
    pub problems: Vec<Problem>,
}

impl TranscodeOutput {
    /// Root sprite.
    pub fn root_sprite(&self) -> Option<&Sprite> {
        self.dictionary.sprite(self.root)
    }

    /// Pretty-printed JSON form of the whole tag tree.
    pub fn to_json_pretty(&self) -> FxgResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| FxgError::serde(format!("serialize tag tree: {e}")))
    }
}

#[derive(Clone, Copy, Debug)]
struct ImageEntry {
    character: CharacterId,
    width: u32,
    height: u32,
}

/// State shared by the root walk and every definition sub-walk of one transcode.
#[derive(Default)]
struct Shared {
    dictionary: Dictionary,
    definitions: BTreeMap<String, CharacterId>,
    active_definitions: HashSet<String>,
    malformed_definitions: HashSet<String>,
    images: HashMap<String, ImageEntry>,
    depths: HashMap<CharacterId, i32>,
    scaling_grids: BTreeMap<CharacterId, ScalingGrid>,
    problems: Vec<Problem>,
}

/// Attributes a node inherits from where it sits in the tree.
#[derive(Clone, Copy, Debug, Default)]
struct Scope {
    scaling_grid: Option<ScalingGridDef>,
    /// Inside the content of a clip mask: paint is irrelevant, only geometry counts.
    in_clip_mask: bool,
    /// Mask type of the masked node, set only when visiting its mask.
    mask_type: Option<MaskType>,
    /// The parent group took over this node's filters.
    strip_filters: bool,
}

#[derive(Clone, Copy, Debug)]
enum MaskTarget {
    /// Graphic or group; its children follow the mask in the same sprite.
    Container { children: usize },
    /// Leaf shape with its resolved transform.
    Leaf { transform: Affine },
}

/// Helper sprite wrapping a masked leaf.
struct MaskHelper {
    /// Filters taken from the leaf, applied to the helper's placement.
    filters: Vec<FilterDef>,
    /// Placements in the helper once the mask is in.
    placed_before: usize,
}

/// Outline geometry plus the paint a shape node declares.
struct Outline<'n> {
    attrs: &'n ContentAttrs,
    node_name: &'static str,
    records: Vec<ShapeRecord>,
    fill: Option<&'n FillDef>,
    stroke: Option<&'n StrokeDef>,
    winding: Option<Winding>,
}

struct Walker<'a> {
    env: &'a FxgTranscoder,
    graphic: &'a GraphicNode,
    shared: &'a mut Shared,
    stack: Vec<CharacterId>,
}

impl Walker<'_> {
    fn graphic(mut self) -> FxgResult<CharacterId> {
        let graphic = self.graphic;
        let sprite = self.new_sprite("Graphic")?;
        self.stack.push(sprite);

        let scope = Scope {
            scaling_grid: graphic.scaling_grid,
            ..Scope::default()
        };

        if let Some(mask) = &graphic.mask {
            let target = MaskTarget::Container {
                children: graphic.children.len(),
            };
            self.mask(target, mask, graphic.mask_type, scope)?;
        }
        self.register_scaling_grid(sprite, graphic.scaling_grid);

        for child in &graphic.children {
            self.node(child, scope)?;
        }

        self.pop()?;
        if !self.stack.is_empty() {
            return Err(FxgError::invariant(format!(
                "{} sprite(s) left on the container stack",
                self.stack.len()
            )));
        }
        Ok(sprite)
    }

    fn node(&mut self, node: &Node, scope: Scope) -> FxgResult<()> {
        if let Node::Group(group) = node {
            return self.group(group, scope, Affine::IDENTITY);
        }

        let attrs = node.attrs();
        let mut ctx = GraphicContext::for_node(attrs, false, scope.scaling_grid, scope.mask_type);
        if scope.strip_filters {
            ctx.filters.clear();
        }

        // A masked leaf and its mask share a helper sprite so the pair takes a single depth in
        // the parent. Masks must resolve before filters, so the leaf's filters move onto it.
        let mut helper = None;
        if let Some(mask) = &attrs.mask {
            let filters = ctx.take_filters();
            let label = if filters.is_empty() { "MaskedLeaf" } else { "MaskFilter" };
            self.push_sprite(label)?;
            let target = MaskTarget::Leaf {
                transform: ctx.transform,
            };
            self.mask(target, mask, ctx.mask_type, scope)?;
            helper = Some(MaskHelper {
                filters,
                placed_before: self.placement_count()?,
            });
        }

        let tolerance = self.env.opts.curve_tolerance_px;
        match node {
            Node::Group(_) => {}
            Node::Ellipse(n) => {
                let outline = Outline {
                    attrs,
                    node_name: node.node_name(),
                    records: shape::ellipse(n.width, n.height, tolerance),
                    fill: n.fill.as_ref(),
                    stroke: n.stroke.as_ref(),
                    winding: None,
                };
                self.outline(outline, &ctx, scope)?;
            }
            Node::Line(n) => {
                let outline = Outline {
                    attrs,
                    node_name: node.node_name(),
                    records: shape::line(n.x_from, n.y_from, n.x_to, n.y_to),
                    fill: n.fill.as_ref(),
                    stroke: n.stroke.as_ref(),
                    winding: None,
                };
                self.outline(outline, &ctx, scope)?;
            }
            Node::Path(n) => {
                let path = if n.data.trim().is_empty() {
                    BezPath::new()
                } else {
                    match BezPath::from_svg(&n.data) {
                        Ok(path) => path,
                        Err(e) => {
                            self.problem(Problem::InvalidPathData {
                                pos: attrs.pos.clone(),
                                message: e.to_string(),
                            });
                            return self.finish_masked_leaf(helper);
                        }
                    }
                };
                let outline = Outline {
                    attrs,
                    node_name: node.node_name(),
                    records: shape::path_records(&path, tolerance),
                    fill: n.fill.as_ref(),
                    stroke: n.stroke.as_ref(),
                    winding: Some(n.winding),
                };
                self.outline(outline, &ctx, scope)?;
            }
            Node::Rect(n) => {
                let outline = Outline {
                    attrs,
                    node_name: node.node_name(),
                    records: rect_records(n, tolerance),
                    fill: n.fill.as_ref(),
                    stroke: n.stroke.as_ref(),
                    winding: None,
                };
                self.outline(outline, &ctx, scope)?;
            }
            Node::BitmapGraphic(n) => self.bitmap(n, &ctx, scope)?,
            Node::PlaceObject(n) => self.place_object(n, &ctx)?,
            Node::Text(_) | Node::RichText(_) => {
                tracing::debug!(node = node.node_name(), "text content contributes no tags");
            }
        }

        self.finish_masked_leaf(helper)
    }

    /// Pop the helper of a masked leaf and place it. A leaf that placed nothing takes its mask
    /// with it; the helper then stays unplaced.
    fn finish_masked_leaf(&mut self, helper: Option<MaskHelper>) -> FxgResult<()> {
        let Some(MaskHelper {
            filters,
            placed_before,
        }) = helper
        else {
            return Ok(());
        };
        let sprite = self.pop()?;
        if self.sprite_mut(sprite)?.placements.len() == placed_before {
            tracing::debug!(sprite = sprite.0, "masked leaf placed nothing, mask dropped");
            return Ok(());
        }
        self.place(sprite, &GraphicContext::with_filters(filters))?;
        Ok(())
    }

    /// Pop a filter helper sprite pushed for `deferred` and place it with those filters.
    fn finish_deferred(&mut self, deferred: Vec<FilterDef>) -> FxgResult<()> {
        if deferred.is_empty() {
            return Ok(());
        }
        let helper = self.pop()?;
        self.place(helper, &GraphicContext::with_filters(deferred))?;
        Ok(())
    }

    /// Encode a group. `outer` is prepended to the group transform (used for masks of leaves).
    fn group(&mut self, group: &GroupNode, scope: Scope, outer: Affine) -> FxgResult<()> {
        let mut ctx =
            GraphicContext::for_node(&group.attrs, true, scope.scaling_grid, scope.mask_type);
        ctx.transform = outer * ctx.transform;
        if scope.strip_filters {
            ctx.filters.clear();
        }

        let mut strip_children = false;
        let deferred = match &group.attrs.mask {
            Some(_) if !ctx.filters.is_empty() => ctx.take_filters(),
            Some(_) => match shared_child_filters(&group.children) {
                Some(filters) => {
                    strip_children = true;
                    filters.to_vec()
                }
                None => Vec::new(),
            },
            None => Vec::new(),
        };

        let sprite = self.new_sprite("Group")?;
        self.register_scaling_grid(sprite, group.scaling_grid);
        self.place(sprite, &ctx)?;
        self.stack.push(sprite);

        let child_scope = Scope {
            scaling_grid: group.scaling_grid.or(scope.scaling_grid),
            in_clip_mask: scope.in_clip_mask,
            mask_type: None,
            strip_filters: strip_children,
        };

        if let Some(mask) = &group.attrs.mask {
            if !deferred.is_empty() {
                self.push_sprite("MaskFilter")?;
            }
            let target = MaskTarget::Container {
                children: group.children.len(),
            };
            let mask_scope = Scope {
                strip_filters: false,
                ..child_scope
            };
            self.mask(target, mask, ctx.mask_type, mask_scope)?;
        }

        for child in &group.children {
            self.node(child, child_scope)?;
        }

        self.finish_deferred(deferred)?;
        self.pop()?;
        Ok(())
    }

    /// Encode `mask` in the current sprite and turn its placement into a clipping layer over
    /// the content that follows.
    fn mask(
        &mut self,
        target: MaskTarget,
        mask: &MaskNode,
        mask_type: MaskType,
        scope: Scope,
    ) -> FxgResult<()> {
        let parent = self.peek()?;
        let placed_before = self.sprite_mut(parent)?.placements.len();

        match mask {
            MaskNode::Group(group) => {
                // A mask shares its group's coordinate space; a leaf's own transform has to be
                // carried over explicitly.
                let outer = match target {
                    MaskTarget::Container { .. } => Affine::IDENTITY,
                    MaskTarget::Leaf { transform } => transform,
                };
                let mask_scope = Scope {
                    scaling_grid: scope.scaling_grid,
                    in_clip_mask: scope.in_clip_mask || mask_type == MaskType::Clip,
                    mask_type: Some(mask_type),
                    strip_filters: false,
                };
                self.group(group, mask_scope, outer)?;
            }
            MaskNode::PlaceObject(instance) => {
                let ctx = GraphicContext::for_node(
                    &instance.attrs,
                    false,
                    scope.scaling_grid,
                    Some(mask_type),
                );
                self.place_object(instance, &ctx)?;
            }
        }

        let k = match target {
            MaskTarget::Container { children } => children.max(1),
            MaskTarget::Leaf { .. } => 1,
        };
        let k = i32::try_from(k).map_err(|_| FxgError::invariant("mask covers too many children"))?;

        let sprite = self.sprite_mut(parent)?;
        if sprite.placements.len() == placed_before {
            tracing::debug!("mask contributed no placement");
            return Ok(());
        }
        let Some(placement) = sprite.placements.last_mut() else {
            return Err(FxgError::invariant("mask placement vanished"));
        };
        placement.clip_depth = Some(placement.depth + k);
        if mask_type == MaskType::Alpha {
            placement.cache_as_bitmap = true;
        }
        tracing::debug!(
            depth = placement.depth,
            clip_depth = placement.depth + k,
            "mask placed"
        );
        Ok(())
    }

    fn place_object(&mut self, instance: &PlaceObjectNode, ctx: &GraphicContext) -> FxgResult<()> {
        if let Some(sprite) = self.definition(&instance.name)? {
            self.place(sprite, ctx)?;
        }
        Ok(())
    }

    /// Sprite for a library definition, transcoding it on first use.
    ///
    /// `None` when the definition is malformed; the problem is reported once per name.
    fn definition(&mut self, name: &str) -> FxgResult<Option<CharacterId>> {
        if let Some(&sprite) = self.shared.definitions.get(name) {
            if self.shared.active_definitions.contains(name) {
                return Err(FxgError::validation(format!(
                    "library definition '{name}' places itself"
                )));
            }
            return Ok(Some(sprite));
        }
        if self.shared.malformed_definitions.contains(name) {
            return Ok(None);
        }

        let graphic = self.graphic;
        let def = graphic.library.get(name).ok_or_else(|| {
            FxgError::validation(format!("no library definition named '{name}'"))
        })?;
        let Some(group) = &def.group else {
            self.shared.malformed_definitions.insert(name.to_owned());
            self.problem(Problem::MissingRequiredChild {
                pos: def.pos.clone(),
            });
            return Ok(None);
        };

        let sprite = self.new_sprite("Definition")?;
        self.shared.definitions.insert(name.to_owned(), sprite);
        self.shared.active_definitions.insert(name.to_owned());

        Walker {
            env: self.env,
            graphic,
            shared: &mut *self.shared,
            stack: Vec::new(),
        }
        .definition_body(name, group, sprite)?;

        self.shared.active_definitions.remove(name);
        Ok(Some(sprite))
    }

    #[tracing::instrument(skip(self, group, sprite))]
    fn definition_body(
        mut self,
        name: &str,
        group: &GroupDefinitionNode,
        sprite: CharacterId,
    ) -> FxgResult<()> {
        self.stack.push(sprite);
        self.register_scaling_grid(sprite, group.scaling_grid);

        let scope = Scope {
            scaling_grid: group.scaling_grid,
            ..Scope::default()
        };
        for child in &group.children {
            self.node(child, scope)?;
        }

        self.pop()?;
        Ok(())
    }

    fn outline(&mut self, outline: Outline<'_>, ctx: &GraphicContext, scope: Scope) -> FxgResult<()> {
        let (fill, stroke): (Option<Cow<'_, FillDef>>, Option<&StrokeDef>) =
            if !outline.attrs.visible {
                (None, None)
            } else if scope.in_clip_mask {
                let solid = FillDef::Solid(SolidColorDef {
                    color: Color::BLACK,
                    alpha: 1.0,
                });
                (outline.fill.map(|_| Cow::Owned(solid)), None)
            } else {
                (outline.fill.map(Cow::Borrowed), outline.stroke)
            };

        if let Some(FillDef::Bitmap(bitmap)) = fill.as_deref()
            && self.is_bitmap_fill_with_clip(bitmap)
        {
            let Outline {
                attrs,
                node_name,
                records,
                winding,
                ..
            } = outline;
            return self.bitmap_fill_with_clip(
                attrs, node_name, records, bitmap, stroke, winding, ctx,
            );
        }

        let shape = self.define_shape(outline.records, fill.as_deref(), stroke, outline.winding)?;
        let id = self.shared.dictionary.insert(Character::Shape(shape))?;
        self.place(id, ctx)?;
        Ok(())
    }

    fn define_shape(
        &mut self,
        mut records: Vec<ShapeRecord>,
        fill: Option<&FillDef>,
        stroke: Option<&StrokeDef>,
        winding: Option<Winding>,
    ) -> FxgResult<Shape> {
        let edge_bounds = shape::bounds(&records, None);

        let mut fill_styles = Vec::new();
        if let Some(fill) = fill
            && let Some(style) = self.fill_style(fill, edge_bounds)?
        {
            fill_styles.push(style);
        }

        let (line_styles, shape_bounds) = match stroke {
            Some(stroke) => {
                let width = styles::line_width_twips(stroke);
                let shape_bounds = shape::bounds(&records, Some(width));
                (vec![styles::line_style(stroke, shape_bounds)], shape_bounds)
            }
            None => (Vec::new(), edge_bounds),
        };

        shape::set_styles(
            &mut records,
            u32::from(!line_styles.is_empty()),
            u32::from(!fill_styles.is_empty()),
            0,
            winding == Some(Winding::EvenOdd),
        );

        Ok(Shape {
            uses_nonzero_winding: fill.is_some() && winding == Some(Winding::NonZero),
            fill_styles,
            line_styles,
            edge_bounds,
            shape_bounds,
            records,
        })
    }

    fn fill_style(&mut self, fill: &FillDef, bounds: TwipsRect) -> FxgResult<Option<FillStyle>> {
        Ok(match fill {
            FillDef::Solid(solid) => Some(styles::solid_fill(solid)),
            FillDef::LinearGradient(g) => Some(styles::linear_gradient_fill(g, bounds)),
            FillDef::RadialGradient(g) => Some(styles::radial_gradient_fill(g, bounds)),
            FillDef::Bitmap(bitmap) => {
                let Some(source) = parse_source(bitmap.source.as_deref()) else {
                    self.problem(Problem::MissingAttribute {
                        pos: bitmap.pos.clone(),
                        attribute: "source",
                        node: "BitmapFill",
                    });
                    return Ok(None);
                };
                let Some(image) = self.image(&bitmap.pos, &source)? else {
                    return Ok(None);
                };
                let mode = self.fill_mode(bitmap.fill_mode, bitmap.repeat);
                let transform = styles::bitmap_fill_affine(
                    bitmap,
                    mode,
                    (image.width, image.height),
                    bounds,
                );
                Some(styles::bitmap_fill(
                    image.character,
                    transform,
                    mode == FillMode::Repeat,
                ))
            }
        })
    }

    fn fill_mode(&self, fill_mode: Option<FillMode>, repeat: Option<bool>) -> FillMode {
        effective_fill_mode(self.graphic.version, fill_mode, repeat)
    }

    /// Return `true` when a bitmap fill must be truncated to the image area explicitly.
    fn is_bitmap_fill_with_clip(&self, bitmap: &BitmapFillDef) -> bool {
        match self.fill_mode(bitmap.fill_mode, bitmap.repeat) {
            FillMode::Repeat => false,
            FillMode::Clip => true,
            FillMode::Scale => bitmap.has_explicit_transform(),
        }
    }

    /// Shape with a non-repeating bitmap fill: the fill is clipped to the image area by a
    /// helper sprite, and the stroke is drawn unclipped on top.
    #[allow(clippy::too_many_arguments)]
    fn bitmap_fill_with_clip(
        &mut self,
        attrs: &ContentAttrs,
        node_name: &'static str,
        records: Vec<ShapeRecord>,
        bitmap: &BitmapFillDef,
        stroke: Option<&StrokeDef>,
        winding: Option<Winding>,
        ctx: &GraphicContext,
    ) -> FxgResult<()> {
        let edge_bounds = shape::bounds(&records, None);

        let Some(source) = parse_source(bitmap.source.as_deref()) else {
            self.problem(Problem::MissingAttribute {
                pos: attrs.pos.clone(),
                attribute: "source",
                node: node_name,
            });
            return Ok(());
        };
        let Some(image) = self.image(&bitmap.pos, &source)? else {
            return Ok(());
        };

        let mut ctx = ctx.clone();
        let deferred = ctx.take_filters();
        if !deferred.is_empty() {
            self.push_sprite("MaskFilter")?;
        }

        let fill_sprite = self.push_sprite("BitmapFill")?;
        let clip_sprite = self.push_sprite("BitmapFill_Clip")?;

        let mode = self.fill_mode(bitmap.fill_mode, bitmap.repeat);
        let fill_transform =
            styles::bitmap_fill_affine(bitmap, mode, (image.width, image.height), edge_bounds);

        let clip = solid_rect(f64::from(image.width), f64::from(image.height));
        let clip_id = self.shared.dictionary.insert(Character::Shape(clip))?;
        self.place(clip_id, &GraphicContext::with_transform(fill_transform))?;
        self.pop()?;

        let placed = self.place(clip_sprite, &GraphicContext::with_transform(ctx.transform))?;
        placed.clip_depth = Some(placed.depth + 1);

        let every_subpath = winding == Some(Winding::EvenOdd);

        let mut fill_records = records.clone();
        shape::set_styles(&mut fill_records, 0, 1, 0, every_subpath);
        let fill_shape = Shape {
            fill_styles: vec![styles::bitmap_fill(
                image.character,
                fill_transform,
                mode == FillMode::Repeat,
            )],
            line_styles: Vec::new(),
            edge_bounds,
            shape_bounds: edge_bounds,
            records: fill_records,
            uses_nonzero_winding: winding == Some(Winding::NonZero),
        };
        let fill_id = self.shared.dictionary.insert(Character::Shape(fill_shape))?;
        self.place(fill_id, &ctx)?;

        if let Some(stroke) = stroke {
            let shape_bounds = shape::bounds(&records, Some(styles::line_width_twips(stroke)));
            let mut stroke_records = records;
            shape::set_styles(&mut stroke_records, 1, 0, 0, every_subpath);
            let stroke_shape = Shape {
                fill_styles: Vec::new(),
                line_styles: vec![styles::line_style(stroke, shape_bounds)],
                edge_bounds,
                shape_bounds,
                records: stroke_records,
                uses_nonzero_winding: false,
            };
            let stroke_id = self.shared.dictionary.insert(Character::Shape(stroke_shape))?;
            self.place(stroke_id, &ctx)?;
        }

        self.pop()?;
        self.place(fill_sprite, &GraphicContext::default())?;
        self.finish_deferred(deferred)
    }

    fn bitmap(
        &mut self,
        node: &BitmapGraphicNode,
        ctx: &GraphicContext,
        scope: Scope,
    ) -> FxgResult<()> {
        let Some(source) = parse_source(node.source.as_deref()) else {
            self.problem(Problem::MissingAttribute {
                pos: node.attrs.pos.clone(),
                attribute: "source",
                node: "BitmapImage",
            });
            return Ok(());
        };
        let Some(image) = self.image(&node.attrs.pos, &source)? else {
            return Ok(());
        };

        let mode = self.fill_mode(node.fill_mode, node.repeat);
        let image_size = (f64::from(image.width), f64::from(image.height));
        let node_size = (
            node.width.unwrap_or(image_size.0),
            node.height.unwrap_or(image_size.1),
        );
        let clip_size = (
            image_size.0.min(node_size.0),
            image_size.1.min(node_size.1),
        );
        let needs_clip = bitmap_needs_clipping(mode, image_size, node_size);

        if !node.attrs.visible || scope.in_clip_mask {
            let (w, h) = if needs_clip { clip_size } else { node_size };
            let id = self
                .shared
                .dictionary
                .insert(Character::Shape(solid_rect(w, h)))?;
            self.place(id, ctx)?;
            return Ok(());
        }

        if let Some(grid) = ctx.scaling_grid {
            let id = self
                .shared
                .dictionary
                .insert(Character::Shape(nine_slice_shape(image, grid)))?;
            self.place(id, ctx)?;
            return Ok(());
        }

        if !needs_clip {
            let id = self
                .shared
                .dictionary
                .insert(Character::Shape(image_shape(image, mode, node_size)))?;
            self.place(id, ctx)?;
            return Ok(());
        }

        let mut ctx = ctx.clone();
        let deferred = ctx.take_filters();
        if !deferred.is_empty() {
            self.push_sprite("MaskFilter")?;
        }

        let graphic_sprite = self.push_sprite("BitmapGraphic")?;
        let clip_sprite = self.push_sprite("BitmapGraphic_Clip")?;
        let clip_id = self
            .shared
            .dictionary
            .insert(Character::Shape(solid_rect(clip_size.0, clip_size.1)))?;
        self.place(clip_id, &GraphicContext::default())?;
        self.pop()?;

        let placed = self.place(clip_sprite, &ctx)?;
        placed.clip_depth = Some(placed.depth + 1);

        let image_id = self
            .shared
            .dictionary
            .insert(Character::Shape(image_shape(image, mode, node_size)))?;
        self.place(image_id, &ctx)?;
        self.pop()?;

        self.place(graphic_sprite, &GraphicContext::default())?;
        self.finish_deferred(deferred)
    }

    /// Bitmap character for `source`, embedding it on first use.
    ///
    /// Failures are reported as problems and are not cached, so every node referencing a
    /// broken source reports it.
    fn image(&mut self, pos: &SourcePos, source: &str) -> FxgResult<Option<ImageEntry>> {
        if let Some(entry) = self.shared.images.get(source) {
            return Ok(Some(*entry));
        }

        let decoded = match self.env.load_image(source) {
            Ok(decoded) => decoded,
            Err(e) => {
                self.problem(Problem::ImageEmbedding {
                    pos: pos.clone(),
                    message: e.to_string(),
                    source_name: source.to_owned(),
                });
                return Ok(None);
            }
        };

        let character = self
            .shared
            .dictionary
            .insert(Character::Bitmap(BitmapCharacter {
                width: decoded.width,
                height: decoded.height,
                data: decoded.data,
            }))?;
        let entry = ImageEntry {
            character,
            width: decoded.width,
            height: decoded.height,
        };
        self.shared.images.insert(source.to_owned(), entry);
        tracing::debug!(source, width = entry.width, height = entry.height, "image embedded");
        Ok(Some(entry))
    }

    fn register_scaling_grid(&mut self, sprite: CharacterId, grid: Option<ScalingGridDef>) {
        if let Some(grid) = grid {
            self.shared.scaling_grids.insert(
                sprite,
                ScalingGrid {
                    character: sprite,
                    splitter: TwipsRect::from_edges_px(grid.left, grid.top, grid.right, grid.bottom),
                },
            );
        }
    }

    fn problem(&mut self, problem: Problem) {
        tracing::warn!(%problem, "content problem");
        self.shared.problems.push(problem);
    }

    fn new_sprite(&mut self, label: &'static str) -> FxgResult<CharacterId> {
        let id = self
            .shared
            .dictionary
            .insert(Character::Sprite(Sprite::new(label)))?;
        self.shared.depths.insert(id, 0);
        Ok(id)
    }

    /// Create a helper sprite and make it the current container.
    fn push_sprite(&mut self, label: &'static str) -> FxgResult<CharacterId> {
        let id = self.new_sprite(label)?;
        tracing::debug!(label, id = id.0, "helper sprite");
        self.stack.push(id);
        Ok(id)
    }

    fn peek(&self) -> FxgResult<CharacterId> {
        self.stack
            .last()
            .copied()
            .ok_or_else(|| FxgError::invariant("container stack is empty"))
    }

    fn pop(&mut self) -> FxgResult<CharacterId> {
        self.stack
            .pop()
            .ok_or_else(|| FxgError::invariant("pop from an empty container stack"))
    }

    fn placement_count(&mut self) -> FxgResult<usize> {
        let current = self.peek()?;
        Ok(self.sprite_mut(current)?.placements.len())
    }

    fn sprite_mut(&mut self, id: CharacterId) -> FxgResult<&mut Sprite> {
        self.shared
            .dictionary
            .sprite_mut(id)
            .ok_or_else(|| FxgError::invariant(format!("character {} is not a sprite", id.0)))
    }

    /// Append a placement of `character` at the next free depth of the current sprite.
    fn place(&mut self, character: CharacterId, ctx: &GraphicContext) -> FxgResult<&mut Placement> {
        let parent = self.peek()?;
        if parent == character {
            return Err(FxgError::invariant(format!(
                "sprite {} placed into itself",
                parent.0
            )));
        }

        let depth = self.shared.depths.get(&parent).copied().unwrap_or_default() + 1;
        self.shared.depths.insert(parent, depth);

        let placement = Placement {
            character,
            depth,
            matrix: SwfMatrix::from_affine(ctx.transform),
            color_transform: ctx.color_transform.as_ref().map(ColorTransform::from_def),
            blend_mode: ctx.blend_mode.and_then(SwfBlendMode::from_fxg),
            filters: filters::filters(&ctx.filters),
            clip_depth: None,
            cache_as_bitmap: ctx.mask_type == MaskType::Alpha,
        };

        let sprite = self.sprite_mut(parent)?;
        if depth <= sprite.last_depth() {
            return Err(FxgError::invariant(format!(
                "depth {depth} already used in sprite {}",
                parent.0
            )));
        }
        sprite.placements.push(placement);
        let idx = sprite.placements.len() - 1;
        Ok(&mut sprite.placements[idx])
    }
}

/// Filters every child carries identically, if there are any.
fn shared_child_filters(children: &[Node]) -> Option<&[FilterDef]> {
    let (first, rest) = children.split_first()?;
    let filters = &first.attrs().filters;
    (!filters.is_empty() && rest.iter().all(|c| c.attrs().filters == *filters))
        .then_some(filters.as_slice())
}

/// A bitmap graphic needs an explicit clip when the image is larger than the node, or when a
/// clipped image is smaller than the node (the target format bleeds edge pixels otherwise).
fn bitmap_needs_clipping(mode: FillMode, image: (f64, f64), node: (f64, f64)) -> bool {
    let larger = image.0 > node.0 || image.1 > node.1;
    let smaller = image.0 < node.0 || image.1 < node.1;
    larger || (mode == FillMode::Clip && smaller)
}

fn rect_records(node: &RectNode, tolerance: f64) -> Vec<ShapeRecord> {
    if !node.has_rounded_corners() {
        return shape::rectangle(node.width, node.height);
    }
    let corner = |x: Option<f64>, y: Option<f64>| {
        Vec2::new(x.unwrap_or(node.radius_x), y.unwrap_or(node.radius_y))
    };
    let radii = CornerRadii {
        top_left: corner(node.top_left_radius_x, node.top_left_radius_y),
        top_right: corner(node.top_right_radius_x, node.top_right_radius_y),
        bottom_right: corner(node.bottom_right_radius_x, node.bottom_right_radius_y),
        bottom_left: corner(node.bottom_left_radius_x, node.bottom_left_radius_y),
    };
    shape::rounded_rectangle(node.width, node.height, radii, tolerance)
}

/// Opaque black rectangle from the origin, used for clip geometry and hidden bitmaps.
fn solid_rect(width: f64, height: f64) -> Shape {
    let mut records = shape::rectangle(width, height);
    shape::set_styles(&mut records, 0, 1, 0, false);
    let bounds = shape::bounds(&records, None);
    Shape {
        fill_styles: vec![FillStyle::Solid {
            color: Rgba::opaque_black(),
        }],
        line_styles: Vec::new(),
        edge_bounds: bounds,
        shape_bounds: bounds,
        records,
        uses_nonzero_winding: false,
    }
}

/// Rectangle of `size` pixels filled with the image.
fn image_shape(image: ImageEntry, mode: FillMode, size: (f64, f64)) -> Shape {
    let (width, height) = size;
    let (matrix, repeating) = match mode {
        FillMode::Repeat => (twips_scale(20.0, 20.0), true),
        FillMode::Clip => (twips_scale(20.0, 20.0), false),
        FillMode::Scale => {
            let sx = round_fixed_16_16(width * 20.0 / f64::from(image.width.max(1)));
            let sy = round_fixed_16_16(height * 20.0 / f64::from(image.height.max(1)));
            (twips_scale(sx, sy), false)
        }
    };

    let mut records = shape::rectangle(width, height);
    shape::set_styles(&mut records, 0, 1, 0, false);
    let bounds = TwipsRect::from_size_px(width, height);
    Shape {
        fill_styles: vec![FillStyle::Bitmap {
            character: image.character,
            matrix,
            repeating,
            smoothed: true,
        }],
        line_styles: Vec::new(),
        edge_bounds: bounds,
        shape_bounds: bounds,
        records,
        uses_nonzero_winding: false,
    }
}

/// 9-slice shape over the natural image size, split by `grid`.
fn nine_slice_shape(image: ImageEntry, grid: ScalingGridDef) -> Shape {
    let fill = FillStyle::Bitmap {
        character: image.character,
        matrix: twips_scale(20.0, 20.0),
        repeating: true,
        smoothed: false,
    };
    let (width, height) = (f64::from(image.width), f64::from(image.height));
    let splitter = TwipsRect::from_edges_px(grid.left, grid.top, grid.right, grid.bottom);
    let bounds = TwipsRect::from_size_px(width, height);
    Shape {
        fill_styles: vec![fill; 9],
        line_styles: Vec::new(),
        edge_bounds: bounds,
        shape_bounds: bounds,
        records: shape::nine_slice_records(splitter, to_twips(width), to_twips(height)),
        uses_nonzero_winding: false,
    }
}

fn twips_scale(sx: f64, sy: f64) -> SwfMatrix {
    SwfMatrix {
        scale_x: sx,
        scale_y: sy,
        ..SwfMatrix::IDENTITY
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transcode/transcoder.rs"]
mod tests;
