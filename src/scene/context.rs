use crate::{
    foundation::core::Affine,
    scene::model::{
        BlendMode, ColorTransformDef, ContentAttrs, FilterDef, MaskType, ScalingGridDef,
        TransformDef,
    },
};

/// Fully resolved per-node rendering attributes, derived from a node at visit time.
///
/// A context is computed fresh for every visited node and never shared between nodes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphicContext {
    /// Node transform in pixel space.
    pub transform: Affine,
    /// Color transform to attach to the placement.
    pub color_transform: Option<ColorTransformDef>,
    /// Resolved blend mode; `None` for synthesized helper placements.
    pub blend_mode: Option<BlendMode>,
    /// Filters to attach to the placement.
    pub filters: Vec<FilterDef>,
    /// Effective mask type.
    pub mask_type: MaskType,
    /// Scaling grid in effect for this node.
    pub scaling_grid: Option<ScalingGridDef>,
}

impl GraphicContext {
    /// Identity context with only a transform, used for helper placements.
    pub fn with_transform(transform: Affine) -> Self {
        Self {
            transform,
            ..Self::default()
        }
    }

    /// Identity context carrying only filters, used when re-attaching deferred filters.
    pub fn with_filters(filters: Vec<FilterDef>) -> Self {
        Self {
            filters,
            ..Self::default()
        }
    }

    /// Resolve the context of a graphic content node.
    ///
    /// `parent_grid` and `parent_mask_type` are the values the node inherits from its
    /// parent; an explicit `mask_type` attribute on the node wins over the inherited one.
    pub fn for_node(
        attrs: &ContentAttrs,
        is_group: bool,
        parent_grid: Option<ScalingGridDef>,
        parent_mask_type: Option<MaskType>,
    ) -> Self {
        let color_transform = if !attrs.visible {
            Some(ColorTransformDef {
                alpha_multiplier: 0.0,
                ..ColorTransformDef::default()
            })
        } else if let Some(ct) = attrs.color_transform {
            Some(ct)
        } else {
            attrs.alpha.map(|alpha| ColorTransformDef {
                alpha_multiplier: alpha,
                ..ColorTransformDef::default()
            })
        };

        Self {
            transform: affine_from_def(&attrs.transform),
            color_transform,
            blend_mode: Some(resolve_blend_mode(attrs.blend_mode, is_group, attrs.alpha)),
            filters: attrs.filters.clone(),
            mask_type: attrs
                .mask_type
                .or(parent_mask_type)
                .unwrap_or_default(),
            scaling_grid: parent_grid,
        }
    }

    /// Take the filters out of this context, leaving it unfiltered.
    pub fn take_filters(&mut self) -> Vec<FilterDef> {
        std::mem::take(&mut self.filters)
    }
}

/// Resolve the `auto` blend mode.
///
/// On a group, `auto` becomes `layer` unless alpha is exactly 0 or 1 (then `normal`); on any
/// other node `auto` is always `normal`. Explicit modes pass through unchanged.
pub fn resolve_blend_mode(mode: BlendMode, is_group: bool, alpha: Option<f64>) -> BlendMode {
    if mode != BlendMode::Auto {
        return mode;
    }
    if !is_group {
        return BlendMode::Normal;
    }
    let alpha = alpha.unwrap_or(1.0);
    if alpha == 0.0 || alpha == 1.0 {
        BlendMode::Normal
    } else {
        BlendMode::Layer
    }
}

/// Convert discrete transform attributes (or an explicit matrix) into an affine.
///
/// Discrete attributes apply scale, then rotation, then translation.
pub(crate) fn affine_from_def(def: &TransformDef) -> Affine {
    if let Some(m) = def.matrix {
        return m.to_affine();
    }

    let mut t = Affine::IDENTITY;
    if def.scale_x.is_some() || def.scale_y.is_some() {
        t = Affine::scale_non_uniform(def.scale_x.unwrap_or(1.0), def.scale_y.unwrap_or(1.0)) * t;
    }
    if let Some(deg) = def.rotation {
        t = Affine::rotate(deg.to_radians()) * t;
    }
    if def.x.is_some() || def.y.is_some() {
        t = Affine::translate((def.x.unwrap_or(0.0), def.y.unwrap_or(0.0))) * t;
    }
    t
}

#[cfg(test)]
#[path = "../../tests/unit/scene/context.rs"]
mod tests;
