use crate::{
    foundation::{core::Rgba, math::deg_to_rad_f32},
    scene::model::{BevelType, FilterDef, GradientEntry},
    tags::model::{
        BevelFilter, BlurFilter, ColorMatrixFilter, DropShadowFilter, Filter, GlowFilter,
        GradientBevelFilter, GradientGlowFilter,
    },
    transcode::styles::grad_records,
};

/// Convert filter definitions into placement filter records, preserving order.
pub(crate) fn filters(defs: &[FilterDef]) -> Vec<Filter> {
    defs.iter().map(filter).collect()
}

fn filter(def: &FilterDef) -> Filter {
    match def {
        FilterDef::Bevel(f) => Filter::Bevel(BevelFilter {
            shadow_color: f.shadow_color.with_alpha(f.shadow_alpha),
            highlight_color: f.highlight_color.with_alpha(f.highlight_alpha),
            angle: deg_to_rad_f32(f.angle),
            blur_x: f.blur_x as f32,
            blur_y: f.blur_y as f32,
            distance: f.distance as f32,
            strength: f.strength as f32,
            inner_shadow: f.bevel_type == BevelType::Inner,
            knockout: f.knockout,
            composite_source: true,
            on_top: f.bevel_type == BevelType::Full,
            passes: f.quality,
        }),
        FilterDef::Blur(f) => Filter::Blur(BlurFilter {
            blur_x: f.blur_x as f32,
            blur_y: f.blur_y as f32,
            passes: f.quality,
        }),
        FilterDef::ColorMatrix(f) => Filter::ColorMatrix(ColorMatrixFilter { matrix: f.matrix }),
        FilterDef::DropShadow(f) => Filter::DropShadow(DropShadowFilter {
            color: f.color.with_alpha(f.alpha),
            angle: deg_to_rad_f32(f.angle),
            blur_x: f.blur_x as f32,
            blur_y: f.blur_y as f32,
            distance: f.distance as f32,
            strength: f.strength as f32,
            inner_shadow: f.inner,
            knockout: f.knockout,
            composite_source: !f.hide_object,
            passes: f.quality,
        }),
        FilterDef::Glow(f) => Filter::Glow(GlowFilter {
            color: f.color.with_alpha(f.alpha),
            blur_x: f.blur_x as f32,
            blur_y: f.blur_y as f32,
            strength: f.strength as f32,
            inner_glow: f.inner,
            knockout: f.knockout,
            composite_source: true,
            passes: f.quality,
        }),
        FilterDef::GradientBevel(f) => {
            let (colors, ratios) = split_entries(&f.entries);
            Filter::GradientBevel(GradientBevelFilter {
                colors,
                ratios,
                angle: deg_to_rad_f32(f.angle),
                blur_x: f.blur_x as f32,
                blur_y: f.blur_y as f32,
                distance: f.distance as f32,
                strength: f.strength as f32,
                inner_shadow: f.bevel_type == BevelType::Inner,
                knockout: f.knockout,
                composite_source: true,
                on_top: f.bevel_type == BevelType::Full,
                passes: f.quality,
            })
        }
        FilterDef::GradientGlow(f) => {
            let (colors, ratios) = split_entries(&f.entries);
            Filter::GradientGlow(GradientGlowFilter {
                colors,
                ratios,
                angle: deg_to_rad_f32(f.angle),
                blur_x: f.blur_x as f32,
                blur_y: f.blur_y as f32,
                distance: f.distance as f32,
                strength: f.strength as f32,
                inner_glow: f.inner,
                knockout: f.knockout,
                composite_source: true,
                passes: f.quality,
            })
        }
    }
}

fn split_entries(entries: &[GradientEntry]) -> (Vec<Rgba>, Vec<u8>) {
    grad_records(entries)
        .into_iter()
        .map(|r| (r.color, r.ratio))
        .unzip()
}

#[cfg(test)]
#[path = "../../tests/unit/transcode/filters.rs"]
mod tests;
