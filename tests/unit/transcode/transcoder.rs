use super::*;
use crate::assets::image::{BitmapData, MimeType};
use crate::assets::resolver::MemoryResourceResolver;
use crate::scene::model::BlurFilterDef;
use crate::tags::model::{Filter, StyleChange};
use serde_json::{Value, json};

struct FixedDecoder {
    width: u32,
    height: u32,
}

impl BitmapDecoder for FixedDecoder {
    fn decode(&self, _bytes: &[u8], _mime: MimeType) -> FxgResult<DecodedImage> {
        Ok(DecodedImage {
            width: self.width,
            height: self.height,
            data: BitmapData::Lossless {
                argb_premultiplied: vec![0; (self.width * self.height * 4) as usize],
            },
        })
    }
}

fn transcoder(sources: &[&str], width: u32, height: u32) -> FxgTranscoder {
    let mut resolver = MemoryResourceResolver::new();
    for s in sources {
        resolver.insert(*s, vec![0]);
    }
    FxgTranscoder::new(resolver).with_decoder(FixedDecoder { width, height })
}

fn run(t: &FxgTranscoder, doc: Value) -> TranscodeOutput {
    let graphic: GraphicNode = serde_json::from_value(doc).unwrap();
    t.transcode(&graphic).unwrap()
}

fn sprite(out: &TranscodeOutput, id: CharacterId) -> &Sprite {
    out.dictionary.sprite(id).unwrap()
}

fn shape(out: &TranscodeOutput, id: CharacterId) -> &Shape {
    out.dictionary.shape(id).unwrap()
}

fn red_rect(width: f64, height: f64) -> Value {
    json!({
        "kind": "rect", "width": width, "height": height,
        "fill": { "kind": "solid", "color": "#FF0000" }
    })
}

#[test]
fn solid_rect_lands_in_root_sprite() {
    let out = run(&transcoder(&[], 1, 1), json!({ "children": [red_rect(10.0, 5.0)] }));

    let root = out.root_sprite().unwrap();
    assert_eq!(root.label, "Graphic");
    assert_eq!(root.placements.len(), 1);

    let p = &root.placements[0];
    assert_eq!(p.depth, 1);
    assert_eq!(p.blend_mode, Some(SwfBlendMode::Normal));
    assert_eq!(p.clip_depth, None);

    let s = shape(&out, p.character);
    assert_eq!(
        s.fill_styles,
        vec![FillStyle::Solid {
            color: Rgba {
                r: 255,
                g: 0,
                b: 0,
                a: 255
            }
        }]
    );
    assert!(s.line_styles.is_empty());
    assert_eq!(s.edge_bounds, TwipsRect::from_size_px(10.0, 5.0));
    assert!(out.problems.is_empty());
    assert_eq!(out.dictionary.len(), 2);
}

#[test]
fn depths_increase_within_each_sprite() {
    let out = run(
        &transcoder(&[], 1, 1),
        json!({ "children": [
            red_rect(1.0, 1.0),
            { "kind": "group", "children": [red_rect(1.0, 1.0), red_rect(1.0, 1.0)] },
            red_rect(1.0, 1.0)
        ]}),
    );

    let root = out.root_sprite().unwrap();
    let depths: Vec<_> = root.placements.iter().map(|p| p.depth).collect();
    assert_eq!(depths, vec![1, 2, 3]);

    let group = sprite(&out, root.placements[1].character);
    assert_eq!(group.label, "Group");
    let depths: Vec<_> = group.placements.iter().map(|p| p.depth).collect();
    assert_eq!(depths, vec![1, 2]);
}

#[test]
fn translucent_group_resolves_auto_blend_to_layer() {
    let out = run(
        &transcoder(&[], 1, 1),
        json!({ "children": [
            { "kind": "group", "alpha": 0.5, "x": 3, "children": [red_rect(1.0, 1.0)] }
        ]}),
    );

    let p = &out.root_sprite().unwrap().placements[0];
    assert_eq!(p.blend_mode, Some(SwfBlendMode::Layer));
    assert!(p.color_transform.is_some());
    assert_eq!(p.matrix.translate_x, 60);
}

#[test]
fn group_mask_clips_the_following_children() {
    let out = run(
        &transcoder(&[], 1, 1),
        json!({ "children": [{
            "kind": "group",
            "mask": { "kind": "group", "children": [red_rect(4.0, 4.0)] },
            "children": [red_rect(1.0, 1.0), red_rect(2.0, 2.0)]
        }]}),
    );

    let group = sprite(&out, out.root_sprite().unwrap().placements[0].character);
    assert_eq!(group.placements.len(), 3);

    let mask = &group.placements[0];
    assert_eq!(mask.depth, 1);
    assert_eq!(mask.clip_depth, Some(3));
    assert!(!mask.cache_as_bitmap);
    assert!(group.placements[1..].iter().all(|p| p.clip_depth.is_none()));

    // Clip content keeps its geometry; paint collapses to opaque black.
    let mask_sprite = sprite(&out, mask.character);
    let mask_shape = shape(&out, mask_sprite.placements[0].character);
    assert_eq!(
        mask_shape.fill_styles,
        vec![FillStyle::Solid {
            color: Rgba::opaque_black()
        }]
    );
}

#[test]
fn alpha_mask_is_cached_as_bitmap_and_keeps_paint() {
    let out = run(
        &transcoder(&[], 1, 1),
        json!({ "children": [{
            "kind": "group",
            "mask_type": "alpha",
            "mask": { "kind": "group", "children": [red_rect(4.0, 4.0)] },
            "children": [red_rect(1.0, 1.0)]
        }]}),
    );

    let group = sprite(&out, out.root_sprite().unwrap().placements[0].character);
    let mask = &group.placements[0];
    assert_eq!(mask.clip_depth, Some(2));
    assert!(mask.cache_as_bitmap);
    assert!(!group.placements[1].cache_as_bitmap);

    let mask_shape = shape(&out, sprite(&out, mask.character).placements[0].character);
    assert!(matches!(
        mask_shape.fill_styles[0],
        FillStyle::Solid { color: Rgba { r: 255, .. } }
    ));
}

#[test]
fn empty_masked_group_still_clips_one_depth() {
    let out = run(
        &transcoder(&[], 1, 1),
        json!({ "children": [{
            "kind": "group",
            "mask": { "kind": "group", "children": [red_rect(4.0, 4.0)] }
        }]}),
    );

    let group = sprite(&out, out.root_sprite().unwrap().placements[0].character);
    assert_eq!(group.placements[0].clip_depth, Some(2));
}

#[test]
fn filtered_masked_leaf_goes_through_a_helper_sprite() {
    let mut rect = red_rect(10.0, 10.0);
    rect["x"] = json!(5);
    rect["filters"] = json!([{ "kind": "blur" }]);
    rect["mask"] = json!({ "kind": "group", "children": [red_rect(4.0, 4.0)] });

    let out = run(&transcoder(&[], 1, 1), json!({ "children": [rect] }));

    let root = out.root_sprite().unwrap();
    assert_eq!(root.placements.len(), 1);
    assert!(matches!(root.placements[0].filters[..], [Filter::Blur(_)]));

    let helper = sprite(&out, root.placements[0].character);
    assert_eq!(helper.label, "MaskFilter");
    assert_eq!(helper.placements.len(), 2);
    assert_eq!(helper.placements[0].clip_depth, Some(2));
    assert!(helper.placements[1].filters.is_empty());

    // The mask follows the leaf it masks.
    assert_eq!(helper.placements[0].matrix.translate_x, 100);
    assert_eq!(helper.placements[1].matrix.translate_x, 100);
}

#[test]
fn masked_leaf_takes_a_single_depth_in_a_masked_group() {
    let mut masked = red_rect(2.0, 2.0);
    masked["mask"] = json!({ "kind": "group", "children": [red_rect(1.0, 1.0)] });

    let out = run(
        &transcoder(&[], 1, 1),
        json!({ "children": [{
            "kind": "group",
            "mask": { "kind": "group", "children": [red_rect(4.0, 4.0)] },
            "children": [red_rect(1.0, 1.0), masked]
        }]}),
    );

    let group = sprite(&out, out.root_sprite().unwrap().placements[0].character);
    let depths: Vec<_> = group.placements.iter().map(|p| p.depth).collect();
    assert_eq!(depths, vec![1, 2, 3]);
    assert_eq!(group.placements[0].clip_depth, Some(3));

    let helper_placement = &group.placements[2];
    assert_eq!(helper_placement.clip_depth, None);
    assert!(helper_placement.filters.is_empty());

    let helper = sprite(&out, helper_placement.character);
    assert_eq!(helper.label, "MaskedLeaf");
    assert_eq!(helper.placements.len(), 2);
    assert_eq!(helper.placements[0].clip_depth, Some(2));
    assert_eq!(helper.placements[1].clip_depth, None);
}

#[test]
fn masked_leaf_that_places_nothing_drops_its_mask() {
    let mask = json!({ "kind": "group", "children": [red_rect(4.0, 4.0)] });
    let out = run(
        &transcoder(&[], 1, 1),
        json!({ "children": [
            { "kind": "bitmap_graphic", "mask": mask.clone() },
            { "kind": "text", "mask": mask },
            red_rect(9.0, 9.0)
        ]}),
    );

    assert!(matches!(
        &out.problems[..],
        [Problem::MissingAttribute { attribute: "source", .. }]
    ));

    let root = out.root_sprite().unwrap();
    assert_eq!(root.placements.len(), 1);
    assert_eq!(root.placements[0].depth, 1);
    assert_eq!(root.placements[0].clip_depth, None);
    assert_eq!(
        shape(&out, root.placements[0].character).edge_bounds,
        TwipsRect::from_size_px(9.0, 9.0)
    );
}

#[test]
fn definition_used_as_mask_keeps_its_own_transform() {
    let out = run(
        &transcoder(&[], 1, 1),
        json!({
            "library": { "Dot": { "group": { "children": [red_rect(3.0, 3.0)] } } },
            "children": [{
                "kind": "group",
                "x": 7,
                "mask": { "kind": "place_object", "name": "Dot", "x": 2 },
                "children": [red_rect(1.0, 1.0), red_rect(2.0, 2.0)]
            }]
        }),
    );

    let group = sprite(&out, out.root_sprite().unwrap().placements[0].character);
    assert_eq!(group.placements.len(), 3);

    let mask = &group.placements[0];
    assert_eq!(mask.character, out.definitions["Dot"]);
    assert_eq!(mask.depth, 1);
    assert_eq!(mask.clip_depth, Some(3));
    assert_eq!(mask.matrix.translate_x, 40);
    assert!(!mask.cache_as_bitmap);
}

#[test]
fn bitmap_in_clip_mask_becomes_a_solid_rect() {
    let out = run(
        &transcoder(&["a.png"], 100, 50),
        json!({ "children": [{
            "kind": "group",
            "mask": { "kind": "group", "children": [{
                "kind": "bitmap_graphic", "source": "a.png", "width": 40, "height": 80
            }]},
            "children": [red_rect(1.0, 1.0)]
        }]}),
    );

    let group = sprite(&out, out.root_sprite().unwrap().placements[0].character);
    let mask_sprite = sprite(&out, group.placements[0].character);
    assert_eq!(mask_sprite.placements.len(), 1);

    let solid = shape(&out, mask_sprite.placements[0].character);
    assert_eq!(
        solid.fill_styles,
        vec![FillStyle::Solid {
            color: Rgba::opaque_black()
        }]
    );
    assert_eq!(solid.edge_bounds, TwipsRect::from_size_px(40.0, 50.0));
}

#[test]
fn masked_group_hoists_identical_child_filters() {
    let blurred = |w: f64| {
        let mut r = red_rect(w, w);
        r["filters"] = json!([{ "kind": "blur", "blur_x": 2 }]);
        r
    };
    let out = run(
        &transcoder(&[], 1, 1),
        json!({ "children": [{
            "kind": "group",
            "mask": { "kind": "group", "children": [red_rect(4.0, 4.0)] },
            "children": [blurred(1.0), blurred(2.0)]
        }]}),
    );

    let root_placement = &out.root_sprite().unwrap().placements[0];
    assert!(root_placement.filters.is_empty());

    let group = sprite(&out, root_placement.character);
    assert_eq!(group.placements.len(), 1);
    assert_eq!(group.placements[0].filters.len(), 1);

    let helper = sprite(&out, group.placements[0].character);
    assert_eq!(helper.label, "MaskFilter");
    assert_eq!(helper.placements.len(), 3);
    assert_eq!(helper.placements[0].clip_depth, Some(3));
    assert!(helper.placements[1..].iter().all(|p| p.filters.is_empty()));
}

#[test]
fn definitions_are_transcoded_once() {
    let out = run(
        &transcoder(&[], 1, 1),
        json!({
            "library": { "Star": { "group": { "children": [red_rect(3.0, 3.0)] } } },
            "children": [
                { "kind": "place_object", "name": "Star" },
                { "kind": "place_object", "name": "Star", "x": 10 }
            ]
        }),
    );

    let root = out.root_sprite().unwrap();
    assert_eq!(root.placements.len(), 2);
    assert_eq!(root.placements[0].character, root.placements[1].character);
    assert_eq!(out.definitions["Star"], root.placements[0].character);

    let def = sprite(&out, root.placements[0].character);
    assert_eq!(def.label, "Definition");
    assert_eq!(def.placements.len(), 1);
    assert_eq!(out.dictionary.len(), 3);
}

#[test]
fn recursive_definition_aborts() {
    let graphic: GraphicNode = serde_json::from_value(json!({
        "library": { "Loop": { "group": { "children": [
            { "kind": "place_object", "name": "Loop" }
        ]}}},
        "children": [{ "kind": "place_object", "name": "Loop" }]
    }))
    .unwrap();

    let err = transcoder(&[], 1, 1).transcode(&graphic).unwrap_err();
    assert!(matches!(err, FxgError::Validation(_)));
}

#[test]
fn unknown_definition_aborts() {
    let graphic: GraphicNode = serde_json::from_value(json!({
        "children": [{ "kind": "place_object", "name": "Nope" }]
    }))
    .unwrap();

    let err = transcoder(&[], 1, 1).transcode(&graphic).unwrap_err();
    assert!(err.to_string().contains("Nope"));
}

#[test]
fn definition_without_group_is_reported_once_and_elided() {
    let out = run(
        &transcoder(&[], 1, 1),
        json!({
            "library": { "Empty": { "pos": { "line": 7 } } },
            "children": [
                { "kind": "place_object", "name": "Empty" },
                { "kind": "place_object", "name": "Empty" },
                red_rect(1.0, 1.0)
            ]
        }),
    );

    assert!(matches!(
        &out.problems[..],
        [Problem::MissingRequiredChild { pos }] if pos.line == 7
    ));
    assert!(out.definitions.is_empty());

    let root = out.root_sprite().unwrap();
    assert_eq!(root.placements.len(), 1);
    assert_eq!(root.placements[0].depth, 1);
}

#[test]
fn elided_mask_leaves_siblings_unclipped() {
    let out = run(
        &transcoder(&[], 1, 1),
        json!({
            "library": { "Empty": {} },
            "children": [{
                "kind": "group",
                "mask": { "kind": "place_object", "name": "Empty" },
                "children": [red_rect(1.0, 1.0)]
            }]
        }),
    );

    let group = sprite(&out, out.root_sprite().unwrap().placements[0].character);
    assert_eq!(group.placements.len(), 1);
    assert_eq!(group.placements[0].clip_depth, None);
}

#[test]
fn invalid_path_data_is_elided() {
    let out = run(
        &transcoder(&[], 1, 1),
        json!({ "children": [
            { "kind": "path", "data": "M 0 0 X 10", "fill": { "kind": "solid" } },
            red_rect(1.0, 1.0)
        ]}),
    );

    assert!(matches!(&out.problems[..], [Problem::InvalidPathData { .. }]));
    assert_eq!(out.root_sprite().unwrap().placements.len(), 1);
}

#[test]
fn empty_path_data_yields_an_empty_shape() {
    let out = run(
        &transcoder(&[], 1, 1),
        json!({ "children": [{ "kind": "path", "data": "  " }] }),
    );

    assert!(out.problems.is_empty());
    let root = out.root_sprite().unwrap();
    let s = shape(&out, root.placements[0].character);
    assert!(
        s.records
            .iter()
            .all(|r| matches!(r, ShapeRecord::StyleChange(_)))
    );
}

#[test]
fn winding_controls_style_restatement() {
    let path = |winding: &str| {
        json!({
            "kind": "path",
            "winding": winding,
            "data": "M0 0 L10 0 L10 10 Z M20 20 L30 20 L30 30 Z",
            "fill": { "kind": "solid" }
        })
    };
    let out = run(
        &transcoder(&[], 1, 1),
        json!({ "children": [path("even_odd"), path("non_zero")] }),
    );

    let root = out.root_sprite().unwrap();
    let styled = |s: &Shape| {
        s.records
            .iter()
            .filter(|r| {
                matches!(
                    r,
                    ShapeRecord::StyleChange(StyleChange {
                        fill_style0: Some(1),
                        ..
                    })
                )
            })
            .count()
    };

    let even_odd = shape(&out, root.placements[0].character);
    assert_eq!(styled(even_odd), 2);
    assert!(!even_odd.uses_nonzero_winding);

    let non_zero = shape(&out, root.placements[1].character);
    assert_eq!(styled(non_zero), 1);
    assert!(non_zero.uses_nonzero_winding);
}

#[test]
fn stroke_grows_shape_bounds() {
    let out = run(
        &transcoder(&[], 1, 1),
        json!({ "children": [{
            "kind": "rect", "width": 10, "height": 10,
            "stroke": { "paint": { "kind": "solid" }, "weight": 2 }
        }]}),
    );

    let s = shape(&out, out.root_sprite().unwrap().placements[0].character);
    assert!(s.fill_styles.is_empty());
    assert_eq!(s.line_styles.len(), 1);
    assert_eq!(s.edge_bounds, TwipsRect::from_size_px(10.0, 10.0));
    assert_eq!(s.shape_bounds, s.edge_bounds.inflate(20));
}

#[test]
fn huge_stroked_line_still_transcodes() {
    let out = run(
        &transcoder(&[], 1, 1),
        json!({ "children": [{
            "kind": "line", "x_from": -1e8, "x_to": 1e8,
            "stroke": { "paint": { "kind": "solid" }, "weight": 2 }
        }]}),
    );

    let s = shape(&out, out.root_sprite().unwrap().placements[0].character);
    assert!(s.shape_bounds.contains_rect(s.edge_bounds));
    assert!(s.edge_bounds.width() > 0);
}

#[test]
fn invisible_node_keeps_geometry_without_paint() {
    let mut rect = red_rect(10.0, 10.0);
    rect["visible"] = json!(false);
    let out = run(&transcoder(&[], 1, 1), json!({ "children": [rect] }));

    let p = &out.root_sprite().unwrap().placements[0];
    assert!(p.color_transform.is_some());
    let s = shape(&out, p.character);
    assert!(s.fill_styles.is_empty());
    assert_eq!(s.edge_bounds, TwipsRect::from_size_px(10.0, 10.0));
}

#[test]
fn bitmap_larger_than_node_is_clipped() {
    let out = run(
        &transcoder(&["a.png"], 100, 50),
        json!({ "children": [{
            "kind": "bitmap_graphic", "source": "a.png",
            "width": 40, "height": 50, "fill_mode": "clip"
        }]}),
    );

    let root = out.root_sprite().unwrap();
    assert_eq!(root.placements.len(), 1);
    let holder = sprite(&out, root.placements[0].character);
    assert_eq!(holder.label, "BitmapGraphic");
    assert_eq!(holder.placements.len(), 2);

    let clip = &holder.placements[0];
    assert_eq!(clip.clip_depth, Some(clip.depth + 1));
    let clip_sprite = sprite(&out, clip.character);
    assert_eq!(clip_sprite.label, "BitmapGraphic_Clip");
    assert_eq!(
        shape(&out, clip_sprite.placements[0].character).edge_bounds,
        TwipsRect::from_size_px(40.0, 50.0)
    );

    let image = shape(&out, holder.placements[1].character);
    assert_eq!(image.edge_bounds, TwipsRect::from_size_px(40.0, 50.0));
    let FillStyle::Bitmap {
        matrix, repeating, ..
    } = &image.fill_styles[0]
    else {
        panic!("expected bitmap fill");
    };
    assert_eq!(matrix.scale_x, 20.0);
    assert!(!repeating);
}

#[test]
fn bitmap_matching_node_is_a_single_shape() {
    let out = run(
        &transcoder(&["a.png"], 100, 50),
        json!({ "children": [
            { "kind": "bitmap_graphic", "source": "@Embed('a.png')" },
            { "kind": "bitmap_graphic", "source": "a.png", "width": 200 }
        ]}),
    );

    let root = out.root_sprite().unwrap();
    let natural = shape(&out, root.placements[0].character);
    let FillStyle::Bitmap { matrix, smoothed, .. } = &natural.fill_styles[0] else {
        panic!("expected bitmap fill");
    };
    assert_eq!((matrix.scale_x, matrix.scale_y), (20.0, 20.0));
    assert!(smoothed);

    let stretched = shape(&out, root.placements[1].character);
    let FillStyle::Bitmap { matrix, .. } = &stretched.fill_styles[0] else {
        panic!("expected bitmap fill");
    };
    assert_eq!((matrix.scale_x, matrix.scale_y), (40.0, 20.0));

    let bitmaps = out
        .dictionary
        .iter()
        .filter(|(_, c)| matches!(c, Character::Bitmap(_)))
        .count();
    assert_eq!(bitmaps, 1);
}

#[test]
fn unreadable_images_are_reported_per_node() {
    let out = run(
        &transcoder(&[], 10, 10),
        json!({ "children": [
            { "kind": "bitmap_graphic", "source": "missing.png" },
            { "kind": "bitmap_graphic", "source": "missing.png" },
            { "kind": "bitmap_graphic", "source": "notes.txt" },
            red_rect(1.0, 1.0)
        ]}),
    );

    assert_eq!(out.problems.len(), 3);
    assert!(matches!(
        &out.problems[0],
        Problem::ImageEmbedding { source_name, .. } if source_name == "missing.png"
    ));
    assert!(matches!(
        &out.problems[2],
        Problem::ImageEmbedding { message, .. } if message.contains("MIME")
    ));
    assert_eq!(out.root_sprite().unwrap().placements.len(), 1);
}

#[test]
fn bitmap_without_source_reports_missing_attribute() {
    let out = run(
        &transcoder(&[], 10, 10),
        json!({ "children": [{ "kind": "bitmap_graphic" }] }),
    );

    assert!(matches!(
        &out.problems[..],
        [Problem::MissingAttribute {
            attribute: "source",
            node: "BitmapImage",
            ..
        }]
    ));
    assert!(out.root_sprite().unwrap().placements.is_empty());
}

#[test]
fn blank_bitmap_fill_source_drops_only_the_fill() {
    let out = run(
        &transcoder(&[], 10, 10),
        json!({ "children": [
            {
                "kind": "rect", "width": 10, "height": 10,
                "fill": { "kind": "bitmap", "source": "" }
            },
            red_rect(1.0, 1.0)
        ]}),
    );

    assert!(matches!(
        &out.problems[..],
        [Problem::MissingAttribute {
            node: "BitmapFill",
            ..
        }]
    ));
    let root = out.root_sprite().unwrap();
    assert_eq!(root.placements.len(), 2);
    assert!(shape(&out, root.placements[0].character).fill_styles.is_empty());
    assert_eq!(shape(&out, root.placements[1].character).fill_styles.len(), 1);
}

#[test]
fn clipped_bitmap_fill_uses_helper_sprites() {
    let out = run(
        &transcoder(&["tile.png"], 100, 50),
        json!({ "children": [{
            "kind": "rect", "width": 200, "height": 100,
            "fill": { "kind": "bitmap", "source": "tile.png", "fill_mode": "clip" },
            "stroke": { "paint": { "kind": "solid" } }
        }]}),
    );

    let root = out.root_sprite().unwrap();
    let holder = sprite(&out, root.placements[0].character);
    assert_eq!(holder.label, "BitmapFill");
    assert_eq!(holder.placements.len(), 3);
    assert_eq!(holder.placements[0].clip_depth, Some(2));

    let clip_sprite = sprite(&out, holder.placements[0].character);
    assert_eq!(clip_sprite.label, "BitmapFill_Clip");
    assert_eq!(
        shape(&out, clip_sprite.placements[0].character).edge_bounds,
        TwipsRect::from_size_px(100.0, 50.0)
    );

    let fill = shape(&out, holder.placements[1].character);
    assert_eq!(fill.fill_styles.len(), 1);
    assert!(fill.line_styles.is_empty());

    let stroke = shape(&out, holder.placements[2].character);
    assert!(stroke.fill_styles.is_empty());
    assert_eq!(stroke.line_styles.len(), 1);
}

#[test]
fn repeating_bitmap_fill_stays_inline() {
    let out = run(
        &transcoder(&["tile.png"], 10, 10),
        json!({ "children": [{
            "kind": "rect", "width": 200, "height": 100,
            "fill": { "kind": "bitmap", "source": "tile.png", "fill_mode": "repeat" }
        }]}),
    );

    let s = shape(&out, out.root_sprite().unwrap().placements[0].character);
    assert!(matches!(
        s.fill_styles[..],
        [FillStyle::Bitmap {
            repeating: true,
            ..
        }]
    ));
}

#[test]
fn scaling_grid_bitmap_becomes_nine_slices() {
    let out = run(
        &transcoder(&["a.png"], 100, 50),
        json!({
            "scaling_grid": { "left": 10, "top": 10, "right": 90, "bottom": 40 },
            "children": [{ "kind": "bitmap_graphic", "source": "a.png" }]
        }),
    );

    let grid = out.scaling_grids[&out.root];
    assert_eq!(grid.character, out.root);
    assert_eq!(grid.splitter, TwipsRect::from_edges_px(10.0, 10.0, 90.0, 40.0));

    let s = shape(&out, out.root_sprite().unwrap().placements[0].character);
    assert_eq!(s.fill_styles.len(), 9);
    assert!(s.fill_styles.iter().all(|f| matches!(
        f,
        FillStyle::Bitmap {
            repeating: true,
            smoothed: false,
            ..
        }
    )));
}

#[test]
fn invalid_opts_abort_before_walking() {
    let t = transcoder(&[], 1, 1).with_opts(TranscodeOpts::default().with_curve_tolerance_px(0.0));
    let err = t.transcode(&GraphicNode::default()).unwrap_err();
    assert!(matches!(err, FxgError::Validation(_)));
}

#[test]
fn shared_child_filters_require_identical_non_empty_lists() {
    let blur = |x: f64| {
        FilterDef::Blur(BlurFilterDef {
            blur_x: x,
            ..BlurFilterDef::default()
        })
    };
    let rect = |filters: Vec<FilterDef>| {
        let mut r = RectNode::default();
        r.attrs.filters = filters;
        Node::Rect(r)
    };

    assert!(shared_child_filters(&[]).is_none());
    assert!(shared_child_filters(&[rect(vec![]), rect(vec![])]).is_none());
    assert!(shared_child_filters(&[rect(vec![blur(1.0)]), rect(vec![blur(2.0)])]).is_none());
    assert_eq!(
        shared_child_filters(&[rect(vec![blur(1.0)]), rect(vec![blur(1.0)])]).map(<[_]>::len),
        Some(1)
    );
}

#[test]
fn bitmap_clipping_rule() {
    assert!(bitmap_needs_clipping(FillMode::Scale, (10.0, 10.0), (5.0, 10.0)));
    assert!(!bitmap_needs_clipping(FillMode::Scale, (10.0, 10.0), (20.0, 20.0)));
    assert!(!bitmap_needs_clipping(FillMode::Repeat, (10.0, 10.0), (20.0, 20.0)));
    assert!(bitmap_needs_clipping(FillMode::Clip, (10.0, 10.0), (20.0, 10.0)));
    assert!(!bitmap_needs_clipping(FillMode::Clip, (10.0, 10.0), (10.0, 10.0)));
}
