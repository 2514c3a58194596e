use super::*;
use serde_json::json;

#[test]
fn nodes_deserialize_with_fxg_defaults() {
    let g: GraphicNode = serde_json::from_value(json!({
        "children": [
            { "kind": "rect", "width": 10, "height": 5,
              "fill": { "kind": "solid", "color": "#FF0000" } },
            { "kind": "group", "alpha": 0.5, "children": [] }
        ]
    }))
    .unwrap();

    assert_eq!(g.version, FxgVersion::V2_0);
    assert_eq!(g.children.len(), 2);

    let Node::Rect(r) = &g.children[0] else {
        panic!("expected rect");
    };
    assert!(r.attrs.visible);
    assert_eq!(r.attrs.blend_mode, BlendMode::Auto);
    assert_eq!(r.width, 10.0);
    assert!(!r.has_rounded_corners());
    assert_eq!(
        r.fill,
        Some(FillDef::Solid(SolidColorDef {
            color: Color(0xFF0000),
            alpha: 1.0
        }))
    );

    assert_eq!(g.children[1].attrs().alpha, Some(0.5));
    assert_eq!(g.children[1].node_name(), "Group");
}

#[test]
fn stroke_and_filter_defaults_follow_fxg() {
    let s: StrokeDef = serde_json::from_value(json!({
        "paint": { "kind": "solid", "color": 0 }
    }))
    .unwrap();
    assert_eq!(s.weight, 1.0);
    assert_eq!(s.caps, Caps::Round);
    assert_eq!(s.joints, Joints::Round);
    assert_eq!(s.miter_limit, 3.0);
    assert_eq!(s.scale_mode, ScaleMode::Normal);

    let f: FilterDef = serde_json::from_value(json!({ "kind": "glow" })).unwrap();
    let FilterDef::Glow(glow) = f else {
        panic!("expected glow");
    };
    assert_eq!(glow.color, Color(0xFF0000));
    assert_eq!(glow.quality, 1);

    let b: FilterDef = serde_json::from_value(json!({ "kind": "bevel", "type": "full" })).unwrap();
    let FilterDef::Bevel(bevel) = b else {
        panic!("expected bevel");
    };
    assert_eq!(bevel.bevel_type, BevelType::Full);
    assert_eq!(bevel.angle, 45.0);
}

#[test]
fn per_corner_radius_counts_as_rounded() {
    let r: RectNode = serde_json::from_value(json!({
        "width": 4, "height": 4, "bottom_right_radius_x": 1
    }))
    .unwrap();
    assert!(r.has_rounded_corners());
}

#[test]
fn fill_mode_depends_on_version() {
    assert_eq!(
        effective_fill_mode(FxgVersion::V1_0, None, None),
        FillMode::Repeat
    );
    assert_eq!(
        effective_fill_mode(FxgVersion::V1_0, Some(FillMode::Scale), Some(false)),
        FillMode::Clip
    );
    assert_eq!(
        effective_fill_mode(FxgVersion::V2_0, None, Some(true)),
        FillMode::Scale
    );
    assert_eq!(
        effective_fill_mode(FxgVersion::V2_0, Some(FillMode::Repeat), None),
        FillMode::Repeat
    );
}

#[test]
fn bitmap_fill_explicit_transform_ignores_tiny_rotation() {
    let mut fill = BitmapFillDef {
        rotation: Some(1e-7),
        ..BitmapFillDef::default()
    };
    assert!(!fill.has_explicit_transform());
    fill.x = Some(3.0);
    assert!(fill.has_explicit_transform());
}

#[test]
fn library_and_versions_deserialize() {
    let g: GraphicNode = serde_json::from_value(json!({
        "version": "1.0",
        "library": {
            "Star": { "group": { "children": [ { "kind": "ellipse", "width": 2, "height": 2 } ] } }
        },
        "children": [ { "kind": "place_object", "name": "Star", "x": 3 } ]
    }))
    .unwrap();
    assert_eq!(g.version, FxgVersion::V1_0);
    assert!(g.library["Star"].group.is_some());
    let Node::PlaceObject(p) = &g.children[0] else {
        panic!("expected place_object");
    };
    assert_eq!(p.name, "Star");
    assert_eq!(p.attrs.transform.x, Some(3.0));
}

#[test]
fn from_json_str_reports_serde_errors() {
    let g = GraphicNode::from_json_str(r#"{ "children": [] }"#).unwrap();
    assert!(g.children.is_empty());

    let err = GraphicNode::from_json_str(r#"{ "children": [ { "kind": "hexagon" } ] }"#)
        .unwrap_err();
    assert!(err.to_string().starts_with("serialization error:"));
}
