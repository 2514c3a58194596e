use super::*;

#[test]
fn dictionary_ids_start_at_one_and_type_lookups_are_strict() {
    let mut dict = Dictionary::default();
    assert!(dict.is_empty());

    let sprite = dict.insert(Character::Sprite(Sprite::new("Graphic"))).unwrap();
    let shape = dict.insert(Character::Shape(Shape::default())).unwrap();
    assert_eq!(sprite, CharacterId(1));
    assert_eq!(shape, CharacterId(2));
    assert_eq!(dict.len(), 2);

    assert_eq!(dict.sprite(sprite).unwrap().label, "Graphic");
    assert!(dict.sprite(shape).is_none());
    assert!(dict.shape(shape).is_some());
    assert!(dict.get(CharacterId(0)).is_none());
    assert!(dict.get(CharacterId(3)).is_none());

    let ids: Vec<_> = dict.iter().map(|(id, _)| id).collect();
    assert_eq!(ids, vec![CharacterId(1), CharacterId(2)]);
}

#[test]
fn blend_modes_map_to_wire_numbers() {
    assert_eq!(SwfBlendMode::from_fxg(BlendMode::Normal).unwrap().code(), 1);
    assert_eq!(SwfBlendMode::from_fxg(BlendMode::Layer).unwrap().code(), 2);
    assert_eq!(SwfBlendMode::from_fxg(BlendMode::Alpha).unwrap().code(), 11);
    assert_eq!(SwfBlendMode::from_fxg(BlendMode::Hardlight).unwrap().code(), 14);
    assert_eq!(SwfBlendMode::from_fxg(BlendMode::Auto), None);
    assert_eq!(SwfBlendMode::from_fxg(BlendMode::Colordodge), None);
    assert_eq!(SwfBlendMode::from_fxg(BlendMode::Luminosity), None);
}

#[test]
fn matrix_translation_is_converted_to_twips() {
    let m = SwfMatrix::from_affine(Affine::new([2.0, 0.5, -0.5, 3.0, 1.5, -2.0]));
    assert_eq!(m.scale_x, 2.0);
    assert_eq!(m.rotate_skew0, 0.5);
    assert_eq!(m.rotate_skew1, -0.5);
    assert_eq!(m.scale_y, 3.0);
    assert_eq!((m.translate_x, m.translate_y), (30, -40));

    let t = SwfMatrix::from_twips_space(Affine::translate((30.0, -40.0)));
    assert_eq!((t.translate_x, t.translate_y), (30, -40));
    assert_eq!(SwfMatrix::default(), SwfMatrix::IDENTITY);
}

#[test]
fn color_transform_uses_fixed_point_multipliers() {
    let ct = ColorTransform::from_def(&ColorTransformDef {
        alpha_multiplier: 0.5,
        red_offset: 12.0,
        ..ColorTransformDef::default()
    });
    assert_eq!(ct.alpha_mult, 128);
    assert_eq!(ct.red_mult, 256);
    assert_eq!(ct.red_add, 12);
    assert_eq!(ct.alpha_add, 0);
}

#[test]
fn sprite_last_depth_tracks_placements() {
    let mut s = Sprite::new("Group");
    assert_eq!(s.last_depth(), 0);
    s.placements.push(Placement {
        character: CharacterId(1),
        depth: 1,
        matrix: SwfMatrix::IDENTITY,
        color_transform: None,
        blend_mode: None,
        filters: Vec::new(),
        clip_depth: Some(3),
        cache_as_bitmap: false,
    });
    assert_eq!(s.last_depth(), 1);
    assert!(s.placements[0].has_clip_depth());
}
