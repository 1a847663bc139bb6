use super::*;
use crate::model::presets::CUSTOM_PRESET;

#[test]
fn grid_dimensions_floor_to_at_least_one() {
    let mut p = ParameterSet::default();
    p.set_columns(0.0).unwrap();
    p.set_rows(3.9).unwrap();
    assert_eq!(p.grid_columns(), 1);
    assert_eq!(p.grid_rows(), 3);

    p.set_columns(-4.0).unwrap();
    assert_eq!(p.grid_columns(), 1);
}

#[test]
fn non_finite_values_are_rejected_without_mutation() {
    let mut p = ParameterSet::default();
    let before = p.clone();
    assert!(p.set_columns(f64::NAN).is_err());
    assert!(p.set_padding_percent(f64::INFINITY).is_err());
    assert!(p.set_empty_probability(f64::NEG_INFINITY).is_err());
    assert_eq!(p, before);
}

#[test]
fn out_of_range_probability_is_honored() {
    let mut p = ParameterSet::default();
    p.set_empty_probability(1.5).unwrap();
    assert_eq!(p.empty_probability(), 1.5);
}

#[test]
fn single_color_preset_collapses_palette() {
    let mut p = ParameterSet::default();
    let preset = p.apply_preset(0).unwrap();
    assert_eq!(preset.name, "The worm");
    assert_eq!(p.palette().colors(), &[Rgb8::new(0x63, 0xc8, 0xff)]);
    assert_eq!(p.shape_mode(), ShapeMode::Circle);
    assert_eq!(p.padding_percent(), 9.0);
    assert_eq!(p.empty_probability(), 0.32);
    assert!(!p.cycles_palette());
}

#[test]
fn custom_preset_keeps_or_reseeds_palette() {
    let mut p = ParameterSet::default();
    p.set_palette(Palette::single(Rgb8::new(1, 2, 3)));
    p.apply_preset(CUSTOM_PRESET).unwrap();
    assert_eq!(p.palette().colors(), &[Rgb8::new(1, 2, 3)]);
    assert!(p.cycles_palette());

    p.palette_mut().clear();
    p.apply_preset(CUSTOM_PRESET).unwrap();
    assert_eq!(p.palette(), &Palette::default());
}

#[test]
fn invalid_preset_leaves_everything_untouched() {
    let mut p = ParameterSet::default();
    let before = p.clone();
    assert!(p.apply_preset(99).is_err());
    assert!(p.set_canvas_size(99).is_err());
    assert!(p.set_active_preset(Some(99)).is_err());
    assert_eq!(p, before);
}

#[test]
fn untracked_preset_uses_first_color() {
    let mut p = ParameterSet::default();
    p.set_active_preset(None).unwrap();
    assert!(!p.cycles_palette());
}

#[test]
fn shape_mode_parses_case_insensitively() {
    assert_eq!("Triangle".parse::<ShapeMode>().unwrap(), ShapeMode::Triangle);
    assert_eq!(" any ".parse::<ShapeMode>().unwrap(), ShapeMode::Any);
    assert!("hexagon".parse::<ShapeMode>().is_err());
    assert_eq!(ShapeMode::Any.fixed(), None);
    assert_eq!(ShapeMode::Square.fixed(), Some(Shape::Square));
}

#[test]
fn animated_fields_roundtrip_verbatim() {
    let mut p = ParameterSet::default();
    p.set_columns(7.5).unwrap();
    let snap = p.animated_fields();
    p.write_animated_fields(AnimatedFields {
        columns: 30.0,
        rows: 4.0,
        padding_percent: 45.0,
        empty_probability: 0.05,
        shape_mode: ShapeMode::Any,
    });
    p.write_animated_fields(snap);
    assert_eq!(p.animated_fields(), snap);
    assert_eq!(p.columns().to_bits(), 7.5f64.to_bits());
}
