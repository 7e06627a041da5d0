use super::helpers::*;

use confetti::asset::versioning::current_format_version;
use confetti::prelude::*;

#[test]
fn load_ron_effect() {
    let mut app = create_minimal_app();
    let asset = load_asset(&mut app, "sparks.ron");

    assert_eq!(asset.name, "Sparks");
    assert_eq!(asset.confetti_version(), current_format_version());
    assert_eq!(asset.emitters.len(), 2);

    let sparks = &asset.emitters[0];
    assert_eq!(sparks.name, "sparks");
    assert_eq!(sparks.count, ParticleCount { min: 2, max: 200 });
    assert!(sparks.life.independent);
    assert_eq!(sparks.spawn_shape, SpawnShapeValue::ellipse_edges(EllipseSide::Top));
    assert_eq!(sparks.speed.curve.points().len(), 2);
    assert_eq!(sparks.tint.color_at(1.0), [1.0, 0.2, 0.0]);
    assert!(sparks.options.attached && sparks.options.continuous);
    assert_eq!(sparks.fixed_seed, Some(7));

    let glow = &asset.emitters[1];
    assert_eq!(glow.count.max, 4);
    assert!(!glow.speed.is_active());
    assert!(!glow.options.additive);
    assert!(glow.options.behind_others);
}

#[test]
fn loaded_emitters_have_required_values_active() {
    let mut app = create_minimal_app();
    let asset = load_asset(&mut app, "sparks.ron");

    let glow = &asset.emitters[1];
    assert!(glow.emission.is_active());
    assert!(glow.emission.ranged.always_active);
    assert!(glow.duration.is_active());
}

#[test]
fn outdated_version_is_upgraded() {
    let mut app = create_minimal_app();
    let asset = load_asset(&mut app, "outdated_version.ron");

    assert_eq!(asset.confetti_version(), current_format_version());
    assert_eq!(asset.emitters[0].name, "legacy");
}

#[test]
fn unknown_version_fails() {
    let mut app = create_minimal_app();
    let handle = load_fixture(&mut app, "unknown_version.ron");
    assert!(run_until_failed(&mut app, &handle, 100));
}

#[test]
fn invalid_curve_fails() {
    let mut app = create_minimal_app();
    let handle = load_fixture(&mut app, "invalid_curve.ron");
    assert!(run_until_failed(&mut app, &handle, 100));
}

#[test]
fn non_finite_range_fails() {
    let mut app = create_minimal_app();
    let handle = load_fixture(&mut app, "non_finite.ron");
    assert!(run_until_failed(&mut app, &handle, 100));
}

#[test]
fn load_text_effect() {
    let mut app = create_minimal_app();
    let asset = load_asset(&mut app, "fountain.p");

    assert_eq!(asset.name, "fountain", "named after the first emitter");
    assert_eq!(asset.confetti_version(), current_format_version());
    assert_eq!(asset.emitters.len(), 2);

    let fountain = &asset.emitters[0];
    assert_eq!(fountain.count.max, 300);
    assert_eq!(fountain.spawn_shape.shape, SpawnShape::Line);
    assert_eq!(fountain.gravity.low(), ParticleRange::constant(-300.0));
    assert!(fountain.y_offset.is_active());
    assert!(!fountain.x_offset.is_active());

    let mist = &asset.emitters[1];
    assert_eq!(mist.delay.low, ParticleRange::constant(0.5));
    assert!(mist.life_offset.independent);
    assert!(mist.rotation.relative);
    assert!(mist.options.premultiplied_alpha);
    assert_eq!(mist.tint.color_at(0.5), [0.8, 0.85, 0.9]);
}

#[test]
fn broken_text_effect_fails() {
    let mut app = create_minimal_app();
    let handle = load_fixture(&mut app, "broken.p");
    assert!(run_until_failed(&mut app, &handle, 100));
}

#[test]
fn text_and_ron_effects_instantiate() {
    let mut app = create_minimal_app();
    for fixture in ["sparks.ron", "fountain.p"] {
        let asset = load_asset(&mut app, fixture);
        let mut effect = asset.instantiate().expect("loaded assets are valid");
        effect.start();
        effect.update(0.1);
        assert!(effect.active_count() >= 1, "{fixture} should emit");
    }
}
