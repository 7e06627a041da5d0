use super::helpers::*;

use bevy::math::Vec2;
use confetti::{EmitterConfig, ParticleEffect, ScaledValue};

fn named(name: &str, rate: f32) -> EmitterConfig {
    EmitterConfig {
        name: name.to_string(),
        ..config(rate, 1.0, 1.0)
    }
}

fn two_emitters() -> ParticleEffect {
    ParticleEffect::from_configs([named("core", 10.0), named("halo", 20.0)]).unwrap()
}

#[test]
fn effect_builds_one_emitter_per_config() {
    let effect = two_emitters();
    assert_eq!(effect.emitters.len(), 2);
    assert_eq!(effect.emitters[0].name(), "core");
    assert!(effect.find_emitter("halo").is_some());
    assert!(effect.find_emitter("missing").is_none());
}

#[test]
fn effect_rejects_invalid_configs() {
    let mut bad = named("bad", 1.0);
    bad.size = ScaledValue::constant(f32::NAN);
    assert!(ParticleEffect::from_configs([named("good", 1.0), bad]).is_err());
}

#[test]
fn empty_effect_is_complete() {
    let mut effect = ParticleEffect::default();
    effect.start();
    effect.update(0.1);
    assert!(effect.is_complete());
    assert_eq!(effect.bounding_box(), None);
}

#[test]
fn effect_updates_every_emitter() {
    let mut effect = two_emitters();
    effect.start();
    effect.update(0.1);

    let core = effect.find_emitter("core").unwrap().active_count();
    let halo = effect.find_emitter("halo").unwrap().active_count();
    assert!(core >= 1 && halo > core);
    assert_eq!(effect.active_count(), core + halo);

    let mut instances = Vec::new();
    effect.write_instances(&mut instances);
    assert_eq!(instances.len(), core + halo);
}

#[test]
fn effect_completes_when_all_emitters_complete() {
    let mut effect = two_emitters();
    effect.start();
    for _ in 0..30 {
        effect.update(0.1);
    }
    assert!(effect.is_complete());
    assert_eq!(effect.active_count(), 0);
}

#[test]
fn continuous_effect_completes_once_allowed() {
    let mut effect = two_emitters();
    for emitter in &mut effect.emitters {
        emitter.options_mut().continuous = true;
    }
    effect.start();
    for _ in 0..30 {
        effect.update(0.1);
    }
    assert!(!effect.is_complete());

    effect.allow_completion();
    for _ in 0..15 {
        effect.update(0.1);
    }
    assert!(effect.is_complete());
}

#[test]
fn effect_moves_all_emitters() {
    let mut effect = two_emitters();
    effect.set_position(4.0, 2.0);
    for emitter in &effect.emitters {
        assert_eq!(emitter.position(), Vec2::new(4.0, 2.0));
    }
}

#[test]
fn effect_scale_and_flip() {
    let mut effect = two_emitters();
    *effect.find_emitter_mut("core").unwrap().gravity_mut() = ScaledValue::constant(-10.0);

    effect.scale_effect(2.0);
    effect.flip_y();

    let core = effect.find_emitter("core").unwrap();
    assert_eq!(core.size().high.max, 64.0);
    assert_eq!(core.gravity().high.min, 20.0);
}

#[test]
fn effect_reset_restarts_emitters() {
    let mut effect = two_emitters();
    effect.start();
    for _ in 0..5 {
        effect.update(0.1);
    }
    effect.reset();
    assert_eq!(effect.active_count(), 0);

    effect.update(0.0);
    assert_eq!(effect.active_count(), 2, "one forced particle per emitter");
}

#[test]
fn effect_text_roundtrip() {
    let effect = two_emitters();
    let text = effect.save();
    let loaded = ParticleEffect::load(&text).unwrap();

    assert_eq!(loaded.emitters.len(), 2);
    assert_eq!(loaded.emitters[1].name(), "halo");
    assert_eq!(
        loaded.emitters[1].emission(),
        effect.emitters[1].emission()
    );
    assert_eq!(loaded.emitters[0].active_count(), 0, "loaded effects are idle");
}
