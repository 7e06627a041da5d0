#![allow(dead_code)]

use bevy::asset::{AssetPlugin, AssetServer, LoadState};
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use confetti::asset::ParticleEffectAsset;
use confetti::prelude::*;
use confetti::{ParticleEmitter, ScaledValue};
use std::path::Path;
use std::time::Duration;

pub const FRAME: Duration = Duration::from_millis(100);

pub fn fixtures_path() -> String {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .to_string_lossy()
        .to_string()
}

pub fn read_fixture(filename: &str) -> String {
    let path = Path::new(&fixtures_path()).join(filename);
    std::fs::read_to_string(&path).unwrap_or_else(|err| panic!("{path:?}: {err}"))
}

/// An app with the plugin installed and a fixed 100ms frame time.
pub fn create_minimal_app() -> App {
    let mut app = App::new();

    app.add_plugins(
        MinimalPlugins.set(bevy::app::ScheduleRunnerPlugin::run_loop(
            std::time::Duration::from_millis(10),
        )),
    );

    app.add_plugins(AssetPlugin {
        file_path: fixtures_path(),
        ..default()
    });

    app.add_plugins(ConfettiPlugin);
    app.insert_resource(TimeUpdateStrategy::ManualDuration(FRAME));

    app
}

pub fn load_fixture(app: &mut App, filename: &str) -> Handle<ParticleEffectAsset> {
    let asset_server = app.world().resource::<AssetServer>();
    asset_server.load(filename.to_string())
}

pub fn run_until_loaded<T: Asset>(app: &mut App, handle: &Handle<T>, max_updates: u32) -> bool {
    for _ in 0..max_updates {
        app.update();

        let asset_server = app.world().resource::<AssetServer>();
        match asset_server.load_state(handle) {
            LoadState::Loaded => return true,
            LoadState::Failed(_) => return false,
            _ => continue,
        }
    }
    false
}

pub fn run_until_failed<T: Asset>(app: &mut App, handle: &Handle<T>, max_updates: u32) -> bool {
    for _ in 0..max_updates {
        app.update();

        let asset_server = app.world().resource::<AssetServer>();
        match asset_server.load_state(handle) {
            LoadState::Failed(_) => return true,
            LoadState::Loaded => return false,
            _ => continue,
        }
    }
    false
}

pub fn spawn_particle_effect(app: &mut App, handle: Handle<ParticleEffectAsset>) -> Entity {
    app.world_mut().spawn(ParticleEffect2D { handle }).id()
}

pub fn setup_loaded_effect(fixture: &str) -> (App, Handle<ParticleEffectAsset>, Entity) {
    let mut app = create_minimal_app();
    let handle = load_fixture(&mut app, fixture);
    let entity = spawn_particle_effect(&mut app, handle.clone());
    assert!(
        run_until_loaded(&mut app, &handle, 100),
        "fixture should load"
    );
    advance_frames(&mut app, 2);
    (app, handle, entity)
}

pub fn load_asset(app: &mut App, fixture: &str) -> ParticleEffectAsset {
    let handle = load_fixture(app, fixture);
    for _ in 0..100 {
        app.update();
        let asset_server = app.world().resource::<AssetServer>();
        match asset_server.load_state(&handle) {
            LoadState::Loaded => {
                let assets = app
                    .world()
                    .resource::<bevy::asset::Assets<ParticleEffectAsset>>();
                return assets.get(&handle).expect("asset should exist").clone();
            }
            LoadState::Failed(err) => {
                panic!("fixture failed to load '{fixture}': {err:?}");
            }
            _ => continue,
        }
    }
    panic!("fixture timed out loading: {fixture}");
}

pub fn advance_frames(app: &mut App, n: u32) {
    for _ in 0..n {
        app.update();
    }
}

pub fn runtime(app: &mut App, entity: Entity) -> &EffectRuntime {
    app.world()
        .get::<EffectRuntime>(entity)
        .expect("entity should have an effect runtime")
}

/// A seeded emitter configuration with a constant emission rate and life,
/// and no motion.
pub fn config(rate: f32, life: f32, duration: f32) -> EmitterConfig {
    EmitterConfig {
        name: "test".to_string(),
        duration: RangedValue::constant(duration),
        count: ParticleCount { min: 0, max: 1000 },
        emission: ScaledValue::constant(rate),
        life: ScaledValue::constant(life),
        speed: ScaledValue::inactive(),
        direction: ScaledValue::inactive(),
        rotation: ScaledValue::inactive(),
        opacity: ScaledValue::constant(1.0),
        fixed_seed: Some(42),
        ..Default::default()
    }
}

pub fn emitter(config: EmitterConfig) -> ParticleEmitter {
    ParticleEmitter::new(config).expect("config should be valid")
}

pub fn started(config: EmitterConfig) -> ParticleEmitter {
    let mut emitter = emitter(config);
    emitter.start();
    emitter
}

/// Runs `steps` updates of `dt` seconds each.
pub fn run(emitter: &mut ParticleEmitter, dt: f32, steps: usize) {
    for _ in 0..steps {
        emitter.update(dt);
    }
}

pub fn assert_close(actual: f32, expected: f32, tolerance: f32) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {expected} ± {tolerance}, got {actual}"
    );
}
