use bevy::prelude::*;

use crate::{
    asset::ParticleEffectAsset,
    runtime::{EffectRuntime, ParticleEffect2D},
};

pub fn setup_particle_effects(
    mut commands: Commands,
    query: Query<(Entity, &ParticleEffect2D), Without<EffectRuntime>>,
    assets: Res<Assets<ParticleEffectAsset>>,
) {
    for (entity, particle_effect) in query.iter() {
        let Some(asset) = assets.get(&particle_effect.handle) else {
            continue;
        };

        let effect = match asset.instantiate() {
            Ok(effect) => effect,
            Err(err) => {
                warn!("{entity:?}: could not instantiate effect \"{}\": {err}", asset.name);
                continue;
            }
        };

        debug!(
            "{entity:?}: instantiated effect \"{}\" with {} emitters",
            asset.name,
            effect.emitters.len()
        );
        commands.entity(entity).insert(EffectRuntime::new(effect));
    }
}

/// Drops runtimes whose asset was modified or whose handle changed, so
/// [`setup_particle_effects`] rebuilds them from the current asset.
pub fn reload_particle_effects(
    mut commands: Commands,
    mut asset_events: MessageReader<AssetEvent<ParticleEffectAsset>>,
    query: Query<(Entity, Ref<ParticleEffect2D>), With<EffectRuntime>>,
) {
    let modified: Vec<AssetId<ParticleEffectAsset>> = asset_events
        .read()
        .filter_map(|event| match event {
            AssetEvent::Modified { id } => Some(*id),
            _ => None,
        })
        .collect();

    for (entity, particle_effect) in query.iter() {
        if particle_effect.is_changed() || modified.contains(&particle_effect.handle.id()) {
            debug!("{entity:?}: reloading particle effect");
            commands.entity(entity).remove::<EffectRuntime>();
        }
    }
}

pub fn update_particle_effects(
    time: Res<Time>,
    mut query: Query<(&Transform, &mut EffectRuntime)>,
) {
    let delta = time.delta_secs();
    for (transform, mut runtime) in query.iter_mut() {
        if runtime.paused {
            continue;
        }
        let translation = transform.translation;
        runtime.effect.set_position(translation.x, translation.y);
        runtime.effect.update(delta);
    }
}

pub fn cleanup_particle_effects(
    mut commands: Commands,
    mut removed_effects: RemovedComponents<ParticleEffect2D>,
    runtimes: Query<(), With<EffectRuntime>>,
) {
    for entity in removed_effects.read() {
        if runtimes.contains(entity) {
            commands.entity(entity).remove::<EffectRuntime>();
        }
    }
}
