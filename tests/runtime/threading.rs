use super::helpers::*;

use confetti::{ParticleEmitter, ParticleInstance, ScaledValue};
use crossbeam_channel::{Receiver, Sender};

fn moving_config(seed: u64) -> confetti::EmitterConfig {
    let mut config = config(40.0, 2.0, 1.0);
    config.speed = ScaledValue::new(
        confetti::Range::new(20.0, 60.0),
        confetti::Range::new(20.0, 60.0),
        Default::default(),
    );
    config.direction = ScaledValue::new(
        confetti::Range::zero(),
        confetti::Range::new(0.0, 360.0),
        Default::default(),
    );
    config.fixed_seed = Some(seed);
    config
}

fn simulate(mut emitter: ParticleEmitter) -> Vec<ParticleInstance> {
    emitter.start();
    run(&mut emitter, 1.0 / 60.0, 90);
    let mut instances = Vec::new();
    emitter.write_instances(&mut instances);
    instances
}

#[test]
fn emitters_simulate_on_worker_threads() {
    let (sender, receiver): (Sender<(u64, Vec<ParticleInstance>)>, Receiver<_>) =
        crossbeam_channel::unbounded();

    let workers: Vec<_> = (0..4u64)
        .map(|seed| {
            let sender = sender.clone();
            let emitter = emitter(moving_config(seed));
            std::thread::spawn(move || {
                sender
                    .send((seed, simulate(emitter)))
                    .expect("receiver should be alive");
            })
        })
        .collect();
    drop(sender);

    for worker in workers {
        worker.join().expect("worker should not panic");
    }

    let mut results: Vec<_> = receiver.iter().collect();
    results.sort_by_key(|(seed, _)| *seed);
    assert_eq!(results.len(), 4);

    for (seed, instances) in results {
        assert!(!instances.is_empty());
        let local = simulate(emitter(moving_config(seed)));
        assert_eq!(instances, local, "seed {seed} should simulate identically");
    }
}

#[test]
fn different_seeds_diverge() {
    let a = simulate(emitter(moving_config(1)));
    let b = simulate(emitter(moving_config(2)));
    assert_eq!(a.len(), b.len());
    assert_ne!(a, b);
}
