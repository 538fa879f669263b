//! Hot-path benchmark: one engine tick across a scene-sized track count.

use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

use easel_animation_core::{AnimationClip, AnimationEngine, Easing, Keyframe};
use easel_api_core::AnimatableProperty;
use easel_scene_core::{NullBackend, ObjectKind, SceneObjectData, SceneObjectRegistry};

const OBJECTS: usize = 20;

/// A looping clip driving the full transform of `OBJECTS` meshes: 9 tracks
/// per object, two keyframes each.
fn build_scene() -> (AnimationEngine, SceneObjectRegistry<NullBackend>) {
    let mut registry = SceneObjectRegistry::new(NullBackend);
    let mut clip = AnimationClip::new("bench", 2.0);
    clip.looping = true;

    for i in 0..OBJECTS {
        let id = registry
            .add(SceneObjectData::new(ObjectKind::Mesh, format!("mesh-{i}")), None)
            .expect("null backend never fails");
        for property in AnimatableProperty::TRANSFORM_COMPONENTS {
            clip.add_keyframe(&id, property, Keyframe::new(0.0, 0.0))
                .unwrap();
            clip.add_keyframe(
                &id,
                property,
                Keyframe::new(2.0, 10.0).with_easing(Easing::QuadInOut),
            )
            .unwrap();
        }
    }

    let mut engine = AnimationEngine::new();
    engine.load_clip(clip);
    engine.play().expect("active clip is loaded");
    (engine, registry)
}

fn animation_step(c: &mut Criterion) {
    let (mut engine, mut registry) = build_scene();
    c.bench_function("tick_180_tracks", |b| {
        b.iter(|| {
            engine.tick(black_box(1.0 / 60.0), &mut registry);
            // Drain loop events so the queue stays flat across iterations.
            black_box(engine.take_events());
        })
    });
}

criterion_group!(benches, animation_step);
criterion_main!(benches);
