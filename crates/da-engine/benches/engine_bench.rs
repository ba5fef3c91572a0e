//! Playback engine throughput: binding requests and ticking a busy pool.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use da_device::VirtualOutput;
use da_engine::{AudioManager, ManagerConfig};
use da_ir::{AudioEffect, Clip, ClipBank, ClipKey};

const DT: f32 = 1.0 / 60.0;

fn manager(pool_size: usize) -> (AudioManager<VirtualOutput>, ClipKey) {
    let mut clips = ClipBank::with_key();
    let clip = clips.insert(Clip::new("loop", 10.0));
    let config = ManagerConfig::default().with_pool_size(pool_size).with_auto_expand(false).with_seed(0);
    let manager = AudioManager::new(config, clips, VirtualOutput::new(), ()).unwrap();
    (manager, clip)
}

fn bench_bind(c: &mut Criterion) {
    let mut group = c.benchmark_group("bind");
    for size in [8usize, 32, 128] {
        group.bench_function(BenchmarkId::new("fill_pool", size), |b| {
            b.iter_batched(
                || manager(size),
                |(mut manager, clip)| {
                    for _ in 0..size {
                        black_box(manager.sound(clip).randomize_pitch().effect(AudioEffect::Echo).play());
                    }
                    manager
                },
                criterion::BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("update");
    for size in [8usize, 32, 128] {
        let (mut manager, clip) = manager(size);
        for _ in 0..size {
            manager.sound(clip).looped(true).fade(5.0).play();
        }
        group.bench_function(BenchmarkId::new("fading_pool", size), |b| {
            b.iter(|| {
                manager.output_mut().advance(DT);
                manager.update(black_box(DT));
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_bind, bench_update);
criterion_main!(benches);
