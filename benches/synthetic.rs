use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use raysweeper::{generators, input::Scene, status::StatusTree, SweepOptions};

fn sweep_scenes(c: &mut Criterion) {
    let options = SweepOptions::default();
    let mut group = c.benchmark_group("sweep");
    let scenes: [(&str, fn(usize) -> Scene); 4] = [
        ("pillars", generators::pillars),
        ("slanted pillars", generators::slanted_pillars),
        ("blinds", generators::blinds),
        ("fan", |n| generators::fan(16 * n)),
    ];

    for (name, make) in scenes {
        for n in [4, 16] {
            let scene = make(n);
            group.bench_with_input(BenchmarkId::new(name, n), &scene, |b, scene| {
                b.iter(|| black_box(scene.visible(&options)))
            });
        }
    }
    group.finish();
}

fn status_tree(c: &mut Criterion) {
    // A scrambled insertion order, so the tree has to rebalance.
    let keys: Vec<u32> = (0..1024u32).map(|i| i.wrapping_mul(2654435761) >> 22).collect();

    c.bench_function("status tree insert and remove", |b| {
        b.iter(|| {
            let mut tree = StatusTree::with_capacity(keys.len());
            for (id, &k) in keys.iter().enumerate() {
                let _ = tree.insert(id, k);
            }
            for id in 0..keys.len() {
                let _ = tree.remove(id);
            }
            black_box(tree.len())
        })
    });
}

criterion_group!(benches, sweep_scenes, status_tree);
criterion_main!(benches);
