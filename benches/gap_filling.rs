//! Benchmarks for `reconstruct` on a synthetic recording with missed detections.
//!
//!   cargo bench --bench gap_filling
//!   cargo bench --bench gap_filling -- gap_filling/bots_50

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use swarmkin::kinematics::detection::{Detection, Frame};
use swarmkin::kinematics::gap_filling::reconstruct;

/// `bots` robots over `frames` frames; robot `i` is missed in frame `k` when `(i·7 + k·13) % 10 < 2`.
fn noisy_recording(bots: usize, frames: usize) -> Vec<Frame> {
    (0..frames)
        .map(|k| {
            (0..bots)
                .filter(|&i| k == 0 || (i * 7 + k * 13) % 10 >= 2)
                .map(|i| Detection::new(i as u32, 0.0, (i * 40 + k) as f64, (k % 17) as f64))
                .collect()
        })
        .collect()
}

fn bench_reconstruct(c: &mut Criterion) {
    let mut group = c.benchmark_group("gap_filling");

    for bots in [10usize, 50, 200] {
        let raw = noisy_recording(bots, 2_000);
        group.bench_with_input(BenchmarkId::new("bots", bots), &raw, |b, raw| {
            b.iter(|| {
                let traj = reconstruct(bots, black_box(raw)).expect("reconstruct");
                black_box(traj.len());
            })
        });
    }

    group.finish();
}

criterion_group!(gap_filling_benches, bench_reconstruct);
criterion_main!(gap_filling_benches);
