use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tasha_core::{CategoryState, EventConfig};

fn random_states(rng: &mut ChaCha8Rng, event: &EventConfig) -> Vec<CategoryState> {
    event
        .premium_categories()
        .map(|r| CategoryState::new(r.id.clone(), rng.gen_range(0..=r.cap())))
        .collect()
}

fn bench_plan(c: &mut Criterion) {
    let event = EventConfig::reference();
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let inputs: Vec<(u64, Vec<CategoryState>)> = (0..256)
        .map(|_| (rng.gen_range(0..200_000), random_states(&mut rng, &event)))
        .collect();
    c.bench_function("plan 256 random players", |b| {
        b.iter(|| {
            for (budget, states) in &inputs {
                let _ = black_box(tasha_planner::plan_spending(&event, *budget, states));
            }
        })
    });
}

criterion_group!(benches, bench_plan);
criterion_main!(benches);
