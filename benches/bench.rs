use criterion::{criterion_group, criterion_main, Bencher, Criterion};
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use rb_link_tree::{PrioQueue, RbMap};
use std::hint::black_box;

fn random_keys(count: usize) -> Vec<u32> {
    let mut rng = StdRng::from_seed([0; 32]);
    std::iter::repeat_with(|| rng.gen()).take(count).collect()
}

// insert helper fn
fn rb_map_insert(count: usize, bench: &mut Bencher) {
    let keys = random_keys(count);
    bench.iter(|| {
        let mut map = RbMap::new();
        for k in keys.iter().copied() {
            black_box(map.insert(k, ()));
        }
    });
}

// insert and remove helper fn
fn rb_map_insert_remove(count: usize, bench: &mut Bencher) {
    let keys = random_keys(count);
    let mut to_remove = keys.clone();
    to_remove.shuffle(&mut StdRng::from_seed([1; 32]));
    bench.iter(|| {
        let mut map = RbMap::new();
        for k in keys.iter().copied() {
            black_box(map.insert(k, ()));
        }
        for k in &to_remove {
            black_box(map.remove(k));
        }
    });
}

// in-order walk helper fn
fn rb_map_iter(count: usize, bench: &mut Bencher) {
    let map: RbMap<_, _> = random_keys(count).into_iter().map(|k| (k, ())).collect();
    bench.iter(|| {
        black_box(map.iter().count());
    });
}

// push then drain helper fn
fn prioqueue_push_pop(count: usize, bench: &mut Bencher) {
    let keys = random_keys(count);
    bench.iter(|| {
        let mut queue = PrioQueue::new();
        for k in keys.iter().copied() {
            queue.push(k);
        }
        while let Some(k) = queue.pop() {
            black_box(k);
        }
    });
}

fn bench_rb_map_insert(c: &mut Criterion) {
    c.bench_function("bench_rb_map_insert_100", |b| rb_map_insert(100, b));
    c.bench_function("bench_rb_map_insert_1000", |b| rb_map_insert(1000, b));
    c.bench_function("bench_rb_map_insert_10,000", |b| {
        rb_map_insert(10_000, b)
    });
    c.bench_function("bench_rb_map_insert_100,000", |b| {
        rb_map_insert(100_000, b)
    });
}

fn bench_rb_map_insert_remove(c: &mut Criterion) {
    c.bench_function("bench_rb_map_insert_remove_100", |b| {
        rb_map_insert_remove(100, b)
    });
    c.bench_function("bench_rb_map_insert_remove_1000", |b| {
        rb_map_insert_remove(1000, b)
    });
    c.bench_function("bench_rb_map_insert_remove_10,000", |b| {
        rb_map_insert_remove(10_000, b)
    });
    c.bench_function("bench_rb_map_insert_remove_100,000", |b| {
        rb_map_insert_remove(100_000, b)
    });
}

fn bench_rb_map_iter(c: &mut Criterion) {
    c.bench_function("bench_rb_map_iter_1000", |b| rb_map_iter(1000, b));
    c.bench_function("bench_rb_map_iter_100,000", |b| rb_map_iter(100_000, b));
}

fn bench_prioqueue_push_pop(c: &mut Criterion) {
    c.bench_function("bench_prioqueue_push_pop_1000", |b| {
        prioqueue_push_pop(1000, b)
    });
    c.bench_function("bench_prioqueue_push_pop_100,000", |b| {
        prioqueue_push_pop(100_000, b)
    });
}

fn criterion_config() -> Criterion {
    Criterion::default().configure_from_args().without_plots()
}

criterion_group! {
    name = benches_basic_op;
    config = criterion_config();
    targets = bench_rb_map_insert, bench_rb_map_insert_remove,
}

criterion_group! {
    name = benches_walk;
    config = criterion_config();
    targets = bench_rb_map_iter, bench_prioqueue_push_pop
}

criterion_main!(benches_basic_op, benches_walk);
