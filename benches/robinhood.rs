#![allow(
    missing_docs,
    clippy::missing_docs_in_private_items,
    clippy::unwrap_used,
    clippy::similar_names
)]
use std::collections::HashMap;

use criterion::{Criterion, criterion_group, criterion_main};
use proptest::{
    collection::vec,
    prelude::{Strategy, any},
    strategy::ValueTree,
    test_runner::TestRunner,
};
use robinhood::{Mapping, RobinHoodMap};

const ITEMS_AMOUNT: usize = 1000;
const SAMPLE_SIZE: usize = 10;

fn fill<M: Mapping<String, String>>(map: &mut M, items: &[(String, String)]) {
    for (key, value) in items {
        map.insert(key.clone(), value.clone());
    }
}

fn lookup<M: Mapping<String, String>>(map: &M, items: &[(String, String)]) -> usize {
    items.iter().filter(|(key, _)| map.contains_key(key)).count()
}

fn drain<M: Mapping<String, String>>(map: &mut M, items: &[(String, String)]) {
    for (key, _) in items {
        map.remove(key);
    }
}

fn hash_map_benches(c: &mut Criterion) {
    let mut runner = TestRunner::default();
    let items = vec(any::<(String, String)>(), ITEMS_AMOUNT)
        .new_tree(&mut runner)
        .unwrap()
        .current();

    let mut group = c.benchmark_group("Hash map comparison benchmark");
    group.sample_size(SAMPLE_SIZE);

    group.bench_function("robinhood insert", |b| {
        b.iter(|| {
            let mut map = RobinHoodMap::new();
            fill(&mut map, &items);
            map
        });
    });
    group.bench_function("rust std insert", |b| {
        b.iter(|| {
            let mut map = HashMap::new();
            fill(&mut map, &items);
            map
        });
    });

    let mut robinhood_map = RobinHoodMap::new();
    fill(&mut robinhood_map, &items);
    let mut rust_map = HashMap::new();
    fill(&mut rust_map, &items);

    group.bench_function("robinhood get", |b| {
        b.iter(|| lookup(&robinhood_map, &items));
    });
    group.bench_function("rust std get", |b| {
        b.iter(|| lookup(&rust_map, &items));
    });

    group.bench_function("robinhood insert and remove", |b| {
        b.iter(|| {
            let mut map = RobinHoodMap::new();
            fill(&mut map, &items);
            drain(&mut map, &items);
            map.len()
        });
    });
    group.bench_function("rust std insert and remove", |b| {
        b.iter(|| {
            let mut map = HashMap::new();
            fill(&mut map, &items);
            drain(&mut map, &items);
            map.len()
        });
    });
    group.finish();
}

criterion_group!(benches, hash_map_benches);

criterion_main!(benches);
