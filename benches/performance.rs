use criterion::{criterion_group, criterion_main, Criterion};
use futures::executor::block_on;
use strata_core::dynamic::Dynamic;
use strata_core::item::Id;
use strata_iter::{
    AndIterator, BoxedIterator, FilterIterator, FilterType, OrderByIterator, RecordIterator,
    UnionIterator, VecIterator,
};

/// Descending ids below `n` that are multiples of `step`.
fn stride(n: Id, step: Id) -> BoxedIterator {
    Box::new(VecIterator::from_ids((0..n).rev().filter(move |id| id % step == 0)))
}

fn rows(n: Id) -> BoxedIterator {
    Box::new(VecIterator::from_values((0..n).rev().map(|id| {
        let bucket = (id * 7919 % 101) as i64;
        (id, Dynamic::object_from([("bucket", bucket)]))
    })))
}

fn drain(it: &mut dyn RecordIterator) -> usize {
    block_on(it.prepare()).unwrap();
    let mut n = 0;
    while it.next().unwrap() {
        n += 1;
    }
    n
}

fn bench_set_algebra(c: &mut Criterion) {
    const N: Id = 100_000;
    c.bench_function("and_3_way", |b| {
        b.iter(|| {
            let mut it = AndIterator::new(vec![stride(N, 2), stride(N, 3), stride(N, 5)]);
            drain(&mut it)
        })
    });
    c.bench_function("union_3_way", |b| {
        b.iter(|| {
            let mut it = UnionIterator::new(vec![stride(N, 2), stride(N, 3), stride(N, 5)]);
            drain(&mut it)
        })
    });
}

fn bench_transforms(c: &mut Criterion) {
    const N: Id = 20_000;
    c.bench_function("filter_gt", |b| {
        b.iter(|| {
            let mut it = FilterIterator::with_filter(
                rows(N),
                vec!["bucket".to_string()],
                vec![Dynamic::Int(50)],
                FilterType::Gt,
            )
            .unwrap();
            drain(&mut it)
        })
    });
    c.bench_function("order_by", |b| {
        b.iter(|| {
            let mut it = OrderByIterator::new(rows(N), vec!["bucket".to_string()]);
            drain(&mut it)
        })
    });
}

criterion_group!(kernels, bench_set_algebra, bench_transforms);
criterion_main!(kernels);
