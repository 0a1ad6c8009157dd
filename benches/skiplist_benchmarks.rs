use criterion::{black_box, criterion_group, criterion_main, Criterion};
use yadro::{ScoreRange, Sds, SkipList};

fn bench_insert(c: &mut Criterion) {
    c.bench_function("skiplist insert 1000", |b| {
        b.iter(|| {
            let mut sl = SkipList::with_seed(1);
            for i in 0..1000 {
                sl.insert(i as f64, Sds::from_str(&i.to_string()));
            }
            sl
        })
    });
}

fn bench_rank(c: &mut Criterion) {
    c.bench_function("skiplist rank_of in 10k", |b| {
        let mut sl = SkipList::with_seed(2);
        for i in 0..10_000 {
            sl.insert(i as f64, Sds::from_str(&format!("e{i}")));
        }
        let probe = Sds::from_str("e7777");

        b.iter(|| black_box(sl.rank_of(7777.0, &probe)))
    });
}

fn bench_by_rank(c: &mut Criterion) {
    c.bench_function("skiplist by_rank in 10k", |b| {
        let mut sl = SkipList::with_seed(3);
        for i in 0..10_000 {
            sl.insert(i as f64, Sds::from_str(&format!("e{i}")));
        }

        b.iter(|| black_box(sl.by_rank(black_box(5000))))
    });
}

fn bench_range(c: &mut Criterion) {
    c.bench_function("skiplist first_in_score_range in 10k", |b| {
        let mut sl = SkipList::with_seed(4);
        for i in 0..10_000 {
            sl.insert(i as f64, Sds::from_str(&format!("e{i}")));
        }
        let range = ScoreRange::inclusive(4000.0, 6000.0).unwrap();

        b.iter(|| black_box(sl.first_in_score_range(&range)))
    });
}

criterion_group!(benches, bench_insert, bench_rank, bench_by_rank, bench_range);
criterion_main!(benches);
