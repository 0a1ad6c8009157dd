use criterion::{black_box, criterion_group, criterion_main, Criterion};
use yadro::ZipList;

fn bench_push_strings(c: &mut Criterion) {
    c.bench_function("ziplist push 128 strings", |b| {
        b.iter(|| {
            let mut zl = ZipList::new();
            for i in 0..128 {
                zl.push_back(format!("value-{i}").as_bytes());
            }
            zl
        })
    });
}

fn bench_push_integers(c: &mut Criterion) {
    c.bench_function("ziplist push 128 integers", |b| {
        b.iter(|| {
            let mut zl = ZipList::new();
            for i in 0..128 {
                zl.push_back(i.to_string().as_bytes());
            }
            zl
        })
    });
}

fn bench_index_middle(c: &mut Criterion) {
    c.bench_function("ziplist index middle of 128", |b| {
        let mut zl = ZipList::new();
        for i in 0..128 {
            zl.push_back(i.to_string().as_bytes());
        }

        b.iter(|| black_box(zl.index(black_box(64))))
    });
}

fn bench_find(c: &mut Criterion) {
    c.bench_function("ziplist find last of 128", |b| {
        let mut zl = ZipList::new();
        for i in 0..128 {
            zl.push_back(format!("key-{i}").as_bytes());
        }
        let head = zl.index(0).unwrap();

        b.iter(|| black_box(zl.find(head, b"key-127", 0)))
    });
}

fn bench_cascade(c: &mut Criterion) {
    c.bench_function("ziplist head insert with cascade", |b| {
        b.iter(|| {
            // Записи у границы 254: вставка в голову прокатывает каскад.
            let mut zl = ZipList::new();
            for _ in 0..32 {
                zl.push_back(&[b'x'; 250]);
            }
            zl.push_front(&[b'H'; 300]);
            zl
        })
    });
}

criterion_group!(
    benches,
    bench_push_strings,
    bench_push_integers,
    bench_index_middle,
    bench_find,
    bench_cascade
);
criterion_main!(benches);
