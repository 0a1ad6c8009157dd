#![no_main]
use arbitrary::{Arbitrary, Unstructured};
use libfuzzer_sys::fuzz_target;
use yadro::{Sds, ZSet};

#[derive(Debug, Arbitrary)]
enum Op {
    Add(u8, i16),
    Remove(u8),
    RemoveRank(i8, i8),
}

fuzz_target!(|data: &[u8]| {
    let mut u = Unstructured::new(data);

    // Низкие пороги: последовательности часто пересекают повышение.
    let mut z = ZSet::with_thresholds(6, 12);

    while let Ok(op) = Op::arbitrary(&mut u) {
        match op {
            Op::Add(id, score) => {
                let ele = Sds::from_str(&format!("m{id}"));
                z.add(ele, score as f64).unwrap();
            }
            Op::Remove(id) => {
                z.remove(&Sds::from_str(&format!("m{id}")));
            }
            Op::RemoveRank(start, end) => {
                z.remove_range_by_rank(start as isize, end as isize);
            }
        }

        z.validate().expect("инварианты zset нарушены");
    }
});
