#![no_main]
use arbitrary::{Arbitrary, Unstructured};
use libfuzzer_sys::fuzz_target;
use yadro::ZipList;

/// Одна операция над упакованным списком.
#[derive(Debug, Arbitrary)]
enum Op {
    PushBack(Vec<u8>),
    PushFront(Vec<u8>),
    InsertAt(u16, Vec<u8>),
    Delete(u16),
    DeleteRange(u16, u8),
    Find(Vec<u8>, u8),
}

/// Нагрузки, бьющие по границе 254 байта поля prevlen.
fn stretch(
    u: &mut Unstructured<'_>,
    mut payload: Vec<u8>,
) -> arbitrary::Result<Vec<u8>> {
    if u.ratio(1, 3)? {
        let target = u.int_in_range(244usize..=266)?;
        payload.resize(target, b'x');
    }

    Ok(payload)
}

fuzz_target!(|data: &[u8]| {
    let mut u = Unstructured::new(data);
    let mut zl = ZipList::new();
    let mut len = 0usize;

    while let Ok(op) = Op::arbitrary(&mut u) {
        match op {
            Op::PushBack(p) => {
                let p = match stretch(&mut u, p) {
                    Ok(p) => p,
                    Err(_) => break,
                };

                zl.push_back(&p);
                len += 1;
            }
            Op::PushFront(p) => {
                let p = match stretch(&mut u, p) {
                    Ok(p) => p,
                    Err(_) => break,
                };

                zl.push_front(&p);
                len += 1;
            }
            Op::InsertAt(idx, p) => {
                let idx = idx as usize % (len + 1);

                if idx == len {
                    zl.push_back(&p);
                } else {
                    let at = zl.index(idx as isize).unwrap();
                    zl.insert_at(at, &p);
                }

                len += 1;
            }
            Op::Delete(idx) => {
                if len > 0 {
                    let at = zl.index((idx as usize % len) as isize).unwrap();
                    zl.delete(at);
                    len -= 1;
                }
            }
            Op::DeleteRange(idx, count) => {
                if len > 0 {
                    let idx = idx as usize % len;
                    let count = 1 + count as usize % 4;

                    zl.delete_range(idx as isize, count);
                    len -= count.min(len - idx);
                }
            }
            Op::Find(target, skip) => {
                let _ = zl.find(10, &target, skip as usize % 4);
            }
        }

        zl.validate().expect("инварианты блоба нарушены");
        assert_eq!(zl.len(), len);
    }

    // Блоб восстанавливается из собственных байтов.
    let restored = ZipList::from_bytes(zl.as_bytes().to_vec());
    assert_eq!(restored.len(), len);
});
