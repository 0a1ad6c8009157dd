//! Интеграционные тесты упорядоченного множества: повышение представления
//! и агрегация.

use yadro::{Aggregate, ScoreRange, Sds, ZAggInput, ZSet, ZSetEncoding};

fn sds(s: &str) -> Sds {
    Sds::from_str(s)
}

/// Сценарий повышения: 128 элементов по 8 байт — упакованная форма,
/// 129-й переводит в skiplist; содержимое неизменно.
#[test]
fn test_promotion_preserves_contents() {
    let mut z = ZSet::new();

    for i in 0..128 {
        let ele = Sds::from_str(&format!("elem{i:04}"));
        z.add(ele, i as f64).unwrap();
    }

    assert_eq!(z.encoding(), ZSetEncoding::ZipList);
    assert_eq!(z.len(), 128);

    let before = z.entries();

    z.add(sds("straw0129"), 64.5).unwrap();

    assert_eq!(z.encoding(), ZSetEncoding::SkipList);
    assert_eq!(z.len(), 129);
    assert!(z.validate().is_ok());

    for (ele, score) in before {
        assert_eq!(z.score(&ele), Some(score), "потерян {ele}");
    }

    assert_eq!(z.score(&sds("straw0129")), Some(64.5));

    // Повышение необратимо, пока множество не опустело.
    for i in 0..120 {
        z.remove(&Sds::from_str(&format!("elem{i:04}")));
    }

    assert_eq!(z.encoding(), ZSetEncoding::SkipList);
}

/// Пересечение с весами и агрегацией: сценарий из двух множеств.
#[test]
fn test_weighted_intersection_scenario() {
    let mut a = ZSet::new();
    let mut b = ZSet::new();

    for (e, s) in [("a", 1.0), ("b", 2.0), ("c", 3.0)] {
        a.add(sds(e), s).unwrap();
    }

    for (e, s) in [("b", 10.0), ("c", 20.0), ("d", 30.0)] {
        b.add(sds(e), s).unwrap();
    }

    let sum = ZSet::intersect_store(
        &[ZAggInput::ZSet(&a), ZAggInput::ZSet(&b)],
        Some(&[2.0, 3.0]),
        Aggregate::Sum,
    )
    .unwrap();

    assert_eq!(sum.len(), 2);
    assert_eq!(sum.score(&sds("b")), Some(34.0));
    assert_eq!(sum.score(&sds("c")), Some(66.0));

    let min = ZSet::intersect_store(
        &[ZAggInput::ZSet(&a), ZAggInput::ZSet(&b)],
        Some(&[2.0, 3.0]),
        Aggregate::Min,
    )
    .unwrap();

    assert_eq!(min.score(&sds("b")), Some(4.0));
    assert_eq!(min.score(&sds("c")), Some(6.0));
}

/// Смена оценки перемещает элемент без дублирования в обоих
/// представлениях.
#[test]
fn test_score_update_keeps_single_instance() {
    for thresholds in [(128, 64), (2, 64)] {
        let mut z = ZSet::with_thresholds(thresholds.0, thresholds.1);

        for i in 0..10 {
            z.add(Sds::from_str(&format!("m{i}")), i as f64).unwrap();
        }

        for i in 0..10 {
            z.add(Sds::from_str(&format!("m{i}")), (9 - i) as f64).unwrap();
        }

        assert_eq!(z.len(), 10);
        assert!(z.validate().is_ok());

        let order: Vec<_> = z.entries().into_iter().map(|(e, _)| e).collect();
        let expected: Vec<_> = (0..10)
            .rev()
            .map(|i| Sds::from_str(&format!("m{i}")))
            .collect();

        assert_eq!(order, expected);
    }
}

/// Диапазонные запросы согласованы между представлениями.
#[test]
fn test_representations_agree() {
    let mut packed = ZSet::with_thresholds(1000, 64);
    let mut skip = ZSet::with_thresholds(1, 64);

    let pairs: Vec<(Sds, f64)> = (0..50)
        .map(|i| (Sds::from_str(&format!("k{i:02}")), (i % 7) as f64))
        .collect();

    for (e, s) in &pairs {
        packed.add(e.clone(), *s).unwrap();
        skip.add(e.clone(), *s).unwrap();
    }

    assert_eq!(packed.encoding(), ZSetEncoding::ZipList);
    assert_eq!(skip.encoding(), ZSetEncoding::SkipList);

    assert_eq!(packed.entries(), skip.entries());

    let range = ScoreRange::inclusive(2.0, 5.0).unwrap();

    assert_eq!(
        packed.range_by_score(&range, 0, None, false),
        skip.range_by_score(&range, 0, None, false)
    );
    assert_eq!(
        packed.range_by_score(&range, 3, Some(5), true),
        skip.range_by_score(&range, 3, Some(5), true)
    );
    assert_eq!(
        packed.count_in_score_range(&range),
        skip.count_in_score_range(&range)
    );
    assert_eq!(
        packed.range_by_rank(5, 25, false),
        skip.range_by_rank(5, 25, false)
    );

    for (e, _) in &pairs {
        assert_eq!(packed.rank(e, false), skip.rank(e, false));
        assert_eq!(packed.rank(e, true), skip.rank(e, true));
    }
}

/// Объединение наборов и множеств: набору приписывается оценка 1.
#[test]
fn test_union_with_plain_set() {
    let mut z = ZSet::new();

    z.add(sds("x"), 5.0).unwrap();
    z.add(sds("y"), 6.0).unwrap();

    let mut s = std::collections::HashSet::new();
    s.insert(sds("y"));
    s.insert(sds("z"));

    let out = ZSet::union_store(
        &[ZAggInput::ZSet(&z), ZAggInput::Set(&s)],
        None,
        Aggregate::Sum,
    )
    .unwrap();

    assert_eq!(out.len(), 3);
    assert_eq!(out.score(&sds("x")), Some(5.0));
    assert_eq!(out.score(&sds("y")), Some(7.0));
    assert_eq!(out.score(&sds("z")), Some(1.0));
    assert_eq!(out.encoding(), ZSetEncoding::ZipList);
}
