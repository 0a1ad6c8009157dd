//! Интеграционные тесты пропускного списка: ранги, диапазоны, удаления.

use yadro::{LexRange, ScoreRange, Sds, SkipList};

fn sds(s: &str) -> Sds {
    Sds::from_str(s)
}

/// Ранговый сценарий: нечётные оценки 1..9.
#[test]
fn test_rank_and_range_scenario() {
    let mut sl = SkipList::with_seed(11);

    for i in [1, 3, 5, 7, 9] {
        sl.insert(i as f64, Sds::from_str(&format!("e{i}")));
    }

    assert_eq!(sl.rank_of(5.0, &sds("e5")), 3);

    let range = ScoreRange::new(4.0, 8.0, false, false).unwrap();

    assert_eq!(sl.first_in_score_range(&range).unwrap().element(), &sds("e5"));
    assert_eq!(sl.last_in_score_range(&range).unwrap().element(), &sds("e7"));

    let removed = sl.delete_range_by_rank(2, 4);
    assert_eq!(removed.len(), 3);

    let rest: Vec<_> = sl.iter().map(|(e, _)| e.clone()).collect();
    assert_eq!(rest, vec![sds("e1"), sds("e9")]);

    assert!(sl.validate_invariants().is_ok());
}

/// Пограничные диапазоны: пустые, вырожденные, бесконечные.
#[test]
fn test_range_edges() {
    let mut sl = SkipList::with_seed(3);

    for i in 0..10 {
        sl.insert(i as f64, Sds::from_str(&i.to_string()));
    }

    let empty = ScoreRange::new(5.0, 5.0, true, false).unwrap();
    assert!(sl.first_in_score_range(&empty).is_none());

    let point = ScoreRange::inclusive(5.0, 5.0).unwrap();
    assert_eq!(
        sl.first_in_score_range(&point).unwrap().element(),
        &sds("5")
    );

    let unbounded =
        ScoreRange::new(f64::NEG_INFINITY, f64::INFINITY, false, false).unwrap();
    assert_eq!(sl.first_in_score_range(&unbounded).unwrap().element(), &sds("0"));
    assert_eq!(sl.last_in_score_range(&unbounded).unwrap().element(), &sds("9"));
}

/// Лексикографические диапазоны при общей оценке.
#[test]
fn test_lex_scenario() {
    let mut sl = SkipList::with_seed(5);

    for e in ["alpha", "beta", "gamma", "delta", "omega"] {
        sl.insert(0.0, sds(e));
    }

    let range = LexRange::parse(b"[beta", b"(omega").unwrap();

    assert_eq!(sl.first_in_lex_range(&range).unwrap().element(), &sds("beta"));
    assert_eq!(sl.last_in_lex_range(&range).unwrap().element(), &sds("gamma"));

    let removed = sl.delete_range_by_lex(&range);
    let names: Vec<_> = removed.into_iter().map(|(e, _)| e).collect();

    assert_eq!(names, vec![sds("beta"), sds("delta"), sds("gamma")]);
    assert!(sl.validate_invariants().is_ok());
}

/// Большой объём: инварианты и согласованность рангов сохраняются.
#[test]
fn test_bulk_consistency() {
    let mut sl = SkipList::with_seed(1234);

    for i in 0..5000u64 {
        let score = ((i * 2654435761) % 10_000) as f64 / 10.0;
        sl.insert(score, Sds::from_str(&format!("m{i}")));
    }

    assert_eq!(sl.len(), 5000);
    assert!(sl.validate_invariants().is_ok());

    for rank in (1..=5000).step_by(131) {
        let node = sl.by_rank(rank).unwrap();
        assert_eq!(sl.rank_of(node.score(), node.element()), rank);
    }

    // Обход выдаёт неубывающие пары (оценка, элемент).
    let mut prev: Option<(f64, Sds)> = None;

    for (e, s) in sl.iter() {
        if let Some((ps, pe)) = &prev {
            assert!(*ps < s || (*ps == s && pe < e));
        }

        prev = Some((s, e.clone()));
    }
}

/// Удаление диапазона по оценке синхронно возвращает удалённые пары.
#[test]
fn test_delete_by_score_returns_pairs() {
    let mut sl = SkipList::with_seed(77);

    for i in 0..100 {
        sl.insert(i as f64, Sds::from_str(&format!("k{i}")));
    }

    let range = ScoreRange::new(10.0, 19.0, false, false).unwrap();
    let removed = sl.delete_range_by_score(&range);

    assert_eq!(removed.len(), 10);

    for (e, s) in &removed {
        assert!((10.0..=19.0).contains(s));
        assert_eq!(sl.rank_of(*s, e), 0);
    }

    assert_eq!(sl.len(), 90);
    assert!(sl.validate_invariants().is_ok());
}
