//! Интеграционные тесты словаря: рехеширование под нагрузкой, курсорное
//! сканирование, случайные записи.

use std::collections::HashSet;

use yadro::Dict;

/// Нагрузочный сценарий: десять тысяч ключей через все фазы рехеширования.
#[test]
fn test_rehash_under_load() {
    let mut d = Dict::new();

    for i in 1..=10_000 {
        let key = format!("k{i}");

        assert!(d.insert(key, i));

        // Сумма used обеих таблиц равна числу вставленных ключей в любой
        // момент переноса.
        assert_eq!(d.len(), i as usize);
    }

    assert_eq!(d.get(&"k7777".to_string()), Some(&7777));
    assert_eq!(d.get(&"k10001".to_string()), None);

    // random_entry возвращает реально вставленные пары.
    for _ in 0..100 {
        let (k, v) = d.random_entry().unwrap();
        assert_eq!(k, &format!("k{v}"));
    }

    // Полный обход выдаёт ровно 10 000 различных ключей.
    let keys: HashSet<String> = d.iter().map(|(k, _)| k.clone()).collect();
    assert_eq!(keys.len(), 10_000);
}

/// Перенос не теряет и не дублирует ключи при чередовании вставок,
/// удалений и явных шагов рехеширования.
#[test]
fn test_interleaved_rehash_steps_preserve_contents() {
    let mut d = Dict::new();
    let mut model = std::collections::HashMap::new();

    for i in 0..2000u32 {
        d.replace(i, i * 3);
        model.insert(i, i * 3);

        if i % 3 == 0 {
            let gone = d.remove(&(i / 2));
            let expected = model.remove(&(i / 2));
            assert_eq!(gone, expected);
        }

        if i % 7 == 0 {
            d.rehash(1);
        }
    }

    while d.rehash(100) {}

    assert_eq!(d.len(), model.len());

    for (k, v) in &model {
        assert_eq!(d.get(k), Some(v));
    }
}

/// Сканирование с мутациями между шагами: ключи, прожившие весь обход,
/// выдаются хотя бы один раз.
#[test]
fn test_scan_with_mutations_between_steps() {
    let mut d = Dict::new();

    for i in 0..500usize {
        d.insert(i, ());
    }

    d.pause_rehash();

    let mut seen = HashSet::new();
    let mut cursor = 0u64;
    let mut extra = 100_000usize;

    loop {
        cursor = d.scan(cursor, |k, _| {
            seen.insert(*k);
        });

        // Мутации между шагами обхода: вставки растят таблицу.
        d.insert(extra, ());
        extra += 1;

        if cursor == 0 {
            break;
        }
    }

    d.resume_rehash();

    for i in 0..500 {
        assert!(seen.contains(&i), "потерян ключ {i}");
    }
}

/// Слепок словаря чувствителен к каждой мутации и стабилен между ними.
#[test]
fn test_fingerprint_stability() {
    let mut d = Dict::new();

    for i in 0..100 {
        d.insert(i, i);
    }

    let fp = d.fingerprint();

    assert_eq!(fp, d.fingerprint());

    let _ = d.get(&50);
    assert_eq!(fp, d.fingerprint());

    d.insert(1000, 1000);
    assert_ne!(fp, d.fingerprint());
}

/// Явный перенос с бюджетом времени доводит таблицу до конца.
#[test]
fn test_timed_rehash_completes() {
    let mut d = Dict::new();

    d.pause_rehash();

    for i in 0..10_000 {
        d.insert(i, i);
    }

    d.resume_rehash();

    while d.is_rehashing() {
        d.rehash_for(10);
    }

    assert_eq!(d.len(), 10_000);

    for i in (0..10_000).step_by(97) {
        assert_eq!(d.get(&i), Some(&i));
    }
}
