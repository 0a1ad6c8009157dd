//! Yadro — ядро структур данных in-memory key-value движка.
//!
//! Основные модули:
//! - `config` — пороги представлений и глобальные переключатели
//! - `database` — встроенные структуры данных (Dict, ZipList, SkipList,
//!   IntSet, ZSet и др.)
//! - `error` — типы ошибок (невалидный ввод, диагностика инвариантов)
//!
//! Ядро однопоточное и кооперативное: все операции над одним значением
//! выполняются из одного потока управления и доходят до конца без точек
//! приостановки. Длинные работы (перенос хеш-таблицы) разбиты на шаги,
//! которые вызывающая сторона выполняет по своему бюджету.

/// Пороги представлений и глобальные переключатели.
pub mod config;
/// Встроенные структуры данных (Dict, ZipList, SkipList, IntSet, ZSet).
pub mod database;
/// Типы ошибок: невалидный ввод, диагностика инвариантов.
pub mod error;

// -----------------------------------------------------------------------------
//  Часто используемые публичные типы
// -----------------------------------------------------------------------------

/// Реэкспорт настроек.
pub use config::Settings;

/// Реэкспорт встроенных структур данных.
pub use database::{
    hash_seed, resize_enabled, set_hash_seed, set_resize_enabled, Aggregate, Dict, DictIter,
    IntSet, IntSetEncoding, LexBound, LexRange, List, ListIter, ListRevIter, ScoreRange,
    SeedHashBuilder, SetEncoding, SetValue, Sds, SkipList, SkipListIter, SkipListRevIter,
    SkipNode, Value, ZAddResult, ZAggInput, ZSet, ZSetEncoding, ZipList, ZipValue,
};

/// Реэкспорт типов ошибок.
pub use error::{StoreError, StoreResult, ValidationError};
