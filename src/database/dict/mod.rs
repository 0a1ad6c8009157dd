//! Хеш-таблица с инкрементальным рехешированием.
//!
//! # Модули
//!
//! - `dict_base`: таблица с двумя внутренними массивами бакетов,
//!   пошаговым переносом и курсорным сканированием.
//! - `entry`: vacant/occupied API для вставки без повторного поиска.

pub mod dict_base;
pub mod entry;

pub use dict_base::*;
pub use entry::*;
