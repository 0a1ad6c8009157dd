//! Пропускной список, упорядоченный по паре (оценка, элемент).
//!
//! # Модули
//!
//! - `skiplist_base`: базовая реализация со span-счётчиками для ранговых
//!   запросов.
//! - `range`: диапазоны по оценке и лексикографические диапазоны с
//!   сентинелами ±∞.

pub mod range;
pub mod skiplist_base;

pub use range::*;
pub use skiplist_base::*;
