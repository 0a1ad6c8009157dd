//! Упорядоченное множество с двумя представлениями.
//!
//! # Модули
//!
//! - `zset_base`: контейнер с компактным (ziplist) и масштабируемым
//!   (skiplist + dict) представлениями и политикой повышения.
//! - `aggregate`: объединение и пересечение наборов с весами и функцией
//!   агрегации.

pub mod aggregate;
pub mod zset_base;

pub use aggregate::*;
pub use zset_base::*;
