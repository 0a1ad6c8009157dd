//! Встроенные структуры данных ядра.
//!
//! Листья — `Sds`, `List`, `IntSet`; над ними `Dict`, `ZipList` и
//! `SkipList`; наверху — значения с выбором представления: `SetValue`
//! (intset ↔ hash) и `ZSet` (ziplist ↔ skiplist + dict).

pub mod dict;
pub mod intset;
pub mod list;
pub mod sds;
pub mod skiplist;
pub mod types;
pub mod ziplist;
pub mod zset;

pub use dict::{
    force_resize_ratio, hash_seed, resize_enabled, set_force_resize_ratio, set_hash_seed,
    set_resize_enabled, Dict, DictIter, Entry, OccupiedEntry, SeedHashBuilder, VacantEntry,
};
pub use intset::{IntSet, IntSetEncoding};
pub use list::{List, ListIter, ListRevIter};
pub use sds::Sds;
pub use skiplist::{
    LexBound, LexRange, ScoreRange, SkipList, SkipListIter, SkipListRevIter, SkipNode,
    MAX_LEVEL,
};
pub use types::{SetEncoding, SetValue, Value, DEFAULT_MAX_INTSET_ENTRIES};
pub use ziplist::{ZipList, ZipValue};
pub use zset::{
    Aggregate, ZAddResult, ZAggInput, ZSet, ZSetEncoding, DEFAULT_MAX_ZIP_ENTRIES,
    DEFAULT_MAX_ZIP_VALUE,
};
