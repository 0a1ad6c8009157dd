use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Dict, IntSet, List, Sds, ZSet};
use crate::error::StoreResult;

/// Default cardinality threshold for the integer-set representation.
pub const DEFAULT_MAX_INTSET_ENTRIES: usize = 512;

/// Current representation of a [`SetValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetEncoding {
    /// Sorted integer array.
    IntSet,
    /// Chained hash table with unit values.
    Hash,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum SetRepr {
    Int(IntSet),
    Hash(Dict<Sds, ()>),
}

/// A set of unique binary strings with an adaptive representation.
///
/// While every member parses as a 64-bit integer and the cardinality stays
/// under the threshold, members live in a compact [`IntSet`]. The first
/// non-integer member, or crossing the threshold, promotes the set to a
/// hash table once; the set never demotes until cleared.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetValue {
    repr: SetRepr,
    max_intset_entries: usize,
}

/// Represents a generic value in the storage engine.
///
/// This serves as the primary container for the supported data types:
/// strings, integers, floating-point numbers, `null`, and the collection
/// types (lists, hashes, sets, sorted sets). Collection values carry their
/// own representation choice inside; mutating them may promote a compact
/// representation to a scalable one, never the other way around.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Value {
    /// A binary-safe string.
    Str(Sds),
    /// A 64-bit signed integer.
    Int(i64),
    /// A 64-bit floating-point number.
    Float(f64),
    /// A `null` type (used to represent absence of value or deletion).
    Null,
    /// A list of binary strings.
    List(List<Sds>),
    /// A hash map (field → value).
    Hash(Dict<Sds, Sds>),
    /// A set of unique binary strings.
    Set(SetValue),
    /// A sorted set with score-based ordering.
    ZSet(ZSet),
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl SetValue {
    /// Creates an empty set in the compact integer representation.
    pub fn new() -> Self {
        Self::with_threshold(DEFAULT_MAX_INTSET_ENTRIES)
    }

    /// Creates an empty set with a custom promotion threshold.
    pub fn with_threshold(max_intset_entries: usize) -> Self {
        SetValue {
            repr: SetRepr::Int(IntSet::new()),
            max_intset_entries,
        }
    }

    /// Current representation.
    pub fn encoding(&self) -> SetEncoding {
        match &self.repr {
            SetRepr::Int(_) => SetEncoding::IntSet,
            SetRepr::Hash(_) => SetEncoding::Hash,
        }
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        match &self.repr {
            SetRepr::Int(s) => s.len(),
            SetRepr::Hash(d) => d.len(),
        }
    }

    /// Returns `true` when the set has no members.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Inserts a member. Returns `false` when it was already present.
    pub fn insert(
        &mut self,
        member: Sds,
    ) -> bool {
        match &mut self.repr {
            SetRepr::Int(set) => match Sds::parse_i64(member.as_slice()) {
                Some(v) => {
                    let added = set.insert(v);

                    if added && set.len() > self.max_intset_entries {
                        self.promote();
                    }

                    added
                }
                None => {
                    // A non-integer member forces the hash representation.
                    self.promote();
                    self.insert(member)
                }
            },
            SetRepr::Hash(dict) => dict.insert(member, ()),
        }
    }

    /// Removes a member. Returns `true` when it was present.
    pub fn remove(
        &mut self,
        member: &Sds,
    ) -> bool {
        match &mut self.repr {
            SetRepr::Int(set) => match Sds::parse_i64(member.as_slice()) {
                Some(v) => set.remove(v),
                None => false,
            },
            SetRepr::Hash(dict) => dict.remove(member).is_some(),
        }
    }

    /// Membership test.
    pub fn contains(
        &self,
        member: &Sds,
    ) -> bool {
        match &self.repr {
            SetRepr::Int(set) => match Sds::parse_i64(member.as_slice()) {
                Some(v) => set.contains(v),
                None => false,
            },
            SetRepr::Hash(dict) => dict.contains_key(member),
        }
    }

    /// Approximately uniform random member.
    pub fn random_member(&self) -> Option<Sds> {
        match &self.repr {
            SetRepr::Int(set) => set.random_member().map(|v| Sds::from_str(&v.to_string())),
            SetRepr::Hash(dict) => dict.random_entry().map(|(k, _)| k.clone()),
        }
    }

    /// All members; the integer representation yields them in ascending
    /// numeric order, the hash representation in no particular order.
    pub fn members(&self) -> Vec<Sds> {
        match &self.repr {
            SetRepr::Int(set) => set
                .iter()
                .map(|v| Sds::from_str(&v.to_string()))
                .collect(),
            SetRepr::Hash(dict) => dict.iter().map(|(k, _)| k.clone()).collect(),
        }
    }

    /// Drops all members and returns to the compact representation.
    pub fn clear(&mut self) {
        self.repr = SetRepr::Int(IntSet::new());
    }

    /// Borrow the compact representation, when active. Used by sorted-set
    /// aggregation to feed integer sets without copying.
    pub fn as_intset(&self) -> Option<&IntSet> {
        match &self.repr {
            SetRepr::Int(s) => Some(s),
            SetRepr::Hash(_) => None,
        }
    }

    /// One-way switch to the hash representation.
    fn promote(&mut self) {
        if let SetRepr::Int(set) = &self.repr {
            debug!(len = set.len(), "set повышен до hash-представления");

            let mut dict = Dict::new();

            for v in set.iter() {
                dict.insert(Sds::from_str(&v.to_string()), ());
            }

            self.repr = SetRepr::Hash(dict);
        }
    }
}

impl Value {
    /// Human-readable type tag, used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Str(_) => "string",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Null => "null",
            Value::List(_) => "list",
            Value::Hash(_) => "hash",
            Value::Set(_) => "set",
            Value::ZSet(_) => "zset",
        }
    }

    /// Snapshot of the value as JSON bytes; collection values keep their
    /// contents (not their representation choice) across the round trip.
    pub fn to_bytes(&self) -> StoreResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Rebuilds a value previously produced by [`Value::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> StoreResult<Value> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов для SetValue, Value
////////////////////////////////////////////////////////////////////////////////

impl Default for SetValue {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for SetValue {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        if self.len() != other.len() {
            return false;
        }

        self.members().iter().all(|m| other.contains(m))
    }
}

impl fmt::Display for Value {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Value::Str(s) => write!(f, "{s}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Null => write!(f, "null"),
            other => write!(f, "<{}>", other.type_name()),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
