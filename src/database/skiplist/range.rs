//! Диапазоны для запросов по упорядоченному множеству.
//!
//! Диапазон по оценке — пара `f64` с флагами исключения границ;
//! лексикографический — пара границ с сентинелами `-`/`+` (−∞/+∞).

use serde::{Deserialize, Serialize};

use crate::{
    error::{StoreError, StoreResult},
    Sds,
};

/// Диапазон оценок `[min, max]` с необязательным исключением границ.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreRange {
    pub min: f64,
    pub max: f64,
    pub min_exclusive: bool,
    pub max_exclusive: bool,
}

/// Одна лексикографическая граница.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LexBound {
    /// `-`: меньше любого элемента.
    NegInf,
    /// `+`: больше любого элемента.
    PosInf,
    /// Включительная граница.
    Incl(Sds),
    /// Исключительная граница.
    Excl(Sds),
}

/// Лексикографический диапазон элементов.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LexRange {
    pub min: LexBound,
    pub max: LexBound,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl ScoreRange {
    /// Создаёт диапазон; NaN в любой границе — ошибка.
    pub fn new(
        min: f64,
        max: f64,
        min_exclusive: bool,
        max_exclusive: bool,
    ) -> StoreResult<Self> {
        if min.is_nan() || max.is_nan() {
            return Err(StoreError::NanScore);
        }

        Ok(ScoreRange {
            min,
            max,
            min_exclusive,
            max_exclusive,
        })
    }

    /// Включительный диапазон `[min, max]`.
    pub fn inclusive(
        min: f64,
        max: f64,
    ) -> StoreResult<Self> {
        Self::new(min, max, false, false)
    }

    /// Разбирает границы из байтов: число (в т.ч. `inf`/`-inf`), префикс
    /// `(` делает границу исключительной.
    pub fn parse(
        min: &[u8],
        max: &[u8],
    ) -> StoreResult<Self> {
        let (min, min_exclusive) = Self::parse_bound(min)?;
        let (max, max_exclusive) = Self::parse_bound(max)?;

        Self::new(min, max, min_exclusive, max_exclusive)
    }

    fn parse_bound(bytes: &[u8]) -> StoreResult<(f64, bool)> {
        let (digits, exclusive) = match bytes.first() {
            Some(b'(') => (&bytes[1..], true),
            _ => (bytes, false),
        };

        let s = std::str::from_utf8(digits)
            .map_err(|_| StoreError::InvalidRange(String::from_utf8_lossy(bytes).into_owned()))?;

        let v: f64 = s
            .trim()
            .parse()
            .map_err(|_| StoreError::InvalidRange(s.to_string()))?;

        if v.is_nan() {
            return Err(StoreError::NanScore);
        }

        Ok((v, exclusive))
    }

    /// Диапазон не содержит ни одной оценки.
    pub fn is_empty(&self) -> bool {
        self.min > self.max
            || (self.min == self.max && (self.min_exclusive || self.max_exclusive))
    }

    /// `value` не ниже минимальной границы.
    #[inline]
    pub fn gte_min(
        &self,
        value: f64,
    ) -> bool {
        if self.min_exclusive {
            value > self.min
        } else {
            value >= self.min
        }
    }

    /// `value` не выше максимальной границы.
    #[inline]
    pub fn lte_max(
        &self,
        value: f64,
    ) -> bool {
        if self.max_exclusive {
            value < self.max
        } else {
            value <= self.max
        }
    }
}

impl LexRange {
    pub fn new(
        min: LexBound,
        max: LexBound,
    ) -> Self {
        LexRange { min, max }
    }

    /// Разбирает границы из байтов: `-`/`+` — сентинелы, `[x` включительно,
    /// `(x` исключительно. Всё остальное — ошибка.
    pub fn parse(
        min: &[u8],
        max: &[u8],
    ) -> StoreResult<Self> {
        Ok(LexRange {
            min: Self::parse_bound(min)?,
            max: Self::parse_bound(max)?,
        })
    }

    fn parse_bound(bytes: &[u8]) -> StoreResult<LexBound> {
        match bytes.first() {
            Some(b'-') if bytes.len() == 1 => Ok(LexBound::NegInf),
            Some(b'+') if bytes.len() == 1 => Ok(LexBound::PosInf),
            Some(b'[') => Ok(LexBound::Incl(Sds::from_bytes(&bytes[1..]))),
            Some(b'(') => Ok(LexBound::Excl(Sds::from_bytes(&bytes[1..]))),
            _ => Err(StoreError::InvalidRange(
                String::from_utf8_lossy(bytes).into_owned(),
            )),
        }
    }

    /// Диапазон не содержит ни одного элемента.
    pub fn is_empty(&self) -> bool {
        use LexBound::*;

        match (&self.min, &self.max) {
            (PosInf, _) | (_, NegInf) => true,
            (NegInf, _) | (_, PosInf) => false,
            (Incl(a), Incl(b)) => a > b,
            (Incl(a), Excl(b)) | (Excl(a), Incl(b)) | (Excl(a), Excl(b)) => a >= b,
        }
    }

    /// `value` не ниже минимальной границы.
    pub fn gte_min(
        &self,
        value: &Sds,
    ) -> bool {
        match &self.min {
            LexBound::NegInf => true,
            LexBound::PosInf => false,
            LexBound::Incl(b) => value >= b,
            LexBound::Excl(b) => value > b,
        }
    }

    /// `value` не выше максимальной границы.
    pub fn lte_max(
        &self,
        value: &Sds,
    ) -> bool {
        match &self.max {
            LexBound::NegInf => false,
            LexBound::PosInf => true,
            LexBound::Incl(b) => value <= b,
            LexBound::Excl(b) => value < b,
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_range_bounds() {
        let r = ScoreRange::new(4.0, 8.0, false, false).unwrap();

        assert!(r.gte_min(4.0));
        assert!(!r.gte_min(3.9));
        assert!(r.lte_max(8.0));
        assert!(!r.lte_max(8.1));
        assert!(!r.is_empty());
    }

    #[test]
    fn score_range_exclusive() {
        let r = ScoreRange::new(4.0, 8.0, true, true).unwrap();

        assert!(!r.gte_min(4.0));
        assert!(r.gte_min(4.1));
        assert!(!r.lte_max(8.0));
    }

    #[test]
    fn score_range_rejects_nan() {
        assert_eq!(
            ScoreRange::new(f64::NAN, 1.0, false, false),
            Err(StoreError::NanScore)
        );
    }

    #[test]
    fn score_range_empty() {
        assert!(ScoreRange::inclusive(5.0, 3.0).unwrap().is_empty());
        assert!(ScoreRange::new(5.0, 5.0, true, false).unwrap().is_empty());
        assert!(!ScoreRange::inclusive(5.0, 5.0).unwrap().is_empty());
    }

    #[test]
    fn score_range_parse() {
        let r = ScoreRange::parse(b"(1.5", b"+inf").unwrap();

        assert_eq!(r.min, 1.5);
        assert!(r.min_exclusive);
        assert_eq!(r.max, f64::INFINITY);
        assert!(!r.max_exclusive);

        assert!(ScoreRange::parse(b"abc", b"1").is_err());
    }

    #[test]
    fn lex_range_parse_and_bounds() {
        let r = LexRange::parse(b"[aaa", b"(ccc").unwrap();

        assert!(r.gte_min(&Sds::from_str("aaa")));
        assert!(!r.gte_min(&Sds::from_str("aa")));
        assert!(r.lte_max(&Sds::from_str("cca")));
        assert!(!r.lte_max(&Sds::from_str("ccc")));

        assert!(LexRange::parse(b"aaa", b"+").is_err());
    }

    #[test]
    fn lex_range_sentinels() {
        let r = LexRange::parse(b"-", b"+").unwrap();

        assert!(!r.is_empty());
        assert!(r.gte_min(&Sds::from_str("")));
        assert!(r.lte_max(&Sds::from_bytes([0xFFu8; 8])));
    }

    #[test]
    fn lex_range_empty() {
        assert!(LexRange::parse(b"+", b"-").unwrap().is_empty());
        assert!(LexRange::parse(b"(a", b"[a").unwrap().is_empty());
        assert!(LexRange::parse(b"[b", b"[a").unwrap().is_empty());
        assert!(!LexRange::parse(b"[a", b"[a").unwrap().is_empty());
    }
}
