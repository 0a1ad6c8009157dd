//! Упорядоченное множество: элемент → оценка, порядок по (оценка, элемент).
//!
//! Маленькие множества живут в упакованном списке парами записей
//! `(элемент, оценка)` в возрастающем порядке. При превышении порогов по
//! числу элементов или длине элемента множество один раз повышается до
//! пары «хеш-таблица + пропускной список»: таблица даёт O(1) доступ к
//! оценке, список — ранговые и диапазонные запросы. Обратного понижения
//! нет, пока множество не опустошено и не пересоздано.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::debug;

use crate::{
    error::{StoreError, StoreResult, ValidationError},
    validate, Dict, LexRange, ScoreRange, Sds, SkipList, ZipList, ZipValue,
};

/// Порог числа элементов упакованного представления по умолчанию.
pub const DEFAULT_MAX_ZIP_ENTRIES: usize = 128;

/// Порог длины элемента (в байтах) упакованного представления по умолчанию.
pub const DEFAULT_MAX_ZIP_VALUE: usize = 64;

/// Наибольший целочисленный `f64`, при котором оценка пишется без дробной
/// части.
const MAX_INTEGRAL_SCORE: f64 = 9_007_199_254_740_992.0;

/// Текущее представление множества.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZSetEncoding {
    /// Упакованный список пар (элемент, оценка).
    ZipList,
    /// Хеш-таблица + пропускной список.
    SkipList,
}

/// Результат вставки.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZAddResult {
    /// Элемент добавлен впервые.
    Added,
    /// Оценка существующего элемента изменена.
    Updated,
    /// Оценка совпала с текущей, ничего не изменилось.
    Unchanged,
}

pub(crate) struct SkipRepr {
    pub(crate) dict: Dict<Sds, f64>,
    pub(crate) list: SkipList,
}

pub(crate) enum ZSetRepr {
    Zip(ZipList),
    Skip(SkipRepr),
}

/// Упорядоченное множество с автоматическим выбором представления.
pub struct ZSet {
    repr: ZSetRepr,
    max_zip_entries: usize,
    max_zip_value: usize,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl ZSet {
    /// Создаёт пустое множество с порогами по умолчанию.
    pub fn new() -> Self {
        Self::with_thresholds(DEFAULT_MAX_ZIP_ENTRIES, DEFAULT_MAX_ZIP_VALUE)
    }

    /// Создаёт пустое множество с заданными порогами повышения.
    pub fn with_thresholds(
        max_zip_entries: usize,
        max_zip_value: usize,
    ) -> Self {
        ZSet {
            repr: ZSetRepr::Zip(ZipList::new()),
            max_zip_entries,
            max_zip_value,
        }
    }

    /// Текущее представление.
    pub fn encoding(&self) -> ZSetEncoding {
        match &self.repr {
            ZSetRepr::Zip(_) => ZSetEncoding::ZipList,
            ZSetRepr::Skip(_) => ZSetEncoding::SkipList,
        }
    }

    /// Число элементов.
    pub fn len(&self) -> usize {
        match &self.repr {
            ZSetRepr::Zip(zl) => zl.len() / 2,
            ZSetRepr::Skip(sr) => sr.list.len(),
        }
    }

    /// Возвращает `true`, если множество пусто.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Опустошает множество и возвращает его в упакованное представление.
    pub fn clear(&mut self) {
        self.repr = ZSetRepr::Zip(ZipList::new());
    }

    /// Вставляет элемент или меняет его оценку.
    ///
    /// Равная текущей оценка ничего не меняет. NaN отвергается. После
    /// мутации упакованное представление может один раз повыситься до
    /// skiplist-формы; обратного перехода нет.
    pub fn add(
        &mut self,
        element: Sds,
        score: f64,
    ) -> StoreResult<ZAddResult> {
        if score.is_nan() {
            return Err(StoreError::NanScore);
        }

        match &mut self.repr {
            ZSetRepr::Zip(zl) => {
                let res = Self::zip_add(zl, &element, score);

                let too_many = zl.len() / 2 > self.max_zip_entries;
                let too_long = element.len() > self.max_zip_value;

                if too_many || too_long {
                    self.promote();
                }

                Ok(res)
            }
            ZSetRepr::Skip(sr) => Ok(Self::skip_add(sr, element, score)),
        }
    }

    /// Удаляет элемент. Возвращает `true`, если он присутствовал.
    pub fn remove(
        &mut self,
        element: &Sds,
    ) -> bool {
        match &mut self.repr {
            ZSetRepr::Zip(zl) => match Self::zip_find(zl, element) {
                Some((pe, _)) => {
                    let p = zl.delete(pe);
                    zl.delete(p);
                    true
                }
                None => false,
            },
            ZSetRepr::Skip(sr) => match sr.dict.remove(element) {
                Some(score) => {
                    let deleted = sr.list.delete(score, element);
                    debug_assert!(deleted, "элемент был в dict, но не в skip list");
                    true
                }
                None => false,
            },
        }
    }

    /// Оценка элемента.
    pub fn score(
        &self,
        element: &Sds,
    ) -> Option<f64> {
        match &self.repr {
            ZSetRepr::Zip(zl) => Self::zip_find(zl, element).map(|(_, s)| s),
            ZSetRepr::Skip(sr) => sr.dict.get(element).copied(),
        }
    }

    /// Проверяет наличие элемента.
    pub fn contains(
        &self,
        element: &Sds,
    ) -> bool {
        self.score(element).is_some()
    }

    /// 0-базный ранг элемента в порядке возрастания (оценка, элемент);
    /// `reverse` считает с конца.
    pub fn rank(
        &self,
        element: &Sds,
        reverse: bool,
    ) -> Option<usize> {
        match &self.repr {
            ZSetRepr::Zip(zl) => {
                let mut idx = 0usize;
                let mut p = zl.index(0);

                while let Some(pe) = p {
                    if zl.compare(pe, element.as_slice()) {
                        let len = zl.len() / 2;
                        return Some(if reverse { len - 1 - idx } else { idx });
                    }

                    idx += 1;
                    p = zl.next(zl.entry_end(pe));
                }

                None
            }
            ZSetRepr::Skip(sr) => {
                let score = *sr.dict.get(element)?;
                let r = sr.list.rank_of(score, element);

                debug_assert!(r > 0, "оценка есть в dict, но ранга нет");

                Some(if reverse { sr.list.len() - r } else { r - 1 })
            }
        }
    }

    /// Срез по 0-базным рангам `[start, end]` включительно; отрицательные
    /// индексы отсчитываются с конца, `reverse` меняет направление.
    pub fn range_by_rank(
        &self,
        start: isize,
        end: isize,
        reverse: bool,
    ) -> Vec<(Sds, f64)> {
        let len = self.len() as isize;

        let mut start = if start < 0 { start + len } else { start };
        let mut end = if end < 0 { end + len } else { end };

        start = start.max(0);

        if start > end || start >= len {
            return Vec::new();
        }

        if end >= len {
            end = len - 1;
        }

        let rangelen = (end - start + 1) as usize;

        match &self.repr {
            ZSetRepr::Zip(_) => {
                let mut entries = self.entries();

                if reverse {
                    entries.reverse();
                }

                entries[start as usize..=end as usize].to_vec()
            }
            ZSetRepr::Skip(sr) => {
                let mut out = Vec::with_capacity(rangelen);
                let mut node = if reverse {
                    sr.list.by_rank((len - start) as usize)
                } else {
                    sr.list.by_rank(start as usize + 1)
                };

                while let Some(n) = node {
                    if out.len() == rangelen {
                        break;
                    }

                    out.push((n.element().clone(), n.score()));

                    node = if reverse { n.prev() } else { n.next() };
                }

                out
            }
        }
    }

    /// Элементы с оценкой в диапазоне, со смещением и пределом.
    pub fn range_by_score(
        &self,
        range: &ScoreRange,
        offset: usize,
        limit: Option<usize>,
        reverse: bool,
    ) -> Vec<(Sds, f64)> {
        let cap = limit.unwrap_or(usize::MAX);

        match &self.repr {
            ZSetRepr::Zip(_) => {
                let mut entries = self.entries();

                if reverse {
                    entries.reverse();
                }

                entries
                    .into_iter()
                    .filter(|(_, s)| range.gte_min(*s) && range.lte_max(*s))
                    .skip(offset)
                    .take(cap)
                    .collect()
            }
            ZSetRepr::Skip(sr) => {
                let mut out = Vec::new();
                let mut node = if reverse {
                    sr.list.last_in_score_range(range)
                } else {
                    sr.list.first_in_score_range(range)
                };
                let mut to_skip = offset;

                while let Some(n) = node {
                    let inside = if reverse {
                        range.gte_min(n.score())
                    } else {
                        range.lte_max(n.score())
                    };

                    if !inside {
                        break;
                    }

                    if to_skip > 0 {
                        to_skip -= 1;
                    } else {
                        if out.len() == cap {
                            break;
                        }

                        out.push((n.element().clone(), n.score()));
                    }

                    node = if reverse { n.prev() } else { n.next() };
                }

                out
            }
        }
    }

    /// Элементы в лексикографическом диапазоне (при равных оценках).
    pub fn range_by_lex(
        &self,
        range: &LexRange,
        offset: usize,
        limit: Option<usize>,
        reverse: bool,
    ) -> Vec<(Sds, f64)> {
        let cap = limit.unwrap_or(usize::MAX);

        match &self.repr {
            ZSetRepr::Zip(_) => {
                let mut entries = self.entries();

                if reverse {
                    entries.reverse();
                }

                entries
                    .into_iter()
                    .filter(|(e, _)| range.gte_min(e) && range.lte_max(e))
                    .skip(offset)
                    .take(cap)
                    .collect()
            }
            ZSetRepr::Skip(sr) => {
                let mut out = Vec::new();
                let mut node = if reverse {
                    sr.list.last_in_lex_range(range)
                } else {
                    sr.list.first_in_lex_range(range)
                };
                let mut to_skip = offset;

                while let Some(n) = node {
                    let inside = if reverse {
                        range.gte_min(n.element())
                    } else {
                        range.lte_max(n.element())
                    };

                    if !inside {
                        break;
                    }

                    if to_skip > 0 {
                        to_skip -= 1;
                    } else {
                        if out.len() == cap {
                            break;
                        }

                        out.push((n.element().clone(), n.score()));
                    }

                    node = if reverse { n.prev() } else { n.next() };
                }

                out
            }
        }
    }

    /// Число элементов с оценкой в диапазоне.
    pub fn count_in_score_range(
        &self,
        range: &ScoreRange,
    ) -> usize {
        match &self.repr {
            ZSetRepr::Zip(_) => self
                .entries()
                .iter()
                .filter(|(_, s)| range.gte_min(*s) && range.lte_max(*s))
                .count(),
            ZSetRepr::Skip(sr) => {
                let Some(first) = sr.list.first_in_score_range(range) else {
                    return 0;
                };

                let r1 = sr.list.rank_of(first.score(), first.element());

                // Диапазон непуст: последний узел обязан существовать.
                let last = sr.list.last_in_score_range(range).unwrap();
                let r2 = sr.list.rank_of(last.score(), last.element());

                r2 - r1 + 1
            }
        }
    }

    /// Число элементов в лексикографическом диапазоне.
    pub fn count_in_lex_range(
        &self,
        range: &LexRange,
    ) -> usize {
        match &self.repr {
            ZSetRepr::Zip(_) => self
                .entries()
                .iter()
                .filter(|(e, _)| range.gte_min(e) && range.lte_max(e))
                .count(),
            ZSetRepr::Skip(sr) => {
                let Some(first) = sr.list.first_in_lex_range(range) else {
                    return 0;
                };

                let r1 = sr.list.rank_of(first.score(), first.element());
                let last = sr.list.last_in_lex_range(range).unwrap();
                let r2 = sr.list.rank_of(last.score(), last.element());

                r2 - r1 + 1
            }
        }
    }

    /// Удаляет элементы с оценкой в диапазоне; возвращает их число.
    pub fn remove_range_by_score(
        &mut self,
        range: &ScoreRange,
    ) -> usize {
        match &mut self.repr {
            ZSetRepr::Zip(zl) => {
                Self::zip_remove_matching(zl, |_, s| range.gte_min(s) && range.lte_max(s))
            }
            ZSetRepr::Skip(sr) => {
                let removed = sr.list.delete_range_by_score(range);

                for (ele, _) in &removed {
                    sr.dict.remove(ele);
                }

                removed.len()
            }
        }
    }

    /// Удаляет элементы в лексикографическом диапазоне; возвращает их число.
    pub fn remove_range_by_lex(
        &mut self,
        range: &LexRange,
    ) -> usize {
        match &mut self.repr {
            ZSetRepr::Zip(zl) => {
                Self::zip_remove_matching(zl, |e, _| range.gte_min(e) && range.lte_max(e))
            }
            ZSetRepr::Skip(sr) => {
                let removed = sr.list.delete_range_by_lex(range);

                for (ele, _) in &removed {
                    sr.dict.remove(ele);
                }

                removed.len()
            }
        }
    }

    /// Удаляет элементы по 0-базным рангам `[start, end]` (отрицательные —
    /// с конца); возвращает их число.
    pub fn remove_range_by_rank(
        &mut self,
        start: isize,
        end: isize,
    ) -> usize {
        let len = self.len() as isize;

        let mut start = if start < 0 { start + len } else { start };
        let mut end = if end < 0 { end + len } else { end };

        start = start.max(0);

        if start > end || start >= len {
            return 0;
        }

        if end >= len {
            end = len - 1;
        }

        match &mut self.repr {
            ZSetRepr::Zip(zl) => {
                zl.delete_range(start * 2, ((end - start + 1) * 2) as usize);
                (end - start + 1) as usize
            }
            ZSetRepr::Skip(sr) => {
                let removed = sr
                    .list
                    .delete_range_by_rank(start as usize + 1, end as usize + 1);

                for (ele, _) in &removed {
                    sr.dict.remove(ele);
                }

                removed.len()
            }
        }
    }

    /// Все пары (элемент, оценка) в возрастающем порядке.
    pub fn entries(&self) -> Vec<(Sds, f64)> {
        match &self.repr {
            ZSetRepr::Zip(zl) => {
                let mut out = Vec::with_capacity(zl.len() / 2);
                let mut p = zl.index(0);

                while let Some(pe) = p {
                    let ps = zl.entry_end(pe);
                    let ele = zl.get(pe).expect("запись элемента").to_sds();
                    let score = Self::parse_score(zl.get(ps).expect("запись оценки"));

                    out.push((ele, score));
                    p = zl.next(ps);
                }

                out
            }
            ZSetRepr::Skip(sr) => sr.list.iter().map(|(e, s)| (e.clone(), s)).collect(),
        }
    }

    /// Проверяет инварианты текущего представления.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match &self.repr {
            ZSetRepr::Zip(zl) => {
                zl.validate()?;

                validate!(
                    zl.len() % 2 == 0,
                    ValidationError::LengthMismatch {
                        expected: zl.len() / 2 * 2,
                        actual: zl.len(),
                    }
                );

                let entries = self.entries();

                for pair in entries.windows(2) {
                    let ok = pair[0].1 < pair[1].1
                        || (pair[0].1 == pair[1].1 && pair[0].0 < pair[1].0);

                    validate!(
                        ok,
                        ValidationError::SortOrderViolation {
                            message: format!(
                                "({}, {}) >= ({}, {})",
                                pair[0].1, pair[0].0, pair[1].1, pair[1].0
                            ),
                        }
                    );
                }

                Ok(())
            }
            ZSetRepr::Skip(sr) => {
                sr.list.validate_invariants()?;

                validate!(
                    sr.dict.len() == sr.list.len(),
                    ValidationError::DualReprMismatch {
                        message: format!(
                            "dict: {}, skiplist: {}",
                            sr.dict.len(),
                            sr.list.len()
                        ),
                    }
                );

                for (ele, score) in sr.list.iter() {
                    validate!(
                        sr.dict.get(ele) == Some(&score),
                        ValidationError::DualReprMismatch {
                            message: format!("расхождение оценки элемента {ele}"),
                        }
                    );
                }

                Ok(())
            }
        }
    }

    ////////////////////////////////////////////////////////////////////////
    // Внутренняя механика
    ////////////////////////////////////////////////////////////////////////

    /// Перестраивает упакованное представление в (dict + skiplist).
    fn promote(&mut self) {
        if let ZSetRepr::Zip(_) = &self.repr {
            let entries = self.entries();

            debug!(len = entries.len(), "zset повышен до skiplist-представления");

            let mut dict = Dict::new();
            let mut list = SkipList::new();

            for (ele, score) in entries {
                list.insert(score, ele.clone());
                dict.insert(ele, score);
            }

            self.repr = ZSetRepr::Skip(SkipRepr { dict, list });
        }
    }

    fn skip_add(
        sr: &mut SkipRepr,
        element: Sds,
        score: f64,
    ) -> ZAddResult {
        match sr.dict.get(&element).copied() {
            Some(cur) if cur == score => ZAddResult::Unchanged,
            Some(cur) => {
                let moved = sr.list.update_score(cur, &element, score);
                debug_assert!(moved, "оценка есть в dict, но узла нет");

                *sr.dict.get_mut(&element).unwrap() = score;

                ZAddResult::Updated
            }
            None => {
                sr.list.insert(score, element.clone());
                sr.dict.insert(element, score);

                ZAddResult::Added
            }
        }
    }

    fn zip_add(
        zl: &mut ZipList,
        element: &Sds,
        score: f64,
    ) -> ZAddResult {
        match Self::zip_find(zl, element) {
            Some((_, cur)) if cur == score => ZAddResult::Unchanged,
            Some((pe, _)) => {
                let p = zl.delete(pe);
                zl.delete(p);
                Self::zip_insert(zl, element, score);

                ZAddResult::Updated
            }
            None => {
                Self::zip_insert(zl, element, score);
                ZAddResult::Added
            }
        }
    }

    /// Ищет элемент в упакованной форме: (смещение записи элемента, оценка).
    fn zip_find(
        zl: &ZipList,
        element: &Sds,
    ) -> Option<(usize, f64)> {
        let mut p = zl.index(0);

        while let Some(pe) = p {
            let ps = zl.entry_end(pe);

            if zl.compare(pe, element.as_slice()) {
                let score = Self::parse_score(zl.get(ps)?);
                return Some((pe, score));
            }

            p = zl.next(ps);
        }

        None
    }

    /// Вставляет пару в позицию, сохраняющую порядок (оценка, элемент).
    fn zip_insert(
        zl: &mut ZipList,
        element: &Sds,
        score: f64,
    ) {
        let score_repr = Self::format_score(score);
        let mut p = zl.index(0);

        while let Some(pe) = p {
            let ps = zl.entry_end(pe);
            let pair_score = Self::parse_score(zl.get(ps).expect("запись оценки"));

            let place_before = pair_score > score
                || (pair_score == score
                    && zl.get(pe).expect("запись элемента").to_vec().as_slice()
                        > element.as_slice());

            if place_before {
                zl.insert_at(pe, element.as_slice());

                let q = zl.entry_end(pe);
                zl.insert_at(q, score_repr.as_bytes());

                return;
            }

            p = zl.next(ps);
        }

        zl.push_back(element.as_slice());
        zl.push_back(score_repr.as_bytes());
    }

    /// Удаляет пары, для которых предикат истинен; возвращает их число.
    fn zip_remove_matching<F>(
        zl: &mut ZipList,
        should_remove: F,
    ) -> usize
    where
        F: Fn(&Sds, f64) -> bool,
    {
        let mut removed = 0usize;
        let mut p = zl.index(0);

        while let Some(pe) = p {
            let ps = zl.entry_end(pe);
            let ele = zl.get(pe).expect("запись элемента").to_sds();
            let score = Self::parse_score(zl.get(ps).expect("запись оценки"));

            if should_remove(&ele, score) {
                let q = zl.delete(pe);
                zl.delete(q);

                // Курсор уже указывает на следующую пару.
                p = if zl.get(pe).is_some() { Some(pe) } else { None };
                removed += 1;
            } else {
                p = zl.next(ps);
            }
        }

        removed
    }

    /// Запись оценки для упакованной формы: целые — без дробной части,
    /// остальные — кратчайшей однозначной записью; допускаются `inf`/`-inf`.
    fn format_score(score: f64) -> String {
        if score == f64::INFINITY {
            "inf".to_string()
        } else if score == f64::NEG_INFINITY {
            "-inf".to_string()
        } else if score.fract() == 0.0 && score.abs() <= MAX_INTEGRAL_SCORE {
            (score as i64).to_string()
        } else {
            score.to_string()
        }
    }

    /// Обратный разбор оценки из записи упакованной формы.
    fn parse_score(v: ZipValue<'_>) -> f64 {
        match v {
            ZipValue::Int(i) => i as f64,
            ZipValue::Str(s) => std::str::from_utf8(s)
                .ok()
                .and_then(|s| s.parse().ok())
                .expect("оценка в блобе не разбирается"),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов для ZSet
////////////////////////////////////////////////////////////////////////////////

impl Default for ZSet {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for ZSet {
    fn clone(&self) -> Self {
        let mut new = ZSet::with_thresholds(self.max_zip_entries, self.max_zip_value);

        for (ele, score) in self.entries() {
            let _ = new.add(ele, score);
        }

        new
    }
}

impl PartialEq for ZSet {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.len() == other.len() && self.entries() == other.entries()
    }
}

impl std::fmt::Debug for ZSet {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_map()
            .entries(self.entries().iter().map(|(e, s)| (e.to_string(), *s)))
            .finish()
    }
}

impl Serialize for ZSet {
    fn serialize<S: Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.entries())
    }
}

impl<'de> Deserialize<'de> for ZSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let pairs: Vec<(Sds, f64)> = Vec::deserialize(deserializer)?;
        let mut zset = ZSet::new();

        for (e, s) in pairs {
            zset.add(e, s).map_err(serde::de::Error::custom)?;
        }

        Ok(zset)
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    fn sds(s: &str) -> Sds {
        Sds::from_str(s)
    }

    #[test]
    fn test_add_remove_score() {
        let mut z = ZSet::new();

        assert_eq!(z.add(sds("a"), 1.0).unwrap(), ZAddResult::Added);
        assert_eq!(z.add(sds("a"), 1.0).unwrap(), ZAddResult::Unchanged);
        assert_eq!(z.add(sds("a"), 2.0).unwrap(), ZAddResult::Updated);

        assert_eq!(z.score(&sds("a")), Some(2.0));
        assert_eq!(z.score(&sds("b")), None);

        assert!(z.remove(&sds("a")));
        assert!(!z.remove(&sds("a")));
        assert!(z.is_empty());
    }

    #[test]
    fn test_nan_rejected() {
        let mut z = ZSet::new();

        assert_eq!(z.add(sds("a"), f64::NAN), Err(StoreError::NanScore));
        assert!(z.is_empty());
    }

    #[test]
    fn test_zip_keeps_pairs_ordered() {
        let mut z = ZSet::new();

        z.add(sds("c"), 3.0).unwrap();
        z.add(sds("a"), 1.0).unwrap();
        z.add(sds("b"), 2.0).unwrap();
        z.add(sds("x"), 1.0).unwrap();

        assert_eq!(z.encoding(), ZSetEncoding::ZipList);
        assert!(z.validate().is_ok());

        let order: Vec<_> = z.entries().into_iter().map(|(e, _)| e).collect();
        assert_eq!(order, vec![sds("a"), sds("x"), sds("b"), sds("c")]);
    }

    #[test]
    fn test_promotion_by_count() {
        let mut z = ZSet::new();

        for i in 0..128 {
            z.add(Sds::from_str(&format!("ele-{i:04}")), i as f64).unwrap();
        }

        assert_eq!(z.encoding(), ZSetEncoding::ZipList);

        let before = z.entries();

        z.add(sds("one-more"), 1000.0).unwrap();

        assert_eq!(z.encoding(), ZSetEncoding::SkipList);
        assert_eq!(z.len(), 129);
        assert!(z.validate().is_ok());

        // Содержимое не изменилось, не считая нового элемента.
        for (ele, score) in before {
            assert_eq!(z.score(&ele), Some(score));
        }
    }

    #[test]
    fn test_promotion_by_element_length() {
        let mut z = ZSet::new();

        z.add(sds("short"), 1.0).unwrap();
        assert_eq!(z.encoding(), ZSetEncoding::ZipList);

        z.add(Sds::from_bytes(vec![b'x'; 65]), 2.0).unwrap();

        assert_eq!(z.encoding(), ZSetEncoding::SkipList);
        assert!(z.validate().is_ok());
    }

    #[test]
    fn test_no_demotion_after_removal() {
        let mut z = ZSet::with_thresholds(4, 64);

        for i in 0..10 {
            z.add(Sds::from_str(&i.to_string()), i as f64).unwrap();
        }

        assert_eq!(z.encoding(), ZSetEncoding::SkipList);

        for i in 0..9 {
            z.remove(&Sds::from_str(&i.to_string()));
        }

        // Одна запись, но представление остаётся skiplist.
        assert_eq!(z.len(), 1);
        assert_eq!(z.encoding(), ZSetEncoding::SkipList);

        z.clear();
        assert_eq!(z.encoding(), ZSetEncoding::ZipList);
    }

    #[test]
    fn test_rank_both_forms() {
        for thresholds in [(128, 64), (2, 64)] {
            let mut z = ZSet::with_thresholds(thresholds.0, thresholds.1);

            z.add(sds("a"), 1.0).unwrap();
            z.add(sds("b"), 2.0).unwrap();
            z.add(sds("c"), 3.0).unwrap();

            assert_eq!(z.rank(&sds("a"), false), Some(0));
            assert_eq!(z.rank(&sds("c"), false), Some(2));
            assert_eq!(z.rank(&sds("a"), true), Some(2));
            assert_eq!(z.rank(&sds("c"), true), Some(0));
            assert_eq!(z.rank(&sds("zzz"), false), None);
        }
    }

    #[test]
    fn test_range_by_rank_both_forms() {
        for thresholds in [(128, 64), (2, 64)] {
            let mut z = ZSet::with_thresholds(thresholds.0, thresholds.1);

            for (e, s) in [("a", 1.0), ("b", 2.0), ("c", 3.0), ("d", 4.0)] {
                z.add(sds(e), s).unwrap();
            }

            let mid: Vec<_> = z
                .range_by_rank(1, 2, false)
                .into_iter()
                .map(|(e, _)| e)
                .collect();
            assert_eq!(mid, vec![sds("b"), sds("c")]);

            let rev: Vec<_> = z
                .range_by_rank(0, -1, true)
                .into_iter()
                .map(|(e, _)| e)
                .collect();
            assert_eq!(rev, vec![sds("d"), sds("c"), sds("b"), sds("a")]);

            let neg: Vec<_> = z
                .range_by_rank(-2, -1, false)
                .into_iter()
                .map(|(e, _)| e)
                .collect();
            assert_eq!(neg, vec![sds("c"), sds("d")]);

            assert!(z.range_by_rank(10, 20, false).is_empty());
        }
    }

    #[test]
    fn test_range_by_score_both_forms() {
        for thresholds in [(128, 64), (2, 64)] {
            let mut z = ZSet::with_thresholds(thresholds.0, thresholds.1);

            for i in 1..=9 {
                z.add(Sds::from_str(&format!("e{i}")), i as f64).unwrap();
            }

            let range = ScoreRange::inclusive(3.0, 7.0).unwrap();

            let hits: Vec<_> = z
                .range_by_score(&range, 0, None, false)
                .into_iter()
                .map(|(e, _)| e)
                .collect();
            assert_eq!(
                hits,
                vec![sds("e3"), sds("e4"), sds("e5"), sds("e6"), sds("e7")]
            );

            let limited: Vec<_> = z
                .range_by_score(&range, 1, Some(2), false)
                .into_iter()
                .map(|(e, _)| e)
                .collect();
            assert_eq!(limited, vec![sds("e4"), sds("e5")]);

            let rev: Vec<_> = z
                .range_by_score(&range, 0, Some(2), true)
                .into_iter()
                .map(|(e, _)| e)
                .collect();
            assert_eq!(rev, vec![sds("e7"), sds("e6")]);

            assert_eq!(z.count_in_score_range(&range), 5);
        }
    }

    #[test]
    fn test_range_by_lex_both_forms() {
        for thresholds in [(128, 64), (2, 64)] {
            let mut z = ZSet::with_thresholds(thresholds.0, thresholds.1);

            for e in ["a", "b", "c", "d", "e"] {
                z.add(sds(e), 0.0).unwrap();
            }

            let range = LexRange::parse(b"[b", b"(e").unwrap();

            let hits: Vec<_> = z
                .range_by_lex(&range, 0, None, false)
                .into_iter()
                .map(|(e, _)| e)
                .collect();
            assert_eq!(hits, vec![sds("b"), sds("c"), sds("d")]);

            assert_eq!(z.count_in_lex_range(&range), 3);

            let rev: Vec<_> = z
                .range_by_lex(&range, 1, None, true)
                .into_iter()
                .map(|(e, _)| e)
                .collect();
            assert_eq!(rev, vec![sds("c"), sds("b")]);
        }
    }

    #[test]
    fn test_remove_ranges_both_forms() {
        for thresholds in [(128, 64), (2, 64)] {
            let mut z = ZSet::with_thresholds(thresholds.0, thresholds.1);

            for i in 1..=9 {
                z.add(Sds::from_str(&format!("e{i}")), i as f64).unwrap();
            }

            let range = ScoreRange::inclusive(3.0, 5.0).unwrap();
            assert_eq!(z.remove_range_by_score(&range), 3);
            assert_eq!(z.len(), 6);
            assert!(z.validate().is_ok());

            assert_eq!(z.remove_range_by_rank(0, 1), 2);
            assert_eq!(z.len(), 4);
            assert_eq!(z.score(&sds("e1")), None);
            assert_eq!(z.score(&sds("e2")), None);
            assert!(z.validate().is_ok());
        }
    }

    #[test]
    fn test_score_update_moves_element() {
        for thresholds in [(128, 64), (2, 64)] {
            let mut z = ZSet::with_thresholds(thresholds.0, thresholds.1);

            z.add(sds("a"), 1.0).unwrap();
            z.add(sds("b"), 2.0).unwrap();
            z.add(sds("c"), 3.0).unwrap();

            z.add(sds("a"), 10.0).unwrap();

            assert_eq!(z.rank(&sds("a"), false), Some(2));
            assert_eq!(z.score(&sds("a")), Some(10.0));
            assert_eq!(z.len(), 3);
            assert!(z.validate().is_ok());
        }
    }

    #[test]
    fn test_infinite_scores_roundtrip_in_zip_form() {
        let mut z = ZSet::new();

        z.add(sds("low"), f64::NEG_INFINITY).unwrap();
        z.add(sds("high"), f64::INFINITY).unwrap();
        z.add(sds("mid"), 0.5).unwrap();

        assert_eq!(z.encoding(), ZSetEncoding::ZipList);
        assert_eq!(z.score(&sds("low")), Some(f64::NEG_INFINITY));
        assert_eq!(z.score(&sds("high")), Some(f64::INFINITY));

        let order: Vec<_> = z.entries().into_iter().map(|(e, _)| e).collect();
        assert_eq!(order, vec![sds("low"), sds("mid"), sds("high")]);
    }

    #[test]
    fn test_fractional_scores_roundtrip() {
        let mut z = ZSet::new();

        z.add(sds("pi"), 3.141592653589793).unwrap();
        z.add(sds("tiny"), 1e-300).unwrap();

        assert_eq!(z.score(&sds("pi")), Some(3.141592653589793));
        assert_eq!(z.score(&sds("tiny")), Some(1e-300));
    }

    #[test]
    fn test_serde_roundtrip() {
        let mut z = ZSet::new();

        for i in 0..20 {
            z.add(Sds::from_str(&format!("e{i}")), i as f64).unwrap();
        }

        let json = serde_json::to_string(&z).unwrap();
        let back: ZSet = serde_json::from_str(&json).unwrap();

        assert_eq!(z, back);
    }
}
