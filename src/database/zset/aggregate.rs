//! Объединение и пересечение упорядоченных множеств.
//!
//! Входами служат упорядоченные множества и обычные наборы (каждому
//! элементу набора приписывается оценка 1). Каждому входу соответствует
//! вес; столкновения оценок сворачиваются функцией агрегации.

use std::collections::HashSet;

use ordered_float::OrderedFloat;

use crate::{
    database::dict::Entry,
    error::{StoreError, StoreResult},
    Dict, IntSet, Sds, ZSet,
};

/// Функция свёртки оценок одного элемента из разных входов.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregate {
    Sum,
    Min,
    Max,
}

/// Один вход агрегации.
pub enum ZAggInput<'a> {
    /// Упорядоченное множество со своими оценками.
    ZSet(&'a ZSet),
    /// Обычный набор: оценка каждого элемента — 1.
    Set(&'a HashSet<Sds>),
    /// Компактный целочисленный набор: оценка каждого элемента — 1.
    IntSet(&'a IntSet),
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl Aggregate {
    /// Сворачивает две оценки. Сумма `(+∞) + (−∞)` определена как 0.
    pub fn apply(
        &self,
        a: f64,
        b: f64,
    ) -> f64 {
        match self {
            Aggregate::Sum => {
                let r = a + b;

                if r.is_nan() {
                    0.0
                } else {
                    r
                }
            }
            Aggregate::Min => a.min(b),
            Aggregate::Max => a.max(b),
        }
    }
}

impl ZAggInput<'_> {
    /// Мощность входа.
    pub fn len(&self) -> usize {
        match self {
            ZAggInput::ZSet(z) => z.len(),
            ZAggInput::Set(s) => s.len(),
            ZAggInput::IntSet(s) => s.len(),
        }
    }

    /// Возвращает `true`, если вход пуст.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Оценка элемента на этом входе.
    pub fn score(
        &self,
        element: &Sds,
    ) -> Option<f64> {
        match self {
            ZAggInput::ZSet(z) => z.score(element),
            ZAggInput::Set(s) => s.contains(element).then_some(1.0),
            ZAggInput::IntSet(s) => {
                let v = Sds::parse_i64(element.as_slice())?;
                s.contains(v).then_some(1.0)
            }
        }
    }

    /// Все пары (элемент, оценка) входа.
    pub fn entries(&self) -> Vec<(Sds, f64)> {
        match self {
            ZAggInput::ZSet(z) => z.entries(),
            ZAggInput::Set(s) => s.iter().map(|e| (e.clone(), 1.0)).collect(),
            ZAggInput::IntSet(s) => s
                .iter()
                .map(|v| (Sds::from_str(&v.to_string()), 1.0))
                .collect(),
        }
    }
}

/// Оценка, умноженная на вес входа; NaN (например, `0 × ∞`) считается нулём.
fn weighted(
    score: f64,
    weight: f64,
) -> f64 {
    let v = score * weight;

    if v.is_nan() {
        0.0
    } else {
        v
    }
}

/// Веса по умолчанию — единичные; заданные должны совпадать по числу со
/// входами.
fn resolve_weights(
    inputs: usize,
    weights: Option<&[f64]>,
) -> StoreResult<Vec<f64>> {
    match weights {
        None => Ok(vec![1.0; inputs]),
        Some(w) if w.len() == inputs => Ok(w.to_vec()),
        Some(w) => Err(StoreError::InvalidRange(format!(
            "весов {}, а входов {}",
            w.len(),
            inputs
        ))),
    }
}

/// Индексы входов по возрастанию мощности: начинать с меньшего дешевле.
fn order_by_len(inputs: &[ZAggInput<'_>]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..inputs.len()).collect();
    order.sort_by_key(|&i| inputs[i].len());
    order
}

/// Строит упорядоченное множество из накопленных пар: вставка в порядке
/// (оценка, элемент) держит упакованную форму дешёвой, а повышение при
/// превышении порогов происходит само.
fn build_destination(mut pairs: Vec<(Sds, f64)>) -> StoreResult<ZSet> {
    pairs.sort_by(|a, b| (OrderedFloat(a.1), &a.0).cmp(&(OrderedFloat(b.1), &b.0)));

    let mut dest = ZSet::new();

    for (ele, score) in pairs {
        dest.add(ele, score)?;
    }

    Ok(dest)
}

impl ZSet {
    /// Объединение входов с весами и функцией агрегации.
    ///
    /// Оценки накапливаются в хеш-таблице по элементу; столкновения
    /// сворачиваются `aggregate`. Итог компактен, если умещается в пороги
    /// упакованного представления.
    pub fn union_store(
        inputs: &[ZAggInput<'_>],
        weights: Option<&[f64]>,
        aggregate: Aggregate,
    ) -> StoreResult<ZSet> {
        let weights = resolve_weights(inputs.len(), weights)?;
        let order = order_by_len(inputs);

        let mut acc: Dict<Sds, f64> = Dict::new();

        for &i in &order {
            let w = weights[i];

            for (ele, score) in inputs[i].entries() {
                let ws = weighted(score, w);

                match acc.entry(ele) {
                    Entry::Occupied(mut e) => {
                        let merged = aggregate.apply(*e.get(), ws);
                        e.insert(merged);
                    }
                    Entry::Vacant(e) => {
                        e.insert(ws);
                    }
                }
            }
        }

        let pairs: Vec<(Sds, f64)> = acc.iter().map(|(e, s)| (e.clone(), *s)).collect();

        build_destination(pairs)
    }

    /// Пересечение входов с весами и функцией агрегации.
    ///
    /// Обходится наименьший вход; каждый его элемент пробуется во всех
    /// остальных и попадает в итог только при наличии везде.
    pub fn intersect_store(
        inputs: &[ZAggInput<'_>],
        weights: Option<&[f64]>,
        aggregate: Aggregate,
    ) -> StoreResult<ZSet> {
        if inputs.is_empty() {
            return Ok(ZSet::new());
        }

        let weights = resolve_weights(inputs.len(), weights)?;
        let order = order_by_len(inputs);
        let smallest = order[0];

        if inputs[smallest].is_empty() {
            return Ok(ZSet::new());
        }

        let mut pairs = Vec::new();

        'outer: for (ele, score) in inputs[smallest].entries() {
            let mut value = weighted(score, weights[smallest]);

            for &j in &order[1..] {
                match inputs[j].score(&ele) {
                    Some(s) => value = aggregate.apply(value, weighted(s, weights[j])),
                    None => continue 'outer,
                }
            }

            pairs.push((ele, value));
        }

        build_destination(pairs)
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
