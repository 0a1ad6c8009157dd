//! Пропускной список с ранговыми счётчиками.
//!
//! Узлы упорядочены по паре (оценка, элемент): первичный ключ — `f64`,
//! равные оценки разрешаются побайтовым сравнением элемента. Каждая
//! forward-ссылка хранит span — число узлов нулевого уровня, которые она
//! перепрыгивает; сумма span'ов вдоль пути от головы даёт 1-базный ранг
//! узла, что делает запросы по рангу O(log N).

use std::{collections::HashMap, marker::PhantomData, ptr::NonNull};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::range::{LexRange, ScoreRange};
use crate::{error::ValidationError, validate, Sds};

/// Максимальный уровень пропускного списка.
pub const MAX_LEVEL: usize = 32;

/// Вероятностный коэффициент повышения уровня: P = 1/4.
const P: u32 = 0x4000;
const MASK: u32 = 0xFFFF;

type Link = Option<NonNull<SkipNode>>;

#[derive(Debug, Clone, Copy)]
struct Level {
    forward: Link,
    span: usize,
}

/// Узел пропускного списка.
#[derive(Debug)]
pub struct SkipNode {
    element: Sds,
    score: f64,
    backward: Link,
    levels: Vec<Level>,
}

/// Пропускной список: головной сентинел, хвост, текущий уровень и длина.
#[derive(Debug)]
pub struct SkipList {
    header: NonNull<SkipNode>,
    tail: Link,
    level: usize,
    length: usize,
    rng: fastrand::Rng,
}

/// Итератор по узлам в порядке возрастания (оценка, элемент).
pub struct SkipListIter<'a> {
    current: Link,
    _marker: PhantomData<&'a SkipNode>,
}

/// Итератор по узлам в обратном порядке.
pub struct SkipListRevIter<'a> {
    current: Link,
    _marker: PhantomData<&'a SkipNode>,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl SkipNode {
    fn new(
        score: f64,
        element: Sds,
        level: usize,
    ) -> Box<Self> {
        Box::new(SkipNode {
            element,
            score,
            backward: None,
            levels: vec![
                Level {
                    forward: None,
                    span: 0,
                };
                level
            ],
        })
    }

    fn head() -> Box<Self> {
        Self::new(0.0, Sds::default(), MAX_LEVEL)
    }

    /// Элемент узла.
    #[inline]
    pub fn element(&self) -> &Sds {
        &self.element
    }

    /// Оценка узла.
    #[inline]
    pub fn score(&self) -> f64 {
        self.score
    }

    /// Следующий узел нулевого уровня.
    pub fn next(&self) -> Option<&SkipNode> {
        unsafe { self.levels[0].forward.map(|n| &*n.as_ptr()) }
    }

    /// Предыдущий узел (голова-сентинел недостижима).
    pub fn prev(&self) -> Option<&SkipNode> {
        unsafe { self.backward.map(|n| &*n.as_ptr()) }
    }
}

impl SkipList {
    /// Создаёт пустой список со случайным потоком уровней.
    pub fn new() -> Self {
        Self::with_rng(fastrand::Rng::new())
    }

    /// Создаёт пустой список с детерминированным потоком уровней.
    ///
    /// Уровни узлов зависят только от seed и порядка вставок, что делает
    /// форму списка воспроизводимой в тестах.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(fastrand::Rng::with_seed(seed))
    }

    fn with_rng(rng: fastrand::Rng) -> Self {
        let header = SkipNode::head();

        SkipList {
            header: unsafe { NonNull::new_unchecked(Box::into_raw(header)) },
            tail: None,
            level: 1,
            length: 0,
            rng,
        }
    }

    /// Текущее число элементов.
    #[inline]
    pub fn len(&self) -> usize {
        self.length
    }

    /// Проверяет на пустоту.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Текущий максимальный уровень списка.
    #[inline]
    pub fn level(&self) -> usize {
        self.level
    }

    /// Ключ `a` строго меньше ключа `b`.
    #[inline]
    fn key_less(
        a_score: f64,
        a_ele: &Sds,
        b_score: f64,
        b_ele: &Sds,
    ) -> bool {
        a_score < b_score || (a_score == b_score && a_ele < b_ele)
    }

    /// Генерирует уровень нового узла: k с вероятностью P^(k−1)·(1−P).
    #[inline]
    fn random_level(&mut self) -> usize {
        let mut lvl = 1;

        while lvl < MAX_LEVEL && (self.rng.u32(..) & MASK) < P {
            lvl += 1;
        }

        lvl
    }

    /// Вставляет пару (оценка, элемент).
    ///
    /// Уникальность ключа обеспечивает вызывающий (упорядоченное множество
    /// сначала проверяет хеш-таблицу); NaN отвергается на его же границе.
    pub fn insert(
        &mut self,
        score: f64,
        element: Sds,
    ) -> &SkipNode {
        debug_assert!(!score.is_nan(), "NaN не допускается в skip list");

        unsafe {
            let mut update: [*mut SkipNode; MAX_LEVEL] = [std::ptr::null_mut(); MAX_LEVEL];
            let mut rank = [0usize; MAX_LEVEL];
            let mut x = self.header.as_ptr();

            for i in (0..self.level).rev() {
                rank[i] = if i == self.level - 1 { 0 } else { rank[i + 1] };

                while let Some(next) = (&(*x).levels)[i].forward {
                    let n = next.as_ptr();

                    if Self::key_less((*n).score, &(*n).element, score, &element) {
                        rank[i] += (&(*x).levels)[i].span;
                        x = n;
                    } else {
                        break;
                    }
                }

                update[i] = x;
            }

            let lvl = self.random_level();

            if lvl > self.level {
                for i in self.level..lvl {
                    rank[i] = 0;
                    update[i] = self.header.as_ptr();
                    (&mut (*update[i]).levels)[i].span = self.length;
                }

                self.level = lvl;
            }

            let node = SkipNode::new(score, element, lvl);
            let np = NonNull::new_unchecked(Box::into_raw(node));
            let n = np.as_ptr();

            for i in 0..lvl {
                (&mut (*n).levels)[i].forward = (&(*update[i]).levels)[i].forward;
                (&mut (*update[i]).levels)[i].forward = Some(np);

                // Новый узел делит span предшественника на две части.
                (&mut (*n).levels)[i].span = (&(*update[i]).levels)[i].span - (rank[0] - rank[i]);
                (&mut (*update[i]).levels)[i].span = (rank[0] - rank[i]) + 1;
            }

            // Уровни выше нового узла перепрыгивают на один узел больше.
            for i in lvl..self.level {
                (&mut (*update[i]).levels)[i].span += 1;
            }

            (*n).backward = if update[0] == self.header.as_ptr() {
                None
            } else {
                NonNull::new(update[0])
            };

            if let Some(next) = (&(*n).levels)[0].forward {
                (*next.as_ptr()).backward = Some(np);
            } else {
                self.tail = Some(np);
            }

            self.length += 1;

            &*n
        }
    }

    /// Удаляет пару (оценка, элемент). Возвращает `true`, если узел найден
    /// и удалён.
    pub fn delete(
        &mut self,
        score: f64,
        element: &Sds,
    ) -> bool {
        unsafe {
            let (update, x) = self.find_update(score, element);

            match x {
                Some(n) => {
                    self.unlink(n.as_ptr(), &update);
                    drop(Box::from_raw(n.as_ptr()));
                    true
                }
                None => false,
            }
        }
    }

    /// Меняет оценку существующего элемента.
    ///
    /// Если новая позиция совпадает со старой, оценка правится на месте;
    /// иначе узел пересоздаётся в новой позиции. Возвращает `false`, если
    /// пара (оценка, элемент) не найдена.
    pub fn update_score(
        &mut self,
        cur_score: f64,
        element: &Sds,
        new_score: f64,
    ) -> bool {
        debug_assert!(!new_score.is_nan(), "NaN не допускается в skip list");

        unsafe {
            let (update, x) = self.find_update(cur_score, element);

            let Some(node) = x else { return false };
            let n = node.as_ptr();

            let back_ok = (*n)
                .backward
                .map_or(true, |b| (*b.as_ptr()).score < new_score);
            let fwd_ok = (&(*n).levels)[0]
                .forward
                .map_or(true, |f| (*f.as_ptr()).score > new_score);

            if back_ok && fwd_ok {
                (*n).score = new_score;
                return true;
            }

            self.unlink(n, &update);

            let boxed = Box::from_raw(n);
            self.insert(new_score, boxed.element);

            true
        }
    }

    /// 1-базный ранг пары (оценка, элемент); 0 — пары нет.
    pub fn rank_of(
        &self,
        score: f64,
        element: &Sds,
    ) -> usize {
        unsafe {
            let mut rank = 0usize;
            let mut x = self.header.as_ptr();

            for i in (0..self.level).rev() {
                while let Some(next) = (&(*x).levels)[i].forward {
                    let n = next.as_ptr();
                    let advance = (*n).score < score
                        || ((*n).score == score && (*n).element <= *element);

                    if advance {
                        rank += (&(*x).levels)[i].span;
                        x = n;
                    } else {
                        break;
                    }
                }

                if x != self.header.as_ptr()
                    && (*x).score == score
                    && (*x).element == *element
                {
                    return rank;
                }
            }

            0
        }
    }

    /// Узел по 1-базному рангу.
    pub fn by_rank(
        &self,
        rank: usize,
    ) -> Option<&SkipNode> {
        if rank == 0 || rank > self.length {
            return None;
        }

        unsafe {
            let mut traversed = 0usize;
            let mut x = self.header.as_ptr();

            for i in (0..self.level).rev() {
                while let Some(next) = (&(*x).levels)[i].forward {
                    if traversed + (&(*x).levels)[i].span <= rank {
                        traversed += (&(*x).levels)[i].span;
                        x = next.as_ptr();
                    } else {
                        break;
                    }
                }

                if traversed == rank {
                    return Some(&*x);
                }
            }

            None
        }
    }

    /// Список пересекается с диапазоном оценок.
    pub fn is_in_score_range(
        &self,
        range: &ScoreRange,
    ) -> bool {
        if range.is_empty() {
            return false;
        }

        unsafe {
            match self.tail {
                Some(t) if range.gte_min((*t.as_ptr()).score) => {}
                _ => return false,
            }

            match (&(*self.header.as_ptr()).levels)[0].forward {
                Some(f) if range.lte_max((*f.as_ptr()).score) => {}
                _ => return false,
            }
        }

        true
    }

    /// Первый узел с оценкой в диапазоне.
    pub fn first_in_score_range(
        &self,
        range: &ScoreRange,
    ) -> Option<&SkipNode> {
        if !self.is_in_score_range(range) {
            return None;
        }

        unsafe {
            let mut x = self.header.as_ptr();

            for i in (0..self.level).rev() {
                while let Some(next) = (&(*x).levels)[i].forward {
                    if !range.gte_min((*next.as_ptr()).score) {
                        x = next.as_ptr();
                    } else {
                        break;
                    }
                }
            }

            // Пересечение проверено: следующий узел существует.
            let n = (&(*x).levels)[0].forward.unwrap().as_ptr();

            if !range.lte_max((*n).score) {
                return None;
            }

            Some(&*n)
        }
    }

    /// Последний узел с оценкой в диапазоне.
    pub fn last_in_score_range(
        &self,
        range: &ScoreRange,
    ) -> Option<&SkipNode> {
        if !self.is_in_score_range(range) {
            return None;
        }

        unsafe {
            let mut x = self.header.as_ptr();

            for i in (0..self.level).rev() {
                while let Some(next) = (&(*x).levels)[i].forward {
                    if range.lte_max((*next.as_ptr()).score) {
                        x = next.as_ptr();
                    } else {
                        break;
                    }
                }
            }

            if x == self.header.as_ptr() || !range.gte_min((*x).score) {
                return None;
            }

            Some(&*x)
        }
    }

    /// Список пересекается с лексикографическим диапазоном.
    ///
    /// Осмысленно при одинаковой оценке у всех элементов — как и в
    /// командах lex-диапазонов.
    pub fn is_in_lex_range(
        &self,
        range: &LexRange,
    ) -> bool {
        if range.is_empty() {
            return false;
        }

        unsafe {
            match self.tail {
                Some(t) if range.gte_min(&(*t.as_ptr()).element) => {}
                _ => return false,
            }

            match (&(*self.header.as_ptr()).levels)[0].forward {
                Some(f) if range.lte_max(&(*f.as_ptr()).element) => {}
                _ => return false,
            }
        }

        true
    }

    /// Первый узел с элементом в лексикографическом диапазоне.
    pub fn first_in_lex_range(
        &self,
        range: &LexRange,
    ) -> Option<&SkipNode> {
        if !self.is_in_lex_range(range) {
            return None;
        }

        unsafe {
            let mut x = self.header.as_ptr();

            for i in (0..self.level).rev() {
                while let Some(next) = (&(*x).levels)[i].forward {
                    if !range.gte_min(&(*next.as_ptr()).element) {
                        x = next.as_ptr();
                    } else {
                        break;
                    }
                }
            }

            let n = (&(*x).levels)[0].forward.unwrap().as_ptr();

            if !range.lte_max(&(*n).element) {
                return None;
            }

            Some(&*n)
        }
    }

    /// Последний узел с элементом в лексикографическом диапазоне.
    pub fn last_in_lex_range(
        &self,
        range: &LexRange,
    ) -> Option<&SkipNode> {
        if !self.is_in_lex_range(range) {
            return None;
        }

        unsafe {
            let mut x = self.header.as_ptr();

            for i in (0..self.level).rev() {
                while let Some(next) = (&(*x).levels)[i].forward {
                    if range.lte_max(&(*next.as_ptr()).element) {
                        x = next.as_ptr();
                    } else {
                        break;
                    }
                }
            }

            if x == self.header.as_ptr() || !range.gte_min(&(*x).element) {
                return None;
            }

            Some(&*x)
        }
    }

    /// Удаляет все узлы с оценкой в диапазоне; возвращает удалённые пары.
    pub fn delete_range_by_score(
        &mut self,
        range: &ScoreRange,
    ) -> Vec<(Sds, f64)> {
        let mut removed = Vec::new();

        unsafe {
            let mut update: [*mut SkipNode; MAX_LEVEL] = [std::ptr::null_mut(); MAX_LEVEL];
            let mut x = self.header.as_ptr();

            for i in (0..self.level).rev() {
                while let Some(next) = (&(*x).levels)[i].forward {
                    if !range.gte_min((*next.as_ptr()).score) {
                        x = next.as_ptr();
                    } else {
                        break;
                    }
                }

                update[i] = x;
            }

            let mut cur = (&(*x).levels)[0].forward;

            while let Some(node) = cur {
                let n = node.as_ptr();

                if !range.lte_max((*n).score) {
                    break;
                }

                cur = (&(*n).levels)[0].forward;
                self.unlink(n, &update);

                let boxed = Box::from_raw(n);
                removed.push((boxed.element, boxed.score));
            }
        }

        removed
    }

    /// Удаляет все узлы с элементом в лексикографическом диапазоне.
    pub fn delete_range_by_lex(
        &mut self,
        range: &LexRange,
    ) -> Vec<(Sds, f64)> {
        let mut removed = Vec::new();

        unsafe {
            let mut update: [*mut SkipNode; MAX_LEVEL] = [std::ptr::null_mut(); MAX_LEVEL];
            let mut x = self.header.as_ptr();

            for i in (0..self.level).rev() {
                while let Some(next) = (&(*x).levels)[i].forward {
                    if !range.gte_min(&(*next.as_ptr()).element) {
                        x = next.as_ptr();
                    } else {
                        break;
                    }
                }

                update[i] = x;
            }

            let mut cur = (&(*x).levels)[0].forward;

            while let Some(node) = cur {
                let n = node.as_ptr();

                if !range.lte_max(&(*n).element) {
                    break;
                }

                cur = (&(*n).levels)[0].forward;
                self.unlink(n, &update);

                let boxed = Box::from_raw(n);
                removed.push((boxed.element, boxed.score));
            }
        }

        removed
    }

    /// Удаляет узлы с рангами в `[start, end]` (1-базные, включительно).
    pub fn delete_range_by_rank(
        &mut self,
        start: usize,
        end: usize,
    ) -> Vec<(Sds, f64)> {
        debug_assert!(start >= 1 && start <= end, "инвертированный диапазон рангов");

        let mut removed = Vec::new();

        if start == 0 || start > end {
            return removed;
        }

        unsafe {
            let mut update: [*mut SkipNode; MAX_LEVEL] = [std::ptr::null_mut(); MAX_LEVEL];
            let mut traversed = 0usize;
            let mut x = self.header.as_ptr();

            for i in (0..self.level).rev() {
                while let Some(next) = (&(*x).levels)[i].forward {
                    if traversed + (&(*x).levels)[i].span < start {
                        traversed += (&(*x).levels)[i].span;
                        x = next.as_ptr();
                    } else {
                        break;
                    }
                }

                update[i] = x;
            }

            traversed += 1;

            let mut cur = (&(*x).levels)[0].forward;

            while let Some(node) = cur {
                if traversed > end {
                    break;
                }

                let n = node.as_ptr();

                cur = (&(*n).levels)[0].forward;
                self.unlink(n, &update);

                let boxed = Box::from_raw(n);
                removed.push((boxed.element, boxed.score));

                traversed += 1;
            }
        }

        removed
    }

    /// Первый (минимальный) узел.
    pub fn first(&self) -> Option<&SkipNode> {
        unsafe { (&(*self.header.as_ptr()).levels)[0].forward.map(|n| &*n.as_ptr()) }
    }

    /// Последний (максимальный) узел.
    pub fn last(&self) -> Option<&SkipNode> {
        unsafe { self.tail.map(|n| &*n.as_ptr()) }
    }

    /// Итератор в порядке возрастания.
    pub fn iter(&self) -> SkipListIter<'_> {
        unsafe {
            SkipListIter {
                current: (&(*self.header.as_ptr()).levels)[0].forward,
                _marker: PhantomData,
            }
        }
    }

    /// Итератор в порядке убывания.
    pub fn iter_rev(&self) -> SkipListRevIter<'_> {
        SkipListRevIter {
            current: self.tail,
            _marker: PhantomData,
        }
    }

    /// Гистограмма уровней узлов (индекс 0 — уровень 1).
    ///
    /// Для статистической проверки распределения уровней.
    pub fn level_histogram(&self) -> Vec<usize> {
        let mut histogram = vec![0usize; MAX_LEVEL];

        unsafe {
            let mut cur = (&(*self.header.as_ptr()).levels)[0].forward;

            while let Some(node) = cur {
                let n = node.as_ptr();

                histogram[(*n).levels.len() - 1] += 1;
                cur = (&(*n).levels)[0].forward;
            }
        }

        histogram
    }

    /// Проверяет инварианты: порядок ключей, суммы span'ов, backward-цепочку
    /// и длину.
    pub fn validate_invariants(&self) -> Result<(), ValidationError> {
        unsafe {
            // Позиции узлов по нулевому уровню: голова — 0, узлы — 1..=N.
            let mut positions: HashMap<*const SkipNode, usize> = HashMap::new();
            positions.insert(self.header.as_ptr() as *const _, 0);

            let mut count = 0usize;
            let mut prev: Option<*const SkipNode> = None;
            let mut cur = (&(*self.header.as_ptr()).levels)[0].forward;

            while let Some(node) = cur {
                let n = node.as_ptr();

                validate!(
                    (*n).levels.len() <= MAX_LEVEL,
                    ValidationError::InvalidLevel {
                        node_level: (*n).levels.len(),
                        max_level: MAX_LEVEL,
                    }
                );

                if let Some(p) = prev {
                    validate!(
                        Self::key_less((*p).score, &(*p).element, (*n).score, &(*n).element),
                        ValidationError::SortOrderViolation {
                            message: format!(
                                "({}, {}) >= ({}, {})",
                                (*p).score,
                                (*p).element,
                                (*n).score,
                                (*n).element
                            ),
                        }
                    );
                }

                count += 1;
                positions.insert(n as *const _, count);
                prev = Some(n);
                cur = (&(*n).levels)[0].forward;
            }

            validate!(
                count == self.length,
                ValidationError::LengthMismatch {
                    expected: self.length,
                    actual: count,
                }
            );

            // Span каждой forward-ссылки равен разнице позиций узлов.
            for i in 0..self.level {
                let mut x = self.header.as_ptr();

                while let Some(next) = (&(*x).levels)[i].forward {
                    let from = positions[&(x as *const SkipNode)];
                    let to = positions[&(next.as_ptr() as *const SkipNode)];

                    validate!(
                        (&(*x).levels)[i].span == to - from,
                        ValidationError::SpanMismatch {
                            level: i,
                            message: format!(
                                "span {} между позициями {} и {}",
                                (&(*x).levels)[i].span,
                                from,
                                to
                            ),
                        }
                    );

                    x = next.as_ptr();
                }
            }

            // Обратная цепочка зеркальна прямой.
            let mut back_count = 0usize;
            let mut cur = self.tail;

            while let Some(node) = cur {
                back_count += 1;
                cur = (*node.as_ptr()).backward;
            }

            validate!(
                back_count == self.length,
                ValidationError::InvalidBackwardLink {
                    message: format!(
                        "обратная цепочка дала {back_count} узлов из {}",
                        self.length
                    ),
                }
            );
        }

        Ok(())
    }

    /// Ищет предшественников на каждом уровне и сам узел с точным ключом.
    unsafe fn find_update(
        &self,
        score: f64,
        element: &Sds,
    ) -> ([*mut SkipNode; MAX_LEVEL], Link) {
        let mut update: [*mut SkipNode; MAX_LEVEL] = [std::ptr::null_mut(); MAX_LEVEL];
        let mut x = self.header.as_ptr();

        for i in (0..self.level).rev() {
            while let Some(next) = (&(*x).levels)[i].forward {
                let n = next.as_ptr();

                if Self::key_less((*n).score, &(*n).element, score, element) {
                    x = n;
                } else {
                    break;
                }
            }

            update[i] = x;
        }

        let found = match (&(*x).levels)[0].forward {
            Some(next)
                if (*next.as_ptr()).score == score && (*next.as_ptr()).element == *element =>
            {
                Some(next)
            }
            _ => None,
        };

        (update, found)
    }

    /// Выписывает узел из всех уровней и правит span'ы, хвост и уровень.
    unsafe fn unlink(
        &mut self,
        x: *mut SkipNode,
        update: &[*mut SkipNode; MAX_LEVEL],
    ) {
        for i in 0..self.level {
            let u = update[i];

            if (&(*u).levels)[i].forward == NonNull::new(x) {
                (&mut (*u).levels)[i].span += (&(*x).levels)[i].span;
                (&mut (*u).levels)[i].span -= 1;
                (&mut (*u).levels)[i].forward = (&(*x).levels)[i].forward;
            } else {
                (&mut (*u).levels)[i].span -= 1;
            }
        }

        if let Some(next) = (&(*x).levels)[0].forward {
            (*next.as_ptr()).backward = (*x).backward;
        } else {
            self.tail = (*x).backward;
        }

        while self.level > 1
            && (&(*self.header.as_ptr()).levels)[self.level - 1].forward.is_none()
        {
            self.level -= 1;
        }

        self.length -= 1;
    }
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов для SkipList
////////////////////////////////////////////////////////////////////////////////

impl Default for SkipList {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SkipList {
    fn drop(&mut self) {
        unsafe {
            let mut current = (&(*self.header.as_ptr()).levels)[0].forward;

            while let Some(node) = current {
                current = (&(*node.as_ptr()).levels)[0].forward;
                drop(Box::from_raw(node.as_ptr()));
            }

            drop(Box::from_raw(self.header.as_ptr()));
        }
    }
}

impl<'a> Iterator for SkipListIter<'a> {
    type Item = (&'a Sds, f64);

    fn next(&mut self) -> Option<Self::Item> {
        unsafe {
            let node = self.current?;
            let n = node.as_ptr();

            self.current = (&(*n).levels)[0].forward;

            Some((&(*n).element, (*n).score))
        }
    }
}

impl<'a> Iterator for SkipListRevIter<'a> {
    type Item = (&'a Sds, f64);

    fn next(&mut self) -> Option<Self::Item> {
        unsafe {
            let node = self.current?;
            let n = node.as_ptr();

            self.current = (*n).backward;

            Some((&(*n).element, (*n).score))
        }
    }
}

impl<'a> IntoIterator for &'a SkipList {
    type Item = (&'a Sds, f64);
    type IntoIter = SkipListIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Clone for SkipList {
    fn clone(&self) -> Self {
        let mut new = SkipList::new();

        for (ele, score) in self.iter() {
            new.insert(score, ele.clone());
        }

        new
    }
}

impl PartialEq for SkipList {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.length == other.length && self.iter().eq(other.iter())
    }
}

impl Serialize for SkipList {
    fn serialize<S: Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter().map(|(e, s)| (e.clone(), s)))
    }
}

impl<'de> Deserialize<'de> for SkipList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let pairs: Vec<(Sds, f64)> = Vec::deserialize(deserializer)?;
        let mut list = SkipList::new();

        for (e, s) in pairs {
            list.insert(s, e);
        }

        Ok(list)
    }
}

unsafe impl Send for SkipList {}
unsafe impl Sync for SkipList {}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    fn sds(s: &str) -> Sds {
        Sds::from_str(s)
    }

    fn make_list(pairs: &[(f64, &str)]) -> SkipList {
        let mut sl = SkipList::with_seed(7);

        for (score, ele) in pairs {
            sl.insert(*score, sds(ele));
        }

        sl
    }

    #[test]
    fn test_new_and_basic_properties() {
        let sl = SkipList::new();

        assert_eq!(sl.len(), 0);
        assert!(sl.is_empty());
        assert!(sl.first().is_none());
        assert!(sl.last().is_none());
        assert!(sl.validate_invariants().is_ok());
    }

    #[test]
    fn test_iter_order_by_score_then_element() {
        let sl = make_list(&[(3.0, "c"), (1.0, "b"), (1.0, "a"), (2.0, "x")]);

        let collected: Vec<_> = sl.iter().map(|(e, s)| (s, e.clone())).collect();

        assert_eq!(
            collected,
            vec![
                (1.0, sds("a")),
                (1.0, sds("b")),
                (2.0, sds("x")),
                (3.0, sds("c"))
            ]
        );
        assert!(sl.validate_invariants().is_ok());
    }

    #[test]
    fn test_rank_and_by_rank_consistency() {
        let sl = make_list(&[
            (1.0, "e1"),
            (3.0, "e3"),
            (5.0, "e5"),
            (7.0, "e7"),
            (9.0, "e9"),
        ]);

        assert_eq!(sl.rank_of(5.0, &sds("e5")), 3);
        assert_eq!(sl.rank_of(1.0, &sds("e1")), 1);
        assert_eq!(sl.rank_of(9.0, &sds("e9")), 5);
        assert_eq!(sl.rank_of(4.0, &sds("e4")), 0);

        for rank in 1..=5 {
            let node = sl.by_rank(rank).unwrap();
            assert_eq!(sl.rank_of(node.score(), node.element()), rank);
        }

        assert!(sl.by_rank(0).is_none());
        assert!(sl.by_rank(6).is_none());
    }

    #[test]
    fn test_score_range_queries() {
        let sl = make_list(&[
            (1.0, "e1"),
            (3.0, "e3"),
            (5.0, "e5"),
            (7.0, "e7"),
            (9.0, "e9"),
        ]);

        let range = ScoreRange::inclusive(4.0, 8.0).unwrap();

        assert_eq!(sl.first_in_score_range(&range).unwrap().element(), &sds("e5"));
        assert_eq!(sl.last_in_score_range(&range).unwrap().element(), &sds("e7"));

        let exclusive = ScoreRange::new(5.0, 9.0, true, true).unwrap();

        assert_eq!(
            sl.first_in_score_range(&exclusive).unwrap().element(),
            &sds("e7")
        );
        assert_eq!(
            sl.last_in_score_range(&exclusive).unwrap().element(),
            &sds("e7")
        );

        let outside = ScoreRange::inclusive(100.0, 200.0).unwrap();
        assert!(sl.first_in_score_range(&outside).is_none());
    }

    #[test]
    fn test_lex_range_queries() {
        let sl = make_list(&[(0.0, "a"), (0.0, "b"), (0.0, "c"), (0.0, "d")]);

        let range = LexRange::parse(b"[b", b"(d").unwrap();

        assert_eq!(sl.first_in_lex_range(&range).unwrap().element(), &sds("b"));
        assert_eq!(sl.last_in_lex_range(&range).unwrap().element(), &sds("c"));

        let all = LexRange::parse(b"-", b"+").unwrap();

        assert_eq!(sl.first_in_lex_range(&all).unwrap().element(), &sds("a"));
        assert_eq!(sl.last_in_lex_range(&all).unwrap().element(), &sds("d"));
    }

    #[test]
    fn test_delete() {
        let mut sl = make_list(&[(1.0, "a"), (2.0, "b"), (3.0, "c")]);

        assert!(sl.delete(2.0, &sds("b")));
        assert!(!sl.delete(2.0, &sds("b")));
        assert!(!sl.delete(1.0, &sds("zzz")));

        assert_eq!(sl.len(), 2);
        assert_eq!(sl.rank_of(3.0, &sds("c")), 2);
        assert!(sl.validate_invariants().is_ok());
    }

    #[test]
    fn test_delete_range_by_rank() {
        let mut sl = make_list(&[
            (1.0, "e1"),
            (3.0, "e3"),
            (5.0, "e5"),
            (7.0, "e7"),
            (9.0, "e9"),
        ]);

        let removed = sl.delete_range_by_rank(2, 4);

        assert_eq!(removed.len(), 3);
        assert_eq!(sl.len(), 2);

        let rest: Vec<_> = sl.iter().map(|(e, _)| e.clone()).collect();
        assert_eq!(rest, vec![sds("e1"), sds("e9")]);
        assert!(sl.validate_invariants().is_ok());
    }

    #[test]
    fn test_delete_range_by_score() {
        let mut sl = make_list(&[(1.0, "a"), (2.0, "b"), (3.0, "c"), (4.0, "d")]);

        let range = ScoreRange::new(2.0, 4.0, false, true).unwrap();
        let removed = sl.delete_range_by_score(&range);

        let names: Vec<_> = removed.iter().map(|(e, _)| e.clone()).collect();
        assert_eq!(names, vec![sds("b"), sds("c")]);

        assert_eq!(sl.len(), 2);
        assert!(sl.validate_invariants().is_ok());
    }

    #[test]
    fn test_delete_range_by_lex() {
        let mut sl = make_list(&[(0.0, "a"), (0.0, "b"), (0.0, "c"), (0.0, "d")]);

        let range = LexRange::parse(b"(a", b"[c").unwrap();
        let removed = sl.delete_range_by_lex(&range);

        assert_eq!(removed.len(), 2);

        let rest: Vec<_> = sl.iter().map(|(e, _)| e.clone()).collect();
        assert_eq!(rest, vec![sds("a"), sds("d")]);
        assert!(sl.validate_invariants().is_ok());
    }

    #[test]
    fn test_update_score_in_place_and_reinsert() {
        let mut sl = make_list(&[(1.0, "a"), (5.0, "b"), (9.0, "c")]);

        // Позиция не меняется: правка на месте.
        assert!(sl.update_score(5.0, &sds("b"), 6.0));
        assert_eq!(sl.rank_of(6.0, &sds("b")), 2);

        // Позиция меняется: узел переезжает в конец.
        assert!(sl.update_score(6.0, &sds("b"), 100.0));
        assert_eq!(sl.rank_of(100.0, &sds("b")), 3);

        assert!(!sl.update_score(42.0, &sds("nope"), 1.0));
        assert!(sl.validate_invariants().is_ok());
    }

    #[test]
    fn test_reverse_iteration() {
        let sl = make_list(&[(1.0, "a"), (2.0, "b"), (3.0, "c")]);

        let rev: Vec<_> = sl.iter_rev().map(|(e, _)| e.clone()).collect();
        assert_eq!(rev, vec![sds("c"), sds("b"), sds("a")]);
    }

    #[test]
    fn test_spans_after_random_operations() {
        let mut sl = SkipList::with_seed(42);

        for i in 0..500 {
            sl.insert((i * 7 % 100) as f64, Sds::from_str(&format!("k{i}")));
        }

        assert!(sl.validate_invariants().is_ok());

        for i in (0..500).step_by(3) {
            sl.delete((i * 7 % 100) as f64, &Sds::from_str(&format!("k{i}")));
        }

        assert!(sl.validate_invariants().is_ok());

        // Ранги остаются согласованными после удалений.
        for rank in 1..=sl.len() {
            let node = sl.by_rank(rank).unwrap();
            assert_eq!(sl.rank_of(node.score(), node.element()), rank);
        }
    }

    #[test]
    fn test_level_distribution_is_geometric() {
        let mut sl = SkipList::with_seed(1);

        for i in 0..4000 {
            sl.insert(i as f64, Sds::from_str(&i.to_string()));
        }

        let histogram = sl.level_histogram();

        // Примерно 3/4 узлов — первого уровня, дальше геометрический спад.
        assert!(histogram[0] > 2700 && histogram[0] < 3300, "{histogram:?}");
        assert!(histogram[1] > 550 && histogram[1] < 950, "{histogram:?}");
        assert!(histogram[2] < 350, "{histogram:?}");
    }

    #[test]
    fn test_equal_scores_break_ties_lexicographically() {
        let sl = make_list(&[(1.0, "bb"), (1.0, "aa"), (1.0, "cc")]);

        assert_eq!(sl.rank_of(1.0, &sds("aa")), 1);
        assert_eq!(sl.rank_of(1.0, &sds("bb")), 2);
        assert_eq!(sl.rank_of(1.0, &sds("cc")), 3);
    }
}
