use std::{
    hash::{BuildHasher, Hash, Hasher},
    marker::PhantomData,
    sync::atomic::{AtomicBool, AtomicUsize, Ordering},
    time::Instant,
};

use once_cell::sync::OnceCell;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use siphasher::sip::SipHasher13;
use tracing::debug;

use super::entry::{Entry, OccupiedEntry, VacantEntry};

/// Начальный размер таблицы (степень двойки).
const INITIAL_SIZE: usize = 4;

/// Число бакетов, переносимых одной партией внутри [`Dict::rehash_for`].
const REHASH_TIMED_BATCH: usize = 100;

/// Глобальный переключатель фонового расширения таблиц.
///
/// Выключается на время снапшота в форкнутом потомке: расширение таблиц
/// портит copy-on-write страницы. Отношение нагрузки выше жёсткого порога
/// расширяет таблицу независимо от переключателя.
static RESIZE_ENABLED: AtomicBool = AtomicBool::new(true);

/// Отношение used/size, при превышении которого расширение выполняется
/// даже при выключенном переключателе.
static FORCE_RESIZE_RATIO: AtomicUsize = AtomicUsize::new(5);

/// Seed процесса для хеш-функции. Устанавливается один раз при старте.
static HASH_SEED: OnceCell<(u64, u64)> = OnceCell::new();

/// Разрешает или запрещает фоновое расширение таблиц.
pub fn set_resize_enabled(on: bool) {
    RESIZE_ENABLED.store(on, Ordering::Relaxed);
}

/// Текущее состояние переключателя расширения.
pub fn resize_enabled() -> bool {
    RESIZE_ENABLED.load(Ordering::Relaxed)
}

/// Устанавливает жёсткий порог нагрузки принудительного расширения.
pub fn set_force_resize_ratio(ratio: usize) {
    FORCE_RESIZE_RATIO.store(ratio.max(1), Ordering::Relaxed);
}

/// Текущий жёсткий порог нагрузки.
pub fn force_resize_ratio() -> usize {
    FORCE_RESIZE_RATIO.load(Ordering::Relaxed)
}

/// Устанавливает seed хеш-функции процесса. Возвращает `false`, если seed
/// уже зафиксирован (первым обращением или предыдущим вызовом).
pub fn set_hash_seed(
    k0: u64,
    k1: u64,
) -> bool {
    HASH_SEED.set((k0, k1)).is_ok()
}

/// Seed хеш-функции процесса; при первом обращении генерируется случайно.
pub fn hash_seed() -> (u64, u64) {
    *HASH_SEED.get_or_init(|| (fastrand::u64(..), fastrand::u64(..)))
}

/// Хешер по умолчанию: SipHash-1-3, ключованный seed'ом процесса.
#[derive(Clone, Debug, Default)]
pub struct SeedHashBuilder;

impl BuildHasher for SeedHashBuilder {
    type Hasher = SipHasher13;

    fn build_hasher(&self) -> SipHasher13 {
        let (k0, k1) = hash_seed();
        SipHasher13::new_with_keys(k0, k1)
    }
}

pub(crate) type Link<K, V> = Option<Box<DictNode<K, V>>>;

/// Один элемент в цепочке коллизий.
#[derive(Debug, Clone)]
pub struct DictNode<K, V> {
    pub(crate) key: K,
    pub(crate) val: V,
    pub(crate) next: Link<K, V>,
}

/// Одна хеш-таблица: вектор бакетов, маска размера и количество занятых
/// элементов.
#[derive(Debug, Clone)]
struct HashTable<K, V> {
    buckets: Vec<Link<K, V>>,
    size_mask: usize,
    used: usize,
}

/// Хеш-таблица с инкрементальным рехешированием.
///
/// **ИНВАРИАНТЫ:**
///
/// - Если `rehash_idx == -1`:
///     - ht[1] пуста
///     - все элементы находятся в ht[0]
///
/// - Если `rehash_idx >= 0`:
///     - рехеширование в процессе
///     - бакеты ht[0] с индексом меньше `rehash_idx` уже пусты
///     - новые вставки идут только в ht[1]
///
/// - Общее количество элементов всегда равно:
///
/// ```text
/// ht[0].used + ht[1].used
/// ```
///
/// Перенос выполняется по одному бакету, попутно с каждой мутирующей
/// операцией, либо явно через [`Dict::rehash`] и [`Dict::rehash_for`].
#[derive(Debug)]
pub struct Dict<K, V, S = SeedHashBuilder> {
    ht: [HashTable<K, V>; 2],
    rehash_idx: isize,
    /// Счётчик активных «безопасных» обходов: пока он ненулевой,
    /// попутные шаги рехеширования не выполняются.
    pause_rehash: usize,
    hasher: S,
}

/// Итератор по словарю (разделяемая ссылка).
///
/// При первом `next` фиксирует 64-битный слепок структуры таблиц; при
/// уничтожении слепок сверяется повторно. Расхождение — фатальная ошибка
/// программирования (структура изменена во время обхода).
pub struct DictIter<'a, K, V, S = SeedHashBuilder> {
    dict: &'a Dict<K, V, S>,
    table_idx: usize,
    bucket_idx: usize,
    current: Option<&'a DictNode<K, V>>,
    fingerprint: Option<u64>,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl<K, V> HashTable<K, V> {
    /// Создаёт таблицу ёмкостью `cap` бакетов.
    fn with_capacity(cap: usize) -> Self {
        if cap == 0 {
            return HashTable {
                buckets: Vec::new(),
                size_mask: 0,
                used: 0,
            };
        }

        let sz = cap.next_power_of_two().max(INITIAL_SIZE);
        let mut buckets = Vec::with_capacity(sz);
        buckets.resize_with(sz, || None);

        HashTable {
            buckets,
            size_mask: sz - 1,
            used: 0,
        }
    }

    /// Сбрасывает таблицу в пустое состояние.
    fn clear(&mut self) {
        self.buckets.clear();
        self.size_mask = 0;
        self.used = 0;
    }

    /// Возвращает `true`, если таблица не инициализирована (нет бакетов).
    #[inline]
    fn is_empty_table(&self) -> bool {
        self.buckets.is_empty()
    }
}

impl<K, V> Dict<K, V>
where
    K: Hash + Eq,
{
    /// Создаёт новый пустой словарь с хешером по умолчанию.
    pub fn new() -> Self {
        Self::with_hasher(SeedHashBuilder)
    }
}

impl<K, V, S> Dict<K, V, S> {
    /// Создаёт словарь с заданным хешером.
    pub fn with_hasher(hasher: S) -> Self {
        Dict {
            ht: [HashTable::with_capacity(0), HashTable::with_capacity(0)],
            rehash_idx: -1,
            pause_rehash: 0,
            hasher,
        }
    }

    /// Возвращает общее количество элементов во всех таблицах.
    #[inline]
    pub fn len(&self) -> usize {
        self.ht[0].used + self.ht[1].used
    }

    /// Возвращает `true`, если словарь пуст.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Возвращает `true`, если идёт перенос в новую таблицу.
    #[inline]
    pub fn is_rehashing(&self) -> bool {
        self.rehash_idx != -1
    }

    /// Суммарное число бакетов обеих таблиц.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.ht[0].buckets.len() + self.ht[1].buckets.len()
    }

    /// Приостанавливает попутные шаги рехеширования.
    ///
    /// Используется вокруг курсорных обходов с мутациями между вызовами
    /// [`Dict::scan`]: пока счётчик ненулевой, мутирующие операции не
    /// переносят бакеты. Каждому вызову должен соответствовать
    /// [`Dict::resume_rehash`].
    pub fn pause_rehash(&mut self) {
        self.pause_rehash += 1;
    }

    /// Снимает одну приостановку рехеширования.
    pub fn resume_rehash(&mut self) {
        debug_assert!(self.pause_rehash > 0, "resume_rehash без pause_rehash");
        self.pause_rehash = self.pause_rehash.saturating_sub(1);
    }

    /// Очищает словарь и сбрасывает рехеширование.
    pub fn clear(&mut self) {
        self.ht[0].clear();
        self.ht[1].clear();
        self.rehash_idx = -1;
    }

    /// 64-битный слепок структурного состояния таблиц.
    ///
    /// Складывает шесть идентификаторов (адрес массива, размер, занятость
    /// обеих таблиц) через целочисленный миксер Томаса Ванга. Слепок меняется
    /// при любой вставке, удалении или переносе бакетов.
    pub fn fingerprint(&self) -> u64 {
        let ids = [
            self.ht[0].buckets.as_ptr() as u64,
            self.ht[0].buckets.len() as u64,
            self.ht[0].used as u64,
            self.ht[1].buckets.as_ptr() as u64,
            self.ht[1].buckets.len() as u64,
            self.ht[1].used as u64,
        ];

        let mut hash: u64 = 0;

        for id in ids {
            hash = hash.wrapping_add(id);
            hash = (!hash).wrapping_add(hash << 21);
            hash ^= hash >> 24;
            hash = hash.wrapping_add(hash << 3).wrapping_add(hash << 8);
            hash ^= hash >> 14;
            hash = hash.wrapping_add(hash << 2).wrapping_add(hash << 4);
            hash ^= hash >> 28;
            hash = hash.wrapping_add(hash << 31);
        }

        hash
    }

    /// Возвращает итератор по парам `(&K, &V)`.
    pub fn iter(&self) -> DictIter<'_, K, V, S> {
        DictIter {
            dict: self,
            table_idx: 0,
            bucket_idx: 0,
            current: None,
            fingerprint: None,
        }
    }
}

impl<K, V, S> Dict<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// Вычисляет хеш ключа.
    #[inline]
    fn hash_key(
        &self,
        key: &K,
    ) -> u64 {
        let mut h = self.hasher.build_hasher();
        key.hash(&mut h);
        h.finish()
    }

    /// Строгая вставка: возвращает `false`, если ключ уже существует
    /// (значение при этом не меняется).
    pub fn insert(
        &mut self,
        key: K,
        val: V,
    ) -> bool {
        match self.entry(key) {
            Entry::Occupied(_) => false,
            Entry::Vacant(e) => {
                e.insert(val);
                true
            }
        }
    }

    /// Вставляет или перезаписывает. Возвращает `true`, если ключ создан
    /// заново, `false` — если перезаписан существующий.
    pub fn replace(
        &mut self,
        key: K,
        val: V,
    ) -> bool {
        match self.entry(key) {
            Entry::Occupied(mut e) => {
                e.insert(val);
                false
            }
            Entry::Vacant(e) => {
                e.insert(val);
                true
            }
        }
    }

    /// Возвращает vacant/occupied запись для ключа, выполняя попутный шаг
    /// рехеширования и расширение при необходимости.
    pub fn entry(
        &mut self,
        key: K,
    ) -> Entry<'_, K, V, S> {
        self.expand_if_needed();
        self.rehash_step();

        let hash = self.hash_key(&key);
        let last_table = if self.is_rehashing() { 1 } else { 0 };

        for table_idx in 0..=last_table {
            if self.ht[table_idx].is_empty_table() {
                continue;
            }

            let slot = (hash as usize) & self.ht[table_idx].size_mask;

            // SAFETY: slot и used — непересекающиеся поля одной таблицы;
            // ссылки живут столько же, сколько заём &mut self, и никакие
            // другие изменения структуры в это время невозможны.
            let ht_ptr: *mut HashTable<K, V> = &mut self.ht[table_idx];

            unsafe {
                let mut link: *mut Link<K, V> = &mut (&mut (*ht_ptr).buckets)[slot];

                while let Some(node) = (*link).as_mut() {
                    if node.key == key {
                        return Entry::Occupied(OccupiedEntry {
                            slot: &mut *link,
                            used: &mut (*ht_ptr).used,
                        });
                    }

                    link = &mut node.next;
                }
            }
        }

        // Ключа нет: вставка идёт в ht[1] во время рехеширования.
        let table_idx = if self.is_rehashing() { 1 } else { 0 };
        let slot = (hash as usize) & self.ht[table_idx].size_mask;
        let table = &mut self.ht[table_idx];

        Entry::Vacant(VacantEntry {
            key,
            slot: &mut table.buckets[slot],
            used: &mut table.used,
            _marker: PhantomData,
        })
    }

    /// Возвращает `Some(&V)` для указанного ключа или `None`.
    pub fn get(
        &self,
        key: &K,
    ) -> Option<&V> {
        if self.is_empty() {
            return None;
        }

        let hash = self.hash_key(key);

        for table_idx in 0..=1 {
            if self.ht[table_idx].is_empty_table() {
                continue;
            }

            let slot = (hash as usize) & self.ht[table_idx].size_mask;
            let mut cur = &self.ht[table_idx].buckets[slot];

            while let Some(ref e) = cur {
                if &e.key == key {
                    return Some(&e.val);
                }

                cur = &e.next;
            }

            // Если рехеширование не идёт — ключ может быть только в ht[0].
            if !self.is_rehashing() {
                break;
            }
        }

        None
    }

    /// Возвращает `Some(&mut V)` для указанного ключа или `None`.
    pub fn get_mut(
        &mut self,
        key: &K,
    ) -> Option<&mut V> {
        self.rehash_step();

        let hash = self.hash_key(key);

        for table_idx in 0..=1 {
            if self.ht[table_idx].is_empty_table() {
                continue;
            }

            let slot = (hash as usize) & self.ht[table_idx].size_mask;
            let mut cur = &mut self.ht[table_idx].buckets[slot];

            while let Some(ref mut e) = cur {
                if &e.key == key {
                    // SAFETY: ссылка живёт столько же, сколько заём &mut self;
                    // borrow checker не пропускает возврат &mut e.val напрямую
                    // из-за промежуточных ссылок цикла.
                    let val_ptr: *mut V = &mut e.val;

                    return Some(unsafe { &mut *val_ptr });
                }

                cur = &mut e.next;
            }

            if !self.is_rehashing() {
                break;
            }
        }

        None
    }

    /// Проверяет наличие ключа.
    #[inline]
    pub fn contains_key(
        &self,
        key: &K,
    ) -> bool {
        self.get(key).is_some()
    }

    /// Удаляет ключ. Возвращает значение, если удаление произошло.
    pub fn remove(
        &mut self,
        key: &K,
    ) -> Option<V> {
        if self.is_empty() {
            return None;
        }

        self.rehash_step();

        let hash = self.hash_key(key);

        for table_idx in 0..=1 {
            if self.ht[table_idx].is_empty_table() {
                continue;
            }

            let slot = (hash as usize) & self.ht[table_idx].size_mask;

            // SAFETY: обход цепочки по ссылкам-звеньям; link всегда
            // указывает либо на бакет, либо на поле next живого узла.
            let ht_ptr: *mut HashTable<K, V> = &mut self.ht[table_idx];

            unsafe {
                let mut link: *mut Link<K, V> = &mut (&mut (*ht_ptr).buckets)[slot];

                while let Some(node) = (*link).as_mut() {
                    if &node.key == key {
                        let mut boxed = (*link).take().unwrap();

                        *link = boxed.next.take();
                        (*ht_ptr).used -= 1;

                        return Some(boxed.val);
                    }

                    link = &mut node.next;
                }
            }

            if !self.is_rehashing() {
                break;
            }
        }

        None
    }

    /// Возвращает приблизительно равномерно выбранную пару `(&K, &V)`.
    ///
    /// Сначала выбирается случайный непустой бакет (с учётом обеих таблиц
    /// во время рехеширования), затем случайный элемент его цепочки.
    pub fn random_entry(&self) -> Option<(&K, &V)> {
        if self.is_empty() {
            return None;
        }

        let bucket = if self.is_rehashing() {
            let s0 = self.ht[0].buckets.len();
            let s1 = self.ht[1].buckets.len();
            let start = self.rehash_idx as usize;

            loop {
                // Бакеты ht[0] до rehash_idx уже перенесены и пусты.
                let h = start + fastrand::usize(..s0 + s1 - start);
                let b = if h >= s0 {
                    &self.ht[1].buckets[h - s0]
                } else {
                    &self.ht[0].buckets[h]
                };

                if b.is_some() {
                    break b;
                }
            }
        } else {
            loop {
                let h = fastrand::usize(..) & self.ht[0].size_mask;
                let b = &self.ht[0].buckets[h];

                if b.is_some() {
                    break b;
                }
            }
        };

        let mut chain_len = 0;
        let mut cur = bucket;

        while let Some(node) = cur {
            chain_len += 1;
            cur = &node.next;
        }

        let mut pick = fastrand::usize(..chain_len);
        let mut cur = bucket;

        while let Some(node) = cur {
            if pick == 0 {
                return Some((&node.key, &node.val));
            }
            pick -= 1;
            cur = &node.next;
        }

        unreachable!("выбранный индекс внутри цепочки")
    }

    /// Выполняет до `n` шагов переноса (один шаг — один непустой бакет).
    ///
    /// Возвращает `true`, если перенос ещё не завершён.
    pub fn rehash(
        &mut self,
        n: usize,
    ) -> bool {
        if !self.is_rehashing() {
            return false;
        }

        for _ in 0..n {
            // Все элементы перенесены — финализируем.
            if self.ht[0].used == 0 {
                self.ht[0] = std::mem::replace(&mut self.ht[1], HashTable::with_capacity(0));
                self.rehash_idx = -1;

                debug!(
                    size = self.ht[0].buckets.len(),
                    used = self.ht[0].used,
                    "рехеширование завершено"
                );

                return false;
            }

            let mut idx = self.rehash_idx as usize;

            // used > 0 гарантирует непустой бакет правее.
            while self.ht[0].buckets[idx].is_none() {
                idx += 1;
            }

            let mut entry_opt = self.ht[0].buckets[idx].take();

            while let Some(mut e) = entry_opt {
                entry_opt = e.next.take();

                let hash = self.hash_key(&e.key);
                let slot = (hash as usize) & self.ht[1].size_mask;

                e.next = self.ht[1].buckets[slot].take();

                self.ht[1].buckets[slot] = Some(e);
                self.ht[0].used -= 1;
                self.ht[1].used += 1;
            }

            self.rehash_idx = (idx + 1) as isize;
        }

        true
    }

    /// Попутный одиночный шаг: выполняется только когда нет активных
    /// приостановок обхода.
    #[inline]
    pub fn rehash_step(&mut self) {
        if self.pause_rehash == 0 {
            self.rehash(1);
        }
    }

    /// Переносит бакеты партиями по 100, пока не исчерпан бюджет `ms`
    /// миллисекунд. Возвращает число выполненных партий × 100.
    pub fn rehash_for(
        &mut self,
        ms: u64,
    ) -> usize {
        let start = Instant::now();
        let mut moved = 0;

        while self.rehash(REHASH_TIMED_BATCH) {
            moved += REHASH_TIMED_BATCH;

            if start.elapsed().as_millis() as u64 > ms {
                break;
            }
        }

        moved
    }

    /// Сжимает таблицу до наименьшей степени двойки, вмещающей все
    /// элементы (не меньше начального размера). Возвращает `false`, если
    /// сжатие запрещено переключателем или уже идёт перенос.
    pub fn resize_to_fit(&mut self) -> bool {
        if !resize_enabled() || self.is_rehashing() {
            return false;
        }

        let minimal = self.ht[0].used.max(INITIAL_SIZE);

        if minimal.next_power_of_two() == self.ht[0].buckets.len() {
            return false;
        }

        self.start_expand(minimal);
        true
    }

    /// Инициирует расширение, если нагрузка того требует.
    ///
    /// Первая вставка инициализирует ht[0]; дальше таблица удваивается от
    /// числа элементов, когда `used >= size` и либо расширение разрешено
    /// глобально, либо нагрузка превысила жёсткий порог.
    fn expand_if_needed(&mut self) {
        if self.is_rehashing() {
            return;
        }

        let size = self.ht[0].buckets.len();
        let used = self.ht[0].used;

        if size == 0 {
            self.ht[0] = HashTable::with_capacity(INITIAL_SIZE);
        } else if used >= size && (resize_enabled() || used / size > force_resize_ratio()) {
            self.start_expand(used * 2);
        }
    }

    /// Выделяет ht[1] под `cap` элементов и открывает перенос.
    fn start_expand(
        &mut self,
        cap: usize,
    ) {
        let new_table = HashTable::with_capacity(cap);

        debug!(
            from = self.ht[0].buckets.len(),
            to = new_table.buckets.len(),
            used = self.ht[0].used,
            "начато рехеширование"
        );

        self.ht[1] = new_table;
        self.rehash_idx = 0;
    }

    /// Курсорное сканирование без состояния на стороне словаря.
    ///
    /// Вызывает `f` для каждого элемента бакета, на который указывает
    /// курсор `cursor`, и возвращает следующий курсор; нулевой возврат
    /// означает конец обхода. Курсор продвигается инверсией битов,
    /// инкрементом и обратной инверсией: такой порядок устойчив к
    /// изменению размера таблицы между вызовами — каждый элемент,
    /// присутствовавший в словаре весь обход, будет выдан хотя бы один
    /// раз (возможно, больше одного).
    ///
    /// Во время рехеширования за один вызов выдаётся бакет меньшей
    /// таблицы и все его расширения в большей.
    pub fn scan<F>(
        &self,
        cursor: u64,
        mut f: F,
    ) -> u64
    where
        F: FnMut(&K, &V),
    {
        if self.is_empty() {
            return 0;
        }

        let mut v = cursor;
        let m0;

        if !self.is_rehashing() {
            let t0 = &self.ht[0];
            m0 = t0.size_mask as u64;

            let mut de = &t0.buckets[(v & m0) as usize];

            while let Some(node) = de {
                f(&node.key, &node.val);
                de = &node.next;
            }
        } else {
            // t0 — всегда меньшая таблица.
            let (t0, t1) = if self.ht[0].buckets.len() > self.ht[1].buckets.len() {
                (&self.ht[1], &self.ht[0])
            } else {
                (&self.ht[0], &self.ht[1])
            };

            m0 = t0.size_mask as u64;
            let m1 = t1.size_mask as u64;

            let mut de = &t0.buckets[(v & m0) as usize];

            while let Some(node) = de {
                f(&node.key, &node.val);
                de = &node.next;
            }

            // Все бакеты большей таблицы, являющиеся расширениями
            // текущего бакета меньшей.
            loop {
                let mut de = &t1.buckets[(v & m1) as usize];

                while let Some(node) = de {
                    f(&node.key, &node.val);
                    de = &node.next;
                }

                v = ((v | m0).wrapping_add(1) & !m0) | (v & m0);

                if v & (m0 ^ m1) == 0 {
                    break;
                }
            }
        }

        // Незамаскированные биты взводятся, чтобы инкремент перевёрнутого
        // курсора работал в маскированной области меньшей таблицы.
        v |= !m0;

        v = v.reverse_bits();
        v = v.wrapping_add(1);
        v = v.reverse_bits();

        v
    }
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов для Dict, DictIter
////////////////////////////////////////////////////////////////////////////////

impl<'a, K, V, S> Iterator for DictIter<'a, K, V, S> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.fingerprint.is_none() {
            self.fingerprint = Some(self.dict.fingerprint());
        }

        loop {
            // Отдаём текущий элемент цепочки, если он есть.
            if let Some(entry) = self.current.take() {
                self.current = entry.next.as_deref();
                return Some((&entry.key, &entry.val));
            }

            let table = &self.dict.ht[self.table_idx];

            // Бакеты текущей таблицы исчерпаны.
            if self.bucket_idx >= table.buckets.len() {
                // Переходим к ht[1], если она непуста (идёт рехеширование).
                if self.table_idx == 0 && !self.dict.ht[1].is_empty_table() {
                    self.table_idx = 1;
                    self.bucket_idx = 0;
                    continue;
                }
                return None;
            }

            self.current = table.buckets[self.bucket_idx].as_deref();
            self.bucket_idx += 1;
        }
    }
}

impl<'a, K, V, S> Drop for DictIter<'a, K, V, S> {
    fn drop(&mut self) {
        if let Some(fp) = self.fingerprint {
            assert_eq!(
                fp,
                self.dict.fingerprint(),
                "словарь структурно изменён во время небезопасной итерации"
            );
        }
    }
}

impl<'a, K, V, S> IntoIterator for &'a Dict<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    type Item = (&'a K, &'a V);
    type IntoIter = DictIter<'a, K, V, S>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V> Default for Dict<K, V>
where
    K: Hash + Eq,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> Clone for Dict<K, V, S>
where
    K: Hash + Eq + Clone,
    V: Clone,
    S: BuildHasher + Clone,
{
    fn clone(&self) -> Self {
        let mut new = Dict::with_hasher(self.hasher.clone());
        for (k, v) in self.iter() {
            new.insert(k.clone(), v.clone());
        }
        new
    }
}

impl<K, V, S> PartialEq for Dict<K, V, S>
where
    K: Hash + Eq,
    V: PartialEq,
    S: BuildHasher,
{
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        if self.len() != other.len() {
            return false;
        }

        self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl<K, V, S> Serialize for Dict<K, V, S>
where
    K: Serialize,
    V: Serialize,
{
    fn serialize<Ser: Serializer>(
        &self,
        serializer: Ser,
    ) -> Result<Ser::Ok, Ser::Error> {
        serializer.collect_seq(self.iter())
    }
}

impl<'de, K, V, S> Deserialize<'de> for Dict<K, V, S>
where
    K: Deserialize<'de> + Hash + Eq,
    V: Deserialize<'de>,
    S: BuildHasher + Default,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let pairs: Vec<(K, V)> = Vec::deserialize(deserializer)?;
        let mut dict = Dict::with_hasher(S::default());

        for (k, v) in pairs {
            dict.replace(k, v);
        }

        Ok(dict)
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
