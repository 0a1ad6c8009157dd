//! `IntSet` — компактное множество целых чисел.
//!
//! Элементы хранятся отсортированным непрерывным массивом с единой для
//! всего множества шириной: 16, 32 или 64 бита — наименьшей, вмещающей
//! каждый элемент. Вставка большого числа повышает ширину всего массива;
//! обратного понижения нет.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Ширина кодирования элементов.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum IntSetEncoding {
    Int16,
    Int32,
    Int64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Repr {
    I16(Vec<i16>),
    I32(Vec<i32>),
    I64(Vec<i64>),
}

/// Отсортированное множество целых с адаптивной шириной элемента.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntSet {
    repr: Repr,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl IntSet {
    /// Создаёт пустое множество в самой узкой ширине.
    pub fn new() -> Self {
        IntSet {
            repr: Repr::I16(Vec::new()),
        }
    }

    /// Возвращает количество элементов.
    #[inline]
    pub fn len(&self) -> usize {
        match &self.repr {
            Repr::I16(v) => v.len(),
            Repr::I32(v) => v.len(),
            Repr::I64(v) => v.len(),
        }
    }

    /// Возвращает `true`, если множество пусто.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Текущая ширина кодирования.
    pub fn encoding(&self) -> IntSetEncoding {
        match &self.repr {
            Repr::I16(_) => IntSetEncoding::Int16,
            Repr::I32(_) => IntSetEncoding::Int32,
            Repr::I64(_) => IntSetEncoding::Int64,
        }
    }

    /// Минимальная ширина, вмещающая значение.
    fn required_encoding(v: i64) -> IntSetEncoding {
        if (i16::MIN as i64..=i16::MAX as i64).contains(&v) {
            IntSetEncoding::Int16
        } else if (i32::MIN as i64..=i32::MAX as i64).contains(&v) {
            IntSetEncoding::Int32
        } else {
            IntSetEncoding::Int64
        }
    }

    /// Проверяет наличие значения двоичным поиском.
    pub fn contains(
        &self,
        v: i64,
    ) -> bool {
        match &self.repr {
            Repr::I16(vec) => match i16::try_from(v) {
                Ok(x) => vec.binary_search(&x).is_ok(),
                Err(_) => false,
            },
            Repr::I32(vec) => match i32::try_from(v) {
                Ok(x) => vec.binary_search(&x).is_ok(),
                Err(_) => false,
            },
            Repr::I64(vec) => vec.binary_search(&v).is_ok(),
        }
    }

    /// Вставляет значение. Возвращает `false`, если оно уже было.
    ///
    /// При необходимости весь массив повышается до ширины нового значения.
    pub fn insert(
        &mut self,
        v: i64,
    ) -> bool {
        if Self::required_encoding(v) > self.encoding() {
            self.upgrade(Self::required_encoding(v));
        }

        match &mut self.repr {
            Repr::I16(vec) => {
                let x = v as i16;

                match vec.binary_search(&x) {
                    Ok(_) => false,
                    Err(pos) => {
                        vec.insert(pos, x);
                        true
                    }
                }
            }
            Repr::I32(vec) => {
                let x = v as i32;

                match vec.binary_search(&x) {
                    Ok(_) => false,
                    Err(pos) => {
                        vec.insert(pos, x);
                        true
                    }
                }
            }
            Repr::I64(vec) => match vec.binary_search(&v) {
                Ok(_) => false,
                Err(pos) => {
                    vec.insert(pos, v);
                    true
                }
            },
        }
    }

    /// Удаляет значение. Возвращает `true`, если оно присутствовало.
    pub fn remove(
        &mut self,
        v: i64,
    ) -> bool {
        match &mut self.repr {
            Repr::I16(vec) => match i16::try_from(v) {
                Ok(x) => match vec.binary_search(&x) {
                    Ok(pos) => {
                        vec.remove(pos);
                        true
                    }
                    Err(_) => false,
                },
                Err(_) => false,
            },
            Repr::I32(vec) => match i32::try_from(v) {
                Ok(x) => match vec.binary_search(&x) {
                    Ok(pos) => {
                        vec.remove(pos);
                        true
                    }
                    Err(_) => false,
                },
                Err(_) => false,
            },
            Repr::I64(vec) => match vec.binary_search(&v) {
                Ok(pos) => {
                    vec.remove(pos);
                    true
                }
                Err(_) => false,
            },
        }
    }

    /// Элемент по индексу в отсортированном порядке.
    pub fn get(
        &self,
        index: usize,
    ) -> Option<i64> {
        match &self.repr {
            Repr::I16(v) => v.get(index).map(|x| *x as i64),
            Repr::I32(v) => v.get(index).map(|x| *x as i64),
            Repr::I64(v) => v.get(index).copied(),
        }
    }

    /// Случайный элемент множества.
    pub fn random_member(&self) -> Option<i64> {
        if self.is_empty() {
            return None;
        }

        self.get(fastrand::usize(..self.len()))
    }

    /// Итератор по элементам в возрастающем порядке.
    pub fn iter(&self) -> impl Iterator<Item = i64> + '_ {
        let mut index = 0;

        std::iter::from_fn(move || {
            let v = self.get(index)?;
            index += 1;
            Some(v)
        })
    }

    /// Повышает ширину всего массива. Понижения не бывает: проще и
    /// устойчивее к чередованию вставок и удалений больших значений.
    fn upgrade(
        &mut self,
        target: IntSetEncoding,
    ) {
        let values: Vec<i64> = self.iter().collect();

        self.repr = match target {
            IntSetEncoding::Int16 => Repr::I16(values.iter().map(|v| *v as i16).collect()),
            IntSetEncoding::Int32 => Repr::I32(values.iter().map(|v| *v as i32).collect()),
            IntSetEncoding::Int64 => Repr::I64(values),
        };
    }
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов для IntSet
////////////////////////////////////////////////////////////////////////////////

impl Default for IntSet {
    fn default() -> Self {
        Self::new()
    }
}

impl FromIterator<i64> for IntSet {
    fn from_iter<I: IntoIterator<Item = i64>>(iter: I) -> Self {
        let mut set = IntSet::new();

        for v in iter {
            set.insert(v);
        }

        set
    }
}

impl Serialize for IntSet {
    fn serialize<S: Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

impl<'de> Deserialize<'de> for IntSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let values: Vec<i64> = Vec::deserialize(deserializer)?;
        Ok(values.into_iter().collect())
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_contains_remove() {
        let mut s = IntSet::new();

        assert!(s.insert(5));
        assert!(s.insert(-3));
        assert!(!s.insert(5));

        assert!(s.contains(5));
        assert!(s.contains(-3));
        assert!(!s.contains(4));

        assert!(s.remove(5));
        assert!(!s.remove(5));
        assert!(!s.contains(5));
    }

    #[test]
    fn test_sorted_iteration() {
        let s: IntSet = [5, -3, 100, 0, 7].into_iter().collect();

        let collected: Vec<_> = s.iter().collect();
        assert_eq!(collected, vec![-3, 0, 5, 7, 100]);
    }

    #[test]
    fn test_width_promotion() {
        let mut s = IntSet::new();

        s.insert(100);
        assert_eq!(s.encoding(), IntSetEncoding::Int16);

        s.insert(100_000);
        assert_eq!(s.encoding(), IntSetEncoding::Int32);

        s.insert(i64::MAX);
        assert_eq!(s.encoding(), IntSetEncoding::Int64);

        // Все прежние элементы на месте, порядок сохранён.
        assert_eq!(s.iter().collect::<Vec<_>>(), vec![100, 100_000, i64::MAX]);
    }

    #[test]
    fn test_no_demotion_after_remove() {
        let mut s = IntSet::new();

        s.insert(1);
        s.insert(i64::MAX);
        s.remove(i64::MAX);

        assert_eq!(s.encoding(), IntSetEncoding::Int64);
        assert!(s.contains(1));
    }

    #[test]
    fn test_out_of_width_lookups() {
        let mut s = IntSet::new();

        s.insert(10);

        // Значения вне текущей ширины отсутствуют по определению.
        assert!(!s.contains(1 << 40));
        assert!(!s.remove(1 << 40));
    }

    #[test]
    fn test_random_member() {
        let s: IntSet = (0..50).collect();

        for _ in 0..20 {
            let v = s.random_member().unwrap();
            assert!(s.contains(v));
        }

        assert!(IntSet::new().random_member().is_none());
    }

    #[test]
    fn test_get_by_index() {
        let s: IntSet = [30, 10, 20].into_iter().collect();

        assert_eq!(s.get(0), Some(10));
        assert_eq!(s.get(2), Some(30));
        assert_eq!(s.get(3), None);
    }

    #[test]
    fn test_serde_roundtrip() {
        let s: IntSet = [1, 1 << 20, 1 << 40].into_iter().collect();

        let json = serde_json::to_string(&s).unwrap();
        let back: IntSet = serde_json::from_str(&json).unwrap();

        assert_eq!(s, back);
    }
}
