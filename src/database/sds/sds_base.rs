//! `Sds` — бинарно-безопасная строка, полезная нагрузка всего ядра:
//! ключи словарей, элементы упорядоченных множеств, значения хешей.
//!
//! Строка не длиннее [`Sds::INLINE_CAP`] байт лежит прямо в значении и не
//! трогает аллокатор; более длинная переезжает («spill») в `Vec<u8>`.
//! Граница подобрана так, чтобы короткий вариант не был толще самого
//! вектора. Варианты не пересекаются по длине: раз «разлившись», строка
//! обратно не сжимается.

use std::{
    cmp::Ordering,
    fmt::{self, Display},
    str::{from_utf8, Utf8Error},
};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Неиспользуемый хвост `Small`-буфера всегда нулевой, а длины вариантов
/// не пересекаются, поэтому `PartialEq`/`Eq`/`Hash` выводятся структурно
/// и совпадают с побайтовым сравнением содержимого.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Store {
    Small(u8, [u8; Sds::INLINE_CAP]),
    Spilled(Vec<u8>),
}

/// Бинарно-безопасная строка с инлайн-оптимизацией коротких значений.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sds(Store);

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl Sds {
    /// Предел инлайн-хранения: короткий вариант не шире `Vec<u8>`.
    pub const INLINE_CAP: usize = std::mem::size_of::<Vec<u8>>() - 1;

    /// Пытается уложить срез в короткий вариант.
    fn small(slice: &[u8]) -> Option<Store> {
        if slice.len() > Self::INLINE_CAP {
            return None;
        }

        let mut buf = [0u8; Self::INLINE_CAP];
        buf[..slice.len()].copy_from_slice(slice);

        Some(Store::Small(slice.len() as u8, buf))
    }

    /// Строка из байтового среза.
    #[inline]
    pub fn from_bytes<B: AsRef<[u8]>>(bytes: B) -> Self {
        let slice = bytes.as_ref();

        Sds(Self::small(slice).unwrap_or_else(|| Store::Spilled(slice.to_vec())))
    }

    /// Строка из готового вектора; длинное содержимое забирает вектор без
    /// копирования.
    #[inline]
    pub fn from_vec(vec: Vec<u8>) -> Self {
        match Self::small(&vec) {
            Some(store) => Sds(store),
            None => Sds(Store::Spilled(vec)),
        }
    }

    /// Строка из `&str`.
    #[allow(clippy::should_implement_trait)]
    #[inline]
    pub fn from_str(s: &str) -> Self {
        Self::from_bytes(s.as_bytes())
    }

    /// Содержимое как срез байт.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        match &self.0 {
            Store::Small(len, buf) => &buf[..*len as usize],
            Store::Spilled(vec) => vec,
        }
    }

    /// Длина содержимого в байтах.
    #[inline]
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    /// Возвращает `true` для пустой строки.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Возвращает `true`, если содержимое переехало в кучу.
    #[inline]
    pub fn spilled(&self) -> bool {
        matches!(self.0, Store::Spilled(_))
    }

    /// Забирает содержимое вектором.
    pub fn into_vec(self) -> Vec<u8> {
        match self.0 {
            Store::Small(len, buf) => buf[..len as usize].to_vec(),
            Store::Spilled(vec) => vec,
        }
    }

    /// Дописывает байты в конец; не помещающееся в короткий буфер
    /// содержимое разливается в кучу.
    pub fn append(
        &mut self,
        bytes: &[u8],
    ) {
        match &mut self.0 {
            Store::Small(len, buf) => {
                let old = *len as usize;
                let new = old + bytes.len();

                if new <= Self::INLINE_CAP {
                    buf[old..new].copy_from_slice(bytes);
                    *len = new as u8;
                } else {
                    let mut vec = Vec::with_capacity(new);
                    vec.extend_from_slice(&buf[..old]);
                    vec.extend_from_slice(bytes);
                    self.0 = Store::Spilled(vec);
                }
            }
            Store::Spilled(vec) => vec.extend_from_slice(bytes),
        }
    }

    /// Содержимое как `&str`, если оно валидно как UTF-8.
    #[inline]
    pub fn as_str(&self) -> Result<&str, Utf8Error> {
        from_utf8(self.as_slice())
    }

    /// Строгий разбор байтов как знакового 64-битного целого.
    ///
    /// Правила: непустая строка, необязательный знак `-`, без ведущих нулей
    /// (кроме самой строки «0»), только десятичные цифры, без переполнения.
    /// Любое отклонение — `None`.
    pub fn parse_i64(bytes: &[u8]) -> Option<i64> {
        if bytes.is_empty() {
            return None;
        }

        let (neg, digits) = match bytes[0] {
            b'-' => (true, &bytes[1..]),
            _ => (false, bytes),
        };

        if digits.is_empty() {
            return None;
        }

        // «0» допустим, «007» и «-0» — нет.
        if digits[0] == b'0' {
            return if digits.len() == 1 && !neg {
                Some(0)
            } else {
                None
            };
        }

        let mut acc: i64 = 0;

        for &b in digits {
            if !b.is_ascii_digit() {
                return None;
            }

            acc = acc.checked_mul(10)?;

            let d = (b - b'0') as i64;

            // Аккумулируем в отрицательной области: |i64::MIN| > i64::MAX.
            acc = acc.checked_sub(d)?;
        }

        if neg {
            Some(acc)
        } else {
            acc.checked_neg()
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов для Sds
////////////////////////////////////////////////////////////////////////////////

impl Default for Sds {
    fn default() -> Self {
        Self::from_vec(Vec::new())
    }
}

impl AsRef<[u8]> for Sds {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl Display for Sds {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(self.as_slice()))
    }
}

// Порядок — побайтовый лексикографический: на нём держатся разрешение
// равных оценок и лексикографические диапазоны.
impl Ord for Sds {
    fn cmp(
        &self,
        other: &Self,
    ) -> Ordering {
        self.as_slice().cmp(other.as_slice())
    }
}

impl PartialOrd for Sds {
    fn partial_cmp(
        &self,
        other: &Self,
    ) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<&str> for Sds {
    fn from(s: &str) -> Self {
        Sds::from_str(s)
    }
}

impl From<Vec<u8>> for Sds {
    fn from(vec: Vec<u8>) -> Self {
        Sds::from_vec(vec)
    }
}

impl Serialize for Sds {
    fn serialize<S: Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_bytes(self.as_slice())
    }
}

impl<'de> Deserialize<'de> for Sds {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<u8>::deserialize(deserializer).map(Sds::from_vec)
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_string_stays_inline() {
        let s = Sds::from_str("hello");

        assert_eq!(s.len(), 5);
        assert_eq!(s.as_slice(), b"hello");
        assert!(!s.spilled());
    }

    #[test]
    fn test_long_string_spills() {
        let long = "this is a long string exceeding the inline cap";
        let s = Sds::from_str(long);

        assert_eq!(s.as_slice(), long.as_bytes());
        assert!(s.spilled());
    }

    #[test]
    fn test_boundary_length() {
        let at_cap = vec![b'a'; Sds::INLINE_CAP];
        let over_cap = vec![b'a'; Sds::INLINE_CAP + 1];

        assert!(!Sds::from_vec(at_cap).spilled());
        assert!(Sds::from_vec(over_cap).spilled());
    }

    #[test]
    fn test_append_within_buffer() {
        let mut s = Sds::from_str("ab");

        s.append(b"cd");

        assert_eq!(s.as_slice(), b"abcd");
        assert!(!s.spilled());
    }

    #[test]
    fn test_append_spills() {
        let mut s = Sds::from_str("a");

        s.append(&[b'x'; 64]);

        assert_eq!(s.len(), 65);
        assert!(s.spilled());
    }

    #[test]
    fn test_binary_safety() {
        let s = Sds::from_bytes([0u8, 1, 2, 0xFF]);

        assert_eq!(s.len(), 4);
        assert_eq!(s.as_slice(), &[0, 1, 2, 0xFF]);
    }

    #[test]
    fn test_eq_ignores_representation_details() {
        // Одинаковое содержимое, построенное разными путями.
        let a = Sds::from_str("abc");
        let mut b = Sds::from_str("a");
        b.append(b"bc");

        assert_eq!(a, b);
        assert_ne!(a, Sds::from_str("abd"));
    }

    #[test]
    fn test_ordering_is_lexicographic() {
        assert!(Sds::from_str("abc") < Sds::from_str("abd"));
        assert!(Sds::from_str("ab") < Sds::from_str("abc"));
        assert!(Sds::from_str("") < Sds::from_str("a"));
    }

    #[test]
    fn test_into_vec_roundtrip() {
        let long = vec![b'q'; 100];

        assert_eq!(Sds::from_vec(long.clone()).into_vec(), long);
        assert_eq!(Sds::from_str("hi").into_vec(), b"hi".to_vec());
    }

    #[test]
    fn test_parse_i64_accepts_canonical() {
        assert_eq!(Sds::parse_i64(b"0"), Some(0));
        assert_eq!(Sds::parse_i64(b"1024"), Some(1024));
        assert_eq!(Sds::parse_i64(b"-42"), Some(-42));
        assert_eq!(
            Sds::parse_i64(b"9223372036854775807"),
            Some(i64::MAX)
        );
        assert_eq!(
            Sds::parse_i64(b"-9223372036854775808"),
            Some(i64::MIN)
        );
    }

    #[test]
    fn test_parse_i64_rejects_non_canonical() {
        assert_eq!(Sds::parse_i64(b""), None);
        assert_eq!(Sds::parse_i64(b"-"), None);
        assert_eq!(Sds::parse_i64(b"007"), None);
        assert_eq!(Sds::parse_i64(b"-0"), None);
        assert_eq!(Sds::parse_i64(b"12a"), None);
        assert_eq!(Sds::parse_i64(b" 1"), None);
        assert_eq!(Sds::parse_i64(b"9223372036854775808"), None);
        assert_eq!(Sds::parse_i64(b"-9223372036854775809"), None);
    }
}
