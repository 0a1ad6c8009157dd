//! `ZipList` — упакованный список: последовательность записей переменной
//! длины в одном непрерывном байтовом блобе.
//!
//! Каждая запись хранит длину предшественника (для обхода назад), байт
//! кодирования и полезную нагрузку; короткие целые кодируются компактнее
//! строк. Блоб целиком — внешний сериализованный контракт: снапшоты и
//! журнал пишут его байт-в-байт.
//!
//! # Формат
//!
//! Заголовок (10 байт): суммарная длина блоба (u32 LE), смещение последней
//! записи (u32 LE), число записей (u16 LE, `0xFFFF` — «неизвестно, нужен
//! пересчёт»). Далее записи, в конце — байт-терминатор `0xFF`.
//!
//! Запись: `prevlen ‖ encoding ‖ payload`. `prevlen` занимает 1 байт для
//! предшественников короче 254 байт, иначе — маркер `0xFE` и u32 LE.
//!
//! Кодирования полезной нагрузки:
//!
//! - `00LLLLLL` — строка до 63 байт;
//! - `01LLLLLL LLLLLLLL` — строка до 16383 байт;
//! - `10______ L×4` — строка до 2³²−1 байт, длина **big-endian** (причуда
//!   формата, сохранена для совместимости сериализованных байтов);
//! - `0xC0/0xD0/0xE0/0xF0/0xFE` — знаковые целые 16/32/64/24/8 бит (LE);
//! - `0xF1..=0xFD` — немедленные значения 0–12 прямо в байте кодирования.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{error::ValidationError, validate, Sds};

/// Байт-терминатор блоба.
const ZIP_END: u8 = 0xFF;

/// Маркер длинного поля prevlen (5 байт).
const ZIP_BIG_PREVLEN: u8 = 0xFE;

/// Размер заголовка блоба.
const HEADER_SIZE: usize = 10;

const STR_MASK: u8 = 0xC0;
const STR_06B: u8 = 0x00;
const STR_14B: u8 = 0x40;
const STR_32B: u8 = 0x80;

const INT_16B: u8 = 0xC0;
const INT_32B: u8 = 0xD0;
const INT_64B: u8 = 0xE0;
const INT_24B: u8 = 0xF0;
const INT_8B: u8 = 0xFE;

const INT_IMM_MIN: u8 = 0xF1;
const INT_IMM_MAX: u8 = 0xFD;

const INT24_MIN: i64 = -(1 << 23);
const INT24_MAX: i64 = (1 << 23) - 1;

/// Декодированное значение записи.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZipValue<'a> {
    /// Строка хранится как есть.
    Str(&'a [u8]),
    /// Целое восстановлено из компактного кодирования.
    Int(i64),
}

/// Метаданные одной записи по её смещению.
#[derive(Debug, Clone, Copy)]
struct EntryMeta {
    prevrawlensize: usize,
    prevrawlen: usize,
    len: usize,
    headersize: usize,
    encoding: u8,
}

/// Упакованный список в одном байтовом блобе.
#[derive(Clone)]
pub struct ZipList {
    data: Vec<u8>,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl<'a> ZipValue<'a> {
    /// Материализует значение в байты (целые — в десятичной записи).
    pub fn to_vec(self) -> Vec<u8> {
        match self {
            ZipValue::Str(s) => s.to_vec(),
            ZipValue::Int(v) => v.to_string().into_bytes(),
        }
    }

    /// Возвращает значение как `Sds`.
    pub fn to_sds(self) -> Sds {
        match self {
            ZipValue::Str(s) => Sds::from_bytes(s),
            ZipValue::Int(v) => Sds::from_str(&v.to_string()),
        }
    }

    /// Сравнивает декодированное значение с байтами `other`:
    /// строки — побайтово, целые — как числа, если `other` разбирается
    /// как целое.
    pub fn matches(
        &self,
        other: &[u8],
    ) -> bool {
        match self {
            ZipValue::Str(s) => *s == other,
            ZipValue::Int(v) => {
                other.len() < 32 && Sds::parse_i64(other) == Some(*v)
            }
        }
    }
}

impl ZipList {
    /// Создаёт пустой список: заголовок и терминатор.
    pub fn new() -> Self {
        let mut data = vec![0u8; HEADER_SIZE + 1];
        data[HEADER_SIZE] = ZIP_END;

        let mut zl = ZipList { data };

        zl.set_total_bytes(HEADER_SIZE + 1);
        zl.set_tail_offset(HEADER_SIZE);
        zl.set_stored_len(0);

        zl
    }

    /// Восстанавливает список из сериализованного блоба.
    ///
    /// Байты принимаются как есть: это формат внешнего контракта. В
    /// отладочных сборках инварианты проверяются.
    pub fn from_bytes(data: Vec<u8>) -> Self {
        let zl = ZipList { data };

        #[cfg(debug_assertions)]
        zl.validate().expect("повреждённый блоб ziplist");

        zl
    }

    /// Сериализованное представление — сам блоб.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Суммарная длина блоба в байтах.
    #[inline]
    pub fn blob_len(&self) -> usize {
        self.data.len()
    }

    /// Число записей.
    ///
    /// Если поле счётчика насыщено (`0xFFFF`), выполняется полный обход.
    pub fn len(&self) -> usize {
        let stored = self.stored_len();

        if stored < u16::MAX as usize {
            return stored;
        }

        self.count_entries()
    }

    /// Число записей с пересохранением насыщенного счётчика, когда истинное
    /// значение снова помещается в u16.
    pub fn refresh_len(&mut self) -> usize {
        let stored = self.stored_len();

        if stored < u16::MAX as usize {
            return stored;
        }

        let actual = self.count_entries();

        if actual < u16::MAX as usize {
            self.set_stored_len(actual);
        }

        actual
    }

    /// Возвращает `true`, если записей нет.
    pub fn is_empty(&self) -> bool {
        self.data[HEADER_SIZE] == ZIP_END
    }

    /// Смещение последней записи (или терминатора, если список пуст).
    #[inline]
    pub fn tail_offset(&self) -> usize {
        u32::from_le_bytes(self.data[4..8].try_into().unwrap()) as usize
    }

    /// Вставляет значение в начало списка.
    pub fn push_front(
        &mut self,
        value: &[u8],
    ) {
        self.insert_at(HEADER_SIZE, value);
    }

    /// Вставляет значение в конец списка.
    pub fn push_back(
        &mut self,
        value: &[u8],
    ) {
        let end = self.data.len() - 1;
        self.insert_at(end, value);
    }

    /// Возвращает смещение записи с индексом `index`; отрицательный индекс
    /// отсчитывается с хвоста (−1 — последняя запись).
    pub fn index(
        &self,
        index: isize,
    ) -> Option<usize> {
        if index < 0 {
            let mut n = (-index - 1) as usize;
            let mut p = self.tail_offset();

            if self.data[p] == ZIP_END {
                return None;
            }

            let (_, mut prevlen) = self.decode_prevlen(p);

            while prevlen > 0 && n > 0 {
                p -= prevlen;
                n -= 1;

                let (_, pl) = self.decode_prevlen(p);
                prevlen = pl;
            }

            if n > 0 {
                None
            } else {
                Some(p)
            }
        } else {
            let mut n = index as usize;
            let mut p = HEADER_SIZE;

            while self.data[p] != ZIP_END && n > 0 {
                p += self.raw_entry_len(p);
                n -= 1;
            }

            if self.data[p] == ZIP_END || n > 0 {
                None
            } else {
                Some(p)
            }
        }
    }

    /// Смещение записи, следующей за `p`.
    pub fn next(
        &self,
        p: usize,
    ) -> Option<usize> {
        if self.data[p] == ZIP_END {
            return None;
        }

        let q = p + self.raw_entry_len(p);

        if self.data[q] == ZIP_END {
            None
        } else {
            Some(q)
        }
    }

    /// Смещение записи, предшествующей `p`.
    ///
    /// Для `p`, указывающего на терминатор, возвращает последнюю запись —
    /// это позволяет начинать обход назад с конца.
    pub fn prev(
        &self,
        p: usize,
    ) -> Option<usize> {
        if self.data[p] == ZIP_END {
            let tail = self.tail_offset();

            if self.data[tail] == ZIP_END {
                None
            } else {
                Some(tail)
            }
        } else if p == HEADER_SIZE {
            None
        } else {
            let (_, prevlen) = self.decode_prevlen(p);
            Some(p - prevlen)
        }
    }

    /// Декодирует запись по смещению `p`.
    pub fn get(
        &self,
        p: usize,
    ) -> Option<ZipValue<'_>> {
        if p >= self.data.len() || self.data[p] == ZIP_END {
            return None;
        }

        let e = self.entry_at(p);
        let payload = p + e.headersize;

        if Self::is_str(e.encoding) {
            Some(ZipValue::Str(&self.data[payload..payload + e.len]))
        } else {
            Some(ZipValue::Int(self.read_int(payload, e.encoding)))
        }
    }

    /// Сравнивает запись по смещению `p` с байтами `value`.
    pub fn compare(
        &self,
        p: usize,
        value: &[u8],
    ) -> bool {
        match self.get(p) {
            Some(v) => v.matches(value),
            None => false,
        }
    }

    /// Ищет запись, равную `target`, начиная с `p`; между сравнениями
    /// пропускает `skip` записей.
    pub fn find(
        &self,
        mut p: usize,
        target: &[u8],
        skip: usize,
    ) -> Option<usize> {
        let mut to_skip = 0usize;
        let mut target_int: Option<Option<i64>> = None;

        while p < self.data.len() && self.data[p] != ZIP_END {
            let e = self.entry_at(p);

            if to_skip == 0 {
                if Self::is_str(e.encoding) {
                    let payload = p + e.headersize;

                    if e.len == target.len()
                        && self.data[payload..payload + e.len] == *target
                    {
                        return Some(p);
                    }
                } else {
                    // Число разбираем из target один раз, лениво.
                    let parsed = *target_int.get_or_insert_with(|| {
                        if target.len() < 32 {
                            Sds::parse_i64(target)
                        } else {
                            None
                        }
                    });

                    if let Some(tv) = parsed {
                        let payload = p + e.headersize;

                        if self.read_int(payload, e.encoding) == tv {
                            return Some(p);
                        }
                    }
                }

                to_skip = skip;
            } else {
                to_skip -= 1;
            }

            p += e.headersize + e.len;
        }

        None
    }

    /// Вставляет значение перед записью по смещению `p` (или в конец, если
    /// `p` указывает на терминатор).
    pub fn insert_at(
        &mut self,
        p: usize,
        value: &[u8],
    ) {
        let curlen = self.data.len();

        // Длина предшественника новой записи.
        let prevlen = if self.data[p] != ZIP_END {
            self.entry_at(p).prevrawlen
        } else {
            let tail = self.tail_offset();

            if self.data[tail] != ZIP_END {
                self.raw_entry_len(tail)
            } else {
                0
            }
        };

        // Кодирование полезной нагрузки: целое, если влезает, иначе строка.
        let int_enc = Self::try_int_encoding(value);
        let payload_len = match int_enc {
            Some((_, enc)) => Self::int_size(enc),
            None => value.len(),
        };
        let enc_header_len = match int_enc {
            Some(_) => 1,
            None => Self::str_header_size(value.len()),
        };

        let reqlen = Self::prevlen_size(prevlen) + enc_header_len + payload_len;

        // Поле prevlen следующей записи может потребовать другой ширины.
        let mut nextdiff: isize = if self.data[p] != ZIP_END {
            Self::prevlen_size(reqlen) as isize - self.entry_at(p).prevrawlensize as isize
        } else {
            0
        };

        // Сжатие поля с 5 до 1 байта при крошечной новой записи оставило бы
        // хвост без исходных байтов; поле сохраняем широким.
        let mut force_large = false;

        if nextdiff == -4 && reqlen < 4 {
            nextdiff = 0;
            force_large = true;
        }

        let newlen = (curlen as isize + reqlen as isize + nextdiff) as usize;
        let entry_follows = self.data[p] != ZIP_END;

        self.resize_blob(newlen);

        if entry_follows {
            // Сдвигаем хвост, оставляя место под новую запись.
            self.data.copy_within(
                (p as isize - nextdiff) as usize..curlen - 1,
                p + reqlen,
            );

            // prevlen следующей записи — длина новой.
            if force_large {
                self.encode_prevlen_force_large(p + reqlen, reqlen);
            } else {
                self.encode_prevlen(p + reqlen, reqlen);
            }

            self.set_tail_offset(self.tail_offset() + reqlen);

            // Если за следующей записью есть ещё записи, сдвиг её prevlen
            // тоже смещает хвост.
            let next = self.entry_at(p + reqlen);

            if self.data[p + reqlen + next.headersize + next.len] != ZIP_END {
                let tail = (self.tail_offset() as isize + nextdiff) as usize;
                self.set_tail_offset(tail);
            }
        } else {
            // Новая запись становится хвостом.
            self.set_tail_offset(p);
        }

        // Каскад: изменение ширины prevlen может покатиться дальше.
        if nextdiff != 0 {
            self.cascade_update(p + reqlen);
        }

        // Пишем саму запись.
        let mut w = p;

        w += self.encode_prevlen(w, prevlen);

        match int_enc {
            Some((v, enc)) => {
                self.data[w] = enc;
                w += 1;
                self.write_int(w, v, enc);
            }
            None => {
                w += self.encode_str_header(w, value.len());
                self.data[w..w + value.len()].copy_from_slice(value);
            }
        }

        self.incr_stored_len(1);
    }

    /// Удаляет запись по смещению `p`. Возвращает тот же курсор: он
    /// указывает на следующую запись (или терминатор) и пригоден для
    /// продолжения обхода.
    pub fn delete(
        &mut self,
        p: usize,
    ) -> usize {
        self.delete_range_at(p, 1);
        p
    }

    /// Удаляет до `count` записей, начиная с индекса `index`.
    pub fn delete_range(
        &mut self,
        index: isize,
        count: usize,
    ) {
        if let Some(p) = self.index(index) {
            self.delete_range_at(p, count);
        }
    }

    /// Возвращает итератор по значениям от головы к хвосту.
    pub fn iter(&self) -> impl Iterator<Item = ZipValue<'_>> {
        let mut p = HEADER_SIZE;

        std::iter::from_fn(move || {
            if self.data[p] == ZIP_END {
                return None;
            }

            let v = self.get(p)?;
            p += self.raw_entry_len(p);

            Some(v)
        })
    }

    /// Возвращает итератор по значениям от хвоста к голове.
    pub fn iter_rev(&self) -> impl Iterator<Item = ZipValue<'_>> {
        let mut cur = {
            let tail = self.tail_offset();

            if self.data[tail] == ZIP_END {
                None
            } else {
                Some(tail)
            }
        };

        std::iter::from_fn(move || {
            let p = cur?;
            let v = self.get(p)?;

            cur = if p == HEADER_SIZE {
                None
            } else {
                let (_, prevlen) = self.decode_prevlen(p);
                Some(p - prevlen)
            };

            Some(v)
        })
    }

    /// Проверяет инварианты блоба: заголовок, цепочку prevlen, смещение
    /// хвоста и счётчик записей.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate!(
            self.total_bytes() == self.data.len(),
            ValidationError::BlobLenMismatch {
                stored: self.total_bytes(),
                actual: self.data.len(),
            }
        );

        let mut p = HEADER_SIZE;
        let mut prev_len = 0usize;
        let mut prev_offset = HEADER_SIZE;
        let mut count = 0usize;

        while self.data[p] != ZIP_END {
            let e = self.entry_at(p);

            validate!(
                e.prevrawlen == prev_len,
                ValidationError::PrevLenMismatch {
                    offset: p,
                    stored: e.prevrawlen,
                    actual: prev_len,
                }
            );

            prev_len = e.headersize + e.len;
            prev_offset = p;
            p += prev_len;
            count += 1;
        }

        let expected_tail = if count == 0 { HEADER_SIZE } else { prev_offset };

        validate!(
            self.tail_offset() == expected_tail,
            ValidationError::TailOffsetMismatch {
                stored: self.tail_offset(),
                actual: expected_tail,
            }
        );

        let stored = self.stored_len();

        validate!(
            stored == u16::MAX as usize || stored == count,
            ValidationError::LengthMismatch {
                expected: stored,
                actual: count,
            }
        );

        Ok(())
    }

    ////////////////////////////////////////////////////////////////////////
    // Внутренняя механика
    ////////////////////////////////////////////////////////////////////////

    #[inline]
    fn total_bytes(&self) -> usize {
        u32::from_le_bytes(self.data[0..4].try_into().unwrap()) as usize
    }

    #[inline]
    fn set_total_bytes(
        &mut self,
        n: usize,
    ) {
        self.data[0..4].copy_from_slice(&(n as u32).to_le_bytes());
    }

    #[inline]
    fn set_tail_offset(
        &mut self,
        n: usize,
    ) {
        self.data[4..8].copy_from_slice(&(n as u32).to_le_bytes());
    }

    #[inline]
    fn stored_len(&self) -> usize {
        u16::from_le_bytes(self.data[8..10].try_into().unwrap()) as usize
    }

    #[inline]
    fn set_stored_len(
        &mut self,
        n: usize,
    ) {
        self.data[8..10].copy_from_slice(&(n as u16).to_le_bytes());
    }

    /// Сдвигает счётчик записей; насыщенный счётчик не трогаем — его
    /// чинит только пересчёт в [`ZipList::refresh_len`].
    fn incr_stored_len(
        &mut self,
        delta: isize,
    ) {
        let stored = self.stored_len();

        if stored < u16::MAX as usize {
            let next = (stored as isize + delta) as usize;
            self.set_stored_len(next.min(u16::MAX as usize));
        }
    }

    /// Полный пересчёт записей обходом.
    fn count_entries(&self) -> usize {
        let mut p = HEADER_SIZE;
        let mut count = 0;

        while self.data[p] != ZIP_END {
            p += self.raw_entry_len(p);
            count += 1;
        }

        count
    }

    /// Меняет размер блоба, поддерживая поле суммарной длины и терминатор.
    fn resize_blob(
        &mut self,
        newlen: usize,
    ) {
        self.data.resize(newlen, 0);
        self.set_total_bytes(newlen);
        self.data[newlen - 1] = ZIP_END;
    }

    #[inline]
    fn is_str(encoding: u8) -> bool {
        encoding & STR_MASK != STR_MASK
    }

    /// Размер поля prevlen для длины `len`.
    #[inline]
    fn prevlen_size(len: usize) -> usize {
        if len < ZIP_BIG_PREVLEN as usize {
            1
        } else {
            5
        }
    }

    /// Читает поле prevlen: (размер поля, длина предшественника).
    fn decode_prevlen(
        &self,
        p: usize,
    ) -> (usize, usize) {
        if self.data[p] < ZIP_BIG_PREVLEN {
            (1, self.data[p] as usize)
        } else {
            let len = u32::from_le_bytes(self.data[p + 1..p + 5].try_into().unwrap());
            (5, len as usize)
        }
    }

    /// Пишет поле prevlen, возвращая его размер.
    fn encode_prevlen(
        &mut self,
        p: usize,
        len: usize,
    ) -> usize {
        if len < ZIP_BIG_PREVLEN as usize {
            self.data[p] = len as u8;
            1
        } else {
            self.encode_prevlen_force_large(p, len);
            5
        }
    }

    /// Пишет prevlen в широком (5-байтовом) виде независимо от значения.
    fn encode_prevlen_force_large(
        &mut self,
        p: usize,
        len: usize,
    ) {
        self.data[p] = ZIP_BIG_PREVLEN;
        self.data[p + 1..p + 5].copy_from_slice(&(len as u32).to_le_bytes());
    }

    /// Размер заголовка кодирования для строки длиной `len`.
    #[inline]
    fn str_header_size(len: usize) -> usize {
        if len <= 0x3F {
            1
        } else if len <= 0x3FFF {
            2
        } else {
            5
        }
    }

    /// Пишет заголовок строкового кодирования, возвращая его размер.
    fn encode_str_header(
        &mut self,
        p: usize,
        len: usize,
    ) -> usize {
        if len <= 0x3F {
            self.data[p] = STR_06B | len as u8;
            1
        } else if len <= 0x3FFF {
            self.data[p] = STR_14B | ((len >> 8) as u8 & 0x3F);
            self.data[p + 1] = (len & 0xFF) as u8;
            2
        } else {
            // Длина хранится big-endian — историческая причуда формата.
            self.data[p] = STR_32B;
            self.data[p + 1..p + 5].copy_from_slice(&(len as u32).to_be_bytes());
            5
        }
    }

    /// Пытается закодировать байты как целое: `(значение, байт кодирования)`.
    fn try_int_encoding(value: &[u8]) -> Option<(i64, u8)> {
        if value.is_empty() || value.len() >= 32 {
            return None;
        }

        let v = Sds::parse_i64(value)?;

        let enc = if (0..=12).contains(&v) {
            INT_IMM_MIN + v as u8
        } else if (i8::MIN as i64..=i8::MAX as i64).contains(&v) {
            INT_8B
        } else if (i16::MIN as i64..=i16::MAX as i64).contains(&v) {
            INT_16B
        } else if (INT24_MIN..=INT24_MAX).contains(&v) {
            INT_24B
        } else if (i32::MIN as i64..=i32::MAX as i64).contains(&v) {
            INT_32B
        } else {
            INT_64B
        };

        Some((v, enc))
    }

    /// Размер полезной нагрузки целочисленного кодирования.
    fn int_size(encoding: u8) -> usize {
        match encoding {
            INT_8B => 1,
            INT_16B => 2,
            INT_24B => 3,
            INT_32B => 4,
            INT_64B => 8,
            _ => {
                debug_assert!((INT_IMM_MIN..=INT_IMM_MAX).contains(&encoding));
                0
            }
        }
    }

    /// Пишет целое в кодировании `encoding` по смещению `p`.
    fn write_int(
        &mut self,
        p: usize,
        v: i64,
        encoding: u8,
    ) {
        match encoding {
            INT_8B => self.data[p] = v as i8 as u8,
            INT_16B => self.data[p..p + 2].copy_from_slice(&(v as i16).to_le_bytes()),
            INT_24B => {
                // Младшие три байта LE-представления.
                let bytes = (v as i32).to_le_bytes();
                self.data[p..p + 3].copy_from_slice(&bytes[0..3]);
            }
            INT_32B => self.data[p..p + 4].copy_from_slice(&(v as i32).to_le_bytes()),
            INT_64B => self.data[p..p + 8].copy_from_slice(&v.to_le_bytes()),
            _ => {
                // Немедленное значение целиком в байте кодирования.
                debug_assert!((INT_IMM_MIN..=INT_IMM_MAX).contains(&encoding));
            }
        }
    }

    /// Читает целое из полезной нагрузки по смещению `p`.
    fn read_int(
        &self,
        p: usize,
        encoding: u8,
    ) -> i64 {
        match encoding {
            INT_8B => self.data[p] as i8 as i64,
            INT_16B => {
                i16::from_le_bytes(self.data[p..p + 2].try_into().unwrap()) as i64
            }
            INT_24B => {
                // Знак восстанавливается арифметическим сдвигом 32-битного
                // представления, собранного со смещением в один байт.
                let raw = [0, self.data[p], self.data[p + 1], self.data[p + 2]];
                (i32::from_le_bytes(raw) >> 8) as i64
            }
            INT_32B => {
                i32::from_le_bytes(self.data[p..p + 4].try_into().unwrap()) as i64
            }
            INT_64B => i64::from_le_bytes(self.data[p..p + 8].try_into().unwrap()),
            _ => {
                debug_assert!((INT_IMM_MIN..=INT_IMM_MAX).contains(&encoding));
                ((encoding & 0x0F) - 1) as i64
            }
        }
    }

    /// Полные метаданные записи по смещению `p`.
    fn entry_at(
        &self,
        p: usize,
    ) -> EntryMeta {
        let (prevrawlensize, prevrawlen) = self.decode_prevlen(p);
        let ep = p + prevrawlensize;
        let b = self.data[ep];

        let (encoding, lensize, len) = if b & STR_MASK != STR_MASK {
            match b & STR_MASK {
                STR_06B => (STR_06B, 1, (b & 0x3F) as usize),
                STR_14B => {
                    let len = (((b & 0x3F) as usize) << 8) | self.data[ep + 1] as usize;
                    (STR_14B, 2, len)
                }
                _ => {
                    let len =
                        u32::from_be_bytes(self.data[ep + 1..ep + 5].try_into().unwrap());
                    (STR_32B, 5, len as usize)
                }
            }
        } else {
            (b, 1, Self::int_size(b))
        };

        EntryMeta {
            prevrawlensize,
            prevrawlen,
            len,
            headersize: prevrawlensize + lensize,
            encoding,
        }
    }

    /// Полная длина записи в байтах.
    #[inline]
    pub(crate) fn raw_entry_len(
        &self,
        p: usize,
    ) -> usize {
        let e = self.entry_at(p);
        e.headersize + e.len
    }

    /// Смещение первого байта за записью `p`.
    #[inline]
    pub(crate) fn entry_end(
        &self,
        p: usize,
    ) -> usize {
        p + self.raw_entry_len(p)
    }

    /// Удаляет `num` записей, начиная со смещения `p0`.
    fn delete_range_at(
        &mut self,
        p0: usize,
        num: usize,
    ) {
        if p0 >= self.data.len() || self.data[p0] == ZIP_END {
            return;
        }

        let curlen = self.data.len();
        let first_prevrawlen = self.entry_at(p0).prevrawlen;

        let mut p = p0;
        let mut deleted = 0usize;

        for _ in 0..num {
            if self.data[p] == ZIP_END {
                break;
            }

            p += self.raw_entry_len(p);
            deleted += 1;
        }

        let totlen = p - p0;

        if totlen == 0 {
            return;
        }

        let mut nextdiff: isize = 0;

        if self.data[p] != ZIP_END {
            // Запись за диапазоном получает prevlen записи перед ним;
            // ширина поля может измениться в обе стороны.
            nextdiff = Self::prevlen_size(first_prevrawlen) as isize
                - self.entry_at(p).prevrawlensize as isize;

            p = (p as isize - nextdiff) as usize;
            self.encode_prevlen(p, first_prevrawlen);

            let mut tail = self.tail_offset() - totlen;
            let t = self.entry_at(p);

            if self.data[p + t.headersize + t.len] != ZIP_END {
                tail = (tail as isize + nextdiff) as usize;
            }

            self.set_tail_offset(tail);

            // Смыкаем хвост блоба.
            self.data.copy_within(p..curlen - 1, p0);
        } else {
            // Диапазон до конца: хвостом становится запись перед ним.
            self.set_tail_offset(p0 - first_prevrawlen);
        }

        let newlen = (curlen as isize - totlen as isize + nextdiff) as usize;

        self.resize_blob(newlen);
        self.incr_stored_len(-(deleted as isize));

        if nextdiff != 0 {
            self.cascade_update(p0);
        }
    }

    /// Каскадная починка полей prevlen, начиная со смещения `p`.
    ///
    /// Рост записи может вытолкнуть поле prevlen следующей с 1 до 5 байт,
    /// что удлиняет и её саму — и так далее по цепочке. В обратную сторону
    /// поле не сужается: узкое значение кодируется в широком поле. Иначе
    /// вставки и удаления записей у границы 254 байта заставляли бы блоб
    /// осциллировать.
    fn cascade_update(
        &mut self,
        mut p: usize,
    ) {
        loop {
            if self.data[p] == ZIP_END {
                break;
            }

            let cur = self.entry_at(p);
            let rawlen = cur.headersize + cur.len;
            let rawlensize = Self::prevlen_size(rawlen);
            let np = p + rawlen;

            if self.data[np] == ZIP_END {
                break;
            }

            let next = self.entry_at(np);

            if next.prevrawlen == rawlen {
                break;
            }

            if next.prevrawlensize < rawlensize {
                // Поле следующей записи растёт с 1 до 5 байт.
                let extra = rawlensize - next.prevrawlensize;
                let curlen = self.data.len();

                self.resize_blob(curlen + extra);
                self.data.copy_within(
                    np + next.prevrawlensize..curlen - 1,
                    np + next.prevrawlensize + extra,
                );

                // Хвост смещается, только если растёт не сама хвостовая
                // запись.
                if self.tail_offset() != np {
                    self.set_tail_offset(self.tail_offset() + extra);
                }

                self.encode_prevlen(np, rawlen);

                p = np;
            } else {
                if next.prevrawlensize > rawlensize {
                    // Поле шире необходимого — кодируем принудительно
                    // широко, не сужая.
                    self.encode_prevlen_force_large(np, rawlen);
                } else {
                    self.encode_prevlen(np, rawlen);
                }

                break;
            }
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов для ZipList
////////////////////////////////////////////////////////////////////////////////

impl Default for ZipList {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for ZipList {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.data == other.data
    }
}

impl Eq for ZipList {}

impl std::fmt::Debug for ZipList {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        let mut list = f.debug_list();

        for v in self.iter() {
            match v {
                ZipValue::Str(s) => list.entry(&String::from_utf8_lossy(s)),
                ZipValue::Int(i) => list.entry(&i),
            };
        }

        list.finish()
    }
}

impl Serialize for ZipList {
    fn serialize<S: Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_bytes(&self.data)
    }
}

impl<'de> Deserialize<'de> for ZipList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let data = <Vec<u8>>::deserialize(deserializer)?;
        Ok(ZipList::from_bytes(data))
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
