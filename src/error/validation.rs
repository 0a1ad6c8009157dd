//! Диагностика внутренних инвариантов структур данных.
//!
//! Валидаторы предназначены для тестов и отладки: публичные операции
//! инварианты не нарушают, а их проверка стоит O(N).

use thiserror::Error;

/// Макрос для валидации условий с возвратом ошибки.
#[macro_export]
macro_rules! validate {
    ($cond:expr, $err:expr) => {
        if !$cond {
            return Err($err);
        }
    };
}

/// Нарушение инварианта одной из структур ядра.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Уровень узла превышает максимальный
    #[error("Уровень узла {node_level} превышает максимум {max_level}")]
    InvalidLevel { node_level: usize, max_level: usize },
    /// Нарушен порядок сортировки
    #[error("Нарушен порядок сортировки: {message}")]
    SortOrderViolation { message: String },
    /// Заявленная длина не соответствует реальному количеству элементов
    #[error("Длина не сходится: заявлено {expected}, насчитано {actual}")]
    LengthMismatch { expected: usize, actual: usize },
    /// Сумма span'ов вдоль пути не равна рангу узла
    #[error("Span не сходится на уровне {level}: {message}")]
    SpanMismatch { level: usize, message: String },
    /// Backward-ссылка указывает на неверный узел
    #[error("Некорректная backward-ссылка: {message}")]
    InvalidBackwardLink { message: String },
    /// prevlen записи не равен длине предшественника
    #[error("prevlen по смещению {offset}: записано {stored}, предшественник занимает {actual}")]
    PrevLenMismatch {
        offset: usize,
        stored: usize,
        actual: usize,
    },
    /// Смещение хвоста не указывает на последнюю запись
    #[error("Смещение хвоста: записано {stored}, последняя запись на {actual}")]
    TailOffsetMismatch { stored: usize, actual: usize },
    /// Повреждена заявленная суммарная длина блоба
    #[error("Суммарная длина блоба: записано {stored}, фактически {actual}")]
    BlobLenMismatch { stored: usize, actual: usize },
    /// Содержимое хеш-таблицы и skip list'а разошлось
    #[error("Двойное представление разошлось: {message}")]
    DualReprMismatch { message: String },
}
