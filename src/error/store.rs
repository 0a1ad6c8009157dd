//! Ошибки публичных операций над структурами данных.

use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

/// Ошибка невалидного ввода в публичную операцию.
///
/// Контейнер при возврате любой из этих ошибок остаётся неизменным.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    /// Оценка (score) не является числом
    #[error("Оценка не является числом (NaN)")]
    NanScore,
    /// Некорректный диапазон
    #[error("Некорректный диапазон: {0}")]
    InvalidRange(String),
    /// Индекс за пределами структуры
    #[error("Индекс {index} вне диапазона (длина {len})")]
    IndexOutOfBounds { index: i64, len: usize },
    /// Значение не помещается в выбранное кодирование
    #[error("Значение длиной {size} байт превышает предел {limit}")]
    ValueTooLarge { size: usize, limit: usize },
    /// Строка не разбирается как число
    #[error("Не удалось разобрать число: {0}")]
    InvalidInteger(String),
    /// Ошибка сериализации значения
    #[error("Ошибка сериализации: {0}")]
    Serde(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serde(e.to_string())
    }
}
