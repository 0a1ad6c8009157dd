//! Типы ошибок ядра: невалидный ввод и диагностика инвариантов.
//!
//! «Не найдено» и «дубликат» ошибками не являются — операции сообщают о них
//! обычными возвращаемыми значениями (`Option`, `bool`, отдельные enum'ы).

pub mod store;
pub mod validation;

// Публичный экспорт всех типов ошибок из вложенных модулей,
// чтобы упростить доступ к ним из внешнего кода.
pub use store::*;
pub use validation::*;
