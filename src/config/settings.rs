//! Настраиваемые пороги ядра.
//!
//! Пороги читаются один раз при старте процесса (из переменных окружения с
//! префиксом `YADRO_`) и дальше передаются по значению в структуры, которым
//! они нужны. Глобальные переключатели словаря устанавливаются методом
//! [`Settings::apply`].

use config::{Config, ConfigError, Environment};
use serde::{Deserialize, Serialize};

use crate::database::dict;

/// Пороги представления и политика расширения хеш-таблиц.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Максимальное число элементов zset в упакованном (ziplist) виде.
    pub zset_max_zip_entries: usize,
    /// Максимальная длина элемента zset (в байтах) в упакованном виде.
    pub zset_max_zip_value: usize,
    /// Максимальное число элементов set в виде IntSet.
    pub set_max_intset_entries: usize,
    /// Разрешено ли фоновое расширение хеш-таблиц.
    pub dict_resize_enabled: bool,
    /// Жёсткий порог нагрузки: выше него таблица расширяется даже при
    /// выключенном расширении.
    pub dict_hard_load: usize,
}

impl Settings {
    /// Загружает настройки: значения по умолчанию, поверх — переменные
    /// окружения с префиксом `YADRO_`.
    pub fn load() -> Result<Self, ConfigError> {
        let cfg = Config::builder()
            .set_default("zset_max_zip_entries", 128)?
            .set_default("zset_max_zip_value", 64)?
            .set_default("set_max_intset_entries", 512)?
            .set_default("dict_resize_enabled", true)?
            .set_default("dict_hard_load", 5)?
            .add_source(Environment::with_prefix("YADRO"))
            .build()?;

        cfg.try_deserialize()
    }

    /// Устанавливает глобальные переключатели процесса.
    ///
    /// Вызывается один раз при старте; все потребители работают в одном
    /// потоке управления, поэтому гонок здесь нет.
    pub fn apply(&self) {
        dict::set_resize_enabled(self.dict_resize_enabled);
        dict::set_force_resize_ratio(self.dict_hard_load);
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            zset_max_zip_entries: 128,
            zset_max_zip_value: 64,
            set_max_intset_entries: 512,
            dict_resize_enabled: true,
            dict_hard_load: 5,
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_thresholds() {
        let s = Settings::default();

        assert_eq!(s.zset_max_zip_entries, 128);
        assert_eq!(s.zset_max_zip_value, 64);
        assert_eq!(s.set_max_intset_entries, 512);
        assert!(s.dict_resize_enabled);
        assert_eq!(s.dict_hard_load, 5);
    }
}
