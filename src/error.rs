// src/error.rs
//! Ошибки генерации
//!
//! Большинство функций ядра тотальны: некорректные справочные данные либо тихо пропускаются,
//! либо заменяются значением по умолчанию. Сюда попадают только случаи, когда вызывающий код
//! нарушил форму таблиц или предусловия генерации.

use crate::location::LocationKindTag;

/// Единый тип ошибок крейта
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Обращение к полям локации другого вида
    #[error("location is a {found:?}, not a {expected:?}")]
    WrongLocationKind {
        expected: LocationKindTag,
        found: LocationKindTag,
    },

    /// Бинарный файл данных обрезан
    #[error("{what}: need {needed} bytes, got {available}")]
    Truncated {
        what: &'static str,
        needed: usize,
        available: usize,
    },

    /// Индекс за пределами справочной таблицы
    #[error("index {index} out of range for {table} (len {len})")]
    TableIndex {
        table: &'static str,
        index: usize,
        len: usize,
    },

    /// Справочная таблица другой формы, чем ожидает генератор
    #[error("table {table}: expected {expected} entries, found {found}")]
    TableShape {
        table: &'static str,
        expected: usize,
        found: usize,
    },

    /// Пустой список фрагментов имени (выбор по модулю невозможен)
    #[error("name chunk list {0} is empty")]
    EmptyNameChunk(usize),

    /// Байт местности, не являющийся кодом местности
    #[error("terrain code {0} is not a terrain index")]
    UnknownTerrain(u8),

    /// Точка мировой карты не принадлежит ни одной провинции
    #[error("no province contains global point ({x}, {y})")]
    NoProvinceAt { x: i32, y: i32 },

    /// В плане города не осталось пустых ячеек под обязательные кварталы
    #[error("city plan needs {needed} empty blocks, only {available} left")]
    NotEnoughEmptyBlocks { needed: usize, available: usize },

    /// Цикл «выбрать и повторить» не нашёл свободного варианта
    #[error("gave up placing {what} after {attempts} attempts")]
    PlacementExhausted { what: &'static str, attempts: u32 },

    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, Error>;
