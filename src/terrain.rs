// src/terrain.rs
//! Сетка местности карты мира 320×200
//!
//! Каждый пиксель хранит индекс палитры, кодирующий тип местности:
//! - `248`: море
//! - `249`, `250`: горы
//! - `251`, `254`: умеренный климат
//! - `252`, `253`: пустыня
//!
//! Сетка только читается. Климат локации берётся «безопасным» поиском ([`TerrainGrid::fail_safe_at`]),
//! который обходит морские пиксели.

use image::{ImageBuffer, Rgb};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::geometry::{WORLD_HEIGHT, WORLD_WIDTH};

pub const SEA: u8 = 248;
pub const MOUNTAIN1: u8 = 249;
pub const MOUNTAIN2: u8 = 250;
pub const TEMPERATE2: u8 = 251;
pub const DESERT2: u8 = 252;
pub const DESERT1: u8 = 253;
pub const TEMPERATE1: u8 = 254;

const PIXEL_COUNT: usize = (WORLD_WIDTH * WORLD_HEIGHT) as usize;
/// Размер заголовка .IMG перед пикселями
const IMG_HEADER_SIZE: usize = 12;
/// Сдвиг индекса влево при безопасном поиске
const FAIL_SAFE_SHIFT: i32 = 12;
const FAIL_SAFE_MAX_DIST: i32 = 200;

/// Климат суши
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClimateType {
    Temperate,
    Desert,
    Mountain,
}

impl ClimateType {
    /// Номер климата в таблицах исполняемого файла
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            ClimateType::Temperate => 0,
            ClimateType::Desert => 1,
            ClimateType::Mountain => 2,
        }
    }

    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(ClimateType::Temperate),
            1 => Some(ClimateType::Desert),
            2 => Some(ClimateType::Mountain),
            _ => None,
        }
    }
}

/// Климат по коду суши; море и прочие байты дают ошибку
pub fn climate_type(code: u8) -> Result<ClimateType> {
    match code {
        TEMPERATE1 | TEMPERATE2 => Ok(ClimateType::Temperate),
        MOUNTAIN1 | MOUNTAIN2 => Ok(ClimateType::Mountain),
        DESERT1 | DESERT2 => Ok(ClimateType::Desert),
        other => Err(Error::UnknownTerrain(other)),
    }
}

/// Индекс строки таблиц скорости: море = 0, ..., `TEMPERATE1` = 6
pub fn normalized_index(code: u8) -> Result<usize> {
    code.checked_sub(SEA)
        .map(usize::from)
        .filter(|&index| index < 7)
        .ok_or(Error::UnknownTerrain(code))
}

/// Сетка кодов местности
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerrainGrid {
    indices: Vec<u8>,
}

impl TerrainGrid {
    /// Сетка из ровно 64000 байт
    pub fn new(indices: Vec<u8>) -> Result<Self> {
        if indices.len() != PIXEL_COUNT {
            return Err(Error::Truncated {
                what: "terrain grid",
                needed: PIXEL_COUNT,
                available: indices.len(),
            });
        }
        Ok(Self { indices })
    }

    /// Однородная сетка (удобно для тестов и заглушек)
    #[must_use]
    pub fn filled(code: u8) -> Self {
        Self {
            indices: vec![code; PIXEL_COUNT],
        }
    }

    /// Разбор файла .IMG: 12 байт заголовка, затем 320×200 индексов
    pub fn from_img_bytes(bytes: &[u8]) -> Result<Self> {
        let needed = IMG_HEADER_SIZE + PIXEL_COUNT;
        if bytes.len() < needed {
            return Err(Error::Truncated {
                what: "terrain image",
                needed,
                available: bytes.len(),
            });
        }
        Self::new(bytes[IMG_HEADER_SIZE..needed].to_vec())
    }

    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::from_img_bytes(&bytes)
    }

    #[must_use]
    pub fn indices(&self) -> &[u8] {
        &self.indices
    }

    #[cfg(test)]
    pub(crate) fn set(&mut self, x: i32, y: i32, code: u8) {
        let index = Self::flat_index(x, y);
        self.indices[index] = code;
    }

    /// Код без коррекции. Координаты должны лежать в пределах карты.
    #[must_use]
    pub fn at(&self, x: i32, y: i32) -> u8 {
        debug_assert!((0..WORLD_WIDTH).contains(&x) && (0..WORLD_HEIGHT).contains(&y));
        self.indices[Self::flat_index(x, y)]
    }

    /// Код без коррекции; `None` за пределами карты
    #[must_use]
    pub fn get(&self, x: i32, y: i32) -> Option<u8> {
        if (0..WORLD_WIDTH).contains(&x) && (0..WORLD_HEIGHT).contains(&y) {
            Some(self.indices[Self::flat_index(x, y)])
        } else {
            None
        }
    }

    fn flat_index(x: i32, y: i32) -> usize {
        (x + y * WORLD_WIDTH) as usize
    }

    /// Пиксель с индексом, сдвинутым на 12 влево с переносом по всей сетке
    fn shifted_at(&self, x: i32, y: i32) -> u8 {
        let index = (x + y * WORLD_WIDTH - FAIL_SAFE_SHIFT).rem_euclid(PIXEL_COUNT as i32);
        self.indices[index as usize]
    }

    /// Код суши для точки с обходом моря.
    ///
    /// Если сдвинутый пиксель попал в море, проверяются соседи крестом (ниже, выше, правее, левее)
    /// на расстояниях 1..200; первый не-морской возвращается. Иначе `TEMPERATE1`.
    #[must_use]
    pub fn fail_safe_at(&self, x: i32, y: i32) -> u8 {
        let pixel = self.shifted_at(x, y);
        if pixel != SEA {
            return pixel;
        }

        for dist in 1..FAIL_SAFE_MAX_DIST {
            let candidates = [
                self.shifted_at(x, y + dist),
                self.shifted_at(x, y - dist),
                self.shifted_at(x + dist, y),
                self.shifted_at(x - dist, y),
            ];
            if let Some(&found) = candidates.iter().find(|&&p| p != SEA) {
                trace!(x, y, dist, found, "fail-safe terrain found");
                return found;
            }
        }

        debug!(x, y, "no land near point, using temperate terrain");
        TEMPERATE1
    }

    /// Климат точки через безопасный поиск
    pub fn climate_at(&self, x: i32, y: i32) -> Result<ClimateType> {
        climate_type(self.fail_safe_at(x, y))
    }

    /// Цветное превью местности
    pub fn save_as_png(&self, path: &str) -> Result<()> {
        let pixels: Vec<u8> = self
            .indices
            .iter()
            .flat_map(|&code| terrain_color(code))
            .collect();

        let img: ImageBuffer<Rgb<u8>, Vec<u8>> =
            ImageBuffer::from_raw(WORLD_WIDTH as u32, WORLD_HEIGHT as u32, pixels).ok_or(
                Error::Truncated {
                    what: "terrain preview",
                    needed: PIXEL_COUNT * 3,
                    available: 0,
                },
            )?;
        img.save(path)?;
        Ok(())
    }
}

fn terrain_color(code: u8) -> [u8; 3] {
    match code {
        SEA => [30, 60, 140],
        MOUNTAIN1 | MOUNTAIN2 => [120, 110, 100],
        TEMPERATE1 | TEMPERATE2 => [70, 140, 60],
        DESERT1 | DESERT2 => [210, 190, 120],
        _ => [0, 0, 0],
    }
}
