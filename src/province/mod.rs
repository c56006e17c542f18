// src/province/mod.rs
//! Провинции и записи локаций
//!
//! Провинция отображает своё локальное пространство 320×200 на прямоугольник карты мира
//! и владеет фиксированными массивами локаций:
//! - 8 городов-государств, 8 городков, 16 деревень (локальные ID города 0..32)
//! - второе и первое подземелья главного квеста, 14 случайных подземелий (ID 32..48)
//!
//! Все данные здесь только для чтения: их поставляет загрузчик ресурсов.

pub mod parse;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::geometry::{Point, Rect};
use crate::seeds;

pub use parse::CITY_DATA_SIZE;

/// Количество провинций на карте
pub const PROVINCE_COUNT: usize = 9;
/// Центральная (имперская) провинция
pub const CENTER_PROVINCE_ID: usize = 8;

pub const CITY_STATE_COUNT: usize = 8;
pub const TOWN_COUNT: usize = 8;
pub const VILLAGE_COUNT: usize = 16;
pub const RANDOM_DUNGEON_COUNT: usize = 14;
/// Локации городов и подземелий провинции вместе
pub const LOCATION_COUNT: usize =
    CITY_STATE_COUNT + TOWN_COUNT + VILLAGE_COUNT + 2 + RANDOM_DUNGEON_COUNT;

/// Максимальная длина имени локации в байтах
pub const LOCATION_NAME_LEN: usize = 20;

/// Вид локации в классификации игры
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LocationType {
    CityState,
    Town,
    Village,
    /// Именованное подземелье
    Dungeon,
    /// Подземелье с посохом (второе подземелье квеста)
    StaffDungeon,
    /// Подземелье с картой (первое подземелье квеста)
    StaffMapDungeon,
}

/// Запись локации: имя, позиция в пространстве провинции, флаг обнаружения
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LocationRecord {
    /// Пустое имя означает неоткрытую/безымянную локацию
    pub name: String,
    pub x: u16,
    pub y: u16,
    pub visibility: u8,
}

impl LocationRecord {
    #[must_use]
    pub fn local_point(&self) -> Point {
        Point::new(i32::from(self.x), i32::from(self.y))
    }

    #[must_use]
    pub const fn is_discovered(&self) -> bool {
        self.visibility != 0
    }
}

/// Данные одной провинции
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProvinceData {
    pub name: String,
    pub global_x: u16,
    pub global_y: u16,
    pub global_w: u16,
    pub global_h: u16,
    pub city_states: Vec<LocationRecord>,
    pub towns: Vec<LocationRecord>,
    pub villages: Vec<LocationRecord>,
    /// Хранится в файле перед первым
    pub second_dungeon: LocationRecord,
    pub first_dungeon: LocationRecord,
    pub random_dungeons: Vec<LocationRecord>,
}

impl ProvinceData {
    /// Прямоугольник провинции на карте мира
    #[must_use]
    pub fn global_rect(&self) -> Rect {
        Rect::new(
            i32::from(self.global_x),
            i32::from(self.global_y),
            i32::from(self.global_w),
            i32::from(self.global_h),
        )
    }

    /// Запись локации по сквозному ID (0..48)
    #[must_use]
    pub fn location(&self, location_id: usize) -> Option<&LocationRecord> {
        let towns_start = CITY_STATE_COUNT;
        let villages_start = towns_start + TOWN_COUNT;
        let dungeons_start = villages_start + VILLAGE_COUNT;

        match location_id {
            id if id < towns_start => self.city_states.get(id),
            id if id < villages_start => self.towns.get(id - towns_start),
            id if id < dungeons_start => self.villages.get(id - villages_start),
            id => self.dungeon(id - dungeons_start),
        }
    }

    /// Подземелье по локальному ID: 0 и 1 читаются из отдельных слотов главного квеста,
    /// остальные берутся из списка случайных подземелий.
    #[must_use]
    pub fn dungeon(&self, local_dungeon_id: usize) -> Option<&LocationRecord> {
        match local_dungeon_id {
            0 => Some(&self.second_dungeon),
            1 => Some(&self.first_dungeon),
            id => self.random_dungeons.get(id - 2),
        }
    }

    fn city_record(&self, local_city_id: usize) -> Result<&LocationRecord> {
        self.location(city_to_location_id(local_city_id))
            .filter(|_| local_city_id < CITY_STATE_COUNT + TOWN_COUNT + VILLAGE_COUNT)
            .ok_or(Error::TableIndex {
                table: "province cities",
                index: local_city_id,
                len: CITY_STATE_COUNT + TOWN_COUNT + VILLAGE_COUNT,
            })
    }

    pub fn city_seed(&self, local_city_id: usize) -> Result<u32> {
        let city = self.city_record(local_city_id)?;
        Ok(seeds::city_seed(city.x, city.y))
    }

    pub fn wilderness_seed(&self, local_city_id: usize) -> Result<u32> {
        let city = self.city_record(local_city_id)?;
        Ok(seeds::wilderness_seed(&city.name))
    }

    pub fn ruler_seed(&self, local_city_id: usize) -> Result<u32> {
        let city = self.city_record(local_city_id)?;
        Ok(seeds::ruler_seed(city.local_point(), &self.global_rect()))
    }

    pub fn sky_seed(&self, local_city_id: usize, province_id: u32) -> Result<u32> {
        let city = self.city_record(local_city_id)?;
        Ok(seeds::sky_seed(
            city.local_point(),
            province_id,
            &self.global_rect(),
        ))
    }

    #[must_use]
    pub fn province_seed(&self, province_id: u32) -> u32 {
        seeds::province_seed(province_id, &self.global_rect())
    }

    pub fn dungeon_seed(&self, local_dungeon_id: usize, province_id: u32) -> Result<u32> {
        let dungeon = self.dungeon(local_dungeon_id).ok_or(Error::TableIndex {
            table: "province dungeons",
            index: local_dungeon_id,
            len: 2 + self.random_dungeons.len(),
        })?;
        Ok(seeds::dungeon_seed(dungeon.local_point(), province_id))
    }

    pub fn ruler_is_male(&self, local_city_id: usize) -> Result<bool> {
        Ok(seeds::ruler_is_male(self.ruler_seed(local_city_id)?))
    }
}

/// Содержимое файла данных городов: девять провинций
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CityDataFile {
    pub provinces: Vec<ProvinceData>,
}

impl CityDataFile {
    pub fn province(&self, province_id: usize) -> Result<&ProvinceData> {
        self.provinces.get(province_id).ok_or(Error::TableIndex {
            table: "provinces",
            index: province_id,
            len: self.provinces.len(),
        })
    }

    /// Номер четверти провинции (0..36) для глобальной точки.
    ///
    /// Берётся первая по порядку провинция, чей прямоугольник содержит точку включительно.
    pub fn global_quarter(&self, global: Point) -> Result<usize> {
        let (province_id, rect) = self
            .provinces
            .iter()
            .enumerate()
            .map(|(id, province)| (id, province.global_rect()))
            .find(|(_, rect)| rect.contains_inclusive(global))
            .ok_or(Error::NoProvinceAt {
                x: global.x,
                y: global.y,
            })?;

        let local = local_point(global, &rect);
        let mut index = province_id * 4;
        if local.x >= 160 {
            index += 1;
        }
        if local.y >= 100 {
            index += 2;
        }
        Ok(index)
    }
}

pub const fn city_to_location_id(local_city_id: usize) -> usize {
    local_city_id
}

pub const fn dungeon_to_location_id(local_dungeon_id: usize) -> usize {
    local_dungeon_id + 32
}

/// Глобальный ID города: `(province << 5) + local`
pub const fn global_city_id(local_city_id: usize, province_id: usize) -> usize {
    (province_id << 5) + local_city_id
}

/// Пара `(local_city_id, province_id)` из глобального ID
pub const fn local_city_and_province_id(global_city_id: usize) -> (usize, usize) {
    (global_city_id & 0x1F, global_city_id >> 5)
}

/// Тип города по локальному ID; `None` для ID вне 0..32
pub const fn city_type(local_city_id: usize) -> Option<LocationType> {
    if local_city_id < 8 {
        Some(LocationType::CityState)
    } else if local_city_id < 16 {
        Some(LocationType::Town)
    } else if local_city_id < 32 {
        Some(LocationType::Village)
    } else {
        None
    }
}

pub const fn dungeon_type(local_dungeon_id: usize) -> LocationType {
    match local_dungeon_id {
        0 => LocationType::StaffDungeon,
        1 => LocationType::StaffMapDungeon,
        _ => LocationType::Dungeon,
    }
}

/// Проекция локальной точки провинции на карту мира.
///
/// Масштаб сначала округляется до целых процентов: `x * (w * 100 / 320) / 100 + left`.
#[must_use]
pub fn global_point(local: Point, province_rect: &Rect) -> Point {
    let global_x = ((local.x * ((province_rect.width * 100) / 320)) / 100) + province_rect.left();
    let global_y = ((local.y * ((province_rect.height * 100) / 200)) / 100) + province_rect.top();
    Point::new(global_x, global_y)
}

/// Обратная проекция. Прямоугольник должен быть не уже 4 и не ниже 2 пикселей.
#[must_use]
pub fn local_point(global: Point, province_rect: &Rect) -> Point {
    debug_assert!(province_rect.width * 100 >= 320 && province_rect.height * 100 >= 200);
    let local_x = ((global.x - province_rect.left()) * 100) / ((province_rect.width * 100) / 320);
    let local_y = ((global.y - province_rect.top()) * 100) / ((province_rect.height * 100) / 200);
    Point::new(local_x, local_y)
}

/// Широта глобальной точки: 0 на экваторе (y = 100), 1 на северном краю
#[must_use]
pub fn latitude(global: Point) -> f64 {
    (100.0 - f64::from(global.y)) / 100.0
}
