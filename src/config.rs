// src/config.rs
//! Справочные таблицы генерации
//!
//! В игре эти данные зашиты в исполняемый файл. Здесь они загружаются из TOML:
//! - таблицы скорости путешествия и погоды
//! - титулы правителей, названия типов локаций, шаблоны карт городов
//! - зарезервированные кварталы и стартовые позиции планов
//! - префиксы и суффиксы названий таверн, храмов и лавок
//! - списки блоков диких земель
//!
//! Значения по умолчанию имеют правильную форму, но содержат заглушки вместо текстов игры.

use serde::{Deserialize, Serialize};
use std::fs;
use tracing::debug;

use crate::error::{Error, Result};
use crate::province::{CENTER_PROVINCE_ID, global_city_id};
use crate::travel::SpeedTables;
use crate::weather::QUARTER_COUNT;

/// Названия построек города
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingNameTables {
    #[serde(default = "default_tavern_prefixes")]
    pub tavern_prefixes: Vec<String>,
    #[serde(default = "default_tavern_suffixes")]
    pub tavern_suffixes: Vec<String>,
    /// Суффиксы таверн прибрежных городов
    #[serde(default = "default_tavern_marine_suffixes")]
    pub tavern_marine_suffixes: Vec<String>,
    #[serde(default = "default_temple_prefixes")]
    pub temple_prefixes: Vec<String>,
    /// Три списка суффиксов храмов (5, 9 и 10 элементов)
    #[serde(default = "default_temple_suffixes")]
    pub temple_suffixes: Vec<Vec<String>>,
    /// Префиксы лавок; могут содержать `%ct`, `%ef`, `%n`
    #[serde(default = "default_equipment_prefixes")]
    pub equipment_prefixes: Vec<String>,
    #[serde(default = "default_equipment_suffixes")]
    pub equipment_suffixes: Vec<String>,
}

fn numbered(label: &str, count: usize) -> Vec<String> {
    (1..=count).map(|i| format!("{label} {i}")).collect()
}

fn default_tavern_prefixes() -> Vec<String> {
    numbered("Tavern", 23)
}
fn default_tavern_suffixes() -> Vec<String> {
    numbered("Inn", 23)
}
fn default_tavern_marine_suffixes() -> Vec<String> {
    numbered("Harbor", 23)
}
fn default_temple_prefixes() -> Vec<String> {
    vec![
        "Temple of ".to_string(),
        "Shrine of ".to_string(),
        "Chapel of ".to_string(),
    ]
}
fn default_temple_suffixes() -> Vec<Vec<String>> {
    TEMPLE_SUFFIX_COUNTS
        .iter()
        .map(|&count| numbered("Saint", count))
        .collect()
}
fn default_equipment_prefixes() -> Vec<String> {
    numbered("Store", 20)
}
fn default_equipment_suffixes() -> Vec<String> {
    numbered("Goods", 10)
}

impl Default for BuildingNameTables {
    fn default() -> Self {
        Self {
            tavern_prefixes: default_tavern_prefixes(),
            tavern_suffixes: default_tavern_suffixes(),
            tavern_marine_suffixes: default_tavern_marine_suffixes(),
            temple_prefixes: default_temple_prefixes(),
            temple_suffixes: default_temple_suffixes(),
            equipment_prefixes: default_equipment_prefixes(),
            equipment_suffixes: default_equipment_suffixes(),
        }
    }
}

/// Размеры списков суффиксов храмов для каждой из трёх моделей
pub const TEMPLE_SUFFIX_COUNTS: [usize; 3] = [5, 9, 10];

/// Индексы блоков .RMD по видам фрагментов диких земель
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WildBlockLists {
    pub normal: Vec<u8>,
    pub village: Vec<u8>,
    pub dungeon: Vec<u8>,
    pub tavern: Vec<u8>,
    pub temple: Vec<u8>,
}

impl Default for WildBlockLists {
    fn default() -> Self {
        Self {
            normal: (5..=24).collect(),
            village: (25..=29).collect(),
            dungeon: (30..=34).collect(),
            tavern: (35..=39).collect(),
            temple: (40..=44).collect(),
        }
    }
}

/// Все справочные таблицы, нужные генератору
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationTables {
    /// Индекс климата для каждой из 36 четвертей провинций
    #[serde(default = "default_quarter_climates")]
    pub quarter_climates: Vec<u8>,

    /// Коды погоды `[климат × 20 + сезон × 5 + вариант]`
    #[serde(default = "default_weather_table")]
    pub weather_table: Vec<u8>,

    /// 7 мужских и 7 женских титулов правителей
    #[serde(default = "default_ruler_titles")]
    pub ruler_titles: Vec<String>,

    /// Отображаемые названия: город-государство, городок, деревня
    #[serde(default = "default_location_types")]
    pub location_types: Vec<String>,

    /// Шаблоны карт городов (`town%d.mif`, ..., `cityw%d.mif`)
    #[serde(default = "default_template_filenames")]
    pub template_filenames: Vec<String>,

    /// Смещения начала плана кварталов в вокселях
    #[serde(default = "default_starting_positions")]
    pub starting_positions: Vec<(u8, u8)>,

    /// Списки зарезервированных ячеек плана
    #[serde(default = "default_reserved_block_lists")]
    pub reserved_block_lists: Vec<Vec<u8>>,

    /// Глобальные ID прибрежных городов
    #[serde(default)]
    pub coastal_cities: Vec<u16>,

    /// Карта заранее построенного города центральной провинции
    #[serde(default = "default_center_province_city_mif")]
    pub center_province_city_mif: String,

    #[serde(default = "default_start_dungeon_name")]
    pub start_dungeon_name: String,

    #[serde(default = "default_start_dungeon_mif")]
    pub start_dungeon_mif: String,

    /// Скорости путешествия по местности/месяцу и местности/погоде
    #[serde(default)]
    pub speeds: SpeedTables,

    #[serde(default)]
    pub buildings: BuildingNameTables,

    #[serde(default)]
    pub wild: WildBlockLists,
}

pub const RULER_TITLE_COUNT: usize = 14;
pub const TEMPLATE_FILENAME_COUNT: usize = 6;
pub const STARTING_POSITION_COUNT: usize = 22;
pub const RESERVED_BLOCK_LIST_COUNT: usize = 8;
pub const WEATHER_TABLE_LEN: usize = 140;

fn default_quarter_climates() -> Vec<u8> {
    vec![0; QUARTER_COUNT]
}
fn default_weather_table() -> Vec<u8> {
    vec![0; WEATHER_TABLE_LEN]
}
fn default_ruler_titles() -> Vec<String> {
    [
        "Lord", "Baron", "Viscount", "Count", "Duke", "King", "Emperor", "Lady", "Baroness",
        "Viscountess", "Countess", "Duchess", "Queen", "Empress",
    ]
    .iter()
    .map(ToString::to_string)
    .collect()
}
fn default_location_types() -> Vec<String> {
    vec![
        "City-State".to_string(),
        "Town".to_string(),
        "Village".to_string(),
    ]
}
fn default_template_filenames() -> Vec<String> {
    ["town%d.mif", "townw%d.mif", "vilg%d.mif", "vilgw%d.mif", "city%d.mif", "cityw%d.mif"]
        .iter()
        .map(ToString::to_string)
        .collect()
}
fn default_starting_positions() -> Vec<(u8, u8)> {
    vec![(0, 0); STARTING_POSITION_COUNT]
}
fn default_reserved_block_lists() -> Vec<Vec<u8>> {
    vec![Vec::new(); RESERVED_BLOCK_LIST_COUNT]
}
fn default_center_province_city_mif() -> String {
    "IMPERIAL.MIF".to_string()
}
fn default_start_dungeon_name() -> String {
    "Imperial Dungeons".to_string()
}
fn default_start_dungeon_mif() -> String {
    "START.MIF".to_string()
}

impl Default for GenerationTables {
    fn default() -> Self {
        Self {
            speeds: SpeedTables::default(),
            quarter_climates: default_quarter_climates(),
            weather_table: default_weather_table(),
            ruler_titles: default_ruler_titles(),
            location_types: default_location_types(),
            template_filenames: default_template_filenames(),
            starting_positions: default_starting_positions(),
            reserved_block_lists: default_reserved_block_lists(),
            coastal_cities: Vec::new(),
            center_province_city_mif: default_center_province_city_mif(),
            start_dungeon_name: default_start_dungeon_name(),
            start_dungeon_mif: default_start_dungeon_mif(),
            buildings: BuildingNameTables::default(),
            wild: WildBlockLists::default(),
        }
    }
}

fn expect_len(table: &'static str, expected: usize, found: usize) -> Result<()> {
    if expected == found {
        Ok(())
    } else {
        Err(Error::TableShape {
            table,
            expected,
            found,
        })
    }
}

fn expect_non_empty(table: &'static str, list: &[u8]) -> Result<()> {
    if list.is_empty() {
        Err(Error::TableShape {
            table,
            expected: 1,
            found: 0,
        })
    } else {
        Ok(())
    }
}

impl GenerationTables {
    /// Загружает таблицы из TOML-файла и проверяет их форму
    ///
    /// # Пример
    /// ```toml
    /// # tables.toml
    /// coastal_cities = [2, 5, 224]
    /// ruler_titles = ["Lord", "Baron", "Viscount", "Count", "Duke", "King", "Emperor",
    ///                 "Lady", "Baroness", "Viscountess", "Countess", "Duchess", "Queen", "Empress"]
    ///
    /// [wild]
    /// normal = [5, 6, 7]
    /// village = [8]
    /// dungeon = [9]
    /// tavern = [10]
    /// temple = [11]
    /// ```
    pub fn from_toml_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let tables = Self::from_toml_str(&contents)?;
        Ok(tables)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let tables: Self = toml::from_str(contents)?;
        tables.validate()?;
        debug!(
            coastal = tables.coastal_cities.len(),
            "generation tables loaded"
        );
        Ok(tables)
    }

    /// Проверяет размеры всех таблиц, к которым генератор обращается по индексу
    pub fn validate(&self) -> Result<()> {
        expect_len("quarter climates", QUARTER_COUNT, self.quarter_climates.len())?;
        expect_len("weather table", WEATHER_TABLE_LEN, self.weather_table.len())?;
        let climate_rows = WEATHER_TABLE_LEN / 20;
        if let Some(&climate) = self
            .quarter_climates
            .iter()
            .find(|&&c| usize::from(c) >= climate_rows)
        {
            return Err(Error::TableIndex {
                table: "weather table climates",
                index: usize::from(climate),
                len: climate_rows,
            });
        }

        expect_len("ruler titles", RULER_TITLE_COUNT, self.ruler_titles.len())?;
        if self.location_types.len() < 3 {
            return Err(Error::TableShape {
                table: "location types",
                expected: 3,
                found: self.location_types.len(),
            });
        }
        expect_len(
            "template filenames",
            TEMPLATE_FILENAME_COUNT,
            self.template_filenames.len(),
        )?;
        expect_len(
            "starting positions",
            STARTING_POSITION_COUNT,
            self.starting_positions.len(),
        )?;
        expect_len(
            "reserved block lists",
            RESERVED_BLOCK_LIST_COUNT,
            self.reserved_block_lists.len(),
        )?;

        let buildings = &self.buildings;
        expect_len("tavern prefixes", 23, buildings.tavern_prefixes.len())?;
        expect_len("tavern suffixes", 23, buildings.tavern_suffixes.len())?;
        expect_len(
            "tavern marine suffixes",
            23,
            buildings.tavern_marine_suffixes.len(),
        )?;
        expect_len("temple prefixes", 3, buildings.temple_prefixes.len())?;
        expect_len("temple suffix lists", 3, buildings.temple_suffixes.len())?;
        for (list, &count) in buildings.temple_suffixes.iter().zip(&TEMPLE_SUFFIX_COUNTS) {
            expect_len("temple suffixes", count, list.len())?;
        }
        expect_len("equipment prefixes", 20, buildings.equipment_prefixes.len())?;
        expect_len("equipment suffixes", 10, buildings.equipment_suffixes.len())?;

        expect_non_empty("wild normal blocks", &self.wild.normal)?;
        expect_non_empty("wild village blocks", &self.wild.village)?;
        expect_non_empty("wild dungeon blocks", &self.wild.dungeon)?;
        expect_non_empty("wild tavern blocks", &self.wild.tavern)?;
        expect_non_empty("wild temple blocks", &self.wild.temple)?;
        Ok(())
    }

    /// Климаты четвертей как массив для пересчёта погоды
    pub fn quarter_climates_array(&self) -> Result<[u8; QUARTER_COUNT]> {
        self.quarter_climates
            .as_slice()
            .try_into()
            .map_err(|_| Error::TableShape {
                table: "quarter climates",
                expected: QUARTER_COUNT,
                found: self.quarter_climates.len(),
            })
    }

    #[must_use]
    pub fn is_coastal(&self, local_city_id: usize, province_id: usize) -> bool {
        let global_id = global_city_id(local_city_id, province_id);
        self.coastal_cities
            .iter()
            .any(|&id| usize::from(id) == global_id)
    }

    /// Город центральной провинции с ID 0 собран вручную и не планируется
    #[must_use]
    pub const fn is_premade(local_city_id: usize, province_id: usize) -> bool {
        province_id == CENTER_PROVINCE_ID && local_city_id == 0
    }

    /// Титул правителя по индексу 0..14
    pub fn ruler_title(&self, index: usize) -> Result<&str> {
        self.ruler_titles
            .get(index)
            .map(String::as_str)
            .ok_or(Error::TableIndex {
                table: "ruler titles",
                index,
                len: self.ruler_titles.len(),
            })
    }
}
