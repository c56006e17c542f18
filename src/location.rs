// src/location.rs
//! Определения локаций
//!
//! Локация карты мира бывает трёх видов: город, подземелье или подземелье главного квеста.
//! Общие поля (имя, позиция, широта) хранятся в [`LocationDefinition`], а данные вида лежат
//! в [`LocationKind`]. Доступ к данным чужого вида возвращает `Error::WrongLocationKind`.

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::city::{self, CityLayout, CityLayoutPlan};
use crate::config::GenerationTables;
use crate::error::{Error, Result};
use crate::geometry::Point;
use crate::province::{
    self, CENTER_PROVINCE_ID, CITY_STATE_COUNT, CityDataFile, LocationType, TOWN_COUNT,
    VILLAGE_COUNT, dungeon_to_location_id, global_city_id,
};
use crate::seeds;
use crate::terrain::{ClimateType, TerrainGrid};

/// Вид локации без данных
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LocationKindTag {
    City,
    Dungeon,
    MainQuestDungeon,
}

const CITIES_PER_PROVINCE: usize = CITY_STATE_COUNT + TOWN_COUNT + VILLAGE_COUNT;

/// Замена названия храма для городов главного квеста
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MainQuestTempleOverride {
    pub model_index: usize,
    pub suffix_index: usize,
    /// Позиция в общем списке названий построек города
    pub menu_names_index: usize,
}

impl MainQuestTempleOverride {
    #[must_use]
    pub const fn for_global_city(global_city_id: usize) -> Option<Self> {
        match global_city_id {
            2 => Some(Self {
                model_index: 1,
                suffix_index: 7,
                menu_names_index: 23,
            }),
            224 => Some(Self {
                model_index: 2,
                suffix_index: 8,
                menu_names_index: 32,
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityDefinition {
    pub city_type: LocationType,
    pub type_display_name: String,
    pub map_filename: String,
    pub city_seed: u32,
    pub wild_seed: u32,
    pub province_seed: u32,
    pub ruler_seed: u32,
    pub sky_seed: u32,
    pub climate: ClimateType,
    pub reserved_blocks: Vec<u8>,
    /// Начало плана кварталов в вокселях
    pub block_start: Point,
    pub main_quest_temple_override: Option<MainQuestTempleOverride>,
    pub blocks_per_side: usize,
    pub coastal: bool,
    pub premade: bool,
    pub ruler_is_male: bool,
    pub palace_is_main_quest_dungeon: bool,
}

impl CityDefinition {
    #[must_use]
    pub const fn wild_dungeon_seed(&self, wild_block_x: i32, wild_block_y: i32) -> u32 {
        seeds::wild_dungeon_seed(self.province_seed, wild_block_x, wild_block_y)
    }

    #[must_use]
    pub const fn local_city_point(&self) -> Point {
        seeds::local_city_point(self.city_seed)
    }

    pub fn generate_plan(&self) -> Result<CityLayoutPlan> {
        city::generate_plan(self.city_seed, self.blocks_per_side, &self.reserved_blocks)
    }

    pub fn generate_layout(&self) -> Result<CityLayout> {
        city::generate_city(
            self.city_seed,
            self.blocks_per_side,
            &self.reserved_blocks,
            self.block_start,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DungeonDefinition {
    pub dungeon_seed: u32,
    pub width_chunks: u32,
    pub height_chunks: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MainQuestDungeonType {
    /// Стартовая тюрьма без позиции на карте
    Start,
    /// Подземелье с картой к следующему куску посоха
    Map,
    /// Подземелье с куском посоха
    Staff,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MainQuestDungeonDefinition {
    pub dungeon_type: MainQuestDungeonType,
    pub map_filename: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocationKind {
    City(CityDefinition),
    Dungeon(DungeonDefinition),
    MainQuestDungeon(MainQuestDungeonDefinition),
}

impl LocationKind {
    #[must_use]
    pub const fn tag(&self) -> LocationKindTag {
        match self {
            LocationKind::City(_) => LocationKindTag::City,
            LocationKind::Dungeon(_) => LocationKindTag::Dungeon,
            LocationKind::MainQuestDungeon(_) => LocationKindTag::MainQuestDungeon,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationDefinition {
    pub name: String,
    /// Позиция в пространстве провинции
    pub x: i32,
    pub y: i32,
    pub latitude: f64,
    pub visible_by_default: bool,
    pub kind: LocationKind,
}

/// Число шаблонов карт для города
#[must_use]
pub const fn city_template_count(coastal: bool, is_city_state: bool) -> usize {
    if coastal {
        if is_city_state { 3 } else { 2 }
    } else {
        5
    }
}

/// Индекс имени шаблона (`town%d.mif`, `townw%d.mif`, `vilg%d.mif`, `vilgw%d.mif`,
/// `city%d.mif`, `cityw%d.mif`)
#[must_use]
pub const fn city_template_name_index(city_type: LocationType, coastal: bool) -> usize {
    let base = match city_type {
        LocationType::Town => 0,
        LocationType::Village => 2,
        _ => 4,
    };
    if coastal { base + 1 } else { base }
}

/// Индекс стартовой позиции плана
#[must_use]
pub const fn city_starting_position_index(
    city_type: LocationType,
    coastal: bool,
    template_id: usize,
) -> usize {
    match (city_type, coastal) {
        (LocationType::Town, false) => template_id,
        (LocationType::Town, true) => 5 + template_id,
        (LocationType::Village, false) => 7 + template_id,
        (LocationType::Village, true) => 12 + template_id,
        (_, false) => 14 + template_id,
        (_, true) => 19 + template_id,
    }
}

#[must_use]
pub const fn city_reserved_block_list_index(coastal: bool, template_id: usize) -> usize {
    if coastal { 5 + template_id } else { template_id }
}

#[must_use]
pub const fn city_blocks_per_side(city_type: LocationType) -> usize {
    match city_type {
        LocationType::Town => 5,
        LocationType::Village => 4,
        _ => 6,
    }
}

/// Номер шаблона карты города
#[must_use]
pub const fn city_template_id(local_city_id: usize, province_id: usize, coastal: bool) -> usize {
    let is_city_state = local_city_id < 8;
    global_city_id(local_city_id, province_id) % city_template_count(coastal, is_city_state)
}

fn table_entry<'a, T>(list: &'a [T], index: usize, table: &'static str) -> Result<&'a T> {
    list.get(index).ok_or(Error::TableIndex {
        table,
        index,
        len: list.len(),
    })
}

impl LocationDefinition {
    fn with_kind(name: String, x: i32, y: i32, latitude: f64, kind: LocationKind) -> Self {
        let visible_by_default = matches!(kind, LocationKind::City(_)) && !name.is_empty();
        Self {
            name,
            x,
            y,
            latitude,
            visible_by_default,
            kind,
        }
    }

    /// Определение города со всеми сидами и параметрами шаблона
    pub fn new_city(
        local_city_id: usize,
        province_id: usize,
        coastal: bool,
        premade: bool,
        tables: &GenerationTables,
        city_data: &CityDataFile,
        terrain: &TerrainGrid,
    ) -> Result<Self> {
        let city_type = province::city_type(local_city_id).ok_or(Error::TableIndex {
            table: "province cities",
            index: local_city_id,
            len: 32,
        })?;
        let province_data = city_data.province(province_id)?;
        let record = province_data
            .location(province::city_to_location_id(local_city_id))
            .ok_or(Error::TableIndex {
                table: "province locations",
                index: local_city_id,
                len: province::LOCATION_COUNT,
            })?;
        let local_point = record.local_point();
        let rect = province_data.global_rect();
        let global = province::global_point(local_point, &rect);

        let type_name_index = match city_type {
            LocationType::Town => 1,
            LocationType::Village => 2,
            _ => 0,
        };
        let type_display_name =
            table_entry(&tables.location_types, type_name_index, "location types")?.clone();

        let template_id = city_template_id(local_city_id, province_id, coastal);
        let map_filename = if premade {
            tables.center_province_city_mif.to_uppercase()
        } else {
            let name_index = city_template_name_index(city_type, coastal);
            table_entry(&tables.template_filenames, name_index, "template filenames")?
                .replace("%d", &(template_id + 1).to_string())
                .to_uppercase()
        };

        let reserved_blocks = table_entry(
            &tables.reserved_block_lists,
            city_reserved_block_list_index(coastal, template_id),
            "reserved block lists",
        )?
        .clone();
        let &(start_x, start_y) = table_entry(
            &tables.starting_positions,
            city_starting_position_index(city_type, coastal, template_id),
            "starting positions",
        )?;

        let province_u32 = province_id as u32;
        let ruler_seed = seeds::ruler_seed(local_point, &rect);
        let city = CityDefinition {
            city_type,
            type_display_name,
            map_filename,
            city_seed: seeds::city_seed(record.x, record.y),
            wild_seed: seeds::wilderness_seed(&record.name),
            province_seed: seeds::province_seed(province_u32, &rect),
            ruler_seed,
            sky_seed: seeds::sky_seed(local_point, province_u32, &rect),
            climate: terrain.climate_at(global.x, global.y)?,
            reserved_blocks,
            block_start: Point::new(i32::from(start_x), i32::from(start_y)),
            main_quest_temple_override: MainQuestTempleOverride::for_global_city(global_city_id(
                local_city_id,
                province_id,
            )),
            blocks_per_side: city_blocks_per_side(city_type),
            coastal,
            premade,
            ruler_is_male: seeds::ruler_is_male(ruler_seed),
            palace_is_main_quest_dungeon: province_id == CENTER_PROVINCE_ID && local_city_id == 0,
        };

        Ok(Self::with_kind(
            record.name.clone(),
            local_point.x,
            local_point.y,
            province::latitude(global),
            LocationKind::City(city),
        ))
    }

    /// Город с признаками «прибрежный» и «готовый» из таблиц
    pub fn city_from_tables(
        local_city_id: usize,
        province_id: usize,
        tables: &GenerationTables,
        city_data: &CityDataFile,
        terrain: &TerrainGrid,
    ) -> Result<Self> {
        Self::new_city(
            local_city_id,
            province_id,
            tables.is_coastal(local_city_id, province_id),
            GenerationTables::is_premade(local_city_id, province_id),
            tables,
            city_data,
            terrain,
        )
    }

    /// Именованное подземелье (локальные ID 2..16), размер 2×1 фрагмента
    pub fn new_dungeon(
        local_dungeon_id: usize,
        province_id: usize,
        city_data: &CityDataFile,
    ) -> Result<Self> {
        if !(2..16).contains(&local_dungeon_id) {
            return Err(Error::TableIndex {
                table: "named dungeons",
                index: local_dungeon_id,
                len: 16,
            });
        }
        let province_data = city_data.province(province_id)?;
        let record = province_data
            .location(dungeon_to_location_id(local_dungeon_id))
            .ok_or(Error::TableIndex {
                table: "province dungeons",
                index: local_dungeon_id,
                len: 16,
            })?;
        let local_point = record.local_point();
        let global = province::global_point(local_point, &province_data.global_rect());

        let dungeon = DungeonDefinition {
            dungeon_seed: seeds::dungeon_seed(local_point, province_id as u32),
            width_chunks: 2,
            height_chunks: 1,
        };

        Ok(Self::with_kind(
            record.name.clone(),
            local_point.x,
            local_point.y,
            province::latitude(global),
            LocationKind::Dungeon(dungeon),
        ))
    }

    /// Подземелье главного квеста. Для `Start` локальный ID не нужен: позиция (0, 0),
    /// широта 0, имя и карта берутся из таблиц.
    pub fn new_main_quest_dungeon(
        local_dungeon_id: Option<usize>,
        province_id: usize,
        dungeon_type: MainQuestDungeonType,
        tables: &GenerationTables,
        city_data: &CityDataFile,
    ) -> Result<Self> {
        if dungeon_type == MainQuestDungeonType::Start {
            let main_quest = MainQuestDungeonDefinition {
                dungeon_type,
                map_filename: tables.start_dungeon_mif.to_uppercase(),
            };
            return Ok(Self::with_kind(
                tables.start_dungeon_name.clone(),
                0,
                0,
                0.0,
                LocationKind::MainQuestDungeon(main_quest),
            ));
        }

        let local_dungeon_id = local_dungeon_id.ok_or(Error::TableIndex {
            table: "main quest dungeons",
            index: usize::MAX,
            len: 2,
        })?;
        let province_data = city_data.province(province_id)?;
        let record = province_data
            .location(dungeon_to_location_id(local_dungeon_id))
            .ok_or(Error::TableIndex {
                table: "province dungeons",
                index: local_dungeon_id,
                len: 16,
            })?;
        let local_point = record.local_point();
        let global = province::global_point(local_point, &province_data.global_rect());
        let dungeon_seed = seeds::dungeon_seed(local_point, province_id as u32);

        let main_quest = MainQuestDungeonDefinition {
            dungeon_type,
            map_filename: seeds::main_quest_dungeon_mif_name(dungeon_seed).to_uppercase(),
        };

        Ok(Self::with_kind(
            record.name.clone(),
            local_point.x,
            local_point.y,
            province::latitude(global),
            LocationKind::MainQuestDungeon(main_quest),
        ))
    }

    #[must_use]
    pub const fn kind_tag(&self) -> LocationKindTag {
        self.kind.tag()
    }

    pub fn city(&self) -> Result<&CityDefinition> {
        match &self.kind {
            LocationKind::City(city) => Ok(city),
            other => Err(Error::WrongLocationKind {
                expected: LocationKindTag::City,
                found: other.tag(),
            }),
        }
    }

    pub fn dungeon(&self) -> Result<&DungeonDefinition> {
        match &self.kind {
            LocationKind::Dungeon(dungeon) => Ok(dungeon),
            other => Err(Error::WrongLocationKind {
                expected: LocationKindTag::Dungeon,
                found: other.tag(),
            }),
        }
    }

    pub fn main_quest_dungeon(&self) -> Result<&MainQuestDungeonDefinition> {
        match &self.kind {
            LocationKind::MainQuestDungeon(main_quest) => Ok(main_quest),
            other => Err(Error::WrongLocationKind {
                expected: LocationKindTag::MainQuestDungeon,
                found: other.tag(),
            }),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Две локации не могут занимать один пиксель провинции
    #[must_use]
    pub fn matches(&self, other: &Self) -> bool {
        self.name == other.name && self.x == other.x && self.y == other.y
    }
}

/// Определения всех городов всех провинций в порядке глобальных ID
pub fn all_city_definitions(
    tables: &GenerationTables,
    city_data: &CityDataFile,
    terrain: &TerrainGrid,
) -> Result<Vec<LocationDefinition>> {
    let mut cities = Vec::with_capacity(city_data.provinces.len() * CITIES_PER_PROVINCE);
    for province_id in 0..city_data.provinces.len() {
        for local_city_id in 0..CITIES_PER_PROVINCE {
            cities.push(LocationDefinition::city_from_tables(
                local_city_id,
                province_id,
                tables,
                city_data,
                terrain,
            )?);
        }
    }
    Ok(cities)
}

/// Планы кварталов для набора городов. Готовые города и не-города дают `None`.
///
/// С фичей `parallel` города планируются параллельно: у каждого свой генератор,
/// поэтому результат не зависит от порядка.
pub fn plan_all_cities(cities: &[LocationDefinition]) -> Result<Vec<Option<CityLayoutPlan>>> {
    let plan_one = |location: &LocationDefinition| -> Result<Option<CityLayoutPlan>> {
        match &location.kind {
            LocationKind::City(city) if !city.premade => city.generate_plan().map(Some),
            _ => Ok(None),
        }
    };

    #[cfg(feature = "parallel")]
    let plans = cities.par_iter().map(plan_one).collect();
    #[cfg(not(feature = "parallel"))]
    let plans = cities.iter().map(plan_one).collect();

    plans
}
