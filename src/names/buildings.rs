// src/names/buildings.rs
//! Названия таверн, лавок и храмов города
//!
//! Типы обрабатываются по очереди: таверны, лавки, храмы. Таверны используют генератор
//! вызывающего кода как есть, перед лавками и храмами он пересеивается сидом города.
//! Входы одного типа обходятся в порядке сканирования (x снаружи, z внутри), пара индексов
//! `(m, n)` перевыбирается, пока не станет уникальной среди названий этого типа.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{NameChunkTable, first_name, generate_npc_name};
use crate::city::{BlockType, CityLayout, MAX_PLACEMENT_ATTEMPTS};
use crate::config::{BuildingNameTables, TEMPLE_SUFFIX_COUNTS};
use crate::error::{Error, Result};
use crate::location::{CityDefinition, MainQuestTempleOverride};
use crate::random::ArenaRandom;
use crate::seeds;

const TAVERN_VARIANTS: u32 = 23;
const EQUIPMENT_PREFIXES: u32 = 20;
const EQUIPMENT_SUFFIXES: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MenuType {
    Tavern,
    Equipment,
    Temple,
}

impl MenuType {
    const ORDER: [MenuType; 3] = [MenuType::Tavern, MenuType::Equipment, MenuType::Temple];

    #[must_use]
    pub const fn from_block(block: BlockType) -> Option<Self> {
        match block {
            BlockType::Tavern => Some(MenuType::Tavern),
            BlockType::Equipment => Some(MenuType::Equipment),
            BlockType::Temple => Some(MenuType::Temple),
            _ => None,
        }
    }
}

/// Вход в здание с меню на уровне города
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuBlock {
    pub x: i32,
    pub z: i32,
    pub menu_type: MenuType,
}

impl MenuBlock {
    /// Один вход на квартал, в начале квартала
    #[must_use]
    pub fn from_layout(layout: &CityLayout) -> Vec<Self> {
        layout
            .blocks
            .iter()
            .filter_map(|placed| {
                MenuType::from_block(placed.block).map(|menu_type| Self {
                    x: placed.origin.x,
                    z: placed.origin.y,
                    menu_type,
                })
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuName {
    pub x: i32,
    pub z: i32,
    pub name: String,
}

/// Справочники, нужные для названий
#[derive(Debug, Clone, Copy)]
pub struct BuildingNameSources<'a> {
    pub tables: &'a BuildingNameTables,
    pub chunks: &'a NameChunkTable,
    /// Раса для имён в названиях лавок (номер провинции)
    pub race_id: usize,
}

fn entry<'a>(list: &'a [String], index: usize, table: &'static str) -> Result<&'a str> {
    list.get(index)
        .map(String::as_str)
        .ok_or(Error::TableIndex {
            table,
            index,
            len: list.len(),
        })
}

fn replace_first(text: &mut String, token: &str, value: &str) {
    if let Some(index) = text.find(token) {
        text.replace_range(index..index + token.len(), value);
    }
}

/// Название храма: префикс модели и суффикс без пробела
pub fn temple_name(tables: &BuildingNameTables, model: usize, suffix: usize) -> Result<String> {
    let prefix = entry(&tables.temple_prefixes, model, "temple prefixes")?;
    let suffixes = tables
        .temple_suffixes
        .get(model)
        .ok_or(Error::TableIndex {
            table: "temple suffix lists",
            index: model,
            len: tables.temple_suffixes.len(),
        })?;
    let suffix = entry(suffixes, suffix, "temple suffixes")?;
    Ok(format!("{prefix}{suffix}"))
}

fn tavern_name(tables: &BuildingNameTables, coastal: bool, m: usize, n: usize) -> Result<String> {
    let prefix = entry(&tables.tavern_prefixes, m, "tavern prefixes")?;
    let suffix = if coastal {
        entry(&tables.tavern_marine_suffixes, n, "tavern marine suffixes")?
    } else {
        entry(&tables.tavern_suffixes, n, "tavern suffixes")?
    };
    Ok(format!("{prefix} {suffix}"))
}

fn equipment_name(
    sources: &BuildingNameSources<'_>,
    city: &CityDefinition,
    m: usize,
    n: usize,
    x: i32,
    z: i32,
) -> Result<String> {
    let tables = sources.tables;
    let mut name = format!(
        "{} {}",
        entry(&tables.equipment_prefixes, m, "equipment prefixes")?,
        entry(&tables.equipment_suffixes, n, "equipment suffixes")?
    );

    replace_first(&mut name, "%ct", &city.type_display_name);

    if name.contains("%ef") {
        let mut name_random = ArenaRandom::new(((x as u32) << 16).wrapping_add(z as u32));
        let full = generate_npc_name(sources.race_id, true, sources.chunks, &mut name_random)?;
        replace_first(&mut name, "%ef", first_name(&full));
    }

    if name.contains("%n") {
        let mut name_random = ArenaRandom::new(((z as u32) << 16).wrapping_add(x as u32));
        let full = generate_npc_name(sources.race_id, true, sources.chunks, &mut name_random)?;
        replace_first(&mut name, "%n", &full);
    }

    Ok(name)
}

/// Выбирает пару индексов, ещё не встречавшуюся среди названий этого типа
fn unique_pair(
    seen: &mut Vec<u32>,
    random: &mut ArenaRandom,
    mut draw: impl FnMut(&mut ArenaRandom) -> (u32, u32),
) -> Result<(usize, usize)> {
    for _ in 0..MAX_PLACEMENT_ATTEMPTS {
        let (m, n) = draw(random);
        let hash = (m << 8) + n;
        if !seen.contains(&hash) {
            seen.push(hash);
            return Ok((m as usize, n as usize));
        }
    }
    Err(Error::PlacementExhausted {
        what: "building name",
        attempts: MAX_PLACEMENT_ATTEMPTS,
    })
}

/// Названия всех зданий с меню.
///
/// Результат: общий список в порядке генерации: сначала все таверны, затем лавки, затем храмы.
pub fn generate_building_names(
    city: &CityDefinition,
    menus: &[MenuBlock],
    sources: &BuildingNameSources<'_>,
    random: &mut ArenaRandom,
) -> Result<Vec<MenuName>> {
    let tables = sources.tables;
    let mut ordered = menus.to_vec();
    ordered.sort_by_key(|menu| (menu.x, menu.z));

    let local = seeds::local_city_point(city.city_seed);
    let reseed = ((local.x as u32) << 16).wrapping_add(local.y as u32);

    let mut names = Vec::with_capacity(ordered.len());
    for menu_type in MenuType::ORDER {
        if menu_type != MenuType::Tavern {
            random.srand(reseed);
        }

        let mut seen = Vec::new();
        for menu in ordered.iter().filter(|menu| menu.menu_type == menu_type) {
            let name = match menu_type {
                MenuType::Tavern => {
                    let (m, n) = unique_pair(&mut seen, random, |r| {
                        (r.next_below(TAVERN_VARIANTS), r.next_below(TAVERN_VARIANTS))
                    })?;
                    tavern_name(tables, city.coastal, m, n)?
                }
                MenuType::Equipment => {
                    let (m, n) = unique_pair(&mut seen, random, |r| {
                        (
                            r.next_below(EQUIPMENT_PREFIXES),
                            r.next_below(EQUIPMENT_SUFFIXES),
                        )
                    })?;
                    equipment_name(sources, city, m, n, menu.x, menu.z)?
                }
                MenuType::Temple => {
                    let (model, n) = unique_pair(&mut seen, random, |r| {
                        let model = r.next_below(TEMPLE_SUFFIX_COUNTS.len() as u32);
                        let n = r.next_below(TEMPLE_SUFFIX_COUNTS[model as usize] as u32);
                        (model, n)
                    })?;
                    temple_name(tables, model, n)?
                }
            };
            names.push(MenuName {
                x: menu.x,
                z: menu.z,
                name,
            });
        }

        if menu_type == MenuType::Temple {
            if let Some(temple_override) = city.main_quest_temple_override {
                apply_temple_override(&mut names, temple_override, tables)?;
            }
        }
    }

    debug!(count = names.len(), "building names generated");
    Ok(names)
}

/// Индекс замены вне списка названий пропускается с предупреждением
fn apply_temple_override(
    names: &mut [MenuName],
    temple_override: MainQuestTempleOverride,
    tables: &BuildingNameTables,
) -> Result<()> {
    let len = names.len();
    let Some(target) = names.get_mut(temple_override.menu_names_index) else {
        warn!(
            index = temple_override.menu_names_index,
            len, "main quest temple override outside menu names"
        );
        return Ok(());
    };
    target.name = temple_name(
        tables,
        temple_override.model_index,
        temple_override.suffix_index,
    )?;
    Ok(())
}
