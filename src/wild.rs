// src/wild.rs
//! Раскладка диких земель вокруг города
//!
//! Дикие земли: сетка 64×64 фрагментов. Каждый фрагмент получает номер блока .RMD:
//! сначала выбирается список блоков (обычные, деревня, подземелье, таверна, храм) по
//! накопительным порогам, затем элемент списка. Четыре центральных фрагмента отданы городу.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::city::inf_name;
use crate::config::WildBlockLists;
use crate::error::{Error, Result};
use crate::random::ArenaRandom;
use crate::terrain::ClimateType;
use crate::weather::WeatherType;

pub const WILD_WIDTH: usize = 64;
pub const WILD_HEIGHT: usize = 64;

const NORMAL_THRESHOLD: u16 = 0x6666;
const VILLAGE_THRESHOLD: u16 = 0x4000;
const DUNGEON_THRESHOLD: u16 = 0x2666;
const TAVERN_THRESHOLD: u16 = 0x1999;

/// Номера фрагментов города (WILD001..WILD004) и их места в сетке
const CITY_BLOCKS: [(usize, usize, u8); 4] = [
    (WILD_WIDTH / 2 - 1, WILD_HEIGHT / 2 - 1, 1),
    (WILD_WIDTH / 2, WILD_HEIGHT / 2 - 1, 2),
    (WILD_WIDTH / 2 - 1, WILD_HEIGHT / 2, 3),
    (WILD_WIDTH / 2, WILD_HEIGHT / 2, 4),
];

/// Вид фрагмента диких земель
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WildBlockKind {
    Normal,
    Village,
    Dungeon,
    Tavern,
    Temple,
}

impl WildBlockKind {
    /// Вид по 16-битному значению генератора
    #[must_use]
    pub const fn from_draw(value: u16) -> Self {
        let mut value = value;
        if value < NORMAL_THRESHOLD {
            return WildBlockKind::Normal;
        }
        value -= NORMAL_THRESHOLD;
        if value < VILLAGE_THRESHOLD {
            return WildBlockKind::Village;
        }
        value -= VILLAGE_THRESHOLD;
        if value < DUNGEON_THRESHOLD {
            return WildBlockKind::Dungeon;
        }
        value -= DUNGEON_THRESHOLD;
        if value < TAVERN_THRESHOLD {
            WildBlockKind::Tavern
        } else {
            WildBlockKind::Temple
        }
    }

    fn list(self, lists: &WildBlockLists) -> &[u8] {
        match self {
            WildBlockKind::Normal => &lists.normal,
            WildBlockKind::Village => &lists.village,
            WildBlockKind::Dungeon => &lists.dungeon,
            WildBlockKind::Tavern => &lists.tavern,
            WildBlockKind::Temple => &lists.temple,
        }
    }

    const fn name(self) -> &'static str {
        match self {
            WildBlockKind::Normal => "wild normal blocks",
            WildBlockKind::Village => "wild village blocks",
            WildBlockKind::Dungeon => "wild dungeon blocks",
            WildBlockKind::Tavern => "wild tavern blocks",
            WildBlockKind::Temple => "wild temple blocks",
        }
    }
}

/// Номера блоков диких земель, строки по y
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WildIndices {
    cells: Vec<u8>,
}

impl WildIndices {
    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> Option<u8> {
        if x < WILD_WIDTH && y < WILD_HEIGHT {
            Some(self.cells[y * WILD_WIDTH + x])
        } else {
            None
        }
    }

    #[must_use]
    pub fn cells(&self) -> &[u8] {
        &self.cells
    }
}

/// Номера блоков для всех фрагментов диких земель города.
///
/// На каждый фрагмент два вызова генератора: выбор списка и выбор `(next & 0xFF) % len`.
pub fn generate_wilderness_indices(wild_seed: u32, lists: &WildBlockLists) -> Result<WildIndices> {
    let mut random = ArenaRandom::new(wild_seed);
    let mut cells = Vec::with_capacity(WILD_WIDTH * WILD_HEIGHT);

    for _ in 0..WILD_WIDTH * WILD_HEIGHT {
        let kind = WildBlockKind::from_draw(random.next());
        let list = kind.list(lists);
        if list.is_empty() {
            return Err(Error::TableShape {
                table: kind.name(),
                expected: 1,
                found: 0,
            });
        }
        let index = usize::from(random.next() & 0xFF) % list.len();
        cells.push(list[index]);
    }

    for (x, y, block) in CITY_BLOCKS {
        cells[y * WILD_WIDTH + x] = block;
    }

    debug!(wild_seed, "wilderness indices generated");
    Ok(WildIndices { cells })
}

/// Блоки 1..=4 образуют части города в центре диких земель
#[must_use]
pub const fn is_wild_city_block(block: u8) -> bool {
    matches!(block, 1..=4)
}

/// Имя .INF диких земель, например `TWN.INF`
#[must_use]
pub fn wild_inf_name(climate: ClimateType, weather: WeatherType) -> String {
    inf_name(climate, 'W', weather)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draw_thresholds_are_cumulative() {
        assert_eq!(WildBlockKind::from_draw(0x6665), WildBlockKind::Normal);
        assert_eq!(WildBlockKind::from_draw(0x6666), WildBlockKind::Village);
        assert_eq!(WildBlockKind::from_draw(0xA665), WildBlockKind::Village);
        assert_eq!(WildBlockKind::from_draw(0xA666), WildBlockKind::Dungeon);
        assert_eq!(WildBlockKind::from_draw(0xCCCB), WildBlockKind::Dungeon);
        assert_eq!(WildBlockKind::from_draw(0xCCCC), WildBlockKind::Tavern);
        assert_eq!(WildBlockKind::from_draw(0xE664), WildBlockKind::Tavern);
        assert_eq!(WildBlockKind::from_draw(0xE665), WildBlockKind::Temple);
        assert_eq!(WildBlockKind::from_draw(u16::MAX), WildBlockKind::Temple);
    }

    #[test]
    fn city_occupies_center() {
        let indices = generate_wilderness_indices(0x1234_5678, &WildBlockLists::default()).unwrap();
        assert_eq!(indices.cells().len(), WILD_WIDTH * WILD_HEIGHT);
        assert_eq!(indices.get(31, 31), Some(1));
        assert_eq!(indices.get(32, 31), Some(2));
        assert_eq!(indices.get(31, 32), Some(3));
        assert_eq!(indices.get(32, 32), Some(4));
        assert_eq!(indices.get(64, 0), None);

        let city_cells = indices
            .cells()
            .iter()
            .filter(|&&b| is_wild_city_block(b))
            .count();
        assert_eq!(city_cells, 4);
    }

    #[test]
    fn first_cell_follows_generator() {
        // seed 12345: 34893 >= 0x6666 → 34893 - 26214 = 8679 < 0x4000 → village;
        // 59839 & 0xFF = 191, 191 % 5 = 1
        let lists = WildBlockLists::default();
        let indices = generate_wilderness_indices(12345, &lists).unwrap();
        assert_eq!(indices.get(0, 0), Some(lists.village[1]));
    }

    #[test]
    fn empty_list_is_rejected() {
        let lists = WildBlockLists {
            village: Vec::new(),
            ..WildBlockLists::default()
        };
        assert!(generate_wilderness_indices(12345, &lists).is_err());
    }

    #[test]
    fn wild_inf_uses_w_letter() {
        assert_eq!(
            wild_inf_name(ClimateType::Mountain, WeatherType::Clear),
            "MWN.INF"
        );
        assert_eq!(
            wild_inf_name(ClimateType::Temperate, WeatherType::Rain),
            "TWR.INF"
        );
    }
}
