// src/city.rs
//! Планировщик кварталов города
//!
//! Город занимает квадратную сетку N×N кварталов (N = 6 для города-государства, 5 для городка,
//! 4 для деревни). Алгоритм:
//! 1. Ячейки из списка зарезервированных становятся `Reserved` (индексы за пределами сетки
//!    молча пропускаются).
//! 2. По одному размещаются обязательные кварталы: снаряжение, гильдия магов, дом знати,
//!    храм, таверна, пустырь.
//! 3. Каждая оставшаяся пустая ячейка получает взвешенно выбранный тип.
//!
//! Размещение: «выбрать случайную ячейку, повторить, пока она занята». Число попыток
//! ограничено: вырожденный сид (например, 0) иначе зациклил бы генерацию.

use image::{ImageBuffer, Rgb};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect as PixelRect;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::geometry::Point;
use crate::random::ArenaRandom;
use crate::terrain::ClimateType;
use crate::weather::WeatherType;

/// Максимум попыток на одно размещение квартала
pub const MAX_PLACEMENT_ATTEMPTS: u32 = 4096;

/// Сторона квартала в вокселях
pub const BLOCK_SIZE: i32 = 20;

/// Тип квартала в ячейке плана
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockType {
    Empty,
    Reserved,
    Equipment,
    MagesGuild,
    NobleHouse,
    Temple,
    Tavern,
    Spacer,
    Houses,
}

impl BlockType {
    /// Кварталы, которые есть в каждом городе ровно по одному до случайного заполнения
    pub const REQUIRED: [BlockType; 6] = [
        BlockType::Equipment,
        BlockType::MagesGuild,
        BlockType::NobleHouse,
        BlockType::Temple,
        BlockType::Tavern,
        BlockType::Spacer,
    ];

    /// Взвешенный выбор по 16-битному значению. Пороги фиксированы.
    #[must_use]
    pub const fn from_weighted_draw(value: u16) -> Self {
        match value {
            0..=0x7333 => BlockType::Houses,
            0x7334..=0xA666 => BlockType::Tavern,
            0xA667..=0xCCCC => BlockType::Equipment,
            0xCCCD..=0xE666 => BlockType::Temple,
            _ => BlockType::NobleHouse,
        }
    }

    /// Случайный тип для заполнения: ровно один вызов генератора
    pub fn random(random: &mut ArenaRandom) -> Self {
        Self::from_weighted_draw(random.next())
    }

    /// Код .MIF и число вариаций квартала; `None` для пустых и зарезервированных ячеек
    #[must_use]
    pub const fn mif_code(self) -> Option<(&'static str, u32)> {
        match self {
            BlockType::Equipment => Some(("EQ", 13)),
            BlockType::MagesGuild => Some(("MG", 11)),
            BlockType::NobleHouse => Some(("NB", 10)),
            BlockType::Temple => Some(("TP", 12)),
            BlockType::Tavern => Some(("TV", 15)),
            BlockType::Spacer => Some(("TS", 11)),
            BlockType::Houses => Some(("BS", 20)),
            BlockType::Empty | BlockType::Reserved => None,
        }
    }

    const fn color(self) -> [u8; 3] {
        match self {
            BlockType::Empty => [0, 0, 0],
            BlockType::Reserved => [90, 90, 90],
            BlockType::Equipment => [200, 140, 40],
            BlockType::MagesGuild => [120, 60, 200],
            BlockType::NobleHouse => [220, 200, 60],
            BlockType::Temple => [240, 240, 240],
            BlockType::Tavern => [180, 60, 50],
            BlockType::Spacer => [80, 160, 80],
            BlockType::Houses => [150, 110, 80],
        }
    }
}

const ROTATIONS: [char; 4] = ['A', 'B', 'C', 'D'];

/// Имя .MIF квартала: `{код}BD{вариация}{поворот}.MIF`.
///
/// Вариация `max(next % count, 1)`, поворот `next % 4`. Два вызова генератора.
pub fn block_mif_name(block: BlockType, random: &mut ArenaRandom) -> Option<String> {
    let (code, variations) = block.mif_code()?;
    let variation = random.next_below(variations).max(1);
    let rotation = ROTATIONS[random.next_below(ROTATIONS.len() as u32) as usize];
    Some(format!("{code}BD{variation}{rotation}.MIF"))
}

/// План города: N×N ячеек в порядке строк
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityLayoutPlan {
    dim: usize,
    cells: Vec<BlockType>,
}

impl CityLayoutPlan {
    /// Пустой план
    #[must_use]
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            cells: vec![BlockType::Empty; dim * dim],
        }
    }

    #[must_use]
    pub const fn dim(&self) -> usize {
        self.dim
    }

    #[must_use]
    pub fn cells(&self) -> &[BlockType] {
        &self.cells
    }

    /// Ячейка по столбцу и строке
    #[must_use]
    pub fn get(&self, column: usize, row: usize) -> Option<BlockType> {
        if column < self.dim && row < self.dim {
            Some(self.cells[row * self.dim + column])
        } else {
            None
        }
    }

    #[must_use]
    pub fn count(&self, block: BlockType) -> usize {
        self.cells.iter().filter(|&&cell| cell == block).count()
    }

    /// План завершён, если в нём не осталось пустых ячеек
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.count(BlockType::Empty) == 0
    }

    fn reserve(&mut self, reserved_blocks: &[u8]) {
        for &block in reserved_blocks {
            match self.cells.get_mut(usize::from(block)) {
                Some(cell) => *cell = BlockType::Reserved,
                None => warn!(block, dim = self.dim, "reserved block outside city plan ignored"),
            }
        }
    }

    /// Кандидат → отказ, если ячейка занята → запись
    fn place(&mut self, block: BlockType, random: &mut ArenaRandom) -> Result<usize> {
        let size = self.cells.len() as u32;
        for _ in 0..MAX_PLACEMENT_ATTEMPTS {
            let index = random.next_below(size) as usize;
            if self.cells[index] == BlockType::Empty {
                self.cells[index] = block;
                return Ok(index);
            }
        }
        Err(Error::PlacementExhausted {
            what: "city block",
            attempts: MAX_PLACEMENT_ATTEMPTS,
        })
    }

    /// Имена .MIF всех кварталов по порядку строк.
    ///
    /// Генератор продолжает последовательность, оставшуюся после планирования. Зарезервированные
    /// ячейки не тратят вызовов и дают `None`.
    pub fn block_mif_names(&self, random: &mut ArenaRandom) -> Vec<Option<String>> {
        self.cells
            .iter()
            .map(|&block| block_mif_name(block, random))
            .collect()
    }

    /// Смещение квартала в сетке вокселей: `start + 20 × (столбец, строка)`
    #[must_use]
    pub fn block_origin(&self, index: usize, start: Point) -> Point {
        let column = (index % self.dim) as i32;
        let row = (index / self.dim) as i32;
        Point::new(start.x + column * BLOCK_SIZE, start.y + row * BLOCK_SIZE)
    }

    /// Цветная схема плана; каждая ячейка рисуется квадратом `cell_size` пикселей
    pub fn save_as_png(&self, path: &str, cell_size: u32) -> Result<()> {
        let side = self.dim as u32 * cell_size;
        let mut img: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::new(side.max(1), side.max(1));

        for (index, block) in self.cells.iter().enumerate() {
            let column = (index % self.dim) as u32;
            let row = (index / self.dim) as u32;
            let rect = PixelRect::at((column * cell_size) as i32, (row * cell_size) as i32)
                .of_size(cell_size.max(1), cell_size.max(1));
            draw_filled_rect_mut(&mut img, rect, Rgb(block.color()));
            draw_hollow_rect_mut(&mut img, rect, Rgb([20, 20, 20]));
        }

        img.save(path)?;
        Ok(())
    }
}

/// Планирует город, используя переданный генератор.
///
/// Генератор должен быть уже засеян сидом города; после возврата он готов к выбору имён .MIF.
pub fn plan_city(
    random: &mut ArenaRandom,
    city_dim: usize,
    reserved_blocks: &[u8],
) -> Result<CityLayoutPlan> {
    let mut plan = CityLayoutPlan::new(city_dim);
    plan.reserve(reserved_blocks);

    let available = plan.count(BlockType::Empty);
    if available < BlockType::REQUIRED.len() {
        return Err(Error::NotEnoughEmptyBlocks {
            needed: BlockType::REQUIRED.len(),
            available,
        });
    }

    for block in BlockType::REQUIRED {
        plan.place(block, random)?;
    }

    let remaining = plan.count(BlockType::Empty);
    for _ in 0..remaining {
        let block = BlockType::random(random);
        plan.place(block, random)?;
    }

    debug_assert!(plan.is_complete());
    Ok(plan)
}

/// Планирует город с собственным генератором, засеянным `city_seed`
pub fn generate_plan(
    city_seed: u32,
    city_dim: usize,
    reserved_blocks: &[u8],
) -> Result<CityLayoutPlan> {
    let mut random = ArenaRandom::new(city_seed);
    let plan = plan_city(&mut random, city_dim, reserved_blocks)?;
    debug!(city_seed, city_dim, "city plan generated");
    Ok(plan)
}

/// Квартал, готовый к сборке уровня
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedBlock {
    pub block: BlockType,
    pub mif_name: String,
    pub origin: Point,
}

/// План вместе с выбранными .MIF и смещениями кварталов
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityLayout {
    pub plan: CityLayoutPlan,
    pub blocks: Vec<PlacedBlock>,
}

impl CityLayout {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Полная раскладка города: план и имена .MIF одним генератором, как при сборке уровня
pub fn generate_city(
    city_seed: u32,
    city_dim: usize,
    reserved_blocks: &[u8],
    start_position: Point,
) -> Result<CityLayout> {
    let mut random = ArenaRandom::new(city_seed);
    let plan = plan_city(&mut random, city_dim, reserved_blocks)?;

    let blocks = plan
        .block_mif_names(&mut random)
        .into_iter()
        .enumerate()
        .filter_map(|(index, name)| {
            name.map(|mif_name| PlacedBlock {
                block: plan.cells[index],
                mif_name,
                origin: plan.block_origin(index, start_position),
            })
        })
        .collect();

    Ok(CityLayout { plan, blocks })
}

/// Имя .INF города по климату и погоде, например `TCN.INF`
#[must_use]
pub fn city_inf_name(climate: ClimateType, weather: WeatherType) -> String {
    inf_name(climate, 'C', weather)
}

/// Общая схема имён .INF: буква климата, буква вида локации, буква погоды
pub(crate) fn inf_name(climate: ClimateType, location_letter: char, weather: WeatherType) -> String {
    let climate_letter = match climate {
        ClimateType::Temperate => 'T',
        ClimateType::Desert => 'D',
        ClimateType::Mountain => 'M',
    };

    let weather_letter = if weather.is_clear() || weather.is_overcast() {
        'N'
    } else if weather.is_rain() {
        'R'
    } else if climate == ClimateType::Desert {
        warn!("deserts have no snow templates");
        'N'
    } else {
        'S'
    };

    format!("{climate_letter}{location_letter}{weather_letter}.INF")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    const GOLDEN_SEED: u32 = (100 << 16) | 200;

    #[test]
    fn weighted_draw_thresholds_are_inclusive() {
        assert_eq!(BlockType::from_weighted_draw(0), BlockType::Houses);
        assert_eq!(BlockType::from_weighted_draw(0x7333), BlockType::Houses);
        assert_eq!(BlockType::from_weighted_draw(0x7334), BlockType::Tavern);
        assert_eq!(BlockType::from_weighted_draw(0xA666), BlockType::Tavern);
        assert_eq!(BlockType::from_weighted_draw(0xA667), BlockType::Equipment);
        assert_eq!(BlockType::from_weighted_draw(0xCCCC), BlockType::Equipment);
        assert_eq!(BlockType::from_weighted_draw(0xCCCD), BlockType::Temple);
        assert_eq!(BlockType::from_weighted_draw(0xE666), BlockType::Temple);
        assert_eq!(BlockType::from_weighted_draw(0xE667), BlockType::NobleHouse);
        assert_eq!(BlockType::from_weighted_draw(0xFFFF), BlockType::NobleHouse);
    }

    #[test]
    fn golden_village_plan() {
        use BlockType::*;
        let plan = generate_plan(GOLDEN_SEED, 4, &[0, 5]).unwrap();
        assert_eq!(
            plan.cells(),
            &[
                Reserved, NobleHouse, NobleHouse, Tavern, Temple, Reserved, Temple, Houses,
                Temple, Houses, MagesGuild, Tavern, Equipment, Spacer, Houses, Houses,
            ]
        );
    }

    #[test]
    fn golden_block_mif_names() {
        let mut random = ArenaRandom::new(GOLDEN_SEED);
        let plan = plan_city(&mut random, 4, &[0, 5]).unwrap();
        let names = plan.block_mif_names(&mut random);
        let expected = [
            None,
            Some("NBBD9C.MIF"),
            Some("NBBD2B.MIF"),
            Some("TVBD9C.MIF"),
            Some("TPBD1A.MIF"),
            None,
            Some("TPBD6C.MIF"),
            Some("BSBD6D.MIF"),
            Some("TPBD2D.MIF"),
            Some("BSBD1A.MIF"),
            Some("MGBD9A.MIF"),
            Some("TVBD5D.MIF"),
            Some("EQBD11D.MIF"),
            Some("TSBD5A.MIF"),
            Some("BSBD1D.MIF"),
            Some("BSBD11A.MIF"),
        ];
        let names: Vec<Option<&str>> = names.iter().map(Option::as_deref).collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn generate_city_places_non_reserved_blocks() {
        let layout = generate_city(GOLDEN_SEED, 4, &[0, 5], Point::new(10, 12)).unwrap();
        assert_eq!(layout.blocks.len(), 14);
        assert_eq!(layout.blocks[0].mif_name, "NBBD9C.MIF");
        assert_eq!(layout.blocks[0].origin, Point::new(30, 12));
        let last = layout.blocks.last().unwrap();
        assert_eq!(last.origin, Point::new(70, 72));
    }

    #[test]
    fn out_of_range_reserved_indices_are_ignored() {
        let plan = generate_plan(GOLDEN_SEED, 4, &[0, 5, 16, 200]).unwrap();
        assert_eq!(plan.count(BlockType::Reserved), 2);
        assert_eq!(plan, generate_plan(GOLDEN_SEED, 4, &[0, 5]).unwrap());
    }

    #[test]
    fn too_many_reserved_cells_is_error() {
        let reserved: Vec<u8> = (0..12).collect();
        assert!(matches!(
            generate_plan(GOLDEN_SEED, 4, &reserved),
            Err(Error::NotEnoughEmptyBlocks {
                needed: 6,
                available: 4
            })
        ));
    }

    #[test]
    fn degenerate_seed_stops_with_error() {
        // seed 0 always draws index 0
        assert!(matches!(
            generate_plan(0, 4, &[]),
            Err(Error::PlacementExhausted { .. })
        ));
    }

    #[test]
    fn plans_are_complete_for_random_inputs() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..200 {
            let seed: u32 = rng.gen_range(1..=u32::MAX) | 1;
            let dim = rng.gen_range(4..=6);
            let reserved: Vec<u8> = (0..rng.gen_range(0..6))
                .map(|_| rng.gen_range(0..40))
                .collect();

            let plan = generate_plan(seed, dim, &reserved).unwrap();
            assert!(plan.is_complete());
            for &index in &reserved {
                if usize::from(index) < dim * dim {
                    assert_eq!(plan.cells()[usize::from(index)], BlockType::Reserved);
                }
            }
            for block in BlockType::REQUIRED {
                assert!(plan.count(block) >= 1);
            }
            // the weighted fill never draws these two
            assert_eq!(plan.count(BlockType::MagesGuild), 1);
            assert_eq!(plan.count(BlockType::Spacer), 1);
        }
    }

    #[test]
    fn same_seed_same_plan() {
        let a = generate_plan(0xDEAD_BEEF, 6, &[3, 9]).unwrap();
        let b = generate_plan(0xDEAD_BEEF, 6, &[3, 9]).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.get(3, 0), Some(BlockType::Reserved));
        assert_eq!(a.get(6, 0), None);
    }

    #[test]
    fn inf_names() {
        assert_eq!(
            city_inf_name(ClimateType::Temperate, WeatherType::Overcast),
            "TCN.INF"
        );
        assert_eq!(
            city_inf_name(ClimateType::Mountain, WeatherType::SnowOvercast),
            "MCS.INF"
        );
        assert_eq!(city_inf_name(ClimateType::Desert, WeatherType::Snow), "DCN.INF");
        assert_eq!(city_inf_name(ClimateType::Desert, WeatherType::Rain2), "DCR.INF");
    }
}
