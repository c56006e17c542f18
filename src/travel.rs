// src/travel.rs
//! Расчёт длительности путешествия между локациями
//!
//! Путь идёт по прямой Брезенхэма между глобальными точками. Каждый пиксель добавляет
//! `2000 / скорость` к общему времени, где скорость зависит от местности, месяца и погоды
//! в четверти провинции. Итог в днях: `clamp(время / 100, 1, 2000)` плюс разброс ±5 дней
//! для поездок длиннее 20 дней.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::geometry::{Point, bresenham_line};
use crate::province::CityDataFile;
use crate::random::ArenaRandom;
use crate::terrain::{self, TerrainGrid};
use crate::weather::WeatherGrid;

pub const TERRAIN_ROWS: usize = 7;
pub const MONTH_COUNT: usize = 12;
pub const WEATHER_COLUMNS: usize = 8;

const TIME_PER_PIXEL: u32 = 2000;
const TIME_PER_MONTH: u32 = 3000;
const TIME_PER_DAY: u32 = 100;
const MIN_DAYS: u32 = 1;
const MAX_DAYS: u32 = 2000;
/// Поездки до этой длины не получают разброса
const JITTER_THRESHOLD: u32 = 20;

/// Таблицы скорости из исполняемого файла
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeedTables {
    /// Скорость по местности (строка: нормализованный код) и месяцу
    pub climate: [[u8; MONTH_COUNT]; TERRAIN_ROWS],
    /// Модификатор погоды в процентах; 0 означает 100
    pub weather: [[u8; WEATHER_COLUMNS]; TERRAIN_ROWS],
}

impl Default for SpeedTables {
    fn default() -> Self {
        Self {
            climate: [[100; MONTH_COUNT]; TERRAIN_ROWS],
            weather: [[0; WEATHER_COLUMNS]; TERRAIN_ROWS],
        }
    }
}

impl SpeedTables {
    /// Скорость на пикселе; нулевая скорость считается единичной
    #[must_use]
    pub fn travel_speed(&self, terrain_row: usize, month: usize, weather: usize) -> u32 {
        let climate_speed = u32::from(self.climate[terrain_row][month]);
        let weather_mod = match self.weather[terrain_row][weather] {
            0 => 100,
            value => u32::from(value),
        };
        ((climate_speed * weather_mod) / 100).max(1)
    }
}

/// Справочные данные, нужные для расчёта пути
#[derive(Debug, Clone, Copy)]
pub struct TravelContext<'a> {
    pub city_data: &'a CityDataFile,
    pub terrain: &'a TerrainGrid,
    pub weathers: &'a WeatherGrid,
    pub speeds: &'a SpeedTables,
}

impl TravelContext<'_> {
    /// Общее время пути в условных единицах (до перевода в дни)
    pub fn travel_time(&self, start: Point, end: Point, month: usize) -> Result<u32> {
        if month >= MONTH_COUNT {
            return Err(Error::TableIndex {
                table: "months",
                index: month,
                len: MONTH_COUNT,
            });
        }

        let mut total_time: u32 = 0;
        for point in bresenham_line(start, end) {
            let month_index = (month + (total_time / TIME_PER_MONTH) as usize) % MONTH_COUNT;
            let quarter = self.city_data.global_quarter(point)?;
            let weather = self.weathers.get(quarter)?;

            // сырой код без обхода моря: строка 0 таблиц отведена морю
            let code = self.terrain.get(point.x, point.y).ok_or(Error::NoProvinceAt {
                x: point.x,
                y: point.y,
            })?;
            let terrain_row = terrain::normalized_index(code)?;

            let speed = self
                .speeds
                .travel_speed(terrain_row, month_index, weather.index());
            total_time += TIME_PER_PIXEL / speed;
        }
        Ok(total_time)
    }

    /// Длительность поездки в днях, диапазон `[1, 2004]`.
    ///
    /// Генератор вызывается один раз и только если базовое число дней больше 20.
    pub fn travel_days(
        &self,
        start: Point,
        end: Point,
        month: usize,
        random: &mut ArenaRandom,
    ) -> Result<u32> {
        let total_time = self.travel_time(start, end, month)?;
        let days = days_from_time(total_time, random);
        debug!(?start, ?end, month, total_time, days, "travel computed");
        Ok(days)
    }
}

fn days_from_time(total_time: u32, random: &mut ArenaRandom) -> u32 {
    let days = (total_time / TIME_PER_DAY).clamp(MIN_DAYS, MAX_DAYS);
    if days > JITTER_THRESHOLD {
        // (next % 10) - 5, итог не меньше 16
        days + random.next_below(10) - 5
    } else {
        days
    }
}

/// Свободная форма расчёта, повторяющая сигнатуру движка
#[allow(clippy::too_many_arguments)]
pub fn compute_travel_days(
    start: Point,
    end: Point,
    month: usize,
    weathers: &WeatherGrid,
    random: &mut ArenaRandom,
    city_data: &CityDataFile,
    terrain: &TerrainGrid,
    speeds: &SpeedTables,
) -> Result<u32> {
    TravelContext {
        city_data,
        terrain,
        weathers,
        speeds,
    }
    .travel_days(start, end, month, random)
}

/// Расстояние на карте: `max(dx, dy) + min(dx, dy) / 4`
#[must_use]
pub fn map_distance(a: Point, b: Point) -> i32 {
    let dx = (a.x - b.x).abs();
    let dy = (a.y - b.y).abs();
    dx.max(dy) + dx.min(dy) / 4
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::province::tests::sample_city_data;
    use crate::weather::WeatherType;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn flat_world() -> (CityDataFile, TerrainGrid, WeatherGrid, SpeedTables) {
        (
            sample_city_data(),
            TerrainGrid::filled(terrain::TEMPERATE1),
            WeatherGrid::uniform(WeatherType::Clear),
            SpeedTables::default(),
        )
    }

    #[test]
    fn map_distance_weights_minor_axis() {
        assert_eq!(map_distance(Point::new(0, 0), Point::new(10, 4)), 11);
        assert_eq!(map_distance(Point::new(5, 5), Point::new(5, 5)), 0);
        assert_eq!(map_distance(Point::new(10, 0), Point::new(0, 10)), 12);
    }

    #[test]
    fn speed_zero_weather_means_hundred() {
        let mut speeds = SpeedTables::default();
        speeds.climate[6][0] = 50;
        assert_eq!(speeds.travel_speed(6, 0, 0), 50);
        speeds.weather[6][2] = 40;
        assert_eq!(speeds.travel_speed(6, 0, 2), 20);
        speeds.climate[6][1] = 0;
        assert_eq!(speeds.travel_speed(6, 1, 0), 1);
    }

    #[test]
    fn each_pixel_costs_twenty_units_at_full_speed() {
        let (city_data, terrain, weathers, speeds) = flat_world();
        let context = TravelContext {
            city_data: &city_data,
            terrain: &terrain,
            weathers: &weathers,
            speeds: &speeds,
        };
        // 11 pixels × 2000 / 100
        let time = context
            .travel_time(Point::new(0, 0), Point::new(10, 0), 0)
            .unwrap();
        assert_eq!(time, 220);
    }

    #[test]
    fn short_trips_do_not_touch_generator() {
        let (city_data, terrain, weathers, speeds) = flat_world();
        let mut random = ArenaRandom::new(4242);
        let days = compute_travel_days(
            Point::new(0, 0),
            Point::new(10, 0),
            3,
            &weathers,
            &mut random,
            &city_data,
            &terrain,
            &speeds,
        )
        .unwrap();
        assert_eq!(days, 2);
        assert_eq!(random.seed(), 4242);
    }

    #[test]
    fn same_point_takes_one_day() {
        let (city_data, terrain, weathers, speeds) = flat_world();
        let mut random = ArenaRandom::default();
        let days = compute_travel_days(
            Point::new(50, 50),
            Point::new(50, 50),
            0,
            &weathers,
            &mut random,
            &city_data,
            &terrain,
            &speeds,
        )
        .unwrap();
        assert_eq!(days, 1);
    }

    #[test]
    fn long_trips_get_jitter() {
        let mut speeds = SpeedTables::default();
        speeds.climate = [[1; MONTH_COUNT]; TERRAIN_ROWS];
        let city_data = sample_city_data();
        let terrain = TerrainGrid::filled(terrain::TEMPERATE1);
        let weathers = WeatherGrid::default();
        let context = TravelContext {
            city_data: &city_data,
            terrain: &terrain,
            weathers: &weathers,
            speeds: &speeds,
        };

        // 5 pixels × 2000 = 10000 units = 100 days
        let mut random = ArenaRandom::new(12345);
        let days = context
            .travel_days(Point::new(0, 0), Point::new(4, 0), 0, &mut random)
            .unwrap();
        // first draw 34893 % 10 = 3
        assert_eq!(days, 98);
    }

    #[test]
    fn month_advances_with_accumulated_time() {
        let mut speeds = SpeedTables::default();
        // month 0 is slow, other months are fast
        speeds.climate[6][0] = 1;
        let city_data = sample_city_data();
        let terrain = TerrainGrid::filled(terrain::TEMPERATE1);
        let weathers = WeatherGrid::default();
        let context = TravelContext {
            city_data: &city_data,
            terrain: &terrain,
            weathers: &weathers,
            speeds: &speeds,
        };
        // pixel 1 at month 0 costs 2000, pixel 2 still month 0 → 4000, then month 1 costs 20
        let time = context
            .travel_time(Point::new(0, 0), Point::new(2, 0), 0)
            .unwrap();
        assert_eq!(time, 4020);
    }

    #[test]
    fn days_grow_with_distance_and_stay_bounded() {
        let mut rng = ChaCha8Rng::seed_from_u64(31);
        let city_data = sample_city_data();
        let terrain = TerrainGrid::filled(terrain::MOUNTAIN1);
        let weathers = WeatherGrid::uniform(WeatherType::Rain);

        for _ in 0..20 {
            let mut speeds = SpeedTables::default();
            for row in &mut speeds.climate {
                for speed in row.iter_mut() {
                    *speed = rng.gen_range(1..=120);
                }
            }
            for row in &mut speeds.weather {
                for modifier in row.iter_mut() {
                    *modifier = rng.gen_range(0..=150);
                }
            }
            let context = TravelContext {
                city_data: &city_data,
                terrain: &terrain,
                weathers: &weathers,
                speeds: &speeds,
            };

            let seed: u32 = rng.r#gen();
            let month = rng.gen_range(0..MONTH_COUNT);
            let horizontal = rng.gen_bool(0.5);
            let start = Point::new(rng.gen_range(0..40), rng.gen_range(0..40));
            let length = if horizontal {
                rng.gen_range(1..280)
            } else {
                rng.gen_range(1..160)
            };

            let mut previous_time = 0;
            let mut previous_base = 0;
            let mut previous_days = 0;
            for step in 0..=length {
                let end = if horizontal {
                    Point::new(start.x + step, start.y)
                } else {
                    Point::new(start.x, start.y + step)
                };
                let time = context.travel_time(start, end, month).unwrap();
                let days = context
                    .travel_days(start, end, month, &mut ArenaRandom::new(seed))
                    .unwrap();
                let base = (time / TIME_PER_DAY).clamp(MIN_DAYS, MAX_DAYS);

                assert!(time >= previous_time);
                assert!(base >= previous_base);
                assert!((MIN_DAYS..=MAX_DAYS + 5).contains(&days));
                // one seed gives one jitter, so days only drop where jitter starts
                if (previous_base > JITTER_THRESHOLD) == (base > JITTER_THRESHOLD) {
                    assert!(days >= previous_days, "step {step}: {days} < {previous_days}");
                }
                previous_time = time;
                previous_base = base;
                previous_days = days;
            }
        }
    }

    #[test]
    fn very_long_trips_clamp_before_jitter() {
        let mut speeds = SpeedTables::default();
        speeds.climate = [[1; MONTH_COUNT]; TERRAIN_ROWS];
        let city_data = sample_city_data();
        let terrain = TerrainGrid::filled(terrain::TEMPERATE1);
        let weathers = WeatherGrid::default();
        let context = TravelContext {
            city_data: &city_data,
            terrain: &terrain,
            weathers: &weathers,
            speeds: &speeds,
        };

        // 200 pixels × 2000 = 4000 days before the clamp
        let mut rng = ChaCha8Rng::seed_from_u64(2000);
        for _ in 0..100 {
            let mut random = ArenaRandom::new(rng.r#gen());
            let days = context
                .travel_days(Point::new(10, 20), Point::new(209, 20), 0, &mut random)
                .unwrap();
            assert!((MAX_DAYS - 5..MAX_DAYS + 5).contains(&days), "{days}");
        }
    }

    #[test]
    fn travel_outside_provinces_is_error() {
        let (city_data, terrain, weathers, speeds) = flat_world();
        let context = TravelContext {
            city_data: &city_data,
            terrain: &terrain,
            weathers: &weathers,
            speeds: &speeds,
        };
        assert!(
            context
                .travel_time(Point::new(0, 0), Point::new(330, 0), 0)
                .is_err()
        );
        assert!(
            context
                .travel_time(Point::new(0, 0), Point::new(1, 0), 12)
                .is_err()
        );
    }
}
