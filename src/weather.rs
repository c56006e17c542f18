// src/weather.rs
//! Погода по четвертям провинций
//!
//! Карта мира делится на 36 четвертей (9 провинций × 4). Для каждой четверти хранится код
//! погоды; список пересчитывается при смене сезона из таблицы исполняемого файла
//! `weather_table[climate * 20 + season * 5 + variant]`.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::random::ArenaRandom;
use crate::terrain::ClimateType;

/// Количество четвертей провинций на карте
pub const QUARTER_COUNT: usize = 36;
/// Количество сезонов
pub const SEASON_COUNT: usize = 4;
const VARIANT_COUNT: usize = 5;
const CLIMATE_STRIDE: usize = SEASON_COUNT * VARIANT_COUNT;

const THUNDERSTORM_THRESHOLD: u16 = 24000;

/// Тип погоды в порядке игровых кодов
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum WeatherType {
    #[default]
    Clear,
    Overcast,
    Rain,
    Snow,
    SnowOvercast,
    Rain2,
    Overcast2,
    SnowOvercast2,
}

impl WeatherType {
    pub const ALL: [WeatherType; 8] = [
        WeatherType::Clear,
        WeatherType::Overcast,
        WeatherType::Rain,
        WeatherType::Snow,
        WeatherType::SnowOvercast,
        WeatherType::Rain2,
        WeatherType::Overcast2,
        WeatherType::SnowOvercast2,
    ];

    /// Номер столбца в таблице скорости по погоде
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn from_code(code: u8) -> Result<Self> {
        Self::ALL
            .get(usize::from(code))
            .copied()
            .ok_or(Error::TableIndex {
                table: "weather types",
                index: usize::from(code),
                len: Self::ALL.len(),
            })
    }

    #[must_use]
    pub const fn is_clear(self) -> bool {
        matches!(self, WeatherType::Clear)
    }

    #[must_use]
    pub const fn is_overcast(self) -> bool {
        matches!(self, WeatherType::Overcast | WeatherType::Overcast2)
    }

    #[must_use]
    pub const fn is_rain(self) -> bool {
        matches!(self, WeatherType::Rain | WeatherType::Rain2)
    }

    #[must_use]
    pub const fn is_snow(self) -> bool {
        matches!(
            self,
            WeatherType::Snow | WeatherType::SnowOvercast | WeatherType::SnowOvercast2
        )
    }

    /// Снег в пустыне заменяется дождём
    #[must_use]
    pub fn filtered_for_climate(self, climate: ClimateType) -> Self {
        if climate == ClimateType::Desert && self.is_snow() {
            debug!(weather = ?self, "snow in desert replaced with rain");
            WeatherType::Rain
        } else {
            self
        }
    }
}

/// Дождь оказывается грозой при `next() < 24000`
pub fn rain_is_thunderstorm(random: &mut ArenaRandom) -> bool {
    random.next() < THUNDERSTORM_THRESHOLD
}

/// Туман плотный в дни, где установлен бит 8
#[must_use]
pub const fn fog_is_heavy(current_day: u32) -> bool {
    (current_day & 8) != 0
}

/// Погода всех 36 четвертей
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherGrid {
    weathers: [WeatherType; QUARTER_COUNT],
}

impl Default for WeatherGrid {
    fn default() -> Self {
        Self::uniform(WeatherType::Clear)
    }
}

impl WeatherGrid {
    #[must_use]
    pub const fn new(weathers: [WeatherType; QUARTER_COUNT]) -> Self {
        Self { weathers }
    }

    #[must_use]
    pub const fn uniform(weather: WeatherType) -> Self {
        Self {
            weathers: [weather; QUARTER_COUNT],
        }
    }

    pub fn get(&self, quarter: usize) -> Result<WeatherType> {
        self.weathers
            .get(quarter)
            .copied()
            .ok_or(Error::TableIndex {
                table: "weather quarters",
                index: quarter,
                len: QUARTER_COUNT,
            })
    }

    fn set(&mut self, quarter: usize, weather: WeatherType) -> Result<()> {
        let slot = self.weathers.get_mut(quarter).ok_or(Error::TableIndex {
            table: "weather quarters",
            index: quarter,
            len: QUARTER_COUNT,
        })?;
        *slot = weather;
        Ok(())
    }

    #[must_use]
    pub fn as_slice(&self) -> &[WeatherType] {
        &self.weathers
    }
}

/// Вариант сезонной погоды по броску `next() % 100`:
/// 40% → 2, 20% → 1, 20% → 3, 10% → 0, 10% → 4
fn weather_variant(roll: u32) -> usize {
    match roll {
        60.. => 2,
        40.. => 1,
        20.. => 3,
        10.. => 0,
        _ => 4,
    }
}

/// Пересчитывает погоду всех четвертей для сезона.
///
/// `climates`: индекс климата каждой четверти; `weather_table`: 140 кодов погоды.
/// На каждую четверть тратится ровно один вызов генератора.
pub fn generate_weather_list(
    climates: &[u8; QUARTER_COUNT],
    season: usize,
    weather_table: &[u8],
    random: &mut ArenaRandom,
) -> Result<WeatherGrid> {
    if season >= SEASON_COUNT {
        return Err(Error::TableIndex {
            table: "seasons",
            index: season,
            len: SEASON_COUNT,
        });
    }

    let mut grid = WeatherGrid::default();
    for (quarter, &climate) in climates.iter().enumerate() {
        let variant = weather_variant(random.next_below(100));
        let index = usize::from(climate) * CLIMATE_STRIDE + season * VARIANT_COUNT + variant;
        let code = *weather_table.get(index).ok_or(Error::TableIndex {
            table: "weather table",
            index,
            len: weather_table.len(),
        })?;
        grid.set(quarter, WeatherType::from_code(code)?)?;
    }

    debug!(season, "weather list rebuilt");
    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Таблица, где код погоды равен номеру варианта
    fn variant_table() -> Vec<u8> {
        (0..140).map(|i| (i % VARIANT_COUNT) as u8).collect()
    }

    #[test]
    fn variant_thresholds() {
        assert_eq!(weather_variant(99), 2);
        assert_eq!(weather_variant(60), 2);
        assert_eq!(weather_variant(59), 1);
        assert_eq!(weather_variant(40), 1);
        assert_eq!(weather_variant(39), 3);
        assert_eq!(weather_variant(20), 3);
        assert_eq!(weather_variant(19), 0);
        assert_eq!(weather_variant(10), 0);
        assert_eq!(weather_variant(9), 4);
        assert_eq!(weather_variant(0), 4);
    }

    #[test]
    fn weather_list_consumes_one_draw_per_quarter() {
        let climates = [0u8; QUARTER_COUNT];
        let mut random = ArenaRandom::new(555);
        let grid = generate_weather_list(&climates, 1, &variant_table(), &mut random).unwrap();

        let mut reference = ArenaRandom::new(555);
        for quarter in 0..QUARTER_COUNT {
            let expected = weather_variant(reference.next_below(100)) as u8;
            assert_eq!(grid.get(quarter).unwrap(), WeatherType::from_code(expected).unwrap());
        }
        assert_eq!(random, reference);
    }

    #[test]
    fn climate_and_season_select_table_row() {
        let climates = [3u8; QUARTER_COUNT];
        let mut table = vec![0u8; 140];
        for variant in 0..VARIANT_COUNT {
            table[3 * 20 + 2 * 5 + variant] = 6;
        }
        let grid = generate_weather_list(&climates, 2, &table, &mut ArenaRandom::new(9)).unwrap();
        assert!(grid.as_slice().iter().all(|&w| w == WeatherType::Overcast2));
    }

    #[test]
    fn bad_season_and_short_table_are_errors() {
        let climates = [0u8; QUARTER_COUNT];
        let mut random = ArenaRandom::default();
        assert!(generate_weather_list(&climates, 4, &variant_table(), &mut random).is_err());
        assert!(generate_weather_list(&[6u8; QUARTER_COUNT], 3, &[0u8; 20], &mut random).is_err());
    }

    #[test]
    fn desert_snow_becomes_rain() {
        assert_eq!(
            WeatherType::SnowOvercast2.filtered_for_climate(ClimateType::Desert),
            WeatherType::Rain
        );
        assert_eq!(
            WeatherType::Snow.filtered_for_climate(ClimateType::Mountain),
            WeatherType::Snow
        );
        assert_eq!(
            WeatherType::Overcast.filtered_for_climate(ClimateType::Desert),
            WeatherType::Overcast
        );
    }

    #[test]
    fn predicates_and_fog() {
        assert!(WeatherType::Rain2.is_rain());
        assert!(WeatherType::Overcast2.is_overcast());
        assert!(!WeatherType::Overcast.is_snow());
        assert!(WeatherType::Clear.is_clear());
        assert!(fog_is_heavy(8));
        assert!(fog_is_heavy(13));
        assert!(!fog_is_heavy(7));
        assert!(!fog_is_heavy(16));
    }

    #[test]
    fn thunderstorm_uses_raw_draw() {
        let mut random = ArenaRandom::new(12345);
        // first draw 34893 >= 24000, third draw 116 < 24000
        assert!(!rain_is_thunderstorm(&mut random));
        assert!(!rain_is_thunderstorm(&mut random));
        assert!(rain_is_thunderstorm(&mut random));
    }

    #[test]
    fn grid_rejects_quarter_past_the_map() {
        let mut grid = WeatherGrid::uniform(WeatherType::Rain);
        assert!(grid.set(35, WeatherType::Snow).is_ok());
        assert_eq!(grid.get(35).unwrap(), WeatherType::Snow);
        assert!(matches!(
            grid.set(QUARTER_COUNT, WeatherType::Clear),
            Err(Error::TableIndex { index: 36, .. })
        ));
        assert!(grid.get(QUARTER_COUNT).is_err());
        assert_eq!(grid.as_slice().len(), QUARTER_COUNT);
    }

    #[test]
    fn weather_codes_out_of_range() {
        assert!(WeatherType::from_code(8).is_err());
        assert_eq!(WeatherType::from_code(5).ok(), Some(WeatherType::Rain2));
    }
}
