// src/province/parse.rs
//! Разбор бинарного файла данных городов (CITYDATA)
//!
//! Формат: девять провинций подряд, каждая по 1228 байт:
//! - имя (20 байт, дополнено нулями)
//! - прямоугольник на карте мира: четыре LE16 (x, y, w, h)
//! - 48 записей локаций по 25 байт: имя (20 байт), LE16 x, LE16 y, u8 видимость
//!
//! Порядок записей: города-государства, городки, деревни, второе подземелье,
//! первое подземелье, случайные подземелья.

use tracing::debug;

use super::{
    CITY_STATE_COUNT, CityDataFile, LOCATION_COUNT, LOCATION_NAME_LEN, LocationRecord,
    PROVINCE_COUNT, ProvinceData, RANDOM_DUNGEON_COUNT, TOWN_COUNT, VILLAGE_COUNT,
};
use crate::error::{Error, Result};

const PROVINCE_NAME_LEN: usize = 20;
const LOCATION_RECORD_SIZE: usize = LOCATION_NAME_LEN + 2 + 2 + 1;
const PROVINCE_SIZE: usize = PROVINCE_NAME_LEN + 4 * 2 + LOCATION_COUNT * LOCATION_RECORD_SIZE;

/// Полный размер файла данных городов в байтах
pub const CITY_DATA_SIZE: usize = PROVINCE_COUNT * PROVINCE_SIZE;

/// Курсор чтения little-endian полей
struct Reader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    fn take(&mut self, len: usize) -> &'a [u8] {
        let slice = &self.bytes[self.offset..self.offset + len];
        self.offset += len;
        slice
    }

    fn u8(&mut self) -> u8 {
        self.take(1)[0]
    }

    fn u16(&mut self) -> u16 {
        let bytes = self.take(2);
        u16::from_le_bytes([bytes[0], bytes[1]])
    }

    /// Строка фиксированной длины до первого нуля; байты трактуются как Latin-1
    fn fixed_string(&mut self, len: usize) -> String {
        fixed_string(self.take(len))
    }
}

pub(crate) fn fixed_string(bytes: &[u8]) -> String {
    bytes
        .iter()
        .take_while(|&&b| b != 0)
        .map(|&b| char::from(b))
        .collect()
}

/// Обратное к [`fixed_string`]: символ Latin-1 в исходный байт; прочие символы дают `?`
pub(crate) fn latin1_byte(ch: char) -> u8 {
    u8::try_from(u32::from(ch)).unwrap_or(b'?')
}

fn read_location(reader: &mut Reader<'_>) -> LocationRecord {
    let name = reader.fixed_string(LOCATION_NAME_LEN);
    let x = reader.u16();
    let y = reader.u16();
    let visibility = reader.u8();
    LocationRecord {
        name,
        x,
        y,
        visibility,
    }
}

fn read_locations(reader: &mut Reader<'_>, count: usize) -> Vec<LocationRecord> {
    (0..count).map(|_| read_location(reader)).collect()
}

fn read_province(reader: &mut Reader<'_>) -> ProvinceData {
    let name = reader.fixed_string(PROVINCE_NAME_LEN);
    let global_x = reader.u16();
    let global_y = reader.u16();
    let global_w = reader.u16();
    let global_h = reader.u16();

    let city_states = read_locations(reader, CITY_STATE_COUNT);
    let towns = read_locations(reader, TOWN_COUNT);
    let villages = read_locations(reader, VILLAGE_COUNT);
    let second_dungeon = read_location(reader);
    let first_dungeon = read_location(reader);
    let random_dungeons = read_locations(reader, RANDOM_DUNGEON_COUNT);

    ProvinceData {
        name,
        global_x,
        global_y,
        global_w,
        global_h,
        city_states,
        towns,
        villages,
        second_dungeon,
        first_dungeon,
        random_dungeons,
    }
}

impl CityDataFile {
    /// Разбирает содержимое файла данных городов.
    ///
    /// Лишние байты в конце игнорируются; короткий буфер даёт ошибку `Truncated`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < CITY_DATA_SIZE {
            return Err(Error::Truncated {
                what: "city data",
                needed: CITY_DATA_SIZE,
                available: bytes.len(),
            });
        }

        let mut reader = Reader::new(bytes);
        let provinces: Vec<ProvinceData> =
            (0..PROVINCE_COUNT).map(|_| read_province(&mut reader)).collect();

        debug!(
            provinces = provinces.len(),
            first = %provinces[0].name,
            "city data parsed"
        );
        Ok(Self { provinces })
    }

    /// Читает файл данных городов с диска
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    /// Сериализует обратно в бинарный формат (имена обрезаются до 19 байт + нуль)
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(CITY_DATA_SIZE);
        for province in &self.provinces {
            write_fixed_string(&mut out, &province.name, PROVINCE_NAME_LEN);
            for value in [
                province.global_x,
                province.global_y,
                province.global_w,
                province.global_h,
            ] {
                out.extend_from_slice(&value.to_le_bytes());
            }

            let records = province
                .city_states
                .iter()
                .chain(&province.towns)
                .chain(&province.villages)
                .chain(std::iter::once(&province.second_dungeon))
                .chain(std::iter::once(&province.first_dungeon))
                .chain(&province.random_dungeons);
            for record in records {
                write_fixed_string(&mut out, &record.name, LOCATION_NAME_LEN);
                out.extend_from_slice(&record.x.to_le_bytes());
                out.extend_from_slice(&record.y.to_le_bytes());
                out.push(record.visibility);
            }
        }
        out
    }
}

fn write_fixed_string(out: &mut Vec<u8>, value: &str, len: usize) {
    let mut field = vec![0u8; len];
    for (slot, ch) in field.iter_mut().take(len - 1).zip(value.chars()) {
        *slot = latin1_byte(ch);
    }
    out.extend_from_slice(&field);
}
