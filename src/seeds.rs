// src/seeds.rs
//! Выведение сидов из координат мира
//!
//! Чистые функции без состояния: каждая превращает координаты локации, прямоугольник
//! провинции и идентификаторы в 32-битный сид для отдельной задачи генерации
//! (город, дикие земли, правитель, провинция, подземелье, небо).
//!
//! Вся арифметика беззнаковая 32-битная с переполнением.

use crate::geometry::{Point, Rect};
use crate::province::global_point;
use crate::province::parse::latin1_byte;

/// Циклический сдвиг влево; `n` берётся по модулю 32.
#[must_use]
pub const fn rol(value: u32, n: u32) -> u32 {
    value.rotate_left(n % 32)
}

/// Упаковка точки в `(x << 16) + y`
#[must_use]
pub const fn pack_point(point: Point) -> u32 {
    ((point.x as u32) << 16).wrapping_add(point.y as u32)
}

/// Сид города из его локальных координат в провинции
///
/// # Примеры
/// ```
/// assert_eq!(arenagen::seeds::city_seed(100, 200), 6_553_800);
/// ```
#[must_use]
pub const fn city_seed(local_x: u16, local_y: u16) -> u32 {
    ((local_x as u32) << 16) | local_y as u32
}

/// Обратное преобразование сида города в локальную точку
#[must_use]
pub const fn local_city_point(city_seed: u32) -> Point {
    Point::new((city_seed >> 16) as i32, (city_seed & 0xFFFF) as i32)
}

/// Сид диких земель: первые четыре байта имени локации как little-endian `u32`.
///
/// Имя хранится как Latin-1, поэтому каждый символ соответствует одному байту файла.
/// Имена короче четырёх байт дают 0: такие локации не могут сидировать дикие земли.
#[must_use]
pub fn wilderness_seed(location_name: &str) -> u32 {
    let mut bytes = location_name.chars().map(latin1_byte);
    match (bytes.next(), bytes.next(), bytes.next(), bytes.next()) {
        (Some(a), Some(b), Some(c), Some(d)) => u32::from_le_bytes([a, b, c, d]),
        _ => 0,
    }
}

/// Сид правителя: глобальная точка, упакованная и повёрнутая на 16 бит
#[must_use]
pub fn ruler_seed(local_point: Point, province_rect: &Rect) -> u32 {
    let global = global_point(local_point, province_rect);
    rol(pack_point(global), 16)
}

/// Пол правителя определяется двумя младшими битами его сида
#[must_use]
pub const fn ruler_is_male(ruler_seed: u32) -> bool {
    (ruler_seed & 0x3) != 0
}

/// Сид провинции (используется подземельями в диких землях)
#[must_use]
pub const fn province_seed(province_id: u32, province_rect: &Rect) -> u32 {
    pack_point(Point::new(province_rect.x, province_rect.y)).wrapping_mul(province_id)
}

/// Сид подземелья по его локальной позиции в провинции.
///
/// Координаты упаковываются в обратном порядке: `(y << 16) + x`.
#[must_use]
pub const fn dungeon_seed(dungeon: Point, province_id: u32) -> u32 {
    let seed = ((dungeon.y as u32) << 16)
        .wrapping_add(dungeon.x as u32)
        .wrapping_add(province_id);
    !rol(seed, 5)
}

/// Сид неба: упакованная глобальная точка, умноженная на номер провинции (без поворота)
#[must_use]
pub fn sky_seed(local_point: Point, province_id: u32, province_rect: &Rect) -> u32 {
    let global = global_point(local_point, province_rect);
    pack_point(global).wrapping_mul(province_id)
}

/// Сид подземелья в блоке диких земель
#[must_use]
pub const fn wild_dungeon_seed(province_seed: u32, wild_block_x: i32, wild_block_y: i32) -> u32 {
    let offset = ((wild_block_y << 6) + wild_block_x) & 0xFFFF;
    province_seed.wrapping_add(offset as u32)
}

/// Сид фрагмента диких земель (имена построек в диких землях)
#[must_use]
pub const fn wild_chunk_seed(wild_x: i32, wild_y: i32) -> u32 {
    ((wild_y as u32) << 16).wrapping_add(wild_x as u32)
}

/// Имя .MIF подземелья главного квеста: первые восемь десятичных цифр сида
#[must_use]
pub fn main_quest_dungeon_mif_name(dungeon_seed: u32) -> String {
    let digits = dungeon_seed.to_string();
    let prefix: String = digits.chars().take(8).collect();
    format!("{prefix}.MIF")
}
