// src/names/description.rs
//! Описание города при прибытии

use super::{NameChunkTable, first_name, generate_npc_name};
use crate::config::GenerationTables;
use crate::error::{Error, Result};
use crate::location::LocationDefinition;
use crate::province::{CENTER_PROVINCE_ID, LocationType};
use crate::random::ArenaRandom;

/// Всё, что нужно для описания одного города
#[derive(Debug, Clone, Copy)]
pub struct LocationDescription<'a> {
    /// Варианты текста; у города-государства используется только первый
    pub texts: &'a [String],
    pub city_name: &'a str,
    pub city_type: LocationType,
    pub province_id: usize,
    pub ruler_seed: u32,
    pub ruler_is_male: bool,
}

impl<'a> LocationDescription<'a> {
    pub fn for_location(
        location: &'a LocationDefinition,
        province_id: usize,
        texts: &'a [String],
    ) -> Result<Self> {
        let city = location.city()?;
        Ok(Self {
            texts,
            city_name: &location.name,
            city_type: city.city_type,
            province_id,
            ruler_seed: city.ruler_seed,
            ruler_is_male: city.ruler_is_male,
        })
    }
}

/// Индекс титула правителя (0..14). Для городков тратит один вызов генератора.
pub fn ruler_title_index(
    province_id: usize,
    city_type: LocationType,
    is_male: bool,
    random: &mut ArenaRandom,
) -> usize {
    let (male, female) = if province_id == CENTER_PROVINCE_ID {
        (6, 13)
    } else {
        match city_type {
            LocationType::CityState => (5, 12),
            LocationType::Village => (0, 7),
            _ => {
                let index = random.next_below(4) as usize + 1;
                (index, index + 7)
            }
        }
    };
    if is_male { male } else { female }
}

fn replace_first(text: &mut String, token: &str, value: &str) {
    if let Some(index) = text.find(token) {
        text.replace_range(index..index + token.len(), value);
    }
}

/// Текст описания города.
///
/// Городки и деревни выбирают вариант текста одним вызовом генератора, затем генератор
/// пересеивается сидом правителя отдельно для титула (`%t`) и для имени (`%rf`).
/// Имя правителя строится по правилам расы с номером провинции.
pub fn describe_location(
    description: &LocationDescription<'_>,
    tables: &GenerationTables,
    chunks: &NameChunkTable,
    random: &mut ArenaRandom,
) -> Result<String> {
    let texts = description.texts;
    if texts.is_empty() {
        return Err(Error::TableShape {
            table: "location descriptions",
            expected: 1,
            found: 0,
        });
    }

    if description.city_type == LocationType::CityState {
        return Ok(normalize_whitespace(&texts[0]));
    }

    let mut text = texts[random.next_below(texts.len() as u32) as usize].clone();
    replace_first(&mut text, "%cn", description.city_name);

    random.srand(description.ruler_seed);
    if text.contains("%t") {
        let index = ruler_title_index(
            description.province_id,
            description.city_type,
            description.ruler_is_male,
            random,
        );
        let title = tables.ruler_title(index)?;
        replace_first(&mut text, "%t", title);
    }

    random.srand(description.ruler_seed);
    if text.contains("%rf") {
        let full = generate_npc_name(
            description.province_id,
            description.ruler_is_male,
            chunks,
            random,
        )?;
        replace_first(&mut text, "%rf", first_name(&full));
    }

    Ok(normalize_whitespace(&text))
}

/// `\r` становится пробелом, серии пробелов сжимаются в один
#[must_use]
pub fn normalize_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev = None;
    for c in text.chars() {
        let c = if c == '\r' { ' ' } else { c };
        if prev != Some(' ') || c != ' ' {
            out.push(c);
        }
        prev = Some(c);
    }
    out
}
