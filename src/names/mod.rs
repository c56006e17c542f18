// src/names/mod.rs
//! Составление имён
//!
//! - имена NPC по правилам расы и пола из таблицы фрагментов
//! - названия таверн, лавок и храмов города
//! - описание города при прибытии

pub mod buildings;
pub mod chunks;
pub mod description;
pub mod rules;

pub use buildings::{MenuBlock, MenuName, MenuType, generate_building_names};
pub use chunks::NameChunkTable;
pub use description::{LocationDescription, describe_location, normalize_whitespace};
pub use rules::{NAME_RULES, NameRule, rule_index};

use crate::error::{Error, Result};
use crate::random::ArenaRandom;

fn pick<'a>(chunks: &'a NameChunkTable, index: usize, random: &mut ArenaRandom) -> Result<&'a str> {
    let list = chunks.get(index)?;
    Ok(&list[random.next_below(list.len() as u32) as usize])
}

/// Собирает имя по списку правил.
///
/// Правила с шансом тратят один вызов генератора на проверку и ещё один на выбор фрагмента,
/// если проверка прошла.
pub fn compose_name(
    rules: &[NameRule],
    chunks: &NameChunkTable,
    random: &mut ArenaRandom,
) -> Result<String> {
    let mut name = String::new();
    for rule in rules {
        match *rule {
            NameRule::Chunk(index) => name.push_str(pick(chunks, index, random)?),
            NameRule::Literal(literal) => name.push_str(literal),
            NameRule::ChunkChance { chunk, chance } => {
                if random.next_below(100) <= chance {
                    name.push_str(pick(chunks, chunk, random)?);
                }
            }
            NameRule::ChunkLiteralChance {
                chunk,
                literal,
                chance,
            } => {
                if random.next_below(100) <= chance {
                    name.push_str(pick(chunks, chunk, random)?);
                    name.push_str(literal);
                }
            }
        }
    }
    Ok(name)
}

/// Имя NPC заданной расы и пола
pub fn generate_npc_name(
    race_id: usize,
    is_male: bool,
    chunks: &NameChunkTable,
    random: &mut ArenaRandom,
) -> Result<String> {
    let index = rule_index(race_id, is_male);
    let rules = NAME_RULES.get(index).ok_or(Error::TableIndex {
        table: "name rules",
        index,
        len: NAME_RULES.len(),
    })?;
    compose_name(rules, chunks, random)
}

/// Первое слово имени (до пробела)
#[must_use]
pub fn first_name(full_name: &str) -> &str {
    full_name.split(' ').next().unwrap_or_default()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_chunks() -> NameChunkTable {
        let lists = [
            &["Al", "Bor", "Cy"][..],
            &["an", "ric"],
            &["Mag", "Sten"],
            &["us", "son"],
            &["Da", "Fe"],
            &["rin", "lo", "ne"],
        ];
        NameChunkTable::new(
            lists
                .iter()
                .map(|list| list.iter().map(ToString::to_string).collect())
                .collect(),
        )
    }

    /// Таблица на все 58 списков: список `i` содержит `c{i}a`, `c{i}b`
    pub(crate) fn full_chunks() -> NameChunkTable {
        NameChunkTable::new(
            (0..=rules::max_chunk_index())
                .map(|i| vec![format!("c{i}a"), format!("c{i}b")])
                .collect(),
        )
    }

    #[test]
    fn plain_rules_compose_golden_name() {
        let rules = [
            NameRule::Chunk(0),
            NameRule::Chunk(1),
            NameRule::Literal(" "),
            NameRule::Chunk(4),
            NameRule::Chunk(5),
        ];
        let mut random = ArenaRandom::new(42);
        let name = compose_name(&rules, &sample_chunks(), &mut random).unwrap();
        assert_eq!(name, "Alric Dalo");
    }

    #[test]
    fn chance_rule_can_include_chunk() {
        let rules = [
            NameRule::Chunk(0),
            NameRule::ChunkChance {
                chunk: 1,
                chance: 75,
            },
            NameRule::Chunk(5),
        ];
        let mut random = ArenaRandom::new(7);
        let name = compose_name(&rules, &sample_chunks(), &mut random).unwrap();
        assert_eq!(name, "Boranlo");
    }

    #[test]
    fn failed_chance_skips_chunk_and_literal() {
        let rules = [
            NameRule::ChunkLiteralChance {
                chunk: 2,
                literal: " ",
                chance: 25,
            },
            NameRule::Chunk(3),
            NameRule::Chunk(4),
        ];
        let mut random = ArenaRandom::new(99);
        let name = compose_name(&rules, &sample_chunks(), &mut random).unwrap();
        assert_eq!(name, "sonDa");
    }

    #[test]
    fn every_race_and_gender_composes() {
        let chunks = full_chunks();
        let mut random = ArenaRandom::default();
        for race in 0..rules::RACE_COUNT {
            for is_male in [true, false] {
                let name = generate_npc_name(race, is_male, &chunks, &mut random).unwrap();
                assert!(!name.is_empty(), "race {race}");
            }
        }
        assert!(generate_npc_name(24, true, &chunks, &mut random).is_err());
    }

    #[test]
    fn missing_chunk_list_is_error() {
        let mut random = ArenaRandom::default();
        assert!(generate_npc_name(0, true, &sample_chunks(), &mut random).is_ok());
        assert!(generate_npc_name(3, true, &sample_chunks(), &mut random).is_err());
    }

    #[test]
    fn first_name_takes_leading_token() {
        assert_eq!(first_name("Alric Dalo"), "Alric");
        assert_eq!(first_name("Boranlo"), "Boranlo");
        assert_eq!(first_name(""), "");
    }
}
