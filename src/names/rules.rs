// src/names/rules.rs
//! Правила составления имён NPC
//!
//! 24 расы × 2 пола. Индекс списка правил: `раса × 2 + (мужчина ? 0 : 1)`.

/// Один шаг составления имени
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameRule {
    /// Случайный фрагмент из списка с этим индексом
    Chunk(usize),
    /// Строка без изменений
    Literal(&'static str),
    /// Фрагмент, если `next % 100 <= chance`
    ChunkChance { chunk: usize, chance: u32 },
    /// Фрагмент и строка после него, если `next % 100 <= chance`
    ChunkLiteralChance {
        chunk: usize,
        literal: &'static str,
        chance: u32,
    },
}

use NameRule::{Chunk, ChunkChance, ChunkLiteralChance, Literal};

pub const RACE_COUNT: usize = 24;
pub const NAME_RULE_COUNT: usize = RACE_COUNT * 2;

const fn human(first: usize, second: usize, last: usize) -> [NameRule; 5] {
    [
        Chunk(first),
        Chunk(second),
        Literal(" "),
        Chunk(last),
        Chunk(last + 1),
    ]
}

const RACE3_MALE: [NameRule; 5] = human(17, 18, 21);
const RACE3_FEMALE: [NameRule; 5] = human(19, 20, 21);
const RACE4_MALE: [NameRule; 5] = human(23, 24, 27);
const RACE4_FEMALE: [NameRule; 5] = human(25, 26, 27);
const RACE5_MALE: [NameRule; 5] = human(29, 30, 33);
const RACE5_FEMALE: [NameRule; 5] = human(31, 32, 33);
const RACE6_MALE: [NameRule; 5] = human(35, 36, 39);
const RACE6_FEMALE: [NameRule; 5] = human(37, 38, 39);
const RACE7_MALE: [NameRule; 5] = human(41, 42, 45);
const RACE7_FEMALE: [NameRule; 5] = human(43, 44, 45);

const MONSTER_A: &[NameRule] = &[
    Chunk(47),
    ChunkChance {
        chunk: 48,
        chance: 75,
    },
    Chunk(49),
];
const MONSTER_B: &[NameRule] = &[
    Chunk(50),
    ChunkChance {
        chunk: 51,
        chance: 75,
    },
    Chunk(52),
];
const RACE21: &[NameRule] = &[Chunk(50), Chunk(52), Chunk(53)];
const RACE22: &[NameRule] = &[
    ChunkLiteralChance {
        chunk: 54,
        literal: " ",
        chance: 25,
    },
    Chunk(55),
    Chunk(56),
    Chunk(57),
];
const RACE23: &[NameRule] = &[Chunk(55), Chunk(56), Chunk(57)];

/// Таблица правил по индексу `раса × 2 + пол`
pub static NAME_RULES: [&[NameRule]; NAME_RULE_COUNT] = [
    // 0
    &[Chunk(0), Chunk(1), Literal(" "), Chunk(4), Chunk(5)],
    &[Chunk(2), Chunk(3), Literal(" "), Chunk(4), Chunk(5)],
    // 1
    &[
        Chunk(6),
        Chunk(7),
        Chunk(8),
        ChunkChance {
            chunk: 9,
            chance: 75,
        },
    ],
    &[
        Chunk(6),
        Chunk(7),
        Chunk(8),
        ChunkChance {
            chunk: 9,
            chance: 75,
        },
        Chunk(10),
    ],
    // 2
    &[
        Chunk(11),
        Chunk(12),
        Literal(" "),
        Chunk(15),
        Chunk(16),
        Literal("sen"),
    ],
    &[
        Chunk(13),
        Chunk(14),
        Literal(" "),
        Chunk(15),
        Chunk(16),
        Literal("sen"),
    ],
    &RACE3_MALE,
    &RACE3_FEMALE,
    &RACE4_MALE,
    &RACE4_FEMALE,
    &RACE5_MALE,
    &RACE5_FEMALE,
    &RACE6_MALE,
    &RACE6_FEMALE,
    &RACE7_MALE,
    &RACE7_FEMALE,
    // 8..=16
    MONSTER_A,
    MONSTER_A,
    MONSTER_A,
    MONSTER_A,
    MONSTER_A,
    MONSTER_A,
    MONSTER_A,
    MONSTER_A,
    MONSTER_A,
    MONSTER_A,
    MONSTER_A,
    MONSTER_A,
    MONSTER_A,
    MONSTER_A,
    MONSTER_A,
    MONSTER_A,
    MONSTER_A,
    MONSTER_A,
    // 17..=20
    MONSTER_B,
    MONSTER_B,
    MONSTER_B,
    MONSTER_B,
    MONSTER_B,
    MONSTER_B,
    MONSTER_B,
    MONSTER_B,
    RACE21,
    RACE21,
    RACE22,
    RACE22,
    RACE23,
    RACE23,
];

/// Индекс списка правил для расы и пола
#[must_use]
pub const fn rule_index(race_id: usize, is_male: bool) -> usize {
    race_id * 2 + if is_male { 0 } else { 1 }
}

/// Наибольший индекс списка фрагментов, на который ссылаются правила
#[must_use]
pub fn max_chunk_index() -> usize {
    NAME_RULES
        .iter()
        .flat_map(|rules| rules.iter())
        .filter_map(|rule| match *rule {
            Chunk(chunk) | ChunkChance { chunk, .. } | ChunkLiteralChance { chunk, .. } => {
                Some(chunk)
            }
            Literal(_) => None,
        })
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_index_interleaves_genders() {
        assert_eq!(rule_index(0, true), 0);
        assert_eq!(rule_index(0, false), 1);
        assert_eq!(rule_index(23, false), 47);
    }

    #[test]
    fn human_races_share_surnames_between_genders() {
        for race in 3..=7 {
            let male = NAME_RULES[rule_index(race, true)];
            let female = NAME_RULES[rule_index(race, false)];
            assert_eq!(male.len(), 5);
            assert_eq!(male[2], Literal(" "));
            assert_eq!(male[3..], female[3..]);
            assert_ne!(male[0], female[0]);
        }
    }

    #[test]
    fn table_references_fifty_eight_chunk_lists() {
        assert_eq!(max_chunk_index(), 57);
        assert_eq!(NAME_RULES[rule_index(8, true)], NAME_RULES[rule_index(16, false)]);
        assert_eq!(NAME_RULES[rule_index(22, true)].len(), 4);
        assert_eq!(NAME_RULES[rule_index(2, false)].last(), Some(&Literal("sen")));
    }
}
