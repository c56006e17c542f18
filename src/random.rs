// src/random.rs
//! Генератор псевдослучайных чисел Arena
//!
//! Мультипликативный генератор с 32-битным регистром: `state = state × 7143469` (по модулю 2³²),
//! наружу отдаются старшие 16 бит нового состояния. Статистически он слаб, но весь
//! процедурный контент (города, имена, погода, дикие земли) зависит от его точной
//! последовательности, поэтому алгоритм нельзя «улучшать».
//!
//! Экземпляр владеет своим регистром целиком. Для каждой детерминированной задачи создаётся
//! новый генератор (или существующий пересеивается), а функции генерации принимают его
//! по `&mut`, общего глобального состояния нет.

/// Сид по умолчанию, если явный сид не задан
pub const DEFAULT_SEED: u32 = 12345;

const MULTIPLIER: u32 = 7_143_469;

/// Детерминированный генератор
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArenaRandom {
    value: u32,
}

impl ArenaRandom {
    #[must_use]
    pub const fn new(seed: u32) -> Self {
        Self { value: seed }
    }

    /// Перезаписывает регистр. Предыдущая последовательность не восстанавливается.
    pub fn srand(&mut self, seed: u32) {
        self.value = seed;
    }

    /// Текущее значение регистра
    #[must_use]
    pub const fn seed(&self) -> u32 {
        self.value
    }

    /// Продвигает состояние и возвращает значение в диапазоне `[0, 65535]`.
    ///
    /// # Примеры
    /// ```
    /// use arenagen::random::ArenaRandom;
    /// let mut random = ArenaRandom::default();
    /// assert_eq!(random.next(), 34893);
    /// ```
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> u16 {
        self.value = self.value.wrapping_mul(MULTIPLIER);
        (self.value >> 16) as u16
    }

    /// `next() % exclusive_max`.
    ///
    /// Используются только 16 бит энтропии; модульное смещение входит в контракт,
    /// от него зависит весь сгенерированный мир.
    ///
    /// # Panics
    /// При `exclusive_max == 0`.
    pub fn next_below(&mut self, exclusive_max: u32) -> u32 {
        u32::from(self.next()) % exclusive_max
    }
}

impl Default for ArenaRandom {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}
