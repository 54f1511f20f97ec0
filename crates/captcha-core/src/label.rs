//! Модуль генерации меток
//!
//! Метка - случайная строка из алфавита. Символы выбираются независимо,
//! с возвращением: повторы внутри одной метки допустимы.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::charset::Alphabet;
use crate::ConfigError;

/// Политика длины метки
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LengthPolicy {
    /// Одинаковая длина для всех образцов
    Fixed(usize),
    /// Длина выбирается заново для каждого образца, границы включительно
    Range { min: usize, max: usize },
}

impl Default for LengthPolicy {
    fn default() -> Self {
        LengthPolicy::Fixed(4)
    }
}

impl LengthPolicy {
    /// Проверка инвариантов: длина >= 1, min <= max
    pub fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            LengthPolicy::Fixed(0) => Err(ConfigError::ZeroLength),
            LengthPolicy::Fixed(_) => Ok(()),
            LengthPolicy::Range { min: 0, .. } => Err(ConfigError::ZeroLength),
            LengthPolicy::Range { min, max } if min > max => {
                Err(ConfigError::InvalidRange { min, max })
            }
            LengthPolicy::Range { .. } => Ok(()),
        }
    }

    /// Длина очередного образца
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        match *self {
            LengthPolicy::Fixed(length) => length,
            LengthPolicy::Range { min, max } => rng.gen_range(min..=max),
        }
    }

    pub fn bounds(&self) -> (usize, usize) {
        match *self {
            LengthPolicy::Fixed(length) => (length, length),
            LengthPolicy::Range { min, max } => (min, max),
        }
    }
}

/// Генератор меток
#[derive(Debug, Clone)]
pub struct LabelSampler {
    alphabet: Alphabet,
    length: LengthPolicy,
}

impl LabelSampler {
    /// Создание генератора с проверкой политики длины
    pub fn new(alphabet: Alphabet, length: LengthPolicy) -> Result<Self, ConfigError> {
        length.validate()?;
        Ok(Self { alphabet, length })
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    pub fn length_policy(&self) -> LengthPolicy {
        self.length
    }

    /// Случайная метка; длина определяется политикой
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        let length = self.length.sample(rng);
        self.sample_with_length(length, rng)
    }

    /// Случайная метка заданной длины; длина уже проверена политикой
    fn sample_with_length<R: Rng + ?Sized>(&self, length: usize, rng: &mut R) -> String {
        (0..length)
            .filter_map(|_| self.alphabet.chars().choose(rng).copied())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charset::{CharClass, CharsetConfig};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sampler(classes: &[CharClass], length: LengthPolicy) -> LabelSampler {
        let alphabet = CharsetConfig::with_classes(classes).alphabet().unwrap();
        LabelSampler::new(alphabet, length).unwrap()
    }

    #[test]
    fn test_fixed_length() {
        let sampler = sampler(&[CharClass::Digits], LengthPolicy::Fixed(4));
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..100 {
            let label = sampler.sample(&mut rng);
            assert_eq!(label.chars().count(), 4);
            assert!(label.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_range_is_inclusive_and_resampled() {
        let sampler = sampler(
            &[CharClass::Digits, CharClass::Uppercase],
            LengthPolicy::Range { min: 3, max: 5 },
        );
        let mut rng = StdRng::seed_from_u64(42);

        let mut seen = [false; 6];
        for _ in 0..500 {
            let label = sampler.sample(&mut rng);
            let len = label.chars().count();
            assert!((3..=5).contains(&len), "length {} out of range", len);
            assert!(label
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
            seen[len] = true;
        }

        // Длина выбирается для каждой метки, а не один раз на запуск
        assert!(seen[3] && seen[4] && seen[5]);
    }

    #[test]
    fn test_minimal_length_is_never_empty() {
        let sampler = sampler(&[CharClass::Specials], LengthPolicy::Range { min: 1, max: 1 });
        let mut rng = StdRng::seed_from_u64(3);

        for _ in 0..50 {
            assert_eq!(sampler.sample(&mut rng).chars().count(), 1);
        }
        assert!(LabelSampler::new(sampler.alphabet().clone(), LengthPolicy::Fixed(0)).is_err());
    }

    #[test]
    fn test_single_char_alphabet_repeats() {
        let alphabet = Alphabet::new(vec!['x']).unwrap();
        let sampler = LabelSampler::new(alphabet, LengthPolicy::Fixed(6)).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(sampler.sample(&mut rng), "xxxxxx");
    }

    #[test]
    fn test_invalid_policies() {
        assert!(matches!(
            LengthPolicy::Fixed(0).validate(),
            Err(ConfigError::ZeroLength)
        ));
        assert!(matches!(
            LengthPolicy::Range { min: 0, max: 3 }.validate(),
            Err(ConfigError::ZeroLength)
        ));
        assert!(matches!(
            LengthPolicy::Range { min: 6, max: 2 }.validate(),
            Err(ConfigError::InvalidRange { min: 6, max: 2 })
        ));
        assert!(LengthPolicy::Range { min: 2, max: 2 }.validate().is_ok());
    }

    #[test]
    fn test_policy_json_shape() {
        let fixed: LengthPolicy = serde_json::from_str(r#"{"fixed": 4}"#).unwrap();
        assert_eq!(fixed, LengthPolicy::Fixed(4));

        let range: LengthPolicy =
            serde_json::from_str(r#"{"range": {"min": 3, "max": 8}}"#).unwrap();
        assert_eq!(range.bounds(), (3, 8));
    }
}
