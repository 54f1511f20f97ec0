//! Модуль алфавита
//!
//! Алфавит собирается из включённых классов символов в фиксированном
//! порядке: цифры, заглавные, строчные, спецсимволы.

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Класс символов
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CharClass {
    Digits,
    Uppercase,
    Lowercase,
    Specials,
}

impl CharClass {
    /// Все классы в порядке конкатенации
    pub const ALL: [CharClass; 4] = [
        CharClass::Digits,
        CharClass::Uppercase,
        CharClass::Lowercase,
        CharClass::Specials,
    ];

    /// Символы класса
    pub fn chars(self) -> &'static str {
        match self {
            CharClass::Digits => "0123456789",
            CharClass::Uppercase => "ABCDEFGHIJKLMNOPQRSTUVWXYZ",
            CharClass::Lowercase => "abcdefghijklmnopqrstuvwxyz",
            CharClass::Specials => "!@#$%^&*()-_=+",
        }
    }
}

/// Включённые классы символов
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CharsetConfig {
    /// Цифры 0-9
    pub digits: bool,
    /// Заглавные латинские буквы
    pub uppercase: bool,
    /// Строчные латинские буквы
    pub lowercase: bool,
    /// Спецсимволы
    pub specials: bool,
}

impl Default for CharsetConfig {
    fn default() -> Self {
        Self {
            digits: true,
            uppercase: false,
            lowercase: false,
            specials: false,
        }
    }
}

impl CharsetConfig {
    /// Набор без единого класса
    pub fn none() -> Self {
        Self {
            digits: false,
            uppercase: false,
            lowercase: false,
            specials: false,
        }
    }

    /// Набор из перечисленных классов
    pub fn with_classes(classes: &[CharClass]) -> Self {
        let mut config = Self::none();
        for class in classes {
            config.enable(*class);
        }
        config
    }

    pub fn enable(&mut self, class: CharClass) {
        *self.flag_mut(class) = true;
    }

    pub fn is_enabled(&self, class: CharClass) -> bool {
        match class {
            CharClass::Digits => self.digits,
            CharClass::Uppercase => self.uppercase,
            CharClass::Lowercase => self.lowercase,
            CharClass::Specials => self.specials,
        }
    }

    fn flag_mut(&mut self, class: CharClass) -> &mut bool {
        match class {
            CharClass::Digits => &mut self.digits,
            CharClass::Uppercase => &mut self.uppercase,
            CharClass::Lowercase => &mut self.lowercase,
            CharClass::Specials => &mut self.specials,
        }
    }

    /// Сборка алфавита
    ///
    /// Возвращает `ConfigError::EmptyAlphabet`, если не включён ни один класс.
    pub fn alphabet(&self) -> Result<Alphabet, ConfigError> {
        let chars: Vec<char> = CharClass::ALL
            .iter()
            .filter(|class| self.is_enabled(**class))
            .flat_map(|class| class.chars().chars())
            .collect();

        Alphabet::new(chars)
    }
}

/// Непустой упорядоченный набор символов для меток
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet {
    chars: Vec<char>,
}

impl Alphabet {
    pub fn new(chars: Vec<char>) -> Result<Self, ConfigError> {
        if chars.is_empty() {
            return Err(ConfigError::EmptyAlphabet);
        }
        Ok(Self { chars })
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// Всегда `false`: пустой алфавит не конструируется
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn contains(&self, c: char) -> bool {
        self.chars.contains(&c)
    }

    pub fn as_string(&self) -> String {
        self.chars.iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_digits_only() {
        let alphabet = CharsetConfig::default().alphabet().unwrap();
        assert_eq!(alphabet.as_string(), "0123456789");
    }

    #[test]
    fn test_class_order_is_fixed() {
        // Порядок перечисления не влияет на порядок в алфавите
        let config = CharsetConfig::with_classes(&[CharClass::Specials, CharClass::Digits]);
        let alphabet = config.alphabet().unwrap();
        assert_eq!(alphabet.as_string(), "0123456789!@#$%^&*()-_=+");
    }

    #[test]
    fn test_all_classes() {
        let alphabet = CharsetConfig::with_classes(&CharClass::ALL).alphabet().unwrap();
        assert_eq!(alphabet.len(), 10 + 26 + 26 + 14);
        assert!(alphabet.contains('z'));
        assert!(alphabet.contains('+'));
    }

    #[test]
    fn test_empty_alphabet_rejected() {
        let result = CharsetConfig::none().alphabet();
        assert!(matches!(result, Err(ConfigError::EmptyAlphabet)));
    }

    #[test]
    fn test_config_from_json() {
        let config: CharsetConfig = serde_json::from_str(r#"{"uppercase": true}"#).unwrap();
        // Отсутствующие поля берутся из Default
        assert!(config.digits);
        assert!(config.uppercase);
        assert!(!config.lowercase);
    }
}
