//! Captcha Core - генерация синтетических датасетов капчи
//!
//! Библиотека для построения обучающих наборов:
//! - Сборка алфавита из классов символов (цифры, буквы, спецсимволы)
//! - Генерация случайных меток фиксированной или переменной длины
//! - Отрисовка меток с искажениями (поворот, шум, линии-помехи, размытие)
//! - Контентная адресация файлов по SHA-1 закодированного PNG
//! - Индексный CSV-файл `file,label`

pub mod charset;
pub mod label;
pub mod rendering;
pub mod storage;
pub mod index;
pub mod generator;

pub use charset::{Alphabet, CharClass, CharsetConfig};
pub use label::{LabelSampler, LengthPolicy};
pub use rendering::{Backend, CaptchaRenderer, RenderConfig, RenderError, Renderer};
pub use storage::{ContentAddress, OutputLayout};
pub use index::{read_index, IndexRow, IndexWriter};
pub use generator::{DatasetConfig, DatasetGenerator, RunSummary};

use std::path::PathBuf;

use thiserror::Error;

/// Версия библиотеки
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Ошибки конфигурации. Возникают до создания каких-либо файлов.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Empty alphabet: enable at least one character class")]
    EmptyAlphabet,

    #[error("Label length must be at least 1")]
    ZeroLength,

    #[error("Invalid label length range: min {min} > max {max}")]
    InvalidRange { min: usize, max: usize },

    #[error("Unsupported rendering backend: {0}")]
    UnknownBackend(String),

    #[error("Glyph scale must be at least 1")]
    ZeroScale,

    #[error("Invalid render parameter: {0}")]
    InvalidRenderParameter(&'static str),
}

/// Основные ошибки модуля
#[derive(Error, Debug)]
pub enum CaptchaError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Image encoding error: {0}")]
    Encode(#[from] image::ImageError),

    #[error("I/O error while {context} ({}): {source}", .path.display())]
    Io {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Index file error: {0}")]
    Index(#[from] csv::Error),
}

impl CaptchaError {
    pub(crate) fn io(context: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CaptchaError::Io {
            context,
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = CaptchaError> = std::result::Result<T, E>;
