//! Индексный CSV-файл
//!
//! Заголовок `file,label`, одна строка на образец. Файл сбрасывается на диск
//! после каждой строки, так что прерванный запуск оставляет все уже
//! записанные строки.

use std::fs::File;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{CaptchaError, Result};

/// Строка индекса
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IndexRow {
    pub file: String,
    pub label: String,
}

/// Писатель индекса
pub struct IndexWriter {
    writer: csv::Writer<File>,
    path: PathBuf,
    rows: usize,
}

impl IndexWriter {
    /// Создание (или пересоздание) индекса с заголовком
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path).map_err(|e| CaptchaError::io("creating index file", &path, e))?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(file);
        writer.write_record(["file", "label"])?;
        writer
            .flush()
            .map_err(|e| CaptchaError::io("writing index header", &path, e))?;

        Ok(Self {
            writer,
            path,
            rows: 0,
        })
    }

    /// Добавление строки `(filename, label)`
    pub fn append(&mut self, filename: &str, label: &str) -> Result<()> {
        self.writer.write_record([filename, label])?;
        self.writer
            .flush()
            .map_err(|e| CaptchaError::io("appending index row", &self.path, e))?;
        self.rows += 1;
        Ok(())
    }

    /// Количество строк данных (без заголовка)
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Чтение индекса целиком
pub fn read_index(path: impl AsRef<Path>) -> Result<Vec<IndexRow>> {
    let mut reader = csv::Reader::from_path(path.as_ref())?;
    let rows = reader.deserialize().collect::<std::result::Result<Vec<IndexRow>, _>>()?;
    Ok(rows)
}
