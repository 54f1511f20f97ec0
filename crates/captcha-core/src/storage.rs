//! Модуль хранения образцов
//!
//! Изображение кодируется в PNG в памяти, имя файла строится из метки и
//! SHA-1 закодированных байтов. На диск пишутся ровно те байты, от которых
//! посчитан хеш.

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::{GrayImage, ImageFormat};
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};

use crate::{CaptchaError, Result};

/// Расширение файлов изображений
pub const IMAGE_EXTENSION: &str = "png";

/// Имя индексного файла внутри каталога проекта
pub const INDEX_FILE_NAME: &str = "dataframe.csv";

/// Каталог изображений внутри каталога проекта
pub const IMAGE_DIR_NAME: &str = "images";

/// Закодированное изображение с контентным адресом
#[derive(Debug, Clone)]
pub struct ContentAddress {
    /// SHA-1 в нижнем регистре (40 hex-символов)
    pub hash: String,
    /// Имя файла `{label}_{hash}.png`
    pub filename: String,
    /// PNG-байты
    pub bytes: Vec<u8>,
}

impl ContentAddress {
    /// Кодирование изображения и вычисление адреса
    pub fn encode(label: &str, image: &GrayImage) -> Result<Self> {
        let bytes = encode_png(image)?;
        let hash = sha1_hex(&bytes);
        let filename = format!("{}_{}.{}", label, hash, IMAGE_EXTENSION);

        Ok(Self {
            hash,
            filename,
            bytes,
        })
    }

    /// Запись в каталог изображений, возвращает полный путь
    pub fn write_to(&self, image_dir: &Path) -> Result<PathBuf> {
        let path = image_dir.join(&self.filename);
        fs::write(&path, &self.bytes).map_err(|e| CaptchaError::io("writing image", &path, e))?;
        Ok(path)
    }
}

/// Кодирование в PNG без записи на диск
pub fn encode_png(image: &GrayImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

/// SHA-1 в hex
pub fn sha1_hex(bytes: &[u8]) -> String {
    hex::encode(Sha1::digest(bytes))
}

/// Расположение выходных файлов
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutputLayout {
    /// Каталог изображений
    pub image_dir: PathBuf,
    /// Путь к индексному CSV
    pub index_path: PathBuf,
}

impl Default for OutputLayout {
    fn default() -> Self {
        Self::in_dir("captchas_output")
    }
}

impl OutputLayout {
    /// `project_dir/images` и `project_dir/dataframe.csv`
    pub fn in_dir(project_dir: impl AsRef<Path>) -> Self {
        let project_dir = project_dir.as_ref();
        Self {
            image_dir: project_dir.join(IMAGE_DIR_NAME),
            index_path: project_dir.join(INDEX_FILE_NAME),
        }
    }

    /// Отдельный подкаталог запуска с меткой локального времени
    pub fn timestamped(root: impl AsRef<Path>) -> Self {
        let stamp = chrono::Local::now().format("%Y-%m-%d_%H-%M-%S").to_string();
        Self::in_dir(root.as_ref().join(stamp))
    }

    /// Подготовка каталогов к запуску
    ///
    /// Существующий каталог изображений удаляется целиком и создаётся заново.
    /// Индексный файл пересоздаётся вызывающей стороной.
    pub fn prepare(&self) -> Result<()> {
        if self.image_dir.exists() {
            log::info!("Removing previous output in {:?}", self.image_dir);
            fs::remove_dir_all(&self.image_dir)
                .map_err(|e| CaptchaError::io("removing image directory", &self.image_dir, e))?;
        }

        fs::create_dir_all(&self.image_dir)
            .map_err(|e| CaptchaError::io("creating image directory", &self.image_dir, e))?;

        if let Some(parent) = self.index_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| CaptchaError::io("creating index directory", parent, e))?;
        }

        Ok(())
    }
}
