//! Модуль генерации датасета
//!
//! Конфигурация проверяется при создании генератора: неизвестный бэкенд,
//! пустой алфавит или неверная длина отклоняются до создания файлов.
//! Запуск последовательно создаёт N образцов; любая ошибка прерывает запуск,
//! уже записанные файлы остаются на диске.

use std::fmt;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::charset::CharsetConfig;
use crate::index::IndexWriter;
use crate::label::{LabelSampler, LengthPolicy};
use crate::rendering::{Backend, CaptchaRenderer, RenderConfig, Renderer};
use crate::storage::{ContentAddress, OutputLayout};
use crate::{ConfigError, Result};

/// Конфигурация датасета
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DatasetConfig {
    /// Классы символов алфавита
    pub charset: CharsetConfig,
    /// Длина меток
    pub length: LengthPolicy,
    /// Количество образцов
    pub count: usize,
    /// Имя бэкенда отрисовки
    pub backend: String,
    /// Куда писать изображения и индекс
    pub output: OutputLayout,
    /// Параметры отрисовки
    pub render: RenderConfig,
    /// Seed для воспроизводимых запусков
    pub seed: Option<u64>,
    /// Показывать прогресс-бар
    pub show_progress: bool,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            charset: CharsetConfig::default(),
            length: LengthPolicy::default(),
            count: 1,
            backend: Backend::default().name().to_string(),
            output: OutputLayout::default(),
            render: RenderConfig::default(),
            seed: None,
            show_progress: true,
        }
    }
}

/// Один сгенерированный образец (в памяти)
#[derive(Debug, Clone)]
pub struct Sample {
    pub label: String,
    pub address: ContentAddress,
}

/// Итог запуска
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub count: usize,
    pub backend: Backend,
    pub image_dir: PathBuf,
    pub index_path: PathBuf,
    pub elapsed: Duration,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Generated {} captchas ({}) in {:.2?} -> {}, index {}",
            self.count,
            self.backend,
            self.elapsed,
            self.image_dir.display(),
            self.index_path.display()
        )
    }
}

/// Генератор датасета
#[derive(Debug, Clone)]
pub struct DatasetGenerator {
    sampler: LabelSampler,
    renderer: CaptchaRenderer,
    layout: OutputLayout,
    count: usize,
    seed: Option<u64>,
    show_progress: bool,
}

impl DatasetGenerator {
    /// Проверка конфигурации и создание генератора
    pub fn new(config: DatasetConfig) -> Result<Self, ConfigError> {
        let backend: Backend = config.backend.parse()?;
        config.render.validate()?;
        let alphabet = config.charset.alphabet()?;
        let sampler = LabelSampler::new(alphabet, config.length)?;

        Ok(Self {
            sampler,
            renderer: backend.renderer(config.render),
            layout: config.output,
            count: config.count,
            seed: config.seed,
            show_progress: config.show_progress,
        })
    }

    pub fn sampler(&self) -> &LabelSampler {
        &self.sampler
    }

    pub fn layout(&self) -> &OutputLayout {
        &self.layout
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Запуск с RNG из seed (или из энтропии ОС)
    pub fn run(&self) -> Result<RunSummary> {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.run_with_rng(&mut rng)
    }

    /// Запуск с внешним RNG
    pub fn run_with_rng<R: RngCore>(&self, rng: &mut R) -> Result<RunSummary> {
        let start = Instant::now();
        let backend = self.renderer.backend();
        log::info!(
            "Generating {} captchas with {} backend, alphabet of {} chars, length {:?}",
            self.count,
            backend,
            self.sampler.alphabet().len(),
            self.sampler.length_policy()
        );

        self.layout.prepare()?;
        let mut index = IndexWriter::create(&self.layout.index_path)?;
        let progress = self.progress_bar();

        for i in 0..self.count {
            let sample = self.generate_sample(rng)?;
            sample.address.write_to(&self.layout.image_dir)?;
            index.append(&sample.address.filename, &sample.label)?;

            log::debug!("Sample #{}: {}", i, sample.address.filename);
            progress.inc(1);
        }

        progress.finish_and_clear();

        let summary = RunSummary {
            count: index.rows(),
            backend,
            image_dir: self.layout.image_dir.clone(),
            index_path: self.layout.index_path.clone(),
            elapsed: start.elapsed(),
        };
        log::info!("{}", summary);

        Ok(summary)
    }

    /// Генерация одного образца без записи на диск
    pub fn generate_sample<R: RngCore>(&self, rng: &mut R) -> Result<Sample> {
        let label = self.sampler.sample(rng);
        let image = self.renderer.render(&label, rng)?;
        let address = ContentAddress::encode(&label, &image)?;

        Ok(Sample { label, address })
    }

    fn progress_bar(&self) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(self.count as u64);
        match ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} ({percent}%) {msg}")
        {
            Ok(style) => pb.set_style(style.progress_chars("##-")),
            Err(e) => log::warn!("Invalid progress template: {}", e),
        }
        pb.set_message("captchas");
        pb
    }
}
