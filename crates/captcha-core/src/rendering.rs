//! Модуль отрисовки капчи
//!
//! Глифы берутся из растрового шрифта 8x8 (`font8x8`) и масштабируются.
//! Бэкенд `distorted` поворачивает и смещает каждый глиф, добавляет
//! линии-помехи, гауссов шум и размытие. Бэкенд `plain` рисует метку
//! без искажений.

use std::fmt;
use std::str::FromStr;

use font8x8::{UnicodeFonts, BASIC_FONTS};
use image::{GrayImage, Luma};
use imageproc::drawing::draw_line_segment_mut;
use imageproc::filter::gaussian_blur_f32;
use imageproc::geometric_transformations::{rotate_about_center, Interpolation};
use imageproc::noise::gaussian_noise_mut;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ConfigError;

/// Сторона глифа в исходном шрифте
const GLYPH_SIZE: u32 = 8;

/// Верхняя граница масштаба глифа
pub const MAX_SCALE: u32 = 64;

/// Верхняя граница полей в пикселях
pub const MAX_PADDING: u32 = 1024;

const BACKGROUND: Luma<u8> = Luma([255]);
const INK: Luma<u8> = Luma([0]);

/// Ошибки отрисовки
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("No glyph for character {0:?}")]
    MissingGlyph(char),

    #[error("Cannot render an empty label")]
    EmptyLabel,
}

/// Параметры отрисовки
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
    /// Масштаб глифа (сторона глифа = 8 * scale пикселей)
    pub scale: u32,
    /// Поля вокруг текста в пикселях
    pub padding: u32,
    /// Максимальный угол поворота глифа в градусах
    pub max_rotation: f32,
    /// Стандартное отклонение гауссова шума (0 - без шума)
    pub noise_stddev: f64,
    /// Количество линий-помех
    pub noise_lines: u32,
    /// Sigma гауссова размытия (0 - без размытия)
    pub blur_sigma: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            scale: 4,
            padding: 10,
            max_rotation: 25.0,
            noise_stddev: 12.0,
            noise_lines: 3,
            blur_sigma: 0.8,
        }
    }
}

impl RenderConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scale == 0 {
            return Err(ConfigError::ZeroScale);
        }
        if self.scale > MAX_SCALE {
            return Err(ConfigError::InvalidRenderParameter("scale exceeds 64"));
        }
        if self.padding > MAX_PADDING {
            return Err(ConfigError::InvalidRenderParameter("padding exceeds 1024"));
        }
        if !self.max_rotation.is_finite() || !self.blur_sigma.is_finite() {
            return Err(ConfigError::InvalidRenderParameter("non-finite value"));
        }
        if self.noise_stddev.is_nan() || self.noise_stddev < 0.0 {
            return Err(ConfigError::InvalidRenderParameter("noise_stddev must be >= 0"));
        }
        Ok(())
    }

    /// Сторона клетки одного символа
    fn cell(&self) -> u32 {
        GLYPH_SIZE.saturating_mul(self.scale)
    }

    /// Размер холста для метки из `length` символов
    pub fn canvas_size(&self, length: usize) -> (u32, u32) {
        let length = u32::try_from(length).unwrap_or(u32::MAX);
        let margins = self.padding.saturating_mul(2);
        let width = length.saturating_mul(self.cell()).saturating_add(margins);
        let height = self.cell().saturating_add(margins);
        (width, height)
    }
}

/// Отрисовка метки в изображение
pub trait Renderer {
    fn render(&self, label: &str, rng: &mut dyn RngCore) -> Result<GrayImage, RenderError>;
}

/// Доступные бэкенды отрисовки
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    #[default]
    Distorted,
    Plain,
}

impl Backend {
    pub const ALL: [Backend; 2] = [Backend::Distorted, Backend::Plain];

    pub fn name(self) -> &'static str {
        match self {
            Backend::Distorted => "distorted",
            Backend::Plain => "plain",
        }
    }

    /// Создание рендерера с заданными параметрами
    pub fn renderer(self, config: RenderConfig) -> CaptchaRenderer {
        match self {
            Backend::Distorted => CaptchaRenderer::Distorted(DistortedRenderer::new(config)),
            Backend::Plain => CaptchaRenderer::Plain(PlainRenderer::new(config)),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Backend {
    type Err = ConfigError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let normalized = name.trim().to_lowercase();
        Backend::ALL
            .iter()
            .copied()
            .find(|backend| backend.name() == normalized)
            .ok_or_else(|| ConfigError::UnknownBackend(name.to_string()))
    }
}

/// Рендерер выбранного бэкенда
#[derive(Debug, Clone)]
pub enum CaptchaRenderer {
    Distorted(DistortedRenderer),
    Plain(PlainRenderer),
}

impl CaptchaRenderer {
    pub fn backend(&self) -> Backend {
        match self {
            CaptchaRenderer::Distorted(_) => Backend::Distorted,
            CaptchaRenderer::Plain(_) => Backend::Plain,
        }
    }
}

impl Renderer for CaptchaRenderer {
    fn render(&self, label: &str, rng: &mut dyn RngCore) -> Result<GrayImage, RenderError> {
        match self {
            CaptchaRenderer::Distorted(renderer) => renderer.render(label, rng),
            CaptchaRenderer::Plain(renderer) => renderer.render(label, rng),
        }
    }
}

/// Рендерер без искажений
#[derive(Debug, Clone)]
pub struct PlainRenderer {
    config: RenderConfig,
}

impl PlainRenderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }
}

impl Renderer for PlainRenderer {
    fn render(&self, label: &str, _rng: &mut dyn RngCore) -> Result<GrayImage, RenderError> {
        let tiles = glyph_tiles(label, self.config.scale)?;
        let (width, height) = self.config.canvas_size(tiles.len());
        let mut canvas = GrayImage::from_pixel(width, height, BACKGROUND);

        let cell = self.config.cell();
        let padding = i64::from(self.config.padding);
        for (i, tile) in tiles.iter().enumerate() {
            let x = padding + i64::from(cell) * i as i64;
            stamp(&mut canvas, tile, x, padding);
        }

        Ok(canvas)
    }
}

/// Рендерер с искажениями
#[derive(Debug, Clone)]
pub struct DistortedRenderer {
    config: RenderConfig,
}

impl DistortedRenderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    fn draw_noise_lines(&self, canvas: &mut GrayImage, rng: &mut dyn RngCore) {
        let (width, height) = canvas.dimensions();
        let (w, h) = (width as f32, height as f32);

        for _ in 0..self.config.noise_lines {
            let start = (rng.gen_range(0.0..w * 0.3), rng.gen_range(0.0..h));
            let end = (rng.gen_range(w * 0.7..w), rng.gen_range(0.0..h));
            let shade = Luma([rng.gen_range(0..=96u8)]);

            // Две соседние линии дают толщину в 2 пикселя
            draw_line_segment_mut(canvas, start, end, shade);
            draw_line_segment_mut(canvas, (start.0, start.1 + 1.0), (end.0, end.1 + 1.0), shade);
        }
    }
}

impl Renderer for DistortedRenderer {
    fn render(&self, label: &str, rng: &mut dyn RngCore) -> Result<GrayImage, RenderError> {
        let tiles = glyph_tiles(label, self.config.scale)?;
        let (width, height) = self.config.canvas_size(tiles.len());
        let mut canvas = GrayImage::from_pixel(width, height, BACKGROUND);

        let cell = self.config.cell();
        let padding = i64::from(self.config.padding);
        let jitter = padding / 2;
        let max_rotation = self.config.max_rotation.abs();

        for (i, tile) in tiles.iter().enumerate() {
            let angle = if max_rotation > 0.0 {
                rng.gen_range(-max_rotation..=max_rotation)
            } else {
                0.0
            };
            let rotated = rotate_about_center(
                tile,
                angle.to_radians(),
                Interpolation::Bilinear,
                BACKGROUND,
            );

            let dx = if jitter > 0 { rng.gen_range(-jitter..=jitter) } else { 0 };
            let dy = if jitter > 0 { rng.gen_range(-jitter..=jitter) } else { 0 };
            let x = padding + i64::from(cell) * i as i64 + dx / 2;
            stamp(&mut canvas, &rotated, x, padding + dy);
        }

        self.draw_noise_lines(&mut canvas, rng);

        if self.config.noise_stddev > 0.0 {
            gaussian_noise_mut(&mut canvas, 0.0, self.config.noise_stddev, rng.next_u64());
        }

        if self.config.blur_sigma > 0.0 {
            canvas = gaussian_blur_f32(&canvas, self.config.blur_sigma);
        }

        Ok(canvas)
    }
}

/// Растр одного символа до масштабирования
fn glyph_bitmap(c: char) -> Result<[u8; 8], RenderError> {
    BASIC_FONTS.get(c).ok_or(RenderError::MissingGlyph(c))
}

/// Масштабированные тайлы всех символов метки
fn glyph_tiles(label: &str, scale: u32) -> Result<Vec<GrayImage>, RenderError> {
    if label.is_empty() {
        return Err(RenderError::EmptyLabel);
    }

    label
        .chars()
        .map(|c| glyph_bitmap(c).map(|bitmap| glyph_tile(&bitmap, scale)))
        .collect()
}

fn glyph_tile(bitmap: &[u8; 8], scale: u32) -> GrayImage {
    let size = GLYPH_SIZE * scale;
    let mut tile = GrayImage::from_pixel(size, size, BACKGROUND);

    for (row, bits) in (0u32..).zip(bitmap.iter()) {
        for col in 0..GLYPH_SIZE {
            // Младший бит - левый пиксель
            if bits & (1 << col) == 0 {
                continue;
            }
            for dy in 0..scale {
                for dx in 0..scale {
                    tile.put_pixel(col * scale + dx, row * scale + dy, INK);
                }
            }
        }
    }

    tile
}

/// Наложение тайла на холст: побеждает более тёмный пиксель
fn stamp(canvas: &mut GrayImage, tile: &GrayImage, x: i64, y: i64) {
    let (width, height) = canvas.dimensions();

    for (tx, ty, pixel) in tile.enumerate_pixels() {
        let cx = x + i64::from(tx);
        let cy = y + i64::from(ty);
        if cx < 0 || cy < 0 || cx >= i64::from(width) || cy >= i64::from(height) {
            continue;
        }

        let target = canvas.get_pixel_mut(cx as u32, cy as u32);
        target.0[0] = target.0[0].min(pixel.0[0]);
    }
}
