//! Аргументы командной строки
//!
//! Флаги переопределяют значения из JSON-конфига.

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context};
use captcha_core::{CharClass, CharsetConfig, DatasetConfig, LengthPolicy, OutputLayout};
use clap::{Parser, ValueEnum};

/// Корень для запусков с меткой времени
pub const DEFAULT_ROOT: &str = "captchas_output";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ClassArg {
    Digits,
    #[value(alias = "uppercase")]
    Upper,
    #[value(alias = "lowercase")]
    Lower,
    Specials,
}

impl From<ClassArg> for CharClass {
    fn from(arg: ClassArg) -> Self {
        match arg {
            ClassArg::Digits => CharClass::Digits,
            ClassArg::Upper => CharClass::Uppercase,
            ClassArg::Lower => CharClass::Lowercase,
            ClassArg::Specials => CharClass::Specials,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "captcha-gen", version, about = "Generate synthetic captcha datasets")]
pub struct Args {
    /// JSON file with a dataset configuration
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Character classes of the alphabet (comma separated)
    #[arg(long, value_enum, value_delimiter = ',')]
    pub classes: Vec<ClassArg>,

    /// Number of captchas to generate
    #[arg(short = 'n', long)]
    pub count: Option<usize>,

    /// Fixed label length
    #[arg(short, long, conflicts_with_all = ["min_length", "max_length"])]
    pub length: Option<usize>,

    /// Minimum label length (inclusive)
    #[arg(long, requires = "max_length")]
    pub min_length: Option<usize>,

    /// Maximum label length (inclusive)
    #[arg(long, requires = "min_length")]
    pub max_length: Option<usize>,

    /// Rendering backend: distorted or plain
    #[arg(short, long)]
    pub backend: Option<String>,

    /// Project directory (images/ and dataframe.csv inside)
    #[arg(short, long, conflicts_with = "root")]
    pub output: Option<PathBuf>,

    /// Root for a timestamped project directory
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Seed for reproducible datasets
    #[arg(long)]
    pub seed: Option<u64>,

    /// Hide the progress bar
    #[arg(short, long)]
    pub quiet: bool,

    /// Print the effective configuration as JSON and exit
    #[arg(long)]
    pub print_config: bool,
}

impl Args {
    /// Итоговая конфигурация: файл (или значения по умолчанию) плюс флаги
    pub fn dataset_config(&self) -> anyhow::Result<DatasetConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("reading config {}", path.display()))?;
                let value: serde_json::Value = serde_json::from_str(&text)
                    .with_context(|| format!("parsing config {}", path.display()))?;
                // Без явного `output` файл ведёт себя как запуск без конфига
                let has_output = value.get("output").is_some();
                let mut config = serde_json::from_value::<DatasetConfig>(value)
                    .with_context(|| format!("parsing config {}", path.display()))?;
                if !has_output {
                    config.output = OutputLayout::timestamped(DEFAULT_ROOT);
                }
                config
            }
            None => DatasetConfig {
                output: OutputLayout::timestamped(DEFAULT_ROOT),
                ..DatasetConfig::default()
            },
        };

        if !self.classes.is_empty() {
            let classes: Vec<CharClass> = self.classes.iter().map(|c| (*c).into()).collect();
            config.charset = CharsetConfig::with_classes(&classes);
        }

        match (self.length, self.min_length, self.max_length) {
            (Some(length), _, _) => config.length = LengthPolicy::Fixed(length),
            (None, Some(min), Some(max)) => config.length = LengthPolicy::Range { min, max },
            (None, None, None) => {}
            _ => bail!("--min-length and --max-length must be given together"),
        }

        if let Some(count) = self.count {
            config.count = count;
        }
        if let Some(backend) = &self.backend {
            config.backend = backend.clone();
        }
        if let Some(dir) = &self.output {
            config.output = OutputLayout::in_dir(dir);
        } else if let Some(root) = &self.root {
            config.output = OutputLayout::timestamped(root);
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if self.quiet {
            config.show_progress = false;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("captcha-gen").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = parse(&[]).dataset_config().unwrap();
        assert_eq!(config.count, 1);
        assert_eq!(config.length, LengthPolicy::Fixed(4));
        assert_eq!(config.backend, "distorted");
        assert!(config.output.image_dir.starts_with(DEFAULT_ROOT));
    }

    #[test]
    fn test_overrides() {
        let config = parse(&[
            "--classes",
            "digits,upper",
            "-n",
            "50",
            "--min-length",
            "3",
            "--max-length",
            "5",
            "--backend",
            "plain",
            "--output",
            "run1",
            "--seed",
            "7",
            "--quiet",
        ])
        .dataset_config()
        .unwrap();

        assert_eq!(
            config.charset,
            CharsetConfig::with_classes(&[CharClass::Digits, CharClass::Uppercase])
        );
        assert_eq!(config.count, 50);
        assert_eq!(config.length, LengthPolicy::Range { min: 3, max: 5 });
        assert_eq!(config.backend, "plain");
        assert_eq!(config.output, OutputLayout::in_dir("run1"));
        assert_eq!(config.seed, Some(7));
        assert!(!config.show_progress);
    }

    #[test]
    fn test_length_conflicts() {
        let result = Args::try_parse_from(["captcha-gen", "--length", "4", "--min-length", "2"]);
        assert!(result.is_err());

        let result = Args::try_parse_from(["captcha-gen", "--min-length", "2"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_class_rejected() {
        let result = Args::try_parse_from(["captcha-gen", "--classes", "digits,emoji"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_config_file_with_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dataset.json");
        std::fs::write(
            &path,
            r#"{"count": 10, "backend": "plain", "length": {"fixed": 6}}"#,
        )
        .unwrap();

        let config = parse(&["--config", path.to_str().unwrap(), "-n", "3"])
            .dataset_config()
            .unwrap();

        assert_eq!(config.count, 3);
        assert_eq!(config.backend, "plain");
        assert_eq!(config.length, LengthPolicy::Fixed(6));
        // Файл без `output` получает подкаталог с меткой времени
        assert_ne!(config.output, OutputLayout::default());
        assert!(config.output.image_dir.starts_with(DEFAULT_ROOT));
        assert_eq!(config.output.image_dir.components().count(), 3);
    }

    #[test]
    fn test_config_file_output_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dataset.json");
        std::fs::write(
            &path,
            r#"{"output": {"image_dir": "data/img", "index_path": "data/labels.csv"}}"#,
        )
        .unwrap();

        let config = parse(&["--config", path.to_str().unwrap()])
            .dataset_config()
            .unwrap();

        assert_eq!(config.output.image_dir, PathBuf::from("data/img"));
        assert_eq!(config.output.index_path, PathBuf::from("data/labels.csv"));
    }

    #[test]
    fn test_bad_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = parse(&["--config", path.to_str().unwrap()])
            .dataset_config()
            .unwrap_err();
        assert!(format!("{:#}", err).contains("parsing config"));
    }
}
