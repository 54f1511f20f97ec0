//! Generator of a synthetic captcha dataset
//!
//! Usage: cargo run -p captcha-core --example gen_captchas

use captcha_core::{
    CharClass, CharsetConfig, DatasetConfig, DatasetGenerator, LengthPolicy, OutputLayout,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .init();

    let config = DatasetConfig {
        charset: CharsetConfig::with_classes(&[
            CharClass::Digits,
            CharClass::Uppercase,
            CharClass::Lowercase,
        ]),
        length: LengthPolicy::Range { min: 3, max: 8 },
        count: 200,
        output: OutputLayout::timestamped("captchas_output"),
        ..DatasetConfig::default()
    };

    let generator = DatasetGenerator::new(config)?;
    let summary = generator.run()?;

    println!("{}", summary);
    Ok(())
}
