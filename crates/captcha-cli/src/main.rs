//! Captcha dataset generator CLI
//!
//! Usage: captcha-gen --classes digits,upper --min-length 3 --max-length 8 -n 200

mod args;

use anyhow::Context;
use captcha_core::DatasetGenerator;
use clap::Parser;

use crate::args::Args;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_level = if args.quiet { "warn" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let config = args.dataset_config()?;

    if args.print_config {
        println!(
            "{}",
            serde_json::to_string_pretty(&config).context("serializing config")?
        );
        return Ok(());
    }

    log::info!("Captcha generator v{}", captcha_core::VERSION);

    let generator = DatasetGenerator::new(config).context("invalid dataset configuration")?;
    let summary = generator.run().context("dataset generation failed")?;

    println!("{}", summary);
    Ok(())
}
