mod audio;
mod cli;
mod config;
mod error;
mod haptics;
mod pipeline;

use anyhow::Result;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

use cli::Cli;
use haptics::classify::Mode;
use pipeline::{PipelineConfig, Split};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let mut cli = Cli::parse();

    if let Some(path) = config::find_config(cli.config.as_deref()) {
        if let Some(cfg) = config::load_config(&path) {
            log::info!("Loaded config from {}", path.display());
            config::merge_into(&mut cli, cfg);
        } else {
            log::warn!("Failed to load config from {}", path.display());
        }
    }

    let config = PipelineConfig {
        sample_rate: cli.sample_rate,
        mode: Mode::from_name(&cli.mode),
        split: Split::parse(&cli.split)?,
        sharpness_factor: cli.sharpness_factor,
        intensity_factor: cli.intensity_factor,
        time_step: cli.time_step,
    };
    config.validate()?;

    for input in &cli.inputs {
        if !input.exists() {
            anyhow::bail!("Input file not found: {}", input.display());
        }
    }

    log::info!("hapticize - audio to haptic pattern converter");
    log::info!(
        "Mode: {:?}, split: {:?}, {}Hz, time step {}s",
        config.mode,
        config.split,
        config.sample_rate,
        config.time_step
    );

    let pb = ProgressBar::new(cli.inputs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} files {msg}")?
            .progress_chars("=>-"),
    );

    let mut failed = 0usize;
    for input in &cli.inputs {
        pb.set_message(input.display().to_string());
        match pipeline::convert_file(input, cli.output_dir.as_deref(), &config) {
            Ok(outputs) => {
                for path in outputs {
                    pb.println(format!("  {}", path.display()));
                }
            }
            Err(err) => {
                log::error!("Failed to convert {}: {:#}", input.display(), err);
                failed += 1;
            }
        }
        pb.inc(1);
    }
    pb.finish_with_message("done");

    if failed > 0 {
        anyhow::bail!("{} of {} files failed", failed, cli.inputs.len());
    }

    log::info!("Done! Converted {} file(s)", cli.inputs.len());
    Ok(())
}
