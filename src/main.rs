use anyhow::Context;
use clap::Parser;
use colored::*;

use sensorboard_cal::args::Args;
use sensorboard_cal::config::StaticSettings;
use sensorboard_cal::pipeline::{self, RunOptions};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    // 0. Static settings: file (if any), then flags
    let base = match &args.settings {
        Some(path) => StaticSettings::load(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => StaticSettings::default(),
    };
    let settings = args.apply_overrides(base);

    let options = RunOptions {
        workbook: args.workbook.clone(),
        output: args.output.clone(),
        settings,
        report: args.report.clone(),
    };

    // 1. Load, fit, write
    let result = pipeline::run(&options)
        .with_context(|| format!("Calibration from {} failed", options.workbook.display()))?;

    // 2. Summary
    result.report.print_summary();
    if result.config.influxdb.token == "REPLACEME" {
        println!("{}", "InfluxDB token is still the REPLACEME placeholder, edit it before deploying.".yellow());
    }
    println!("{}", format!("Data saved to {}", options.output.display()).green());

    Ok(())
}
