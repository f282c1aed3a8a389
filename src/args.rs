use clap::Parser;
use std::path::PathBuf;

use crate::config::StaticSettings;

#[derive(Parser, Debug)]
#[command(author, version, about = "Fit sensorboard calibration curves and write config.toml", long_about = None)]
pub struct Args {
    /// Workbook with the Voltage, RF Forward and RF Reverse sheets
    #[arg(short, long, default_value = "Sensorboard_SN0.xlsx")]
    pub workbook: PathBuf,

    /// Config file to (over)write
    #[arg(short, long, default_value = "config.toml")]
    pub output: PathBuf,

    /// TOML file with [influxdb] / [serial] values to embed
    #[arg(long)]
    pub settings: Option<PathBuf>,

    /// Also write a JSON fit report here
    #[arg(long)]
    pub report: Option<PathBuf>,

    #[arg(long)]
    pub endpoint: Option<String>,

    #[arg(long)]
    pub database_name: Option<String>,

    /// InfluxDB token (defaults to a placeholder to edit by hand)
    #[arg(long)]
    pub token: Option<String>,

    #[arg(long)]
    pub site_name: Option<String>,

    /// Serial port of the sensorboard
    #[arg(long)]
    pub port: Option<String>,

    #[arg(long)]
    pub baud: Option<u32>,
}

impl Args {
    /// Applies the per-field flags on top of `base`.
    pub fn apply_overrides(&self, mut base: StaticSettings) -> StaticSettings {
        if let Some(v) = &self.endpoint {
            base.influxdb.endpoint = v.clone();
        }
        if let Some(v) = &self.database_name {
            base.influxdb.database_name = v.clone();
        }
        if let Some(v) = &self.token {
            base.influxdb.token = v.clone();
        }
        if let Some(v) = &self.site_name {
            base.influxdb.site_name = v.clone();
        }
        if let Some(v) = &self.port {
            base.serial.port = v.clone();
        }
        if let Some(v) = self.baud {
            base.serial.baud = v;
        }
        base
    }
}
