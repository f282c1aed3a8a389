use chrono::Local;
use colored::*;
use serde::Serialize;
use std::fs;
use std::path::Path;

use crate::error::CalError;
use crate::fit::FitStats;
use crate::types::{CalibrationCurve, Channel};

#[derive(Debug, Clone, Serialize)]
pub struct ChannelReport {
    pub channel: Channel,
    pub coefficients: CalibrationCurve,
    #[serde(flatten)]
    pub stats: FitStats,
}

/// How well each curve fits the bench measurements.
#[derive(Debug, Clone, Serialize)]
pub struct CalibrationReport {
    pub timestamp: String,
    pub workbook: String,
    pub channels: Vec<ChannelReport>,
}

impl CalibrationReport {
    pub fn new(workbook: &str) -> Self {
        Self {
            timestamp: Local::now().to_rfc3339(),
            workbook: workbook.to_string(),
            channels: Vec::new(),
        }
    }

    pub fn push(&mut self, channel: Channel, curve: CalibrationCurve, stats: FitStats) {
        self.channels.push(ChannelReport {
            channel,
            coefficients: curve,
            stats,
        });
    }

    pub fn channel(&self, channel: Channel) -> Option<&ChannelReport> {
        self.channels.iter().find(|c| c.channel == channel)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), CalError> {
        let path = path.as_ref();
        fs::write(path, serde_json::to_string_pretty(self)?).map_err(|e| CalError::io(path, e))?;
        log::info!("Saved fit report to {}", path.display());
        Ok(())
    }

    pub fn print_summary(&self) {
        println!("{:<14} | {:>7} | {:>12} | {:>12} | {:>9}", "Channel", "Samples", "RMS resid", "Max resid", "R^2");
        println!("{}", "-".repeat(66));
        for c in &self.channels {
            let line = format!(
                "{:<14} | {:>7} | {:>12.6} | {:>12.6} | {:>9.6}",
                c.channel, c.stats.samples, c.stats.rms_residual, c.stats.max_residual, c.stats.r_squared
            );
            // A poor fit usually means a mistyped cell in the sheet
            if c.stats.r_squared < 0.99 {
                println!("{}", line.yellow());
            } else {
                println!("{}", line);
            }
        }
    }
}
