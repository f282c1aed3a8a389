use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::CalError;
use crate::types::{CalibrationCurve, Channel};

/// First line of every generated config file.
pub const HEADER_COMMENT: &str = "# Test comment";

/// Config file consumed by the sensor service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigRecord {
    pub influxdb: InfluxDbSettings,
    pub serial: SerialSettings,
    pub calibration: CalibrationSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InfluxDbSettings {
    pub endpoint: String,
    pub database_name: String,
    pub token: String,
    pub site_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialSettings {
    pub port: String,
    pub baud: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationSection {
    pub voltage_main: CalibrationCurve,
    pub voltage_amp: CalibrationCurve,
    pub power_forward: CalibrationCurve,
    pub power_reverse: CalibrationCurve,
}

/// Connection settings copied verbatim into the config. Nothing here is
/// contacted; the token is a placeholder meant to be edited afterwards.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StaticSettings {
    pub influxdb: InfluxDbSettings,
    pub serial: SerialSettings,
}

impl Default for InfluxDbSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://influxdb.kg5key.com:443".to_string(),
            database_name: "repeaterpi".to_string(),
            token: "REPLACEME".to_string(),
            site_name: "kg5key".to_string(),
        }
    }
}

impl Default for SerialSettings {
    fn default() -> Self {
        Self {
            port: "/dev/ttyACM0".to_string(),
            baud: 9600,
        }
    }
}

impl StaticSettings {
    /// Reads `[influxdb]` / `[serial]` from a TOML file, defaults filling any gaps.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CalError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| CalError::io(path, e))?;
        let settings: StaticSettings = toml::from_str(&content)?;
        log::info!("Loaded static settings from {}", path.display());
        Ok(settings)
    }
}

impl CalibrationSection {
    pub fn curve(&self, channel: Channel) -> &CalibrationCurve {
        match channel {
            Channel::VoltageMain => &self.voltage_main,
            Channel::VoltageAmp => &self.voltage_amp,
            Channel::PowerForward => &self.power_forward,
            Channel::PowerReverse => &self.power_reverse,
        }
    }
}

/// Combines the caller's static settings with the fitted curves.
pub fn assemble(settings: &StaticSettings, calibration: CalibrationSection) -> ConfigRecord {
    ConfigRecord {
        influxdb: settings.influxdb.clone(),
        serial: settings.serial.clone(),
        calibration,
    }
}

impl ConfigRecord {
    /// File contents: the header comment followed by the TOML tables.
    pub fn to_toml(&self) -> Result<String, CalError> {
        let body = toml::to_string(self)?;
        Ok(format!("{}\n{}", HEADER_COMMENT, body))
    }

    /// Writes the config, replacing whatever is at `path`.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<(), CalError> {
        let path = path.as_ref();
        let content = self.to_toml()?;
        fs::write(path, content).map_err(|e| CalError::io(path, e))?;
        log::info!("Wrote config to {}", path.display());
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CalError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| CalError::io(path, e))?;
        Ok(toml::from_str(&content)?)
    }
}
