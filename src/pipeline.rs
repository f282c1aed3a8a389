use std::collections::HashMap;
use std::path::PathBuf;

use crate::config::{assemble, CalibrationSection, ConfigRecord, StaticSettings};
use crate::error::CalError;
use crate::fit::FitStats;
use crate::report::CalibrationReport;
use crate::types::{CalibrationCurve, Channel, MeasurementTable};
use crate::workbook::{load_table, SheetSource, Workbook};

/// Result of a calibration run, before anything touches disk.
#[derive(Debug, Clone)]
pub struct Calibration {
    pub config: ConfigRecord,
    pub report: CalibrationReport,
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub workbook: PathBuf,
    pub output: PathBuf,
    pub settings: StaticSettings,
    pub report: Option<PathBuf>,
}

/// Load -> fit -> assemble. Writes nothing.
pub fn calibrate<S: SheetSource + ?Sized>(
    source: &mut S,
    settings: &StaticSettings,
) -> Result<Calibration, CalError> {
    // 1. Load every sheet a channel needs (Voltage feeds two channels)
    let mut tables: HashMap<&'static str, MeasurementTable> = HashMap::new();
    for channel in Channel::ALL {
        if tables.contains_key(channel.sheet()) {
            continue;
        }
        let mut columns: Vec<&str> = Vec::new();
        for c in Channel::ALL.iter().filter(|c| c.sheet() == channel.sheet()) {
            for col in [c.raw_column(), c.truth_column()] {
                if !columns.contains(&col) {
                    columns.push(col);
                }
            }
        }
        let table = load_table(&mut *source, channel.sheet(), &columns)?;
        tables.insert(channel.sheet(), table);
    }

    // 2. Fit all four before assembling anything
    let mut report = CalibrationReport::new(&source.label());
    let mut curves = HashMap::new();
    for channel in Channel::ALL {
        let table = &tables[channel.sheet()];
        let (curve, stats) = fit_channel(table, channel)?;
        log::info!(
            "Fitted {} from {} samples (rms residual {:.3e})",
            channel,
            stats.samples,
            stats.rms_residual
        );
        log::debug!("{} coefficients: {:?}", channel, curve.coefficients());
        report.push(channel, curve, stats);
        curves.insert(channel, curve);
    }

    // 3. Assemble
    let calibration = CalibrationSection {
        voltage_main: curves[&Channel::VoltageMain],
        voltage_amp: curves[&Channel::VoltageAmp],
        power_forward: curves[&Channel::PowerForward],
        power_reverse: curves[&Channel::PowerReverse],
    };

    Ok(Calibration {
        config: assemble(settings, calibration),
        report,
    })
}

pub fn fit_channel(
    table: &MeasurementTable,
    channel: Channel,
) -> Result<(CalibrationCurve, FitStats), CalError> {
    let (x, y) = table.pairs(channel.raw_column(), channel.truth_column())?;
    let curve = CalibrationCurve::fit(&x, &y).map_err(|source| CalError::Fit { channel, source })?;
    let stats = FitStats::measure(&curve, &x, &y);
    Ok((curve, stats))
}

/// Full run against a workbook on disk. The config file is only written once
/// every curve has been fitted.
pub fn run(options: &RunOptions) -> Result<Calibration, CalError> {
    let mut workbook = Workbook::open(&options.workbook)?;
    let result = calibrate(&mut workbook, &options.settings)?;

    result.config.write(&options.output)?;
    if let Some(path) = &options.report {
        result.report.save(path)?;
    }
    Ok(result)
}
