use calamine::{open_workbook_auto, Data, Range, Reader, Sheets};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::error::LoadError;
use crate::types::MeasurementTable;

/// Anything that can hand out worksheets by name.
pub trait SheetSource {
    /// Where the sheets came from, as shown in the fit report.
    fn label(&self) -> String {
        "memory".to_string()
    }
    fn sheet_names(&self) -> Vec<String>;
    fn range(&mut self, sheet: &str) -> Result<Range<Data>, LoadError>;
}

/// Spreadsheet file on disk (xlsx, xlsm, xlsb, xls or ods).
pub struct Workbook {
    pub path: PathBuf,
    sheets: Sheets<BufReader<File>>,
}

impl Workbook {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref().to_path_buf();
        let sheets = open_workbook_auto(&path).map_err(|e| LoadError::Open {
            path: path.clone(),
            message: e.to_string(),
        })?;
        log::info!("Opened workbook {}", path.display());
        Ok(Self { path, sheets })
    }
}

impl SheetSource for Workbook {
    fn label(&self) -> String {
        self.path.display().to_string()
    }

    fn sheet_names(&self) -> Vec<String> {
        self.sheets.sheet_names()
    }

    fn range(&mut self, sheet: &str) -> Result<Range<Data>, LoadError> {
        if !self.sheet_names().iter().any(|s| s == sheet) {
            return Err(LoadError::MissingSheet {
                sheet: sheet.to_string(),
                available: self.sheet_names(),
            });
        }
        self.sheets
            .worksheet_range(sheet)
            .map_err(|e| LoadError::Read {
                sheet: sheet.to_string(),
                message: e.to_string(),
            })
    }
}

/// Worksheets held in memory, in insertion order.
#[derive(Default)]
pub struct MemoryWorkbook {
    sheets: Vec<(String, Range<Data>)>,
}

impl MemoryWorkbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sheet(mut self, name: &str, range: Range<Data>) -> Self {
        self.sheets.retain(|(n, _)| n != name);
        self.sheets.push((name.to_string(), range));
        self
    }

    /// Builds a sheet from a header row plus numeric rows. `None` leaves a blank cell.
    pub fn with_rows(self, name: &str, headers: &[&str], rows: &[Vec<Option<f64>>]) -> Self {
        let width = rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(headers.len()))
            .max()
            .unwrap_or(0)
            .max(1);
        let mut range = Range::new((0, 0), (rows.len() as u32, width as u32 - 1));
        for (c, h) in headers.iter().enumerate() {
            range.set_value((0, c as u32), Data::String(h.to_string()));
        }
        for (r, row) in rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                if let Some(v) = cell {
                    range.set_value((r as u32 + 1, c as u32), Data::Float(*v));
                }
            }
        }
        self.with_sheet(name, range)
    }
}

impl SheetSource for MemoryWorkbook {
    fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|(n, _)| n.clone()).collect()
    }

    fn range(&mut self, sheet: &str) -> Result<Range<Data>, LoadError> {
        self.sheets
            .iter()
            .find(|(n, _)| n == sheet)
            .map(|(_, r)| r.clone())
            .ok_or_else(|| LoadError::MissingSheet {
                sheet: sheet.to_string(),
                available: self.sheet_names(),
            })
    }
}

/// Reads the named columns of `sheet`.
///
/// The first non-blank row is the header. Every other requested cell must be
/// blank or numeric (numbers stored as text are accepted).
pub fn load_table<S: SheetSource + ?Sized>(
    source: &mut S,
    sheet: &str,
    columns: &[&str],
) -> Result<MeasurementTable, LoadError> {
    let range = source.range(sheet)?;
    let first_row = range.start().map(|(r, _)| r as usize).unwrap_or(0);

    let mut rows = range.rows().enumerate();
    let header = rows
        .by_ref()
        .find(|(_, row)| row.iter().any(|c| !is_blank(c)));

    let mut table = MeasurementTable::new(sheet);
    let Some((header_idx, header)) = header else {
        return Err(LoadError::MissingColumn {
            sheet: sheet.to_string(),
            column: columns.first().copied().unwrap_or_default().to_string(),
        });
    };

    let mut indices = Vec::with_capacity(columns.len());
    for column in columns {
        let idx = header
            .iter()
            .position(|c| header_text(c).as_deref() == Some(column.trim()))
            .ok_or_else(|| LoadError::MissingColumn {
                sheet: sheet.to_string(),
                column: column.to_string(),
            })?;
        indices.push(idx);
    }

    let mut values: Vec<Vec<Option<f64>>> = vec![Vec::new(); columns.len()];
    for (row_idx, row) in rows {
        for (k, &col) in indices.iter().enumerate() {
            let parsed = match row.get(col) {
                Some(cell) => numeric(cell),
                None => Ok(None),
            };
            let value = parsed.map_err(|text| LoadError::NotNumeric {
                sheet: sheet.to_string(),
                column: columns[k].to_string(),
                row: first_row + row_idx + 1,
                value: text,
            })?;
            values[k].push(value);
        }
    }

    for (column, vals) in columns.iter().zip(values) {
        table.insert_column(column, vals);
    }
    log::info!(
        "Loaded sheet '{}': {} row(s) below header row {}",
        sheet,
        table.rows(),
        first_row + header_idx + 1
    );
    Ok(table)
}

fn is_blank(cell: &Data) -> bool {
    match cell {
        Data::Empty => true,
        Data::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn header_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) => Some(s.trim().to_string()),
        other => Some(other.to_string()),
    }
}

/// Blank -> `Ok(None)`, number -> `Ok(Some)`, anything else -> `Err(cell text)`.
fn numeric(cell: &Data) -> Result<Option<f64>, String> {
    match cell {
        Data::Empty => Ok(None),
        Data::Float(f) => Ok(Some(*f)),
        Data::Int(i) => Ok(Some(*i as f64)),
        Data::String(s) if s.trim().is_empty() => Ok(None),
        Data::String(s) => s.trim().parse::<f64>().map(Some).map_err(|_| s.clone()),
        other => Err(other.to_string()),
    }
}
