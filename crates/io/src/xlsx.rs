// Excel export (xlsx only).
//
// Presentation snapshot of one run: one worksheet per table, header row bold
// and frozen. Not meant to be read back into the engine.

use std::path::Path;
use std::time::Instant;

use chrono::{DateTime, Local};
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use sheetjoin_recon::model::RunReport;

use crate::table::{workbook_tables, Cell, Table};

/// Column width for the fixed leading columns (ID, Name, ...), in characters.
const WIDE_COLUMN: f64 = 14.0;
/// Column width for the narrow per-slot columns.
const SLOT_COLUMN: f64 = 8.0;

/// Result of an Excel export operation
#[derive(Debug, Default)]
pub struct ExportResult {
    /// Sheet names in workbook order
    pub sheets: Vec<String>,
    /// Body rows written, summed over all sheets
    pub rows_exported: usize,
    /// Export duration in milliseconds
    pub export_duration_ms: u128,
}

impl ExportResult {
    /// Returns a summary message suitable for display
    pub fn summary(&self) -> String {
        format!(
            "{} sheet{}, {} rows",
            self.sheets.len(),
            if self.sheets.len() == 1 { "" } else { "s" },
            self.rows_exported
        )
    }
}

/// Timestamped workbook name: `<prefix>_<dd-mm-YYYY_HH-MM>.xlsx`.
pub fn file_name(prefix: &str, at: DateTime<Local>) -> String {
    format!("{}_{}.xlsx", prefix, at.format("%d-%m-%Y_%H-%M"))
}

/// Export a run report to XLSX.
///
/// # Returns
/// * `Ok(ExportResult)` - Export statistics
/// * `Err(String)` - Error message if export failed
pub fn export(report: &RunReport, unidentified_room: &str, path: &Path) -> Result<ExportResult, String> {
    export_tables(&workbook_tables(report, unidentified_room), path)
}

/// Export prebuilt tables, one worksheet each, in the given order.
pub fn export_tables(tables: &[Table], path: &Path) -> Result<ExportResult, String> {
    let start_time = Instant::now();
    let mut result = ExportResult::default();
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    for table in tables {
        let worksheet = workbook
            .add_worksheet()
            .set_name(&table.name)
            .map_err(|e| format!("Failed to create sheet '{}': {}", table.name, e))?;

        write_table(worksheet, table, &header_format)
            .map_err(|e| format!("Failed to write sheet '{}': {}", table.name, e))?;

        result.rows_exported += table.rows.len();
        result.sheets.push(table.name.clone());
    }

    workbook
        .save(path)
        .map_err(|e| format!("Failed to save XLSX file: {}", e))?;

    result.export_duration_ms = start_time.elapsed().as_millis();
    log::info!("wrote {} ({})", path.display(), result.summary());
    Ok(result)
}

fn write_table(
    worksheet: &mut Worksheet,
    table: &Table,
    header_format: &Format,
) -> Result<(), XlsxError> {
    for (col, header) in table.headers.iter().enumerate() {
        let col = u16::try_from(col).map_err(|_| XlsxError::RowColumnLimitError)?;
        worksheet.write_string_with_format(0, col, header.as_str(), header_format)?;
        let width = if header.starts_with("Slot") { SLOT_COLUMN } else { WIDE_COLUMN };
        worksheet.set_column_width(col, width)?;
    }

    for (row_idx, row) in table.rows.iter().enumerate() {
        let row32 = u32::try_from(row_idx + 1).map_err(|_| XlsxError::RowColumnLimitError)?;
        for (col, cell) in row.iter().enumerate() {
            let col16 = u16::try_from(col).map_err(|_| XlsxError::RowColumnLimitError)?;
            match cell {
                Cell::Text(s) => {
                    worksheet.write_string(row32, col16, s.as_str())?;
                }
                Cell::Number(n) => {
                    worksheet.write_number(row32, col16, *n)?;
                }
                Cell::Empty => {}
            }
        }
    }

    worksheet.set_freeze_panes(1, 0)?;
    Ok(())
}
