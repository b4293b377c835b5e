//! Workbook adapters: calamine for decoding input, rust_xlsxwriter for the
//! normalized output.

use calamine::{open_workbook_auto, Data, Reader};
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use rust_xlsxwriter::{Color, Format, Workbook as XlsxWorkbook, Worksheet, XlsxError};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::error::{AnalysisIssue, ProcessingError};
use crate::models::{HeaderFill, OutputColumn, OutputTable};
use crate::types::{Cell, SheetGrid, Workbook};

pub const OUTPUT_SHEET_NAME: &str = "Processed Data";
const MAX_COLUMN_WIDTH: f64 = 50.0;

/// Decode every worksheet of an .xlsx/.xls file. Cell positions are kept
/// absolute: a used range starting below or right of A1 is padded.
///
/// A sheet that fails to decode is left out with a note on the workbook;
/// the call fails only when no sheet decodes at all.
pub fn read_workbook(path: &Path) -> Result<Workbook, ProcessingError> {
    if !path.exists() {
        return Err(ProcessingError::Open {
            path: path.display().to_string(),
            reason: "file not found".to_string(),
        });
    }
    let mut workbook = open_workbook_auto(path).map_err(|e| ProcessingError::Open {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    let mut sheets = Vec::new();
    let mut notes = Vec::new();
    for name in workbook.sheet_names() {
        let range = match workbook.worksheet_range(&name) {
            Ok(range) => range,
            Err(e) => {
                warn!(sheet = %name, error = %e, "sheet could not be decoded, skipping");
                notes.push(AnalysisIssue::sheet(&name, format!("could not decode sheet: {e}")));
                continue;
            }
        };
        let (row_offset, col_offset) = range
            .start()
            .map(|(r, c)| (r as usize, c as usize))
            .unwrap_or((0, 0));

        let mut rows: Vec<Vec<Cell>> = vec![Vec::new(); row_offset];
        for row in range.rows() {
            let mut cells = vec![Cell::Empty; col_offset];
            cells.extend(row.iter().map(convert_cell));
            rows.push(cells);
        }
        debug!(sheet = %name, rows = rows.len(), "decoded sheet");
        sheets.push(SheetGrid::new(name, rows));
    }
    if sheets.is_empty() && !notes.is_empty() {
        let failed: Vec<&str> = notes.iter().map(|n| n.sheet.as_str()).collect();
        return Err(ProcessingError::SheetRead {
            sheet: failed.join(", "),
            reason: notes[0].message.clone(),
        });
    }
    info!(
        path = %path.display(),
        sheets = sheets.len(),
        skipped = notes.len(),
        "workbook loaded"
    );
    Ok(Workbook::with_notes(sheets, notes))
}

fn convert_cell(data: &Data) -> Cell {
    match data {
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::String(s) if s.trim().is_empty() => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Bool(b) => Cell::Text(b.to_string()),
        Data::DateTime(dt) => match excel_serial_to_datetime(dt.as_f64()) {
            Some(value) => Cell::Date(value),
            None => Cell::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        _ => Cell::Empty,
    }
}

/// Excel serial day number (1900 system) to a timestamp.
fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round() as i64;
    epoch.checked_add_signed(TimeDelta::try_milliseconds(millis)?)
}

/// `processed_<stem>_<YYYYmmdd_HHMMSS>.xlsx`
pub fn output_file_name(input: &Path, now: NaiveDateTime) -> String {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "workbook".to_string());
    format!("processed_{}_{}.xlsx", stem, now.format("%Y%m%d_%H%M%S"))
}

/// Remove characters that corrupt the sheet XML. Tab and line breaks survive.
fn sanitize_cell(s: &str) -> String {
    s.chars()
        .filter(|&c| {
            let u = c as u32;
            c == '\t' || c == '\n' || c == '\r' || !(u < 0x20 || u == 0x7F || u == 0xFFFE || u == 0xFFFF)
        })
        .collect()
}

fn header_format(fill: HeaderFill) -> Format {
    let background = match fill {
        HeaderFill::Yellow => Color::RGB(0xFFFF00),
        HeaderFill::Red => Color::RGB(0xFF0000),
    };
    Format::new()
        .set_background_color(background)
        .set_font_color(Color::RGB(0x000000))
}

/// Longest header or value in the column plus padding, capped.
fn column_widths(table: &OutputTable) -> Vec<f64> {
    OutputColumn::ALL
        .iter()
        .map(|&column| {
            let longest = table
                .column_values(column)
                .map(|v| v.chars().count())
                .chain(std::iter::once(column.header().chars().count()))
                .max()
                .unwrap_or(0);
            ((longest + 2) as f64).min(MAX_COLUMN_WIDTH)
        })
        .collect()
}

fn write_sheet(worksheet: &mut Worksheet, table: &OutputTable) -> Result<(), XlsxError> {
    worksheet.set_name(OUTPUT_SHEET_NAME)?;
    for (col, width) in column_widths(table).into_iter().enumerate() {
        worksheet.set_column_width(col as u16, width)?;
    }
    for column in OutputColumn::ALL {
        let format = header_format(column.header_fill());
        worksheet.write_string_with_format(0, column.index() as u16, column.header(), &format)?;
    }
    for (row_idx, row) in table.rows().iter().enumerate() {
        let excel_row = (row_idx + 1) as u32;
        for (col_idx, value) in row.values().iter().enumerate() {
            if value.is_empty() {
                continue;
            }
            worksheet.write_string(excel_row, col_idx as u16, sanitize_cell(value))?;
        }
    }
    Ok(())
}

/// Write the normalized table as a single-sheet workbook.
pub fn write_output(table: &OutputTable, path: &Path) -> Result<(), ProcessingError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut workbook = XlsxWorkbook::new();
    let worksheet = workbook.add_worksheet();
    write_sheet(worksheet, table)?;
    workbook.save(path)?;
    info!(path = %path.display(), rows = table.len(), "output written");
    Ok(())
}
