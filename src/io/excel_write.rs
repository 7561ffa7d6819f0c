use std::io::Write;
use std::path::Path;

use rust_xlsxwriter::{Format, FormatBorder, Workbook, Worksheet, XlsxError};
use tempfile::NamedTempFile;
use tracing::{debug, instrument};

use crate::error::{Result, ToolError};
use crate::model::{Cell, SheetTable, WorkbookData};

/// Writes the provided workbook data to the given path.
///
/// The file is rendered in memory and moved into place only once it is
/// complete, so a failure never leaves a truncated workbook behind.
#[instrument(
    level = "info",
    skip_all,
    fields(output = %path.display(), sheet_count = workbook.sheets.len())
)]
pub fn write_workbook(path: &Path, workbook: &WorkbookData) -> Result<()> {
    let mut workbook_writer = Workbook::new();
    let header_format = Format::new().set_bold().set_border(FormatBorder::Thin);

    for sheet in &workbook.sheets {
        let worksheet = workbook_writer.add_worksheet();
        worksheet.set_name(&sheet.sheet_name)?;
        write_sheet(worksheet, sheet, &header_format)?;
        debug!(sheet = %sheet.sheet_name, "sheet rendered");
    }

    let buffer = workbook_writer.save_to_buffer()?;
    persist(path, &buffer)
}

fn write_sheet(worksheet: &mut Worksheet, sheet: &SheetTable, header_format: &Format) -> Result<()> {
    let table = &sheet.table;

    worksheet.write_string_with_format(0, 0, &table.index_name, header_format)?;
    for (col_idx, header) in table.columns.iter().enumerate() {
        worksheet.write_string_with_format(0, excel_col(col_idx)?, header, header_format)?;
    }

    for (row_idx, (label, row)) in table.index.iter().zip(&table.rows).enumerate() {
        let sheet_row = excel_row(row_idx)?;
        worksheet.write_string_with_format(sheet_row, 0, label, header_format)?;

        for (col_idx, cell) in row.iter().enumerate() {
            let sheet_col = excel_col(col_idx)?;
            match cell {
                Cell::Number(value) => {
                    worksheet.write_number(sheet_row, sheet_col, *value)?;
                }
                Cell::Text(value) => {
                    worksheet.write_string(sheet_row, sheet_col, value)?;
                }
                Cell::Empty => {}
            }
        }
    }

    Ok(())
}

/// Worksheet column of the `col_idx`-th sample, after the index column.
fn excel_col(col_idx: usize) -> Result<u16> {
    col_idx
        .checked_add(1)
        .and_then(|col| u16::try_from(col).ok())
        .ok_or(ToolError::ExcelWrite(XlsxError::RowColumnLimitError))
}

/// Worksheet row of the `row_idx`-th taxon, after the header row.
fn excel_row(row_idx: usize) -> Result<u32> {
    row_idx
        .checked_add(1)
        .and_then(|row| u32::try_from(row).ok())
        .ok_or(ToolError::ExcelWrite(XlsxError::RowColumnLimitError))
}

fn persist(path: &Path, buffer: &[u8]) -> Result<()> {
    let write_error = |source: std::io::Error| ToolError::Write {
        path: path.to_path_buf(),
        source,
    };

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut staged = NamedTempFile::new_in(parent).map_err(write_error)?;
    staged.write_all(buffer).map_err(write_error)?;
    staged.as_file().sync_all().map_err(write_error)?;
    staged
        .persist(path)
        .map_err(|err| write_error(err.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_positions_follow_headers() {
        assert_eq!(excel_col(0).expect("column in range"), 1);
        assert_eq!(excel_row(9).expect("row in range"), 10);
    }

    #[test]
    fn out_of_range_positions_are_errors() {
        assert!(matches!(
            excel_col(usize::from(u16::MAX)),
            Err(ToolError::ExcelWrite(XlsxError::RowColumnLimitError))
        ));
        assert!(matches!(
            excel_row(u32::MAX as usize),
            Err(ToolError::ExcelWrite(XlsxError::RowColumnLimitError))
        ));
    }
}
