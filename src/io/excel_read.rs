use std::path::Path;

use calamine::{DataType, Range, Reader, Xlsx, open_workbook};
use serde::Serialize;

use crate::error::{Result, ToolError};
use crate::model::{Cell, Table};

/// Shape of one worksheet, as reported by the `inspect` command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetSummary {
    pub name: String,
    pub taxa: usize,
    pub samples: usize,
}

/// Reads every sheet of a workbook written by
/// [`excel_write`](crate::io::excel_write), in workbook order.
pub fn read_tables(path: &Path) -> Result<Vec<(String, Table)>> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;

    let mut tables = Vec::new();
    for name in workbook.sheet_names().to_owned() {
        let range = workbook
            .worksheet_range(&name)
            .ok_or_else(|| ToolError::InvalidWorkbook(format!("missing sheet '{name}'")))??;
        let table = range_to_table(&name, &range)?;
        tables.push((name, table));
    }

    Ok(tables)
}

/// Lists the sheets of a workbook with their taxon and sample counts.
pub fn summarize(path: &Path) -> Result<Vec<SheetSummary>> {
    Ok(read_tables(path)?
        .into_iter()
        .map(|(name, table)| SheetSummary {
            name,
            taxa: table.index.len(),
            samples: table.columns.len(),
        })
        .collect())
}

fn range_to_table(name: &str, range: &Range<DataType>) -> Result<Table> {
    let mut rows = range.rows();
    let header = rows
        .next()
        .ok_or_else(|| ToolError::InvalidWorkbook(format!("sheet '{name}' is empty")))?;

    let index_name = cell_to_string(header.first());
    if index_name.is_empty() {
        return Err(ToolError::InvalidWorkbook(format!(
            "sheet '{name}' has no index header"
        )));
    }
    let columns: Vec<String> = header
        .iter()
        .skip(1)
        .map(|cell| cell_to_string(Some(cell)))
        .collect();

    let mut table = Table {
        index_name,
        index: Vec::new(),
        columns,
        rows: Vec::new(),
    };

    for row in rows {
        table.index.push(cell_to_string(row.first()));
        let mut cells: Vec<Cell> = row.iter().skip(1).map(to_cell).collect();
        cells.resize(table.columns.len(), Cell::Empty);
        table.rows.push(cells);
    }

    Ok(table)
}

fn to_cell(cell: &DataType) -> Cell {
    match cell {
        DataType::Float(value) => Cell::Number(*value),
        DataType::Int(value) => Cell::Number(*value as f64),
        DataType::Empty => Cell::Empty,
        other => Cell::Text(cell_to_string(Some(other))),
    }
}

fn cell_to_string(cell: Option<&DataType>) -> String {
    match cell {
        Some(DataType::String(value)) => value.clone(),
        Some(DataType::Float(value)) => value.to_string(),
        Some(DataType::Int(value)) => value.to_string(),
        Some(DataType::Bool(value)) => value.to_string(),
        Some(DataType::Empty) | None => String::new(),
        Some(other) => other.to_string(),
    }
}
