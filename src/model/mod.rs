use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

/// Column name every identifier column is normalised to.
pub const TAXON_COLUMN: &str = "Taxon";

/// Whether a table holds absolute counts or relative proportions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Absolute,
    Relative,
}

impl Mode {
    /// Modes in processing order.
    pub const ALL: [Mode; 2] = [Mode::Absolute, Mode::Relative];

    /// Name of the directory below the base directory holding this mode.
    pub fn dir_name(self) -> &'static str {
        match self {
            Mode::Absolute => "absolute_tables",
            Mode::Relative => "relative_tables",
        }
    }

    /// Prefix used for sheet names of this mode.
    pub fn sheet_prefix(self) -> &'static str {
        match self {
            Mode::Absolute => "Abs",
            Mode::Relative => "Rel",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Absolute => write!(f, "absolute"),
            Mode::Relative => write!(f, "relative"),
        }
    }
}

/// A taxonomic level directory such as `level3`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Level {
    /// Directory name as found on disk.
    pub name: String,
    /// Digit suffix of the name, kept verbatim so `level01` and `level1`
    /// never collide.
    pub suffix: String,
}

impl Level {
    /// Parses a directory name of the form `level<digits>`.
    pub fn parse(name: &str) -> Option<Self> {
        let suffix = name.strip_prefix("level")?;
        if suffix.is_empty() || !suffix.bytes().all(|byte| byte.is_ascii_digit()) {
            return None;
        }
        Some(Self {
            name: name.to_string(),
            suffix: suffix.to_string(),
        })
    }

    /// Sheet name for this level under the given mode, e.g. `Abs_2`.
    pub fn sheet_name(&self, mode: Mode) -> String {
        format!("{}_{}", mode.sheet_prefix(), self.suffix)
    }
}

/// A single value of a source table.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Number(f64),
    Text(String),
    Empty,
}

/// Tokens treated as missing values, mirroring what the QIIME2/pandas
/// tooling writes for absent measurements.
const NA_TOKENS: &[&str] = &[
    "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "NULL", "null", "None", "#N/A",
    "#N/A N/A", "#NA", "<NA>", "1.#IND", "1.#QNAN", "-1.#IND", "-1.#QNAN",
];

impl Cell {
    /// Interprets a raw field: finite numbers become [`Cell::Number`],
    /// blanks and NA markers become [`Cell::Empty`].
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || NA_TOKENS.contains(&trimmed) {
            return Cell::Empty;
        }
        match trimmed.parse::<f64>() {
            Ok(value) if value.is_finite() => Cell::Number(value),
            _ => Cell::Text(raw.to_string()),
        }
    }
}

/// A parsed table indexed by taxon.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Header of the index column, normally [`TAXON_COLUMN`].
    pub index_name: String,
    /// Row labels in file order.
    pub index: Vec<String>,
    /// Sample column names in file order, excluding the index column.
    pub columns: Vec<String>,
    /// One row per index label, each as wide as `columns`.
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Looks up a cell by row label and column name.
    pub fn get(&self, taxon: &str, column: &str) -> Option<&Cell> {
        let row = self.index.iter().position(|label| label == taxon)?;
        let col = self.columns.iter().position(|name| name == column)?;
        self.rows.get(row)?.get(col)
    }
}

/// A table that will be materialised as one worksheet.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetTable {
    pub sheet_name: String,
    pub mode: Mode,
    pub level: Level,
    pub source: PathBuf,
    pub table: Table,
}

/// All sheets of the output workbook, in discovery order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkbookData {
    pub sheets: Vec<SheetTable>,
}
