use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::error::{Result, ToolError};
use crate::io::{excel_write, tsv_read};
use crate::layout;
use crate::model::{Mode, SheetTable, WorkbookData};

/// Directory scanned when no base directory is given.
pub const DEFAULT_BASE_DIR: &str = "collapsed_levels_results";
/// File name of the workbook created inside the base directory.
pub const DEFAULT_OUTPUT_NAME: &str = "all_levels_tables.xlsx";

/// Where to look for tables and where to put the workbook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeConfig {
    pub base_dir: PathBuf,
    pub output_path: PathBuf,
}

impl MergeConfig {
    /// Configuration for `base_dir` with the workbook stored inside it.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        let base_dir = base_dir.into();
        let output_path = base_dir.join(DEFAULT_OUTPUT_NAME);
        Self {
            base_dir,
            output_path,
        }
    }

    /// Overrides the output location.
    pub fn with_output(mut self, output_path: impl Into<PathBuf>) -> Self {
        self.output_path = output_path.into();
        self
    }
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_DIR)
    }
}

/// One sheet written during a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetRecord {
    pub sheet_name: String,
    pub mode: Mode,
    pub level: String,
    pub source: PathBuf,
    pub taxa: usize,
    pub samples: usize,
}

impl From<&SheetTable> for SheetRecord {
    fn from(sheet: &SheetTable) -> Self {
        Self {
            sheet_name: sheet.sheet_name.clone(),
            mode: sheet.mode,
            level: sheet.level.name.clone(),
            source: sheet.source.clone(),
            taxa: sheet.table.index.len(),
            samples: sheet.table.columns.len(),
        }
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergeReport {
    pub output: PathBuf,
    pub sheets: Vec<SheetRecord>,
}

/// Collects every level table below the base directory, absolute tables
/// first, then relative ones.
pub fn build_workbook(base_dir: &Path) -> Result<WorkbookData> {
    if !base_dir.is_dir() {
        return Err(ToolError::DirectoryNotFound(base_dir.to_path_buf()));
    }

    let mut workbook = WorkbookData::default();
    for mode in Mode::ALL {
        collect_mode(base_dir, mode, &mut workbook)?;
    }
    Ok(workbook)
}

#[instrument(level = "debug", skip_all, fields(mode = %mode))]
fn collect_mode(base_dir: &Path, mode: Mode, workbook: &mut WorkbookData) -> Result<()> {
    let mode_dir = base_dir.join(mode.dir_name());

    for level_dir in layout::discover_levels(&mode_dir)? {
        let Some(source) = layout::select_table(&level_dir.path)? else {
            debug!(level = %level_dir.level.name, "no table in level directory, skipping");
            continue;
        };

        let table = tsv_read::read_table(&source)?;
        let sheet_name = level_dir.level.sheet_name(mode);
        info!(
            sheet = %sheet_name,
            source = %source.display(),
            taxa = table.index.len(),
            "sheet collected"
        );
        workbook.sheets.push(SheetTable {
            sheet_name,
            mode,
            level: level_dir.level,
            source,
            table,
        });
    }

    Ok(())
}

/// Merges all level tables into one workbook on disk.
#[instrument(
    level = "info",
    skip_all,
    fields(base_dir = %config.base_dir.display(), output = %config.output_path.display())
)]
pub fn run(config: &MergeConfig) -> Result<MergeReport> {
    let workbook = build_workbook(&config.base_dir)?;
    if workbook.sheets.is_empty() {
        return Err(ToolError::EmptyWorkbook(config.base_dir.clone()));
    }

    excel_write::write_workbook(&config.output_path, &workbook)?;
    info!(sheet_count = workbook.sheets.len(), "workbook written");

    Ok(MergeReport {
        output: config.output_path.clone(),
        sheets: workbook.sheets.iter().map(SheetRecord::from).collect(),
    })
}
