use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{Result, ToolError};
use crate::model::Level;

/// Extension of the tables picked up inside a level directory.
pub const TABLE_EXTENSION: &str = "tsv";

/// A level directory found below a mode directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelDir {
    pub level: Level,
    pub path: PathBuf,
}

/// Lists the `level<N>` subdirectories of `mode_dir`, sorted by name.
/// Symlinked level directories are followed.
///
/// Ordering is lexicographic, so `level10` sorts before `level2`.
pub fn discover_levels(mode_dir: &Path) -> Result<Vec<LevelDir>> {
    if !mode_dir.is_dir() {
        return Err(ToolError::DirectoryNotFound(mode_dir.to_path_buf()));
    }

    let mut levels = Vec::new();
    for entry in fs::read_dir(mode_dir)? {
        let entry = entry?;
        if !entry.path().is_dir() {
            continue;
        }
        let name = entry.file_name();
        let Some(level) = name.to_str().and_then(Level::parse) else {
            debug!(path = %entry.path().display(), "ignoring non-level directory");
            continue;
        };
        levels.push(LevelDir {
            level,
            path: entry.path(),
        });
    }

    levels.sort_by(|lhs, rhs| lhs.level.name.cmp(&rhs.level.name));
    Ok(levels)
}

/// Picks the table file of a level directory.
///
/// Returns `None` when the directory holds no `.tsv` file. With several
/// candidates the lexicographically first file name wins.
pub fn select_table(level_dir: &Path) -> Result<Option<PathBuf>> {
    let mut candidates = Vec::new();
    for entry in fs::read_dir(level_dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        if path.extension().and_then(|ext| ext.to_str()) == Some(TABLE_EXTENSION) {
            candidates.push(path);
        }
    }

    candidates.sort_by(|lhs, rhs| lhs.file_name().cmp(&rhs.file_name()));
    let mut candidates = candidates.into_iter();
    let selected = candidates.next();

    let ignored: Vec<String> = candidates
        .map(|path| path.display().to_string())
        .collect();
    if let Some(path) = &selected {
        if !ignored.is_empty() {
            warn!(
                selected = %path.display(),
                ?ignored,
                "several tables in level directory, using the first by name"
            );
        }
    }

    Ok(selected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn levels_sort_by_name_and_skip_noise() {
        let dir = tempdir().expect("temporary directory");
        for name in ["level2", "level10", "level1", "notes", "levelX"] {
            fs::create_dir(dir.path().join(name)).expect("directory created");
        }
        fs::write(dir.path().join("level3"), "not a directory").expect("file written");

        let names: Vec<String> = discover_levels(dir.path())
            .expect("levels listed")
            .into_iter()
            .map(|level| level.level.name)
            .collect();

        assert_eq!(names, ["level1", "level10", "level2"]);
    }

    #[test]
    fn select_table_prefers_first_name() {
        let dir = tempdir().expect("temporary directory");
        for name in ["y.tsv", "x.tsv", "a.csv"] {
            fs::write(dir.path().join(name), "").expect("file written");
        }

        let selected = select_table(dir.path()).expect("directory listed");
        assert_eq!(selected, Some(dir.path().join("x.tsv")));
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_levels_and_tables_are_followed() {
        use std::os::unix::fs::symlink;

        let dir = tempdir().expect("temporary directory");
        let real_level = dir.path().join("real_level");
        fs::create_dir(&real_level).expect("directory created");
        fs::write(real_level.join("t.tsv"), "").expect("file written");
        let mode_dir = dir.path().join("mode");
        fs::create_dir(&mode_dir).expect("directory created");
        symlink(&real_level, mode_dir.join("level2")).expect("level symlinked");

        let levels = discover_levels(&mode_dir).expect("levels listed");
        assert_eq!(levels.len(), 1);
        assert_eq!(levels[0].level.name, "level2");

        let linked_table = dir.path().join("linked");
        fs::create_dir(&linked_table).expect("directory created");
        symlink(real_level.join("t.tsv"), linked_table.join("t.tsv")).expect("table symlinked");
        assert_eq!(
            select_table(&linked_table).expect("directory listed"),
            Some(linked_table.join("t.tsv"))
        );
    }

    #[test]
    fn select_table_without_candidates() {
        let dir = tempdir().expect("temporary directory");
        fs::write(dir.path().join("readme.txt"), "").expect("file written");
        assert_eq!(select_table(dir.path()).expect("directory listed"), None);
    }
}
