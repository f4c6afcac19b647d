//! Directory scanning utilities.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{OpsError, OpsResult};

/// All files under `root` with extension `ext`, in a stable order
/// (directories and files sorted by name). Hidden entries are skipped.
pub fn files_with_extension(root: &Path, ext: &str) -> OpsResult<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(OpsError::SourceNotFound {
            path: root.to_path_buf(),
        });
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e))
    {
        let entry = entry.map_err(|e| OpsError::parse(root, e.to_string()))?;
        if entry.file_type().is_file() && has_extension(entry.path(), ext) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// File stem as UTF-8, or a parse error naming the file.
pub fn file_stem(path: &Path) -> OpsResult<&str> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| OpsError::parse(path, "file name is not valid UTF-8"))
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(ext))
        .unwrap_or(false)
}

/// Check if entry is hidden (starts with .).
fn is_hidden(entry: &walkdir::DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|s| s.starts_with('.'))
        .unwrap_or(false)
}
