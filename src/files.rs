//! File discovery.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::gopro::GoProFileType;

/// Returns the lower case extension of `path`
/// if it matches any in `ext` (lower case, no leading dot).
pub fn has_extension(path: &Path, ext: &[&str]) -> Option<String> {
    path.extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .filter(|e| ext.contains(&e.as_str()))
}

/// All GoPro clips of `filetype` under `dir`, sorted on path.
/// Unreadable entries are ignored, since these are
/// often due to lack of read permissions.
pub fn find_recordings(dir: &Path, filetype: GoProFileType) -> Vec<PathBuf> {
    let ext = filetype.extensions();
    let mut paths: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|result| result.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| has_extension(entry.path(), ext)
            .map(|_| entry.path().to_owned()))
        .collect();
    paths.sort();
    paths
}
