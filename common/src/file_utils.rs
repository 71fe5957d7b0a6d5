//! Path helpers for sequence folders and frame files.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// FITS file extensions, including the `.fts` spelling used by survey archives.
pub const FITS_EXTENSIONS: &[&str] = &["fts", "fit", "fits"];

/// Raster formats decoded without a FITS library.
pub const RASTER_EXTENSIONS: &[&str] = &["png", "tif", "tiff"];

/// Returns `true` if the path has one of the given extensions (case-insensitive).
pub fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
}

/// Returns the immediate sub-directories of `dir`, sorted by name.
pub fn sub_directories(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }
    dirs.sort();
    Ok(dirs)
}

/// Final path component as a string, or `"?"` when it is not valid UTF-8.
pub fn file_name_string(path: &Path) -> String {
    path.file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("?")
        .to_string()
}
