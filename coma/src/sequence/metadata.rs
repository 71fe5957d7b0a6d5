//! Labeled sequence description: one line per exposure.
//!
//! ```text
//! # timestamp          file     x       y       vmag
//! 2003-01-21 11:42:18  0001.fts 512.30  488.75  11.2
//! 2003-01-21 11:54:18  0002.fts 514.90  490.10  nan
//! ```
//!
//! File names are numbered FITS (`.fts`, `.fit`, `.fits`) or PNG/TIFF images.
//!
//! Blank lines and lines starting with `#` are skipped. Any other line that
//! does not match the layout makes the whole file invalid.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::Context;
use chrono::NaiveDateTime;
use glam::DVec2;
use regex::Regex;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

static LINE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*([-0-9]+\s+[0-9:]+)\s+([0-9]+[.](?:fts|fits?|png|tiff?))\s+([0-9.]+)\s+([0-9.]+)\s+([0-9.an]+)\s*$",
    )
    .expect("metadata line pattern is valid")
});

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum MetadataError {
    #[error("line {line}: invalid metadata line '{text}'")]
    InvalidLine { line: usize, text: String },
    #[error("line {line}: invalid timestamp '{text}': {source}")]
    Timestamp {
        line: usize,
        text: String,
        source: chrono::ParseError,
    },
    #[error("line {line}: invalid {field} '{text}'")]
    Number {
        line: usize,
        field: &'static str,
        text: String,
    },
}

/// One labeled exposure.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameRecord {
    pub timestamp: NaiveDateTime,
    pub filename: String,
    pub labeled_position: DVec2,
    /// `None` when the file says `nan`.
    pub vmag: Option<f64>,
}

/// `<folder>/<folder-name>.txt`
pub fn metadata_path(folder: &Path) -> PathBuf {
    let name = common::file_utils::file_name_string(folder);
    folder.join(format!("{name}.txt"))
}

/// Read and parse the metadata file of a sequence folder.
pub fn read_metadata(folder: &Path) -> anyhow::Result<Vec<FrameRecord>> {
    let path = metadata_path(folder);
    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read sequence metadata: {}", path.display()))?;
    parse_metadata(&text).with_context(|| format!("Invalid sequence metadata: {}", path.display()))
}

/// Parse metadata text. Records come back in file order.
pub fn parse_metadata(text: &str) -> Result<Vec<FrameRecord>, MetadataError> {
    let mut records = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        records.push(parse_line(index + 1, raw)?);
    }
    Ok(records)
}

fn parse_line(line: usize, text: &str) -> Result<FrameRecord, MetadataError> {
    let caps = LINE_PATTERN
        .captures(text)
        .ok_or_else(|| MetadataError::InvalidLine {
            line,
            text: text.to_string(),
        })?;

    // Date and time may be separated by any run of whitespace.
    let time_text = caps[1].split_whitespace().collect::<Vec<_>>().join(" ");
    let timestamp = NaiveDateTime::parse_from_str(&time_text, TIMESTAMP_FORMAT).map_err(|source| {
        MetadataError::Timestamp {
            line,
            text: caps[1].to_string(),
            source,
        }
    })?;

    let number = |field: &'static str, value: &str| {
        value.parse::<f64>().map_err(|_| MetadataError::Number {
            line,
            field,
            text: value.to_string(),
        })
    };

    let x = number("x", &caps[3])?;
    let y = number("y", &caps[4])?;
    let vmag = match &caps[5] {
        "nan" => None,
        other => Some(number("vmag", other)?),
    };

    Ok(FrameRecord {
        timestamp,
        filename: caps[2].to_string(),
        labeled_position: DVec2::new(x, y),
        vmag,
    })
}
