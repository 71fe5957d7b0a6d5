//! Text outputs: per-frame spot lists and trajectory submission lines.
//!
//! A submission line names the sequence, then one `filename,x,y` triple per
//! trajectory point, then the confidence:
//!
//! ```text
//! cmt0001,000.fts,10.00,10.00,001.fts,15.00,12.00,1.0000
//! ```


use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Context;
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use glam::DVec2;

use crate::frame::Frame;
use crate::sequence::Sequence;
use crate::tracking::Trajectory;

/// File name used for frames that are not part of the sequence.
const UNKNOWN_FRAME: &str = "?";

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SubmissionParseError {
    #[error("empty submission line")]
    Empty,
    #[error("expected sequence id, filename/x/y triples and a confidence, got {0} fields")]
    FieldCount(usize),
    #[error("field {index}: invalid number '{text}'")]
    Number { index: usize, text: String },
    #[error("malformed CSV: {0}")]
    Csv(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionPoint {
    pub filename: String,
    pub position: DVec2,
}

/// One trajectory as reported to the outside world.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub sequence_id: String,
    pub points: Vec<SubmissionPoint>,
    pub confidence: f64,
}

impl Submission {
    /// Map each trajectory point to the file name of the frame taken at the
    /// same time.
    pub fn from_trajectory(
        sequence_id: &str,
        frames: &[Frame],
        trajectory: &Trajectory,
        confidence: f64,
    ) -> Self {
        let points = trajectory
            .points()
            .iter()
            .map(|p| {
                let filename = frames
                    .binary_search_by_key(&p.timestamp, Frame::timestamp)
                    .map(|i| frames[i].id().to_string())
                    .unwrap_or_else(|_| UNKNOWN_FRAME.to_string());
                SubmissionPoint {
                    filename,
                    position: p.position,
                }
            })
            .collect();

        Self {
            sequence_id: sequence_id.to_string(),
            points,
            confidence,
        }
    }

    fn to_record(&self) -> Vec<String> {
        let mut fields = Vec::with_capacity(self.points.len() * 3 + 2);
        fields.push(self.sequence_id.clone());
        for p in &self.points {
            fields.push(p.filename.clone());
            fields.push(format!("{:.2}", p.position.x));
            fields.push(format!("{:.2}", p.position.y));
        }
        fields.push(format!("{:.4}", self.confidence));
        fields
    }

    fn from_record(record: &StringRecord) -> Result<Self, SubmissionParseError> {
        let fields: Vec<&str> = record.iter().map(str::trim).collect();
        let n = fields.len();
        if n == 0 || (n == 1 && fields[0].is_empty()) {
            return Err(SubmissionParseError::Empty);
        }
        if n < 5 || (n - 2) % 3 != 0 {
            return Err(SubmissionParseError::FieldCount(n));
        }

        let number = |index: usize| {
            fields[index]
                .parse::<f64>()
                .map_err(|_| SubmissionParseError::Number {
                    index,
                    text: fields[index].to_string(),
                })
        };

        let mut points = Vec::with_capacity((n - 2) / 3);
        for start in (1..n - 1).step_by(3) {
            points.push(SubmissionPoint {
                filename: fields[start].to_string(),
                position: DVec2::new(number(start + 1)?, number(start + 2)?),
            });
        }

        Ok(Self {
            sequence_id: fields[0].to_string(),
            points,
            confidence: number(n - 1)?,
        })
    }
}

/// Same quoting as [`write_submissions`], without the line terminator.
impl fmt::Display for Submission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut writer = WriterBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_writer(Vec::new());
        writer.write_record(self.to_record()).map_err(|_| fmt::Error)?;
        let bytes = writer.into_inner().map_err(|_| fmt::Error)?;
        let line = std::str::from_utf8(&bytes).map_err(|_| fmt::Error)?;
        f.write_str(line.trim_end_matches(['\r', '\n']))
    }
}

/// Render one submission line for `trajectory`.
pub fn format_submission(
    sequence_id: &str,
    frames: &[Frame],
    trajectory: &Trajectory,
    confidence: f64,
) -> String {
    Submission::from_trajectory(sequence_id, frames, trajectory, confidence).to_string()
}

/// Parse one submission line.
pub fn parse_submission(line: &str) -> Result<Submission, SubmissionParseError> {
    if line.trim().is_empty() {
        return Err(SubmissionParseError::Empty);
    }
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes());
    let mut record = StringRecord::new();
    let found = reader
        .read_record(&mut record)
        .map_err(|e| SubmissionParseError::Csv(e.to_string()))?;
    if !found {
        return Err(SubmissionParseError::Empty);
    }
    Submission::from_record(&record)
}

/// Write submissions one per line. Lines differ in length, so the writer
/// runs in flexible mode without a header.
pub fn write_submissions(path: &Path, submissions: &[Submission]) -> anyhow::Result<()> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to create submission file: {}", path.display()))?;
    for submission in submissions {
        writer.write_record(submission.to_record())?;
    }
    writer.flush()?;
    Ok(())
}

/// Read back a file written by [`write_submissions`].
pub fn read_submissions(path: &Path) -> anyhow::Result<Vec<Submission>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open submission file: {}", path.display()))?;
    let mut submissions = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record?;
        let submission = Submission::from_record(&record)
            .with_context(|| format!("{}: line {}", path.display(), line + 1))?;
        submissions.push(submission);
    }
    Ok(submissions)
}

/// `<dir>/<stem>-spots.csv` beside the image.
pub fn spot_csv_path(image_path: &Path) -> PathBuf {
    let stem = image_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(UNKNOWN_FRAME);
    image_path.with_file_name(format!("{stem}-spots.csv"))
}

/// Write `x;y` lines, values in shortest round-trip form with at least one
/// decimal (`20.0;10.5`). Nothing is written for an empty list; returns
/// whether a file was created.
pub fn write_spot_csv(path: &Path, spots: &[DVec2]) -> anyhow::Result<bool> {
    if spots.is_empty() {
        return Ok(false);
    }
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .delimiter(b';')
        .from_path(path)
        .with_context(|| format!("Failed to create spot file: {}", path.display()))?;
    for spot in spots {
        writer.write_record([format!("{:?}", spot.x), format!("{:?}", spot.y)])?;
    }
    writer.flush()?;
    Ok(true)
}

/// Write the spot file of every frame that has a path and attached spots.
/// Returns the number of files written.
pub fn write_sequence_spots(sequence: &Sequence) -> anyhow::Result<usize> {
    let mut written = 0;
    for frame in sequence.frames() {
        let (Some(path), Some(spots)) = (frame.path(), frame.spots()) else {
            continue;
        };
        if write_spot_csv(&spot_csv_path(path), spots)? {
            written += 1;
        }
    }
    tracing::debug!(sequence = %sequence.id(), files = written, "Wrote spot files");
    Ok(written)
}
