use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use coma::sequence::metadata_path;
use coma::{
    load_sequence, write_sequence_spots, write_submissions, CometDetector, Config,
    DefaultLoader, ScorerKind, ScoredTrajectory, Submission,
};
use common::file_utils::sub_directories;
use common::log_setup::setup_logging;

#[derive(Parser, Debug)]
#[command(name = "coma")]
#[command(version)]
#[command(about = "Detect and track comets in labeled image sequences", long_about = None)]
struct Args {
    /// Sequence folders. A folder without its own metadata file is searched
    /// for sequence sub-folders.
    #[arg(required = true)]
    folders: Vec<PathBuf>,

    /// YAML or JSON config file; missing keys keep their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the spot scorer from the config.
    #[arg(long)]
    scorer: Option<ScorerKind>,

    /// Write all submission lines to this file.
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// Write `<frame>-spots.csv` beside every frame.
    #[arg(long)]
    spots: bool,

    /// Also report the ground-truth path built from the labels.
    #[arg(long)]
    with_labeled: bool,

    #[arg(long, default_value = "info")]
    log_level: String,

    #[arg(long, default_value = "logs")]
    log_dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    setup_logging(&args.log_level, &args.log_dir, "coma")?;

    let mut config: Config = match &args.config {
        Some(path) => common::serde_format::load_file(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(scorer) = args.scorer {
        config.scorer = scorer;
    }
    tracing::debug!(?config, "Configuration");
    let detector = CometDetector::new(config)?;

    let folders = sequence_folders(&args.folders)?;
    tracing::info!(sequences = folders.len(), "Processing");

    let mut submissions = Vec::new();
    let mut failed = 0usize;
    for folder in &folders {
        match process_sequence(folder, &detector, &args) {
            Ok(mut lines) => submissions.append(&mut lines),
            Err(err) => {
                failed += 1;
                tracing::error!(folder = %folder.display(), "{err:#}");
            }
        }
    }

    if let Some(output) = &args.output {
        write_submissions(output, &submissions)?;
        tracing::info!(
            file = %output.display(),
            lines = submissions.len(),
            "Wrote submissions"
        );
    }

    if failed > 0 {
        anyhow::bail!("{failed} of {} sequences failed", folders.len());
    }
    Ok(())
}

fn sequence_folders(inputs: &[PathBuf]) -> anyhow::Result<Vec<PathBuf>> {
    let mut folders = Vec::new();
    for input in inputs {
        if metadata_path(input).is_file() {
            folders.push(input.clone());
            continue;
        }
        let nested: Vec<PathBuf> = sub_directories(input)
            .with_context(|| format!("Failed to list folder: {}", input.display()))?
            .into_iter()
            .filter(|dir| metadata_path(dir).is_file())
            .collect();
        if nested.is_empty() {
            anyhow::bail!("No sequence found in {}", input.display());
        }
        folders.extend(nested);
    }
    Ok(folders)
}

fn process_sequence(
    folder: &Path,
    detector: &CometDetector,
    args: &Args,
) -> anyhow::Result<Vec<Submission>> {
    let sequence = load_sequence(folder, &DefaultLoader)?;
    let result = detector.run(&sequence)?;

    if args.spots {
        write_sequence_spots(&sequence)?;
    }

    let mut lines = Vec::with_capacity(result.trajectories.len() + 1);
    if args.with_labeled {
        match sequence.labeled_trajectory() {
            Some(path) => {
                let scored = ScoredTrajectory::new(path);
                lines.push(Submission::from_trajectory(
                    sequence.id(),
                    sequence.frames(),
                    &scored.trajectory,
                    scored.confidence,
                ));
            }
            None => tracing::warn!(sequence = %sequence.id(), "Sequence is not fully labeled"),
        }
    }
    lines.extend(result.submissions(&sequence));

    for (index, line) in lines.iter().enumerate() {
        tracing::info!(sequence = %sequence.id(), index, "{line}");
    }
    Ok(lines)
}
