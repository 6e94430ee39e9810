use crate::github::FileStatus;
use crate::snapshot::{FileSnapshot, Snapshot};
use colored::Colorize;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, instrument};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to write snapshot file: {0}")]
    FileWrite(#[from] std::io::Error),

    #[error("Failed to serialize snapshot: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Colored human-readable summary.
    Terminal,
    /// The full snapshot as pretty-printed JSON.
    Json,
}

/// Output the snapshot to the terminal (default) or to a JSON file.
///
/// A file is always written as JSON since it is meant for the analysis
/// backend, not for reading.
#[instrument(skip(snapshot), fields(pr = snapshot.pull_request().number, files = snapshot.files().len()))]
pub fn output(
    snapshot: &Snapshot,
    format: OutputFormat,
    output_path: Option<&Path>,
) -> Result<(), ReportError> {
    match (output_path, format) {
        (Some(path), _) => {
            debug!(path = %path.display(), "writing snapshot to file");
            write_json_snapshot(snapshot, path)
        }
        (None, OutputFormat::Json) => {
            debug!("writing snapshot JSON to stdout");
            println!("{}", render_json(snapshot)?);
            Ok(())
        }
        (None, OutputFormat::Terminal) => {
            debug!("writing summary to terminal");
            print_terminal_summary(snapshot);
            Ok(())
        }
    }
}

pub fn render_json(snapshot: &Snapshot) -> Result<String, ReportError> {
    Ok(serde_json::to_string_pretty(snapshot)?)
}

fn write_json_snapshot(snapshot: &Snapshot, path: &Path) -> Result<(), ReportError> {
    let mut json = render_json(snapshot)?;
    json.push('\n');
    std::fs::write(path, json)?;
    Ok(())
}

/// PR #42: "Add OAuth2 login flow"
/// Author: alice | Files changed: 3 | +12 -5
/// base 1a2b3c4 → head 5d6e7f8
///
/// ═══ Files ═══
///   added     src/new.rs (+1 -0) [after: 3 lines]
fn print_terminal_summary(snapshot: &Snapshot) {
    let pr = snapshot.pull_request();
    println!();
    println!(
        "{}/{} PR #{}: \"{}\"",
        snapshot.repository().owner(),
        snapshot.repository().name(),
        pr.number,
        pr.title
    );
    println!(
        "Author: {} | Files changed: {} | +{} -{}",
        pr.author, pr.changed_files_count, pr.additions, pr.deletions
    );
    println!("base {} → head {}", short_sha(&pr.base_sha), short_sha(&pr.head_sha));
    println!();

    println!("═══ Files ═══");
    if snapshot.files().is_empty() {
        println!("  No changed files.");
    }
    for entry in snapshot.files() {
        println!("  {}", file_line(entry));
    }
    println!();
}

fn file_line(entry: &FileSnapshot) -> String {
    let file = &entry.file;
    let name = match &file.previous_filename {
        Some(previous) if previous != &file.filename => format!("{} → {}", previous, file.filename),
        _ => file.filename.clone(),
    };
    format!(
        "{:<10} {} (+{} -{}) [before: {}, after: {}]",
        colorize_status(file.status),
        name,
        file.additions,
        file.deletions,
        describe_content(entry.content_before.as_deref()),
        describe_content(entry.content_after.as_deref()),
    )
}

fn describe_content(content: Option<&str>) -> String {
    match content {
        Some(text) => format!("{} lines", text.lines().count()),
        None => "absent".to_string(),
    }
}

fn short_sha(sha: &str) -> &str {
    sha.get(..7).unwrap_or(sha)
}

fn colorize_status(status: FileStatus) -> colored::ColoredString {
    let label = status.to_string();
    match status {
        FileStatus::Added => label.green().bold(),
        FileStatus::Removed => label.red().bold(),
        FileStatus::Modified | FileStatus::Changed => label.yellow().bold(),
        FileStatus::Renamed | FileStatus::Copied => label.cyan().bold(),
        FileStatus::Unchanged | FileStatus::Unknown => label.normal(),
    }
}
