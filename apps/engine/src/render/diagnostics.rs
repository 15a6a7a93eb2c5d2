//! Failure diagnostics and the optional debug side channel.
//!
//! Excerpt extraction is pure so it can be tested without ever running the
//! compiler. The `DebugSink` keeps the postmortem copy of sanitized sources
//! out of the hot path: recording must never fail a render request.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::warn;
use uuid::Uuid;

use crate::render::compiler::PassOutput;

/// How many characters of log/stdout/stderr tail to keep when no flagged
/// lines are found.
const TAIL_CHARS: usize = 2000;
/// Context lines kept around each flagged log line.
const CONTEXT_BEFORE: usize = 2;
const CONTEXT_AFTER: usize = 5;

/// Builds the diagnostic report for a failed compilation: flagged log lines
/// with surrounding context when present, otherwise the log tail, followed by
/// the final pass's captured streams.
pub fn build_report(log: &str, final_pass: &PassOutput) -> String {
    let mut report = match extract_flagged_lines(log) {
        Some(excerpt) => excerpt,
        None => tail_chars(log, TAIL_CHARS).to_string(),
    };

    if !final_pass.stderr.is_empty() {
        report.push_str("\n--- stderr ---\n");
        report.push_str(tail_chars(&final_pass.stderr, TAIL_CHARS));
    }
    if !final_pass.stdout.is_empty() {
        report.push_str("\n--- stdout ---\n");
        report.push_str(tail_chars(&final_pass.stdout, TAIL_CHARS));
    }
    report
}

/// Collects every log line flagged as an error (TeX's `!` prefix, or any line
/// mentioning `Error`) with 2 lines of leading and 5 lines of trailing
/// context. Returns `None` when nothing is flagged.
fn extract_flagged_lines(log: &str) -> Option<String> {
    let lines: Vec<&str> = log.lines().collect();
    let mut include = vec![false; lines.len()];
    let mut any = false;

    for (i, line) in lines.iter().enumerate() {
        if line.starts_with('!') || line.contains("Error") {
            any = true;
            let start = i.saturating_sub(CONTEXT_BEFORE);
            let end = (i + CONTEXT_AFTER).min(lines.len().saturating_sub(1));
            for flag in include.iter_mut().take(end + 1).skip(start) {
                *flag = true;
            }
        }
    }

    if !any {
        return None;
    }

    let selected: Vec<&str> = lines
        .iter()
        .zip(include.iter())
        .filter_map(|(line, keep)| keep.then_some(*line))
        .collect();
    Some(selected.join("\n"))
}

/// Last `max` characters of `s`, on a char boundary.
fn tail_chars(s: &str, max: usize) -> &str {
    let count = s.chars().count();
    if count <= max {
        return s;
    }
    let start = s
        .char_indices()
        .nth(count - max)
        .map(|(i, _)| i)
        .unwrap_or(0);
    &s[start..]
}

/// Pluggable sink for postmortem copies of sanitized documents.
///
/// Carried by the `Renderer` as `Arc<dyn DebugSink>`; implementations must
/// swallow their own failures — a broken sink must never fail a render.
#[async_trait]
pub trait DebugSink: Send + Sync {
    async fn record(&self, label: &str, contents: &str);
}

/// Writes each recorded document into a directory, one file per request.
pub struct DirSink {
    dir: PathBuf,
}

impl DirSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl DebugSink for DirSink {
    async fn record(&self, label: &str, contents: &str) {
        let path = self.dir.join(format!("{}-{label}.tex", Uuid::new_v4()));
        if let Err(e) = tokio::fs::create_dir_all(&self.dir).await {
            warn!(dir = %self.dir.display(), error = %e, "debug sink: cannot create directory");
            return;
        }
        if let Err(e) = tokio::fs::write(&path, contents).await {
            warn!(path = %path.display(), error = %e, "debug sink: write failed");
        }
    }
}
