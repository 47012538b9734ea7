//! File-based data source.
//!
//! Reads history dumps saved as JSON files, one snapshot per file.

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use super::{DataSource, HistorySnapshot, LabeledSnapshot};

/// A data source that reads history snapshots from JSON files.
///
/// Directories expand to the `*.json` files directly inside them, sorted by
/// name. Dumps are named after their capture time, so name order is capture
/// order. The label of each snapshot is its file stem.
///
/// Files that cannot be read or decoded are skipped; the reason is kept in
/// [`error`](DataSource::error).
#[derive(Debug)]
pub struct FileSource {
    pending: VecDeque<PathBuf>,
    description: String,
    last_error: Option<String>,
}

impl FileSource {
    /// Create a source over the given files and directories, in order.
    pub fn new<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut source = Self {
            pending: VecDeque::new(),
            description: String::new(),
            last_error: None,
        };

        let mut roots = Vec::new();
        for path in paths {
            let path = path.as_ref();
            roots.push(path.display().to_string());
            if path.is_dir() {
                source.expand_dir(path);
            } else {
                source.pending.push_back(path.to_path_buf());
            }
        }
        source.description = format!("files: {}", roots.join(", "));
        source
    }

    /// Files not yet polled.
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }

    fn expand_dir(&mut self, dir: &Path) {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                self.last_error = Some(format!("Read error: {}: {}", dir.display(), e));
                return;
            }
        };

        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        files.sort();
        self.pending.extend(files);
    }

    fn read_file(&mut self, path: &Path) -> Option<LabeledSnapshot> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                self.fail(format!("Read error: {}: {}", path.display(), e));
                return None;
            }
        };

        match HistorySnapshot::from_json(&content) {
            Ok(snapshot) => {
                self.last_error = None;
                let label = path
                    .file_stem()
                    .map(|stem| stem.to_string_lossy().into_owned())
                    .unwrap_or_default();
                Some(LabeledSnapshot { label, snapshot })
            }
            Err(e) => {
                self.fail(format!("Parse error: {}: {}", path.display(), e));
                None
            }
        }
    }

    fn fail(&mut self, message: String) {
        warn!("{}", message);
        self.last_error = Some(message);
    }
}

impl DataSource for FileSource {
    fn poll(&mut self) -> Option<LabeledSnapshot> {
        while let Some(path) = self.pending.pop_front() {
            if let Some(labeled) = self.read_file(&path) {
                return Some(labeled);
            }
        }
        None
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}
