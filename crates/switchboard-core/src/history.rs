use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Result;

/// Append-only interaction log: one `<timestamp>: <question>--><answer>`
/// line per completed dispatch.
///
/// Appends are serialised through an internal mutex so concurrent surface
/// sessions always write whole lines. The file handle is scoped to a single
/// append and released on every exit path. Embedded `-->` or newlines in
/// question/answer are written as-is; round-trip parsing of such entries is
/// not guaranteed.
pub struct HistoryStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl HistoryStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one question/answer pair as a single line.
    pub fn append(&self, question: &str, answer: &str) -> Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.6f");
        writeln!(file, "{timestamp}: {question}-->{answer}")?;
        Ok(())
    }

    /// All log lines in append order. A missing file is an empty log,
    /// not an error.
    pub fn load_all(&self) -> Result<Vec<String>> {
        let file = match std::fs::File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let reader = std::io::BufReader::new(file);
        let mut lines = Vec::new();
        for line in reader.lines() {
            lines.push(line?);
        }
        Ok(lines)
    }
}
