use log::debug;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::CounterError;

/// Append-only text log of status sentences.
///
/// The file is opened, appended to and closed on every call; no handle is
/// kept between writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentenceLog {
    file_path: PathBuf,
}

impl SentenceLog {
    pub fn new<P: Into<PathBuf>>(file_path: P) -> Self {
        Self {
            file_path: file_path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Append `text` followed by a newline.
    pub fn append(&self, text: &str) -> Result<(), CounterError> {
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.file_path)
            .map_err(|source| CounterError::Io {
                source,
                context: format!("Failed to open log file {:?}", self.file_path),
            })?;

        writeln!(file, "{text}").map_err(|source| CounterError::Io {
            source,
            context: format!("Failed to write log file {:?}", self.file_path),
        })?;

        debug!("Appended {} bytes to {:?}", text.len() + 1, self.file_path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_accumulates() {
        let dir = tempfile::tempdir().unwrap();
        let log = SentenceLog::new(dir.path().join("counter.txt"));

        log.append("first\n").unwrap();
        log.append("second\n").unwrap();

        let content = std::fs::read_to_string(log.path()).unwrap();
        assert_eq!(content, "first\n\nsecond\n\n");
    }

    #[test]
    fn test_missing_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let log = SentenceLog::new(dir.path().join("nope").join("counter.txt"));
        assert!(matches!(log.append("x"), Err(CounterError::Io { .. })));
    }
}
