//! Metadata listings for the `metadata` command.

use crate::error::ErrorKind;
use crate::io::{describe, TileLoader};
use std::fmt;

/// Metadata of a batch of tile files, with the files that could not be read.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MetadataReport {
    /// `(file, [(key, value)])` for every file that decoded
    pub entries: Vec<(String, Vec<(&'static str, String)>)>,

    /// Files that do not exist in the data directory
    pub missing: Vec<String>,

    /// Files that exist but failed to decode
    pub failed: Vec<String>,
}

impl MetadataReport {
    pub fn collect<S: AsRef<str>>(loader: &TileLoader, files: &[S]) -> Self {
        let mut report = Self::default();

        for file in files {
            let file = file.as_ref();
            match loader.load(file) {
                Ok(tile) => report.entries.push((file.to_string(), describe(tile.meta()))),
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    tracing::debug!("{} not found: {}", file, e);
                    report.missing.push(file.to_string());
                }
                Err(e) => {
                    tracing::warn!("Failed to read {}: {}", file, e);
                    report.failed.push(file.to_string());
                }
            }
        }

        report
    }

    pub fn is_complete(&self) -> bool {
        self.missing.is_empty() && self.failed.is_empty()
    }
}

/// A single file prints bare `key: value` lines; several files prefix each line
/// with the file name.
impl fmt::Display for MetadataReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = self.entries.len() + self.missing.len() + self.failed.len() > 1;

        for (file, pairs) in &self.entries {
            for (key, value) in pairs {
                if prefix {
                    writeln!(f, "{}:{}: {}", file, key, value)?;
                } else {
                    writeln!(f, "{}: {}", key, value)?;
                }
            }
        }

        if !self.failed.is_empty() {
            writeln!(f, "\nThese files failed while being processed")?;
            for file in &self.failed {
                writeln!(f, " - {}", file)?;
            }
        }
        if !self.missing.is_empty() {
            writeln!(f, "\nThese files couldn't be found")?;
            for file in &self.missing {
                writeln!(f, " - {}", file)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fand_a, write_bundle};
    use tempfile::TempDir;

    #[test]
    fn test_single_file_has_no_prefix() {
        let dir = TempDir::new().unwrap();
        write_bundle(dir.path(), "fand.zip", &fand_a());

        let report = MetadataReport::collect(&TileLoader::new(dir.path()), &["fand.zip"]);
        assert!(report.is_complete());

        let text = report.to_string();
        assert!(text.starts_with("archive: ISA\ninstrument: Fand\n"));
        assert!(text.contains("obs_date: 2023-01-04 15:00:10\n"));
    }

    #[test]
    fn test_missing_and_failed_files() {
        let dir = TempDir::new().unwrap();
        write_bundle(dir.path(), "fand.zip", &fand_a());
        std::fs::write(dir.path().join("broken.zip"), b"not a zip").unwrap();

        let report = MetadataReport::collect(
            &TileLoader::new(dir.path()),
            &["fand.zip", "broken.zip", "gone.zip"],
        );
        assert_eq!(report.failed, vec!["broken.zip"]);
        assert_eq!(report.missing, vec!["gone.zip"]);
        assert!(!report.is_complete());

        let text = report.to_string();
        assert!(text.contains("fand.zip:instrument: Fand\n"));
        assert!(text.contains("These files failed while being processed\n - broken.zip\n"));
        assert!(text.contains("These files couldn't be found\n - gone.zip\n"));
    }

    #[test]
    fn test_bundle_without_sidecar_counts_as_failed() {
        let dir = TempDir::new().unwrap();
        let file = std::fs::File::create(dir.path().join("empty.zip")).unwrap();
        zip::ZipWriter::new(file).finish().unwrap();

        let report = MetadataReport::collect(&TileLoader::new(dir.path()), &["empty.zip"]);
        assert_eq!(report.failed, vec!["empty.zip"]);
        assert!(report.missing.is_empty());
    }
}
