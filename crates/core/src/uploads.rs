use std::path::{Path, PathBuf};

use chrono::Local;
use tokio::fs;
use tracing::{info, warn};

use crate::error::Result;

/// Upload extensions the portal accepts, lowercase.
pub const ALLOWED_EXTENSIONS: [&str; 8] =
    ["png", "jpg", "jpeg", "pdf", "doc", "docx", "xls", "xlsx"];

/// Outcome of an upload attempt.
///
/// `stored_path` is the relative path recorded in the ledger; it is empty
/// when the upload was rejected or the write failed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoredUpload {
    pub stored_path: String,
    pub original_name: String,
}

/// Persists uploaded files under a collision-avoiding name in a fixed local
/// directory.
#[derive(Debug, Clone)]
pub struct UploadSink {
    dir: PathBuf,
}

impl UploadSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Store one upload and return where it landed.
    ///
    /// The stored name is the sanitized original prefixed with a timestamp
    /// so the original name stays visible. Rejected extensions, names that
    /// sanitize to nothing, and write failures all yield an empty
    /// `stored_path` and write nothing to disk.
    pub async fn store(&self, original_name: &str, data: &[u8]) -> StoredUpload {
        if original_name.is_empty() {
            return StoredUpload::default();
        }
        let rejected = StoredUpload {
            stored_path: String::new(),
            original_name: original_name.to_string(),
        };

        let filename = sanitize_filename(original_name);
        if filename.is_empty() || !allowed_file(&filename) {
            warn!("upload blocked (disallowed extension): {original_name}");
            return rejected;
        }

        let stamp = Local::now().format("%Y%m%d_%H%M%S");
        let saved_name = format!("{stamp}_{filename}");
        let dest = self.dir.join(&saved_name);
        match fs::write(&dest, data).await {
            Ok(()) => {
                info!("saved upload to {}", dest.display());
                let relative = match self.dir.file_name() {
                    Some(dir_name) => Path::new(dir_name).join(&saved_name),
                    None => PathBuf::from(&saved_name),
                };
                StoredUpload {
                    stored_path: relative.to_string_lossy().into_owned(),
                    original_name: original_name.to_string(),
                }
            }
            Err(err) => {
                warn!("failed to save upload {original_name}: {err}");
                rejected
            }
        }
    }

    /// Create the upload directory if it does not exist yet.
    pub async fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.dir).await?;
        Ok(())
    }
}

fn allowed_file(name: &str) -> bool {
    let Some(ext) = Path::new(name).extension().and_then(|ext| ext.to_str()) else {
        return false;
    };
    let ext = ext.to_ascii_lowercase();
    ALLOWED_EXTENSIONS.contains(&ext.as_str())
}

/// Reduce an uploaded filename to a safe basename.
///
/// Drops any path components, maps everything outside `[A-Za-z0-9._-]` to
/// `_`, and strips leading dots.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    cleaned.trim_start_matches('.').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_paths_and_odd_characters() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\temp\\sheet.xlsx"), "sheet.xlsx");
        assert_eq!(sanitize_filename("shift plan (v2).pdf"), "shift_plan__v2_.pdf");
        assert_eq!(sanitize_filename(".hidden"), "hidden");
    }

    #[test]
    fn extension_check_is_case_insensitive() {
        assert!(allowed_file("report.PDF"));
        assert!(allowed_file("photo.jpeg"));
        assert!(!allowed_file("tool.exe"));
        assert!(!allowed_file("no_extension"));
    }

    #[tokio::test]
    async fn disallowed_extension_creates_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let sink = UploadSink::new(dir.path());
        let stored = sink.store("malware.exe", b"MZ").await;
        assert_eq!(stored.stored_path, "");
        assert_eq!(stored.original_name, "malware.exe");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn empty_name_is_rejected_outright() {
        let dir = tempfile::tempdir().unwrap();
        let sink = UploadSink::new(dir.path());
        assert_eq!(sink.store("", b"data").await, StoredUpload::default());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn stored_name_keeps_original_visible_behind_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let sink = UploadSink::new(dir.path());
        let stored = sink.store("roster.xlsx", b"PK").await;
        assert_eq!(stored.original_name, "roster.xlsx");
        assert!(stored.stored_path.ends_with("_roster.xlsx"));

        let mut entries = std::fs::read_dir(dir.path()).unwrap();
        let entry = entries.next().unwrap().unwrap();
        let name = entry.file_name().to_string_lossy().into_owned();
        assert!(name.ends_with("_roster.xlsx"));
        assert_eq!(std::fs::read(entry.path()).unwrap(), b"PK");
    }
}
