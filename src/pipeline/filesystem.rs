//! Last-resort strategy: filesystem metadata only.

use super::mime_for;
use crate::error::MediaInfoError;
use crate::structs::{MediaRecord, SourceKind};
use crate::time::MediaDate;
use serde_json::json;
use std::path::Path;

/// Builds a record from `stat` alone. Used for extensions no richer strategy
/// understands, and only when the caller opted into fallback.
pub async fn extract(path: &Path) -> Result<MediaRecord, MediaInfoError> {
    let meta = tokio::fs::metadata(path).await?;

    let mut record = MediaRecord::empty(SourceKind::FilesystemFallback);
    record.file_size = Some(meta.len());
    // Creation time is not available on every filesystem.
    record.create_date = meta.created().ok().map(MediaDate::from);
    record.modify_date = meta.modified().ok().map(MediaDate::from);
    record.mime = mime_for(path);
    record.raw = json!({ "strategy": "filesystem" });
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[tokio::test]
    async fn reads_size_and_dates_from_stat() {
        let mut file = tempfile::NamedTempFile::with_suffix(".xyz").unwrap();
        file.write_all(b"twelve bytes").unwrap();

        let record = extract(file.path()).await.unwrap();

        // --- Assertions ---
        assert_eq!(record.file_size, Some(12));
        assert!(record.modify_date.is_some());
        assert!(record.tags.is_empty());
        assert_eq!(record.source, SourceKind::FilesystemFallback);
        assert_eq!(record.mime, None);
    }

    #[tokio::test]
    async fn missing_file_is_an_io_error() {
        let result = extract(Path::new("/definitely/not/here.xyz")).await;
        assert!(matches!(result, Err(MediaInfoError::Io(_))));
    }
}
