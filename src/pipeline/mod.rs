//! Strategy dispatch: classify a path by extension and run the matching
//! extraction pipeline, with an optional fallback chain.

pub mod exiftool;
pub mod filesystem;
pub mod image;
pub mod video;

use crate::error::MediaInfoError;
use crate::structs::MediaRecord;
use self::exiftool::read_with_exiftool;
use std::path::Path;
use tracing::warn;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "tif", "tiff"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "m4a", "m4v", "mov"];

/// Extraction family a file belongs to, judged by extension alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
    /// Extensions no strategy handles natively.
    Other,
}

pub fn classify(path: &Path) -> MediaKind {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return MediaKind::Other;
    };
    let ext = ext.to_ascii_lowercase();
    if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        MediaKind::Image
    } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
        MediaKind::Video
    } else {
        MediaKind::Other
    }
}

pub(crate) fn mime_for(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "tif" | "tiff" => "image/tiff",
        "mp4" | "m4v" => "video/mp4",
        "m4a" => "audio/mp4",
        "mov" => "video/quicktime",
        _ => return None,
    };
    Some(mime.to_string())
}

/// Normalizes a raw tag list: split on `;`, trim, drop blanks, dedup while
/// keeping first-seen order.
pub(crate) fn normalize_tags<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut tags: Vec<String> = Vec::new();
    for item in raw {
        for part in item.as_ref().split(';') {
            let part = part.trim();
            if !part.is_empty() && !tags.iter().any(|t| t == part) {
                tags.push(part.to_string());
            }
        }
    }
    tags
}

/// What the tool-free strategies produced for a path.
enum NativeOutcome {
    Record(MediaRecord),
    /// The native strategy failed but the caller allowed falling through to
    /// the external tool. Carries the native failure.
    NeedsTool(MediaInfoError),
}

/// Runs everything that does not need the external tool: classification, the
/// native image/video strategies, and the filesystem path for unrecognized
/// extensions.
async fn native_read(path: &Path, use_fallback: bool) -> Result<NativeOutcome, MediaInfoError> {
    if !tokio::fs::try_exists(path).await.unwrap_or(false) {
        return Err(MediaInfoError::NotFound(path.to_path_buf()));
    }

    let native = match classify(path) {
        MediaKind::Image => image::extract(path).await,
        MediaKind::Video => video::extract(path).await,
        MediaKind::Other => {
            if use_fallback {
                return filesystem::extract(path).await.map(NativeOutcome::Record);
            }
            return Err(MediaInfoError::UnrecognizedExtension(path.to_path_buf()));
        }
    };

    match native {
        Ok(record) => Ok(NativeOutcome::Record(record)),
        Err(error) if use_fallback => Ok(NativeOutcome::NeedsTool(error)),
        Err(error) => Err(error),
    }
}

/// Runs the strategy matching `path`'s classification.
///
/// With `use_fallback`, a failed native image/video strategy falls through
/// to the external tool, and unrecognized extensions produce a
/// filesystem-derived record; without it the first failure propagates.
pub async fn dispatch(
    tool: &mut ::exiftool::ExifTool,
    path: &Path,
    use_fallback: bool,
) -> Result<MediaRecord, MediaInfoError> {
    match native_read(path, use_fallback).await? {
        NativeOutcome::Record(record) => Ok(record),
        NativeOutcome::NeedsTool(error) => {
            warn!(path = %path.display(), %error, "native strategy failed, trying exiftool");
            match read_with_exiftool(tool, path).await {
                Ok(record) => Ok(record),
                Err(tool_error) => {
                    warn!(path = %path.display(), error = %tool_error, "exiftool strategy failed too");
                    Err(MediaInfoError::ExtractionFailed {
                        path: path.to_path_buf(),
                        source: Box::new(tool_error),
                    })
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_by_lowercased_extension() {
        assert_eq!(classify(Path::new("a/b/photo.JPG")), MediaKind::Image);
        assert_eq!(classify(Path::new("clip.Mov")), MediaKind::Video);
        assert_eq!(classify(Path::new("notes.txt")), MediaKind::Other);
        assert_eq!(classify(Path::new("no_extension")), MediaKind::Other);
    }

    #[test]
    fn normalize_splits_trims_and_dedups() {
        let tags = normalize_tags(["holiday; beach", " beach ", "", " ; ", "sunset"]);
        assert_eq!(tags, vec!["holiday", "beach", "sunset"]);
    }

    #[test]
    fn mime_covers_both_families() {
        assert_eq!(mime_for(Path::new("x.jpeg")).as_deref(), Some("image/jpeg"));
        assert_eq!(mime_for(Path::new("x.mp4")).as_deref(), Some("video/mp4"));
        assert_eq!(mime_for(Path::new("x.xyz")), None);
    }

    #[tokio::test]
    async fn unrecognized_extension_without_fallback_is_an_error() {
        let file = tempfile::NamedTempFile::with_suffix(".xyz").unwrap();
        let result = native_read(file.path(), false).await;
        assert!(matches!(
            result,
            Err(MediaInfoError::UnrecognizedExtension(_))
        ));
    }

    #[tokio::test]
    async fn unrecognized_extension_with_fallback_reads_the_filesystem() {
        let file = tempfile::NamedTempFile::with_suffix(".xyz").unwrap();
        let outcome = native_read(file.path(), true).await.unwrap();
        let NativeOutcome::Record(record) = outcome else {
            panic!("fallback read should not need the external tool");
        };
        assert_eq!(record.source, crate::structs::SourceKind::FilesystemFallback);
        assert_eq!(record.file_size, Some(0));
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let result = native_read(Path::new("/definitely/not/here.jpg"), true).await;
        assert!(matches!(result, Err(MediaInfoError::NotFound(_))));
    }

    #[tokio::test]
    async fn failed_native_strategy_defers_to_the_tool_only_with_fallback() {
        // Not a real JPEG, so the native image strategy fails.
        let file = tempfile::NamedTempFile::with_suffix(".jpg").unwrap();

        let strict = native_read(file.path(), false).await;
        assert!(strict.is_err());

        let lenient = native_read(file.path(), true).await.unwrap();
        assert!(matches!(lenient, NativeOutcome::NeedsTool(_)));
    }
}
