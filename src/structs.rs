use crate::regions::RegionSet;
use crate::thumbnail::ThumbnailRef;
use crate::time::MediaDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Which extraction strategy produced a [`MediaRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SourceKind {
    NativeImage,
    ContainerProbe,
    ExternalTool,
    FilesystemFallback,
}

/// The reconciled metadata of one media file.
///
/// Every field is independently optional; absence means no strategy could
/// produce the value, never a zero default. A record is built fresh per read
/// and is not cached or mutated afterwards.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaRecord {
    pub create_date: Option<MediaDate>,
    pub modify_date: Option<MediaDate>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Ordered, deduplicated, free of empty strings.
    pub tags: Vec<String>,
    pub regions: RegionSet,
    pub file_size: Option<u64>,
    pub camera_brand: Option<String>,
    pub camera_model: Option<String>,
    pub orientation: Option<u32>,
    pub flash: Option<String>,
    pub user_rating: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<ThumbnailRef>,
    pub mime: Option<String>,
    pub source: SourceKind,
    /// Untyped per-strategy diagnostics. Not part of the stable surface.
    pub raw: Value,
}

impl MediaRecord {
    /// An all-absent record attributed to `source`.
    pub fn empty(source: SourceKind) -> Self {
        Self {
            create_date: None,
            modify_date: None,
            width: None,
            height: None,
            tags: Vec::new(),
            regions: RegionSet::default(),
            file_size: None,
            camera_brand: None,
            camera_model: None,
            orientation: None,
            flash: None,
            user_rating: None,
            thumbnail: None,
            mime: None,
            source,
            raw: Value::Null,
        }
    }

    /// The embedded thumbnail as a `data:image/jpeg;base64,…` URI, when the
    /// file carries one. The encode happens here, not at read time.
    pub fn encoded_thumbnail(&self) -> Option<String> {
        self.thumbnail.as_ref().map(ThumbnailRef::to_data_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_camel_case_keys() {
        let mut record = MediaRecord::empty(SourceKind::NativeImage);
        record.file_size = Some(1024);
        record.user_rating = Some(4.0);
        let json = serde_json::to_value(&record).unwrap();

        // --- Assertions ---
        assert_eq!(json["fileSize"], 1024);
        assert_eq!(json["userRating"], 4.0);
        assert_eq!(json["source"], "nativeImage");
        assert!(json.get("thumbnail").is_none());
        assert!(json["createDate"].is_null());
    }

    #[test]
    fn encoded_thumbnail_is_none_without_a_thumbnail() {
        let record = MediaRecord::empty(SourceKind::FilesystemFallback);
        assert_eq!(record.encoded_thumbnail(), None);
    }
}
