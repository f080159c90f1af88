//! Native image strategy: byte-level decoders reconciled into one record.

use super::{mime_for, normalize_tags};
use crate::decode::exif::{self, ExifData};
use crate::decode::iptc;
use crate::decode::xmp::{self, XmpData};
use crate::error::MediaInfoError;
use crate::regions::codec;
use crate::scan::{self, JpegDimensions};
use crate::structs::{MediaRecord, SourceKind};
use crate::thumbnail::ThumbnailRef;
use crate::time::MediaDate;
use serde_json::{Value, json};
use std::path::Path;
use std::time::SystemTime;
use tracing::{debug, warn};

/// Everything the non-EXIF extractors produced for one file. Each source is
/// independently absent when its extractor failed.
struct Extracted {
    scan: Option<JpegDimensions>,
    xmp: Option<XmpData>,
    iptc_keywords: Vec<String>,
    file_size: Option<u64>,
    fs_modified: Option<SystemTime>,
}

/// Reads an image natively.
///
/// The file bytes and filesystem metadata are fetched concurrently; every
/// decoder then runs over the same byte buffer and the results settle before
/// a single merge. Only an EXIF decode failure fails the strategy.
pub async fn extract(path: &Path) -> Result<MediaRecord, MediaInfoError> {
    let (bytes, meta) = tokio::join!(tokio::fs::read(path), tokio::fs::metadata(path));
    let bytes = bytes?;
    let meta = meta.ok();

    let exif_data = exif::decode(&bytes)?;

    let scan = match scan::jpeg_dimensions(&bytes) {
        Ok(dims) => Some(dims),
        Err(error) => {
            debug!(path = %path.display(), %error, "segment scan found no dimensions");
            None
        }
    };
    let extracted = Extracted {
        scan,
        xmp: xmp::decode(&bytes),
        iptc_keywords: iptc::keywords(&bytes),
        file_size: meta.as_ref().map(std::fs::Metadata::len),
        fs_modified: meta.and_then(|m| m.modified().ok()),
    };

    let mut record = merge(exif_data, extracted);
    record.mime = mime_for(path);
    Ok(record)
}

/// Reconciles all extractor outputs into one record.
///
/// Dimension precedence: segment scanner, then EXIF image-level, then EXIF
/// capture-level. Tags prefer XMP keywords over IPTC. Regions and rating come
/// from XMP only.
fn merge(exif_data: ExifData, extracted: Extracted) -> MediaRecord {
    let mut record = MediaRecord::empty(SourceKind::NativeImage);

    record.width = extracted
        .scan
        .map(|d| d.width)
        .or(exif_data.image_width)
        .or(exif_data.pixel_width);
    record.height = extracted
        .scan
        .map(|d| d.height)
        .or(exif_data.image_height)
        .or(exif_data.pixel_height);

    record.create_date = exif_data.create_date.as_deref().map(MediaDate::from_text);
    record.modify_date = exif_data
        .modify_date
        .as_deref()
        .map(MediaDate::from_text)
        .or_else(|| extracted.fs_modified.map(MediaDate::from));

    let xmp_data = extracted.xmp.unwrap_or_default();
    record.tags = if xmp_data.keywords.is_empty() {
        normalize_tags(&extracted.iptc_keywords)
    } else {
        normalize_tags(&xmp_data.keywords)
    };
    record.regions = codec::parse(&Value::Object(xmp_data.region_fields.clone()));
    record.user_rating = xmp_data.rating.map(|r| r as f32);

    record.thumbnail = match ThumbnailRef::locate(&exif_data.block, &exif_data.thumbnail) {
        Ok(thumbnail) => thumbnail,
        Err(error) => {
            warn!(%error, "dropping unusable embedded thumbnail");
            None
        }
    };

    record.camera_brand = exif_data.camera_brand.clone();
    record.camera_model = exif_data.camera_model.clone();
    record.orientation = exif_data.orientation;
    record.flash = exif_data.flash.clone();
    record.file_size = extracted.file_size;
    record.raw = json!({
        "exif": exif_data.raw_summary(),
        "xmpKeywords": xmp_data.keywords,
        "iptcKeywords": extracted.iptc_keywords,
        "scannedDimensions": extracted.scan,
    });
    record
}
