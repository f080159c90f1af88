//! External-tool strategy: read everything through the persistent exiftool
//! process and reconcile its JSON output.

use super::{mime_for, normalize_tags};
use crate::error::MediaInfoError;
use crate::regions::codec;
use crate::structs::{MediaRecord, SourceKind};
use crate::time::MediaDate;
use ::exiftool::ExifTool;
use serde_json::Value;
use std::path::Path;

fn text(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(String::from)
}

fn uint(value: &Value, key: &str) -> Option<u32> {
    value
        .get(key)
        .and_then(Value::as_u64)
        .and_then(|v| u32::try_from(v).ok())
}

// exiftool emits a scalar for single-valued list tags and an array otherwise.
fn strings(value: &Value, key: &str) -> Vec<String> {
    match value.get(key) {
        Some(Value::String(s)) => vec![s.clone()],
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(String::from)
            .collect(),
        Some(Value::Number(n)) => vec![n.to_string()],
        _ => Vec::new(),
    }
}

/// Reads a file through exiftool.
///
/// Two passes over the same file: one with printable values for the textual
/// fields and one numeric (`-n`) for dimensions, rating and region fields.
pub async fn read_with_exiftool(
    tool: &mut ExifTool,
    path: &Path,
) -> Result<MediaRecord, MediaInfoError> {
    let printable = tool.json(path, &[])?;
    let numeric = tool.json(path, &["-n"])?;
    Ok(record_from_fields(path, &printable, &numeric))
}

/// Builds a record out of the two exiftool JSON views.
fn record_from_fields(path: &Path, printable: &Value, numeric: &Value) -> MediaRecord {
    let mut record = MediaRecord::empty(SourceKind::ExternalTool);

    record.width = uint(numeric, "ImageWidth");
    record.height = uint(numeric, "ImageHeight");

    record.create_date = text(printable, "DateTimeOriginal")
        .or_else(|| text(printable, "CreateDate"))
        .map(|raw| MediaDate::from_text(&raw));
    record.modify_date = text(printable, "ModifyDate")
        .or_else(|| text(printable, "FileModifyDate"))
        .map(|raw| MediaDate::from_text(&raw));

    let mut keywords = strings(printable, "Subject");
    if keywords.is_empty() {
        keywords = strings(printable, "Keywords");
    }
    record.tags = normalize_tags(keywords);

    record.regions = codec::parse(numeric);
    record.user_rating = numeric
        .get("Rating")
        .and_then(Value::as_f64)
        .map(|r| r as f32);

    record.camera_brand = text(printable, "Make");
    record.camera_model = text(printable, "Model");
    record.orientation = uint(numeric, "Orientation");
    record.flash = text(printable, "Flash");
    record.file_size = numeric.get("FileSize").and_then(Value::as_u64);
    record.mime = text(printable, "MIMEType").or_else(|| mime_for(path));
    record.raw = numeric.clone();
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regions::RegionKind;
    use serde_json::json;

    fn sample_views() -> (Value, Value) {
        let printable = json!({
            "DateTimeOriginal": "2015:12:11 12:10:09",
            "ModifyDate": "2016:01:01 00:00:00",
            "Make": "Canon",
            "Model": "EOS 80D",
            "Flash": "Off, Did not fire",
            "Subject": ["holiday", "beach; sunset"],
            "MIMEType": "image/jpeg",
        });
        let numeric = json!({
            "ImageWidth": 480,
            "ImageHeight": 360,
            "Orientation": 1,
            "Rating": 4,
            "FileSize": 123456,
            "RegionType": "Face",
            "RegionName": "Someone",
            "RegionAreaX": 0.5, "RegionAreaY": 0.5,
            "RegionAreaW": 0.25, "RegionAreaH": 0.25,
            "RegionAreaUnit": "normalized",
            "RegionAppliedToDimensionsW": 480,
            "RegionAppliedToDimensionsH": 360,
            "RegionAppliedToDimensionsUnit": "pixel",
        });
        (printable, numeric)
    }

    #[test]
    fn numeric_view_supplies_dimensions_and_rating() {
        let (printable, numeric) = sample_views();
        let record = record_from_fields(Path::new("x.jpg"), &printable, &numeric);

        // --- Assertions ---
        assert_eq!(record.width, Some(480));
        assert_eq!(record.height, Some(360));
        assert_eq!(record.user_rating, Some(4.0));
        assert_eq!(record.orientation, Some(1));
        assert_eq!(record.file_size, Some(123456));
        assert_eq!(record.source, SourceKind::ExternalTool);
    }

    #[test]
    fn printable_view_supplies_text_fields() {
        let (printable, numeric) = sample_views();
        let record = record_from_fields(Path::new("x.jpg"), &printable, &numeric);
        assert_eq!(record.create_date.unwrap().to_string(), "2015-12-11T12:10:09Z");
        assert_eq!(record.camera_brand.as_deref(), Some("Canon"));
        assert_eq!(record.flash.as_deref(), Some("Off, Did not fire"));
        assert_eq!(record.mime.as_deref(), Some("image/jpeg"));
    }

    #[test]
    fn subject_tags_are_normalized() {
        let (printable, numeric) = sample_views();
        let record = record_from_fields(Path::new("x.jpg"), &printable, &numeric);
        assert_eq!(record.tags, vec!["holiday", "beach", "sunset"]);
    }

    #[test]
    fn keywords_back_up_an_absent_subject() {
        let printable = json!({ "Keywords": "solo" });
        let record = record_from_fields(Path::new("x.jpg"), &printable, &json!({}));
        assert_eq!(record.tags, vec!["solo"]);
    }

    #[test]
    fn regions_come_from_the_numeric_view() {
        let (printable, numeric) = sample_views();
        let record = record_from_fields(Path::new("x.jpg"), &printable, &numeric);
        assert_eq!(record.regions.region_list.len(), 1);
        assert_eq!(record.regions.region_list[0].kind, RegionKind::Face);
        assert_eq!(record.regions.applied_to_dimensions.w, Some(480));
    }

    #[test]
    fn empty_views_produce_an_all_absent_record() {
        let record = record_from_fields(Path::new("x.webp"), &json!({}), &json!({}));
        assert!(record.width.is_none());
        assert!(record.tags.is_empty());
        assert!(record.regions.is_empty());
        assert!(record.mime.is_none());
    }
}
