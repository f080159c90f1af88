//! EXIF decoding via the `kamadak-exif` reader.
//!
//! Besides the field values, the decode keeps the raw EXIF block around
//! (shared, not copied per consumer) because the thumbnail locator slices
//! byte ranges out of it.

use crate::thumbnail::ThumbnailFields;
use exif::{In, Reader, Tag, Value};
use serde_json::json;
use std::io::Cursor;
use std::sync::Arc;

/// The subset of EXIF fields the merge cares about, plus the raw block.
#[derive(Debug, Clone)]
pub struct ExifData {
    pub create_date: Option<String>,
    pub modify_date: Option<String>,
    /// IFD0 (image-level) dimensions.
    pub image_width: Option<u32>,
    pub image_height: Option<u32>,
    /// Exif IFD (capture-level) dimensions.
    pub pixel_width: Option<u32>,
    pub pixel_height: Option<u32>,
    pub camera_brand: Option<String>,
    pub camera_model: Option<String>,
    pub orientation: Option<u32>,
    pub flash: Option<String>,
    pub thumbnail: ThumbnailFields,
    /// The raw EXIF block the fields were decoded from.
    pub block: Arc<[u8]>,
}

fn uint_field(exif: &exif::Exif, tag: Tag, ifd: In) -> Option<u32> {
    exif.get_field(tag, ifd).and_then(|f| f.value.get_uint(0))
}

fn ascii_field(exif: &exif::Exif, tag: Tag, ifd: In) -> Option<String> {
    let field = exif.get_field(tag, ifd)?;
    match &field.value {
        Value::Ascii(lines) => lines.first().map(|bytes| {
            String::from_utf8_lossy(bytes)
                .trim_end_matches('\0')
                .trim()
                .to_string()
        }),
        _ => None,
    }
}

fn display_field(exif: &exif::Exif, tag: Tag, ifd: In) -> Option<String> {
    exif.get_field(tag, ifd)
        .map(|f| f.display_value().to_string())
}

/// Decodes the EXIF structure of an image byte buffer.
///
/// Failure here is fatal for the native image strategy: an image without a
/// readable EXIF block is considered unreadable by this path, and the
/// dispatcher decides whether a fallback applies.
pub fn decode(bytes: &[u8]) -> Result<ExifData, exif::Error> {
    let exif = Reader::new().read_from_container(&mut Cursor::new(bytes))?;

    let thumbnail = ThumbnailFields {
        offset: uint_field(&exif, Tag::JPEGInterchangeFormat, In::THUMBNAIL),
        length: uint_field(&exif, Tag::JPEGInterchangeFormatLength, In::THUMBNAIL),
        width: uint_field(&exif, Tag::ImageWidth, In::THUMBNAIL),
        height: uint_field(&exif, Tag::ImageLength, In::THUMBNAIL),
    };

    Ok(ExifData {
        create_date: ascii_field(&exif, Tag::DateTimeOriginal, In::PRIMARY)
            .or_else(|| ascii_field(&exif, Tag::DateTimeDigitized, In::PRIMARY)),
        modify_date: ascii_field(&exif, Tag::DateTime, In::PRIMARY),
        image_width: uint_field(&exif, Tag::ImageWidth, In::PRIMARY),
        image_height: uint_field(&exif, Tag::ImageLength, In::PRIMARY),
        pixel_width: uint_field(&exif, Tag::PixelXDimension, In::PRIMARY),
        pixel_height: uint_field(&exif, Tag::PixelYDimension, In::PRIMARY),
        camera_brand: ascii_field(&exif, Tag::Make, In::PRIMARY),
        camera_model: ascii_field(&exif, Tag::Model, In::PRIMARY),
        orientation: uint_field(&exif, Tag::Orientation, In::PRIMARY),
        flash: display_field(&exif, Tag::Flash, In::PRIMARY),
        thumbnail,
        block: Arc::from(exif.buf()),
    })
}

impl ExifData {
    /// Field summary for the diagnostic `raw` payload.
    pub fn raw_summary(&self) -> serde_json::Value {
        json!({
            "CreateDate": self.create_date,
            "ModifyDate": self.modify_date,
            "ImageWidth": self.image_width,
            "ImageHeight": self.image_height,
            "PixelXDimension": self.pixel_width,
            "PixelYDimension": self.pixel_height,
            "Make": self.camera_brand,
            "Model": self.camera_model,
            "Orientation": self.orientation,
            "Flash": self.flash,
            "ThumbnailOffset": self.thumbnail.offset,
            "ThumbnailLength": self.thumbnail.length,
        })
    }
}
