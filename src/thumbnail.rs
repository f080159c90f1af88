//! Locates the embedded thumbnail JPEG inside a raw EXIF block.

use base64::{Engine as _, engine::general_purpose};
use serde::Serialize;
use std::ops::Range;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ThumbnailError {
    #[error("thumbnail range [{start}, {end}) falls outside the {len}-byte EXIF block")]
    OutOfRange {
        start: usize,
        end: usize,
        len: usize,
    },
}

/// The decoded thumbnail-related EXIF fields the locator works from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ThumbnailFields {
    pub offset: Option<u32>,
    pub length: Option<u32>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// A lazily-encodable view of the embedded thumbnail JPEG.
///
/// Holds a byte range into the shared EXIF block instead of an owned copy;
/// the base64 data URI is only produced when [`ThumbnailRef::to_data_url`]
/// is called.
#[derive(Debug, Clone, Serialize)]
pub struct ThumbnailRef {
    pub width: Option<u32>,
    pub height: Option<u32>,
    #[serde(skip)]
    block: Arc<[u8]>,
    #[serde(skip)]
    range: Range<usize>,
}

impl ThumbnailRef {
    /// Computes the thumbnail byte range inside `block`.
    ///
    /// Decoders disagree on whether `ThumbnailOffset` counts the 2-byte JPEG
    /// header already consumed, so the embedded image's own SOI marker is
    /// re-located: the range starts one byte before the first `0xD8` found at
    /// or after `offset + 2`. This correction is specific to that offset
    /// convention; do not generalize it.
    ///
    /// Returns `Ok(None)` when the EXIF data carries no thumbnail offset or
    /// length. A range outside the block is an [`ThumbnailError::OutOfRange`]
    /// error; pipeline callers treat it as an absent thumbnail.
    pub fn locate(
        block: &Arc<[u8]>,
        fields: &ThumbnailFields,
    ) -> Result<Option<Self>, ThumbnailError> {
        let (Some(offset), Some(length)) = (fields.offset, fields.length) else {
            return Ok(None);
        };

        let search_from = offset as usize + 2;
        let soi = block
            .iter()
            .enumerate()
            .skip(search_from)
            .find(|(_, byte)| **byte == 0xD8)
            .map(|(idx, _)| idx);

        let start = match soi {
            Some(idx) => idx - 1,
            None => {
                return Err(ThumbnailError::OutOfRange {
                    start: search_from,
                    end: search_from + length as usize,
                    len: block.len(),
                });
            }
        };
        let end = start + length as usize;

        if end > block.len() {
            return Err(ThumbnailError::OutOfRange {
                start,
                end,
                len: block.len(),
            });
        }

        Ok(Some(Self {
            width: fields.width,
            height: fields.height,
            block: Arc::clone(block),
            range: start..end,
        }))
    }

    /// The raw thumbnail JPEG bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.block[self.range.clone()]
    }

    /// Encodes the thumbnail as a `data:image/jpeg;base64,…` URI.
    pub fn to_data_url(&self) -> String {
        format!(
            "data:image/jpeg;base64,{}",
            general_purpose::STANDARD.encode(self.bytes())
        )
    }
}
