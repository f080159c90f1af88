//! Pure halves of the mutators: tag-set arithmetic, input validation, and the
//! exiftool argument lists the writes are issued with.
//!
//! Keeping these free of process I/O makes the write semantics testable
//! without a live exiftool binary.

use crate::error::MediaInfoError;
use crate::regions::{AreaUnit, Region, codec};

/// Flags appended to every write: keep no `_original` backup, preserve the
/// file's own timestamps.
const WRITE_FLAGS: [&str; 2] = ["-overwrite_original", "-P"];

/// Current tags plus additions, first-seen order, blanks dropped.
pub(crate) fn merged_tags(current: &[String], additions: &[String]) -> Vec<String> {
    let mut merged: Vec<String> = Vec::with_capacity(current.len() + additions.len());
    for tag in current.iter().chain(additions) {
        let tag = tag.trim();
        if !tag.is_empty() && !merged.iter().any(|t| t == tag) {
            merged.push(tag.to_string());
        }
    }
    merged
}

/// Current tags minus `tag`, blanks dropped.
pub(crate) fn without_tag(current: &[String], tag: &str) -> Vec<String> {
    current
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty() && *t != tag.trim())
        .map(String::from)
        .collect()
}

pub(crate) fn validate_rating(rating: f32) -> Result<(), MediaInfoError> {
    if rating.is_finite() && (-1.0..=5.0).contains(&rating) {
        Ok(())
    } else {
        Err(MediaInfoError::InvalidRating(rating))
    }
}

pub(crate) fn validate_region(region: &Region) -> Result<(), MediaInfoError> {
    if region.area.is_well_formed() {
        Ok(())
    } else {
        Err(MediaInfoError::InvalidRegion)
    }
}

fn with_write_flags(mut args: Vec<String>) -> Vec<String> {
    args.extend(WRITE_FLAGS.iter().map(ToString::to_string));
    args
}

/// Arguments replacing the file's whole tag list.
///
/// Both IPTC `Keywords` and XMP `Subject` are written so the update is
/// visible regardless of which source a later read prefers. An empty list
/// clears both fields.
pub(crate) fn save_tags_args(tags: &[String]) -> Vec<String> {
    let mut args = Vec::new();
    if tags.is_empty() {
        args.push("-Keywords=".to_string());
        args.push("-Subject=".to_string());
    } else {
        for tag in tags {
            args.push(format!("-Keywords={tag}"));
            args.push(format!("-Subject={tag}"));
        }
    }
    with_write_flags(args)
}

pub(crate) fn rating_args(rating: f32) -> Vec<String> {
    with_write_flags(vec![format!("-Rating={rating}")])
}

/// Arguments appending one region.
///
/// The region's fields are `+=` additive so existing regions survive. When
/// the file carries no region set yet, `frame` supplies the reference-frame
/// dimensions, written as plain assignments first.
pub(crate) fn region_args(region: &Region, frame: Option<(u32, u32, AreaUnit)>) -> Vec<String> {
    let mut args = Vec::new();
    if let Some((width, height, unit)) = frame {
        for (field, value) in codec::prepare_dimensions(width, height, unit) {
            args.push(format!("-{field}={value}"));
        }
    }
    for (field, value) in codec::prepare_area(region) {
        args.push(format!("-{field}+={value}"));
    }
    with_write_flags(args)
}
