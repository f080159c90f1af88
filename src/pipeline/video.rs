//! Container probe for MP4-family files.

use super::mime_for;
use crate::error::MediaInfoError;
use crate::structs::{MediaRecord, SourceKind};
use crate::time::MediaDate;
use mp4::Mp4Reader;
use serde_json::json;
use std::io::Cursor;
use std::path::Path;

// MP4 box times count seconds since 1904-01-01; Unix times since 1970-01-01.
const MP4_EPOCH_OFFSET: u64 = 2_082_844_800;

/// Converts an MP4 box timestamp to Unix seconds.
///
/// Some writers store Unix times directly; values before the 1970 offset are
/// passed through unchanged on that assumption.
fn from_mp4_epoch(seconds: u64) -> i64 {
    if seconds >= MP4_EPOCH_OFFSET {
        (seconds - MP4_EPOCH_OFFSET) as i64
    } else {
        seconds as i64
    }
}

/// Reads an MP4-family container.
///
/// The first track with a positive visual width is taken as the primary video
/// track; a file without one (audio-only) is a [`MediaInfoError::NoVideoTrack`]
/// error rather than a dimensionless record.
pub async fn extract(path: &Path) -> Result<MediaRecord, MediaInfoError> {
    let (bytes, meta) = tokio::join!(tokio::fs::read(path), tokio::fs::metadata(path));
    let bytes = bytes?;
    let size = bytes.len() as u64;
    let reader = Mp4Reader::read_header(Cursor::new(bytes), size)?;

    let mut tracks: Vec<_> = reader.tracks().values().collect();
    tracks.sort_by_key(|t| t.track_id());
    let video_track = tracks
        .iter()
        .find(|t| t.width() > 0)
        .ok_or_else(|| MediaInfoError::NoVideoTrack(path.to_path_buf()))?;

    let mut record = MediaRecord::empty(SourceKind::ContainerProbe);
    record.width = Some(u32::from(video_track.width()));
    record.height = Some(u32::from(video_track.height()));

    let mvhd = &reader.moov.mvhd;
    record.create_date = MediaDate::from_unix_seconds(from_mp4_epoch(mvhd.creation_time));
    record.modify_date = MediaDate::from_unix_seconds(from_mp4_epoch(mvhd.modification_time));

    record.tags = reader
        .ftyp
        .compatible_brands
        .iter()
        .map(ToString::to_string)
        .map(|brand| brand.trim().to_string())
        .filter(|brand| !brand.is_empty())
        .collect();

    record.file_size = meta.ok().map(|m| m.len());
    record.mime = mime_for(path);
    record.raw = json!({
        "majorBrand": reader.ftyp.major_brand.to_string(),
        "timescale": mvhd.timescale,
        "durationUnits": mvhd.duration,
        "trackCount": reader.tracks().len(),
    });
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corrects_the_1904_epoch() {
        // 2017-01-08T00:37:52Z expressed in 1904-epoch seconds.
        assert_eq!(from_mp4_epoch(2_082_844_800 + 1_483_833_472), 1_483_833_472);
    }

    #[test]
    fn passes_plausible_unix_times_through() {
        assert_eq!(from_mp4_epoch(1_483_833_472), 1_483_833_472);
        assert_eq!(from_mp4_epoch(0), 0);
    }

    #[test]
    fn corrected_time_normalizes_to_an_instant() {
        let date = MediaDate::from_unix_seconds(from_mp4_epoch(2_082_844_800)).unwrap();
        assert_eq!(date.to_string(), "1970-01-01T00:00:00Z");
    }
}
