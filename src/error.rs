use crate::scan::ScanError;
use crate::thumbnail::ThumbnailError;
use std::path::PathBuf;
use thiserror::Error;

/// All failure modes of the crate.
#[derive(Error, Debug)]
pub enum MediaInfoError {
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    #[error("no extraction strategy recognizes the extension of {0}")]
    UnrecognizedExtension(PathBuf),

    #[error("every extraction strategy failed for {path}")]
    ExtractionFailed {
        path: PathBuf,
        #[source]
        source: Box<MediaInfoError>,
    },

    #[error("{0} contains no video track")]
    NoVideoTrack(PathBuf),

    #[error("region area must have finite values and positive width and height")]
    InvalidRegion,

    #[error("rating must be a finite number between -1 and 5, got {0}")]
    InvalidRating(f32),

    #[error(transparent)]
    ExifTool(#[from] exiftool::ExifToolError),

    #[error("EXIF decode failed: {0}")]
    Exif(#[from] exif::Error),

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Thumbnail(#[from] ThumbnailError),

    #[error("container decode failed: {0}")]
    Container(#[from] mp4::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
