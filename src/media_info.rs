use crate::error::MediaInfoError;
use crate::pipeline;
use crate::regions::{AreaUnit, Region};
use crate::structs::MediaRecord;
use crate::write;
use bon::bon;
use exiftool::ExifTool;
use std::path::{Path, PathBuf};

/// The main entry point for metadata extraction and mutation.
///
/// Holds the persistent exiftool process used by the external-tool read
/// strategy and by every write. It is designed to be created once and reused
/// across many files.
///
/// Use the builder pattern to construct an instance:
/// ```rust,no_run
/// # use media_info::{MediaInfo, MediaInfoError};
/// # fn main() -> Result<(), MediaInfoError> {
/// let info = MediaInfo::builder().build()?;
/// # Ok(())
/// # }
/// ```
pub struct MediaInfo {
    exiftool: ExifTool,
}

#[bon]
impl MediaInfo {
    /// Constructs a `MediaInfo` via a builder pattern.
    ///
    /// # Builder Arguments
    ///
    /// * `exiftool_path: Option<PathBuf>` - An optional path to a specific
    ///   `exiftool` executable. If `None`, `exiftool` will be searched for in
    ///   the system's PATH.
    ///
    /// # Errors
    ///
    /// Returns an error when the `exiftool` executable cannot be found or
    /// fails to start.
    #[builder]
    pub fn new(exiftool_path: Option<PathBuf>) -> Result<Self, MediaInfoError> {
        let exiftool = match exiftool_path {
            Some(path) => ExifTool::with_executable(&path)?,
            None => ExifTool::new()?,
        };
        Ok(Self { exiftool })
    }

    /// Reads a media file into a reconciled [`MediaRecord`].
    ///
    /// The strategy is picked by file extension: images go through the native
    /// byte-level decoders, MP4-family files through the container probe.
    /// With `use_fallback` a failed strategy falls through to exiftool, and
    /// unrecognized extensions produce a filesystem-only record instead of an
    /// error.
    ///
    /// # Errors
    ///
    /// * [`MediaInfoError::NotFound`]: `media_file` does not exist.
    /// * [`MediaInfoError::UnrecognizedExtension`]: no strategy handles the
    ///   extension and `use_fallback` is off.
    /// * [`MediaInfoError::ExtractionFailed`]: every applicable strategy
    ///   failed; the last failure is attached as the source.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// # use std::path::Path;
    /// # use media_info::{MediaInfo, MediaInfoError};
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), MediaInfoError> {
    /// let mut info = MediaInfo::builder().build()?;
    /// let record = info.read_media_info(Path::new("photo.jpg"), true).await?;
    /// println!("{}x{}", record.width.unwrap_or(0), record.height.unwrap_or(0));
    /// # Ok(())
    /// # }
    /// ```
    pub async fn read_media_info(
        &mut self,
        media_file: &Path,
        use_fallback: bool,
    ) -> Result<MediaRecord, MediaInfoError> {
        pipeline::dispatch(&mut self.exiftool, media_file, use_fallback).await
    }

    /// The file's current keyword tags.
    pub async fn get_tags(&mut self, media_file: &Path) -> Result<Vec<String>, MediaInfoError> {
        Ok(self.read_media_info(media_file, true).await?.tags)
    }

    /// Adds one tag. See [`MediaInfo::add_tags`].
    pub async fn add_tag(
        &mut self,
        media_file: &Path,
        tag: &str,
    ) -> Result<Vec<String>, MediaInfoError> {
        self.add_tags(media_file, &[tag.to_string()]).await
    }

    /// Adds tags to the file's keyword list and returns the resulting list.
    ///
    /// Tags already present are not duplicated; when nothing changes, the
    /// file is not rewritten. Writes set both IPTC `Keywords` and XMP
    /// `Subject` so later reads agree regardless of their preferred source.
    pub async fn add_tags(
        &mut self,
        media_file: &Path,
        tags: &[String],
    ) -> Result<Vec<String>, MediaInfoError> {
        let current = self.get_tags(media_file).await?;
        let merged = write::merged_tags(&current, tags);
        if merged == current {
            return Ok(current);
        }
        self.execute_write(media_file, write::save_tags_args(&merged))?;
        Ok(merged)
    }

    /// Removes one tag from the file's keyword list and returns the result.
    /// Removing an absent tag is a no-op and skips the rewrite.
    pub async fn remove_tag(
        &mut self,
        media_file: &Path,
        tag: &str,
    ) -> Result<Vec<String>, MediaInfoError> {
        let current = self.get_tags(media_file).await?;
        let remaining = write::without_tag(&current, tag);
        if remaining == current {
            return Ok(current);
        }
        self.execute_write(media_file, write::save_tags_args(&remaining))?;
        Ok(remaining)
    }

    /// Sets the file's rating.
    ///
    /// # Errors
    ///
    /// [`MediaInfoError::InvalidRating`] when `rating` is not a finite number
    /// in `[-1, 5]`.
    pub async fn set_rating(
        &mut self,
        media_file: &Path,
        rating: f32,
    ) -> Result<(), MediaInfoError> {
        write::validate_rating(rating)?;
        self.execute_write(media_file, write::rating_args(rating))
    }

    /// Appends a region of interest and returns the re-read record.
    ///
    /// When the file carries no regions yet, the reference-frame dimensions
    /// are written first (from the file's own pixel dimensions) so the new
    /// coordinates have something to anchor to.
    ///
    /// # Errors
    ///
    /// [`MediaInfoError::InvalidRegion`] when the region's area has
    /// non-finite values or no positive extent.
    pub async fn add_region(
        &mut self,
        media_file: &Path,
        region: Region,
    ) -> Result<MediaRecord, MediaInfoError> {
        write::validate_region(&region)?;

        let before = self.read_media_info(media_file, true).await?;
        let frame = if before.regions.is_empty() {
            match (before.width, before.height) {
                (Some(w), Some(h)) => Some((w, h, AreaUnit::Pixel)),
                _ => None,
            }
        } else {
            None
        };
        self.execute_write(media_file, write::region_args(&region, frame))?;

        self.read_media_info(media_file, true).await
    }

    fn execute_write(
        &mut self,
        media_file: &Path,
        args: Vec<String>,
    ) -> Result<(), MediaInfoError> {
        let path = media_file.to_string_lossy();
        let mut refs: Vec<&str> = args.iter().map(String::as_str).collect();
        refs.push(path.as_ref());
        self.exiftool.execute_raw(&refs)?;
        Ok(())
    }
}
