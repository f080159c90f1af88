//! # Media Info
//!
//! Extract and reconcile metadata from photo and video files, and mutate
//! their tags, regions and rating through exiftool.
//!
//! Several partially-overlapping strategies read each file: a native image
//! path (byte-level EXIF, XMP and IPTC decoders plus a JPEG segment scanner),
//! an MP4 container probe, an exiftool pass, and a filesystem-only fallback.
//! Their outputs are reconciled into one [`MediaRecord`] with fixed
//! precedence rules; fields no source could produce stay absent.
//!
//! ## Key Features
//!
//! - **Dimensions and capture data**: width/height, camera make and model,
//!   orientation, flash, capture and modification timestamps.
//! - **Keyword tags**: read from XMP or IPTC; add and remove through exiftool.
//! - **Face regions**: MWG regions decoded into a structured [`RegionSet`],
//!   with additive region writes.
//! - **Rating**: read and write the XMP rating with range validation.
//! - **Embedded thumbnail**: located inside the raw EXIF block and exposed as
//!   a lazily-encoded base64 data URI.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use media_info::MediaInfo;
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), media_info::MediaInfoError> {
//!     let mut info = MediaInfo::builder().build()?;
//!
//!     let record = info.read_media_info(Path::new("photo.jpg"), true).await?;
//!     println!("Tags: {:?}", record.tags);
//!     println!("Thumbnail: {:?}", record.encoded_thumbnail());
//!
//!     let tags = info.add_tag(Path::new("photo.jpg"), "holiday").await?;
//!     println!("Tags after write: {tags:?}");
//!     Ok(())
//! }
//! ```

pub mod decode;
pub mod error;
pub mod media_info;
pub mod pipeline;
pub mod regions;
pub mod scan;
pub mod structs;
pub mod thumbnail;
pub mod time;
mod write;

pub use error::MediaInfoError;
pub use media_info::MediaInfo;
pub use regions::{AppliedDimensions, AreaUnit, Region, RegionArea, RegionKind, RegionSet};
pub use structs::{MediaRecord, SourceKind};
pub use thumbnail::ThumbnailRef;
pub use time::MediaDate;
