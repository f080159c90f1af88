//! Native metadata decoders used by the image pipeline.
//!
//! Each decoder takes the raw file bytes and produces its own partial view of
//! the metadata; the pipeline merges them under fixed precedence rules. Only
//! the EXIF decoder is load-bearing; XMP and IPTC failures merge as absent.

pub mod exif;
pub mod iptc;
pub mod xmp;
