//! Structured regions of interest and their codec to the external tool's
//! flattened field encoding.
//!
//! The flattening vocabulary (parallel comma-joined arrays) is an artifact of
//! the rewrite tool's text-based field model. It stays contained in
//! [`codec`]; the rest of the crate only ever sees [`RegionSet`].

pub mod codec;
pub mod structs;

pub use structs::{AppliedDimensions, AreaUnit, Region, RegionArea, RegionKind, RegionSet};
