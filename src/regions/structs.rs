use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a region of interest, per the MWG regions vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RegionKind {
    #[default]
    Face,
    Focus,
    Pet,
    BarCode,
}

impl RegionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Face => "Face",
            Self::Focus => "Focus",
            Self::Pet => "Pet",
            Self::BarCode => "BarCode",
        }
    }

    /// Case-insensitive parse of the MWG type names.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "face" => Some(Self::Face),
            "focus" => Some(Self::Focus),
            "pet" => Some(Self::Pet),
            "barcode" => Some(Self::BarCode),
            _ => None,
        }
    }
}

impl fmt::Display for RegionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coordinate unit of a region rectangle or of the reference frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AreaUnit {
    #[default]
    Normalized,
    Pixel,
}

impl AreaUnit {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normalized => "normalized",
            Self::Pixel => "pixel",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normalized" => Some(Self::Normalized),
            "pixel" => Some(Self::Pixel),
            _ => None,
        }
    }
}

impl fmt::Display for AreaUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rectangle of a region. Values may be `NaN` when the source field was
/// corrupt; callers must tolerate partial rectangles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegionArea {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    pub unit: AreaUnit,
}

impl RegionArea {
    /// A rectangle usable as a write target: all values finite, positive extent.
    pub fn is_well_formed(&self) -> bool {
        [self.x, self.y, self.w, self.h].iter().all(|v| v.is_finite())
            && self.w > 0.0
            && self.h > 0.0
    }
}

/// One named region of interest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    #[serde(rename = "type")]
    pub kind: RegionKind,
    pub name: String,
    pub area: RegionArea,
}

/// The reference frame the region coordinates apply to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedDimensions {
    pub w: Option<u32>,
    pub h: Option<u32>,
    pub unit: AreaUnit,
}

impl Default for AppliedDimensions {
    fn default() -> Self {
        // Reference frames are pixel-based unless the file says otherwise.
        Self {
            w: None,
            h: None,
            unit: AreaUnit::Pixel,
        }
    }
}

/// All regions of one media file plus their reference frame.
///
/// Immutable once returned to a caller; adding a region goes through the
/// external rewrite tool and a fresh read, never through in-place mutation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionSet {
    pub applied_to_dimensions: AppliedDimensions,
    pub region_list: Vec<Region>,
}

impl RegionSet {
    pub fn is_empty(&self) -> bool {
        self.region_list.is_empty()
    }
}
