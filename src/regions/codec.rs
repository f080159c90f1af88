//! Bidirectional codec between [`RegionSet`] and the flattened MWG region
//! fields the external rewrite tool works with.
//!
//! The tool's field model is text: seven parallel fields, one element per
//! region, joined with `", "` on write. A previous write can corrupt a
//! multi-valued field into a single joined string, so the parse direction
//! accepts a scalar, an array of scalars, or one comma-joined string for any
//! field. That tolerance is a best-effort reconciliation; a byte-exact round
//! trip is only guaranteed for well-formed sets without commas in names.

use super::structs::{AppliedDimensions, AreaUnit, Region, RegionArea, RegionKind, RegionSet};
use serde_json::Value;
use tracing::debug;

pub const DIMENSIONS_W: &str = "RegionAppliedToDimensionsW";
pub const DIMENSIONS_H: &str = "RegionAppliedToDimensionsH";
pub const DIMENSIONS_UNIT: &str = "RegionAppliedToDimensionsUnit";
pub const REGION_TYPE: &str = "RegionType";
pub const REGION_NAME: &str = "RegionName";
pub const AREA_X: &str = "RegionAreaX";
pub const AREA_Y: &str = "RegionAreaY";
pub const AREA_W: &str = "RegionAreaW";
pub const AREA_H: &str = "RegionAreaH";
pub const AREA_UNIT: &str = "RegionAreaUnit";

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Splits one region field into its per-region elements.
///
/// Arrays are joined with commas first and re-split, so an array that already
/// holds a joined string comes apart the same way as a clean one. A scalar
/// without commas stays a single untouched element.
fn parse_field(value: Option<&Value>) -> Vec<String> {
    let Some(value) = value else {
        return Vec::new();
    };

    let joined = match value {
        Value::Array(items) => items
            .iter()
            .map(scalar_to_string)
            .collect::<Vec<_>>()
            .join(","),
        other => scalar_to_string(other),
    };

    if joined.contains(',') {
        joined.split(',').map(|p| p.trim().to_string()).collect()
    } else {
        vec![joined]
    }
}

fn parse_uint(value: Option<&Value>) -> Option<u32> {
    match value? {
        Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        Value::String(s) => {
            // parse like a lenient integer: "1080.0" style values round down
            s.trim().parse::<f64>().ok().and_then(|f| {
                (f.is_finite() && f >= 0.0 && f <= f64::from(u32::MAX)).then_some(f as u32)
            })
        }
        _ => None,
    }
}

fn parse_float(element: Option<&String>) -> f64 {
    element
        .and_then(|s| s.trim().parse::<f64>().ok())
        .unwrap_or(f64::NAN)
}

/// Parses the flattened region fields of a metadata map into a [`RegionSet`].
///
/// An absent `RegionType` means the file carries no regions: the result is an
/// empty set. Region fields are parsed positionally; a non-numeric rectangle
/// value becomes `NaN` rather than an error.
pub fn parse(metadata: &Value) -> RegionSet {
    if metadata.get(REGION_TYPE).is_none() {
        return RegionSet::default();
    }

    let applied_to_dimensions = AppliedDimensions {
        w: parse_uint(metadata.get(DIMENSIONS_W)).or_else(|| parse_uint(metadata.get("ImageWidth"))),
        h: parse_uint(metadata.get(DIMENSIONS_H))
            .or_else(|| parse_uint(metadata.get("ImageHeight"))),
        unit: metadata
            .get(DIMENSIONS_UNIT)
            .and_then(Value::as_str)
            .and_then(AreaUnit::parse)
            .unwrap_or(AreaUnit::Pixel),
    };

    let kinds = parse_field(metadata.get(REGION_TYPE));
    let names = parse_field(metadata.get(REGION_NAME));
    let xs = parse_field(metadata.get(AREA_X));
    let ys = parse_field(metadata.get(AREA_Y));
    let ws = parse_field(metadata.get(AREA_W));
    let hs = parse_field(metadata.get(AREA_H));
    let units = parse_field(metadata.get(AREA_UNIT));

    let region_list = kinds
        .iter()
        .enumerate()
        .map(|(i, kind)| Region {
            kind: RegionKind::parse(kind).unwrap_or_else(|| {
                debug!(%kind, "unknown region type, treating as Face");
                RegionKind::Face
            }),
            name: names.get(i).cloned().unwrap_or_default(),
            area: RegionArea {
                x: parse_float(xs.get(i)),
                y: parse_float(ys.get(i)),
                w: parse_float(ws.get(i)),
                h: parse_float(hs.get(i)),
                unit: units
                    .get(i)
                    .and_then(|u| AreaUnit::parse(u))
                    .unwrap_or_default(),
            },
        })
        .collect();

    RegionSet {
        applied_to_dimensions,
        region_list,
    }
}

fn join<T: ToString>(values: impl Iterator<Item = T>) -> String {
    values
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Flattens a full [`RegionSet`] into the field assignments the external tool
/// expects: each of the seven per-region fields joined with `", "`.
pub fn prepare(set: &RegionSet) -> Vec<(&'static str, String)> {
    let regions = &set.region_list;
    let mut fields = Vec::with_capacity(10);

    if let Some(w) = set.applied_to_dimensions.w {
        fields.push((DIMENSIONS_W, w.to_string()));
    }
    if let Some(h) = set.applied_to_dimensions.h {
        fields.push((DIMENSIONS_H, h.to_string()));
    }
    fields.push((DIMENSIONS_UNIT, set.applied_to_dimensions.unit.to_string()));

    fields.push((REGION_TYPE, join(regions.iter().map(|r| r.kind))));
    fields.push((REGION_NAME, regions.iter().map(|r| r.name.as_str()).collect::<Vec<_>>().join(", ")));
    fields.push((AREA_X, join(regions.iter().map(|r| r.area.x))));
    fields.push((AREA_Y, join(regions.iter().map(|r| r.area.y))));
    fields.push((AREA_W, join(regions.iter().map(|r| r.area.w))));
    fields.push((AREA_H, join(regions.iter().map(|r| r.area.h))));
    fields.push((AREA_UNIT, join(regions.iter().map(|r| r.area.unit))));

    fields
}

/// Flattens one new region into per-field values, used for additive writes.
pub fn prepare_area(region: &Region) -> Vec<(&'static str, String)> {
    vec![
        (REGION_TYPE, region.kind.to_string()),
        (REGION_NAME, region.name.clone()),
        (AREA_X, region.area.x.to_string()),
        (AREA_Y, region.area.y.to_string()),
        (AREA_W, region.area.w.to_string()),
        (AREA_H, region.area.h.to_string()),
        (AREA_UNIT, region.area.unit.to_string()),
    ]
}

/// The reference-frame fields alone, written before the first region of a
/// file so the tool has dimensions to anchor the coordinates to.
pub fn prepare_dimensions(width: u32, height: u32, unit: AreaUnit) -> Vec<(&'static str, String)> {
    vec![
        (DIMENSIONS_W, width.to_string()),
        (DIMENSIONS_H, height.to_string()),
        (DIMENSIONS_UNIT, unit.to_string()),
    ]
}
