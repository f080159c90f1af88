//! XMP decoding: locates the `x:xmpmeta` packet inside a file's bytes and
//! pulls keywords, rating and MWG region fields out of it.
//!
//! Region data is flattened into the same field names the external rewrite
//! tool reports, so one region codec serves both strategies.

use crate::regions::codec;
use roxmltree::{Document, Node};
use serde_json::{Map, Value};
use tracing::debug;

const PACKET_OPEN: &[u8] = b"<x:xmpmeta";
const PACKET_CLOSE: &[u8] = b"</x:xmpmeta>";

/// The XMP-sourced slice of the metadata.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XmpData {
    pub keywords: Vec<String>,
    pub rating: Option<f64>,
    /// Flattened region fields, keyed like the external tool's output.
    pub region_fields: Map<String, Value>,
}

fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Extracts the raw XMP packet from a file's bytes, if one is present.
pub fn extract_packet(bytes: &[u8]) -> Option<&[u8]> {
    let start = find_subsequence(bytes, PACKET_OPEN)?;
    let end = find_subsequence(&bytes[start..], PACKET_CLOSE)? + start + PACKET_CLOSE.len();
    Some(&bytes[start..end])
}

// roxmltree's attribute() matches unqualified names only, so namespaced
// attributes (mwg-rs:Type and friends) are matched by local name by hand.
fn attr<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    node.attributes()
        .find(|a| a.name() == name)
        .map(|a| a.value())
}

fn child<'a, 'i>(node: Node<'a, 'i>, name: &str) -> Option<Node<'a, 'i>> {
    node.children()
        .find(|c| c.is_element() && c.tag_name().name() == name)
}

// XMP allows every property as either an attribute or a child element.
fn value_of(node: Node<'_, '_>, name: &str) -> Option<String> {
    if let Some(v) = attr(node, name) {
        return Some(v.to_string());
    }
    child(node, name)
        .and_then(|c| c.text())
        .map(|t| t.trim().to_string())
}

fn parse_keywords(doc: &Document<'_>) -> Vec<String> {
    let Some(subject) = doc
        .descendants()
        .find(|n| n.is_element() && n.tag_name().name() == "subject")
    else {
        return Vec::new();
    };
    subject
        .descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == "li")
        .filter_map(|n| n.text())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

fn parse_rating(doc: &Document<'_>) -> Option<f64> {
    for node in doc.descendants().filter(Node::is_element) {
        if node.tag_name().name() == "Rating" {
            if let Some(v) = node.text().and_then(|t| t.trim().parse().ok()) {
                return Some(v);
            }
        }
        if let Some(v) = attr(node, "Rating").and_then(|t| t.trim().parse().ok()) {
            return Some(v);
        }
    }
    None
}

fn parse_regions(doc: &Document<'_>) -> Map<String, Value> {
    let mut fields = Map::new();

    if let Some(dims) = doc
        .descendants()
        .find(|n| n.is_element() && n.tag_name().name() == "AppliedToDimensions")
    {
        for (name, key) in [
            ("w", codec::DIMENSIONS_W),
            ("h", codec::DIMENSIONS_H),
            ("unit", codec::DIMENSIONS_UNIT),
        ] {
            if let Some(v) = value_of(dims, name) {
                fields.insert(key.to_string(), Value::String(v));
            }
        }
    }

    let Some(list) = doc
        .descendants()
        .find(|n| n.is_element() && n.tag_name().name() == "RegionList")
    else {
        return fields;
    };

    let mut kinds = Vec::new();
    let mut names = Vec::new();
    let mut area: [Vec<Value>; 5] = Default::default();
    for item in list
        .descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == "li")
    {
        kinds.push(Value::String(value_of(item, "Type").unwrap_or_default()));
        names.push(Value::String(value_of(item, "Name").unwrap_or_default()));
        let rect = child(item, "Area");
        for (slot, name) in ["x", "y", "w", "h", "unit"].into_iter().enumerate() {
            let value = rect.and_then(|r| value_of(r, name)).unwrap_or_default();
            area[slot].push(Value::String(value));
        }
    }

    if !kinds.is_empty() {
        let [xs, ys, ws, hs, units] = area;
        fields.insert(codec::REGION_TYPE.to_string(), Value::Array(kinds));
        fields.insert(codec::REGION_NAME.to_string(), Value::Array(names));
        fields.insert(codec::AREA_X.to_string(), Value::Array(xs));
        fields.insert(codec::AREA_Y.to_string(), Value::Array(ys));
        fields.insert(codec::AREA_W.to_string(), Value::Array(ws));
        fields.insert(codec::AREA_H.to_string(), Value::Array(hs));
        fields.insert(codec::AREA_UNIT.to_string(), Value::Array(units));
    }
    fields
}

/// Decodes the XMP packet embedded in a file, if any.
///
/// An absent or unparseable packet yields `None`; XMP is an optional source
/// and its failure never fails the pipeline.
pub fn decode(bytes: &[u8]) -> Option<XmpData> {
    let packet = extract_packet(bytes)?;
    let text = std::str::from_utf8(packet).ok()?;
    let doc = match Document::parse(text) {
        Ok(doc) => doc,
        Err(error) => {
            debug!(%error, "ignoring malformed XMP packet");
            return None;
        }
    };

    Some(XmpData {
        keywords: parse_keywords(&doc),
        rating: parse_rating(&doc),
        region_fields: parse_regions(&doc),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regions::{AreaUnit, RegionKind, codec as region_codec};

    const PACKET: &str = r#"<x:xmpmeta xmlns:x="adobe:ns:meta/">
 <rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
  <rdf:Description rdf:about=""
    xmlns:dc="http://purl.org/dc/elements/1.1/"
    xmlns:xmp="http://ns.adobe.com/xap/1.0/"
    xmlns:mwg-rs="http://www.metadataworkinggroup.com/schemas/regions/"
    xmlns:stDim="http://ns.adobe.com/xap/1.0/sType/Dimensions#"
    xmlns:stArea="http://ns.adobe.com/xmp/sType/Area#"
    xmp:Rating="4">
   <dc:subject>
    <rdf:Bag>
     <rdf:li>holiday</rdf:li>
     <rdf:li>beach</rdf:li>
    </rdf:Bag>
   </dc:subject>
   <mwg-rs:Regions rdf:parseType="Resource">
    <mwg-rs:AppliedToDimensions stDim:w="1080" stDim:h="720" stDim:unit="pixel"/>
    <mwg-rs:RegionList>
     <rdf:Bag>
      <rdf:li rdf:parseType="Resource">
       <mwg-rs:Type>Face</mwg-rs:Type>
       <mwg-rs:Name>First name</mwg-rs:Name>
       <mwg-rs:Area stArea:x="0.778704" stArea:y="0.636806"
                    stArea:w="0.440741" stArea:h="0.723611"
                    stArea:unit="normalized"/>
      </rdf:li>
     </rdf:Bag>
    </mwg-rs:RegionList>
   </mwg-rs:Regions>
  </rdf:Description>
 </rdf:RDF>
</x:xmpmeta>"#;

    fn file_with_packet() -> Vec<u8> {
        let mut bytes = vec![0xFF, 0xD8, 0xFF, 0xE1, 0x00, 0x00];
        bytes.extend_from_slice(PACKET.as_bytes());
        bytes.extend_from_slice(&[0xFF, 0xD9]);
        bytes
    }

    #[test]
    fn extracts_packet_between_surrounding_bytes() {
        let bytes = file_with_packet();
        let packet = extract_packet(&bytes).unwrap();
        assert_eq!(packet, PACKET.as_bytes());
    }

    #[test]
    fn no_packet_decodes_to_none() {
        assert_eq!(decode(&[0xFF, 0xD8, 0xFF, 0xD9]), None);
    }

    #[test]
    fn malformed_packet_decodes_to_none() {
        let bytes = b"<x:xmpmeta oops </x:xmpmeta>".to_vec();
        assert_eq!(decode(&bytes), None);
    }

    #[test]
    fn decodes_keywords_and_rating() {
        let data = decode(&file_with_packet()).unwrap();
        assert_eq!(data.keywords, vec!["holiday", "beach"]);
        assert_eq!(data.rating, Some(4.0));
    }

    #[test]
    fn region_fields_feed_the_region_codec() {
        let data = decode(&file_with_packet()).unwrap();
        let set = region_codec::parse(&Value::Object(data.region_fields));

        // --- Assertions ---
        assert_eq!(set.applied_to_dimensions.w, Some(1080));
        assert_eq!(set.applied_to_dimensions.h, Some(720));
        assert_eq!(set.region_list.len(), 1);
        let region = &set.region_list[0];
        assert_eq!(region.kind, RegionKind::Face);
        assert_eq!(region.name, "First name");
        assert_eq!(region.area.x, 0.778704);
        assert_eq!(region.area.unit, AreaUnit::Normalized);
    }

    #[test]
    fn rating_as_element_text_also_parses() {
        let packet = r#"<x:xmpmeta xmlns:x="adobe:ns:meta/">
 <rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
  <rdf:Description xmlns:xmp="http://ns.adobe.com/xap/1.0/">
   <xmp:Rating>3</xmp:Rating>
  </rdf:Description>
 </rdf:RDF>
</x:xmpmeta>"#;
        let data = decode(packet.as_bytes()).unwrap();
        assert_eq!(data.rating, Some(3.0));
        assert!(data.keywords.is_empty());
    }
}
