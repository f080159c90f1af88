//! Minimal IPTC-IIM reader: keywords only.
//!
//! Walks the JPEG's APP13 segments, the Photoshop `8BIM` resources inside
//! them, and the IIM datasets inside resource 0x0404. Everything except
//! record 2 dataset 25 (keywords) is skipped.

const APP13: u8 = 0xED;
const RESOURCE_IPTC: u16 = 0x0404;
const RECORD_APPLICATION: u8 = 0x02;
const DATASET_KEYWORDS: u8 = 0x19;

fn read_u16(data: &[u8], at: usize) -> Option<u16> {
    Some(u16::from_be_bytes([*data.get(at)?, *data.get(at + 1)?]))
}

fn read_u32(data: &[u8], at: usize) -> Option<u32> {
    Some(u32::from_be_bytes([
        *data.get(at)?,
        *data.get(at + 1)?,
        *data.get(at + 2)?,
        *data.get(at + 3)?,
    ]))
}

/// Collects the payloads of every APP13 segment in a JPEG stream.
fn app13_segments(data: &[u8]) -> Vec<&[u8]> {
    let mut segments = Vec::new();
    if data.len() < 2 || data[0] != 0xFF || data[1] != 0xD8 {
        return segments;
    }

    let mut pos = 2;
    while pos + 1 < data.len() {
        if data[pos] != 0xFF {
            break;
        }
        while pos < data.len() && data[pos] == 0xFF {
            pos += 1;
        }
        let Some(&marker) = data.get(pos) else { break };
        pos += 1;

        match marker {
            // standalone markers carry no length
            0x01 | 0xD0..=0xD7 => continue,
            // entropy-coded data or end of image: nothing after this point
            0xD8 | 0xD9 | 0xDA => break,
            _ => {
                let Some(length) = read_u16(data, pos) else { break };
                let length = length as usize;
                if length < 2 || pos + length > data.len() {
                    break;
                }
                if marker == APP13 {
                    segments.push(&data[pos + 2..pos + length]);
                }
                pos += length;
            }
        }
    }
    segments
}

/// Extracts the IIM blocks out of a Photoshop `8BIM` resource stream.
fn iim_blocks<'a>(segment: &'a [u8]) -> Vec<&'a [u8]> {
    let mut blocks = Vec::new();
    // segments open with a NUL-terminated signature, e.g. "Photoshop 3.0\0"
    let mut pos = match segment.iter().position(|&b| b == 0) {
        Some(nul) => nul + 1,
        None => return blocks,
    };

    while pos + 12 <= segment.len() {
        if &segment[pos..pos + 4] != b"8BIM" {
            break;
        }
        let Some(resource_id) = read_u16(segment, pos + 4) else {
            break;
        };
        // Pascal name: length byte + bytes, padded to even total length
        let name_len = segment[pos + 6] as usize;
        let mut cursor = pos + 7 + name_len;
        if (1 + name_len) % 2 == 1 {
            cursor += 1;
        }

        let Some(size) = read_u32(segment, cursor) else {
            break;
        };
        let size = size as usize;
        cursor += 4;
        if cursor + size > segment.len() {
            break;
        }
        if resource_id == RESOURCE_IPTC {
            blocks.push(&segment[cursor..cursor + size]);
        }
        cursor += size;
        if size % 2 == 1 {
            cursor += 1;
        }
        pos = cursor;
    }
    blocks
}

fn keywords_in_block(block: &[u8], keywords: &mut Vec<String>) {
    let mut pos = 0;
    while pos + 5 <= block.len() {
        // dataset marker, record number, dataset number, u16 length
        if block[pos] != 0x1C {
            pos += 1;
            continue;
        }
        let record = block[pos + 1];
        let dataset = block[pos + 2];
        let Some(length) = read_u16(block, pos + 3) else {
            return;
        };
        let length = length as usize;
        let start = pos + 5;
        if start + length > block.len() {
            return;
        }
        if record == RECORD_APPLICATION && dataset == DATASET_KEYWORDS {
            let text = String::from_utf8_lossy(&block[start..start + length]);
            let text = text.trim();
            if !text.is_empty() {
                keywords.push(text.to_string());
            }
        }
        pos = start + length;
    }
}

/// Reads the IPTC keywords of a JPEG byte stream.
///
/// Missing or malformed IPTC data yields an empty list; this source is
/// only consulted when XMP carries no keywords.
pub fn keywords(data: &[u8]) -> Vec<String> {
    let mut keywords = Vec::new();
    for segment in app13_segments(data) {
        for block in iim_blocks(segment) {
            keywords_in_block(block, &mut keywords);
        }
    }
    keywords
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iim_keyword_dataset(keyword: &str) -> Vec<u8> {
        let mut block = vec![0x1C, RECORD_APPLICATION, DATASET_KEYWORDS];
        block.extend_from_slice(&(keyword.len() as u16).to_be_bytes());
        block.extend_from_slice(keyword.as_bytes());
        block
    }

    fn photoshop_segment(iim: &[u8]) -> Vec<u8> {
        let mut segment = b"Photoshop 3.0\0".to_vec();
        segment.extend_from_slice(b"8BIM");
        segment.extend_from_slice(&RESOURCE_IPTC.to_be_bytes());
        segment.extend_from_slice(&[0x00, 0x00]); // empty Pascal name, padded
        segment.extend_from_slice(&(iim.len() as u32).to_be_bytes());
        segment.extend_from_slice(iim);
        if iim.len() % 2 == 1 {
            segment.push(0x00);
        }
        segment
    }

    fn jpeg_with_app13(segment: &[u8]) -> Vec<u8> {
        let mut jpeg = vec![0xFF, 0xD8, 0xFF, APP13];
        jpeg.extend_from_slice(&((segment.len() + 2) as u16).to_be_bytes());
        jpeg.extend_from_slice(segment);
        jpeg.extend_from_slice(&[0xFF, 0xD9]);
        jpeg
    }

    #[test]
    fn reads_keywords_from_app13() {
        let mut iim = iim_keyword_dataset("holiday");
        iim.extend_from_slice(&iim_keyword_dataset("beach"));
        let jpeg = jpeg_with_app13(&photoshop_segment(&iim));
        assert_eq!(keywords(&jpeg), vec!["holiday", "beach"]);
    }

    #[test]
    fn other_datasets_are_skipped() {
        // record 2 dataset 120 is a caption, not a keyword
        let mut iim = vec![0x1C, 0x02, 0x78];
        iim.extend_from_slice(&5u16.to_be_bytes());
        iim.extend_from_slice(b"hello");
        iim.extend_from_slice(&iim_keyword_dataset("kept"));
        let jpeg = jpeg_with_app13(&photoshop_segment(&iim));
        assert_eq!(keywords(&jpeg), vec!["kept"]);
    }

    #[test]
    fn no_app13_yields_no_keywords() {
        let jpeg = vec![0xFF, 0xD8, 0xFF, 0xD9];
        assert!(keywords(&jpeg).is_empty());
    }

    #[test]
    fn truncated_dataset_is_dropped() {
        let mut iim = vec![0x1C, RECORD_APPLICATION, DATASET_KEYWORDS];
        iim.extend_from_slice(&200u16.to_be_bytes());
        iim.extend_from_slice(b"short");
        let jpeg = jpeg_with_app13(&photoshop_segment(&iim));
        assert!(keywords(&jpeg).is_empty());
    }

    #[test]
    fn non_jpeg_input_is_tolerated() {
        assert!(keywords(b"not a jpeg at all").is_empty());
    }
}
