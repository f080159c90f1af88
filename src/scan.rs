//! Byte-level JPEG marker walk to recover pixel dimensions without a full decode.
//!
//! Runs as one of the overlapping sources inside the image pipeline, so it has
//! to stay quiet on corrupt or truncated input: everything that is not a
//! missing/garbled SOI marker maps to [`ScanError::NotFound`].

use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ScanError {
    #[error("buffer too small or missing JPEG SOI marker")]
    MalformedInput,

    #[error("no frame header found before end of stream")]
    NotFound,
}

/// Pixel dimensions read from a Start-Of-Frame segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct JpegDimensions {
    pub width: u32,
    pub height: u32,
}

fn read_u16_be(data: &[u8], offset: usize) -> u16 {
    u16::from_be_bytes([data[offset], data[offset + 1]])
}

/// Walks JPEG marker segments and returns the dimensions from the first
/// Start-Of-Frame header.
///
/// The walk follows ITU T.81 Table B.1: standalone markers (`0xD0..=0xD9` and
/// the reserved `0x01`) carry no payload, every other marker in `0xC0..=0xFE`
/// carries a big-endian length that counts its own two bytes. SOF markers are
/// `0xC0..=0xCF` minus DHT (`0xC4`), JPG (`0xC8`) and DAC (`0xCC`); their
/// payload stores height at offset 1 and width at offset 3.
pub fn jpeg_dimensions(data: &[u8]) -> Result<JpegDimensions, ScanError> {
    if data.len() < 2 {
        return Err(ScanError::MalformedInput);
    }
    if data[0] != 0xFF || data[1] != 0xD8 {
        return Err(ScanError::MalformedInput);
    }

    let mut offset = 2;
    loop {
        if data.len() - offset < 2 {
            return Err(ScanError::NotFound);
        }
        if data[offset] != 0xFF {
            return Err(ScanError::NotFound);
        }
        offset += 1;

        let mut code = data[offset];
        offset += 1;

        // Fill bytes: any number of 0xFF may pad the real marker code.
        while code == 0xFF {
            if offset >= data.len() {
                return Err(ScanError::NotFound);
            }
            code = data[offset];
            offset += 1;
        }

        let length = if (0xD0..=0xD9).contains(&code) || code == 0x01 {
            0
        } else if (0xC0..=0xFE).contains(&code) {
            if data.len() - offset < 2 {
                return Err(ScanError::NotFound);
            }
            let declared = read_u16_be(data, offset) as usize;
            offset += 2;
            declared.saturating_sub(2)
        } else {
            return Err(ScanError::NotFound);
        };

        // EOI or SOS: entropy-coded data starts, no frame header will follow.
        if code == 0xD9 || code == 0xDA {
            return Err(ScanError::NotFound);
        }

        if length >= 5
            && (0xC0..=0xCF).contains(&code)
            && code != 0xC4
            && code != 0xC8
            && code != 0xCC
        {
            if data.len() - offset < length {
                return Err(ScanError::NotFound);
            }
            return Ok(JpegDimensions {
                height: u32::from(read_u16_be(data, offset + 1)),
                width: u32::from(read_u16_be(data, offset + 3)),
            });
        }

        // A declared length past the end of the buffer means truncation.
        if length > data.len() - offset {
            return Err(ScanError::NotFound);
        }
        offset += length;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds a marker segment: 0xFF, code, u16 length (payload + 2), payload.
    fn segment(code: u8, payload: &[u8]) -> Vec<u8> {
        let mut out = vec![0xFF, code];
        out.extend_from_slice(&((payload.len() as u16 + 2).to_be_bytes()));
        out.extend_from_slice(payload);
        out
    }

    fn sof0_payload(width: u16, height: u16) -> Vec<u8> {
        let mut p = vec![8]; // bit depth
        p.extend_from_slice(&height.to_be_bytes());
        p.extend_from_slice(&width.to_be_bytes());
        p.push(3); // component count
        p
    }

    fn minimal_jpeg(width: u16, height: u16) -> Vec<u8> {
        let mut bytes = vec![0xFF, 0xD8];
        bytes.extend(segment(0xE0, b"JFIF\0rest-of-app0"));
        bytes.extend(segment(0xC0, &sof0_payload(width, height)));
        bytes
    }

    #[test]
    fn reads_dimensions_from_sof0() {
        let result = jpeg_dimensions(&minimal_jpeg(480, 360)).unwrap();
        assert_eq!(result.width, 480);
        assert_eq!(result.height, 360);
    }

    #[test]
    fn reads_progressive_sof2() {
        let mut bytes = vec![0xFF, 0xD8];
        bytes.extend(segment(0xC2, &sof0_payload(1920, 1080)));
        let result = jpeg_dimensions(&bytes).unwrap();
        assert_eq!(result.width, 1920);
        assert_eq!(result.height, 1080);
    }

    #[test]
    fn skips_fill_bytes_before_marker_code() {
        let mut bytes = vec![0xFF, 0xD8, 0xFF, 0xFF, 0xFF];
        let sof = segment(0xC0, &sof0_payload(12, 34));
        // Drop the segment's own 0xFF prefix; the fill bytes above replace it.
        bytes.extend_from_slice(&sof[1..]);
        let result = jpeg_dimensions(&bytes).unwrap();
        assert_eq!(result.width, 12);
        assert_eq!(result.height, 34);
    }

    #[test]
    fn skips_dht_marker() {
        let mut bytes = vec![0xFF, 0xD8];
        bytes.extend(segment(0xC4, &[0u8; 8])); // DHT is not a frame header
        bytes.extend(segment(0xC1, &sof0_payload(640, 480)));
        assert!(jpeg_dimensions(&bytes).is_ok());
    }

    #[test]
    fn short_buffer_is_malformed() {
        assert_eq!(jpeg_dimensions(&[]), Err(ScanError::MalformedInput));
        assert_eq!(jpeg_dimensions(&[0xFF]), Err(ScanError::MalformedInput));
    }

    #[test]
    fn wrong_leading_marker_is_malformed() {
        assert_eq!(
            jpeg_dimensions(b"not a jpeg at all"),
            Err(ScanError::MalformedInput)
        );
        assert_eq!(
            jpeg_dimensions(&[0x89, 0x50, 0x4E, 0x47]),
            Err(ScanError::MalformedInput)
        );
    }

    #[test]
    fn sos_before_frame_header_is_not_found() {
        let mut bytes = vec![0xFF, 0xD8];
        bytes.extend(segment(0xDA, &[0u8; 6]));
        assert_eq!(jpeg_dimensions(&bytes), Err(ScanError::NotFound));
    }

    #[test]
    fn eoi_before_frame_header_is_not_found() {
        let bytes = vec![0xFF, 0xD8, 0xFF, 0xD9];
        assert_eq!(jpeg_dimensions(&bytes), Err(ScanError::NotFound));
    }

    #[test]
    fn truncated_segment_is_not_found() {
        let mut bytes = minimal_jpeg(480, 360);
        bytes.truncate(bytes.len() - 4); // cut into the SOF payload
        assert_eq!(jpeg_dimensions(&bytes), Err(ScanError::NotFound));
    }

    #[test]
    fn segment_length_past_buffer_end_is_not_found() {
        // APP0 declaring a 0xFFFF-byte payload in a 6-byte buffer.
        let bytes = [0xFF, 0xD8, 0xFF, 0xE0, 0xFF, 0xFF];
        assert_eq!(jpeg_dimensions(&bytes), Err(ScanError::NotFound));
    }

    #[test]
    fn garbage_after_soi_is_not_found() {
        let bytes = vec![0xFF, 0xD8, 0x00, 0x01, 0x02, 0x03];
        assert_eq!(jpeg_dimensions(&bytes), Err(ScanError::NotFound));
    }

    #[test]
    fn never_panics_on_arbitrary_prefixes() {
        let full = minimal_jpeg(480, 360);
        for cut in 0..full.len() {
            let _ = jpeg_dimensions(&full[..cut]);
        }
    }
}
