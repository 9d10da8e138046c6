use tracing::debug;

use crate::utils::utils::{u32_to_u8_be, u8_to_u32_be};

/*  The pHYs chunk holds the intended physical pixel size of the image:
    Pixels per unit, X axis: 4 bytes (big-endian unsigned integer)
    Pixels per unit, Y axis: 4 bytes (big-endian unsigned integer)
    Unit specifier:          1 byte (0 = unknown, 1 = meter)
The chunk must appear before the first IDAT chunk. */

const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
const CHUNK_TYPE_PHYS: [u8; 4] = *b"pHYs";
const CHUNK_TYPE_IDAT: [u8; 4] = *b"IDAT";
const UNIT_METER: u8 = 1;
const PHYS_CHUNK_LEN: usize = 21;

/// build_phys_chunk constructs a complete pHYs chunk for an isotropic
/// resolution given in pixels per millimeter: 4-byte length, 4-byte type,
/// 9-byte payload and a CRC-32 over type + payload.
pub(crate) fn build_phys_chunk(resolution_ppmm: f64) -> [u8; PHYS_CHUNK_LEN] {
    let pixels_per_meter = (resolution_ppmm * 1000.0).round() as u32;

    let mut chunk = [0u8; PHYS_CHUNK_LEN];
    chunk[0..4].copy_from_slice(&u32_to_u8_be(9));
    chunk[4..8].copy_from_slice(&CHUNK_TYPE_PHYS);
    chunk[8..12].copy_from_slice(&u32_to_u8_be(pixels_per_meter));
    chunk[12..16].copy_from_slice(&u32_to_u8_be(pixels_per_meter));
    chunk[16] = UNIT_METER;

    // The CRC never covers the length field
    let crc = crc32fast::hash(&chunk[4..17]);
    chunk[17..21].copy_from_slice(&u32_to_u8_be(crc));
    chunk
}

/// find_idat_offset walks the length-prefixed chunk sequence and returns the
/// byte offset of the first IDAT chunk's length field. The walk starts past
/// the container signature when present and gives up on any truncated or
/// malformed chunk header.
pub(crate) fn find_idat_offset(stream: &[u8]) -> Option<usize> {
    let mut pos = if stream.starts_with(&PNG_SIGNATURE) { 8 } else { 0 };
    while pos + 8 <= stream.len() {
        let payload_len = u8_to_u32_be(&stream[pos..pos + 4])? as usize;
        if stream[pos + 4..pos + 8] == CHUNK_TYPE_IDAT {
            return Some(pos);
        }
        // Skip length + type + payload + CRC
        pos = pos.checked_add(12 + payload_len)?;
    }
    None
}

/// set_resolution_metadata splices a pHYs resolution chunk into an encoded
/// image stream, immediately before the first IDAT chunk. Every other byte
/// of the stream is preserved as-is. Streams without an IDAT chunk are
/// returned unchanged; the operation is insertion-only, so applying it to a
/// stream that already carries a pHYs chunk adds a second one.
///
/// # Arguments
/// * `stream` - chunked container image bytes
/// * `resolution_ppmm` - physical resolution in pixels per millimeter
///
/// # Returns
/// * `Vec<u8>` - the stream with the resolution chunk inserted
pub fn set_resolution_metadata(stream: &[u8], resolution_ppmm: f64) -> Vec<u8> {
    match find_idat_offset(stream) {
        Some(offset) => {
            debug!(offset, resolution_ppmm, "inserting pHYs chunk");
            let chunk = build_phys_chunk(resolution_ppmm);
            let mut patched = Vec::with_capacity(stream.len() + chunk.len());
            patched.extend_from_slice(&stream[..offset]);
            patched.extend_from_slice(&chunk);
            patched.extend_from_slice(&stream[offset..]);
            patched
        }
        None => stream.to_vec(),
    }
}
