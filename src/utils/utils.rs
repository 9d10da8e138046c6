pub fn u32_to_u8_be(v: u32) -> [u8; 4] {
    v.to_be_bytes()
}

pub fn u8_to_u32_be(v: &[u8]) -> Option<u32> {
    let bytes: [u8; 4] = v.get(0..4)?.try_into().ok()?;
    Some(u32::from_be_bytes(bytes))
}

/// Converts a physical length to a pixel count at the given resolution,
/// rounding up so the raster always covers the physical area.
pub fn mm_to_px_ceil(length_mm: f64, resolution_ppmm: f64) -> u32 {
    (length_mm * resolution_ppmm).ceil() as u32
}

pub fn mm_to_px_round(length_mm: f64, resolution_ppmm: f64) -> u32 {
    (length_mm * resolution_ppmm).round() as u32
}
