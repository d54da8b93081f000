//! Hex and buffer helpers used when packing payloads and decomposing
//! responses.

use crate::error::SmeshError;

/// Decode a hex string, rejecting odd lengths and non-hex characters.
pub fn hex_to_bytes(s: &str) -> Result<Vec<u8>, SmeshError> {
    hex::decode(s).map_err(|e| SmeshError::InvalidHex(e.to_string()))
}

/// Lowercase hex encoding, inverse of [`hex_to_bytes`].
pub fn bytes_to_hex(data: &[u8]) -> String {
    hex::encode(data)
}

/// Split `data` into `lengths.len() + 1` slices: one of each requested
/// length, in order, then a trailing slice with whatever is left.
///
/// The trailing slice is always returned, even when empty — callers
/// expecting an exact-length response must check it themselves rather
/// than have bytes dropped silently.
pub fn split_by_lengths<'a>(
    data: &'a [u8],
    lengths: &[usize],
) -> Result<Vec<&'a [u8]>, SmeshError> {
    let wanted: usize = lengths.iter().sum();
    if data.len() < wanted {
        return Err(SmeshError::InvalidResponse(format!(
            "buffer too short: {} bytes, need at least {wanted}",
            data.len()
        )));
    }

    let mut segments = Vec::with_capacity(lengths.len() + 1);
    let mut offset = 0;
    for &len in lengths {
        segments.push(&data[offset..offset + len]);
        offset += len;
    }
    segments.push(&data[offset..]);

    Ok(segments)
}
