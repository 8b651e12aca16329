#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) enum Utf16LeDecodeError {
    OddLength,
    InvalidData,
}

/// Decode a UTF-16LE byte slice, dropping trailing NUL (0x0000) code units.
///
/// Interior NULs are kept. With `lossy`, unpaired surrogates become U+FFFD instead of failing;
/// an odd byte count is always an error.
pub(crate) fn decode_utf16le_trim_nul(
    bytes: &[u8],
    lossy: bool,
) -> Result<String, Utf16LeDecodeError> {
    if !bytes.len().is_multiple_of(2) {
        return Err(Utf16LeDecodeError::OddLength);
    }

    let mut units = Vec::with_capacity(bytes.len() / 2);
    for chunk in bytes.chunks_exact(2) {
        units.push(u16::from_le_bytes([chunk[0], chunk[1]]));
    }

    let end = units.iter().rposition(|&c| c != 0).map_or(0, |i| i + 1);
    let slice = &units[..end];

    // Fast path: pure ASCII converts directly without surrogate handling.
    if slice.iter().all(|&c| c <= 0x7F) {
        return Ok(slice.iter().map(|&c| c as u8 as char).collect());
    }

    if lossy {
        Ok(String::from_utf16_lossy(slice))
    } else {
        String::from_utf16(slice).map_err(|_| Utf16LeDecodeError::InvalidData)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn utf16le(units: &[u16]) -> Vec<u8> {
        units.iter().flat_map(|u| u.to_le_bytes()).collect()
    }

    #[test]
    fn test_strips_only_trailing_nuls() {
        let bytes = utf16le(&[0x48, 0x00, 0x69, 0x00, 0x00]);
        assert_eq!(decode_utf16le_trim_nul(&bytes, false).unwrap(), "H\0i");
        assert_eq!(decode_utf16le_trim_nul(&[0, 0, 0, 0], false).unwrap(), "");
        assert_eq!(decode_utf16le_trim_nul(&[], false).unwrap(), "");
    }

    #[test]
    fn test_decodes_non_ascii_and_surrogate_pairs() {
        let bytes = utf16le(&[0x00E9, 0xD83D, 0xDE00]);
        assert_eq!(decode_utf16le_trim_nul(&bytes, false).unwrap(), "é😀");
    }

    #[test]
    fn test_unpaired_surrogate_is_rejected_unless_lossy() {
        let bytes = utf16le(&[0x0041, 0xD800]);
        assert_eq!(
            decode_utf16le_trim_nul(&bytes, false),
            Err(Utf16LeDecodeError::InvalidData)
        );
        assert_eq!(decode_utf16le_trim_nul(&bytes, true).unwrap(), "A\u{FFFD}");
    }

    #[test]
    fn test_odd_length_is_rejected() {
        assert_eq!(
            decode_utf16le_trim_nul(&[0x41, 0x00, 0x42], true),
            Err(Utf16LeDecodeError::OddLength)
        );
    }
}
