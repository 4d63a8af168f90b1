//! Variable-length quantity codec
//!
//! Delta-times and meta/sysex lengths are stored as base-128 integers,
//! most significant group first, with the high bit set on every byte except
//! the last.

/// Largest value the writer emits; fits in four bytes.
pub const MAX_VALUE: u32 = 0x0FFF_FFFF;

/// Decode a VLQ starting at `cursor`, never reading at or past `end`.
///
/// Returns the value and the cursor just past the last byte consumed. If
/// `end` is reached before a terminating byte, the value accumulated so far
/// is returned.
pub fn decode(data: &[u8], mut cursor: usize, end: usize) -> (u32, usize) {
    let end = end.min(data.len());
    let mut value: u32 = 0;
    while cursor < end {
        let byte = data[cursor];
        cursor += 1;
        value = (value << 7) | u32::from(byte & 0x7F);
        if byte & 0x80 == 0 {
            break;
        }
    }
    (value, cursor)
}

/// Append the minimal VLQ encoding of `value` to `out`.
pub fn write(out: &mut Vec<u8>, value: u32) {
    let mut groups = [0u8; 5];
    let mut len = 0;
    let mut rest = value;
    loop {
        groups[len] = (rest & 0x7F) as u8;
        len += 1;
        rest >>= 7;
        if rest == 0 {
            break;
        }
    }
    for i in (0..len).rev() {
        let continuation = if i == 0 { 0x00 } else { 0x80 };
        out.push(groups[i] | continuation);
    }
}

/// Encode `value` as a standalone VLQ byte sequence.
pub fn encode(value: u32) -> Vec<u8> {
    let mut out = Vec::with_capacity(4);
    write(&mut out, value);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_known_values() {
        assert_eq!(encode(0), vec![0x00]);
        assert_eq!(encode(0x40), vec![0x40]);
        assert_eq!(encode(0x7F), vec![0x7F]);
        assert_eq!(encode(0x80), vec![0x81, 0x00]);
        assert_eq!(encode(0x2000), vec![0xC0, 0x00]);
        assert_eq!(encode(0x3FFF), vec![0xFF, 0x7F]);
        assert_eq!(encode(0x4000), vec![0x81, 0x80, 0x00]);
        assert_eq!(encode(MAX_VALUE), vec![0xFF, 0xFF, 0xFF, 0x7F]);
    }

    #[test]
    fn test_decode_known_values() {
        assert_eq!(decode(&[0x00], 0, 1), (0, 1));
        assert_eq!(decode(&[0x81, 0x00], 0, 2), (0x80, 2));
        assert_eq!(decode(&[0xFF, 0xFF, 0xFF, 0x7F], 0, 4), (MAX_VALUE, 4));
    }

    #[test]
    fn test_decode_stops_at_terminator() {
        let data = [0x83, 0x60, 0x90, 0x3C];
        assert_eq!(decode(&data, 0, data.len()), (480, 2));
    }

    #[test]
    fn test_decode_truncated_returns_partial() {
        // Continuation bit set on the last available byte
        let data = [0x81, 0x80];
        assert_eq!(decode(&data, 0, data.len()), (0x80, 2));

        // `end` bounds the read even when more bytes exist
        let data = [0x81, 0x00];
        assert_eq!(decode(&data, 0, 1), (1, 1));
    }

    #[test]
    fn test_decode_empty_range() {
        assert_eq!(decode(&[0x40], 1, 1), (0, 1));
        assert_eq!(decode(&[], 0, 0), (0, 0));
    }

    #[test]
    fn test_identity_over_writer_range() {
        let samples = [
            0u32, 1, 0x7F, 0x80, 479, 480, 0x3FFF, 0x4000, 96_000, 0x1F_FFFF, 0x20_0000, MAX_VALUE,
        ];
        for &value in &samples {
            let bytes = encode(value);
            assert!(bytes.len() <= 4);
            assert_eq!(decode(&bytes, 0, bytes.len()), (value, bytes.len()));
        }
    }
}
