//! Word-level codecs shared by every field encoder.
//!
//! Floats travel as IEEE-754 binary32, low word first. Signed integers travel as their
//! two's-complement bit pattern. PAN identifiers travel as four big-endian words in
//! reversed order.

use crate::{Result, ValidationError};

/// Encode `value` as a binary32 split into `[low, high]` words.
///
/// The narrowing from `f64` rounds to nearest-even. A finite input too large for binary32
/// is rejected instead of turning into an infinity on the wire.
pub fn encode_f32_le(value: f64) -> Result<[u16; 2]> {
    let narrowed = value as f32;
    if narrowed.is_infinite() && value.is_finite() {
        return Err(ValidationError::FloatOverflow { value });
    }
    let bits = narrowed.to_bits();
    Ok([(bits & 0xFFFF) as u16, (bits >> 16) as u16])
}

/// Inverse of [`encode_f32_le`], bit-exact.
pub fn decode_f32_le(words: [u16; 2]) -> f32 {
    f32::from_bits(u32::from(words[0]) | (u32::from(words[1]) << 16))
}

/// Reinterpret a signed 16-bit value as its unsigned register word.
pub fn encode_i16_as_u16(value: i64) -> Result<u16> {
    let narrow = i16::try_from(value).map_err(|_| ValidationError::OutOfRangeI16 { value })?;
    Ok(narrow as u16)
}

pub fn decode_u16_as_i16(word: u16) -> i16 {
    word as i16
}

/// Check that `value` fits an unsigned register word.
pub fn encode_u16(value: i64) -> Result<u16> {
    u16::try_from(value).map_err(|_| ValidationError::OutOfRangeU16 { value })
}

/// Parse 16 hex digits as four big-endian words and return them last-word-first.
///
/// `"0000000000000103"` becomes `[0x0103, 0x0000, 0x0000, 0x0000]`. The reversal is part of
/// the device layout.
pub fn decode_hex_be_u16x4(hex: &str) -> Result<[u16; 4]> {
    let t = hex.trim();
    if t.len() != 16 || !t.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ValidationError::InvalidHex(hex.to_string()));
    }
    let mut words = [0u16; 4];
    for (i, word) in words.iter_mut().enumerate() {
        let chunk = &t[i * 4..i * 4 + 4];
        *word = u16::from_str_radix(chunk, 16)
            .map_err(|_| ValidationError::InvalidHex(hex.to_string()))?;
    }
    words.reverse();
    Ok(words)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_f32_low_word_first() {
        assert_eq!(encode_f32_le(1.0).unwrap(), [0x0000, 0x3F80]);
        assert_eq!(encode_f32_le(-2.5).unwrap(), [0x0000, 0xC020]);
        assert_eq!(encode_f32_le(0.0).unwrap(), [0, 0]);
    }

    #[test]
    fn test_f32_rounds_like_binary32() {
        let v = 0.1_f64;
        let words = encode_f32_le(v).unwrap();
        assert_eq!(decode_f32_le(words), 0.1_f32);
        assert_eq!(words, [0xCCCD, 0x3DCC]);
    }

    #[test]
    fn test_f32_round_trip_for_representable_values() {
        for v in [
            0.0_f32,
            -0.0,
            1.5,
            -0.028761,
            0.746828,
            2.01,
            f32::MIN_POSITIVE,
            f32::MAX,
            f32::MIN,
        ] {
            let words = encode_f32_le(f64::from(v)).unwrap();
            assert_eq!(decode_f32_le(words).to_bits(), v.to_bits());
        }
    }

    #[test]
    fn test_f32_overflow_rejected() {
        assert!(matches!(
            encode_f32_le(1e300),
            Err(ValidationError::FloatOverflow { .. })
        ));
        // explicit infinities are representable and pass through
        assert_eq!(encode_f32_le(f64::INFINITY).unwrap(), [0x0000, 0x7F80]);
    }

    #[test]
    fn test_i16_bounds() {
        assert_eq!(encode_i16_as_u16(0).unwrap(), 0);
        assert_eq!(encode_i16_as_u16(-1).unwrap(), 0xFFFF);
        assert_eq!(encode_i16_as_u16(32767).unwrap(), 0x7FFF);
        assert_eq!(encode_i16_as_u16(-32768).unwrap(), 0x8000);
        assert_eq!(
            encode_i16_as_u16(32768),
            Err(ValidationError::OutOfRangeI16 { value: 32768 })
        );
        assert!(encode_i16_as_u16(-32769).is_err());
    }

    #[test]
    fn test_i16_is_a_bijection() {
        let mut seen = vec![false; 65536];
        for v in -32768_i64..=32767 {
            let w = encode_i16_as_u16(v).unwrap();
            assert!(!seen[w as usize]);
            seen[w as usize] = true;
            assert_eq!(i64::from(decode_u16_as_i16(w)), v);
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn test_pan_id_words_reversed() {
        assert_eq!(
            decode_hex_be_u16x4("0000000000000103").unwrap(),
            [0x0103, 0x0000, 0x0000, 0x0000]
        );
        assert_eq!(
            decode_hex_be_u16x4("0011aaBB2233ffee").unwrap(),
            [0xFFEE, 0x2233, 0xAABB, 0x0011]
        );
    }

    #[test]
    fn test_pan_id_rejects_bad_input() {
        assert!(decode_hex_be_u16x4("0103").is_err());
        assert!(decode_hex_be_u16x4("00000000000001030").is_err());
        assert!(decode_hex_be_u16x4("000000000000010g").is_err());
        assert!(decode_hex_be_u16x4("+000000000000103").is_err());
    }
}
