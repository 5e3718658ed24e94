//! SMS character-set handling: GSM-7 detection and UCS-2 transcoding.
//!
//! Text-mode SMS uses one of two encodings. Plain ASCII payloads travel in
//! the GSM 7-bit default alphabet; anything beyond 7-bit ASCII (Cyrillic,
//! CJK, emoji) requires `AT+CSCS="UCS2"`, in which case both the recipient
//! number and the body are sent as uppercase hex-encoded UTF-16 big-endian
//! code units. Inbound messages arrive in whichever encoding the sender
//! used, with no explicit marker, so decoding is heuristic: see
//! [`decode_gsm_text`].

use gsmlib_core::error::{Error, Result};

/// `true` when `text` cannot travel in the GSM 7-bit default alphabet and
/// must be sent as UCS-2 (any code point above 0x7F).
pub fn needs_ucs2(text: &str) -> bool {
    text.chars().any(|c| c as u32 > 0x7F)
}

/// Encode text as hex UCS-2: UTF-16 code units (surrogate pairs allowed),
/// big-endian, uppercase hex without separators.
///
/// The output length is always a multiple of 4 hex digits.
///
/// # Example
///
/// ```
/// use gsmlib_at::codec::encode_ucs2;
///
/// assert_eq!(encode_ucs2("Привет"), "041F04400438043204350442");
/// ```
pub fn encode_ucs2(text: &str) -> String {
    let mut out = String::with_capacity(text.len() * 4);
    for unit in text.encode_utf16() {
        // Big-endian: high byte first.
        out.push_str(&format!("{unit:04X}"));
    }
    out
}

/// Decode a hex UCS-2 string back to UTF-8.
///
/// Spaces are stripped before decoding. Fails with [`Error::Encoding`] on
/// non-hex input, an odd byte count, or malformed UTF-16 (unpaired
/// surrogates).
pub fn decode_ucs2(hex_str: &str) -> Result<String> {
    let cleaned: String = hex_str.chars().filter(|c| *c != ' ').collect();

    let data = hex::decode(&cleaned)
        .map_err(|e| Error::Encoding(format!("invalid UCS-2 hex: {e}")))?;

    if data.len() % 2 != 0 {
        return Err(Error::Encoding("odd number of UCS-2 bytes".into()));
    }

    let units: Vec<u16> = data
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect();

    String::from_utf16(&units).map_err(|e| Error::Encoding(format!("malformed UTF-16: {e}")))
}

/// Heuristic: does this line look like hex-encoded UCS-2 text?
///
/// Requires pure hex digits, a length that is a multiple of 4, and strictly
/// more than a quarter of the decoded bytes carrying a high byte of `0x00`
/// or `0x04` (the Latin and Cyrillic UTF-16 planes, which dominate real SMS
/// traffic).
pub fn is_ucs2_hex(s: &str) -> bool {
    let cleaned: String = s.chars().filter(|c| *c != ' ').collect();

    if cleaned.is_empty() || cleaned.len() % 4 != 0 {
        return false;
    }
    if !cleaned.chars().all(|c| c.is_ascii_hexdigit()) {
        return false;
    }
    let Ok(data) = hex::decode(&cleaned) else {
        return false;
    };

    let typical_high_bytes = data
        .iter()
        .step_by(2)
        .filter(|&&b| b == 0x00 || b == 0x04)
        .count();

    typical_high_bytes > data.len() / 4
}

/// Auto-decode an inbound text payload.
///
/// Tried in order: UCS-2 hex (per [`is_ucs2_hex`]), then even-length hex
/// that decodes to valid UTF-8 (hex-ASCII), otherwise the input is returned
/// unchanged.
pub fn decode_gsm_text(text: &str) -> String {
    if is_ucs2_hex(text) {
        if let Ok(decoded) = decode_ucs2(text) {
            return decoded;
        }
    }

    if !text.is_empty() && text.len() % 2 == 0 && text.chars().all(|c| c.is_ascii_hexdigit()) {
        if let Ok(bytes) = hex::decode(text) {
            if let Ok(decoded) = String::from_utf8(bytes) {
                return decoded;
            }
        }
    }

    text.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn needs_ucs2_ascii_only() {
        assert!(!needs_ucs2("Hello, world! 123"));
        assert!(!needs_ucs2(""));
    }

    #[test]
    fn needs_ucs2_above_7bit() {
        assert!(needs_ucs2("Привет"));
        assert!(needs_ucs2("héllo"));
        assert!(needs_ucs2("日本語"));
        assert!(needs_ucs2("🚀"));
    }

    #[test]
    fn encode_cyrillic() {
        assert_eq!(
            encode_ucs2("Привет!"),
            "041F044004380432043504420021"
        );
    }

    #[test]
    fn encode_length_is_multiple_of_four() {
        for s in ["a", "ab", "Привет", "🚀", "mixed Ж text"] {
            assert_eq!(encode_ucs2(s).len() % 4, 0, "input {s:?}");
        }
    }

    #[test]
    fn decode_cyrillic_lowercase_hex() {
        assert_eq!(
            decode_ucs2("043f044004380432043504420021").unwrap(),
            "привет!"
        );
    }

    #[test]
    fn decode_tolerates_spaces() {
        assert_eq!(decode_ucs2("0048 0069").unwrap(), "Hi");
    }

    #[test]
    fn round_trip_plain_and_emoji() {
        for s in ["Hello", "Привет, мир!", "über", "🚀 emoji 🎉", "日本語テスト"] {
            assert_eq!(decode_ucs2(&encode_ucs2(s)).unwrap(), s, "input {s:?}");
        }
    }

    #[test]
    fn surrogate_pair_encoding() {
        // U+1F680 ROCKET encodes as the surrogate pair D83D DE80.
        assert_eq!(encode_ucs2("🚀"), "D83DDE80");
    }

    #[test]
    fn decode_rejects_non_hex() {
        assert!(matches!(
            decode_ucs2("zzzz").unwrap_err(),
            Error::Encoding(_)
        ));
    }

    #[test]
    fn decode_rejects_odd_byte_count() {
        assert!(matches!(
            decode_ucs2("004100").unwrap_err(),
            Error::Encoding(_)
        ));
    }

    #[test]
    fn decode_rejects_unpaired_surrogate() {
        assert!(matches!(
            decode_ucs2("D83D").unwrap_err(),
            Error::Encoding(_)
        ));
    }

    #[test]
    fn is_ucs2_hex_accepts_cyrillic_payload() {
        assert!(is_ucs2_hex("041F044004380432043504420021"));
        assert!(is_ucs2_hex("043f044004380432043504420021"));
    }

    #[test]
    fn is_ucs2_hex_rejects_plain_text_and_bad_lengths() {
        assert!(!is_ucs2_hex("hello"));
        assert!(!is_ucs2_hex(""));
        assert!(!is_ucs2_hex("041F04"));
        // Pure hex, but high bytes are not typical UCS-2.
        assert!(!is_ucs2_hex("CAFEBABE"));
    }

    #[test]
    fn is_ucs2_hex_implies_decodable() {
        for s in [
            "041F044004380432043504420021",
            "00480065006C006C006F",
            "0416",
        ] {
            if is_ucs2_hex(s) {
                assert!(decode_ucs2(s).is_ok(), "input {s:?}");
            }
        }
    }

    #[test]
    fn decode_gsm_text_ucs2() {
        assert_eq!(
            decode_gsm_text("043F044004380432043504420021"),
            "привет!"
        );
    }

    #[test]
    fn decode_gsm_text_hex_ascii() {
        assert_eq!(decode_gsm_text("48656C6C6F"), "Hello");
    }

    #[test]
    fn decode_gsm_text_passthrough() {
        // Not valid hex -- returned unchanged.
        assert_eq!(decode_gsm_text("hello world"), "hello world");
        assert_eq!(decode_gsm_text("Balance: 100.50 RUB"), "Balance: 100.50 RUB");
        // Even-length hex that is not valid UTF-8 -- also unchanged.
        assert_eq!(decode_gsm_text("FFFE"), "FFFE");
    }
}
