use super::cursor::{Cursor, non_empty_utf8};
use super::error::DecodeError;

const UTF16_FLAG: u8 = 0x80;
const LANG_LEN_MASK: u8 = 0x7F;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRecord {
    pub utf16: bool,
    pub language_code: String,
    pub text: String,
}

// |------------------------------|
// |UTF| 0 | Length of Lang Code  |  status byte
// |          Lang Code           |  e.g. "en", "en-US"
// |             Text             |  UTF-8 or UTF-16
// |------------------------------|
/// Decodes a well-known "T" payload, e.g. `"\x02enHello"`.
pub fn decode_text(payload: &[u8]) -> Result<TextRecord, DecodeError> {
    let mut cursor = Cursor::new(payload);
    let status = cursor.read_u8()?;
    let utf16 = status & UTF16_FLAG != 0;
    let lang_len = (status & LANG_LEN_MASK) as usize;

    let language_code = non_empty_utf8(cursor.take(lang_len)?, "language code")?;

    let body = cursor.rest();
    let text = if utf16 {
        decode_utf16(body)?
    } else {
        non_empty_utf8(body, "text")?
    };
    if text.is_empty() {
        return Err(DecodeError::Empty("text"));
    }

    Ok(TextRecord {
        utf16,
        language_code,
        text,
    })
}

/// Big endian unless a byte order mark says otherwise.
fn decode_utf16(bytes: &[u8]) -> Result<String, DecodeError> {
    if bytes.len() % 2 != 0 {
        return Err(DecodeError::InvalidUtf16);
    }
    let (little_endian, body) = match bytes {
        [0xFF, 0xFE, rest @ ..] => (true, rest),
        [0xFE, 0xFF, rest @ ..] => (false, rest),
        _ => (false, bytes),
    };
    let units: Vec<u16> = body
        .chunks_exact(2)
        .map(|pair| {
            if little_endian {
                u16::from_le_bytes([pair[0], pair[1]])
            } else {
                u16::from_be_bytes([pair[0], pair[1]])
            }
        })
        .collect();
    String::from_utf16(&units).map_err(|_| DecodeError::InvalidUtf16)
}
