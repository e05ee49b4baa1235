use super::cursor::non_empty_utf8;
use super::error::DecodeError;

/// Contents of a `text/x-vCard` record. The card itself is not parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VCardRecord {
    pub text: String,
}

pub fn decode_vcard(payload: &[u8]) -> Result<VCardRecord, DecodeError> {
    Ok(VCardRecord {
        text: non_empty_utf8(payload, "vcard")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_raw_text() {
        let card = "BEGIN:VCARD\r\nVERSION:3.0\r\nFN:Ada\r\nEND:VCARD\r\n";
        assert_eq!(decode_vcard(card.as_bytes()).unwrap().text, card);
    }

    #[test]
    fn empty_or_binary_fails() {
        assert_eq!(decode_vcard(b""), Err(DecodeError::Empty("vcard")));
        assert_eq!(
            decode_vcard(&[0xFF, 0xFE]),
            Err(DecodeError::InvalidUtf8("vcard"))
        );
    }
}
