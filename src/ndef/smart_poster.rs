use log::debug;

use super::error::DecodeError;
use super::header::parse_header;
use super::text::{TextRecord, decode_text};
use super::uri::{UriRecord, decode_uri};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmartPosterRecord {
    pub uri: Option<UriRecord>,
    /// Never empty once decoded.
    pub texts: Vec<TextRecord>,
}

impl SmartPosterRecord {
    /// The first title, which is what the bridge shows as the poster text.
    pub fn title(&self) -> Option<&TextRecord> {
        self.texts.first()
    }
}

/// Decodes a well-known "Sp" payload, which is itself a sequence of
/// nested records.
///
/// Only "U" and "T" are accepted inside; anything else rejects the whole
/// poster. A later "U" replaces an earlier one. The walk stops at the
/// record flagged message-end, at the end of the buffer, or at the first
/// header that does not parse.
pub fn decode_smart_poster(payload: &[u8]) -> Result<SmartPosterRecord, DecodeError> {
    let mut uri = None;
    let mut texts = Vec::new();
    let mut offset = 0;

    while offset < payload.len() {
        let rest = &payload[offset..];
        let header = match parse_header(rest) {
            Ok(header) => header,
            Err(err) => {
                debug!("smart poster: stopping at offset {}: {}", offset, err);
                break;
            }
        };
        let body = &rest[header.payload_range()];

        match header.record_type.as_str() {
            "U" => uri = Some(decode_uri(body)?),
            "T" => texts.push(decode_text(body)?),
            other => return Err(DecodeError::UnsupportedNestedRecord(other.to_string())),
        }

        offset += header.payload_range().end;
        if header.message_end {
            break;
        }
    }

    if texts.is_empty() {
        return Err(DecodeError::MissingText);
    }
    Ok(SmartPosterRecord { uri, texts })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ndef::fixtures::{RecordSpec, encode_record, message, text_payload};
    use pretty_assertions::assert_eq;

    fn text(lang: &str, body: &str) -> RecordSpec {
        RecordSpec::well_known("T", text_payload(lang, body, false))
    }

    fn uri(code: u8, rest: &str) -> RecordSpec {
        let mut payload = vec![code];
        payload.extend_from_slice(rest.as_bytes());
        RecordSpec::well_known("U", payload)
    }

    #[test]
    fn text_and_uri() {
        let payload = message(&[text("en", "Hello"), uri(0x04, "example.com")]);
        let poster = decode_smart_poster(&payload).unwrap();
        let title = poster.title().unwrap();
        assert_eq!(title.text, "Hello");
        assert_eq!(title.language_code, "en");
        assert_eq!(poster.uri.unwrap().uri, "https://example.com");
    }

    #[test]
    fn several_titles_keep_order() {
        let payload = message(&[text("en", "Hello"), text("fr", "Bonjour")]);
        let poster = decode_smart_poster(&payload).unwrap();
        assert!(poster.uri.is_none());
        let langs: Vec<_> = poster.texts.iter().map(|t| t.language_code.as_str()).collect();
        assert_eq!(langs, ["en", "fr"]);
    }

    #[test]
    fn last_uri_wins() {
        let payload = message(&[uri(0x03, "a.example"), text("en", "x"), uri(0x04, "b.example")]);
        let poster = decode_smart_poster(&payload).unwrap();
        assert_eq!(poster.uri.unwrap().uri, "https://b.example");
    }

    #[test]
    fn uri_alone_is_not_a_poster() {
        assert_eq!(
            decode_smart_poster(&message(&[uri(0x04, "example.com")])),
            Err(DecodeError::MissingText)
        );
        assert_eq!(decode_smart_poster(&[]), Err(DecodeError::MissingText));
    }

    #[test]
    fn action_record_is_rejected() {
        let payload = message(&[
            text("en", "Hello"),
            RecordSpec::well_known("act", vec![0x00]),
        ]);
        assert_eq!(
            decode_smart_poster(&payload),
            Err(DecodeError::UnsupportedNestedRecord("act".into()))
        );
    }

    #[test]
    fn broken_nested_text_fails() {
        let payload = message(&[RecordSpec::well_known("T", b"\x02en".to_vec())]);
        assert_eq!(decode_smart_poster(&payload), Err(DecodeError::Empty("text")));
    }

    #[test]
    fn stops_at_message_end() {
        let mut payload = message(&[text("en", "Hello")]);
        // trailing garbage after ME is never looked at
        payload.extend_from_slice(&[0x11, 0x03, 0x00, b'x', b'y', b'z']);
        assert_eq!(decode_smart_poster(&payload).unwrap().texts.len(), 1);
    }

    #[test]
    fn truncated_trailing_header_keeps_earlier_records() {
        let first = RecordSpec::well_known("T", text_payload("en", "Hi", false));
        let mut payload = encode_record(&first);
        payload.extend_from_slice(&[0x51, 0x01, 0x09, b'T']);
        assert_eq!(decode_smart_poster(&payload).unwrap().title().unwrap().text, "Hi");
    }

    #[test]
    fn hand_built_poster_without_texts_has_no_title() {
        let poster = SmartPosterRecord {
            uri: None,
            texts: Vec::new(),
        };
        assert_eq!(poster.title(), None);
    }
}
