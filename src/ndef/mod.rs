// src/ndef/mod.rs
//! NDEF message and payload decoding.
//!
//! Everything here is pure: bytes in, owned records out. Decode errors are
//! never fatal; [`decode`] reports them as "no record".

pub mod cursor;
pub mod error;
pub mod header;
pub mod smart_poster;
pub mod text;
pub mod uri;
pub mod vcard;
pub mod wifi;

#[cfg(test)]
pub(crate) mod fixtures;

use log::debug;

pub use error::DecodeError;
pub use header::{RecordHeader, TypeNameFormat, parse_header};
pub use smart_poster::{SmartPosterRecord, decode_smart_poster};
pub use text::{TextRecord, decode_text};
pub use uri::{UriRecord, decode_uri};
pub use vcard::{VCardRecord, decode_vcard};
pub use wifi::{
    AuthType, EncryptType, WifiConfigRecord, WifiCredential, WifiVersion2, decode_wifi_config,
};

use cursor::Cursor;

pub const MIME_VCARD: &str = "text/x-vCard";
pub const MIME_WIFI_WSC: &str = "application/vnd.wfa.wsc";

// Type 2 tag TLV blocks
const TLV_NULL: u8 = 0x00;
const TLV_NDEF_MESSAGE: u8 = 0x03;
const TLV_TERMINATOR: u8 = 0xFE;
const TLV_LONG_LENGTH: u8 = 0xFF;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedRecord {
    Text(TextRecord),
    Uri(UriRecord),
    SmartPoster(SmartPosterRecord),
    VCard(VCardRecord),
    WifiConfig(WifiConfigRecord),
}

/// One record of a message, with its payload still undecoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord<'a> {
    pub header: RecordHeader,
    pub payload: &'a [u8],
}

impl RawRecord<'_> {
    pub fn decode(&self) -> Option<DecodedRecord> {
        decode(self.header.tnf, &self.header.record_type, self.payload)
    }
}

/// Routes a payload to its decoder.
///
/// `Ok(None)` means no decoder handles this (TNF, type) pair, which is not
/// an error. Type matching is exact and case sensitive.
pub fn try_decode(
    tnf: TypeNameFormat,
    record_type: &str,
    payload: &[u8],
) -> Result<Option<DecodedRecord>, DecodeError> {
    let record = match (tnf, record_type) {
        (TypeNameFormat::WellKnown, "T") => DecodedRecord::Text(decode_text(payload)?),
        (TypeNameFormat::WellKnown, "U") => DecodedRecord::Uri(decode_uri(payload)?),
        (TypeNameFormat::WellKnown, "Sp") => {
            DecodedRecord::SmartPoster(decode_smart_poster(payload)?)
        }
        (TypeNameFormat::Media, MIME_VCARD) => DecodedRecord::VCard(decode_vcard(payload)?),
        (TypeNameFormat::Media, MIME_WIFI_WSC) => {
            DecodedRecord::WifiConfig(decode_wifi_config(payload)?)
        }
        _ => return Ok(None),
    };
    Ok(Some(record))
}

/// Like [`try_decode`], with failures folded into `None`.
pub fn decode(tnf: TypeNameFormat, record_type: &str, payload: &[u8]) -> Option<DecodedRecord> {
    try_decode(tnf, record_type, payload).unwrap_or_else(|err| {
        debug!(
            "failed to decode {} record {:?}: {}",
            tnf.as_str(),
            record_type,
            err
        );
        None
    })
}

/// Splits an NDEF message into its records.
///
/// Stops after the record flagged message-end, at the end of the buffer,
/// or at a header that does not parse once at least one record was read.
pub fn parse_message(bytes: &[u8]) -> Result<Vec<RawRecord<'_>>, DecodeError> {
    let mut records = Vec::new();
    let mut offset = 0;

    while offset < bytes.len() {
        let rest = &bytes[offset..];
        let header = match parse_header(rest) {
            Ok(header) => header,
            Err(err) if records.is_empty() => return Err(err),
            Err(err) => {
                debug!("ndef message: ignoring tail at offset {}: {}", offset, err);
                break;
            }
        };
        let payload = &rest[header.payload_range()];
        offset += header.payload_range().end;
        let message_end = header.message_end;
        records.push(RawRecord { header, payload });
        if message_end {
            break;
        }
    }

    if records.is_empty() {
        return Err(DecodeError::Empty("ndef message"));
    }
    Ok(records)
}

/// Finds the NDEF Message TLV in a dump of tag memory and returns its value.
pub fn find_ndef_tlv(memory: &[u8]) -> Result<&[u8], DecodeError> {
    let mut cursor = Cursor::new(memory);
    while !cursor.is_empty() {
        let tag = cursor.read_u8()?;
        match tag {
            TLV_NULL => continue,
            TLV_TERMINATOR => break,
            _ => {}
        }
        let len = match cursor.read_u8()? {
            TLV_LONG_LENGTH => cursor.read_u16_be()? as usize,
            short => short as usize,
        };
        let value = cursor.take(len)?;
        if tag == TLV_NDEF_MESSAGE {
            return Ok(value);
        }
    }
    Err(DecodeError::NoNdefTlv)
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::fixtures::{RecordSpec, message, text_payload, wrap_in_tlv};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn dispatches_by_tnf_and_type() {
        let text = decode(TypeNameFormat::WellKnown, "T", b"\x02enHi");
        assert!(matches!(text, Some(DecodedRecord::Text(_))));

        let uri = decode(TypeNameFormat::WellKnown, "U", b"\x04a.b");
        assert!(matches!(uri, Some(DecodedRecord::Uri(_))));

        let card = decode(TypeNameFormat::Media, MIME_VCARD, b"BEGIN:VCARD");
        assert!(matches!(card, Some(DecodedRecord::VCard(_))));
    }

    #[test]
    fn unsupported_pairs_are_not_errors() {
        assert_eq!(try_decode(TypeNameFormat::Media, "T", b"\x02enHi"), Ok(None));
        assert_eq!(try_decode(TypeNameFormat::WellKnown, "t", b"\x02enHi"), Ok(None));
        assert_eq!(
            try_decode(TypeNameFormat::External, "android.com:pkg", b"com.example"),
            Ok(None)
        );
        assert_eq!(
            try_decode(TypeNameFormat::Media, "text/x-vcard", b"BEGIN"),
            Ok(None)
        );
    }

    #[test]
    fn failures_collapse_to_none() {
        assert_eq!(
            try_decode(TypeNameFormat::WellKnown, "U", b"\x24x"),
            Err(DecodeError::ReservedUriCode(0x24))
        );
        assert_eq!(decode(TypeNameFormat::WellKnown, "U", b"\x24x"), None);
    }

    #[test]
    fn splits_multi_record_message() {
        let bytes = message(&[
            RecordSpec::well_known("T", text_payload("en", "one", false)),
            RecordSpec::well_known("U", b"\x04example.com".to_vec()).with_id(b"2"),
            RecordSpec::media(MIME_VCARD, b"BEGIN:VCARD".to_vec()),
        ]);
        let records = parse_message(&bytes).unwrap();
        assert_eq!(records.len(), 3);
        assert!(records[0].header.message_begin);
        assert!(records[2].header.message_end);
        assert_eq!(records[1].header.identifier.as_deref(), Some(&b"2"[..]));
        assert_eq!(records[2].payload, b"BEGIN:VCARD");
        assert_eq!(
            records[1].decode(),
            Some(DecodedRecord::Uri(UriRecord {
                uri: "https://example.com".into()
            }))
        );
    }

    #[test]
    fn empty_or_garbage_message_fails() {
        assert!(parse_message(&[]).is_err());
        assert!(parse_message(&[0xD1, 0x01, 0x09, b'T']).is_err());
    }

    #[test]
    fn finds_tlv_after_lock_control() {
        let ndef = message(&[RecordSpec::well_known("T", text_payload("en", "x", false))]);
        let mut memory = vec![0x01, 0x03, 0xA0, 0x0C, 0x34, 0x00];
        memory.extend(wrap_in_tlv(&ndef));
        memory.extend([0x00, 0x00]);
        assert_eq!(find_ndef_tlv(&memory).unwrap(), &ndef[..]);
    }

    #[test]
    fn finds_tlv_with_long_length() {
        let ndef = message(&[RecordSpec::media(MIME_VCARD, vec![b'A'; 300])]);
        let memory = wrap_in_tlv(&ndef);
        assert_eq!(memory[1], 0xFF);
        assert_eq!(find_ndef_tlv(&memory).unwrap().len(), ndef.len());
    }

    #[test]
    fn blank_tag_has_no_tlv() {
        assert_eq!(find_ndef_tlv(&[0x00, 0x00, 0xFE]), Err(DecodeError::NoNdefTlv));
        assert_eq!(find_ndef_tlv(&[]), Err(DecodeError::NoNdefTlv));
    }

    proptest! {
        #[test]
        fn arbitrary_bytes_never_panic(bytes in proptest::collection::vec(any::<u8>(), 0..128)) {
            let _ = parse_header(&bytes);
            let _ = parse_message(&bytes);
            let _ = find_ndef_tlv(&bytes);
            for (tnf, ty) in [
                (TypeNameFormat::WellKnown, "T"),
                (TypeNameFormat::WellKnown, "U"),
                (TypeNameFormat::WellKnown, "Sp"),
                (TypeNameFormat::Media, MIME_VCARD),
                (TypeNameFormat::Media, MIME_WIFI_WSC),
            ] {
                let _ = try_decode(tnf, ty, &bytes);
            }
        }
    }
}
