use super::cursor::{Cursor, non_empty_utf8};
use super::error::DecodeError;

/// URI identifier code prefixes, indexed by code. 0x24..=0xFF are reserved.
pub static URI_PREFIXES: [&str; 36] = [
    "",
    "http://www.",
    "https://www.",
    "http://",
    "https://",
    "tel:",
    "mailto:",
    "ftp://anonymous:anonymous@",
    "ftp://ftp.",
    "ftps://",
    "sftp://",
    "smb://",
    "nfs://",
    "ftp://",
    "dav://",
    "news:",
    "telnet://",
    "imap:",
    "rtsp://",
    "urn:",
    "pop:",
    "sip:",
    "sips:",
    "tftp:",
    "btspp://",
    "btl2cap://",
    "btgoep://",
    "tcpobex://",
    "irdaobex://",
    "file://",
    "urn:epc:id:",
    "urn:epc:tag:",
    "urn:epc:pat:",
    "urn:epc:raw:",
    "urn:epc:",
    "urn:nfc:",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UriRecord {
    pub uri: String,
}

/// Decodes a well-known "U" payload: one identifier code byte, then the
/// rest of the URI. `"\x04example.com"` is `https://example.com`.
pub fn decode_uri(payload: &[u8]) -> Result<UriRecord, DecodeError> {
    let mut cursor = Cursor::new(payload);
    let code = cursor.read_u8()?;
    let prefix = URI_PREFIXES
        .get(code as usize)
        .ok_or(DecodeError::ReservedUriCode(code))?;
    let suffix = non_empty_utf8(cursor.rest(), "uri")?;
    Ok(UriRecord {
        uri: format!("{prefix}{suffix}"),
    })
}
