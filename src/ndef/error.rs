use thiserror::Error;

/// Reasons a record (or a nested fragment of one) could not be decoded.
///
/// None of these are fatal: the dispatcher turns every variant into
/// "no record produced".
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("need {needed} more byte(s), only {available} left")]
    Truncated { needed: usize, available: usize },

    #[error("{0} is empty")]
    Empty(&'static str),

    #[error("{0} is not valid UTF-8")]
    InvalidUtf8(&'static str),

    #[error("text is not valid UTF-16")]
    InvalidUtf16,

    #[error("URI identifier code {0:#04x} is reserved")]
    ReservedUriCode(u8),

    #[error("smart poster contains unsupported record type {0:?}")]
    UnsupportedNestedRecord(String),

    #[error("smart poster has no text record")]
    MissingText,

    #[error("Version2 sub-element length must be 1, got {0}")]
    InvalidVersion2Length(u8),

    #[error("unknown Version2 value {0:#04x}")]
    InvalidVersion2(u8),

    #[error("credential lacks ssid, mac address or network key")]
    IncompleteCredential,

    #[error("no NDEF message TLV found")]
    NoNdefTlv,
}
