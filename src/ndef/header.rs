use super::cursor::{Cursor, utf8};
use super::error::DecodeError;

// Status byte: MB | ME | CF | SR | IL | TNF(3)
const FLAG_MB: u8 = 0x80;
const FLAG_ME: u8 = 0x40;
const FLAG_CF: u8 = 0x20;
const FLAG_SR: u8 = 0x10;
const FLAG_IL: u8 = 0x08;
const TNF_MASK: u8 = 0x07;

/// Type Name Format: how a record's type field is to be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeNameFormat {
    Empty,
    WellKnown,
    Media,
    AbsoluteUri,
    External,
    Unknown,
    Unchanged,
    Reserved,
}

impl TypeNameFormat {
    /// All eight 3-bit codes are assigned, so this never fails; the upper
    /// bits are ignored.
    pub fn from_code(code: u8) -> Self {
        match code & TNF_MASK {
            0x00 => Self::Empty,
            0x01 => Self::WellKnown,
            0x02 => Self::Media,
            0x03 => Self::AbsoluteUri,
            0x04 => Self::External,
            0x05 => Self::Unknown,
            0x06 => Self::Unchanged,
            _ => Self::Reserved,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Self::Empty => 0x00,
            Self::WellKnown => 0x01,
            Self::Media => 0x02,
            Self::AbsoluteUri => 0x03,
            Self::External => 0x04,
            Self::Unknown => 0x05,
            Self::Unchanged => 0x06,
            Self::Reserved => 0x07,
        }
    }

    /// Name used on the bridge. Reserved has no name of its own there.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::WellKnown => "well_known",
            Self::Media => "mime_media",
            Self::AbsoluteUri => "absolute_uri",
            Self::External => "external_type",
            Self::Unchanged => "unchanged",
            Self::Unknown | Self::Reserved => "unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordHeader {
    pub message_begin: bool,
    pub message_end: bool,
    pub chunked: bool,
    pub short_record: bool,
    pub identifier_present: bool,
    pub tnf: TypeNameFormat,
    pub record_type: String,
    /// Full identifier bytes, not just the first one.
    pub identifier: Option<Vec<u8>>,
    pub payload_length: usize,
    /// Bytes taken by the header itself; the payload starts here.
    pub payload_offset: usize,
}

impl RecordHeader {
    pub fn payload_range(&self) -> std::ops::Range<usize> {
        self.payload_offset..self.payload_offset + self.payload_length
    }
}

// |------------------------------|
// | MB| ME| CF| SR| IL|    TNF   |  1 byte
// |        TYPE_LENGTH           |  1 byte
// |        PAYLOAD_LENGTH        |  1 byte (SR) or 4 bytes, big endian
// |        ID_LENGTH             |  0 or 1 byte (IL)
// |        TYPE                  |  TYPE_LENGTH bytes
// |        ID                    |  ID_LENGTH bytes
// |        PAYLOAD               |  PAYLOAD_LENGTH bytes
// |------------------------------|
/// Decodes the record header at the start of `bytes`.
///
/// Fails if any field runs past the end of the buffer, including the
/// payload the header announces.
pub fn parse_header(bytes: &[u8]) -> Result<RecordHeader, DecodeError> {
    let mut cursor = Cursor::new(bytes);

    let status = cursor.read_u8()?;
    let short_record = status & FLAG_SR != 0;
    let identifier_present = status & FLAG_IL != 0;

    let type_length = cursor.read_u8()? as usize;

    let payload_length = if short_record {
        cursor.read_u8()? as usize
    } else {
        cursor.read_u32_be()? as usize
    };

    let identifier_length = if identifier_present {
        cursor.read_u8()? as usize
    } else {
        0
    };

    let record_type = utf8(cursor.take(type_length)?, "record type")?;

    let identifier = if identifier_present {
        Some(cursor.take(identifier_length)?.to_vec())
    } else {
        None
    };

    let payload_offset = cursor.position();
    if payload_length > cursor.remaining() {
        return Err(DecodeError::Truncated {
            needed: payload_length,
            available: cursor.remaining(),
        });
    }

    Ok(RecordHeader {
        message_begin: status & FLAG_MB != 0,
        message_end: status & FLAG_ME != 0,
        chunked: status & FLAG_CF != 0,
        short_record,
        identifier_present,
        tnf: TypeNameFormat::from_code(status),
        record_type,
        identifier,
        payload_length,
        payload_offset,
    })
}
