// src/ndef/fixtures.rs
// Encoders used by the tests to build tag contents.

use super::header::TypeNameFormat;

#[derive(Debug, Clone)]
pub struct RecordSpec {
    pub tnf: TypeNameFormat,
    pub record_type: Vec<u8>,
    pub id: Option<Vec<u8>>,
    pub payload: Vec<u8>,
    pub message_begin: bool,
    pub message_end: bool,
}

impl RecordSpec {
    pub fn new(tnf: TypeNameFormat, record_type: &str, payload: Vec<u8>) -> Self {
        Self {
            tnf,
            record_type: record_type.as_bytes().to_vec(),
            id: None,
            payload,
            message_begin: false,
            message_end: false,
        }
    }

    pub fn well_known(record_type: &str, payload: Vec<u8>) -> Self {
        Self::new(TypeNameFormat::WellKnown, record_type, payload)
    }

    pub fn media(record_type: &str, payload: Vec<u8>) -> Self {
        Self::new(TypeNameFormat::Media, record_type, payload)
    }

    pub fn with_id(mut self, id: &[u8]) -> Self {
        self.id = Some(id.to_vec());
        self
    }
}

// Text Record: [Status Byte] + [Lang Code] + [Text]
pub fn text_payload(lang: &str, text: &str, utf16: bool) -> Vec<u8> {
    let mut payload = Vec::new();
    let mut status = lang.len() as u8;
    if utf16 {
        status |= 0x80;
    }
    payload.push(status);
    payload.extend_from_slice(lang.as_bytes());
    if utf16 {
        payload.extend_from_slice(&[0xFE, 0xFF]);
        payload.extend(text.encode_utf16().flat_map(u16::to_be_bytes));
    } else {
        payload.extend_from_slice(text.as_bytes());
    }
    payload
}

pub fn encode_record(spec: &RecordSpec) -> Vec<u8> {
    let short = spec.payload.len() <= u8::MAX as usize;

    // Bit 7: MB, Bit 6: ME, Bit 5: CF(0), Bit 4: SR, Bit 3: IL, Bits 2-0: TNF
    let mut header = spec.tnf.code();
    if spec.message_begin {
        header |= 0x80;
    }
    if spec.message_end {
        header |= 0x40;
    }
    if short {
        header |= 0x10;
    }
    if spec.id.is_some() {
        header |= 0x08;
    }

    let mut record = vec![header, spec.record_type.len() as u8];
    if short {
        record.push(spec.payload.len() as u8);
    } else {
        record.extend_from_slice(&(spec.payload.len() as u32).to_be_bytes());
    }
    if let Some(id) = &spec.id {
        record.push(id.len() as u8);
    }
    record.extend_from_slice(&spec.record_type);
    if let Some(id) = &spec.id {
        record.extend_from_slice(id);
    }
    record.extend_from_slice(&spec.payload);
    record
}

/// Concatenates records, setting MB on the first and ME on the last.
pub fn message(records: &[RecordSpec]) -> Vec<u8> {
    let mut full_message = Vec::new();
    for (i, spec) in records.iter().enumerate() {
        let mut spec = spec.clone();
        spec.message_begin = i == 0;
        spec.message_end = i == records.len() - 1;
        full_message.extend(encode_record(&spec));
    }
    full_message
}

pub fn wrap_in_tlv(ndef_bytes: &[u8]) -> Vec<u8> {
    // T = 0x03 (NDEF Message)
    let mut tlv = vec![0x03];
    if ndef_bytes.len() < 0xFF {
        tlv.push(ndef_bytes.len() as u8);
    } else {
        tlv.push(0xFF);
        tlv.extend_from_slice(&(ndef_bytes.len() as u16).to_be_bytes());
    }
    tlv.extend_from_slice(ndef_bytes);
    tlv.push(0xFE);
    tlv
}

/// One WSC attribute: 2-byte ID, 2-byte length, value.
pub fn attr(id: u16, value: &[u8]) -> Vec<u8> {
    let mut out = id.to_be_bytes().to_vec();
    out.extend_from_slice(&(value.len() as u16).to_be_bytes());
    out.extend_from_slice(value);
    out
}

#[derive(Debug, Default)]
pub struct Wsc {
    bytes: Vec<u8>,
}

impl Wsc {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attr(mut self, id: u16, value: &[u8]) -> Self {
        self.bytes.extend(attr(id, value));
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.bytes
    }
}
