// src/hce.rs
//! Host-card-emulation responder: answers ISO 7816 SELECT commands for
//! the service's application ID.

pub const STATUS_SUCCESS: [u8; 2] = [0x90, 0x00];
pub const STATUS_FAILED: [u8; 2] = [0x6F, 0x00];
pub const CLA_NOT_SUPPORTED: [u8; 2] = [0x6E, 0x00];
pub const INS_NOT_SUPPORTED: [u8; 2] = [0x6D, 0x00];

pub const AID: [u8; 7] = [0xA0, 0x00, 0x00, 0x02, 0x47, 0x10, 0x01];

const DEFAULT_CLA: u8 = 0x00;
const SELECT_INS: u8 = 0xA4;
const MIN_APDU_LENGTH: usize = 6;
// CLA INS P1 P2 Lc
const AID_OFFSET: usize = 5;

/// Status word for a command APDU: `00 A4 P1 P2 Lc <AID>` selects us.
pub fn respond(command: &[u8]) -> [u8; 2] {
    if command.len() < MIN_APDU_LENGTH {
        return STATUS_FAILED;
    }
    if command[0] != DEFAULT_CLA {
        return CLA_NOT_SUPPORTED;
    }
    if command[1] != SELECT_INS {
        return INS_NOT_SUPPORTED;
    }
    match command.get(AID_OFFSET..AID_OFFSET + AID.len()) {
        Some(aid) if aid == AID => STATUS_SUCCESS,
        _ => STATUS_FAILED,
    }
}
