// src/apdu.rs
use pcsc::Card;

pub const SW_SUCCESS: [u8; 2] = [0x90, 0x00];

/// Splits a response into data and status word; errors unless it is 90 00.
pub fn check_status(resp: &[u8]) -> Result<&[u8], String> {
    match resp {
        [data @ .., sw1, sw2] if [*sw1, *sw2] == SW_SUCCESS => Ok(data),
        [.., sw1, sw2] => Err(format!("Status {:02X}{:02X}", sw1, sw2)),
        _ => Err(format!("Short response: {:02X?}", resp)),
    }
}

fn transmit(card: &Card, apdu: &[u8]) -> Result<Vec<u8>, String> {
    let mut recv_buffer = [0u8; 258];
    let resp = card
        .transmit(apdu, &mut recv_buffer)
        .map_err(|e| format!("Transmit Error: {}", e))?;
    check_status(resp).map(|data| data.to_vec())
}

// Get Data (UID): FF CA 00 00 00
pub fn get_uid(card: &Card) -> Result<Vec<u8>, String> {
    transmit(card, &[0xFF, 0xCA, 0x00, 0x00, 0x00])
}

// Load Authentication Keys into Reader Memory (Location 0x00)
// ACR122U standard: FF 82 00 key_num 06 [KEY]
pub fn load_key(card: &Card, key: &[u8; 6]) -> Result<(), String> {
    let mut apdu = vec![0xFF, 0x82, 0x00, 0x00, 0x06];
    apdu.extend_from_slice(key);
    transmit(card, &apdu)
        .map(|_| ())
        .map_err(|e| format!("Load Key Failed: {}", e))
}

// Authenticate Block
// CMD: FF 86 00 00 05 01 00 Block KeyType KeyNumber
// KeyType: 0x60 (A), 0x61 (B)
pub fn authenticate(card: &Card, block: u8, key_type: u8) -> Result<(), String> {
    let apdu = [
        0xFF, 0x86, 0x00, 0x00, 0x05, 0x01, 0x00, block, key_type, 0x00,
    ];
    transmit(card, &apdu)
        .map(|_| ())
        .map_err(|e| format!("Auth Failed: {}", e))
}

// Read: FF B0 00 Block Len
pub fn read_binary(card: &Card, block: u8, length: u8) -> Result<Vec<u8>, String> {
    transmit(card, &[0xFF, 0xB0, 0x00, block, length])
        .map_err(|e| format!("Read Failed: {}", e))
}
