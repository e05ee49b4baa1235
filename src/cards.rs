// src/cards.rs
use log::{debug, warn};
use pcsc::Card;

use crate::{apdu, ndef};

// Card type byte at the end of the ATR
pub const CARD_TYPE_MIFARE_1K: u8 = 0x6A;
pub const CARD_TYPE_NTAG: u8 = 0x68;

// Transport keys commonly found on MIFARE Classic NDEF tags
pub const COMMON_KEYS: [[u8; 6]; 8] = [
    [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF],
    [0xA0, 0xA1, 0xA2, 0xA3, 0xA4, 0xA5],
    [0xD3, 0xF7, 0xD3, 0xF7, 0xD3, 0xF7],
    [0x00, 0x00, 0x00, 0x00, 0x00, 0x00],
    [0xB0, 0xB1, 0xB2, 0xB3, 0xB4, 0xB5],
    [0x4D, 0x3A, 0x99, 0xC3, 0x51, 0xDD],
    [0x1A, 0x98, 0x2C, 0x7E, 0x45, 0x9A],
    [0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF],
];

const NTAG_FIRST_USER_PAGE: u8 = 4;
// NTAG216 user memory ends at page 0xE1
const NTAG_LAST_USER_PAGE: u8 = 0xE1;
const NTAG_PAGES_PER_READ: u8 = 4;

/// Which memory layout to read, from the last byte of the card's ATR.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardKind {
    MifareClassic,
    Ntag,
}

impl CardKind {
    pub fn from_atr(atr: &[u8]) -> Self {
        match atr.last() {
            Some(&CARD_TYPE_MIFARE_1K) => Self::MifareClassic,
            Some(&CARD_TYPE_NTAG) => Self::Ntag,
            other => {
                debug!("Unknown card type {:02X?}, reading as NTAG", other);
                Self::Ntag
            }
        }
    }
}

/// Data blocks of sectors 1..16. Sector 0 holds manufacturer data and
/// block 3 of each sector is the trailer.
pub fn get_mifare_data_blocks() -> Vec<u8> {
    let mut blocks = Vec::new();
    for sector in 1..16u8 {
        for block_in_sector in 0..3u8 {
            blocks.push(sector * 4 + block_in_sector);
        }
    }
    blocks
}

fn authenticate_sector(card: &Card, block: u8) -> bool {
    COMMON_KEYS.iter().any(|key| {
        apdu::load_key(card, key).is_ok()
            && (apdu::authenticate(card, block, 0x60).is_ok()
                || apdu::authenticate(card, block, 0x61).is_ok())
    })
}

/// Reads MIFARE Classic data blocks until the NDEF TLV is complete.
pub fn read_mifare(card: &Card) -> Result<Vec<u8>, String> {
    let mut full_data = Vec::new();

    for block in get_mifare_data_blocks() {
        // Authenticate at the start of every sector (blocks 4, 8, 12, ...)
        if block % 4 == 0 && !authenticate_sector(card, block) {
            warn!("Could not authenticate sector at block {}, stopping", block);
            break;
        }

        match apdu::read_binary(card, block, 16) {
            Ok(data) => {
                full_data.extend_from_slice(&data);
                if ndef::find_ndef_tlv(&full_data).is_ok() {
                    break;
                }
            }
            Err(e) => {
                debug!("Read of block {} failed: {}", block, e);
                break;
            }
        }
    }

    if full_data.is_empty() {
        return Err("No data could be read from the card.".into());
    }
    Ok(full_data)
}

/// Reads NTAG/Ultralight user pages until the NDEF TLV is complete.
pub fn read_ntag(card: &Card) -> Result<Vec<u8>, String> {
    let mut full_data = Vec::new();
    let mut page = NTAG_FIRST_USER_PAGE;

    while page <= NTAG_LAST_USER_PAGE {
        match apdu::read_binary(card, page, NTAG_PAGES_PER_READ * 4) {
            Ok(data) => {
                full_data.extend_from_slice(&data);
                if ndef::find_ndef_tlv(&full_data).is_ok() {
                    break;
                }
            }
            Err(e) => {
                debug!("Read of page {} failed: {}", page, e);
                break;
            }
        }
        page += NTAG_PAGES_PER_READ;
    }

    if full_data.is_empty() {
        return Err("Failed to read start of NDEF".into());
    }
    Ok(full_data)
}

pub fn read_memory(card: &Card, kind: CardKind) -> Result<Vec<u8>, String> {
    match kind {
        CardKind::MifareClassic => read_mifare(card),
        CardKind::Ntag => read_ntag(card),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mifare_blocks_skip_trailers_and_sector_zero() {
        let blocks = get_mifare_data_blocks();
        assert_eq!(blocks.len(), 45);
        assert_eq!(&blocks[..4], &[4, 5, 6, 8]);
        assert!(blocks.iter().all(|b| (b + 1) % 4 != 0));
        assert_eq!(blocks.last(), Some(&62));
    }

    #[test]
    fn card_kind_from_atr() {
        let mifare = [0x3B, 0x8F, 0x80, 0x01, 0x80, 0x4F, 0x0C, 0xA0, 0x00, 0x00, 0x03, 0x06, 0x03, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x6A];
        assert_eq!(CardKind::from_atr(&mifare), CardKind::MifareClassic);
        assert_eq!(CardKind::from_atr(&[0x3B, CARD_TYPE_NTAG]), CardKind::Ntag);
        assert_eq!(CardKind::from_atr(&[0x3B, 0x44]), CardKind::Ntag);
        assert_eq!(CardKind::from_atr(&[]), CardKind::Ntag);
    }
}
