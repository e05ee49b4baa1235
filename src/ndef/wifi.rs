//! Wi-Fi Simple Configuration (`application/vnd.wfa.wsc`) payloads.
//!
//! ```text
//! Attribute                        ID              Length
//! Credential                       0x100E          unlimited
//! SSID                             0x1045          <= 32B
//! MAC Address                      0x1020          6B
//! Network Index                    0x1026          1B
//! Network Key                      0x1027          <= 64B
//! Authentication Type              0x1003          2B
//! Encryption Type                  0x100F          2B
//! Vendor Extension                 0x1049          <= 1024B
//! ```
//!
//! Attributes are scanned by ID. The lengths are not trusted uniformly:
//! fixed-size attributes are read at their fixed size and their length
//! field is skipped.

use log::debug;
use serde::Serialize;

use super::cursor::{Cursor, non_empty_utf8};
use super::error::DecodeError;

pub const ATTR_CREDENTIAL: u16 = 0x100E;
pub const ATTR_SSID: u16 = 0x1045;
pub const ATTR_MAC_ADDRESS: u16 = 0x1020;
pub const ATTR_NETWORK_INDEX: u16 = 0x1026;
pub const ATTR_NETWORK_KEY: u16 = 0x1027;
pub const ATTR_AUTH_TYPE: u16 = 0x1003;
pub const ATTR_ENCRYPT_TYPE: u16 = 0x100F;
pub const ATTR_VENDOR_EXT: u16 = 0x1049;

pub const VENDOR_ID_WFA: [u8; 3] = [0x00, 0x37, 0x2A];
pub const WFA_SUBELEMENT_VERSION2: u8 = 0x00;

const MAC_LEN: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AuthType {
    Open,
    #[serde(rename = "WPA Personal")]
    WpaPersonal,
    Shared,
    #[serde(rename = "WPA Enterprise")]
    WpaEnterprise,
    #[serde(rename = "WPA2 Enterprise")]
    Wpa2Enterprise,
    #[serde(rename = "WPA2 Personal")]
    Wpa2Personal,
    #[serde(rename = "WPA/WPA2 Personal")]
    WpaWpa2Personal,
}

impl AuthType {
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            0x0001 => Some(Self::Open),
            0x0002 => Some(Self::WpaPersonal),
            0x0004 => Some(Self::Shared),
            0x0008 => Some(Self::WpaEnterprise),
            0x0010 => Some(Self::Wpa2Enterprise),
            0x0020 => Some(Self::Wpa2Personal),
            0x0022 => Some(Self::WpaWpa2Personal),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EncryptType {
    None,
    #[serde(rename = "WEP")]
    Wep,
    #[serde(rename = "TKIP")]
    Tkip,
    #[serde(rename = "AES")]
    Aes,
    #[serde(rename = "AES/TKIP")]
    AesTkip,
}

impl EncryptType {
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            0x0001 => Some(Self::None),
            0x0002 => Some(Self::Wep),
            0x0004 => Some(Self::Tkip),
            0x0008 => Some(Self::Aes),
            0x000C => Some(Self::AesTkip),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WifiCredential {
    pub ssid: String,
    /// `aa:bb:cc:dd:ee:ff`
    pub mac_address: String,
    pub network_index: u8,
    pub network_key: String,
    pub auth_type: Option<AuthType>,
    pub encrypt_type: Option<EncryptType>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WifiVersion2 {
    /// "2.0" or "2.1"
    pub version: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WifiConfigRecord {
    /// In the order they appear, typically one per band.
    pub credentials: Vec<WifiCredential>,
    pub version2: Option<WifiVersion2>,
}

/// Decodes a WSC configuration token.
///
/// Only Vendor Extension and Credential are understood at the top level;
/// the first other attribute ends the scan and whatever was collected so
/// far is returned.
pub fn decode_wifi_config(payload: &[u8]) -> Result<WifiConfigRecord, DecodeError> {
    if payload.len() < 2 {
        return Err(DecodeError::Truncated {
            needed: 2,
            available: payload.len(),
        });
    }

    let mut cursor = Cursor::new(payload);
    let mut credentials = Vec::new();
    let mut version2 = None;

    while cursor.remaining() >= 2 {
        match cursor.peek_u16_be()? {
            ATTR_VENDOR_EXT => {
                cursor.skip(2)?;
                let len = cursor.read_u16_be()? as usize;
                let body = cursor.take(len)?;
                version2 = decode_version2(body).unwrap_or_else(|err| {
                    debug!("wsc: ignoring vendor extension: {}", err);
                    None
                });
            }
            ATTR_CREDENTIAL => {
                cursor.skip(2)?;
                let len = cursor.read_u16_be()? as usize;
                let body = cursor.take(len)?;
                let credential = decode_credential(body)?.ok_or(DecodeError::IncompleteCredential)?;
                credentials.push(credential);
            }
            other => {
                debug!("wsc: stopping at attribute {:#06x}", other);
                break;
            }
        }
    }

    Ok(WifiConfigRecord {
        credentials,
        version2,
    })
}

/// Decodes the body of one Credential attribute.
///
/// Unknown attribute IDs are stepped over two bytes at a time. `Ok(None)`
/// means the scan finished but ssid, MAC address or network key was
/// missing.
pub fn decode_credential(payload: &[u8]) -> Result<Option<WifiCredential>, DecodeError> {
    if payload.len() < 2 {
        return Err(DecodeError::Truncated {
            needed: 2,
            available: payload.len(),
        });
    }

    let mut cursor = Cursor::new(payload);
    let mut ssid = None;
    let mut mac_address = None;
    let mut network_index = None;
    let mut network_key = None;
    let mut auth_type = None;
    let mut encrypt_type = None;

    while cursor.remaining() >= 2 {
        match cursor.read_u16_be()? {
            ATTR_SSID => {
                let len = cursor.read_u16_be()? as usize;
                ssid = Some(non_empty_utf8(cursor.take(len)?, "ssid")?);
            }
            ATTR_MAC_ADDRESS => {
                cursor.skip(2)?;
                mac_address = Some(format_mac(cursor.take(MAC_LEN)?));
            }
            ATTR_NETWORK_INDEX => {
                cursor.skip(2)?;
                network_index = Some(cursor.read_u8()?);
            }
            ATTR_NETWORK_KEY => {
                let len = cursor.read_u16_be()? as usize;
                network_key = Some(non_empty_utf8(cursor.take(len)?, "network key")?);
            }
            ATTR_AUTH_TYPE => {
                cursor.skip(2)?;
                auth_type = AuthType::from_code(cursor.read_u16_be()?);
            }
            ATTR_ENCRYPT_TYPE => {
                cursor.skip(2)?;
                encrypt_type = EncryptType::from_code(cursor.read_u16_be()?);
            }
            // Unrecognized attributes shall be ignored (WSC 2.0.4, Credential data elements).
            _ => {}
        }
    }

    Ok(match (ssid, mac_address, network_key) {
        (Some(ssid), Some(mac_address), Some(network_key)) => Some(WifiCredential {
            ssid,
            mac_address,
            network_index: network_index.unwrap_or(0),
            network_key,
            auth_type,
            encrypt_type,
        }),
        _ => None,
    })
}

// WFA vendor extension sub-elements:
// Version2 0x00 (1B), AuthorizedMACs 0x01, Network Key Shareable 0x02,
// Request to Enroll 0x03, Settings Delay Time 0x04, Registrar Config Methods 0x05
/// Decodes a Vendor Extension body. `Ok(None)` when it is not the WFA
/// extension or does not open with Version2.
pub fn decode_version2(payload: &[u8]) -> Result<Option<WifiVersion2>, DecodeError> {
    let mut cursor = Cursor::new(payload);
    let vendor = cursor.take(VENDOR_ID_WFA.len())?;
    if vendor != VENDOR_ID_WFA {
        return Ok(None);
    }
    if cursor.read_u8()? != WFA_SUBELEMENT_VERSION2 {
        return Ok(None);
    }
    let len = cursor.read_u8()?;
    if len != 1 {
        return Err(DecodeError::InvalidVersion2Length(len));
    }
    let version = match cursor.read_u8()? {
        0x20 => "2.0",
        0x21 => "2.1",
        other => return Err(DecodeError::InvalidVersion2(other)),
    };
    Ok(Some(WifiVersion2 { version }))
}

fn format_mac(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(":")
}
