//! NFC tag reading service: decodes NDEF records from tags on a PC/SC
//! reader and publishes them to WebSocket clients.

pub mod apdu;
pub mod cards;
pub mod config;
pub mod hce;
pub mod ndef;
pub mod nfc_service;
pub mod projector;
pub mod types;
pub mod ws;
