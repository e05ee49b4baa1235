// src/types.rs
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc;

use crate::projector::Fields;

/// Events and replies sent TO the WebSocket client.
#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutgoingMessage {
    MethodResult { method: String, value: Value },
    NdefResult { result: Fields },
    TagResult { result: Fields },
    ReadError { code: String, message: String },
    EndOfStream,
}

impl OutgoingMessage {
    pub fn read_error(code: &str, message: impl Into<String>) -> Self {
        Self::ReadError {
            code: code.to_string(),
            message: message.into(),
        }
    }

    pub fn method_result(method: &str, value: Value) -> Self {
        Self::MethodResult {
            method: method.to_string(),
            value,
        }
    }
}

/// Method calls received FROM the WebSocket client.
#[derive(Deserialize, Debug, PartialEq)]
#[serde(tag = "method", rename_all = "camelCase")]
pub enum IncomingMessage {
    ReadSupported,
    ReadEnabled,
    #[serde(rename = "readNDEFSupported")]
    ReadNdefSupported,
    #[serde(rename = "readNDEFEnabled")]
    ReadNdefEnabled,
    StartReading {
        #[serde(default)]
        scan_once: Option<bool>,
    },
    StopReading,
    #[serde(rename = "writeNDEF")]
    WriteNdef {
        #[serde(default)]
        message: Value,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderQuery {
    Supported,
    Enabled,
    NdefSupported,
    NdefEnabled,
}

impl ReaderQuery {
    pub fn method(self) -> &'static str {
        match self {
            Self::Supported => "readSupported",
            Self::Enabled => "readEnabled",
            Self::NdefSupported => "readNDEFSupported",
            Self::NdefEnabled => "readNDEFEnabled",
        }
    }
}

/// Internal commands sent from WS Server -> NFC Thread
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NfcCommand {
    Query(ReaderQuery),
    StartReading { scan_once: bool },
    StopReading,
}

/// A command together with the connection that sent it. Method results go
/// back on `reply`; tag events are broadcast to everyone.
#[derive(Debug, Clone)]
pub struct NfcRequest {
    pub command: NfcCommand,
    pub reply: mpsc::UnboundedSender<OutgoingMessage>,
}
