// src/nfc_service.rs
use crossbeam_channel::{Receiver, Sender};
use log::{debug, error, info, warn};
use pcsc::{Context, PNP_NOTIFICATION, Protocols, ReaderState, Scope, ShareMode, State};
use serde_json::Value;
use std::ffi::{CStr, CString};
use std::time::Duration;

use crate::cards::{self, CardKind};
use crate::projector::{project_message, project_tag};
use crate::types::{NfcCommand, NfcRequest, OutgoingMessage, ReaderQuery};
use crate::{apdu, ndef};

/// Whether tags are currently being reported to clients.
#[derive(Debug, Default)]
pub struct ReadSession {
    active: bool,
    scan_once: bool,
}

impl ReadSession {
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Starts a session. One already running is closed first and its
    /// end-of-stream event returned.
    pub fn start(&mut self, scan_once: bool) -> Option<OutgoingMessage> {
        let previous = self.stop();
        self.active = true;
        self.scan_once = scan_once;
        previous
    }

    /// Ends the session; yields the end-of-stream event if one was running.
    pub fn stop(&mut self) -> Option<OutgoingMessage> {
        if !self.active {
            return None;
        }
        self.active = false;
        Some(OutgoingMessage::EndOfStream)
    }

    /// Events to emit for one tag. A scan-once session closes after the
    /// first tag result; read errors leave it open.
    pub fn deliver(&mut self, event: OutgoingMessage) -> Vec<OutgoingMessage> {
        if !self.active {
            return Vec::new();
        }
        let is_result = matches!(
            event,
            OutgoingMessage::NdefResult { .. } | OutgoingMessage::TagResult { .. }
        );
        let mut events = vec![event];
        if is_result && self.scan_once {
            events.extend(self.stop());
        }
        events
    }
}

fn tag_only(uid: &[u8], reason: String) -> OutgoingMessage {
    match project_tag(uid) {
        Some(result) => OutgoingMessage::TagResult { result },
        None => OutgoingMessage::read_error("TagNotSupported", reason),
    }
}

/// Turns what was read off a tag into the event for clients: the decoded
/// NDEF message if there is one, else the bare tag UID.
pub fn tag_event(uid: &[u8], memory: Result<Vec<u8>, String>) -> OutgoingMessage {
    let memory = match memory {
        Ok(memory) => memory,
        Err(e) => {
            debug!("Tag memory unreadable: {}", e);
            return tag_only(uid, e);
        }
    };
    match ndef::find_ndef_tlv(&memory).and_then(ndef::parse_message) {
        Ok(records) => OutgoingMessage::NdefResult {
            result: project_message(uid, &records),
        },
        Err(err) => {
            debug!("No NDEF message on tag: {}", err);
            tag_only(uid, err.to_string())
        }
    }
}

fn answer_query(query: ReaderQuery, reader_names: &[CString]) -> OutgoingMessage {
    let value = match query {
        // The context is up, otherwise this thread would have exited.
        ReaderQuery::Supported | ReaderQuery::NdefSupported => true,
        ReaderQuery::Enabled | ReaderQuery::NdefEnabled => !reader_names.is_empty(),
    };
    OutgoingMessage::method_result(query.method(), Value::Bool(value))
}

/// Method results go to the caller only; session events go to `tx`.
fn handle_command(
    request: NfcRequest,
    session: &mut ReadSession,
    reader_names: &[CString],
    tx: &Sender<OutgoingMessage>,
) {
    let NfcRequest { command, reply } = request;
    match command {
        NfcCommand::Query(query) => {
            let _ = reply.send(answer_query(query, reader_names));
        }
        NfcCommand::StartReading { scan_once } => {
            if let Some(end) = session.start(scan_once) {
                info!("Restarting reading session");
                let _ = tx.send(end);
            }
            info!("Reading session started (scan_once = {})", scan_once);
            let _ = reply.send(OutgoingMessage::method_result("startReading", Value::Null));
        }
        NfcCommand::StopReading => {
            let _ = reply.send(OutgoingMessage::method_result("stopReading", Value::Null));
            if let Some(end) = session.stop() {
                info!("Reading session stopped");
                let _ = tx.send(end);
            }
        }
    }
}

pub fn run(tx: Sender<OutgoingMessage>, rx: Receiver<NfcRequest>, poll_interval: Duration) {
    info!("Starting NFC Service (Event Driven)...");

    let ctx = match Context::establish(Scope::User) {
        Ok(ctx) => ctx,
        Err(err) => {
            error!("Failed to establish context: {}", err);
            let _ = tx.send(OutgoingMessage::read_error("NDEFUnsupportedFeatureError", err.to_string()));
            return;
        }
    };

    let mut readers_buf = [0; 2048];
    let mut reader_names: Vec<CString> = Vec::new();
    let mut session = ReadSession::default();

    // Index 0 watches for readers being plugged in or removed
    let mut reader_states = vec![ReaderState::new(PNP_NOTIFICATION(), State::UNAWARE)];

    loop {
        // 1. Wait for State Change
        if let Err(err) = ctx.get_status_change(poll_interval, &mut reader_states) {
            if err != pcsc::Error::Timeout {
                error!("PCSC Error: {}", err);
                std::thread::sleep(Duration::from_secs(1));
                continue;
            }
        }

        // 2. CHECK FOR COMMANDS
        while let Ok(request) = rx.try_recv() {
            handle_command(request, &mut session, &reader_names, &tx);
        }

        // 3. PROCESS EVENTS
        let mut readers_changed = false;

        if reader_states[0].event_state().intersects(State::CHANGED) {
            info!("Hardware change detected");
            readers_changed = true;
            reader_states[0].sync_current_state();
        }

        for i in 1..reader_states.len() {
            let rs = &reader_states[i];
            if !rs.event_state().intersects(State::CHANGED) {
                continue;
            }
            let name = reader_names[i - 1].clone();
            let current = rs.event_state();

            if current.intersects(State::PRESENT) && !rs.current_state().intersects(State::PRESENT) {
                info!("Card Inserted on {:?}", name);
                handle_card_insertion(&ctx, &name, &mut session, &tx);
            }

            if current.intersects(State::EMPTY) && rs.current_state().intersects(State::PRESENT) {
                info!("Card Removed from {:?}", name);
            }

            reader_states[i].sync_current_state();
        }

        // 4. REFRESH LIST
        if readers_changed {
            // Keep the PnP entry at index 0, rebuild the rest
            reader_states.truncate(1);
            match ctx.list_readers(&mut readers_buf) {
                Ok(iter) => {
                    reader_names = iter.map(CString::from).collect();
                    for name in &reader_names {
                        reader_states.push(ReaderState::new(name.clone(), State::UNAWARE));
                    }
                }
                Err(err) => {
                    warn!("Could not list readers: {}", err);
                    reader_names.clear();
                }
            }
            info!("{} reader(s) connected", reader_names.len());
        }
    }
}

fn handle_card_insertion(
    ctx: &Context,
    reader_name: &CStr,
    session: &mut ReadSession,
    tx: &Sender<OutgoingMessage>,
) {
    if !session.is_active() {
        debug!("No reading session, ignoring card");
        return;
    }

    let event = match ctx.connect(reader_name, ShareMode::Shared, Protocols::ANY) {
        Ok(card) => {
            let mut names_buf = [0u8; 128];
            let mut atr_buf = [0u8; 64];
            let kind = match card.status2(&mut names_buf, &mut atr_buf) {
                Ok(status) => CardKind::from_atr(status.atr()),
                Err(_) => CardKind::Ntag,
            };
            let uid = apdu::get_uid(&card).unwrap_or_else(|e| {
                warn!("Could not read UID: {}", e);
                Vec::new()
            });
            tag_event(&uid, cards::read_memory(&card, kind))
        }
        Err(e) => {
            error!("Failed to connect to card: {}", e);
            OutgoingMessage::read_error("TagConnectionLost", e.to_string())
        }
    };

    for msg in session.deliver(event) {
        let _ = tx.send(msg);
    }
}
