// src/ws.rs
use crate::types::{IncomingMessage, NfcCommand, NfcRequest, OutgoingMessage, ReaderQuery};
use crossbeam_channel::Sender;
use futures::{SinkExt, StreamExt};
use log::{debug, info, warn};
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use warp::Filter;

/// What to do with one method call: forward it to the NFC thread or
/// answer it straight away.
#[derive(Debug, PartialEq)]
pub enum Dispatch {
    Forward(NfcCommand),
    Reply(OutgoingMessage),
}

pub fn dispatch(msg: IncomingMessage, scan_once_default: bool) -> Dispatch {
    match msg {
        IncomingMessage::ReadSupported => Dispatch::Forward(NfcCommand::Query(ReaderQuery::Supported)),
        IncomingMessage::ReadEnabled => Dispatch::Forward(NfcCommand::Query(ReaderQuery::Enabled)),
        IncomingMessage::ReadNdefSupported => {
            Dispatch::Forward(NfcCommand::Query(ReaderQuery::NdefSupported))
        }
        IncomingMessage::ReadNdefEnabled => {
            Dispatch::Forward(NfcCommand::Query(ReaderQuery::NdefEnabled))
        }
        IncomingMessage::StartReading { scan_once } => Dispatch::Forward(NfcCommand::StartReading {
            scan_once: scan_once.unwrap_or(scan_once_default),
        }),
        IncomingMessage::StopReading => Dispatch::Forward(NfcCommand::StopReading),
        // Writing tags is not supported; the call is acknowledged with null.
        IncomingMessage::WriteNdef { .. } => {
            Dispatch::Reply(OutgoingMessage::method_result("writeNDEF", Value::Null))
        }
    }
}

pub async fn start_server(
    listen: SocketAddr,
    scan_once_default: bool,
    nfc_cmd_tx: Sender<NfcRequest>,
    mut nfc_event_rx: broadcast::Receiver<OutgoingMessage>,
) {
    // Shared Broadcast Channel for WS Clients
    let (ws_tx, _) = broadcast::channel::<OutgoingMessage>(32);
    let ws_tx = Arc::new(ws_tx);

    // Forward NFC Events -> All WS Clients
    let ws_tx_clone = ws_tx.clone();
    tokio::spawn(async move {
        loop {
            match nfc_event_rx.recv().await {
                Ok(msg) => {
                    let _ = ws_tx_clone.send(msg);
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!("Dropped {} NFC events", n);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    let ws_route = warp::path::end()
        .and(warp::ws())
        .map(move |ws: warp::ws::Ws| {
            let nfc_cmd_tx = nfc_cmd_tx.clone();
            let ws_tx = ws_tx.clone();
            ws.on_upgrade(move |socket| {
                handle_connection(socket, nfc_cmd_tx, ws_tx, scan_once_default)
            })
        });

    let routes = ws_route.with(warp::cors().allow_any_origin());

    info!("WebSocket server running on ws://{}", listen);
    warp::serve(routes).run(listen).await;
}

/// Next message for one client: its own replies, or a broadcast event.
/// `None` once the connection's reply sender is gone or the broadcast closes.
async fn next_outgoing(
    reply_rx: &mut mpsc::UnboundedReceiver<OutgoingMessage>,
    rx_broadcast: &mut broadcast::Receiver<OutgoingMessage>,
) -> Option<OutgoingMessage> {
    loop {
        tokio::select! {
            reply = reply_rx.recv() => return reply,
            res = rx_broadcast.recv() => match res {
                Ok(msg) => return Some(msg),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    debug!("Client lagged by {} events", n);
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            },
        }
    }
}

async fn handle_connection(
    ws: warp::ws::WebSocket,
    nfc_cmd_tx: Sender<NfcRequest>,
    ws_tx: Arc<broadcast::Sender<OutgoingMessage>>,
    scan_once_default: bool,
) {
    let (mut client_ws_tx, mut client_ws_rx) = ws.split();
    let mut rx_broadcast = ws_tx.subscribe();
    // Replies meant for this client only
    let (reply_tx, mut reply_rx) = mpsc::unbounded_channel::<OutgoingMessage>();

    tokio::spawn(async move {
        while let Some(msg) = next_outgoing(&mut reply_rx, &mut rx_broadcast).await {
            let json = match serde_json::to_string(&msg) {
                Ok(json) => json,
                Err(e) => {
                    warn!("Could not serialize {:?}: {}", msg, e);
                    continue;
                }
            };
            if client_ws_tx
                .send(warp::ws::Message::text(json))
                .await
                .is_err()
            {
                break;
            }
        }
    });

    while let Some(result) = client_ws_rx.next().await {
        let msg = match result {
            Ok(msg) => msg,
            Err(e) => {
                debug!("WebSocket receive error: {}", e);
                break;
            }
        };
        let Ok(text) = msg.to_str() else {
            continue;
        };
        match serde_json::from_str::<IncomingMessage>(text) {
            Ok(parsed) => match dispatch(parsed, scan_once_default) {
                Dispatch::Forward(command) => {
                    let _ = nfc_cmd_tx.send(NfcRequest {
                        command,
                        reply: reply_tx.clone(),
                    });
                }
                Dispatch::Reply(reply) => {
                    let _ = reply_tx.send(reply);
                }
            },
            Err(e) => warn!("Ignoring malformed method call {:?}: {}", text, e),
        }
    }
}
