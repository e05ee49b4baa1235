use clap::Parser;
use crossbeam_channel::unbounded;
use log::info;
use tokio::sync::broadcast;

use nfc_ndef_service::config::Config;
use nfc_ndef_service::types::{NfcRequest, OutgoingMessage};
use nfc_ndef_service::{nfc_service, ws};

#[tokio::main]
async fn main() {
    let config = Config::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();
    info!("Starting NFC NDEF Service...");

    // Channel: WS -> NFC (Commands)
    // Crossbeam (Sync) because the NFC thread blocks on PC/SC
    let (cmd_tx, cmd_rx) = unbounded::<NfcRequest>();

    // Channel: NFC -> WS (Events), fanned out to every client
    let (event_tx, event_rx) = broadcast::channel::<OutgoingMessage>(100);

    let poll_interval = config.poll_interval();
    std::thread::spawn(move || {
        // Bridge NFC thread -> broadcast
        let (bridge_tx, bridge_rx) = unbounded::<OutgoingMessage>();

        std::thread::spawn(move || {
            nfc_service::run(bridge_tx, cmd_rx, poll_interval);
        });

        while let Ok(msg) = bridge_rx.recv() {
            let _ = event_tx.send(msg);
        }
    });

    ws::start_server(config.listen, config.scan_once_default, cmd_tx, event_rx).await;
}
