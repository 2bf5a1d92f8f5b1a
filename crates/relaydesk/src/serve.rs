// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `relaydesk serve` command implementation.
//!
//! Wires the Telegram origin transport, the Discord mirror transport, the
//! JSON stores, and the optional relay-probe gateway into a single engine
//! loop, then runs until SIGINT/SIGTERM.

use std::path::Path;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use relaydesk_config::RelaydeskConfig;
use relaydesk_core::BridgeError;
use relaydesk_discord::{DiscordMirror, handler};
use relaydesk_engine::{BridgeEngine, EVENT_QUEUE_DEPTH, shutdown};
use relaydesk_store::{JsonFile, LANGUAGES_FILE, LanguageStore, TICKETS_FILE, TicketStore};
use relaydesk_telegram::TelegramOrigin;

/// Runs the `relaydesk serve` command.
pub async fn run_serve(config: RelaydeskConfig) -> Result<(), BridgeError> {
    init_tracing(&config.agent.log_level);

    info!(name = config.agent.name.as_str(), "starting relaydesk serve");

    // Open the durable stores.
    let data_dir = Path::new(&config.storage.data_dir);
    std::fs::create_dir_all(data_dir).map_err(|e| BridgeError::Persistence {
        source: Box::new(e),
    })?;
    let tickets = TicketStore::open(JsonFile::new(data_dir.join(TICKETS_FILE)))?;
    let languages = LanguageStore::open(JsonFile::new(data_dir.join(LANGUAGES_FILE)))?;
    info!(
        data_dir = %data_dir.display(),
        open_tickets = tickets.open_tickets().count(),
        "stores loaded"
    );

    let (events_tx, events_rx) = mpsc::channel(EVENT_QUEUE_DEPTH);

    // Telegram origin: long polling feeds the queue, the transport handle
    // serves outbound sends.
    let telegram = Arc::new(TelegramOrigin::new(&config.telegram)?);
    let polling_task = telegram.spawn_polling(events_tx.clone());
    info!("telegram origin transport started");

    // Discord mirror: the gateway client feeds the queue; its HTTP handle is
    // shared with the REST-side transport.
    let mut client = handler::build_client(&config.discord, events_tx.clone()).await?;
    let discord = Arc::new(DiscordMirror::new(client.http.clone(), &config.discord)?);
    let gateway_task = tokio::spawn(async move {
        if let Err(err) = client.start().await {
            error!(error = %err, "discord gateway client stopped");
        }
    });
    info!("discord mirror transport started");

    // Optional HTTP relay probe.
    if config.gateway.enabled {
        let gateway_config = config.gateway.clone();
        let probe_tx = events_tx.clone();
        tokio::spawn(async move {
            if let Err(err) = relaydesk_gateway::start_server(&gateway_config, probe_tx).await {
                warn!(error = %err, "relay-probe gateway stopped");
            }
        });
    } else {
        debug!("relay-probe gateway disabled by configuration");
    }
    drop(events_tx);

    let engine = BridgeEngine::new(tickets, languages, telegram, discord, events_rx);

    let cancel = shutdown::install_signal_handler();
    engine.run(cancel).await;

    polling_task.abort();
    gateway_task.abort();

    info!("relaydesk serve shutdown complete");
    Ok(())
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("relaydesk={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
