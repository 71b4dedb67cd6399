//! Background task that polls the Soroban RPC and writes decoded QVF
//! events to the database.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use sqlx::SqlitePool;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::db;
use crate::errors::{IndexerError, Result};
use crate::rpc;

pub struct IndexerState {
    pub pool: SqlitePool,
    pub config: Config,
    pub client: Client,
}

/// Where the next poll starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub ledger: u32,
    pub cursor: Option<String>,
}

impl Position {
    /// A saved ledger of `0` means nothing has been indexed yet.
    pub fn resume(saved_ledger: i64, saved_cursor: Option<String>, start_ledger: u32) -> Self {
        if saved_ledger > 0 {
            Position {
                ledger: u32::try_from(saved_ledger).unwrap_or(u32::MAX),
                cursor: saved_cursor,
            }
        } else {
            Position {
                ledger: start_ledger,
                cursor: None,
            }
        }
    }

    /// While the RPC hands back a cursor we stay on the same range and page
    /// through it; the ledger only moves forward.
    pub fn advance(&self, latest_ledger: Option<u64>, next_cursor: Option<String>) -> Self {
        let latest = latest_ledger
            .map(|l| u32::try_from(l).unwrap_or(u32::MAX))
            .unwrap_or(self.ledger);
        Position {
            ledger: latest.max(self.ledger),
            cursor: next_cursor,
        }
    }

    /// A cursor the RPC rejects outright (pruned past its retention window,
    /// or issued by a node that has since been reset) is dropped so the next
    /// poll restarts by ledger. Re-fetched events are deduplicated on insert.
    pub fn recover(&self, err: &IndexerError) -> Option<Self> {
        match err {
            IndexerError::Rpc { .. } if self.cursor.is_some() => Some(Position {
                ledger: self.ledger,
                cursor: None,
            }),
            _ => None,
        }
    }
}

/// Run the indexer loop forever. Spawn it as a [`tokio`] task.
pub async fn run(state: Arc<IndexerState>) {
    info!(contract = %state.config.contract_id, "Indexer starting");

    let saved_ledger = db::get_last_ledger(&state.pool).await.unwrap_or_else(|e| {
        warn!("Could not read saved ledger, starting fresh: {e}");
        0
    });
    let saved_cursor = db::get_cursor_string(&state.pool).await.unwrap_or(None);
    let mut position = Position::resume(saved_ledger, saved_cursor, state.config.start_ledger);

    info!("Resuming from ledger {}", position.ledger);

    loop {
        match poll_once(&state.pool, &state.client, &state.config, &position).await {
            Ok(next) => position = next,
            Err(e) => {
                error!("Indexer poll error: {e}");
                if let Some(recovered) = position.recover(&e) {
                    warn!(
                        "Dropping rejected cursor, restarting from ledger {}",
                        recovered.ledger
                    );
                    if let Err(e) =
                        db::save_cursor(&state.pool, i64::from(recovered.ledger), None).await
                    {
                        error!("Could not persist reset cursor: {e}");
                    }
                    position = recovered;
                }
            }
        }

        tokio::time::sleep(Duration::from_secs(state.config.poll_interval_secs)).await;
    }
}

/// Fetch one page, store it and persist the new position.
async fn poll_once(
    pool: &SqlitePool,
    client: &Client,
    config: &Config,
    position: &Position,
) -> Result<Position> {
    let (raw_events, next_cursor, latest_ledger) = rpc::fetch_events(
        client,
        &config.rpc_url,
        &config.contract_id,
        position.ledger,
        position.cursor.as_deref(),
        config.events_per_page,
    )
    .await?;

    if raw_events.is_empty() {
        debug!("No new events since ledger {}", position.ledger);
    } else {
        let decoded = rpc::decode_events(&raw_events, &config.contract_id);
        let inserted = db::insert_events(pool, &decoded).await?;
        info!(
            "Polled {} raw events → {} new records stored",
            raw_events.len(),
            inserted
        );
    }

    let next = position.advance(latest_ledger, next_cursor);

    // Persist so restarts pick up exactly here.
    db::save_cursor(pool, i64::from(next.ledger), next.cursor.as_deref()).await?;

    Ok(next)
}
