//! Structured log of board events.
//!
//! Subscribes to the [`EventBus`](boardwalk_events::EventBus) and writes
//! every [`BoardEvent`] to the `tracing` output. Exits when the bus closes
//! or the cancellation token fires.

use boardwalk_events::BoardEvent;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

pub struct BoardEventLog;

impl BoardEventLog {
    pub async fn run(mut receiver: broadcast::Receiver<BoardEvent>, cancel: CancellationToken) {
        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    tracing::info!("Board event log cancelled");
                    break;
                }
                received = receiver.recv() => match received {
                    Ok(event) => {
                        tracing::info!(
                            event = event.kind.as_str(),
                            board_id = event.board_id,
                            actor = ?event.actor,
                            payload = %event.payload,
                            "Board event"
                        );
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(skipped = n, "Board event log lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        tracing::info!("Event bus closed, board event log shutting down");
                        break;
                    }
                },
            }
        }
    }
}
