//! KitchenManager - actor that owns the KitchenBoard

use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::board::{BoardError, BoardResult, KitchenBoard, TransferOutcome};
use crate::domain::KitchenStatus;

use super::messages::{BoardEvent, KitchenCommand};

/// Pending highlight auto-clears, keyed by order id
///
/// Each entry carries a generation so a clear that raced a newer highlight
/// is recognised as stale. Dropping the set aborts every pending timer.
struct HighlightTimers {
    delay: Duration,
    tx: mpsc::WeakSender<KitchenCommand>,
    next_generation: u64,
    pending: HashMap<String, (u64, JoinHandle<()>)>,
}

impl HighlightTimers {
    fn new(tx: mpsc::WeakSender<KitchenCommand>, delay: Duration) -> Self {
        Self {
            delay,
            tx,
            next_generation: 0,
            pending: HashMap::new(),
        }
    }

    /// Start (or restart) the timer for `id`
    fn schedule(&mut self, id: &str) {
        debug!(%id, "HighlightTimers::schedule: called");
        if let Some((_, handle)) = self.pending.remove(id) {
            handle.abort();
        }
        self.next_generation += 1;
        let generation = self.next_generation;
        let deadline = tokio::time::Instant::now() + self.delay;
        let tx = self.tx.clone();
        let timer_id = id.to_string();
        let handle = tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            if let Some(tx) = tx.upgrade() {
                let _ = tx
                    .send(KitchenCommand::ClearHighlight {
                        id: timer_id,
                        generation,
                    })
                    .await;
            }
        });
        self.pending.insert(id.to_string(), (generation, handle));
    }

    /// Consume the entry for `id` if `generation` is still current
    fn take_if_current(&mut self, id: &str, generation: u64) -> bool {
        match self.pending.get(id) {
            Some((current, _)) if *current == generation => {
                self.pending.remove(id);
                true
            }
            _ => false,
        }
    }

    /// Abort every timer, returning the ids that were still highlighted
    fn abort_all(&mut self) -> Vec<String> {
        self.pending
            .drain()
            .map(|(id, (_, handle))| {
                handle.abort();
                id
            })
            .collect()
    }
}

impl Drop for HighlightTimers {
    fn drop(&mut self) {
        let aborted = self.abort_all();
        if !aborted.is_empty() {
            debug!(count = aborted.len(), "HighlightTimers dropped, timers aborted");
        }
    }
}

/// Handle to send commands to the KitchenManager
#[derive(Clone)]
pub struct KitchenManager {
    tx: mpsc::Sender<KitchenCommand>,
    /// Broadcast sender for board change notifications
    event_tx: broadcast::Sender<BoardEvent>,
}

impl KitchenManager {
    /// Spawn a new KitchenManager actor owning `board`
    pub fn spawn(board: KitchenBoard, highlight: Duration) -> Self {
        debug!(orders = board.len(), ?highlight, "spawn: called");
        let (tx, rx) = mpsc::channel(256);
        let (event_tx, _) = broadcast::channel(64);

        let timers = HighlightTimers::new(tx.downgrade(), highlight);
        tokio::spawn(actor_loop(board, timers, rx, event_tx.clone()));

        info!("KitchenManager spawned");
        Self { tx, event_tx }
    }

    /// Subscribe to board change events
    pub fn subscribe_events(&self) -> broadcast::Receiver<BoardEvent> {
        self.event_tx.subscribe()
    }

    async fn request<T>(&self, make: impl FnOnce(oneshot::Sender<T>) -> KitchenCommand) -> BoardResult<T> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(make(reply_tx))
            .await
            .map_err(|_| BoardError::ChannelError)?;
        reply_rx.await.map_err(|_| BoardError::ChannelError)
    }

    /// Copy of the current board
    pub async fn snapshot(&self) -> BoardResult<KitchenBoard> {
        debug!("snapshot: called");
        self.request(|reply| KitchenCommand::Snapshot { reply }).await
    }

    /// Reorder within one bucket
    pub async fn move_within(&self, status: KitchenStatus, from: usize, to: usize) -> BoardResult<()> {
        debug!(%status, from, to, "move_within: called");
        self.request(|reply| KitchenCommand::MoveWithin {
            status,
            from,
            to,
            reply,
        })
        .await?
    }

    /// Move an order across buckets; `Ok(None)` for an unknown list id
    pub async fn transfer(
        &self,
        source: KitchenStatus,
        from: usize,
        to: usize,
        dest_list_id: &str,
    ) -> BoardResult<Option<TransferOutcome>> {
        debug!(%source, from, to, %dest_list_id, "transfer: called");
        self.request(|reply| KitchenCommand::Transfer {
            source,
            from,
            to,
            dest_list_id: dest_list_id.to_string(),
            reply,
        })
        .await?
    }

    /// Push an order one status forward; `None` if terminal or unknown
    pub async fn advance(&self, id: &str) -> BoardResult<Option<TransferOutcome>> {
        debug!(%id, "advance: called");
        self.request(|reply| KitchenCommand::Advance {
            id: id.to_string(),
            reply,
        })
        .await
    }

    /// Stop the actor and take back the board
    ///
    /// Pending highlight timers are aborted and their flags cleared.
    pub async fn shutdown(&self) -> BoardResult<KitchenBoard> {
        debug!("shutdown: called");
        self.request(|reply| KitchenCommand::Shutdown { reply }).await
    }
}

fn moved(
    event_tx: &broadcast::Sender<BoardEvent>,
    timers: &mut HighlightTimers,
    outcome: &Option<TransferOutcome>,
) {
    if let Some(outcome) = outcome {
        timers.schedule(&outcome.id);
        let _ = event_tx.send(BoardEvent::OrderMoved {
            id: outcome.id.clone(),
            from: outcome.from,
            to: outcome.to,
        });
    }
}

async fn actor_loop(
    mut board: KitchenBoard,
    mut timers: HighlightTimers,
    mut rx: mpsc::Receiver<KitchenCommand>,
    event_tx: broadcast::Sender<BoardEvent>,
) {
    debug!("actor_loop: called");

    while let Some(cmd) = rx.recv().await {
        match cmd {
            KitchenCommand::Snapshot { reply } => {
                debug!("actor_loop: Snapshot command");
                let _ = reply.send(board.clone());
            }

            KitchenCommand::MoveWithin { status, from, to, reply } => {
                debug!(%status, from, to, "actor_loop: MoveWithin command");
                let _ = reply.send(board.move_within(status, from, to));
            }

            KitchenCommand::Transfer {
                source,
                from,
                to,
                dest_list_id,
                reply,
            } => {
                debug!(%source, from, to, %dest_list_id, "actor_loop: Transfer command");
                let result = board.transfer(source, from, to, &dest_list_id);
                if let Ok(outcome) = &result {
                    moved(&event_tx, &mut timers, outcome);
                }
                let _ = reply.send(result);
            }

            KitchenCommand::Advance { id, reply } => {
                debug!(%id, "actor_loop: Advance command");
                let outcome = board.advance(&id);
                moved(&event_tx, &mut timers, &outcome);
                let _ = reply.send(outcome);
            }

            KitchenCommand::ClearHighlight { id, generation } => {
                if !timers.take_if_current(&id, generation) {
                    debug!(%id, generation, "actor_loop: stale highlight clear ignored");
                    continue;
                }
                debug!(%id, generation, "actor_loop: ClearHighlight command");
                if board.clear_highlight(&id) {
                    let _ = event_tx.send(BoardEvent::HighlightCleared { id });
                }
            }

            KitchenCommand::Shutdown { reply } => {
                debug!("actor_loop: Shutdown command");
                for id in timers.abort_all() {
                    board.clear_highlight(&id);
                }
                let _ = reply.send(board);
                info!("KitchenManager shut down");
                return;
            }
        }
    }

    debug!("actor_loop: all handles dropped, exiting");
}
