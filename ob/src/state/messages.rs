//! Kitchen manager messages
//!
//! Commands and events for the actor pattern.

use tokio::sync::oneshot;

use crate::board::{BoardResult, KitchenBoard, TransferOutcome};
use crate::domain::KitchenStatus;

/// Commands sent to the KitchenManager actor
#[derive(Debug)]
pub enum KitchenCommand {
    Snapshot {
        reply: oneshot::Sender<KitchenBoard>,
    },
    MoveWithin {
        status: KitchenStatus,
        from: usize,
        to: usize,
        reply: oneshot::Sender<BoardResult<()>>,
    },
    Transfer {
        source: KitchenStatus,
        from: usize,
        to: usize,
        dest_list_id: String,
        reply: oneshot::Sender<BoardResult<Option<TransferOutcome>>>,
    },
    Advance {
        id: String,
        reply: oneshot::Sender<Option<TransferOutcome>>,
    },
    /// Sent by a highlight timer when its delay has elapsed
    ClearHighlight {
        id: String,
        generation: u64,
    },
    Shutdown {
        reply: oneshot::Sender<KitchenBoard>,
    },
}

/// Event broadcast when the board changes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardEvent {
    /// An order changed bucket
    OrderMoved {
        id: String,
        from: KitchenStatus,
        to: KitchenStatus,
    },
    /// An order's highlight window ended
    HighlightCleared { id: String },
}
