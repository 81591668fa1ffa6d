//! Transition table and outcomes

use serde::Serialize;
use std::fmt;

use crate::domain::{DeliveryOrder, DeliveryStatus};

/// The four courier actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionKind {
    Accept,
    Start,
    Finish,
    Cancel,
}

impl TransitionKind {
    pub const ALL: [TransitionKind; 4] = [Self::Accept, Self::Start, Self::Finish, Self::Cancel];

    /// The table row for this action
    pub fn definition(self) -> &'static Transition {
        // TRANSITIONS is ordered like ALL
        &TRANSITIONS[self as usize]
    }
}

impl fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Accept => "accept",
            Self::Start => "start",
            Self::Finish => "finish",
            Self::Cancel => "cancel",
        };
        write!(f, "{}", s)
    }
}

/// What a refused backend call means for the operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Show a notice; the board is untouched
    Notify,
    /// Close the detail view without a notice; the board is untouched
    CloseDetails,
    /// No backend call, so nothing can fail
    None,
}

/// One row of the delivery state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub kind: TransitionKind,
    /// Bucket the order must be in
    pub from: DeliveryStatus,
    /// Status the order ends with
    pub to: DeliveryStatus,
    /// Mutate only after the order service acknowledges
    pub requires_ack: bool,
    pub on_failure: FailurePolicy,
}

pub static TRANSITIONS: [Transition; 4] = [
    Transition {
        kind: TransitionKind::Accept,
        from: DeliveryStatus::Ready,
        to: DeliveryStatus::OnTheWay,
        requires_ack: true,
        on_failure: FailurePolicy::Notify,
    },
    Transition {
        kind: TransitionKind::Start,
        from: DeliveryStatus::Ready,
        to: DeliveryStatus::OnTheWay,
        requires_ack: false,
        on_failure: FailurePolicy::None,
    },
    Transition {
        kind: TransitionKind::Finish,
        from: DeliveryStatus::OnTheWay,
        to: DeliveryStatus::Delivered,
        requires_ack: true,
        on_failure: FailurePolicy::CloseDetails,
    },
    Transition {
        kind: TransitionKind::Cancel,
        from: DeliveryStatus::OnTheWay,
        to: DeliveryStatus::Ready,
        requires_ack: false,
        on_failure: FailurePolicy::None,
    },
];

/// Result of running one transition
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum TransitionOutcome {
    /// The board changed; carries the order as it now stands
    Applied { order: DeliveryOrder },
    /// The service refused; the operator must be told
    Rejected { notice: String },
    /// The service refused; the detail view was closed quietly
    Dismissed,
    /// The order is not in the source bucket; nothing was called or changed
    Skipped,
}

impl TransitionOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}
