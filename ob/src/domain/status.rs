//! Canonical status enumerations
//!
//! The kitchen board and the delivery flow each have their own closed set of
//! statuses. Both serialize to the spelling the backend and the cache use.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kitchen preparation board status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KitchenStatus {
    #[serde(rename = "A PREPARAR")]
    ToPrepare,
    #[serde(rename = "EM PREPARO")]
    InProgress,
    #[serde(rename = "PRONTO")]
    Ready,
    #[serde(rename = "ENTREGUE")]
    Delivered,
}

impl KitchenStatus {
    /// Board columns in their fixed forward order
    pub const ALL: [KitchenStatus; 4] = [Self::ToPrepare, Self::InProgress, Self::Ready, Self::Delivered];

    /// Human-facing label (also the serialized form)
    pub fn label(self) -> &'static str {
        match self {
            Self::ToPrepare => "A PREPARAR",
            Self::InProgress => "EM PREPARO",
            Self::Ready => "PRONTO",
            Self::Delivered => "ENTREGUE",
        }
    }

    /// Id of the drop list that holds orders of this status
    pub fn list_id(self) -> &'static str {
        match self {
            Self::ToPrepare => "toPrepareList",
            Self::InProgress => "inProgressList",
            Self::Ready => "readyList",
            Self::Delivered => "deliveredList",
        }
    }

    /// Resolve a drop list id to the status it stands for
    ///
    /// This is the fixed four-entry table used by drag transfers; any other
    /// id resolves to `None`.
    pub fn from_list_id(id: &str) -> Option<Self> {
        match id {
            "toPrepareList" => Some(Self::ToPrepare),
            "inProgressList" => Some(Self::InProgress),
            "readyList" => Some(Self::Ready),
            "deliveredList" => Some(Self::Delivered),
            _ => None,
        }
    }

    /// The following status in the forward sequence, `None` at the end
    pub fn next(self) -> Option<Self> {
        match self {
            Self::ToPrepare => Some(Self::InProgress),
            Self::InProgress => Some(Self::Ready),
            Self::Ready => Some(Self::Delivered),
            Self::Delivered => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        self.next().is_none()
    }
}

impl fmt::Display for KitchenStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Delivery (motoboy) dispatch status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryStatus {
    /// Waiting for a courier
    Ready,
    /// Accepted by a courier and in transit
    OnTheWay,
    /// Handed to the customer
    Delivered,
}

impl DeliveryStatus {
    pub const ALL: [DeliveryStatus; 3] = [Self::Ready, Self::OnTheWay, Self::Delivered];

    /// The canonical name sent to and received from the order service
    pub fn as_wire(self) -> &'static str {
        match self {
            Self::Ready => "READY",
            Self::OnTheWay => "ON_THE_WAY",
            Self::Delivered => "DELIVERED",
        }
    }

    /// Exact canonical-name lookup (already trimmed and upper-cased)
    pub fn from_canonical_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_wire() == name)
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_wire())
    }
}
