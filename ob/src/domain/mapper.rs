//! Status mapper
//!
//! Normalizes the backend's open-ended status spellings into a closed token,
//! then resolves the token to a canonical `DeliveryStatus`. `canonicalize` is
//! total: missing and unrecognized input both resolve to `ON_THE_WAY`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::status::DeliveryStatus;

/// Result of normalizing a raw backend status string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusToken {
    Ready,
    OnTheWay,
    Delivered,
    /// No status at all (null, absent or empty)
    Missing,
    /// A non-empty status outside the synonym table (trimmed, upper-cased)
    Unknown(String),
}

impl StatusToken {
    /// Resolve to a canonical status, applying the `ON_THE_WAY` fallback
    pub fn resolve(&self) -> DeliveryStatus {
        match self {
            Self::Ready => DeliveryStatus::Ready,
            Self::OnTheWay => DeliveryStatus::OnTheWay,
            Self::Delivered => DeliveryStatus::Delivered,
            Self::Missing => DeliveryStatus::OnTheWay,
            Self::Unknown(raw) => {
                warn!(status = %raw, "unrecognized backend status, treating as ON_THE_WAY");
                DeliveryStatus::OnTheWay
            }
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }
}

impl From<DeliveryStatus> for StatusToken {
    fn from(status: DeliveryStatus) -> Self {
        match status {
            DeliveryStatus::Ready => Self::Ready,
            DeliveryStatus::OnTheWay => Self::OnTheWay,
            DeliveryStatus::Delivered => Self::Delivered,
        }
    }
}

/// What reconciliation does with records whose status is `Unknown`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnknownStatusPolicy {
    /// Place them in the in-route bucket (the documented fallback)
    #[default]
    InRoute,
    /// Leave them out of every bucket
    Drop,
}

/// Normalize a raw status string
pub fn normalize(raw: Option<&str>) -> StatusToken {
    let Some(raw) = raw else {
        return StatusToken::Missing;
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return StatusToken::Missing;
    }

    let key = trimmed.to_uppercase();
    if let Some(status) = DeliveryStatus::from_canonical_name(&key) {
        return status.into();
    }

    match key.as_str() {
        "READY" | "PRONTO" => StatusToken::Ready,
        "ON_THE_WAY" | "OUT_FOR_DELIVERY" | "EN_ROUTE" | "DELIVERY" => StatusToken::OnTheWay,
        "DELIVERED" | "ENTREGUE" | "FINISHED" => StatusToken::Delivered,
        _ => StatusToken::Unknown(key),
    }
}

/// Normalize a status taken straight from a JSON record
///
/// `null` and absent values are `Missing`; numbers (zero included) are
/// stringified and matched like any other input.
pub fn normalize_value(raw: Option<&Value>) -> StatusToken {
    match raw {
        None | Some(Value::Null) => StatusToken::Missing,
        Some(Value::String(s)) => normalize(Some(s)),
        Some(Value::Bool(false)) => StatusToken::Missing,
        Some(other) => normalize(Some(&other.to_string())),
    }
}

/// Map a raw status string to its canonical delivery status
pub fn canonicalize(raw: Option<&str>) -> DeliveryStatus {
    debug!(?raw, "canonicalize: called");
    normalize(raw).resolve()
}

/// Map a raw JSON status value to its canonical delivery status
pub fn canonicalize_value(raw: Option<&Value>) -> DeliveryStatus {
    normalize_value(raw).resolve()
}
