//! Delivery dispatch board
//!
//! Three buckets: available (READY), in route (ON_THE_WAY) and recent
//! deliveries (DELIVERED). Reconciliation rebuilds all three from a backend
//! fetch; the lifecycle transitions in `lifecycle` move single orders.

use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, info, warn};

use crate::domain::{DeliveryOrder, DeliveryStatus, RawOrder, StatusToken, UnknownStatusPolicy};

use super::bucket::Bucket;
use super::display::DeliveryDetails;

/// Counters from one reconciliation pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileStats {
    /// Records received from the service
    pub fetched: usize,
    /// Records discarded because an earlier record had the same id
    pub duplicates: usize,
    /// Records with an unrecognized status
    pub unknown_status: usize,
    /// Unknown-status records left out of every bucket
    pub dropped: usize,
}

/// The courier's board
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DeliveryBoard {
    available: Bucket<DeliveryStatus>,
    in_route: Bucket<DeliveryStatus>,
    recent: Bucket<DeliveryStatus>,
    /// Ids accepted during this session
    accepted: Vec<String>,
    /// Order currently open in the detail view
    selected: Option<String>,
}

impl DeliveryBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bucket(&self, status: DeliveryStatus) -> &Bucket<DeliveryStatus> {
        match status {
            DeliveryStatus::Ready => &self.available,
            DeliveryStatus::OnTheWay => &self.in_route,
            DeliveryStatus::Delivered => &self.recent,
        }
    }

    pub(crate) fn bucket_mut(&mut self, status: DeliveryStatus) -> &mut Bucket<DeliveryStatus> {
        match status {
            DeliveryStatus::Ready => &mut self.available,
            DeliveryStatus::OnTheWay => &mut self.in_route,
            DeliveryStatus::Delivered => &mut self.recent,
        }
    }

    pub fn available(&self) -> &Bucket<DeliveryStatus> {
        &self.available
    }

    pub fn in_route(&self) -> &Bucket<DeliveryStatus> {
        &self.in_route
    }

    pub fn recent_deliveries(&self) -> &Bucket<DeliveryStatus> {
        &self.recent
    }

    pub fn accepted(&self) -> &[String] {
        &self.accepted
    }

    pub(crate) fn mark_accepted(&mut self, id: &str) {
        if !self.accepted.iter().any(|a| a == id) {
            self.accepted.push(id.to_string());
        }
    }

    pub(crate) fn forget_accepted(&mut self, id: &str) {
        self.accepted.retain(|a| a != id);
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Open the detail view for an order on the board
    pub fn view_details(&mut self, id: &str) -> bool {
        debug!(%id, "view_details: called");
        if self.find(id).is_some() {
            self.selected = Some(id.to_string());
            true
        } else {
            false
        }
    }

    /// Details of the order open in the detail view
    pub fn selected_details(&self) -> Option<DeliveryDetails> {
        let id = self.selected.as_deref()?;
        self.find(id).map(|(_, order)| DeliveryDetails::from_order(order))
    }

    pub fn close_details(&mut self) {
        self.selected = None;
    }

    /// Locate an order and the bucket holding it
    pub fn find(&self, id: &str) -> Option<(DeliveryStatus, &DeliveryOrder)> {
        DeliveryStatus::ALL
            .into_iter()
            .find_map(|status| self.bucket(status).get(id).map(|o| (status, o)))
    }

    /// Every id on the board, bucket by bucket
    pub fn ids(&self) -> Vec<String> {
        DeliveryStatus::ALL
            .into_iter()
            .flat_map(|status| self.bucket(status).ids())
            .collect()
    }

    /// Replace the recent-deliveries bucket (warm start from the cache)
    pub fn set_recent_deliveries(&mut self, orders: Vec<DeliveryOrder>) {
        debug!(count = orders.len(), "set_recent_deliveries: called");
        let mut seen = HashSet::new();
        let orders = orders
            .into_iter()
            .filter(|o| seen.insert(o.id.clone()))
            .map(|o| o.rebuilt_as(DeliveryStatus::Delivered))
            .collect();
        self.recent = Bucket::from_orders(orders);
    }

    /// Rebuild all three buckets from a combined fetch
    ///
    /// Each record is mapped once; the first record for an id wins and later
    /// ones are discarded; each survivor lands in exactly one bucket.
    pub fn reconcile(&mut self, raw: &[RawOrder], policy: UnknownStatusPolicy) -> ReconcileStats {
        debug!(count = raw.len(), ?policy, "reconcile: called");
        let mut stats = ReconcileStats {
            fetched: raw.len(),
            ..Default::default()
        };
        let mut seen = HashSet::new();
        let mut available = Bucket::new();
        let mut in_route = Bucket::new();
        let mut recent = Bucket::new();

        for record in raw {
            let (order, token) = record.to_delivery_order();
            if !seen.insert(order.id.clone()) {
                debug!(id = %order.id, "reconcile: duplicate id, keeping first");
                stats.duplicates += 1;
                continue;
            }
            if let StatusToken::Unknown(ref status) = token {
                stats.unknown_status += 1;
                if policy == UnknownStatusPolicy::Drop {
                    warn!(id = %order.id, %status, "reconcile: dropping order with unknown status");
                    stats.dropped += 1;
                    continue;
                }
            }
            match order.status {
                DeliveryStatus::Ready => available.push(order),
                DeliveryStatus::OnTheWay => in_route.push(order),
                DeliveryStatus::Delivered => recent.push(order),
            }
        }

        self.available = available;
        self.in_route = in_route;
        self.recent = recent;
        self.retain_session_state();

        info!(
            available = self.available.len(),
            in_route = self.in_route.len(),
            delivered = self.recent.len(),
            duplicates = stats.duplicates,
            "board reconciled"
        );
        stats
    }

    /// Rebuild from the READY-only fallback fetch
    ///
    /// Everything fetched goes to available as READY; the other two buckets
    /// are emptied rather than kept stale.
    pub fn apply_ready_fallback(&mut self, raw: &[RawOrder]) {
        debug!(count = raw.len(), "apply_ready_fallback: called");
        let mut seen = HashSet::new();
        let orders = raw
            .iter()
            .map(|r| r.to_delivery_order().0)
            .filter(|o| seen.insert(o.id.clone()))
            .map(|o| o.rebuilt_as(DeliveryStatus::Ready))
            .collect();
        self.available = Bucket::from_orders(orders);
        self.in_route.clear();
        self.recent.clear();
        self.retain_session_state();
        warn!(available = self.available.len(), "board rebuilt from READY fallback");
    }

    /// Empty every bucket
    pub fn clear(&mut self) {
        debug!("clear: called");
        self.available.clear();
        self.in_route.clear();
        self.recent.clear();
        self.retain_session_state();
    }

    fn retain_session_state(&mut self) {
        let in_route = &self.in_route;
        self.accepted.retain(|id| in_route.contains(id));
        if let Some(id) = self.selected.clone() {
            if self.find(&id).is_none() {
                self.selected = None;
            }
        }
    }
}
