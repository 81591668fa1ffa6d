//! OrderService trait definition

use async_trait::async_trait;

use super::{OrderPayload, ServiceError};
use crate::domain::{DeliveryStatus, RawOrder};

/// The backend the boards reconcile against
///
/// Every call is attempted exactly once; callers decide what a failure
/// means for the board.
#[async_trait]
pub trait OrderService: Send + Sync {
    /// Set an order's status on the backend
    async fn update_status(&self, id: &str, status: DeliveryStatus) -> Result<(), ServiceError>;

    /// Fetch every order in any of `statuses` (one combined request)
    async fn find_by_statuses(&self, statuses: &[DeliveryStatus]) -> Result<Vec<RawOrder>, ServiceError>;

    /// Fetch the orders in a single status
    async fn find_by_status(&self, status: DeliveryStatus) -> Result<Vec<RawOrder>, ServiceError>;

    /// Create an order, returning the record the backend stored
    async fn create(&self, payload: &OrderPayload) -> Result<RawOrder, ServiceError>;
}
