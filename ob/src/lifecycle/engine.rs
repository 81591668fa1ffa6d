//! Table-driven delivery lifecycle engine

use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::transition::{FailurePolicy, Transition, TransitionKind, TransitionOutcome};
use crate::board::DeliveryBoard;
use crate::cache::RecentDeliveriesCache;
use crate::domain::{DeliveryOrder, DeliveryStatus, UnknownStatusPolicy};
use crate::service::{OrderPayload, OrderService, ServiceError};

/// Where the board contents of the last reload came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionSource {
    /// The combined fetch of all three statuses
    Combined,
    /// The READY-only fetch after the combined one failed
    ReadyFallback,
    /// Both fetches failed; the board is empty
    Empty,
}

/// Runs courier actions against a board and the order service
pub struct DeliveryLifecycle {
    service: Arc<dyn OrderService>,
    cache: RecentDeliveriesCache,
    unknown_status: UnknownStatusPolicy,
}

impl DeliveryLifecycle {
    pub fn new(service: Arc<dyn OrderService>, cache: RecentDeliveriesCache) -> Self {
        Self {
            service,
            cache,
            unknown_status: UnknownStatusPolicy::default(),
        }
    }

    pub fn with_unknown_status(mut self, policy: UnknownStatusPolicy) -> Self {
        self.unknown_status = policy;
        self
    }

    pub fn cache(&self) -> &RecentDeliveriesCache {
        &self.cache
    }

    /// Warm the board from the cache, then reload it from the service
    pub async fn start_session(&mut self, board: &mut DeliveryBoard) -> SessionSource {
        debug!("start_session: called");
        board.set_recent_deliveries(self.cache.load());
        self.reload(board).await
    }

    /// Rebuild the board from the service
    ///
    /// The combined fetch wins; if it fails only READY orders are fetched and
    /// the other buckets are emptied; if that fails too the board is emptied.
    pub async fn reload(&mut self, board: &mut DeliveryBoard) -> SessionSource {
        debug!("reload: called");
        match self.service.find_by_statuses(&DeliveryStatus::ALL).await {
            Ok(records) => {
                let stats = board.reconcile(&records, self.unknown_status);
                if stats.unknown_status > 0 {
                    warn!(
                        unknown = stats.unknown_status,
                        dropped = stats.dropped,
                        "orders with unrecognized status"
                    );
                }
                SessionSource::Combined
            }
            Err(e) => {
                warn!(error = %e, "combined fetch failed, falling back to READY orders");
                match self.service.find_by_status(DeliveryStatus::Ready).await {
                    Ok(records) => {
                        board.apply_ready_fallback(&records);
                        SessionSource::ReadyFallback
                    }
                    Err(e) => {
                        warn!(error = %e, "READY fetch failed, emptying board");
                        board.clear();
                        SessionSource::Empty
                    }
                }
            }
        }
    }

    pub async fn accept(&mut self, board: &mut DeliveryBoard, id: &str) -> TransitionOutcome {
        self.run(board, TransitionKind::Accept, id).await
    }

    pub async fn start(&mut self, board: &mut DeliveryBoard, id: &str) -> TransitionOutcome {
        self.run(board, TransitionKind::Start, id).await
    }

    pub async fn finish(&mut self, board: &mut DeliveryBoard, id: &str) -> TransitionOutcome {
        self.run(board, TransitionKind::Finish, id).await
    }

    pub async fn cancel(&mut self, board: &mut DeliveryBoard, id: &str) -> TransitionOutcome {
        self.run(board, TransitionKind::Cancel, id).await
    }

    /// Run one transition from the table
    pub async fn run(&mut self, board: &mut DeliveryBoard, kind: TransitionKind, id: &str) -> TransitionOutcome {
        debug!(%kind, %id, "run: called");
        let transition = kind.definition();

        let Some(order) = board.bucket(transition.from).get(id).cloned() else {
            debug!(%kind, %id, from = %transition.from, "run: order not in source bucket, skipping");
            return TransitionOutcome::Skipped;
        };

        if transition.requires_ack {
            if let Err(e) = self.service.update_status(id, transition.to).await {
                return Self::refused(board, transition, id, &e);
            }
        }

        let order = match kind {
            TransitionKind::Accept => Self::apply_accept(board, order),
            TransitionKind::Start => Self::apply_start(board, order),
            TransitionKind::Finish => self.apply_finish(board, order),
            TransitionKind::Cancel => Self::apply_cancel(board, order),
        };
        info!(%kind, %id, status = %order.status, "transition applied");
        TransitionOutcome::Applied { order }
    }

    /// Create an order on the service and map the stored record
    pub async fn create(&self, payload: &OrderPayload) -> Result<DeliveryOrder, ServiceError> {
        debug!(status = %payload.status, "create: called");
        let record = self.service.create(payload).await?;
        Ok(record.to_delivery_order().0)
    }

    fn refused(board: &mut DeliveryBoard, transition: &Transition, id: &str, error: &ServiceError) -> TransitionOutcome {
        match transition.on_failure {
            FailurePolicy::Notify => {
                warn!(kind = %transition.kind, %id, error = %error, "order service refused transition");
                TransitionOutcome::Rejected {
                    notice: format!("could not {} order {}: {}", transition.kind, id, error.notice()),
                }
            }
            FailurePolicy::CloseDetails | FailurePolicy::None => {
                warn!(kind = %transition.kind, %id, error = %error, "order service refused transition, closing details");
                board.close_details();
                TransitionOutcome::Dismissed
            }
        }
    }

    fn apply_accept(board: &mut DeliveryBoard, order: DeliveryOrder) -> DeliveryOrder {
        board.bucket_mut(DeliveryStatus::Ready).remove_id(&order.id);
        let moved = order.rebuilt_as(DeliveryStatus::OnTheWay);
        let in_route = board.bucket_mut(DeliveryStatus::OnTheWay);
        in_route.remove_id(&moved.id);
        in_route.prepend(moved.clone());
        board.mark_accepted(&moved.id);
        moved
    }

    /// Set the status field in place; the order keeps its bucket until it is
    /// accepted or the board is reloaded
    fn apply_start(board: &mut DeliveryBoard, order: DeliveryOrder) -> DeliveryOrder {
        let started = match board.bucket_mut(DeliveryStatus::Ready).get_mut(&order.id) {
            Some(current) => {
                current.status = DeliveryStatus::OnTheWay;
                current.clone()
            }
            None => order,
        };
        board.close_details();
        started
    }

    fn apply_finish(&mut self, board: &mut DeliveryBoard, order: DeliveryOrder) -> DeliveryOrder {
        board.bucket_mut(DeliveryStatus::OnTheWay).remove_id(&order.id);
        let delivered = order.rebuilt_as(DeliveryStatus::Delivered);
        let recent = board.bucket_mut(DeliveryStatus::Delivered);
        recent.remove_id(&delivered.id);
        recent.prepend(delivered.clone());
        self.cache.save(board.recent_deliveries().orders());
        board.forget_accepted(&delivered.id);
        board.close_details();
        delivered
    }

    fn apply_cancel(board: &mut DeliveryBoard, order: DeliveryOrder) -> DeliveryOrder {
        board.bucket_mut(DeliveryStatus::OnTheWay).remove_id(&order.id);
        let ready = order.rebuilt_as(DeliveryStatus::Ready);
        let available = board.bucket_mut(DeliveryStatus::Ready);
        available.remove_id(&ready.id);
        available.prepend(ready.clone());
        board.forget_accepted(&ready.id);
        board.close_details();
        ready
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RawOrder;
    use crate::service::client::mock::MockOrderService;
    use serde_json::json;

    fn raw(id: &str, status: &str) -> RawOrder {
        RawOrder(json!({"id": id, "status": status, "address": format!("Rua {}", id)}))
    }

    async fn session(service: Arc<MockOrderService>) -> (DeliveryLifecycle, DeliveryBoard) {
        let mut lifecycle = DeliveryLifecycle::new(service, RecentDeliveriesCache::in_memory());
        let mut board = DeliveryBoard::new();
        lifecycle.start_session(&mut board).await;
        (lifecycle, board)
    }

    #[tokio::test]
    async fn test_accept_moves_to_in_route() {
        let service = Arc::new(MockOrderService::new(vec![raw("1", "READY"), raw("2", "READY")]));
        let (mut lifecycle, mut board) = session(service.clone()).await;

        let outcome = lifecycle.accept(&mut board, "1").await;
        assert!(outcome.is_applied());
        assert_eq!(board.available().ids(), vec!["2"]);
        assert_eq!(board.in_route().ids(), vec!["1"]);
        assert_eq!(board.in_route().orders()[0].status, DeliveryStatus::OnTheWay);
        assert_eq!(board.accepted(), ["1".to_string()]);
        assert_eq!(service.updates(), vec![("1".to_string(), DeliveryStatus::OnTheWay)]);
    }

    #[tokio::test]
    async fn test_accept_failure_leaves_board() {
        let service = Arc::new(MockOrderService::new(vec![raw("1", "READY"), raw("9", "ON_THE_WAY")]).failing_updates());
        let (mut lifecycle, mut board) = session(service).await;
        let before = board.clone();

        let outcome = lifecycle.accept(&mut board, "1").await;
        match outcome {
            TransitionOutcome::Rejected { notice } => assert!(notice.contains("accept")),
            other => panic!("Expected Rejected, got {:?}", other),
        }
        assert_eq!(board, before);
    }

    #[tokio::test]
    async fn test_cancel_returns_to_available_without_service() {
        let service = Arc::new(MockOrderService::new(vec![raw("1", "ON_THE_WAY")]));
        let (mut lifecycle, mut board) = session(service.clone()).await;
        board.view_details("1");

        let outcome = lifecycle.cancel(&mut board, "1").await;
        assert!(outcome.is_applied());
        assert!(board.in_route().is_empty());
        assert_eq!(board.available().orders()[0].status, DeliveryStatus::Ready);
        assert_eq!(board.selected(), None);
        assert!(service.updates().is_empty());
    }

    #[tokio::test]
    async fn test_finish_prepends_and_persists() {
        let service = Arc::new(MockOrderService::new(vec![
            raw("1", "ON_THE_WAY"),
            raw("2", "DELIVERED"),
        ]));
        let (mut lifecycle, mut board) = session(service).await;

        let outcome = lifecycle.finish(&mut board, "1").await;
        assert!(outcome.is_applied());
        assert!(board.in_route().is_empty());
        assert_eq!(board.recent_deliveries().ids(), vec!["1", "2"]);

        let cached: Vec<String> = lifecycle.cache().load().into_iter().map(|o| o.id).collect();
        assert_eq!(cached, vec!["1", "2"]);
    }

    #[tokio::test]
    async fn test_finish_failure_closes_details_only() {
        let service = Arc::new(MockOrderService::new(vec![raw("1", "ON_THE_WAY")]).failing_updates());
        let (mut lifecycle, mut board) = session(service).await;
        board.view_details("1");

        let outcome = lifecycle.finish(&mut board, "1").await;
        assert_eq!(outcome, TransitionOutcome::Dismissed);
        assert_eq!(board.in_route().ids(), vec!["1"]);
        assert!(board.recent_deliveries().is_empty());
        assert_eq!(board.selected(), None);
        assert!(lifecycle.cache().load().is_empty());
    }

    #[tokio::test]
    async fn test_start_marks_status_in_place() {
        let service = Arc::new(MockOrderService::new(vec![raw("1", "READY"), raw("2", "PRONTO")]));
        let (mut lifecycle, mut board) = session(service.clone()).await;
        board.view_details("1");

        let outcome = lifecycle.start(&mut board, "1").await;
        match outcome {
            TransitionOutcome::Applied { order } => assert_eq!(order.status, DeliveryStatus::OnTheWay),
            other => panic!("Expected Applied, got {:?}", other),
        }
        assert_eq!(board.available().ids(), vec!["1", "2"]);
        assert_eq!(board.available().get("1").unwrap().status, DeliveryStatus::OnTheWay);
        assert_eq!(board.available().get("2").unwrap().status, DeliveryStatus::Ready);
        assert!(board.in_route().is_empty());
        assert_eq!(board.selected(), None);
        assert!(service.updates().is_empty());
    }

    #[tokio::test]
    async fn test_started_order_can_still_be_accepted() {
        let service = Arc::new(MockOrderService::new(vec![raw("1", "READY")]));
        let (mut lifecycle, mut board) = session(service).await;

        assert!(lifecycle.start(&mut board, "1").await.is_applied());
        assert!(lifecycle.accept(&mut board, "1").await.is_applied());
        assert!(board.available().is_empty());
        assert_eq!(board.in_route().ids(), vec!["1"]);
    }

    #[tokio::test]
    async fn test_start_on_in_route_order_is_skipped() {
        let service = Arc::new(MockOrderService::new(vec![raw("1", "EN_ROUTE")]));
        let (mut lifecycle, mut board) = session(service).await;
        let before = board.clone();

        assert_eq!(lifecycle.start(&mut board, "1").await, TransitionOutcome::Skipped);
        assert_eq!(board, before);
    }

    #[tokio::test]
    async fn test_wrong_bucket_is_skipped() {
        let service = Arc::new(MockOrderService::new(vec![raw("1", "READY")]));
        let (mut lifecycle, mut board) = session(service.clone()).await;

        assert_eq!(lifecycle.finish(&mut board, "1").await, TransitionOutcome::Skipped);
        assert_eq!(lifecycle.cancel(&mut board, "1").await, TransitionOutcome::Skipped);
        assert_eq!(lifecycle.accept(&mut board, "missing").await, TransitionOutcome::Skipped);
        assert!(service.updates().is_empty());
        assert_eq!(board.available().ids(), vec!["1"]);
    }

    #[tokio::test]
    async fn test_session_falls_back_to_ready() {
        let service = Arc::new(
            MockOrderService::new(vec![raw("1", "READY"), raw("2", "ON_THE_WAY")]).failing_combined_fetch(),
        );
        let mut lifecycle = DeliveryLifecycle::new(service.clone(), RecentDeliveriesCache::in_memory());
        let mut board = DeliveryBoard::new();

        assert_eq!(lifecycle.start_session(&mut board).await, SessionSource::ReadyFallback);
        assert_eq!(board.available().ids(), vec!["1"]);
        assert!(board.in_route().is_empty());
        assert!(board.recent_deliveries().is_empty());
        assert_eq!(service.fetches().len(), 2);
    }

    #[tokio::test]
    async fn test_session_empty_when_all_fetches_fail() {
        let service = Arc::new(
            MockOrderService::new(vec![raw("1", "READY")])
                .failing_combined_fetch()
                .failing_single_fetch(),
        );
        let mut cache = RecentDeliveriesCache::in_memory();
        cache.save(&[DeliveryOrder::new("old", DeliveryStatus::Delivered)]);
        let mut lifecycle = DeliveryLifecycle::new(service, cache);
        let mut board = DeliveryBoard::new();

        assert_eq!(lifecycle.start_session(&mut board).await, SessionSource::Empty);
        assert!(board.ids().is_empty());
    }

    #[tokio::test]
    async fn test_reload_supersedes_cache() {
        let service = Arc::new(MockOrderService::new(vec![raw("5", "DELIVERED")]));
        let mut cache = RecentDeliveriesCache::in_memory();
        cache.save(&[DeliveryOrder::new("old", DeliveryStatus::Delivered)]);
        let mut lifecycle = DeliveryLifecycle::new(service, cache);
        let mut board = DeliveryBoard::new();

        assert_eq!(lifecycle.start_session(&mut board).await, SessionSource::Combined);
        assert_eq!(board.recent_deliveries().ids(), vec!["5"]);
    }

    #[tokio::test]
    async fn test_unknown_status_drop_policy() {
        let service = Arc::new(MockOrderService::new(vec![raw("1", "LOST_IN_SPACE"), raw("2", "READY")]));
        let mut lifecycle = DeliveryLifecycle::new(service, RecentDeliveriesCache::in_memory())
            .with_unknown_status(UnknownStatusPolicy::Drop);
        let mut board = DeliveryBoard::new();

        lifecycle.start_session(&mut board).await;
        assert_eq!(board.ids(), vec!["2"]);
    }

    #[tokio::test]
    async fn test_create_maps_record() {
        let service = Arc::new(MockOrderService::new(vec![]));
        let lifecycle = DeliveryLifecycle::new(service, RecentDeliveriesCache::in_memory());
        let payload = OrderPayload::new(chrono::Utc::now(), "READY").with_item(3, 2, 12.5);

        let order = lifecycle.create(&payload).await.unwrap();
        assert_eq!(order.id, "1");
        assert_eq!(order.status, DeliveryStatus::Ready);
        assert_eq!(order.items.len(), 1);
    }
}
