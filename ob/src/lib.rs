//! Orderboard - restaurant order lifecycle and board reconciliation
//!
//! Two boards over one order service:
//!
//! - The **kitchen board** is a four-column kanban (A PREPARAR, EM PREPARO,
//!   PRONTO, ENTREGUE). Orders are dragged within and across columns; a move
//!   sets the status from the destination column and raises a short
//!   highlight that clears itself.
//! - The **delivery board** is the courier's view: available, in route and
//!   recent deliveries. It is rebuilt from the order service and changed by
//!   the accept/start/finish/cancel lifecycle, where accept and finish only
//!   take effect once the service acknowledges them.
//!
//! # Modules
//!
//! - [`domain`] - Orders, status vocabularies and the status mapper
//! - [`board`] - Bucketed board state and display helpers
//! - [`lifecycle`] - Delivery state machine, table driven
//! - [`state`] - KitchenManager actor with cancellable highlight timers
//! - [`service`] - OrderService trait and HTTP client
//! - [`cache`] - Recent-deliveries warm-start cache
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod board;
pub mod cache;
pub mod cli;
pub mod config;
pub mod domain;
pub mod lifecycle;
pub mod service;
pub mod state;

pub use board::{BoardError, DeliveryBoard, KitchenBoard};
pub use cache::RecentDeliveriesCache;
pub use config::Config;
pub use domain::{DeliveryOrder, DeliveryStatus, KitchenOrder, KitchenStatus, Order, RawOrder};
pub use lifecycle::{DeliveryLifecycle, TransitionKind, TransitionOutcome};
pub use service::{HttpOrderService, OrderService, ServiceError};
pub use state::KitchenManager;
