//! Board state
//!
//! Boards are owned values passed explicitly to the operations that mutate
//! them. A board is a fixed set of buckets, one per status; an order id
//! appears in at most one bucket and moves by remove-then-insert.

mod bucket;
mod delivery;
mod display;
mod error;
mod kitchen;

pub use bucket::Bucket;
pub use delivery::{DeliveryBoard, ReconcileStats};
pub use display::{
    DELIVERY_FEE, DeliveryDetails, address_without_complement, delivery_total, filter_orders, format_price, time_elapsed,
};
pub use error::{BoardError, BoardResult};
pub use kitchen::{KitchenBoard, TransferOutcome};
