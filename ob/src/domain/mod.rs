//! Domain types for the order board
//!
//! Orders live in one of two parallel status vocabularies: the kitchen board
//! (`KitchenStatus`) and the delivery dispatch flow (`DeliveryStatus`).
//! Backend records arrive as loosely-shaped JSON (`RawOrder`) and are mapped
//! into typed `Order`s through the status mapper.

mod mapper;
mod order;
mod status;

pub use mapper::{StatusToken, UnknownStatusPolicy, canonicalize, canonicalize_value, normalize, normalize_value};
pub use order::{DeliveryOrder, KitchenOrder, Order, OrderItem, RawOrder, derive_display_number};
pub use status::{DeliveryStatus, KitchenStatus};
