//! Order-service client
//!
//! The board consumes the backend through the `OrderService` trait.
//! `HttpOrderService` is the reqwest-backed implementation; tests use the
//! scripted mock in `client::mock`.

pub mod client;
mod error;
mod http;
mod payload;

pub use client::OrderService;
pub use error::ServiceError;
pub use http::HttpOrderService;
pub use payload::{ClientRef, DishRef, EntityId, OrderItemPayload, OrderPayload};
