//! Request body for creating an order

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Backend entity id: numeric or textual
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    Number(i64),
    Text(String),
}

impl From<i64> for EntityId {
    fn from(id: i64) -> Self {
        Self::Number(id)
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        Self::Text(id.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DishRef {
    pub id: EntityId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientRef {
    pub id: EntityId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItemPayload {
    pub quantity: u32,
    pub price: f64,
    pub dish: DishRef,
}

/// Order creation payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderPayload {
    /// Creation time, sent as ISO-8601
    pub moment: DateTime<Utc>,
    /// Initial status, e.g. `PENDING`
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<ClientRef>,
    pub items: Vec<OrderItemPayload>,
}

impl OrderPayload {
    pub fn new(moment: DateTime<Utc>, status: impl Into<String>) -> Self {
        Self {
            moment,
            status: status.into(),
            client: None,
            items: Vec::new(),
        }
    }

    pub fn with_client(mut self, id: impl Into<EntityId>) -> Self {
        self.client = Some(ClientRef { id: id.into() });
        self
    }

    pub fn with_item(mut self, dish: impl Into<EntityId>, quantity: u32, price: f64) -> Self {
        self.items.push(OrderItemPayload {
            quantity,
            price,
            dish: DishRef { id: dish.into() },
        });
        self
    }
}
