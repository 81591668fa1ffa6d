//! Order domain type
//!
//! One `Order` shape serves both boards; the status parameter selects the
//! vocabulary. `RawOrder` wraps whatever JSON the order service returned and
//! maps it tolerantly: missing fields get defaults, never errors.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::mapper::{StatusToken, normalize_value};
use super::status::{DeliveryStatus, KitchenStatus};

/// A line item on an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub name: String,
    /// Always at least 1
    pub quantity: u32,
    /// Unit price, never negative
    pub price: f64,
}

impl OrderItem {
    pub fn new(name: impl Into<String>, quantity: u32, price: f64) -> Self {
        Self {
            name: name.into(),
            quantity: quantity.max(1),
            price: if price.is_finite() { price.max(0.0) } else { 0.0 },
        }
    }
}

/// An order on one of the boards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order<S> {
    /// Opaque identifier, unique within the system
    pub id: String,

    /// Human-facing label
    pub display_number: String,

    pub status: S,

    #[serde(default)]
    pub items: Vec<OrderItem>,

    /// Creation or fetch time as the backend spelled it
    #[serde(default)]
    pub date: String,

    /// Parsed creation time, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,

    /// Table label (kitchen orders served in the restaurant)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,

    #[serde(default)]
    pub address: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_address: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restaurant_address: Option<String>,

    /// Customer name, when the backend sent one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,

    /// Transient highlight after a status change; never persisted
    #[serde(skip)]
    pub just_updated: bool,
}

pub type KitchenOrder = Order<KitchenStatus>;
pub type DeliveryOrder = Order<DeliveryStatus>;

/// Label used when the backend does not provide one
pub fn derive_display_number(id: &str) -> String {
    format!("Pedido Nº {}", id)
}

impl<S> Order<S> {
    /// Create an order with a derived display number
    pub fn new(id: impl Into<String>, status: S) -> Self {
        let id = id.into();
        Self {
            display_number: derive_display_number(&id),
            id,
            status,
            items: Vec::new(),
            date: String::new(),
            timestamp: None,
            table: None,
            address: String::new(),
            client_address: None,
            restaurant_address: None,
            client_name: None,
            just_updated: false,
        }
    }

    pub fn with_display_number(mut self, display_number: impl Into<String>) -> Self {
        self.display_number = display_number.into();
        self
    }

    pub fn with_item(mut self, item: OrderItem) -> Self {
        self.items.push(item);
        self
    }

    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    pub fn with_client_name(mut self, name: impl Into<String>) -> Self {
        self.client_name = Some(name.into());
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.date = timestamp.to_rfc3339();
        self.timestamp = Some(timestamp);
        self
    }

    /// Rebuild this order as a fresh record carrying `status`
    ///
    /// Identity and metadata are kept, an empty display number is derived,
    /// and the highlight flag starts cleared.
    pub fn rebuilt_as<T>(&self, status: T) -> Order<T> {
        debug!(id = %self.id, "Order::rebuilt_as: called");
        let display_number = if self.display_number.is_empty() {
            derive_display_number(&self.id)
        } else {
            self.display_number.clone()
        };
        let address = if self.address.is_empty() {
            self.client_address.clone().unwrap_or_default()
        } else {
            self.address.clone()
        };
        Order {
            id: self.id.clone(),
            display_number,
            status,
            items: self.items.clone(),
            date: self.date.clone(),
            timestamp: self.timestamp,
            table: self.table.clone(),
            address,
            client_address: self.client_address.clone(),
            restaurant_address: self.restaurant_address.clone(),
            client_name: self.client_name.clone(),
            just_updated: false,
        }
    }

    /// Sum of price times quantity over all items
    pub fn items_total(&self) -> f64 {
        self.items.iter().map(|it| it.price * it.quantity as f64).sum()
    }
}

/// An order record exactly as the order service returned it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawOrder(pub Value);

impl From<Value> for RawOrder {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// First key whose value is present and not null
fn first<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().filter_map(|k| value.get(*k)).find(|v| !v.is_null())
}

fn first_at<'a>(value: &'a Value, pointers: &[&str]) -> Option<&'a Value> {
    pointers.iter().filter_map(|p| value.pointer(p)).find(|v| !v.is_null())
}

fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn map_item(raw: &Value) -> OrderItem {
    let name = first(raw, &["name", "dishName"])
        .or_else(|| raw.get("dish").and_then(|d| first(d, &["name"])))
        .map(as_text)
        .unwrap_or_else(|| "Item".to_string());
    let quantity = first(raw, &["quantity", "qty"])
        .and_then(as_number)
        .map(|q| if q >= 1.0 { q.min(u32::MAX as f64) as u32 } else { 1 })
        .unwrap_or(1);
    let price = first(raw, &["price", "unitPrice"]).and_then(as_number).unwrap_or(0.0);
    OrderItem::new(name, quantity, price)
}

impl RawOrder {
    /// Identifier as the board will key it (`id`, then `orderId`, else `"0"`)
    pub fn id(&self) -> String {
        first(&self.0, &["id", "orderId"])
            .map(as_text)
            .unwrap_or_else(|| "0".to_string())
    }

    /// Normalized status token of this record
    pub fn status_token(&self) -> StatusToken {
        normalize_value(self.0.get("status"))
    }

    /// Map into a typed delivery order, resolving the status
    pub fn to_delivery_order(&self) -> (DeliveryOrder, StatusToken) {
        let raw = &self.0;
        let id = self.id();
        debug!(%id, "RawOrder::to_delivery_order: called");
        let token = self.status_token();

        let items = raw
            .get("items")
            .and_then(Value::as_array)
            .map(|items| items.iter().map(map_item).collect())
            .unwrap_or_default();
        let date = first(raw, &["date", "createdAt"]).map(as_text).unwrap_or_default();
        let timestamp = DateTime::parse_from_rfc3339(&date).ok().map(|t| t.with_timezone(&Utc));

        let order = Order {
            display_number: first(raw, &["displayNumber"])
                .map(as_text)
                .unwrap_or_else(|| derive_display_number(&id)),
            id,
            status: token.resolve(),
            items,
            date,
            timestamp,
            table: first(raw, &["table"]).map(as_text),
            address: first(raw, &["address", "clientAddress", "addressSnapshot"])
                .map(as_text)
                .unwrap_or_default(),
            client_address: first(raw, &["clientAddress"]).map(as_text),
            restaurant_address: first(raw, &["restaurantAddress"]).map(as_text),
            client_name: first_at(raw, &["/client/name", "/clientName", "/cliente/nome"]).map(as_text),
            just_updated: false,
        };
        (order, token)
    }
}
