//! Board display helpers: search filter, elapsed-time labels, addresses,
//! prices and the courier's delivery details

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

use crate::domain::{DeliveryOrder, DeliveryStatus, Order, OrderItem};

/// Flat delivery fee added to every delivery total, in reais
pub const DELIVERY_FEE: f64 = 10.0;

/// Keep the orders matching a free-text search
///
/// The query is trimmed and compared case-insensitively against the display
/// number, the id, the table, and every item name. An empty query keeps all.
pub fn filter_orders<'a, S>(orders: &'a [Order<S>], query: &str) -> Vec<&'a Order<S>> {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return orders.iter().collect();
    }
    orders
        .iter()
        .filter(|o| {
            o.display_number.to_lowercase().contains(&q)
                || o.id.to_lowercase().contains(&q)
                || o.table.as_deref().is_some_and(|t| t.to_lowercase().contains(&q))
                || o.items.iter().any(|i| i.name.to_lowercase().contains(&q))
        })
        .collect()
}

/// Relative age of an order, as shown on the kitchen cards
pub fn time_elapsed(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - timestamp).num_seconds();
    if seconds < 60 {
        "há alguns segundos".to_string()
    } else if seconds < 3600 {
        let minutes = seconds / 60;
        format!("há {} minuto{}", minutes, if minutes > 1 { "s" } else { "" })
    } else {
        let hours = seconds / 3600;
        format!("há {} hora{}", hours, if hours > 1 { "s" } else { "" })
    }
}

static COMPLEMENT: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\b[Cc]omplemento\b[:\-\s]*[^.\n]*").ok());
static SPACES: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\s{2,}").ok());
static EDGES: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"^[,\-\s]+|[,\-\s]+$").ok());

fn replace_all(re: &LazyLock<Option<Regex>>, text: &str, with: &str) -> String {
    match re.as_ref() {
        Some(re) => re.replace_all(text, with).into_owned(),
        None => text.to_string(),
    }
}

/// Strip "Complemento ..." fragments from a delivery address
pub fn address_without_complement(raw: &str) -> Option<String> {
    if raw.is_empty() {
        return None;
    }
    let cleaned = replace_all(&COMPLEMENT, raw, "");
    let cleaned = replace_all(&SPACES, cleaned.trim(), " ");
    let cleaned = replace_all(&EDGES, &cleaned, "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() { None } else { Some(cleaned.to_string()) }
}

/// Two decimals with a decimal comma: `4.5` becomes `"4,50"`
pub fn format_price(value: f64) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    format!("{:.2}", value).replace('.', ",")
}

/// Items total plus the delivery fee
pub fn delivery_total(order: &DeliveryOrder) -> f64 {
    order.items_total() + DELIVERY_FEE
}

/// What the courier sees when opening an order
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryDetails {
    pub id: String,
    pub display_number: String,
    pub status: DeliveryStatus,
    pub items: Vec<OrderItem>,
    /// Customer name, or `Cliente <number>` when none was sent
    pub client: String,
    /// Delivery address with any complement stripped
    pub address: Option<String>,
    pub total: f64,
}

impl DeliveryDetails {
    pub fn from_order(order: &DeliveryOrder) -> Self {
        let client = order
            .client_name
            .clone()
            .unwrap_or_else(|| format!("Cliente {}", order.display_number));
        let raw_address = order
            .client_address
            .as_deref()
            .filter(|a| !a.is_empty())
            .unwrap_or(&order.address);
        Self {
            id: order.id.clone(),
            display_number: order.display_number.clone(),
            status: order.status,
            items: order.items.clone(),
            client,
            address: address_without_complement(raw_address),
            total: delivery_total(order),
        }
    }
}
