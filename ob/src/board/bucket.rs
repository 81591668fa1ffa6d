//! Bucket - an ordered collection of orders sharing one status

use serde::{Deserialize, Serialize};
use std::fmt::Display;

use crate::domain::Order;

use super::error::{BoardError, BoardResult};

/// Named ordered collection of orders
///
/// Order within a bucket is insertion/drag order; nothing here sorts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bucket<S> {
    orders: Vec<Order<S>>,
}

impl<S> Default for Bucket<S> {
    fn default() -> Self {
        Self { orders: Vec::new() }
    }
}

impl<S: Copy + Display> Bucket<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_orders(orders: Vec<Order<S>>) -> Self {
        Self { orders }
    }

    pub fn into_orders(self) -> Vec<Order<S>> {
        self.orders
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn orders(&self) -> &[Order<S>] {
        &self.orders
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Order<S>> {
        self.orders.iter()
    }

    pub fn ids(&self) -> Vec<String> {
        self.orders.iter().map(|o| o.id.clone()).collect()
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.orders.iter().position(|o| o.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    pub fn get(&self, id: &str) -> Option<&Order<S>> {
        self.orders.iter().find(|o| o.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Order<S>> {
        self.orders.iter_mut().find(|o| o.id == id)
    }

    fn check_index(&self, index: usize, status: S) -> BoardResult<()> {
        if index >= self.orders.len() {
            return Err(BoardError::IndexOutOfRange {
                bucket: status.to_string(),
                index,
                len: self.orders.len(),
            });
        }
        Ok(())
    }

    /// Remove and return the order at `index`
    pub fn take(&mut self, index: usize, status: S) -> BoardResult<Order<S>> {
        self.check_index(index, status)?;
        Ok(self.orders.remove(index))
    }

    /// Remove the order with `id`, if present
    pub fn remove_id(&mut self, id: &str) -> Option<Order<S>> {
        self.position(id).map(|idx| self.orders.remove(idx))
    }

    /// Insert at `index`, clamped to the end of the bucket
    pub fn insert(&mut self, index: usize, order: Order<S>) -> usize {
        let index = index.min(self.orders.len());
        self.orders.insert(index, order);
        index
    }

    pub fn push(&mut self, order: Order<S>) {
        self.orders.push(order);
    }

    pub fn prepend(&mut self, order: Order<S>) {
        self.orders.insert(0, order);
    }

    /// Move an order within the bucket
    ///
    /// `from` must be a valid index; `to` is clamped to the last position.
    pub fn move_item(&mut self, from: usize, to: usize, status: S) -> BoardResult<()> {
        self.check_index(from, status)?;
        let to = to.min(self.orders.len() - 1);
        if from != to {
            let order = self.orders.remove(from);
            self.orders.insert(to, order);
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        self.orders.clear();
    }
}

impl<'a, S> IntoIterator for &'a Bucket<S> {
    type Item = &'a Order<S>;
    type IntoIter = std::slice::Iter<'a, Order<S>>;

    fn into_iter(self) -> Self::IntoIter {
        self.orders.iter()
    }
}
