// src/infrastructure/store/mod.rs
// Process-lifetime order cache

use std::collections::HashMap;

use crate::domain::models::Order;
use crate::domain::repository::OrderStore;

/// In-memory order cache. Entries are never evicted.
#[derive(Debug, Default, Clone)]
pub struct InMemoryOrderStore {
    orders: HashMap<String, Order>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OrderStore for InMemoryOrderStore {
    fn get(&self, id: &str) -> Option<&Order> {
        self.orders.get(id)
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut Order> {
        self.orders.get_mut(id)
    }

    fn upsert(&mut self, order: Order) {
        self.orders.insert(order.id.clone(), order);
    }

    fn ids(&self) -> Vec<String> {
        self.orders.keys().cloned().collect()
    }

    fn orders(&self) -> Vec<Order> {
        self.orders.values().cloned().collect()
    }

    fn len(&self) -> usize {
        self.orders.len()
    }
}
