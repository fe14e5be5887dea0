//! In-memory entity registry.
//!
//! One [`EntityStore`] per entity type, each behind its own lock, so a
//! forecast refresh never waits on a purchase-order update. Stores hold no
//! business rules; callers validate inside [`EntityStore::update`].

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt::Display;
use std::hash::Hash;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use supply_core::{CoreError, CoreResult};
use supply_shared::{
    DemandForecast, InventoryOptimization, PurchaseOrder, Shipment, Supplier, SupplyChainEvent,
};
use uuid::Uuid;

pub trait Entity: Clone + Send + Sync + 'static {
    type Key: Eq + Hash + Clone + Display + Send + Sync;

    /// Name used in error messages
    const KIND: &'static str;

    fn key(&self) -> Self::Key;

    /// Ordering applied by [`EntityStore::list`]
    fn list_order(_a: &Self, _b: &Self) -> Ordering {
        Ordering::Equal
    }
}

impl Entity for Supplier {
    type Key = Uuid;
    const KIND: &'static str = "supplier";

    fn key(&self) -> Uuid {
        self.id
    }

    fn list_order(a: &Self, b: &Self) -> Ordering {
        b.rating.total_cmp(&a.rating)
    }
}

impl Entity for PurchaseOrder {
    type Key = Uuid;
    const KIND: &'static str = "purchase_order";

    fn key(&self) -> Uuid {
        self.id
    }

    fn list_order(a: &Self, b: &Self) -> Ordering {
        b.order_date.cmp(&a.order_date)
    }
}

impl Entity for Shipment {
    type Key = Uuid;
    const KIND: &'static str = "shipment";

    fn key(&self) -> Uuid {
        self.id
    }

    fn list_order(a: &Self, b: &Self) -> Ordering {
        b.ship_date.cmp(&a.ship_date)
    }
}

impl Entity for DemandForecast {
    type Key = String;
    const KIND: &'static str = "demand_forecast";

    fn key(&self) -> String {
        self.product_id.clone()
    }
}

impl Entity for InventoryOptimization {
    type Key = String;
    const KIND: &'static str = "inventory_optimization";

    fn key(&self) -> String {
        self.product_id.clone()
    }
}

impl Entity for SupplyChainEvent {
    type Key = Uuid;
    const KIND: &'static str = "supply_chain_event";

    fn key(&self) -> Uuid {
        self.id
    }

    fn list_order(a: &Self, b: &Self) -> Ordering {
        b.detected_at.cmp(&a.detected_at)
    }
}

pub struct EntityStore<T: Entity> {
    items: RwLock<HashMap<T::Key, T>>,
}

impl<T: Entity> EntityStore<T> {
    pub fn new() -> Self {
        Self {
            items: RwLock::new(HashMap::new()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<T::Key, T>> {
        self.items.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<T::Key, T>> {
        self.items.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert a new entity; fails if the key is taken
    pub fn insert(&self, item: T) -> CoreResult<()> {
        let key = item.key();
        let mut items = self.write();
        if items.contains_key(&key) {
            return Err(CoreError::validation(format!(
                "{} already exists: {}",
                T::KIND,
                key
            )));
        }
        items.insert(key, item);
        Ok(())
    }

    /// Insert or overwrite
    pub fn put(&self, item: T) -> Option<T> {
        self.write().insert(item.key(), item)
    }

    pub fn get(&self, key: &T::Key) -> CoreResult<T> {
        self.find(key)
            .ok_or_else(|| CoreError::not_found(T::KIND, key))
    }

    pub fn find(&self, key: &T::Key) -> Option<T> {
        self.read().get(key).cloned()
    }

    pub fn contains(&self, key: &T::Key) -> bool {
        self.read().contains_key(key)
    }

    /// Mutate one entity atomically.
    ///
    /// `f` runs against a copy; the copy replaces the stored value only when
    /// `f` returns `Ok`, so a failed validation never leaves a partial update.
    pub fn update<R>(
        &self,
        key: &T::Key,
        f: impl FnOnce(&mut T) -> CoreResult<R>,
    ) -> CoreResult<R> {
        let mut items = self.write();
        let current = items
            .get(key)
            .ok_or_else(|| CoreError::not_found(T::KIND, key))?;
        let mut draft = current.clone();
        let result = f(&mut draft)?;
        items.insert(key.clone(), draft);
        Ok(result)
    }

    pub fn remove(&self, key: &T::Key) -> Option<T> {
        self.write().remove(key)
    }

    /// Matching entities in the type's list order, ties broken by key
    pub fn list(&self, filter: impl Fn(&T) -> bool) -> Vec<T> {
        let mut items: Vec<T> = self.read().values().filter(|item| filter(item)).cloned().collect();
        items.sort_by(|a, b| {
            T::list_order(a, b).then_with(|| a.key().to_string().cmp(&b.key().to_string()))
        });
        items
    }

    pub fn all(&self) -> Vec<T> {
        self.list(|_| true)
    }

    pub fn keys(&self) -> Vec<T::Key> {
        self.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}

impl<T: Entity> Default for EntityStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// All engine state, one independently locked store per entity type
#[derive(Default)]
pub struct Registry {
    pub suppliers: EntityStore<Supplier>,
    pub orders: EntityStore<PurchaseOrder>,
    pub shipments: EntityStore<Shipment>,
    pub forecasts: EntityStore<DemandForecast>,
    pub optimizations: EntityStore<InventoryOptimization>,
    pub events: EntityStore<SupplyChainEvent>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use supply_shared::models::inventory::{
        InventoryCosts, OptimizationSummary, StockAction, StockRecommendation,
    };
    use supply_shared::models::supplier::{FinancialInfo, NewSupplier, SupplierContact};
    use supply_shared::{SupplierTier, SupplierType};

    fn supplier(name: &str, rating: f64) -> Supplier {
        Supplier::from_request(
            NewSupplier {
                name: name.to_string(),
                supplier_type: SupplierType::Manufacturer,
                tier: SupplierTier::Tier1,
                status: None,
                rating,
                contact: SupplierContact {
                    contact_name: "Ops".to_string(),
                    email: "ops@example.com".to_string(),
                    phone: None,
                    country: "DE".to_string(),
                    city: None,
                },
                financial: FinancialInfo {
                    credit_rating: "A".to_string(),
                    payment_terms: "Net 30".to_string(),
                    annual_revenue: 1_000_000.0,
                    currency: "USD".to_string(),
                },
                categories: vec![],
                certifications: vec![],
                performance: None,
            },
            Utc::now(),
        )
    }

    fn optimization(product_id: &str, stock: i64) -> InventoryOptimization {
        InventoryOptimization {
            product_id: product_id.to_string(),
            current_stock: stock,
            average_demand: 0.0,
            demand_std_dev: 0.0,
            lead_time_days: 14.0,
            safety_stock: 0,
            reorder_point: 0,
            economic_order_quantity: 0,
            service_level: 0.95,
            costs: InventoryCosts {
                holding: 0.0,
                ordering: 0.0,
                stockout: 0.0,
                obsolescence: 0.0,
                total: 0.0,
            },
            recommended_stock: StockRecommendation {
                action: StockAction::Maintain,
                target_level: stock,
                rationale: String::new(),
            },
            optimization: OptimizationSummary {
                current_cost: 0.0,
                optimized_cost: 0.0,
                savings: 0.0,
                cost_improvement: 15.0,
                risk_reduction: 25.0,
                service_improvement: 10.0,
            },
            last_calculated: Utc::now() - Duration::minutes(1),
        }
    }

    #[test]
    fn test_get_missing_is_not_found() {
        let store: EntityStore<Supplier> = EntityStore::new();
        let err = store.get(&Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, CoreError::NotFound { entity: "supplier", .. }));
    }

    #[test]
    fn test_insert_rejects_duplicate_key() {
        let store = EntityStore::new();
        let s = supplier("Acme", 8.0);
        store.insert(s.clone()).unwrap();
        assert!(matches!(store.insert(s), Err(CoreError::ValidationError(_))));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_suppliers_listed_by_rating_desc() {
        let store = EntityStore::new();
        store.put(supplier("Mid", 6.5));
        store.put(supplier("Top", 9.1));
        store.put(supplier("Low", 3.0));

        let names: Vec<String> = store.all().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["Top", "Mid", "Low"]);

        let filtered = store.list(|s| s.rating > 5.0);
        assert_eq!(filtered.len(), 2);
    }

    #[test]
    fn test_failed_update_leaves_value_untouched() {
        let store = EntityStore::new();
        store.put(optimization("SKU-1", 10));

        let result: CoreResult<()> = store.update(&"SKU-1".to_string(), |item| {
            item.current_stock = 999;
            Err(CoreError::validation("rejected"))
        });
        assert!(result.is_err());
        assert_eq!(store.get(&"SKU-1".to_string()).unwrap().current_stock, 10);

        store
            .update(&"SKU-1".to_string(), |item| {
                item.current_stock = 42;
                Ok(())
            })
            .unwrap();
        assert_eq!(store.get(&"SKU-1".to_string()).unwrap().current_stock, 42);
    }

    #[test]
    fn test_put_overwrites() {
        let store = EntityStore::new();
        assert!(store.put(optimization("SKU-2", 1)).is_none());
        let previous = store.put(optimization("SKU-2", 2)).unwrap();
        assert_eq!(previous.current_stock, 1);
        assert_eq!(store.len(), 1);
    }
}
