use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::Utc;

use crate::definitions::{
    order::{order_number, OrderId, OrderRequest, OrderResult, OrderStatus},
    dashboard::DriverOrder,
    vehicle::{default_fleet, VehicleOption},
};

use super::provider::{CatalogError, OrderSubmitter, SubmitError, VehicleCatalog};

/// Catalog backed by a vehicle list, serves available vehicles cheapest first.
#[derive(Debug, Clone)]
pub struct InMemoryCatalog {
    vehicles: Arc<RwLock<Vec<VehicleOption>>>,
}

impl InMemoryCatalog {
    pub fn new(vehicles: Vec<VehicleOption>) -> Self {
        Self {
            vehicles: Arc::new(RwLock::new(vehicles)),
        }
    }

    pub fn set_available(&self, id: &str, is_available: bool) -> bool {
        let mut vehicles = self.vehicles.write().expect("catalog lock");
        match vehicles.iter_mut().find(|v| v.id == id) {
            Some(vehicle) => {
                vehicle.is_available = is_available;
                true
            }
            None => false,
        }
    }
}

impl Default for InMemoryCatalog {
    fn default() -> Self {
        Self::new(default_fleet())
    }
}

#[async_trait]
impl VehicleCatalog for InMemoryCatalog {
    async fn fetch(&self) -> Result<Vec<VehicleOption>, CatalogError> {
        let mut vehicles: Vec<VehicleOption> = self
            .vehicles
            .read()
            .expect("catalog lock")
            .iter()
            .filter(|v| v.is_available)
            .cloned()
            .collect();
        vehicles.sort_by_key(|v| v.price);
        log::trace!("catalog serving {} vehicles", vehicles.len());
        Ok(vehicles)
    }
}

/// Order service keeping every accepted order in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOrderBook {
    orders: Arc<RwLock<Vec<DriverOrder>>>,
}

impl InMemoryOrderBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn orders(&self) -> Vec<DriverOrder> {
        self.orders.read().expect("order book lock").clone()
    }

    pub fn len(&self) -> usize {
        self.orders.read().expect("order book lock").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl OrderSubmitter for InMemoryOrderBook {
    async fn submit(&self, request: OrderRequest) -> Result<OrderResult, SubmitError> {
        let missing = request.missing_fields();
        if !missing.is_empty() {
            log::debug!("order rejected, missing {missing:?}");
            return Err(SubmitError::MissingFields(missing));
        }

        let created_at = Utc::now();
        let mut orders = self.orders.write().expect("order book lock");
        let id = orders.len() as OrderId + 1;
        let order = DriverOrder {
            id,
            order_number: order_number(created_at),
            from_location: request.from_location,
            to_location: request.to_location,
            trip_type: request.trip_type,
            vehicle_id: request.vehicle_id,
            vehicle_model: request.vehicle_model,
            price: request.price,
            payment_method: request.payment_method,
            status: OrderStatus::New,
            customer_name: request.customer_name,
            customer_phone: request.customer_phone,
            driver_id: None,
            created_at,
        };
        let result = OrderResult {
            id,
            order_number: order.order_number.clone(),
            status: order.status,
            price: order.price,
            created_at,
        };
        log::debug!("order {} created", result.order_number);
        orders.push(order);
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use crate::definitions::draft::{PaymentMethod, TripType};

    use super::*;

    fn request(price: u64) -> OrderRequest {
        OrderRequest {
            from_location: "Airport".to_string(),
            to_location: "Hotel".to_string(),
            trip_type: TripType::Airport,
            vehicle_id: "1".to_string(),
            vehicle_model: "Kia Carnival".to_string(),
            price,
            payment_method: PaymentMethod::Cash,
            customer_name: "Guest".to_string(),
            customer_phone: String::new(),
        }
    }

    #[tokio::test]
    async fn test_catalog_serves_available_by_price() {
        let catalog = InMemoryCatalog::default();
        let models: Vec<String> = catalog
            .fetch()
            .await
            .unwrap()
            .into_iter()
            .map(|v| v.model)
            .collect();
        assert_eq!(vec!["Hyundai H1", "Kia Carnival", "Hyundai Staria"], models);

        assert!(catalog.set_available("3", false));
        assert!(!catalog.set_available("42", false));
        let vehicles = catalog.fetch().await.unwrap();
        assert_eq!(2, vehicles.len());
        assert!(vehicles.iter().all(|v| v.id != "3"));
    }

    #[tokio::test]
    async fn test_order_book_creates_new_orders() {
        let book = InMemoryOrderBook::new();
        let first = book.submit(request(45000)).await.unwrap();
        let second = book.submit(request(55000)).await.unwrap();
        assert_eq!(1, first.id);
        assert_eq!(2, second.id);
        assert!(first.order_number.starts_with("VR-"));
        assert_eq!(OrderStatus::New, first.status);

        let orders = book.orders();
        assert_eq!(2, orders.len());
        assert_eq!("Kia Carnival", orders[0].vehicle_model);
        assert_eq!(None, orders[0].driver_id);
    }

    #[tokio::test]
    async fn test_order_book_rejects_incomplete_requests() {
        let book = InMemoryOrderBook::new();
        let result = book.submit(request(0)).await;
        assert_eq!(Err(SubmitError::MissingFields(vec!["price"])), result);
        assert!(book.is_empty());
    }
}
