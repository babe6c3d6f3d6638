use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    draft::{BookingDraft, PaymentMethod, TripType},
    vehicle::VehicleId,
};

pub type OrderId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    New,
    Active,
    Completed,
    Declined,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            OrderStatus::New => write!(f, "new"),
            OrderStatus::Active => write!(f, "active"),
            OrderStatus::Completed => write!(f, "completed"),
            OrderStatus::Declined => write!(f, "declined"),
        }
    }
}

/// Who the order is placed for. There is no login yet, every booking goes out as a guest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerIdentity {
    pub name: String,
    #[serde(default)]
    pub phone: String,
}

impl Default for CustomerIdentity {
    fn default() -> Self {
        Self {
            name: "Guest".to_string(),
            phone: String::new(),
        }
    }
}

/// Payload of the order creation endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub from_location: String,
    pub to_location: String,
    pub trip_type: TripType,
    pub vehicle_id: VehicleId,
    pub vehicle_model: String,
    pub price: u64,
    pub payment_method: PaymentMethod,
    pub customer_name: String,
    pub customer_phone: String,
}

impl OrderRequest {
    /// `None` while the draft has no vehicle, there is nothing to order yet.
    pub fn from_draft(draft: &BookingDraft, customer: &CustomerIdentity) -> Option<Self> {
        let vehicle = draft.selected_vehicle.as_ref()?;
        Some(Self {
            from_location: draft.from_location.clone(),
            to_location: draft.to_location.clone(),
            trip_type: draft.trip_type,
            vehicle_id: vehicle.id.clone(),
            vehicle_model: vehicle.model.clone(),
            price: vehicle.price,
            payment_method: draft.payment_method,
            customer_name: customer.name.clone(),
            customer_phone: customer.phone.clone(),
        })
    }

    /// Names of required fields that are empty.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = vec![];
        if self.from_location.is_empty() {
            missing.push("from_location");
        }
        if self.to_location.is_empty() {
            missing.push("to_location");
        }
        if self.vehicle_model.is_empty() {
            missing.push("vehicle_model");
        }
        if self.price == 0 {
            missing.push("price");
        }
        missing
    }
}

/// Confirmation returned by the order endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderResult {
    pub id: OrderId,
    pub order_number: String,
    pub status: OrderStatus,
    pub price: u64,
    pub created_at: DateTime<Utc>,
}

pub fn order_number(at: DateTime<Utc>) -> String {
    format!("VR-{}", at.format("%Y%m%d-%H%M%S"))
}
