use std::{error::Error, fmt};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::definitions::{
    order::{OrderRequest, OrderResult},
    vehicle::VehicleOption,
};

#[async_trait]
pub trait VehicleCatalog: Send + Sync {
    async fn fetch(&self) -> Result<Vec<VehicleOption>, CatalogError>;
}

#[async_trait]
pub trait OrderSubmitter: Send + Sync {
    async fn submit(&self, request: OrderRequest) -> Result<OrderResult, SubmitError>;
}

#[async_trait]
pub trait RouteEstimator: Send + Sync {
    /// `None` when no estimate is available for the route.
    async fn estimate(&self, from: &str, to: &str) -> Option<RouteEstimate>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteEstimate {
    pub distance_km: u32,
    pub duration_min: u32,
}

#[derive(Debug)]
pub enum CatalogError {
    Unavailable(String),
    Decode(String),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Unavailable(e) => write!(f, "Vehicle catalog unavailable: {e}"),
            Self::Decode(e) => write!(f, "Vehicle catalog decode failed: {e}"),
        }
    }
}

impl Error for CatalogError {}

impl From<serde_json::Error> for CatalogError {
    fn from(value: serde_json::Error) -> Self {
        CatalogError::Decode(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    /// Rejected by the order service, the reason is meant for the customer.
    Rejected(String),
    MissingFields(Vec<&'static str>),
    Unavailable(String),
}

impl fmt::Display for SubmitError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Rejected(reason) => write!(f, "{reason}"),
            Self::MissingFields(fields) => {
                write!(f, "Missing required fields: {}", fields.join(", "))
            }
            Self::Unavailable(e) => write!(f, "Order service unavailable: {e}"),
        }
    }
}

impl Error for SubmitError {}
