use async_trait::async_trait;

use crate::definitions::{
    order::{OrderRequest, OrderResult},
    vehicle::VehicleOption,
};

use super::provider::{
    CatalogError, OrderSubmitter, RouteEstimate, RouteEstimator, SubmitError, VehicleCatalog,
};

/// Collaborator for a host without connectivity, every request fails.
#[derive(Default, Clone)]
pub struct Blackhole {}

#[async_trait]
impl VehicleCatalog for Blackhole {
    async fn fetch(&self) -> Result<Vec<VehicleOption>, CatalogError> {
        Err(CatalogError::Unavailable("offline".to_string()))
    }
}

#[async_trait]
impl OrderSubmitter for Blackhole {
    async fn submit(&self, _request: OrderRequest) -> Result<OrderResult, SubmitError> {
        Err(SubmitError::Unavailable("offline".to_string()))
    }
}

#[async_trait]
impl RouteEstimator for Blackhole {
    async fn estimate(&self, _from: &str, _to: &str) -> Option<RouteEstimate> {
        None
    }
}
