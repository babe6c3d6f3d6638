use async_trait::async_trait;
use rand::Rng;

use super::provider::{RouteEstimate, RouteEstimator};

/// Placeholder until a routing service is wired in: 5 to 24 km at 2.5 min per km.
#[derive(Debug, Default, Clone)]
pub struct RandomEstimator {}

#[async_trait]
impl RouteEstimator for RandomEstimator {
    async fn estimate(&self, from: &str, to: &str) -> Option<RouteEstimate> {
        if from.is_empty() || to.is_empty() {
            return None;
        }
        let estimate = from_distance(sample_distance());
        log::trace!("estimated {from} -> {to}: {estimate:?}");
        Some(estimate)
    }
}

/// Always answers with the same estimate, or never when built with `None`.
#[derive(Debug, Default, Clone)]
pub struct FixedEstimator {
    estimate: Option<RouteEstimate>,
}

impl FixedEstimator {
    pub fn new(estimate: Option<RouteEstimate>) -> Self {
        Self { estimate }
    }
}

#[async_trait]
impl RouteEstimator for FixedEstimator {
    async fn estimate(&self, _from: &str, _to: &str) -> Option<RouteEstimate> {
        self.estimate
    }
}

pub fn from_distance(distance_km: u32) -> RouteEstimate {
    RouteEstimate {
        distance_km,
        duration_min: distance_km * 5 / 2,
    }
}

fn sample_distance() -> u32 {
    rand::thread_rng().gen_range(5..25)
}
