use std::{collections::BTreeMap, error::Error, fmt};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    dashboard::{DriverId, DriverOrder, DriverProfile},
    order::{OrderId, OrderStatus},
};

/// Star rating between 1 and 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub fn value(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Rating {
    type Error = RatingError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if (1..=5).contains(&value) {
            Ok(Rating(value))
        } else {
            Err(RatingError::OutOfRange(value))
        }
    }
}

impl From<Rating> for u8 {
    fn from(value: Rating) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RatingError {
    OutOfRange(u8),
}

impl fmt::Display for RatingError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::OutOfRange(v) => write!(f, "Rating must be between 1 and 5, got {v}"),
        }
    }
}

impl Error for RatingError {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingRecord {
    pub id: u64,
    pub order_id: OrderId,
    pub driver_id: DriverId,
    pub rating: Rating,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RatingReceipt {
    pub id: u64,
    pub average_rating: f64,
    pub total_ratings: usize,
}

/// Ratings customers left after their trips.
#[derive(Debug, Clone, Default)]
pub struct RatingBook {
    records: Vec<RatingRecord>,
}

impl RatingBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rate(
        &mut self,
        order_id: OrderId,
        driver_id: DriverId,
        rating: u8,
        comment: impl Into<String>,
    ) -> Result<RatingReceipt, RatingError> {
        let rating = Rating::try_from(rating)?;
        let id = self.records.len() as u64 + 1;
        self.records.push(RatingRecord {
            id,
            order_id,
            driver_id,
            rating,
            comment: comment.into(),
            created_at: Utc::now(),
        });
        let (average_rating, total_ratings) = self.average_for(driver_id);
        log::debug!("driver {driver_id} rated {}, average {average_rating}", rating.value());
        Ok(RatingReceipt {
            id,
            average_rating,
            total_ratings,
        })
    }

    pub fn records(&self) -> &[RatingRecord] {
        &self.records
    }

    /// Average rounded to two decimals, with the number of ratings it is based on.
    pub fn average_for(&self, driver_id: DriverId) -> (f64, usize) {
        let (sum, count) = self
            .records
            .iter()
            .filter(|r| r.driver_id == driver_id)
            .fold((0u32, 0usize), |(sum, count), r| {
                (sum + r.rating.value() as u32, count + 1)
            });
        if count == 0 {
            return (0.0, 0);
        }
        let average = sum as f64 / count as f64;
        ((average * 100.0).round() / 100.0, count)
    }

    /// Number of ratings per star value, only values that occur.
    pub fn distribution_for(&self, driver_id: DriverId) -> BTreeMap<u8, usize> {
        let mut distribution = BTreeMap::new();
        for record in self.records.iter().filter(|r| r.driver_id == driver_id) {
            *distribution.entry(record.rating.value()).or_insert(0) += 1;
        }
        distribution
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DriverStats {
    pub driver_name: String,
    pub average_rating: f64,
    pub total_ratings: usize,
    pub completed_trips: usize,
    pub total_earnings: u64,
    pub rating_distribution: BTreeMap<u8, usize>,
}

impl DriverStats {
    pub fn compute(driver: &DriverProfile, orders: &[DriverOrder], ratings: &RatingBook) -> Self {
        let (completed_trips, total_earnings) = orders
            .iter()
            .filter(|o| o.driver_id == Some(driver.id) && o.status == OrderStatus::Completed)
            .fold((0, 0), |(trips, earnings), o| (trips + 1, earnings + o.price));
        let (average_rating, total_ratings) = ratings.average_for(driver.id);
        Self {
            driver_name: driver.name.clone(),
            average_rating,
            total_ratings,
            completed_trips,
            total_earnings,
            rating_distribution: ratings.distribution_for(driver.id),
        }
    }
}
