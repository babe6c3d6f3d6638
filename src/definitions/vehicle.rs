use serde::{de, Deserialize, Deserializer, Serialize};

use crate::providers::provider::CatalogError;

pub type VehicleId = String;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleOption {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: VehicleId,
    pub model: String,
    pub seats: u8,
    pub luggage: u8,
    pub price: u64,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default = "available")]
    pub is_available: bool,
}

impl VehicleOption {
    /// Features shown on the vehicle card, the rest only appear in the details.
    pub fn headline_features(&self) -> &[String] {
        &self.features[..self.features.len().min(2)]
    }
}

#[derive(Debug, Deserialize)]
struct VehicleListing {
    vehicles: Vec<VehicleOption>,
}

/// Decodes the body of the vehicle listing endpoint: `{"vehicles": [...]}`.
pub fn parse_listing(body: &str) -> Result<Vec<VehicleOption>, CatalogError> {
    let listing: VehicleListing = serde_json::from_str(body)?;
    Ok(listing.vehicles)
}

/// The fleet the service launched with.
pub fn default_fleet() -> Vec<VehicleOption> {
    vec![
        vehicle(
            "1",
            "Kia Carnival",
            7,
            4,
            45000,
            &["Air conditioning", "Wi-Fi", "USB charging", "Panoramic roof"],
        ),
        vehicle(
            "2",
            "Hyundai Staria",
            9,
            5,
            55000,
            &["Premium interior", "Climate control", "Massage seats", "Fridge"],
        ),
        vehicle(
            "3",
            "Hyundai H1",
            8,
            6,
            40000,
            &["Air conditioning", "Large trunk", "USB charging", "Audio system"],
        ),
    ]
}

fn vehicle(
    id: &str,
    model: &str,
    seats: u8,
    luggage: u8,
    price: u64,
    features: &[&str],
) -> VehicleOption {
    VehicleOption {
        id: id.to_string(),
        model: model.to_string(),
        seats,
        luggage,
        price,
        features: features.iter().map(|f| f.to_string()).collect(),
        is_available: true,
    }
}

fn available() -> bool {
    true
}

// the listing endpoint sends numeric ids, older clients used strings
fn deserialize_id<'de, D>(deserializer: D) -> Result<VehicleId, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(de::Error::custom(format!("invalid vehicle id {other}"))),
    }
}
