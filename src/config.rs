use std::{error::Error, fmt};

use serde::{Deserialize, Serialize};

use crate::definitions::order::CustomerIdentity;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WizardConfig {
    /// Identity sent with every order until customers can sign in.
    pub customer: CustomerIdentity,
    pub currency: String,
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            customer: CustomerIdentity::default(),
            currency: "UZS".to_string(),
        }
    }
}

impl WizardConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// `45000` becomes `45 000 UZS`.
    pub fn format_price(&self, price: u64) -> String {
        let digits = price.to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(' ');
            }
            grouped.push(c);
        }
        format!("{grouped} {}", self.currency)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Parse(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Parse(e) => write!(f, "Invalid wizard config: {e}"),
        }
    }
}

impl Error for ConfigError {}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        ConfigError::Parse(value.to_string())
    }
}
