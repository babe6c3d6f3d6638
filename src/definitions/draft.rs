use std::fmt;

use serde::{Deserialize, Serialize};

use super::vehicle::VehicleOption;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TripType {
    #[default]
    City,
    Airport,
    Intercity,
    Hourly,
}

impl TripType {
    pub const ALL: [TripType; 4] = [
        TripType::City,
        TripType::Airport,
        TripType::Intercity,
        TripType::Hourly,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TripType::City => "city",
            TripType::Airport => "airport",
            TripType::Intercity => "intercity",
            TripType::Hourly => "hourly",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TripType::City => "City",
            TripType::Airport => "Airport",
            TripType::Intercity => "Intercity",
            TripType::Hourly => "Hourly",
        }
    }
}

impl fmt::Display for TripType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    #[default]
    Payme,
    Click,
    Uzum,
    Cash,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 4] = [
        PaymentMethod::Payme,
        PaymentMethod::Click,
        PaymentMethod::Uzum,
        PaymentMethod::Cash,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Payme => "payme",
            PaymentMethod::Click => "click",
            PaymentMethod::Uzum => "uzum",
            PaymentMethod::Cash => "cash",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Payme => "Payme",
            PaymentMethod::Click => "Click",
            PaymentMethod::Uzum => "Uzum",
            PaymentMethod::Cash => "Cash",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Position of the wizard. The order of the variants is the order of the flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    #[default]
    Route,
    Vehicle,
    Payment,
}

impl Step {
    pub const ALL: [Step; 3] = [Step::Route, Step::Vehicle, Step::Payment];

    pub fn next(&self) -> Option<Step> {
        match self {
            Step::Route => Some(Step::Vehicle),
            Step::Vehicle => Some(Step::Payment),
            Step::Payment => None,
        }
    }

    pub fn previous(&self) -> Option<Step> {
        match self {
            Step::Route => None,
            Step::Vehicle => Some(Step::Route),
            Step::Payment => Some(Step::Vehicle),
        }
    }

    pub fn position(&self) -> usize {
        match self {
            Step::Route => 1,
            Step::Vehicle => 2,
            Step::Payment => 3,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Step::Route => write!(f, "route"),
            Step::Vehicle => write!(f, "vehicle"),
            Step::Payment => write!(f, "payment"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepProgress {
    Completed,
    Current,
    Upcoming,
}

/// Everything the customer entered during one booking attempt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookingDraft {
    pub step: Step,
    pub trip_type: TripType,
    pub from_location: String,
    pub to_location: String,
    pub selected_vehicle: Option<VehicleOption>,
    pub payment_method: PaymentMethod,
}

impl BookingDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_route(&self) -> bool {
        !self.from_location.is_empty() && !self.to_location.is_empty()
    }

    /// Whether the forward action of `step` would be enabled for this draft.
    /// The payment step has no forward navigation, leaving it goes through a submission.
    pub fn can_advance_from(&self, step: Step) -> bool {
        match step {
            Step::Route => self.has_route(),
            Step::Vehicle => self.selected_vehicle.is_some(),
            Step::Payment => false,
        }
    }

    pub fn can_advance(&self) -> bool {
        self.can_advance_from(self.step)
    }

    pub fn can_retreat(&self) -> bool {
        self.step.previous().is_some()
    }

    pub fn can_submit(&self) -> bool {
        self.step == Step::Payment && self.selected_vehicle.is_some()
    }

    pub fn progress(&self) -> [(Step, StepProgress); 3] {
        Step::ALL.map(|step| {
            let progress = match step.cmp(&self.step) {
                std::cmp::Ordering::Less => StepProgress::Completed,
                std::cmp::Ordering::Equal => StepProgress::Current,
                std::cmp::Ordering::Greater => StepProgress::Upcoming,
            };
            (step, progress)
        })
    }

    pub fn summary(&self) -> Option<OrderSummary> {
        let vehicle = self.selected_vehicle.as_ref()?;
        Some(OrderSummary {
            route: format!("{} → {}", self.from_location, self.to_location),
            vehicle_model: vehicle.model.clone(),
            trip_type: self.trip_type.label(),
            total: vehicle.price,
        })
    }
}

/// Order details shown on the payment step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSummary {
    pub route: String,
    pub vehicle_model: String,
    pub trip_type: &'static str,
    pub total: u64,
}
