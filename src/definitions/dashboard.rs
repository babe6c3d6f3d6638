use std::{error::Error, fmt};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{
    draft::{PaymentMethod, TripType},
    order::{OrderId, OrderStatus},
    vehicle::VehicleId,
};

pub type DriverId = u64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverOrder {
    pub id: OrderId,
    pub order_number: String,
    pub from_location: String,
    pub to_location: String,
    pub trip_type: TripType,
    pub vehicle_id: VehicleId,
    pub vehicle_model: String,
    pub price: u64,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    pub customer_name: String,
    pub customer_phone: String,
    pub driver_id: Option<DriverId>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverProfile {
    pub id: DriverId,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DashboardTab {
    #[default]
    New,
    Active,
    History,
}

impl DashboardTab {
    pub fn shows(&self, status: OrderStatus) -> bool {
        match self {
            DashboardTab::New => status == OrderStatus::New,
            DashboardTab::Active => status == OrderStatus::Active,
            DashboardTab::History => status == OrderStatus::Completed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderAction {
    Accept,
    Decline,
    Navigate,
    Call,
    Complete,
}

impl fmt::Display for OrderAction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            OrderAction::Accept => write!(f, "accept"),
            OrderAction::Decline => write!(f, "decline"),
            OrderAction::Navigate => write!(f, "navigate"),
            OrderAction::Call => write!(f, "call"),
            OrderAction::Complete => write!(f, "complete"),
        }
    }
}

pub fn actions_for(status: OrderStatus) -> &'static [OrderAction] {
    match status {
        OrderStatus::New => &[OrderAction::Accept, OrderAction::Decline],
        OrderStatus::Active => &[OrderAction::Navigate, OrderAction::Call, OrderAction::Complete],
        OrderStatus::Completed | OrderStatus::Declined => &[],
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusCounts {
    pub new: usize,
    pub active: usize,
    pub completed: usize,
}

#[derive(Debug, PartialEq, Eq)]
pub enum DashboardError {
    UnknownOrder(OrderId),
    NotAllowed {
        order_id: OrderId,
        status: OrderStatus,
        action: OrderAction,
    },
}

impl fmt::Display for DashboardError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::UnknownOrder(id) => write!(f, "Unknown order {id}"),
            Self::NotAllowed {
                order_id,
                status,
                action,
            } => write!(f, "Cannot {action} order {order_id} in status {status}"),
        }
    }
}

impl Error for DashboardError {}

/// Order list of one driver, split into tabs.
#[derive(Debug, Clone)]
pub struct DriverDashboard {
    driver: DriverProfile,
    orders: Vec<DriverOrder>,
    tab: DashboardTab,
    online: bool,
}

impl DriverDashboard {
    pub fn new(driver: DriverProfile, orders: Vec<DriverOrder>) -> Self {
        Self {
            driver,
            orders,
            tab: DashboardTab::default(),
            online: false,
        }
    }

    pub fn driver(&self) -> &DriverProfile {
        &self.driver
    }

    pub fn orders(&self) -> &[DriverOrder] {
        &self.orders
    }

    pub fn tab(&self) -> DashboardTab {
        self.tab
    }

    pub fn select_tab(&mut self, tab: DashboardTab) {
        self.tab = tab;
    }

    pub fn is_online(&self) -> bool {
        self.online
    }

    pub fn set_online(&mut self, online: bool) {
        log::debug!("driver {} online: {online}", self.driver.id);
        self.online = online;
    }

    pub fn visible_orders(&self) -> Vec<&DriverOrder> {
        self.orders
            .iter()
            .filter(|o| self.tab.shows(o.status))
            .collect()
    }

    pub fn counts(&self) -> StatusCounts {
        self.orders
            .iter()
            .fold(StatusCounts::default(), |mut counts, order| {
                match order.status {
                    OrderStatus::New => counts.new += 1,
                    OrderStatus::Active => counts.active += 1,
                    OrderStatus::Completed => counts.completed += 1,
                    OrderStatus::Declined => {}
                }
                counts
            })
    }

    /// Sum of orders this driver completed that were placed on `day`.
    pub fn earnings_on(&self, day: NaiveDate) -> u64 {
        self.orders
            .iter()
            .filter(|o| {
                o.status == OrderStatus::Completed
                    && o.driver_id == Some(self.driver.id)
                    && o.created_at.date_naive() == day
            })
            .map(|o| o.price)
            .sum()
    }

    pub fn accept(&mut self, order_id: OrderId) -> Result<&DriverOrder, DashboardError> {
        let driver_id = self.driver.id;
        self.change_status(order_id, OrderAction::Accept, |order| {
            order.driver_id = Some(driver_id);
            OrderStatus::Active
        })
    }

    pub fn decline(&mut self, order_id: OrderId) -> Result<&DriverOrder, DashboardError> {
        self.change_status(order_id, OrderAction::Decline, |_| OrderStatus::Declined)
    }

    pub fn complete(&mut self, order_id: OrderId) -> Result<&DriverOrder, DashboardError> {
        self.change_status(order_id, OrderAction::Complete, |_| OrderStatus::Completed)
    }

    fn change_status(
        &mut self,
        order_id: OrderId,
        action: OrderAction,
        update: impl FnOnce(&mut DriverOrder) -> OrderStatus,
    ) -> Result<&DriverOrder, DashboardError> {
        let order = self
            .orders
            .iter_mut()
            .find(|o| o.id == order_id)
            .ok_or(DashboardError::UnknownOrder(order_id))?;
        if !actions_for(order.status).contains(&action) {
            return Err(DashboardError::NotAllowed {
                order_id,
                status: order.status,
                action,
            });
        }
        let status = update(order);
        log::debug!("order {} {} -> {}", order.order_number, order.status, status);
        order.status = status;
        Ok(order)
    }
}
