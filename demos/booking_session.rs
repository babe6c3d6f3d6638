use minivan_booking::{
    config::WizardConfig,
    definitions::{
        dashboard::{DashboardTab, DriverDashboard, DriverProfile},
        draft::{PaymentMethod, TripType},
        rating::{DriverStats, RatingBook},
        wizard::{BookingWizard, Submission},
    },
    providers::{
        estimator::RandomEstimator,
        in_memory::{InMemoryCatalog, InMemoryOrderBook},
    },
};

// customer books a minivan, a driver takes the order and gets rated
#[tokio::main]
async fn main() {
    env_logger::init();

    let book = InMemoryOrderBook::new();
    let config = WizardConfig::default();
    let wizard = BookingWizard::new(
        InMemoryCatalog::default(),
        book.clone(),
        RandomEstimator::default(),
        config.clone(),
    );
    wizard.subscribe(|effect| println!("effect {effect:?}"));

    if let Err(e) = wizard.load_catalog().await {
        println!("catalog unavailable: {e}");
        return;
    }

    wizard.select_trip_type(TripType::Airport);
    wizard.set_from("Tashkent Airport");
    wizard.set_to("Hyatt Regency");
    if let Some(estimate) = wizard.estimate_route().await {
        println!(
            "~{} km, ~{} min",
            estimate.distance_km, estimate.duration_min
        );
    }
    wizard.advance();

    for vehicle in wizard.catalog() {
        println!(
            "{} {} seats, {} bags, {} {:?}",
            vehicle.model,
            vehicle.seats,
            vehicle.luggage,
            config.format_price(vehicle.price),
            vehicle.headline_features()
        );
    }
    wizard.select_vehicle("1");
    wizard.advance();
    wizard.select_payment(PaymentMethod::Cash);

    if let Some(summary) = wizard.summary() {
        println!(
            "{} | {} | {} | {}",
            summary.route,
            summary.vehicle_model,
            summary.trip_type,
            config.format_price(summary.total)
        );
    }

    let order_id = match wizard.submit().await {
        Ok(Submission::Confirmed(result)) => {
            println!("order {} placed", result.order_number);
            result.id
        }
        Ok(Submission::Skipped(reason)) => {
            println!("order not sent: {reason:?}");
            return;
        }
        Err(e) => {
            println!("order failed: {e}");
            return;
        }
    };

    let driver = DriverProfile {
        id: 1,
        name: "Aziz Karimov".to_string(),
    };
    let mut dashboard = DriverDashboard::new(driver.clone(), book.orders());
    dashboard.set_online(true);
    println!("new orders: {}", dashboard.counts().new);
    if let Err(e) = dashboard.accept(order_id) {
        println!("{e}");
    }
    if let Err(e) = dashboard.complete(order_id) {
        println!("{e}");
    }
    dashboard.select_tab(DashboardTab::History);
    println!("history: {}", dashboard.visible_orders().len());

    let mut ratings = RatingBook::new();
    match ratings.rate(order_id, driver.id, 5, "Clean car, on time") {
        Ok(receipt) => println!("rated, average {}", receipt.average_rating),
        Err(e) => println!("{e}"),
    }
    let stats = DriverStats::compute(&driver, dashboard.orders(), &ratings);
    println!(
        "{}: {} trips, {} earned, {} stars",
        stats.driver_name,
        stats.completed_trips,
        config.format_price(stats.total_earnings),
        stats.average_rating
    );
}
