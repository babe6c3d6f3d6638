use std::{
    error::Error,
    fmt,
    sync::{Arc, RwLock},
};

use uuid::Uuid;

use crate::{
    config::WizardConfig,
    providers::provider::{
        CatalogError, OrderSubmitter, RouteEstimate, RouteEstimator, SubmitError, VehicleCatalog,
    },
};

use super::{
    draft::{BookingDraft, OrderSummary, PaymentMethod, Step, StepProgress, TripType},
    machine::{apply, Command, Effect, Rejection, Transition, WizardState},
    order::{OrderRequest, OrderResult},
    vehicle::VehicleOption,
};

pub type Observer = Arc<dyn Fn(&Effect) + Send + Sync>;

/// Runs `on_drop` unless disarmed. Keeps a request flag from outliving a
/// future the host dropped before it resolved.
struct Unresolved<F: FnOnce()> {
    on_drop: Option<F>,
}

impl<F: FnOnce()> Unresolved<F> {
    fn new(on_drop: F) -> Self {
        Self {
            on_drop: Some(on_drop),
        }
    }

    fn disarm(mut self) {
        self.on_drop = None;
    }
}

impl<F: FnOnce()> Drop for Unresolved<F> {
    fn drop(&mut self) {
        if let Some(on_drop) = self.on_drop.take() {
            on_drop();
        }
    }
}

#[derive(Debug)]
pub enum WizardError {
    CatalogFetchFailed(CatalogError),
    OrderSubmissionFailed(SubmitError),
}

impl fmt::Display for WizardError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            WizardError::CatalogFetchFailed(e) => write!(f, "{e}"),
            WizardError::OrderSubmissionFailed(e) => write!(f, "{e}"),
        }
    }
}

impl Error for WizardError {}

impl From<CatalogError> for WizardError {
    fn from(value: CatalogError) -> Self {
        WizardError::CatalogFetchFailed(value)
    }
}

impl From<SubmitError> for WizardError {
    fn from(value: SubmitError) -> Self {
        WizardError::OrderSubmissionFailed(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Confirmed(OrderResult),
    /// Nothing was sent, the draft is not ready or an order is already on its way.
    Skipped(Rejection),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogLoad {
    Loaded(usize),
    AlreadyLoading,
}

/// One booking session: route, vehicle and payment steps over a caller owned draft.
///
/// Every operation takes `&self` and the state lock is never held across an
/// await, so a host may poll operations concurrently. At most one catalog fetch
/// and one order submission are in flight at a time.
pub struct BookingWizard<Catalog, Submitter, Estimator> {
    session_id: Uuid,
    state: RwLock<WizardState>,
    observers: RwLock<Vec<Observer>>,
    catalog: Catalog,
    submitter: Submitter,
    estimator: Estimator,
    config: WizardConfig,
}

impl<Catalog, Submitter, Estimator> BookingWizard<Catalog, Submitter, Estimator>
where
    Catalog: VehicleCatalog,
    Submitter: OrderSubmitter,
    Estimator: RouteEstimator,
{
    pub fn new(
        catalog: Catalog,
        submitter: Submitter,
        estimator: Estimator,
        config: WizardConfig,
    ) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            state: RwLock::new(WizardState::default()),
            observers: RwLock::new(vec![]),
            catalog,
            submitter,
            estimator,
            config,
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn config(&self) -> &WizardConfig {
        &self.config
    }

    /// `observer` is called with every effect of an applied command, after the
    /// state was updated and with no lock held, so it may call back into the wizard.
    pub fn subscribe(&self, observer: impl Fn(&Effect) + Send + Sync + 'static) {
        self.observers
            .write()
            .expect("observers lock")
            .push(Arc::new(observer));
    }

    pub fn draft(&self) -> BookingDraft {
        self.state.read().expect("wizard state lock").draft.clone()
    }

    pub fn step(&self) -> Step {
        self.state.read().expect("wizard state lock").draft.step
    }

    pub fn catalog(&self) -> Vec<VehicleOption> {
        self.state.read().expect("wizard state lock").catalog.clone()
    }

    pub fn is_submitting(&self) -> bool {
        self.state.read().expect("wizard state lock").submitting
    }

    pub fn is_loading_catalog(&self) -> bool {
        self.state.read().expect("wizard state lock").loading_catalog
    }

    pub fn can_advance(&self) -> bool {
        let state = self.state.read().expect("wizard state lock");
        !state.submitting && state.draft.can_advance()
    }

    pub fn can_advance_from(&self, step: Step) -> bool {
        self.state
            .read()
            .expect("wizard state lock")
            .draft
            .can_advance_from(step)
    }

    pub fn can_retreat(&self) -> bool {
        let state = self.state.read().expect("wizard state lock");
        !state.submitting && state.draft.can_retreat()
    }

    pub fn can_submit(&self) -> bool {
        let state = self.state.read().expect("wizard state lock");
        !state.submitting && state.draft.can_submit()
    }

    pub fn progress(&self) -> [(Step, StepProgress); 3] {
        self.state.read().expect("wizard state lock").draft.progress()
    }

    pub fn summary(&self) -> Option<OrderSummary> {
        self.state.read().expect("wizard state lock").draft.summary()
    }

    pub fn select_trip_type(&self, trip_type: TripType) -> bool {
        self.dispatch(Command::SelectTripType(trip_type)).is_ok()
    }

    pub fn set_from(&self, text: impl Into<String>) -> bool {
        self.dispatch(Command::SetFrom(text.into())).is_ok()
    }

    pub fn set_to(&self, text: impl Into<String>) -> bool {
        self.dispatch(Command::SetTo(text.into())).is_ok()
    }

    pub fn advance(&self) -> bool {
        self.dispatch(Command::Advance).is_ok()
    }

    pub fn retreat(&self) -> bool {
        self.dispatch(Command::Retreat).is_ok()
    }

    /// Selects a vehicle of the current catalog snapshot by id.
    pub fn select_vehicle(&self, id: &str) -> bool {
        self.dispatch(Command::SelectVehicle(id.to_string())).is_ok()
    }

    pub fn select_payment(&self, method: PaymentMethod) -> bool {
        self.dispatch(Command::SelectPayment(method)).is_ok()
    }

    /// Replaces the catalog snapshot. A failed fetch leaves the snapshot empty,
    /// calling this again is the retry.
    pub async fn load_catalog(&self) -> Result<CatalogLoad, WizardError> {
        if self.dispatch(Command::LoadCatalog).is_err() {
            return Ok(CatalogLoad::AlreadyLoading);
        }

        let pending = Unresolved::new(|| {
            log::debug!("session {} catalog fetch dropped", self.session_id);
            self.resolve(Command::CatalogFailed("cancelled".to_string()));
        });
        let fetched = self.catalog.fetch().await;
        pending.disarm();

        match fetched {
            Ok(vehicles) => {
                self.resolve(Command::CatalogLoaded(vehicles));
                Ok(CatalogLoad::Loaded(
                    self.state.read().expect("wizard state lock").catalog.len(),
                ))
            }
            Err(e) => {
                log::warn!("session {} catalog fetch failed: {e}", self.session_id);
                self.resolve(Command::CatalogFailed(e.to_string()));
                Err(e.into())
            }
        }
    }

    /// Sends the draft to the order service. On success the draft starts over at
    /// the route step, on failure it stays exactly as it was.
    pub async fn submit(&self) -> Result<Submission, WizardError> {
        let effects = match self.dispatch(Command::Submit) {
            Ok(effects) => effects,
            Err(rejection) => return Ok(Submission::Skipped(rejection)),
        };
        let request = effects.iter().find_map(|effect| match effect {
            Effect::SubmissionRequested(draft) => {
                OrderRequest::from_draft(draft, &self.config.customer)
            }
            _ => None,
        });
        let Some(request) = request else {
            self.resolve(Command::SubmissionFailed("nothing to submit".to_string()));
            return Ok(Submission::Skipped(Rejection::GuardNotMet));
        };

        log::debug!(
            "session {} submitting {} -> {} with vehicle {}",
            self.session_id,
            request.from_location,
            request.to_location,
            request.vehicle_id
        );
        let pending = Unresolved::new(|| {
            log::debug!("session {} submission dropped", self.session_id);
            self.resolve(Command::SubmissionFailed("cancelled".to_string()));
        });
        let submitted = self.submitter.submit(request).await;
        pending.disarm();

        match submitted {
            Ok(result) => {
                log::debug!("session {} confirmed {}", self.session_id, result.order_number);
                self.resolve(Command::SubmissionSucceeded(result.clone()));
                Ok(Submission::Confirmed(result))
            }
            Err(e) => {
                log::warn!("session {} submission failed: {e}", self.session_id);
                self.resolve(Command::SubmissionFailed(e.to_string()));
                Err(e.into())
            }
        }
    }

    /// Distance and duration of the entered route, `None` until both ends are set
    /// or when the estimator has no answer.
    pub async fn estimate_route(&self) -> Option<RouteEstimate> {
        let (from, to) = {
            let state = self.state.read().expect("wizard state lock");
            if !state.draft.has_route() {
                return None;
            }
            (
                state.draft.from_location.clone(),
                state.draft.to_location.clone(),
            )
        };
        self.estimator.estimate(&from, &to).await
    }

    fn dispatch(&self, command: Command) -> Result<Vec<Effect>, Rejection> {
        log::trace!("session {} applying {command:?}", self.session_id);
        let (outcome, effects) = {
            let mut state = self.state.write().expect("wizard state lock");
            let Transition {
                state: next,
                outcome,
                effects,
            } = apply(std::mem::take(&mut *state), command);
            *state = next;
            (outcome, effects)
        };

        match outcome {
            Ok(()) => {
                let observers = self.observers.read().expect("observers lock").clone();
                for effect in &effects {
                    for observer in observers.iter() {
                        observer(effect);
                    }
                }
                Ok(effects)
            }
            Err(rejection) => {
                log::debug!("session {} rejected: {rejection:?}", self.session_id);
                Err(rejection)
            }
        }
    }

    // resolutions always match a request this session started
    fn resolve(&self, command: Command) {
        if let Err(rejection) = self.dispatch(command) {
            log::warn!(
                "session {} dropped a resolution: {rejection:?}",
                self.session_id
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            atomic::{AtomicUsize, Ordering},
            Arc, Mutex,
        },
        time::Duration,
    };

    use async_trait::async_trait;
    use chrono::Utc;
    use tokio::sync::Notify;

    use crate::{
        definitions::{order::OrderStatus, vehicle::default_fleet},
        providers::{
            blackhole::Blackhole,
            estimator::{from_distance, FixedEstimator},
            in_memory::{InMemoryCatalog, InMemoryOrderBook},
        },
    };

    use super::*;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    /// Submitter that holds every request until released and counts calls.
    #[derive(Default)]
    struct GatedSubmitter {
        calls: AtomicUsize,
        release: Notify,
        reject_with: Option<String>,
        received: Mutex<Vec<OrderRequest>>,
    }

    #[async_trait]
    impl OrderSubmitter for GatedSubmitter {
        async fn submit(&self, request: OrderRequest) -> Result<OrderResult, SubmitError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.received.lock().expect("received lock").push(request.clone());
            self.release.notified().await;
            match &self.reject_with {
                Some(reason) => Err(SubmitError::Rejected(reason.clone())),
                None => Ok(OrderResult {
                    id: 1,
                    order_number: "VR-20251021-090507".to_string(),
                    status: OrderStatus::New,
                    price: request.price,
                    created_at: Utc::now(),
                }),
            }
        }
    }

    type TestWizard<S> = BookingWizard<InMemoryCatalog, S, FixedEstimator>;

    fn wizard<S: OrderSubmitter>(submitter: S) -> TestWizard<S> {
        BookingWizard::new(
            InMemoryCatalog::default(),
            submitter,
            FixedEstimator::new(Some(from_distance(15))),
            WizardConfig::default(),
        )
    }

    async fn at_payment<S: OrderSubmitter>(wizard: &TestWizard<S>) {
        wizard.load_catalog().await.unwrap();
        assert!(wizard.select_trip_type(TripType::Airport));
        assert!(wizard.set_from("Airport"));
        assert!(wizard.set_to("Hotel"));
        assert!(wizard.advance());
        assert!(wizard.select_vehicle("1"));
        assert!(wizard.advance());
        assert!(wizard.select_payment(PaymentMethod::Cash));
        assert_eq!(Step::Payment, wizard.step());
    }

    #[tokio::test]
    async fn test_airport_to_hotel_order() {
        init_logger();
        let book = InMemoryOrderBook::new();
        let wizard = wizard(book.clone());
        at_payment(&wizard).await;

        let summary = wizard.summary().unwrap();
        assert_eq!("Airport → Hotel", summary.route);
        assert_eq!(45000, summary.total);

        let result = wizard.submit().await.unwrap();
        let Submission::Confirmed(confirmation) = result else {
            panic!("expected confirmation, got {result:?}");
        };
        assert!(!confirmation.order_number.is_empty());
        assert_eq!(45000, confirmation.price);
        assert_eq!(BookingDraft::default(), wizard.draft());

        let orders = book.orders();
        assert_eq!(1, orders.len());
        assert_eq!("Airport", orders[0].from_location);
        assert_eq!(PaymentMethod::Cash, orders[0].payment_method);
        assert_eq!("Guest", orders[0].customer_name);
    }

    #[tokio::test]
    async fn test_advance_with_empty_origin_stays_on_route() {
        let wizard = wizard(Blackhole::default());
        wizard.set_from("");
        wizard.set_to("Hotel");
        assert!(!wizard.can_advance());
        assert!(!wizard.advance());
        assert_eq!(Step::Route, wizard.step());
    }

    #[tokio::test]
    async fn test_back_navigation_preserves_selection() {
        let wizard = wizard(Blackhole::default());
        at_payment(&wizard).await;
        let before = wizard.draft();

        assert!(wizard.retreat());
        assert!(wizard.retreat());
        assert!(!wizard.retreat());
        let draft = wizard.draft();
        assert_eq!(Step::Route, draft.step);
        assert_eq!(before.from_location, draft.from_location);
        assert_eq!(before.to_location, draft.to_location);
        assert_eq!(before.selected_vehicle, draft.selected_vehicle);
        assert!(wizard.can_advance_from(Step::Vehicle));
    }

    #[tokio::test]
    async fn test_failed_submission_keeps_draft() {
        init_logger();
        let submitter = GatedSubmitter {
            reject_with: Some("No minivans in your area".to_string()),
            ..Default::default()
        };
        submitter.release.notify_one();
        let wizard = wizard(submitter);
        at_payment(&wizard).await;
        let before = wizard.draft();

        let result = wizard.submit().await;
        match result {
            Err(WizardError::OrderSubmissionFailed(e)) => {
                assert_eq!("No minivans in your area", e.to_string())
            }
            other => panic!("expected submission failure, got {other:?}"),
        }
        assert_eq!(before, wizard.draft());
        assert_eq!(Step::Payment, wizard.step());
        assert!(!wizard.is_submitting());
        assert!(wizard.can_submit());
    }

    #[tokio::test]
    async fn test_rapid_submits_send_one_order() {
        let wizard = wizard(GatedSubmitter::default());
        at_payment(&wizard).await;

        let (first, second, retreated, _) = tokio::join!(
            wizard.submit(),
            wizard.submit(),
            async { wizard.retreat() },
            async {
                tokio::task::yield_now().await;
                wizard.submitter.release.notify_one();
            }
        );
        assert!(matches!(first, Ok(Submission::Confirmed(_))), "{first:?}");
        assert_eq!(
            Submission::Skipped(Rejection::SubmissionPending),
            second.unwrap()
        );
        assert!(!retreated);
        assert_eq!(1, wizard.submitter.calls.load(Ordering::SeqCst));
        assert_eq!(Step::Route, wizard.step());

        let received = wizard.submitter.received.lock().unwrap();
        assert_eq!("Hotel", received[0].to_location);
        assert_eq!(PaymentMethod::Cash, received[0].payment_method);
    }

    #[tokio::test]
    async fn test_submit_outside_payment_is_skipped() {
        let wizard = wizard(GatedSubmitter::default());
        assert_eq!(
            Submission::Skipped(Rejection::WrongStep),
            wizard.submit().await.unwrap()
        );
        assert_eq!(0, wizard.submitter.calls.load(Ordering::SeqCst));
    }

    #[derive(Clone, Copy)]
    enum FirstFetch {
        Fail,
        Hang,
    }

    /// Catalog whose first fetch misbehaves, every later fetch serves the fleet.
    struct ScriptedCatalog {
        first: FirstFetch,
        calls: AtomicUsize,
    }

    impl ScriptedCatalog {
        fn new(first: FirstFetch) -> Self {
            Self {
                first,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl VehicleCatalog for ScriptedCatalog {
        async fn fetch(&self) -> Result<Vec<VehicleOption>, CatalogError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                match self.first {
                    FirstFetch::Fail => {
                        return Err(CatalogError::Unavailable("timeout".to_string()))
                    }
                    FirstFetch::Hang => std::future::pending::<()>().await,
                }
            }
            Ok(default_fleet())
        }
    }

    fn wizard_with_catalog(
        catalog: ScriptedCatalog,
    ) -> BookingWizard<ScriptedCatalog, Blackhole, Blackhole> {
        BookingWizard::new(
            catalog,
            Blackhole::default(),
            Blackhole::default(),
            WizardConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_catalog_failure_then_retry() {
        init_logger();
        let wizard = wizard_with_catalog(ScriptedCatalog::new(FirstFetch::Fail));
        let result = wizard.load_catalog().await;
        assert!(matches!(result, Err(WizardError::CatalogFetchFailed(_))));
        assert!(wizard.catalog().is_empty());
        assert!(!wizard.is_loading_catalog());

        wizard.set_from("Airport");
        wizard.set_to("Hotel");
        assert!(wizard.advance());
        assert!(!wizard.select_vehicle("1"));
        assert!(!wizard.can_advance());

        assert_eq!(CatalogLoad::Loaded(3), wizard.load_catalog().await.unwrap());
        assert_eq!(default_fleet(), wizard.catalog());
        assert!(wizard.select_vehicle("1"));
        assert!(wizard.advance());
        assert_eq!(Step::Payment, wizard.step());
        assert_eq!(2, wizard.catalog.calls.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_dropped_catalog_fetch_can_be_retried() {
        init_logger();
        let wizard = wizard_with_catalog(ScriptedCatalog::new(FirstFetch::Hang));
        let result = tokio::time::timeout(Duration::from_millis(20), wizard.load_catalog()).await;
        assert!(result.is_err());
        assert!(!wizard.is_loading_catalog());
        assert!(wizard.catalog().is_empty());

        assert_eq!(CatalogLoad::Loaded(3), wizard.load_catalog().await.unwrap());
        assert_eq!(3, wizard.catalog().len());
    }

    #[tokio::test]
    async fn test_dropped_submission_releases_the_draft() {
        init_logger();
        let wizard = wizard(GatedSubmitter::default());
        at_payment(&wizard).await;
        let before = wizard.draft();

        let result = tokio::time::timeout(Duration::from_millis(20), wizard.submit()).await;
        assert!(result.is_err());
        assert!(!wizard.is_submitting());
        assert_eq!(before, wizard.draft());

        assert!(wizard.retreat());
        assert!(wizard.advance());
        wizard.submitter.release.notify_one();
        assert!(matches!(wizard.submit().await, Ok(Submission::Confirmed(_))));
        assert_eq!(2, wizard.submitter.calls.load(Ordering::SeqCst));
        assert_eq!(BookingDraft::default(), wizard.draft());
    }

    #[tokio::test]
    async fn test_observer_can_call_back_into_wizard() {
        let wizard = Arc::new(wizard(Blackhole::default()));
        wizard.load_catalog().await.unwrap();
        let session = Arc::downgrade(&wizard);
        wizard.subscribe(move |effect| {
            if let (Effect::StepChanged { to: Step::Vehicle, .. }, Some(wizard)) =
                (effect, session.upgrade())
            {
                wizard.select_vehicle("3");
                wizard.subscribe(|_| {});
            }
        });

        wizard.set_from("Airport");
        wizard.set_to("Hotel");
        assert!(wizard.advance());
        let selected = wizard.draft().selected_vehicle.map(|v| v.id);
        assert_eq!(Some("3".to_string()), selected);
        assert_eq!(2, wizard.observers.read().unwrap().len());
    }

    #[tokio::test]
    async fn test_observers_receive_effects() {
        let wizard = wizard(InMemoryOrderBook::new());
        let seen = Arc::new(Mutex::new(vec![]));
        let sink = seen.clone();
        wizard.subscribe(move |effect| sink.lock().expect("sink lock").push(effect.clone()));

        at_payment(&wizard).await;
        wizard.submit().await.unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(Effect::CatalogFetchRequested, seen[0]);
        assert_eq!(Effect::CatalogReplaced(default_fleet().len()), seen[1]);
        assert!(seen.contains(&Effect::VehicleSelected("1".to_string())));
        assert!(seen
            .iter()
            .any(|e| matches!(e, Effect::SubmissionRequested(d) if d.to_location == "Hotel")));
        assert!(matches!(seen.last(), Some(Effect::StepChanged { to: Step::Route, .. })));
    }

    #[tokio::test]
    async fn test_estimate_needs_both_locations() {
        let wizard = wizard(Blackhole::default());
        assert_eq!(None, wizard.estimate_route().await);
        wizard.set_from("Airport");
        assert_eq!(None, wizard.estimate_route().await);
        wizard.set_to("Hotel");
        assert_eq!(Some(from_distance(15)), wizard.estimate_route().await);
    }

    #[tokio::test]
    async fn test_progress_follows_step() {
        let wizard = wizard(Blackhole::default());
        at_payment(&wizard).await;
        assert_eq!(StepProgress::Completed, wizard.progress()[1].1);
        wizard.retreat();
        assert_eq!(StepProgress::Current, wizard.progress()[1].1);
        assert_eq!(StepProgress::Upcoming, wizard.progress()[2].1);
    }
}
