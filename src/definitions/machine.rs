use super::{
    draft::{BookingDraft, PaymentMethod, Step, TripType},
    order::OrderResult,
    vehicle::{VehicleId, VehicleOption},
};

/// Everything a booking session tracks: the draft plus the catalog snapshot and
/// the two requests that may be in flight.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WizardState {
    pub draft: BookingDraft,
    pub catalog: Vec<VehicleOption>,
    pub submitting: bool,
    pub loading_catalog: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SelectTripType(TripType),
    SetFrom(String),
    SetTo(String),
    Advance,
    Retreat,
    SelectVehicle(VehicleId),
    SelectPayment(PaymentMethod),
    LoadCatalog,
    CatalogLoaded(Vec<VehicleOption>),
    CatalogFailed(String),
    Submit,
    SubmissionSucceeded(OrderResult),
    SubmissionFailed(String),
}

/// Why a command left the state untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    WrongStep,
    GuardNotMet,
    AtFirstStep,
    UnknownVehicle,
    SubmissionPending,
    CatalogLoading,
    NothingPending,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    StepChanged { from: Step, to: Step },
    RouteChanged,
    VehicleSelected(VehicleId),
    CatalogFetchRequested,
    CatalogReplaced(usize),
    CatalogUnavailable(String),
    SubmissionRequested(BookingDraft),
    OrderConfirmed(OrderResult),
    SubmissionFailed(String),
    DraftReset,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: WizardState,
    pub outcome: Result<(), Rejection>,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn applied(state: WizardState, effects: Vec<Effect>) -> Self {
        Self {
            state,
            outcome: Ok(()),
            effects,
        }
    }

    fn rejected(state: WizardState, rejection: Rejection) -> Self {
        Self {
            state,
            outcome: Err(rejection),
            effects: vec![],
        }
    }

    pub fn is_applied(&self) -> bool {
        self.outcome.is_ok()
    }
}

fn edits_draft(command: &Command) -> bool {
    !matches!(
        command,
        Command::LoadCatalog
            | Command::CatalogLoaded(_)
            | Command::CatalogFailed(_)
            | Command::SubmissionSucceeded(_)
            | Command::SubmissionFailed(_)
    )
}

/// Applies `command` to `state`. All guards of the booking flow live here, the
/// wizard only performs the requests named by the returned effects.
pub fn apply(mut state: WizardState, command: Command) -> Transition {
    if state.submitting && edits_draft(&command) {
        return Transition::rejected(state, Rejection::SubmissionPending);
    }

    let step = state.draft.step;
    match command {
        Command::SelectTripType(trip_type) => {
            if step != Step::Route {
                return Transition::rejected(state, Rejection::WrongStep);
            }
            state.draft.trip_type = trip_type;
            Transition::applied(state, vec![])
        }
        Command::SetFrom(text) => {
            if step != Step::Route {
                return Transition::rejected(state, Rejection::WrongStep);
            }
            state.draft.from_location = text;
            Transition::applied(state, vec![Effect::RouteChanged])
        }
        Command::SetTo(text) => {
            if step != Step::Route {
                return Transition::rejected(state, Rejection::WrongStep);
            }
            state.draft.to_location = text;
            Transition::applied(state, vec![Effect::RouteChanged])
        }
        Command::Advance => match step.next() {
            Some(to) if state.draft.can_advance() => {
                state.draft.step = to;
                Transition::applied(state, vec![Effect::StepChanged { from: step, to }])
            }
            Some(_) => Transition::rejected(state, Rejection::GuardNotMet),
            None => Transition::rejected(state, Rejection::WrongStep),
        },
        Command::Retreat => match step.previous() {
            Some(to) => {
                state.draft.step = to;
                Transition::applied(state, vec![Effect::StepChanged { from: step, to }])
            }
            None => Transition::rejected(state, Rejection::AtFirstStep),
        },
        Command::SelectVehicle(id) => {
            if step != Step::Vehicle {
                return Transition::rejected(state, Rejection::WrongStep);
            }
            match state.catalog.iter().find(|v| v.id == id).cloned() {
                Some(vehicle) => {
                    state.draft.selected_vehicle = Some(vehicle);
                    Transition::applied(state, vec![Effect::VehicleSelected(id)])
                }
                None => Transition::rejected(state, Rejection::UnknownVehicle),
            }
        }
        Command::SelectPayment(method) => {
            if step != Step::Payment {
                return Transition::rejected(state, Rejection::WrongStep);
            }
            state.draft.payment_method = method;
            Transition::applied(state, vec![])
        }
        Command::LoadCatalog => {
            if state.loading_catalog {
                return Transition::rejected(state, Rejection::CatalogLoading);
            }
            state.loading_catalog = true;
            Transition::applied(state, vec![Effect::CatalogFetchRequested])
        }
        Command::CatalogLoaded(vehicles) => {
            if !state.loading_catalog {
                return Transition::rejected(state, Rejection::NothingPending);
            }
            // a selection made from the previous snapshot is kept as is
            state.loading_catalog = false;
            state.catalog = vehicles.into_iter().filter(|v| v.is_available).collect();
            let count = state.catalog.len();
            Transition::applied(state, vec![Effect::CatalogReplaced(count)])
        }
        Command::CatalogFailed(reason) => {
            if !state.loading_catalog {
                return Transition::rejected(state, Rejection::NothingPending);
            }
            state.loading_catalog = false;
            state.catalog.clear();
            Transition::applied(state, vec![Effect::CatalogUnavailable(reason)])
        }
        Command::Submit => {
            if step != Step::Payment {
                return Transition::rejected(state, Rejection::WrongStep);
            }
            if !state.draft.can_submit() {
                return Transition::rejected(state, Rejection::GuardNotMet);
            }
            state.submitting = true;
            let draft = state.draft.clone();
            Transition::applied(state, vec![Effect::SubmissionRequested(draft)])
        }
        Command::SubmissionSucceeded(result) => {
            if !state.submitting {
                return Transition::rejected(state, Rejection::NothingPending);
            }
            state.submitting = false;
            state.draft = BookingDraft::default();
            Transition::applied(
                state,
                vec![
                    Effect::OrderConfirmed(result),
                    Effect::DraftReset,
                    Effect::StepChanged {
                        from: step,
                        to: Step::Route,
                    },
                ],
            )
        }
        Command::SubmissionFailed(reason) => {
            if !state.submitting {
                return Transition::rejected(state, Rejection::NothingPending);
            }
            state.submitting = false;
            Transition::applied(state, vec![Effect::SubmissionFailed(reason)])
        }
    }
}
