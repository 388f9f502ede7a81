//! Booking wizard state machine.
//!
//! Every state change goes through [`reduce`]. Actions never fail: an action
//! that does not apply to the current state is reported as
//! [`Transition::Ignored`] and leaves the state untouched.

use crate::core::gate::{can_advance, ValidationResult};
use crate::domain::model::{client_label, AddOn, ClientId, ClientSelection, CustomerDetails, Service};
use crate::utils::error::{BookingError, Result};
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

pub const DEFAULT_MAX_CLIENTS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Services,
    Date,
    Time,
    AddOns,
    Details,
    Review,
}

impl Step {
    pub const COUNT: usize = 6;

    pub const ALL: [Step; Step::COUNT] = [
        Step::Services,
        Step::Date,
        Step::Time,
        Step::AddOns,
        Step::Details,
        Step::Review,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Step> {
        Self::ALL.get(index).copied()
    }

    pub fn next(self) -> Option<Step> {
        Self::from_index(self.index() + 1)
    }

    pub fn previous(self) -> Option<Step> {
        self.index().checked_sub(1).and_then(Self::from_index)
    }

    pub fn label(self) -> &'static str {
        match self {
            Step::Services => "Services",
            Step::Date => "Date",
            Step::Time => "Time",
            Step::AddOns => "Add-ons",
            Step::Details => "Details",
            Step::Review => "Review",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WizardState {
    pub current_step: Step,
    pub clients: Vec<ClientSelection>,
    pub active_client_id: ClientId,
    pub selected_date: Option<NaiveDate>,
    pub selected_time: Option<String>,
    pub customer_details: Option<CustomerDetails>,
    pub is_confirmed: bool,
    pub confirmation_code: Option<String>,
}

impl WizardState {
    pub fn new() -> Self {
        let first = ClientSelection::new(1);
        Self {
            current_step: Step::Services,
            active_client_id: first.id,
            clients: vec![first],
            selected_date: None,
            selected_time: None,
            customer_details: None,
            is_confirmed: false,
            confirmation_code: None,
        }
    }

    pub fn client(&self, id: ClientId) -> Option<&ClientSelection> {
        self.clients.iter().find(|c| c.id == id)
    }

    pub fn active_client(&self) -> Option<&ClientSelection> {
        self.client(self.active_client_id)
    }

    fn client_mut(&mut self, id: ClientId) -> Option<&mut ClientSelection> {
        self.clients.iter_mut().find(|c| c.id == id)
    }

    fn relabel_clients(&mut self) {
        for (i, client) in self.clients.iter_mut().enumerate() {
            client.label = client_label(i + 1);
        }
    }
}

impl Default for WizardState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WizardAction {
    SetStep(Step),
    NextStep,
    PrevStep,
    AddClient,
    RemoveClient(ClientId),
    SetActiveClient(ClientId),
    SelectService { client_id: ClientId, service: Service },
    ToggleAddOn { client_id: ClientId, add_on: AddOn },
    SetDate(Option<NaiveDate>),
    SetTime(Option<String>),
    SetCustomerDetails(CustomerDetails),
    Confirm { code: String },
    Reset,
}

impl WizardAction {
    pub fn name(&self) -> &'static str {
        match self {
            WizardAction::SetStep(_) => "set_step",
            WizardAction::NextStep => "next_step",
            WizardAction::PrevStep => "prev_step",
            WizardAction::AddClient => "add_client",
            WizardAction::RemoveClient(_) => "remove_client",
            WizardAction::SetActiveClient(_) => "set_active_client",
            WizardAction::SelectService { .. } => "select_service",
            WizardAction::ToggleAddOn { .. } => "toggle_add_on",
            WizardAction::SetDate(_) => "set_date",
            WizardAction::SetTime(_) => "set_time",
            WizardAction::SetCustomerDetails(_) => "set_customer_details",
            WizardAction::Confirm { .. } => "confirm",
            WizardAction::Reset => "reset",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    AlreadyConfirmed,
    UnknownClient(ClientId),
    LastClient,
    ClientLimit(usize),
    Blocked(Option<&'static str>),
    FirstStep,
    FinalStep,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::AlreadyConfirmed => write!(f, "booking is already confirmed"),
            Rejection::UnknownClient(id) => write!(f, "no client with id {}", id),
            Rejection::LastClient => write!(f, "at least one client is required"),
            Rejection::ClientLimit(max) => write!(f, "at most {} clients per booking", max),
            Rejection::Blocked(Some(reason)) => f.write_str(reason),
            Rejection::Blocked(None) => write!(f, "current step is not complete"),
            Rejection::FirstStep => write!(f, "already at the first step"),
            Rejection::FinalStep => write!(f, "review step submits instead of advancing"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Applied,
    Ignored(Rejection),
}

impl Transition {
    pub fn is_applied(&self) -> bool {
        matches!(self, Transition::Applied)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WizardLimits {
    /// `None` means unlimited.
    pub max_clients: Option<usize>,
}

impl Default for WizardLimits {
    fn default() -> Self {
        Self {
            max_clients: Some(DEFAULT_MAX_CLIENTS),
        }
    }
}

pub fn reduce(state: &mut WizardState, action: WizardAction, limits: &WizardLimits) -> Transition {
    if state.is_confirmed && !matches!(action, WizardAction::Reset) {
        return Transition::Ignored(Rejection::AlreadyConfirmed);
    }

    match action {
        WizardAction::SetStep(step) => {
            state.current_step = step;
        }

        WizardAction::NextStep => {
            let gate = can_advance(state.current_step, state);
            if !gate.can_proceed {
                return Transition::Ignored(Rejection::Blocked(gate.reason));
            }
            match state.current_step.next() {
                Some(next) => state.current_step = next,
                None => return Transition::Ignored(Rejection::FinalStep),
            }
        }

        WizardAction::PrevStep => match state.current_step.previous() {
            Some(previous) => state.current_step = previous,
            None => return Transition::Ignored(Rejection::FirstStep),
        },

        WizardAction::AddClient => {
            if let Some(max) = limits.max_clients {
                if state.clients.len() >= max {
                    return Transition::Ignored(Rejection::ClientLimit(max));
                }
            }
            let client = ClientSelection::new(state.clients.len() + 1);
            state.active_client_id = client.id;
            state.clients.push(client);
        }

        WizardAction::RemoveClient(id) => {
            if state.clients.len() <= 1 {
                return Transition::Ignored(Rejection::LastClient);
            }
            let Some(position) = state.clients.iter().position(|c| c.id == id) else {
                return Transition::Ignored(Rejection::UnknownClient(id));
            };
            state.clients.remove(position);
            state.relabel_clients();
            if state.active_client_id == id {
                state.active_client_id = state.clients[0].id;
            }
        }

        WizardAction::SetActiveClient(id) => {
            if state.client(id).is_none() {
                return Transition::Ignored(Rejection::UnknownClient(id));
            }
            state.active_client_id = id;
        }

        WizardAction::SelectService { client_id, service } => {
            let Some(client) = state.client_mut(client_id) else {
                return Transition::Ignored(Rejection::UnknownClient(client_id));
            };
            client.service = Some(service);
        }

        WizardAction::ToggleAddOn { client_id, add_on } => {
            let Some(client) = state.client_mut(client_id) else {
                return Transition::Ignored(Rejection::UnknownClient(client_id));
            };
            if client.has_add_on(&add_on.id) {
                client.add_ons.retain(|a| a.id != add_on.id);
            } else {
                client.add_ons.push(add_on);
            }
        }

        WizardAction::SetDate(date) => {
            // 換日期後舊的時段已不屬於新的可用時段清單
            if state.selected_date != date {
                state.selected_time = None;
            }
            state.selected_date = date;
        }

        WizardAction::SetTime(time) => {
            state.selected_time = time;
        }

        WizardAction::SetCustomerDetails(details) => {
            state.customer_details = Some(details);
            state.current_step = Step::Review;
        }

        WizardAction::Confirm { code } => {
            state.is_confirmed = true;
            state.confirmation_code = Some(code);
        }

        WizardAction::Reset => {
            *state = WizardState::new();
        }
    }

    Transition::Applied
}

/// Owns the wizard state; the only way to change it is through actions.
#[derive(Debug, Clone)]
pub struct BookingWizard {
    state: WizardState,
    limits: WizardLimits,
}

impl BookingWizard {
    pub fn new(limits: WizardLimits) -> Self {
        Self {
            state: WizardState::new(),
            limits,
        }
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn limits(&self) -> WizardLimits {
        self.limits
    }

    pub fn current_step(&self) -> Step {
        self.state.current_step
    }

    /// Gate result for the current step.
    pub fn validation(&self) -> ValidationResult {
        can_advance(self.state.current_step, &self.state)
    }

    pub fn dispatch(&mut self, action: WizardAction) -> Transition {
        let name = action.name();
        let before = self.state.current_step;
        let transition = reduce(&mut self.state, action, &self.limits);

        match &transition {
            Transition::Applied => {
                if before != self.state.current_step {
                    tracing::info!(action = name, from = %before, to = %self.state.current_step, "wizard step changed");
                } else {
                    tracing::debug!(action = name, "wizard action applied");
                }
            }
            Transition::Ignored(rejection) => {
                tracing::debug!(action = name, %rejection, "wizard action ignored");
            }
        }

        transition
    }

    /// Like [`dispatch`](Self::dispatch) but reports ignored actions as errors.
    pub fn dispatch_strict(&mut self, action: WizardAction) -> Result<()> {
        match self.dispatch(action) {
            Transition::Applied => Ok(()),
            Transition::Ignored(Rejection::UnknownClient(client_id)) => {
                Err(BookingError::InvalidReference { client_id })
            }
            Transition::Ignored(Rejection::AlreadyConfirmed) => Err(BookingError::AlreadyConfirmed),
            Transition::Ignored(rejection) => Err(BookingError::ActionRejected {
                reason: rejection.to_string(),
            }),
        }
    }

    pub fn set_step(&mut self, step: Step) -> Transition {
        self.dispatch(WizardAction::SetStep(step))
    }

    pub fn go_next(&mut self) -> Transition {
        self.dispatch(WizardAction::NextStep)
    }

    pub fn go_back(&mut self) -> Transition {
        self.dispatch(WizardAction::PrevStep)
    }

    pub fn add_client(&mut self) -> Transition {
        self.dispatch(WizardAction::AddClient)
    }

    pub fn remove_client(&mut self, id: ClientId) -> Transition {
        self.dispatch(WizardAction::RemoveClient(id))
    }

    pub fn set_active_client(&mut self, id: ClientId) -> Transition {
        self.dispatch(WizardAction::SetActiveClient(id))
    }

    pub fn select_service(&mut self, client_id: ClientId, service: Service) -> Transition {
        self.dispatch(WizardAction::SelectService { client_id, service })
    }

    pub fn toggle_add_on(&mut self, client_id: ClientId, add_on: AddOn) -> Transition {
        self.dispatch(WizardAction::ToggleAddOn { client_id, add_on })
    }

    pub fn set_date(&mut self, date: Option<NaiveDate>) -> Transition {
        self.dispatch(WizardAction::SetDate(date))
    }

    pub fn set_time(&mut self, time: Option<String>) -> Transition {
        self.dispatch(WizardAction::SetTime(time))
    }

    pub fn set_customer_details(&mut self, details: CustomerDetails) -> Transition {
        self.dispatch(WizardAction::SetCustomerDetails(details))
    }

    pub fn confirm(&mut self, code: String) -> Transition {
        self.dispatch(WizardAction::Confirm { code })
    }

    pub fn reset(&mut self) -> Transition {
        self.dispatch(WizardAction::Reset)
    }
}

impl Default for BookingWizard {
    fn default() -> Self {
        Self::new(WizardLimits::default())
    }
}
