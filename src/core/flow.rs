use crate::core::catalog::{load_catalog, Catalog, CatalogState};
use crate::core::details::DetailsForm;
use crate::core::gate::ValidationResult;
use crate::core::slots::{SlotLoader, SlotTicket};
use crate::core::submission::{PendingSubmission, Submission, SubmissionStatus, SubmissionTicket};
use crate::core::totals::{self, BookingSummary};
use crate::core::wizard::{
    BookingWizard, Rejection, Step, Transition, WizardAction, WizardLimits, WizardState,
};
use crate::domain::model::{AppointmentConfirmation, ClientId, TimeSlot};
use crate::domain::ports::{BookingApi, ConfigProvider};
use crate::utils::error::{BookingError, Result};
use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;

/// What the "continue" control did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Proceed {
    Moved(Step),
    Blocked(Option<&'static str>),
    Confirmed(String),
}

/// Drives a booking from service selection to confirmation against a
/// [`BookingApi`].
pub struct BookingFlow<A: BookingApi> {
    api: A,
    wizard: BookingWizard,
    catalog: CatalogState,
    slots: SlotLoader,
    submission: Submission,
    transport_fee: Decimal,
}

impl<A: BookingApi> BookingFlow<A> {
    pub fn new<C: ConfigProvider + ?Sized>(api: A, config: &C) -> Self {
        let limits = WizardLimits {
            max_clients: config.max_clients(),
        };
        Self::with_limits(api, limits, config.transport_fee())
    }

    pub fn with_limits(api: A, limits: WizardLimits, transport_fee: Decimal) -> Self {
        Self {
            api,
            wizard: BookingWizard::new(limits),
            catalog: CatalogState::NotLoaded,
            slots: SlotLoader::new(),
            submission: Submission::new(),
            transport_fee,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn wizard(&self) -> &BookingWizard {
        &self.wizard
    }

    pub fn state(&self) -> &WizardState {
        self.wizard.state()
    }

    pub fn catalog_state(&self) -> &CatalogState {
        &self.catalog
    }

    pub fn catalog(&self) -> Result<&Catalog> {
        self.catalog.catalog().ok_or(BookingError::CatalogUnavailable)
    }

    pub fn slot_loader(&self) -> &SlotLoader {
        &self.slots
    }

    pub fn available_slots(&self) -> &[TimeSlot] {
        self.slots.slots()
    }

    pub fn submission_status(&self) -> &SubmissionStatus {
        self.submission.status()
    }

    pub fn validation(&self) -> ValidationResult {
        self.wizard.validation()
    }

    /// Whether the "continue" / "confirm" control is enabled.
    pub fn can_continue(&self) -> bool {
        match self.wizard.current_step() {
            Step::Review => self.submission.can_submit(self.state()),
            _ => !self.state().is_confirmed && self.validation().can_proceed,
        }
    }

    pub async fn load_catalog(&mut self) -> Result<()> {
        match load_catalog(&self.api).await {
            Ok(catalog) => {
                self.catalog = CatalogState::Ready(catalog);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to load catalog");
                self.catalog = CatalogState::Failed {
                    message: e.user_friendly_message(),
                };
                Err(e)
            }
        }
    }

    pub fn add_client(&mut self) -> Transition {
        self.wizard.add_client()
    }

    pub fn remove_client(&mut self, id: ClientId) -> Transition {
        self.wizard.remove_client(id)
    }

    pub fn set_active_client(&mut self, id: ClientId) -> Transition {
        self.wizard.set_active_client(id)
    }

    /// Selects a catalog service for the active client.
    pub fn select_service(&mut self, service_id: &str) -> Result<()> {
        let client_id = self.state().active_client_id;
        self.select_service_for(client_id, service_id)
    }

    pub fn select_service_for(&mut self, client_id: ClientId, service_id: &str) -> Result<()> {
        let service = self.catalog()?.service(service_id)?.clone();
        self.wizard
            .dispatch_strict(WizardAction::SelectService { client_id, service })
    }

    /// Toggles a catalog add-on for the active client.
    pub fn toggle_add_on(&mut self, add_on_id: &str) -> Result<()> {
        let client_id = self.state().active_client_id;
        self.toggle_add_on_for(client_id, add_on_id)
    }

    pub fn toggle_add_on_for(&mut self, client_id: ClientId, add_on_id: &str) -> Result<()> {
        let add_on = self.catalog()?.add_on(add_on_id)?.clone();
        self.wizard
            .dispatch_strict(WizardAction::ToggleAddOn { client_id, add_on })
    }

    /// Stores the date and starts a slot request for it. The caller fetches
    /// the slots and hands them back through [`apply_slots`](Self::apply_slots).
    pub fn select_date(&mut self, date: NaiveDate) -> Result<SlotTicket> {
        if date < Local::now().date_naive() {
            return Err(BookingError::DateInPast { date });
        }
        if let Some(catalog) = self.catalog.catalog() {
            if !catalog.is_open_on(date) {
                return Err(BookingError::DateClosed { date });
            }
        }

        self.wizard
            .dispatch_strict(WizardAction::SetDate(Some(date)))?;
        Ok(self.slots.request(date))
    }

    pub fn apply_slots(&mut self, ticket: SlotTicket, result: Result<Vec<TimeSlot>>) -> bool {
        self.slots.resolve(ticket, result)
    }

    /// Selects a date and fetches its slots in one go.
    pub async fn choose_date(&mut self, date: NaiveDate) -> Result<()> {
        let ticket = self.select_date(date)?;
        match self.api.list_available_slots(ticket.date()).await {
            Ok(slots) => {
                self.slots.resolve(ticket, Ok(slots));
                Ok(())
            }
            Err(e) => {
                self.slots.fail(ticket, e.user_friendly_message());
                Err(e)
            }
        }
    }

    /// Re-fetches slots for the selected date, e.g. after a failed load.
    pub async fn reload_slots(&mut self) -> Result<()> {
        let date = self.state().selected_date.ok_or_else(|| BookingError::IncompleteBooking {
            missing: "date".to_string(),
        })?;
        self.choose_date(date).await
    }

    pub fn select_time(&mut self, time: &str) -> Result<()> {
        match self.slots.find(time) {
            Some(slot) if slot.available => self
                .wizard
                .dispatch_strict(WizardAction::SetTime(Some(time.to_string()))),
            _ => Err(BookingError::SlotUnavailable {
                time: time.to_string(),
            }),
        }
    }

    /// Validates the details form; on success stores the details and jumps
    /// to the review step.
    pub fn submit_details(&mut self, form: &DetailsForm) -> Result<()> {
        let details = form.validate().map_err(BookingError::InvalidDetails)?;
        self.wizard
            .dispatch_strict(WizardAction::SetCustomerDetails(details))
    }

    /// The "continue" control: advances through the gate, or submits on the
    /// review step.
    pub async fn proceed(&mut self) -> Result<Proceed> {
        if self.wizard.current_step() == Step::Review {
            return self.confirm_booking().await.map(Proceed::Confirmed);
        }

        match self.wizard.go_next() {
            Transition::Applied => Ok(Proceed::Moved(self.wizard.current_step())),
            Transition::Ignored(Rejection::Blocked(reason)) => Ok(Proceed::Blocked(reason)),
            Transition::Ignored(Rejection::AlreadyConfirmed) => Err(BookingError::AlreadyConfirmed),
            Transition::Ignored(rejection) => Err(BookingError::ActionRejected {
                reason: rejection.to_string(),
            }),
        }
    }

    pub fn go_back(&mut self) -> Transition {
        self.wizard.go_back()
    }

    pub fn jump_to(&mut self, step: Step) -> Transition {
        self.wizard.set_step(step)
    }

    pub fn begin_submission(&mut self) -> Result<PendingSubmission> {
        self.submission.begin(self.wizard.state())
    }

    pub fn finish_submission(
        &mut self,
        ticket: SubmissionTicket,
        outcome: Result<AppointmentConfirmation>,
    ) -> Result<String> {
        self.submission.finish(&mut self.wizard, ticket, outcome)
    }

    /// Submits the booking exactly once per call.
    pub async fn confirm_booking(&mut self) -> Result<String> {
        let pending = self.begin_submission()?;
        let outcome = self.api.create_appointment(&pending.request).await;
        self.finish_submission(pending.ticket, outcome)
    }

    pub fn dismiss_error(&mut self) {
        self.submission.dismiss_error();
    }

    pub fn transport_fee(&self) -> Decimal {
        self.transport_fee
    }

    pub fn total_price(&self) -> Decimal {
        totals::total_price(&self.state().clients, self.transport_fee)
    }

    pub fn total_duration(&self) -> u32 {
        totals::total_duration(&self.state().clients)
    }

    pub fn summary(&self) -> BookingSummary {
        BookingSummary::from_clients(&self.state().clients, self.transport_fee)
    }

    /// Back to the entry point with a fresh booking. The catalog is kept.
    pub fn start_over(&mut self) {
        self.wizard.reset();
        self.slots.clear();
        self.submission.reset();
    }
}
