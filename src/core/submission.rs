use crate::core::wizard::{BookingWizard, Step, WizardAction, WizardState};
use crate::domain::model::AppointmentConfirmation;
use crate::utils::error::{BookingError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerPayload {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub needs_transport: bool,
    pub is_returning: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientPayload {
    pub service_id: String,
    pub add_on_ids: Vec<String>,
}

/// Body of the appointment creation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentRequest {
    pub customer: CustomerPayload,
    /// Serialized as `YYYY-MM-DD`.
    pub date: NaiveDate,
    pub time_slot: String,
    pub clients: Vec<ClientPayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl AppointmentRequest {
    pub fn from_state(state: &WizardState) -> Result<Self> {
        let details = state.customer_details.as_ref().ok_or_else(|| incomplete("customer details"))?;
        let date = state.selected_date.ok_or_else(|| incomplete("date"))?;
        let time_slot = state.selected_time.clone().ok_or_else(|| incomplete("time slot"))?;

        let clients = state
            .clients
            .iter()
            .map(|client| {
                let service = client
                    .service
                    .as_ref()
                    .ok_or_else(|| incomplete(&format!("service for {}", client.label)))?;
                Ok(ClientPayload {
                    service_id: service.id.clone(),
                    add_on_ids: client.add_ons.iter().map(|a| a.id.clone()).collect(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            customer: CustomerPayload {
                first_name: details.first_name.clone(),
                last_name: details.last_name.clone(),
                email: details.email.clone(),
                phone: details.phone.clone(),
                location: details.location.clone(),
                needs_transport: details.needs_transport,
                is_returning: details.is_returning,
            },
            date,
            time_slot,
            clients,
            notes: details.notes.clone(),
        })
    }
}

fn incomplete(missing: &str) -> BookingError {
    BookingError::IncompleteBooking {
        missing: missing.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SubmissionStatus {
    #[default]
    Idle,
    Submitting,
    Failed { message: String },
}

/// Identifies one submission attempt. A reset invalidates every ticket
/// handed out before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionTicket {
    generation: u64,
}

/// A request ready to be sent, plus the ticket its outcome must carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSubmission {
    pub ticket: SubmissionTicket,
    pub request: AppointmentRequest,
}

/// Idle → Submitting → {Confirmed | Failed}; one request in flight at a time.
#[derive(Debug, Clone, Default)]
pub struct Submission {
    status: SubmissionStatus,
    generation: u64,
}

impl Submission {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> &SubmissionStatus {
        &self.status
    }

    /// 送出中時確認按鈕必須停用
    pub fn can_submit(&self, state: &WizardState) -> bool {
        state.current_step == Step::Review
            && !state.is_confirmed
            && self.status != SubmissionStatus::Submitting
    }

    pub fn begin(&mut self, state: &WizardState) -> Result<PendingSubmission> {
        if self.status == SubmissionStatus::Submitting {
            return Err(BookingError::SubmissionInProgress);
        }
        if state.is_confirmed {
            return Err(BookingError::AlreadyConfirmed);
        }
        if state.current_step != Step::Review {
            return Err(BookingError::ActionRejected {
                reason: format!("cannot submit from the {} step", state.current_step),
            });
        }

        let request = AppointmentRequest::from_state(state)?;
        self.generation += 1;
        self.status = SubmissionStatus::Submitting;
        tracing::debug!(
            date = %request.date,
            time = %request.time_slot,
            clients = request.clients.len(),
            "submitting booking"
        );
        Ok(PendingSubmission {
            ticket: SubmissionTicket {
                generation: self.generation,
            },
            request,
        })
    }

    /// Applies the outcome of the creation call. On success the wizard is
    /// confirmed and the code returned; on failure the wizard is untouched.
    /// Outcomes for a ticket issued before the last reset are dropped.
    pub fn finish(
        &mut self,
        wizard: &mut BookingWizard,
        ticket: SubmissionTicket,
        outcome: Result<AppointmentConfirmation>,
    ) -> Result<String> {
        if ticket.generation != self.generation {
            tracing::warn!("discarding submission result for a booking that was reset");
            return Err(BookingError::StaleSubmission);
        }

        match outcome {
            Ok(confirmation) => {
                let code = confirmation.confirmation_code;
                self.status = SubmissionStatus::Idle;
                wizard.dispatch_strict(WizardAction::Confirm { code: code.clone() })?;
                tracing::info!(confirmation_code = %code, "booking confirmed");
                Ok(code)
            }
            Err(e) => {
                let message = e.user_friendly_message();
                tracing::warn!(error = %e, "booking submission failed");
                self.status = SubmissionStatus::Failed { message };
                Err(e)
            }
        }
    }

    pub fn dismiss_error(&mut self) {
        if matches!(self.status, SubmissionStatus::Failed { .. }) {
            self.status = SubmissionStatus::Idle;
        }
    }

    pub fn reset(&mut self) {
        self.generation += 1;
        self.status = SubmissionStatus::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{AddOn, CustomerDetails, Service, ServiceCategory};
    use rust_decimal::Decimal;

    fn ready_wizard() -> BookingWizard {
        let mut wizard = BookingWizard::default();
        let id = wizard.state().clients[0].id;
        wizard.select_service(
            id,
            Service {
                id: "7".to_string(),
                name: "Volume Full Set".to_string(),
                description: String::new(),
                duration: 120,
                price: Decimal::from(175),
                category: ServiceCategory::Volume,
            },
        );
        wizard.toggle_add_on(
            id,
            AddOn {
                id: "2".to_string(),
                name: "Bottom Lashes".to_string(),
                description: String::new(),
                duration: 10,
                price: Decimal::from(15),
            },
        );
        wizard.set_date(NaiveDate::from_ymd_opt(2026, 11, 3));
        wizard.set_time(Some("14:30".to_string()));
        wizard.set_customer_details(CustomerDetails {
            first_name: "Ana".to_string(),
            last_name: "Silva".to_string(),
            email: "ana@example.com".to_string(),
            phone: "0412345678".to_string(),
            location: "12 Beach Rd".to_string(),
            needs_transport: true,
            is_returning: false,
            notes: Some("Sensitive eyes".to_string()),
        });
        wizard
    }

    fn confirmation(code: &str) -> AppointmentConfirmation {
        AppointmentConfirmation {
            confirmation_code: code.to_string(),
            id: Some(1),
            status: Some("pending".to_string()),
            total_price: None,
            total_duration: None,
            appointment_date: None,
            appointment_time: None,
        }
    }

    #[test]
    fn test_payload_shape() {
        let wizard = ready_wizard();
        let request = AppointmentRequest::from_state(wizard.state()).unwrap();
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "customer": {
                    "firstName": "Ana",
                    "lastName": "Silva",
                    "email": "ana@example.com",
                    "phone": "0412345678",
                    "location": "12 Beach Rd",
                    "needsTransport": true,
                    "isReturning": false
                },
                "date": "2026-11-03",
                "timeSlot": "14:30",
                "clients": [{ "serviceId": "7", "addOnIds": ["2"] }],
                "notes": "Sensitive eyes"
            })
        );
    }

    #[test]
    fn test_payload_requires_every_service() {
        let mut wizard = ready_wizard();
        wizard.set_step(Step::Services);
        wizard.add_client();

        let err = AppointmentRequest::from_state(wizard.state()).unwrap_err();
        assert!(matches!(err, BookingError::IncompleteBooking { missing } if missing == "service for Client 2"));
    }

    #[test]
    fn test_success_confirms_once() {
        let mut wizard = ready_wizard();
        let mut submission = Submission::new();

        let pending = submission.begin(wizard.state()).unwrap();
        assert_eq!(submission.status(), &SubmissionStatus::Submitting);
        assert!(!submission.can_submit(wizard.state()));

        let code = submission
            .finish(&mut wizard, pending.ticket, Ok(confirmation("HLS-AB12CD34")))
            .unwrap();
        assert_eq!(code, "HLS-AB12CD34");
        assert!(wizard.state().is_confirmed);
        assert_eq!(wizard.state().confirmation_code.as_deref(), Some("HLS-AB12CD34"));
        assert!(matches!(
            submission.begin(wizard.state()),
            Err(BookingError::AlreadyConfirmed)
        ));
    }

    #[test]
    fn test_second_begin_while_submitting_is_refused() {
        let wizard = ready_wizard();
        let mut submission = Submission::new();

        submission.begin(wizard.state()).unwrap();
        assert!(matches!(
            submission.begin(wizard.state()),
            Err(BookingError::SubmissionInProgress)
        ));
    }

    #[test]
    fn test_failure_keeps_review_step_and_allows_retry() {
        let mut wizard = ready_wizard();
        let mut submission = Submission::new();

        let pending = submission.begin(wizard.state()).unwrap();
        let err = submission
            .finish(
                &mut wizard,
                pending.ticket,
                Err(BookingError::ApiResponseError {
                    status: 409,
                    message: "The selected time slot is not available".to_string(),
                }),
            )
            .unwrap_err();

        assert!(matches!(err, BookingError::ApiResponseError { status: 409, .. }));
        assert_eq!(
            submission.status(),
            &SubmissionStatus::Failed {
                message: "The selected time slot is not available".to_string()
            }
        );
        assert!(!wizard.state().is_confirmed);
        assert_eq!(wizard.current_step(), Step::Review);
        assert!(wizard.state().customer_details.is_some());

        submission.dismiss_error();
        assert_eq!(submission.status(), &SubmissionStatus::Idle);
        assert!(submission.begin(wizard.state()).is_ok());
    }

    #[test]
    fn test_cannot_submit_before_review() {
        let mut wizard = ready_wizard();
        wizard.set_step(Step::AddOns);
        let mut submission = Submission::new();

        assert!(matches!(
            submission.begin(wizard.state()),
            Err(BookingError::ActionRejected { .. })
        ));
        assert_eq!(submission.status(), &SubmissionStatus::Idle);
    }

    #[test]
    fn test_result_after_reset_is_discarded() {
        let mut wizard = ready_wizard();
        let mut submission = Submission::new();

        let pending = submission.begin(wizard.state()).unwrap();
        wizard.reset();
        submission.reset();

        let err = submission
            .finish(&mut wizard, pending.ticket, Ok(confirmation("HLS-LATE0001")))
            .unwrap_err();
        assert!(matches!(err, BookingError::StaleSubmission));
        assert!(!wizard.state().is_confirmed);
        assert_eq!(wizard.state().confirmation_code, None);
        assert_eq!(wizard.current_step(), Step::Services);
        assert_eq!(submission.status(), &SubmissionStatus::Idle);
    }
}
