use crate::core::wizard::{Step, WizardState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationResult {
    pub can_proceed: bool,
    pub reason: Option<&'static str>,
}

impl ValidationResult {
    const fn allow() -> Self {
        Self {
            can_proceed: true,
            reason: None,
        }
    }

    const fn deny(reason: Option<&'static str>) -> Self {
        Self {
            can_proceed: false,
            reason,
        }
    }
}

/// 判斷目前步驟能否前進。
///
/// Details 永遠回傳 false：只有表單送出成功 (`SetCustomerDetails`) 才會離開該步驟。
/// Review 回傳 true 代表「送出預約」，不是進入下一步。
pub fn can_advance(step: Step, state: &WizardState) -> ValidationResult {
    match step {
        Step::Services => {
            if state.clients.iter().all(|c| c.service.is_some()) {
                ValidationResult::allow()
            } else {
                ValidationResult::deny(Some("Please select a service for all clients"))
            }
        }
        Step::Date => {
            if state.selected_date.is_some() {
                ValidationResult::allow()
            } else {
                ValidationResult::deny(Some("Please select a date"))
            }
        }
        Step::Time => {
            if state.selected_time.is_some() {
                ValidationResult::allow()
            } else {
                ValidationResult::deny(Some("Please select a time"))
            }
        }
        Step::AddOns => ValidationResult::allow(),
        Step::Details => ValidationResult::deny(None),
        Step::Review => ValidationResult::allow(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Service, ServiceCategory};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn service() -> Service {
        Service {
            id: "classic".to_string(),
            name: "Classic Full Set".to_string(),
            description: String::new(),
            duration: 90,
            price: Decimal::from(120),
            category: ServiceCategory::Classic,
        }
    }

    #[test]
    fn test_services_step_requires_every_client() {
        let mut state = WizardState::new();
        assert!(!can_advance(Step::Services, &state).can_proceed);

        state.clients[0].service = Some(service());
        assert!(can_advance(Step::Services, &state).can_proceed);

        state.clients.push(crate::domain::model::ClientSelection::new(2));
        let result = can_advance(Step::Services, &state);
        assert!(!result.can_proceed);
        assert_eq!(result.reason, Some("Please select a service for all clients"));
    }

    #[test]
    fn test_date_and_time_steps() {
        let mut state = WizardState::new();
        assert_eq!(can_advance(Step::Date, &state).reason, Some("Please select a date"));
        assert!(!can_advance(Step::Time, &state).can_proceed);

        state.selected_date = NaiveDate::from_ymd_opt(2026, 11, 3);
        state.selected_time = Some("14:30".to_string());
        assert!(can_advance(Step::Date, &state).can_proceed);
        assert!(can_advance(Step::Time, &state).can_proceed);
    }

    #[test]
    fn test_details_step_never_advances() {
        let mut state = WizardState::new();
        assert!(!can_advance(Step::Details, &state).can_proceed);

        state.clients[0].service = Some(service());
        state.selected_date = NaiveDate::from_ymd_opt(2026, 11, 3);
        state.selected_time = Some("10:00".to_string());
        assert!(!can_advance(Step::Details, &state).can_proceed);
    }

    #[test]
    fn test_optional_and_review_steps_always_pass() {
        let state = WizardState::new();
        assert!(can_advance(Step::AddOns, &state).can_proceed);
        assert!(can_advance(Step::Review, &state).can_proceed);
    }
}
