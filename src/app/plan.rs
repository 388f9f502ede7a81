//! Booking plans: a whole booking written down as TOML and replayed through
//! [`BookingFlow`] one step at a time.
//!
//! ```toml
//! date = "2026-11-03"
//! time = "10:00"
//!
//! [customer]
//! first_name = "Mia"
//! last_name = "Chen"
//! email = "mia@example.com"
//! phone = "0412345678"
//! location = "12 Beach Rd"
//!
//! [[clients]]
//! service_id = 1
//! add_on_ids = [2]
//! ```

use crate::core::details::DetailsForm;
use crate::core::flow::{BookingFlow, Proceed};
use crate::core::totals::BookingSummary;
use crate::core::wizard::Step;
use crate::domain::model::{lenient_id, lenient_ids};
use crate::domain::ports::BookingApi;
use crate::utils::error::{BookingError, Result};
use crate::utils::validation::{self, Validate};
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BookingPlan {
    pub date: NaiveDate,
    pub time: String,
    pub customer: DetailsForm,
    pub clients: Vec<PlannedClient>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlannedClient {
    #[serde(deserialize_with = "lenient_id")]
    pub service_id: String,
    #[serde(default, deserialize_with = "lenient_ids")]
    pub add_on_ids: Vec<String>,
}

/// Result of replaying a plan.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanOutcome {
    pub summary: BookingSummary,
    /// `None` for a dry run.
    pub confirmation_code: Option<String>,
}

impl BookingPlan {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| BookingError::ConfigValidationError {
            field: "plan".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }
}

impl Validate for BookingPlan {
    fn validate(&self) -> Result<()> {
        validation::validate_non_empty_string("time", &self.time)?;
        if self.clients.is_empty() {
            return Err(BookingError::ConfigValidationError {
                field: "clients".to_string(),
                message: "A plan needs at least one client".to_string(),
            });
        }
        for (i, client) in self.clients.iter().enumerate() {
            validation::validate_non_empty_string(
                &format!("clients[{}].service_id", i),
                &client.service_id,
            )?;
        }
        Ok(())
    }
}

/// Walks the plan through every step of `flow`. Each forward move goes
/// through the gate, so a plan cannot skip anything the interactive wizard
/// would require.
pub async fn replay<A: BookingApi>(
    flow: &mut BookingFlow<A>,
    plan: &BookingPlan,
    dry_run: bool,
) -> Result<PlanOutcome> {
    plan.validate()?;

    if flow.catalog_state().catalog().is_none() {
        flow.load_catalog().await?;
    }

    // 先建立所有客人，再各自選服務
    for _ in 1..plan.clients.len() {
        if !flow.add_client().is_applied() {
            return Err(BookingError::ActionRejected {
                reason: format!("cannot add {} clients to one booking", plan.clients.len()),
            });
        }
    }
    let client_ids: Vec<_> = flow.state().clients.iter().map(|c| c.id).collect();

    for (client_id, planned) in client_ids.iter().zip(&plan.clients) {
        flow.select_service_for(*client_id, &planned.service_id)?;
    }
    advance(flow, Step::Date).await?;

    flow.choose_date(plan.date).await?;
    advance(flow, Step::Time).await?;

    flow.select_time(&plan.time)?;
    advance(flow, Step::AddOns).await?;

    for (client_id, planned) in client_ids.iter().zip(&plan.clients) {
        for add_on_id in &planned.add_on_ids {
            flow.toggle_add_on_for(*client_id, add_on_id)?;
        }
    }
    advance(flow, Step::Details).await?;

    flow.submit_details(&plan.customer)?;

    let summary = flow.summary();
    tracing::info!(
        "📋 Booking ready for review: {} client(s), total {}",
        summary.lines.len(),
        summary.total_price
    );

    if dry_run {
        return Ok(PlanOutcome {
            summary,
            confirmation_code: None,
        });
    }

    match flow.proceed().await? {
        Proceed::Confirmed(code) => Ok(PlanOutcome {
            summary,
            confirmation_code: Some(code),
        }),
        other => Err(BookingError::ActionRejected {
            reason: format!("expected confirmation, got {:?}", other),
        }),
    }
}

async fn advance<A: BookingApi>(flow: &mut BookingFlow<A>, expected: Step) -> Result<()> {
    match flow.proceed().await? {
        Proceed::Moved(step) if step == expected => Ok(()),
        Proceed::Blocked(reason) => Err(BookingError::ActionRejected {
            reason: reason.unwrap_or("step is not complete").to_string(),
        }),
        other => Err(BookingError::ActionRejected {
            reason: format!("expected to reach {}, got {:?}", expected, other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAN: &str = r#"
date = "2026-11-03"
time = "10:00"

[customer]
first_name = "Mia"
last_name = "Chen"
email = "mia@example.com"
phone = "0412345678"
location = "12 Beach Rd"
needs_transport = true

[[clients]]
service_id = 1
add_on_ids = [2, "lower"]

[[clients]]
service_id = "volume"
"#;

    #[test]
    fn test_parse_plan() {
        let plan = BookingPlan::from_toml_str(PLAN).unwrap();
        assert_eq!(plan.date, NaiveDate::from_ymd_opt(2026, 11, 3).unwrap());
        assert_eq!(plan.time, "10:00");
        assert!(plan.customer.needs_transport);
        assert_eq!(plan.clients.len(), 2);
        assert_eq!(plan.clients[0].service_id, "1");
        assert_eq!(plan.clients[0].add_on_ids, vec!["2", "lower"]);
        assert!(plan.clients[1].add_on_ids.is_empty());
        assert!(plan.validate().is_ok());
    }

    #[test]
    fn test_plan_without_clients_is_invalid() {
        let plan = BookingPlan::from_toml_str(
            "date = \"2026-11-03\"\ntime = \"10:00\"\nclients = []\n[customer]\n",
        )
        .unwrap();
        assert!(plan.validate().is_err());
    }

    #[test]
    fn test_malformed_plan_is_config_error() {
        let err = BookingPlan::from_toml_str("date = \"tomorrow\"").unwrap_err();
        assert!(matches!(err, BookingError::ConfigValidationError { .. }));
    }
}
