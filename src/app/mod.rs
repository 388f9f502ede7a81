pub mod plan;

pub use plan::{replay, BookingPlan, PlanOutcome, PlannedClient};
