pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::{Cli, Command};

pub use adapters::HttpBookingApi;
pub use app::{BookingPlan, PlanOutcome};
pub use config::BookingConfig;
pub use core::{flow::BookingFlow, wizard::BookingWizard};
pub use utils::error::{BookingError, Result};
