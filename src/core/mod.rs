pub mod catalog;
pub mod details;
pub mod flow;
pub mod gate;
pub mod slots;
pub mod submission;
pub mod totals;
pub mod wizard;

pub use crate::domain::model::{AddOn, ClientSelection, CustomerDetails, Service, TimeSlot};
pub use crate::domain::ports::{BookingApi, ConfigProvider};
pub use crate::utils::error::Result;
