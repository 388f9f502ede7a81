use crate::core::submission::AppointmentRequest;
use crate::domain::model::{AddOn, AppointmentConfirmation, BusinessHours, Service, TimeSlot};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::time::Duration;

/// The booking backend. It owns pricing, availability and confirmation codes.
#[async_trait]
pub trait BookingApi: Send + Sync {
    async fn list_services(&self) -> Result<Vec<Service>>;
    async fn list_add_ons(&self) -> Result<Vec<AddOn>>;
    async fn list_business_hours(&self) -> Result<Vec<BusinessHours>>;
    async fn list_available_slots(&self, date: NaiveDate) -> Result<Vec<TimeSlot>>;
    async fn create_appointment(
        &self,
        request: &AppointmentRequest,
    ) -> Result<AppointmentConfirmation>;
    async fn find_appointment(&self, confirmation_code: &str) -> Result<AppointmentConfirmation>;
}

pub trait ConfigProvider: Send + Sync {
    fn api_base_url(&self) -> &str;
    fn request_timeout(&self) -> Duration;
    fn transport_fee(&self) -> Decimal;
    fn max_clients(&self) -> Option<usize>;
}
