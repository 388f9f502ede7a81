use crate::core::submission::AppointmentRequest;
use crate::domain::model::{AddOn, AppointmentConfirmation, BusinessHours, Service, TimeSlot};
use crate::domain::ports::{BookingApi, ConfigProvider};
use crate::utils::error::{BookingError, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
struct AvailableSlotsResponse {
    slots: Vec<TimeSlot>,
}

/// 後端建立預約的格式：客戶欄位攤平、snake_case，客人從 1 開始編號
#[derive(Debug, Serialize)]
struct CreateAppointmentBody<'a> {
    first_name: &'a str,
    last_name: &'a str,
    email: &'a str,
    phone: &'a str,
    location: &'a str,
    needs_transport: bool,
    is_returning: bool,
    appointment_date: String,
    appointment_time: &'a str,
    notes: &'a str,
    clients: Vec<ClientBody>,
}

#[derive(Debug, Serialize)]
struct ClientBody {
    client_number: usize,
    service_id: serde_json::Value,
    add_on_ids: Vec<serde_json::Value>,
}

impl<'a> From<&'a AppointmentRequest> for CreateAppointmentBody<'a> {
    fn from(request: &'a AppointmentRequest) -> Self {
        let customer = &request.customer;
        Self {
            first_name: &customer.first_name,
            last_name: &customer.last_name,
            email: &customer.email,
            phone: &customer.phone,
            location: &customer.location,
            needs_transport: customer.needs_transport,
            is_returning: customer.is_returning,
            appointment_date: request.date.format("%Y-%m-%d").to_string(),
            appointment_time: &request.time_slot,
            notes: request.notes.as_deref().unwrap_or(""),
            clients: request
                .clients
                .iter()
                .enumerate()
                .map(|(i, client)| ClientBody {
                    client_number: i + 1,
                    service_id: wire_id(&client.service_id),
                    add_on_ids: client.add_on_ids.iter().map(|id| wire_id(id)).collect(),
                })
                .collect(),
        }
    }
}

/// 數字 id 以數字送出，其餘原樣
fn wire_id(id: &str) -> serde_json::Value {
    match id.parse::<i64>() {
        Ok(n) => serde_json::Value::from(n),
        Err(_) => serde_json::Value::from(id),
    }
}

/// [`BookingApi`] over the booking backend's REST endpoints.
#[derive(Debug, Clone)]
pub struct HttpBookingApi {
    client: Client,
    base_url: String,
}

impl HttpBookingApi {
    pub fn new<C: ConfigProvider + ?Sized>(config: &C) -> Result<Self> {
        let client = Client::builder().timeout(config.request_timeout()).build()?;
        Ok(Self::with_client(client, config.api_base_url()))
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = self.url(path);
        tracing::debug!("GET {}", url);
        let response = self.client.get(&url).query(query).send().await?;
        handle_response(response).await
    }
}

async fn handle_response<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    tracing::debug!("API response status: {}", status);

    let body = response.bytes().await?;
    if !status.is_success() {
        return Err(BookingError::ApiResponseError {
            status: status.as_u16(),
            message: error_message(&body),
        });
    }

    Ok(serde_json::from_slice(&body)?)
}

/// 後端錯誤格式為 `{"error": ...}` 或 DRF 的 `{"detail": ...}`
fn error_message(body: &[u8]) -> String {
    let parsed: Option<serde_json::Value> = serde_json::from_slice(body).ok();
    parsed
        .as_ref()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.as_str())
                .or_else(|| v.get("detail").and_then(|d| d.as_str()))
        })
        .unwrap_or("Request failed")
        .to_string()
}

#[async_trait]
impl BookingApi for HttpBookingApi {
    async fn list_services(&self) -> Result<Vec<Service>> {
        self.get("services/", &[]).await
    }

    async fn list_add_ons(&self) -> Result<Vec<AddOn>> {
        self.get("addons/", &[]).await
    }

    async fn list_business_hours(&self) -> Result<Vec<BusinessHours>> {
        self.get("business-hours/", &[]).await
    }

    async fn list_available_slots(&self, date: NaiveDate) -> Result<Vec<TimeSlot>> {
        let response: AvailableSlotsResponse = self
            .get(
                "appointments/available_slots/",
                &[("date", date.format("%Y-%m-%d").to_string())],
            )
            .await?;
        Ok(response.slots)
    }

    async fn create_appointment(
        &self,
        request: &AppointmentRequest,
    ) -> Result<AppointmentConfirmation> {
        let url = self.url("appointments/");
        tracing::debug!("POST {}", url);
        let body = CreateAppointmentBody::from(request);
        let response = self.client.post(&url).json(&body).send().await?;
        handle_response(response).await
    }

    async fn find_appointment(&self, confirmation_code: &str) -> Result<AppointmentConfirmation> {
        self.get(
            "appointments/by_confirmation/",
            &[("code", confirmation_code.to_string())],
        )
        .await
    }
}
