use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use uuid::Uuid;

pub const CLIENT_LABEL_PREFIX: &str = "Client";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceCategory {
    Classic,
    Volume,
    Hybrid,
    Mega,
}

impl ServiceCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Classic => "classic",
            Self::Volume => "volume",
            Self::Hybrid => "hybrid",
            Self::Mega => "mega",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    #[serde(deserialize_with = "lenient_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub duration: u32,
    #[serde(deserialize_with = "lenient_price")]
    pub price: Decimal,
    pub category: ServiceCategory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddOn {
    #[serde(deserialize_with = "lenient_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub duration: u32,
    #[serde(deserialize_with = "lenient_price")]
    pub price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub time: String,
    pub available: bool,
}

/// 營業時間；weekday 0 = 星期一
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessHours {
    pub weekday: u8,
    pub is_open: bool,
    #[serde(default)]
    pub open_time: Option<String>,
    #[serde(default)]
    pub close_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub needs_transport: bool,
    pub is_returning: bool,
    pub notes: Option<String>,
}

impl CustomerDetails {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClientId(Uuid);

impl ClientId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "client-{}", self.0)
    }
}

/// One person's slot in a booking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientSelection {
    pub id: ClientId,
    pub label: String,
    pub service: Option<Service>,
    pub add_ons: Vec<AddOn>,
}

impl ClientSelection {
    /// `position` is 1-based.
    pub fn new(position: usize) -> Self {
        Self {
            id: ClientId::generate(),
            label: client_label(position),
            service: None,
            add_ons: Vec::new(),
        }
    }

    pub fn has_add_on(&self, add_on_id: &str) -> bool {
        self.add_ons.iter().any(|a| a.id == add_on_id)
    }
}

pub fn client_label(position: usize) -> String {
    format!("{} {}", CLIENT_LABEL_PREFIX, position)
}

/// Response of the appointment creation and lookup endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentConfirmation {
    #[serde(alias = "confirmationCode")]
    pub confirmation_code: String,
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_optional_price")]
    pub total_price: Option<Decimal>,
    #[serde(default)]
    pub total_duration: Option<u32>,
    #[serde(default)]
    pub appointment_date: Option<String>,
    #[serde(default)]
    pub appointment_time: Option<String>,
}

/// 後端的 id 可能是數字也可能是字串
pub(crate) fn lenient_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {}",
            other
        ))),
    }
}

pub(crate) fn lenient_ids<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Vec::<serde_json::Value>::deserialize(deserializer)?;
    values
        .into_iter()
        .map(|value| match value {
            serde_json::Value::String(s) => Ok(s),
            serde_json::Value::Number(n) => Ok(n.to_string()),
            other => Err(serde::de::Error::custom(format!(
                "expected string or number id, got {}",
                other
            ))),
        })
        .collect()
}

fn lenient_price<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(price_from_value(&value))
}

fn lenient_optional_price<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(price_from_value))
}

fn price_from_value(value: &serde_json::Value) -> Decimal {
    match value {
        serde_json::Value::Number(n) => crate::core::totals::parse_price(&n.to_string()),
        serde_json::Value::String(s) => crate::core::totals::parse_price(s),
        _ => Decimal::ZERO,
    }
}
