use crate::domain::model::{AddOn, BusinessHours, Service, ServiceCategory};
use crate::domain::ports::BookingApi;
use crate::utils::error::{BookingError, Result};
use chrono::{Datelike, NaiveDate};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    pub services: Vec<Service>,
    pub add_ons: Vec<AddOn>,
    pub business_hours: Vec<BusinessHours>,
}

impl Catalog {
    pub fn service(&self, id: &str) -> Result<&Service> {
        self.services
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| BookingError::UnknownCatalogItem {
                kind: "service",
                id: id.to_string(),
            })
    }

    pub fn add_on(&self, id: &str) -> Result<&AddOn> {
        self.add_ons
            .iter()
            .find(|a| a.id == id)
            .ok_or_else(|| BookingError::UnknownCatalogItem {
                kind: "add-on",
                id: id.to_string(),
            })
    }

    pub fn services_in(&self, category: ServiceCategory) -> impl Iterator<Item = &Service> {
        self.services.iter().filter(move |s| s.category == category)
    }

    /// 沒有該星期的營業時間資料時視為營業，由後端判斷
    pub fn is_open_on(&self, date: NaiveDate) -> bool {
        let weekday = date.weekday().num_days_from_monday() as u8;
        self.business_hours
            .iter()
            .find(|h| h.weekday == weekday)
            .map(|h| h.is_open)
            .unwrap_or(true)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum CatalogState {
    #[default]
    NotLoaded,
    Ready(Catalog),
    Failed {
        message: String,
    },
}

impl CatalogState {
    pub fn catalog(&self) -> Option<&Catalog> {
        match self {
            CatalogState::Ready(catalog) => Some(catalog),
            _ => None,
        }
    }
}

/// Fetches services and add-ons; business hours are optional and a failure
/// there only disables the closed-day check.
pub async fn load_catalog<A: BookingApi + ?Sized>(api: &A) -> Result<Catalog> {
    let services = api.list_services().await?;
    let add_ons = api.list_add_ons().await?;

    let business_hours = match api.list_business_hours().await {
        Ok(hours) => hours,
        Err(e) => {
            tracing::warn!(error = %e, "business hours unavailable, skipping closed-day check");
            Vec::new()
        }
    };

    tracing::debug!(
        services = services.len(),
        add_ons = add_ons.len(),
        "catalog loaded"
    );

    Ok(Catalog {
        services,
        add_ons,
        business_hours,
    })
}
