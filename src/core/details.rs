//! Customer details form validation.
//!
//! The form is validated as a whole so every failing field is reported at
//! once, keyed by field.

use crate::domain::model::CustomerDetails;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub const MIN_NAME_LENGTH: usize = 2;
pub const MIN_PHONE_LENGTH: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetailsField {
    FirstName,
    LastName,
    Email,
    Phone,
    Location,
}

impl DetailsField {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetailsField::FirstName => "first_name",
            DetailsField::LastName => "last_name",
            DetailsField::Email => "email",
            DetailsField::Phone => "phone",
            DetailsField::Location => "location",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors(BTreeMap<DetailsField, String>);

impl FieldErrors {
    pub fn get(&self, field: DetailsField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (DetailsField, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }

    fn insert(&mut self, field: DetailsField, message: &str) {
        self.0.insert(field, message.to_string());
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .iter()
            .map(|(field, message)| format!("{}: {}", field.as_str(), message))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

/// Raw, unvalidated form input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailsForm {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub needs_transport: bool,
    #[serde(default)]
    pub is_returning: bool,
    #[serde(default)]
    pub notes: Option<String>,
}

impl DetailsForm {
    pub fn validate(&self) -> Result<CustomerDetails, FieldErrors> {
        let mut errors = FieldErrors::default();

        let first_name = self.first_name.trim();
        if first_name.chars().count() < MIN_NAME_LENGTH {
            errors.insert(DetailsField::FirstName, "First name is required");
        }

        let last_name = self.last_name.trim();
        if last_name.chars().count() < MIN_NAME_LENGTH {
            errors.insert(DetailsField::LastName, "Last name is required");
        }

        let email = self.email.trim();
        if !looks_like_email(email) {
            errors.insert(DetailsField::Email, "Please enter a valid email");
        }

        let phone = self.phone.trim();
        if phone.chars().count() < MIN_PHONE_LENGTH {
            errors.insert(DetailsField::Phone, "Please enter a valid phone number");
        }

        let location = self.location.trim();
        if location.is_empty() {
            errors.insert(DetailsField::Location, "Please enter your address");
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        let notes = self
            .notes
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string);

        Ok(CustomerDetails {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            location: location.to_string(),
            needs_transport: self.needs_transport,
            is_returning: self.is_returning,
            notes,
        })
    }
}

impl From<&CustomerDetails> for DetailsForm {
    fn from(details: &CustomerDetails) -> Self {
        Self {
            first_name: details.first_name.clone(),
            last_name: details.last_name.clone(),
            email: details.email.clone(),
            phone: details.phone.clone(),
            location: details.location.clone(),
            needs_transport: details.needs_transport,
            is_returning: details.is_returning,
            notes: details.notes.clone(),
        }
    }
}

fn looks_like_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}
