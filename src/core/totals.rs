use crate::domain::model::ClientSelection;
use rust_decimal::Decimal;
use serde::Serialize;
use std::str::FromStr;

pub const DEFAULT_TRANSPORT_FEE: Decimal = Decimal::from_parts(200, 0, 0, false, 2);
pub const DEFAULT_CURRENCY_SYMBOL: &str = "$";

/// 數字字串轉金額，無法解析時視為 0
pub fn parse_price(raw: &str) -> Decimal {
    let trimmed = raw.trim();
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .unwrap_or(Decimal::ZERO)
}

pub fn client_price(client: &ClientSelection) -> Decimal {
    let service = client.service.as_ref().map(|s| s.price).unwrap_or_default();
    let add_ons: Decimal = client.add_ons.iter().map(|a| a.price).sum();
    service + add_ons
}

pub fn client_duration(client: &ClientSelection) -> u32 {
    let service = client.service.as_ref().map(|s| s.duration).unwrap_or(0);
    let add_ons: u32 = client.add_ons.iter().map(|a| a.duration).sum();
    service + add_ons
}

/// Sum of every client's service and add-ons plus the flat transport fee,
/// which is charged once per booking.
pub fn total_price(clients: &[ClientSelection], transport_fee: Decimal) -> Decimal {
    clients.iter().map(client_price).sum::<Decimal>() + transport_fee
}

pub fn total_duration(clients: &[ClientSelection]) -> u32 {
    clients.iter().map(client_duration).sum()
}

pub fn format_duration(minutes: u32) -> String {
    let hours = minutes / 60;
    let remaining = minutes % 60;

    if hours == 0 {
        return format!("{}m", minutes);
    }
    if remaining == 0 {
        return format!("{}h", hours);
    }
    format!("{}h {}m", hours, remaining)
}

pub fn format_currency(amount: Decimal) -> String {
    format_currency_with(amount, DEFAULT_CURRENCY_SYMBOL)
}

pub fn format_currency_with(amount: Decimal, symbol: &str) -> String {
    format!("{}{:.2}", symbol, amount.round_dp(2))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientSummaryLine {
    pub label: String,
    pub service_name: Option<String>,
    pub add_on_names: Vec<String>,
    pub price: Decimal,
    pub duration: u32,
}

/// Review-step breakdown of a booking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookingSummary {
    pub lines: Vec<ClientSummaryLine>,
    pub transport_fee: Decimal,
    pub total_price: Decimal,
    pub total_duration: u32,
}

impl BookingSummary {
    pub fn from_clients(clients: &[ClientSelection], transport_fee: Decimal) -> Self {
        let lines = clients
            .iter()
            .map(|client| ClientSummaryLine {
                label: client.label.clone(),
                service_name: client.service.as_ref().map(|s| s.name.clone()),
                add_on_names: client.add_ons.iter().map(|a| a.name.clone()).collect(),
                price: client_price(client),
                duration: client_duration(client),
            })
            .collect();

        Self {
            lines,
            transport_fee,
            total_price: total_price(clients, transport_fee),
            total_duration: total_duration(clients),
        }
    }

    pub fn render(&self, currency_symbol: &str) -> String {
        let mut out = String::new();
        for line in &self.lines {
            out.push_str(&format!(
                "{}: {} ({}) {}\n",
                line.label,
                line.service_name.as_deref().unwrap_or("no service"),
                format_duration(line.duration),
                format_currency_with(line.price, currency_symbol)
            ));
            for name in &line.add_on_names {
                out.push_str(&format!("  + {}\n", name));
            }
        }
        out.push_str(&format!(
            "Transport: {}\n",
            format_currency_with(self.transport_fee, currency_symbol)
        ));
        out.push_str(&format!(
            "Total: {} ({})",
            format_currency_with(self.total_price, currency_symbol),
            format_duration(self.total_duration)
        ));
        out
    }
}
