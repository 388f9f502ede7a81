use crate::core::totals::{parse_price, DEFAULT_CURRENCY_SYMBOL, DEFAULT_TRANSPORT_FEE};
use crate::core::wizard::DEFAULT_MAX_CLIENTS;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{BookingError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000/api";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
pub const API_URL_ENV: &str = "BOOKING_API_URL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub booking: BookingRules,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingRules {
    /// Flat per-booking fee; accepts `2`, `2.5` or `"2.00"`.
    #[serde(default)]
    pub transport_fee: Option<toml::Value>,
    /// `0` disables the cap.
    #[serde(default = "default_max_clients")]
    pub max_clients: Option<usize>,
    #[serde(default)]
    pub currency_symbol: Option<String>,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_timeout_seconds() -> u64 {
    DEFAULT_TIMEOUT_SECONDS
}

fn default_max_clients() -> Option<usize> {
    Some(DEFAULT_MAX_CLIENTS)
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_url(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

impl Default for BookingRules {
    fn default() -> Self {
        Self {
            transport_fee: None,
            max_clients: default_max_clients(),
            currency_symbol: None,
        }
    }
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            booking: BookingRules::default(),
        }
    }
}

impl BookingConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(BookingError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| BookingError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${API_HOST})，找不到的保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| BookingError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// `BOOKING_API_URL` 優先於檔案設定
    pub fn apply_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                self.api.base_url = url;
            }
        }
        self
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api.base_url = url.into();
        self
    }

    pub fn currency_symbol(&self) -> &str {
        self.booking
            .currency_symbol
            .as_deref()
            .unwrap_or(DEFAULT_CURRENCY_SYMBOL)
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("api.base_url", &self.api.base_url)?;
        validation::validate_positive_number("api.timeout_seconds", self.api.timeout_seconds, 1)?;

        if let Some(symbol) = &self.booking.currency_symbol {
            validation::validate_non_empty_string("booking.currency_symbol", symbol)?;
        }

        if let Some(fee) = &self.booking.transport_fee {
            let parsed = fee_from_toml(fee).ok_or_else(|| BookingError::InvalidConfigValueError {
                field: "booking.transport_fee".to_string(),
                value: fee.to_string(),
                reason: "Transport fee must be a non-negative amount".to_string(),
            })?;
            if parsed.is_sign_negative() {
                return Err(BookingError::InvalidConfigValueError {
                    field: "booking.transport_fee".to_string(),
                    value: fee.to_string(),
                    reason: "Transport fee must be a non-negative amount".to_string(),
                });
            }
        }

        Ok(())
    }
}

fn fee_from_toml(value: &toml::Value) -> Option<Decimal> {
    match value {
        toml::Value::Integer(i) => Some(Decimal::from(*i)),
        toml::Value::Float(f) => Some(parse_price(&f.to_string())),
        toml::Value::String(s) => {
            let trimmed = s.trim();
            let parsed = parse_price(trimmed);
            // parse_price 對無法解析的字串回傳 0，這裡要分辨真正的 "0"
            if parsed.is_zero() && !trimmed.trim_start_matches(['0', '.']).is_empty() {
                None
            } else {
                Some(parsed)
            }
        }
        _ => None,
    }
}

impl ConfigProvider for BookingConfig {
    fn api_base_url(&self) -> &str {
        &self.api.base_url
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_seconds)
    }

    fn transport_fee(&self) -> Decimal {
        self.booking
            .transport_fee
            .as_ref()
            .and_then(fee_from_toml)
            .unwrap_or(DEFAULT_TRANSPORT_FEE)
    }

    fn max_clients(&self) -> Option<usize> {
        match self.booking.max_clients {
            Some(0) | None => None,
            Some(max) => Some(max),
        }
    }
}

impl Validate for BookingConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
