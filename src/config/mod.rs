#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

pub use toml_config::{ApiConfig, BookingConfig, BookingRules};

use crate::utils::error::Result;
use std::path::Path;

/// 載入配置：有檔案讀檔案，否則使用預設值；最後套用環境變數覆蓋
pub fn load_config(path: Option<&Path>) -> Result<BookingConfig> {
    let config = match path {
        Some(path) => {
            tracing::debug!("📁 Loading configuration from: {}", path.display());
            BookingConfig::from_file(path)?
        }
        None => BookingConfig::default(),
    };
    Ok(config.apply_env_overrides())
}
