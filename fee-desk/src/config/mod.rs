use crate::services::{CollectionRules, DiscountMode, SubmissionPolicy};
use desk_core::error::AppError;
use secrecy::Secret;
use serde::Deserialize;

#[derive(Deserialize, Clone, Debug)]
pub struct Settings {
    pub server: ServerSettings,
    pub fee_api: FeeApiSettings,
    #[serde(default)]
    pub collection: CollectionSettings,
    pub telemetry: TelemetrySettings,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Deserialize, Clone, Debug)]
pub struct FeeApiSettings {
    /// Base URL of the fee API, e.g. `http://fee-api:8080/api`.
    pub base_url: String,
    /// Service token, used when the caller forwards none.
    #[serde(default)]
    pub api_token: Option<Secret<String>>,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_timeout_seconds() -> u64 {
    10
}

#[derive(Deserialize, Clone, Debug)]
pub struct CollectionSettings {
    #[serde(default)]
    pub submission_policy: SubmissionPolicy,
    #[serde(default)]
    pub discount_mode: DiscountMode,
    /// Zero disables caching of fee records and discounts.
    #[serde(default = "default_cache_ttl_seconds")]
    pub cache_ttl_seconds: u64,
}

fn default_cache_ttl_seconds() -> u64 {
    30
}

impl Default for CollectionSettings {
    fn default() -> Self {
        Self {
            submission_policy: SubmissionPolicy::default(),
            discount_mode: DiscountMode::default(),
            cache_ttl_seconds: default_cache_ttl_seconds(),
        }
    }
}

impl CollectionSettings {
    pub fn rules(&self) -> CollectionRules {
        CollectionRules {
            submission_policy: self.submission_policy,
            discount_mode: self.discount_mode,
        }
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct TelemetrySettings {
    #[serde(default = "default_service_name")]
    pub service_name: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

fn default_service_name() -> String {
    "fee-desk".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

pub fn get_configuration() -> Result<Settings, AppError> {
    let directory = desk_core::config::configuration_directory("fee-desk")?;
    desk_core::config::load_settings(&directory)
}
