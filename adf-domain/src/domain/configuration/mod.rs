use crate::ExtractionError;
use envconfig::Envconfig;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::{
    fmt::{Display, Formatter},
    time::Duration,
};

pub const DEFAULT_AUTHORITY_URL: &str = "https://login.microsoftonline.com";
pub const DEFAULT_MANAGEMENT_URL: &str = "https://management.azure.com";
pub const DEFAULT_PROJECT: &str = "default";

fn default_project() -> String {
    DEFAULT_PROJECT.to_owned()
}

fn default_authority_url() -> String {
    DEFAULT_AUTHORITY_URL.to_owned()
}

fn default_management_url() -> String {
    DEFAULT_MANAGEMENT_URL.to_owned()
}

fn default_token_timeout_secs() -> u64 {
    30
}

fn default_request_timeout_secs() -> u64 {
    60
}

#[derive(Envconfig, Deserialize, Clone)] // Intentionally no Debug so secret is not printed
pub struct AdfConnectionConfig {
    #[envconfig(from = "ADF_SUBSCRIPTION_ID")]
    pub subscription_id: String,
    #[envconfig(from = "ADF_RESOURCE_GROUP")]
    pub resource_group: String,
    #[envconfig(from = "ADF_FACTORY_NAME")]
    pub factory_name: String,
    #[envconfig(from = "ADF_TENANT_ID")]
    pub tenant_id: String,
    #[envconfig(from = "ADF_CLIENT_ID")]
    pub client_id: String,
    #[envconfig(from = "ADF_CLIENT_SECRET")]
    pub client_secret: String,
    #[envconfig(from = "ADF_SERVICE_NAME")]
    pub service_name: String,
    #[envconfig(from = "ADF_PROJECT", default = "default")]
    #[serde(default = "default_project")]
    pub project: String,
    #[envconfig(from = "ADF_AUTHORITY_URL", default = "https://login.microsoftonline.com")]
    #[serde(default = "default_authority_url")]
    pub authority_url: String,
    #[envconfig(from = "ADF_MANAGEMENT_URL", default = "https://management.azure.com")]
    #[serde(default = "default_management_url")]
    pub management_url: String,
    #[envconfig(from = "ADF_TOKEN_TIMEOUT_SECS", default = "30")]
    #[serde(default = "default_token_timeout_secs")]
    pub token_timeout_secs: u64,
    #[envconfig(from = "ADF_REQUEST_TIMEOUT_SECS", default = "60")]
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl AdfConnectionConfig {
    /// Builds the configuration from a host-supplied connection options map,
    /// keyed by the snake_case option names.
    pub fn from_options(options: &Map<String, Value>) -> Result<Self, ExtractionError> {
        let config: Self = serde_json::from_value(Value::Object(options.clone()))
            .map_err(|err| ExtractionError::configuration_error(&err.to_string(), None))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<&Self, ExtractionError> {
        let required = [
            ("subscription_id", &self.subscription_id),
            ("resource_group", &self.resource_group),
            ("factory_name", &self.factory_name),
            ("tenant_id", &self.tenant_id),
            ("client_id", &self.client_id),
            ("client_secret", &self.client_secret),
            ("service_name", &self.service_name),
        ];

        if let Some((key, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(ExtractionError::configuration_error(
                &format!("Missing required connection option: {key}"),
                Some(*key),
            ));
        }

        Ok(self)
    }

    pub fn token_timeout(&self) -> Duration {
        Duration::from_secs(self.token_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Display for AdfConnectionConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "ADF_SUBSCRIPTION_ID: {}", self.subscription_id)?;
        writeln!(f, "ADF_RESOURCE_GROUP: {}", self.resource_group)?;
        writeln!(f, "ADF_FACTORY_NAME: {}", self.factory_name)?;
        writeln!(f, "ADF_TENANT_ID: {}", self.tenant_id)?;
        writeln!(f, "ADF_CLIENT_ID: {}", self.client_id)?;
        writeln!(f, "ADF_CLIENT_SECRET: ****")?;
        writeln!(f, "ADF_SERVICE_NAME: {}", self.service_name)?;
        writeln!(f, "ADF_PROJECT: {}", self.project)?;
        writeln!(f, "ADF_AUTHORITY_URL: {}", self.authority_url)?;
        writeln!(f, "ADF_MANAGEMENT_URL: {}", self.management_url)?;
        writeln!(f, "ADF_TOKEN_TIMEOUT_SECS: {}", self.token_timeout_secs)?;
        writeln!(f, "ADF_REQUEST_TIMEOUT_SECS: {}", self.request_timeout_secs)
    }
}
