//! Environment-driven settings for the storefront cart endpoints.

use std::time::Duration;

use crate::{config::CartCookieConfig, error::ConfigError, secret::SessionSecret};

pub const STORE_DOMAIN_VAR: &str = "SHOPIFY_STORE_DOMAIN";
pub const ACCESS_TOKEN_VAR: &str = "SHOPIFY_STOREFRONT_API_TOKEN";
pub const API_VERSION_VAR: &str = "SHOPIFY_STOREFRONT_API_VERSION";
pub const REQUEST_TIMEOUT_VAR: &str = "SHOPIFY_REQUEST_TIMEOUT_SECS";
pub const APP_ENV_VAR: &str = "APP_ENV";

pub const DEFAULT_API_VERSION: &str = "2024-10";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("production") || v.eq_ignore_ascii_case("prod") => {
                Self::Production
            }
            _ => Self::Development,
        }
    }

    pub fn is_production(self) -> bool {
        self == Self::Production
    }
}

/// Connection details for the storefront GraphQL API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorefrontSettings {
    pub store_domain: String,
    pub access_token: String,
    pub api_version: String,
    pub request_timeout: Option<Duration>,
}

impl StorefrontSettings {
    pub fn endpoint(&self) -> String {
        format!(
            "https://{}/api/{}/graphql.json",
            self.store_domain, self.api_version
        )
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub secret: SessionSecret,
    pub storefront: StorefrontSettings,
    pub environment: Environment,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build settings from an arbitrary variable lookup, so tests never touch the process
    /// environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let secret = SessionSecret::from_lookup(&lookup)?;
        let store_domain = var(STORE_DOMAIN_VAR).ok_or(ConfigError::Missing(STORE_DOMAIN_VAR))?;
        let access_token = var(ACCESS_TOKEN_VAR).ok_or(ConfigError::Missing(ACCESS_TOKEN_VAR))?;
        let api_version = var(API_VERSION_VAR).unwrap_or_else(|| DEFAULT_API_VERSION.to_owned());

        let request_timeout = var(REQUEST_TIMEOUT_VAR)
            .map(|raw| {
                raw.trim()
                    .parse::<u64>()
                    .map(Duration::from_secs)
                    .map_err(|err| ConfigError::Invalid {
                        name: REQUEST_TIMEOUT_VAR,
                        reason: err.to_string(),
                    })
            })
            .transpose()?;

        Ok(Self {
            secret,
            storefront: StorefrontSettings {
                store_domain: store_domain.trim().to_owned(),
                access_token,
                api_version,
                request_timeout,
            },
            environment: Environment::parse(var(APP_ENV_VAR).as_deref()),
        })
    }

    /// Cookie attributes for this environment: `Secure` only in production.
    pub fn cookie_config(&self) -> CartCookieConfig {
        CartCookieConfig::default().with_secure(self.environment.is_production())
    }
}
