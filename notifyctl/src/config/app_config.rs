//! Runtime configuration loaded from `.env` + environment.

use std::collections::HashMap;
use std::path::Path;

use desktop_notify::{NotifierOptions, Timeout};

use super::validation::validate_setting;
use super::{APP_NAME_KEY, BUS_ADDRESS_KEY, TIMEOUT_MS_KEY, load_dotenv};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppConfig {
    /// `None` keeps the executable-derived default.
    pub app_name: Option<String>,
    pub timeout: Timeout,
    pub bus_address: Option<String>,
}

impl AppConfig {
    /// Load `.env` (if any) and read the process environment.
    pub fn load() -> Self {
        load_dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings from an explicit `.env` file, ignoring the environment.
    pub fn from_env_file(path: &Path) -> Result<Self, anyhow::Error> {
        let mut values = HashMap::new();
        for item in dotenvy::from_path_iter(path)? {
            let (key, value) = item?;
            values.insert(key, value);
        }
        Ok(Self::from_lookup(|key| values.get(key).cloned()))
    }

    /// Build the configuration from a key lookup. Invalid values are logged
    /// and replaced by their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| -> Option<String> {
            let value = lookup(key)?;
            if value.is_empty() {
                return None;
            }
            match validate_setting(key, &value) {
                Ok(()) => Some(value),
                Err(e) => {
                    tracing::warn!(key, value = %value, "Ignoring invalid setting: {e}");
                    None
                }
            }
        };

        let timeout = get(TIMEOUT_MS_KEY)
            .and_then(|v| v.parse::<i32>().ok())
            .map(Timeout::from_wire)
            .unwrap_or_default();

        Self {
            app_name: get(APP_NAME_KEY).map(|v| v.trim().to_string()),
            timeout,
            bus_address: get(BUS_ADDRESS_KEY),
        }
    }

    /// Options for the notifier built from this configuration.
    pub fn notifier_options(&self) -> NotifierOptions {
        let mut options = NotifierOptions::new().with_default_timeout(self.timeout);
        if let Some(name) = &self.app_name {
            options = options.with_app_name(name.clone());
        }
        if let Some(address) = &self.bus_address {
            options = options.with_bus_address(address.clone());
        }
        options
    }
}
