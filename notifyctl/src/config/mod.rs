//! Configuration management: `.env` loading, environment overrides, validation.

pub mod app_config;
pub mod validation;

pub use app_config::AppConfig;

/// Default application name sent with every notification.
pub const APP_NAME_KEY: &str = "NOTIFYCTL_APP_NAME";

/// Default timeout in milliseconds (`-1` daemon default, `0` never).
pub const TIMEOUT_MS_KEY: &str = "NOTIFYCTL_TIMEOUT_MS";

/// D-Bus address to use instead of the session bus.
pub const BUS_ADDRESS_KEY: &str = "NOTIFYCTL_BUS_ADDRESS";

/// Load .env from multiple candidate paths.
pub fn load_dotenv() {
    let candidates = [".env", "../.env"];
    for path in &candidates {
        if dotenvy::from_filename(path).is_ok() {
            tracing::info!("Loaded .env from: {path}");
            return;
        }
    }
    tracing::debug!("No .env file found, using system environment variables");
}
