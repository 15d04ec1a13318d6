//! Notifier configuration options.

use crate::notification::Timeout;

/// Application name used when neither the options nor the executable name
/// provide one.
pub const FALLBACK_APP_NAME: &str = "desktop-notify";

/// Process-wide defaults applied to every notification of a
/// [`crate::Notifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifierOptions {
    /// Application name sent when a notification does not override it.
    pub app_name: String,

    /// Timeout given to notifications created through the notifier.
    pub default_timeout: Timeout,

    /// D-Bus address to connect to instead of the session bus.
    pub bus_address: Option<String>,
}

impl Default for NotifierOptions {
    fn default() -> Self {
        Self {
            app_name: executable_name().unwrap_or_else(|| FALLBACK_APP_NAME.to_string()),
            default_timeout: Timeout::Default,
            bus_address: None,
        }
    }
}

impl NotifierOptions {
    /// Create options with sensible defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set the default application name. Empty names are ignored.
    pub fn with_app_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !name.trim().is_empty() {
            self.app_name = name;
        }
        self
    }

    /// Builder: set the default timeout.
    pub fn with_default_timeout(mut self, timeout: Timeout) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Builder: connect to a specific bus address.
    pub fn with_bus_address(mut self, address: impl Into<String>) -> Self {
        self.bus_address = Some(address.into());
        self
    }
}

/// File stem of the running executable.
fn executable_name() -> Option<String> {
    let exe = std::env::current_exe().ok()?;
    let stem = exe.file_stem()?.to_str()?;
    (!stem.is_empty()).then(|| stem.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let opts = NotifierOptions::default();
        assert!(!opts.app_name.is_empty());
        assert_eq!(opts.default_timeout, Timeout::Default);
        assert!(opts.bus_address.is_none());
    }

    #[test]
    fn test_builder_chain() {
        let opts = NotifierOptions::new()
            .with_app_name("builder")
            .with_default_timeout(Timeout::Milliseconds(4000))
            .with_bus_address("unix:path=/tmp/bus");

        assert_eq!(opts.app_name, "builder");
        assert_eq!(opts.default_timeout, Timeout::Milliseconds(4000));
        assert_eq!(opts.bus_address.as_deref(), Some("unix:path=/tmp/bus"));
    }

    #[test]
    fn test_blank_app_name_is_ignored() {
        let opts = NotifierOptions::new().with_app_name("keep").with_app_name("  ");
        assert_eq!(opts.app_name, "keep");
    }
}
