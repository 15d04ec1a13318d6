//! Setting value validation.

use super::{APP_NAME_KEY, BUS_ADDRESS_KEY, TIMEOUT_MS_KEY};

/// Longest accepted timeout: one hour.
const MAX_TIMEOUT_MS: i32 = 3_600_000;

/// Validate a setting value. Returns `Ok(())` if valid, or an error message.
pub fn validate_setting(key: &str, value: &str) -> Result<(), String> {
    match key {
        APP_NAME_KEY => {
            let len = value.trim().chars().count();
            if len == 0 || len > 255 {
                return Err("app name must be 1-255 characters".into());
            }
        }
        TIMEOUT_MS_KEY => validate_int_range(value, -1, MAX_TIMEOUT_MS)?,
        BUS_ADDRESS_KEY => {
            let Some((transport, params)) = value.split_once(':') else {
                return Err("expected a D-Bus address like 'unix:path=/run/bus'".into());
            };
            if transport.is_empty() || !params.contains('=') {
                return Err("expected a D-Bus address like 'unix:path=/run/bus'".into());
            }
        }
        _ => {}
    }
    Ok(())
}

fn validate_int_range(value: &str, min: i32, max: i32) -> Result<(), String> {
    let v: i32 = value.parse().map_err(|_| "must be an integer")?;
    if v < min || v > max {
        return Err(format!("must be between {min} and {max}"));
    }
    Ok(())
}
