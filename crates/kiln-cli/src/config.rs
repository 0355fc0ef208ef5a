//! CLI configuration via environment variables
//!
//! Kiln uses environment variables for optional output preferences.
//! Project and toolchain settings live in kiln-config.

use std::env;

/// CLI configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Default to JSON output (KILN_JSON=1)
    pub default_json: bool,
    /// Disable colored output (KILN_NO_COLOR=1 or NO_COLOR=1)
    pub no_color: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            default_json: env::var("KILN_JSON").map(|v| is_truthy(&v)).unwrap_or(false),
            no_color: env::var_os("KILN_NO_COLOR").is_some() || env::var_os("NO_COLOR").is_some(),
        }
    }

    /// Apply the color preference to all `colored` output
    pub fn apply_color(&self) {
        if self.no_color {
            colored::control::set_override(false);
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

fn is_truthy(value: &str) -> bool {
    let lower = value.trim().to_lowercase();
    !(lower.is_empty() || lower == "0" || lower == "false" || lower == "off")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_config_defaults() {
        env::remove_var("KILN_JSON");
        env::remove_var("KILN_NO_COLOR");
        env::remove_var("NO_COLOR");

        let config = Config::from_env();
        assert!(!config.default_json);
        assert!(!config.no_color);
    }

    #[test]
    #[serial]
    fn test_config_json() {
        env::set_var("KILN_JSON", "1");
        assert!(Config::from_env().default_json);
        env::set_var("KILN_JSON", "false");
        assert!(!Config::from_env().default_json);
        env::remove_var("KILN_JSON");
    }

    #[test]
    #[serial]
    fn test_config_no_color() {
        env::set_var("KILN_NO_COLOR", "1");
        assert!(Config::from_env().no_color);
        env::remove_var("KILN_NO_COLOR");

        // Also test NO_COLOR (standard)
        env::set_var("NO_COLOR", "1");
        assert!(Config::from_env().no_color);
        env::remove_var("NO_COLOR");
    }
}
