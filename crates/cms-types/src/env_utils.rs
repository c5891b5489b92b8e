//! Environment variable parsing utilities.
//!
//! Configuration in this workspace is read from `CONTENTFUL_*` and `CMS_*`
//! variables. These helpers replace the repeated pattern:
//!
//! ```ignore
//! std::env::var("VAR_NAME")
//!     .ok()
//!     .and_then(|v| v.parse::<u64>().ok())
//!     .unwrap_or(default_value)
//! ```
//!
//! # Example
//!
//! ```
//! use cms_pages_types::env_utils::{env_var, env_var_or};
//!
//! let max_ids: usize = env_var_or("CMS_MAX_IDS_PER_BATCH", 50);
//! let timeout: Option<u64> = env_var("CMS_REQUEST_TIMEOUT_SECS");
//! ```

use std::str::FromStr;

/// Parse an environment variable into a type that implements `FromStr`.
///
/// Returns `None` if the variable is not set or cannot be parsed.
pub fn env_var<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

/// Parse an environment variable with a default value.
pub fn env_var_or<T: FromStr>(key: &str, default: T) -> T {
    env_var(key).unwrap_or(default)
}

/// Truthy check with a default for unset variables.
///
/// "1", "true", "yes" and "on" (case-insensitive) are truthy.
pub fn env_bool_or(key: &str, default: bool) -> bool {
    match std::env::var(key).ok() {
        Some(v) => matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        None => default,
    }
}

/// Get an environment variable as a string with a default value.
pub fn env_string_or(key: &str, default: &str) -> String {
    env_nonempty(key).unwrap_or_else(|| default.to_string())
}

/// Get an environment variable, treating blank values as unset.
pub fn env_nonempty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_var_parsing() {
        std::env::set_var("CMS_TEST_U64", " 42 ");
        let val: Option<u64> = env_var("CMS_TEST_U64");
        assert_eq!(val, Some(42));

        let missing: Option<u64> = env_var("CMS_NONEXISTENT_VAR_1");
        assert_eq!(missing, None);

        std::env::remove_var("CMS_TEST_U64");
    }

    #[test]
    fn test_env_var_or_falls_back_on_garbage() {
        std::env::set_var("CMS_TEST_GARBAGE", "fifty");
        let val: usize = env_var_or("CMS_TEST_GARBAGE", 50);
        assert_eq!(val, 50);
        std::env::remove_var("CMS_TEST_GARBAGE");
    }

    #[test]
    fn test_env_bool_or() {
        std::env::set_var("CMS_TEST_BOOL_YES", "YES");
        std::env::set_var("CMS_TEST_BOOL_OFF", "off");

        assert!(env_bool_or("CMS_TEST_BOOL_YES", false));
        assert!(!env_bool_or("CMS_TEST_BOOL_OFF", true));
        assert!(env_bool_or("CMS_NONEXISTENT_VAR_2", true));

        std::env::remove_var("CMS_TEST_BOOL_YES");
        std::env::remove_var("CMS_TEST_BOOL_OFF");
    }

    #[test]
    fn test_blank_string_is_unset() {
        std::env::set_var("CMS_TEST_BLANK", "   ");
        assert_eq!(env_nonempty("CMS_TEST_BLANK"), None);
        assert_eq!(env_string_or("CMS_TEST_BLANK", "master"), "master");
        std::env::remove_var("CMS_TEST_BLANK");
    }
}
