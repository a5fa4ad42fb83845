//! Environment variable parsing for harness configuration.
//!
//! Every harness knob can be overridden from the environment with an
//! `ORACLE_HARNESS_` prefixed variable, e.g. `ORACLE_HARNESS_EPOCH=7`.

use std::str::FromStr;

/// Prefix shared by all harness environment variables.
pub const ENV_PREFIX: &str = "ORACLE_HARNESS_";

/// Full variable name for a harness setting (`"EPOCH"` -> `"ORACLE_HARNESS_EPOCH"`).
pub fn harness_key(name: &str) -> String {
    format!("{}{}", ENV_PREFIX, name)
}

/// Parse an environment variable into a type that implements `FromStr`.
///
/// Returns `None` if the variable is not set or cannot be parsed.
pub fn env_var<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

/// Parse a boolean flag. Accepts "1", "true", "yes", "on" and their negatives
/// "0", "false", "no", "off" (case-insensitive); anything else is `None`.
pub fn env_flag(key: &str) -> Option<bool> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_harness_key() {
        assert_eq!(harness_key("EPOCH"), "ORACLE_HARNESS_EPOCH");
    }

    #[test]
    fn test_env_var_parsing() {
        std::env::set_var("ORACLE_TYPES_TEST_U64", " 42 ");
        assert_eq!(env_var::<u64>("ORACLE_TYPES_TEST_U64"), Some(42));
        assert_eq!(env_var::<u64>("ORACLE_TYPES_TEST_MISSING_1"), None);
        std::env::remove_var("ORACLE_TYPES_TEST_U64");
    }

    #[test]
    fn test_env_flag() {
        std::env::set_var("ORACLE_TYPES_TEST_FLAG_ON", "YES");
        std::env::set_var("ORACLE_TYPES_TEST_FLAG_OFF", "off");
        std::env::set_var("ORACLE_TYPES_TEST_FLAG_BAD", "maybe");

        assert_eq!(env_flag("ORACLE_TYPES_TEST_FLAG_ON"), Some(true));
        assert_eq!(env_flag("ORACLE_TYPES_TEST_FLAG_OFF"), Some(false));
        assert_eq!(env_flag("ORACLE_TYPES_TEST_FLAG_BAD"), None);
        assert_eq!(env_flag("ORACLE_TYPES_TEST_FLAG_MISSING"), None);

        std::env::remove_var("ORACLE_TYPES_TEST_FLAG_ON");
        std::env::remove_var("ORACLE_TYPES_TEST_FLAG_OFF");
        std::env::remove_var("ORACLE_TYPES_TEST_FLAG_BAD");
    }
}
