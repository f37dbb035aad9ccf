//! `${VAR}` expansion for configuration strings.

use crate::ConfigError;

/// Expand environment variable references in a string.
///
/// Supports `${VAR}` (error if unset) and `${VAR:-default}`. Bare `$VAR`
/// is left as written.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |var| -> Result<Option<String>, UnsetVar> {
        match std::env::var(var) {
            Ok(val) => Ok(Some(val)),
            Err(_) => Err(UnsetVar(var.to_owned())),
        }
    })
    .map(std::borrow::Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{}}} not set", e.cause.0),
    })
}

/// Name of a variable that could not be looked up.
struct UnsetVar(String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_simple_var() {
        // SAFETY: variable name is unique to this test
        unsafe {
            std::env::set_var("PAGEMAP_TEST_SIMPLE", "hello");
        }
        assert_eq!(
            expand_env("${PAGEMAP_TEST_SIMPLE}", "test.field").unwrap(),
            "hello"
        );
        unsafe {
            std::env::remove_var("PAGEMAP_TEST_SIMPLE");
        }
    }

    #[test]
    fn test_expand_default_when_unset() {
        // SAFETY: variable name is unique to this test
        unsafe {
            std::env::remove_var("PAGEMAP_TEST_UNSET");
        }
        assert_eq!(
            expand_env("${PAGEMAP_TEST_UNSET:-fallback}", "test.field").unwrap(),
            "fallback"
        );
    }

    #[test]
    fn test_expand_missing_var_names_field() {
        // SAFETY: variable name is unique to this test
        unsafe {
            std::env::remove_var("PAGEMAP_TEST_MISSING");
        }
        let err = expand_env("${PAGEMAP_TEST_MISSING}", "confluence.api_token").unwrap_err();

        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert_eq!(
            err.to_string(),
            "Environment variable error in confluence.api_token: ${PAGEMAP_TEST_MISSING} not set"
        );
    }

    #[test]
    fn test_expand_embedded_var() {
        // SAFETY: variable name is unique to this test
        unsafe {
            std::env::set_var("PAGEMAP_TEST_HOST", "wiki.example.com");
        }
        assert_eq!(
            expand_env("https://${PAGEMAP_TEST_HOST}/", "test.url").unwrap(),
            "https://wiki.example.com/"
        );
        unsafe {
            std::env::remove_var("PAGEMAP_TEST_HOST");
        }
    }

    #[test]
    fn test_bare_dollar_not_expanded() {
        assert_eq!(expand_env("$HOME/x", "test.field").unwrap(), "$HOME/x");
    }
}
