//! Marshaling configuration.

use std::borrow::Cow;

/// Default message used when a native error string is not valid UTF-8.
pub const DEFAULT_ERROR_FALLBACK: &str = "native library returned a malformed error message";

/// Fallback strings used when native strings fail to decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarshalConfig {
    /// Substituted for a native error message that is not valid UTF-8.
    pub error_fallback: Cow<'static, str>,

    /// Substituted for a getter string that is not valid UTF-8.
    pub string_fallback: Cow<'static, str>,
}

impl Default for MarshalConfig {
    fn default() -> Self {
        Self {
            error_fallback: Cow::Borrowed(DEFAULT_ERROR_FALLBACK),
            string_fallback: Cow::Borrowed(""),
        }
    }
}

impl MarshalConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the error message fallback.
    #[must_use]
    pub fn error_fallback(mut self, value: impl Into<Cow<'static, str>>) -> Self {
        self.error_fallback = value.into();
        self
    }

    /// Sets the getter string fallback.
    #[must_use]
    pub fn string_fallback(mut self, value: impl Into<Cow<'static, str>>) -> Self {
        self.string_fallback = value.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = MarshalConfig::default();
        assert_eq!(config.error_fallback, DEFAULT_ERROR_FALLBACK);
        assert_eq!(config.string_fallback, "");
    }

    #[test]
    fn builder_pattern() {
        let config = MarshalConfig::new()
            .error_fallback("request failed")
            .string_fallback(String::from("?"));

        assert_eq!(config.error_fallback, "request failed");
        assert_eq!(config.string_fallback, "?");
    }
}
