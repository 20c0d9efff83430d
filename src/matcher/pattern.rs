use regex::Regex;

use crate::error::{ConfigErrorKind, RatError, Result};

/// Regex matcher - true when the pattern is found anywhere in the line.
///
/// This is the slow path. Prefer text, copyright or full-text matchers where
/// they can express the header.
#[derive(Debug, Clone)]
pub struct RegexMatcher {
    pattern: Regex,
}

impl RegexMatcher {
    /// Compile a new regex matcher. Invalid or blank expressions are configuration errors.
    pub fn new(expr: &str) -> Result<Self> {
        if expr.trim().is_empty() {
            return Err(RatError::config(
                ConfigErrorKind::BlankText,
                "'regex' matcher requires an expression",
            ));
        }
        let pattern = Regex::new(expr).map_err(|e| {
            RatError::config(
                ConfigErrorKind::InvalidPattern,
                format!("invalid regex '{}': {}", expr, e),
            )
        })?;
        Ok(Self { pattern })
    }

    pub fn as_str(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn matches(&self, line: &str) -> bool {
        self.pattern.is_match(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_anywhere() {
        let matcher = RegexMatcher::new(r"Version\s+2\.0").unwrap();
        assert!(matcher.matches("Apache License, Version 2.0 (the \"License\")"));
        assert!(!matcher.matches("Apache License, Version 1.1"));
    }

    #[test]
    fn test_invalid_regex_is_config_error() {
        let err = RegexMatcher::new("(unclosed").unwrap_err();
        assert_eq!(err.config_kind(), Some(ConfigErrorKind::InvalidPattern));
    }

    #[test]
    fn test_blank_regex_rejected() {
        assert!(RegexMatcher::new(" ").is_err());
    }
}
