use crate::error::{ConfigErrorKind, RatError, Result};

/// Text matcher - true when the line contains a fixed string (case-sensitive)
#[derive(Debug, Clone)]
pub struct TextMatcher {
    text: String,
}

impl TextMatcher {
    /// Create a new text matcher. Blank text is a configuration error.
    pub fn new(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Err(RatError::config(
                ConfigErrorKind::BlankText,
                "'text' matcher requires non-blank text",
            ));
        }
        Ok(Self {
            text: text.to_string(),
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn matches(&self, line: &str) -> bool {
        line.contains(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_match() {
        let matcher = TextMatcher::new("Apache License").unwrap();
        assert!(matcher.matches(" * Licensed under the Apache License, Version 2.0"));
        assert!(!matcher.matches(" * Licensed under the MIT License"));
    }

    #[test]
    fn test_case_sensitive() {
        let matcher = TextMatcher::new("Apache").unwrap();
        assert!(!matcher.matches("apache"));
    }

    #[test]
    fn test_rejects_blank_text() {
        let err = TextMatcher::new("   ").unwrap_err();
        assert_eq!(err.config_kind(), Some(ConfigErrorKind::BlankText));
        assert!(TextMatcher::new("").is_err());
    }
}
