use regex::Regex;

use crate::error::{ConfigErrorKind, RatError, Result};

/// Any one of the copyright indicators. Matched case-insensitively.
const SYMBOL: &str = r"(?:\bcopyright\b|\(c\)|©|&copy;)";

/// An optional year range, used when an owner is given without dates.
const YEAR_RANGE: &str = r"\d{4}(?:\s*-\s*\d{4})?";

/// What may follow the owner: nothing, or a non-word character (and anything
/// after it). The owner must end on a word boundary.
const OWNER_TAIL: &str = r"(?:\W.*)?$";

/// Lower-cased substrings checked before running the regex.
const INDICATORS: [&str; 4] = ["copyright", "(c)", "©", "&copy;"];

/// Copyright matcher - recognises copyright header lines.
///
/// Supported forms are `Copyright [dates] [owner]` and `Copyright owner [dates]`,
/// where `(c)`, `(C)`, `©` and `&copy;` may stand in for (or accompany) the word
/// "Copyright". Matching is case-insensitive.
#[derive(Debug, Clone)]
pub struct CopyrightMatcher {
    start: Option<String>,
    end: Option<String>,
    owner: Option<String>,
    pattern: Regex,
}

impl CopyrightMatcher {
    /// Create a new copyright matcher.
    ///
    /// `end` is only legal when `start` is given, and both must be numeric.
    pub fn new(start: Option<&str>, end: Option<&str>, owner: Option<&str>) -> Result<Self> {
        let start = normalize(start);
        let end = normalize(end);
        let owner = normalize(owner);

        for year in [&start, &end].into_iter().flatten() {
            if !year.chars().all(|c| c.is_ascii_digit()) {
                return Err(RatError::config(
                    ConfigErrorKind::InvalidDate,
                    format!("copyright year '{}' is not numeric", year),
                ));
            }
        }

        let date = match (&start, &end) {
            (Some(start), Some(end)) => Some(format!(r"\b{}\s*-\s*{}\b", start, end)),
            (Some(start), None) => Some(format!(r"\b{}\b", start)),
            (None, Some(end)) => {
                return Err(RatError::config(
                    ConfigErrorKind::MissingStartDate,
                    format!("copyright end year '{}' given without a start year", end),
                ))
            }
            (None, None) => None,
        };

        let symbols = format!(r"{SYMBOL}(?:\s*{SYMBOL})*");
        let body = match (&owner, date) {
            (None, None) => r"\s*\d{4}\b".to_string(),
            (None, Some(date)) => format!(r"\s*{date}"),
            (Some(owner), Some(date)) => {
                let owner = regex::escape(owner);
                format!(r"\s*(?:{date},?\s+{owner}|{owner},?\s+{date}){OWNER_TAIL}")
            }
            (Some(owner), None) => {
                let owner = regex::escape(owner);
                format!(
                    r"\s*(?:(?:{YEAR_RANGE},?\s+)?{owner}|{owner},?\s+{YEAR_RANGE}){OWNER_TAIL}"
                )
            }
        };

        let pattern = Regex::new(&format!("(?i){symbols}{body}")).map_err(|e| {
            RatError::config(
                ConfigErrorKind::InvalidPattern,
                format!("unable to build copyright pattern: {}", e),
            )
        })?;

        Ok(Self {
            start,
            end,
            owner,
            pattern,
        })
    }

    pub fn start(&self) -> Option<&str> {
        self.start.as_deref()
    }

    pub fn end(&self) -> Option<&str> {
        self.end.as_deref()
    }

    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    pub fn matches(&self, line: &str) -> bool {
        let lower = line.to_lowercase();
        if !INDICATORS.iter().any(|indicator| lower.contains(indicator)) {
            return false;
        }
        self.pattern.is_match(line)
    }
}

fn normalize(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
