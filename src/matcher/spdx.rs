use once_cell::sync::Lazy;
use parking_lot::Mutex;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::error::{ConfigErrorKind, RatError, Result};

static SPDX_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"SPDX-License-Identifier:\s([A-Za-z0-9.\-]+)")
        .expect("SPDX_PATTERN: hardcoded regex is invalid")
});

static SPDX_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9.\-]+$").expect("SPDX_ID: hardcoded regex is invalid"));

/// SPDX matcher - true when the line carries `SPDX-License-Identifier: <id>`
/// for this matcher's id.
///
/// Instances are created through a [`SpdxRegistry`] so that one id maps to one
/// shared matcher.
#[derive(Debug)]
pub struct SpdxMatcher {
    spdx_id: String,
}

impl SpdxMatcher {
    pub fn spdx_id(&self) -> &str {
        &self.spdx_id
    }

    /// Check a line, reusing the ids already extracted for it when possible.
    pub fn matches(&self, cache: &mut SpdxLineCache, line: &str) -> bool {
        cache.ids_for(line).contains(&self.spdx_id)
    }
}

/// Last line seen by any SPDX matcher of a document, with its extracted ids
#[derive(Debug, Clone, Default)]
pub struct SpdxLineCache {
    line: Option<String>,
    ids: HashSet<String>,
    extractions: usize,
}

impl SpdxLineCache {
    fn ids_for(&mut self, line: &str) -> &HashSet<String> {
        if self.line.as_deref() != Some(line) {
            self.ids = extract_ids(line);
            self.line = Some(line.to_string());
            self.extractions += 1;
        }
        &self.ids
    }

    /// Number of times the extraction regex ran since the last reset
    pub fn extractions(&self) -> usize {
        self.extractions
    }

    pub fn reset(&mut self) {
        self.line = None;
        self.ids.clear();
        self.extractions = 0;
    }
}

/// All SPDX ids declared on a line.
pub fn extract_ids(line: &str) -> HashSet<String> {
    SPDX_PATTERN
        .captures_iter(line)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Interning registry for SPDX matchers, owned by one configuration load.
#[derive(Debug, Default)]
pub struct SpdxRegistry {
    matchers: Mutex<HashMap<String, Arc<SpdxMatcher>>>,
}

impl SpdxRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the matcher for `id`, creating it on first use.
    pub fn create(&self, id: &str) -> Result<Arc<SpdxMatcher>> {
        let id = id.trim();
        if id.is_empty() {
            return Err(RatError::config(
                ConfigErrorKind::InvalidSpdxId,
                "SPDX id must not be blank",
            ));
        }
        if !SPDX_ID.is_match(id) {
            return Err(RatError::config(
                ConfigErrorKind::InvalidSpdxId,
                format!("invalid SPDX id '{}'", id),
            ));
        }

        let mut matchers = self.matchers.lock();
        let matcher = matchers
            .entry(id.to_string())
            .or_insert_with(|| {
                Arc::new(SpdxMatcher {
                    spdx_id: id.to_string(),
                })
            })
            .clone();
        Ok(matcher)
    }

    pub fn len(&self) -> usize {
        self.matchers.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
