//! License and analysis configuration.
//!
//! Configuration is plain JSON deserialized with serde. Nothing here is
//! validated beyond its shape; [`compile_config`](crate::compile::compile_config)
//! performs all semantic checks and fails on the first problem.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{ConfigErrorKind, RatError, Result};

/// Leading lines of a document fed to the header matchers
pub const DEFAULT_MAX_HEADER_LINES: usize = 50;

/// Entries kept in the exclusion decision cache
pub const DEFAULT_DECISION_CACHE_SIZE: usize = 1024;

/// Tuning and approval settings of one analysis run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct AnalysisConfig {
    pub max_header_lines: usize,
    pub decision_cache_size: usize,
    pub approved_categories: Vec<String>,
    pub removed_categories: Vec<String>,
    pub approved_license_ids: Vec<String>,
    pub removed_license_ids: Vec<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_header_lines: DEFAULT_MAX_HEADER_LINES,
            decision_cache_size: DEFAULT_DECISION_CACHE_SIZE,
            approved_categories: Vec::new(),
            removed_categories: Vec::new(),
            approved_license_ids: Vec::new(),
            removed_license_ids: Vec::new(),
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_header_lines == 0 {
            return Err(RatError::config(
                ConfigErrorKind::InvalidSetting,
                "max_header_lines must be at least 1",
            ));
        }
        Ok(())
    }
}

/// A license family declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FamilyDefinition {
    pub category: String,
    pub name: String,
}

/// A matcher definition. `type` selects the kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MatcherSpec {
    Text {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        text: String,
    },
    Regex {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        expr: String,
    },
    Copyright {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        start: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        end: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        owner: Option<String>,
    },
    FullText {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        text: String,
    },
    Spdx {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        name: String,
    },
    All {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        children: Vec<MatcherSpec>,
    },
    Any {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        children: Vec<MatcherSpec>,
    },
    Not {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        child: Box<MatcherSpec>,
    },
}

impl MatcherSpec {
    /// The explicit id, if one was configured
    pub fn id(&self) -> Option<&str> {
        match self {
            MatcherSpec::Text { id, .. }
            | MatcherSpec::Regex { id, .. }
            | MatcherSpec::Copyright { id, .. }
            | MatcherSpec::FullText { id, .. }
            | MatcherSpec::Spdx { id, .. }
            | MatcherSpec::All { id, .. }
            | MatcherSpec::Any { id, .. }
            | MatcherSpec::Not { id, .. } => id.as_deref(),
        }
    }
}

/// A license declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LicenseDefinition {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Category of the family this license belongs to
    pub family: String,
    /// Declares the family inline when it is not listed under `families`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,
    #[serde(default = "default_approved")]
    pub approved: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub matcher: MatcherSpec,
}

fn default_approved() -> bool {
    true
}

/// Top-level configuration document
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LicenseConfig {
    #[serde(default)]
    pub families: Vec<FamilyDefinition>,
    #[serde(default)]
    pub licenses: Vec<LicenseDefinition>,
    /// Matcher identifying generated documents
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated: Option<MatcherSpec>,
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

/// Parse a configuration document from JSON text.
pub fn parse_config(text: &str) -> Result<LicenseConfig> {
    let config: LicenseConfig = serde_json::from_str(text)?;
    config.analysis.validate()?;
    Ok(config)
}

/// Parse a configuration document from a JSON file.
pub fn parse_config_from_file(path: impl AsRef<Path>) -> Result<LicenseConfig> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| {
        RatError::IoError(std::io::Error::new(
            e.kind(),
            format!("Failed to read config file '{}': {}", path.display(), e),
        ))
    })?;
    parse_config(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
{
  "families": [{ "category": "AL", "name": "Apache License" }],
  "licenses": [
    {
      "id": "AL2.0",
      "family": "AL",
      "matcher": {
        "type": "any",
        "children": [
          { "type": "text", "text": "Licensed under the Apache License, Version 2.0" },
          { "type": "spdx", "name": "Apache-2.0" },
          { "type": "copyright", "owner": "The Apache Software Foundation" }
        ]
      }
    }
  ],
  "generated": { "type": "regex", "expr": "(?i)generated by" }
}
"#;

    #[test]
    fn test_parse_sample() {
        let config = parse_config(SAMPLE).unwrap();
        assert_eq!(config.families.len(), 1);
        assert_eq!(config.licenses.len(), 1);
        let license = &config.licenses[0];
        assert!(license.approved, "approved defaults to true");
        assert!(license.name.is_empty());
        match &license.matcher {
            MatcherSpec::Any { children, .. } => {
                assert_eq!(children.len(), 3);
                assert!(matches!(
                    &children[2],
                    MatcherSpec::Copyright { owner: Some(_), start: None, .. }
                ));
            }
            other => panic!("expected any, got {:?}", other),
        }
        assert!(config.generated.is_some());
        assert_eq!(config.analysis, AnalysisConfig::default());
    }

    #[test]
    fn test_analysis_defaults() {
        let config = AnalysisConfig::default();
        assert_eq!(config.max_header_lines, 50);
        assert_eq!(config.decision_cache_size, 1024);
    }

    #[test]
    fn test_partial_analysis_section() {
        let config = parse_config(r#"{ "analysis": { "max_header_lines": 10 } }"#).unwrap();
        assert_eq!(config.analysis.max_header_lines, 10);
        assert_eq!(config.analysis.decision_cache_size, DEFAULT_DECISION_CACHE_SIZE);
    }

    #[test]
    fn test_zero_header_lines_rejected() {
        let err = parse_config(r#"{ "analysis": { "max_header_lines": 0 } }"#).unwrap_err();
        assert_eq!(err.config_kind(), Some(ConfigErrorKind::InvalidSetting));
    }

    #[test]
    fn test_unknown_matcher_type_rejected() {
        let text = r#"{ "licenses": [
            { "id": "x", "family": "X", "matcher": { "type": "fuzzy" } }
        ] }"#;
        let err = parse_config(text).unwrap_err();
        assert!(matches!(err, RatError::JsonError(_)));
    }

    #[test]
    fn test_matcher_spec_id() {
        let spec: MatcherSpec =
            serde_json::from_str(r#"{ "type": "text", "id": "t1", "text": "foo" }"#).unwrap();
        assert_eq!(spec.id(), Some("t1"));
    }

    #[test]
    fn test_parse_config_from_file() {
        let path = std::env::temp_dir().join("rat_engine_config_test.json");
        std::fs::write(&path, SAMPLE).unwrap();
        let config = parse_config_from_file(&path).unwrap();
        assert_eq!(config.licenses[0].id, "AL2.0");
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_missing_file_is_error() {
        let err = parse_config_from_file("/nonexistent/rat-config.json").unwrap_err();
        assert!(matches!(err, RatError::IoError(_)));
        assert!(err.to_string().contains("rat-config.json"));
    }
}
