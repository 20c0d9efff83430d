//! RAT Engine - license header detection and document exclusion for source audits
//!
//! This library provides the matching core of a release audit tool:
//! - Header matchers (text, regex, copyright, full text, SPDX identifier)
//! - Boolean matcher trees (all / any / not) driven line by line
//! - License families, approval policies and per-document claims
//! - Document-name exclusion from gitignore, hgignore and cvsignore files
//! - Standard exclusion collections (VCS metadata, IDE and build output)
//! - LRU caching of exclusion decisions
//!
//! # Example
//!
//! ```rust
//! use rat_engine::{compile_config, parse_config, HeaderAnalyser, SpdxRegistry};
//!
//! let config_text = r#"{
//!   "families": [{ "category": "AL", "name": "Apache License" }],
//!   "licenses": [{
//!     "id": "AL2.0",
//!     "family": "AL",
//!     "matcher": {
//!       "type": "any",
//!       "children": [
//!         { "type": "text", "text": "Licensed under the Apache License, Version 2.0" },
//!         { "type": "spdx", "name": "Apache-2.0" }
//!       ]
//!     }
//!   }]
//! }"#;
//!
//! // Parse and compile the license definitions
//! let config = parse_config(config_text).unwrap();
//! let registry = SpdxRegistry::new();
//! let licenses = compile_config(&config, &registry).unwrap();
//!
//! // Analyse a document header
//! let mut analyser = HeaderAnalyser::new(&licenses, &config.analysis);
//! let claims = analyser.analyse("src/main.rs", ["// SPDX-License-Identifier: Apache-2.0"]);
//! assert_eq!(claims.approved(), vec!["AL2.0"]);
//! ```
//!
//! # Matcher Types
//!
//! | Type | Example | Description |
//! |------|---------|-------------|
//! | Text | `{"type": "text", "text": "Licensed under"}` | Substring of one line |
//! | Regex | `{"type": "regex", "expr": "GPL-[23]"}` | Regular expression search in one line |
//! | Copyright | `{"type": "copyright", "start": "2000", "owner": "ACME"}` | Dated, owned notice |
//! | Full text | `{"type": "full_text", "text": "..."}` | Whole license text, across lines |
//! | SPDX | `{"type": "spdx", "name": "MIT"}` | `SPDX-License-Identifier:` tag |
//! | All | `{"type": "all", "children": [...]}` | Every child matched |
//! | Any | `{"type": "any", "children": [...]}` | At least one child matched |
//! | Not | `{"type": "not", "child": {...}}` | Child not matched |
//!
//! ## Exclusion
//!
//! - `.gitignore` - globs, `!` re-inclusion, trailing `/` for directories
//! - `.hgignore` - regular expressions, `syntax: glob` switches to globs
//! - `.cvsignore` - whitespace separated globs
//! - `%regex[expr]` - user pattern given as a regular expression

pub mod analysis;
pub mod compile;
pub mod config;
pub mod document;
pub mod error;
pub mod exclusion;
pub mod header;
pub mod license;
pub mod matcher;
pub mod statistic;
pub mod types;

// Re-export commonly used items
pub use analysis::{read_header_lines, DocumentClaims, HeaderAnalyser, LicenseClaim};
pub use compile::{compile_config, compile_matcher};
pub use config::{
    parse_config, parse_config_from_file, AnalysisConfig, LicenseConfig, MatcherSpec,
    DEFAULT_DECISION_CACHE_SIZE, DEFAULT_MAX_HEADER_LINES,
};
pub use error::{ConfigErrorKind, RatError, Result};
pub use header::{HeaderState, MatcherTree};
pub use license::{
    ApprovalPolicy, FamilyRegistry, License, LicenseFamily, LicenseFilter, LicenseSet,
};
pub use matcher::{Matcher, MatcherKind, SpdxRegistry};
pub use statistic::ClaimStatistic;
pub use types::{DocumentType, MatchState};

// Re-export exclusion types
pub use document::{DocumentName, DocumentNameMatcher, FsInfo, MatchTrace};
pub use exclusion::{
    CvsIgnoreParser, ExclusionMatcher, ExclusionProcessor, GitIgnoreParser, HgIgnoreParser,
    IgnoreParser, MatcherSet, StandardCollection,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_workflow() {
        let config_text = r#"
{
  "families": [
    { "category": "AL", "name": "Apache License" },
    { "category": "GPL", "name": "GNU General Public License" }
  ],
  "licenses": [
    {
      "id": "AL2.0",
      "family": "AL",
      "matcher": {
        "type": "any",
        "children": [
          { "type": "text", "text": "Licensed under the Apache License, Version 2.0" },
          { "type": "spdx", "name": "Apache-2.0" }
        ]
      }
    },
    {
      "id": "GPL3",
      "family": "GPL",
      "approved": false,
      "matcher": { "type": "spdx", "name": "GPL-3.0-only" }
    }
  ],
  "generated": { "type": "text", "text": "DO NOT EDIT" }
}
"#;

        // Parse and compile
        let config = parse_config(config_text).unwrap();
        let registry = SpdxRegistry::new();
        let licenses = compile_config(&config, &registry).unwrap();
        assert_eq!(licenses.len(), 2);
        assert_eq!(licenses.licenses(LicenseFilter::Approved).len(), 1);

        // Exclusion
        let base = DocumentName::builder()
            .name("/src")
            .base_name("/src")
            .fs_info(FsInfo::unix())
            .directory(true)
            .build()
            .unwrap();
        let mut processor = ExclusionProcessor::from_config(&base, &config.analysis);
        processor
            .add_excluded_collection(StandardCollection::Git)
            .add_excluded_patterns(["**/*.png"]);
        let exclusions = processor.build().unwrap();
        assert_eq!(exclusions.cache_capacity(), DEFAULT_DECISION_CACHE_SIZE);

        let mut analyser = HeaderAnalyser::new(&licenses, &config.analysis);
        let mut statistic = ClaimStatistic::new();
        let documents = [
            (
                "Main.java",
                vec!["/*", " * Licensed under the Apache License, Version 2.0", " */"],
            ),
            ("lib.c", vec!["// SPDX-License-Identifier: GPL-3.0-only"]),
            (
                "Parser.java",
                vec!["// DO NOT EDIT", "// Licensed under the Apache License, Version 2.0"],
            ),
            ("README", vec!["Read me first"]),
            ("logo.png", vec![]),
            (".git/config", vec!["[core]"]),
        ];
        for (path, header) in documents {
            if !exclusions.should_process(&base.resolve(path).unwrap()) {
                continue;
            }
            statistic.record(&analyser.analyse(path, header));
        }

        assert_eq!(statistic.documents(), 4);
        assert_eq!(statistic.approved(), 1);
        assert_eq!(statistic.unapproved(), 1);
        assert_eq!(statistic.generated(), 1);
        assert_eq!(statistic.unknown(), 1);
        assert_eq!(registry.len(), 2);
    }
}
