//! Exclusion of documents by name.
//!
//! Ignore files are parsed into ordered [`IgnoreRule`]s, and the rules of one
//! file are folded into a [`MatcherSet`]: a pair of exclude and re-include
//! predicates anchored at the directory holding the file. A document is
//! excluded by a set when the excludes match and the includes do not.

mod cvs;
mod git;
mod hg;
mod pattern;
mod processor;
mod standard;

pub use cvs::CvsIgnoreParser;
pub use git::{modify_entry, GitIgnoreParser};
pub use hg::HgIgnoreParser;
pub use pattern::{PathPattern, PathPatterns};
pub use processor::{ExclusionMatcher, ExclusionProcessor};
pub use standard::StandardCollection;

use std::fs;
use std::path::Path;
use tracing::debug;

use crate::document::{DocumentName, DocumentNameMatcher};
use crate::error::{RatError, Result};

/// One parsed ignore-file entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoreRule {
    pub pattern: PathPattern,
    /// A re-inclusion (`!pattern` in git syntax)
    pub negated: bool,
    /// Only matches directories (trailing `/` in git syntax), and their contents
    pub directory_only: bool,
}

impl IgnoreRule {
    pub fn exclude(pattern: PathPattern) -> Self {
        Self {
            pattern,
            negated: false,
            directory_only: false,
        }
    }
}

/// Normalize a gitignore style glob.
///
/// Returns the glob relative to the ignore file's directory and whether the
/// entry was directory-only. A leading `/` anchors the glob; an entry without
/// any other `/` matches at any depth.
pub(crate) fn normalize_glob(entry: &str) -> (String, bool) {
    let directory_only = entry.len() > 1 && entry.ends_with('/');
    let mut pattern = match entry.find('/') {
        None => format!("**/{}", entry),
        Some(pos) if pos == entry.len() - 1 => format!("**/{}", entry),
        Some(0) => entry[1..].to_string(),
        Some(_) => entry.to_string(),
    };
    if directory_only {
        pattern.pop();
    }
    (pattern, directory_only)
}

/// Compiled include/exclude pair of one ignore file (or several merged ones)
#[derive(Debug, Clone, Default)]
pub struct MatcherSet {
    includes: Option<DocumentNameMatcher>,
    excludes: Option<DocumentNameMatcher>,
}

impl MatcherSet {
    pub fn new(
        includes: Option<DocumentNameMatcher>,
        excludes: Option<DocumentNameMatcher>,
    ) -> Self {
        Self {
            includes: includes.filter(|m| !m.is_none()),
            excludes: excludes.filter(|m| !m.is_none()),
        }
    }

    pub fn includes(&self) -> Option<&DocumentNameMatcher> {
        self.includes.as_ref()
    }

    pub fn excludes(&self) -> Option<&DocumentNameMatcher> {
        self.excludes.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.includes.is_none() && self.excludes.is_none()
    }

    /// Union the excludes and, separately, the includes of several sets.
    pub fn merge<I>(sets: I) -> MatcherSet
    where
        I: IntoIterator<Item = MatcherSet>,
    {
        let mut includes = Vec::new();
        let mut excludes = Vec::new();
        for set in sets {
            includes.extend(set.includes);
            excludes.extend(set.excludes);
        }
        MatcherSet::new(
            Some(DocumentNameMatcher::or(includes)),
            Some(DocumentNameMatcher::or(excludes)),
        )
    }

    /// A matcher that is true for excluded documents
    pub fn exclusion_matcher(&self) -> DocumentNameMatcher {
        DocumentNameMatcher::matcher_set(self.includes.clone(), self.excludes.clone())
    }

    pub fn is_excluded(&self, name: &DocumentName) -> bool {
        self.excludes.as_ref().is_some_and(|m| m.matches(name))
            && !self.includes.as_ref().is_some_and(|m| m.matches(name))
    }
}

/// Fold ordered rules into a [`MatcherSet`] anchored at `dir`.
///
/// An exclude rule is added to the excludes and masks every re-inclusion read
/// before it; a re-inclusion is added to the includes. So a later `!pattern`
/// overrides an earlier exclusion, but not the other way round.
pub fn fold_rules(dir: &DocumentName, rules: &[IgnoreRule]) -> Result<MatcherSet> {
    let mut excludes = DocumentNameMatcher::matches_none();
    let mut includes = DocumentNameMatcher::matches_none();

    let mut start = 0;
    while start < rules.len() {
        let negated = rules[start].negated;
        let end = rules[start..]
            .iter()
            .position(|r| r.negated != negated)
            .map_or(rules.len(), |offset| start + offset);
        let matcher = rules_matcher(dir, &rules[start..end])?;
        if negated {
            includes = DocumentNameMatcher::or([includes, matcher]);
        } else {
            excludes = DocumentNameMatcher::or([excludes, matcher.clone()]);
            includes = DocumentNameMatcher::and([includes, DocumentNameMatcher::not(matcher)]);
        }
        start = end;
    }

    Ok(MatcherSet::new(Some(includes), Some(excludes)))
}

/// Matcher for a run of rules of the same polarity.
fn rules_matcher(dir: &DocumentName, rules: &[IgnoreRule]) -> Result<DocumentNameMatcher> {
    let mut anywhere = Vec::new();
    let mut directories = Vec::new();
    for rule in rules {
        if let PathPattern::Glob(glob) = &rule.pattern {
            // everything below a matched directory
            if !glob.ends_with("**") {
                anywhere.push(PathPattern::glob(format!("{}/**", glob)));
            }
        }
        if rule.directory_only {
            directories.push(rule.pattern.clone());
        } else {
            anywhere.push(rule.pattern.clone());
        }
    }

    let anywhere = PathPatterns::new(dir, anywhere)?;
    let anywhere = DocumentNameMatcher::from_patterns(anywhere.describe(), anywhere);
    let directories = PathPatterns::new(dir, directories)?;
    let directories = DocumentNameMatcher::and([
        DocumentNameMatcher::is_directory(),
        DocumentNameMatcher::from_patterns(directories.describe(), directories),
    ]);
    Ok(DocumentNameMatcher::or([directories, anywhere]))
}

/// Parser for one ignore-file format.
pub trait IgnoreParser: Send + Sync {
    /// Name of the ignore file, e.g. `.gitignore`
    fn file_name(&self) -> &'static str;

    /// Parse the text of an ignore file into ordered rules.
    ///
    /// `source` names the file in error messages.
    fn parse_rules(&self, source: &str, text: &str) -> Result<Vec<IgnoreRule>>;

    /// Parse an ignore file located in `dir`.
    fn parse(&self, dir: &DocumentName, text: &str) -> Result<MatcherSet> {
        let source = dir.resolve(self.file_name())?.localized_with('/');
        let rules = self.parse_rules(&source, text)?;
        debug!(file = %source, rules = rules.len(), "parsed ignore file");
        fold_rules(dir, &rules)
    }

    /// Read and parse the ignore file in `dir`, if there is one.
    fn load(&self, dir: &DocumentName) -> Result<Option<MatcherSet>> {
        let path = Path::new(dir.name()).join(self.file_name());
        if !path.is_file() {
            return Ok(None);
        }
        let text = fs::read_to_string(&path)?;
        self.parse(dir, &text).map(Some)
    }
}

/// Validate a pattern, reporting failures against the ignore file line.
pub(crate) fn check_pattern(
    pattern: &PathPattern,
    case_sensitive: bool,
    source: &str,
    line: usize,
) -> Result<()> {
    pattern
        .validate(case_sensitive)
        .map_err(|e| RatError::ParseErrorAtLine {
            file: source.to_string(),
            line,
            message: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::FsInfo;

    fn root() -> DocumentName {
        DocumentName::builder()
            .name("/repo")
            .base_name("/repo")
            .fs_info(FsInfo::unix())
            .directory(true)
            .build()
            .unwrap()
    }

    fn file(path: &str) -> DocumentName {
        root().resolve(path).unwrap()
    }

    fn glob(pattern: &str, negated: bool) -> IgnoreRule {
        IgnoreRule {
            pattern: PathPattern::glob(pattern),
            negated,
            directory_only: false,
        }
    }

    #[test]
    fn test_normalize_glob() {
        assert_eq!(normalize_glob("filename"), ("**/filename".to_string(), false));
        assert_eq!(normalize_glob("/filename"), ("filename".to_string(), false));
        assert_eq!(normalize_glob("filename/"), ("**/filename".to_string(), true));
        assert_eq!(normalize_glob("file/name"), ("file/name".to_string(), false));
        assert_eq!(normalize_glob("/dir/"), ("dir".to_string(), true));
    }

    #[test]
    fn test_later_include_overrides_exclude() {
        let rules = [glob("**/*.log", false), glob("**/keep.log", true)];
        let set = fold_rules(&root(), &rules).unwrap();
        assert!(set.is_excluded(&file("debug.log")));
        assert!(!set.is_excluded(&file("keep.log")));
        assert!(!set.is_excluded(&file("src/main.rs")));
    }

    #[test]
    fn test_earlier_include_does_not_override() {
        let rules = [glob("**/keep.log", true), glob("**/*.log", false)];
        let set = fold_rules(&root(), &rules).unwrap();
        assert!(set.is_excluded(&file("keep.log")));
    }

    #[test]
    fn test_exclude_after_include_masks_it() {
        let rules = [
            glob("**/*.log", false),
            glob("**/keep*.log", true),
            glob("**/keep-not.log", false),
        ];
        let set = fold_rules(&root(), &rules).unwrap();
        assert!(!set.is_excluded(&file("keep-me.log")));
        assert!(set.is_excluded(&file("keep-not.log")));
    }

    #[test]
    fn test_contents_of_excluded_directory() {
        let set = fold_rules(&root(), &[glob("**/build", false)]).unwrap();
        assert!(set.is_excluded(&file("build")));
        assert!(set.is_excluded(&file("a/build/out/x.o")));
        assert!(!set.is_excluded(&file("builder.rs")));
    }

    #[test]
    fn test_directory_only_rule() {
        let rule = IgnoreRule {
            pattern: PathPattern::glob("**/target"),
            negated: false,
            directory_only: true,
        };
        let set = fold_rules(&root(), &[rule]).unwrap();
        let dir = DocumentName::builder()
            .name("/repo/target")
            .base_name("/repo")
            .fs_info(FsInfo::unix())
            .directory(true)
            .build()
            .unwrap();
        assert!(set.is_excluded(&dir));
        assert!(!set.is_excluded(&file("target")), "a file named target is kept");
        assert!(set.is_excluded(&file("target/classes/A.class")));
    }

    #[test]
    fn test_merge_unions_both_sides() {
        let a = fold_rules(&root(), &[glob("**/*.log", false)]).unwrap();
        let b = fold_rules(&root(), &[glob("**/*.tmp", false), glob("**/keep.log", true)]).unwrap();
        let merged = MatcherSet::merge([a, b]);
        assert!(merged.is_excluded(&file("x.log")));
        assert!(merged.is_excluded(&file("x.tmp")));
        assert!(!merged.is_excluded(&file("keep.log")), "include from another set re-includes");
        assert!(merged.exclusion_matcher().matches(&file("x.tmp")));
    }

    #[test]
    fn test_empty_rules_give_empty_set() {
        let set = fold_rules(&root(), &[]).unwrap();
        assert!(set.is_empty());
        assert!(set.exclusion_matcher().is_none());
        assert!(MatcherSet::merge(Vec::new()).is_empty());
    }
}
