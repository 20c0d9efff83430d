use globset::{Glob, GlobBuilder, GlobSet, GlobSetBuilder};
use regex::{Regex, RegexBuilder};
use std::fmt;

use crate::document::DocumentName;
use crate::error::{ConfigErrorKind, RatError, Result};

/// A single path pattern, written with `/` separators relative to a directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathPattern {
    /// Glob where `*` stays within one segment and `**` spans segments
    Glob(String),
    /// Regular expression searched for in the relative path
    Regex(String),
}

impl PathPattern {
    pub fn glob(pattern: impl Into<String>) -> Self {
        PathPattern::Glob(pattern.into())
    }

    pub fn regex(pattern: impl Into<String>) -> Self {
        PathPattern::Regex(pattern.into())
    }

    pub fn as_str(&self) -> &str {
        match self {
            PathPattern::Glob(p) | PathPattern::Regex(p) => p,
        }
    }

    /// Check that the pattern compiles.
    pub fn validate(&self, case_sensitive: bool) -> Result<()> {
        match self {
            PathPattern::Glob(p) => compile_glob(p, case_sensitive).map(|_| ()),
            PathPattern::Regex(p) => compile_regex(p, case_sensitive).map(|_| ()),
        }
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathPattern::Glob(p) => f.write_str(p),
            PathPattern::Regex(p) => write!(f, "%regex[{}]", p),
        }
    }
}

pub(crate) fn compile_glob(pattern: &str, case_sensitive: bool) -> Result<Glob> {
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .backslash_escape(true)
        .case_insensitive(!case_sensitive)
        .build()
        .map_err(|e| {
            RatError::config(
                ConfigErrorKind::InvalidPattern,
                format!("invalid glob '{}': {}", pattern, e),
            )
        })
}

pub(crate) fn compile_regex(pattern: &str, case_sensitive: bool) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(!case_sensitive)
        .build()
        .map_err(|e| {
            RatError::config(
                ConfigErrorKind::InvalidPattern,
                format!("invalid regex '{}': {}", pattern, e),
            )
        })
}

/// A compiled set of path patterns anchored at one directory.
///
/// A name matches when its path relative to the directory matches any
/// pattern. Names outside the directory, and the directory itself, never match.
#[derive(Debug, Clone)]
pub struct PathPatterns {
    dir: DocumentName,
    sources: Vec<PathPattern>,
    globs: GlobSet,
    regexes: Vec<Regex>,
}

impl PathPatterns {
    pub fn new<I>(dir: &DocumentName, patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = PathPattern>,
    {
        let case_sensitive = dir.is_case_sensitive();
        let mut sources = Vec::new();
        let mut builder = GlobSetBuilder::new();
        let mut regexes = Vec::new();

        for pattern in patterns {
            if sources.contains(&pattern) {
                continue;
            }
            match &pattern {
                PathPattern::Glob(p) => {
                    builder.add(compile_glob(p, case_sensitive)?);
                }
                PathPattern::Regex(p) => regexes.push(compile_regex(p, case_sensitive)?),
            }
            sources.push(pattern);
        }

        Ok(Self {
            dir: dir.clone(),
            sources,
            globs: builder.build()?,
            regexes,
        })
    }

    /// The directory patterns are relative to
    pub fn dir(&self) -> &DocumentName {
        &self.dir
    }

    pub fn patterns(&self) -> &[PathPattern] {
        &self.sources
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn matches(&self, name: &DocumentName) -> bool {
        match name.relative_to(&self.dir) {
            Some(path) if !path.is_empty() => self.matches_path(&path),
            _ => false,
        }
    }

    /// Match a `/` separated path relative to the directory.
    pub fn matches_path(&self, path: &str) -> bool {
        self.globs.is_match(path) || self.regexes.iter().any(|r| r.is_match(path))
    }

    /// Label listing the patterns, used as matcher name
    pub fn describe(&self) -> String {
        let patterns: Vec<String> = self.sources.iter().map(ToString::to_string).collect();
        format!("patterns({})", patterns.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::FsInfo;

    fn dir(path: &str, fs: FsInfo) -> DocumentName {
        DocumentName::builder()
            .name(path)
            .base_name("/")
            .fs_info(fs)
            .directory(true)
            .build()
            .unwrap()
    }

    fn file(path: &str) -> DocumentName {
        DocumentName::builder()
            .name(path)
            .base_name("/")
            .fs_info(FsInfo::unix())
            .build()
            .unwrap()
    }

    #[test]
    fn test_glob_segments() {
        let patterns = PathPatterns::new(
            &dir("/repo", FsInfo::unix()),
            [PathPattern::glob("*.log"), PathPattern::glob("**/build")],
        )
        .unwrap();
        assert!(patterns.matches_path("debug.log"));
        assert!(!patterns.matches_path("logs/debug.log"), "* must not cross separators");
        assert!(patterns.matches_path("build"));
        assert!(patterns.matches_path("a/b/build"));
        assert!(!patterns.matches_path("a/build/x"));
    }

    #[test]
    fn test_double_star_suffix() {
        let repo = dir("/repo", FsInfo::unix());
        let patterns = PathPatterns::new(&repo, [PathPattern::glob("target/**")]).unwrap();
        assert!(patterns.matches_path("target/classes/A.class"));
        assert!(!patterns.matches_path("target"));
        assert!(!patterns.matches_path("src/target/x"));
    }

    #[test]
    fn test_relative_to_directory() {
        let sub = dir("/repo/sub", FsInfo::unix());
        let patterns = PathPatterns::new(&sub, [PathPattern::glob("*.tmp")]).unwrap();
        assert!(patterns.matches(&file("/repo/sub/a.tmp")));
        assert!(!patterns.matches(&file("/repo/a.tmp")), "outside the directory");
        assert!(!patterns.matches(&file("/repo/sub")));
    }

    #[test]
    fn test_regex_search() {
        let patterns = PathPatterns::new(
            &dir("/repo", FsInfo::unix()),
            [PathPattern::regex(r"\.orig$"), PathPattern::regex("^docs/")],
        )
        .unwrap();
        assert!(patterns.matches_path("src/a.c.orig"));
        assert!(patterns.matches_path("docs/index.md"));
        assert!(!patterns.matches_path("src/docs/index.md"));
    }

    #[test]
    fn test_case_insensitive_dir() {
        let patterns = PathPatterns::new(
            &dir("C:\\repo", FsInfo::windows()),
            [PathPattern::glob("*.LOG"), PathPattern::regex("^TMP/")],
        )
        .unwrap();
        assert!(patterns.matches_path("debug.log"));
        assert!(patterns.matches_path("tmp/x"));
    }

    #[test]
    fn test_invalid_patterns() {
        let root = dir("/repo", FsInfo::unix());
        let err = PathPatterns::new(&root, [PathPattern::regex("(")]).unwrap_err();
        assert_eq!(err.config_kind(), Some(ConfigErrorKind::InvalidPattern));
        let err = PathPatterns::new(&root, [PathPattern::glob("a[")]).unwrap_err();
        assert_eq!(err.config_kind(), Some(ConfigErrorKind::InvalidPattern));
    }

    #[test]
    fn test_describe_and_dedup() {
        let patterns = PathPatterns::new(
            &dir("/repo", FsInfo::unix()),
            [PathPattern::glob("*.a"), PathPattern::glob("*.a"), PathPattern::regex("x")],
        )
        .unwrap();
        assert_eq!(patterns.patterns().len(), 2);
        assert_eq!(patterns.describe(), "patterns(*.a, %regex[x])");
    }
}
