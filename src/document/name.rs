use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::{RatError, Result};

/// File-system conventions captured when a name is built
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FsInfo {
    separator: char,
    case_sensitive: bool,
}

impl FsInfo {
    pub fn new(separator: char, case_sensitive: bool) -> Self {
        Self {
            separator,
            case_sensitive,
        }
    }

    /// `/` separated, case-sensitive
    pub fn unix() -> Self {
        Self::new('/', true)
    }

    /// `\` separated, case-insensitive
    pub fn windows() -> Self {
        Self::new('\\', false)
    }

    pub fn separator(&self) -> char {
        self.separator
    }

    pub fn is_case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    /// Rewrite either separator in `path` to this file system's separator.
    fn normalize_separators(&self, path: &str) -> String {
        match self.separator {
            '/' => path.replace('\\', "/"),
            '\\' => path.replace('/', "\\"),
            sep => path.replace(['/', '\\'], &sep.to_string()),
        }
    }
}

impl Default for FsInfo {
    fn default() -> Self {
        Self::new(std::path::MAIN_SEPARATOR, !cfg!(any(windows, target_os = "macos")))
    }
}

/// Immutable identity of a document: its full name and the base directory it
/// was found under.
#[derive(Debug, Clone)]
pub struct DocumentName {
    name: String,
    base_name: String,
    fs: FsInfo,
    is_directory: bool,
}

/// Builder for [`DocumentName`]
#[derive(Debug, Clone, Default)]
pub struct DocumentNameBuilder {
    name: Option<String>,
    base_name: Option<String>,
    fs: FsInfo,
    is_directory: bool,
}

impl DocumentNameBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn base_name(mut self, base_name: impl Into<String>) -> Self {
        self.base_name = Some(base_name.into());
        self
    }

    pub fn fs_info(mut self, fs: FsInfo) -> Self {
        self.fs = fs;
        self
    }

    pub fn directory(mut self, is_directory: bool) -> Self {
        self.is_directory = is_directory;
        self
    }

    /// Build the name. A missing base name makes the document its own base.
    pub fn build(self) -> Result<DocumentName> {
        let name = self
            .name
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| RatError::InvalidDocumentName("name must not be blank".into()))?;
        let name = trim_separator(&name, self.fs.separator);
        let base_name = match self.base_name.filter(|b| !b.trim().is_empty()) {
            Some(base) => trim_separator(&base, self.fs.separator),
            None => name.clone(),
        };
        Ok(DocumentName {
            name,
            base_name,
            fs: self.fs,
            is_directory: self.is_directory,
        })
    }
}

fn trim_separator(path: &str, separator: char) -> String {
    let trimmed = path.trim_end_matches(separator);
    if trimmed.is_empty() {
        separator.to_string()
    } else {
        trimmed.to_string()
    }
}

impl DocumentName {
    pub fn builder() -> DocumentNameBuilder {
        DocumentNameBuilder::default()
    }

    /// Shortcut for a file `name` under `base_name` with default file-system conventions.
    pub fn new(name: &str, base_name: &str) -> Result<Self> {
        Self::builder().name(name).base_name(base_name).build()
    }

    /// The fully qualified name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The fully qualified name of the base directory
    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    pub fn fs_info(&self) -> FsInfo {
        self.fs
    }

    pub fn separator(&self) -> char {
        self.fs.separator
    }

    pub fn is_case_sensitive(&self) -> bool {
        self.fs.case_sensitive
    }

    pub fn is_directory(&self) -> bool {
        self.is_directory
    }

    /// The base directory as a document name of its own
    pub fn base_document_name(&self) -> DocumentName {
        DocumentName {
            name: self.base_name.clone(),
            base_name: self.base_name.clone(),
            fs: self.fs,
            is_directory: true,
        }
    }

    /// The last segment of the name
    pub fn short_name(&self) -> &str {
        match self.name.rfind(self.fs.separator) {
            Some(pos) => &self.name[pos + self.fs.separator.len_utf8()..],
            None => &self.name,
        }
    }

    /// The part of the name below the base directory, always starting with the separator.
    pub fn localized(&self) -> String {
        let sep = self.fs.separator;
        match self.strip_prefix(&self.base_name) {
            Some("") => sep.to_string(),
            Some(rest) if rest.starts_with(sep) => rest.to_string(),
            Some(rest) => format!("{}{}", sep, rest),
            None if self.name.starts_with(sep) => self.name.clone(),
            None => format!("{}{}", sep, self.name),
        }
    }

    /// [`localized`](Self::localized) using `separator` between segments.
    pub fn localized_with(&self, separator: char) -> String {
        let localized = self.localized();
        if separator == self.fs.separator {
            return localized;
        }
        localized.replace(self.fs.separator, &separator.to_string())
    }

    /// Path of this document below `dir`, `/` separated without a leading
    /// separator. `None` when the document is not inside `dir`. The directory
    /// itself yields an empty path.
    pub fn relative_to(&self, dir: &DocumentName) -> Option<String> {
        let rest = self.strip_prefix(&dir.name)?;
        let rest = rest.trim_start_matches(self.fs.separator);
        if self.fs.separator == '/' {
            Some(rest.to_string())
        } else {
            Some(rest.replace(self.fs.separator, "/"))
        }
    }

    /// A new name for `child` resolved against this name.
    ///
    /// `.` and `..` segments are folded; climbing above the root is an error.
    /// Children starting with a separator replace the name entirely. The base
    /// name and file-system conventions are kept.
    pub fn resolve(&self, child: &str) -> Result<DocumentName> {
        if child.trim().is_empty() {
            return Ok(self.clone());
        }
        let sep = self.fs.separator;
        let child = self.fs.normalize_separators(child);
        let joined = if child.starts_with(sep) {
            child
        } else {
            format!("{}{}{}", self.name, sep, child)
        };

        let absolute = joined.starts_with(sep);
        let mut parts: Vec<&str> = Vec::new();
        for part in joined.split(sep) {
            match part {
                "" | "." => {}
                ".." => {
                    if parts.pop().is_none() {
                        return Err(RatError::InvalidDocumentName(format!(
                            "'{}' climbs above the root",
                            joined
                        )));
                    }
                }
                part => parts.push(part),
            }
        }

        let mut name = parts.join(&sep.to_string());
        if absolute {
            name.insert(0, sep);
        }
        if name.is_empty() {
            return Err(RatError::InvalidDocumentName(format!(
                "'{}' resolves to an empty name",
                joined
            )));
        }
        Ok(DocumentName {
            name,
            base_name: self.base_name.clone(),
            fs: self.fs,
            is_directory: false,
        })
    }

    /// Strip `prefix` at a segment boundary, honouring case sensitivity.
    fn strip_prefix(&self, prefix: &str) -> Option<&str> {
        let head = self.name.get(..prefix.len())?;
        let matches = if self.fs.case_sensitive {
            head == prefix
        } else {
            head.to_lowercase() == prefix.to_lowercase()
        };
        if !matches {
            return None;
        }
        let rest = &self.name[prefix.len()..];
        if rest.is_empty()
            || rest.starts_with(self.fs.separator)
            || prefix.ends_with(self.fs.separator)
        {
            Some(rest)
        } else {
            None
        }
    }

    fn key(&self) -> (Cow<'_, str>, Cow<'_, str>, FsInfo, bool) {
        if self.fs.case_sensitive {
            (
                Cow::Borrowed(self.name.as_str()),
                Cow::Borrowed(self.base_name.as_str()),
                self.fs,
                self.is_directory,
            )
        } else {
            (
                Cow::Owned(self.name.to_lowercase()),
                Cow::Owned(self.base_name.to_lowercase()),
                self.fs,
                self.is_directory,
            )
        }
    }
}

impl PartialEq for DocumentName {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for DocumentName {}

impl PartialOrd for DocumentName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DocumentName {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl Hash for DocumentName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Display for DocumentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.localized())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn unix(name: &str, base: &str) -> DocumentName {
        DocumentName::builder()
            .name(name)
            .base_name(base)
            .fs_info(FsInfo::unix())
            .build()
            .unwrap()
    }

    fn windows(name: &str, base: &str) -> DocumentName {
        DocumentName::builder()
            .name(name)
            .base_name(base)
            .fs_info(FsInfo::windows())
            .build()
            .unwrap()
    }

    #[test]
    fn test_localized() {
        assert_eq!(unix("/home/src/main/Foo.java", "/home/src").localized(), "/main/Foo.java");
        assert_eq!(unix("/home/src", "/home/src").localized(), "/");
        assert_eq!(unix("/home/srcdir/x", "/home/src").localized(), "/home/srcdir/x");
        assert_eq!(unix("relative/x", "/home").localized(), "/relative/x");
    }

    #[test]
    fn test_localized_with_separator() {
        let name = windows("C:\\work\\src\\main\\Foo.java", "C:\\work");
        assert_eq!(name.localized(), "\\src\\main\\Foo.java");
        assert_eq!(name.localized_with('/'), "/src/main/Foo.java");
    }

    #[test]
    fn test_short_name() {
        assert_eq!(unix("/home/src/Foo.java", "/home").short_name(), "Foo.java");
        assert_eq!(unix("Foo.java", "Foo.java").short_name(), "Foo.java");
    }

    #[test]
    fn test_trailing_separator_removed() {
        let name = unix("/home/src/", "/home/");
        assert_eq!(name.name(), "/home/src");
        assert_eq!(name.base_name(), "/home");
        assert_eq!(unix("/", "/").name(), "/");
    }

    #[test]
    fn test_blank_name_rejected() {
        assert!(DocumentName::builder().name("  ").build().is_err());
        assert!(DocumentName::builder().build().is_err());
    }

    #[test]
    fn test_resolve() {
        let dir = unix("/home/src", "/home");
        assert_eq!(dir.resolve("main/Foo.java").unwrap().name(), "/home/src/main/Foo.java");
        assert_eq!(dir.resolve("./a/../b").unwrap().name(), "/home/src/b");
        assert_eq!(dir.resolve("../other").unwrap().name(), "/home/other");
        assert_eq!(dir.resolve("/abs/x").unwrap().name(), "/abs/x");
        assert_eq!(dir.resolve("sub\\file").unwrap().name(), "/home/src/sub/file");
        assert_eq!(dir.resolve("").unwrap(), dir);
        assert_eq!(dir.resolve("x").unwrap().base_name(), "/home");
    }

    #[test]
    fn test_resolve_above_root_fails() {
        let dir = unix("/home", "/home");
        let err = dir.resolve("../../etc").unwrap_err();
        assert!(matches!(err, RatError::InvalidDocumentName(_)));
    }

    #[test]
    fn test_relative_to() {
        let file = unix("/home/src/main/Foo.java", "/home");
        let dir = unix("/home/src", "/home");
        assert_eq!(file.relative_to(&dir).as_deref(), Some("main/Foo.java"));
        assert_eq!(dir.relative_to(&dir).as_deref(), Some(""));
        let other = unix("/home/srcx", "/home");
        assert_eq!(file.relative_to(&other), None);

        let file = windows("C:\\work\\src\\Foo.java", "C:\\work");
        let dir = windows("c:\\WORK", "C:\\work");
        assert_eq!(file.relative_to(&dir).as_deref(), Some("src/Foo.java"));
    }

    #[test]
    fn test_equality_respects_case_sensitivity() {
        assert_ne!(unix("/a/Foo", "/a"), unix("/a/foo", "/a"));
        assert_eq!(windows("C:\\a\\Foo", "C:\\a"), windows("c:\\A\\foo", "C:\\a"));

        let mut set = HashSet::new();
        set.insert(windows("C:\\a\\Foo", "C:\\a"));
        assert!(set.contains(&windows("C:\\A\\FOO", "c:\\a")));
    }

    #[test]
    fn test_ordering() {
        let mut names = vec![unix("/a/c", "/a"), unix("/a/b", "/a")];
        names.sort();
        assert_eq!(names[0].short_name(), "b");
    }

    #[test]
    fn test_base_document_name() {
        let base = unix("/home/src/x", "/home").base_document_name();
        assert_eq!(base.name(), "/home");
        assert!(base.is_directory());
        assert_eq!(base.localized(), "/");
    }

    #[test]
    fn test_display_is_localized() {
        assert_eq!(unix("/home/src/x", "/home").to_string(), "/src/x");
    }
}
