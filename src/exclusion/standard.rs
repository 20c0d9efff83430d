use std::fmt;
use std::str::FromStr;

use super::{
    CvsIgnoreParser, GitIgnoreParser, HgIgnoreParser, IgnoreParser, PathPattern, PathPatterns,
};
use crate::document::{DocumentName, DocumentNameMatcher};
use crate::error::{ConfigErrorKind, RatError, Result};

/// Built-in groups of files that are usually not part of a release:
/// version control metadata, IDE settings, build output and editor leftovers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StandardCollection {
    Git,
    Mercurial,
    Cvs,
    Subversion,
    Bazaar,
    Idea,
    Eclipse,
    Maven,
    Mac,
    Misc,
    HiddenFile,
    HiddenDir,
}

impl StandardCollection {
    pub const ALL: [StandardCollection; 12] = [
        StandardCollection::Git,
        StandardCollection::Mercurial,
        StandardCollection::Cvs,
        StandardCollection::Subversion,
        StandardCollection::Bazaar,
        StandardCollection::Idea,
        StandardCollection::Eclipse,
        StandardCollection::Maven,
        StandardCollection::Mac,
        StandardCollection::Misc,
        StandardCollection::HiddenFile,
        StandardCollection::HiddenDir,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StandardCollection::Git => "GIT",
            StandardCollection::Mercurial => "MERCURIAL",
            StandardCollection::Cvs => "CVS",
            StandardCollection::Subversion => "SUBVERSION",
            StandardCollection::Bazaar => "BAZAAR",
            StandardCollection::Idea => "IDEA",
            StandardCollection::Eclipse => "ECLIPSE",
            StandardCollection::Maven => "MAVEN",
            StandardCollection::Mac => "MAC",
            StandardCollection::Misc => "MISC",
            StandardCollection::HiddenFile => "HIDDEN_FILE",
            StandardCollection::HiddenDir => "HIDDEN_DIR",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            StandardCollection::Git => {
                "Files created by git, also applies the rules of '.gitignore' files"
            }
            StandardCollection::Mercurial => {
                "Files created by Mercurial, also applies the rules of '.hgignore' files"
            }
            StandardCollection::Cvs => {
                "Files created by CVS, also applies the rules of '.cvsignore' files"
            }
            StandardCollection::Subversion => "Files created by Subversion",
            StandardCollection::Bazaar => "Files created by Bazaar",
            StandardCollection::Idea => "Files created by IntelliJ IDEA",
            StandardCollection::Eclipse => "Files created by Eclipse",
            StandardCollection::Maven => "Files created by Maven builds",
            StandardCollection::Mac => "The .DS_Store files of macOS",
            StandardCollection::Misc => "Backup and lock files left by editors",
            StandardCollection::HiddenFile => "Files with names starting with '.'",
            StandardCollection::HiddenDir => {
                "Directories with names starting with '.', and their contents"
            }
        }
    }

    /// Glob patterns, relative to the base directory
    pub fn patterns(&self) -> &'static [&'static str] {
        match self {
            StandardCollection::Git => &["**/.git/**", "**/.gitignore"],
            StandardCollection::Mercurial => &["**/.hg/**", ".hgignore"],
            StandardCollection::Cvs => &[
                "**/.cvsignore",
                "**/RCS/**",
                "**/SCCS/**",
                "**/CVS/**",
                "**/CVS.adm/**",
                "**/RCSLOG/**",
                "**/cvslog.*",
                "**/tags/**",
                "**/TAGS/**",
                "**/.make.state",
                "**/.nse_depinfo",
                "**/*~",
                "**/#*",
                "**/.#*",
                "**/,*",
                "**/_$*",
                "**/*$",
                "**/*.old",
                "**/*.bak",
                "**/*.BAK",
                "**/*.orig",
                "**/*.rej",
                "**/.del-*",
                "**/*.a",
                "**/*.o",
                "**/*.obj",
                "**/*.so",
                "**/*.exe",
                "**/*.Z",
                "**/*.elc",
                "**/*.ln",
                "**/core",
            ],
            StandardCollection::Subversion => &["**/.svn/**"],
            StandardCollection::Bazaar => &["**/.bzr/**", ".bzrignore"],
            StandardCollection::Idea => &["*.iml", "*.ipr", "*.iws", ".idea/**"],
            StandardCollection::Eclipse => &[
                ".checkstyle",
                ".classpath",
                ".factorypath",
                ".project",
                ".settings/**",
            ],
            StandardCollection::Maven => &[
                "target/**",
                "cobertura.ser",
                "**/MANIFEST.MF",
                "release.properties",
                ".repository",
                "build.log",
                ".mvn/**",
                "pom.xml.releaseBackup",
            ],
            StandardCollection::Mac => &["**/.DS_Store"],
            StandardCollection::Misc => &["**/*~", "**/#*#", "**/.#*", "**/%*%", "**/._*"],
            StandardCollection::HiddenFile | StandardCollection::HiddenDir => &[],
        }
    }

    /// The ignore-file format maintained by this tool, if any
    pub fn parser(&self) -> Option<Box<dyn IgnoreParser>> {
        match self {
            StandardCollection::Git => Some(Box::new(GitIgnoreParser)),
            StandardCollection::Mercurial => Some(Box::new(HgIgnoreParser)),
            StandardCollection::Cvs => Some(Box::new(CvsIgnoreParser)),
            _ => None,
        }
    }

    /// Matcher for the members of this collection below `base`.
    pub fn matcher(&self, base: &DocumentName) -> Result<DocumentNameMatcher> {
        let base = base.base_document_name();
        let matcher = match self {
            StandardCollection::HiddenFile => {
                DocumentNameMatcher::predicate(self.as_str(), |name: &DocumentName| {
                    !name.is_directory() && name.short_name().starts_with('.')
                })
            }
            StandardCollection::HiddenDir => {
                DocumentNameMatcher::predicate(self.as_str(), move |name: &DocumentName| {
                    in_hidden_dir(name, &base)
                })
            }
            _ => {
                let patterns = PathPatterns::new(&base, collection_globs(self.patterns()))?;
                DocumentNameMatcher::from_patterns(self.as_str(), patterns)
            }
        };
        Ok(matcher)
    }
}

/// Compile-ready globs for a collection. `dir/**` also names `dir` itself so
/// the directory is excluded, not only its contents.
fn collection_globs(patterns: &[&str]) -> Vec<PathPattern> {
    let mut globs = Vec::with_capacity(patterns.len());
    for pattern in patterns {
        if let Some(dir) = pattern.strip_suffix("/**") {
            if !dir.is_empty() && dir != "**" {
                globs.push(PathPattern::glob(dir));
            }
        }
        globs.push(PathPattern::glob(*pattern));
    }
    globs
}

/// True for hidden directories below `base` and everything inside them.
fn in_hidden_dir(name: &DocumentName, base: &DocumentName) -> bool {
    let Some(path) = name.relative_to(base) else {
        return false;
    };
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let parents = if name.is_directory() {
        &segments[..]
    } else {
        &segments[..segments.len().saturating_sub(1)]
    };
    parents.iter().any(|s| s.starts_with('.') && *s != "." && *s != "..")
}

impl fmt::Display for StandardCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StandardCollection {
    type Err = RatError;

    /// Accepts `HIDDEN_FILE`, `hidden-file` and `HiddenFile` alike.
    fn from_str(s: &str) -> Result<Self> {
        let wanted: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        StandardCollection::ALL
            .into_iter()
            .find(|sc| sc.as_str().replace('_', "").to_ascii_lowercase() == wanted)
            .ok_or_else(|| {
                RatError::config(
                    ConfigErrorKind::InvalidSetting,
                    format!("unknown standard collection '{}'", s),
                )
            })
    }
}
