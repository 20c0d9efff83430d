use std::fmt;
use std::sync::Arc;

use super::DocumentName;
use crate::exclusion::PathPatterns;

type NamePredicate = dyn Fn(&DocumentName) -> bool + Send + Sync;

enum Kind {
    All,
    None,
    Directory,
    Patterns(PathPatterns),
    Predicate(Box<NamePredicate>),
    Not(DocumentNameMatcher),
    And(Vec<DocumentNameMatcher>),
    Or(Vec<DocumentNameMatcher>),
    /// Excluded by `excludes` and not re-included by `includes`
    MatcherSet {
        includes: DocumentNameMatcher,
        excludes: DocumentNameMatcher,
    },
}

/// A named predicate over [`DocumentName`]s.
///
/// Matchers are immutable and cheap to clone, so they can be shared freely
/// between threads. The combinators collapse trivial cases: `or` containing
/// [`matches_all`](Self::matches_all) is `matches_all`, `and` containing
/// [`matches_none`](Self::matches_none) is `matches_none`, and nested
/// `and`/`or` are flattened.
#[derive(Clone)]
pub struct DocumentNameMatcher {
    name: Arc<str>,
    kind: Arc<Kind>,
}

/// The evaluation of a matcher tree against one name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchTrace {
    pub matcher: String,
    pub result: bool,
    pub children: Vec<MatchTrace>,
}

impl MatchTrace {
    fn write_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        writeln!(f, "{:indent$}{} >> {}", "", self.matcher, self.result, indent = depth * 2)?;
        for child in &self.children {
            child.write_indented(f, depth + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for MatchTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 0)
    }
}

impl DocumentNameMatcher {
    fn from_kind(name: impl Into<Arc<str>>, kind: Kind) -> Self {
        Self {
            name: name.into(),
            kind: Arc::new(kind),
        }
    }

    /// Matches every name
    pub fn matches_all() -> Self {
        Self::from_kind("TRUE", Kind::All)
    }

    /// Matches no name
    pub fn matches_none() -> Self {
        Self::from_kind("FALSE", Kind::None)
    }

    /// Matches names flagged as directories
    pub fn is_directory() -> Self {
        Self::from_kind("isDirectory", Kind::Directory)
    }

    pub fn from_patterns(name: impl Into<String>, patterns: PathPatterns) -> Self {
        if patterns.is_empty() {
            return Self::matches_none();
        }
        Self::from_kind(name.into(), Kind::Patterns(patterns))
    }

    pub fn predicate<F>(name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&DocumentName) -> bool + Send + Sync + 'static,
    {
        Self::from_kind(name.into(), Kind::Predicate(Box::new(predicate)))
    }

    /// The same matcher under a different name
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        let name: String = name.into();
        Self {
            name: name.into(),
            kind: self.kind.clone(),
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(matcher: DocumentNameMatcher) -> Self {
        match matcher.kind.as_ref() {
            Kind::All => Self::matches_none(),
            Kind::None => Self::matches_all(),
            Kind::Not(inner) => inner.clone(),
            _ => Self::from_kind(format!("not({})", matcher.name), Kind::Not(matcher)),
        }
    }

    /// Logical or. An empty collection matches nothing.
    pub fn or<I>(matchers: I) -> Self
    where
        I: IntoIterator<Item = DocumentNameMatcher>,
    {
        let mut children: Vec<DocumentNameMatcher> = Vec::new();
        for matcher in matchers {
            match matcher.kind.as_ref() {
                Kind::All => return Self::matches_all(),
                Kind::None => {}
                Kind::Or(nested) => children.extend(nested.iter().cloned()),
                _ => children.push(matcher),
            }
        }
        match children.len() {
            0 => Self::matches_none(),
            1 => children.remove(0),
            _ => Self::from_kind(format!("or({})", join(&children)), Kind::Or(children)),
        }
    }

    /// Logical and. An empty collection matches everything.
    pub fn and<I>(matchers: I) -> Self
    where
        I: IntoIterator<Item = DocumentNameMatcher>,
    {
        let mut children: Vec<DocumentNameMatcher> = Vec::new();
        for matcher in matchers {
            match matcher.kind.as_ref() {
                Kind::None => return Self::matches_none(),
                Kind::All => {}
                Kind::And(nested) => children.extend(nested.iter().cloned()),
                _ => children.push(matcher),
            }
        }
        match children.len() {
            0 => Self::matches_all(),
            1 => children.remove(0),
            _ => Self::from_kind(format!("and({})", join(&children)), Kind::And(children)),
        }
    }

    /// True when `excludes` matches and `includes` does not.
    pub fn matcher_set(
        includes: Option<DocumentNameMatcher>,
        excludes: Option<DocumentNameMatcher>,
    ) -> Self {
        let excludes = excludes.filter(|m| !m.is_none());
        let includes = includes.filter(|m| !m.is_none());
        match (includes, excludes) {
            (_, None) => Self::matches_none(),
            (None, Some(excludes)) => excludes,
            (Some(includes), Some(excludes)) => Self::from_kind(
                format!("matcherSet({}, {})", includes.name, excludes.name),
                Kind::MatcherSet { includes, excludes },
            ),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_all(&self) -> bool {
        matches!(self.kind.as_ref(), Kind::All)
    }

    pub fn is_none(&self) -> bool {
        matches!(self.kind.as_ref(), Kind::None)
    }

    pub fn matches(&self, name: &DocumentName) -> bool {
        match self.kind.as_ref() {
            Kind::All => true,
            Kind::None => false,
            Kind::Directory => name.is_directory(),
            Kind::Patterns(patterns) => patterns.matches(name),
            Kind::Predicate(predicate) => predicate(name),
            Kind::Not(matcher) => !matcher.matches(name),
            Kind::And(matchers) => matchers.iter().all(|m| m.matches(name)),
            Kind::Or(matchers) => matchers.iter().any(|m| m.matches(name)),
            Kind::MatcherSet { includes, excludes } => {
                excludes.matches(name) && !includes.matches(name)
            }
        }
    }

    /// Evaluate every node of the tree against `name`, for debugging decisions.
    pub fn trace(&self, name: &DocumentName) -> MatchTrace {
        let children: Vec<MatchTrace> = match self.kind.as_ref() {
            Kind::Not(matcher) => vec![matcher.trace(name)],
            Kind::And(matchers) | Kind::Or(matchers) => {
                matchers.iter().map(|m| m.trace(name)).collect()
            }
            Kind::MatcherSet { includes, excludes } => {
                vec![includes.trace(name), excludes.trace(name)]
            }
            _ => Vec::new(),
        };
        MatchTrace {
            matcher: self.name.to_string(),
            result: self.matches(name),
            children,
        }
    }
}

fn join(matchers: &[DocumentNameMatcher]) -> String {
    matchers
        .iter()
        .map(|m| m.name())
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for DocumentNameMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl fmt::Debug for DocumentNameMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DocumentNameMatcher").field(&self.name).finish()
    }
}
