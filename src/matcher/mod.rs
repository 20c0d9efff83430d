mod copyright;
mod full_text;
mod pattern;
mod spdx;
mod text;

pub use copyright::CopyrightMatcher;
pub use full_text::{prune, FullTextMatcher, FullTextProgress};
pub use pattern::RegexMatcher;
pub use spdx::{extract_ids, SpdxLineCache, SpdxMatcher, SpdxRegistry};
pub use text::TextMatcher;

use std::sync::Arc;
use uuid::Uuid;

use crate::error::Result;

/// Trait for leaf matchers that need no per-document state
pub trait LineMatcher: Send + Sync {
    /// Check if the line matches this matcher
    fn matches(&self, line: &str) -> bool;
}

impl LineMatcher for TextMatcher {
    fn matches(&self, line: &str) -> bool {
        TextMatcher::matches(self, line)
    }
}

impl LineMatcher for RegexMatcher {
    fn matches(&self, line: &str) -> bool {
        RegexMatcher::matches(self, line)
    }
}

impl LineMatcher for CopyrightMatcher {
    fn matches(&self, line: &str) -> bool {
        CopyrightMatcher::matches(self, line)
    }
}

/// Enum wrapper for all matcher kinds
#[derive(Debug, Clone)]
pub enum MatcherKind {
    Text(TextMatcher),
    Regex(RegexMatcher),
    Copyright(CopyrightMatcher),
    FullText(FullTextMatcher),
    Spdx(Arc<SpdxMatcher>),
    /// True once every child has matched on some line
    All(Vec<Matcher>),
    /// True when any child matches the current line
    Any(Vec<Matcher>),
    /// True when the child does not match the current line
    Not(Box<Matcher>),
}

/// A node of a header matcher definition.
///
/// The definition is immutable; per-document state lives in
/// [`HeaderState`](crate::header::HeaderState) and is addressed by `slot`.
#[derive(Debug, Clone)]
pub struct Matcher {
    id: String,
    slot: usize,
    kind: MatcherKind,
}

impl Matcher {
    pub fn new(kind: MatcherKind) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            slot: 0,
            kind,
        }
    }

    /// Replace the generated id. Blank ids keep the generated one.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        let id = id.into();
        if !id.trim().is_empty() {
            self.id = id;
        }
        self
    }

    pub fn text(text: &str) -> Result<Self> {
        Ok(Self::new(MatcherKind::Text(TextMatcher::new(text)?)))
    }

    pub fn regex(expr: &str) -> Result<Self> {
        Ok(Self::new(MatcherKind::Regex(RegexMatcher::new(expr)?)))
    }

    pub fn copyright(start: Option<&str>, end: Option<&str>, owner: Option<&str>) -> Result<Self> {
        Ok(Self::new(MatcherKind::Copyright(CopyrightMatcher::new(
            start, end, owner,
        )?)))
    }

    pub fn full_text(text: &str) -> Result<Self> {
        Ok(Self::new(MatcherKind::FullText(FullTextMatcher::new(text)?)))
    }

    /// SPDX matcher interned in `registry`; its id is `SPDX:<spdx id>`.
    pub fn spdx(registry: &SpdxRegistry, spdx_id: &str) -> Result<Self> {
        let matcher = registry.create(spdx_id)?;
        let id = format!("SPDX:{}", matcher.spdx_id());
        Ok(Self::new(MatcherKind::Spdx(matcher)).with_id(id))
    }

    pub fn all(children: Vec<Matcher>) -> Self {
        Self::new(MatcherKind::All(children))
    }

    pub fn any(children: Vec<Matcher>) -> Self {
        Self::new(MatcherKind::Any(children))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(child: Matcher) -> Self {
        Self::new(MatcherKind::Not(Box::new(child)))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> &MatcherKind {
        &self.kind
    }

    /// Position of this node in its tree (preorder)
    pub fn slot(&self) -> usize {
        self.slot
    }

    /// Direct children in evaluation order
    pub fn children(&self) -> &[Matcher] {
        match &self.kind {
            MatcherKind::All(children) | MatcherKind::Any(children) => children,
            MatcherKind::Not(child) => std::slice::from_ref(child.as_ref()),
            _ => &[],
        }
    }

    pub fn is_leaf(&self) -> bool {
        !matches!(
            self.kind,
            MatcherKind::All(_) | MatcherKind::Any(_) | MatcherKind::Not(_)
        )
    }

    /// Short name of the matcher kind, used in logs
    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            MatcherKind::Text(_) => "text",
            MatcherKind::Regex(_) => "regex",
            MatcherKind::Copyright(_) => "copyright",
            MatcherKind::FullText(_) => "full_text",
            MatcherKind::Spdx(_) => "spdx",
            MatcherKind::All(_) => "all",
            MatcherKind::Any(_) => "any",
            MatcherKind::Not(_) => "not",
        }
    }

    /// Number of nodes in this subtree
    pub fn node_count(&self) -> usize {
        1 + self.children().iter().map(Matcher::node_count).sum::<usize>()
    }

    /// Number the subtree in preorder starting at `next`.
    pub(crate) fn assign_slots(&mut self, next: &mut usize) {
        self.slot = *next;
        *next += 1;
        match &mut self.kind {
            MatcherKind::All(children) | MatcherKind::Any(children) => {
                for child in children {
                    child.assign_slots(next);
                }
            }
            MatcherKind::Not(child) => child.assign_slots(next),
            _ => {}
        }
    }
}
