use lru::LruCache;
use parking_lot::Mutex;
use std::fs;
use std::num::NonZeroUsize;
use std::path::Path;
use tracing::{debug, trace};

use super::{MatcherSet, PathPattern, PathPatterns, StandardCollection};
use crate::config::{AnalysisConfig, DEFAULT_DECISION_CACHE_SIZE};
use crate::document::{DocumentName, DocumentNameMatcher, MatchTrace};
use crate::error::Result;

/// Parse a user supplied pattern: `%regex[expr]` is a regular expression,
/// anything else a glob.
fn user_pattern(pattern: &str) -> PathPattern {
    match pattern
        .strip_prefix("%regex[")
        .and_then(|rest| rest.strip_suffix(']'))
    {
        Some(expr) => PathPattern::regex(expr),
        None => PathPattern::glob(pattern),
    }
}

/// Collects the exclusion sources of a run and builds the final
/// "should this document be processed" matcher.
///
/// A document is skipped when it matches any exclusion and no explicit
/// inclusion. Exclusions come from user patterns, excluded standard
/// collections and the ignore files of those collections; inclusions from
/// user patterns and included standard collections.
pub struct ExclusionProcessor {
    base: DocumentName,
    included_patterns: Vec<PathPattern>,
    excluded_patterns: Vec<PathPattern>,
    included_collections: Vec<StandardCollection>,
    excluded_collections: Vec<StandardCollection>,
    matcher_sets: Vec<MatcherSet>,
    cache_size: usize,
}

impl ExclusionProcessor {
    /// Patterns added later are relative to the base directory of `base`.
    pub fn new(base: &DocumentName) -> Self {
        Self {
            base: base.base_document_name(),
            included_patterns: Vec::new(),
            excluded_patterns: Vec::new(),
            included_collections: Vec::new(),
            excluded_collections: Vec::new(),
            matcher_sets: Vec::new(),
            cache_size: DEFAULT_DECISION_CACHE_SIZE,
        }
    }

    /// A processor sized by the analysis settings.
    pub fn from_config(base: &DocumentName, config: &AnalysisConfig) -> Self {
        Self::new(base).with_cache_size(config.decision_cache_size)
    }

    pub fn with_cache_size(mut self, cache_size: usize) -> Self {
        self.cache_size = cache_size;
        self
    }

    pub fn add_included_patterns<I, S>(&mut self, patterns: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.included_patterns
            .extend(patterns.into_iter().map(|p| user_pattern(p.as_ref())));
        self
    }

    pub fn add_excluded_patterns<I, S>(&mut self, patterns: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.excluded_patterns
            .extend(patterns.into_iter().map(|p| user_pattern(p.as_ref())));
        self
    }

    pub fn add_included_collection(&mut self, collection: StandardCollection) -> &mut Self {
        if !self.included_collections.contains(&collection) {
            self.included_collections.push(collection);
        }
        self
    }

    pub fn add_excluded_collection(&mut self, collection: StandardCollection) -> &mut Self {
        if !self.excluded_collections.contains(&collection) {
            self.excluded_collections.push(collection);
        }
        self
    }

    /// Add the rules of an already parsed ignore file.
    pub fn add_matcher_set(&mut self, set: MatcherSet) -> &mut Self {
        if !set.is_empty() {
            self.matcher_sets.push(set);
        }
        self
    }

    /// Walk `dir` and parse every ignore file belonging to an excluded
    /// collection. Directories matched by the excluded collections are not
    /// entered. Returns the number of ignore files loaded.
    pub fn load_ignore_files(&mut self, dir: &DocumentName) -> Result<usize> {
        let parsers: Vec<_> = self
            .excluded_collections
            .iter()
            .filter_map(StandardCollection::parser)
            .collect();
        if parsers.is_empty() {
            return Ok(0);
        }
        let skip = DocumentNameMatcher::or(
            self.excluded_collections
                .iter()
                .map(|sc| sc.matcher(&self.base))
                .collect::<Result<Vec<_>>>()?,
        );

        let mut loaded = 0;
        let mut pending = vec![directory(dir, dir.name())?];
        while let Some(current) = pending.pop() {
            for parser in &parsers {
                if let Some(set) = parser.load(&current)? {
                    debug!(dir = %current, file = parser.file_name(), "loaded ignore file");
                    loaded += 1;
                    self.add_matcher_set(set);
                }
            }

            let mut children = Vec::new();
            for entry in fs::read_dir(Path::new(current.name()))? {
                let entry = entry?;
                if !entry.file_type()?.is_dir() {
                    continue;
                }
                let child = directory(&current, &entry.file_name().to_string_lossy())?;
                if !skip.matches(&child) {
                    children.push(child);
                }
            }
            children.sort();
            pending.extend(children.into_iter().rev());
        }
        Ok(loaded)
    }

    /// Combine everything added so far into an [`ExclusionMatcher`].
    pub fn build(&self) -> Result<ExclusionMatcher> {
        let mut inclusions = Vec::new();
        if !self.included_patterns.is_empty() {
            let patterns = PathPatterns::new(&self.base, self.included_patterns.iter().cloned())?;
            inclusions.push(DocumentNameMatcher::from_patterns(patterns.describe(), patterns));
        }
        for sc in &self.included_collections {
            inclusions.push(sc.matcher(&self.base)?);
        }

        let mut exclusions = Vec::new();
        if !self.excluded_patterns.is_empty() {
            let patterns = PathPatterns::new(&self.base, self.excluded_patterns.iter().cloned())?;
            exclusions.push(DocumentNameMatcher::from_patterns(patterns.describe(), patterns));
        }
        for sc in &self.excluded_collections {
            exclusions.push(sc.matcher(&self.base)?);
        }
        exclusions.push(MatcherSet::merge(self.matcher_sets.iter().cloned()).exclusion_matcher());

        let skipped = DocumentNameMatcher::and([
            DocumentNameMatcher::or(exclusions),
            DocumentNameMatcher::not(DocumentNameMatcher::or(inclusions)),
        ]);
        let matcher = DocumentNameMatcher::not(skipped);
        debug!(matcher = %matcher, "built exclusion matcher");
        Ok(ExclusionMatcher::new(matcher, self.cache_size))
    }
}

/// A directory named `child` inside `parent`, or `parent` itself when `child`
/// is its full name.
fn directory(parent: &DocumentName, child: &str) -> Result<DocumentName> {
    let name = if child == parent.name() {
        parent.name().to_string()
    } else {
        parent.resolve(child)?.name().to_string()
    };
    DocumentName::builder()
        .name(name)
        .base_name(parent.base_name())
        .fs_info(parent.fs_info())
        .directory(true)
        .build()
}

/// The compiled process/skip decision with a bounded memo of recent answers.
pub struct ExclusionMatcher {
    matcher: DocumentNameMatcher,
    cache: Mutex<LruCache<DocumentName, bool>>,
}

impl ExclusionMatcher {
    pub fn new(matcher: DocumentNameMatcher, cache_size: usize) -> Self {
        let cache_size = NonZeroUsize::new(cache_size).unwrap_or(NonZeroUsize::MIN);
        Self {
            matcher,
            cache: Mutex::new(LruCache::new(cache_size)),
        }
    }

    /// True when the document should be checked for license headers.
    pub fn should_process(&self, name: &DocumentName) -> bool {
        let mut cache = self.cache.lock();
        if let Some(cached) = cache.get(name) {
            return *cached;
        }

        let result = self.matcher.matches(name);
        trace!(document = %name, process = result, "exclusion decision");
        cache.put(name.clone(), result);
        result
    }

    /// Explain the decision for `name`.
    pub fn trace(&self, name: &DocumentName) -> MatchTrace {
        self.matcher.trace(name)
    }

    pub fn matcher(&self) -> &DocumentNameMatcher {
        &self.matcher
    }

    pub fn clear_cache(&self) {
        self.cache.lock().clear();
    }

    pub fn cached_decisions(&self) -> usize {
        self.cache.lock().len()
    }

    /// Maximum number of decisions remembered
    pub fn cache_capacity(&self) -> usize {
        self.cache.lock().cap().get()
    }
}
