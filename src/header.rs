use tracing::trace;

use crate::matcher::{FullTextProgress, Matcher, MatcherKind, SpdxLineCache};
use crate::types::MatchState;

/// A compiled matcher definition.
///
/// Every node is numbered so per-document state can live outside the tree.
/// The tree itself is never mutated after construction and can be shared
/// between threads.
#[derive(Debug, Clone)]
pub struct MatcherTree {
    root: Matcher,
    node_count: usize,
}

impl MatcherTree {
    pub fn new(mut root: Matcher) -> Self {
        let mut node_count = 0;
        root.assign_slots(&mut node_count);
        Self { root, node_count }
    }

    pub fn root(&self) -> &Matcher {
        &self.root
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Create a fresh evaluation context for one document.
    pub fn state(&self) -> HeaderState<'_> {
        HeaderState::new(self)
    }
}

#[derive(Debug, Clone, Default)]
struct NodeState {
    matched: bool,
    full_text: FullTextProgress,
}

/// Per-document evaluation context of a [`MatcherTree`].
///
/// Lines are fed with [`match_line`](Self::match_line) until the state is
/// terminal. A matched node stays matched until [`reset`](Self::reset), so
/// children of an `All` that already matched are not evaluated again.
#[derive(Debug, Clone)]
pub struct HeaderState<'t> {
    tree: &'t MatcherTree,
    state: MatchState,
    nodes: Vec<NodeState>,
    spdx: SpdxLineCache,
    leaf_evaluations: usize,
}

impl<'t> HeaderState<'t> {
    pub fn new(tree: &'t MatcherTree) -> Self {
        Self {
            tree,
            state: MatchState::Init,
            nodes: vec![NodeState::default(); tree.node_count()],
            spdx: SpdxLineCache::default(),
            leaf_evaluations: 0,
        }
    }

    pub fn tree(&self) -> &'t MatcherTree {
        self.tree
    }

    pub fn state(&self) -> MatchState {
        self.state
    }

    /// Feed one header line. `None` never matches.
    pub fn match_line(&mut self, line: Option<&str>) -> MatchState {
        if self.state != MatchState::Init {
            return self.state;
        }
        let tree = self.tree;
        if self.evaluate(tree.root(), line) {
            trace!(matcher = tree.root().id(), "header matched");
            self.state = MatchState::Matched;
        }
        self.state
    }

    /// Input exhausted: an undecided state becomes `Unmatched`.
    pub fn finalize(&mut self) -> MatchState {
        if self.state == MatchState::Init {
            self.state = MatchState::Unmatched;
        }
        self.state
    }

    /// Return to `Init` for the next document.
    pub fn reset(&mut self) {
        self.state = MatchState::Init;
        for node in &mut self.nodes {
            node.matched = false;
            node.full_text.reset();
        }
        self.spdx.reset();
        self.leaf_evaluations = 0;
    }

    /// Whether the node in `slot` has matched since the last reset
    pub fn is_node_matched(&self, slot: usize) -> bool {
        self.nodes.get(slot).is_some_and(|node| node.matched)
    }

    /// Leaf evaluations performed since the last reset
    pub fn leaf_evaluations(&self) -> usize {
        self.leaf_evaluations
    }

    pub fn spdx_extractions(&self) -> usize {
        self.spdx.extractions()
    }

    fn evaluate(&mut self, node: &'t Matcher, line: Option<&str>) -> bool {
        let slot = node.slot();
        if self.nodes[slot].matched {
            return true;
        }
        let Some(line) = line else {
            return false;
        };

        let result = match node.kind() {
            MatcherKind::Text(m) => {
                self.leaf_evaluations += 1;
                m.matches(line)
            }
            MatcherKind::Regex(m) => {
                self.leaf_evaluations += 1;
                m.matches(line)
            }
            MatcherKind::Copyright(m) => {
                self.leaf_evaluations += 1;
                m.matches(line)
            }
            MatcherKind::FullText(m) => {
                self.leaf_evaluations += 1;
                m.matches(&mut self.nodes[slot].full_text, line)
            }
            MatcherKind::Spdx(m) => {
                self.leaf_evaluations += 1;
                m.matches(&mut self.spdx, line)
            }
            MatcherKind::All(children) => {
                // every pending child sees the line; no short circuit
                let mut all = true;
                for child in children {
                    all &= self.evaluate(child, Some(line));
                }
                all
            }
            MatcherKind::Any(children) => children
                .iter()
                .any(|child| self.evaluate(child, Some(line))),
            MatcherKind::Not(child) => !self.evaluate(child, Some(line)),
        };

        if result {
            self.nodes[slot].matched = true;
        }
        result
    }
}
