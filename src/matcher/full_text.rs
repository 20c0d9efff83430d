use crate::error::{ConfigErrorKind, RatError, Result};

/// Number of characters taken as the anchor when the text has no line break
const DEFAULT_INITIAL_LINE_LENGTH: usize = 20;

/// Removes everything except letters and digits from text.
pub fn prune(text: &str) -> String {
    text.chars().filter(|c| c.is_alphanumeric()).collect()
}

fn normalize(text: &str) -> String {
    prune(text).to_lowercase()
}

/// Full-text matcher - reproduces a target text across several header lines.
///
/// Input is compared after pruning to letters and digits and lower-casing, so
/// comment markers, punctuation and line wrapping do not matter. The first line
/// of the target serves as an anchor: nothing is buffered until the anchor has
/// been seen, and stale prefixes are dropped once the buffer is long enough to
/// have contained the target.
#[derive(Debug, Clone)]
pub struct FullTextMatcher {
    full_text: String,
    first_line: String,
}

/// Per-document progress of a [`FullTextMatcher`]
#[derive(Debug, Clone, Default)]
pub struct FullTextProgress {
    buffer: String,
    seen_first_line: bool,
    // unmatched input kept so an anchor split over two lines is still found
    tail: String,
}

impl FullTextProgress {
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.tail.clear();
        self.seen_first_line = false;
    }

    /// Number of buffered characters (bytes) held for this document
    pub fn buffered_len(&self) -> usize {
        self.buffer.len() + self.tail.len()
    }
}

impl FullTextMatcher {
    /// Create a new full-text matcher. Text without any letters or digits is rejected.
    pub fn new(text: &str) -> Result<Self> {
        let full_text = normalize(text);
        if full_text.is_empty() {
            return Err(RatError::config(
                ConfigErrorKind::BlankText,
                "'full_text' matcher requires text containing letters or digits",
            ));
        }

        // skip leading lines that prune to nothing (comment openers and the like)
        let first_line = text
            .lines()
            .map(normalize)
            .find(|line| !line.is_empty())
            .unwrap_or_default();
        let first_line = if text.contains('\n') {
            first_line
        } else {
            let capped: String = text.chars().take(DEFAULT_INITIAL_LINE_LENGTH).collect();
            normalize(&capped)
        };

        Ok(Self {
            full_text,
            first_line,
        })
    }

    /// The normalized target text
    pub fn full_text(&self) -> &str {
        &self.full_text
    }

    /// The normalized anchor searched for before anything is buffered
    pub fn first_line(&self) -> &str {
        &self.first_line
    }

    pub fn matches(&self, progress: &mut FullTextProgress, line: &str) -> bool {
        let input = normalize(line);

        if progress.seen_first_line {
            progress.buffer.push_str(&input);
        } else {
            let mut candidate = std::mem::take(&mut progress.tail);
            candidate.push_str(&input);
            match candidate.find(&self.first_line) {
                Some(offset) => {
                    progress.buffer.push_str(&candidate[offset..]);
                    progress.seen_first_line = true;
                }
                None => {
                    progress.tail = self.keep_tail(&candidate);
                    return false;
                }
            }
        }

        if progress.buffer.len() >= self.full_text.len() {
            if progress.buffer.contains(&self.full_text) {
                return true;
            }
            // the anchor may start again later in the buffer (repeated banners)
            let skip = progress.buffer.chars().next().map_or(0, char::len_utf8);
            match progress.buffer[skip..].find(&self.first_line) {
                Some(offset) => {
                    progress.buffer.drain(..skip + offset);
                }
                None => {
                    progress.tail = self.keep_tail(&progress.buffer);
                    progress.buffer.clear();
                    progress.seen_first_line = false;
                }
            }
        }
        false
    }

    /// The last (anchor length - 1) characters of `text`
    fn keep_tail(&self, text: &str) -> String {
        let keep = self.first_line.chars().count().saturating_sub(1);
        let total = text.chars().count();
        text.chars().skip(total.saturating_sub(keep)).collect()
    }
}
