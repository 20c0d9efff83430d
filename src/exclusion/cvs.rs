use super::{check_pattern, IgnoreParser, IgnoreRule, PathPattern};
use crate::error::Result;

/// `.cvsignore` files.
///
/// Entries are whitespace separated globs naming files in the same
/// directory. A lone `!` clears the entries read so far.
#[derive(Debug, Clone, Copy, Default)]
pub struct CvsIgnoreParser;

impl IgnoreParser for CvsIgnoreParser {
    fn file_name(&self) -> &'static str {
        ".cvsignore"
    }

    fn parse_rules(&self, source: &str, text: &str) -> Result<Vec<IgnoreRule>> {
        let mut rules = Vec::new();
        for (idx, line) in text.lines().enumerate() {
            for token in line.split_whitespace() {
                if token == "!" {
                    rules.clear();
                    continue;
                }
                let rule = IgnoreRule::exclude(PathPattern::glob(token));
                check_pattern(&rule.pattern, true, source, idx + 1)?;
                rules.push(rule);
            }
        }
        Ok(rules)
    }
}
