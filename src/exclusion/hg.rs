use tracing::warn;

use super::{check_pattern, normalize_glob, IgnoreParser, IgnoreRule, PathPattern};
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Syntax {
    Regexp,
    Glob,
}

/// `.hgignore` files.
///
/// Lines are regular expressions until a `syntax: glob` line switches modes.
/// A `glob:`, `re:` or `regexp:` prefix overrides the mode for one line.
/// Regular expressions are searched for anywhere in the path unless they
/// start with `^`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HgIgnoreParser;

impl HgIgnoreParser {
    fn rule(syntax: Syntax, entry: &str) -> IgnoreRule {
        match syntax {
            Syntax::Regexp => IgnoreRule::exclude(PathPattern::regex(entry)),
            Syntax::Glob => {
                let (glob, _) = normalize_glob(entry);
                IgnoreRule::exclude(PathPattern::Glob(glob))
            }
        }
    }
}

/// The value of a `syntax:` directive, whatever the case of the keyword.
fn strip_syntax(entry: &str) -> Option<&str> {
    const KEYWORD: &str = "syntax:";
    let head = entry.get(..KEYWORD.len())?;
    head.eq_ignore_ascii_case(KEYWORD).then(|| &entry[KEYWORD.len()..])
}

impl IgnoreParser for HgIgnoreParser {
    fn file_name(&self) -> &'static str {
        ".hgignore"
    }

    fn parse_rules(&self, source: &str, text: &str) -> Result<Vec<IgnoreRule>> {
        let mut syntax = Syntax::Regexp;
        let mut rules = Vec::new();

        for (idx, line) in text.lines().enumerate() {
            let line_num = idx + 1;
            let entry = line.trim();
            if entry.is_empty() || entry.starts_with('#') {
                continue;
            }

            if let Some(mode) = strip_syntax(entry) {
                match mode.trim().to_lowercase().as_str() {
                    "glob" => syntax = Syntax::Glob,
                    "regexp" | "re" => syntax = Syntax::Regexp,
                    other => warn!(
                        file = source,
                        line = line_num,
                        syntax = other,
                        "ignoring unknown hgignore syntax"
                    ),
                }
                continue;
            }
            if entry.starts_with("include:") || entry.starts_with("subinclude:") {
                warn!(file = source, line = line_num, "ignoring hgignore include directive");
                continue;
            }

            let entry = entry.replace("\\#", "#");
            let rule = if let Some(glob) = entry.strip_prefix("glob:") {
                Self::rule(Syntax::Glob, glob.trim())
            } else if let Some(re) = entry
                .strip_prefix("regexp:")
                .or_else(|| entry.strip_prefix("re:"))
            {
                Self::rule(Syntax::Regexp, re.trim())
            } else {
                Self::rule(syntax, &entry)
            };
            if rule.pattern.as_str().is_empty() {
                continue;
            }
            check_pattern(&rule.pattern, true, source, line_num)?;
            rules.push(rule);
        }
        Ok(rules)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{DocumentName, FsInfo};
    use crate::error::RatError;

    fn patterns(text: &str) -> Vec<PathPattern> {
        HgIgnoreParser
            .parse_rules(".hgignore", text)
            .unwrap()
            .into_iter()
            .map(|r| r.pattern)
            .collect()
    }

    #[test]
    fn test_default_is_regexp() {
        assert_eq!(patterns("\\.orig$\n"), vec![PathPattern::regex("\\.orig$")]);
    }

    #[test]
    fn test_syntax_switching() {
        let text = "syntax: glob\n*.pyc\nbuild/\nsyntax: regexp\n^docs/\n";
        assert_eq!(
            patterns(text),
            vec![
                PathPattern::glob("**/*.pyc"),
                PathPattern::glob("**/build"),
                PathPattern::regex("^docs/"),
            ]
        );
    }

    #[test]
    fn test_syntax_keyword_ignores_case() {
        let text = "Syntax: GLOB\n*.pyc\nSYNTAX: RegExp\n^docs/\n";
        assert_eq!(
            patterns(text),
            vec![PathPattern::glob("**/*.pyc"), PathPattern::regex("^docs/")]
        );
    }

    #[test]
    fn test_line_prefixes_override_mode() {
        let text = "syntax: glob\nre:\\.bak$\nglob:*.tmp\nregexp:^out/\n";
        assert_eq!(
            patterns(text),
            vec![
                PathPattern::regex("\\.bak$"),
                PathPattern::glob("**/*.tmp"),
                PathPattern::regex("^out/"),
            ]
        );
    }

    #[test]
    fn test_unknown_directives_are_inert() {
        let text = "syntax: rootglob\ninclude:other.hgignore\nsubinclude:sub/.hgignore\ncore$\n";
        assert_eq!(patterns(text), vec![PathPattern::regex("core$")]);
    }

    #[test]
    fn test_bad_regex_is_error() {
        let err = HgIgnoreParser.parse_rules(".hgignore", "ok$\n(unclosed\n").unwrap_err();
        assert!(matches!(err, RatError::ParseErrorAtLine { line: 2, .. }), "got {:?}", err);
    }

    #[test]
    fn test_parse_and_match() {
        let dir = DocumentName::builder()
            .name("/repo")
            .base_name("/repo")
            .fs_info(FsInfo::unix())
            .directory(true)
            .build()
            .unwrap();
        let text = "# comment\n\\.orig$\n^generated/\nsyntax: glob\n*.pyc\n";
        let set = HgIgnoreParser.parse(&dir, text).unwrap();
        let file = |p: &str| dir.resolve(p).unwrap();
        assert!(set.is_excluded(&file("src/a.c.orig")));
        assert!(set.is_excluded(&file("generated/x.c")));
        assert!(!set.is_excluded(&file("src/generated/x.c")));
        assert!(set.is_excluded(&file("pkg/mod.pyc")));
        assert!(!set.is_excluded(&file("pkg/mod.py")));
    }
}
