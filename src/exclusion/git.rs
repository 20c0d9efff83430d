use super::{check_pattern, normalize_glob, IgnoreParser, IgnoreRule, PathPattern};
use crate::error::Result;

/// Translate one `.gitignore` line into a rule.
///
/// Blank lines and comments give `None`. `!` marks a re-inclusion, `\#` and
/// `\!` escape a literal first character, a leading `/` anchors the entry to
/// the ignore file's directory and a trailing `/` restricts it to directories.
pub fn modify_entry(entry: &str) -> Option<IgnoreRule> {
    let entry = entry.trim_end();
    if entry.is_empty() || entry.starts_with('#') {
        return None;
    }

    let negated = entry.starts_with('!');
    let entry = if negated || entry.starts_with("\\#") || entry.starts_with("\\!") {
        &entry[1..]
    } else {
        entry
    };
    if entry.is_empty() || entry == "/" {
        return None;
    }

    let (pattern, directory_only) = normalize_glob(entry);
    Some(IgnoreRule {
        pattern: PathPattern::Glob(pattern),
        negated,
        directory_only,
    })
}

/// `.gitignore` files
#[derive(Debug, Clone, Copy, Default)]
pub struct GitIgnoreParser;

impl IgnoreParser for GitIgnoreParser {
    fn file_name(&self) -> &'static str {
        ".gitignore"
    }

    fn parse_rules(&self, source: &str, text: &str) -> Result<Vec<IgnoreRule>> {
        let mut rules = Vec::new();
        for (idx, line) in text.lines().enumerate() {
            if let Some(rule) = modify_entry(line) {
                check_pattern(&rule.pattern, true, source, idx + 1)?;
                rules.push(rule);
            }
        }
        Ok(rules)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{DocumentName, FsInfo};
    use crate::error::RatError;

    fn glob(rule: &IgnoreRule) -> &str {
        rule.pattern.as_str()
    }

    #[test]
    fn test_modify_entry_unanchored() {
        let rule = modify_entry("filename").unwrap();
        assert_eq!(glob(&rule), "**/filename");
        assert!(!rule.negated);
        assert!(!rule.directory_only);
    }

    #[test]
    fn test_modify_entry_anchored() {
        assert_eq!(glob(&modify_entry("/filename").unwrap()), "filename");
    }

    #[test]
    fn test_modify_entry_directory_only() {
        let rule = modify_entry("filename/").unwrap();
        assert_eq!(glob(&rule), "**/filename");
        assert!(rule.directory_only);
    }

    #[test]
    fn test_modify_entry_negated_hash() {
        let rule = modify_entry("!#filename").unwrap();
        assert_eq!(glob(&rule), "**/#filename");
        assert!(rule.negated);
    }

    #[test]
    fn test_modify_entry_interior_slash() {
        let rule = modify_entry("file/name").unwrap();
        assert_eq!(glob(&rule), "file/name");
        assert!(!rule.negated);
    }

    #[test]
    fn test_modify_entry_escapes() {
        let rule = modify_entry("\\#file").unwrap();
        assert_eq!(glob(&rule), "**/#file");
        assert!(!rule.negated);
        let rule = modify_entry("\\!important").unwrap();
        assert_eq!(glob(&rule), "**/!important");
        assert!(!rule.negated);
    }

    #[test]
    fn test_modify_entry_skips_comments_and_blanks() {
        assert!(modify_entry("# comment").is_none());
        assert!(modify_entry("   ").is_none());
        assert!(modify_entry("!").is_none());
        assert!(modify_entry("/").is_none());
    }

    #[test]
    fn test_parse_gitignore() {
        let dir = DocumentName::builder()
            .name("/repo/module")
            .base_name("/repo")
            .fs_info(FsInfo::unix())
            .directory(true)
            .build()
            .unwrap();
        let text = "# build output\n*.class\n/dist\nlogs/\n!logs/keep.txt\n";
        let set = GitIgnoreParser.parse(&dir, text).unwrap();

        let file = |p: &str| dir.resolve(p).unwrap();
        assert!(set.is_excluded(&file("A.class")));
        assert!(set.is_excluded(&file("pkg/B.class")));
        assert!(set.is_excluded(&file("dist/app.js")));
        assert!(!set.is_excluded(&file("src/dist/app.js")), "anchored to the module");
        assert!(set.is_excluded(&file("logs/today.log")));
        assert!(!set.is_excluded(&file("logs/keep.txt")));
        assert!(!set.is_excluded(&file("src/Main.java")));

        let outside = DocumentName::builder()
            .name("/repo/A.class")
            .base_name("/repo")
            .fs_info(FsInfo::unix())
            .build()
            .unwrap();
        assert!(!set.is_excluded(&outside), "rules apply below their own directory");
    }

    #[test]
    fn test_invalid_glob_reports_line() {
        let err = GitIgnoreParser.parse_rules("/.gitignore", "ok\nbad[\n").unwrap_err();
        match err {
            RatError::ParseErrorAtLine { file, line, .. } => {
                assert_eq!(file, "/.gitignore");
                assert_eq!(line, 2);
            }
            other => panic!("expected ParseErrorAtLine, got {:?}", other),
        }
    }
}
