//! Compilation of single ignore patterns
//!
//! Each glob segment is translated to an anchored [`regex::Regex`]. Wildcards
//! never cross a `/`, so every segment is matched against exactly one path
//! component (except `**`, which spans zero or more components).

use regex::Regex;

/// True if `text` uses glob syntax (`*`, `?`, `[` or a `\` escape)
pub fn has_glob_syntax(text: &str) -> bool {
    text.contains(|c: char| matches!(c, '*' | '?' | '[' | '\\'))
}

/// Split a path into normalized components
///
/// `\` is treated as `/`; empty and `.` components are dropped, which removes
/// a leading `./`, trailing separators and repeated separators.
pub fn path_components(path: &str) -> Vec<String> {
    path.replace('\\', "/")
        .split('/')
        .filter(|c| !c.is_empty() && *c != ".")
        .map(str::to_string)
        .collect()
}

/// Matcher for a single path component
#[derive(Debug, Clone)]
pub enum Segment {
    Literal(String),
    Glob { raw: String, regex: Regex },
    AnyDepth,
}

impl Segment {
    fn compile(text: &str) -> Self {
        if text == "**" {
            return Segment::AnyDepth;
        }
        if !has_glob_syntax(text) {
            return Segment::Literal(text.to_string());
        }
        match Regex::new(&glob_to_regex(text)) {
            Ok(regex) => Segment::Glob {
                raw: text.to_string(),
                regex,
            },
            Err(_) => Segment::Literal(text.to_string()),
        }
    }

    fn matches(&self, component: &str) -> bool {
        match self {
            Segment::Literal(s) => s == component,
            Segment::Glob { raw, regex } => raw == component || regex.is_match(component),
            Segment::AnyDepth => true,
        }
    }
}

/// A compiled ignore pattern
#[derive(Debug, Clone)]
pub enum CompiledPattern {
    /// Matches nothing (empty pattern)
    Never,
    /// No separator: matches when any path component matches
    Component(Segment),
    /// Contains a separator: matched segment-wise against the whole path.
    /// A directory pattern (`a/b/`) also matches everything beneath it.
    Anchored {
        segments: Vec<Segment>,
        directory: bool,
    },
}

impl CompiledPattern {
    pub fn compile(pattern: &str) -> Self {
        let directory = pattern.ends_with('/');
        let body = pattern.trim_end_matches('/');

        if body.is_empty() {
            return CompiledPattern::Never;
        }

        if !body.contains('/') {
            return CompiledPattern::Component(Segment::compile(body));
        }

        let segments = body
            .trim_start_matches('/')
            .split('/')
            .filter(|s| !s.is_empty())
            .map(Segment::compile)
            .collect::<Vec<_>>();

        if segments.is_empty() {
            return CompiledPattern::Never;
        }

        CompiledPattern::Anchored {
            segments,
            directory,
        }
    }

    pub fn matches(&self, path: &str) -> bool {
        self.matches_components(&path_components(path))
    }

    pub fn matches_components(&self, components: &[String]) -> bool {
        match self {
            CompiledPattern::Never => false,
            CompiledPattern::Component(segment) => components.iter().any(|c| segment.matches(c)),
            CompiledPattern::Anchored {
                segments,
                directory,
            } => match_segments(segments, components, *directory),
        }
    }
}

fn match_segments(segments: &[Segment], components: &[String], prefix_ok: bool) -> bool {
    let Some((first, rest)) = segments.split_first() else {
        return components.is_empty() || prefix_ok;
    };

    if let Segment::AnyDepth = first {
        return (0..=components.len())
            .any(|skip| match_segments(rest, &components[skip..], prefix_ok));
    }

    match components.split_first() {
        Some((component, remaining)) => {
            first.matches(component) && match_segments(rest, remaining, prefix_ok)
        }
        None => false,
    }
}

/// Translate one glob segment into an anchored regex
///
/// Supports `*`, `?`, `[...]` classes (`!` or `^` negates, `a-z` ranges) and
/// `\` escapes. An unterminated class is taken literally.
fn glob_to_regex(glob: &str) -> String {
    let chars: Vec<char> = glob.chars().collect();
    let mut out = String::from("^");
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '*' => {
                while i + 1 < chars.len() && chars[i + 1] == '*' {
                    i += 1;
                }
                out.push_str("[^/]*");
            }
            '?' => out.push_str("[^/]"),
            '\\' if i + 1 < chars.len() => {
                i += 1;
                out.push_str(&regex::escape(&chars[i].to_string()));
            }
            '[' => match parse_class(&chars[i + 1..]) {
                Some((class, consumed)) => {
                    out.push_str(&class);
                    i += consumed;
                }
                None => out.push_str(r"\["),
            },
            c => out.push_str(&regex::escape(&c.to_string())),
        }
        i += 1;
    }

    out.push('$');
    out
}

/// Parse a character class body (after `[`), returning the regex class and
/// the number of chars consumed including the closing `]`
fn parse_class(chars: &[char]) -> Option<(String, usize)> {
    let mut i = 0;
    let mut class = String::from("[");

    if matches!(chars.first(), Some('!') | Some('^')) {
        class.push('^');
        i += 1;
    }

    let body_start = i;
    while i < chars.len() {
        let c = chars[i];
        if c == ']' && i > body_start {
            class.push(']');
            return Some((class, i + 1));
        }

        if c == '\\' && i + 1 < chars.len() {
            i += 1;
            class.push_str(&regex::escape(&chars[i].to_string()));
        } else if c == '-' && i > body_start && i + 1 < chars.len() && chars[i + 1] != ']' {
            class.push('-');
        } else {
            class.push_str(&regex::escape(&c.to_string()));
        }
        i += 1;
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_components_normalization() {
        assert_eq!(path_components("./a//b/"), vec!["a", "b"]);
        assert_eq!(path_components(r"a\b\c"), vec!["a", "b", "c"]);
        assert!(path_components("").is_empty());
    }

    #[test]
    fn test_glob_to_regex_star_and_question() {
        let re = Regex::new(&glob_to_regex("*.t?p")).unwrap();
        assert!(re.is_match("file.tmp"));
        assert!(!re.is_match("file.tmpx"));
        assert!(!re.is_match("dir/file.tmp"));
    }

    #[test]
    fn test_glob_to_regex_escapes_regex_metacharacters() {
        let re = Regex::new(&glob_to_regex("a+(b)*")).unwrap();
        assert!(re.is_match("a+(b)c"));
        assert!(!re.is_match("aa(b)c"));
    }

    #[test]
    fn test_character_classes() {
        let re = Regex::new(&glob_to_regex("file[0-9].log")).unwrap();
        assert!(re.is_match("file7.log"));
        assert!(!re.is_match("filex.log"));

        let negated = Regex::new(&glob_to_regex("[!a]*")).unwrap();
        assert!(negated.is_match("bcd"));
        assert!(!negated.is_match("abc"));
    }

    #[test]
    fn test_unterminated_class_is_literal() {
        let re = Regex::new(&glob_to_regex("[abc")).unwrap();
        assert!(re.is_match("[abc"));
    }

    #[test]
    fn test_escaped_wildcard_is_literal() {
        assert!(CompiledPattern::compile(r"\*star").matches("*star"));
        assert!(!CompiledPattern::compile(r"\*star").matches("xstar"));
    }

    #[test]
    fn test_any_depth_segment() {
        let pattern = CompiledPattern::compile("docs/**/*.md");
        assert!(pattern.matches("docs/readme.md"));
        assert!(pattern.matches("docs/a/b/guide.md"));
        assert!(!pattern.matches("src/docs/readme.md"));
    }

    #[test]
    fn test_anchored_directory_pattern_matches_contents() {
        let pattern = CompiledPattern::compile("vendor/legacy/");
        assert!(pattern.matches("vendor/legacy"));
        assert!(pattern.matches("vendor/legacy/lib/x.go"));
        assert!(!pattern.matches("vendor/modern"));
    }

    #[test]
    fn test_leading_slash_anchors_to_root() {
        let pattern = CompiledPattern::compile("/target");
        assert!(pattern.matches("target"));
        assert!(!pattern.matches("crates/target"));
    }

    #[test]
    fn test_empty_pattern_never_matches() {
        assert!(!CompiledPattern::compile("").matches("anything"));
        assert!(!CompiledPattern::compile("/").matches("anything"));
    }
}
