//! Query tokens and in-order substring matching

use serde::{Deserialize, Serialize};

/// How query tokens compare against path text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseMode {
    /// Case-insensitive unless the query contains an uppercase character
    #[default]
    Smart,
    Sensitive,
    Insensitive,
}

/// A parsed jump query.
///
/// A path matches when every token occurs in it, in order, without
/// overlapping. Tokens need not be contiguous: `pr foo` matches
/// `/home/u/projects/foo`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    raw: String,
    tokens: Vec<Token>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Token {
    chars: Vec<char>,
    fold_case: bool,
}

impl Query {
    pub fn new<S: AsRef<str>>(terms: &[S], case: CaseMode) -> Self {
        let words: Vec<&str> = terms
            .iter()
            .flat_map(|t| t.as_ref().split_whitespace())
            .collect();

        let tokens = words
            .iter()
            .map(|word| {
                let fold_case = match case {
                    CaseMode::Sensitive => false,
                    CaseMode::Insensitive => true,
                    CaseMode::Smart => !word.chars().any(char::is_uppercase),
                };
                let chars = if fold_case {
                    word.chars().map(fold_char).collect()
                } else {
                    word.chars().collect()
                };
                Token { chars, fold_case }
            })
            .collect();

        Self {
            raw: words.join(" "),
            tokens,
        }
    }

    pub fn parse(input: &str, case: CaseMode) -> Self {
        Self::new(&[input], case)
    }

    /// The query as typed, tokens joined by single spaces.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Number of characters after the end of the last token's match, or
    /// `None` when `path` does not match. An empty query leaves nothing
    /// unmatched.
    pub fn unmatched_suffix(&self, path: &str) -> Option<usize> {
        let original: Vec<char> = path.chars().collect();
        let folded: Vec<char> = original.iter().copied().map(fold_char).collect();

        let mut pos = 0;
        for token in &self.tokens {
            let haystack = if token.fold_case { &folded } else { &original };
            let offset = find(&haystack[pos..], &token.chars)?;
            pos += offset + token.chars.len();
        }
        Some(original.len() - pos)
    }
}

// One char in, one char out, so folded and original text share offsets.
fn fold_char(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

fn find(haystack: &[char], needle: &[char]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(input: &str) -> Query {
        Query::parse(input, CaseMode::Smart)
    }

    fn matches(query: &Query, path: &str) -> bool {
        query.unmatched_suffix(path).is_some()
    }

    #[test]
    fn test_single_token_substring() {
        assert!(matches(&q("foo"), "/home/u/projects/foo"));
        assert!(matches(&q("proj"), "/home/u/projects/foo"));
        assert!(!matches(&q("baz"), "/home/u/projects/foo"));
    }

    #[test]
    fn test_tokens_must_appear_in_order() {
        assert!(matches(&q("pr foo"), "/home/u/projects/foo"));
        assert!(!matches(&q("foo pr"), "/home/u/projects/foo"));
    }

    #[test]
    fn test_tokens_do_not_overlap() {
        assert!(!matches(&q("foo foo"), "/srv/foo"));
        assert!(matches(&q("foo foo"), "/srv/foo/foo"));
    }

    #[test]
    fn test_smart_case() {
        assert!(matches(&q("docs"), "/home/u/Docs"));
        assert!(matches(&q("Docs"), "/home/u/Docs"));
        assert!(!matches(&q("Docs"), "/home/u/docs"));
    }

    #[test]
    fn test_smart_case_is_per_token() {
        let query = q("Docs pr");
        assert!(matches(&query, "/home/u/Docs/Projects"));
        assert!(matches(&query, "/home/u/Docs/projects"));
        assert!(!matches(&query, "/home/u/docs/projects"));
    }

    #[test]
    fn test_unmatched_suffix() {
        assert_eq!(q("foo").unmatched_suffix("/opt/foo"), Some(0));
        assert_eq!(q("foo").unmatched_suffix("/foo/bin"), Some(4));
        assert_eq!(q("pr foo").unmatched_suffix("/projects/foo/x"), Some(2));
        assert_eq!(q("zzz").unmatched_suffix("/opt/foo"), None);
    }

    #[test]
    fn test_non_ascii_folding_keeps_offsets() {
        assert_eq!(q("über").unmatched_suffix("/home/Über/x"), Some(2));
    }

    #[test]
    fn test_explicit_case_modes() {
        assert!(!matches(&Query::parse("docs", CaseMode::Sensitive), "/home/u/Docs"));
        assert!(matches(&Query::parse("DOCS", CaseMode::Insensitive), "/home/u/docs"));
    }

    #[test]
    fn test_terms_are_split_on_whitespace() {
        let query = Query::new(&["pr  foo", "bar"], CaseMode::Smart);
        assert_eq!(query.raw(), "pr foo bar");
        assert!(matches(&query, "/projects/foo/bar"));
    }

    #[test]
    fn test_empty_query_matches_everything() {
        let query = Query::new::<&str>(&[], CaseMode::Smart);
        assert_eq!(query.raw(), "");
        assert_eq!(query.unmatched_suffix("/anything"), Some(0));
    }
}
