//! Shell completion formatting.
//!
//! Candidates are printed one per line, best first. In indexed form each
//! line is `<partial>__<n>__<path>`, which lets shells that cycle through
//! completions keep the typed text visible; jumping with such a line goes
//! straight to `<path>`, and `<partial>__<n>` picks the nth candidate.

const SEPARATOR: &str = "__";

/// A jump query after stripping completion markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tagged<'a> {
    /// A full `<partial>__<n>__<path>` line
    Path(&'a str),
    /// `<partial>__<n>`
    Nth { query: &'a str, n: usize },
    Plain(&'a str),
}

pub fn parse_tag(input: &str) -> Tagged<'_> {
    for (idx, _) in input.match_indices(SEPARATOR) {
        let rest = &input[idx + SEPARATOR.len()..];
        let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
        if digits == 0 {
            continue;
        }
        if let Some(path) = rest[digits..].strip_prefix(SEPARATOR) {
            if path.starts_with('/') {
                return Tagged::Path(path);
            }
        }
    }

    if let Some((query, n)) = input.rsplit_once(SEPARATOR) {
        if !query.is_empty() && !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(n) = n.parse() {
                return Tagged::Nth { query, n };
            }
        }
    }

    Tagged::Plain(input)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CompletionAdapter {
    indexed: bool,
}

impl CompletionAdapter {
    pub fn new(indexed: bool) -> Self {
        Self { indexed }
    }

    pub fn format(&self, partial: &str, candidates: &[String]) -> Vec<String> {
        if !self.indexed {
            return candidates.to_vec();
        }
        candidates
            .iter()
            .enumerate()
            .map(|(i, path)| format!("{}{}{}{}{}", partial, SEPARATOR, i + 1, SEPARATOR, path))
            .collect()
    }

    /// Newline-terminated candidate list, empty when there are none.
    pub fn render(&self, partial: &str, candidates: &[String]) -> String {
        self.format(partial, candidates)
            .into_iter()
            .map(|line| line + "\n")
            .collect()
    }
}
