//! Read-only lookups over a [`FrecencyIndex`]

use crate::error::{HopError, HopResult};
use crate::index::{Candidate, FrecencyIndex};
use crate::matcher::Query;
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    /// Path passed over by [`Resolver::resolve`] unless it is the only match,
    /// normally the caller's working directory
    pub exclude: Option<String>,
    /// Drop candidates that are no longer directories on disk
    pub skip_missing: bool,
}

pub struct Resolver<'a> {
    index: &'a FrecencyIndex,
    options: ResolveOptions,
}

impl<'a> Resolver<'a> {
    pub fn new(index: &'a FrecencyIndex, options: ResolveOptions) -> Self {
        Self { index, options }
    }

    pub fn candidates(&self, query: &Query) -> Vec<Candidate> {
        let mut candidates = self.index.query(query);
        if self.options.skip_missing {
            candidates.retain(|c| Path::new(&c.path).is_dir());
        }
        candidates
    }

    /// Best match for `query`.
    pub fn resolve(&self, query: &Query) -> HopResult<String> {
        let candidates = self.candidates(query);
        let exclude = self.options.exclude.as_deref();

        candidates
            .iter()
            .find(|c| Some(c.path.as_str()) != exclude)
            .or_else(|| candidates.first())
            .map(|c| c.path.clone())
            .ok_or_else(|| no_match(query))
    }

    /// Up to `limit` matches, best first.
    pub fn resolve_ranked(&self, query: &Query, limit: usize) -> Vec<String> {
        self.candidates(query)
            .into_iter()
            .take(limit)
            .map(|c| c.path)
            .collect()
    }

    /// The `n`th ranked match, counting from 1.
    pub fn resolve_nth(&self, query: &Query, n: usize) -> HopResult<String> {
        if n == 0 {
            return Err(no_match(query));
        }
        self.candidates(query)
            .into_iter()
            .nth(n - 1)
            .map(|c| c.path)
            .ok_or_else(|| no_match(query))
    }
}

fn no_match(query: &Query) -> HopError {
    HopError::NoMatch {
        query: query.raw().to_string(),
    }
}
