//! In-memory frecency index over the store's records.
//!
//! Visits add a fixed increment to a directory's weight. Once the sum of all
//! weights passes `max_total`, every weight is scaled by `decay_factor`,
//! which bounds growth and lets old favourites fade while keeping their
//! relative order.

use crate::matcher::Query;
use crate::record::{Records, VisitRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightSettings {
    /// Added to a directory's weight on every visit
    pub increment: f64,
    /// Total weight above which all weights decay
    pub max_total: f64,
    /// Multiplier applied to every weight on decay, in (0, 1)
    pub decay_factor: f64,
    /// Default step for manual increase/decrease
    pub adjust_step: f64,
}

impl Default for WeightSettings {
    fn default() -> Self {
        Self {
            increment: 10.0,
            max_total: 10_000.0,
            decay_factor: 0.9,
            adjust_step: 10.0,
        }
    }
}

/// A ranked query result.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub path: String,
    pub score: f64,
    /// Characters left after the query's last match; lower is a tighter match
    pub unmatched: usize,
}

impl Candidate {
    /// Total order: higher score first, then tighter match, then shorter
    /// path, then byte order.
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| self.unmatched.cmp(&other.unmatched))
            .then_with(|| self.path.len().cmp(&other.path.len()))
            .then_with(|| self.path.cmp(&other.path))
    }
}

#[derive(Debug, Clone, Default)]
pub struct FrecencyIndex {
    records: Records,
    settings: WeightSettings,
}

impl FrecencyIndex {
    pub fn new(settings: WeightSettings) -> Self {
        Self::from_records(Records::new(), settings)
    }

    pub fn from_records(records: Records, settings: WeightSettings) -> Self {
        Self { records, settings }
    }

    pub fn records(&self) -> &Records {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, path: &str) -> Option<&VisitRecord> {
        self.records.get(path)
    }

    pub fn total_weight(&self) -> f64 {
        self.records.values().map(|r| r.weight).sum()
    }

    /// Record a visit to `path` and return its weight afterwards.
    pub fn add_or_update(&mut self, path: &str, now: DateTime<Utc>) -> f64 {
        let increment = self.settings.increment;
        self.records
            .entry(path.to_string())
            .and_modify(|r| {
                r.weight += increment;
                r.last_visit = now;
            })
            .or_insert_with(|| VisitRecord::new(path, increment, now));

        self.decay_if_needed();
        self.weight_of(path)
    }

    /// Shift `path`'s weight by `delta`, saturating at zero.
    ///
    /// Unknown paths are created only by a positive delta. Returns the new
    /// weight, or `None` when nothing was changed.
    pub fn adjust(&mut self, path: &str, delta: f64, now: DateTime<Utc>) -> Option<f64> {
        match self.records.get_mut(path) {
            Some(record) => {
                record.weight = (record.weight + delta).max(0.0);
                record.last_visit = now;
            }
            None if delta > 0.0 => {
                self.records
                    .insert(path.to_string(), VisitRecord::new(path, delta, now));
            }
            None => return None,
        }

        self.decay_if_needed();
        Some(self.weight_of(path))
    }

    /// Scale every weight down once the total passes the ceiling.
    pub fn decay_if_needed(&mut self) -> bool {
        let total = self.total_weight();
        if total <= self.settings.max_total {
            return false;
        }

        debug!(
            total,
            factor = self.settings.decay_factor,
            "decaying frecency weights"
        );
        for record in self.records.values_mut() {
            record.weight *= self.settings.decay_factor;
        }
        true
    }

    /// Keep only records for which `keep` returns true; returns how many were dropped.
    pub fn retain(&mut self, mut keep: impl FnMut(&VisitRecord) -> bool) -> usize {
        let before = self.records.len();
        self.records.retain(|_, record| keep(record));
        before - self.records.len()
    }

    /// Matching paths ordered by descending score.
    pub fn query(&self, query: &Query) -> Vec<Candidate> {
        let mut candidates: Vec<Candidate> = self
            .records
            .values()
            .filter_map(|r| {
                query.unmatched_suffix(&r.path).map(|unmatched| Candidate {
                    path: r.path.clone(),
                    score: r.weight,
                    unmatched,
                })
            })
            .collect();
        candidates.sort_by(Candidate::rank_cmp);
        candidates
    }

    /// Every known path ordered by descending score.
    pub fn ranked(&self) -> Vec<Candidate> {
        let mut candidates: Vec<Candidate> = self
            .records
            .values()
            .map(|r| Candidate {
                path: r.path.clone(),
                score: r.weight,
                unmatched: 0,
            })
            .collect();
        candidates.sort_by(Candidate::rank_cmp);
        candidates
    }

    fn weight_of(&self, path: &str) -> f64 {
        self.records.get(path).map(|r| r.weight).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::CaseMode;

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    fn query(input: &str) -> Query {
        Query::parse(input, CaseMode::Smart)
    }

    fn paths(candidates: &[Candidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.path.as_str()).collect()
    }

    #[test]
    fn test_add_creates_then_increments() {
        let mut index = FrecencyIndex::default();

        assert_eq!(index.add_or_update("/a", now()), 10.0);
        assert_eq!(index.add_or_update("/a", now()), 20.0);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_add_refreshes_last_visit() {
        let mut index = FrecencyIndex::default();
        let earlier = DateTime::<Utc>::default();
        let later = now();

        index.add_or_update("/a", earlier);
        index.add_or_update("/a", later);

        assert_eq!(index.get("/a").unwrap().last_visit, later);
    }

    #[test]
    fn test_repeat_visit_never_lowers_score() {
        let mut once = FrecencyIndex::default();
        once.add_or_update("/p", now());

        let mut twice = FrecencyIndex::default();
        twice.add_or_update("/p", now());
        twice.add_or_update("/p", now());

        assert!(twice.get("/p").unwrap().weight >= once.get("/p").unwrap().weight);
    }

    #[test]
    fn test_decay_fires_above_ceiling() {
        let settings = WeightSettings {
            max_total: 25.0,
            ..Default::default()
        };
        let mut index = FrecencyIndex::new(settings);

        index.add_or_update("/a", now());
        index.add_or_update("/a", now());
        assert!(!index.decay_if_needed());

        let weight = index.add_or_update("/b", now());
        assert!((weight - 9.0).abs() < 1e-9);
        assert!((index.get("/a").unwrap().weight - 18.0).abs() < 1e-9);
        assert!(index.total_weight() <= 30.0 * 0.9 + 1e-9);
    }

    #[test]
    fn test_decay_preserves_rank_order() {
        let mut records = Records::new();
        for (path, weight) in [("/low", 3.0), ("/mid", 40.0), ("/high", 500.0)] {
            records.insert(path.to_string(), VisitRecord::new(path, weight, now()));
        }
        let settings = WeightSettings {
            max_total: 100.0,
            decay_factor: 0.5,
            ..Default::default()
        };
        let mut index = FrecencyIndex::from_records(records, settings);
        let before = paths(&index.ranked()).join(",");

        assert!(index.decay_if_needed());

        assert_eq!(paths(&index.ranked()).join(","), before);
        assert_eq!(index.get("/high").unwrap().weight, 250.0);
    }

    #[test]
    fn test_adjust_saturates_at_zero() {
        let mut index = FrecencyIndex::default();
        index.add_or_update("/a", now());

        assert_eq!(index.adjust("/a", -25.0, now()), Some(0.0));
        assert_eq!(index.adjust("/a", 5.0, now()), Some(5.0));
    }

    #[test]
    fn test_adjust_unknown_path() {
        let mut index = FrecencyIndex::default();

        assert_eq!(index.adjust("/new", -5.0, now()), None);
        assert!(index.is_empty());
        assert_eq!(index.adjust("/new", 15.0, now()), Some(15.0));
    }

    #[test]
    fn test_query_orders_by_weight() {
        let mut index = FrecencyIndex::default();
        index.add_or_update("/home/u/projects/foo", now());
        index.add_or_update("/home/u/projects/foobar", now());
        index.add_or_update("/home/u/projects/foobar", now());

        let results = index.query(&query("foo"));
        assert_eq!(
            paths(&results),
            vec!["/home/u/projects/foobar", "/home/u/projects/foo"]
        );
        assert_eq!(results[0].score, 20.0);
    }

    #[test]
    fn test_ties_break_by_length_then_lexicographic() {
        let mut index = FrecencyIndex::default();
        index.add_or_update("/home/u/projects/foo", now());
        index.add_or_update("/home/u/projects/bar", now());
        index.add_or_update("/home/u/pr", now());

        let results = index.query(&query("pr"));
        assert_eq!(
            paths(&results),
            vec![
                "/home/u/pr",
                "/home/u/projects/bar",
                "/home/u/projects/foo"
            ]
        );
    }

    #[test]
    fn test_tighter_match_wins_equal_weight() {
        let mut index = FrecencyIndex::default();
        index.add_or_update("/foo/bin", now());
        index.add_or_update("/opt/foo", now());

        let results = index.query(&query("foo"));
        assert_eq!(paths(&results), vec!["/opt/foo", "/foo/bin"]);
        assert_eq!(results[0].unmatched, 0);
        assert_eq!(results[1].unmatched, 4);
    }

    #[test]
    fn test_weight_outranks_tightness() {
        let mut index = FrecencyIndex::default();
        index.add_or_update("/foo/bin", now());
        index.add_or_update("/foo/bin", now());
        index.add_or_update("/opt/foo", now());

        assert_eq!(index.query(&query("foo"))[0].path, "/foo/bin");
    }

    #[test]
    fn test_query_is_deterministic() {
        let mut index = FrecencyIndex::default();
        for path in ["/b/x", "/a/x", "/c/x", "/aa/x"] {
            index.add_or_update(path, now());
        }

        let first = index.query(&query("x"));
        let second = index.query(&query("x"));
        assert_eq!(first, second);
        assert_eq!(paths(&first), vec!["/a/x", "/b/x", "/c/x", "/aa/x"]);
    }

    #[test]
    fn test_retain_reports_removed() {
        let mut index = FrecencyIndex::default();
        index.add_or_update("/keep", now());
        index.add_or_update("/drop", now());

        assert_eq!(index.retain(|r| r.path != "/drop"), 1);
        assert!(index.get("/drop").is_none());
    }
}
