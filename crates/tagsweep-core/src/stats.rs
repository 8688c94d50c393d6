//! Per-model evaluation statistics and their plain-text file format:
//!
//! ```text
//! Hits: 45 (90.00 %)
//! Misses: 5 (10.00 %)
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TagsweepError};

/// File name of the stats record inside a model directory.
pub const STATS_FILE: &str = "stats.txt";

/// Hit/miss counts from one evaluation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvalStats {
    pub hits: u64,
    pub misses: u64,
}

impl EvalStats {
    pub fn new(hits: u64, misses: u64) -> Self {
        Self { hits, misses }
    }

    /// Count one comparison between a ground-truth and a predicted label.
    pub fn record(&mut self, expected: &str, predicted: &str) {
        if expected == predicted {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
    }

    /// Compare labels position by position. Expected labels with no
    /// prediction count as misses; surplus predictions are ignored.
    pub fn record_all<E: AsRef<str>, P: AsRef<str>>(&mut self, expected: &[E], predicted: &[P]) {
        for (i, e) in expected.iter().enumerate() {
            match predicted.get(i) {
                Some(p) => self.record(e.as_ref(), p.as_ref()),
                None => self.misses += 1,
            }
        }
    }

    pub fn merge(&mut self, other: EvalStats) {
        self.hits += other.hits;
        self.misses += other.misses;
    }

    pub fn total(&self) -> u64 {
        self.hits + self.misses
    }

    /// `hits / (hits + misses)`, or `None` when nothing was evaluated.
    pub fn ratio(&self) -> Option<f64> {
        match self.total() {
            0 => None,
            total => Some(self.hits as f64 / total as f64),
        }
    }

    fn percent(&self, count: u64) -> f64 {
        match self.total() {
            0 => 0.0,
            total => count as f64 * 100.0 / total as f64,
        }
    }

    /// Render the two-line stats record.
    pub fn to_record(&self) -> String {
        format!(
            "Hits: {} ({:.2} %)\nMisses: {} ({:.2} %)\n",
            self.hits,
            self.percent(self.hits),
            self.misses,
            self.percent(self.misses)
        )
    }
}

/// Parser for the stats record format.
#[derive(Debug, Clone)]
pub struct StatsParser {
    re: Regex,
}

impl StatsParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            re: Regex::new(r"Hits: (\d+) \(\d+\.\d+ %\)\r?\nMisses: (\d+) \(\d+\.\d+ %\)")?,
        })
    }

    pub fn parse(&self, content: &str) -> Result<EvalStats> {
        let invalid = || TagsweepError::InvalidStats(content.to_string());
        let caps = self.re.captures(content).ok_or_else(invalid)?;
        let hits = caps[1].parse().map_err(|_| invalid())?;
        let misses = caps[2].parse().map_err(|_| invalid())?;
        Ok(EvalStats { hits, misses })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_two_decimal_percentages() {
        let stats = EvalStats::new(45, 5);
        assert_eq!(stats.to_record(), "Hits: 45 (90.00 %)\nMisses: 5 (10.00 %)\n");

        let stats = EvalStats::new(1, 2);
        assert_eq!(stats.to_record(), "Hits: 1 (33.33 %)\nMisses: 2 (66.67 %)\n");
    }

    #[test]
    fn empty_stats_render_zero_percent() {
        let stats = EvalStats::default();
        assert_eq!(stats.to_record(), "Hits: 0 (0.00 %)\nMisses: 0 (0.00 %)\n");
        assert_eq!(stats.ratio(), None);
    }

    #[test]
    fn parses_written_record() {
        let parser = StatsParser::new().unwrap();
        let stats = parser.parse("Hits: 45 (90.00 %)\nMisses: 5 (10.00 %)").unwrap();
        assert_eq!(stats, EvalStats::new(45, 5));
        assert_eq!(stats.ratio(), Some(0.9));

        let stats = EvalStats::new(80, 20);
        assert_eq!(parser.parse(&stats.to_record()).unwrap(), stats);
    }

    #[test]
    fn rejects_garbage() {
        let parser = StatsParser::new().unwrap();
        assert!(parser.parse("").is_err());
        assert!(parser.parse("Hits: 4\nMisses: 1").is_err());
        assert!(parser.parse("Hits: x (1.00 %)\nMisses: 1 (1.00 %)").is_err());
    }

    #[test]
    fn records_label_comparisons() {
        let mut stats = EvalStats::default();
        stats.record_all(&["PRN", "VRB", "NOUN"], &["PRN", "NOUN", "NOUN"]);
        assert_eq!(stats, EvalStats::new(2, 1));
        stats.record("ART", "NO TAG");
        stats.merge(EvalStats::new(1, 0));
        assert_eq!(stats, EvalStats::new(3, 2));
    }

    #[test]
    fn unpredicted_positions_are_misses() {
        let mut stats = EvalStats::default();
        stats.record_all(&["PRN", "VRB", "ART", "NOUN"], &["PRN"]);
        assert_eq!(stats, EvalStats::new(1, 3));

        let mut stats = EvalStats::default();
        stats.record_all(&["PRN"], &["PRN", "VRB"]);
        assert_eq!(stats, EvalStats::new(1, 0));
    }
}
