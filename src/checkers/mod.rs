// SPDX-License-Identifier: PMPL-1.0-or-later

//! The nine consistency checkers
//!
//! A checker is a rulebase slice plus the fact adapter that pre-computes
//! the relations that slice needs. Each run builds a fresh knowledge base,
//! loads the slice's facts and rules, and saturates; the derived error
//! facts are the findings. Slices are independent, so `run_all` can fan
//! them out over a thread pool, one knowledge base per slice.

pub mod facts;
pub mod rules;

pub use rules::{ERR_DATE, ERR_ELECTION, ERR_ENCOUNTER, ERR_MARRIAGE};

use crate::engine::{Fact, KnowledgeBase, Rule, DEFAULT_MAX_DERIVED};
use crate::types::ScrapeResult;
use anyhow::Result;
use clap::ValueEnum;
use rayon::prelude::*;
use std::fmt;

/// The closed set of rulebase slices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum CheckerKind {
    DeathBeforeBirth,
    MultipleBirths,
    MultipleDeaths,
    EncounterLocation,
    ElectionBeforeBirth,
    ElectionAfterDeath,
    MarriageBeforeBirth,
    MarriageAfterDeath,
    DivorceBeforeMarriage,
}

impl CheckerKind {
    /// Every slice, in the order results are reported
    pub fn all() -> Vec<Self> {
        vec![
            CheckerKind::DeathBeforeBirth,
            CheckerKind::MultipleBirths,
            CheckerKind::MultipleDeaths,
            CheckerKind::EncounterLocation,
            CheckerKind::ElectionBeforeBirth,
            CheckerKind::ElectionAfterDeath,
            CheckerKind::MarriageBeforeBirth,
            CheckerKind::MarriageAfterDeath,
            CheckerKind::DivorceBeforeMarriage,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            CheckerKind::DeathBeforeBirth => "death-before-birth",
            CheckerKind::MultipleBirths => "multiple-births",
            CheckerKind::MultipleDeaths => "multiple-deaths",
            CheckerKind::EncounterLocation => "encounter-location",
            CheckerKind::ElectionBeforeBirth => "election-before-birth",
            CheckerKind::ElectionAfterDeath => "election-after-death",
            CheckerKind::MarriageBeforeBirth => "marriage-before-birth",
            CheckerKind::MarriageAfterDeath => "marriage-after-death",
            CheckerKind::DivorceBeforeMarriage => "divorce-before-marriage",
        }
    }
}

impl fmt::Display for CheckerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One rulebase slice wired to its fact adapter
pub struct Checker {
    kind: CheckerKind,
    rules: Vec<Rule>,
    max_derived: usize,
}

impl Checker {
    pub fn new(kind: CheckerKind) -> Result<Self> {
        Self::with_max_derived(kind, DEFAULT_MAX_DERIVED)
    }

    pub fn with_max_derived(kind: CheckerKind, max_derived: usize) -> Result<Self> {
        Ok(Self {
            kind,
            rules: rules::rules_for(kind)?,
            max_derived,
        })
    }

    pub fn kind(&self) -> CheckerKind {
        self.kind
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Run this slice against a scrape: fresh knowledge base, slice facts,
    /// saturation. Returns the derived error facts in derivation order.
    pub fn check(&self, scrape: &ScrapeResult) -> Result<Vec<Fact>> {
        let mut kb = KnowledgeBase::with_max_derived(self.max_derived);
        kb.add_rules(self.rules.iter().cloned());
        facts::populate(self.kind, scrape, &mut kb);
        kb.chain()
    }
}

/// Findings of one slice
#[derive(Debug, Clone)]
pub struct SliceResult {
    pub kind: CheckerKind,
    pub derived: Vec<Fact>,
}

/// Run the requested slices and concatenate their findings in slice order.
///
/// With `parallel`, slices run on the rayon pool; each owns its knowledge
/// base, and result order stays the declared slice order either way.
pub fn run_all(
    kinds: &[CheckerKind],
    scrape: &ScrapeResult,
    max_derived: usize,
    parallel: bool,
) -> Result<Vec<SliceResult>> {
    let run_one = |kind: CheckerKind| -> Result<SliceResult> {
        let checker = Checker::with_max_derived(kind, max_derived)?;
        let derived = checker.check(scrape)?;
        Ok(SliceResult { kind, derived })
    };

    if parallel {
        kinds.par_iter().map(|&kind| run_one(kind)).collect()
    } else {
        kinds.iter().map(|&kind| run_one(kind)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Birth, Death, EventDate, PageRecord, Person};

    fn alice_scrape() -> ScrapeResult {
        let mut page = PageRecord {
            url: "http://wiki/Alice".to_string(),
            ..PageRecord::default()
        };
        page.births.push(Birth {
            person: Person("Alice".to_string()),
            date: EventDate::year(1900),
        });
        page.deaths.push(Death {
            person: Person("Alice".to_string()),
            date: EventDate::year(1850),
        });
        ScrapeResult { data: vec![page] }
    }

    #[test]
    fn test_checker_derives_error() {
        let checker = Checker::new(CheckerKind::DeathBeforeBirth).unwrap();
        let derived = checker.check(&alice_scrape()).unwrap();
        assert_eq!(derived.len(), 1);
        assert_eq!(derived[0].name, ERR_DATE);
    }

    #[test]
    fn test_run_all_keeps_slice_order() {
        let kinds = CheckerKind::all();
        let results = run_all(&kinds, &alice_scrape(), 1000, false).unwrap();
        let reported: Vec<CheckerKind> = results.iter().map(|r| r.kind).collect();
        assert_eq!(reported, kinds);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let kinds = CheckerKind::all();
        let scrape = alice_scrape();
        let seq = run_all(&kinds, &scrape, 1000, false).unwrap();
        let par = run_all(&kinds, &scrape, 1000, true).unwrap();
        for (a, b) in seq.iter().zip(par.iter()) {
            assert_eq!(a.kind, b.kind);
            assert_eq!(a.derived, b.derived);
        }
    }
}
