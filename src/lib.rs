// SPDX-License-Identifier: PMPL-1.0-or-later

//! Pastwatch — temporal-consistency checking for biographical wiki pages.
//!
//! This crate takes the event records a wiki scraper extracted from pages
//! about historical persons, turns them into logical predicates, and runs
//! them through a forward-chaining inference engine against a library of
//! temporal-consistency rules. Every rule that fires is a real-world
//! contradiction (an election dated before the elected person's birth, two
//! recorded deaths, an encounter held at two far-apart places on the same
//! day), reported as wiki markup grouped per implicated page.
//!
//! ENGINE PILLARS:
//! 1. **Engine**: first-order unification and forward chaining over a
//!    monotone, insertion-ordered knowledge base.
//! 2. **Checkers**: nine independent rulebase slices, each paired with the
//!    fact adapter that pre-materialises the relations its rules consume.
//! 3. **Report**: French wiki markup per page plus machine-readable
//!    JSON/YAML summaries.

pub mod checkers;
pub mod engine;
pub mod report;
pub mod types;
