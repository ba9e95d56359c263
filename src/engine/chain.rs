// SPDX-License-Identifier: PMPL-1.0-or-later

//! Knowledge base and forward-chaining saturation
//!
//! Facts live in an insertion-ordered store with structural dedup; rules are
//! applied in insertion order until a full pass derives nothing new. The
//! base only ever grows, and it is owned by exactly one chainer for its
//! lifetime.

use crate::engine::core::{Fact, Predicate, Rule, Substitution};
use anyhow::{bail, Result};
use std::collections::HashSet;

/// Defensive cap on facts derived by one `chain` call
pub const DEFAULT_MAX_DERIVED: usize = 100_000;

#[derive(Debug)]
pub struct KnowledgeBase {
    facts: Vec<Fact>,
    seen: HashSet<Fact>,
    rules: Vec<Rule>,
    max_derived: usize,
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        Self::new()
    }
}

impl KnowledgeBase {
    pub fn new() -> Self {
        Self::with_max_derived(DEFAULT_MAX_DERIVED)
    }

    pub fn with_max_derived(max_derived: usize) -> Self {
        Self {
            facts: Vec::new(),
            seen: HashSet::new(),
            rules: Vec::new(),
            max_derived,
        }
    }

    /// Insert a fact unless a structurally equal one is already present.
    /// Returns true when the fact was new.
    pub fn add_fact(&mut self, fact: Fact) -> bool {
        if self.seen.contains(&fact) {
            return false;
        }
        self.seen.insert(fact.clone());
        self.facts.push(fact);
        true
    }

    pub fn add_facts(&mut self, facts: impl IntoIterator<Item = Fact>) {
        for fact in facts {
            self.add_fact(fact);
        }
    }

    pub fn add_rule(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    pub fn add_rules(&mut self, rules: impl IntoIterator<Item = Rule>) {
        for rule in rules {
            self.add_rule(rule);
        }
    }

    /// Current facts in insertion order
    pub fn facts(&self) -> &[Fact] {
        &self.facts
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn fact_count(&self) -> usize {
        self.facts.len()
    }

    /// Saturate the base: apply every rule against the current facts until a
    /// full pass adds nothing, returning only the facts derived by this call
    /// in derivation order.
    ///
    /// Termination rests on duplicate suppression plus the finite constant
    /// universe of the input facts; [`DEFAULT_MAX_DERIVED`] backstops
    /// rulebases that violate that assumption (e.g. a rule nesting terms in
    /// its own conclusion).
    pub fn chain(&mut self) -> Result<Vec<Fact>> {
        // Per-rule variable namespaces: identical names across rules are
        // unrelated by contract.
        let rules: Vec<Rule> = self
            .rules
            .iter()
            .enumerate()
            .map(|(i, rule)| rule.standardize_apart(i))
            .collect();

        let mut derived: Vec<Fact> = Vec::new();
        loop {
            let mut new_this_pass = 0usize;

            for rule in &rules {
                let matches = self.match_premises(rule.premises());
                for subst in matches {
                    let conclusion = rule.conclusion().substitute(&subst);
                    if !conclusion.is_ground() {
                        // Unreachable for range-restricted rules; skip the
                        // branch rather than poison the base.
                        continue;
                    }
                    if self.add_fact(conclusion.clone()) {
                        derived.push(conclusion);
                        new_this_pass += 1;
                        if derived.len() > self.max_derived {
                            bail!(
                                "derivation bound exceeded ({} facts) while applying rule {}",
                                self.max_derived,
                                rule.name()
                            );
                        }
                    }
                }
            }

            if new_this_pass == 0 {
                break;
            }
        }

        Ok(derived)
    }

    /// All substitutions under which every premise, in declaration order,
    /// matches some fact in the base
    fn match_premises(&self, premises: &[Predicate]) -> Vec<Substitution> {
        let mut current = vec![Substitution::new()];

        for premise in premises {
            let mut next = Vec::new();

            for subst in &current {
                let narrowed = premise.substitute(subst);

                for fact in &self.facts {
                    if fact.name != narrowed.name || fact.args.len() != narrowed.args.len() {
                        continue;
                    }
                    if let Some(unified) = subst.unify(&narrowed.to_term(), &fact.to_term()) {
                        next.push(unified);
                    }
                }
            }

            current = next;
            if current.is_empty() {
                break;
            }
        }

        current
    }
}
