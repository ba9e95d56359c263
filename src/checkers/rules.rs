// SPDX-License-Identifier: PMPL-1.0-or-later

//! The temporal-consistency rulebase
//!
//! One rule slice per checker. Conclusion predicates are named after the
//! wiki's error categories and always carry the source page URLs in their
//! last two arguments, so the writer knows which pages are implicated.
//!
//! The `before`, `different` and `far` premises are not evaluated by the
//! engine; they are pre-materialised as facts by the slice adapters, and
//! only when the relation actually holds.

use crate::checkers::CheckerKind;
use crate::engine::core::{Predicate, Rule, Term};
use anyhow::Result;

/// Conclusion predicate for birth/death date contradictions
pub const ERR_DATE: &str = "Erreur de date";
/// Conclusion predicate for same-day encounters at far-apart places
pub const ERR_ENCOUNTER: &str = "Erreur de rencontre";
/// Conclusion predicate for elections outside the elected person's lifetime
pub const ERR_ELECTION: &str = "Erreur d'election";
/// Conclusion predicate for weddings outside a spouse's lifetime or doubled
pub const ERR_MARRIAGE: &str = "Erreur de mariage";

fn v(name: &str) -> Term {
    Term::var(name)
}

fn p(name: &str, args: Vec<Term>) -> Predicate {
    Predicate::new(name, args)
}

/// Rules for one checker slice
pub fn rules_for(kind: CheckerKind) -> Result<Vec<Rule>> {
    match kind {
        // Erreur de date(P, DB, DD, U1, U2) :-
        //   birth(P, DB, U1), death(P, DD, U2), before(DD, DB).
        CheckerKind::DeathBeforeBirth => Ok(vec![Rule::new(
            "death-before-birth",
            vec![
                p("birth", vec![v("P"), v("DB"), v("U1")]),
                p("death", vec![v("P"), v("DD"), v("U2")]),
                p("before", vec![v("DD"), v("DB")]),
            ],
            p(
                ERR_DATE,
                vec![v("P"), v("DB"), v("DD"), v("U1"), v("U2")],
            ),
        )?]),

        // Erreur de date(P, D1, D2, U1, U2) :-
        //   birth(P, D1, U1), birth(P, D2, U2), different(D1, D2).
        CheckerKind::MultipleBirths => Ok(vec![Rule::new(
            "multiple-births",
            vec![
                p("birth", vec![v("P"), v("D1"), v("U1")]),
                p("birth", vec![v("P"), v("D2"), v("U2")]),
                p("different", vec![v("D1"), v("D2")]),
            ],
            p(
                ERR_DATE,
                vec![v("P"), v("D1"), v("D2"), v("U1"), v("U2")],
            ),
        )?]),

        // Erreur de date(P, D1, D2, U1, U2) :-
        //   death(P, D1, U1), death(P, D2, U2), different(D1, D2).
        CheckerKind::MultipleDeaths => Ok(vec![Rule::new(
            "multiple-deaths",
            vec![
                p("death", vec![v("P"), v("D1"), v("U1")]),
                p("death", vec![v("P"), v("D2"), v("U2")]),
                p("different", vec![v("D1"), v("D2")]),
            ],
            p(
                ERR_DATE,
                vec![v("P"), v("D1"), v("D2"), v("U1"), v("U2")],
            ),
        )?]),

        // Two variants: the person placed elsewhere may be either side of
        // the encounter.
        //
        // Erreur de rencontre(D, L1, L2, P1, P2, U1, U2) :-
        //   encounter(P1, P2, L1, D, U1), position(P1, L2, D, U2), far(L1, L2).
        CheckerKind::EncounterLocation => Ok(vec![
            Rule::new(
                "encounter-location-first",
                vec![
                    p(
                        "encounter",
                        vec![v("P1"), v("P2"), v("L1"), v("D"), v("U1")],
                    ),
                    p("position", vec![v("P1"), v("L2"), v("D"), v("U2")]),
                    p("far", vec![v("L1"), v("L2")]),
                ],
                p(
                    ERR_ENCOUNTER,
                    vec![v("D"), v("L1"), v("L2"), v("P1"), v("P2"), v("U1"), v("U2")],
                ),
            )?,
            Rule::new(
                "encounter-location-second",
                vec![
                    p(
                        "encounter",
                        vec![v("P1"), v("P2"), v("L1"), v("D"), v("U1")],
                    ),
                    p("position", vec![v("P2"), v("L2"), v("D"), v("U2")]),
                    p("far", vec![v("L1"), v("L2")]),
                ],
                p(
                    ERR_ENCOUNTER,
                    vec![v("D"), v("L1"), v("L2"), v("P1"), v("P2"), v("U1"), v("U2")],
                ),
            )?,
        ]),

        // Erreur d'election(P, F, D, DB, L, U1, U2) :-
        //   election(P, F, D, L, U1), birth(P, DB, U2), before(D, DB).
        CheckerKind::ElectionBeforeBirth => Ok(vec![Rule::new(
            "election-before-birth",
            vec![
                p("election", vec![v("P"), v("F"), v("D"), v("L"), v("U1")]),
                p("birth", vec![v("P"), v("DB"), v("U2")]),
                p("before", vec![v("D"), v("DB")]),
            ],
            p(
                ERR_ELECTION,
                vec![v("P"), v("F"), v("D"), v("DB"), v("L"), v("U1"), v("U2")],
            ),
        )?]),

        // Erreur d'election(P, F, D, DD, L, U1, U2) :-
        //   election(P, F, D, L, U1), death(P, DD, U2), before(DD, D).
        CheckerKind::ElectionAfterDeath => Ok(vec![Rule::new(
            "election-after-death",
            vec![
                p("election", vec![v("P"), v("F"), v("D"), v("L"), v("U1")]),
                p("death", vec![v("P"), v("DD"), v("U2")]),
                p("before", vec![v("DD"), v("D")]),
            ],
            p(
                ERR_ELECTION,
                vec![v("P"), v("F"), v("D"), v("DD"), v("L"), v("U1"), v("U2")],
            ),
        )?]),

        // Two variants per slice so the implicated spouse leads the
        // conclusion whichever side of the wedding they are on.
        CheckerKind::MarriageBeforeBirth => Ok(vec![
            Rule::new(
                "marriage-before-birth-first",
                vec![
                    p("wedding", vec![v("P1"), v("P2"), v("D"), v("L"), v("U1")]),
                    p("birth", vec![v("P1"), v("DB"), v("U2")]),
                    p("before", vec![v("D"), v("DB")]),
                ],
                p(
                    ERR_MARRIAGE,
                    vec![v("P1"), v("P2"), v("D"), v("DB"), v("L"), v("U1"), v("U2")],
                ),
            )?,
            Rule::new(
                "marriage-before-birth-second",
                vec![
                    p("wedding", vec![v("P1"), v("P2"), v("D"), v("L"), v("U1")]),
                    p("birth", vec![v("P2"), v("DB"), v("U2")]),
                    p("before", vec![v("D"), v("DB")]),
                ],
                p(
                    ERR_MARRIAGE,
                    vec![v("P2"), v("P1"), v("D"), v("DB"), v("L"), v("U1"), v("U2")],
                ),
            )?,
        ]),

        CheckerKind::MarriageAfterDeath => Ok(vec![
            Rule::new(
                "marriage-after-death-first",
                vec![
                    p("wedding", vec![v("P1"), v("P2"), v("D"), v("L"), v("U1")]),
                    p("death", vec![v("P1"), v("DD"), v("U2")]),
                    p("before", vec![v("DD"), v("D")]),
                ],
                p(
                    ERR_MARRIAGE,
                    vec![v("P1"), v("P2"), v("D"), v("DD"), v("L"), v("U1"), v("U2")],
                ),
            )?,
            Rule::new(
                "marriage-after-death-second",
                vec![
                    p("wedding", vec![v("P1"), v("P2"), v("D"), v("L"), v("U1")]),
                    p("death", vec![v("P2"), v("DD"), v("U2")]),
                    p("before", vec![v("DD"), v("D")]),
                ],
                p(
                    ERR_MARRIAGE,
                    vec![v("P2"), v("P1"), v("D"), v("DD"), v("L"), v("U1"), v("U2")],
                ),
            )?,
        ]),

        // Erreur de mariage(P1, P2, D1, D2, L2, U1, U2) :-
        //   wedding(P1, P2, D1, L1, U1), wedding(P1, P2, D2, L2, U2),
        //   before(D1, D2).
        CheckerKind::DivorceBeforeMarriage => Ok(vec![Rule::new(
            "divorce-before-marriage",
            vec![
                p("wedding", vec![v("P1"), v("P2"), v("D1"), v("L1"), v("U1")]),
                p("wedding", vec![v("P1"), v("P2"), v("D2"), v("L2"), v("U2")]),
                p("before", vec![v("D1"), v("D2")]),
            ],
            p(
                ERR_MARRIAGE,
                vec![v("P1"), v("P2"), v("D1"), v("D2"), v("L2"), v("U1"), v("U2")],
            ),
        )?]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_slice_builds() {
        for kind in CheckerKind::all() {
            let rules = rules_for(kind).unwrap();
            assert!(!rules.is_empty(), "{:?} has no rules", kind);
        }
    }

    #[test]
    fn test_conclusions_carry_two_urls() {
        for kind in CheckerKind::all() {
            for rule in rules_for(kind).unwrap() {
                let args = &rule.conclusion().args;
                assert!(args.len() >= 4, "{} conclusion too short", rule.name());
                assert_eq!(args[args.len() - 2], Term::var("U1"));
                assert_eq!(args[args.len() - 1], Term::var("U2"));
            }
        }
    }
}
