// SPDX-License-Identifier: PMPL-1.0-or-later

//! Rendering derived error facts as wiki markup
//!
//! Each error fact becomes one French markup line in the wiki's phrasing,
//! attributed to the source pages carried in the fact's last two arguments.
//! Lines are grouped per page into the `*`-bulleted block the wiki writer
//! posts under its section title; pages implicated by nothing are reported
//! separately so stale sections can be cleared.

use crate::checkers::{CheckerKind, SliceResult};
use crate::engine::core::{Fact, Term};
use colored::*;

/// One formatted inconsistency with the pages it implicates
#[derive(Debug, Clone)]
pub struct Finding {
    pub kind: CheckerKind,
    pub message: String,
    pub pages: Vec<String>,
}

/// The markup block for one wiki page
#[derive(Debug, Clone)]
pub struct PageReport {
    pub url: String,
    pub lines: Vec<String>,
}

impl PageReport {
    /// Bulleted block ready for the wiki writer
    pub fn markup(&self) -> String {
        let bulleted: Vec<String> = self.lines.iter().map(|line| format!("* {}", line)).collect();
        bulleted.join("\n")
    }
}

/// Render every slice's derived facts into findings, in slice order
pub fn findings(results: &[SliceResult]) -> Vec<Finding> {
    let mut out = Vec::new();
    for result in results {
        for fact in &result.derived {
            out.push(Finding {
                kind: result.kind,
                message: render(result.kind, fact),
                pages: fact_pages(fact),
            });
        }
    }
    out
}

/// Group findings per scanned page, preserving scan order. The second list
/// is the pages no finding implicates.
pub fn group_by_page(urls: &[String], findings: &[Finding]) -> (Vec<PageReport>, Vec<String>) {
    let mut reports = Vec::new();
    let mut clean = Vec::new();

    for url in urls {
        let lines: Vec<String> = findings
            .iter()
            .filter(|finding| finding.pages.iter().any(|page| page == url))
            .map(|finding| finding.message.clone())
            .collect();
        if lines.is_empty() {
            clean.push(url.clone());
        } else {
            reports.push(PageReport {
                url: url.clone(),
                lines,
            });
        }
    }

    (reports, clean)
}

fn arg(fact: &Fact, idx: usize) -> &str {
    match fact.args.get(idx) {
        Some(Term::Sym(name)) => name,
        _ => "?",
    }
}

/// One wiki line per error fact, phrased per slice.
///
/// A fact with an unexpected shape falls back to its raw rendering rather
/// than being dropped.
fn render(kind: CheckerKind, fact: &Fact) -> String {
    let expected_arity = match kind {
        CheckerKind::DeathBeforeBirth
        | CheckerKind::MultipleBirths
        | CheckerKind::MultipleDeaths => 5,
        _ => 7,
    };
    if fact.args.len() != expected_arity {
        return fact.to_string();
    }

    match kind {
        CheckerKind::DeathBeforeBirth => format!(
            "{} : [[{}]] né en {} et mort en {}",
            fact.name,
            arg(fact, 0),
            arg(fact, 1),
            arg(fact, 2)
        ),
        CheckerKind::MultipleBirths => format!(
            "{} : [[{}]] né en {} et en {}",
            fact.name,
            arg(fact, 0),
            arg(fact, 1),
            arg(fact, 2)
        ),
        CheckerKind::MultipleDeaths => format!(
            "{} : [[{}]] mort en {} et en {}",
            fact.name,
            arg(fact, 0),
            arg(fact, 1),
            arg(fact, 2)
        ),
        CheckerKind::EncounterLocation => format!(
            "{} : [[{}]] et [[{}]] se sont rencontrés à [[{}]] et à [[{}]] en même temps à la date {}",
            fact.name,
            arg(fact, 3),
            arg(fact, 4),
            arg(fact, 1),
            arg(fact, 2),
            arg(fact, 0)
        ),
        CheckerKind::ElectionBeforeBirth => format!(
            "{} : [[{}]] ({}) est élu en {} à [[{}]] mais né en {}",
            fact.name,
            arg(fact, 0),
            arg(fact, 1),
            arg(fact, 2),
            arg(fact, 4),
            arg(fact, 3)
        ),
        CheckerKind::ElectionAfterDeath => format!(
            "{} : [[{}]] ({}) est élu en {} à [[{}]] mais mort en {}",
            fact.name,
            arg(fact, 0),
            arg(fact, 1),
            arg(fact, 2),
            arg(fact, 4),
            arg(fact, 3)
        ),
        CheckerKind::MarriageBeforeBirth => format!(
            "{} : [[{}]] et [[{}]] se marient le {} à [[{}]] mais [[{}]] né en {}",
            fact.name,
            arg(fact, 0),
            arg(fact, 1),
            arg(fact, 2),
            arg(fact, 4),
            arg(fact, 0),
            arg(fact, 3)
        ),
        CheckerKind::MarriageAfterDeath => format!(
            "{} : [[{}]] et [[{}]] se marient le {} à [[{}]] mais [[{}]] mort en {}",
            fact.name,
            arg(fact, 0),
            arg(fact, 1),
            arg(fact, 2),
            arg(fact, 4),
            arg(fact, 0),
            arg(fact, 3)
        ),
        CheckerKind::DivorceBeforeMarriage => format!(
            "{} : [[{}]] et [[{}]] se marient le {} puis à nouveau le {}",
            fact.name,
            arg(fact, 0),
            arg(fact, 1),
            arg(fact, 2),
            arg(fact, 3)
        ),
    }
}

/// Source pages of a fact: its last two arguments, deduplicated
fn fact_pages(fact: &Fact) -> Vec<String> {
    let count = fact.args.len();
    let mut pages = Vec::new();
    for idx in count.saturating_sub(2)..count {
        let url = arg(fact, idx).to_string();
        if !pages.contains(&url) {
            pages.push(url);
        }
    }
    pages
}

/// Print the human-facing summary to the terminal
pub fn print_summary(results: &[SliceResult], findings: &[Finding], clean_pages: &[String]) {
    println!("\n{}", "=== PASTWATCH INFERENCE REPORT ===".bold().cyan());
    println!();

    for result in results {
        let count = result.derived.len();
        let count_str = if count > 0 {
            count.to_string().red().bold()
        } else {
            count.to_string().green()
        };
        println!("  {:<26} {}", result.kind.label(), count_str);
    }
    println!();

    if findings.is_empty() {
        println!("  {}", "No inconsistencies detected.".green());
    } else {
        for finding in findings {
            println!("  {} {}", "!".red().bold(), finding.message);
        }
    }

    if !clean_pages.is_empty() {
        println!();
        println!("  {} page(s) with nothing to report", clean_pages.len());
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkers::ERR_DATE;

    fn date_fact() -> Fact {
        Fact::new(
            ERR_DATE,
            vec![
                Term::sym("Alice"),
                Term::sym("1900"),
                Term::sym("1850"),
                Term::sym("http://wiki/Alice"),
                Term::sym("http://wiki/Alice"),
            ],
        )
    }

    #[test]
    fn test_render_death_before_birth() {
        let message = render(CheckerKind::DeathBeforeBirth, &date_fact());
        assert_eq!(
            message,
            "Erreur de date : [[Alice]] né en 1900 et mort en 1850"
        );
    }

    #[test]
    fn test_render_falls_back_on_unexpected_shape() {
        let fact = Fact::new(ERR_DATE, vec![Term::sym("Alice")]);
        let message = render(CheckerKind::DeathBeforeBirth, &fact);
        assert_eq!(message, "Erreur de date(Alice)");
    }

    #[test]
    fn test_fact_pages_deduplicated() {
        assert_eq!(fact_pages(&date_fact()), vec!["http://wiki/Alice"]);
    }

    #[test]
    fn test_grouping_and_clean_pages() {
        let urls = vec![
            "http://wiki/Alice".to_string(),
            "http://wiki/Bob".to_string(),
        ];
        let results = vec![SliceResult {
            kind: CheckerKind::DeathBeforeBirth,
            derived: vec![date_fact()],
        }];
        let found = findings(&results);
        let (reports, clean) = group_by_page(&urls, &found);

        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].url, "http://wiki/Alice");
        assert_eq!(
            reports[0].markup(),
            "* Erreur de date : [[Alice]] né en 1900 et mort en 1850"
        );
        assert_eq!(clean, vec!["http://wiki/Bob".to_string()]);
    }
}
