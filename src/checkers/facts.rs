// SPDX-License-Identifier: PMPL-1.0-or-later

//! Per-slice fact adapters
//!
//! Each adapter loads the direct event facts a slice consumes, then
//! pre-materialises the pairwise relation facts (`before`, `different`,
//! `far`) its rules need. The engine has no built-in arithmetic, so every
//! relation the rules mention must exist as a fact; the relation helpers on
//! the domain types return a fact only when the relation actually holds.
//!
//! Raw event lists may repeat across pages, so events are deduplicated
//! (first occurrence wins, preserving scan order) before the pairwise
//! loops. The knowledge base dedups the facts themselves.

use crate::checkers::CheckerKind;
use crate::engine::KnowledgeBase;
use crate::types::{Birth, Death, Election, Encounter, Position, ScrapeResult, Wedding};
use std::collections::HashSet;
use std::hash::Hash;

/// Load the event and relation facts for one slice into the base
pub fn populate(kind: CheckerKind, scrape: &ScrapeResult, kb: &mut KnowledgeBase) {
    match kind {
        CheckerKind::DeathBeforeBirth => death_before_birth(scrape, kb),
        CheckerKind::MultipleBirths => multiple_births(scrape, kb),
        CheckerKind::MultipleDeaths => multiple_deaths(scrape, kb),
        CheckerKind::EncounterLocation => encounter_location(scrape, kb),
        CheckerKind::ElectionBeforeBirth => election_before_birth(scrape, kb),
        CheckerKind::ElectionAfterDeath => election_after_death(scrape, kb),
        CheckerKind::MarriageBeforeBirth => marriage_before_birth(scrape, kb),
        CheckerKind::MarriageAfterDeath => marriage_after_death(scrape, kb),
        CheckerKind::DivorceBeforeMarriage => divorce_before_marriage(scrape, kb),
    }
}

fn dedup<'a, T: Eq + Hash>(items: impl IntoIterator<Item = &'a T>) -> Vec<&'a T> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for item in items {
        if seen.insert(item) {
            out.push(item);
        }
    }
    out
}

fn births(scrape: &ScrapeResult) -> Vec<&Birth> {
    dedup(scrape.data.iter().flat_map(|page| &page.births))
}

fn deaths(scrape: &ScrapeResult) -> Vec<&Death> {
    dedup(scrape.data.iter().flat_map(|page| &page.deaths))
}

fn weddings(scrape: &ScrapeResult) -> Vec<&Wedding> {
    dedup(scrape.data.iter().flat_map(|page| &page.weddings))
}

fn load_birth_facts(scrape: &ScrapeResult, kb: &mut KnowledgeBase) {
    for page in &scrape.data {
        kb.add_facts(page.births.iter().map(|e| e.to_predicate(&page.url)));
    }
}

fn load_death_facts(scrape: &ScrapeResult, kb: &mut KnowledgeBase) {
    for page in &scrape.data {
        kb.add_facts(page.deaths.iter().map(|e| e.to_predicate(&page.url)));
    }
}

fn load_election_facts(scrape: &ScrapeResult, kb: &mut KnowledgeBase) {
    for page in &scrape.data {
        kb.add_facts(page.elections.iter().map(|e| e.to_predicate(&page.url)));
    }
}

fn load_wedding_facts(scrape: &ScrapeResult, kb: &mut KnowledgeBase) {
    for page in &scrape.data {
        kb.add_facts(page.weddings.iter().map(|e| e.to_predicate(&page.url)));
    }
}

fn death_before_birth(scrape: &ScrapeResult, kb: &mut KnowledgeBase) {
    load_birth_facts(scrape, kb);
    load_death_facts(scrape, kb);

    let births = births(scrape);
    for death in deaths(scrape) {
        for birth in &births {
            if let Some(fact) = death.date.is_before_predicate(&birth.date) {
                kb.add_fact(fact);
            }
        }
    }
}

fn multiple_births(scrape: &ScrapeResult, kb: &mut KnowledgeBase) {
    load_birth_facts(scrape, kb);

    // Strictly upper-triangular pairing: no different(d, d) self-pairs.
    let births = births(scrape);
    for i in 0..births.len() {
        for j in (i + 1)..births.len() {
            if let Some(fact) = births[i].date.is_different_predicate(&births[j].date) {
                kb.add_fact(fact);
            }
        }
    }
}

fn multiple_deaths(scrape: &ScrapeResult, kb: &mut KnowledgeBase) {
    load_death_facts(scrape, kb);

    let deaths = deaths(scrape);
    for i in 0..deaths.len() {
        for j in (i + 1)..deaths.len() {
            if let Some(fact) = deaths[i].date.is_different_predicate(&deaths[j].date) {
                kb.add_fact(fact);
            }
        }
    }
}

fn encounter_location(scrape: &ScrapeResult, kb: &mut KnowledgeBase) {
    for page in &scrape.data {
        kb.add_facts(page.encounters.iter().map(|e| e.to_predicate(&page.url)));
        kb.add_facts(page.positions.iter().map(|e| e.to_predicate(&page.url)));
    }

    let encounters: Vec<&Encounter> = dedup(scrape.data.iter().flat_map(|p| &p.encounters));
    let positions: Vec<&Position> = dedup(scrape.data.iter().flat_map(|p| &p.positions));

    for encounter in &encounters {
        for position in &positions {
            let shares_person = encounter.person1 == position.person
                || encounter.person2 == position.person;
            if !shares_person || encounter.date != position.date {
                continue;
            }
            if let Some(fact) = encounter.location.is_far_predicate(&position.location) {
                kb.add_fact(fact);
            }
        }
    }
}

fn election_before_birth(scrape: &ScrapeResult, kb: &mut KnowledgeBase) {
    load_election_facts(scrape, kb);
    load_birth_facts(scrape, kb);

    let elections: Vec<&Election> = dedup(scrape.data.iter().flat_map(|p| &p.elections));
    let births = births(scrape);
    for election in &elections {
        for birth in &births {
            if let Some(fact) = election.date.is_before_predicate(&birth.date) {
                kb.add_fact(fact);
            }
        }
    }
}

fn election_after_death(scrape: &ScrapeResult, kb: &mut KnowledgeBase) {
    load_election_facts(scrape, kb);
    load_death_facts(scrape, kb);

    let elections: Vec<&Election> = dedup(scrape.data.iter().flat_map(|p| &p.elections));
    let deaths = deaths(scrape);
    for election in &elections {
        for death in &deaths {
            if let Some(fact) = death.date.is_before_predicate(&election.date) {
                kb.add_fact(fact);
            }
        }
    }
}

fn marriage_before_birth(scrape: &ScrapeResult, kb: &mut KnowledgeBase) {
    load_wedding_facts(scrape, kb);
    load_birth_facts(scrape, kb);

    let births = births(scrape);
    for wedding in weddings(scrape) {
        for birth in &births {
            if wedding.person1 == birth.person || wedding.person2 == birth.person {
                if let Some(fact) = wedding.date.is_before_predicate(&birth.date) {
                    kb.add_fact(fact);
                }
            }
        }
    }
}

fn marriage_after_death(scrape: &ScrapeResult, kb: &mut KnowledgeBase) {
    load_wedding_facts(scrape, kb);
    load_death_facts(scrape, kb);

    let deaths = deaths(scrape);
    for wedding in weddings(scrape) {
        for death in &deaths {
            if wedding.person1 == death.person || wedding.person2 == death.person {
                if let Some(fact) = death.date.is_before_predicate(&wedding.date) {
                    kb.add_fact(fact);
                }
            }
        }
    }
}

fn divorce_before_marriage(scrape: &ScrapeResult, kb: &mut KnowledgeBase) {
    load_wedding_facts(scrape, kb);

    // Both orientations of each pair are tried; is_before_predicate keeps
    // only the one that holds, whatever order the pages listed them in.
    let weddings = weddings(scrape);
    for i in 0..weddings.len() {
        for j in (i + 1)..weddings.len() {
            let (first, second) = (weddings[i], weddings[j]);
            let same_couple =
                first.person1 == second.person1 && first.person2 == second.person2;
            if !same_couple || first.date == second.date {
                continue;
            }
            if let Some(fact) = first.date.is_before_predicate(&second.date) {
                kb.add_fact(fact);
            }
            if let Some(fact) = second.date.is_before_predicate(&first.date) {
                kb.add_fact(fact);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EventDate, Location, PageRecord, Person};

    fn page(url: &str) -> PageRecord {
        PageRecord {
            url: url.to_string(),
            ..PageRecord::default()
        }
    }

    fn birth(person: &str, year: i32) -> Birth {
        Birth {
            person: Person(person.to_string()),
            date: EventDate::year(year),
        }
    }

    #[test]
    fn test_duplicate_events_across_pages_produce_one_fact() {
        let mut page1 = page("http://wiki/Alice");
        page1.births.push(birth("Alice", 1900));
        let mut page2 = page("http://wiki/Alice2");
        page2.births.push(birth("Alice", 1900));
        let scrape = ScrapeResult {
            data: vec![page1, page2],
        };

        let mut kb = KnowledgeBase::new();
        multiple_births(&scrape, &mut kb);

        // Two direct facts (distinct urls) but one deduped event, so no
        // different() relation at all.
        assert_eq!(kb.fact_count(), 2);
        assert!(kb.facts().iter().all(|f| f.name == "birth"));
    }

    #[test]
    fn test_no_self_pair_relations() {
        let mut p = page("http://wiki/Bob");
        p.births.push(birth("Bob", 1800));
        p.births.push(birth("Bob", 1805));
        let scrape = ScrapeResult { data: vec![p] };

        let mut kb = KnowledgeBase::new();
        multiple_births(&scrape, &mut kb);

        let relations: Vec<_> = kb
            .facts()
            .iter()
            .filter(|f| f.name == "different")
            .collect();
        assert_eq!(relations.len(), 1);
    }

    #[test]
    fn test_before_added_only_when_it_holds() {
        let mut p = page("http://wiki/Alice");
        p.births.push(birth("Alice", 1900));
        p.deaths.push(Death {
            person: Person("Alice".to_string()),
            date: EventDate::year(1960),
        });
        let scrape = ScrapeResult { data: vec![p] };

        let mut kb = KnowledgeBase::new();
        death_before_birth(&scrape, &mut kb);
        assert!(kb.facts().iter().all(|f| f.name != "before"));
    }

    #[test]
    fn test_far_requires_shared_person_and_date() {
        let date = EventDate::ymd(1900, 6, 1);
        let mut p = page("http://wiki/C");
        p.encounters.push(Encounter {
            person1: Person("C".to_string()),
            person2: Person("D".to_string()),
            location: Location::at("Paris", 48.8566, 2.3522),
            date,
        });
        p.positions.push(Position {
            person: Person("E".to_string()),
            location: Location::at("Tokyo", 35.6762, 139.6503),
            date,
        });
        let scrape = ScrapeResult { data: vec![p] };

        let mut kb = KnowledgeBase::new();
        encounter_location(&scrape, &mut kb);
        assert!(kb.facts().iter().all(|f| f.name != "far"));
    }

    #[test]
    fn test_divorce_relation_survives_listing_order() {
        let couple = |year| Wedding {
            person1: Person("A".to_string()),
            person2: Person("B".to_string()),
            date: EventDate::year(year),
            location: Location::named("Lyon"),
        };
        // Later wedding listed first.
        let mut p = page("http://wiki/A");
        p.weddings.push(couple(1910));
        p.weddings.push(couple(1905));
        let scrape = ScrapeResult { data: vec![p] };

        let mut kb = KnowledgeBase::new();
        divorce_before_marriage(&scrape, &mut kb);

        let before: Vec<_> = kb.facts().iter().filter(|f| f.name == "before").collect();
        assert_eq!(before.len(), 1);
    }
}
