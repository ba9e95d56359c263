// SPDX-License-Identifier: PMPL-1.0-or-later

//! Core type definitions for pastwatch
//!
//! Domain model for biographical events extracted from wiki pages, plus the
//! raw serde mirror of the scraper's output document. Raw records may carry
//! null entries and unparseable dates; conversion filters the former and
//! drops the latter with a warning, keeping the rest of the page intact.

use crate::engine::core::{Fact, Term};
use anyhow::{anyhow, Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::Path;

/// Great-circle distance above which two locations count as far apart, in km
pub const FAR_THRESHOLD_KM: f64 = 100.0;

/// A person's page name on the wiki
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Person(pub String);

impl Person {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Person {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A wiki date: a year, optionally refined by month and day.
///
/// Bare years are common on historical pages, so `chrono` types do not fit.
/// Ordering is lexicographic on (year, month, day) with missing components
/// sorting first, which keeps `1900` before `1900.06.01`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventDate {
    pub year: i32,
    pub month: Option<u32>,
    pub day: Option<u32>,
}

impl EventDate {
    pub fn year(year: i32) -> Self {
        Self {
            year,
            month: None,
            day: None,
        }
    }

    pub fn ymd(year: i32, month: u32, day: u32) -> Self {
        Self {
            year,
            month: Some(month),
            day: Some(day),
        }
    }

    /// Parse a wiki date string: `1900`, `1900.06` or `1900.06.01`
    pub fn parse(raw: &str) -> Result<Self> {
        let re = Regex::new(r"^(\d{1,4})(?:\.(\d{1,2})(?:\.(\d{1,2}))?)?$").unwrap();
        let caps = re
            .captures(raw.trim())
            .ok_or_else(|| anyhow!("unrecognised date: {:?}", raw))?;

        let year: i32 = caps[1].parse()?;
        let month: Option<u32> = caps.get(2).map(|m| m.as_str().parse()).transpose()?;
        let day: Option<u32> = caps.get(3).map(|d| d.as_str().parse()).transpose()?;

        if let Some(m) = month {
            if !(1..=12).contains(&m) {
                return Err(anyhow!("month out of range in date {:?}", raw));
            }
        }
        if let Some(d) = day {
            if !(1..=31).contains(&d) {
                return Err(anyhow!("day out of range in date {:?}", raw));
            }
        }
        Ok(Self { year, month, day })
    }

    /// `before(self, other)` as a fact, or None when the relation does not hold
    pub fn is_before_predicate(&self, other: &EventDate) -> Option<Fact> {
        if self < other {
            Some(Fact::new(
                "before",
                vec![Term::sym(self.to_string()), Term::sym(other.to_string())],
            ))
        } else {
            None
        }
    }

    /// `different(self, other)` as a fact, or None when the dates are equal
    pub fn is_different_predicate(&self, other: &EventDate) -> Option<Fact> {
        if self != other {
            Some(Fact::new(
                "different",
                vec![Term::sym(self.to_string()), Term::sym(other.to_string())],
            ))
        } else {
            None
        }
    }
}

impl fmt::Display for EventDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.month, self.day) {
            (Some(m), Some(d)) => write!(f, "{:04}.{:02}.{:02}", self.year, m, d),
            (Some(m), None) => write!(f, "{:04}.{:02}", self.year, m),
            _ => write!(f, "{:04}", self.year),
        }
    }
}

/// A place named on the wiki, with WGS84 coordinates when the scraper
/// resolved them
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
}

impl Location {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            lat: None,
            lon: None,
        }
    }

    pub fn at(name: &str, lat: f64, lon: f64) -> Self {
        Self {
            name: name.to_string(),
            lat: Some(lat),
            lon: Some(lon),
        }
    }

    /// `far(self, other)` as a fact when both locations carry coordinates and
    /// lie more than [`FAR_THRESHOLD_KM`] apart; None otherwise
    pub fn is_far_predicate(&self, other: &Location) -> Option<Fact> {
        let (lat1, lon1) = (self.lat?, self.lon?);
        let (lat2, lon2) = (other.lat?, other.lon?);
        if haversine_km(lat1, lon1, lat2, lon2) > FAR_THRESHOLD_KM {
            Some(Fact::new(
                "far",
                vec![Term::sym(&self.name), Term::sym(&other.name)],
            ))
        } else {
            None
        }
    }
}

// Coordinates are compared bitwise so events stay hashable for dedup.
impl PartialEq for Location {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.lat.map(f64::to_bits) == other.lat.map(f64::to_bits)
            && self.lon.map(f64::to_bits) == other.lon.map(f64::to_bits)
    }
}

impl Eq for Location {}

impl Hash for Location {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.lat.map(f64::to_bits).hash(state);
        self.lon.map(f64::to_bits).hash(state);
    }
}

fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    const EARTH_RADIUS_KM: f64 = 6371.0;
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();
    let a = (dlat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
}

/// Birth event: `birth(person, date, url)`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Birth {
    pub person: Person,
    pub date: EventDate,
}

impl Birth {
    pub fn to_predicate(&self, url: &str) -> Fact {
        Fact::new(
            "birth",
            vec![
                Term::sym(self.person.as_str()),
                Term::sym(self.date.to_string()),
                Term::sym(url),
            ],
        )
    }
}

/// Death event: `death(person, date, url)`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Death {
    pub person: Person,
    pub date: EventDate,
}

impl Death {
    pub fn to_predicate(&self, url: &str) -> Fact {
        Fact::new(
            "death",
            vec![
                Term::sym(self.person.as_str()),
                Term::sym(self.date.to_string()),
                Term::sym(url),
            ],
        )
    }
}

/// Encounter between two persons: `encounter(p1, p2, location, date, url)`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Encounter {
    pub person1: Person,
    pub person2: Person,
    pub location: Location,
    pub date: EventDate,
}

impl Encounter {
    pub fn to_predicate(&self, url: &str) -> Fact {
        Fact::new(
            "encounter",
            vec![
                Term::sym(self.person1.as_str()),
                Term::sym(self.person2.as_str()),
                Term::sym(&self.location.name),
                Term::sym(self.date.to_string()),
                Term::sym(url),
            ],
        )
    }
}

/// Recorded presence of a person somewhere: `position(person, location, date, url)`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Position {
    pub person: Person,
    pub location: Location,
    pub date: EventDate,
}

impl Position {
    pub fn to_predicate(&self, url: &str) -> Fact {
        Fact::new(
            "position",
            vec![
                Term::sym(self.person.as_str()),
                Term::sym(&self.location.name),
                Term::sym(self.date.to_string()),
                Term::sym(url),
            ],
        )
    }
}

/// Election to a function: `election(person, role, date, location, url)`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Election {
    pub person: Person,
    pub role: String,
    pub date: EventDate,
    pub location: Location,
}

impl Election {
    pub fn to_predicate(&self, url: &str) -> Fact {
        Fact::new(
            "election",
            vec![
                Term::sym(self.person.as_str()),
                Term::sym(&self.role),
                Term::sym(self.date.to_string()),
                Term::sym(&self.location.name),
                Term::sym(url),
            ],
        )
    }
}

/// Wedding of two persons: `wedding(p1, p2, date, location, url)`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Wedding {
    pub person1: Person,
    pub person2: Person,
    pub date: EventDate,
    pub location: Location,
}

impl Wedding {
    pub fn to_predicate(&self, url: &str) -> Fact {
        Fact::new(
            "wedding",
            vec![
                Term::sym(self.person1.as_str()),
                Term::sym(self.person2.as_str()),
                Term::sym(self.date.to_string()),
                Term::sym(&self.location.name),
                Term::sym(url),
            ],
        )
    }
}

/// One scraped wiki page with its extracted events
#[derive(Debug, Clone, Default)]
pub struct PageRecord {
    pub url: String,
    pub births: Vec<Birth>,
    pub deaths: Vec<Death>,
    pub encounters: Vec<Encounter>,
    pub positions: Vec<Position>,
    pub elections: Vec<Election>,
    pub weddings: Vec<Wedding>,
}

/// Everything the scraper extracted across the requested pages
#[derive(Debug, Clone, Default)]
pub struct ScrapeResult {
    pub data: Vec<PageRecord>,
}

impl ScrapeResult {
    /// Load a scrape document from a JSON or YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading scrape document {}", path.display()))?;
        // Extension-based dispatch is explicit to avoid ambiguous parsing behavior.
        let raw: RawScrape = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => serde_json::from_str(&content)
                .with_context(|| format!("parsing json scrape document {}", path.display()))?,
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content)
                .with_context(|| format!("parsing yaml scrape document {}", path.display()))?,
            _ => {
                return Err(anyhow!(
                    "unsupported scrape document extension for {}",
                    path.display()
                ))
            }
        };
        Ok(raw.into_result())
    }
}

// ---------------------------------------------------------------------------
// Raw mirror of the scraper output. Event slots may be null (the scraper
// emits a null when a line matched an event header but yielded nothing);
// dates arrive as strings.
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct RawScrape {
    #[serde(default)]
    pub data: Vec<RawPage>,
}

#[derive(Debug, Deserialize)]
pub struct RawPage {
    pub url: String,
    #[serde(default)]
    pub births: Vec<Option<RawPersonEvent>>,
    #[serde(default)]
    pub deaths: Vec<Option<RawPersonEvent>>,
    #[serde(default)]
    pub encounters: Vec<Option<RawEncounter>>,
    #[serde(default)]
    pub positions: Vec<Option<RawPosition>>,
    #[serde(default)]
    pub elections: Vec<Option<RawElection>>,
    #[serde(default)]
    pub weddings: Vec<Option<RawWedding>>,
}

#[derive(Debug, Deserialize)]
pub struct RawPersonEvent {
    pub person: String,
    pub date: String,
}

#[derive(Debug, Deserialize)]
pub struct RawLocation {
    pub name: String,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
}

impl RawLocation {
    fn into_location(self) -> Location {
        Location {
            name: self.name,
            lat: self.lat,
            lon: self.lon,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RawEncounter {
    pub person1: String,
    pub person2: String,
    pub location: RawLocation,
    pub date: String,
}

#[derive(Debug, Deserialize)]
pub struct RawPosition {
    pub person: String,
    pub location: RawLocation,
    pub date: String,
}

#[derive(Debug, Deserialize)]
pub struct RawElection {
    pub person: String,
    pub role: String,
    pub date: String,
    pub location: RawLocation,
}

#[derive(Debug, Deserialize)]
pub struct RawWedding {
    pub person1: String,
    pub person2: String,
    pub date: String,
    pub location: RawLocation,
}

impl RawScrape {
    /// Convert to the typed model, filtering null entries and dropping
    /// events whose date does not parse (with a warning; the rest of the
    /// page still proceeds).
    pub fn into_result(self) -> ScrapeResult {
        let data = self.data.into_iter().map(RawPage::into_record).collect();
        ScrapeResult { data }
    }
}

impl RawPage {
    fn into_record(self) -> PageRecord {
        let url = self.url;

        let mut record = PageRecord {
            url: url.clone(),
            ..PageRecord::default()
        };

        for raw in self.births.into_iter().flatten() {
            match EventDate::parse(&raw.date) {
                Ok(date) => record.births.push(Birth {
                    person: Person(raw.person),
                    date,
                }),
                Err(err) => eprintln!("warning: {}: dropping birth: {}", url, err),
            }
        }
        for raw in self.deaths.into_iter().flatten() {
            match EventDate::parse(&raw.date) {
                Ok(date) => record.deaths.push(Death {
                    person: Person(raw.person),
                    date,
                }),
                Err(err) => eprintln!("warning: {}: dropping death: {}", url, err),
            }
        }
        for raw in self.encounters.into_iter().flatten() {
            match EventDate::parse(&raw.date) {
                Ok(date) => record.encounters.push(Encounter {
                    person1: Person(raw.person1),
                    person2: Person(raw.person2),
                    location: raw.location.into_location(),
                    date,
                }),
                Err(err) => eprintln!("warning: {}: dropping encounter: {}", url, err),
            }
        }
        for raw in self.positions.into_iter().flatten() {
            match EventDate::parse(&raw.date) {
                Ok(date) => record.positions.push(Position {
                    person: Person(raw.person),
                    location: raw.location.into_location(),
                    date,
                }),
                Err(err) => eprintln!("warning: {}: dropping position: {}", url, err),
            }
        }
        for raw in self.elections.into_iter().flatten() {
            match EventDate::parse(&raw.date) {
                Ok(date) => record.elections.push(Election {
                    person: Person(raw.person),
                    role: raw.role,
                    date,
                    location: raw.location.into_location(),
                }),
                Err(err) => eprintln!("warning: {}: dropping election: {}", url, err),
            }
        }
        for raw in self.weddings.into_iter().flatten() {
            match EventDate::parse(&raw.date) {
                Ok(date) => record.weddings.push(Wedding {
                    person1: Person(raw.person1),
                    person2: Person(raw.person2),
                    date,
                    location: raw.location.into_location(),
                }),
                Err(err) => eprintln!("warning: {}: dropping wedding: {}", url, err),
            }
        }

        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_parsing() {
        assert_eq!(EventDate::parse("1900").unwrap(), EventDate::year(1900));
        assert_eq!(
            EventDate::parse("1900.06.01").unwrap(),
            EventDate::ymd(1900, 6, 1)
        );
        assert_eq!(
            EventDate::parse("1900.06").unwrap(),
            EventDate {
                year: 1900,
                month: Some(6),
                day: None
            }
        );
        assert!(EventDate::parse("en 1900 environ").is_err());
        assert!(EventDate::parse("1900.13").is_err());
        assert!(EventDate::parse("1900.02.40").is_err());
    }

    #[test]
    fn test_date_ordering() {
        assert!(EventDate::year(1850) < EventDate::year(1900));
        assert!(EventDate::year(1900) < EventDate::ymd(1900, 6, 1));
        assert!(EventDate::ymd(1900, 6, 1) < EventDate::ymd(1900, 6, 2));
    }

    #[test]
    fn test_date_display_round_trip() {
        let d = EventDate::ymd(850, 6, 1);
        assert_eq!(d.to_string(), "0850.06.01");
        assert_eq!(EventDate::parse(&d.to_string()).unwrap(), d);
    }

    #[test]
    fn test_before_predicate_contract() {
        let early = EventDate::year(1850);
        let late = EventDate::year(1900);
        assert!(early.is_before_predicate(&late).is_some());
        assert!(late.is_before_predicate(&early).is_none());
        assert!(early.is_before_predicate(&early).is_none());
    }

    #[test]
    fn test_different_predicate_contract() {
        let a = EventDate::year(1800);
        let b = EventDate::year(1805);
        assert!(a.is_different_predicate(&b).is_some());
        assert!(a.is_different_predicate(&a).is_none());
    }

    #[test]
    fn test_far_predicate_needs_coordinates() {
        let paris = Location::at("Paris", 48.8566, 2.3522);
        let tokyo = Location::at("Tokyo", 35.6762, 139.6503);
        let versailles = Location::at("Versailles", 48.8049, 2.1204);
        let unknown = Location::named("Atlantis");

        assert!(paris.is_far_predicate(&tokyo).is_some());
        assert!(paris.is_far_predicate(&versailles).is_none());
        assert!(paris.is_far_predicate(&unknown).is_none());
    }

    #[test]
    fn test_null_entries_filtered_and_bad_dates_dropped() {
        let json = r#"{
            "data": [{
                "url": "http://wiki/Alice",
                "births": [
                    null,
                    {"person": "Alice", "date": "1900"},
                    {"person": "Alice", "date": "vers 1900"}
                ]
            }]
        }"#;
        let raw: RawScrape = serde_json::from_str(json).unwrap();
        let result = raw.into_result();
        assert_eq!(result.data.len(), 1);
        assert_eq!(result.data[0].births.len(), 1);
        assert_eq!(result.data[0].births[0].person, Person("Alice".into()));
    }

    #[test]
    fn test_event_predicate_shape() {
        let birth = Birth {
            person: Person("Alice".into()),
            date: EventDate::year(1900),
        };
        let fact = birth.to_predicate("http://wiki/Alice");
        assert_eq!(fact.name, "birth");
        assert_eq!(fact.args.len(), 3);
        assert!(fact.is_ground());
    }
}
