// src/store.rs
//! In-memory result shapes shared by the cycle, the CLI and publishers.

use serde::Serialize;

use crate::value::{Observation, Unit};

/// Named observations of one page, in insertion (schema) order.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct PageResult {
    pub page: usize,
    pub entries: Vec<(String, Observation)>,
}

impl PageResult {
    pub fn new(page: usize) -> Self {
        Self { page, entries: Vec::new() }
    }

    /// Insert or replace; a replaced name keeps its position.
    pub fn insert(&mut self, name: impl Into<String>, obs: Observation) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = obs,
            None => self.entries.push((name, obs)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Observation> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, o)| o)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Observation)> {
        self.entries.iter().map(|(n, o)| (n.as_str(), o))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Drop every observation without a value. Order of the rest is kept.
pub fn filter_empty_values(pages: Vec<PageResult>) -> Vec<PageResult> {
    pages
        .into_iter()
        .map(|mut p| {
            p.entries.retain(|(_, o)| o.has_value());
            p
        })
        .collect()
}

/// Keep only observations in `unit`.
pub fn retain_unit(pages: Vec<PageResult>, unit: &Unit) -> Vec<PageResult> {
    pages
        .into_iter()
        .map(|mut p| {
            p.entries.retain(|(_, o)| o.unit.as_ref() == Some(unit));
            p
        })
        .collect()
}

/// `name → value` for one page, optionally restricted to one unit.
pub fn extract_entity_data(page: &PageResult, unit: Option<&Unit>) -> Vec<(String, Option<f64>)> {
    page.iter()
        .filter(|(_, o)| unit.is_none_or(|u| o.unit.as_ref() == Some(u)))
        .map(|(n, o)| (n.to_string(), o.value))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::CanonicalUnit::*;

    fn sample() -> PageResult {
        let mut p = PageResult::new(0);
        p.insert("T.Kollektor", Observation::with_unit(Some(61.9), Celsius));
        p.insert("Heizkreis Modus_mode", Observation::with_unit(None, OutputMode));
        p.insert("Pumpe", Observation::with_unit(Some(1.0), Switch));
        p.insert("Status", Observation::new(None, None));
        p
    }

    #[test]
    fn insert_replaces_in_place() {
        let mut p = sample();
        p.insert("T.Kollektor", Observation::with_unit(Some(12.0), Celsius));
        assert_eq!(p.names().collect::<Vec<_>>(), vec!["T.Kollektor", "Heizkreis Modus_mode", "Pumpe", "Status"]);
        assert_eq!(p.get("T.Kollektor").and_then(|o| o.value), Some(12.0));
    }

    #[test]
    fn filter_drops_absent_values_and_is_idempotent() {
        let once = filter_empty_values(vec![sample(), PageResult::new(1)]);
        assert_eq!(once[0].names().collect::<Vec<_>>(), vec!["T.Kollektor", "Pumpe"]);
        assert!(once[1].is_empty());
        let twice = filter_empty_values(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn entity_data_by_unit() {
        let p = sample();
        let switches = extract_entity_data(&p, Some(&Unit::from(Switch)));
        assert_eq!(switches, vec![(s!("Pumpe"), Some(1.0))]);
        assert_eq!(extract_entity_data(&p, None).len(), 4);
    }

    #[test]
    fn retain_unit_keeps_matching_only() {
        let kept = retain_unit(vec![sample()], &Unit::from(Celsius));
        assert_eq!(kept[0].names().collect::<Vec<_>>(), vec!["T.Kollektor"]);
    }
}
