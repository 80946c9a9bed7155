// src/value/observation.rs
//! `separate`: one fragment of page text → `(value, unit)`.
//!
//! Fragments look like `61,9 °C`, `-59,4 kWh`, `EIN`, `AUTO`, `− 5,0 °C`.
//! Parsing never fails; whatever cannot be read stays `None`.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::core::sanitize::{normalize_decimal, normalize_space, repair_degree_sign};
use super::unit::{normalize_unit, CanonicalUnit, Unit};

/// A normalized reading.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Observation {
    pub value: Option<f64>,
    pub unit: Option<Unit>,
}

impl Observation {
    pub fn new(value: Option<f64>, unit: Option<Unit>) -> Self {
        Self { value, unit }
    }

    pub fn with_unit(value: Option<f64>, unit: CanonicalUnit) -> Self {
        Self { value, unit: Some(Unit::Canonical(unit)) }
    }

    pub fn has_value(&self) -> bool { self.value.is_some() }

    pub fn has_unit(&self, unit: CanonicalUnit) -> bool {
        self.unit.as_ref().is_some_and(|u| u.is(unit))
    }
}

static NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(-\s*)?[0-9]+(?:\.[0-9]+)?").expect("number pattern")
});

// Leftmost match wins; at one position the first alternative wins (kWh before kW).
static UNIT_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(°C|l/h|W/m²|W/m°²|W/m2|%|kWh|kW|min|AUS|AN|ON|OFF|AUTO|HAND|EIN|C)")
        .expect("unit pattern")
});

static SWITCH_ON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(AN|ON|EIN)\b").expect("switch-on pattern"));
static SWITCH_OFF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(AUS|OFF)\b").expect("switch-off pattern"));

/// First signed decimal in already-normalized text.
pub(crate) fn first_number(s: &str) -> Option<f64> {
    NUMBER.find_iter(s).find_map(|m| {
        let digits: String = m.as_str().chars().filter(|c| !c.is_whitespace()).collect();
        digits.parse::<f64>().ok()
    })
}

fn first_unit_token(s: &str) -> Option<&str> {
    UNIT_TOKEN.find(s).map(|m| m.as_str())
}

fn switch_state(s: &str) -> Option<f64> {
    if SWITCH_ON.is_match(s) {
        Some(1.0)
    } else if SWITCH_OFF.is_match(s) {
        Some(0.0)
    } else {
        None
    }
}

/// Split a page fragment into a numeric value and a unit.
///
/// `separate("61,9 °C")` → `(61.9, °C)`, `separate("EIN")` → `(1.0, switch)`,
/// `separate("AUTO")` → `(None, OutputMode)`, `separate(None)` → `(None, None)`.
pub fn separate<'a>(fragment: impl Into<Option<&'a str>>) -> Observation {
    let Some(raw) = fragment.into() else {
        return Observation::default();
    };

    let text = normalize_space(raw);
    let text = repair_degree_sign(&text);
    let text = normalize_decimal(&text);

    let mut value = first_number(&text);
    let unit = normalize_unit(first_unit_token(&text));

    if value.is_none() && unit.as_ref().is_some_and(|u| u.is(CanonicalUnit::Switch)) {
        value = switch_state(&text);
    }

    Observation { value, unit }
}
