// src/value/unit.rs
//! Unit and state tokens as shown on the controller pages.
//!
//! The controller mixes physical units (`°C`, `l/h`, `kWh`) with German and
//! English state words (`EIN`/`AUS`, `ON`/`OFF`, `AUTO`/`HAND`), and a few of
//! them arrive mis-encoded. Everything is folded into [`CanonicalUnit`];
//! tokens we do not know are carried as [`Unit::Opaque`] instead of guessed.

use std::fmt;

use serde::{Serialize, Serializer};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CanonicalUnit {
    Celsius,
    LitersPerHour,
    Watt,
    KilowattHour,
    Kilowatt,
    Minute,
    Percent,
    Switch,
    OutputMode,
    Unitless,
}

impl CanonicalUnit {
    pub const ALL: [CanonicalUnit; 10] = [
        CanonicalUnit::Celsius,
        CanonicalUnit::LitersPerHour,
        CanonicalUnit::Watt,
        CanonicalUnit::KilowattHour,
        CanonicalUnit::Kilowatt,
        CanonicalUnit::Minute,
        CanonicalUnit::Percent,
        CanonicalUnit::Switch,
        CanonicalUnit::OutputMode,
        CanonicalUnit::Unitless,
    ];

    /// Display token. Feeding it back through [`normalize_unit`] yields the same unit.
    pub fn symbol(&self) -> &'static str {
        match self {
            CanonicalUnit::Celsius => "°C",
            CanonicalUnit::LitersPerHour => "l/h",
            CanonicalUnit::Watt => "W",
            CanonicalUnit::KilowattHour => "kWh",
            CanonicalUnit::Kilowatt => "kW",
            CanonicalUnit::Minute => "min",
            CanonicalUnit::Percent => "%",
            CanonicalUnit::Switch => "switch",
            CanonicalUnit::OutputMode => "OutputMode",
            CanonicalUnit::Unitless => "",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Unit {
    Canonical(CanonicalUnit),
    /// Unrecognised token, stripped but otherwise verbatim.
    Opaque(String),
}

impl Unit {
    pub fn canonical(&self) -> Option<CanonicalUnit> {
        match self {
            Unit::Canonical(c) => Some(*c),
            Unit::Opaque(_) => None,
        }
    }

    pub fn is(&self, unit: CanonicalUnit) -> bool {
        self.canonical() == Some(unit)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Unit::Canonical(c) => c.symbol(),
            Unit::Opaque(s) => s,
        }
    }
}

impl From<CanonicalUnit> for Unit {
    fn from(c: CanonicalUnit) -> Self { Unit::Canonical(c) }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Unit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

const SWITCH_TOKENS: &[&str] = &["AN", "ON", "EIN", "AUS", "OFF", "SWITCH"];
const MODE_TOKENS: &[&str] = &["AUTO", "HAND", "OUTPUTMODE"];
// W/m² in its spellings, including the one where a stray degree byte lands before the ²
const WATT_TOKENS: &[&str] = &["W", "W/M²", "W/M°²", "W/M2", "W/MÂ²"];
const CELSIUS_TOKENS: &[&str] = &["°C", "C", "Â°C"];

/// Map a raw unit/state token onto a [`Unit`]. Case-insensitive, never fails.
pub fn normalize_unit(raw: Option<&str>) -> Option<Unit> {
    let u = raw?.trim();
    let upper = u.to_uppercase();
    let upper = upper.as_str();

    let canonical = if SWITCH_TOKENS.contains(&upper) {
        CanonicalUnit::Switch
    } else if MODE_TOKENS.contains(&upper) {
        CanonicalUnit::OutputMode
    } else if WATT_TOKENS.contains(&upper) {
        CanonicalUnit::Watt
    } else if CELSIUS_TOKENS.contains(&upper) {
        CanonicalUnit::Celsius
    } else {
        match upper {
            "KW" => CanonicalUnit::Kilowatt,
            "KWH" => CanonicalUnit::KilowattHour,
            "L/H" => CanonicalUnit::LitersPerHour,
            "%" => CanonicalUnit::Percent,
            "MIN" => CanonicalUnit::Minute,
            "" => CanonicalUnit::Unitless,
            _ => return Some(Unit::Opaque(s!(u))),
        }
    };
    Some(Unit::Canonical(canonical))
}

#[cfg(test)]
mod tests {
    use super::*;
    use CanonicalUnit::*;

    fn norm(s: &str) -> Option<Unit> { normalize_unit(Some(s)) }

    #[test]
    fn absent_stays_absent() {
        assert_eq!(normalize_unit(None), None);
    }

    #[test]
    fn switch_and_mode_families() {
        for t in ["AN", "on", "Ein", "AUS", "off"] {
            assert_eq!(norm(t), Some(Switch.into()), "{t}");
        }
        assert_eq!(norm("AUTO"), Some(OutputMode.into()));
        assert_eq!(norm("hand"), Some(OutputMode.into()));
    }

    #[test]
    fn physical_units() {
        assert_eq!(norm("W/m²"), Some(Watt.into()));
        assert_eq!(norm("W/m°²"), Some(Watt.into()));
        assert_eq!(norm("W/mÂ²"), Some(Watt.into()));
        assert_eq!(norm("kW"), Some(Kilowatt.into()));
        assert_eq!(norm("KWH"), Some(KilowattHour.into()));
        assert_eq!(norm("l/h"), Some(LitersPerHour.into()));
        assert_eq!(norm("%"), Some(Percent.into()));
        assert_eq!(norm("°C"), Some(Celsius.into()));
        assert_eq!(norm("c"), Some(Celsius.into()));
        assert_eq!(norm("Â°C"), Some(Celsius.into()));
        assert_eq!(norm("min"), Some(Minute.into()));
    }

    #[test]
    fn unknown_token_passes_through_stripped() {
        assert_eq!(norm("  bar "), Some(Unit::Opaque(s!("bar"))));
        assert_eq!(norm("  "), Some(Unitless.into()));
    }

    #[test]
    fn canonical_symbols_are_fixed_points() {
        for c in CanonicalUnit::ALL {
            assert_eq!(norm(c.symbol()), Some(Unit::Canonical(c)), "{c:?}");
        }
        let opaque = Unit::Opaque(s!("rpm"));
        assert_eq!(norm(opaque.as_str()), Some(opaque));
    }
}
