// src/scrape/reconcile.rs
//! Join a page schema with the fragments scraped from that page.
//!
//! Schema slot N is matched with the fragment at `posN`. Slots whose label
//! contains `Modus` show a mode and a percentage in one block and are split
//! into `<name>_mode` and `<name>_percent`.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::consts::{COMPOUND_MARKER, MODE_SUFFIX, PERCENT_SUFFIX};
use crate::core::html::text_lines;
use crate::specs::fragments::FragmentSet;
use crate::specs::schema::SchemaPage;
use crate::store::PageResult;
use crate::value::{CanonicalUnit, Observation};

static PERCENT_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:[.,]\d+)?)").expect("static regex"));
static PERCENT_WITH_SIGN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:[.,]\d+)?\s*%?)").expect("static regex"));

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Reconciliation {
    pub result: PageResult,
    /// Schema entries with no fragment at their position.
    pub unmatched: Vec<(String, usize)>,
    /// `(schema slots, fragments)` when the two counts differ.
    pub mismatch: Option<(usize, usize)>,
}

/* ---------- compound (mode + percent) fields ---------- */

fn parse_decimal(s: &str) -> Option<f64> {
    s.trim().replace(',', ".").parse::<f64>().ok().filter(|v| v.is_finite())
}

/// `AUTO` → 1, `HAND` → 0, otherwise a plain number.
fn mode_value(token: &str) -> Option<f64> {
    match token.trim() {
        "AUTO" => Some(1.0),
        "HAND" => Some(0.0),
        other => parse_decimal(other),
    }
}

fn percent_value(line: &str) -> Option<f64> {
    PERCENT_NUMBER.captures(line).and_then(|c| parse_decimal(&c[1]))
}

/// Read `(mode, percent)` from the inner markup of a compound field.
///
/// Two or more lines: mode on the first, percent on the second.
/// One line (`AUTO 0.0%`): the number is the percent, the rest is the mode.
pub fn split_compound(raw: &str) -> (Option<f64>, Option<f64>) {
    let lines = text_lines(raw);
    match lines.as_slice() {
        [] => (None, None),
        [line] => match percent_value(line) {
            Some(pct) => {
                let rest = PERCENT_WITH_SIGN.replace_all(line, "");
                (mode_value(&rest), Some(pct))
            }
            None => (mode_value(line), None),
        },
        [first, second, ..] => (mode_value(first), percent_value(second)),
    }
}

fn is_compound(name: &str) -> bool {
    name.contains(COMPOUND_MARKER)
}

/// Emit the synthetic entries; false when neither part could be read.
fn expand_compound(out: &mut PageResult, name: &str, raw: &str) -> bool {
    let (mode, percent) = split_compound(raw);
    if let Some(m) = mode {
        out.insert(join!(name, MODE_SUFFIX), Observation::with_unit(Some(m.trunc()), CanonicalUnit::OutputMode));
    }
    if let Some(p) = percent {
        out.insert(join!(name, PERCENT_SUFFIX), Observation::with_unit(Some(p), CanonicalUnit::Percent));
    }
    mode.is_some() || percent.is_some()
}

/* ---------- join ---------- */

pub fn combine_html_xml(schema: &SchemaPage, fragments: &FragmentSet) -> Reconciliation {
    let page = schema.page;
    let mut rec = Reconciliation { result: PageResult::new(page), ..Default::default() };

    if schema.len() != fragments.len() {
        log::error!(
            "page {page}: schema has {} slots but markup has {} fragments",
            schema.len(),
            fragments.len()
        );
        rec.mismatch = Some((schema.len(), fragments.len()));
    }

    for (name, index) in schema.name_to_index() {
        let Some(obs) = fragments.observation(*index) else {
            log::error!("page {page}: no fragment at pos{index} for {name:?}");
            rec.unmatched.push((name.clone(), *index));
            continue;
        };

        if is_compound(name) {
            let raw = fragments.raw(*index).unwrap_or_default();
            if expand_compound(&mut rec.result, name, raw) {
                continue;
            }
            log::debug!("page {page}: {name:?} has no mode/percent, keeping plain value");
        }
        rec.result.insert(name.as_str(), obs.clone());
    }

    log::debug!("page {page}: {} observations", rec.result.len());
    rec
}
