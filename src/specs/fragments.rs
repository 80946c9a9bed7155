// src/specs/fragments.rs
//! Fragment extraction from one schematic page.
//!
//! The controller renders each value as a `<div>` whose id (or some other
//! attribute) carries a `pos<N>` marker, e.g. `<div id="pos3"><a>61,9 °C</a></div>`.
//! N is the slot index from the configuration export.

use std::{collections::BTreeMap, sync::LazyLock};

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::core::html::flatten_text;
use crate::value::{separate, Observation};

static DIV: LazyLock<Selector> = LazyLock::new(|| Selector::parse("div").expect("static selector"));
static POS_MARKER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"pos\s*(\d+)").expect("static regex"));

#[derive(Clone, Debug, PartialEq)]
pub struct Fragment {
    pub position: usize,
    /// Inner markup, verbatim.
    pub raw: String,
    /// Flattened text content.
    pub text: String,
}

/// Per-page extraction result. Maps are keyed by position; a position seen
/// more than once holds the last element in document order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FragmentSet {
    /// Every position encountered, in document order (duplicates included).
    pub positions: Vec<usize>,
    pub raw_by_position: BTreeMap<usize, String>,
    pub observation_by_position: BTreeMap<usize, Observation>,
}

impl FragmentSet {
    /// Number of distinct positions.
    pub fn len(&self) -> usize {
        self.raw_by_position.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw_by_position.is_empty()
    }

    pub fn raw(&self, position: usize) -> Option<&str> {
        self.raw_by_position.get(&position).map(String::as_str)
    }

    pub fn observation(&self, position: usize) -> Option<&Observation> {
        self.observation_by_position.get(&position)
    }
}

fn marker_position(value: &str) -> Option<usize> {
    POS_MARKER.captures(value)?.get(1)?.as_str().parse().ok()
}

/// Position of an element: the `id` attribute first, then any other attribute.
fn element_position(el: ElementRef<'_>) -> Option<usize> {
    let v = el.value();
    v.id()
        .and_then(marker_position)
        .or_else(|| v.attrs().filter(|(name, _)| *name != "id").find_map(|(_, val)| marker_position(val)))
}

/// All positioned fragments of `markup`, in document order.
pub fn fragments(markup: &str) -> Vec<Fragment> {
    let doc = Html::parse_document(markup);
    doc.select(&DIV)
        .filter_map(|el| {
            let position = element_position(el)?;
            Some(Fragment { position, raw: el.inner_html(), text: flatten_text(el) })
        })
        .collect()
}

pub fn extract_fragments(markup: &str) -> FragmentSet {
    let mut set = FragmentSet::default();
    for frag in fragments(markup) {
        set.positions.push(frag.position);
        set.observation_by_position.insert(frag.position, separate(frag.text.as_str()));
        set.raw_by_position.insert(frag.position, frag.raw);
    }
    set
}
