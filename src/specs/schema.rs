// src/specs/schema.rs
//! Reader for the controller's configuration export (TA-Designer XML).
//!
//! Shape we rely on:
//! ```text
//! <root>
//!   <Seiten>
//!     <Seite_0>
//!       <Objekte>
//!         <Objekt_0 Bezeichnung="Eingang 1: T.Kollektor" Objekt_Typ="Wert_Obj"/>
//!         <Objekt_1 Bezeichnung="Logo" Objekt_Typ="Pic_Obj"/>
//!         …
//! ```
//! Every element child of `<Seiten>` counts as a page; `Seite_N` is page N.
//! Inside a page, object elements are walked in document order and image
//! objects (`Pic_Obj`) are skipped without consuming a slot index.

use std::{collections::BTreeMap, fs, path::Path};

use roxmltree::{Document, Node};

use crate::config::consts::{
    IMAGE_MARKER, LABEL_ATTR, LABEL_SEPARATOR, OBJECTS_ELEMENT, PAGES_ELEMENT, PAGE_PREFIX, TYPE_ATTR,
};
use crate::core::sanitize::decode_latin1_fallback;
use crate::error::{ConfigError, SchemaError};

#[derive(Clone, Debug, PartialEq, Eq)]
struct ObjectNode {
    tag: String,
    label: Option<String>,
    kind: Option<String>,
}

/// Owned snapshot of the parts of the export the scraper reads.
/// Parsed once per cycle; page schemas are derived from it on demand.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConfigTree {
    page_count: usize,
    pages: BTreeMap<usize, Vec<ObjectNode>>,
}

impl ConfigTree {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let bytes = fs::read(path).map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        Self::parse(&decode_latin1_fallback(bytes))
    }

    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let doc = Document::parse(text)?;
        let seiten = doc
            .root_element()
            .children()
            .find(|n| n.is_element() && n.has_tag_name(PAGES_ELEMENT))
            .ok_or(ConfigError::MissingPages)?;

        let mut tree = ConfigTree::default();
        for page in seiten.children().filter(Node::is_element) {
            tree.page_count += 1;
            let tag = page.tag_name().name();
            let Some(number) = tag.strip_prefix(PAGE_PREFIX).and_then(|n| n.parse::<usize>().ok()) else {
                log::debug!("ignoring <{tag}> under <{PAGES_ELEMENT}>");
                continue;
            };
            let objects = page
                .children()
                .filter(|n| n.is_element() && n.has_tag_name(OBJECTS_ELEMENT))
                .flat_map(|o| o.children().filter(Node::is_element))
                .map(|o| ObjectNode {
                    tag: o.tag_name().name().to_string(),
                    label: o.attribute(LABEL_ATTR).map(str::to_string),
                    kind: o.attribute(TYPE_ATTR).map(str::to_string),
                });
            tree.pages.entry(number).or_default().extend(objects);
        }
        Ok(tree)
    }

    /// Number of pages the device serves (element children of `<Seiten>`).
    pub fn page_count(&self) -> usize {
        self.page_count
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MeasurementSlot {
    pub name: String,
    pub slot_index: usize,
}

/// Ordered slots of one page plus the name → index lookup used by reconciliation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SchemaPage {
    pub page: usize,
    pub slots: Vec<MeasurementSlot>,
    lookup: Vec<(String, usize)>,
}

impl SchemaPage {
    pub fn names(&self) -> Vec<&str> {
        self.slots.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn indices(&self) -> Vec<usize> {
        self.slots.iter().map(|s| s.slot_index).collect()
    }

    /// Name → slot index in first-seen order. A repeated name keeps its
    /// original place but points at the later slot.
    pub fn name_to_index(&self) -> &[(String, usize)] {
        &self.lookup
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.lookup.iter().find(|(n, _)| n == name).map(|(_, i)| *i)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn push(&mut self, name: String) {
        let slot_index = self.slots.len();
        match self.lookup.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => {
                log::debug!("page {}: duplicate label {name:?}, slot {} replaces {}", self.page, slot_index, entry.1);
                entry.1 = slot_index;
            }
            None => self.lookup.push((name.clone(), slot_index)),
        }
        self.slots.push(MeasurementSlot { name, slot_index });
    }
}

/// Display label: the part after the last `": "`, or the whole label.
fn display_label(label: &str) -> &str {
    label.rsplit(LABEL_SEPARATOR).next().unwrap_or(label)
}

pub fn read_schema(tree: &ConfigTree, page: usize) -> Result<SchemaPage, SchemaError> {
    let objects = tree.pages.get(&page).ok_or(SchemaError::MissingPage(page))?;
    let mut schema = SchemaPage { page, ..Default::default() };

    for obj in objects {
        let missing = |attribute| SchemaError::MissingAttribute { page, object: obj.tag.clone(), attribute };
        let label = obj.label.as_deref().ok_or_else(|| missing(LABEL_ATTR))?;
        let kind = obj.kind.as_deref().ok_or_else(|| missing(TYPE_ATTR))?;
        if kind.contains(IMAGE_MARKER) {
            continue;
        }
        schema.push(display_label(label).to_string());
    }

    log::debug!("page {page}: schema labels {:?}", schema.names());
    Ok(schema)
}
