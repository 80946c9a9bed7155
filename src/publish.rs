// src/publish.rs
//! Output side of a cycle. The scraper hands a [`CycleOutcome`] to a
//! [`Publisher`]; the bundled one writes text, CSV/TSV or JSON to any writer.

use std::io::Write;

use serde::Serialize;

use crate::csv::{self, Delim};
use crate::error::PublishError;
use crate::scrape::{CycleOutcome, FetchStatus};
use crate::value::{CanonicalUnit, Observation, Unit};

pub trait Publisher {
    fn publish(&mut self, outcome: &CycleOutcome) -> Result<(), PublishError>;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum OutputFormat {
    #[default]
    Text,
    Csv,
    Tsv,
    Json,
}

/// Human form of a value: switches as ON/OFF, output modes as AUTO/HAND.
pub fn render_value(obs: &Observation) -> String {
    let Some(v) = obs.value else { return s!("-") };
    match &obs.unit {
        Some(Unit::Canonical(CanonicalUnit::Switch)) => s!(if v != 0.0 { "ON" } else { "OFF" }),
        Some(Unit::Canonical(CanonicalUnit::OutputMode)) if v == 1.0 => s!("AUTO"),
        Some(Unit::Canonical(CanonicalUnit::OutputMode)) if v == 0.0 => s!("HAND"),
        Some(Unit::Canonical(CanonicalUnit::OutputMode)) | None => v.to_string(),
        Some(u) if u.as_str().is_empty() => v.to_string(),
        Some(u) => format!("{v} {u}"),
    }
}

pub fn status_line(status: &FetchStatus) -> String {
    if let Some(err) = &status.config_error {
        return format!("status: configuration error: {err}");
    }
    if status.all_successful {
        format!("status: {}/{} pages ok", status.pages_successful, status.pages_attempted)
    } else {
        format!(
            "status: {}/{} pages ok, failed {:?}",
            status.pages_successful, status.pages_attempted, status.failed_pages
        )
    }
}

/* ---------- JSON view ---------- */

#[derive(Serialize)]
struct JsonEntry<'a> {
    name: &'a str,
    value: Option<f64>,
    unit: Option<&'a Unit>,
}

#[derive(Serialize)]
struct JsonPage<'a> {
    page: usize,
    observations: Vec<JsonEntry<'a>>,
}

#[derive(Serialize)]
struct JsonCycle<'a> {
    pages: Vec<JsonPage<'a>>,
    status: &'a FetchStatus,
}

fn json_view(outcome: &CycleOutcome) -> JsonCycle<'_> {
    let pages = outcome
        .pages
        .iter()
        .map(|p| JsonPage {
            page: p.page,
            observations: p
                .iter()
                .map(|(name, o)| JsonEntry { name, value: o.value, unit: o.unit.as_ref() })
                .collect(),
        })
        .collect();
    JsonCycle { pages, status: &outcome.status }
}

/* ---------- writer publisher ---------- */

pub struct WriterPublisher<W: Write> {
    out: W,
    format: OutputFormat,
    include_headers: bool,
}

impl<W: Write> WriterPublisher<W> {
    pub fn new(out: W, format: OutputFormat) -> Self {
        Self { out, format, include_headers: false }
    }

    pub fn with_headers(mut self, on: bool) -> Self {
        self.include_headers = on;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_text(&mut self, outcome: &CycleOutcome) -> Result<(), PublishError> {
        for page in &outcome.pages {
            writeln!(self.out, "Page {}", page.page)?;
            let width = page.names().map(|n| n.chars().count()).max().unwrap_or(0);
            for (name, obs) in page.iter() {
                writeln!(self.out, "  {name:<width$}  {}", render_value(obs))?;
            }
        }
        writeln!(self.out, "{}", status_line(&outcome.status))?;
        Ok(())
    }
}

impl<W: Write> Publisher for WriterPublisher<W> {
    fn publish(&mut self, outcome: &CycleOutcome) -> Result<(), PublishError> {
        match self.format {
            OutputFormat::Text => self.write_text(outcome)?,
            OutputFormat::Csv | OutputFormat::Tsv => {
                let delim = if self.format == OutputFormat::Csv { Delim::Csv } else { Delim::Tsv };
                let text = csv::pages_to_string(&outcome.pages, self.include_headers, delim);
                self.out.write_all(text.as_bytes())?;
            }
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut self.out, &json_view(outcome))?;
                writeln!(self.out)?;
            }
        }
        self.out.flush()?;
        Ok(())
    }
}
