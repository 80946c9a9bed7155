// src/csv.rs
use std::io::{self, Write};

use crate::store::PageResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Delim {
    Csv,
    Tsv,
}

impl Delim {
    pub fn sep(self) -> char {
        match self {
            Delim::Csv => ',',
            Delim::Tsv => '\t',
        }
    }
}

pub const HEADERS: [&str; 4] = ["Page", "Name", "Value", "Unit"];

fn needs_quotes(field: &str, sep: char) -> bool {
    field.contains(sep) || field.contains('"') || field.contains('\n') || field.contains('\r')
}

/// Write a single CSV/TSV row to any writer.
pub fn write_row<W: Write, S: AsRef<str>>(mut w: W, row: &[S], sep: char) -> io::Result<()> {
    let mut first = true;
    for cell in row {
        let cell = cell.as_ref();
        if !first { write!(w, "{}", sep)?; } else { first = false; }
        if needs_quotes(cell, sep) {
            let escaped = cell.replace('"', "\"\"");
            write!(w, "\"{}\"", escaped)?;
        } else {
            write!(w, "{}", cell)?;
        }
    }
    writeln!(w)
}

/// One row per observation: page, name, value (empty when absent), unit.
pub fn page_rows(page: &PageResult) -> Vec<[String; 4]> {
    page.iter()
        .map(|(name, obs)| {
            [
                page.page.to_string(),
                s!(name),
                obs.value.map(|v| v.to_string()).unwrap_or_default(),
                obs.unit.as_ref().map(|u| s!(u.as_str())).unwrap_or_default(),
            ]
        })
        .collect()
}

/// Stringify pages as-is, optionally with a header line.
pub fn pages_to_string(pages: &[PageResult], include_headers: bool, delim: Delim) -> String {
    let mut buf: Vec<u8> = Vec::new();
    let sep = delim.sep();

    if include_headers {
        let _ = write_row(&mut buf, &HEADERS, sep);
    }
    for page in pages {
        for row in page_rows(page) {
            let _ = write_row(&mut buf, &row, sep);
        }
    }

    match String::from_utf8(buf) {
        Ok(s) => s,
        Err(e) => String::from_utf8_lossy(&e.into_bytes()).into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{CanonicalUnit, Observation};

    #[test]
    fn quotes_only_when_needed() {
        let mut buf = Vec::new();
        write_row(&mut buf, &["a", "b,c", "say \"hi\""], ',').unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "a,\"b,c\",\"say \"\"hi\"\"\"\n");
    }

    #[test]
    fn rows_for_pages() {
        let mut p = PageResult::new(2);
        p.insert("T.Vorlauf, HK1", Observation::with_unit(Some(41.5), CanonicalUnit::Celsius));
        p.insert("Status", Observation::default());
        let out = pages_to_string(&[p], true, Delim::Csv);
        assert_eq!(out, "Page,Name,Value,Unit\n2,\"T.Vorlauf, HK1\",41.5,°C\n2,Status,,\n");
    }

    #[test]
    fn tsv_separator() {
        let mut p = PageResult::new(0);
        p.insert("Pumpe", Observation::with_unit(Some(1.0), CanonicalUnit::Switch));
        assert_eq!(pages_to_string(&[p], false, Delim::Tsv), "0\tPumpe\t1\tswitch\n");
    }
}
