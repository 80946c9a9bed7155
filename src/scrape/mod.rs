// src/scrape/mod.rs
//! Cycle orchestration: `reconcile` joins one page, `cycle` drives all pages.

pub mod cycle;
pub mod reconcile;

pub use cycle::{process_page, read_data, run_cycle, run_cycle_with_workers, CycleOutcome, FetchStatus};
pub use reconcile::{combine_html_xml, split_compound, Reconciliation};
