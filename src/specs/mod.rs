// src/specs/mod.rs
//! # Page reading "specs"
//!
//! Knows where the ground truth lives in the two inputs of a cycle:
//! - `schema`: the controller's XML configuration export, which names every
//!   value slot per page and fixes its index.
//! - `fragments`: the markup of one schematic page, where each value sits in a
//!   `<div>` tagged with `pos<N>`.
//!
//! ## What does **not** live here
//! - Fetching (`core::net`), joining schema and markup (`scrape::reconcile`),
//!   looping over pages (`scrape::cycle`), output (`publish`).
//!
//! ## Conventions
//! - Pure functions over text; testable offline against saved pages.
//! - Document order decides ties: later duplicates overwrite earlier ones.
pub mod fragments;
pub mod schema;
