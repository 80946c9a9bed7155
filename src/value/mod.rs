// src/value/mod.rs

pub mod observation;
pub mod unit;

pub use observation::{separate, Observation};
pub use unit::{normalize_unit, CanonicalUnit, Unit};
