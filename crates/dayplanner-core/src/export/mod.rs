//! Exporters for generated schedules.

pub mod ics;

pub use ics::to_ics;
