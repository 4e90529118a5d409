//! Data ingestion layer for the rental report.
//!
//! Responsible for discovering, reading, and parsing the CSV rental record
//! files and the machine calendar, cataloguing what was loaded and running
//! the top-level report pipeline.

pub mod catalog;
pub mod reader;
pub mod report;

pub use rental_core as core;
